use crate::component::ComponentKind;
use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    pub muted: Style,
    pub import: Style,
    pub declaration: Style,
    pub type_def: Style,
    pub callable: Style,
    pub comment: Style,
}

impl Theme {
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            muted: Style::new().bright_black(),
            import: Style::new().blue(),
            declaration: Style::new().yellow(),
            type_def: Style::new().cyan().bold(),
            callable: Style::new().green(),
            comment: Style::new().bright_black().italic(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            muted: Style::new(),
            import: Style::new(),
            declaration: Style::new(),
            type_def: Style::new(),
            callable: Style::new(),
            comment: Style::new(),
        }
    }

    /// Style used to print a component kind
    pub fn for_kind(&self, kind: ComponentKind) -> Style {
        match kind {
            ComponentKind::Import => self.import.clone(),
            ComponentKind::TopLevelDeclaration => self.declaration.clone(),
            ComponentKind::TypeDefinition => self.type_def.clone(),
            ComponentKind::Method | ComponentKind::Function => self.callable.clone(),
            ComponentKind::Comment => self.comment.clone(),
            ComponentKind::Other => self.error.clone(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
