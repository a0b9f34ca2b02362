use crate::adapter::LanguageRegistry;
use crate::component::Component;
use crate::ui::output::kind_label;
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
pub struct ComponentRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Lines")]
    pub lines: String,
    #[tabled(rename = "Parent")]
    pub parent: String,
    #[tabled(rename = "Comment")]
    pub comment: String,
}

impl ComponentRow {
    pub fn new(index: usize, component: &Component) -> Self {
        let indent = "  ".repeat(component.depth);
        Self {
            index,
            kind: format!("{}{}", indent, kind_label(component.kind)),
            name: component.name.clone().unwrap_or_default(),
            lines: format!("{}-{}", component.lines.start, component.lines.end),
            parent: component.parent.map(|p| p.to_string()).unwrap_or_default(),
            comment: if component.leading_comment.is_some() { "yes" } else { "" }.to_string(),
        }
    }
}

#[derive(Tabled)]
pub struct LanguageRow {
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Aliases")]
    pub aliases: String,
    #[tabled(rename = "Extensions")]
    pub extensions: String,
}

pub fn component_table(components: &[Component]) -> String {
    if components.is_empty() {
        return String::new();
    }
    let rows: Vec<ComponentRow> = components
        .iter()
        .enumerate()
        .map(|(index, component)| ComponentRow::new(index, component))
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn language_table(registry: &LanguageRegistry) -> String {
    let rows: Vec<LanguageRow> = registry
        .adapters()
        .iter()
        .map(|adapter| LanguageRow {
            language: adapter.language_name().to_string(),
            aliases: adapter.aliases().join(", "),
            extensions: adapter
                .file_extensions()
                .iter()
                .map(|ext| format!(".{}", ext))
                .collect::<Vec<_>>()
                .join(" "),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
