use crate::component::ComponentKind;
use crate::segment::SegmentOptions;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of `codesplit.toml`. Every section is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Extra gitignore-style patterns skipped during discovery
    pub exclude: Vec<String>,
    pub segment: SegmentSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentSection {
    /// Kind names or aliases; empty means every kind
    pub include_kinds: Vec<String>,
    pub attach_comments: bool,
    pub max_blank_lines_for_attachment: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub include_leading_comments: bool,
    /// One directory per input file instead of prefixed flat names
    pub subdirectories: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            segment: SegmentSection::default(),
            output: OutputSection::default(),
        }
    }
}

impl Default for SegmentSection {
    fn default() -> Self {
        let defaults = SegmentOptions::default();
        Self {
            include_kinds: Vec::new(),
            attach_comments: defaults.attach_comments,
            max_blank_lines_for_attachment: defaults.max_blank_lines_for_attachment,
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            include_leading_comments: true,
            subdirectories: true,
        }
    }
}

impl SplitterConfig {
    /// Segmentation options described by the `[segment]` section.
    pub fn segment_options(&self) -> Result<SegmentOptions> {
        let mut options = SegmentOptions::default()
            .with_attach_comments(self.segment.attach_comments)
            .with_max_blank_lines(self.segment.max_blank_lines_for_attachment);
        if !self.segment.include_kinds.is_empty() {
            options = options.with_kinds(parse_kinds(&self.segment.include_kinds)?);
        }
        Ok(options)
    }
}

/// Parse kind names, accepting the aliases `ComponentKind` understands.
pub fn parse_kinds<S: AsRef<str>>(names: &[S]) -> Result<Vec<ComponentKind>> {
    let kinds = names
        .iter()
        .map(|name| name.as_ref().parse::<ComponentKind>())
        .collect::<Result<Vec<_>>>()?;
    if kinds.is_empty() {
        return Err(Error::InvalidConfig("no component kinds selected".to_string()));
    }
    Ok(kinds)
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("codesplit.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<SplitterConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: SplitterConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &SplitterConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("codesplit.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("codesplit.toml");
        std::fs::write(&path, "exclude = [\"gen/\"]\n[segment]\ninclude_kinds = [\"fn\", \"class\"]\n").unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.exclude, vec!["gen/".to_string()]);
        assert!(config.segment.attach_comments);
        assert!(config.output.subdirectories);

        let options = config.segment_options().unwrap();
        assert_eq!(options.max_blank_lines_for_attachment, 1);
        assert_eq!(
            options.include_kinds.into_iter().collect::<Vec<_>>(),
            vec![ComponentKind::TypeDefinition, ComponentKind::Function]
        );
    }

    #[test]
    fn test_unknown_kind_is_invalid() {
        let mut config = SplitterConfig::default();
        config.segment.include_kinds = vec!["widget".to_string()];
        assert!(matches!(config.segment_options(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_write_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("codesplit.toml");
        let config = SplitterConfig::default();

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let reloaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(reloaded, config);
    }
}
