//! Settings
//!
//! The built-in values live in `defaults/cryptobib.default.toml`, compiled into the crate. A
//! [Loader] starts from them, stacks user TOML files over them, and produces [Settings].

use crate::bib::bibtex::BibtexStyle;
use crate::bib::years::YearRule;
use crate::bibyml::WriterOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/cryptobib.default.toml");

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Layout of written bibyml documents
    pub bibyml: WriterOptions,
    /// Expansion of two-digit years
    pub years: YearRule,
    /// Bibtex output
    pub bibtex: BibtexStyle,
}

/// Builds [Settings] from the defaults plus any number of layers
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Loader holding only the built-in defaults
    pub fn from_defaults() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Stack a TOML file over the current layers; the file must exist
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Merge the layers, later ones winning
    pub fn build(self) -> Result<Settings, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

/// Settings without any user layer
pub fn load_defaults() -> Result<Settings, ConfigError> {
    Loader::from_defaults().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let settings = load_defaults().expect("defaults to deserialize");
        assert_eq!(settings.bibyml, WriterOptions::default());
        assert_eq!(settings.years, YearRule::default());
        assert_eq!(settings.bibtex.name_column, 15);
        assert_eq!(settings.bibtex.first_keys[0], "author");
        assert_eq!(
            settings.bibtex.types.get("inproceedings").map(String::as_str),
            Some("InProceedings")
        );
    }

    fn user_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        write!(file, "{}", content).expect("write config");
        file
    }

    #[test]
    fn layers_user_file() {
        let file = user_file("[years]\npivot = 50\n");
        let settings = Loader::from_defaults()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(settings.years.pivot, 50);
        assert_eq!(settings.bibtex.name_column, 15);
    }

    #[test]
    fn later_files_win_key_by_key() {
        let first = user_file("[bibyml]\nindent_width = 2\nvalue_column = 10\n");
        let second = user_file("[bibyml]\nvalue_column = 32\n");
        let settings = Loader::from_defaults()
            .with_file(first.path())
            .with_file(second.path())
            .build()
            .expect("config to build");
        assert_eq!(settings.bibyml.indent_width, 2);
        assert_eq!(settings.bibyml.value_column, 32);
    }

    #[test]
    fn rejects_zero_indent_width() {
        let file = user_file("[bibyml]\nindent_width = 0\n");
        let err = Loader::from_defaults()
            .with_file(file.path())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("indent_width must be at least 1"));
    }

    #[test]
    fn missing_user_file_is_an_error() {
        assert!(Loader::from_defaults()
            .with_file("/nonexistent/cryptobib.toml")
            .build()
            .is_err());
    }
}
