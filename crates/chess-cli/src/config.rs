//! Configuration file loading for the command-line tool.
//!
//! Settings live in `chess-notation.toml`: how rendered PGN is laid out and
//! which tags new games start with.

use chess_notation::{is_tag_key, ChessError, Game, DEFAULT_LINE_WIDTH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The configured line width cannot hold any token.
    #[error("Invalid line width: {0}")]
    InvalidLineWidth(usize),
    /// A configured tag name cannot be written in PGN.
    #[error("Invalid tag name: {0:?}")]
    InvalidTagName(String),
}

/// Layout of rendered PGN.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Column at which movetext wraps. Defaults to 80.
    #[serde(default = "default_line_width")]
    pub line_width: usize,
}

fn default_line_width() -> usize {
    DEFAULT_LINE_WIDTH
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            line_width: default_line_width(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct NotationConfig {
    #[serde(default)]
    pub render: RenderConfig,
    /// Tags set on every game created by `play`, e.g. `Event` or `White`.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl NotationConfig {
    /// Loads the configuration from `path`.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// [`ConfigError::ParseError`] if the file contains invalid TOML,
    /// [`ConfigError::InvalidLineWidth`] for a zero line width, or
    /// [`ConfigError::InvalidTagName`] for a tag name PGN cannot hold.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses a configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: NotationConfig = toml::from_str(content)?;
        if config.render.line_width == 0 {
            return Err(ConfigError::InvalidLineWidth(0));
        }
        if let Some(key) = config.tags.keys().find(|key| !is_tag_key(key)) {
            return Err(ConfigError::InvalidTagName(key.clone()));
        }
        Ok(config)
    }

    /// Returns the default configuration path, `chess-notation.toml` in the
    /// current working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from("chess-notation.toml")
    }

    /// Sets the configured tags on `game`.
    pub fn apply_tags(&self, game: &mut Game) -> Result<(), ChessError> {
        for (key, value) in &self.tags {
            game.set_tag(key, value.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_toml_config() {
        let toml_content = r#"
[render]
line_width = 60

[tags]
Event = "Club Championship"
Site = "Ghent"
Annotator = "TM"
"#;

        let config = NotationConfig::parse(toml_content).unwrap();

        assert_eq!(config.render.line_width, 60);
        assert_eq!(config.tags.len(), 3);
        assert_eq!(config.tags.get("Event").unwrap(), "Club Championship");
        assert_eq!(config.tags.get("Annotator").unwrap(), "TM");
    }

    #[test]
    fn test_empty_config_defaults() {
        let config = NotationConfig::parse("").unwrap();

        assert_eq!(config.render.line_width, 80);
        assert!(config.tags.is_empty());
        assert_eq!(config, NotationConfig::default());
    }

    #[test]
    fn test_missing_line_width_uses_default() {
        let config = NotationConfig::parse("[render]\n").unwrap();
        assert_eq!(config.render.line_width, 80);
    }

    #[test]
    fn test_zero_line_width_is_rejected() {
        match NotationConfig::parse("[render]\nline_width = 0\n") {
            Err(ConfigError::InvalidLineWidth(0)) => {}
            other => panic!("Expected InvalidLineWidth, got {:?}", other),
        }
    }

    #[test]
    fn test_tag_names_outside_pgn_are_rejected() {
        match NotationConfig::parse("[tags]\n\"Time Control\" = \"40/7200\"\n") {
            Err(ConfigError::InvalidTagName(name)) => assert_eq!(name, "Time Control"),
            other => panic!("Expected InvalidTagName, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = NotationConfig::parse("[render\nline_width = 60");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_returns_default_when_file_does_not_exist() {
        let path = PathBuf::from("definitely-missing-chess-notation.toml");
        let config = NotationConfig::load(&path).unwrap();
        assert_eq!(config, NotationConfig::default());
    }

    #[test]
    fn test_default_path() {
        assert_eq!(
            NotationConfig::default_path(),
            PathBuf::from("chess-notation.toml")
        );
    }

    #[test]
    fn test_apply_tags() {
        let config = NotationConfig::parse("[tags]\nWhite = \"Morphy\"\nECO = \"C41\"\n").unwrap();
        let mut game = Game::new();
        config.apply_tags(&mut game).unwrap();

        assert_eq!(game.tag("White"), Some("Morphy"));
        assert_eq!(game.tag("ECO"), Some("C41"));
        assert_eq!(game.tag("Black"), Some("?"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = NotationConfig::default();
        config.render.line_width = 72;
        config.tags.insert("Site".to_string(), "Paris".to_string());

        let serialized = toml::to_string(&config).unwrap();
        let deserialized = NotationConfig::parse(&serialized).unwrap();

        assert_eq!(deserialized, config);
    }
}
