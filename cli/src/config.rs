use std::path::{Path, PathBuf};

use director::Options;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings read from a `--config` TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Sandbox directory, relative to `base_dir` unless absolute.
    #[serde(default)]
    pub sandbox: Option<PathBuf>,

    /// Keep the sandbox after apply.
    #[serde(default)]
    pub keep: Option<bool>,

    /// Directory script paths are resolved against.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Values given on the command line; any that are set win over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub sandbox: Option<PathBuf>,
    pub keep: bool,
}

pub fn resolve(file: FileConfig, overrides: Overrides) -> Options {
    let defaults = Options::default();
    Options {
        base_dir: file.base_dir.unwrap_or(defaults.base_dir),
        sandbox_dir: overrides
            .sandbox
            .or(file.sandbox)
            .unwrap_or(defaults.sandbox_dir),
        keep: overrides.keep || file.keep.unwrap_or(defaults.keep),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use director::DEFAULT_SANDBOX_DIR;

    #[test]
    fn empty_config_gives_defaults() {
        let options = resolve(FileConfig::parse("").unwrap(), Overrides::default());
        assert_eq!(options.base_dir, PathBuf::from("."));
        assert_eq!(options.sandbox_dir, PathBuf::from(DEFAULT_SANDBOX_DIR));
        assert!(!options.keep);
    }

    #[test]
    fn file_values_apply() {
        let file = FileConfig::parse("sandbox = \"stage\"\nkeep = true\nbase_dir = \"work\"\n")
            .unwrap();
        let options = resolve(file, Overrides::default());
        assert_eq!(options.base_dir, PathBuf::from("work"));
        assert_eq!(options.sandbox_dir, PathBuf::from("stage"));
        assert!(options.keep);
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig::parse("sandbox = \"stage\"\n").unwrap();
        let options = resolve(
            file,
            Overrides {
                sandbox: Some(PathBuf::from("other")),
                keep: true,
            },
        );
        assert_eq!(options.sandbox_dir, PathBuf::from("other"));
        assert!(options.keep);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("sandbx = \"typo\"\n").is_err());
    }
}
