use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "TISH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "tish.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Prompt template, `{cwd}` is replaced with the working directory.
    pub prompt: String,
    /// Run time limit for a single foreground process.
    pub timeout_secs: u64,
    /// Size of the line buffer; longer lines are cut to `max_line_len - 1` bytes.
    pub max_line_len: usize,
    /// Size of the argument table; at most `max_args - 1` tokens are kept.
    pub max_args: usize,
    pub log_dir: PathBuf,
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "{cwd}> ".into(),
            timeout_secs: 10,
            max_line_len: 1024,
            max_args: 128,
            log_dir: PathBuf::from("."),
            log_file: "tish.log".into(),
        }
    }
}

impl Config {
    /// Loads the file named by `TISH_CONFIG`, falling back to `tish.toml` in
    /// the working directory. A missing default file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;

        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.max_args < 2 {
            return Err(ConfigError::Invalid("max_args must be at least 2"));
        }
        if self.max_line_len < 2 {
            return Err(ConfigError::Invalid("max_line_len must be at least 2"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive"));
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn render_prompt(&self, cwd: &Path) -> String {
        self.prompt.replace("{cwd}", &cwd.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_classic_limits() {
        let config = Config::default();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.max_args, 128);
        assert_eq!(config.max_line_len, 1024);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = 3\nprompt = \"$ \"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.max_args, 128);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "colour = true").unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = 0").unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn prompt_substitutes_cwd() {
        let config = Config::default();
        assert_eq!(config.render_prompt(Path::new("/tmp")), "/tmp> ");
    }
}
