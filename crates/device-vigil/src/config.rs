use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Rules file; relative paths and the default resolve against the
    /// executable's directory.
    #[serde(default)]
    pub rules_file: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default-value functions used by serde
// ---------------------------------------------------------------------------

pub const DEFAULT_RULES_FILE: &str = "rules.yaml";

fn default_log_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "device-vigil".to_string()
}

impl Config {
    /// Absolute location of the rules file.
    pub fn rules_path(&self, base_dir: &Path) -> PathBuf {
        let file = self
            .rules_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RULES_FILE));
        base_dir.join(file)
    }

    /// Apply a rules path given on the command line. Relative paths are
    /// taken from the current directory, not the executable's.
    pub fn override_rules_file(&mut self, path: &Path, cwd: &Path) {
        self.rules_file = Some(cwd.join(path));
    }

    pub fn log_directory(&self, base_dir: &Path) -> PathBuf {
        match &self.logging.directory {
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        }
    }
}

impl LoggingConfig {
    /// Name of today's log file, e.g. `device-vigil-20260115.log`.
    pub fn file_name(&self, date: chrono::NaiveDate) -> String {
        format!("{}-{}.log", self.file_prefix, date.format("%Y%m%d"))
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Load configuration from a YAML file.
///
/// If the file does not exist a default configuration is returned and a
/// warning is emitted, so the service can run with only a rules file next to
/// the executable.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "configuration file not found; using defaults"
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

    let config: Config = serde_yml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load(Path::new("/does/not/exist/device-vigil.yaml")).unwrap();
        assert!(cfg.rules_file.is_none());
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.file_prefix, "device-vigil");
    }

    #[test]
    fn load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  level: debug").unwrap();

        let cfg = load(file.path()).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.logging.directory.is_none());
        assert!(cfg.rules_file.is_none());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "logging: [").unwrap();

        let err = load(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn paths_resolve_against_base_dir() {
        let base = Path::new("/opt/vigil");
        let cfg = Config::default();
        assert_eq!(cfg.rules_path(base), PathBuf::from("/opt/vigil/rules.yaml"));
        assert_eq!(cfg.log_directory(base), PathBuf::from("/opt/vigil"));

        let cfg = Config {
            rules_file: Some(PathBuf::from("/etc/vigil/rules.yaml")),
            logging: LoggingConfig {
                directory: Some(PathBuf::from("logs")),
                ..LoggingConfig::default()
            },
        };
        assert_eq!(cfg.rules_path(base), PathBuf::from("/etc/vigil/rules.yaml"));
        assert_eq!(cfg.log_directory(base), PathBuf::from("/opt/vigil/logs"));
    }

    #[test]
    fn command_line_rules_path_uses_current_dir() {
        let base = Path::new("/opt/vigil");
        let cwd = Path::new("/home/operator/work");

        let mut cfg = Config::default();
        cfg.override_rules_file(Path::new("./rules.yaml"), cwd);
        assert_eq!(
            cfg.rules_path(base),
            PathBuf::from("/home/operator/work/./rules.yaml")
        );

        cfg.override_rules_file(Path::new("/etc/vigil/rules.yaml"), cwd);
        assert_eq!(cfg.rules_path(base), PathBuf::from("/etc/vigil/rules.yaml"));
    }

    #[test]
    fn dated_log_file_name() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(
            LoggingConfig::default().file_name(date),
            "device-vigil-20260115.log"
        );
    }
}
