use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::{BootError, Result};
use crate::prober::ConnectionMode;
use crate::util::{http_url, tcp_address};

pub const DEFAULT_DRY_RUNS: u32 = 2;
pub const DEFAULT_RUNS: u32 = 20;
pub const DEFAULT_PAUSE_SECS: u64 = 10;
pub const DEFAULT_TARGET: &str = "http://localhost:8080/";

/// Settings as they appear in a `--config` JSON file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub mode: Option<ConnectionMode>,
    pub dry_runs: Option<u32>,
    pub runs: Option<u32>,
    pub pause_secs: Option<u64>,
    pub target: Option<String>,
    pub executable: Option<String>,
    pub args: Option<Vec<String>>,
    pub max_wait_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn load(file_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(file_path).map_err(|e| {
            BootError::config(format!("cannot read {}: {e}", file_path.display()))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| BootError::config(format!("invalid {}: {e}", file_path.display())))
    }
}

/// Everything a benchmark needs, assembled once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub mode: ConnectionMode,
    pub dry_runs: u32,
    pub runs: u32,
    pub pause: Duration,
    pub target: String,
    pub executable: String,
    pub args: Vec<String>,
    /// `None` polls forever.
    pub max_wait: Option<Duration>,
    pub log_level: String,
    pub color: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl BenchConfig {
    /// Merges command line (and environment) over the optional config file over defaults.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    pub fn merge(cli: Cli, file: FileConfig) -> Result<Self> {
        let mode = match cli.mode {
            Some(mode) => mode.parse()?,
            None => file.mode.unwrap_or_default(),
        };
        let executable = cli
            .executable
            .or(file.executable)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| BootError::config("an executable must be specified"))?;
        let args = if cli.args.is_empty() {
            file.args.unwrap_or_default()
        } else {
            cli.args
        };

        let config = Self {
            mode,
            dry_runs: cli.dry_runs.or(file.dry_runs).unwrap_or(DEFAULT_DRY_RUNS),
            runs: cli.runs.or(file.runs).unwrap_or(DEFAULT_RUNS),
            pause: Duration::from_secs(
                cli.pause.or(file.pause_secs).unwrap_or(DEFAULT_PAUSE_SECS),
            ),
            target: cli
                .target
                .or(file.target)
                .unwrap_or_else(|| DEFAULT_TARGET.to_string()),
            executable,
            args,
            max_wait: cli.max_wait.or(file.max_wait_secs).map(Duration::from_secs),
            log_level: cli
                .log_level
                .or(file.log_level)
                .unwrap_or_else(default_log_level),
            color: !cli.no_color,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(BootError::config("at least one counted run is required"));
        }
        match self.mode {
            ConnectionMode::TcpConnect => tcp_address(&self.target).map(|_| ())?,
            ConnectionMode::HttpGet => http_url(&self.target).map(|_| ())?,
        }
        self.validate_log_level()
    }

    /// Get the log level as a tracing::Level
    pub fn get_tracing_level(&self) -> Result<tracing::Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(tracing::Level::TRACE),
            "debug" => Ok(tracing::Level::DEBUG),
            "info" => Ok(tracing::Level::INFO),
            "warn" | "warning" => Ok(tracing::Level::WARN),
            "error" => Ok(tracing::Level::ERROR),
            _ => Err(BootError::config(format!(
                "invalid log level: {}. Valid levels are: trace, debug, info, warn, error",
                self.log_level
            ))),
        }
    }

    pub fn validate_log_level(&self) -> Result<()> {
        self.get_tracing_level().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli_with_executable() -> Cli {
        Cli {
            executable: Some("/bin/true".into()),
            ..Cli::default()
        }
    }

    #[test]
    fn defaults() {
        let config = BenchConfig::merge(cli_with_executable(), FileConfig::default()).unwrap();
        assert_eq!(config.mode, ConnectionMode::HttpGet);
        assert_eq!(config.dry_runs, 2);
        assert_eq!(config.runs, 20);
        assert_eq!(config.pause, Duration::from_secs(10));
        assert_eq!(config.target, "http://localhost:8080/");
        assert_eq!(config.max_wait, None);
        assert_eq!(config.get_tracing_level().unwrap(), tracing::Level::WARN);
        assert!(config.color);
    }

    #[test]
    fn missing_executable() {
        let err = BenchConfig::merge(Cli::default(), FileConfig::default()).unwrap_err();
        assert!(matches!(err, BootError::Config(_)));

        let cli = Cli {
            executable: Some(String::new()),
            ..Cli::default()
        };
        assert!(BenchConfig::merge(cli, FileConfig::default()).is_err());
    }

    #[test]
    fn unknown_mode() {
        let cli = Cli {
            mode: Some("ping".into()),
            ..cli_with_executable()
        };
        let err = BenchConfig::merge(cli, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("unknown mode"));
    }

    #[test]
    fn zero_runs_rejected() {
        let cli = Cli {
            runs: Some(0),
            ..cli_with_executable()
        };
        assert!(matches!(
            BenchConfig::merge(cli, FileConfig::default()),
            Err(BootError::Config(_))
        ));
    }

    #[test]
    fn bad_log_level_rejected() {
        let cli = Cli {
            log_level: Some("loud".into()),
            ..cli_with_executable()
        };
        assert!(BenchConfig::merge(cli, FileConfig::default()).is_err());
    }

    #[test]
    fn cli_overrides_file() {
        let file = FileConfig {
            mode: Some(ConnectionMode::TcpConnect),
            runs: Some(5),
            pause_secs: Some(0),
            target: Some("127.0.0.1:9000".into()),
            executable: Some("server".into()),
            args: Some(vec!["--port".into(), "9000".into()]),
            max_wait_secs: Some(30),
            ..FileConfig::default()
        };
        let cli = Cli {
            runs: Some(3),
            ..Cli::default()
        };
        let config = BenchConfig::merge(cli, file).unwrap();
        assert_eq!(config.mode, ConnectionMode::TcpConnect);
        assert_eq!(config.runs, 3);
        assert_eq!(config.pause, Duration::ZERO);
        assert_eq!(config.executable, "server");
        assert_eq!(config.args, vec!["--port", "9000"]);
        assert_eq!(config.max_wait, Some(Duration::from_secs(30)));
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"mode": "tcp-connect", "executable": "redis-server", "dry_runs": 0}}"#
        )
        .unwrap();

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..Cli::default()
        };
        let config = BenchConfig::from_cli(cli).unwrap();
        assert_eq!(config.mode, ConnectionMode::TcpConnect);
        assert_eq!(config.executable, "redis-server");
        assert_eq!(config.dry_runs, 0);
    }

    #[test]
    fn rejects_unknown_file_keys_and_modes() {
        for body in [r#"{"mode": "icmp"}"#, r#"{"retries": 3}"#] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(body.as_bytes()).unwrap();
            assert!(matches!(
                FileConfig::load(file.path()),
                Err(BootError::Config(_))
            ));
        }
    }

    #[test]
    fn missing_file() {
        let cli = Cli {
            config: Some("/nonexistent/time-to-boot.json".into()),
            ..cli_with_executable()
        };
        assert!(matches!(BenchConfig::from_cli(cli), Err(BootError::Config(_))));
    }
}
