use std::time::Duration;

use thiserror::Error;

use crate::stats::StatsError;

/// Fatal conditions that abort a benchmark.
///
/// Failed probe attempts never show up here: they only mean the server is not
/// ready yet and the runner retries them.
#[derive(Error, Debug)]
pub enum BootError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to start {executable}: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server did not answer within {waited:?}")]
    Timeout { waited: Duration },

    #[error("failed to stop server process: {0}")]
    Teardown(#[source] std::io::Error),

    #[error("statistics error: {0}")]
    Stats(#[from] StatsError),
}

impl BootError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootError::Config(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BootError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_exit_with_two() {
        assert_eq!(BootError::config("missing executable").exit_code(), 2);
        assert_eq!(
            BootError::Timeout { waited: Duration::from_secs(1) }.exit_code(),
            1
        );
    }

    #[test]
    fn spawn_message_carries_the_io_error() {
        let err = BootError::Spawn {
            executable: "/opt/server".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let message = err.to_string();
        assert_eq!(message, "failed to start /opt/server: no such file");
        assert_eq!(message.matches("no such file").count(), 1);
    }

    #[test]
    fn stats_errors_convert() {
        let err: BootError = StatsError::Empty.into();
        assert!(matches!(err, BootError::Stats(StatsError::Empty)));
        assert!(err.to_string().contains("statistics error"));
    }
}
