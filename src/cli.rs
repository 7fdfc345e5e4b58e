use std::path::PathBuf;

use clap::Parser;

/// Measure the time a server takes to boot and answer its first connection.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "time-to-boot")]
#[command(version, about, long_about = None)]
#[command(after_help = "Use -- to pass flags to the executable, as in:\n  \
    time-to-boot --executable python3 -- -m http.server 8080")]
pub struct Cli {
    /// Connection check: http-get or tcp-connect
    #[arg(long, env = "TTB_MODE")]
    pub mode: Option<String>,

    /// Warm-up runs excluded from the statistics
    #[arg(long, env = "TTB_DRY_RUNS")]
    pub dry_runs: Option<u32>,

    /// Counted runs
    #[arg(long, env = "TTB_RUNS")]
    pub runs: Option<u32>,

    /// Pause between runs, in seconds
    #[arg(long, env = "TTB_PAUSE")]
    pub pause: Option<u64>,

    /// Connection target, a URL or host:port
    #[arg(long, env = "TTB_TARGET")]
    pub target: Option<String>,

    /// Server executable to launch
    #[arg(long, env = "TTB_EXECUTABLE")]
    pub executable: Option<String>,

    /// Give up on a run after this many seconds (default: wait forever)
    #[arg(long, env = "TTB_MAX_WAIT")]
    pub max_wait: Option<u64>,

    /// JSON file with default settings
    #[arg(long, env = "TTB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Diagnostic log level: trace, debug, info, warn, error
    #[arg(long, env = "TTB_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Disable colored output
    #[arg(long, env = "TTB_NO_COLOR")]
    pub no_color: bool,

    /// Arguments passed verbatim to the executable
    #[arg(last = true)]
    pub args: Vec<String>,
}
