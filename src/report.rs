//! Console report: dry runs in cyan, counted runs in green, statistics in yellow.

use std::time::Duration;

use colored::Colorize;

use crate::runner::{Phase, RunEvent};
use crate::stats::Summary;

pub fn print_event(event: &RunEvent) {
    match event {
        RunEvent::PhaseStarted(Phase::DryRun) => println!("{}", "Dry runs".cyan()),
        RunEvent::PhaseStarted(Phase::Counted) => println!("{}", "Runs".green()),
        RunEvent::Measured {
            phase,
            index,
            measurement,
        } => {
            tracing::debug!(index, attempts = measurement.attempts, "{:?} measured", phase);
            let line = format!("  - {:?}", measurement.elapsed);
            match phase {
                Phase::DryRun => println!("{}", line.cyan()),
                Phase::Counted => println!("{}", line.green()),
            }
        }
    }
}

pub fn print_summary(summary: &Summary) {
    for line in summary_lines(summary) {
        println!("{}", line.yellow());
    }
}

pub fn summary_lines(summary: &Summary) -> Vec<String> {
    let mut lines = vec![
        format!("Min: {:?}", summary.min),
        format!("Max: {:?}", summary.max),
        format!("Median: {:?} (std dev {:?})", summary.median, summary.std_dev),
        "Outliers:".to_string(),
        format!("  - mild: {}", format_durations(&summary.outliers.mild)),
        format!("  - extreme: {}", format_durations(&summary.outliers.extreme)),
        "Percentiles:".to_string(),
    ];
    lines.extend(
        summary
            .percentiles
            .iter()
            .map(|(p, value)| format!("  - {p}%: {value:?}")),
    );
    lines
}

fn format_durations(durations: &[Duration]) -> String {
    let items: Vec<String> = durations.iter().map(|d| format!("{d:?}")).collect();
    format!("[{}]", items.join(", "))
}
