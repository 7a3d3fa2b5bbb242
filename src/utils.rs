use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use ureq::{Agent, AgentBuilder};

pub fn agent(timeout: Duration) -> Agent {
    AgentBuilder::new()
        .user_agent(concat!("ecopoi/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
}

/// Ticks on stderr until finished, so stdout stays clean for the report.
pub fn spinner(message: &'static str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]").expect("hardcoded");
    let progress = ProgressBar::new_spinner()
        .with_style(style)
        .with_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
