//! Phase timing.

use std::time::Instant;
use tracing::info;

/// Measures how long a phase (clone, build, generation) takes.
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    /// Log the elapsed time.
    pub fn finish(self) {
        info!("{}", format_elapsed(&self.name, self.start.elapsed().as_secs_f64()));
    }
}

fn format_elapsed(name: &str, secs: f64) -> String {
    if secs >= 60.0 {
        format!("[{:.1}m] {}", secs / 60.0, name)
    } else {
        format!("[{:.1}s] {}", secs, name)
    }
}
