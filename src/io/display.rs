use crate::ising::{SnapshotHook, SpinView};
use std::time::{Duration, Instant};
use tracing::{debug, info, Level};

/// Largest side length printed as a grid
pub const MAX_GRID_SIDE: usize = 41;

/// Live progress display driven by the render callback.
///
/// Renders closer together than `min_period` are dropped, so a fast run does
/// not flood the log.
#[derive(Debug, Clone)]
pub struct ProgressDisplay {
    total_steps: u64,
    min_period: Duration,
    last_render: Option<Instant>,
    rendered: usize,
}

impl ProgressDisplay {
    pub fn new(total_steps: u64) -> Self {
        Self {
            total_steps,
            min_period: Duration::ZERO,
            last_render: None,
            rendered: 0,
        }
    }

    pub fn with_min_period(mut self, min_period: Duration) -> Self {
        self.min_period = min_period;
        self
    }

    /// Number of renders actually shown
    pub fn rendered(&self) -> usize {
        self.rendered
    }
}

impl SnapshotHook for ProgressDisplay {
    fn render(&mut self, view: &SpinView<'_>) {
        let now = Instant::now();
        if let Some(last) = self.last_render {
            if now.duration_since(last) < self.min_period {
                return;
            }
        }
        self.last_render = Some(now);
        self.rendered += 1;

        info!(
            "Step {:>8}/{}: M = {:+.4}",
            view.step(),
            self.total_steps,
            view.magnetization()
        );
        if view.side() <= MAX_GRID_SIDE && tracing::enabled!(Level::DEBUG) {
            debug!("\n{}", format_grid(view));
        }
    }
}

/// Arrow picture of the grid, one line per row
pub fn format_grid(view: &SpinView<'_>) -> String {
    view.rows()
        .map(|row| {
            row.iter()
                .map(|&s| if s > 0 { '↑' } else { '↓' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
