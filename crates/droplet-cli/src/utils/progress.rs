use dropletbuilder::engine::progress::{Phase, Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const SPINNER_TICK_MS: u64 = 80;

struct SpinnerState {
    bar: ProgressBar,
    current: Option<(Phase, Instant)>,
}

/// Renders build phases as a single reusable spinner on stderr.
///
/// Each finished phase leaves a check line with its wall time.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<SpinnerState>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::drawing_to(ProgressDrawTarget::stderr())
    }

    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::drawing_to(ProgressDrawTarget::hidden())
    }

    fn drawing_to(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::new_spinner().with_style(spinner_style());
        bar.set_draw_target(target);
        bar.finish_and_clear();
        Self {
            state: Arc::new(Mutex::new(SpinnerState { bar, current: None })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = Arc::clone(&self.state);

        Box::new(move |progress: Progress| {
            let Ok(mut state) = state.lock() else {
                warn!("Progress state mutex was poisoned; dropping update.");
                return;
            };
            state.apply(progress);
        })
    }
}

impl SpinnerState {
    fn apply(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { phase } => {
                self.current = Some((phase, Instant::now()));
                self.bar.reset();
                self.bar
                    .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                self.bar.set_message(format!("{}...", phase));
            }
            Progress::PhaseFinish { phase } => {
                let elapsed = match self.current.take() {
                    Some((started, at)) if started == phase => at.elapsed(),
                    _ => Duration::ZERO,
                };
                debug!(%phase, elapsed_ms = elapsed.as_millis() as u64, "Phase finished.");
                self.bar.disable_steady_tick();
                self.bar
                    .finish_with_message(format!("✓ {} ({:.2}s)", phase, elapsed.as_secs_f64()));
            }
            // Notes print above a live spinner; once idle they replace its line.
            Progress::Message(note) if self.bar.is_finished() => self.bar.set_message(note),
            Progress::Message(note) => self.bar.println(format!("  {}", note)),
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
