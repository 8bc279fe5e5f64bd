use std::fmt;

/// The stages of a droplet build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Substrate,
    Fill,
    Carve,
    Assemble,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Substrate, Phase::Fill, Phase::Carve, Phase::Assemble];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Substrate => "Building substrate",
            Phase::Fill => "Filling sphere",
            Phase::Carve => "Carving cap",
            Phase::Assemble => "Assembling system",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { phase: Phase },
    PhaseFinish { phase: Phase },
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    pub fn message(&self, text: impl Into<String>) {
        self.report(Progress::Message(text.into()));
    }

    /// Runs `work` between a start and a finish event for `phase`. The finish
    /// event is sent whether or not `work` succeeds.
    pub fn phase<T>(&self, phase: Phase, work: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { phase });
        let result = work();
        self.report(Progress::PhaseFinish { phase });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn phase_wraps_work_in_start_and_finish_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let reporter =
            ProgressReporter::with_callback(Box::new(move |e| sink.lock().unwrap().push(e)));

        let value = reporter.phase(Phase::Carve, || {
            reporter.message("inside");
            42
        });

        assert_eq!(value, 42);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Progress::PhaseStart {
                    phase: Phase::Carve
                },
                Progress::Message("inside".into()),
                Progress::PhaseFinish {
                    phase: Phase::Carve
                },
            ]
        );
    }

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        assert_eq!(reporter.phase(Phase::Fill, || "done"), "done");
    }
}
