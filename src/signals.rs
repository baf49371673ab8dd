use log::trace;

///////////////////////////////////////////////////////////
// Consumed by the escape-time iterator
///////////////////////////////////////////////////////////

// Diagnostic hook for the iterator. Every method defaults to a no-op, and an
// observer can only watch: it gets plain f64 copies of the state and has no
// way to alter the iteration or its result.
pub trait IterationObserver {
    // Called after an update was applied at `step`.
    fn on_step(&mut self, _step: u32, _magnitude_squared: f64) {}

    // Called once, when |z|^2 first reaches the threshold.
    fn on_escape(&mut self, _step: u32, _magnitude_squared: f64) {}

    // Called once when the budget runs out without an escape.
    fn on_exhausted(&mut self, _max_iterations: u32) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl IterationObserver for NoopObserver {}

// Forwards every event to the log facade at trace level. Meant for development
// builds, a deep-zoom pixel can produce tens of thousands of lines.
#[derive(Clone, Debug, Default)]
pub struct LogObserver {
    pub label: String,
}

impl LogObserver {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl IterationObserver for LogObserver {
    fn on_step(&mut self, step: u32, magnitude_squared: f64) {
        trace!("[{}] step={} |z|^2={:e}", self.label, step, magnitude_squared);
    }

    fn on_escape(&mut self, step: u32, magnitude_squared: f64) {
        trace!("[{}] escaped after step={} |z|^2={:e}", self.label, step, magnitude_squared);
    }

    fn on_exhausted(&mut self, max_iterations: u32) {
        trace!("[{}] bounded for all {} iterations", self.label, max_iterations);
    }
}

///////////////////////////////////////////////////////////
// Produced by the Scene
///////////////////////////////////////////////////////////
#[derive(Clone, Debug)]
pub struct FrameDiagnostics {
    pub frame_id: u64,
    pub precision: crate::numerics::PrecisionMode,
    pub pixels: usize,
    pub escaped: usize,
    pub elapsed: std::time::Duration,
}
