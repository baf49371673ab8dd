use super::numerics::{ComplexCoord, Real};
use super::signals::{IterationObserver, NoopObserver};

use std::cmp::Ordering;
use std::f64::consts::LN_2;

/// How the iterator treats a point once |z|^2 reaches the threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExitPolicy {
    /// Stop at the first escape and report a smoothed, fractional escape time.
    #[default]
    EarlyExit,
    /// Always run the whole budget, freezing z once it escapes. Mirrors a
    /// shader loop of fixed length with no data dependent branching out.
    FixedBudget,
}

/// Outcome of one escape-time evaluation.
///
/// `step` is always the index of the last update applied while |z|^2 was
/// still below the threshold, so a point escaping on its first update
/// (c = 2 with radius 2) reports step 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IterationResult {
    /// Early exit: escaped, with `smooth = step + 1 - log2(ln |z|)`.
    Escaped { step: u32, smooth: f64 },
    /// Fixed budget: the last step applied before escaping, or
    /// `max_iterations - 1` if the point never escaped.
    LastSafeStep(u32),
    /// Early exit: never escaped within the budget.
    Bounded,
}

impl IterationResult {
    // Flattens the result for a color mapper. Bounded maps to
    // max_iterations - 1, the same value the fixed budget policy reports for
    // a point that never escapes.
    pub fn value(&self, max_iterations: u32) -> f64 {
        match *self {
            IterationResult::Escaped { smooth, .. } => smooth,
            IterationResult::LastSafeStep(step) => step as f64,
            IterationResult::Bounded => max_iterations.saturating_sub(1) as f64,
        }
    }

    pub fn step(&self, max_iterations: u32) -> u32 {
        match *self {
            IterationResult::Escaped { step, .. } | IterationResult::LastSafeStep(step) => step,
            IterationResult::Bounded => max_iterations.saturating_sub(1),
        }
    }

    // A fixed budget result cannot tell an escape on the very last step apart
    // from a point that never escaped, both are reported as not escaped here.
    pub fn has_escaped(&self, max_iterations: u32) -> bool {
        match *self {
            IterationResult::Escaped { .. } => true,
            IterationResult::LastSafeStep(step) => step + 1 < max_iterations,
            IterationResult::Bounded => false,
        }
    }
}

/// Runs z <- z^2 + c from z = 0 for at most `max_iterations` steps.
///
/// `escape_radius_squared` is the threshold on |z|^2, in the same
/// representation as `c`. The computation is pure; callers are free to run
/// any number of points concurrently.
pub fn iterate<R: Real>(
    c: ComplexCoord<R>,
    max_iterations: u32,
    escape_radius_squared: R,
    policy: ExitPolicy,
) -> IterationResult {
    iterate_observed(c, max_iterations, escape_radius_squared, policy, &mut NoopObserver)
}

/// [`iterate`] with a diagnostics observer attached. The observer sees every
/// step but cannot influence the result.
pub fn iterate_observed<R: Real, O: IterationObserver + ?Sized>(
    c: ComplexCoord<R>,
    max_iterations: u32,
    escape_radius_squared: R,
    policy: ExitPolicy,
    observer: &mut O,
) -> IterationResult {
    match policy {
        ExitPolicy::EarlyExit => early_exit(c, max_iterations, escape_radius_squared, observer),
        ExitPolicy::FixedBudget => fixed_budget(c, max_iterations, escape_radius_squared, observer),
    }
}

fn early_exit<R: Real, O: IterationObserver + ?Sized>(
    c: ComplexCoord<R>,
    max_iterations: u32,
    threshold: R,
    observer: &mut O,
) -> IterationResult {
    let mut zx = R::from_scalar(0.0);
    let mut zy = R::from_scalar(0.0);
    let mut step = 0;

    for i in 0..max_iterations {
        let zx2 = zx.mul(zx);
        let zy2 = zy.mul(zy);
        let mag2 = zx2.add(zy2);

        if mag2.compare(&threshold) != Ordering::Less {
            observer.on_escape(step, mag2.to_f64());
            let smooth = smooth_escape_time(step, ComplexCoord::new(zx, zy).norm_f64());
            return IterationResult::Escaped { step, smooth };
        }

        let xt = zx.mul(zy);
        zx = zx2.sub(zy2).add(c.re);
        zy = xt.add(xt).add(c.im);
        step = i;
        observer.on_step(step, mag2.to_f64());
    }

    observer.on_exhausted(max_iterations);
    IterationResult::Bounded
}

fn fixed_budget<R: Real, O: IterationObserver + ?Sized>(
    c: ComplexCoord<R>,
    max_iterations: u32,
    threshold: R,
    observer: &mut O,
) -> IterationResult {
    let mut zx = R::from_scalar(0.0);
    let mut zy = R::from_scalar(0.0);
    let mut step = 0;
    let mut escaped = false;

    for i in 0..max_iterations {
        let zx2 = zx.mul(zx);
        let zy2 = zy.mul(zy);
        let mag2 = zx2.add(zy2);

        // A frozen z keeps failing this test, so once escaped nothing moves
        if mag2.compare(&threshold) == Ordering::Less {
            let xt = zx.mul(zy);
            zx = zx2.sub(zy2).add(c.re);
            zy = xt.add(xt).add(c.im);
            step = i;
            observer.on_step(step, mag2.to_f64());
        } else if !escaped {
            escaped = true;
            observer.on_escape(step, mag2.to_f64());
        }
    }

    if !escaped {
        observer.on_exhausted(max_iterations);
    }
    IterationResult::LastSafeStep(step)
}

// Continuous escape time. Undefined for |z| <= 1, which only happens when the
// threshold itself is at or below 1; the plain step is returned then.
fn smooth_escape_time(step: u32, norm: f64) -> f64 {
    if norm > 1.0 {
        step as f64 + 1.0 - norm.ln().ln() / LN_2
    } else {
        step as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerics::{Df, Qf};

    const THRESHOLD: f64 = 4.0;

    fn run<R: Real>(re: f64, im: f64, max_iterations: u32, policy: ExitPolicy) -> IterationResult {
        iterate(ComplexCoord::<R>::from_f64(re, im), max_iterations, R::from_f64(THRESHOLD), policy)
    }

    fn for_all_representations(check: impl Fn(&dyn Fn(f64, f64, u32, ExitPolicy) -> IterationResult)) {
        check(&run::<f32>);
        check(&run::<f64>);
        check(&run::<Df>);
        check(&run::<Qf>);
    }

    #[test]
    fn origin_never_escapes() {
        for_all_representations(|run| {
            assert_eq!(run(0.0, 0.0, 100, ExitPolicy::EarlyExit), IterationResult::Bounded);
            assert_eq!(run(0.0, 0.0, 100, ExitPolicy::FixedBudget), IterationResult::LastSafeStep(99));
        });
    }

    #[test]
    fn two_escapes_at_step_zero() {
        let expected_smooth = 1.0 - 2f64.ln().ln() / LN_2;
        for_all_representations(|run| {
            match run(2.0, 0.0, 100, ExitPolicy::EarlyExit) {
                IterationResult::Escaped { step, smooth } => {
                    assert_eq!(step, 0);
                    assert!((smooth - expected_smooth).abs() < 1e-12);
                }
                other => panic!("c = 2 did not escape: {:?}", other),
            }
            assert_eq!(run(2.0, 0.0, 100, ExitPolicy::FixedBudget), IterationResult::LastSafeStep(0));
        });
    }

    #[test]
    fn minus_one_is_a_two_cycle() {
        for_all_representations(|run| {
            assert_eq!(run(-1.0, 0.0, 1000, ExitPolicy::EarlyExit), IterationResult::Bounded);
            assert_eq!(run(-1.0, 0.0, 1000, ExitPolicy::FixedBudget), IterationResult::LastSafeStep(999));
        });
    }

    #[test]
    fn policies_agree_on_escape_step() {
        for_all_representations(|run| {
            let early = run(-0.75, 0.1, 500, ExitPolicy::EarlyExit);
            let fixed = run(-0.75, 0.1, 500, ExitPolicy::FixedBudget);
            assert!(early.has_escaped(500));
            assert!(fixed.has_escaped(500));
            assert_eq!(early.step(500), fixed.step(500));
            // The smooth value lies within one step of the integer one
            let v = early.value(500);
            assert!(v >= early.step(500) as f64 && v <= early.step(500) as f64 + 2.0);
        });
    }

    #[test]
    fn zero_budget() {
        assert_eq!(run::<Df>(0.0, 0.0, 0, ExitPolicy::EarlyExit), IterationResult::Bounded);
        assert_eq!(run::<Df>(0.0, 0.0, 0, ExitPolicy::FixedBudget), IterationResult::LastSafeStep(0));
    }

    #[test]
    fn nan_coordinate_escapes_instead_of_hanging() {
        let result = run::<Qf>(f64::NAN, 0.0, 50, ExitPolicy::EarlyExit);
        assert!(matches!(result, IterationResult::Escaped { step: 0, .. }));
    }

    #[test]
    fn bounded_flattens_like_fixed_budget() {
        assert_eq!(IterationResult::Bounded.value(256), 255.0);
        assert_eq!(IterationResult::LastSafeStep(255).value(256), 255.0);
        assert!(!IterationResult::LastSafeStep(255).has_escaped(256));
    }

    #[derive(Default)]
    struct Recorder {
        steps: u32,
        escapes: Vec<u32>,
        exhausted: u32,
    }

    impl IterationObserver for Recorder {
        fn on_step(&mut self, _step: u32, _magnitude_squared: f64) {
            self.steps += 1;
        }

        fn on_escape(&mut self, step: u32, _magnitude_squared: f64) {
            self.escapes.push(step);
        }

        fn on_exhausted(&mut self, _max_iterations: u32) {
            self.exhausted += 1;
        }
    }

    #[test]
    fn observer_sees_events_without_changing_result() {
        let c = ComplexCoord::<Df>::from_f64(2.0, 0.0);
        let t = Df::from_scalar(4.0);

        let mut recorder = Recorder::default();
        let observed = iterate_observed(c, 10, t, ExitPolicy::FixedBudget, &mut recorder);
        assert_eq!(observed, iterate(c, 10, t, ExitPolicy::FixedBudget));
        assert_eq!(recorder.steps, 1);
        assert_eq!(recorder.escapes, vec![0]);
        assert_eq!(recorder.exhausted, 0);

        let mut recorder = Recorder::default();
        let origin = ComplexCoord::<Df>::from_f64(0.0, 0.0);
        iterate_observed(origin, 10, t, ExitPolicy::EarlyExit, &mut recorder);
        assert_eq!(recorder.steps, 10);
        assert!(recorder.escapes.is_empty());
        assert_eq!(recorder.exhausted, 1);
    }
}
