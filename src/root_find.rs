//! Generalized nonlinear root finding.
//!
//! Both solvers find `x` such that `f(x) == y`. The derivative is never
//! supplied by the caller; it is estimated with a central finite
//! difference so that any transcendental forward equation can be inverted
//! without hand-derived derivatives.
//!
//! - [`root_find`]: open Newton–Raphson from a single guess. When the
//!   iteration does not settle it is restarted from a fixed set of
//!   guesses spread around the original one.
//! - [`root_find_bracketed`]: safeguarded Newton/bisection hybrid that
//!   keeps the root inside `[xl, xh]` at every step.

use approx::ulps_eq;

use crate::error::RootFindError;

/// Newton iterations per starting guess.
const MAX_NEWTON_ITERATIONS: usize = 20;

/// Number of alternate starting guesses tried after the first one fails.
const MAX_GUESS_ATTEMPTS: usize = 10;

/// Times a step is reduced at the edge of the domain of `f` before
/// giving up.
const MAX_STEP_HALVINGS: usize = 60;

/// Step reduction factor near the edge of the domain of `f`.
const DOMAIN_SHRINK: f64 = 8.0;

/// Iteration cap for the bracketed solver.
const MAX_BRACKET_ITERATIONS: usize = 100;

/// Successive iterates closer than this many ulps are considered equal.
const CONVERGED_ULPS: u32 = 2;

/// Central-difference estimate of `f'(x)`.
///
/// The step starts from twice machine epsilon (cube root, which balances
/// truncation against rounding error for a central difference) and grows
/// with `|x|` once `|x| >= 1`. Near the edge of the domain of `f`, where
/// either side evaluates to a non-finite value, the step shrinks until
/// both sides are finite and then once more, so that the difference does
/// not straddle the singularity. `NaN` if no such step exists.
pub fn derivative<F>(f: &F, x: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    let mut h = (2.0 * f64::EPSILON).cbrt();
    if x.abs() >= 1.0 {
        h *= x.abs();
    }

    let mut shrunk = false;
    for _ in 0..MAX_STEP_HALVINGS {
        // Make h exactly representable relative to x.
        let xh = x + h;
        let xl = x - h;
        if xh == xl {
            break;
        }

        let (fh, fl) = (f(xh), f(xl));
        if fh.is_finite() && fl.is_finite() {
            if !shrunk {
                return (fh - fl) / (xh - xl);
            }
            let (xh, xl) = (x + h / DOMAIN_SHRINK, x - h / DOMAIN_SHRINK);
            return (f(xh) - f(xl)) / (xh - xl);
        }

        h /= DOMAIN_SHRINK;
        shrunk = true;
    }

    f64::NAN
}

fn converged(a: f64, b: f64) -> bool {
    ulps_eq!(a, b, epsilon = f64::EPSILON, max_ulps = CONVERGED_ULPS)
}

/// Plain Newton–Raphson from `x0`. `None` if it fails to settle.
///
/// A step that lands where `f` is not finite is halved back toward the
/// current iterate.
fn newton<F>(y: f64, x0: f64, f: &F) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let mut x = x0;
    let mut fx = f(x);
    if !fx.is_finite() {
        return None;
    }

    for _ in 0..MAX_NEWTON_ITERATIONS {
        let residual = fx - y;
        if residual.abs() <= CONVERGED_ULPS as f64 * f64::EPSILON * y.abs() {
            return Some(x);
        }

        let df = derivative(f, x);
        if df == 0.0 || !df.is_finite() {
            return None;
        }

        let mut step = residual / df;
        let mut next = x - step;
        let mut f_next = f(next);
        let mut halvings = 0;
        while !f_next.is_finite() {
            if halvings == MAX_STEP_HALVINGS || !next.is_finite() {
                return None;
            }
            step *= 0.5;
            next = x - step;
            f_next = f(next);
            halvings += 1;
        }

        if converged(x, next) {
            return Some(next);
        }

        x = next;
        fx = f_next;
    }

    None
}

/// Find `x` with `f(x) == y`, starting the search at `x0`.
///
/// If Newton–Raphson does not converge from `x0`, the search is restarted
/// from evenly spaced guesses across `[x0 - 2|x0|, x0 + 2|x0|]` (or
/// `[-1, 1]` when `x0` is zero).
pub fn root_find<F>(y: f64, x0: f64, f: F) -> Result<f64, RootFindError>
where
    F: Fn(f64) -> f64,
{
    if let Some(x) = newton(y, x0, &f) {
        return Ok(x);
    }

    let half_width = if x0 == 0.0 { 1.0 } else { 2.0 * x0.abs() };
    let lo = x0 - half_width;
    let step = 2.0 * half_width / (MAX_GUESS_ATTEMPTS - 1) as f64;

    for i in 0..MAX_GUESS_ATTEMPTS {
        let guess = lo + step * i as f64;
        if let Some(x) = newton(y, guess, &f) {
            tracing::debug!(x0, guess, "root found from alternate starting guess");
            return Ok(x);
        }
    }

    Err(RootFindError::Diverging {
        iterations: MAX_NEWTON_ITERATIONS * (MAX_GUESS_ATTEMPTS + 1),
    })
}

/// Find `x` in `[xl, xh]` with `f(x) == y`.
///
/// `f(xl) - y` and `f(xh) - y` must have opposite signs (or one of them
/// must already be zero). Newton steps are taken only while they stay
/// inside the current bracket and reduce the residual quickly enough;
/// otherwise the bracket is bisected.
pub fn root_find_bracketed<F>(y: f64, xl: f64, xh: f64, f: F) -> Result<f64, RootFindError>
where
    F: Fn(f64) -> f64,
{
    let f_xl = f(xl);
    let f_xh = f(xh);

    if ulps_eq!(f_xl, y, max_ulps = CONVERGED_ULPS) {
        return Ok(xl);
    }
    if ulps_eq!(f_xh, y, max_ulps = CONVERGED_ULPS) {
        return Ok(xh);
    }

    let fl = f_xl - y;
    let fh = f_xh - y;
    if (fl > 0.0 && fh > 0.0) || (fl < 0.0 && fh < 0.0) || fl.is_nan() || fh.is_nan() {
        return Err(RootFindError::UnsuitableBrackets {
            y,
            fl: f_xl,
            fh: f_xh,
        });
    }

    // Orient so that the residual is negative at `lo`.
    let (mut lo, mut hi) = if fl < 0.0 { (xl, xh) } else { (xh, xl) };

    let mut x = 0.5 * (xl + xh);
    let mut dx_old = (xh - xl).abs();
    let mut dx = dx_old;
    let mut residual = f(x) - y;
    let mut df = derivative(&f, x);

    for _ in 0..MAX_BRACKET_ITERATIONS {
        let newton_leaves_bracket = ((x - hi) * df - residual) * ((x - lo) * df - residual) > 0.0;
        let newton_too_slow = (2.0 * residual).abs() > (dx_old * df).abs();

        if newton_leaves_bracket || newton_too_slow || df == 0.0 || !df.is_finite() {
            dx_old = dx;
            dx = 0.5 * (hi - lo);
            x = lo + dx;
            if x == lo {
                return Ok(x);
            }
        } else {
            dx_old = dx;
            dx = residual / df;
            let previous = x;
            x -= dx;
            if x == previous {
                return Ok(x);
            }
        }

        if dx.abs() <= CONVERGED_ULPS as f64 * f64::EPSILON * x.abs() {
            return Ok(x);
        }

        residual = f(x) - y;
        if residual == 0.0 {
            return Ok(x);
        }
        df = derivative(&f, x);

        if residual < 0.0 {
            lo = x;
        } else {
            hi = x;
        }
    }

    Err(RootFindError::Diverging {
        iterations: MAX_BRACKET_ITERATIONS,
    })
}

/// Real roots of `a·x² + b·x + c = 0`, or `None` if there are none.
///
/// Uses the cancellation-free form `q = -(b + sgn(b)·√disc)/2`,
/// `x₁ = q/a`, `x₂ = c/q`. `a` must be non-zero.
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    debug_assert!(a != 0.0);

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 || disc.is_nan() {
        return None;
    }

    let q = -0.5 * (b + b.signum() * disc.sqrt());
    if q == 0.0 {
        // b == 0 and c == 0: double root at the origin.
        return Some((0.0, 0.0));
    }

    Some((q / a, c / q))
}
