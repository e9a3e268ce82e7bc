// Internal rate of return by bisection.
//
// A bracketing method cannot diverge on awkward cash-flow signs, which is
// why it is used here instead of Newton's method.
use tracing::warn;

use crate::config::IrrConfig;
use crate::types::IrrStatus;

/// The result of an IRR solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrSolution {
    /// Rate as a fraction, e.g. `0.12` for 12%.
    pub rate: f64,
    /// Discounted sum of the cash flows at `rate`.
    pub npv: f64,
    pub status: IrrStatus,
    pub iters: usize,
}

impl IrrSolution {
    pub fn percent(&self) -> f64 {
        self.rate * 100.0
    }
}

/// Discounted sum of `cash_flows`, where entry `t` is received at the end of
/// year `t`.
pub fn npv(rate: f64, cash_flows: &[f64]) -> f64 {
    let base = 1.0 + rate;
    let mut discount = 1.0;
    let mut sum = 0.0;
    for flow in cash_flows {
        sum += flow / discount;
        discount *= base;
    }
    sum
}

/// Finds the rate at which the discounted sum of `cash_flows` is zero.
///
/// Each iteration evaluates the midpoint of the bracket and stops once the
/// discounted sum is within `config.npv_tolerance`. When the iteration
/// budget runs out the last midpoint is returned with
/// [`IrrStatus::MaxIters`].
///
/// If the discounted sum has the same sign at both ends of the bracket (an
/// investment that never pays back, or one with no investment at all) the
/// rate is clamped to the end nearer a root: the lower end for losses, the
/// upper end for gains. A cash-flow list that is zero everywhere has a rate
/// of 0.
pub fn solve(cash_flows: &[f64], config: &IrrConfig) -> IrrSolution {
    let (mut left, mut right) = (config.lower_rate, config.upper_rate);

    if cash_flows.iter().all(|flow| *flow == 0.0) {
        return IrrSolution {
            rate: 0.0,
            npv: 0.0,
            status: IrrStatus::NoSignChange,
            iters: 0,
        };
    }

    let left_npv = npv(left, cash_flows);
    let right_npv = npv(right, cash_flows);
    if left_npv.signum() == right_npv.signum() {
        let (rate, at) = if left_npv < 0.0 {
            (left, left_npv)
        } else {
            (right, right_npv)
        };
        warn!(
            left_npv,
            right_npv,
            rate,
            "irr bracket has no sign change, clamping to bracket end"
        );
        return IrrSolution {
            rate,
            npv: at,
            status: IrrStatus::NoSignChange,
            iters: 0,
        };
    }

    let mut guess = 0.5 * (left + right);
    let mut guess_npv = npv(guess, cash_flows);
    for iter in 1..=config.max_iters {
        guess = 0.5 * (left + right);
        guess_npv = npv(guess, cash_flows);

        if guess_npv.abs() < config.npv_tolerance {
            return IrrSolution {
                rate: guess,
                npv: guess_npv,
                status: IrrStatus::Converged,
                iters: iter,
            };
        }

        // The discounted sum falls as the rate rises for a conventional
        // investment; the sign test keeps it correct either way.
        if guess_npv.signum() == left_npv.signum() {
            left = guess;
        } else {
            right = guess;
        }
    }

    warn!(
        rate = guess,
        npv = guess_npv,
        iters = config.max_iters,
        "irr did not converge, using last guess"
    );
    IrrSolution {
        rate: guess,
        npv: guess_npv,
        status: IrrStatus::MaxIters,
        iters: config.max_iters,
    }
}
