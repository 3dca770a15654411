//! Clamp-and-round rule applied to every published prediction

use num_traits::Float;

/// Number of decimals kept on every published prediction
pub const DECIMALS: i32 = 2;

/// Round `value` to `decimals` decimal places, ties to even.
///
/// A tie is judged on the scaled binary value, so `0.125` becomes `0.12`
/// while `2.675` (stored just below the half) becomes `2.67`.
pub fn round_to<F: Float>(value: F, decimals: i32) -> F {
    let (factor, two) = match (F::from(10.0), F::from(2.0)) {
        (Some(ten), Some(two)) => (ten.powi(decimals), two),
        _ => return value,
    };

    let scaled = value * factor;
    let rounded = if (scaled - scaled.trunc()).abs() == two.recip() {
        (scaled / two).round() * two
    } else {
        scaled.round()
    };
    rounded / factor
}

/// Replace non-physical predictions with zero and round to [`DECIMALS`] places.
///
/// Predicted quantities such as receipts, occupancy or waste cannot be
/// negative, so anything `<= 0` collapses to `0.0`. NaN fails the comparison
/// and is clamped as well. Applying the rule twice yields the same value.
pub fn post_process<F: Float>(value: F) -> F {
    if !(value > F::zero()) {
        return F::zero();
    }

    round_to(value, DECIMALS)
}
