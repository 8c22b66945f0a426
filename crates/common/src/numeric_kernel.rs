use std::f64;

/// Default tolerance for the relaxation comparison.
///
/// Rate products within roughly `1e-9` of parity are indistinguishable from
/// floating-point noise accumulated over `|V|` relaxation passes.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Converts an exchange rate into a relaxation weight `w = -ln(rate)`.
///
/// Returns `None` for rates that cannot form a tradable edge: zero, negative,
/// NaN or infinite. A rate above 1.0 yields a negative weight.
pub fn rate_to_weight(rate: f64) -> Option<f64> {
    if !rate.is_finite() || rate <= 0.0 {
        return None;
    }

    Some(-rate.ln())
}

/// Inverse of [`rate_to_weight`].
pub fn weight_to_rate(weight: f64) -> f64 {
    (-weight).exp()
}

/// The epsilon gate used by every relaxation step.
///
/// A candidate distance only counts as an improvement when it beats the
/// current one by more than `eps`. An infinite `current` is beaten by any
/// finite candidate.
pub fn improves(current: f64, candidate: f64, eps: f64) -> bool {
    candidate < current - eps
}

/// Gross profit of one trip around a cycle whose weights sum to `log_rate_sum`.
///
/// Equals `exp(-Σw) - 1`; `exp_m1` keeps precision for sums close to zero,
/// which is where real opportunities live.
pub fn profit_ratio(log_rate_sum: f64) -> f64 {
    (-log_rate_sum).exp_m1()
}
