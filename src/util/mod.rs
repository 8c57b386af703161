
/// Converts a phred-scaled quality into the probability that the observation is wrong
pub fn phred_to_error_prob(quality: u32) -> f64 {
    10.0_f64.powf(-(quality as f64) / 10.0)
}

/// Returns (ln P(correct), ln P(wrong)) for a phred-scaled quality.
/// Both cost computers accumulate these in log space to stay stable over long columns.
pub fn phred_to_log_probs(quality: u32) -> (f64, f64) {
    let error_prob = phred_to_error_prob(quality);
    ((1.0 - error_prob).ln(), error_prob.ln())
}
