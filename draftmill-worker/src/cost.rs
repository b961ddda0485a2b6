/// Cost estimation
///
/// A fixed deterministic formula mapping token consumption to an estimated
/// USD cost. The estimate is persisted on the completed job and later
/// aggregated by the reporting endpoints; it is an approximation for
/// dashboards, not a billing source of truth.

/// Blended USD rate per 1000 tokens (input and output averaged)
pub const COST_PER_1K_TOKENS: f64 = 0.045;

/// Flat token estimate used when the pipeline does not report usage
///
/// An average generation run consumes roughly this many tokens end to end.
pub const DEFAULT_TOKENS_PER_JOB: i32 = 15_000;

/// Estimates the cost of an execution from its token count
pub fn estimate_cost(tokens_used: i32) -> f64 {
    (tokens_used as f64 / 1000.0) * COST_PER_1K_TOKENS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_cost_default_tokens() {
        let cost = estimate_cost(DEFAULT_TOKENS_PER_JOB);
        assert!((cost - 0.675).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_cost_per_thousand() {
        assert!((estimate_cost(1000) - COST_PER_1K_TOKENS).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_cost_zero_tokens() {
        assert_eq!(estimate_cost(0), 0.0);
    }

    #[test]
    fn test_estimate_cost_scales_linearly() {
        assert!((estimate_cost(30_000) - 2.0 * estimate_cost(15_000)).abs() < 1e-9);
    }
}
