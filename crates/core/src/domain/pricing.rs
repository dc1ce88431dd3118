// Pricing

/// Price per printed page, in currency units
pub const UNIT_PRICE: f64 = 1.0;

/// total = pages x copies x unit price
pub fn compute_cost(page_count: u32, copies: u32) -> f64 {
    f64::from(page_count) * f64::from(copies) * UNIT_PRICE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_cost() {
        assert_eq!(compute_cost(5, 2), 10.0);
        assert_eq!(compute_cost(0, 3), 0.0);
        assert_eq!(compute_cost(1, 1), UNIT_PRICE);
    }

    #[test]
    fn test_compute_cost_is_idempotent() {
        assert_eq!(compute_cost(12, 4), compute_cost(12, 4));
    }
}
