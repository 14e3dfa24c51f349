/// Rounds `value` to `decimals` places, resolving exact ties to the even neighbour.
///
/// `round_half_even(13.5, 0) == 14.0`, `round_half_even(12.5, 0) == 12.0`.
pub fn round_half_even(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

/// Ratio of `part` to `whole` as a percentage. Zero when `whole` is zero.
pub fn percentage_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_go_to_even() {
        assert_eq!(round_half_even(13.5, 0), 14.0);
        assert_eq!(round_half_even(12.5, 0), 12.0);
        assert_eq!(round_half_even(0.5, 0), 0.0);
        assert_eq!(round_half_even(13.6, 0), 14.0);
    }

    #[test]
    fn one_decimal() {
        assert_eq!(round_half_even(0.14 * 20.0, 1), 2.8);
        assert_eq!(round_half_even(0.14 * 12.0, 1), 1.7);
        assert_eq!(round_half_even(20.0, 1), 20.0);
    }

    #[test]
    fn percentage_handles_empty_whole() {
        assert_eq!(percentage_of(90_000, 1_000_000), 9.0);
        assert_eq!(percentage_of(5, 0), 0.0);
    }
}
