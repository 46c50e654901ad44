// src/services/mod.rs

//! Request-scoped operations. Each function takes the store (and a timestamp
//! where calendar days matter), does a handful of bounded reads, and either
//! returns the full result or fails; nothing is cached between calls.

pub mod accounts;
pub mod analytics;
pub mod exam;
pub mod lessons;
pub mod mastery;
pub mod practice;
pub mod questions;
pub mod readiness;
pub mod topics;
pub mod trend;

/// Whole percentage of `part` over `whole`, rounded half up; 0 when `whole` is 0.
pub fn percent(part: i64, whole: i64) -> i32 {
    if whole <= 0 || part <= 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as i32
}

/// Weighted blend of whole percentages, weights in tenths summing to 10,
/// rounded half up.
pub fn blend(weighted: &[(i32, i64)]) -> i32 {
    let sum: i64 = weighted
        .iter()
        .map(|&(value, weight)| value as i64 * weight)
        .sum();
    if sum <= 0 {
        return 0;
    }
    ((sum + 5) / 10) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 0), 0);
        assert_eq!(percent(1, 8), 13); // 12.5
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn blend_avoids_float_artefacts() {
        // 85 * 0.7 is 59.4999... in binary floating point.
        assert_eq!(blend(&[(85, 7), (0, 3)]), 60);
        assert_eq!(blend(&[(0, 7), (0, 3)]), 0);
        assert_eq!(blend(&[(100, 7), (100, 3)]), 100);
    }
}
