//! # Game Mathematics
//!
//! Step clamping for grid movement.

/// Constrains a value to `lower..=upper`.
pub fn clamp_between(value: i32, lower: i32, upper: i32) -> i32 {
    value.max(lower).min(upper)
}

/// Reduces a delta to a single grid step in {-1, 0, 1}.
///
/// # Examples
///
/// ```
/// use delve::step_toward;
///
/// assert_eq!(step_toward(7), 1);
/// assert_eq!(step_toward(0), 0);
/// assert_eq!(step_toward(-3), -1);
/// ```
pub fn step_toward(delta: i32) -> i32 {
    clamp_between(delta, -1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_between() {
        assert_eq!(clamp_between(5, 1, 3), 3);
        assert_eq!(clamp_between(-5, 1, 3), 1);
        assert_eq!(clamp_between(2, 1, 3), 2);
    }
}
