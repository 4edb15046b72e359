//! # Dice Roller
//!
//! Plain and exploding dice. An exploding die that shows its maximum face
//! counts as `sides - 1` and is rolled again, so long chains of maximum rolls
//! can push a total arbitrarily high.

use crate::{DelveError, DelveResult};
use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A count of identical dice, written `NdS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    pub count: i32,
    pub sides: i32,
}

impl Dice {
    pub const fn new(count: i32, sides: i32) -> Self {
        Self { count, sides }
    }

    /// Rolls these dice plus a bonus.
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R, bonus: i32, exploding: bool) -> i32 {
        roll(rng, self.count, self.sides, bonus, exploding)
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// Rolls `count` dice with `sides` faces and adds `bonus`.
///
/// With `exploding` set, every maximum face contributes `sides - 1` and
/// another die is rolled in its place. Dice with one side never explode and
/// dice with no sides contribute nothing. A non-positive count yields `bonus`.
///
/// # Examples
///
/// ```
/// use delve::roll;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let total = roll(&mut rng, 2, 6, 1, false);
/// assert!((3..=13).contains(&total));
/// assert_eq!(roll(&mut rng, 0, 6, 4, true), 4);
/// ```
pub fn roll<R: Rng + ?Sized>(rng: &mut R, count: i32, sides: i32, bonus: i32, exploding: bool) -> i32 {
    if count <= 0 || sides <= 0 {
        return bonus;
    }

    let explodes = exploding && sides > 1;
    let mut total = 0;
    let mut remaining = count;
    while remaining > 0 {
        let value = rng.gen_range(1..=sides);
        if explodes && value == sides {
            total += value - 1;
            trace!("die shows {} (counts {} and rolls again)", value, value - 1);
            continue;
        }
        total += value;
        remaining -= 1;
    }

    total + bonus
}

/// One group of a dice expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceGroup {
    pub dice: Dice,
    pub exploding: bool,
}

impl fmt::Display for DiceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.exploding { 'D' } else { 'd' };
        write!(f, "{}{}{}", self.dice.count, marker, self.dice.sides)
    }
}

/// A composite roll such as `"2d6 1D20"`.
///
/// Lowercase `d` marks a plain group and uppercase `D` an exploding one.
///
/// # Examples
///
/// ```
/// use delve::DiceExpr;
///
/// let expr: DiceExpr = "2d6 1D20".parse().unwrap();
/// assert_eq!(expr.groups.len(), 2);
/// assert!(!expr.groups[0].exploding);
/// assert!(expr.groups[1].exploding);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiceExpr {
    pub groups: Vec<DiceGroup>,
}

impl DiceExpr {
    /// Parses a whitespace-separated list of dice groups.
    pub fn parse(text: &str) -> DelveResult<Self> {
        let groups = text
            .split_whitespace()
            .map(parse_group)
            .collect::<DelveResult<Vec<_>>>()?;
        Ok(Self { groups })
    }

    /// Rolls every group independently and adds one bonus to the sum.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R, bonus: i32) -> i32 {
        let total: i32 = self
            .groups
            .iter()
            .map(|group| group.dice.roll(rng, 0, group.exploding))
            .sum();
        total + bonus
    }
}

impl FromStr for DiceExpr {
    type Err = DelveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpr::parse(s)
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.groups.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" "))
    }
}

fn parse_group(code: &str) -> DelveResult<DiceGroup> {
    let (split, exploding) = match (code.find('d'), code.find('D')) {
        (Some(index), None) => (index, false),
        (None, Some(index)) => (index, true),
        _ => {
            return Err(DelveError::InvalidDice(format!(
                "unknown dice type '{}', use 1d6, 1D20 etc.",
                code
            )))
        }
    };

    let number = |part: &str| {
        part.parse::<i32>()
            .map_err(|_| DelveError::InvalidDice(format!("bad number in '{}'", code)))
    };
    let count = number(&code[..split])?;
    let sides = number(&code[split + 1..])?;

    Ok(DiceGroup {
        dice: Dice::new(count, sides),
        exploding,
    })
}

/// Convenience for `DiceExpr::parse(text)?.roll(rng, bonus)`.
pub fn roll_expr<R: Rng + ?Sized>(rng: &mut R, text: &str, bonus: i32) -> DelveResult<i32> {
    Ok(DiceExpr::parse(text)?.roll(rng, bonus))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_non_positive_count_yields_bonus() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(roll(&mut rng, 0, 6, 3, false), 3);
        assert_eq!(roll(&mut rng, -2, 6, -1, true), -1);
    }

    #[test]
    fn test_one_sided_die_does_not_explode() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(roll(&mut rng, 4, 1, 0, true), 4);
    }

    #[test]
    fn test_exploding_dice_can_exceed_plain_maximum() {
        let mut rng = StdRng::seed_from_u64(99);
        let best = (0..2000)
            .map(|_| roll(&mut rng, 1, 2, 0, true))
            .max()
            .unwrap_or(0);
        assert!(best > 2, "a 1D2 should chain past 2 at least once");
    }

    #[test]
    fn test_parse_expression() {
        let expr = DiceExpr::parse("3d6 1D20").unwrap();
        assert_eq!(
            expr.groups,
            vec![
                DiceGroup { dice: Dice::new(3, 6), exploding: false },
                DiceGroup { dice: Dice::new(1, 20), exploding: true },
            ]
        );
        assert_eq!(expr.to_string(), "3d6 1D20");
    }

    #[test]
    fn test_parse_rejects_unknown_tokens() {
        assert!(DiceExpr::parse("3x6").is_err());
        assert!(DiceExpr::parse("ad6").is_err());
        assert!(DiceExpr::parse("1d6d2").is_err());
        assert!(roll_expr(&mut StdRng::seed_from_u64(0), "2d", 0).is_err());
    }

    #[test]
    fn test_expression_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let total = roll_expr(&mut rng, "2d6 1d4", 10).unwrap();
            assert!((13..=26).contains(&total));
        }
    }

    proptest! {
        #[test]
        fn plain_roll_stays_in_range(seed in any::<u64>(), count in 0i32..10, sides in 1i32..20, bonus in -10i32..10) {
            let mut rng = StdRng::seed_from_u64(seed);
            let total = roll(&mut rng, count, sides, bonus, false);
            prop_assert!(total >= count + bonus);
            prop_assert!(total <= count * sides + bonus);
        }

        #[test]
        fn exploding_roll_has_plain_lower_bound(seed in any::<u64>(), count in 0i32..10, sides in 1i32..20, bonus in -10i32..10) {
            let mut rng = StdRng::seed_from_u64(seed);
            let total = roll(&mut rng, count, sides, bonus, true);
            prop_assert!(total >= count + bonus);
        }
    }
}
