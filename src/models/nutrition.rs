//! Shared nutrition data structure
//!
//! Used for food records, per-item contributions, and ledger totals.

use serde::{Deserialize, Serialize};

/// Nutritional information
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fat: f64,     // grams
}

impl Nutrition {
    /// Create a new Nutrition with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale nutrition values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            carbs: self.carbs * multiplier,
            fat: self.fat * multiplier,
        }
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
        }
    }

    /// Round every value to one decimal place
    pub fn round1(&self) -> Self {
        Self {
            calories: round1(self.calories),
            protein: round1(self.protein),
            carbs: round1(self.carbs),
            fat: round1(self.fat),
        }
    }
}

/// Round a value to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for Nutrition {
    type Output = Nutrition;

    fn mul(self, multiplier: f64) -> Nutrition {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_and_add() {
        let n = Nutrition {
            calories: 100.0,
            protein: 10.0,
            carbs: 20.0,
            fat: 5.0,
        };
        let doubled = n.scale(2.0);
        assert_eq!(doubled.calories, 200.0);
        assert_eq!(doubled.protein, 20.0);

        let sum = n.add(&doubled);
        assert_eq!(sum.calories, 300.0);
        assert_eq!(sum.fat, 15.0);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(1.25), 1.3);
        assert_eq!(round1(1.24), 1.2);
        let n = Nutrition {
            calories: 123.456,
            protein: 0.04,
            carbs: 9.99,
            fat: 0.0,
        };
        let rounded = n.round1();
        assert_eq!(rounded.calories, 123.5);
        assert_eq!(rounded.protein, 0.0);
        assert_eq!(rounded.carbs, 10.0);
    }
}
