//! Shared macronutrient data structure
//!
//! Used across source results, override rules, and reconciled estimates.

use serde::{Deserialize, Serialize};

/// Macronutrient masses in grams
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Macros {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl Macros {
    /// Create a new Macros with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn new(protein_g: f64, carbs_g: f64, fat_g: f64) -> Self {
        Self {
            protein_g,
            carbs_g,
            fat_g,
        }
    }

    /// Scale macro values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            protein_g: self.protein_g * multiplier,
            carbs_g: self.carbs_g * multiplier,
            fat_g: self.fat_g * multiplier,
        }
    }

    /// Add another set of macros to this one
    pub fn add(&self, other: &Macros) -> Self {
        Self {
            protein_g: self.protein_g + other.protein_g,
            carbs_g: self.carbs_g + other.carbs_g,
            fat_g: self.fat_g + other.fat_g,
        }
    }

    /// Replace non-finite or negative components with zero
    pub fn sanitized(&self) -> Self {
        let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            protein_g: clean(self.protein_g),
            carbs_g: clean(self.carbs_g),
            fat_g: clean(self.fat_g),
        }
    }

    /// Round each component to one decimal place
    pub fn rounded(&self) -> Self {
        let r = |v: f64| (v * 10.0).round() / 10.0;
        Self {
            protein_g: r(self.protein_g),
            carbs_g: r(self.carbs_g),
            fat_g: r(self.fat_g),
        }
    }
}

impl std::ops::Add for Macros {
    type Output = Macros;

    fn add(self, other: Macros) -> Macros {
        Macros::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for Macros {
    type Output = Macros;

    fn mul(self, multiplier: f64) -> Macros {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Macros {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Macros::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_and_add() {
        let m = Macros::new(10.0, 20.0, 5.0).scale(2.0);
        assert!((m.protein_g - 20.0).abs() < 1e-9);
        assert!((m.carbs_g - 40.0).abs() < 1e-9);

        let sum = m.add(&Macros::new(1.0, 1.0, 1.0));
        assert!((sum.fat_g - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_sanitized_drops_bad_values() {
        let m = Macros::new(f64::NAN, -3.0, 2.0).sanitized();
        assert_eq!(m.protein_g, 0.0);
        assert_eq!(m.carbs_g, 0.0);
        assert_eq!(m.fat_g, 2.0);
    }

    #[test]
    fn test_rounded_one_decimal() {
        let m = Macros::new(24.04, 2.35, 1.49).rounded();
        assert!((m.protein_g - 24.0).abs() < 1e-9);
        assert!((m.carbs_g - 2.4).abs() < 1e-9);
        assert!((m.fat_g - 1.5).abs() < 1e-9);
    }
}
