//! Category-aware energy density clamp
//!
//! Final backstop bounding an estimate's implied kcal-per-100g density to
//! a range plausible for the food's category. Catches garbage values that
//! survive the upstream sources for unmodeled foods.

/// Plausible density bounds for one food category
struct CategoryRule {
    patterns: &'static [&'static str],
    min_kcal_per_100g: f64,
    max_kcal_per_100g: f64,
}

/// Density range applied when no category matches
pub const DEFAULT_DENSITY_RANGE: (f64, f64) = (30.0, 500.0);

/// Ordered category table. First match wins, so more specific entries
/// (egg, rice dishes) come before broad ones (vegetable, red meat).
/// Bounds act on absolute totals whenever no weight is declared, so the
/// floors stay low and the caps generous.
static CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        patterns: &["egg"],
        min_kcal_per_100g: 60.0,
        max_kcal_per_100g: 180.0,
    },
    CategoryRule {
        patterns: &["rice", "biryani", "pulao"],
        min_kcal_per_100g: 80.0,
        max_kcal_per_100g: 250.0,
    },
    CategoryRule {
        patterns: &["dal", "lentil", "curry", "sambar"],
        min_kcal_per_100g: 40.0,
        max_kcal_per_100g: 200.0,
    },
    CategoryRule {
        patterns: &["chicken", "paneer", "tofu"],
        min_kcal_per_100g: 80.0,
        max_kcal_per_100g: 350.0,
    },
    CategoryRule {
        patterns: &["bread", "roti", "chapati", "paratha", "naan", "toast"],
        min_kcal_per_100g: 60.0,
        max_kcal_per_100g: 350.0,
    },
    CategoryRule {
        patterns: &["milk"],
        min_kcal_per_100g: 30.0,
        max_kcal_per_100g: 120.0,
    },
    CategoryRule {
        patterns: &["apple", "banana", "mango", "orange", "fruit", "grape"],
        min_kcal_per_100g: 25.0,
        max_kcal_per_100g: 120.0,
    },
    CategoryRule {
        patterns: &["potato", "aloo"],
        min_kcal_per_100g: 50.0,
        max_kcal_per_100g: 200.0,
    },
    CategoryRule {
        patterns: &["oil", "butter", "ghee"],
        min_kcal_per_100g: 20.0,
        max_kcal_per_100g: 900.0,
    },
    CategoryRule {
        patterns: &["whey", "protein powder"],
        min_kcal_per_100g: 60.0,
        max_kcal_per_100g: 500.0,
    },
    CategoryRule {
        patterns: &["salad", "vegetable", "spinach", "cabbage", "cauliflower"],
        min_kcal_per_100g: 15.0,
        max_kcal_per_100g: 150.0,
    },
    CategoryRule {
        patterns: &["fish", "prawn", "salmon", "tuna"],
        min_kcal_per_100g: 50.0,
        max_kcal_per_100g: 250.0,
    },
    CategoryRule {
        patterns: &["mutton", "beef", "pork", "lamb"],
        min_kcal_per_100g: 80.0,
        max_kcal_per_100g: 350.0,
    },
    CategoryRule {
        patterns: &["sugar", "honey", "jaggery"],
        min_kcal_per_100g: 15.0,
        max_kcal_per_100g: 400.0,
    },
    CategoryRule {
        patterns: &["almond", "cashew", "peanut", "walnut", "nuts"],
        min_kcal_per_100g: 30.0,
        max_kcal_per_100g: 650.0,
    },
    CategoryRule {
        patterns: &["yogurt", "curd", "dahi", "lassi"],
        min_kcal_per_100g: 30.0,
        max_kcal_per_100g: 150.0,
    },
    CategoryRule {
        patterns: &["flour", "atta", "maida", "oats"],
        min_kcal_per_100g: 60.0,
        max_kcal_per_100g: 400.0,
    },
];

/// Look up the density bounds for a food description
pub fn density_range(description: &str) -> (f64, f64) {
    let lower = description.to_lowercase();
    for rule in CATEGORY_RULES {
        if rule.patterns.iter().any(|p| lower.contains(p)) {
            return (rule.min_kcal_per_100g, rule.max_kcal_per_100g);
        }
    }
    DEFAULT_DENSITY_RANGE
}

/// Clamp a calorie estimate so its implied density (kcal per 100 g) falls
/// inside the matched category's range.
///
/// Non-finite or non-positive calories pass through unmodified; a zero or
/// negative estimate is not this function's concern. Idempotent: applying
/// it twice to its own output yields the same value.
pub fn clamp_to_category(description: &str, calories: f64, declared_grams: Option<f64>) -> f64 {
    if !calories.is_finite() || calories <= 0.0 {
        return calories;
    }

    let effective_grams = match declared_grams {
        Some(g) if g > 0.0 => g,
        _ => 100.0,
    };

    let implied_density = calories / effective_grams * 100.0;
    let (min, max) = density_range(description);
    let clamped = implied_density.clamp(min, max);

    (clamped * effective_grams / 100.0).round()
}
