//! Override engine
//!
//! Corrects known, systematically wrong estimates for food categories
//! where density clamping alone is insufficient: cooking fats, eggs,
//! protein powder, flatbreads. Rules run in a fixed order on the current
//! calorie value (post-sanitizer, pre-clamp). Floors only raise the
//! value, caps only lower it.

use crate::engine::quantity::{count_before_keyword, grams_in_text, leading_count};
use crate::models::{FoodQuery, Macros};

/// Keywords marking a cooking fat, including common Indian brand names
const FAT_KEYWORDS: &[&str] = &["butter", "ghee", "oil", "amul", "nutralite"];

/// Keywords marking a protein supplement
const WHEY_KEYWORDS: &[&str] = &["whey", "protein powder", "scoop"];

/// Keywords marking a flatbread piece
const FLATBREAD_KEYWORDS: &[&str] = &["roti", "chapati", "paratha", "naan", "phulka", "thepla"];

/// Calories assumed per whole egg when flooring
const KCAL_PER_EGG_FLOOR: i64 = 70;

/// Below this many calories per scoop a protein-powder estimate is a
/// wrong item count, not a small scoop
const KCAL_PER_SCOOP_FLOOR: i64 = 70;

/// Calories substituted per scoop of protein powder
const KCAL_PER_SCOOP: i64 = 120;

/// Calories assumed per whole egg when capping
const KCAL_PER_EGG_CAP: i64 = 90;

/// Calories assumed per flatbread piece when capping
const KCAL_PER_FLATBREAD: i64 = 90;

/// Fat grams assumed when neither declared nor written in the text
const DEFAULT_FAT_GRAMS: f64 = 10.0;

/// Largest fat amount a single serving is allowed to claim
const MAX_FAT_GRAMS: f64 = 250.0;

/// Result of running the override rules over one query
#[derive(Debug, Clone)]
pub struct OverrideOutcome {
    /// Corrected calorie value
    pub calories: i64,
    /// Replacement macros when a rule fully substituted the estimate
    pub macros: Option<Macros>,
    /// Whether any rule changed the value
    pub fired: bool,
    /// Confidence annotation contributed by the winning rule
    pub annotation: Option<&'static str>,
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Extract an integer count for a unit keyword: digit run adjacent to the
/// keyword, else the first digit run in the text, else the default.
/// Clamped to [1, max] to avoid absurd multipliers.
fn count_for(description: &str, keywords: &[&str], default: i64, max: i64) -> i64 {
    let found = keywords
        .iter()
        .find_map(|k| count_before_keyword(description, k))
        .or_else(|| leading_count(description));

    i64::from(found.unwrap_or(default as u32)).clamp(1, max)
}

/// Fat grams for the fat rules: declared serving weight, else a gram
/// amount written inline, else a typical pat.
fn fat_grams(query: &FoodQuery) -> f64 {
    query
        .declared_grams
        .or_else(|| grams_in_text(&query.description))
        .unwrap_or(DEFAULT_FAT_GRAMS)
        .clamp(1.0, MAX_FAT_GRAMS)
}

/// Run the override rules over the current calorie value.
///
/// Composition order is fixed: whey floor, combined egg+fat floor,
/// fat/oil floor, egg floor, flatbread cap, egg cap. A query matching no
/// rule passes through unchanged.
pub fn apply_overrides(query: &FoodQuery, calories: i64) -> OverrideOutcome {
    let text = query.normalized();
    let mut outcome = OverrideOutcome {
        calories,
        macros: None,
        fired: false,
        annotation: None,
    };

    let has_egg = text.contains("egg");
    let has_fat = contains_any(&text, FAT_KEYWORDS);
    let eggs = count_for(&text, &["egg"], 1, 20);

    // 1. Whey/protein-powder floor: typical scoop is ~120 kcal; anything
    //    below 70 kcal/scoop is a wrong item count, replace outright.
    if contains_any(&text, WHEY_KEYWORDS) {
        let scoops = count_for(&text, &["scoop"], 1, 5);
        if outcome.calories < KCAL_PER_SCOOP_FLOOR * scoops {
            outcome.calories = KCAL_PER_SCOOP * scoops;
            outcome.macros = Some(Macros::new(24.0, 2.0, 1.5).scale(scoops as f64));
            outcome.fired = true;
            outcome.annotation = Some("(typical scoop)");
        }
    }

    // 2. Combined egg+fat floor: most specific rule, before the
    //    single-ingredient fat floor.
    if has_egg && has_fat {
        let fat_g = fat_grams(query);
        let floor = (eggs * KCAL_PER_EGG_FLOOR) as f64 + fat_g * 7.0 * 0.8;
        if (outcome.calories as f64) < floor {
            outcome.calories = floor.round() as i64;
            outcome.fired = true;
        }
    }

    // 3. Fat/oil floor: pure fat energy with a 0.8 absorption factor.
    //    When the current value is below the floor the estimate is pure
    //    fat, so the macros are replaced too.
    if has_fat {
        let fat_g = fat_grams(query);
        let rate = if text.contains("butter") || text.contains("ghee") {
            7.2
        } else {
            9.0
        };
        let floor = fat_g * rate * 0.8;
        if (outcome.calories as f64) < floor {
            outcome.calories = floor.round() as i64;
            outcome.macros = Some(Macros::new(0.0, 0.0, fat_g * 0.99));
            outcome.fired = true;
        }
    }

    // 4. Egg floor.
    if has_egg {
        let floor = eggs * KCAL_PER_EGG_FLOOR;
        if outcome.calories < floor {
            outcome.calories = floor;
            outcome.fired = true;
        }
    }

    // 5. Flatbread cap.
    if contains_any(&text, FLATBREAD_KEYWORDS) {
        let pieces = count_for(&text, FLATBREAD_KEYWORDS, 2, 10);
        let cap = pieces * KCAL_PER_FLATBREAD;
        if outcome.calories > cap {
            outcome.calories = cap;
            outcome.fired = true;
        }
    }

    // 6. Egg cap.
    if has_egg {
        let cap = eggs * KCAL_PER_EGG_CAP;
        if outcome.calories > cap {
            outcome.calories = cap;
            outcome.fired = true;
        }
    }

    outcome
}
