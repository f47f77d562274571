//! Food categories: inference, shelf life and macro weights
//!
//! The inference table here is deliberately separate from the name
//! normalizer's rules. It answers a coarser question (which aisle) and only
//! runs when a scan or the user left the category blank.

use std::collections::BTreeMap;

use crate::models::UNKNOWN_CATEGORY;
use crate::rules::{Rule, RuleChain};

/// Category guesses from an item name, first match wins
pub static CATEGORY_RULES: RuleChain<&str> = RuleChain::new(&[
    Rule::any(&["frozen", "ice cream", "popsicle"], "Frozen"),
    Rule::any(&["broth", "stock", "sauce", "soup"], "Grocery"),
    Rule::any(&["peanut butter", "almond butter"], "Grocery"),
    Rule::any(&["salmon", "tuna", "shrimp", "cod", "tilapia", "fish", "crab"], "Fish"),
    Rule::any(
        &["chicken", "chkn", "beef", "steak", "pork", "bacon", "turkey", "sausage", "ground"],
        "Meat",
    ),
    Rule::any(&["milk", "cheese", "yogurt", "butter", "cream", "egg"], "Dairy"),
    Rule::any(&["bread", "bagel", "rice", "pasta", "cereal", "oat", "flour", "tortilla"], "Grains"),
    Rule::any(
        &[
            "apple", "banana", "orange", "grape", "berr", "lemon", "lime", "mango", "peach", "pear",
            "melon", "avocado",
        ],
        "Fruit",
    ),
    Rule::any(
        &[
            "spinach", "lettuce", "kale", "broccoli", "carrot", "onion", "potato", "tomato",
            "pepper", "cucumber", "celery",
        ],
        "Veggies",
    ),
]);

/// Best-guess category for an item name, "Unknown" when nothing matches
pub fn infer_category(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    CATEGORY_RULES
        .first_match(&lower)
        .copied()
        .unwrap_or(UNKNOWN_CATEGORY)
}

/// True when a category label carries no information
pub fn is_unknown(category: &str) -> bool {
    let trimmed = category.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN_CATEGORY)
}

/// Keep a supplied category, otherwise infer one from the name
pub fn resolve_category(name: &str, category: &str) -> String {
    if is_unknown(category) {
        infer_category(name).to_string()
    } else {
        category.trim().to_string()
    }
}

/// Fresh produce, under either the store's or the inferred labels
pub fn is_produce(category: &str) -> bool {
    let lower = category.to_lowercase();
    lower.contains("produce") || lower.contains("fruit") || lower.contains("veg")
}

/// Days an item keeps after purchase, by category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfLife {
    /// Used for any category not in the table
    pub default_days: i64,
    /// Keys are lowercase category names
    pub categories: BTreeMap<String, i64>,
}

impl Default for ShelfLife {
    fn default() -> Self {
        let categories = [
            ("grocery", 180),
            ("fruit", 7),
            ("veggies", 10),
            ("meat", 4),
            ("fish", 4),
            ("dairy", 10),
            ("frozen", 90),
        ]
        .into_iter()
        .map(|(name, days)| (name.to_string(), days))
        .collect();

        Self {
            default_days: 21,
            categories,
        }
    }
}

impl ShelfLife {
    /// Shelf life for a category (case-insensitive exact match)
    pub fn days_for(&self, category: &str) -> i64 {
        self.categories
            .get(&category.trim().to_lowercase())
            .copied()
            .unwrap_or(self.default_days)
    }

    /// Override or add a single category
    pub fn set(&mut self, category: &str, days: i64) {
        self.categories.insert(category.trim().to_lowercase(), days);
    }
}

/// Estimated macro grams for one item of a category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroWeights {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroWeights {
    const fn new(protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            protein,
            carbs,
            fats,
        }
    }
}

/// Fallback gram weights used when items carry no nutrition data
pub fn macro_weights(category: &str) -> MacroWeights {
    match category.trim().to_lowercase().as_str() {
        "meat" => MacroWeights::new(25.0, 0.0, 8.0),
        "fish" | "seafood" => MacroWeights::new(22.0, 0.0, 6.0),
        "dairy" => MacroWeights::new(8.0, 12.0, 8.0),
        "grains" => MacroWeights::new(4.0, 30.0, 2.0),
        "fruit" => MacroWeights::new(1.0, 20.0, 0.0),
        "veggies" | "produce" => MacroWeights::new(2.0, 8.0, 0.0),
        "frozen" => MacroWeights::new(6.0, 20.0, 8.0),
        _ => MacroWeights::new(3.0, 15.0, 4.0),
    }
}
