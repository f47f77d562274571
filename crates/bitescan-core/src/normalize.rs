//! Item name normalization
//!
//! Receipt lines spell the same product many ways ("2 lb Organic Chicken Breast
//! $10.98/EA", "Chkn thigh boneless"). [`normalize`] reduces a raw name to a
//! grouping key in two passes:
//!
//! 1. Regex cleanup: prices, quantity/unit tokens, marketing words and store
//!    brands, separators and digits are removed and whitespace collapsed.
//! 2. A [`RuleChain`] maps known spellings onto a canonical token. Rules are
//!    ordered most-specific first; the cleaned text is used when nothing matches.

use std::sync::LazyLock;

use regex::Regex;

use crate::rules::{Rule, RuleChain};

/// Canonical product tokens, most specific spellings first
pub static NAME_RULES: RuleChain<&str> = RuleChain::at_word_starts(&[
    // Compound products that contain a more general token
    Rule::any(&["broth", "bouillon"], "broth"),
    Rule::all(&["peanut", "butter"], "peanut butter"),
    Rule::all(&["almond", "milk"], "almond milk"),
    Rule::all(&["oat", "milk"], "oat milk"),
    Rule::any(&["buttermilk"], "buttermilk"),
    Rule::all(&["ice", "cream"], "ice cream"),
    Rule::all(&["cream", "cheese"], "cream cheese"),
    Rule::all(&["sweet", "potato"], "sweet potato"),
    Rule::any(&["green onion", "scallion"], "green onion"),
    Rule::any(&["pineapple"], "pineapple"),
    Rule::any(&["grapefruit"], "grapefruit"),
    Rule::any(&["eggplant"], "eggplant"),
    Rule::any(&["watermelon"], "watermelon"),
    Rule::any(&["popcorn"], "popcorn"),
    Rule::any(&["butternut", "squash"], "squash"),
    // Seafood before meat so "salmon steak" stays fish
    Rule::any(&["salmon"], "salmon"),
    Rule::any(&["tuna"], "tuna"),
    Rule::any(&["shrimp", "prawn"], "shrimp"),
    Rule::any(&["chicken", "chkn", "poultry"], "chicken"),
    Rule::any(&["turkey"], "turkey"),
    Rule::any(&["beef", "steak", "sirloin", "ribeye"], "beef"),
    Rule::any(&["pork", "bacon"], "pork"),
    // Dairy and eggs
    Rule::any(&["milk"], "milk"),
    Rule::any(&["butter"], "butter"),
    Rule::any(&["cheese", "cheddar", "mozzarella", "parmesan"], "cheese"),
    Rule::any(&["yogurt", "yoghurt"], "yogurt"),
    Rule::any(&["egg"], "eggs"),
    // Produce
    Rule::any(&["banana"], "banana"),
    Rule::any(&["apple"], "apple"),
    Rule::any(&["orange"], "orange"),
    Rule::any(&["lemon"], "lemon"),
    Rule::any(&["avocado"], "avocado"),
    Rule::any(&["strawberr"], "strawberries"),
    Rule::any(&["blueberr"], "blueberries"),
    Rule::any(&["grape"], "grapes"),
    Rule::any(&["tomato"], "tomato"),
    Rule::any(&["potato"], "potato"),
    Rule::any(&["onion"], "onion"),
    Rule::any(&["lettuce", "romaine"], "lettuce"),
    Rule::any(&["spinach"], "spinach"),
    Rule::any(&["broccoli"], "broccoli"),
    Rule::any(&["carrot"], "carrot"),
    // Pantry staples
    Rule::any(&["bread", "baguette", "loaf"], "bread"),
    Rule::any(&["rice"], "rice"),
    Rule::any(&["pasta", "spaghetti", "penne", "macaroni"], "pasta"),
    Rule::any(&["cereal"], "cereal"),
    Rule::any(&["oatmeal", "oats"], "oats"),
    Rule::any(&["coffee"], "coffee"),
]);

/// Compiled cleanup patterns, applied in order
pub struct Normalizer {
    price: Regex,
    quantity: Regex,
    pack_words: Regex,
    marketing: Regex,
    separators: Regex,
    digits: Regex,
    whitespace: Regex,
    rules: &'static RuleChain<&'static str>,
}

impl Normalizer {
    pub fn new() -> crate::Result<Self> {
        Ok(Self {
            price: Regex::new(r"\$\s*\d+(\.\d+)?(\s*/\s*[a-z]+)?")?,
            quantity: Regex::new(
                r"\b\d+(\.\d+)?\s*(oz|fl oz|lbs|lb|kg|g|ml|l|ct|pk|pack|count|ea|each|gal|qt|pt|dz|doz)\b",
            )?,
            pack_words: Regex::new(r"\b(oz|lbs|lb|kg|ct|pk|pack|count|ea|each|dozen|bag|bunch)\b")?,
            marketing: Regex::new(
                r"\b(organic|fresh|frozen|natural|premium|boneless|skinless|large|small|jumbo|family size|value pack|kirkland signature|kirkland|great value|signature select|good & gather|365|kroger|trader joe's|trader joes)\b",
            )?,
            separators: Regex::new(r"[,.\-/()]")?,
            digits: Regex::new(r"\d")?,
            whitespace: Regex::new(r"\s+")?,
            rules: &NAME_RULES,
        })
    }

    /// Strip prices, quantities, marketing words and separators
    ///
    /// Returns "" when the result is too short or still carries anything
    /// other than lowercase letters and spaces.
    pub fn clean(&self, raw: &str) -> String {
        let text = raw.to_lowercase();
        let text = self.price.replace_all(&text, " ");
        let text = self.quantity.replace_all(&text, " ");
        let text = self.marketing.replace_all(&text, " ");
        let text = self.pack_words.replace_all(&text, " ");
        let text = self.separators.replace_all(&text, " ");
        let text = text.replace('\'', "");
        let text = self.digits.replace_all(&text, "");
        let text = self.whitespace.replace_all(&text, " ");
        let text = text.trim();

        if text.chars().count() < 2 || !text.chars().all(|c| c.is_ascii_lowercase() || c == ' ') {
            return String::new();
        }
        text.to_string()
    }

    /// Full normalization: cleanup followed by canonical token lookup
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = self.clean(raw);
        if cleaned.is_empty() {
            return cleaned;
        }
        match self.rules.first_match(&cleaned) {
            Some(canonical) => (*canonical).to_string(),
            None => cleaned,
        }
    }
}

static NORMALIZER: LazyLock<Option<Normalizer>> = LazyLock::new(|| match Normalizer::new() {
    Ok(n) => Some(n),
    Err(e) => {
        tracing::error!("Failed to compile name normalizer: {}", e);
        None
    }
});

/// Canonical grouping key for a raw item name
///
/// Never fails; unusable names map to "".
pub fn normalize(raw: &str) -> String {
    NORMALIZER
        .as_ref()
        .map(|n| n.normalize(raw))
        .unwrap_or_default()
}

/// Uppercase the first letter of each space-separated word
pub fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
