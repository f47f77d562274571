//! Macro and spend aggregation over purchased items

use serde::Serialize;

use crate::categories::{macro_weights, resolve_category};
use crate::models::PurchasedItem;

/// Headline totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_spend: f64,
    pub total_items: usize,
}

/// Macro split in whole percent
///
/// Sums to 100 whenever any grams were counted, otherwise all zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MacroBreakdown {
    pub protein_pct: i64,
    pub carbs_pct: i64,
    pub fats_pct: i64,
}

impl MacroBreakdown {
    /// Percentages from gram totals
    ///
    /// Protein and carbs are rounded; fats take the remainder. If rounding
    /// pushed protein + carbs past 100, fats drop to 0 and carbs absorb the
    /// difference.
    pub fn from_grams(protein: f64, carbs: f64, fats: f64) -> Self {
        let total = protein + carbs + fats;
        if total <= 0.0 {
            return Self::default();
        }

        let protein_pct = (protein / total * 100.0).round() as i64;
        let mut carbs_pct = (carbs / total * 100.0).round() as i64;
        let mut fats_pct = 100 - protein_pct - carbs_pct;
        if fats_pct < 0 {
            fats_pct = 0;
            carbs_pct = (100 - protein_pct).max(0);
        }

        Self {
            protein_pct,
            carbs_pct,
            fats_pct,
        }
    }
}

/// One category's share of total spend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpend {
    pub category: String,
    pub amount: f64,
    /// amount / total spend, 0..=1
    pub fraction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NutritionSummary {
    pub metrics: Metrics,
    pub macros: MacroBreakdown,
    /// First-seen category order; empty when nothing was spent
    pub spend_by_category: Vec<CategorySpend>,
}

/// Items grouped by resolved category, in first-seen order
pub(crate) fn group_by_category(items: &[PurchasedItem]) -> Vec<(String, Vec<&PurchasedItem>)> {
    let mut groups: Vec<(String, Vec<&PurchasedItem>)> = Vec::new();
    for item in items {
        let category = resolve_category(&item.name, &item.category);
        match groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, members)) => members.push(item),
            None => groups.push((category, vec![item])),
        }
    }
    groups
}

/// Gram totals: real nutrition data when any exists, else category estimates
fn macro_grams(
    items: &[PurchasedItem],
    by_category: &[(String, Vec<&PurchasedItem>)],
) -> (f64, f64, f64) {
    let protein: f64 = items.iter().filter_map(|i| i.protein).sum();
    let carbs: f64 = items.iter().filter_map(|i| i.carbs).sum();
    let fats: f64 = items.iter().filter_map(|i| i.fats).sum();

    if protein + carbs + fats > 0.0 {
        return (protein, carbs, fats);
    }

    by_category
        .iter()
        .fold((0.0, 0.0, 0.0), |(p, c, f), (category, members)| {
            let weights = macro_weights(category);
            let count = members.len() as f64;
            (
                p + weights.protein * count,
                c + weights.carbs * count,
                f + weights.fats * count,
            )
        })
}

/// Totals, macro split and spend by category for a list of items
pub fn aggregate(items: &[PurchasedItem]) -> NutritionSummary {
    let total_spend: f64 = items.iter().map(|i| i.line_total()).sum();
    let metrics = Metrics {
        total_calories: items.iter().filter_map(|i| i.calories).sum(),
        total_protein: items.iter().filter_map(|i| i.protein).sum(),
        total_spend,
        total_items: items.len(),
    };

    let by_category = group_by_category(items);
    let (protein, carbs, fats) = macro_grams(items, &by_category);
    let macros = MacroBreakdown::from_grams(protein, carbs, fats);

    let spend_by_category = if total_spend > 0.0 {
        by_category
            .iter()
            .map(|(category, members)| {
                let amount: f64 = members.iter().map(|i| i.line_total()).sum();
                CategorySpend {
                    category: category.clone(),
                    amount,
                    fraction: amount / total_spend,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    NutritionSummary {
        metrics,
        macros,
        spend_by_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(name: &str, category: &str, price: f64, qty: f64) -> PurchasedItem {
        PurchasedItem {
            id: 0,
            name: name.to_string(),
            price,
            quantity: qty,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            store: "Store".to_string(),
            category: category.to_string(),
            receipt_id: 1,
            calories: None,
            protein: None,
            carbs: None,
            fats: None,
        }
    }

    fn with_macros(mut item: PurchasedItem, cal: f64, p: f64, c: f64, f: f64) -> PurchasedItem {
        item.calories = Some(cal);
        item.protein = Some(p);
        item.carbs = Some(c);
        item.fats = Some(f);
        item
    }

    #[test]
    fn test_empty_input() {
        let summary = aggregate(&[]);
        assert_eq!(summary.metrics.total_items, 0);
        assert_eq!(summary.macros, MacroBreakdown::default());
        assert!(summary.spend_by_category.is_empty());
    }

    #[test]
    fn test_metrics_totals() {
        let items = vec![
            with_macros(item("Chicken", "Meat", 5.0, 2.0), 300.0, 40.0, 0.0, 10.0),
            item("Rice", "Grains", 2.5, 1.0),
        ];
        let summary = aggregate(&items);
        assert_eq!(summary.metrics.total_spend, 12.5);
        assert_eq!(summary.metrics.total_items, 2);
        assert_eq!(summary.metrics.total_calories, 300.0);
        assert_eq!(summary.metrics.total_protein, 40.0);
    }

    #[test]
    fn test_real_macros_preferred() {
        let items = vec![
            with_macros(item("Chicken", "Meat", 5.0, 1.0), 0.0, 30.0, 50.0, 20.0),
            item("Rice", "Grains", 2.5, 1.0),
        ];
        let macros = aggregate(&items).macros;
        assert_eq!(macros, MacroBreakdown { protein_pct: 30, carbs_pct: 50, fats_pct: 20 });
    }

    #[test]
    fn test_category_weight_fallback() {
        // Meat 25/0/8 and Dairy 8/12/8: 33 protein, 12 carbs, 16 fats of 61
        let items = vec![item("Steak", "Meat", 9.0, 1.0), item("Milk", "Dairy", 4.0, 1.0)];
        let macros = aggregate(&items).macros;
        assert_eq!(macros.protein_pct, 54);
        assert_eq!(macros.carbs_pct, 20);
        assert_eq!(macros.fats_pct, 26);
    }

    #[test]
    fn test_fallback_infers_unknown_categories() {
        let items = vec![item("Ribeye Steak", "Unknown", 12.0, 1.0)];
        let summary = aggregate(&items);
        assert_eq!(summary.macros.carbs_pct, 0);
        assert_eq!(summary.spend_by_category[0].category, "Meat");
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let cases = [
            (1.0, 1.0, 1.0),
            (2.0, 1.0, 0.0),
            (10.0, 0.0, 0.0),
            (0.0, 0.0, 3.0),
            (1.0, 7.0, 0.0),
            (33.0, 33.0, 34.0),
            (0.1, 0.2, 0.7),
        ];
        for (p, c, f) in cases {
            let m = MacroBreakdown::from_grams(p, c, f);
            assert_eq!(m.protein_pct + m.carbs_pct + m.fats_pct, 100, "{p}/{c}/{f}");
            assert!(m.fats_pct >= 0 && m.carbs_pct >= 0);
        }
    }

    #[test]
    fn test_rounding_overflow_clamps_fats() {
        // 12.5% rounds to 13 and 87.5% rounds to 88
        let m = MacroBreakdown::from_grams(1.0, 7.0, 0.0);
        assert_eq!(m, MacroBreakdown { protein_pct: 13, carbs_pct: 87, fats_pct: 0 });
    }

    #[test]
    fn test_spend_by_category() {
        let items = vec![
            item("Apple", "Produce", 1.0, 3.0),
            item("Steak", "Meat", 9.0, 1.0),
            item("Pear", "Produce", 2.0, 1.0),
            item("Mystery Box", "", 2.0, 1.0),
        ];
        let spend = aggregate(&items).spend_by_category;
        let names: Vec<&str> = spend.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["Produce", "Meat", "Unknown"]);
        assert_eq!(spend[0].amount, 5.0);
        assert!((spend[0].fraction - 5.0 / 16.0).abs() < 1e-9);
        let total: f64 = spend.iter().map(|s| s.fraction).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_spend_has_no_categories() {
        let items = vec![
            item("Free Sample", "Snacks", 0.0, 2.0),
            item("Coupon Milk", "Dairy", 0.0, 1.0),
        ];
        let summary = aggregate(&items);
        assert!(summary.spend_by_category.is_empty());
        assert_eq!(summary.metrics.total_items, 2);
    }
}
