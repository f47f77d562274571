//! Dashboard snapshot: totals plus insights and recipe ideas

use serde::Serialize;

use crate::categories::is_produce;
use crate::models::PurchasedItem;
use crate::nutrition::{aggregate, group_by_category, CategorySpend, MacroBreakdown, Metrics};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeSuggestion {
    pub title: String,
    pub details: String,
}

/// Everything the dashboard shows for one user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub metrics: Metrics,
    pub macros: MacroBreakdown,
    pub spend_by_category: Vec<CategorySpend>,
    pub insights: Vec<Insight>,
    pub recipes: Vec<RecipeSuggestion>,
}

impl DashboardSnapshot {
    pub fn build(items: &[PurchasedItem]) -> Self {
        let summary = aggregate(items);

        if items.is_empty() {
            return Self {
                metrics: summary.metrics,
                macros: summary.macros,
                spend_by_category: summary.spend_by_category,
                insights: vec![Insight {
                    title: "Get started".to_string(),
                    message: "Add some receipts to see personalized insights.".to_string(),
                }],
                recipes: Vec::new(),
            };
        }

        let top_category = top_category(items);
        let category_count = group_by_category(items).len();
        let insights = build_insights(
            &top_category,
            items.len(),
            summary.metrics.total_spend,
            category_count,
        );
        let recipes = suggest_recipes(&top_category, &top_item(items), items.len());

        Self {
            metrics: summary.metrics,
            macros: summary.macros,
            spend_by_category: summary.spend_by_category,
            insights,
            recipes,
        }
    }
}

/// Category with the most items; ties go to the first seen
pub fn top_category(items: &[PurchasedItem]) -> String {
    most_common(group_by_category(items).into_iter().map(|(c, m)| (c, m.len())))
}

/// Raw item name bought most often; ties go to the first seen
pub fn top_item(items: &[PurchasedItem]) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(name, _)| *name == item.name) {
            Some((_, n)) => *n += 1,
            None => counts.push((item.name.clone(), 1)),
        }
    }
    let name = most_common(counts.into_iter());
    if name.is_empty() {
        "ingredients".to_string()
    } else {
        name
    }
}

fn most_common(counts: impl Iterator<Item = (String, usize)>) -> String {
    let mut best: Option<(String, usize)> = None;
    for (key, n) in counts {
        if best.as_ref().map_or(true, |(_, top)| n > *top) {
            best = Some((key, n));
        }
    }
    best.map(|(key, _)| key).unwrap_or_default()
}

fn build_insights(
    top_category: &str,
    item_count: usize,
    total_spend: f64,
    category_count: usize,
) -> Vec<Insight> {
    let first = if is_produce(top_category) {
        Insight {
            title: "Great produce choices".to_string(),
            message: format!(
                "Items like your {} are packed with iron and folate.",
                top_category
            ),
        }
    } else {
        let more_pct = ((item_count as f64 / 4.0) * 100.0) as i64;
        Insight {
            title: "Higher variety than last time".to_string(),
            message: format!("You're getting {}% more items compared to average.", more_pct),
        }
    };

    vec![
        first,
        Insight {
            title: "Budget insight".to_string(),
            message: format!(
                "Total spend: ${:.2} across {} categories.",
                total_spend, category_count
            ),
        },
    ]
}

fn suggest_recipes(top_category: &str, top_item: &str, item_count: usize) -> Vec<RecipeSuggestion> {
    vec![
        RecipeSuggestion {
            title: format!("{} Power Bowl", top_category),
            details: format!("Uses {} of {} items • 25 min", item_count, item_count + 2),
        },
        RecipeSuggestion {
            title: format!("Quick {} Salad", top_item),
            details: format!("Uses {} of 8 items • 10 min", item_count.min(5)),
        },
    ]
}
