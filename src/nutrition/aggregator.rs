//! Macro aggregation
//!
//! Walks ledger lines and produces nutrition totals: meal headers may carry a
//! `× N` multiplier, meals without explicit bullets expand their configured
//! template, every food reference goes through the resolver, and failed
//! references contribute zero without stopping the walk.
//!
//! Each item's calorie contribution is rounded to one decimal place before
//! accumulation, then all final totals are rounded once more. The cumulative
//! calorie rounding is a load-bearing compatibility detail.

use serde::Serialize;

use crate::ledger::line::{classify, parse_item, split_multiplier, ItemLine, LedgerLine};
use crate::models::{round1, Nutrition};
use crate::nutrition::resolver::{NutritionResolver, Resolution};
use crate::settings::MealTemplate;

/// Totals for one ledger in a multi-ledger rollup
#[derive(Debug, Clone, Serialize)]
pub struct LedgerBreakdown {
    pub id: String,
    pub totals: Nutrition,
}

/// Multi-ledger rollup: grand total plus per-ledger breakdown
#[derive(Debug, Clone, Default, Serialize)]
pub struct Rollup {
    pub aggregate: Nutrition,
    pub breakdown: Vec<LedgerBreakdown>,
}

/// A meal scope being collected during the walk
struct OpenMeal {
    name: String,
    multiplier: u32,
    bullets: Vec<ItemLine>,
}

/// Aggregator over one food-file table snapshot and the configured
/// meal templates
pub struct MacroAggregator<'a> {
    resolver: &'a NutritionResolver,
    templates: &'a [MealTemplate],
}

impl<'a> MacroAggregator<'a> {
    pub fn new(resolver: &'a NutritionResolver, templates: &'a [MealTemplate]) -> Self {
        Self { resolver, templates }
    }

    /// Aggregate one ledger's lines into nutrition totals
    pub fn aggregate<I, S>(&self, lines: I) -> Nutrition
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut totals = Nutrition::zero();
        let mut open: Option<OpenMeal> = None;

        for raw in lines {
            match classify(raw.as_ref()) {
                LedgerLine::Blank | LedgerLine::Interactive(_) => {}
                LedgerLine::MealHeader(raw_name) => {
                    self.finalize_meal(&mut totals, open.take());
                    let (name, multiplier) = split_multiplier(raw_name);
                    open = Some(OpenMeal {
                        name: name.to_string(),
                        multiplier,
                        bullets: Vec::new(),
                    });
                }
                LedgerLine::Bullet { raw, item } => match open.as_mut() {
                    Some(meal) => meal.bullets.push(parse_item(item)),
                    None => self.add_item(&mut totals, &parse_item(raw), 1.0),
                },
                LedgerLine::Standalone(line) => {
                    self.finalize_meal(&mut totals, open.take());
                    self.add_item(&mut totals, &parse_item(line), 1.0);
                }
            }
        }

        self.finalize_meal(&mut totals, open.take());
        totals.round1()
    }

    /// Count a finished meal: explicit bullets when present, otherwise the
    /// matching template's expansion, all scaled by the meal multiplier
    fn finalize_meal(&self, totals: &mut Nutrition, open: Option<OpenMeal>) {
        let Some(meal) = open else {
            return;
        };
        let factor = f64::from(meal.multiplier);
        if meal.bullets.is_empty() {
            if let Some(template) = crate::ledger::find_template(self.templates, &meal.name) {
                for item_text in &template.items {
                    self.add_item(totals, &parse_item(item_text), factor);
                }
            }
        } else {
            for item in &meal.bullets {
                self.add_item(totals, item, factor);
            }
        }
    }

    /// Resolve one reference and accumulate its contribution.
    ///
    /// Failed resolutions contribute zero; the walk continues.
    fn add_item(&self, totals: &mut Nutrition, item: &ItemLine, factor: f64) {
        let grams = self.resolver.item_grams(item) * factor;
        match self.resolver.resolve(&item.name) {
            Resolution::Resolved(food) => {
                let contribution = food.nutrition_for_grams(grams);
                totals.calories += round1(contribution.calories);
                totals.protein += contribution.protein;
                totals.carbs += contribution.carbs;
                totals.fat += contribution.fat;
            }
            Resolution::Ambiguous { .. } => {
                // Already warned by the resolver
            }
            Resolution::NotFound => {
                tracing::warn!("No food file matches '{}'; contributes nothing", item.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FoodFile;

    fn food(name: &str, serving: f64, calories: f64, protein: f64) -> FoodFile {
        FoodFile {
            name: name.to_string(),
            serving_grams: Some(serving),
            nutrition: Nutrition {
                calories,
                protein,
                carbs: 0.0,
                fat: 0.0,
            },
        }
    }

    fn resolver() -> NutritionResolver {
        NutritionResolver::new(vec![
            food("Oatmeal", 100.0, 380.0, 13.0),
            food("Banana", 100.0, 89.0, 1.1),
            food("Chicken Breast", 100.0, 165.0, 31.0),
            food("Chicken Breast Grilled", 100.0, 150.0, 29.0),
        ])
    }

    fn aggregate(lines: &[&str], templates: &[MealTemplate]) -> Nutrition {
        let r = resolver();
        MacroAggregator::new(&r, templates).aggregate(lines.iter().copied())
    }

    #[test]
    fn test_simple_totals() {
        let totals = aggregate(&["meal:Breakfast", "- Oatmeal:50g", "- Banana:120g"], &[]);
        // 380 * 0.5 = 190, 89 * 1.2 = 106.8
        assert_eq!(totals.calories, 296.8);
        assert_eq!(totals.protein, 7.8);
    }

    #[test]
    fn test_meal_multiplier_scales_bullets() {
        let totals = aggregate(&["meal:Breakfast × 2", "- Oatmeal:50g"], &[]);
        assert_eq!(totals.calories, 380.0);
        assert_eq!(totals.protein, 13.0);
    }

    #[test]
    fn test_meal_without_bullets_expands_template() {
        let templates = vec![MealTemplate {
            name: "Breakfast".to_string(),
            items: vec!["Oatmeal:50g".to_string(), "Banana:100g".to_string()],
        }];
        let totals = aggregate(&["meal:Breakfast"], &templates);
        assert_eq!(totals.calories, 279.0);

        // With the multiplier the expansion doubles too
        let doubled = aggregate(&["meal:Breakfast × 2"], &templates);
        assert_eq!(doubled.calories, 558.0);
    }

    #[test]
    fn test_explicit_bullets_override_template() {
        let templates = vec![MealTemplate {
            name: "Breakfast".to_string(),
            items: vec!["Oatmeal:500g".to_string()],
        }];
        let totals = aggregate(&["meal:Breakfast", "- Banana:100g"], &templates);
        assert_eq!(totals.calories, 89.0);
    }

    #[test]
    fn test_ambiguous_reference_contributes_zero() {
        let totals = aggregate(&["Chicken:200g", "Banana:100g"], &[]);
        assert_eq!(totals.calories, 89.0);
    }

    #[test]
    fn test_unknown_food_contributes_zero_and_walk_continues() {
        let totals = aggregate(&["Tofu:200g", "Banana:100g"], &[]);
        assert_eq!(totals.calories, 89.0);
    }

    #[test]
    fn test_calorie_rounding_is_cumulative_per_item() {
        let r = NutritionResolver::new(vec![food("Cracker", 100.0, 33.33, 0.0)]);
        let aggregator = MacroAggregator::new(&r, &[]);
        // Each 50 g item contributes 16.665, rounded to 16.7 BEFORE summing:
        // 16.7 + 16.7 = 33.4. Rounding only at the end would give 33.3.
        let totals = aggregator.aggregate(["Cracker:50g", "Cracker:50g"]);
        assert_eq!(totals.calories, 33.4);
    }

    #[test]
    fn test_final_totals_rounded_to_one_decimal() {
        let r = NutritionResolver::new(vec![food("Nibs", 100.0, 10.0, 1.234)]);
        let aggregator = MacroAggregator::new(&r, &[]);
        let totals = aggregator.aggregate(["Nibs:100g"]);
        assert_eq!(totals.protein, 1.2);
    }

    #[test]
    fn test_interactive_lines_do_not_count() {
        let totals = aggregate(&["interactive: Banana:100g", "Banana:100g"], &[]);
        assert_eq!(totals.calories, 89.0);
    }

    #[test]
    fn test_empty_ledger_totals_are_zero() {
        assert_eq!(aggregate(&[], &[]), Nutrition::zero());
    }
}
