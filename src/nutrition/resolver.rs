//! Food reference resolution
//!
//! Resolves a food name from ledger text against the food-file table using
//! the exact-then-substring matching policy. The resolver works over a
//! snapshot of the table; the engine rebuilds it from the vault cache per
//! cycle, so a resolver is always consistent with one point in time.

use crate::ledger::line::{ItemLine, Quantity};
use crate::models::FoodFile;

/// Outcome of resolving one food name
#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved(FoodFile),
    /// More than one substring match; resolution fails and the reference
    /// contributes nothing
    Ambiguous { candidates: Vec<String> },
    NotFound,
}

impl Resolution {
    pub fn food(&self) -> Option<&FoodFile> {
        match self {
            Resolution::Resolved(food) => Some(food),
            _ => None,
        }
    }
}

/// Resolver over a food-file table snapshot
pub struct NutritionResolver {
    foods: Vec<FoodFile>,
}

impl NutritionResolver {
    pub fn new(foods: Vec<FoodFile>) -> Self {
        Self { foods }
    }

    /// Resolve a food name query.
    ///
    /// Policy, in order: a single case-insensitive exact name match wins;
    /// otherwise a single substring match wins; several substring matches are
    /// ambiguous (warned, failed); none is a silent failure. There is no
    /// ranking beyond counting hits.
    pub fn resolve(&self, query: &str) -> Resolution {
        let needle = query.trim().to_lowercase();

        let exact: Vec<&FoodFile> = self
            .foods
            .iter()
            .filter(|f| f.name.to_lowercase() == needle)
            .collect();
        if exact.len() == 1 {
            return Resolution::Resolved(exact[0].clone());
        }

        let partial: Vec<&FoodFile> = self
            .foods
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .collect();
        match partial.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Resolved(partial[0].clone()),
            n => {
                let candidates: Vec<String> =
                    partial.iter().map(|f| f.name.clone()).collect();
                tracing::warn!(
                    "Ambiguous food reference '{}': {} matches ({})",
                    query,
                    n,
                    candidates.join(", ")
                );
                Resolution::Ambiguous { candidates }
            }
        }
    }

    /// Serving size used when an item carries no quantity: the matched food's
    /// serving weight, else 100 g
    pub fn default_serving_grams(&self, name: &str) -> f64 {
        match self.resolve(name) {
            Resolution::Resolved(food) => food.default_serving_grams(),
            _ => 100.0,
        }
    }

    /// Gram amount of one parsed item under the quantity rules
    pub fn item_grams(&self, item: &ItemLine) -> f64 {
        match item.quantity {
            Quantity::Explicit(grams) => grams,
            Quantity::Malformed => 0.0,
            Quantity::Unspecified => self.default_serving_grams(&item.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Nutrition;

    fn food(name: &str, serving: Option<f64>) -> FoodFile {
        FoodFile {
            name: name.to_string(),
            serving_grams: serving,
            nutrition: Nutrition {
                calories: 100.0,
                protein: 10.0,
                carbs: 10.0,
                fat: 1.0,
            },
        }
    }

    fn resolver() -> NutritionResolver {
        NutritionResolver::new(vec![
            food("Chicken Breast", Some(120.0)),
            food("Chicken Breast Grilled", Some(150.0)),
            food("Oatmeal", Some(50.0)),
        ])
    }

    #[test]
    fn test_exact_match_wins() {
        match resolver().resolve("chicken breast") {
            Resolution::Resolved(f) => assert_eq!(f.name, "Chicken Breast"),
            other => panic!("expected resolved, got {:?}", other),
        }
    }

    #[test]
    fn test_unique_partial_match() {
        match resolver().resolve("oat") {
            Resolution::Resolved(f) => assert_eq!(f.name, "Oatmeal"),
            other => panic!("expected resolved, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_partial_matches_are_ambiguous() {
        match resolver().resolve("chicken") {
            Resolution::Ambiguous { candidates } => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_no_match_is_not_found() {
        assert!(matches!(
            resolver().resolve("tofu"),
            Resolution::NotFound
        ));
    }

    #[test]
    fn test_default_serving() {
        let r = resolver();
        assert_eq!(r.default_serving_grams("Oatmeal"), 50.0);
        // Unknown and ambiguous names fall back to 100 g
        assert_eq!(r.default_serving_grams("tofu"), 100.0);
        assert_eq!(r.default_serving_grams("chicken"), 100.0);
    }

    #[test]
    fn test_item_grams() {
        use crate::ledger::line::parse_item;
        let r = resolver();
        assert_eq!(r.item_grams(&parse_item("Rice:200g")), 200.0);
        assert_eq!(r.item_grams(&parse_item("Rice:abc")), 0.0);
        assert_eq!(r.item_grams(&parse_item("Oatmeal")), 50.0);
        assert_eq!(r.item_grams(&parse_item("Mystery")), 100.0);
    }
}
