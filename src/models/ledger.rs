//! Ledger structure model
//!
//! The parsed form of one ledger block: named meals with their items, plus
//! standalone items outside any meal. Built fresh on every parse; it carries
//! no identity beyond the block ID it came from.

use indexmap::IndexMap;

/// Ordered food name -> grams mapping for one scope
pub type ItemMap = IndexMap<String, f64>;

/// Parsed content of a ledger block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerStructure {
    /// Meals in first-seen order; item maps keep insertion order
    pub meals: IndexMap<String, ItemMap>,
    /// Items logged outside any meal
    pub standalone_items: ItemMap,
}

impl LedgerStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty() && self.standalone_items.is_empty()
    }

    /// Item map for a meal, created on first use.
    ///
    /// Meal names match case-insensitively; the first-seen spelling is kept
    /// as the map key.
    pub fn meal_items_mut(&mut self, name: &str) -> &mut ItemMap {
        let existing = self
            .meals
            .keys()
            .find(|k| k.to_lowercase() == name.to_lowercase())
            .cloned();
        let key = existing.unwrap_or_else(|| name.to_string());
        self.meals.entry(key).or_default()
    }

    /// Look up a meal's items case-insensitively
    pub fn meal_items(&self, name: &str) -> Option<&ItemMap> {
        self.meals
            .iter()
            .find(|(k, _)| k.to_lowercase() == name.to_lowercase())
            .map(|(_, items)| items)
    }

    /// Add grams of a food to a meal, accumulating with any existing quantity
    pub fn add_meal_item(&mut self, meal: &str, food: &str, grams: f64) {
        accumulate(self.meal_items_mut(meal), food, grams);
    }

    /// Add grams of a standalone food, accumulating with any existing quantity
    pub fn add_standalone_item(&mut self, food: &str, grams: f64) {
        accumulate(&mut self.standalone_items, food, grams);
    }

    /// Every (food, grams) pair across all scopes, meals first
    pub fn all_items(&self) -> impl Iterator<Item = (&str, f64)> {
        self.meals
            .values()
            .flat_map(|items| items.iter())
            .chain(self.standalone_items.iter())
            .map(|(food, grams)| (food.as_str(), *grams))
    }
}

/// Accumulate grams under a food name, never overwriting
pub fn accumulate(items: &mut ItemMap, food: &str, grams: f64) {
    *items.entry(food.to_string()).or_insert(0.0) += grams;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_quantities() {
        let mut structure = LedgerStructure::new();
        structure.add_meal_item("Breakfast", "Oatmeal", 50.0);
        structure.add_meal_item("Breakfast", "Oatmeal", 30.0);
        assert_eq!(structure.meals["Breakfast"]["Oatmeal"], 80.0);
    }

    #[test]
    fn test_meal_names_match_case_insensitively() {
        let mut structure = LedgerStructure::new();
        structure.add_meal_item("Breakfast", "Oatmeal", 50.0);
        structure.add_meal_item("breakfast", "Banana", 120.0);
        assert_eq!(structure.meals.len(), 1);
        // First-seen spelling wins
        assert!(structure.meals.contains_key("Breakfast"));
        assert_eq!(structure.meals["Breakfast"]["Banana"], 120.0);
    }

    #[test]
    fn test_food_names_are_exact_within_a_scope() {
        let mut structure = LedgerStructure::new();
        structure.add_standalone_item("Eggs", 100.0);
        structure.add_standalone_item("eggs", 50.0);
        assert_eq!(structure.standalone_items.len(), 2);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut structure = LedgerStructure::new();
        structure.add_standalone_item("Eggs", 100.0);
        structure.add_standalone_item("Apple", 80.0);
        let names: Vec<_> = structure.standalone_items.keys().collect();
        assert_eq!(names, vec!["Eggs", "Apple"]);
    }
}
