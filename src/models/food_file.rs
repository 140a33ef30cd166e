//! Food file model
//!
//! A per-food nutrition record maintained outside the engine. The engine only
//! reads these; creation and editing belong to the storage layer.

use serde::{Deserialize, Serialize};

use super::Nutrition;

/// A food record: one serving's nutrition plus the serving weight.
///
/// When `serving_grams` is absent the nutrition values are read as per-100g.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodFile {
    pub name: String,
    pub serving_grams: Option<f64>,
    pub nutrition: Nutrition,
}

impl FoodFile {
    /// Serving weight used when a ledger item carries no explicit quantity.
    ///
    /// Falls back to 100 g when the record has no usable serving size.
    pub fn default_serving_grams(&self) -> f64 {
        match self.serving_grams {
            Some(g) if g > 0.0 => g,
            _ => 100.0,
        }
    }

    /// Nutrition for a requested gram amount, scaled proportionally from the
    /// record's per-serving (or per-100g) values.
    pub fn nutrition_for_grams(&self, grams: f64) -> Nutrition {
        let basis = self.default_serving_grams();
        self.nutrition.scale(grams / basis)
    }
}
