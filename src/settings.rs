//! Settings
//!
//! User configuration consumed read-only by the merge and aggregation paths:
//! reusable meal templates and the food-file folder. Loaded from a JSON file;
//! a missing or unreadable file yields defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A reusable list of default food items for a meal name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealTemplate {
    pub name: String,
    /// `food[:quantity]` strings, same grammar as ledger items
    #[serde(default)]
    pub items: Vec<String>,
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub meal_templates: Vec<MealTemplate>,
    /// Vault folder holding the per-food record files
    #[serde(default = "default_food_folder")]
    pub food_folder: String,
}

fn default_food_folder() -> String {
    "Nutrition".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            meal_templates: Vec::new(),
            food_folder: default_food_folder(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults when the
    /// file is missing or malformed
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Malformed settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_defaults() {
        let settings: Settings = serde_json::from_str(
            r#"{"meal_templates": [{"name": "Breakfast", "items": ["Oatmeal:50g"]}]}"#,
        )
        .expect("settings should parse");
        assert_eq!(settings.meal_templates.len(), 1);
        assert_eq!(settings.food_folder, "Nutrition");
    }

    #[test]
    fn test_empty_object_parses() {
        let settings: Settings = serde_json::from_str("{}").expect("settings should parse");
        assert!(settings.meal_templates.is_empty());
    }
}
