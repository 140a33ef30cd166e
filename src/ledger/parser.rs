//! Ledger block parser
//!
//! Turns raw block text into a `LedgerStructure`. Pure and total: malformed
//! quantities degrade to 0, interactive lines are discarded, and the only
//! lookup is the default-serving resolution for quantity-less items.

use crate::ledger::line::{classify, parse_item, LedgerLine};
use crate::models::LedgerStructure;
use crate::nutrition::NutritionResolver;

/// Parser over one food-file table snapshot
pub struct LedgerParser<'a> {
    resolver: &'a NutritionResolver,
}

impl<'a> LedgerParser<'a> {
    pub fn new(resolver: &'a NutritionResolver) -> Self {
        Self { resolver }
    }

    /// Parse block text into meals and standalone items.
    ///
    /// A `meal:` header opens a meal scope; dash lines inside it are the
    /// meal's items. Any other line closes the scope and is a standalone
    /// item. A dash line with no open scope is treated as "any other line",
    /// so the dash stays part of the parsed name.
    pub fn parse(&self, text: &str) -> LedgerStructure {
        let mut structure = LedgerStructure::new();
        let mut current_meal: Option<String> = None;

        for raw in text.lines() {
            match classify(raw) {
                LedgerLine::Blank | LedgerLine::Interactive(_) => {}
                LedgerLine::MealHeader(name) => {
                    structure.meal_items_mut(name);
                    current_meal = Some(name.to_string());
                }
                LedgerLine::Bullet { raw, item } => match &current_meal {
                    Some(meal) => {
                        let parsed = parse_item(item);
                        let grams = self.resolver.item_grams(&parsed);
                        structure.add_meal_item(meal, &parsed.name, grams);
                    }
                    None => {
                        let parsed = parse_item(raw);
                        let grams = self.resolver.item_grams(&parsed);
                        structure.add_standalone_item(&parsed.name, grams);
                    }
                },
                LedgerLine::Standalone(line) => {
                    current_meal = None;
                    let parsed = parse_item(line);
                    let grams = self.resolver.item_grams(&parsed);
                    structure.add_standalone_item(&parsed.name, grams);
                }
            }
        }

        structure
    }
}
