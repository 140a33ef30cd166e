//! Interactive merge engine
//!
//! Folds pending interactive additions into ledger structures. Pending lines
//! are a transient merge-input channel: `meal:` applies a configured
//! template, `group:` opens an ad-hoc meal built from the `- ` bullets that
//! follow, anything else is a standalone item. Merging accumulates
//! quantities, never overwrites.

use crate::ledger::line::{
    parse_item, strip_prefix_ci, GROUP_PREFIX, INTERACTIVE_PREFIX, MEAL_PREFIX,
};
use crate::models::{accumulate, ItemMap, LedgerStructure};
use crate::nutrition::NutritionResolver;
use crate::settings::MealTemplate;

/// Merge engine over one food-file table snapshot and the configured
/// meal templates
pub struct InteractiveMergeEngine<'a> {
    resolver: &'a NutritionResolver,
    templates: &'a [MealTemplate],
}

impl<'a> InteractiveMergeEngine<'a> {
    pub fn new(resolver: &'a NutritionResolver, templates: &'a [MealTemplate]) -> Self {
        Self { resolver, templates }
    }

    /// Build the structure described by pending addition lines.
    ///
    /// Unknown template names are a silent no-op. Group bullets require the
    /// literal `- ` prefix; a dash without the space is not a group bullet.
    pub fn build_new_items(&self, pending: &[String]) -> LedgerStructure {
        let mut items = LedgerStructure::new();
        let mut group: Option<(String, ItemMap)> = None;

        for raw in pending {
            let mut line = raw.trim();
            if let Some(rest) = strip_prefix_ci(line, INTERACTIVE_PREFIX) {
                line = rest.trim();
            }
            if line.is_empty() {
                continue;
            }

            if let Some(name) = strip_prefix_ci(line, MEAL_PREFIX) {
                Self::finalize_group(&mut items, &mut group);
                self.apply_template(&mut items, name.trim());
            } else if let Some(name) = strip_prefix_ci(line, GROUP_PREFIX) {
                Self::finalize_group(&mut items, &mut group);
                group = Some((name.trim().to_string(), ItemMap::new()));
            } else if let (Some((_, group_items)), Some(item_text)) =
                (group.as_mut(), line.strip_prefix("- "))
            {
                let item = parse_item(item_text);
                let grams = self.resolver.item_grams(&item);
                accumulate(group_items, &item.name, grams);
            } else {
                Self::finalize_group(&mut items, &mut group);
                let item = parse_item(line);
                let grams = self.resolver.item_grams(&item);
                items.add_standalone_item(&item.name, grams);
            }
        }

        Self::finalize_group(&mut items, &mut group);
        items
    }

    /// Expand a template under its configured name; no-op when unknown
    fn apply_template(&self, items: &mut LedgerStructure, name: &str) {
        let Some(template) = find_template(self.templates, name) else {
            return;
        };
        for item_text in &template.items {
            let item = parse_item(item_text);
            let grams = self.resolver.item_grams(&item);
            items.add_meal_item(&template.name, &item.name, grams);
        }
    }

    fn finalize_group(items: &mut LedgerStructure, group: &mut Option<(String, ItemMap)>) {
        if let Some((name, group_items)) = group.take() {
            let slot = items.meal_items_mut(&name);
            for (food, grams) in group_items {
                accumulate(slot, &food, grams);
            }
        }
    }

    /// Merge new items into a snapshot of the existing structure.
    ///
    /// A new meal is inserted wholesale; an existing meal (matched
    /// case-insensitively) gets the new quantities added on top. Standalone
    /// items merge the same way.
    pub fn merge(existing: &LedgerStructure, new_items: &LedgerStructure) -> LedgerStructure {
        let mut merged = existing.clone();
        for (meal, items) in &new_items.meals {
            let slot = merged.meal_items_mut(meal);
            for (food, grams) in items {
                accumulate(slot, food, *grams);
            }
        }
        for (food, grams) in &new_items.standalone_items {
            merged.add_standalone_item(food, *grams);
        }
        merged
    }
}

/// Case-insensitive template lookup
pub fn find_template<'t>(templates: &'t [MealTemplate], name: &str) -> Option<&'t MealTemplate> {
    templates
        .iter()
        .find(|t| t.name.to_lowercase() == name.to_lowercase())
}
