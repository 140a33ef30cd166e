//! Nutrition calculation module
//!
//! Food reference resolution and macro aggregation.

pub mod aggregator;
pub mod resolver;

pub use aggregator::{LedgerBreakdown, MacroAggregator, Rollup};
pub use resolver::{NutritionResolver, Resolution};
