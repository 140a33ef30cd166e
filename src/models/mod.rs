//! Data models
//!
//! Rust structs for ledger content and nutrition records.

mod food_file;
mod ledger;
mod nutrition;

pub use food_file::FoodFile;
pub use ledger::{accumulate, ItemMap, LedgerStructure};
pub use nutrition::{round1, Nutrition};
