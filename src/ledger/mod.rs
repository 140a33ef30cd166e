//! Ledger mini-language
//!
//! Line grammar, block parser, interactive merge, and canonical serializer
//! for the food-log text format.

pub mod line;
pub mod merge;
pub mod parser;
pub mod serializer;

pub use line::{classify, parse_item, ItemLine, LedgerLine, Quantity};
pub use merge::{find_template, InteractiveMergeEngine};
pub use parser::LedgerParser;
pub use serializer::{format_grams, serialize};
