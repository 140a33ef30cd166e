//! Canonical ledger serializer
//!
//! Emits the persisted form of a structure: every meal section first, then
//! every standalone item. Downstream parsing and the round-trip contract
//! depend on this ordering being stable.

use crate::models::LedgerStructure;

/// Serialize a structure to canonical block text
pub fn serialize(structure: &LedgerStructure) -> String {
    let mut lines = Vec::new();
    for (meal, items) in &structure.meals {
        lines.push(format!("meal:{}", meal));
        for (food, grams) in items {
            lines.push(format!("- {}:{}g", food, format_grams(*grams)));
        }
    }
    for (food, grams) in &structure.standalone_items {
        lines.push(format!("{}:{}g", food, format_grams(*grams)));
    }
    lines.join("\n")
}

/// Shortest rendering of a gram quantity: no decimal point for integral
/// values, natural float rendering otherwise
pub fn format_grams(grams: f64) -> String {
    if grams.fract() == 0.0 && grams.abs() < 1e15 {
        format!("{}", grams as i64)
    } else {
        format!("{}", grams)
    }
}
