//! Ledger line grammar
//!
//! Every raw line of a ledger block classifies to exactly one form. The
//! passes that walk blocks (parser, aggregator) share this classification and
//! the item rule; the merge engine reuses the prefix and item helpers but
//! keeps its own scope rules for pending input.

/// Prefix marking merge-input channel lines
pub const INTERACTIVE_PREFIX: &str = "interactive:";

/// Prefix opening a meal scope
pub const MEAL_PREFIX: &str = "meal:";

/// Prefix opening an ad-hoc group in pending input
pub const GROUP_PREFIX: &str = "group:";

/// One classified ledger line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerLine<'a> {
    Blank,
    /// Merge-input line; payload is the text after the marker
    Interactive(&'a str),
    /// `meal:` header. The raw name text; any multiplier suffix is left in
    /// place and only interpreted by the aggregation pass.
    MealHeader(&'a str),
    /// Dash-prefixed line. `item` is the text after the dash, `raw` the full
    /// trimmed line for passes that treat stray bullets as standalone items.
    Bullet { raw: &'a str, item: &'a str },
    /// Anything else; parsed as a standalone item
    Standalone(&'a str),
}

/// Classify one raw line
pub fn classify(raw: &str) -> LedgerLine<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return LedgerLine::Blank;
    }
    if let Some(rest) = strip_prefix_ci(line, INTERACTIVE_PREFIX) {
        return LedgerLine::Interactive(rest.trim());
    }
    if let Some(name) = strip_prefix_ci(line, MEAL_PREFIX) {
        return LedgerLine::MealHeader(name.trim());
    }
    if let Some(rest) = line.strip_prefix('-') {
        return LedgerLine::Bullet {
            raw: line,
            item: rest.trim(),
        };
    }
    LedgerLine::Standalone(line)
}

/// Strip a case-insensitive ASCII prefix
pub fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    match line.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => line.get(prefix.len()..),
        _ => None,
    }
}

/// Parsed quantity of one item line
///
/// The distinction is observable to callers and tests; totals degrade
/// `Malformed` to 0 and resolve `Unspecified` from the food record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity {
    /// Explicit gram amount
    Explicit(f64),
    /// A quantity token was present but did not parse; counts as 0
    Malformed,
    /// No quantity given; default to the food's serving size, else 100 g
    Unspecified,
}

/// One parsed `name[:quantity]` item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemLine {
    pub name: String,
    pub quantity: Quantity,
}

/// The shared item rule: split on the first colon, strip a trailing `g`
pub fn parse_item(text: &str) -> ItemLine {
    match text.split_once(':') {
        Some((name, token)) => ItemLine {
            name: name.trim().to_string(),
            quantity: parse_quantity(token),
        },
        None => ItemLine {
            name: text.trim().to_string(),
            quantity: Quantity::Unspecified,
        },
    }
}

/// Parse a quantity token like `200g`, `80.5`, `200G`
pub fn parse_quantity(token: &str) -> Quantity {
    let token = token.trim();
    let number = token
        .strip_suffix('g')
        .or_else(|| token.strip_suffix('G'))
        .unwrap_or(token)
        .trim();
    match number.parse::<f64>() {
        Ok(value) => Quantity::Explicit(value),
        Err(_) => Quantity::Malformed,
    }
}

/// Split an aggregation-path meal name into base name and multiplier
///
/// Recognizes `<name> × <integer>` with the Unicode multiplication sign. Any
/// other shape is an ordinary name with multiplier 1. The parse/serialize
/// path never calls this; multipliers are calculation-time only.
pub fn split_multiplier(name: &str) -> (&str, u32) {
    if let Some((base, suffix)) = name.rsplit_once('×') {
        if let Ok(multiplier) = suffix.trim().parse::<u32>() {
            return (base.trim_end(), multiplier);
        }
    }
    (name, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_forms() {
        assert_eq!(classify("   "), LedgerLine::Blank);
        assert_eq!(
            classify("meal:Breakfast"),
            LedgerLine::MealHeader("Breakfast")
        );
        assert_eq!(classify("MEAL: Lunch"), LedgerLine::MealHeader("Lunch"));
        assert_eq!(
            classify("- Oatmeal:50g"),
            LedgerLine::Bullet {
                raw: "- Oatmeal:50g",
                item: "Oatmeal:50g"
            }
        );
        assert_eq!(classify("Eggs:100g"), LedgerLine::Standalone("Eggs:100g"));
        assert_eq!(
            classify("interactive: meal:Breakfast"),
            LedgerLine::Interactive("meal:Breakfast")
        );
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("200g"), Quantity::Explicit(200.0));
        assert_eq!(parse_quantity("200G"), Quantity::Explicit(200.0));
        assert_eq!(parse_quantity(" 80.5 "), Quantity::Explicit(80.5));
        assert_eq!(parse_quantity("abc"), Quantity::Malformed);
        assert_eq!(parse_quantity(""), Quantity::Malformed);
    }

    #[test]
    fn test_parse_item() {
        let item = parse_item("Rice:200g");
        assert_eq!(item.name, "Rice");
        assert_eq!(item.quantity, Quantity::Explicit(200.0));

        let item = parse_item("Rice:abc");
        assert_eq!(item.quantity, Quantity::Malformed);

        let item = parse_item("Banana");
        assert_eq!(item.name, "Banana");
        assert_eq!(item.quantity, Quantity::Unspecified);
    }

    #[test]
    fn test_split_multiplier() {
        assert_eq!(split_multiplier("Breakfast × 2"), ("Breakfast", 2));
        assert_eq!(split_multiplier("Breakfast ×3"), ("Breakfast", 3));
        assert_eq!(split_multiplier("Breakfast"), ("Breakfast", 1));
        // A non-integer suffix is just part of the name
        assert_eq!(split_multiplier("Mix × two"), ("Mix × two", 1));
    }
}
