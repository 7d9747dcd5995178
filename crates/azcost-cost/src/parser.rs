//! Row parser for untyped cost query results.
//!
//! The cost query returns each row as a list of loosely typed values whose
//! order is not part of any contract. [`RowParser::parse_row`] classifies
//! every field by its shape instead:
//!
//! - digits with at most one decimal point: the cost
//! - a known currency code, or any three uppercase letters: the currency
//! - anything starting with `/subscriptions/`: the resource path
//!
//! When several fields share a shape, the last one wins.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::trace;

use crate::classifier::classify;
use crate::error::{CostError, Result};
use crate::models::{CostRow, DEFAULT_CURRENCY, ResourceCost};

/// Prefix identifying a resource path field.
pub const RESOURCE_PATH_PREFIX: &str = "/subscriptions/";

static COST_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.?\d*$").expect("cost pattern is valid"));

static CURRENCY_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency pattern is valid"));

/// Currency codes recognized by name.
pub const KNOWN_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CHF", "CNY", "INR", "BRL", "SEK", "NOK", "DKK",
    "NZD", "KRW", "ZAR",
];

/// Typed fields extracted from one [`CostRow`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// Cost, zero when no numeric field was present
    pub cost: Decimal,

    /// Currency, USD when no currency field was present
    pub currency: String,

    /// Resource path, empty when no path field was present
    pub resource_path: String,
}

impl Default for ParsedRow {
    fn default() -> Self {
        Self {
            cost: Decimal::ZERO,
            currency: DEFAULT_CURRENCY.to_string(),
            resource_path: String::new(),
        }
    }
}

impl ParsedRow {
    /// Whether the row can be attributed to a resource.
    pub fn is_attributable(&self) -> bool {
        !self.resource_path.is_empty()
    }

    /// Turn the row into a [`ResourceCost`] for `resource_group`.
    ///
    /// Returns `None` when the row has no resource path.
    pub fn into_resource_cost(self, resource_group: &str) -> Option<ResourceCost> {
        if !self.is_attributable() {
            return None;
        }

        let resource = classify(&self.resource_path);
        Some(ResourceCost::new(
            resource_group,
            resource.name,
            resource.resource_type,
            self.cost,
            self.currency,
        ))
    }
}

/// Shape-based classifier for cost query rows.
#[derive(Debug, Clone)]
pub struct RowParser {
    currencies: HashSet<String>,
}

impl RowParser {
    /// Create a parser recognizing [`KNOWN_CURRENCIES`].
    pub fn new() -> Self {
        Self::with_currencies(KNOWN_CURRENCIES.iter().copied())
    }

    /// Create a parser recognizing a custom set of currency codes.
    pub fn with_currencies<I, S>(currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            currencies: currencies.into_iter().map(Into::into).collect(),
        }
    }

    /// Classify every field of `row`.
    ///
    /// Fails only when a cost-shaped field cannot be represented as a
    /// decimal; callers skip such rows.
    pub fn parse_row(&self, row: &CostRow) -> Result<ParsedRow> {
        let mut parsed = ParsedRow::default();

        for field in row.fields() {
            if COST_SHAPE.is_match(&field) {
                parsed.cost = parse_amount(&field)?;
            } else if self.is_currency(&field) {
                parsed.currency = field;
            } else if field.starts_with(RESOURCE_PATH_PREFIX) {
                parsed.resource_path = field;
            } else {
                trace!(field = %field, "ignoring unclassified field");
            }
        }

        Ok(parsed)
    }

    fn is_currency(&self, field: &str) -> bool {
        self.currencies.contains(field) || CURRENCY_SHAPE.is_match(field)
    }
}

impl Default for RowParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a cost-shaped field ("12", "12.50", "12.") into a decimal.
fn parse_amount(field: &str) -> Result<Decimal> {
    let digits = field.strip_suffix('.').unwrap_or(field);
    Decimal::from_str(digits).map_err(|e| CostError::RowParse(format!("amount '{field}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const VM_PATH: &str =
        "/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1";

    #[test]
    fn test_parse_typical_row() {
        let parser = RowParser::new();
        let row = CostRow(vec![json!(12.5), json!(VM_PATH), json!("USD")]);

        let parsed = parser.parse_row(&row).unwrap();
        assert_eq!(parsed.cost, dec("12.5"));
        assert_eq!(parsed.currency, "USD");
        assert_eq!(parsed.resource_path, VM_PATH);
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let parser = RowParser::new();
        let fields = ["3.75", "EUR", VM_PATH];
        let permutations = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];

        let expected = parser.parse_row(&CostRow::from_strings(fields)).unwrap();

        for order in permutations {
            let row = CostRow::from_strings(order.iter().map(|&i| fields[i]));
            assert_eq!(parser.parse_row(&row).unwrap(), expected, "order {order:?}");
        }
    }

    #[test]
    fn test_defaults_when_nothing_matches() {
        let parser = RowParser::new();
        let row = CostRow::from_strings(["Microsoft.Compute", "eastus", "-4.2"]);

        let parsed = parser.parse_row(&row).unwrap();
        assert_eq!(parsed, ParsedRow::default());
        assert!(!parsed.is_attributable());
    }

    #[test]
    fn test_row_without_path_is_not_attributable() {
        let parser = RowParser::new();
        let row = CostRow(vec![json!(99.0), json!("USD")]);

        let parsed = parser.parse_row(&row).unwrap();
        assert_eq!(parsed.cost, dec("99.0"));
        assert!(parsed.into_resource_cost("rg1").is_none());
    }

    #[test]
    fn test_last_match_wins() {
        let parser = RowParser::new();
        let row =
            CostRow::from_strings(["1.00", "2.00", "USD", "GBP", "/subscriptions/a", VM_PATH]);

        let parsed = parser.parse_row(&row).unwrap();
        assert_eq!(parsed.cost, dec("2.00"));
        assert_eq!(parsed.currency, "GBP");
        assert_eq!(parsed.resource_path, VM_PATH);
    }

    #[test]
    fn test_generic_currency_shape() {
        let parser = RowParser::with_currencies(["USD"]);
        let row = CostRow::from_strings(["XYZ", VM_PATH]);
        assert_eq!(parser.parse_row(&row).unwrap().currency, "XYZ");

        // lowercase or wrong length is not a currency
        let row = CostRow::from_strings(["usd", "EURO", VM_PATH]);
        assert_eq!(parser.parse_row(&row).unwrap().currency, "USD");
    }

    #[test]
    fn test_integer_and_trailing_point_costs() {
        let parser = RowParser::new();
        assert_eq!(parser.parse_row(&CostRow(vec![json!(7)])).unwrap().cost, dec("7"));
        assert_eq!(parser.parse_row(&CostRow::from_strings(["12."])).unwrap().cost, dec("12"));
    }

    #[test]
    fn test_out_of_range_cost_is_row_error() {
        let parser = RowParser::new();
        let huge = "9".repeat(40);
        let row = CostRow::from_strings([huge.as_str(), "USD", VM_PATH]);

        let err = parser.parse_row(&row).unwrap_err();
        assert!(matches!(err, CostError::RowParse(_)));
    }

    #[test]
    fn test_into_resource_cost_classifies_path() {
        let parser = RowParser::new();
        let row = CostRow(vec![json!("USD"), json!(VM_PATH), json!(4.5)]);

        let cost = parser
            .parse_row(&row)
            .unwrap()
            .into_resource_cost("rg1")
            .unwrap();
        assert_eq!(cost.resource_group, "rg1");
        assert_eq!(cost.resource, "vm1");
        assert_eq!(cost.resource_type, "Microsoft.Compute/virtualMachines");
        assert_eq!(cost.cost, dec("4.5"));
        assert_eq!(cost.currency, "USD");
    }

    #[test]
    fn test_path_with_no_cost_defaults_to_zero() {
        let parser = RowParser::new();
        let cost = parser
            .parse_row(&CostRow::from_strings([VM_PATH]))
            .unwrap()
            .into_resource_cost("rg1")
            .unwrap();
        assert_eq!(cost.cost, Decimal::ZERO);
        assert_eq!(cost.currency, "USD");
    }
}
