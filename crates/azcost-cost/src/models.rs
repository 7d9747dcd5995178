//! Data models for cost reporting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Currency assumed when a row carries none.
pub const DEFAULT_CURRENCY: &str = "USD";

/// One untyped result row from a cost query.
///
/// Field order and count are not fixed by the service, so nothing in
/// azcost indexes into a row by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostRow(pub Vec<Value>);

impl CostRow {
    /// Build a row from string fields.
    pub fn from_strings<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(|f| Value::String(f.into())).collect())
    }

    /// Number of fields in the row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Each field rendered as text.
    ///
    /// Strings yield their contents, numbers their plain decimal text
    /// (never exponent notation), `null` the empty string.
    pub fn fields(&self) -> impl Iterator<Item = String> + '_ {
        self.0.iter().map(|value| match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => plain_number(n),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}

/// JSON serializes small and large floats as `1e-5`; expand those.
fn plain_number(n: &serde_json::Number) -> String {
    let text = n.to_string();
    if text.contains(['e', 'E']) {
        if let Ok(value) = Decimal::from_scientific(&text) {
            return value.normalize().to_string();
        }
    }
    text
}

impl From<Vec<Value>> for CostRow {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// A resource group as listed by the enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    /// Resource group name
    pub name: String,

    /// Azure region, when the enumerator reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ResourceGroup {
    /// Create a resource group with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
        }
    }
}

/// Month-to-date cost of one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCost {
    /// Resource group the resource was queried under
    pub resource_group: String,

    /// Resource name (final segment of the resource id)
    pub resource: String,

    /// Resource type label, e.g. "Microsoft.Compute/virtualMachines"
    pub resource_type: String,

    /// Cost for the period, never negative
    pub cost: Decimal,

    /// ISO currency code
    pub currency: String,
}

impl ResourceCost {
    /// Create a new ResourceCost.
    pub fn new(
        resource_group: impl Into<String>,
        resource: impl Into<String>,
        resource_type: impl Into<String>,
        cost: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            resource_group: resource_group.into(),
            resource: resource.into(),
            resource_type: resource_type.into(),
            cost,
            currency: currency.into(),
        }
    }
}

/// Per-resource-group total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroupSummary {
    /// Resource group name
    pub resource_group: String,

    /// Number of rows the cost query returned for the group
    pub resource_count: usize,

    /// Sum of the group's resource costs
    pub total_cost: Decimal,

    /// ISO currency code
    pub currency: String,
}

/// Totals for one resource type across all groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTypeAggregate {
    /// Resource type label
    pub resource_type: String,

    /// Sum of costs of resources of this type
    pub total_cost: Decimal,

    /// Number of resources of this type
    pub resource_count: usize,
}
