//! Azure Resource Manager request and response models.

use std::collections::BTreeMap;

use azcost_cost::source::QueryColumn;
use azcost_cost::{CostQueryRequest, CostRow};
use serde::{Deserialize, Serialize};

// ============================================================================
// Resource groups
// ============================================================================

/// One page of `GET /subscriptions/{id}/resourcegroups`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupListResponse {
    /// Resource groups on this page.
    #[serde(default)]
    pub value: Vec<ResourceGroupResource>,
    /// URL of the next page.
    pub next_link: Option<String>,
}

/// Resource group as returned by ARM.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceGroupResource {
    /// Resource ID.
    #[serde(default)]
    pub id: String,
    /// Group name.
    pub name: String,
    /// Location.
    pub location: Option<String>,
}

// ============================================================================
// Subscription (az account show)
// ============================================================================

/// Output of `az account show`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountShow {
    /// Subscription ID.
    pub id: String,
    /// Subscription display name.
    #[serde(default)]
    pub name: String,
    /// Tenant ID.
    pub tenant_id: Option<String>,
}

/// Output of `az account get-access-token`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    /// Bearer token.
    pub access_token: String,
    /// Subscription the token was issued for.
    pub subscription: Option<String>,
}

// ============================================================================
// Cost Management query
// ============================================================================

/// Body of `POST {scope}/providers/Microsoft.CostManagement/query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryDefinition {
    #[serde(rename = "type")]
    pub export_type: String,
    pub timeframe: String,
    pub dataset: QueryDataset,
}

/// Dataset section of a query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryDataset {
    pub granularity: String,
    pub aggregation: BTreeMap<String, QueryAggregation>,
    pub grouping: Vec<QueryGrouping>,
}

/// Aggregated column.
#[derive(Debug, Clone, Serialize)]
pub struct QueryAggregation {
    pub name: String,
    pub function: String,
}

/// Grouping clause.
#[derive(Debug, Clone, Serialize)]
pub struct QueryGrouping {
    #[serde(rename = "type")]
    pub grouping_type: String,
    pub name: String,
}

impl From<&CostQueryRequest> for QueryDefinition {
    fn from(request: &CostQueryRequest) -> Self {
        let mut aggregation = BTreeMap::new();
        aggregation.insert(
            request.aggregation.alias.clone(),
            QueryAggregation {
                name: request.aggregation.column.clone(),
                function: request.aggregation.function.as_str().to_string(),
            },
        );

        Self {
            export_type: "ActualCost".to_string(),
            timeframe: request.timeframe.as_str().to_string(),
            dataset: QueryDataset {
                granularity: "None".to_string(),
                aggregation,
                grouping: vec![QueryGrouping {
                    grouping_type: "Dimension".to_string(),
                    name: request.grouping.as_str().to_string(),
                }],
            },
        }
    }
}

/// Response of a Cost Management query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub properties: QueryProperties,
}

/// Columns, rows and continuation of a query page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryProperties {
    #[serde(default)]
    pub columns: Vec<QueryColumn>,
    #[serde(default)]
    pub rows: Vec<CostRow>,
    pub next_link: Option<String>,
}
