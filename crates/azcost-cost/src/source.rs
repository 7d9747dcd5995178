//! Collaborators the pipeline depends on, and the query they are asked.
//!
//! Implementations live outside this crate (see `azcost-azure`); tests use
//! in-memory doubles.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{CostRow, ResourceGroup};

/// Identity of the signed-in user.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Subscription the session is scoped to.
    async fn current_subscription_id(&self) -> Result<String>;
}

/// Lists the resource groups of a subscription.
#[async_trait]
pub trait ResourceGroupSource: Send + Sync {
    /// Resource groups in the order the service returns them.
    async fn list_resource_groups(&self, subscription_id: &str) -> Result<Vec<ResourceGroup>>;
}

/// Runs a cost query for one scope.
#[async_trait]
pub trait CostQueryService: Send + Sync {
    /// Execute `request`, returning every row across all result pages.
    async fn query_costs(&self, request: &CostQueryRequest) -> Result<CostQueryResult>;
}

/// Build the scope identifier of a resource group.
pub fn resource_group_scope(subscription_id: &str, resource_group: &str) -> String {
    format!("/subscriptions/{subscription_id}/resourceGroups/{resource_group}")
}

/// Period a cost query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    /// First day of the current calendar month through now
    MonthToDate,
}

impl Timeframe {
    /// Name the service expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::MonthToDate => "MonthToDate",
        }
    }

    /// First and last calendar day covered, as of `today`.
    pub fn period(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Timeframe::MonthToDate => (today.with_day(1).unwrap_or(today), today),
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation function applied to a cost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationFunction {
    Sum,
}

impl AggregationFunction {
    /// Name the service expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationFunction::Sum => "Sum",
        }
    }
}

/// Aggregated column requested from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Alias of the aggregated value in the result
    pub alias: String,
    /// Source column
    pub column: String,
    pub function: AggregationFunction,
}

impl Aggregation {
    /// Sum of the `Cost` column, aliased `totalCost`.
    pub fn sum_of_cost() -> Self {
        Self {
            alias: "totalCost".to_string(),
            column: "Cost".to_string(),
            function: AggregationFunction::Sum,
        }
    }
}

/// Dimension rows are broken out by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupingDimension {
    ResourceId,
}

impl GroupingDimension {
    /// Name the service expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingDimension::ResourceId => "ResourceId",
        }
    }
}

/// One cost query: scope, period, aggregation and grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostQueryRequest {
    pub scope: String,
    pub timeframe: Timeframe,
    pub aggregation: Aggregation,
    pub grouping: GroupingDimension,
}

impl CostQueryRequest {
    /// Month-to-date cost summed per resource for `scope`.
    pub fn month_to_date(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            timeframe: Timeframe::MonthToDate,
            aggregation: Aggregation::sum_of_cost(),
            grouping: GroupingDimension::ResourceId,
        }
    }
}

/// Column metadata reported alongside result rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

/// Rows returned by a cost query.
///
/// `columns` is informational; rows are classified by shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostQueryResult {
    #[serde(default)]
    pub columns: Vec<QueryColumn>,
    #[serde(default)]
    pub rows: Vec<CostRow>,
}

impl CostQueryResult {
    /// Result with rows and no column metadata.
    pub fn from_rows(rows: Vec<CostRow>) -> Self {
        Self {
            columns: Vec::new(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_group_scope() {
        assert_eq!(
            resource_group_scope("abc", "rg-prod"),
            "/subscriptions/abc/resourceGroups/rg-prod"
        );
    }

    #[test]
    fn test_month_to_date_request() {
        let request = CostQueryRequest::month_to_date("/subscriptions/abc/resourceGroups/rg1");
        assert_eq!(request.timeframe.as_str(), "MonthToDate");
        assert_eq!(request.aggregation.column, "Cost");
        assert_eq!(request.aggregation.function.as_str(), "Sum");
        assert_eq!(request.grouping.as_str(), "ResourceId");
    }

    #[test]
    fn test_month_to_date_period() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let (start, end) = Timeframe::MonthToDate.period(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(end, today);
    }
}
