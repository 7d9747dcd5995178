//! Per-resource-group query loop.
//!
//! [`CostOrchestrator::run`] lists the subscription's resource groups,
//! queries month-to-date costs for each one, and folds the rows into a
//! fresh [`CostAggregator`]. A failing group is recorded and skipped; only
//! a failure to list the groups ends the run.
//!
//! Queries may be dispatched ahead (`max_concurrent_queries`), but results
//! are always folded in enumeration order.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregator::CostAggregator;
use crate::error::{CostError, Result};
use crate::models::{ResourceGroup, ResourceGroupSummary};
use crate::parser::RowParser;
use crate::report::CostReport;
use crate::source::{
    CostQueryRequest, CostQueryResult, CostQueryService, ResourceGroupSource, Timeframe,
    resource_group_scope,
};

/// Observer for run progress. Every method defaults to doing nothing.
pub trait ProgressSink: Send + Sync {
    /// A group's query was dispatched. `position` is 1-based.
    fn group_started(&self, _position: usize, _total: usize, _resource_group: &str) {}

    /// A group returned rows and was summarized.
    fn group_completed(&self, _summary: &ResourceGroupSummary) {}

    /// A group returned no rows.
    fn group_empty(&self, _resource_group: &str) {}

    /// A group's query failed.
    fn group_failed(&self, _resource_group: &str, _error: &CostError) {}

    /// A row could not be parsed and was skipped.
    fn row_skipped(&self, _resource_group: &str, _row_index: usize, _error: &CostError) {}
}

/// [`ProgressSink`] that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// A resource group whose query failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFailure {
    pub resource_group: String,
    pub message: String,
    /// Whether a later run could plausibly succeed unchanged
    pub retryable: bool,
}

/// A row that was skipped because it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub resource_group: String,
    /// Position of the row in the group's result
    pub row_index: usize,
    pub message: String,
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub subscription_id: String,
    pub timeframe: Timeframe,
    /// First calendar day covered (UTC)
    pub period_start: NaiveDate,
    /// Last calendar day covered (UTC)
    pub period_end: NaiveDate,
    /// Number of resource groups enumerated
    pub groups_queried: usize,
    pub report: CostReport,
    pub failures: Vec<GroupFailure>,
    pub warnings: Vec<RowWarning>,
}

impl RunOutcome {
    /// Whether every group query succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives cost queries across the resource groups of a subscription.
pub struct CostOrchestrator {
    groups: Arc<dyn ResourceGroupSource>,
    costs: Arc<dyn CostQueryService>,
    parser: RowParser,
    max_concurrent_queries: usize,
}

impl CostOrchestrator {
    /// Create a strictly sequential orchestrator with the default parser.
    pub fn new(groups: Arc<dyn ResourceGroupSource>, costs: Arc<dyn CostQueryService>) -> Self {
        Self {
            groups,
            costs,
            parser: RowParser::new(),
            max_concurrent_queries: 1,
        }
    }

    /// Use a custom row parser.
    pub fn with_parser(mut self, parser: RowParser) -> Self {
        self.parser = parser;
        self
    }

    /// Allow up to `max` queries in flight (values below 1 mean 1).
    pub fn with_max_concurrent_queries(mut self, max: usize) -> Self {
        self.max_concurrent_queries = max.max(1);
        self
    }

    /// Query every resource group of `subscription_id` and build a report.
    pub async fn run(
        &self,
        subscription_id: &str,
        progress: &dyn ProgressSink,
    ) -> Result<RunOutcome> {
        let groups = self
            .groups
            .list_resource_groups(subscription_id)
            .await
            .map_err(|e| match e {
                enumeration @ CostError::Enumeration(_) => enumeration,
                other => CostError::Enumeration(other.to_string()),
            })?;

        info!(
            subscription_id,
            groups = groups.len(),
            max_concurrent_queries = self.max_concurrent_queries,
            "querying month-to-date costs"
        );

        let timeframe = Timeframe::MonthToDate;
        let (period_start, period_end) = timeframe.period(Utc::now().date_naive());

        let mut aggregator = CostAggregator::new();
        let mut failures = Vec::new();
        let mut warnings = Vec::new();
        let total = groups.len();

        let mut results = stream::iter(groups.iter().enumerate())
            .map(|(i, group)| {
                progress.group_started(i + 1, total, &group.name);
                let scope = resource_group_scope(subscription_id, &group.name);
                let request = CostQueryRequest::month_to_date(scope);
                let costs = Arc::clone(&self.costs);
                async move {
                    let result = costs.query_costs(&request).await;
                    (group, result)
                }
            })
            .buffered(self.max_concurrent_queries);

        while let Some((group, result)) = results.next().await {
            match result {
                Ok(result) => {
                    self.fold_group(&mut aggregator, group, result, progress, &mut warnings);
                }
                Err(e) => {
                    warn!(resource_group = %group.name, error = %e, "cost query failed");
                    progress.group_failed(&group.name, &e);
                    failures.push(GroupFailure {
                        resource_group: group.name.clone(),
                        message: e.to_string(),
                        retryable: e.is_retryable(),
                    });
                }
            }
        }

        let report = aggregator.into_report();
        info!(
            groups_with_costs = report.group_count(),
            resources = report.resource_count(),
            failed_groups = failures.len(),
            skipped_rows = warnings.len(),
            grand_total = %report.grand_total(),
            "cost run finished"
        );

        Ok(RunOutcome {
            subscription_id: subscription_id.to_string(),
            timeframe,
            period_start,
            period_end,
            groups_queried: total,
            report,
            failures,
            warnings,
        })
    }

    /// Parse one group's rows into the aggregator and summarize the group.
    fn fold_group(
        &self,
        aggregator: &mut CostAggregator,
        group: &ResourceGroup,
        result: CostQueryResult,
        progress: &dyn ProgressSink,
        warnings: &mut Vec<RowWarning>,
    ) {
        let resource_group = group.name.as_str();
        let row_count = result.rows.len();

        if row_count == 0 {
            debug!(resource_group, "no cost rows");
            progress.group_empty(resource_group);
            return;
        }

        for (row_index, row) in result.rows.iter().enumerate() {
            let folded = self.parser.parse_row(row).and_then(|parsed| {
                match parsed.into_resource_cost(resource_group) {
                    Some(resource) => aggregator.add_resource(resource),
                    None => {
                        debug!(resource_group, row_index, "row has no resource path");
                        Ok(())
                    }
                }
            });

            if let Err(e) = folded {
                warn!(resource_group, row_index, error = %e, "skipping malformed row");
                progress.row_skipped(resource_group, row_index, &e);
                warnings.push(RowWarning {
                    resource_group: resource_group.to_string(),
                    row_index,
                    message: e.to_string(),
                });
            }
        }

        let running_total: Decimal = aggregator.running_total(resource_group);
        if let Some(summary) = aggregator.finalize_group(resource_group, row_count) {
            debug!(resource_group, rows = row_count, total = %running_total, "group summarized");
            progress.group_completed(summary);
        }
    }
}
