//! Per-run accumulation of resource costs.
//!
//! A [`CostAggregator`] lives for exactly one orchestrator run. Resources
//! are appended as rows are parsed; once a group's rows are exhausted the
//! group is finalized into a [`ResourceGroupSummary`]. Both collections are
//! append-only.
//!
//! A resource whose cost would overflow its group total or the run total is
//! rejected, so every sum a [`CostReport`] computes stays representable.
//!
//! ## Usage
//!
//! ```
//! use azcost_cost::{CostAggregator, ResourceCost};
//! use rust_decimal::Decimal;
//!
//! let mut aggregator = CostAggregator::new();
//! aggregator.add_resource(ResourceCost::new(
//!     "rg1", "vm1", "Microsoft.Compute/virtualMachines", Decimal::new(1250, 2), "USD",
//! ))?;
//! aggregator.finalize_group("rg1", 1);
//!
//! let report = aggregator.into_report();
//! assert_eq!(report.grand_total(), Decimal::new(1250, 2));
//! # Ok::<(), azcost_cost::CostError>(())
//! ```

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{CostError, Result};
use crate::models::{DEFAULT_CURRENCY, ResourceCost, ResourceGroupSummary};
use crate::report::CostReport;

/// Running totals of a group that has not been finalized yet.
#[derive(Debug, Default)]
struct GroupTotals {
    total: Decimal,
    currency: Option<String>,
}

/// Accumulates resource costs and group summaries for one run.
#[derive(Debug, Default)]
pub struct CostAggregator {
    resources: Vec<ResourceCost>,
    summaries: Vec<ResourceGroupSummary>,
    running: HashMap<String, GroupTotals>,
    finalized: HashSet<String>,
    grand_total: Decimal,
}

impl CostAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resource and add its cost to its group's running total.
    ///
    /// Fails with [`CostError::RowParse`] and records nothing when the cost
    /// does not fit in the group total or the run total.
    pub fn add_resource(&mut self, resource: ResourceCost) -> Result<()> {
        let overflow = || {
            CostError::RowParse(format!(
                "cost {} of {} overflows the running total of {}",
                resource.cost, resource.resource, resource.resource_group
            ))
        };

        let grand_total = self
            .grand_total
            .checked_add(resource.cost)
            .ok_or_else(overflow)?;
        let group_total = self
            .running_total(&resource.resource_group)
            .checked_add(resource.cost)
            .ok_or_else(overflow)?;

        let totals = self
            .running
            .entry(resource.resource_group.clone())
            .or_default();
        totals.total = group_total;
        totals.currency = Some(resource.currency.clone());
        self.grand_total = grand_total;

        self.resources.push(resource);
        Ok(())
    }

    /// Running total of a group that is still open.
    pub fn running_total(&self, resource_group: &str) -> Decimal {
        self.running
            .get(resource_group)
            .map(|t| t.total)
            .unwrap_or(Decimal::ZERO)
    }

    /// Close a group and record its summary.
    ///
    /// `row_count` is the number of rows the cost query returned for the
    /// group. Groups with no rows produce no summary, and a group is only
    /// ever summarized once.
    pub fn finalize_group(
        &mut self,
        resource_group: &str,
        row_count: usize,
    ) -> Option<&ResourceGroupSummary> {
        let totals = self.running.remove(resource_group).unwrap_or_default();

        if row_count == 0 {
            debug!(resource_group, "no rows returned, skipping summary");
            return None;
        }

        if !self.finalized.insert(resource_group.to_string()) {
            warn!(resource_group, "group already finalized, ignoring");
            return None;
        }

        self.summaries.push(ResourceGroupSummary {
            resource_group: resource_group.to_string(),
            resource_count: row_count,
            total_cost: totals.total,
            currency: totals
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        });

        self.summaries.last()
    }

    /// Resources recorded so far, in insertion order.
    pub fn resources(&self) -> &[ResourceCost] {
        &self.resources
    }

    /// Summaries recorded so far, in finalization order.
    pub fn summaries(&self) -> &[ResourceGroupSummary] {
        &self.summaries
    }

    /// Consume the aggregator into a report over its collections.
    pub fn into_report(self) -> CostReport {
        if !self.running.is_empty() {
            warn!(
                open_groups = self.running.len(),
                "report built with unfinalized groups"
            );
        }
        CostReport::new(self.summaries, self.resources)
    }
}
