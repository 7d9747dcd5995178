//! Ranked views over a finished run.
//!
//! Every method is a pure function of the collections the report was built
//! from. Sorting is stable, so equal costs keep insertion order (which is
//! resource-group enumeration order).

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    DEFAULT_CURRENCY, ResourceCost, ResourceGroupSummary, ResourceTypeAggregate,
};

/// Finalized resource costs and group summaries of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostReport {
    summaries: Vec<ResourceGroupSummary>,
    resources: Vec<ResourceCost>,
}

impl CostReport {
    /// Build a report from finalized collections.
    pub fn new(summaries: Vec<ResourceGroupSummary>, resources: Vec<ResourceCost>) -> Self {
        Self {
            summaries,
            resources,
        }
    }

    /// Group summaries in insertion order.
    pub fn summaries(&self) -> &[ResourceGroupSummary] {
        &self.summaries
    }

    /// Resource costs in insertion order.
    pub fn resources(&self) -> &[ResourceCost] {
        &self.resources
    }

    /// Summaries sorted by total cost, most expensive first.
    pub fn summary_by_group(&self) -> Vec<ResourceGroupSummary> {
        let mut summaries = self.summaries.clone();
        summaries.sort_by(|a, b| b.total_cost.cmp(&a.total_cost));
        summaries
    }

    /// The `n` most expensive resources across all groups.
    pub fn top_resources(&self, n: usize) -> Vec<ResourceCost> {
        let mut resources = self.resources.clone();
        resources.sort_by(|a, b| b.cost.cmp(&a.cost));
        resources.truncate(n);
        resources
    }

    /// Totals per resource type, most expensive first.
    pub fn totals_by_type(&self) -> Vec<ResourceTypeAggregate> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut totals: Vec<ResourceTypeAggregate> = Vec::new();

        for resource in &self.resources {
            match index.get(resource.resource_type.as_str()) {
                Some(&i) => {
                    totals[i].total_cost = totals[i].total_cost.saturating_add(resource.cost);
                    totals[i].resource_count += 1;
                }
                None => {
                    index.insert(resource.resource_type.as_str(), totals.len());
                    totals.push(ResourceTypeAggregate {
                        resource_type: resource.resource_type.clone(),
                        total_cost: resource.cost,
                        resource_count: 1,
                    });
                }
            }
        }

        totals.sort_by(|a, b| b.total_cost.cmp(&a.total_cost));
        totals
    }

    /// Sum of all group totals; zero when no group returned costs.
    ///
    /// Saturates at [`Decimal::MAX`] for reports not built by a
    /// [`CostAggregator`](crate::CostAggregator), which bounds every sum.
    pub fn grand_total(&self) -> Decimal {
        self.summaries
            .iter()
            .fold(Decimal::ZERO, |total, s| total.saturating_add(s.total_cost))
    }

    /// Currency to print next to totals.
    ///
    /// The first summary's currency, or USD for an empty report. Use
    /// [`CostReport::has_mixed_currencies`] to warn when totals mix units.
    pub fn currency(&self) -> &str {
        self.summaries
            .first()
            .map(|s| s.currency.as_str())
            .unwrap_or(DEFAULT_CURRENCY)
    }

    /// Whether group totals are in more than one currency.
    pub fn has_mixed_currencies(&self) -> bool {
        let currency = self.currency();
        self.summaries.iter().any(|s| s.currency != currency)
    }

    /// Number of resource groups with costs.
    pub fn group_count(&self) -> usize {
        self.summaries.len()
    }

    /// Number of resources with costs.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Whether the run produced no cost data at all.
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty() && self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(rg: &str, name: &str, kind: &str, cost: i64) -> ResourceCost {
        ResourceCost::new(rg, name, kind, Decimal::from(cost), "USD")
    }

    fn summary(rg: &str, count: usize, total: i64) -> ResourceGroupSummary {
        ResourceGroupSummary {
            resource_group: rg.to_string(),
            resource_count: count,
            total_cost: Decimal::from(total),
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_summary_by_group_descending_with_stable_ties() {
        let report = CostReport::new(
            vec![
                summary("a", 1, 5),
                summary("b", 1, 20),
                summary("c", 1, 5),
                summary("d", 1, 7),
            ],
            vec![],
        );

        let order: Vec<String> = report
            .summary_by_group()
            .into_iter()
            .map(|s| s.resource_group)
            .collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_top_resources_truncates_and_orders() {
        let report = CostReport::new(
            vec![],
            vec![
                resource("rg1", "a", "t", 1),
                resource("rg1", "b", "t", 9),
                resource("rg2", "c", "t", 4),
                resource("rg2", "d", "t", 9),
            ],
        );

        let top: Vec<String> = report
            .top_resources(3)
            .into_iter()
            .map(|r| r.resource)
            .collect();
        assert_eq!(top, vec!["b", "d", "c"]);

        assert_eq!(report.top_resources(10).len(), 4);
        assert!(report.top_resources(0).is_empty());
    }

    #[test]
    fn test_totals_by_type() {
        let report = CostReport::new(
            vec![],
            vec![
                resource("rg1", "A", "t1", 5),
                resource("rg1", "B", "t1", 3),
                resource("rg2", "C", "t2", 10),
            ],
        );

        assert_eq!(
            report.totals_by_type(),
            vec![
                ResourceTypeAggregate {
                    resource_type: "t2".into(),
                    total_cost: Decimal::from(10),
                    resource_count: 1,
                },
                ResourceTypeAggregate {
                    resource_type: "t1".into(),
                    total_cost: Decimal::from(8),
                    resource_count: 2,
                },
            ]
        );
    }

    #[test]
    fn test_grand_total_matches_summaries() {
        let report = CostReport::new(vec![summary("a", 2, 12), summary("b", 1, 30)], vec![]);
        let summed: Decimal = report
            .summary_by_group()
            .iter()
            .map(|s| s.total_cost)
            .sum();
        assert_eq!(report.grand_total(), summed);
        assert_eq!(report.grand_total(), Decimal::from(42));
    }

    #[test]
    fn test_empty_report() {
        let report = CostReport::default();
        assert!(report.is_empty());
        assert_eq!(report.grand_total(), Decimal::ZERO);
        assert_eq!(report.currency(), "USD");
        assert!(report.summary_by_group().is_empty());
        assert!(report.totals_by_type().is_empty());
        assert!(!report.has_mixed_currencies());
    }

    #[test]
    fn test_mixed_currencies_detected() {
        let mut eur = summary("b", 1, 3);
        eur.currency = "EUR".into();
        let report = CostReport::new(vec![summary("a", 1, 1), eur], vec![]);
        assert_eq!(report.currency(), "USD");
        assert!(report.has_mixed_currencies());
    }

    #[test]
    fn test_sums_saturate_instead_of_panicking() {
        let mut a = summary("a", 1, 0);
        a.total_cost = Decimal::MAX;
        let mut b = summary("b", 1, 0);
        b.total_cost = Decimal::MAX;
        let mut huge = resource("rg1", "x", "t", 0);
        huge.cost = Decimal::MAX;
        let report = CostReport::new(vec![a, b], vec![huge.clone(), huge]);

        assert_eq!(report.grand_total(), Decimal::MAX);
        assert_eq!(report.totals_by_type()[0].total_cost, Decimal::MAX);
        assert_eq!(report.totals_by_type()[0].resource_count, 2);
    }
}
