//! # azcost-cost
//!
//! Month-to-date cost aggregation per Azure resource group.
//!
//! This crate provides:
//! - [`RowParser`] - Shape-based classification of untyped cost query rows
//! - [`classify`] - Resource name and type labels from a resource path
//! - [`CostAggregator`] - Per-run accumulation of resource and group costs
//! - [`CostReport`] - Group ranking, top resources, totals by type
//! - [`CostOrchestrator`] - The per-resource-group query loop
//!
//! The services the pipeline talks to are traits in [`source`]; Azure
//! implementations live in `azcost-azure`.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use azcost_cost::{CostOrchestrator, NoProgress, CostQueryService, ResourceGroupSource};
//!
//! async fn report(
//!     groups: Arc<dyn ResourceGroupSource>,
//!     costs: Arc<dyn CostQueryService>,
//! ) -> azcost_cost::Result<()> {
//!     let orchestrator = CostOrchestrator::new(groups, costs);
//!     let outcome = orchestrator.run("00000000-0000-0000-0000-000000000000", &NoProgress).await?;
//!
//!     for summary in outcome.report.summary_by_group() {
//!         println!("{}: {} {}", summary.resource_group, summary.total_cost, summary.currency);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod report;
pub mod source;

// Re-export main types
pub use aggregator::CostAggregator;
pub use classifier::{ClassifiedResource, classify};
pub use error::{CostError, Result};
pub use models::{
    CostRow, ResourceCost, ResourceGroup, ResourceGroupSummary, ResourceTypeAggregate,
};
pub use orchestrator::{
    CostOrchestrator, GroupFailure, NoProgress, ProgressSink, RowWarning, RunOutcome,
};
pub use parser::{KNOWN_CURRENCIES, ParsedRow, RowParser};
pub use report::CostReport;
pub use source::{
    CostQueryRequest, CostQueryResult, CostQueryService, ResourceGroupSource, SessionProvider,
    Timeframe, resource_group_scope,
};
