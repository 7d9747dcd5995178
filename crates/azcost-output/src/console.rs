//! Terminal rendering of a cost run.
//!
//! Tables are built with `comfy-table` and returned so callers (and tests)
//! can render them anywhere; [`print_outcome`] writes them to stdout.
//! [`ConsoleProgress`] prints one line per resource group to stderr.

use std::io::IsTerminal;

use azcost_cost::{
    CostError, GroupFailure, ProgressSink, ResourceCost, ResourceGroupSummary,
    ResourceTypeAggregate, RunOutcome,
};
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use crossterm::style::Stylize;
use rust_decimal::Decimal;

use crate::export::ExportedFile;

/// Enable ANSI styling only when stdout is a terminal.
pub fn configure_colors() {
    crossterm::style::force_color_output(std::io::stdout().is_terminal());
}

/// Format an amount with two decimals and its currency.
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    format!("{:.2} {}", amount.round_dp(2), currency)
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

fn amount_cell(amount: Decimal, currency: &str) -> Cell {
    Cell::new(format_amount(amount, currency)).set_alignment(CellAlignment::Right)
}

/// Resource groups, most expensive first.
pub fn resource_group_table(summaries: &[ResourceGroupSummary]) -> Table {
    let mut table = new_table(&["Resource Group", "Resources", "Total Cost"]);
    for summary in summaries {
        table.add_row(vec![
            Cell::new(&summary.resource_group),
            Cell::new(summary.resource_count).set_alignment(CellAlignment::Right),
            amount_cell(summary.total_cost, &summary.currency),
        ]);
    }
    table
}

/// Most expensive resources.
pub fn top_resources_table(resources: &[ResourceCost]) -> Table {
    let mut table = new_table(&["#", "Resource", "Type", "Resource Group", "Cost"]);
    for (rank, resource) in resources.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1).fg(Color::DarkGrey),
            Cell::new(&resource.resource),
            Cell::new(&resource.resource_type),
            Cell::new(&resource.resource_group),
            amount_cell(resource.cost, &resource.currency),
        ]);
    }
    table
}

/// Totals per resource type.
///
/// Pass `None` when the report mixes currencies; amounts are then printed
/// without a unit.
pub fn resource_type_table(totals: &[ResourceTypeAggregate], currency: Option<&str>) -> Table {
    let mut table = new_table(&["Resource Type", "Resources", "Total Cost"]);
    for total in totals {
        let amount = match currency {
            Some(currency) => amount_cell(total.total_cost, currency),
            None => Cell::new(format!("{:.2}", total.total_cost.round_dp(2)))
                .set_alignment(CellAlignment::Right),
        };
        table.add_row(vec![
            Cell::new(&total.resource_type),
            Cell::new(total.resource_count).set_alignment(CellAlignment::Right),
            amount,
        ]);
    }
    table
}

/// Groups whose queries failed.
pub fn failures_table(failures: &[GroupFailure]) -> Table {
    let mut table = new_table(&["Resource Group", "Error", "Retryable"]);
    for failure in failures {
        table.add_row(vec![
            Cell::new(&failure.resource_group).fg(Color::Red),
            Cell::new(&failure.message),
            Cell::new(if failure.retryable { "yes" } else { "no" }),
        ]);
    }
    table
}

fn section(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "═".repeat(60).dark_grey());
}

/// Print every view of a finished run.
pub fn print_outcome(outcome: &RunOutcome, top_n: usize) {
    let report = &outcome.report;
    let currency = report.currency();

    println!();
    println!(
        "{} {} ({}: {} to {})",
        "Azure costs for subscription".bold(),
        outcome.subscription_id.as_str().cyan(),
        outcome.timeframe,
        outcome.period_start,
        outcome.period_end
    );

    if report.is_empty() {
        println!();
        println!("{}", "No costs recorded for this period.".yellow());
    } else {
        section("Costs by Resource Group");
        println!("{}", resource_group_table(&report.summary_by_group()));

        section(&format!("Top {top_n} Resources"));
        println!("{}", top_resources_table(&report.top_resources(top_n)));

        let totals = report.totals_by_type();
        if report.has_mixed_currencies() {
            section("Costs by Resource Type (mixed currencies)");
            println!("{}", resource_type_table(&totals, None));
        } else {
            section("Costs by Resource Type");
            println!("{}", resource_type_table(&totals, Some(currency)));
        }
    }

    println!();
    println!(
        "{} {}",
        "Grand total:".bold(),
        format_amount(report.grand_total(), currency).green().bold()
    );
    if report.has_mixed_currencies() {
        println!(
            "{}",
            "Warning: costs are reported in more than one currency; the grand total mixes them."
                .yellow()
        );
    }

    if !outcome.failures.is_empty() {
        section(&format!(
            "{} of {} resource groups failed",
            outcome.failures.len(),
            outcome.groups_queried
        ));
        println!("{}", failures_table(&outcome.failures));
    }

    if !outcome.warnings.is_empty() {
        println!();
        println!(
            "{}",
            format!("{} malformed cost rows were skipped (see log).", outcome.warnings.len())
                .yellow()
        );
    }
}

/// Print where exported files went.
pub fn print_exports(files: &[ExportedFile]) {
    for file in files {
        println!(
            "{} {} ({} records)",
            "Exported".green(),
            file.path.display(),
            file.records
        );
    }
}

/// One stderr line per resource group.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn group_started(&self, position: usize, total: usize, resource_group: &str) {
        eprintln!(
            "{} querying {}",
            format!("[{position}/{total}]").dark_grey(),
            resource_group
        );
    }

    fn group_completed(&self, summary: &ResourceGroupSummary) {
        eprintln!(
            "  {} {}: {} across {} resources",
            "✓".green(),
            summary.resource_group,
            format_amount(summary.total_cost, &summary.currency),
            summary.resource_count
        );
    }

    fn group_empty(&self, resource_group: &str) {
        eprintln!("  {} {resource_group}: no costs", "-".dark_grey());
    }

    fn group_failed(&self, resource_group: &str, error: &CostError) {
        eprintln!(
            "  {} {resource_group}: {}",
            "✗".red(),
            error.friendly_message()
        );
    }

    fn row_skipped(&self, resource_group: &str, row_index: usize, error: &CostError) {
        eprintln!(
            "  {} {resource_group}: skipped row {row_index}: {error}",
            "!".yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(rg: &str, total: Decimal) -> ResourceGroupSummary {
        ResourceGroupSummary {
            resource_group: rg.to_string(),
            resource_count: 2,
            total_cost: total,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(125, 1), "USD"), "12.50 USD");
        assert_eq!(format_amount(Decimal::new(123456, 4), "EUR"), "12.35 EUR");
        assert_eq!(format_amount(Decimal::ZERO, "USD"), "0.00 USD");
    }

    #[test]
    fn test_resource_group_table_contents() {
        let table = resource_group_table(&[summary("rg-prod", Decimal::new(1250, 2))]);
        let rendered = table.to_string();
        assert!(rendered.contains("Resource Group"));
        assert!(rendered.contains("rg-prod"));
        assert!(rendered.contains("12.50 USD"));
    }

    #[test]
    fn test_top_resources_table_ranks() {
        let resources = vec![
            ResourceCost::new("rg1", "vm1", "Microsoft.Compute/vm", Decimal::from(9), "USD"),
            ResourceCost::new("rg1", "st1", "Microsoft.Storage/st", Decimal::from(3), "USD"),
        ];
        let table = top_resources_table(&resources);
        assert_eq!(table.row_iter().count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("vm1"));
        assert!(rendered.contains("9.00 USD"));
    }

    #[test]
    fn test_resource_type_table_currency_suffix() {
        let totals = vec![ResourceTypeAggregate {
            resource_type: "Microsoft.Web/sites".into(),
            total_cost: Decimal::new(800, 2),
            resource_count: 2,
        }];

        let rendered = resource_type_table(&totals, Some("EUR")).to_string();
        assert!(rendered.contains("8.00 EUR"));

        let rendered = resource_type_table(&totals, None).to_string();
        assert!(rendered.contains("8.00"));
        assert!(!rendered.contains("EUR"));
        assert!(!rendered.contains("USD"));
    }

    #[test]
    fn test_failures_table() {
        let failures = vec![GroupFailure {
            resource_group: "rg-locked".into(),
            message: "authentication failed: denied".into(),
            retryable: false,
        }];
        let rendered = failures_table(&failures).to_string();
        assert!(rendered.contains("rg-locked"));
        assert!(rendered.contains("denied"));
    }
}
