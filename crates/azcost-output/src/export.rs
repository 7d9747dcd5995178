//! CSV export of resource costs and group summaries.
//!
//! One header record with the field names, one record per item, `\n` line
//! endings. Fields containing a comma, quote, CR or LF are quoted with
//! inner quotes doubled.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use azcost_cost::{CostReport, ResourceCost, ResourceGroupSummary};
use tracing::info;

use crate::error::{OutputError, Result};
use crate::selection::{ExportAction, ExportSelection};

/// A type that can be written as one CSV record.
pub trait CsvRecord {
    /// Field names, in record order.
    const HEADER: &'static [&'static str];

    /// Field values, in header order.
    fn fields(&self) -> Vec<String>;
}

impl CsvRecord for ResourceCost {
    const HEADER: &'static [&'static str] =
        &["resource_group", "resource", "resource_type", "cost", "currency"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.resource_group.clone(),
            self.resource.clone(),
            self.resource_type.clone(),
            self.cost.to_string(),
            self.currency.clone(),
        ]
    }
}

impl CsvRecord for ResourceGroupSummary {
    const HEADER: &'static [&'static str] =
        &["resource_group", "resource_count", "total_cost", "currency"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.resource_group.clone(),
            self.resource_count.to_string(),
            self.total_cost.to_string(),
            self.currency.clone(),
        ]
    }
}

/// Quote a field if it contains a delimiter, quote or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_record<W: Write>(writer: &mut W, fields: &[String]) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{line}")
}

/// Write a header and one record per item.
pub fn write_csv<W: Write, R: CsvRecord>(writer: &mut W, records: &[R]) -> std::io::Result<()> {
    let header: Vec<String> = R::HEADER.iter().map(|h| h.to_string()).collect();
    write_record(writer, &header)?;
    for record in records {
        write_record(writer, &record.fields())?;
    }
    writer.flush()
}

/// Write `records` to `path`, creating parent directories. Returns the
/// number of records written.
pub fn export_to_file<R: CsvRecord>(path: &Path, records: &[R]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| OutputError::write(parent, e))?;
    }

    let file = File::create(path).map_err(|e| OutputError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, records).map_err(|e| OutputError::write(path, e))?;

    info!(path = %path.display(), records = records.len(), "exported CSV");
    Ok(records.len())
}

/// A file written by [`Exporter::export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub action: ExportAction,
    pub path: PathBuf,
    pub records: usize,
}

/// Writes the files an [`ExportSelection`] asks for.
#[derive(Debug, Clone)]
pub struct Exporter {
    detailed_path: PathBuf,
    summary_path: PathBuf,
}

impl Exporter {
    pub fn new(detailed_path: impl Into<PathBuf>, summary_path: impl Into<PathBuf>) -> Self {
        Self {
            detailed_path: detailed_path.into(),
            summary_path: summary_path.into(),
        }
    }

    /// Destination of an action.
    pub fn path_for(&self, action: ExportAction) -> &Path {
        match action {
            ExportAction::Detailed => &self.detailed_path,
            ExportAction::Summary => &self.summary_path,
        }
    }

    /// Write every file `selection` names. Stops at the first failure.
    pub fn export(
        &self,
        selection: ExportSelection,
        report: &CostReport,
    ) -> Result<Vec<ExportedFile>> {
        let mut written = Vec::new();

        for action in selection.actions() {
            let path = self.path_for(action);
            let records = match action {
                ExportAction::Detailed => export_to_file(path, report.resources())?,
                ExportAction::Summary => export_to_file(path, report.summaries())?,
            };
            written.push(ExportedFile {
                action,
                path: path.to_path_buf(),
                records,
            });
        }

        Ok(written)
    }
}
