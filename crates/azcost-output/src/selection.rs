//! Export choice: which files to write after a run.
//!
//! The mapping from a choice to what gets written is a pure function
//! ([`ExportSelection::actions`]); the terminal prompt only produces the
//! choice.

use std::collections::BTreeSet;
use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;

use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use tracing::debug;

use crate::error::{OutputError, Result};

/// One file to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExportAction {
    /// Per-resource costs
    Detailed,
    /// Per-resource-group summaries
    Summary,
}

/// The user's export choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportSelection {
    Detailed,
    Summary,
    Both,
    Skip,
}

impl ExportSelection {
    /// Map a prompt answer: `1` detailed, `2` summary, `3` both, `4` skip.
    /// Anything else is skip.
    pub fn from_input(input: &str) -> Self {
        match input.trim() {
            "1" => Self::Detailed,
            "2" => Self::Summary,
            "3" => Self::Both,
            _ => Self::Skip,
        }
    }

    /// Files this choice writes.
    pub fn actions(self) -> BTreeSet<ExportAction> {
        match self {
            Self::Detailed => BTreeSet::from([ExportAction::Detailed]),
            Self::Summary => BTreeSet::from([ExportAction::Summary]),
            Self::Both => BTreeSet::from([ExportAction::Detailed, ExportAction::Summary]),
            Self::Skip => BTreeSet::new(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detailed => "detailed",
            Self::Summary => "summary",
            Self::Both => "both",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for ExportSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportSelection {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detailed" | "1" => Ok(Self::Detailed),
            "summary" | "2" => Ok(Self::Summary),
            "both" | "3" => Ok(Self::Both),
            "skip" | "none" | "4" => Ok(Self::Skip),
            other => Err(OutputError::UnknownSelection(other.to_string())),
        }
    }
}

/// Ask the user which files to export.
///
/// Returns [`ExportSelection::Skip`] without prompting when stdin is not a
/// terminal.
pub fn prompt_selection() -> Result<ExportSelection> {
    if !std::io::stdin().is_terminal() {
        debug!("stdin is not a terminal, skipping export prompt");
        return Ok(ExportSelection::Skip);
    }

    println!();
    println!("Export results to CSV?");
    println!("  1) Detailed resource costs");
    println!("  2) Resource group summary");
    println!("  3) Both");
    println!("  4) Skip");

    let answer: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Choice")
        .default("4".to_string())
        .interact_text()?;

    Ok(ExportSelection::from_input(&answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input() {
        assert_eq!(ExportSelection::from_input("1"), ExportSelection::Detailed);
        assert_eq!(ExportSelection::from_input(" 2\n"), ExportSelection::Summary);
        assert_eq!(ExportSelection::from_input("3"), ExportSelection::Both);
        assert_eq!(ExportSelection::from_input("4"), ExportSelection::Skip);
    }

    #[test]
    fn test_unrecognized_input_skips() {
        for input in ["", "5", "0", "both", "y", "12"] {
            assert_eq!(ExportSelection::from_input(input), ExportSelection::Skip, "{input:?}");
        }
    }

    #[test]
    fn test_actions() {
        assert_eq!(
            ExportSelection::Detailed.actions(),
            BTreeSet::from([ExportAction::Detailed])
        );
        assert_eq!(
            ExportSelection::Summary.actions(),
            BTreeSet::from([ExportAction::Summary])
        );
        assert_eq!(
            ExportSelection::Both.actions(),
            BTreeSet::from([ExportAction::Detailed, ExportAction::Summary])
        );
        assert!(ExportSelection::Skip.actions().is_empty());
    }

    #[test]
    fn test_parse_flag_value() {
        assert_eq!("Both".parse::<ExportSelection>().unwrap(), ExportSelection::Both);
        assert_eq!("skip".parse::<ExportSelection>().unwrap(), ExportSelection::Skip);
        assert!(matches!(
            "everything".parse::<ExportSelection>(),
            Err(OutputError::UnknownSelection(_))
        ));
    }
}
