//! Configuration for the IFRS 17 reporting module

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How an uploaded filename is compared with submissions already stored for
/// the same institution and reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMatch {
    /// Case-insensitive equality of the original filenames
    #[default]
    Exact,
    /// Stored file path contains the new filename (case-insensitive)
    Substring,
}

/// Which data kinds the completeness score actually probes.
/// The denominator is always the full checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessChecklist {
    /// Submissions, insurance revenue and CSM profitability only
    #[default]
    Legacy,
    /// Every data kind on the checklist
    Full,
}

/// Reporting module configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root directory for uploaded submission files
    #[serde(default = "default_upload_root")]
    pub upload_root: PathBuf,

    /// Maximum number of parsed rows returned for display
    #[serde(default = "default_display_row_limit")]
    pub display_row_limit: usize,

    /// Maximum accepted upload body size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Duplicate filename detection mode
    #[serde(default)]
    pub duplicate_match: DuplicateMatch,

    /// Completeness checklist mode for the quality scorer
    #[serde(default)]
    pub completeness_checklist: CompletenessChecklist,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_root: default_upload_root(),
            display_row_limit: default_display_row_limit(),
            max_upload_bytes: default_max_upload_bytes(),
            duplicate_match: DuplicateMatch::default(),
            completeness_checklist: CompletenessChecklist::default(),
        }
    }
}

fn default_upload_root() -> PathBuf {
    PathBuf::from("media")
}

fn default_display_row_limit() -> usize {
    50
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024 // 10MB
}
