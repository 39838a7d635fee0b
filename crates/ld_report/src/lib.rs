//! ld_report/src/lib.rs: Pure offline result model + renderers (CSV/JSON/HTML).
//!
//! Determinism rules:
//! - No I/O here. Callers supply the schedule, the committed winners, and the
//!   tier quotas already in memory; renderers return strings/values.
//! - No recomputation of draw outcomes: the ledger is reported as committed.
//! - Stable ordering: tiers in schedule order, winners in commit order.

#![deny(unsafe_code)]

use thiserror::Error;

pub mod model;
pub mod money;
pub mod render_csv;
#[cfg(feature = "render_json")]
pub mod render_json;
#[cfg(feature = "render_html")]
pub mod render_html;

pub use model::{build_model, winners_by_tier, ReportMeta, ReportModel, TierReport};
pub use money::{format_vnd, prize_value_amount, schedule_total, tier_total};
pub use render_csv::{export_file_name, format_timestamp, render_csv, CSV_HEADER};
#[cfg(feature = "render_json")]
pub use render_json::{render_json, render_json_string};
#[cfg(feature = "render_html")]
pub use render_html::render_html;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Inputs disagree with each other (e.g. a winner's tier is not in the schedule).
    #[error("inconsistent report input: {0}")]
    Inconsistent(String),
    #[error("serialization failed: {0}")]
    Serialize(String),
}
