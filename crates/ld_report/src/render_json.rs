//! render_json.rs: Results JSON (total_winners → tiers → integrity).
//!
//! Key order follows insertion order (`serde_json` is built with
//! `preserve_order`), so the document reads top-down like the CSV.

use serde_json::{Map as JsonMap, Value};

use ld_core::Winner;

use crate::model::{ReportModel, TierReport};
use crate::money::format_vnd;
use crate::render_csv::format_timestamp;
use crate::ReportError;

pub fn render_json(m: &ReportModel) -> Value {
    let mut root = obj();
    root.insert("total_winners".into(), Value::from(m.total_winners()));
    root.insert("total_entries".into(), Value::from(m.meta.total_entries));
    if let Some(at) = &m.meta.generated_at {
        root.insert("generated_at".into(), Value::String(at.to_rfc3339()));
    }
    root.insert("tiers".into(), Value::Array(m.tiers.iter().map(tier_json).collect()));
    root.insert("integrity".into(), integrity_json(m));
    Value::Object(root)
}

/// Pretty-printed with a trailing newline.
pub fn render_json_string(m: &ReportModel) -> Result<String, ReportError> {
    let mut s = serde_json::to_string_pretty(&render_json(m))
        .map_err(|e| ReportError::Serialize(e.to_string()))?;
    s.push('\n');
    Ok(s)
}

fn tier_json(t: &TierReport) -> Value {
    let mut o = obj();
    o.insert("name".into(), Value::String(t.name.clone()));
    o.insert("value".into(), Value::String(t.value.clone()));
    o.insert("quota".into(), Value::from(t.quota));
    o.insert("drawn".into(), Value::from(t.drawn()));
    o.insert("winners".into(), Value::Array(t.winners.iter().map(winner_json).collect()));
    Value::Object(o)
}

fn winner_json(w: &Winner) -> Value {
    let mut o = obj();
    o.insert("turn".into(), Value::from(w.turn));
    o.insert("id".into(), Value::String(w.entry.id.to_string()));
    o.insert("name".into(), Value::String(w.entry.name.clone()));
    o.insert("phone".into(), Value::String(w.entry.masked_phone()));
    if let Some(amount) = w.entry.amount {
        o.insert("amount".into(), Value::String(format_vnd(amount)));
    }
    if let Some(region) = &w.entry.region {
        o.insert("region".into(), Value::String(region.to_string()));
    }
    o.insert("committed_at".into(), Value::String(w.committed_at.to_rfc3339()));
    o.insert("time".into(), Value::String(format_timestamp(&w.committed_at)));
    Value::Object(o)
}

fn integrity_json(m: &ReportModel) -> Value {
    let mut o = obj();
    o.insert("seed".into(), m.meta.seed.map_or(Value::Null, Value::from));
    o.insert("entries_sha256".into(), opt_str(&m.meta.entries_sha256));
    o.insert("winners_sha256".into(), opt_str(&m.meta.winners_sha256));
    Value::Object(o)
}

fn opt_str(s: &Option<String>) -> Value {
    s.as_ref().map_or(Value::Null, |s| Value::String(s.clone()))
}

#[inline]
fn obj() -> JsonMap<String, Value> {
    JsonMap::new()
}
