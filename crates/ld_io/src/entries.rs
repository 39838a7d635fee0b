//! Entry import: spreadsheet rows exported as a JSON array of objects.
//!
//! Column headers vary between sheets, so every field is looked up through a
//! list of accepted aliases (first non-empty hit wins). Rows missing an id,
//! a name, or a phone are counted as rejected; repeated ids are counted as
//! duplicates. Neither aborts the import.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use ld_algo::EntryPool;
use ld_core::{DrawError, Entry, EntryId, RegionTag};

use crate::{IoError, IoResult};

const ID_KEYS: &[&str] = &["Mã HĐ", "Ma HD", "MaHD", "ID", "id"];
const NAME_KEYS: &[&str] = &["Tên Khách Hàng", "Ten Khach Hang", "TenKH", "Name", "name"];
const PHONE_KEYS: &[&str] = &["SDT", "SĐT", "Phone", "phone", "Số điện thoại"];
const AMOUNT_KEYS: &[&str] = &["Giá trị", "Gia tri", "Amount", "amount"];
const REGION_KEYS: &[&str] = &["Khu vực", "Khu vuc", "Region", "region"];

/// Outcome of one import.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Accepted entries, in row order, ids unique.
    pub entries: Vec<Entry>,
    /// Rows missing a required field or carrying an invalid id.
    pub rejected_rows: usize,
    /// Ids seen again after their first accepted row.
    pub duplicate_ids: Vec<EntryId>,
}

impl ImportReport {
    pub fn accepted(&self) -> usize {
        self.entries.len()
    }

    pub fn into_pool(self) -> Result<EntryPool, DrawError> {
        EntryPool::from_entries(self.entries)
    }
}

/// Read and import a rows file.
pub fn load_entries(path: &Path) -> IoResult<ImportReport> {
    let text = fs::read_to_string(path)
        .map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let report = parse_entries(&text)?;
    info!(
        path = %path.display(),
        accepted = report.accepted(),
        rejected = report.rejected_rows,
        duplicates = report.duplicate_ids.len(),
        "entries imported"
    );
    Ok(report)
}

/// Import from JSON text. The top level must be an array of row objects.
pub fn parse_entries(text: &str) -> IoResult<ImportReport> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(rows) = value else {
        return Err(IoError::Invalid("entries file must be a JSON array of rows".into()));
    };
    Ok(import_rows(&rows))
}

pub fn import_rows(rows: &[Value]) -> ImportReport {
    let mut report = ImportReport::default();
    let mut seen: HashSet<EntryId> = HashSet::new();

    for (i, row) in rows.iter().enumerate() {
        let Some(entry) = row.as_object().and_then(row_to_entry) else {
            debug!(row = i + 1, "row rejected");
            report.rejected_rows += 1;
            continue;
        };
        if !seen.insert(entry.id.clone()) {
            debug!(row = i + 1, id = %entry.id, "duplicate id");
            report.duplicate_ids.push(entry.id);
            continue;
        }
        report.entries.push(entry);
    }
    report
}

fn row_to_entry(row: &Map<String, Value>) -> Option<Entry> {
    let id = EntryId::new(lookup(row, ID_KEYS)?).ok()?;
    let name = lookup(row, NAME_KEYS)?;
    let phone = lookup(row, PHONE_KEYS)?;

    let mut entry = Entry::new(id, name, phone);
    if let Some(amount) = AMOUNT_KEYS.iter().find_map(|k| row.get(*k).and_then(amount_cell)) {
        entry = entry.with_amount(amount);
    }
    if let Some(region) = lookup(row, REGION_KEYS).and_then(|r| RegionTag::new(r).ok()) {
        entry = entry.with_region(region);
    }
    Some(entry)
}

/// First alias holding a non-empty text or number cell.
fn lookup(row: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| row.get(*k).and_then(text_cell))
}

fn text_cell(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Amounts come as numbers or as formatted strings ("1.500.000đ");
/// strings keep their digits only. Zero counts as absent.
fn amount_cell(v: &Value) -> Option<u64> {
    let amount = match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64))?,
        Value::String(s) => {
            let digits: String = s.chars().filter(char::is_ascii_digit).collect();
            digits.parse().ok()?
        }
        _ => return None,
    };
    (amount > 0).then_some(amount)
}
