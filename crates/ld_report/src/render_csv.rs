//! CSV export of the winner list.
//!
//! - UTF-8 with a BOM so spreadsheet apps detect the encoding
//! - `\n` line separators, header row first, then commit order
//! - Fields containing `,` `"` CR or LF are quoted, inner quotes doubled
//! - Times are shown in Vietnam time (UTC+07:00, no daylight saving)

use chrono::{DateTime, Duration, Utc};

use ld_core::Winner;

pub const CSV_HEADER: [&str; 5] = ["Thời gian", "Mã HĐ", "Tên KH", "Giải thưởng", "Giá trị"];

const BOM: char = '\u{FEFF}';

/// Offset of displayed wall-clock times from UTC.
pub const DISPLAY_UTC_OFFSET_HOURS: i64 = 7;

pub fn render_csv(winners: &[Winner]) -> String {
    let mut out = String::with_capacity(64 * (winners.len() + 1));
    out.push(BOM);
    push_row(&mut out, CSV_HEADER.iter().copied());
    for w in winners {
        let time = format_timestamp(&w.committed_at);
        push_row(
            &mut out,
            [time.as_str(), w.entry.id.as_str(), w.entry.name.as_str(), w.tier_name.as_str(), w.tier_value.as_str()],
        );
    }
    out
}

/// `HH:MM:SS DD/MM/YYYY` in display time.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    let local = at.naive_utc() + Duration::hours(DISPLAY_UTC_OFFSET_HOURS);
    local.format("%H:%M:%S %d/%m/%Y").to_string()
}

/// `danh_sach_trung_thuong_<unix millis>.csv`
pub fn export_file_name(at: &DateTime<Utc>) -> String {
    format!("danh_sach_trung_thuong_{}.csv", at.timestamp_millis())
}

fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, f) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, f);
    }
    out.push('\n');
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::winners;
    use chrono::TimeZone;

    #[test]
    fn renders_header_rows_and_bom() {
        let csv = render_csv(&winners());
        assert!(csv.starts_with('\u{FEFF}'));
        let body = csv.trim_start_matches('\u{FEFF}');
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "Thời gian,Mã HĐ,Tên KH,Giải thưởng,Giá trị");
        assert_eq!(lines[1], "10:04:05 02/01/2025,HD001,Nguyễn Văn A,Giải Nhất,5.000.000đ");
        assert_eq!(lines[2], "10:04:05 02/01/2025,HD007,\"Trần, \"\"Bé\"\"\",Giải Nhì,3.000.000đ");
        assert!(body.ends_with('\n'));
        assert!(!body.contains('\r'));
    }

    #[test]
    fn empty_ledger_is_header_only() {
        let csv = render_csv(&[]);
        assert_eq!(csv, "\u{FEFF}Thời gian,Mã HĐ,Tên KH,Giải thưởng,Giá trị\n");
    }

    #[test]
    fn timestamps_use_display_offset_across_midnight() {
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 20, 30, 0).unwrap();
        assert_eq!(format_timestamp(&at), "03:30:00 01/01/2025");
    }

    #[test]
    fn file_name_uses_unix_millis() {
        let at = Utc.timestamp_millis_opt(1_735_787_045_123).unwrap();
        assert_eq!(export_file_name(&at), "danh_sach_trung_thuong_1735787045123.csv");
    }
}
