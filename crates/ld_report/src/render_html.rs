// crates/ld_report/src/render_html.rs
//
// Offline HTML winner board. Asset-free, deterministic, every content field
// escaped. Layout: title + totals, then one table per tier in schedule order
// with a "drawn/quota" badge. Contact numbers are masked.

use std::fmt::Write as _;

use crate::model::{ReportModel, TierReport};
use crate::money::{format_vnd, prize_value_amount};
use crate::render_csv::format_timestamp;

const TITLE: &str = "Danh Sách Trúng Thưởng";

/// Escape text for HTML (minimal, deterministic).
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

struct HtmlBuilder {
    buf: String,
}

impl HtmlBuilder {
    fn new() -> Self {
        Self {
            buf: String::with_capacity(16 * 1024),
        }
    }

    fn start(&mut self, title: &str) {
        let _ = write!(
            self.buf,
            "<!doctype html><html lang=\"vi\"><head><meta charset=\"utf-8\">\
             <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
             <title>{}</title>\
             <style>\
             body{{font-family:system-ui,-apple-system,Segoe UI,Roboto,Arial,sans-serif;margin:24px;}}\
             h1,h2{{margin:0.2em 0;}}\
             .muted{{opacity:0.8}}\
             .pill{{display:inline-block;padding:.2em .6em;border-radius:9999px;background:#fde68a}}\
             table{{border-collapse:collapse;margin-bottom:1em}}\
             td,th{{padding:4px 8px;border-bottom:1px solid #ddd;text-align:left}}\
             </style></head><body>",
            esc(title)
        );
    }

    fn finish(mut self) -> String {
        self.buf.push_str("</body></html>");
        self.buf
    }

    fn header(&mut self, title: &str, total_winners: usize, total_entries: usize) {
        let _ = write!(
            self.buf,
            "<h1>{}</h1><p class=\"muted\">Tổng số người trúng: <b>{}</b> / {} hóa đơn</p>",
            esc(title),
            total_winners,
            total_entries
        );
    }

    fn tier(&mut self, t: &TierReport) {
        let _ = write!(
            self.buf,
            "<h2><span class=\"pill\">{} ({}/{})</span> {}</h2>",
            esc(&t.name),
            t.drawn(),
            t.quota,
            esc(&display_value(&t.value))
        );
        if t.winners.is_empty() {
            self.buf.push_str("<p class=\"muted\">Chưa có người trúng thưởng</p>");
            return;
        }
        self.buf.push_str(
            "<table><thead><tr><th>#</th><th>Mã HĐ</th><th>Tên KH</th><th>SĐT</th><th>Giá trị HĐ</th><th>Thời gian</th></tr></thead><tbody>",
        );
        for w in &t.winners {
            let _ = write!(
                self.buf,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                w.turn,
                esc(w.entry.id.as_str()),
                esc(&w.entry.name),
                esc(&w.entry.masked_phone()),
                w.entry.amount.map(format_vnd).unwrap_or_default(),
                esc(&format_timestamp(&w.committed_at))
            );
        }
        self.buf.push_str("</tbody></table>");
    }

    fn footer(&mut self, seed: Option<u64>, entries_sha256: Option<&str>) {
        self.buf.push_str("<p class=\"muted\">");
        if let Some(seed) = seed {
            let _ = write!(self.buf, "seed: {seed} ");
        }
        if let Some(h) = entries_sha256 {
            let _ = write!(self.buf, "entries sha256: <code>{}</code>", esc(h));
        }
        self.buf.push_str("</p>");
    }
}

/// Normalise the tier value for display when it is a plain amount.
fn display_value(value: &str) -> String {
    match prize_value_amount(value) {
        Some(a) if value.chars().all(|c| c.is_ascii_digit() || c == '.' || c == 'đ') => format_vnd(a),
        _ => value.to_string(),
    }
}

pub fn render_html(m: &ReportModel) -> String {
    let mut b = HtmlBuilder::new();
    b.start(TITLE);
    b.header(TITLE, m.total_winners(), m.meta.total_entries);
    for t in &m.tiers {
        b.tier(t);
    }
    b.footer(m.meta.seed, m.meta.entries_sha256.as_deref());
    b.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{schedule, winner_with_amount, winners};
    use crate::model::{build_model, ReportMeta};

    #[test]
    fn escapes_and_masks() {
        let m = build_model(&schedule(), &winners(), &[1, 2], ReportMeta::default()).unwrap();
        let html = render_html(&m);
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.ends_with("</body></html>"));
        assert!(html.contains("Trần, &quot;Bé&quot;"));
        assert!(html.contains("091234****"));
        assert!(!html.contains("0912345678"));
        assert!(html.contains("Giải Nhì (1/2)"));
    }

    #[test]
    fn amount_column_formatted() {
        let ws = vec![winner_with_amount(1, 0, "HD001", 2_750_000), winners().remove(1)];
        let m = build_model(&schedule(), &ws, &[1, 2], ReportMeta::default()).unwrap();
        let html = render_html(&m);
        assert!(html.contains("<th>Giá trị HĐ</th>"));
        assert!(html.contains("<td>2.750.000đ</td>"));
        assert!(html.contains("<td>10:04:05 02/01/2025</td>"));
    }

    #[test]
    fn empty_tier_has_placeholder() {
        let m = build_model(&schedule(), &[], &[1, 2], ReportMeta::default()).unwrap();
        let html = render_html(&m);
        assert_eq!(html.matches("Chưa có người trúng thưởng").count(), 2);
    }

    #[test]
    fn esc_covers_markup() {
        assert_eq!(esc("<a href='x'>&</a>"), "&lt;a href=&#x27;x&#x27;&gt;&amp;&lt;/a&gt;");
    }
}
