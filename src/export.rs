//! Export of the rendered report view.
//!
//! The report is painted as plain ASCII and laid out on A4 pages of a
//! minimal PDF 1.4 document using the built-in Courier font, so charts keep
//! their column alignment.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};

use crate::logging::{self, obj, v_str, Domain};
use crate::render::Painter;
use crate::report::AutopsyReport;
use crate::views::report::ReportView;

const PAGE_W: f64 = 595.28;
const PAGE_H: f64 = 841.89;
/// 10 mm
const MARGIN: f64 = 28.35;
const FONT_SIZE: f64 = 8.5;
const LEADING: f64 = 10.5;
/// Columns that fit between the margins at `FONT_SIZE` in Courier.
pub const PDF_COLUMNS: usize = 104;

pub fn default_pdf_name(date: NaiveDate) -> String {
    format!("model-autopsy-report-{}.pdf", date.format("%Y-%m-%d"))
}

pub fn default_pdf_path() -> PathBuf {
    PathBuf::from(default_pdf_name(Utc::now().date_naive()))
}

fn lines_per_page() -> usize {
    // one line reserved for the footer
    (((PAGE_H - 2.0 * MARGIN) / LEADING).floor() as usize).saturating_sub(2)
}

/// Printable ASCII only; everything else becomes `?`.
fn pdf_escape(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for ch in line.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\t' => out.push_str("    "),
            c if (' '..='~').contains(&c) => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn content_stream(lines: &[&str], page_no: usize, page_count: usize) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "BT");
    let _ = writeln!(s, "/F1 {} Tf", FONT_SIZE);
    let _ = writeln!(s, "{} TL", LEADING);
    let _ = writeln!(s, "{:.2} {:.2} Td", MARGIN, PAGE_H - MARGIN - FONT_SIZE);
    for line in lines {
        let _ = writeln!(s, "({}) Tj T*", pdf_escape(line));
    }
    let _ = writeln!(s, "ET");
    let _ = writeln!(s, "BT");
    let _ = writeln!(s, "/F1 {} Tf", FONT_SIZE);
    let _ = writeln!(s, "{:.2} {:.2} Td", MARGIN, MARGIN / 2.0);
    let _ = writeln!(s, "(Page {} of {}) Tj", page_no, page_count);
    let _ = writeln!(s, "ET");
    s
}

/// Lay `text` out as a PDF document.
pub fn render_pdf(text: &str, title: &str) -> Vec<u8> {
    let all: Vec<&str> = text.lines().collect();
    let per_page = lines_per_page().max(1);
    let pages: Vec<&[&str]> = if all.is_empty() {
        vec![&[][..]]
    } else {
        all.chunks(per_page).collect()
    };
    let page_count = pages.len();

    // 1 catalog, 2 pages, 3 font, 4 info, then (page, contents) pairs
    let first_page_obj = 5;
    let mut objects: Vec<String> = Vec::with_capacity(4 + page_count * 2);
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", first_page_obj + i * 2))
        .collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        page_count
    ));
    objects.push(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Courier /Encoding /WinAnsiEncoding >>".to_string(),
    );
    objects.push(format!(
        "<< /Title ({}) /Producer (model-autopsy) /CreationDate (D:{}) >>",
        pdf_escape(title),
        Utc::now().format("%Y%m%d%H%M%SZ")
    ));
    for (i, lines) in pages.iter().enumerate() {
        let contents_obj = first_page_obj + i * 2 + 1;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            PAGE_W, PAGE_H, contents_obj
        ));
        let stream = content_stream(lines, i + 1, page_count);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            stream.len(),
            stream
        ));
    }

    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }
    let xref_at = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in &offsets {
        let _ = writeln!(xref, "{:010} 00000 n ", off);
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R /Info 4 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    );
    out.extend_from_slice(xref.as_bytes());
    out
}

pub fn export_pdf(view: &ReportView, path: &Path) -> Result<()> {
    let text = Painter::plain(PDF_COLUMNS).report(view);
    let bytes = render_pdf(&text, "Model Autopsy Report");
    std::fs::write(path, &bytes).with_context(|| format!("cannot write {}", path.display()))?;
    logging::info(
        Domain::Export,
        "pdf",
        obj(&[
            ("path", v_str(&path.to_string_lossy())),
            ("bytes", serde_json::json!(bytes.len())),
        ]),
    );
    Ok(())
}

pub fn export_json(report: &AutopsyReport, path: &Path) -> Result<()> {
    let body = serde_json::to_vec_pretty(report).context("cannot serialize report")?;
    std::fs::write(path, &body).with_context(|| format!("cannot write {}", path.display()))?;
    logging::info(
        Domain::Export,
        "json",
        obj(&[("path", v_str(&path.to_string_lossy()))]),
    );
    Ok(())
}
