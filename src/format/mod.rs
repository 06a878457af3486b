//! Format Module
//!
//! Byte formats the contest exchanges with people rather than programs:
//! - normalized story documents (WordprocessingML in a zip container)
//! - the reviewer's assignment workbook (SpreadsheetML)
//! - the archive of documents handed to a reviewer
//!
//! The engine only relies on the four entry points re-exported here.

mod docx;
mod xlsx;
mod archive;

pub use docx::{extract_text, render_document, DOCX_CONTENT_TYPE};
pub use xlsx::{build_workbook, WorkbookRow, XLSX_CONTENT_TYPE};
pub use archive::{build_archive, ZIP_CONTENT_TYPE};

/// Escape the five XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
