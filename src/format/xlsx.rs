//! Minimal single-sheet workbook

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::Result;
use super::escape_xml;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One assigned story as listed for its reviewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookRow {
    pub story_id: String,
    pub title: String,
    pub author: String,
}

/// Build an "Assignments" workbook with a header row and one row per entry
pub fn build_workbook(rows: &[WorkbookRow]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let parts: [(&str, String); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", RELS.to_string()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/workbook.xml", WORKBOOK.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(rows)),
    ];
    for (name, content) in parts.iter() {
        zip.start_file(*name, SimpleFileOptions::default())?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

fn sheet_xml(rows: &[WorkbookRow]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\n  <sheetData>\n",
    );
    xml.push_str(&row_xml(1, &["Story ID", "Title", "Author"]));
    for (i, row) in rows.iter().enumerate() {
        xml.push_str(&row_xml(
            i + 2,
            &[&row.story_id, &row.title, &row.author],
        ));
    }
    xml.push_str("  </sheetData>\n</worksheet>\n");
    xml
}

fn row_xml(index: usize, cells: &[&str]) -> String {
    let mut xml = format!("    <row r=\"{}\">\n", index);
    for (col, cell) in (b'A'..).zip(cells.iter()) {
        xml.push_str(&format!(
            "      <c r=\"{}{}\" t=\"inlineStr\"><is><t>{}</t></is></c>\n",
            col as char,
            index,
            escape_xml(cell)
        ));
    }
    xml.push_str("    </row>\n");
    xml
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>
"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>
"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>
"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Assignments" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>
"#;
