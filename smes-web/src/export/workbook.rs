//! XLSX workbook serialization
//!
//! Writes a minimal Office Open XML package (a zip of XML parts) without a
//! spreadsheet dependency: a data sheet and an optional codebook sheet.
//! Text cells use inline strings so no shared-strings part is needed;
//! one-hot cells are written as numbers.

use std::io::{Cursor, Write};

use smes_common::{Error, Result};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::rows::{Cell, RowSet};

/// Data sheet name shown in the workbook
pub const DATA_SHEET_NAME: &str = "Survey Responses";
/// Codebook sheet name
pub const CODEBOOK_SHEET_NAME: &str = "Codebook";

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn cell_xml(cell: &Cell) -> String {
    match cell {
        Cell::Int(n) => format!("<c><v>{}</v></c>", n),
        Cell::Text(s) => format!(
            "<c t=\"inlineStr\"><is><t>{}</t></is></c>",
            xml_escape(s)
        ),
    }
}

fn sheet_xml(set: &RowSet) -> String {
    let mut body = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
         <sheetData>",
    );

    body.push_str("<row>");
    for header in &set.headers {
        body.push_str(&cell_xml(&Cell::Text(header.clone())));
    }
    body.push_str("</row>");

    for row in &set.rows {
        body.push_str("<row>");
        for cell in row {
            body.push_str(&cell_xml(cell));
        }
        body.push_str("</row>");
    }

    body.push_str("</sheetData></worksheet>");
    body
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut overrides = String::new();
    for i in 1..=sheet_count {
        overrides.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{}.xml\" \
             ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
            i
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/xl/workbook.xml\" \
          ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>\
         {}</Types>",
        overrides
    )
}

const ROOT_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
    <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
    <Relationship Id=\"rId1\" \
     Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" \
     Target=\"xl/workbook.xml\"/></Relationships>";

fn workbook_xml(sheet_names: &[&str]) -> String {
    let mut sheets = String::new();
    for (i, name) in sheet_names.iter().enumerate() {
        sheets.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
            xml_escape(name),
            i + 1,
            i + 1
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
          xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
         <sheets>{}</sheets></workbook>",
        sheets
    )
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut rels = String::new();
    for i in 1..=sheet_count {
        rels.push_str(&format!(
            "<Relationship Id=\"rId{}\" \
             Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" \
             Target=\"worksheets/sheet{}.xml\"/>",
            i, i
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         {}</Relationships>",
        rels
    )
}

/// Build the workbook bytes: the data sheet plus, when requested, the
/// codebook sheet
pub fn build_workbook(data: &RowSet, codebook: Option<&RowSet>) -> Result<Vec<u8>> {
    let mut sheet_names = vec![DATA_SHEET_NAME];
    let mut sheets = vec![data];
    if let Some(codebook) = codebook {
        sheet_names.push(CODEBOOK_SHEET_NAME);
        sheets.push(codebook);
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let zip_err =
        |e: zip::result::ZipError| Error::Internal(format!("Workbook write failed: {}", e));

    zip.start_file("[Content_Types].xml", options).map_err(zip_err)?;
    zip.write_all(content_types_xml(sheets.len()).as_bytes())?;

    zip.start_file("_rels/.rels", options).map_err(zip_err)?;
    zip.write_all(ROOT_RELS.as_bytes())?;

    zip.start_file("xl/workbook.xml", options).map_err(zip_err)?;
    zip.write_all(workbook_xml(&sheet_names).as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options).map_err(zip_err)?;
    zip.write_all(workbook_rels_xml(sheets.len()).as_bytes())?;

    for (i, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
            .map_err(zip_err)?;
        zip.write_all(sheet_xml(sheet).as_bytes())?;
    }

    let cursor = zip.finish().map_err(zip_err)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn sample() -> RowSet {
        RowSet {
            headers: vec!["User_ID".into(), "grade".into()],
            rows: vec![
                vec![Cell::from("u-1"), Cell::from("Grade 11")],
                vec![Cell::from("u-2"), Cell::Int(1)],
            ],
        }
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes.to_vec())).expect("zip");
        let mut part = archive.by_name(name).expect(name);
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_package_structure() {
        let bytes = build_workbook(&sample(), None).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("zip");
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/worksheets/sheet1.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {}", name);
        }
    }

    #[test]
    fn test_codebook_adds_second_sheet() {
        let codebook = RowSet {
            headers: vec!["Column Name".into()],
            rows: vec![vec![Cell::from("grade")]],
        };
        let bytes = build_workbook(&sample(), Some(&codebook)).unwrap();

        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains("Survey Responses"));
        assert!(workbook.contains("Codebook"));
        read_part(&bytes, "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_cells_and_escaping() {
        let set = RowSet {
            headers: vec!["text".into()],
            rows: vec![vec![Cell::from("a < b & c")]],
        };
        let bytes = build_workbook(&set, None).unwrap();
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("<t>a &lt; b &amp; c</t>"));
    }

    #[test]
    fn test_numeric_cells_are_numbers() {
        let bytes = build_workbook(&sample(), None).unwrap();
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("<c><v>1</v></c>"));
    }
}
