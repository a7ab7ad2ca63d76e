//! Presenter roster extraction from uploaded .xlsx workbooks.
//!
//! The roster workbook must carry a "Name" column in its header row; other
//! columns are ignored and rows with an empty name are dropped. Only the
//! pieces of SpreadsheetML this needs are parsed: the first sheet of
//! workbook.xml, the shared strings table, and the cells of that sheet.

use crate::compose::error::{ComposeError, Result};
use crate::opc::constants::relationship_type as rt;
use crate::opc::{OpcPackage, PackURI, Part};
use quick_xml::Reader;
use quick_xml::events::Event;

/// The required roster column label.
const NAME_COLUMN: &str = "Name";

/// Extract the ordered roster from workbook bytes.
///
/// Returns `ComposeError::MissingNameColumn` when the header row has no
/// "Name" cell; this aborts before any file output exists.
pub fn names_from_xlsx(data: &[u8]) -> Result<Vec<String>> {
    let pkg = OpcPackage::from_bytes(data.to_vec())?;

    let workbook_uri = pkg.main_document_partname()?;
    let workbook = pkg.get_part(&workbook_uri)?;

    let sheet_uri = first_sheet_partname(workbook)?;
    let shared = shared_strings(&pkg, workbook)?;

    let sheet = pkg.get_part(&sheet_uri)?;
    let rows = sheet_rows(sheet.blob(), &shared)?;

    let mut rows = rows.into_iter();
    let header = rows.next().unwrap_or_default();
    let name_col = header
        .iter()
        .position(|cell| cell.as_deref() == Some(NAME_COLUMN))
        .ok_or(ComposeError::MissingNameColumn)?;

    let mut names = Vec::new();
    for row in rows {
        if let Some(Some(value)) = row.get(name_col) {
            let value = value.trim();
            if !value.is_empty() {
                names.push(value.to_string());
            }
        }
    }

    Ok(names)
}

/// Resolve the first sheet of workbook.xml to its worksheet partname.
fn first_sheet_partname(workbook: &dyn Part) -> Result<PackURI> {
    let mut reader = Reader::from_reader(workbook.blob());
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"sheet" {
                    for attr in e.attributes() {
                        let attr =
                            attr.map_err(|err| ComposeError::Workbook(err.to_string()))?;
                        if attr.key.as_ref() == b"r:id" {
                            let r_id = attr
                                .unescape_value()
                                .map_err(|err| ComposeError::Workbook(err.to_string()))?;
                            let rel = workbook.rels().get(&r_id).ok_or_else(|| {
                                ComposeError::Workbook(format!("unresolved sheet rId {}", r_id))
                            })?;
                            return Ok(rel.target_partname()?);
                        }
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ComposeError::Workbook(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Err(ComposeError::Workbook("workbook has no sheets".to_string()))
}

/// Load the shared strings table, if the workbook has one.
///
/// Rich-text strings concatenate every `<t>` run inside the `<si>`.
fn shared_strings(pkg: &OpcPackage, workbook: &dyn Part) -> Result<Vec<String>> {
    let rel = match workbook.rels().part_with_reltype(rt::SHARED_STRINGS) {
        Ok(rel) => rel,
        Err(_) => return Ok(Vec::new()),
    };
    let part = pkg.get_part(&rel.target_partname()?)?;

    let mut reader = Reader::from_reader(part.blob());
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => strings.push(String::new()),
                b"t" => in_text = true,
                _ => {},
            },
            Ok(Event::Text(e)) if in_text => {
                let decoded = e
                    .decode()
                    .map_err(|err| ComposeError::Workbook(err.to_string()))?;
                let text = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| ComposeError::Workbook(err.to_string()))?;
                if let Some(last) = strings.last_mut() {
                    last.push_str(&text);
                }
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = false;
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ComposeError::Workbook(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Ok(strings)
}

/// Parse worksheet cells into rows of optional string values.
///
/// Cells resolve per their type attribute: shared-string index, inline
/// string, or the literal `<v>` text.
fn sheet_rows(sheet_xml: &[u8], shared: &[String]) -> Result<Vec<Vec<Option<String>>>> {
    let mut reader = Reader::from_reader(sheet_xml);
    let mut buf = Vec::new();

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    let mut current_row: Option<Vec<Option<String>>> = None;
    let mut current_col: Option<usize> = None;
    let mut cell_type = CellType::Number;
    let mut in_value = false;
    let mut pending: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.local_name().as_ref() {
                    b"row" => current_row = Some(Vec::new()),
                    b"c" => {
                        current_col = None;
                        cell_type = CellType::Number;
                        pending = None;
                        for attr in e.attributes() {
                            let attr =
                                attr.map_err(|err| ComposeError::Workbook(err.to_string()))?;
                            match attr.key.as_ref() {
                                b"r" => current_col = column_index(&attr.value),
                                b"t" => {
                                    cell_type = match attr.value.as_ref() {
                                        b"s" => CellType::Shared,
                                        b"inlineStr" => CellType::Inline,
                                        _ => CellType::Number,
                                    };
                                },
                                _ => {},
                            }
                        }
                    },
                    b"v" => in_value = true,
                    b"t" if cell_type == CellType::Inline => in_value = true,
                    _ => {},
                }
            },
            Ok(Event::Text(e)) if in_value => {
                let decoded = e
                    .decode()
                    .map_err(|err| ComposeError::Workbook(err.to_string()))?;
                let text = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| ComposeError::Workbook(err.to_string()))?;
                let value = match cell_type {
                    CellType::Shared => text
                        .parse::<usize>()
                        .ok()
                        .and_then(|idx| shared.get(idx).cloned())
                        .unwrap_or_default(),
                    _ => text.into_owned(),
                };
                pending = Some(match pending.take() {
                    Some(mut existing) => {
                        existing.push_str(&value);
                        existing
                    },
                    None => value,
                });
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let (Some(row), Some(col)) = (current_row.as_mut(), current_col) {
                        if row.len() <= col {
                            row.resize(col + 1, None);
                        }
                        row[col] = pending.take();
                    }
                },
                b"row" => {
                    if let Some(row) = current_row.take() {
                        rows.push(row);
                    }
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ComposeError::Workbook(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Ok(rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellType {
    Number,
    Shared,
    Inline,
}

/// 0-based column index from a cell reference like "B7".
fn column_index(cell_ref: &[u8]) -> Option<usize> {
    let mut col = 0usize;
    let mut saw_letter = false;
    for &b in cell_ref {
        if b.is_ascii_uppercase() {
            col = col * 26 + (b - b'A' + 1) as usize;
            saw_letter = true;
        } else {
            break;
        }
    }
    saw_letter.then(|| col - 1)
}
