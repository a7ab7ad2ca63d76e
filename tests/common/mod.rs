#![allow(dead_code)] // each test crate uses its own subset
//! Shared test infrastructure: in-memory OPC fixtures.
//!
//! Builds the packages the integration tests feed the crate: a complete
//! single-slide presentation (slide, layout, master, theme chain) and small
//! roster workbooks, plus a multipart body builder for handler tests.

use deckgen::opc::PackURI;
use deckgen::opc::phys_pkg::PhysPkgWriter;
use std::path::Path;

pub const INDIVIDUAL_TEMPLATE: &str = "individual_template.pptx";
pub const THEME_TEMPLATE: &str = "theme_slide.pptx";
pub const CONSTANT_TEMPLATE: &str = "constant_slide.pptx";
pub const GREEN_TAG_IMAGE: &str = "green_member_tag.png";
pub const GOLD_TAG_IMAGE: &str = "gold_club_member_tag.png";

// ============================================================================
// PRESENTATION FIXTURES
// ============================================================================

const PPTX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Default Extension="jpeg" ContentType="image/jpeg"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
  <Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
  <Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
  <Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
</Types>"#;

const PPTX_PKG_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#;

const PRESENTATION_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
</Relationships>"#;

const SLIDE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
</Relationships>"#;

const LAYOUT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree/></p:cSld></p:sldLayout>"#;

const LAYOUT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>"#;

const MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:cSld><p:spTree/></p:cSld><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#;

const MASTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>
</Relationships>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Fixture"/>"#;

/// Build a complete single-slide .pptx whose slide carries the given runs in
/// a text shape, plus named photo/logo placeholder shapes.
pub fn slide_pptx(extra_runs: &str) -> Vec<u8> {
    let slide = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="PhotoPlaceholder"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="914400" y="914400"/><a:ext cx="2743200" cy="3657600"/></a:xfrm></p:spPr></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="LogoPlaceholder"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="5486400" y="914400"/><a:ext cx="1828800" cy="914400"/></a:xfrm></p:spPr></p:sp><p:sp><p:nvSpPr><p:cNvPr id="4" name="Caption"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/>{}</a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
        extra_runs
    );

    let parts: &[(&str, &str)] = &[
        ("/[Content_Types].xml", PPTX_CONTENT_TYPES),
        ("/_rels/.rels", PPTX_PKG_RELS),
        ("/ppt/presentation.xml", PRESENTATION),
        ("/ppt/_rels/presentation.xml.rels", PRESENTATION_RELS),
        ("/ppt/slides/slide1.xml", slide.as_str()),
        ("/ppt/slides/_rels/slide1.xml.rels", SLIDE_RELS),
        ("/ppt/slideLayouts/slideLayout1.xml", LAYOUT),
        ("/ppt/slideLayouts/_rels/slideLayout1.xml.rels", LAYOUT_RELS),
        ("/ppt/slideMasters/slideMaster1.xml", MASTER),
        ("/ppt/slideMasters/_rels/slideMaster1.xml.rels", MASTER_RELS),
        ("/ppt/theme/theme1.xml", THEME),
    ];

    write_parts(parts)
}

/// Write the template library (and tag images) into a directory.
pub fn setup_library(dir: &Path) {
    std::fs::write(
        dir.join(INDIVIDUAL_TEMPLATE),
        slide_pptx("<a:t>NAME</a:t><a:t>next: NEXT_PRESENTER</a:t>"),
    )
    .unwrap();
    std::fs::write(dir.join(THEME_TEMPLATE), slide_pptx("<a:t>Theme</a:t>")).unwrap();
    std::fs::write(dir.join(CONSTANT_TEMPLATE), slide_pptx("<a:t>Closing</a:t>")).unwrap();
    std::fs::write(dir.join(GREEN_TAG_IMAGE), png()).unwrap();
    std::fs::write(dir.join(GOLD_TAG_IMAGE), png()).unwrap();
}

/// A complete 1x1 PNG.
pub fn png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
        0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78,
        0x9C, 0x62, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
        0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

// ============================================================================
// WORKBOOK FIXTURES
// ============================================================================

const XLSX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
  <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
</Types>"#;

const XLSX_PKG_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

/// Build a roster workbook: given header labels and rows of cell values,
/// every string lands in the shared strings table.
pub fn roster_xlsx(header: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let mut strings: Vec<String> = Vec::new();
    let mut index_of = |value: &str| {
        if let Some(idx) = strings.iter().position(|s| s == value) {
            idx
        } else {
            strings.push(value.to_string());
            strings.len() - 1
        }
    };

    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    let mut all_rows: Vec<Vec<&str>> = vec![header.to_vec()];
    all_rows.extend(rows.iter().map(|r| r.to_vec()));

    for (row_idx, row) in all_rows.iter().enumerate() {
        sheet.push_str(&format!(r#"<row r="{}">"#, row_idx + 1));
        for (col_idx, value) in row.iter().enumerate() {
            let col_letter = (b'A' + col_idx as u8) as char;
            if value.is_empty() {
                sheet.push_str(&format!(r#"<c r="{}{}"/>"#, col_letter, row_idx + 1));
            } else {
                let idx = index_of(value);
                sheet.push_str(&format!(
                    r#"<c r="{}{}" t="s"><v>{}</v></c>"#,
                    col_letter,
                    row_idx + 1,
                    idx
                ));
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let mut shared = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    for s in &strings {
        shared.push_str(&format!("<si><t>{}</t></si>", s));
    }
    shared.push_str("</sst>");

    let parts: &[(&str, &str)] = &[
        ("/[Content_Types].xml", XLSX_CONTENT_TYPES),
        ("/_rels/.rels", XLSX_PKG_RELS),
        ("/xl/workbook.xml", WORKBOOK),
        ("/xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("/xl/worksheets/sheet1.xml", sheet.as_str()),
        ("/xl/sharedStrings.xml", shared.as_str()),
    ];

    write_parts(parts)
}

fn write_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = PhysPkgWriter::new();
    for (name, content) in parts {
        writer
            .write(&PackURI::new(*name).unwrap(), content.as_bytes())
            .unwrap();
    }
    writer.finish().unwrap()
}

// ============================================================================
// MULTIPART BODIES
// ============================================================================

/// Hand-rolled multipart/form-data body for handler tests.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "----deckgen-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Finish the body, returning the Content-Type header value and payload.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}
