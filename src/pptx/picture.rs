//! Picture insertion into a slide's shape tree.
//!
//! Builds a `<p:pic>` element referencing an image part by relationship ID
//! and splices it at the end of `<p:spTree>`, so inserted pictures render
//! above the template's placeholder shapes.

use crate::common::escape_xml;
use crate::pptx::error::{PptxError, Result};
use crate::pptx::shape::Rect;
use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write as FmtWrite;

/// Find the next free shape id for a slide.
///
/// Shape ids live in `<p:cNvPr id="..">`; id 1 is reserved for the group
/// shape, so the floor is 2.
pub fn next_shape_id(slide_xml: &[u8]) -> Result<u32> {
    let mut reader = Reader::from_reader(slide_xml);
    let mut buf = Vec::new();
    let mut max_id = 1u32;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"cNvPr" {
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"id"
                            && let Ok(id) = atoi_simd::parse::<u32, false, false>(&attr.value)
                        {
                            max_id = max_id.max(id);
                        }
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::Xml(format!("Slide parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(max_id + 1)
}

/// Generate the XML for a picture shape filling the given frame.
///
/// The blip fill stretches the image to the frame, so callers wanting
/// aspect-correct placement pass a pre-fitted frame.
pub fn picture_xml(shape_id: u32, name: &str, r_id: &str, frame: &Rect) -> Result<String> {
    let mut xml = String::with_capacity(512);

    xml.push_str("<p:pic>");
    xml.push_str("<p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{}"/>"#,
        shape_id,
        escape_xml(name)
    )
    .map_err(|e| PptxError::Xml(e.to_string()))?;
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvPicPr>");

    xml.push_str("<p:blipFill>");
    write!(xml, r#"<a:blip r:embed="{}"/>"#, escape_xml(r_id))
        .map_err(|e| PptxError::Xml(e.to_string()))?;
    xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
    xml.push_str("</p:blipFill>");

    xml.push_str("<p:spPr>");
    xml.push_str("<a:xfrm>");
    write!(xml, r#"<a:off x="{}" y="{}"/>"#, frame.x, frame.y)
        .map_err(|e| PptxError::Xml(e.to_string()))?;
    write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, frame.cx, frame.cy)
        .map_err(|e| PptxError::Xml(e.to_string()))?;
    xml.push_str("</a:xfrm>");
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr>");

    xml.push_str("</p:pic>");

    Ok(xml)
}

/// Splice a shape fragment in front of the closing `</p:spTree>` tag.
pub fn append_shape(slide_xml: &[u8], fragment: &str) -> Result<Vec<u8>> {
    let close = b"</p:spTree>";
    let pos = memmem::rfind(slide_xml, close).ok_or_else(|| {
        PptxError::Xml("Slide has no closing spTree element".to_string())
    })?;

    let mut out = Vec::with_capacity(slide_xml.len() + fragment.len());
    out.extend_from_slice(&slide_xml[..pos]);
    out.extend_from_slice(fragment.as_bytes());
    out.extend_from_slice(&slide_xml[pos..]);
    Ok(out)
}
