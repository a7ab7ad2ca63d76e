//! Run-local marker substitution in slide XML.
//!
//! Templates carry literal marker tokens (NAME, COMPANY_NME, FIELD,
//! NEXT_PRESENTER) inside text runs. Substitution rewrites every `<a:t>`
//! text node, replacing marker occurrences with supplied values. Matching is
//! run-local: a marker split across two runs is not matched.

use crate::common::escape_xml;
use crate::pptx::error::{PptxError, Result};
use memchr::memmem;
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};

/// Replace marker tokens in a slide's text runs.
///
/// Substitutions apply in the order given; replacement is literal substring
/// substitution, so a value that itself contains a later marker token is
/// affected by the subsequent substitution. Slides containing none of the
/// markers are returned byte-unchanged.
pub fn substitute(slide_xml: &[u8], subs: &[(&str, &str)]) -> Result<Vec<u8>> {
    // Fast path: no marker anywhere in the part, nothing to rewrite.
    let any_present = subs
        .iter()
        .any(|(marker, _)| memmem::find(slide_xml, marker.as_bytes()).is_some());
    if !any_present {
        return Ok(slide_xml.to_vec());
    }

    let mut reader = Reader::from_reader(slide_xml);
    let mut writer = Writer::new(Vec::with_capacity(slide_xml.len()));
    let mut buf = Vec::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_run_text = true;
                }
                writer.write_event(Event::Start(e))?;
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_run_text = false;
                }
                writer.write_event(Event::End(e))?;
            },
            Ok(Event::Text(e)) if in_run_text => {
                // Operate on the raw (still-escaped) text: markers contain no
                // escapable characters, and values are escaped on the way in,
                // so untouched entities survive byte-for-byte.
                let raw = std::str::from_utf8(e.as_ref())
                    .map_err(|err| PptxError::Xml(err.to_string()))?;
                let mut text = raw.to_string();
                for (marker, value) in subs {
                    if text.contains(marker) {
                        text = text.replace(marker, &escape_xml(value));
                    }
                }
                writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))?;
            },
            Ok(event) => writer.write_event(event)?,
            Err(e) => return Err(PptxError::Xml(format!("Slide parse error: {}", e))),
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}

/// Extract the concatenated run text of a slide, one line per `<a:t>`.
///
/// Used by tests and diagnostics; mirrors the read side of `substitute`.
pub fn run_text(slide_xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(slide_xml);
    reader.config_mut().trim_text(false);

    let mut runs = Vec::new();
    let mut in_run_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_run_text = true;
                    runs.push(String::new());
                }
            },
            Ok(Event::Text(e)) if in_run_text => {
                let decoded = e
                    .decode()
                    .map_err(|err| PptxError::Xml(err.to_string()))?;
                let text = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| PptxError::Xml(err.to_string()))?;
                if let Some(last) = runs.last_mut() {
                    last.push_str(&text);
                }
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_run_text = false;
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::Xml(format!("Slide parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(runs)
}
