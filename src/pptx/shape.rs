/// Shape inspection for slide parts.
///
/// Parses the top-level shapes of a slide's `<p:spTree>`, exposing the
/// properties templating needs: shape name (from `<p:cNvPr>`), kind, and
/// position/size in EMU (from `<a:off>`/`<a:ext>`). Shapes nested inside
/// group shapes are not surfaced.
use crate::pptx::error::{PptxError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Shape kind, from the element name in the shape tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// A text shape (p:sp)
    Shape,
    /// A picture shape (p:pic)
    Picture,
    /// A graphic frame containing a table or chart (p:graphicFrame)
    GraphicFrame,
    /// A group shape (p:grpSp)
    GroupShape,
    /// A connector shape (p:cxnSp)
    Connector,
}

impl ShapeKind {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"sp" => Some(Self::Shape),
            b"pic" => Some(Self::Picture),
            b"graphicFrame" => Some(Self::GraphicFrame),
            b"grpSp" => Some(Self::GroupShape),
            b"cxnSp" => Some(Self::Connector),
            _ => None,
        }
    }
}

/// A rectangle in EMU: offset plus extent, as in `<a:xfrm>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// X position in EMUs
    pub x: i64,
    /// Y position in EMUs
    pub y: i64,
    /// Width in EMUs
    pub cx: i64,
    /// Height in EMUs
    pub cy: i64,
}

/// A top-level shape in a slide's shape tree.
#[derive(Debug, Clone)]
pub struct Shape {
    /// Shape name from `<p:cNvPr>`
    pub name: String,
    /// Shape kind
    pub kind: ShapeKind,
    /// Position and size, when the shape carries an explicit `<a:xfrm>`
    pub frame: Option<Rect>,
}

/// Parse the top-level shapes of a slide.
pub fn shapes(slide_xml: &[u8]) -> Result<Vec<Shape>> {
    let mut reader = Reader::from_reader(slide_xml);
    reader.config_mut().trim_text(true);

    let mut result = Vec::new();
    let mut in_sp_tree = false;
    // (shape under construction, partial geometry, element depth inside it)
    let mut current: Option<(Shape, PartialRect, u32)> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let local = e.local_name();
                if let Some((shape, rect, depth)) = current.as_mut() {
                    *depth += 1;
                    capture(&e, shape, rect)?;
                } else if in_sp_tree {
                    if let Some(kind) = ShapeKind::from_local_name(local.as_ref()) {
                        current = Some((
                            Shape {
                                name: String::new(),
                                kind,
                                frame: None,
                            },
                            PartialRect::default(),
                            1,
                        ));
                    }
                } else if local.as_ref() == b"spTree" {
                    in_sp_tree = true;
                }
            },
            Ok(Event::Empty(e)) => {
                if let Some((shape, rect, _)) = current.as_mut() {
                    capture(&e, shape, rect)?;
                }
            },
            Ok(Event::End(e)) => {
                let mut finished = false;
                if let Some((_, _, depth)) = current.as_mut() {
                    *depth -= 1;
                    finished = *depth == 0;
                } else if in_sp_tree && e.local_name().as_ref() == b"spTree" {
                    in_sp_tree = false;
                }
                if finished && let Some((mut shape, rect, _)) = current.take() {
                    shape.frame = rect.into_rect();
                    result.push(shape);
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::Xml(format!("Slide parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(result)
}

/// Find a top-level shape by its name.
pub fn find_named(shapes: &[Shape], name: &str) -> Option<Shape> {
    shapes.iter().find(|s| s.name == name).cloned()
}

/// Geometry accumulator; off and ext arrive as separate elements.
#[derive(Default)]
struct PartialRect {
    x: Option<i64>,
    y: Option<i64>,
    cx: Option<i64>,
    cy: Option<i64>,
}

impl PartialRect {
    fn into_rect(self) -> Option<Rect> {
        match (self.x, self.y, self.cx, self.cy) {
            (Some(x), Some(y), Some(cx), Some(cy)) => Some(Rect { x, y, cx, cy }),
            _ => None,
        }
    }
}

/// Capture name and geometry from elements inside a shape.
///
/// First occurrence wins: the shape's own `<p:cNvPr>` and `<a:xfrm>` precede
/// any nested content (group children, extension lists).
fn capture(e: &BytesStart, shape: &mut Shape, rect: &mut PartialRect) -> Result<()> {
    match e.local_name().as_ref() {
        b"cNvPr" if shape.name.is_empty() => {
            for attr in e.attributes() {
                let attr = attr?;
                if attr.key.as_ref() == b"name" {
                    shape.name = attr.unescape_value()?.to_string();
                }
            }
        },
        b"off" if rect.x.is_none() && rect.y.is_none() => {
            for attr in e.attributes() {
                let attr = attr?;
                match attr.key.as_ref() {
                    b"x" => rect.x = parse_emu(&attr.value),
                    b"y" => rect.y = parse_emu(&attr.value),
                    _ => {},
                }
            }
        },
        b"ext" if rect.cx.is_none() && rect.cy.is_none() => {
            for attr in e.attributes() {
                let attr = attr?;
                match attr.key.as_ref() {
                    b"cx" => rect.cx = parse_emu(&attr.value),
                    b"cy" => rect.cy = parse_emu(&attr.value),
                    _ => {},
                }
            }
        },
        _ => {},
    }
    Ok(())
}

#[inline]
fn parse_emu(value: &[u8]) -> Option<i64> {
    std::str::from_utf8(value).ok().and_then(|s| s.parse().ok())
}
