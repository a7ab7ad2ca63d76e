/// Package implementation for PowerPoint presentations.
use crate::opc::constants::{content_type as ct, relationship_type as rt};
use crate::opc::part::BlobPart;
use crate::opc::{OpcPackage, PackURI, PackageWriter, Part};
use crate::pptx::error::{PptxError, Result};
use crate::pptx::format::ImageFormat;
use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write as FmtWrite;
use std::io::Read;
use std::path::Path;

/// A PowerPoint (.pptx) package.
///
/// Wraps an OPC package and provides the presentation-specific operations
/// templating needs: slide resolution in document order, in-place slide
/// patching, image part insertion, and slide-list maintenance.
pub struct PptxPackage {
    /// The underlying OPC package
    opc: OpcPackage,
}

impl PptxPackage {
    /// Open a .pptx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    /// Create a .pptx package from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_opc(OpcPackage::from_reader(reader)?)
    }

    /// Create a .pptx package from owned bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    /// Verify the main part's content type and wrap the package.
    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main_part = opc
            .main_document_part()
            .map_err(|e| PptxError::PartNotFound(format!("main presentation part: {}", e)))?;

        let content_type = main_part.content_type();
        // Support both regular and macro-enabled presentations
        if content_type != ct::PML_PRESENTATION_MAIN && content_type != ct::PML_PRES_MACRO_MAIN {
            return Err(PptxError::InvalidContentType {
                expected: format!("{} or {}", ct::PML_PRESENTATION_MAIN, ct::PML_PRES_MACRO_MAIN),
                got: content_type.to_string(),
            });
        }

        Ok(Self { opc })
    }

    /// Get the underlying OPC package.
    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }

    /// Get mutable access to the underlying OPC package.
    #[inline]
    pub fn opc_package_mut(&mut self) -> &mut OpcPackage {
        &mut self.opc
    }

    /// Get the partname of the presentation part.
    pub fn presentation_partname(&self) -> Result<PackURI> {
        Ok(self.opc.main_document_partname()?)
    }

    /// Get the slide partnames in document order.
    ///
    /// Document order is defined by `<p:sldIdLst>` in presentation.xml; each
    /// `<p:sldId r:id="..">` resolves through the presentation part's
    /// relationships.
    pub fn slide_partnames(&self) -> Result<Vec<PackURI>> {
        let pres_uri = self.presentation_partname()?;
        let pres = self.opc.get_part(&pres_uri)?;

        let mut reader = Reader::from_reader(pres.blob());
        let mut buf = Vec::new();
        let mut slides = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"sldId" {
                        for attr in e.attributes() {
                            let attr = attr?;
                            if attr.key.as_ref() == b"r:id" {
                                let r_id = attr.unescape_value()?;
                                let rel = pres.rels().get(&r_id).ok_or_else(|| {
                                    PptxError::Xml(format!("Unresolved slide rId {}", r_id))
                                })?;
                                slides.push(rel.target_partname()?);
                            }
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(PptxError::Xml(format!("presentation.xml parse error: {}", e)));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(slides)
    }

    /// Get a slide part's XML.
    pub fn slide_xml(&self, slide_uri: &PackURI) -> Result<Vec<u8>> {
        Ok(self.opc.get_part(slide_uri)?.blob().to_vec())
    }

    /// Replace a slide part's XML in place.
    pub fn set_slide_xml(&mut self, slide_uri: &PackURI, xml: Vec<u8>) -> Result<()> {
        self.opc.get_part_mut(slide_uri)?.set_blob(xml);
        Ok(())
    }

    /// Add an image part and relate it to the owning part.
    ///
    /// The image lands at the next free `/ppt/media/imageN.<ext>` partname;
    /// the returned rId is valid inside the owner's XML (`r:embed`).
    pub fn add_image_part(
        &mut self,
        owner_uri: &PackURI,
        data: Vec<u8>,
        format: ImageFormat,
    ) -> Result<String> {
        let template = format!("/ppt/media/image%d.{}", format.extension());
        let image_uri = self.opc.next_partname(&template)?;

        self.opc.add_part(Box::new(BlobPart::new(
            image_uri.clone(),
            format.mime_type().to_string(),
            data,
        )));

        let owner = self.opc.get_part_mut(owner_uri)?;
        let target_ref = image_uri.relative_ref(owner_uri.base_uri());
        Ok(owner.relate_to(&target_ref, rt::IMAGE))
    }

    /// Append slides to `<p:sldIdLst>`, relating each to the presentation
    /// part. Slide ids continue from the current maximum (floor 256).
    pub fn append_slide_entries(&mut self, slide_uris: &[PackURI]) -> Result<()> {
        if slide_uris.is_empty() {
            return Ok(());
        }

        let pres_uri = self.presentation_partname()?;

        let mut entries = String::new();
        {
            let pres = self.opc.get_part_mut(&pres_uri)?;
            let mut next_id = Self::max_list_id(pres.blob(), b"sldId")?.max(255) + 1;

            for slide_uri in slide_uris {
                let target_ref = slide_uri.relative_ref(pres_uri.base_uri());
                let r_id = pres.relate_to(&target_ref, rt::SLIDE);
                write!(entries, r#"<p:sldId id="{}" r:id="{}"/>"#, next_id, r_id)
                    .map_err(|e| PptxError::Xml(e.to_string()))?;
                next_id += 1;
            }
        }

        self.append_list_entries(&pres_uri, b"</p:sldIdLst>", "<p:sldIdLst>", &entries)
    }

    /// Append slide masters to `<p:sldMasterIdLst>`.
    ///
    /// Master ids must be at or above the PML floor of 2147483648.
    pub fn append_master_entries(&mut self, master_uris: &[PackURI]) -> Result<()> {
        if master_uris.is_empty() {
            return Ok(());
        }

        let pres_uri = self.presentation_partname()?;

        let mut entries = String::new();
        {
            let pres = self.opc.get_part_mut(&pres_uri)?;
            let mut next_id = Self::max_list_id(pres.blob(), b"sldMasterId")?
                .max(2_147_483_647)
                + 1;

            for master_uri in master_uris {
                let target_ref = master_uri.relative_ref(pres_uri.base_uri());
                let r_id = pres.relate_to(&target_ref, rt::SLIDE_MASTER);
                write!(
                    entries,
                    r#"<p:sldMasterId id="{}" r:id="{}"/>"#,
                    next_id, r_id
                )
                .map_err(|e| PptxError::Xml(e.to_string()))?;
                next_id += 1;
            }
        }

        self.append_list_entries(
            &pres_uri,
            b"</p:sldMasterIdLst>",
            "<p:sldMasterIdLst>",
            &entries,
        )
    }

    /// Splice list entries into presentation.xml, creating the list element
    /// when the template carries none.
    fn append_list_entries(
        &mut self,
        pres_uri: &PackURI,
        close_tag: &[u8],
        open_tag: &str,
        entries: &str,
    ) -> Result<()> {
        let pres = self.opc.get_part_mut(pres_uri)?;
        let xml = pres.blob();

        let patched = if let Some(pos) = memmem::find(xml, close_tag) {
            let mut out = Vec::with_capacity(xml.len() + entries.len());
            out.extend_from_slice(&xml[..pos]);
            out.extend_from_slice(entries.as_bytes());
            out.extend_from_slice(&xml[pos..]);
            out
        } else {
            // No list yet: insert a fresh one ahead of the slide-size
            // element, which is required and always present.
            let element = format!(
                "{}{}{}",
                open_tag,
                entries,
                String::from_utf8_lossy(close_tag)
            );
            let anchor = memmem::find(xml, b"<p:sldSz")
                .or_else(|| memmem::rfind(xml, b"</p:presentation>"))
                .ok_or_else(|| {
                    PptxError::Xml("presentation.xml has no insertion anchor".to_string())
                })?;
            let mut out = Vec::with_capacity(xml.len() + element.len());
            out.extend_from_slice(&xml[..anchor]);
            out.extend_from_slice(element.as_bytes());
            out.extend_from_slice(&xml[anchor..]);
            out
        };

        pres.set_blob(patched);
        Ok(())
    }

    /// Scan presentation.xml for the maximum id attribute of a list element.
    fn max_list_id(xml: &[u8], local_name: &[u8]) -> Result<u64> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut max_id = 0u64;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == local_name {
                        for attr in e.attributes() {
                            let attr = attr?;
                            if attr.key.as_ref() == b"id"
                                && let Ok(id) = atoi_simd::parse::<u64, false, false>(&attr.value)
                            {
                                max_id = max_id.max(id);
                            }
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(PptxError::Xml(format!("presentation.xml parse error: {}", e)));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(max_id)
    }

    /// Refresh the dcterms:modified timestamp in docProps/core.xml.
    ///
    /// Packages without core properties are left untouched.
    pub fn refresh_core_modified(&mut self) {
        let core_uri = match self.opc.rels().part_with_reltype(rt::CORE_PROPERTIES) {
            Ok(rel) => match rel.target_partname() {
                Ok(uri) => uri,
                Err(_) => return,
            },
            Err(_) => return,
        };

        let Ok(core) = self.opc.get_part_mut(&core_uri) else {
            return;
        };

        let xml = core.blob();
        let open = b"<dcterms:modified";
        let close = b"</dcterms:modified>";
        let (Some(start), Some(end)) = (memmem::find(xml, open), memmem::find(xml, close)) else {
            return;
        };
        if end <= start {
            return;
        }

        let stamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let replacement = format!(r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}"#, stamp);

        let mut out = Vec::with_capacity(xml.len());
        out.extend_from_slice(&xml[..start]);
        out.extend_from_slice(replacement.as_bytes());
        out.extend_from_slice(&xml[end..]);
        core.set_blob(out);
    }

    /// Save the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PackageWriter::write(path, &self.opc).map_err(Into::into)
    }

    /// Serialize the package to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(&self.opc).map_err(Into::into)
    }
}
