//! Per-person slide creation.
//!
//! Combines ledger assignment, marker substitution, and picture placement
//! into one saved single-slide package, keyed by the minted identifier.

use crate::common::unit::inches_to_emu;
use crate::compose::error::{ComposeError, Result};
use crate::compose::fit::fit_within;
use crate::compose::ledger::{Ledger, MemberId};
use crate::pptx::shape::{self, Rect};
use crate::pptx::{ImageFormat, PptxPackage, markers, picture};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Template file name within the slide library.
pub const INDIVIDUAL_TEMPLATE: &str = "individual_template.pptx";

/// Overlay tag image file names within the assets directory.
pub const GREEN_TAG_IMAGE: &str = "green_member_tag.png";
pub const GOLD_TAG_IMAGE: &str = "gold_club_member_tag.png";

/// Named placeholder shapes consumed from the template slide.
const PHOTO_PLACEHOLDER: &str = "PhotoPlaceholder";
const LOGO_PLACEHOLDER: &str = "LogoPlaceholder";

/// Inputs for one individual slide.
#[derive(Debug, Clone)]
pub struct SlideRequest {
    pub name: String,
    pub company: String,
    pub field: String,
    /// Uploaded photo, stretched to the photo placeholder's exact bounds.
    pub photo: Vec<u8>,
    /// Optional uploaded logo, aspect-fitted inside the logo placeholder.
    pub logo: Option<Vec<u8>>,
    pub green_member: bool,
    pub gold_club: bool,
}

/// Builds per-person slides from the individual template.
pub struct SlideBuilder {
    slides_dir: PathBuf,
    assets_dir: PathBuf,
}

impl SlideBuilder {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(slides_dir: P, assets_dir: Q) -> Self {
        Self {
            slides_dir: slides_dir.into(),
            assets_dir: assets_dir.into(),
        }
    }

    /// Build and save one individual slide.
    ///
    /// Mints the identifier first (the ledger row persists even if a later
    /// step fails), fills the NAME/COMPANY_NME/FIELD markers, places the
    /// photo and optional logo, overlays membership tags, and saves the
    /// result as `<id>.pptx` in the slide library.
    pub fn build(&self, ledger: &mut Ledger, req: &SlideRequest) -> Result<(MemberId, PathBuf)> {
        let id = ledger.mint(&req.name)?;

        let template_path = self.slides_dir.join(INDIVIDUAL_TEMPLATE);
        let mut pkg = PptxPackage::open(&template_path)?;

        let slide_uri = pkg
            .slide_partnames()?
            .into_iter()
            .next()
            .ok_or_else(|| ComposeError::EmptyTemplate(template_path.display().to_string()))?;

        let mut xml = markers::substitute(
            &pkg.slide_xml(&slide_uri)?,
            &[
                ("NAME", req.name.as_str()),
                ("COMPANY_NME", req.company.as_str()),
                ("FIELD", req.field.as_str()),
            ],
        )?;

        let shapes = shape::shapes(&xml)?;

        // Photo stretches to the placeholder's exact bounds; a template
        // without the named shape simply gets no photo.
        if let Some(frame) = shape::find_named(&shapes, PHOTO_PLACEHOLDER).and_then(|s| s.frame) {
            let format = ImageFormat::detect_from_bytes(&req.photo)
                .ok_or(ComposeError::UnsupportedImage)?;
            let r_id = pkg.add_image_part(&slide_uri, req.photo.clone(), format)?;
            let pic =
                picture::picture_xml(picture::next_shape_id(&xml)?, "Member Photo", &r_id, &frame)?;
            xml = picture::append_shape(&xml, &pic)?;
        } else {
            log::debug!("template has no {} shape", PHOTO_PLACEHOLDER);
        }

        if let Some(logo) = &req.logo
            && let Some(frame) = shape::find_named(&shapes, LOGO_PLACEHOLDER).and_then(|s| s.frame)
        {
            let format =
                ImageFormat::detect_from_bytes(logo).ok_or(ComposeError::UnsupportedImage)?;
            let (img_w, img_h) = image::ImageReader::new(Cursor::new(logo.as_slice()))
                .with_guessed_format()?
                .into_dimensions()?;
            let dest = fit_within(frame, img_w, img_h);
            let r_id = pkg.add_image_part(&slide_uri, logo.clone(), format)?;
            let pic =
                picture::picture_xml(picture::next_shape_id(&xml)?, "Company Logo", &r_id, &dest)?;
            xml = picture::append_shape(&xml, &pic)?;
        }

        if req.green_member {
            xml = self.overlay_tag(&mut pkg, &slide_uri, xml, GREEN_TAG_IMAGE, green_tag_frame())?;
        }
        if req.gold_club {
            xml = self.overlay_tag(&mut pkg, &slide_uri, xml, GOLD_TAG_IMAGE, gold_tag_frame())?;
        }

        pkg.set_slide_xml(&slide_uri, xml)?;
        pkg.refresh_core_modified();

        let out_path = self.slides_dir.join(format!("{}.pptx", id));
        pkg.save(&out_path)?;

        log::info!("created slide {} for {}", id, req.name);
        Ok((id, out_path))
    }

    /// Overlay a fixed tag image at a fixed position.
    ///
    /// A missing tag image file fails the whole operation.
    fn overlay_tag(
        &self,
        pkg: &mut PptxPackage,
        slide_uri: &crate::opc::PackURI,
        xml: Vec<u8>,
        file_name: &str,
        frame: Rect,
    ) -> Result<Vec<u8>> {
        let data = std::fs::read(self.assets_dir.join(file_name))?;
        let format =
            ImageFormat::detect_from_bytes(&data).ok_or(ComposeError::UnsupportedImage)?;
        let r_id = pkg.add_image_part(slide_uri, data, format)?;
        let pic = picture::picture_xml(picture::next_shape_id(&xml)?, file_name, &r_id, &frame)?;
        Ok(picture::append_shape(&xml, &pic)?)
    }

    /// Path an identifier's saved slide would occupy in the slide library.
    pub fn slide_path(&self, id: &MemberId) -> PathBuf {
        self.slides_dir.join(format!("{}.pptx", id))
    }

    #[inline]
    pub fn slides_dir(&self) -> &Path {
        &self.slides_dir
    }
}

/// Green-member tag frame: 0.9in left, 4.0in top, 3.0in x 0.5in.
fn green_tag_frame() -> Rect {
    Rect {
        x: inches_to_emu(0.9),
        y: inches_to_emu(4.0),
        cx: inches_to_emu(3.0),
        cy: inches_to_emu(0.5),
    }
}

/// Gold-club tag frame: 0.9in left, 4.6in top, 3.0in x 0.7in.
fn gold_tag_frame() -> Rect {
    Rect {
        x: inches_to_emu(0.9),
        y: inches_to_emu(4.6),
        cx: inches_to_emu(3.0),
        cy: inches_to_emu(0.7),
    }
}
