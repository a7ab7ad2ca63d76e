//! Weekly deck assembly.
//!
//! The theme template package becomes the output base; each roster member's
//! saved slide (patched with the next presenter's name) and then the
//! constant closing deck are imported into it. Importing a slide copies the
//! transitive closure of its internal relationships (layout, master, theme,
//! media), renumbering partnames per PresentationML conventions while
//! preserving each part's own rIds, so no slide XML rewrite is needed.
//! Supporting parts are deduplicated across imports by content digest.

use crate::compose::error::{ComposeError, Result};
use crate::compose::ledger::Ledger;
use crate::opc::constants::content_type as ct;
use crate::opc::part::PartFactory;
use crate::opc::{PackURI, Part};
use crate::pptx::{PptxPackage, markers};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Template and output file names.
pub const THEME_TEMPLATE: &str = "theme_slide.pptx";
pub const CONSTANT_TEMPLATE: &str = "constant_slide.pptx";
pub const FINAL_OUTPUT: &str = "final_presentation.pptx";

/// Marker patched into each member's slide at assembly time.
const NEXT_PRESENTER: &str = "NEXT_PRESENTER";

/// Assembles the weekly deck from the slide library.
pub struct Assembler {
    slides_dir: PathBuf,
    output_dir: PathBuf,
}

impl Assembler {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(slides_dir: P, output_dir: Q) -> Self {
        Self {
            slides_dir: slides_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Assemble the final presentation for a roster.
    ///
    /// The theme text is decorative: collected by the form but inserted into
    /// no marker. Roster members without a ledger entry or without a saved
    /// slide file are skipped silently. The output overwrites any previous
    /// run's file.
    pub fn assemble(
        &self,
        theme: &str,
        roster: &[String],
        ledger: &mut Ledger,
    ) -> Result<PathBuf> {
        log::info!(
            "assembling deck (theme: {:?}, roster of {})",
            theme,
            roster.len()
        );

        let mut base = PptxPackage::open(self.slides_dir.join(THEME_TEMPLATE))?;
        let mut importer = SlideImporter::new();

        for (i, name) in roster.iter().enumerate() {
            let Some(id) = ledger.resolve(name)? else {
                log::debug!("no ledger entry for {}, skipping", name);
                continue;
            };
            let path = self.slides_dir.join(format!("{}.pptx", id));
            if !path.exists() {
                log::debug!("no saved slide for {} ({}), skipping", name, id);
                continue;
            }

            let src = PptxPackage::open(&path)?;
            let next_name = &roster[(i + 1) % roster.len()];
            for slide_uri in src.slide_partnames()? {
                let patched = markers::substitute(
                    &src.slide_xml(&slide_uri)?,
                    &[(NEXT_PRESENTER, next_name.as_str())],
                )?;
                importer.import_slide(&mut base, &src, &slide_uri, patched)?;
            }
        }

        let constant = PptxPackage::open(self.slides_dir.join(CONSTANT_TEMPLATE))?;
        for slide_uri in constant.slide_partnames()? {
            let blob = constant.slide_xml(&slide_uri)?;
            importer.import_slide(&mut base, &constant, &slide_uri, blob)?;
        }

        base.append_slide_entries(&importer.slides)?;
        base.append_master_entries(&importer.masters)?;
        base.refresh_core_modified();

        let out_path = self.output_dir.join(FINAL_OUTPUT);
        base.save(&out_path)?;

        log::info!(
            "assembled {} with {} imported slides",
            out_path.display(),
            importer.slides.len()
        );
        Ok(out_path)
    }
}

/// Copies slides and their supporting part closures between packages.
struct SlideImporter {
    /// Imported slide partnames, in append order
    slides: Vec<PackURI>,
    /// Newly imported master partnames (memo misses only)
    masters: Vec<PackURI>,
    /// Content digest of a source part -> its partname in the base package
    memo: HashMap<[u8; 32], PackURI>,
    /// Partnames allocated but not yet inserted, so nested allocations
    /// against the same template cannot collide
    pending: HashSet<String>,
}

impl SlideImporter {
    fn new() -> Self {
        Self {
            slides: Vec::new(),
            masters: Vec::new(),
            memo: HashMap::new(),
            pending: HashSet::new(),
        }
    }

    /// Import one slide with the given (possibly patched) XML.
    ///
    /// Slides are never deduplicated: every import lands as a fresh
    /// slideN.xml so repeated roster members each get their own copy.
    fn import_slide(
        &mut self,
        base: &mut PptxPackage,
        src: &PptxPackage,
        slide_uri: &PackURI,
        slide_xml: Vec<u8>,
    ) -> Result<()> {
        let new_uri = self.allocate(base, "/ppt/slides/slide%d.xml")?;

        let mut part = PartFactory::load(new_uri.clone(), ct::PML_SLIDE.to_string(), slide_xml)?;
        self.copy_rels(base, src, slide_uri, &new_uri, part.as_mut())?;

        self.pending.remove(new_uri.as_str());
        base.opc_package_mut().add_part(part);
        self.slides.push(new_uri);
        Ok(())
    }

    /// Import a supporting part (layout, master, theme, media), returning
    /// its partname in the base. Parts already imported with identical
    /// content are reused. Returns None for parts that are dropped.
    fn import_supporting(
        &mut self,
        base: &mut PptxPackage,
        src: &PptxPackage,
        part_uri: &PackURI,
    ) -> Result<Option<PackURI>> {
        let src_part = src.opc_package().get_part(part_uri)?;
        let content_type = src_part.content_type().to_string();

        let template = match content_type.as_str() {
            ct::PML_SLIDE_LAYOUT => "/ppt/slideLayouts/slideLayout%d.xml".to_string(),
            ct::PML_SLIDE_MASTER => "/ppt/slideMasters/slideMaster%d.xml".to_string(),
            ct::OFC_THEME => "/ppt/theme/theme%d.xml".to_string(),
            // Notes have no counterpart in the assembled deck.
            ct::PML_NOTES_SLIDE => return Ok(None),
            other if other.starts_with("image/") => {
                format!("/ppt/media/image%d.{}", part_uri.ext())
            },
            other => {
                log::debug!("dropping unsupported part {} ({})", part_uri, other);
                return Ok(None);
            },
        };

        let digest: [u8; 32] = Sha256::digest(src_part.blob()).into();
        if let Some(existing) = self.memo.get(&digest) {
            return Ok(Some(existing.clone()));
        }

        let new_uri = self.allocate(base, &template)?;
        // Registered before recursing: the layout <-> master reference
        // cycle resolves through the memo.
        self.memo.insert(digest, new_uri.clone());

        let mut part = PartFactory::load(
            new_uri.clone(),
            content_type.clone(),
            src_part.blob().to_vec(),
        )?;
        self.copy_rels(base, src, part_uri, &new_uri, part.as_mut())?;

        self.pending.remove(new_uri.as_str());
        base.opc_package_mut().add_part(part);

        if content_type == ct::PML_SLIDE_MASTER {
            self.masters.push(new_uri.clone());
        }

        Ok(Some(new_uri))
    }

    /// Copy a source part's relationships onto its imported counterpart,
    /// importing internal targets and preserving rIds.
    fn copy_rels(
        &mut self,
        base: &mut PptxPackage,
        src: &PptxPackage,
        src_uri: &PackURI,
        new_uri: &PackURI,
        part: &mut dyn Part,
    ) -> Result<()> {
        let src_part = src.opc_package().get_part(src_uri)?;

        // Collected first: importing targets needs &mut base while the
        // source package stays borrowed read-only.
        let rels: Vec<_> = src_part
            .rels()
            .iter()
            .map(|rel| {
                (
                    rel.r_id().to_string(),
                    rel.reltype().to_string(),
                    rel.target_ref().to_string(),
                    rel.is_external(),
                    rel.target_partname().ok(),
                )
            })
            .collect();

        for (r_id, reltype, target_ref, is_external, target) in rels {
            if is_external {
                part.rels_mut().add_relationship(reltype, target_ref, r_id, true);
                continue;
            }
            let Some(target_uri) = target else { continue };
            if let Some(imported) = self.import_supporting(base, src, &target_uri)? {
                let new_ref = imported.relative_ref(new_uri.base_uri());
                part.rels_mut().add_relationship(reltype, new_ref, r_id, false);
            }
        }

        Ok(())
    }

    /// Allocate the next free partname for a template, accounting for
    /// partnames handed out earlier in the same import.
    fn allocate(&mut self, base: &PptxPackage, template: &str) -> Result<PackURI> {
        let mut n = 1u32;
        loop {
            let candidate = template.replace("%d", &n.to_string());
            let taken = self.pending.contains(&candidate)
                || base
                    .opc_package()
                    .contains_part(&PackURI::new(candidate.clone()).map_err(
                        crate::opc::error::OpcError::InvalidPackUri,
                    )?);
            if !taken {
                let uri = PackURI::new(candidate).map_err(crate::opc::error::OpcError::InvalidPackUri)?;
                self.pending.insert(uri.to_string());
                return Ok(uri);
            }
            n += 1;
            if n > 10000 {
                return Err(ComposeError::Opc(crate::opc::error::OpcError::InvalidPackUri(
                    "Too many parts, cannot find next partname".to_string(),
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::builder::{
        GOLD_TAG_IMAGE, GREEN_TAG_IMAGE, INDIVIDUAL_TEMPLATE, SlideBuilder, SlideRequest,
    };
    use crate::compose::ledger::MemoryStore;
    use crate::pptx::test_fixtures::{png_bytes, single_slide_pptx};
    use std::path::Path;

    fn library(dir: &Path) {
        std::fs::write(
            dir.join(INDIVIDUAL_TEMPLATE),
            single_slide_pptx("<a:t>NAME</a:t><a:t>next: NEXT_PRESENTER</a:t>"),
        )
        .unwrap();
        std::fs::write(dir.join(THEME_TEMPLATE), single_slide_pptx("<a:t>Theme</a:t>")).unwrap();
        std::fs::write(
            dir.join(CONSTANT_TEMPLATE),
            single_slide_pptx("<a:t>Thanks for coming</a:t>"),
        )
        .unwrap();
        std::fs::write(dir.join(GREEN_TAG_IMAGE), png_bytes()).unwrap();
        std::fs::write(dir.join(GOLD_TAG_IMAGE), png_bytes()).unwrap();
    }

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn build_person(builder: &SlideBuilder, ledger: &mut Ledger, name: &str) {
        builder
            .build(
                ledger,
                &SlideRequest {
                    name: name.to_string(),
                    company: "Acme".to_string(),
                    field: "Trade".to_string(),
                    photo: png_bytes(),
                    logo: None,
                    green_member: false,
                    gold_club: false,
                },
            )
            .unwrap();
    }

    #[test]
    fn assembles_theme_members_constant_in_order() {
        let dir = tempfile::tempdir().unwrap();
        library(dir.path());

        let builder = SlideBuilder::new(dir.path(), dir.path());
        let mut ledger = Ledger::new(Box::new(MemoryStore::new()), "BNIP");
        for name in ["Alice", "Bob", "Carol"] {
            build_person(&builder, &mut ledger, name);
        }

        let assembler = Assembler::new(dir.path(), dir.path());
        let out = assembler
            .assemble("Growth", &roster(&["Alice", "Bob", "Carol"]), &mut ledger)
            .unwrap();

        let final_pkg = PptxPackage::open(&out).unwrap();
        let slides = final_pkg.slide_partnames().unwrap();
        // theme slide + three members + constant slide
        assert_eq!(slides.len(), 5);

        // NEXT_PRESENTER wraps around the roster.
        let expected_next = ["Bob", "Carol", "Alice"];
        for (i, next) in expected_next.iter().enumerate() {
            let xml = final_pkg.slide_xml(&slides[i + 1]).unwrap();
            let runs = markers::run_text(&xml).unwrap();
            assert!(
                runs.iter().any(|r| r == &format!("next: {}", next)),
                "slide {} should announce {}",
                i + 1,
                next
            );
        }
    }

    #[test]
    fn never_created_member_is_skipped_silently() {
        let dir = tempfile::tempdir().unwrap();
        library(dir.path());

        let builder = SlideBuilder::new(dir.path(), dir.path());
        let mut ledger = Ledger::new(Box::new(MemoryStore::new()), "BNIP");
        build_person(&builder, &mut ledger, "Alice");
        build_person(&builder, &mut ledger, "Carol");

        let assembler = Assembler::new(dir.path(), dir.path());
        let out = assembler
            .assemble("", &roster(&["Alice", "Mallory", "Carol"]), &mut ledger)
            .unwrap();

        let final_pkg = PptxPackage::open(&out).unwrap();
        // theme + Alice + Carol + constant; Mallory absent, no error
        assert_eq!(final_pkg.slide_partnames().unwrap().len(), 4);

        // Mallory still counts for rotation: Alice's next is Mallory.
        let slides = final_pkg.slide_partnames().unwrap();
        let runs = markers::run_text(&final_pkg.slide_xml(&slides[1]).unwrap()).unwrap();
        assert!(runs.iter().any(|r| r == "next: Mallory"));
    }

    #[test]
    fn identical_support_parts_are_imported_once() {
        let dir = tempfile::tempdir().unwrap();
        library(dir.path());

        let builder = SlideBuilder::new(dir.path(), dir.path());
        let mut ledger = Ledger::new(Box::new(MemoryStore::new()), "BNIP");
        for name in ["Alice", "Bob"] {
            build_person(&builder, &mut ledger, name);
        }

        let assembler = Assembler::new(dir.path(), dir.path());
        let out = assembler
            .assemble("", &roster(&["Alice", "Bob"]), &mut ledger)
            .unwrap();

        let final_pkg = PptxPackage::open(&out).unwrap();
        let layouts = final_pkg
            .opc_package()
            .iter_parts()
            .filter(|p| p.content_type() == ct::PML_SLIDE_LAYOUT)
            .count();
        // the base's own layout plus one shared imported layout
        assert_eq!(layouts, 2);
    }

    #[test]
    fn output_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        library(dir.path());

        let builder = SlideBuilder::new(dir.path(), dir.path());
        let mut ledger = Ledger::new(Box::new(MemoryStore::new()), "BNIP");
        build_person(&builder, &mut ledger, "Alice");

        let assembler = Assembler::new(dir.path(), dir.path());
        let first = assembler
            .assemble("", &roster(&["Alice"]), &mut ledger)
            .unwrap();
        let second = assembler.assemble("", &roster(&["Alice"]), &mut ledger).unwrap();
        assert_eq!(first, second);

        let final_pkg = PptxPackage::open(&second).unwrap();
        assert_eq!(final_pkg.slide_partnames().unwrap().len(), 3);
    }
}
