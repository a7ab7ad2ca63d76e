//! deckgen - templated slide-deck generation.
//!
//! deckgen fills PowerPoint templates with per-person data and assembles
//! weekly presentation decks:
//!
//! - **OPC layer** (`opc`): Open Packaging Convention packages (ZIP, parts,
//!   relationships), read and write
//! - **PPTX layer** (`pptx`): slide resolution, marker substitution,
//!   picture insertion
//! - **Compose layer** (`compose`): member identifier ledger, roster
//!   extraction, per-person slide builds, final deck assembly
//! - **Web layer** (`web`): the HTTP form surface driving the two
//!   operations
//!
//! # Example - Creating an individual slide
//!
//! ```no_run
//! use deckgen::compose::{Ledger, MemoryStore, SlideBuilder, SlideRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = SlideBuilder::new("slides", "assets");
//! let mut ledger = Ledger::new(Box::new(MemoryStore::new()), "BNIP");
//!
//! let (id, path) = builder.build(&mut ledger, &SlideRequest {
//!     name: "Jane Doe".to_string(),
//!     company: "Acme".to_string(),
//!     field: "Plumbing".to_string(),
//!     photo: std::fs::read("jane.png")?,
//!     logo: None,
//!     green_member: true,
//!     gold_club: false,
//! })?;
//! println!("created {} at {}", id, path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Assembling the weekly deck
//!
//! ```no_run
//! use deckgen::compose::{Assembler, CsvStore, Ledger};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut ledger = Ledger::new(Box::new(CsvStore::new("slides/members.csv")), "BNIP");
//! let assembler = Assembler::new("slides", "output");
//!
//! let roster = vec!["Alice".to_string(), "Bob".to_string()];
//! let out = assembler.assemble("Growth week", &roster, &mut ledger)?;
//! println!("deck at {}", out.display());
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod compose;
pub mod config;
pub mod opc;
pub mod pptx;
pub mod web;

// Re-export commonly used types for convenience
pub use compose::{Assembler, Ledger, MemberId, SlideBuilder, SlideRequest};
pub use config::Config;
pub use pptx::PptxPackage;
