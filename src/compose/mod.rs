//! Deck composition: the domain operations on top of the pptx layer.
//!
//! - `fit`: aspect-fit placement geometry for logo images
//! - `ledger`: sequential member identifier assignment
//! - `roster`: presenter roster extraction from uploaded workbooks
//! - `builder`: per-person slide creation
//! - `assembly`: weekly deck assembly

pub mod assembly;
pub mod builder;
pub mod error;
pub mod fit;
pub mod ledger;
pub mod roster;

pub use assembly::Assembler;
pub use builder::{SlideBuilder, SlideRequest};
pub use error::{ComposeError, Result};
pub use ledger::{CsvStore, Ledger, LedgerRecord, LedgerStore, MemberId, MemoryStore};
