/// Open Packaging Conventions (OPC) implementation.
///
/// This module provides the subset of the OPC specification that slide-deck
/// templating needs: package structure (parts, relationships), content type
/// management, and ZIP-based physical packaging, for both reading template
/// packages and writing generated ones.

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{BlobPart, Part, XmlPart};
pub use pkgwriter::PackageWriter;
pub use rel::{Relationship, Relationships};
