//! # apicollab model
//!
//! The document tree collaborators edit, and the addressing scheme used to
//! point into it.
//!
//! - [`ApiDocument`]: a Swagger 2.0 / OpenAPI 3.x description held as an
//!   order-preserving JSON tree, plus the structural primitives commands use
//! - [`NodePath`]: JSON-pointer addressing that re-resolves against any
//!   revision of the tree
//! - [`DocumentVersion`]: the schema-version family, which decides where
//!   definitions, security schemes and request bodies live
//! - [`traverse`]: whole-tree walks and reference-node classification

pub mod document;
pub mod error;
pub mod node_path;
pub mod traverse;
pub mod version;

pub use document::{is_http_method, ApiDocument, Removal, HTTP_METHODS};
pub use error::{ModelError, ModelResult};
pub use node_path::NodePath;
pub use traverse::{classify, NodeKind};
pub use version::DocumentVersion;
