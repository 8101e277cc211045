//! # apicollab editor
//!
//! Command/undo model and operational-transformation sequencing for
//! collaborative editing of API description documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: ApiDocument + NodePath               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ commands: reversible document edits         │
//! │  - add / delete / change / rename / replace │
//! │  - ReferenceRewriter keeps $refs valid      │
//! │  - CommandRegistry rebuilds wire records    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ engine: OtEngine                            │
//! │  - pending (optimistic) commands            │
//! │  - finalized history, rewind/replay         │
//! │  - undo/redo by position                    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Commands are reversible**: execute then undo leaves the document
//!    byte-identical
//! 2. **Missing targets are not errors**: a command whose target is gone does
//!    nothing, so one late edit cannot block convergence
//! 3. **Position order is the truth**: the document is always what replaying
//!    the active finalized commands in position order would produce
//! 4. **Optimistic clients**: pending edits sit on top and are peeled off and
//!    replayed whenever history changes beneath them
//!
//! ## Usage
//!
//! ```rust,ignore
//! use apicollab_editor::{commands::NewPathCommand, CommandRegistry, OtEngine};
//! use apicollab_model::ApiDocument;
//!
//! let mut engine = OtEngine::new(ApiDocument::new_openapi3("Pets", "1.0"));
//!
//! // Local edit, applied immediately
//! let id = engine.execute_pending(Box::new(NewPathCommand::new("/pets")));
//!
//! // The sequencing authority assigned position 7
//! engine.finalize_pending(id, 7)?;
//!
//! // A collaborator's edit arrives, already sequenced
//! let registry = CommandRegistry::with_builtin();
//! let remote = registry.unmarshal_json(&wire_record)?;
//! engine.insert_finalized(remote, 5);
//! ```

pub mod command;
pub mod commands;
pub mod engine;
pub mod errors;
pub mod registry;
pub mod rewriter;
pub mod sequenced;
pub mod simplified;

pub use command::{Command, CommandRecord, TYPE_KEY};
pub use engine::OtEngine;
pub use errors::{CommandError, EditorError, EngineError};
pub use registry::CommandRegistry;
pub use rewriter::{ReferenceRewriter, RewrittenNode};
pub use sequenced::{PendingId, Position, SequencedCommand};
pub use simplified::{SimplifiedParameterType, SimplifiedPropertyType, SimplifiedType};

// Re-export model types for convenience
pub use apicollab_model::{ApiDocument, DocumentVersion, NodePath};
