//! SuperGlue matching on top of an opaque inference engine.
//!
//! [`SuperGlue`] packs two feature sets into the network's named inputs and
//! decodes the returned query-to-train assignment into [`sg_core::Correspondence`]s.

pub mod assembler;
pub mod config;
pub mod decoder;
pub mod error;
pub mod matcher;

pub use assembler::assemble;
pub use config::{SuperGlueConfig, DEFAULT_MATCH_THRESHOLD};
pub use decoder::{decode_assignment, MATCHES0};
pub use error::{SuperGlueError, SuperGlueResult};
pub use matcher::SuperGlue;
