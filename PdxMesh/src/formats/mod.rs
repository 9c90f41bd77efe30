//! File format handlers for PDX mesh assets
//!
//! - `pdx` is the binary `.mesh` container and its typed model.
//! - `gfx` is the text sidecar that registers a mesh with the engine.

pub mod gfx;
pub mod pdx;

// Re-export main document types
pub use gfx::GfxDescriptor;
pub use pdx::{ObjectNode, PdxDocument, PdxFile, read_pdx, write_pdx};
