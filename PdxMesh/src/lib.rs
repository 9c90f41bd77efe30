//! # PdxMesh
//!
//! A pure-Rust codec for the Clausewitz engine's binary `.mesh` format.
//!
//! ## Supported Formats
//!
//! - **PDX mesh** - Depth-tagged binary container with typed property records
//! - **GFX sidecar** - `objectTypes` text descriptor written next to a mesh
//!
//! ## Quick Start
//!
//! ### Reading a Mesh
//!
//! ```no_run
//! use pdxmesh::formats::pdx::read_pdx;
//!
//! let file = read_pdx("ship.mesh")?;
//! for shape in &file.world.objects {
//!     println!("{}: {} mesh(es)", shape.name, shape.meshes.len());
//! }
//! # Ok::<(), pdxmesh::Error>(())
//! ```
//!
//! ### Building and Exporting a Mesh
//!
//! ```no_run
//! use pdxmesh::prelude::*;
//! use glam::Vec3;
//!
//! let mut mesh = Mesh {
//!     vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
//!     faces: vec![[0, 1, 2]],
//!     material: Some(Material::collision()),
//!     ..Mesh::default()
//! };
//! mesh.compute_bounds()?;
//!
//! let mut shape = Shape::new("hull:MeshShape");
//! shape.meshes.push(mesh);
//! let file = PdxFile::new(World { objects: vec![shape] });
//!
//! export_pdx(&file, "hull.mesh", &ExportOptions::new())?;
//! # Ok::<(), pdxmesh::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `pdxmesh` command-line binary

pub mod batch;
pub mod error;
pub mod formats;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    // Generic tree
    pub use crate::formats::pdx::{
        ObjectNode, PdxDocument, PropertyKind, PropertyNode, PropertyValue,
        parse_pdx_tree, serialize_tree,
    };

    // Typed model
    pub use crate::formats::pdx::{
        Asset, BoneWeight, Bounds, FileSummary, Joint, Locator, Locators, Material,
        MaterialTextures, Mesh, PdxFile, Shape, Skeleton, Skin, World,
    };

    // File operations
    pub use crate::formats::pdx::{
        ExportOptions, ExportResult, ReadOptions, export_pdx, parse_pdx_bytes, read_pdx,
        read_pdx_with_options, serialize_pdx, write_pdx,
    };
    pub use crate::formats::gfx::GfxDescriptor;

    // Batch operations
    pub use crate::batch::{BatchValidationResult, MeshValidation, find_mesh_files, validate_batch};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
