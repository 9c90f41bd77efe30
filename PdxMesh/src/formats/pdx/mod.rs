//! PDX `.mesh` binary container
//!
//! The container is a depth-tagged tree. After the 4-byte `@@b@` signature
//! the file is a flat run of records:
//!
//! ```text
//! !<len><name><tag>...      property, attached to the innermost open object
//! [[[<name>\0               object opened at depth 3 (one '[' per level)
//! ```
//!
//! Objects are never closed explicitly. An object ends when the next object
//! header has a depth less than or equal to its own, or at end of buffer.

mod cursor;
mod document;
mod mapper;
mod model;
mod options;
mod property;
mod reader;
mod writer;

// Public API
pub use cursor::{ByteCursor, ByteWriter};
pub use document::{ObjectNode, PdxDocument};
pub use mapper::{
    MaterialLayout, MeshLayout, NodeKind, classify, document_from_file, file_from_document,
};
pub use model::{
    Asset, BoneWeight, Bounds, FileSummary, Joint, Locator, Locators, Material, MaterialTextures,
    Mesh, PdxFile, Shape, Skeleton, Skin, World,
};
pub use options::{ExportOptions, ReadOptions};
pub use property::{
    PropertyKind, PropertyNode, PropertyValue, read_property, translate_property_name,
    write_property,
};
pub use reader::{
    parse_nodes, parse_pdx_bytes, parse_pdx_bytes_with_options, parse_pdx_tree, read_pdx,
    read_pdx_with_options,
};
pub use writer::{ExportResult, export_pdx, serialize_pdx, serialize_tree, write_pdx};

/// File signature, written once before the first record.
pub const PDX_MAGIC: &[u8; 4] = b"@@b@";

/// Marker byte introducing a property record.
pub const PROPERTY_MARKER: u8 = b'!';

/// Marker byte repeated once per nesting level before an object name.
pub const OBJECT_MARKER: u8 = b'[';

/// Name of the root property carrying the asset version.
pub const ASSET_PROPERTY: &str = "pdxasset";

/// Shader name that marks a collision material.
pub const COLLISION_SHADER: &str = "Collision";

/// Asset version written by default.
pub const DEFAULT_ASSET_VERSION: (i32, i32) = (1, 0);

/// Fixed object names
pub mod names {
    pub const WORLD: &str = "object";
    pub const LOCATORS: &str = "locator";
    pub const MESH: &str = "mesh";
    pub const BOUNDS: &str = "aabb";
    pub const MATERIAL: &str = "material";
    pub const SKIN: &str = "skin";
    pub const SKELETON: &str = "skeleton";
}
