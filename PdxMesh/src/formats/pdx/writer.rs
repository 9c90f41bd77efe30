//! PDX file writing
//!
//! The typed model is turned into a generic tree first (validating the whole
//! model), then the tree is written record by record. Bracket runs come from
//! each object's stored depth, which the mapper takes from the fixed depth
//! table.

use super::cursor::ByteWriter;
use super::document::{ObjectNode, PdxDocument};
use super::mapper::document_from_file;
use super::model::PdxFile;
use super::options::ExportOptions;
use super::property::write_property;
use super::{OBJECT_MARKER, PDX_MAGIC};
use crate::error::{Error, Result};
use crate::formats::gfx::GfxDescriptor;
use std::path::{Path, PathBuf};

/// Files produced by [`export_pdx`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub mesh_path: PathBuf,
    pub gfx_path: Option<PathBuf>,
    pub bytes_written: usize,
}

/// Write a PDX mesh file to disk
///
/// # Errors
/// Returns an error if the model is incomplete or the file cannot be written.
pub fn write_pdx<P: AsRef<Path>>(file: &PdxFile, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = serialize_pdx(file)?;
    tracing::info!("Writing {} ({} bytes)", path.display(), bytes.len());
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Write a PDX mesh file and, unless disabled, its `.gfx` sidecar
///
/// # Errors
/// Returns an error if the model is incomplete or a file cannot be written.
/// Nothing is written when serialization fails.
pub fn export_pdx<P: AsRef<Path>>(
    file: &PdxFile,
    path: P,
    options: &ExportOptions,
) -> Result<ExportResult> {
    let mesh_path = path.as_ref().to_path_buf();
    let bytes = serialize_pdx(file)?;

    tracing::info!("Exporting {}", mesh_path.display());
    std::fs::write(&mesh_path, &bytes)?;

    let gfx_path = if options.write_gfx {
        let descriptor = GfxDescriptor::for_mesh(&mesh_path, options);
        let gfx_path = mesh_path.with_extension("gfx");
        std::fs::write(&gfx_path, descriptor.render())?;
        tracing::debug!("Wrote sidecar {}", gfx_path.display());
        Some(gfx_path)
    } else {
        None
    };

    Ok(ExportResult {
        mesh_path,
        gfx_path,
        bytes_written: bytes.len(),
    })
}

/// Serialize the typed model to bytes
///
/// # Errors
/// Returns an error if the model is incomplete or inconsistent.
pub fn serialize_pdx(file: &PdxFile) -> Result<Vec<u8>> {
    let doc = document_from_file(file)?;
    serialize_tree(&doc)
}

/// Serialize a generic tree to bytes
///
/// # Errors
/// Returns [`Error::InvalidNode`] for an object whose depth would not nest
/// under its parent or whose name contains a NUL byte.
pub fn serialize_tree(doc: &PdxDocument) -> Result<Vec<u8>> {
    let mut writer = ByteWriter::new();
    writer.put_bytes(PDX_MAGIC)?;

    for property in &doc.properties {
        write_property(&mut writer, property)?;
    }
    for object in &doc.objects {
        write_object(&mut writer, object, 0)?;
    }

    Ok(writer.into_inner())
}

fn write_object(writer: &mut ByteWriter, object: &ObjectNode, parent_depth: u32) -> Result<()> {
    if object.depth <= parent_depth {
        return Err(Error::InvalidNode {
            node: "object",
            message: format!(
                "'{}' at depth {} cannot nest under depth {}",
                object.name, object.depth, parent_depth
            ),
        });
    }
    if object.name.contains('\0') {
        return Err(Error::InvalidNode {
            node: "object",
            message: format!("name {:?} contains a NUL byte", object.name),
        });
    }
    // A leading bracket would be counted as another depth level
    if object.name.starts_with(OBJECT_MARKER as char) {
        return Err(Error::InvalidNode {
            node: "object",
            message: format!("name {:?} starts with '['", object.name),
        });
    }

    for _ in 0..object.depth {
        writer.put_u8(OBJECT_MARKER)?;
    }
    writer.put_cstring(&object.name)?;

    for property in &object.properties {
        write_property(writer, property)?;
    }
    for child in &object.children {
        write_object(writer, child, object.depth)?;
    }
    Ok(())
}
