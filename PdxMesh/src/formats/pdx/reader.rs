//! PDX file reading and parsing
//!
//! The node parser keeps an explicit stack of open objects instead of
//! recursing. Before a new object at depth `d` is pushed, every open object
//! at depth `>= d` is closed and attached to the object beneath it (or to the
//! document when the stack empties).

use super::cursor::ByteCursor;
use super::document::{ObjectNode, PdxDocument};
use super::mapper::file_from_document;
use super::model::PdxFile;
use super::options::ReadOptions;
use super::property::read_property;
use super::{OBJECT_MARKER, PDX_MAGIC, PROPERTY_MARKER};
use crate::error::{Error, Result};
use std::path::Path;

/// Read a PDX mesh file from disk
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid PDX mesh.
pub fn read_pdx<P: AsRef<Path>>(path: P) -> Result<PdxFile> {
    read_pdx_with_options(path, &ReadOptions::default())
}

/// Read a PDX mesh file from disk with explicit options
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid PDX mesh.
pub fn read_pdx_with_options<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<PdxFile> {
    let path = path.as_ref();
    tracing::info!("Reading {}", path.display());
    let data = std::fs::read(path)?;
    parse_pdx_bytes_with_options(&data, options)
}

/// Parse PDX data from bytes into the typed model
///
/// # Errors
/// Returns an error if the data is not a valid PDX mesh.
pub fn parse_pdx_bytes(data: &[u8]) -> Result<PdxFile> {
    parse_pdx_bytes_with_options(data, &ReadOptions::default())
}

/// Parse PDX data from bytes into the typed model with explicit options
///
/// # Errors
/// Returns an error if the data is not a valid PDX mesh.
pub fn parse_pdx_bytes_with_options(data: &[u8], options: &ReadOptions) -> Result<PdxFile> {
    let tree = parse_pdx_tree(data)?;
    let file = file_from_document(&tree)?;

    if options.check_bounds {
        for shape in &file.world.objects {
            for (index, mesh) in shape.meshes.iter().enumerate() {
                if let Some(bounds) = mesh.bounds.filter(|b| !b.is_ordered()) {
                    tracing::warn!(
                        "Mesh {} of '{}' has unordered bounds: min {} max {}",
                        index,
                        shape.name,
                        bounds.min,
                        bounds.max
                    );
                }
            }
        }
    }

    tracing::debug!(
        "Parsed {} shape(s), {} mesh(es)",
        file.world.objects.len(),
        file.meshes().count()
    );
    Ok(file)
}

/// Parse PDX data into the generic tree without domain interpretation
///
/// # Errors
/// Returns [`Error::MissingMagic`] if the data does not start with `@@b@`,
/// or any byte level error of the node parser.
pub fn parse_pdx_tree(data: &[u8]) -> Result<PdxDocument> {
    if !data.starts_with(PDX_MAGIC) {
        let found = data[..data.len().min(PDX_MAGIC.len())].to_vec();
        return Err(Error::MissingMagic(found));
    }

    let mut cursor = ByteCursor::new(data);
    cursor.take(PDX_MAGIC.len())?;
    parse_nodes(&mut cursor)
}

/// Parse records from the cursor position to the end of the buffer.
///
/// Properties read while no object is open are attached to the document and
/// have their short names translated.
///
/// # Errors
/// [`Error::UnexpectedToken`] for a byte that starts no record, and any
/// truncation or property codec error.
pub fn parse_nodes(cursor: &mut ByteCursor<'_>) -> Result<PdxDocument> {
    let mut doc = PdxDocument::new();
    let mut stack: Vec<ObjectNode> = Vec::new();

    while !cursor.at_end(0) {
        let offset = cursor.offset();
        match cursor.peek_u8()? {
            PROPERTY_MARKER => {
                cursor.next_u8()?;
                let property = read_property(cursor, stack.is_empty())?;
                match stack.last_mut() {
                    Some(object) => object.properties.push(property),
                    None => doc.properties.push(property),
                }
            }
            OBJECT_MARKER => {
                let depth = cursor.peek_depth();
                cursor.take(depth as usize)?;
                let name = cursor.next_cstring()?;
                close_objects(&mut stack, &mut doc, depth);
                tracing::trace!("Object '{}' at depth {} (offset {})", name, depth, offset);
                stack.push(ObjectNode::new(name, depth));
            }
            byte => return Err(Error::UnexpectedToken { byte, offset }),
        }
    }

    close_objects(&mut stack, &mut doc, 0);
    Ok(doc)
}

/// Close every open object at `depth` or deeper.
fn close_objects(stack: &mut Vec<ObjectNode>, doc: &mut PdxDocument, depth: u32) {
    while let Some(object) = stack.pop_if(|top| top.depth >= depth) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(object),
            None => doc.objects.push(object),
        }
    }
}
