//! Property record codec
//!
//! Wire layout of one property, after the `!` marker:
//!
//! ```text
//! u8      name length L
//! [u8; L] name (ASCII, no terminator)
//! u8      type tag: 'i' | 'f' | 's'
//! 'i'/'f': u32 count, count * 4-byte scalars
//! 's':     u32 string kind (always 1), u32 byte count, NUL-terminated bytes
//! ```

use super::cursor::{ByteCursor, ByteWriter};
use super::PROPERTY_MARKER;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The value kind of a property record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Int,
    Float,
    String,
}

impl PropertyKind {
    /// The type tag byte used on the wire.
    pub fn tag(self) -> u8 {
        match self {
            PropertyKind::Int => b'i',
            PropertyKind::Float => b'f',
            PropertyKind::String => b's',
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'i' => Some(PropertyKind::Int),
            b'f' => Some(PropertyKind::Float),
            b's' => Some(PropertyKind::String),
            _ => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            PropertyKind::Int => "int array",
            PropertyKind::Float => "float array",
            PropertyKind::String => "string",
        }
    }
}

/// Typed payload of a property record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Int(Vec<i32>),
    Float(Vec<f32>),
    String(String),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::String(_) => PropertyKind::String,
        }
    }

    /// Element count for arrays, byte length for strings.
    pub fn len(&self) -> usize {
        match self {
            PropertyValue::Int(values) => values.len(),
            PropertyValue::Float(values) => values.len(),
            PropertyValue::String(value) => value.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One named property record of the generic tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyNode {
    pub name: String,
    pub value: PropertyValue,
}

impl PropertyNode {
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn ints(name: impl Into<String>, values: Vec<i32>) -> Self {
        Self::new(name, PropertyValue::Int(values))
    }

    pub fn floats(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self::new(name, PropertyValue::Float(values))
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, PropertyValue::String(value.into()))
    }

    pub fn kind(&self) -> PropertyKind {
        self.value.kind()
    }

    /// Borrow the payload as an int array, naming `object` in the error.
    pub fn as_ints(&self, object: &str) -> Result<&[i32]> {
        match &self.value {
            PropertyValue::Int(values) => Ok(values),
            other => Err(self.mismatch(object, PropertyKind::Int, other.kind())),
        }
    }

    pub fn as_floats(&self, object: &str) -> Result<&[f32]> {
        match &self.value {
            PropertyValue::Float(values) => Ok(values),
            other => Err(self.mismatch(object, PropertyKind::Float, other.kind())),
        }
    }

    pub fn as_str(&self, object: &str) -> Result<&str> {
        match &self.value {
            PropertyValue::String(value) => Ok(value),
            other => Err(self.mismatch(object, PropertyKind::String, other.kind())),
        }
    }

    fn mismatch(&self, object: &str, expected: PropertyKind, found: PropertyKind) -> Error {
        Error::PropertyTypeMismatch {
            object: object.to_string(),
            property: self.name.clone(),
            expected: expected.describe(),
            found: found.describe(),
        }
    }
}

/// Map a short wire name to its semantic name.
///
/// Only applied to properties read outside any object; inside objects the
/// same short code means different things (`n` is a normal array in `mesh`
/// but the normal map texture in `material`).
pub fn translate_property_name(short: &str) -> &str {
    match short {
        "p" => "vertices",
        "n" => "normals",
        "ta" => "tangents",
        "u0" => "uv_map",
        "tri" => "faces",
        other => other,
    }
}

/// Read one property record. The `!` marker must already be consumed.
pub fn read_property(cursor: &mut ByteCursor<'_>, translate: bool) -> Result<PropertyNode> {
    let name_len = cursor.next_u8()? as usize;
    let raw = cursor.take(name_len)?;
    let short = String::from_utf8_lossy(raw).into_owned();

    let tag = cursor.next_u8()?;
    let Some(kind) = PropertyKind::from_tag(tag) else {
        return Err(Error::UnknownPropertyType {
            name: short,
            tag: char::from(tag),
        });
    };

    let value = match kind {
        PropertyKind::Int => {
            let count = cursor.next_u32()? as usize;
            let mut values = Vec::with_capacity(count.min(cursor.len() / 4));
            for _ in 0..count {
                values.push(cursor.next_i32()?);
            }
            PropertyValue::Int(values)
        }
        PropertyKind::Float => {
            let count = cursor.next_u32()? as usize;
            let mut values = Vec::with_capacity(count.min(cursor.len() / 4));
            for _ in 0..count {
                values.push(cursor.next_f32()?);
            }
            PropertyValue::Float(values)
        }
        PropertyKind::String => {
            let _string_kind = cursor.next_u32()?;
            let declared = cursor.next_u32()? as usize;
            let value = cursor.next_cstring()?;
            // The declared count is not used to bound the read
            if declared != value.len() + 1 {
                tracing::warn!(
                    "String property '{}' declares {} bytes but holds {} (+1 terminator)",
                    short,
                    declared,
                    value.len()
                );
            }
            PropertyValue::String(value)
        }
    };

    let name = if translate {
        translate_property_name(&short).to_string()
    } else {
        short
    };

    Ok(PropertyNode { name, value })
}

/// Write one property record, including its `!` marker.
pub fn write_property(writer: &mut ByteWriter, property: &PropertyNode) -> Result<()> {
    let name = property.name.as_bytes();
    let Ok(name_len) = u8::try_from(name.len()) else {
        return Err(Error::InvalidNode {
            node: "property",
            message: format!("name '{}' longer than 255 bytes", property.name),
        });
    };

    writer.put_u8(PROPERTY_MARKER)?;
    writer.put_u8(name_len)?;
    writer.put_bytes(name)?;
    writer.put_u8(property.kind().tag())?;

    match &property.value {
        PropertyValue::Int(values) => {
            writer.put_u32(values.len() as u32)?;
            for &value in values {
                writer.put_i32(value)?;
            }
        }
        PropertyValue::Float(values) => {
            writer.put_u32(values.len() as u32)?;
            for &value in values {
                writer.put_f32(value)?;
            }
        }
        PropertyValue::String(value) => {
            if value.contains('\0') {
                return Err(Error::InvalidNode {
                    node: "property",
                    message: format!("'{}' value {value:?} contains a NUL byte", property.name),
                });
            }
            writer.put_u32(1)?; // string kind
            writer.put_u32(value.len() as u32 + 1)?;
            writer.put_cstring(value)?;
        }
    }

    Ok(())
}
