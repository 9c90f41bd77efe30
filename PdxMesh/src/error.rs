//! Error types for `PdxMesh`

use thiserror::Error;

/// The error type for `PdxMesh` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (domain graph dumps).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==================== Byte Level Errors ====================
    /// The file does not begin with the `@@b@` signature.
    #[error("missing PDX magic: expected @@b@, found {0:?}")]
    MissingMagic(Vec<u8>),

    /// A read ran past the end of the buffer.
    #[error("truncated input: needed {needed} byte(s) at offset {offset}, buffer is {len} bytes")]
    TruncatedInput {
        /// Offset the read started at.
        offset: usize,
        /// Number of bytes the read required.
        needed: usize,
        /// Total buffer length.
        len: usize,
    },

    /// A byte that starts neither a property (`!`) nor an object (`[`).
    #[error("unexpected token {byte:#04x} at offset {offset}")]
    UnexpectedToken {
        /// The offending byte.
        byte: u8,
        /// Offset of the byte.
        offset: usize,
    },

    /// A property record carries an unknown type tag.
    #[error("unknown property type tag {tag:?} for property '{name}'")]
    UnknownPropertyType {
        /// Property short name.
        name: String,
        /// The tag character found on the wire.
        tag: char,
    },

    // ==================== Domain Mapping Errors ====================
    /// A flat scalar array cannot be split into tuples of the expected arity.
    #[error("malformed array '{name}': length {len} is not a multiple of {arity}")]
    MalformedArray {
        /// Property (or array) name.
        name: String,
        /// Flat length found.
        len: usize,
        /// Expected tuple arity.
        arity: usize,
    },

    /// A property name that is not in the table of its containing object.
    #[error("unknown property '{property}' in '{object}'")]
    UnknownPropertyName {
        /// Containing object kind or name.
        object: String,
        /// The unrecognised short name.
        property: String,
    },

    /// An object's property count matches none of its known layouts.
    #[error("invalid property count for '{object}': found {found}, expected {expected}")]
    InvalidPropertyCount {
        /// Object kind.
        object: String,
        /// Number of properties found.
        found: usize,
        /// Human readable list of accepted counts.
        expected: &'static str,
    },

    /// A property has the wrong value kind for its slot.
    #[error("property '{property}' in '{object}' should be {expected}, found {found}")]
    PropertyTypeMismatch {
        /// Containing object kind.
        object: String,
        /// Property short name.
        property: String,
        /// Expected kind.
        expected: &'static str,
        /// Kind found on the wire.
        found: &'static str,
    },

    /// An object name that may not appear under its parent.
    #[error("unexpected node '{name}' under '{parent}'")]
    UnexpectedNode {
        /// Parent object kind.
        parent: String,
        /// The child object name.
        name: String,
    },

    /// An object or property that may appear once was found twice.
    #[error("duplicate '{name}' in '{parent}'")]
    DuplicateNode {
        /// Parent object kind.
        parent: String,
        /// Repeated name.
        name: String,
    },

    /// A per-vertex attribute array does not match the vertex count.
    #[error("'{name}' has {found} entries, expected {expected}")]
    LengthMismatch {
        /// Attribute name.
        name: String,
        /// Expected entry count.
        expected: usize,
        /// Entry count found.
        found: usize,
    },

    /// A triangle references a vertex that does not exist.
    #[error("face index {index} out of range for {vertex_count} vertices")]
    FaceIndexOutOfRange {
        /// The offending index (as stored on the wire).
        index: i64,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A node whose contents are structurally impossible.
    #[error("invalid '{node}': {message}")]
    InvalidNode {
        /// Node kind.
        node: &'static str,
        /// Description of what is invalid.
        message: String,
    },

    /// A required child or value is absent.
    #[error("'{node}' is missing required {what}")]
    PrerequisiteMissing {
        /// Node kind that is incomplete.
        node: String,
        /// What is missing.
        what: &'static str,
    },
}

impl Error {
    pub(crate) fn missing(node: impl Into<String>, what: &'static str) -> Self {
        Error::PrerequisiteMissing {
            node: node.into(),
            what,
        }
    }

    pub(crate) fn unknown_property(object: impl Into<String>, property: impl Into<String>) -> Self {
        Error::UnknownPropertyName {
            object: object.into(),
            property: property.into(),
        }
    }
}

/// A specialized Result type for `PdxMesh` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::MalformedArray {
            name: "p".to_string(),
            len: 7,
            arity: 3,
        };
        let text = e.to_string();
        assert!(text.contains("'p'"));
        assert!(text.contains('7'));
        assert!(text.contains('3'));

        let e = Error::missing("mesh", "aabb");
        assert_eq!(e.to_string(), "'mesh' is missing required aabb");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
