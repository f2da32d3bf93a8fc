use core::fmt;
use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::mesh::VertexRef;

#[derive(Error, Debug)]
pub enum PlyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid PLY header: {0}")]
    InvalidHeader(String),

    #[error("Unsupported PLY format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not find the '{0}' element in file")]
    MissingElement(String),

    #[error("Face row {face_row} references vertex row {index}, but only {vertex_rows} vertex rows were read")]
    DanglingReference {
        face_row: usize,
        index: i64,
        vertex_rows: usize,
    },

    #[error("Malformed '{element}' record at row {row}: {reason}")]
    MalformedRecord {
        element: String,
        row: usize,
        reason: String,
    },

    #[error("Mesh data too large: {vertices} vertices, {triangles} triangles")]
    OversizedPayload { vertices: usize, triangles: usize },

    #[error("Vertex {0:?} is not part of this mesh")]
    UnknownVertex(VertexRef),

    #[error("Vertex {0:?} was handed out more than once")]
    DuplicateVertex(VertexRef),

    #[error("Error parsing integer: {0}")]
    ParseInt(#[from] ParseIntError),

    #[error("Error parsing float: {0}")]
    ParseFloat(#[from] ParseFloatError),

    #[error("Property type mismatch: expected list but found scalar")]
    ExpectedListProperty,

    #[error("Failed to read next ASCII property")]
    NoPropertyFound,

    #[error("Too many properties provided for element")]
    TooManyProperties,

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Serde error: {0}")]
    Serde(String),
}

impl PlyError {
    /// Attach element/row context to a value-level failure. I/O errors and
    /// errors that already carry context pass through untouched.
    pub(crate) fn in_record(self, element: &str, row: usize) -> Self {
        match self {
            PlyError::Io(_)
            | PlyError::MalformedRecord { .. }
            | PlyError::DanglingReference { .. } => self,
            other => PlyError::MalformedRecord {
                element: element.to_string(),
                row,
                reason: other.to_string(),
            },
        }
    }
}

impl serde::de::Error for PlyError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        PlyError::Serde(msg.to_string())
    }
}

impl serde::ser::Error for PlyError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        PlyError::Serde(msg.to_string())
    }
}
