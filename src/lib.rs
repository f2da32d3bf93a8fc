//! A triangle mesh codec for the PLY (Polygon File Format).
//!
//! Meshes are read into and written from any [`MeshStore`]. Decoding accepts
//! ASCII and binary PLY files carrying a `vertex` and a triangulated `face`
//! element; encoding produces a fixed layout with positions, normals and
//! texture coordinates per vertex, in ASCII or binary form.
//!
//! File rows and store references are different address spaces: a store may
//! have holes left by removed vertices, while a file numbers its rows
//! contiguously from zero. [`RowMap`] translates between the two for the
//! duration of one call.
//!
//! # Example
//!
//! ```rust
//! use mesh_ply::{BufferMesh, MeshStore, Triangle, Vertex};
//!
//! let mut mesh = BufferMesh::new();
//! let a = mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]));
//! let b = mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]));
//! let c = mesh.add_vertex(Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]));
//! mesh.add_triangle(Triangle::new([a, b, c])).unwrap();
//!
//! let bytes = mesh_ply::write_binary(&mesh).unwrap();
//! let decoded = mesh_ply::open(bytes.as_slice()).unwrap();
//! assert_eq!(decoded.vertex_count(), 3);
//! assert_eq!(decoded.triangle_count(), 1);
//! ```

pub mod de;
pub mod error;
pub mod file;
pub mod mesh;
pub mod row_map;
pub mod ser;

pub use de::{element_counts, open, read};
pub use error::PlyError;
pub use mesh::{BufferMesh, MeshStore, Triangle, TriangleRef, Vertex, VertexRef};
pub use row_map::RowMap;
pub use ser::{to_bytes, to_writer, write_ascii, write_binary};

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// PLY file format (ascii or binary)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl fmt::Display for PlyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlyFormat::Ascii => write!(f, "ascii"),
            PlyFormat::BinaryLittleEndian => write!(f, "binary_little_endian"),
            PlyFormat::BinaryBigEndian => write!(f, "binary_big_endian"),
        }
    }
}

/// PLY scalar data types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ScalarType {
    pub fn parse(s: &str) -> Result<Self, PlyError> {
        match s {
            "char" | "int8" => Ok(ScalarType::I8),
            "uchar" | "uint8" => Ok(ScalarType::U8),
            "short" | "int16" => Ok(ScalarType::I16),
            "ushort" | "uint16" => Ok(ScalarType::U16),
            "int" | "int32" => Ok(ScalarType::I32),
            "uint" | "uint32" => Ok(ScalarType::U32),
            "float" | "float32" => Ok(ScalarType::F32),
            "double" | "float64" => Ok(ScalarType::F64),
            _ => Err(PlyError::UnsupportedFormat(format!(
                "Unknown scalar type: {s}"
            ))),
        }
    }

    /// Name written to headers produced by this crate.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::I8 => "char",
            ScalarType::U8 => "uchar",
            ScalarType::I16 => "short",
            ScalarType::U16 => "ushort",
            ScalarType::I32 => "int",
            ScalarType::U32 => "uint",
            ScalarType::F32 => "float",
            ScalarType::F64 => "double",
        }
    }
}

impl FromStr for ScalarType {
    type Err = PlyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyType {
    /// A scalar property with a single value
    Scalar { data_type: ScalarType },
    /// A list property with variable length
    List {
        count_type: ScalarType,
        data_type: ScalarType,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    pub property_type: PropertyType,
}

impl PropertyDef {
    pub fn scalar(name: &str, data_type: ScalarType) -> Self {
        Self {
            name: name.to_string(),
            property_type: PropertyType::Scalar { data_type },
        }
    }

    pub fn list(name: &str, count_type: ScalarType, data_type: ScalarType) -> Self {
        Self {
            name: name.to_string(),
            property_type: PropertyType::List {
                count_type,
                data_type,
            },
        }
    }
}

/// PLY element definition (e.g., vertex, face)
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDef {
    pub name: String,
    pub count: usize,
    pub properties: Vec<PropertyDef>,
}

impl ElementDef {
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }
}

/// PLY header containing format information and element definitions
#[derive(Debug, Clone, PartialEq)]
pub struct PlyHeader {
    pub format: PlyFormat,
    pub version: String,
    pub elements: Vec<ElementDef>,
    pub comments: Vec<String>,
    pub obj_info: Vec<String>,
}

impl PlyHeader {
    /// Parse a PLY header, leaving `reader` positioned at the first data byte.
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Self, PlyError> {
        let mut line = String::new();

        reader.read_line(&mut line)?;
        if line.trim() != "ply" {
            return Err(PlyError::InvalidHeader(
                "File must start with 'ply'".to_string(),
            ));
        }

        let mut format = None;
        let mut version = String::new();
        let mut elements: Vec<ElementDef> = Vec::new();
        let mut comments = Vec::new();
        let mut obj_info = Vec::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(PlyError::InvalidHeader(
                    "Unexpected end of file".to_string(),
                ));
            }

            let line = line.trim();
            if line == "end_header" {
                break;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            let Some(&keyword) = parts.first() else {
                continue;
            };

            match keyword {
                "format" => {
                    if parts.len() < 3 {
                        return Err(PlyError::InvalidHeader("Invalid format line".to_string()));
                    }
                    format = Some(match parts[1] {
                        "ascii" => PlyFormat::Ascii,
                        "binary_little_endian" => PlyFormat::BinaryLittleEndian,
                        "binary_big_endian" => PlyFormat::BinaryBigEndian,
                        _ => return Err(PlyError::UnsupportedFormat(parts[1].to_string())),
                    });
                    version = parts[2].to_string();
                }
                "comment" => {
                    comments.push(parts[1..].join(" "));
                }
                "obj_info" => {
                    obj_info.push(parts[1..].join(" "));
                }
                "element" => {
                    if parts.len() < 3 {
                        return Err(PlyError::InvalidHeader("Invalid element line".to_string()));
                    }
                    let name = parts[1].to_string();
                    if elements.iter().any(|e| e.name == name) {
                        return Err(PlyError::InvalidHeader(format!(
                            "Duplicate element: {name}"
                        )));
                    }
                    let count = parts[2].parse::<usize>().map_err(|_| {
                        PlyError::InvalidHeader(format!("Invalid element count: {}", parts[2]))
                    })?;

                    elements.push(ElementDef {
                        name,
                        count,
                        properties: Vec::new(),
                    });
                }
                "property" => {
                    let element = elements.last_mut().ok_or_else(|| {
                        PlyError::InvalidHeader("Property without element".to_string())
                    })?;

                    let property = match parts.as_slice() {
                        ["property", "list", count_type, data_type, name] => PropertyDef::list(
                            name,
                            ScalarType::parse(count_type)?,
                            ScalarType::parse(data_type)?,
                        ),
                        ["property", "list", ..] => {
                            return Err(PlyError::InvalidHeader(
                                "Invalid list property line".to_string(),
                            ))
                        }
                        ["property", data_type, name] => {
                            PropertyDef::scalar(name, ScalarType::parse(data_type)?)
                        }
                        _ => {
                            return Err(PlyError::InvalidHeader(
                                "Invalid property line".to_string(),
                            ))
                        }
                    };
                    element.properties.push(property);
                }
                _ => {
                    // Unknown header line - could be a comment or extension
                    comments.push(line.to_string());
                }
            }
        }

        let format = format
            .ok_or_else(|| PlyError::InvalidHeader("Missing format specification".to_string()))?;

        Ok(PlyHeader {
            format,
            version,
            elements,
            comments,
            obj_info,
        })
    }

    /// Get element definition by name
    pub fn get_element(&self, name: &str) -> Option<&ElementDef> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Writes the header text, `end_header` line included.
    ///
    /// Comment and obj_info lines must be single lines; nothing is written
    /// if any of them contains a line break.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), PlyError> {
        if let Some(line) = self
            .comments
            .iter()
            .chain(&self.obj_info)
            .find(|line| line.contains(['\n', '\r']))
        {
            return Err(PlyError::InvalidHeader(format!(
                "header line contains a line break: {line:?}"
            )));
        }

        writeln!(writer, "ply")?;
        writeln!(writer, "format {} {}", self.format, self.version)?;
        for comment in &self.comments {
            writeln!(writer, "comment {comment}")?;
        }
        for info in &self.obj_info {
            writeln!(writer, "obj_info {info}")?;
        }
        for element in &self.elements {
            writeln!(writer, "element {} {}", element.name, element.count)?;
            for property in &element.properties {
                match &property.property_type {
                    PropertyType::Scalar { data_type } => {
                        writeln!(writer, "property {} {}", data_type.name(), property.name)?
                    }
                    PropertyType::List {
                        count_type,
                        data_type,
                    } => writeln!(
                        writer,
                        "property list {} {} {}",
                        count_type.name(),
                        data_type.name(),
                        property.name
                    )?,
                }
            }
        }
        writeln!(writer, "end_header")?;
        Ok(())
    }
}
