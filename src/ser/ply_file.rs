use std::io::Write;

use byteorder::{BigEndian, LittleEndian};
use serde::Serialize;
use tracing::trace;

use crate::mesh::{MeshStore, VertexRef};
use crate::row_map::RowMap;
use crate::ser::row::RowSerializer;
use crate::ser::val_writer::{AsciiValWriter, BinValWriter};
use crate::{ElementDef, PlyError, PlyFormat, PlyHeader, PropertyDef, ScalarType};

const VERTEX: &str = "vertex";
const FACE: &str = "face";

#[derive(Serialize)]
struct VertexRow {
    x: f32,
    y: f32,
    z: f32,
    nx: f32,
    ny: f32,
    nz: f32,
    u: f32,
    v: f32,
}

#[derive(Serialize)]
struct FaceRow {
    vertex_index: [i32; 3],
}

/// The fixed header written for every mesh.
pub(crate) fn mesh_header(
    format: PlyFormat,
    comments: Vec<String>,
    vertices: usize,
    triangles: usize,
) -> PlyHeader {
    let vertex_properties = ["x", "y", "z", "nx", "ny", "nz", "u", "v"]
        .into_iter()
        .map(|name| PropertyDef::scalar(name, ScalarType::F32))
        .collect();

    PlyHeader {
        format,
        version: "1.0".to_string(),
        elements: vec![
            ElementDef {
                name: VERTEX.to_string(),
                count: vertices,
                properties: vertex_properties,
            },
            ElementDef {
                name: FACE.to_string(),
                count: triangles,
                properties: vec![PropertyDef::list(
                    "vertex_index",
                    ScalarType::U8,
                    ScalarType::I32,
                )],
            },
        ],
        comments,
        obj_info: vec![],
    }
}

/// Writes serde rows in the body encoding of `format`.
pub(crate) struct PlyFileWriter<W> {
    writer: W,
    format: PlyFormat,
}

impl<W: Write> PlyFileWriter<W> {
    pub fn new(format: PlyFormat, writer: W) -> Self {
        Self { writer, format }
    }

    pub fn write_row<T: Serialize>(&mut self, row: &T) -> Result<(), PlyError> {
        match self.format {
            PlyFormat::Ascii => {
                row.serialize(&mut RowSerializer::new(AsciiValWriter::new(&mut self.writer)))
            }
            PlyFormat::BinaryLittleEndian => row.serialize(&mut RowSerializer::new(
                BinValWriter::<_, LittleEndian>::new(&mut self.writer),
            )),
            PlyFormat::BinaryBigEndian => row.serialize(&mut RowSerializer::new(
                BinValWriter::<_, BigEndian>::new(&mut self.writer),
            )),
        }
    }

    /// Writes the vertex block then the face block of `mesh`.
    ///
    /// Vertices are numbered in store iteration order and each triangle
    /// corner is written as the row its vertex landed on.
    pub fn write_mesh<M: MeshStore>(&mut self, mesh: &M) -> Result<(), PlyError> {
        let vertex_count = mesh.vertex_count();
        let triangle_count = mesh.triangle_count();

        let mut rows = RowMap::with_capacity(vertex_count);
        for (reference, vertex) in mesh.vertices() {
            rows.push(reference)?;
            let [x, y, z] = vertex.position;
            let [nx, ny, nz] = vertex.normal;
            let [u, v] = vertex.uv;
            self.write_row(&VertexRow {
                x,
                y,
                z,
                nx,
                ny,
                nz,
                u,
                v,
            })?;
        }
        check_count(VERTEX, vertex_count, rows.len())?;
        trace!(rows = rows.len(), "wrote vertex block");

        let mut written = 0;
        for (_, triangle) in mesh.triangles() {
            let mut vertex_index = [0i32; 3];
            for (index, &corner) in vertex_index.iter_mut().zip(&triangle.vertices) {
                *index = row_index(&rows, corner, vertex_count, triangle_count)?;
            }
            self.write_row(&FaceRow { vertex_index })?;
            written += 1;
        }
        check_count(FACE, triangle_count, written)?;
        trace!(rows = written, "wrote face block");

        Ok(())
    }
}

fn row_index(
    rows: &RowMap,
    reference: VertexRef,
    vertices: usize,
    triangles: usize,
) -> Result<i32, PlyError> {
    let row = rows
        .row(reference)
        .ok_or(PlyError::UnknownVertex(reference))?;
    i32::try_from(row).map_err(|_| PlyError::OversizedPayload {
        vertices,
        triangles,
    })
}

// The header is already out by the time rows are iterated, so a store whose
// iterators disagree with its counts would produce an unreadable file.
fn check_count(element: &str, declared: usize, written: usize) -> Result<(), PlyError> {
    if declared == written {
        return Ok(());
    }
    Err(PlyError::MalformedRecord {
        element: element.to_string(),
        row: written,
        reason: format!("store reported {declared} rows but yielded {written}"),
    })
}
