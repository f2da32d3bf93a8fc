//! Decoding PLY streams into a [`MeshStore`].
//!
//! All rows are decoded and validated before the store is touched, so a
//! failed decode leaves the caller's store as it was.

mod normals;
mod ply_file;
mod row;

pub mod val_reader;

use std::io::BufRead;

use serde::Deserialize;
use tracing::debug;

pub use ply_file::PlyFileReader;

use crate::mesh::{BufferMesh, MeshStore, Triangle, Vertex, VertexRef};
use crate::row_map::RowMap;
use crate::{ElementDef, PlyError, PlyHeader};
use ply_file::PREALLOC_LIMIT;

const VERTEX: &str = "vertex";
const FACE: &str = "face";
const NORMAL_PROPERTIES: [&str; 3] = ["nx", "ny", "nz"];

#[derive(Deserialize)]
struct VertexRow {
    x: f32,
    y: f32,
    z: f32,
    #[serde(default)]
    nx: Option<f32>,
    #[serde(default)]
    ny: Option<f32>,
    #[serde(default)]
    nz: Option<f32>,
    // Files may carry several spellings of the texture coordinate at once.
    #[serde(default)]
    u: Option<f32>,
    #[serde(default)]
    v: Option<f32>,
    #[serde(default)]
    s: Option<f32>,
    #[serde(default)]
    t: Option<f32>,
    #[serde(default)]
    texture_u: Option<f32>,
    #[serde(default)]
    texture_v: Option<f32>,
}

impl VertexRow {
    /// First present of `u`/`s`/`texture_u` and `v`/`t`/`texture_v`, zero
    /// when absent.
    fn uv(&self) -> [f32; 2] {
        [
            self.u.or(self.s).or(self.texture_u).unwrap_or(0.0),
            self.v.or(self.t).or(self.texture_v).unwrap_or(0.0),
        ]
    }
}

#[derive(Deserialize)]
struct FaceRow {
    #[serde(alias = "vertex_indices")]
    vertex_index: Vec<i64>,
}

/// Decoded rows, faces already resolved to vertex rows.
struct DecodedMesh {
    vertices: Vec<Vertex>,
    faces: Vec<[usize; 3]>,
}

impl DecodedMesh {
    fn commit<M: MeshStore>(self, mesh: &mut M) -> Result<(), PlyError> {
        mesh.reserve(self.vertices.len(), self.faces.len());

        let mut rows = RowMap::with_capacity(self.vertices.len());
        for vertex in self.vertices {
            rows.push(mesh.add_vertex(vertex))?;
        }

        for (face_row, face) in self.faces.into_iter().enumerate() {
            let mut corners = [VertexRef(0); 3];
            for (corner, row) in corners.iter_mut().zip(face) {
                *corner = rows.reference(row).ok_or(PlyError::DanglingReference {
                    face_row,
                    index: row as i64,
                    vertex_rows: rows.len(),
                })?;
            }
            mesh.add_triangle(Triangle::new(corners))?;
        }
        Ok(())
    }
}

/// Reads a PLY stream and adds its vertices and triangles to `mesh`.
pub fn read<R: BufRead, M: MeshStore>(reader: R, mesh: &mut M) -> Result<(), PlyError> {
    let mut file = PlyFileReader::new(reader)?;
    decode(&mut file)?.commit(mesh)
}

/// Reads a PLY stream into a new [`BufferMesh`] sized from the header counts.
pub fn open<R: BufRead>(reader: R) -> Result<BufferMesh, PlyError> {
    let mut file = PlyFileReader::new(reader)?;
    let (n_vertices, n_faces) = required_counts(file.header())?;
    let decoded = decode(&mut file)?;

    let mut mesh = BufferMesh::with_capacity(
        n_vertices.min(PREALLOC_LIMIT),
        n_faces.min(PREALLOC_LIMIT),
    );
    decoded.commit(&mut mesh)?;
    Ok(mesh)
}

/// Declared `(vertex, face)` counts, read from the header alone.
pub fn element_counts<R: BufRead>(mut reader: R) -> Result<(usize, usize), PlyError> {
    let header = PlyHeader::parse(&mut reader)?;
    required_counts(&header)
}

fn required_element<'h>(header: &'h PlyHeader, name: &str) -> Result<&'h ElementDef, PlyError> {
    header
        .get_element(name)
        .ok_or_else(|| PlyError::MissingElement(name.to_string()))
}

fn required_counts(header: &PlyHeader) -> Result<(usize, usize), PlyError> {
    Ok((
        required_element(header, VERTEX)?.count,
        required_element(header, FACE)?.count,
    ))
}

/// Whether the vertex element carries normals. A partial set is rejected.
fn declares_normals(vertex_def: &ElementDef) -> Result<bool, PlyError> {
    let declared = NORMAL_PROPERTIES
        .iter()
        .filter(|name| vertex_def.has_property(name))
        .count();
    match declared {
        0 => Ok(false),
        3 => Ok(true),
        _ => Err(PlyError::InvalidHeader(
            "vertex element must declare all of nx, ny, nz or none of them".to_string(),
        )),
    }
}

fn decode<R: BufRead>(file: &mut PlyFileReader<R>) -> Result<DecodedMesh, PlyError> {
    let header = file.header();
    let has_normals = declares_normals(required_element(header, VERTEX)?)?;
    required_element(header, FACE)?;
    debug!(format = %header.format, elements = header.elements.len(), "decoding PLY mesh");

    let mut vertex_rows: Option<Vec<VertexRow>> = None;
    let mut face_rows: Option<Vec<FaceRow>> = None;

    while let Some(name) = file.peek_element().map(|e| e.name.clone()) {
        match name.as_str() {
            VERTEX => vertex_rows = Some(file.next_element()?),
            FACE => face_rows = Some(file.next_element()?),
            _ => {
                debug!(element = %name, "skipping element");
                file.skip_element()?;
            }
        }
    }

    let vertex_rows = vertex_rows.ok_or_else(|| PlyError::MissingElement(VERTEX.to_string()))?;
    let face_rows = face_rows.ok_or_else(|| PlyError::MissingElement(FACE.to_string()))?;

    let faces = resolve_faces(&face_rows, vertex_rows.len())?;

    let positions: Vec<[f32; 3]> = vertex_rows.iter().map(|r| [r.x, r.y, r.z]).collect();
    let normals = if has_normals {
        vertex_rows
            .iter()
            .map(|r| [r.nx, r.ny, r.nz].map(|n| n.unwrap_or(0.0)))
            .collect()
    } else {
        debug!("no vertex normals in file, synthesizing from faces");
        normals::vertex_normals(&positions, &faces)
    };

    let vertices = vertex_rows
        .iter()
        .zip(positions)
        .zip(normals)
        .map(|((row, position), normal)| {
            Vertex::new(position, normal).with_uv(row.uv())
        })
        .collect();

    debug!(
        vertices = vertex_rows.len(),
        triangles = faces.len(),
        "decoded PLY mesh"
    );

    Ok(DecodedMesh { vertices, faces })
}

fn resolve_faces(face_rows: &[FaceRow], vertex_rows: usize) -> Result<Vec<[usize; 3]>, PlyError> {
    face_rows
        .iter()
        .enumerate()
        .map(|(face_row, face)| {
            let &[a, b, c] = face.vertex_index.as_slice() else {
                return Err(PlyError::MalformedRecord {
                    element: FACE.to_string(),
                    row: face_row,
                    reason: format!(
                        "expected 3 vertex indices, found {}",
                        face.vertex_index.len()
                    ),
                });
            };

            let resolve = |index: i64| {
                usize::try_from(index)
                    .ok()
                    .filter(|&row| row < vertex_rows)
                    .ok_or(PlyError::DanglingReference {
                        face_row,
                        index,
                        vertex_rows,
                    })
            };
            Ok([resolve(a)?, resolve(b)?, resolve(c)?])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
property float nx
property float ny
property float nz
element face 1
property list uchar int vertex_index
end_header
0 0 0 0 0 1
1 0 0 0 0 1
0 1 0 0 0 1
3 0 1 2
";

    #[test]
    fn test_read_triangle() {
        let mut mesh = BufferMesh::new();
        read(TRIANGLE.as_bytes(), &mut mesh).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);

        let vertices: Vec<Vertex> = mesh.vertices().map(|(_, v)| *v).collect();
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[1].uv, [0.0, 0.0]);

        let (_, triangle) = mesh.triangles().next().unwrap();
        assert_eq!(triangle.normal, [0.0, 0.0, 0.0]);
        let corners: Vec<[f32; 3]> = triangle
            .vertices
            .iter()
            .map(|&r| mesh.vertex(r).unwrap().position)
            .collect();
        assert_eq!(corners, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    }

    #[test]
    fn test_read_appends_to_existing_store() {
        let mut mesh = BufferMesh::new();
        let existing = mesh.add_vertex(Vertex::default());
        mesh.remove_vertex(existing);
        read(TRIANGLE.as_bytes(), &mut mesh).unwrap();

        let (_, triangle) = mesh.triangles().next().unwrap();
        assert!(!triangle.vertices.contains(&existing));
        assert!(triangle.vertices.iter().all(|&r| mesh.contains_vertex(r)));
    }

    #[test]
    fn test_failed_read_leaves_store_untouched() {
        let data = TRIANGLE.replace("3 0 1 2", "3 0 1 3");
        let mut mesh = BufferMesh::new();
        let err = read(data.as_bytes(), &mut mesh).unwrap_err();

        assert!(matches!(
            err,
            PlyError::DanglingReference {
                face_row: 0,
                index: 3,
                vertex_rows: 3
            }
        ));
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_element_counts() {
        assert_eq!(element_counts(TRIANGLE.as_bytes()).unwrap(), (3, 1));

        let no_face = "ply\nformat ascii 1.0\nelement vertex 0\nproperty float x\nend_header\n";
        assert!(matches!(
            element_counts(no_face.as_bytes()),
            Err(PlyError::MissingElement(name)) if name == "face"
        ));
    }

    #[test]
    fn test_partial_normals_rejected() {
        let data = TRIANGLE
            .replace("property float ny\n", "")
            .replace(" 0 0 1\n", " 0 1\n");
        let mut mesh = BufferMesh::new();
        assert!(matches!(
            read(data.as_bytes(), &mut mesh),
            Err(PlyError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_resolve_faces_rejects_negative_index() {
        let faces = [FaceRow {
            vertex_index: vec![0, -1, 1],
        }];
        assert!(matches!(
            resolve_faces(&faces, 2),
            Err(PlyError::DanglingReference { index: -1, .. })
        ));
    }
}
