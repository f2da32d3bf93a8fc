//! Encoding a [`MeshStore`] as a PLY byte stream.

use std::io::Write;

use tracing::debug;

use crate::mesh::MeshStore;
use crate::{PlyError, PlyFormat};
use ply_file::{mesh_header, PlyFileWriter};

mod ply_file;
mod row;

pub mod val_writer;

/// Bytes per encoded vertex: eight `float` properties.
pub const VERTEX_BYTES: usize = 8 * 4;
/// Bytes per encoded triangle: a `uchar` count and three `int` indices.
pub const TRIANGLE_BYTES: usize = 1 + 3 * 4;

const TOOL_COMMENT: &str = concat!(
    "created by ",
    env!("CARGO_PKG_NAME"),
    " ",
    env!("CARGO_PKG_VERSION")
);

/// Total length of a binary encoding with a header of `header_len` bytes.
///
/// Fails with [`PlyError::OversizedPayload`] when either element count does
/// not fit in an `int` or the total does not fit in `isize`.
pub fn payload_len(header_len: usize, vertices: usize, triangles: usize) -> Result<usize, PlyError> {
    let oversized = || PlyError::OversizedPayload {
        vertices,
        triangles,
    };

    if vertices > i32::MAX as usize || triangles > i32::MAX as usize {
        return Err(oversized());
    }

    let total = header_len as u128
        + vertices as u128 * VERTEX_BYTES as u128
        + triangles as u128 * TRIANGLE_BYTES as u128;
    if total > isize::MAX as u128 {
        return Err(oversized());
    }
    Ok(total as usize)
}

/// Encodes `mesh` with the given comment lines in place of the tool comment.
pub fn to_bytes<M: MeshStore>(
    mesh: &M,
    format: PlyFormat,
    comments: Vec<String>,
) -> Result<Vec<u8>, PlyError> {
    let vertices = mesh.vertex_count();
    let triangles = mesh.triangle_count();

    let mut header = Vec::new();
    mesh_header(format, comments, vertices, triangles).write_to(&mut header)?;
    let len = payload_len(header.len(), vertices, triangles)?;

    let mut buf = match format {
        PlyFormat::Ascii => header,
        PlyFormat::BinaryLittleEndian | PlyFormat::BinaryBigEndian => {
            let mut buf = Vec::with_capacity(len);
            buf.extend_from_slice(&header);
            buf
        }
    };
    PlyFileWriter::new(format, &mut buf).write_mesh(mesh)?;

    debug!(%format, vertices, triangles, bytes = buf.len(), "encoded PLY mesh");
    Ok(buf)
}

/// Streams the encoding of `mesh` into `writer`.
///
/// Size checks run before anything is written, but a store that fails part
/// way through the body leaves a partial stream behind.
pub fn to_writer<M: MeshStore, W: Write>(
    mesh: &M,
    format: PlyFormat,
    comments: Vec<String>,
    mut writer: W,
) -> Result<(), PlyError> {
    let vertices = mesh.vertex_count();
    let triangles = mesh.triangle_count();
    let header = mesh_header(format, comments, vertices, triangles);

    let mut header_bytes = Vec::new();
    header.write_to(&mut header_bytes)?;
    payload_len(header_bytes.len(), vertices, triangles)?;

    writer.write_all(&header_bytes)?;
    PlyFileWriter::new(format, &mut writer).write_mesh(mesh)?;
    writer.flush()?;
    Ok(())
}

/// Encodes `mesh` in `format` with the crate's tool comment.
pub fn encode<M: MeshStore>(mesh: &M, format: PlyFormat) -> Result<Vec<u8>, PlyError> {
    to_bytes(mesh, format, vec![TOOL_COMMENT.to_string()])
}

/// Encodes `mesh` as ASCII PLY.
pub fn write_ascii<M: MeshStore>(mesh: &M) -> Result<Vec<u8>, PlyError> {
    encode(mesh, PlyFormat::Ascii)
}

/// Encodes `mesh` as little-endian binary PLY.
pub fn write_binary<M: MeshStore>(mesh: &M) -> Result<Vec<u8>, PlyError> {
    encode(mesh, PlyFormat::BinaryLittleEndian)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::BufferMesh;

    #[test]
    fn test_payload_len() {
        assert_eq!(payload_len(100, 3, 1).unwrap(), 100 + 96 + 13);
        assert_eq!(payload_len(0, 0, 0).unwrap(), 0);
    }

    #[test]
    fn test_payload_len_rejects_unaddressable_rows() {
        let vertices = i32::MAX as usize + 1;
        assert!(matches!(
            payload_len(0, vertices, 0),
            Err(PlyError::OversizedPayload { .. })
        ));
    }

    #[test]
    fn test_payload_len_rejects_unaddressable_face_count() {
        let triangles = i32::MAX as usize + 1;
        assert!(matches!(
            payload_len(0, 3, triangles),
            Err(PlyError::OversizedPayload { triangles: t, .. }) if t == triangles
        ));
        assert!(payload_len(0, 3, i32::MAX as usize).is_ok());
    }

    #[test]
    fn test_payload_len_rejects_overflow() {
        assert!(matches!(
            payload_len(0, 0, usize::MAX),
            Err(PlyError::OversizedPayload { .. })
        ));
        assert!(matches!(
            payload_len(usize::MAX, 0, 0),
            Err(PlyError::OversizedPayload { .. })
        ));
    }

    #[test]
    fn test_tool_comment() {
        let text = String::from_utf8(write_ascii(&BufferMesh::new()).unwrap()).unwrap();
        let expected = format!("comment created by mesh_ply {}\n", env!("CARGO_PKG_VERSION"));
        assert!(text.contains(&expected));
    }

    #[test]
    fn test_to_writer_matches_to_bytes() {
        let mesh = BufferMesh::new();
        let mut streamed = Vec::new();
        to_writer(&mesh, PlyFormat::BinaryLittleEndian, vec![], &mut streamed).unwrap();
        assert_eq!(
            streamed,
            to_bytes(&mesh, PlyFormat::BinaryLittleEndian, vec![]).unwrap()
        );
    }
}
