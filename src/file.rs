//! Path-based helpers over the stream codec.
//!
//! Every helper opens its file for the duration of the call only; the handle
//! is dropped on success and on every error path.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use tracing::warn;

use crate::mesh::{BufferMesh, MeshStore};
use crate::{de, ser, PlyError, PlyFormat};

/// Whether `path` names a PLY file, judged by a case-insensitive `.ply`
/// extension.
pub fn supports_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ply"))
}

fn check_extension(path: &Path) {
    if !supports_path(path) {
        warn!(path = %path.display(), "file does not have a .ply extension");
    }
}

/// Reads the PLY file at `path` into a new [`BufferMesh`].
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open(path: impl AsRef<Path>) -> Result<BufferMesh, PlyError> {
    let path = path.as_ref();
    check_extension(path);
    de::open(BufReader::new(File::open(path)?))
}

/// Reads the PLY file at `path` and adds its contents to `mesh`.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_into<M: MeshStore>(path: impl AsRef<Path>, mesh: &mut M) -> Result<(), PlyError> {
    let path = path.as_ref();
    check_extension(path);
    de::read(BufReader::new(File::open(path)?), mesh)
}

/// Declared `(vertex, face)` counts of the file at `path`, from its header.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn element_counts(path: impl AsRef<Path>) -> Result<(usize, usize), PlyError> {
    de::element_counts(BufReader::new(File::open(path.as_ref())?))
}

/// Encodes `mesh` and writes it to `path`, replacing any existing file.
///
/// The whole encoding is built in memory first, so a failed encode leaves
/// `path` untouched.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), format = %format))]
pub fn save<M: MeshStore>(
    mesh: &M,
    path: impl AsRef<Path>,
    format: PlyFormat,
) -> Result<(), PlyError> {
    let path = path.as_ref();
    check_extension(path);
    let bytes = ser::encode(mesh, format)?;
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Triangle, Vertex};

    fn quad() -> BufferMesh {
        let mut mesh = BufferMesh::new();
        let corners = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let refs: Vec<_> = corners
            .into_iter()
            .map(|p| mesh.add_vertex(Vertex::new(p, [0.0, 0.0, 1.0])))
            .collect();
        mesh.add_triangle(Triangle::new([refs[0], refs[1], refs[2]]))
            .unwrap();
        mesh.add_triangle(Triangle::new([refs[0], refs[2], refs[3]]))
            .unwrap();
        mesh
    }

    #[test]
    fn test_supports_path() {
        assert!(supports_path("mesh.ply"));
        assert!(supports_path("dir/MESH.PLY"));
        assert!(supports_path("mesh.Ply"));
        assert!(!supports_path("mesh.obj"));
        assert!(!supports_path("ply"));
        assert!(!supports_path("mesh.ply.gz"));
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = quad();

        for format in [
            PlyFormat::Ascii,
            PlyFormat::BinaryLittleEndian,
            PlyFormat::BinaryBigEndian,
        ] {
            let path = dir.path().join(format!("{format}.ply"));
            save(&mesh, &path, format).unwrap();

            assert_eq!(element_counts(&path).unwrap(), (4, 2));
            let loaded = open(&path).unwrap();
            assert_eq!(loaded.vertex_count(), 4);
            assert_eq!(loaded.triangle_count(), 2);
        }
    }

    #[test]
    fn test_read_into_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.ply");
        save(&quad(), &path, PlyFormat::BinaryLittleEndian).unwrap();

        let mut mesh = quad();
        read_into(&path, &mut mesh).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 4);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = open(dir.path().join("missing.ply"));
        assert!(matches!(result, Err(PlyError::Io(_))));
    }
}
