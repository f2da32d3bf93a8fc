//! Decoding PLY files written by other tools.

use mesh_ply::{BufferMesh, MeshStore, PlyError, Vertex};

fn positions(mesh: &BufferMesh) -> Vec<[f32; 3]> {
    mesh.vertices().map(|(_, v)| v.position).collect()
}

fn faces_as_positions(mesh: &BufferMesh) -> Vec<[[f32; 3]; 3]> {
    mesh.triangles()
        .map(|(_, t)| t.vertices.map(|r| mesh.vertex(r).unwrap().position))
        .collect()
}

const CUBE_CORNER: &str = "ply
format ascii 1.0
comment three faces meeting at the origin
element vertex 4
property float x
property float y
property float z
element face 3
property list uchar int vertex_index
end_header
0 0 0
1 0 0
0 1 0
0 0 1
3 0 2 1
3 0 1 3
3 0 3 2
";

#[test]
fn test_synthesizes_normals_when_absent() {
    let mesh = mesh_ply::open(CUBE_CORNER.as_bytes()).unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 3);

    let normals: Vec<[f32; 3]> = mesh.vertices().map(|(_, v)| v.normal).collect();
    let expected = -1.0 / 3.0f32.sqrt();
    for component in normals[0] {
        assert!((component - expected).abs() < 1e-6);
    }
    // Vertex 1 lies on the y = 0 and z = 0 faces only.
    let half = -1.0 / 2.0f32.sqrt();
    assert!((normals[1][0]).abs() < 1e-6);
    assert!((normals[1][1] - half).abs() < 1e-6);
    assert!((normals[1][2] - half).abs() < 1e-6);

    // Face normals are never computed.
    assert!(mesh.triangles().all(|(_, t)| t.normal == [0.0; 3]));
}

#[test]
fn test_reads_texture_coordinate_aliases() {
    let data = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
property float s
property float t
element face 1
property list uchar uint vertex_indices
end_header
0 0 0 0 0
1 0 0 1 0
0 1 0 0.5 1
3 0 1 2
";
    let mesh = mesh_ply::open(data.as_bytes()).unwrap();
    let uvs: Vec<[f32; 2]> = mesh.vertices().map(|(_, v)| v.uv).collect();
    assert_eq!(uvs, vec![[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]]);
}

#[test]
fn test_several_texture_coordinate_spellings() {
    let data = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
property float u
property float v
property float s
property float t
property float texture_u
element face 1
property list uchar int vertex_index
end_header
0 0 0 0.25 0.75 9 9 8
1 0 0 1 0 9 9 8
0 1 0 0 1 9 9 8
3 0 1 2
";
    let mesh = mesh_ply::open(data.as_bytes()).unwrap();
    let uvs: Vec<[f32; 2]> = mesh.vertices().map(|(_, v)| v.uv).collect();
    assert_eq!(uvs, vec![[0.25, 0.75], [1.0, 0.0], [0.0, 1.0]]);

    let only_texture = "ply
format ascii 1.0
element vertex 1
property float x
property float y
property float z
property float texture_u
property float texture_v
element face 0
property list uchar int vertex_index
end_header
0 0 0 0.5 0.125
";
    let mesh = mesh_ply::open(only_texture.as_bytes()).unwrap();
    assert_eq!(mesh.vertices().next().unwrap().1.uv, [0.5, 0.125]);
}

#[test]
fn test_skips_unknown_elements_and_properties() {
    let data = "ply
format ascii 1.0
obj_info generated for a test
element material 2
property uchar red
property list uchar float weights
element vertex 3
property float x
property uchar flags
property float y
property float z
property float nx
property float ny
property float nz
element face 1
property uchar group
property list uchar int vertex_index
element edge 1
property int vertex1
property int vertex2
end_header
255 2 0.5 0.5
0 0
0 7 0 0 0 0 1
1 7 0 0 0 0 1
0 7 1 0 0 0 1
9 3 0 1 2
0 1
";
    let mesh = mesh_ply::open(data.as_bytes()).unwrap();
    assert_eq!(
        positions(&mesh),
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
    );
    assert_eq!(mesh.triangle_count(), 1);
}

#[test]
fn test_reads_big_endian_binary() {
    let header = "ply
format binary_big_endian 1.0
element vertex 3
property double x
property double y
property double z
element face 1
property list uchar int vertex_index
end_header
";
    let mut data = header.as_bytes().to_vec();
    for position in [[0.0f64, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]] {
        for value in position {
            data.extend_from_slice(&value.to_be_bytes());
        }
    }
    data.push(3);
    for index in [2i32, 1, 0] {
        data.extend_from_slice(&index.to_be_bytes());
    }

    let mesh = mesh_ply::open(data.as_slice()).unwrap();
    assert_eq!(
        faces_as_positions(&mesh),
        vec![[[0.0, 2.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 0.0]]]
    );
}

#[test]
fn test_missing_elements() {
    let no_face = "ply
format ascii 1.0
element vertex 1
property float x
property float y
property float z
end_header
0 0 0
";
    let no_vertex = "ply
format ascii 1.0
element face 0
property list uchar int vertex_index
end_header
";
    let mut mesh = BufferMesh::new();
    assert!(matches!(
        mesh_ply::read(no_face.as_bytes(), &mut mesh),
        Err(PlyError::MissingElement(name)) if name == "face"
    ));
    assert!(matches!(
        mesh_ply::read(no_vertex.as_bytes(), &mut mesh),
        Err(PlyError::MissingElement(name)) if name == "vertex"
    ));
    assert!(mesh.is_empty());
}

#[test]
fn test_empty_vertex_element() {
    let empty = "ply
format ascii 1.0
element vertex 0
property float x
property float y
property float z
element face 0
property list uchar int vertex_index
end_header
";
    let mesh = mesh_ply::open(empty.as_bytes()).unwrap();
    assert!(mesh.is_empty());

    let dangling = empty.replace("element face 0", "element face 1") + "3 0 0 0\n";
    assert!(matches!(
        mesh_ply::open(dangling.as_bytes()),
        Err(PlyError::DanglingReference {
            face_row: 0,
            index: 0,
            vertex_rows: 0
        })
    ));
}

#[test]
fn test_rejects_non_triangle_faces() {
    let data = CUBE_CORNER.replace("3 0 1 3\n", "4 0 1 3 2\n");
    match mesh_ply::open(data.as_bytes()) {
        Err(PlyError::MalformedRecord { element, row, .. }) => {
            assert_eq!(element, "face");
            assert_eq!(row, 1);
        }
        other => panic!("expected a malformed face, got {other:?}"),
    }
}

#[test]
fn test_truncated_input() {
    let ascii = CUBE_CORNER.trim_end_matches("3 0 3 2\n");
    assert!(matches!(
        mesh_ply::open(ascii.as_bytes()),
        Err(PlyError::Io(_))
    ));

    let mut mesh = BufferMesh::new();
    let a = mesh.add_vertex(Vertex::new([0.0; 3], [0.0, 0.0, 1.0]));
    let b = mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]));
    let c = mesh.add_vertex(Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]));
    mesh.add_triangle(mesh_ply::Triangle::new([a, b, c])).unwrap();

    let binary = mesh_ply::write_binary(&mesh).unwrap();
    let truncated = &binary[..binary.len() - 2];
    assert!(matches!(
        mesh_ply::open(truncated),
        Err(PlyError::Io(_))
    ));
}

#[test]
fn test_malformed_value_reports_row() {
    let data = CUBE_CORNER.replace("0 1 0\n", "0 one 0\n");
    match mesh_ply::open(data.as_bytes()) {
        Err(PlyError::MalformedRecord { element, row, .. }) => {
            assert_eq!(element, "vertex");
            assert_eq!(row, 2);
        }
        other => panic!("expected a malformed vertex, got {other:?}"),
    }
}

#[test]
fn test_invalid_headers() {
    for data in [
        "plx\nformat ascii 1.0\nend_header\n",
        "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\n",
        "ply\nformat ebcdic 1.0\nend_header\n",
    ] {
        assert!(mesh_ply::open(data.as_bytes()).is_err(), "accepted {data:?}");
    }
}
