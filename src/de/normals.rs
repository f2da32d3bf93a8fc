use glam::Vec3;

/// Per-vertex normals for a file that carries none.
///
/// Each face contributes its counter-clockwise normal, weighted by its area,
/// to its three corners. Vertices touched only by degenerate faces (or by no
/// face at all) keep a zero normal.
pub(crate) fn vertex_normals(positions: &[[f32; 3]], faces: &[[usize; 3]]) -> Vec<[f32; 3]> {
    let mut sums = vec![Vec3::ZERO; positions.len()];

    for &[a, b, c] in faces {
        let pa = Vec3::from_array(positions[a]);
        let pb = Vec3::from_array(positions[b]);
        let pc = Vec3::from_array(positions[c]);
        let face_normal = (pb - pa).cross(pc - pa);

        sums[a] += face_normal;
        sums[b] += face_normal;
        sums[c] += face_normal;
    }

    sums.into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}
