//! In-memory triangle mesh storage.
//!
//! The codec reads from and writes into anything implementing [`MeshStore`].
//! [`BufferMesh`] is the store used when the crate creates the mesh itself:
//! an arena of vertex and triangle slots where a reference is the slot index.
//! Removing an element leaves a hole, so references stay stable and are never
//! handed out twice for the lifetime of the store.

use crate::PlyError;

/// Stable reference to a vertex inside a [`MeshStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexRef(pub u64);

/// Stable reference to a triangle inside a [`MeshStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriangleRef(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Texture coordinate, zero when the source carried none.
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            uv: [0.0; 2],
        }
    }

    pub fn with_uv(mut self, uv: [f32; 2]) -> Self {
        self.uv = uv;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [VertexRef; 3],
    /// Face normal, zero when unavailable.
    pub normal: [f32; 3],
}

impl Triangle {
    pub fn new(vertices: [VertexRef; 3]) -> Self {
        Self {
            vertices,
            normal: [0.0; 3],
        }
    }
}

/// A growable vertex/triangle container the codec can populate and read.
///
/// Iteration order of [`MeshStore::vertices`] must be stable between calls
/// that do not mutate the store; the encoder numbers file rows in that order.
pub trait MeshStore {
    /// Hint that roughly this many elements are about to be added.
    fn reserve(&mut self, _vertices: usize, _triangles: usize) {}

    fn add_vertex(&mut self, vertex: Vertex) -> VertexRef;

    /// Fails with [`PlyError::UnknownVertex`] if any corner is not a live
    /// vertex of this store.
    fn add_triangle(&mut self, triangle: Triangle) -> Result<TriangleRef, PlyError>;

    fn vertex_count(&self) -> usize;

    fn triangle_count(&self) -> usize;

    fn vertices(&self) -> impl Iterator<Item = (VertexRef, &Vertex)>;

    fn triangles(&self) -> impl Iterator<Item = (TriangleRef, &Triangle)>;
}

/// Arena-backed [`MeshStore`].
#[derive(Debug, Clone, Default)]
pub struct BufferMesh {
    vertices: Vec<Option<Vertex>>,
    triangles: Vec<Option<Triangle>>,
    live_vertices: usize,
    live_triangles: usize,
}

impl BufferMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(triangles),
            live_vertices: 0,
            live_triangles: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.live_vertices == 0 && self.live_triangles == 0
    }

    pub fn vertex(&self, r: VertexRef) -> Option<&Vertex> {
        self.vertices.get(usize::try_from(r.0).ok()?)?.as_ref()
    }

    pub fn vertex_mut(&mut self, r: VertexRef) -> Option<&mut Vertex> {
        self.vertices.get_mut(usize::try_from(r.0).ok()?)?.as_mut()
    }

    pub fn triangle(&self, r: TriangleRef) -> Option<&Triangle> {
        self.triangles.get(usize::try_from(r.0).ok()?)?.as_ref()
    }

    pub fn contains_vertex(&self, r: VertexRef) -> bool {
        self.vertex(r).is_some()
    }

    pub fn remove_triangle(&mut self, r: TriangleRef) -> Option<Triangle> {
        let removed = self.triangles.get_mut(usize::try_from(r.0).ok()?)?.take();
        if removed.is_some() {
            self.live_triangles -= 1;
        }
        removed
    }

    /// Removes the vertex and every triangle that uses it.
    pub fn remove_vertex(&mut self, r: VertexRef) -> Option<Vertex> {
        let removed = self.vertices.get_mut(usize::try_from(r.0).ok()?)?.take()?;
        self.live_vertices -= 1;

        for slot in &mut self.triangles {
            if slot.is_some_and(|t| t.vertices.contains(&r)) {
                *slot = None;
                self.live_triangles -= 1;
            }
        }
        Some(removed)
    }
}

impl MeshStore for BufferMesh {
    fn reserve(&mut self, vertices: usize, triangles: usize) {
        self.vertices.reserve(vertices);
        self.triangles.reserve(triangles);
    }

    fn add_vertex(&mut self, vertex: Vertex) -> VertexRef {
        let r = VertexRef(self.vertices.len() as u64);
        self.vertices.push(Some(vertex));
        self.live_vertices += 1;
        r
    }

    fn add_triangle(&mut self, triangle: Triangle) -> Result<TriangleRef, PlyError> {
        if let Some(&missing) = triangle
            .vertices
            .iter()
            .find(|&&v| !self.contains_vertex(v))
        {
            return Err(PlyError::UnknownVertex(missing));
        }

        let r = TriangleRef(self.triangles.len() as u64);
        self.triangles.push(Some(triangle));
        self.live_triangles += 1;
        Ok(r)
    }

    fn vertex_count(&self) -> usize {
        self.live_vertices
    }

    fn triangle_count(&self) -> usize {
        self.live_triangles
    }

    fn vertices(&self) -> impl Iterator<Item = (VertexRef, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (VertexRef(i as u64), v)))
    }

    fn triangles(&self) -> impl Iterator<Item = (TriangleRef, &Triangle)> {
        self.triangles
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (TriangleRef(i as u64), t)))
    }
}
