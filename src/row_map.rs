use std::collections::hash_map::{Entry, HashMap};

use crate::mesh::VertexRef;
use crate::PlyError;

/// Translates between file rows of the `vertex` element and store references.
///
/// Rows are handed out contiguously from zero in insertion order. A map lives
/// for a single decode or encode call.
#[derive(Debug, Default)]
pub struct RowMap {
    refs: Vec<VertexRef>,
    rows: HashMap<VertexRef, usize>,
}

impl RowMap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            refs: Vec::with_capacity(capacity),
            rows: HashMap::with_capacity(capacity),
        }
    }

    /// Assigns the next row to `reference` and returns it. A reference can
    /// only hold one row, so pushing it twice fails.
    pub fn push(&mut self, reference: VertexRef) -> Result<usize, PlyError> {
        let row = self.refs.len();
        match self.rows.entry(reference) {
            Entry::Occupied(_) => return Err(PlyError::DuplicateVertex(reference)),
            Entry::Vacant(slot) => slot.insert(row),
        };
        self.refs.push(reference);
        Ok(row)
    }

    pub fn reference(&self, row: usize) -> Option<VertexRef> {
        self.refs.get(row).copied()
    }

    pub fn row(&self, reference: VertexRef) -> Option<usize> {
        self.rows.get(&reference).copied()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
