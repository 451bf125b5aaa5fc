use log::trace;

use crate::{
    error::{Error, Result},
    geometry::{Face, Vertex},
};

/// Largest vertex window a `u16` index buffer can address.
pub const MAX_ADDRESSABLE_VERTICES: usize = u16::MAX as usize + 1;

/// How much of an arena's storage has been handed out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaUsage {
    pub vertices: usize,
    pub indices: usize,
}

/// Raw vertices and indices reserved together, for geometry that isn't a run of whole faces.
///
/// `base` is the absolute index of `vertices[0]` in the root storage; index values written into
/// `indices` must be offset by it (see [`MeshSlot::index`]).
#[derive(Debug)]
pub struct MeshSlot<'a> {
    pub vertices: &'a mut [Vertex],
    pub indices: &'a mut [u16],
    pub base: u16,
}

impl MeshSlot<'_> {
    /// Absolute index of the slot-local vertex `local`.
    pub fn index(&self, local: usize) -> u16 {
        debug_assert!(local < self.vertices.len());
        self.base + local as u16
    }
}

/// Bump allocator for vertex/index records over storage owned by someone else, usually a mapped
/// GPU buffer. It never grows the storage, so the buffer size the renderer uploads stays fixed.
///
/// Every allocation is all or nothing: vertex and index room are both checked before either
/// cursor moves.
#[derive(Debug)]
pub struct GeometryArena<'a> {
    vertices: &'a mut [Vertex],
    indices: &'a mut [u16],
    vertices_used: usize,
    indices_used: usize,
    /// Absolute index of `vertices[0]` in the root storage.
    vertex_offset: usize,
}

impl<'a> GeometryArena<'a> {
    /// # Panics
    ///
    /// If `vertices` is longer than a `u16` index can address.
    pub fn new(vertices: &'a mut [Vertex], indices: &'a mut [u16]) -> Self {
        assert!(
            vertices.len() <= MAX_ADDRESSABLE_VERTICES,
            "{} vertices cannot be addressed by u16 indices",
            vertices.len()
        );
        Self {
            vertices,
            indices,
            vertices_used: 0,
            indices_used: 0,
            vertex_offset: 0,
        }
    }

    pub fn vertices_used(&self) -> usize {
        self.vertices_used
    }

    pub fn indices_used(&self) -> usize {
        self.indices_used
    }

    pub fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_capacity(&self) -> usize {
        self.indices.len()
    }

    pub fn vertex_offset(&self) -> usize {
        self.vertex_offset
    }

    pub fn usage(&self) -> ArenaUsage {
        ArenaUsage {
            vertices: self.vertices_used,
            indices: self.indices_used,
        }
    }

    pub fn finish(self) -> ArenaUsage {
        self.usage()
    }

    /// Written vertices, in allocation order.
    pub fn used_vertices(&self) -> &[Vertex] {
        &self.vertices[..self.vertices_used]
    }

    /// Written indices, in allocation order.
    pub fn used_indices(&self) -> &[u16] {
        &self.indices[..self.indices_used]
    }

    /// Rewinds both cursors. Storage and capacity are untouched.
    pub fn reset(&mut self) {
        trace!(
            "arena reset at offset {} ({} vertices, {} indices)",
            self.vertex_offset,
            self.vertices_used,
            self.indices_used
        );
        self.vertices_used = 0;
        self.indices_used = 0;
    }

    fn ensure_space(&self, vertices: usize, indices: usize) -> Result<()> {
        let vertices_free = self.vertices.len() - self.vertices_used;
        let indices_free = self.indices.len() - self.indices_used;
        if vertices > vertices_free || indices > indices_free {
            return Err(Error::OutOfSpace {
                vertices,
                indices,
                vertices_free,
                indices_free,
            });
        }
        Ok(())
    }

    pub fn create<F: Face>(&mut self) -> Result<&mut F> {
        let faces = self.allocate::<F>(1)?;
        Ok(&mut faces[0])
    }

    /// Allocates `amount` faces of one kind back to back and writes their indices.
    pub fn allocate<F: Face>(&mut self, amount: usize) -> Result<&mut [F]> {
        let vertex_count = amount.saturating_mul(F::VERTEX_COUNT);
        let index_count = amount.saturating_mul(F::INDEX_PATTERN.len());
        self.ensure_space(vertex_count, index_count)?;

        let first_vertex = self.vertices_used;
        let first_index = self.indices_used;
        self.vertices_used += vertex_count;
        self.indices_used += index_count;

        let base = self.vertex_offset + first_vertex;
        let indices = &mut self.indices[first_index..first_index + index_count];
        for (face, chunk) in indices
            .chunks_exact_mut(F::INDEX_PATTERN.len())
            .enumerate()
        {
            let face_base = base + face * F::VERTEX_COUNT;
            for (slot, relative) in chunk.iter_mut().zip(F::INDEX_PATTERN) {
                *slot = (face_base + *relative as usize) as u16;
            }
        }

        let vertices = &mut self.vertices[first_vertex..first_vertex + vertex_count];
        vertices.fill(Vertex::default());
        trace!("arena allocated {amount} faces at vertex {base}");
        Ok(bytemuck::cast_slice_mut(vertices))
    }

    /// Reserves raw room. Indices come back zeroed and must be filled by the caller.
    pub fn reserve_mesh(
        &mut self,
        vertex_count: usize,
        index_count: usize,
    ) -> Result<MeshSlot<'_>> {
        self.ensure_space(vertex_count, index_count)?;

        let first_vertex = self.vertices_used;
        let first_index = self.indices_used;
        self.vertices_used += vertex_count;
        self.indices_used += index_count;

        let vertices = &mut self.vertices[first_vertex..first_vertex + vertex_count];
        vertices.fill(Vertex::default());
        let indices = &mut self.indices[first_index..first_index + index_count];
        indices.fill(0);

        Ok(MeshSlot {
            vertices,
            indices,
            base: (self.vertex_offset + first_vertex) as u16,
        })
    }

    /// Looks up a face created earlier by this arena, `first_vertex` being relative to it.
    pub fn face_mut<F: Face>(&mut self, first_vertex: usize) -> Option<&mut F> {
        let end = first_vertex.checked_add(F::VERTEX_COUNT)?;
        if end > self.vertices_used {
            return None;
        }
        bytemuck::cast_slice_mut::<Vertex, F>(&mut self.vertices[first_vertex..end]).first_mut()
    }

    /// Carves a child arena of `vertex_count` vertices and `vertex_count * 3 / 2` indices out of
    /// the remaining space. The room is taken from this arena immediately.
    ///
    /// Indices the child writes are absolute in the root storage, so no rebasing is needed when
    /// the whole buffer is drawn. Unused index slots of the child are left pointing at its first
    /// vertex, which only produces degenerate triangles.
    pub fn create_arena(&mut self, vertex_count: usize) -> Result<GeometryArena<'_>> {
        let index_count = vertex_count.saturating_add(vertex_count / 2);
        self.ensure_space(vertex_count, index_count)?;

        let first_vertex = self.vertices_used;
        let first_index = self.indices_used;
        self.vertices_used += vertex_count;
        self.indices_used += index_count;

        let vertex_offset = self.vertex_offset + first_vertex;
        let indices = &mut self.indices[first_index..first_index + index_count];
        if vertex_count > 0 {
            indices.fill(vertex_offset as u16);
        }
        trace!("arena carved {vertex_count} vertices at {vertex_offset}");

        Ok(GeometryArena {
            vertices: &mut self.vertices[first_vertex..first_vertex + vertex_count],
            indices,
            vertices_used: 0,
            indices_used: 0,
            vertex_offset,
        })
    }
}
