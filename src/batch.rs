use log::debug;

use crate::{
    arena::{ArenaUsage, GeometryArena, MAX_ADDRESSABLE_VERTICES},
    geometry::Vertex,
    texture::{AtlasTexture, TextureFormat},
};

/// Sizes for a [`Batch`].
///
/// ```
/// use reelgfx::batch::BatchConfig;
///
/// let batch = BatchConfig::new().with_atlas_size(256).with_quad_capacity(1000).build();
/// assert_eq!(batch.vertex_capacity(), 4000);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BatchConfig {
    atlas_size: u32,
    atlas_format: TextureFormat,
    vertex_capacity: usize,
    index_capacity: usize,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self {
            atlas_size: 1024,
            atlas_format: TextureFormat::R8Unorm,
            vertex_capacity: 16384,
            index_capacity: 24576,
        }
    }

    pub fn with_atlas_size(mut self, atlas_size: u32) -> Self {
        self.atlas_size = atlas_size;
        self
    }

    pub fn with_atlas_format(mut self, atlas_format: TextureFormat) -> Self {
        self.atlas_format = atlas_format;
        self
    }

    pub fn with_vertex_capacity(mut self, vertex_capacity: usize) -> Self {
        self.vertex_capacity = vertex_capacity;
        self
    }

    pub fn with_index_capacity(mut self, index_capacity: usize) -> Self {
        self.index_capacity = index_capacity;
        self
    }

    /// Room for `quads` quads: four vertices and six indices each.
    pub fn with_quad_capacity(self, quads: usize) -> Self {
        self.with_vertex_capacity(quads * 4)
            .with_index_capacity(quads * 6)
    }

    pub fn build(self) -> Batch {
        let vertex_capacity = self.vertex_capacity.min(MAX_ADDRESSABLE_VERTICES);
        if vertex_capacity < self.vertex_capacity {
            debug!(
                "vertex capacity {} clamped to {vertex_capacity}",
                self.vertex_capacity
            );
        }
        Batch {
            atlas: AtlasTexture::new(self.atlas_size, self.atlas_format),
            vertices: vec![Vertex::default(); vertex_capacity],
            indices: vec![0; self.index_capacity],
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The atlas and frame buffers a renderer builds geometry with.
///
/// Created once at renderer start-up and passed by reference to whatever draws; the buffers are
/// sized once and reused every frame.
#[derive(Debug)]
pub struct Batch {
    atlas: AtlasTexture,
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

/// One frame's worth of drawing: a fresh arena over the batch buffers plus the atlas.
pub struct Frame<'a> {
    pub arena: GeometryArena<'a>,
    pub atlas: &'a mut AtlasTexture,
}

impl Frame<'_> {
    pub fn finish(self) -> ArenaUsage {
        self.arena.finish()
    }
}

impl Batch {
    pub fn atlas(&self) -> &AtlasTexture {
        &self.atlas
    }

    pub fn atlas_mut(&mut self) -> &mut AtlasTexture {
        &mut self.atlas
    }

    pub fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_capacity(&self) -> usize {
        self.indices.len()
    }

    /// Starts a frame. Previous geometry is discarded; the atlas keeps its contents.
    pub fn frame(&mut self) -> Frame<'_> {
        Frame {
            arena: GeometryArena::new(&mut self.vertices, &mut self.indices),
            atlas: &mut self.atlas,
        }
    }

    pub fn vertices(&self, usage: ArenaUsage) -> &[Vertex] {
        &self.vertices[..usage.vertices]
    }

    pub fn indices(&self, usage: ArenaUsage) -> &[u16] {
        &self.indices[..usage.indices]
    }

    /// The used part of the vertex buffer, ready to upload.
    pub fn vertex_bytes(&self, usage: ArenaUsage) -> &[u8] {
        bytemuck::cast_slice(self.vertices(usage))
    }

    pub fn index_bytes(&self, usage: ArenaUsage) -> &[u8] {
        bytemuck::cast_slice(self.indices(usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::QuadFace;

    #[test]
    fn defaults() {
        let batch = BatchConfig::default().build();
        assert_eq!(batch.atlas().size(), 1024);
        assert_eq!(batch.atlas().format(), TextureFormat::R8Unorm);
        assert_eq!(batch.vertex_capacity(), 16384);
        assert_eq!(batch.index_capacity(), 24576);
    }

    #[test]
    fn vertex_capacity_fits_u16() {
        let batch = BatchConfig::new().with_vertex_capacity(100_000).build();
        assert_eq!(batch.vertex_capacity(), MAX_ADDRESSABLE_VERTICES);
    }

    #[test]
    fn frames_reuse_buffers() {
        let mut batch = BatchConfig::new().with_quad_capacity(2).build();

        let mut frame = batch.frame();
        frame.arena.allocate::<QuadFace>(2).unwrap();
        assert!(frame.arena.create::<QuadFace>().is_err());
        let usage = frame.finish();
        assert_eq!(batch.index_bytes(usage).len(), 12 * 2);
        assert_eq!(
            batch.vertex_bytes(usage).len(),
            8 * std::mem::size_of::<Vertex>()
        );

        let mut frame = batch.frame();
        assert_eq!(frame.arena.vertices_used(), 0);
        frame.arena.allocate::<QuadFace>(2).unwrap();
        assert_eq!(batch.vertex_capacity(), 8);
    }
}
