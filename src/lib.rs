pub mod arena;
pub mod atlas;
pub mod batch;
pub mod color;
pub mod error;
pub mod geometry;
pub mod shapes;
pub mod texture;

pub use arena::{ArenaUsage, GeometryArena, MeshSlot};
pub use atlas::{AtlasAllocator, AtlasNode, Region, UvRect};
pub use batch::{Batch, BatchConfig, Frame};
pub use color::Color;
pub use error::{Error, Result};
pub use geometry::{Anchor, Extent2D, Extent3D, Face, QuadFace, TriangleFace, Vertex};
pub use texture::{AtlasTexture, TextureFormat};

// a frame goes:
// - pixels for glyphs/icons go into the atlas texture, which hands back a pixel region
// - region.uv(size) gives the texture coordinates for the quad that samples it
// - shapes:: functions write vertices into the frame's arena, which writes the indices
// - the renderer uploads vertex_bytes/index_bytes and draws the whole thing indexed
//
// nothing here talks to the gpu. the arena only ever writes into storage it was given,
// so the buffer sizes the renderer allocates up front never change.
