use std::fmt::Debug;

use bytemuck::{Pod, Zeroable};
use nalgebra::Point2;

use crate::{atlas::UvRect, color::Color};

/// The generic render vertex. `z` orders draw layers.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub tx: f32,
    pub ty: f32,
    pub color: Color,
}

impl Vertex {
    pub fn position(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point2<f32>) {
        self.x = position.x;
        self.y = position.y;
    }
}

/// A fixed-size group of vertices and the triangles joining them.
///
/// Faces are laid out back to back in vertex storage; the arena views a run of `VERTEX_COUNT`
/// vertices as one face through a checked cast, so implementors must be exactly
/// `[Vertex; VERTEX_COUNT]` in memory.
pub trait Face: Pod + Debug {
    const VERTEX_COUNT: usize;

    /// Triangle indices relative to the face's first vertex.
    const INDEX_PATTERN: &'static [u16];

    fn vertices(&self) -> &[Vertex];

    fn vertices_mut(&mut self) -> &mut [Vertex];

    fn set_color(&mut self, color: Color) {
        for vertex in self.vertices_mut() {
            vertex.color = color;
        }
    }

    fn set_z(&mut self, z: f32) {
        for vertex in self.vertices_mut() {
            vertex.z = z;
        }
    }
}

/// Vertices in order top-left, top-right, bottom-right, bottom-left.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct QuadFace(pub [Vertex; 4]);

impl QuadFace {
    pub const TOP_LEFT: usize = 0;
    pub const TOP_RIGHT: usize = 1;
    pub const BOTTOM_RIGHT: usize = 2;
    pub const BOTTOM_LEFT: usize = 3;

    pub fn set_uv(&mut self, uv: UvRect) {
        let corners = [
            (uv.left, uv.top),
            (uv.right, uv.top),
            (uv.right, uv.bottom),
            (uv.left, uv.bottom),
        ];
        for (vertex, (tx, ty)) in self.0.iter_mut().zip(corners) {
            vertex.tx = tx;
            vertex.ty = ty;
        }
    }
}

impl Face for QuadFace {
    const VERTEX_COUNT: usize = 4;
    const INDEX_PATTERN: &'static [u16] = &[0, 1, 2, 0, 2, 3];

    fn vertices(&self) -> &[Vertex] {
        &self.0
    }

    fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.0
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TriangleFace(pub [Vertex; 3]);

impl Face for TriangleFace {
    const VERTEX_COUNT: usize = 3;
    const INDEX_PATTERN: &'static [u16] = &[0, 1, 2];

    fn vertices(&self) -> &[Vertex] {
        &self.0
    }

    fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.0
    }
}

/// Which point of a rectangle the supplied `(x, y)` names. Screen space, y grows downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Anchor {
    #[default]
    TopLeft,
    BottomLeft,
    BottomRight,
    Center,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extent2D {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Extent2D {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner of the rectangle once `(x, y)` is read through `anchor`.
    pub fn top_left(&self, anchor: Anchor) -> Point2<f32> {
        match anchor {
            Anchor::TopLeft => Point2::new(self.x, self.y),
            Anchor::BottomLeft => Point2::new(self.x, self.y - self.height),
            Anchor::BottomRight => Point2::new(self.x - self.width, self.y - self.height),
            Anchor::Center => Point2::new(self.x - self.width / 2.0, self.y - self.height / 2.0),
        }
    }

    pub fn with_z(self, z: f32) -> Extent3D {
        Extent3D {
            x: self.x,
            y: self.y,
            z,
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extent3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub width: f32,
    pub height: f32,
}

impl Extent3D {
    pub fn flat(&self) -> Extent2D {
        Extent2D::new(self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_match_vertex_layout() {
        assert_eq!(
            std::mem::size_of::<QuadFace>(),
            QuadFace::VERTEX_COUNT * std::mem::size_of::<Vertex>()
        );
        assert_eq!(
            std::mem::size_of::<TriangleFace>(),
            TriangleFace::VERTEX_COUNT * std::mem::size_of::<Vertex>()
        );
        assert_eq!(std::mem::size_of::<Vertex>(), 9 * 4);
    }

    #[test]
    fn anchors_resolve_to_top_left() {
        let extent = Extent2D::new(10.0, 20.0, 4.0, 6.0);
        assert_eq!(extent.top_left(Anchor::TopLeft), Point2::new(10.0, 20.0));
        assert_eq!(extent.top_left(Anchor::BottomLeft), Point2::new(10.0, 14.0));
        assert_eq!(extent.top_left(Anchor::BottomRight), Point2::new(6.0, 14.0));
        assert_eq!(extent.top_left(Anchor::Center), Point2::new(8.0, 17.0));
    }

    #[test]
    fn uv_follows_corner_order() {
        let mut quad = QuadFace::default();
        quad.set_uv(UvRect {
            left: 0.1,
            top: 0.2,
            right: 0.3,
            bottom: 0.4,
        });
        let uvs: Vec<_> = quad.0.iter().map(|v| (v.tx, v.ty)).collect();
        assert_eq!(uvs, vec![(0.1, 0.2), (0.3, 0.2), (0.3, 0.4), (0.1, 0.4)]);
    }
}
