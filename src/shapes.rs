use nalgebra::{Point2, Rotation2, Vector2};

use crate::{
    arena::{GeometryArena, MeshSlot},
    atlas::UvRect,
    color::Color,
    error::Result,
    geometry::{Anchor, Extent2D, Extent3D, Face, QuadFace, Vertex},
};

/// Fewest segments [`draw_arc`] accepts.
pub const MIN_ARC_POINTS: usize = 8;

fn corners(extent: &Extent2D, anchor: Anchor) -> [Point2<f32>; 4] {
    let top_left = extent.top_left(anchor);
    let right = top_left.x + extent.width;
    let bottom = top_left.y + extent.height;
    [
        top_left,
        Point2::new(right, top_left.y),
        Point2::new(right, bottom),
        Point2::new(top_left.x, bottom),
    ]
}

/// Positions of a quad for `extent` read through `anchor`. UVs and color are left zeroed.
pub fn generate_quad(extent: Extent2D, anchor: Anchor) -> QuadFace {
    let mut quad = QuadFace::default();
    for (vertex, corner) in quad.0.iter_mut().zip(corners(&extent, anchor)) {
        vertex.set_position(corner);
    }
    quad
}

/// Moves an already allocated quad. UVs and color are kept, so a widget can be relaid out without
/// touching its allocation.
pub fn write_quad(extent: Extent3D, anchor: Anchor, out: &mut QuadFace) {
    for (vertex, corner) in out.0.iter_mut().zip(corners(&extent.flat(), anchor)) {
        vertex.set_position(corner);
        vertex.z = extent.z;
    }
}

pub fn draw_quad<'r>(
    arena: &'r mut GeometryArena<'_>,
    extent: Extent2D,
    anchor: Anchor,
    color: Color,
) -> Result<&'r mut QuadFace> {
    let quad = arena.create::<QuadFace>()?;
    *quad = generate_quad(extent, anchor);
    quad.set_color(color);
    Ok(quad)
}

/// A quad sampling `uv` of the atlas, typically `region.uv(atlas_size)` of a reserved region.
pub fn draw_textured_quad<'r>(
    arena: &'r mut GeometryArena<'_>,
    extent: Extent2D,
    anchor: Anchor,
    uv: UvRect,
    color: Color,
) -> Result<&'r mut QuadFace> {
    let quad = draw_quad(arena, extent, anchor, color)?;
    quad.set_uv(uv);
    Ok(quad)
}

/// Point on the ellipse at `degrees`. Zero points left of the center and positive angles turn
/// upwards, so 0..90 is the top-left quadrant in y-down screen space.
fn perimeter_point(center: Point2<f32>, radius: Vector2<f32>, degrees: f32) -> Point2<f32> {
    let direction = Rotation2::new(degrees.to_radians()) * Vector2::x();
    Point2::new(
        center.x - radius.x * direction.x,
        center.y - radius.y * direction.y,
    )
}

fn fan_size(segments: usize) -> (usize, usize) {
    (segments.saturating_add(2), segments.saturating_mul(3))
}

/// Writes vertices and indices as they are laid out inside a single [`MeshSlot`].
struct SlotWriter<'s, 'a> {
    slot: &'s mut MeshSlot<'a>,
    vertex: usize,
    index: usize,
}

impl<'s, 'a> SlotWriter<'s, 'a> {
    fn new(slot: &'s mut MeshSlot<'a>) -> Self {
        Self {
            slot,
            vertex: 0,
            index: 0,
        }
    }

    fn push_vertex(&mut self, position: Point2<f32>, color: Color) -> u16 {
        let local = self.vertex;
        self.slot.vertices[local] = Vertex {
            x: position.x,
            y: position.y,
            color,
            ..Vertex::default()
        };
        self.vertex += 1;
        self.slot.index(local)
    }

    fn push_triangle(&mut self, a: u16, b: u16, c: u16) {
        self.slot.indices[self.index..self.index + 3].copy_from_slice(&[a, b, c]);
        self.index += 3;
    }

    fn push_quad(&mut self, extent: Extent2D, color: Color) {
        let [tl, tr, br, bl] =
            corners(&extent, Anchor::TopLeft).map(|p| self.push_vertex(p, color));
        self.push_triangle(tl, tr, br);
        self.push_triangle(tl, br, bl);
    }

    /// Center first, then `segments + 1` perimeter points, one `(center, prev, curr)` triangle per
    /// segment.
    fn push_fan(
        &mut self,
        center: Point2<f32>,
        radius: Vector2<f32>,
        color: Color,
        segments: usize,
        rotation_begin: f32,
        rotation_length: f32,
    ) {
        let center_index = self.push_vertex(center, color);
        let step = rotation_length / segments as f32;
        let mut previous = self.push_vertex(perimeter_point(center, radius, rotation_begin), color);
        for k in 1..=segments {
            let degrees = rotation_begin + k as f32 * step;
            let current = self.push_vertex(perimeter_point(center, radius, degrees), color);
            self.push_triangle(center_index, previous, current);
            previous = current;
        }
    }

    fn finish(self) {
        debug_assert_eq!(self.vertex, self.slot.vertices.len());
        debug_assert_eq!(self.index, self.slot.indices.len());
    }
}

/// Fan-tessellated elliptic arc. Angles are in degrees; a negative `rotation_length` sweeps
/// backwards.
///
/// Emits `point_count + 2` vertices and `3 * point_count` indices.
///
/// # Panics
///
/// If `point_count` is below [`MIN_ARC_POINTS`].
pub fn draw_arc(
    arena: &mut GeometryArena<'_>,
    center: Point2<f32>,
    radius: Vector2<f32>,
    color: Color,
    point_count: usize,
    rotation_begin: f32,
    rotation_length: f32,
) -> Result<()> {
    assert!(
        point_count >= MIN_ARC_POINTS,
        "arcs need at least {MIN_ARC_POINTS} points, got {point_count}"
    );
    let (vertex_count, index_count) = fan_size(point_count);
    let mut slot = arena.reserve_mesh(vertex_count, index_count)?;
    let mut writer = SlotWriter::new(&mut slot);
    writer.push_fan(
        center,
        radius,
        color,
        point_count,
        rotation_begin,
        rotation_length,
    );
    writer.finish();
    Ok(())
}

pub fn draw_circle(
    arena: &mut GeometryArena<'_>,
    center: Point2<f32>,
    radius: Vector2<f32>,
    color: Color,
    point_count: usize,
) -> Result<()> {
    draw_arc(arena, center, radius, color, point_count, 0.0, 360.0)
}

/// Three bands plus a quarter fan in each corner, all in one allocation.
///
/// The radius is clamped to half the shorter side. Each corner gets `floor(radius)` segments;
/// below one pixel the corners are left out.
pub fn draw_rounded_rect(
    arena: &mut GeometryArena<'_>,
    extent: Extent2D,
    anchor: Anchor,
    radius: f32,
    color: Color,
) -> Result<()> {
    let max_radius = (extent.width.min(extent.height) / 2.0).max(0.0);
    let radius = radius.clamp(0.0, max_radius);
    let points_per_curve = radius.floor() as usize;
    let (fan_vertices, fan_indices) = if points_per_curve > 0 {
        fan_size(points_per_curve)
    } else {
        (0, 0)
    };

    let mut slot = arena.reserve_mesh(
        fan_vertices.saturating_mul(4).saturating_add(12),
        fan_indices.saturating_mul(4).saturating_add(18),
    )?;
    let mut writer = SlotWriter::new(&mut slot);

    let origin = extent.top_left(anchor);
    let (left, top) = (origin.x, origin.y);
    let (right, bottom) = (left + extent.width, top + extent.height);
    let inner_width = extent.width - 2.0 * radius;

    writer.push_quad(
        Extent2D::new(left, top + radius, extent.width, extent.height - 2.0 * radius),
        color,
    );
    writer.push_quad(Extent2D::new(left + radius, top, inner_width, radius), color);
    writer.push_quad(
        Extent2D::new(left + radius, bottom - radius, inner_width, radius),
        color,
    );

    if points_per_curve > 0 {
        let corner_radius = Vector2::new(radius, radius);
        // (center, start angle, sweep): top_left, top_right, bottom_left, bottom_right
        let corner_fans = [
            (Point2::new(left + radius, top + radius), 0.0, 90.0),
            (Point2::new(right - radius, top + radius), 180.0, -90.0),
            (Point2::new(left + radius, bottom - radius), 0.0, -90.0),
            (Point2::new(right - radius, bottom - radius), 180.0, 90.0),
        ];
        for (center, begin, sweep) in corner_fans {
            writer.push_fan(center, corner_radius, color, points_per_curve, begin, sweep);
        }
    }

    writer.finish();
    Ok(())
}

/// An X made of two diagonal strokes, `line_width` thick measured along the axes.
pub fn draw_cross<'r>(
    arena: &'r mut GeometryArena<'_>,
    extent: Extent2D,
    anchor: Anchor,
    line_width: f32,
    color: Color,
) -> Result<&'r mut [QuadFace]> {
    let strokes = arena.allocate::<QuadFace>(2)?;

    let origin = extent.top_left(anchor);
    let (left, top) = (origin.x, origin.y);
    let (right, bottom) = (left + extent.width, top + extent.height);
    let half = line_width / 2.0;

    let falling = [
        Point2::new(left + half, top),
        Point2::new(right, bottom - half),
        Point2::new(right - half, bottom),
        Point2::new(left, top + half),
    ];
    let rising = [
        Point2::new(right - half, top),
        Point2::new(right, top + half),
        Point2::new(left + half, bottom),
        Point2::new(left, bottom - half),
    ];

    for (stroke, points) in strokes.iter_mut().zip([falling, rising]) {
        for (vertex, point) in stroke.0.iter_mut().zip(points) {
            vertex.set_position(point);
            vertex.color = color;
        }
    }
    Ok(strokes)
}

/// A rectangular outline: full-width top and bottom bands, left and right bands between them.
pub fn draw_box<'r>(
    arena: &'r mut GeometryArena<'_>,
    extent: Extent2D,
    anchor: Anchor,
    border_width: f32,
    color: Color,
) -> Result<&'r mut [QuadFace]> {
    let sides = arena.allocate::<QuadFace>(4)?;

    let origin = extent.top_left(anchor);
    let (left, top) = (origin.x, origin.y);
    let inner_height = extent.height - 2.0 * border_width;
    let bands = [
        Extent2D::new(left, top, extent.width, border_width),
        Extent2D::new(
            left,
            top + extent.height - border_width,
            extent.width,
            border_width,
        ),
        Extent2D::new(left, top + border_width, border_width, inner_height),
        Extent2D::new(
            left + extent.width - border_width,
            top + border_width,
            border_width,
            inner_height,
        ),
    ];

    for (side, band) in sides.iter_mut().zip(bands) {
        *side = generate_quad(band, Anchor::TopLeft);
        side.set_color(color);
    }
    Ok(sides)
}
