//! Immediate-mode outline and fill helpers
//!
//! Each helper emits exactly one primitive batch. Vertices are offset by
//! `position` and every vertex carries `color`.

use crate::foundation::math::{Vec2, Vec3};
use crate::platform::{Batcher, Color, Primitive};

fn emit_batch(batcher: &mut dyn Batcher, primitive: Primitive, vertices: impl Iterator<Item = Vec3>, color: Color) {
    batcher.begin(primitive);
    for vertex in vertices {
        batcher.vertex(vertex);
        batcher.color(color);
    }
    batcher.end();
}

fn lift(vertex: &Vec2, position: Vec2) -> Vec3 {
    let moved = vertex + position;
    Vec3::new(moved.x, moved.y, 0.0)
}

/// Outline a 2D polygon as a closed line loop
pub fn trace_polygon(batcher: &mut dyn Batcher, vertices: &[Vec2], position: Vec2, color: Color) {
    emit_batch(
        batcher,
        Primitive::LineLoop,
        vertices.iter().map(|vertex| lift(vertex, position)),
        color,
    );
}

/// Fill a convex 2D polygon as a triangle fan
pub fn fill_polygon(batcher: &mut dyn Batcher, vertices: &[Vec2], position: Vec2, color: Color) {
    emit_batch(
        batcher,
        Primitive::TriangleFan,
        vertices.iter().map(|vertex| lift(vertex, position)),
        color,
    );
}

/// Outline every triangle of a triangle strip as one line strip.
///
/// Triangle `i` is emitted as `(i, i + 2, i + 1)` for even `i` and
/// `(i, i + 1, i + 2)` for odd `i`, so all outlines share one winding.
pub fn trace_triangle_strip(batcher: &mut dyn Batcher, vertices: &[Vec3], position: Vec3, color: Color) {
    let outline = vertices.windows(3).enumerate().flat_map(|(index, triangle)| {
        let order = if index % 2 == 0 { [0, 2, 1] } else { [0, 1, 2] };
        order.map(|corner| triangle[corner] + position)
    });
    emit_batch(batcher, Primitive::LineStrip, outline, color);
}

/// Fill a triangle strip
pub fn fill_triangle_strip(batcher: &mut dyn Batcher, vertices: &[Vec3], position: Vec3, color: Color) {
    emit_batch(
        batcher,
        Primitive::TriangleStrip,
        vertices.iter().map(|vertex| vertex + position),
        color,
    );
}
