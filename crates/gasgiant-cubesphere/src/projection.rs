//! Cubemap cell to sphere projection.

use glam::Vec3;

use crate::CubeFace;

/// Point on the surface of the cube of half-extent `0.5` for a raster cell.
///
/// The face axis is fixed at `±0.5`; the other two coordinates are linear in
/// `row` and `col` as `(n - dim/2) / dim`, with integer `dim/2`.
#[inline]
#[must_use]
pub fn cell_to_cube_point(face: CubeFace, row: usize, col: usize, dim: usize) -> Vec3 {
    let half = (dim / 2) as f32;
    let fdim = dim as f32;
    let s = (col as f32 - half) / fdim;
    let t = (row as f32 - half) / fdim;

    0.5 * face.normal() + s * face.column_axis() + t * face.row_axis()
}

/// Project a raster cell onto the unit sphere.
#[inline]
#[must_use]
pub fn cell_to_point(face: CubeFace, row: usize, col: usize, dim: usize) -> Vec3 {
    cell_to_cube_point(face, row, col, dim).normalize()
}
