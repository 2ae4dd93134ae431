//! Sphere-to-cubemap inverse projection: recover the face and raster cell
//! for a point on (or direction from the center of) the sphere.

use glam::Vec3;

use crate::{CubeFace, FaceCell};

/// Determine which cube face a direction vector projects onto.
///
/// The face is given by the axis with the largest absolute component.
/// Ties between X and another axis go to the other axis, and ties between
/// Y and Z go to Z. A zero vector maps to [`CubeFace::PosZ`].
#[must_use]
pub fn direction_to_face(dir: Vec3) -> CubeFace {
    let ax = dir.x.abs();
    let ay = dir.y.abs();
    let az = dir.z.abs();

    if ax > ay && ax > az {
        if dir.x < 0.0 {
            CubeFace::NegX
        } else {
            CubeFace::PosX
        }
    } else if ax <= ay && ay > az {
        if dir.y < 0.0 {
            CubeFace::NegY
        } else {
            CubeFace::PosY
        }
    } else if dir.z < 0.0 {
        CubeFace::NegZ
    } else {
        CubeFace::PosZ
    }
}

/// Map a point to the raster cell it falls in on a `dim`×`dim` cubemap.
///
/// The in-face coordinates are the two minor components divided by the
/// dominant one, mapped from `[-1, 1]` onto `[0, dim)` and rounded to the
/// nearest cell (ties to even). Results are clamped into the raster: the
/// rounding occasionally lands one past the last row or column at face
/// boundaries, and those cells are folded back onto the edge.
#[must_use]
pub fn point_to_cell(p: Vec3, dim: usize) -> FaceCell {
    let face = direction_to_face(p);
    let d = p.dot(face.normal());
    let half = dim as f32 * 0.5;

    let s = p.dot(face.column_axis()) / d;
    let t = p.dot(face.row_axis()) / d;

    let col = (s * half + half).round_ties_even();
    let row = (t * half + half).round_ties_even();

    // `as` saturates and sends NaN (degenerate zero vector) to 0.
    FaceCell::clamped(face, row as i64, col as i64, dim)
}
