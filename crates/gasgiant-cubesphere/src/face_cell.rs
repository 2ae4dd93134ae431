//! Raster cell addresses on a cubemap face.

use crate::{CubeFace, FACE_COUNT};

/// One pixel location on one of the six square cubemap rasters.
///
/// `row` runs top to bottom and `col` left to right when the face image is
/// viewed normally. The resolution is not stored; the same sphere point maps
/// to different cells at the velocity-field and output resolutions.
///
/// Coordinates are `u32` so a cell packs into 12 bytes; every particle
/// carries one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceCell {
    /// Which cube face this cell lies on.
    pub face: CubeFace,
    /// Row in `[0, dim)`.
    pub row: u32,
    /// Column in `[0, dim)`.
    pub col: u32,
}

impl FaceCell {
    /// Construct a cell, clamping signed `row`/`col` into `[0, dim - 1]`.
    #[must_use]
    pub fn clamped(face: CubeFace, row: i64, col: i64, dim: usize) -> Self {
        let max = (dim.saturating_sub(1) as i64).min(i64::from(u32::MAX));
        Self {
            face,
            row: row.clamp(0, max) as u32,
            col: col.clamp(0, max) as u32,
        }
    }

    /// Returns `true` if the cell lies inside a `dim`×`dim` raster.
    #[inline]
    #[must_use]
    pub fn in_bounds(&self, dim: usize) -> bool {
        (self.row as usize) < dim && (self.col as usize) < dim
    }

    /// Offset of this cell in a face-major flat buffer of `FACE_COUNT * dim * dim`.
    #[inline]
    #[must_use]
    pub fn flat_index(&self, dim: usize) -> usize {
        debug_assert!(self.in_bounds(dim), "cell {self:?} outside {dim}x{dim}");
        (self.face.index() * dim + self.row as usize) * dim + self.col as usize
    }

    /// Total number of cells in a six-face cubemap of resolution `dim`.
    #[must_use]
    pub fn cubemap_len(dim: usize) -> usize {
        FACE_COUNT * dim * dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_cell_clamping() {
        let cell = FaceCell::clamped(CubeFace::PosX, -3, 1024, 1024);
        assert_eq!(cell.row, 0);
        assert_eq!(cell.col, 1023);
    }

    #[test]
    fn test_face_cell_valid_range() {
        let cell = FaceCell::clamped(CubeFace::NegZ, 5, 7, 16);
        assert_eq!((cell.face, cell.row, cell.col), (CubeFace::NegZ, 5, 7));
        assert!(cell.in_bounds(16));
        assert!(!cell.in_bounds(7));
    }

    #[test]
    fn test_cell_is_compact() {
        assert_eq!(std::mem::size_of::<FaceCell>(), 12);
    }

    #[test]
    fn test_flat_index_is_face_major() {
        let dim = 4;
        let first = FaceCell::clamped(CubeFace::PosZ, 0, 0, dim);
        let last = FaceCell::clamped(CubeFace::NegY, 3, 3, dim);
        assert_eq!(first.flat_index(dim), 0);
        assert_eq!(last.flat_index(dim), FaceCell::cubemap_len(dim) - 1);

        let cell = FaceCell::clamped(CubeFace::PosX, 2, 1, dim);
        assert_eq!(cell.flat_index(dim), dim * dim + 2 * dim + 1);
    }
}
