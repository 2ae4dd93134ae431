//! The six faces of a cubemap and their outward axes.

use glam::Vec3;

/// Number of faces in a cubemap. Every per-face fan-out in the workspace is
/// sized by this.
pub const FACE_COUNT: usize = 6;

/// The six faces of the cubemap, in output-image order.
///
/// The discriminant is the face index used in file names (`<prefix>N.png`)
/// and in flat per-face buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CubeFace {
    /// +Z face
    PosZ = 0,
    /// +X face
    PosX = 1,
    /// −Z face
    NegZ = 2,
    /// −X face
    NegX = 3,
    /// +Y face
    PosY = 4,
    /// −Y face
    NegY = 5,
}

impl CubeFace {
    /// All six faces in index order.
    pub const ALL: [CubeFace; FACE_COUNT] = [
        CubeFace::PosZ,
        CubeFace::PosX,
        CubeFace::NegZ,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
    ];

    /// Index of this face in `0..FACE_COUNT`.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Face for an index, clamping out-of-range values into `0..FACE_COUNT`.
    #[must_use]
    pub fn from_index(index: usize) -> CubeFace {
        Self::ALL[index.min(FACE_COUNT - 1)]
    }

    /// Outward-pointing unit normal for this face.
    #[must_use]
    pub fn normal(self) -> Vec3 {
        match self {
            CubeFace::PosX => Vec3::X,
            CubeFace::NegX => Vec3::NEG_X,
            CubeFace::PosY => Vec3::Y,
            CubeFace::NegY => Vec3::NEG_Y,
            CubeFace::PosZ => Vec3::Z,
            CubeFace::NegZ => Vec3::NEG_Z,
        }
    }

    /// Direction of increasing column on this face.
    #[must_use]
    pub fn column_axis(self) -> Vec3 {
        match self {
            CubeFace::PosZ => Vec3::X,
            CubeFace::PosX => Vec3::NEG_Z,
            CubeFace::NegZ => Vec3::NEG_X,
            CubeFace::NegX => Vec3::Z,
            CubeFace::PosY => Vec3::X,
            CubeFace::NegY => Vec3::X,
        }
    }

    /// Direction of increasing row on this face.
    #[must_use]
    pub fn row_axis(self) -> Vec3 {
        match self {
            CubeFace::PosZ | CubeFace::PosX | CubeFace::NegZ | CubeFace::NegX => Vec3::NEG_Y,
            CubeFace::PosY => Vec3::Z,
            CubeFace::NegY => Vec3::NEG_Z,
        }
    }
}
