//! Cached per-face grid of flow vectors.

use gasgiant_cubesphere::{CubeFace, FaceCell, point_to_cell};
use glam::Vec3;

use crate::{CurlVelocityGenerator, for_each_face};

/// One flow vector per cell of six `dim`×`dim` face grids.
///
/// Stored face-major in a single heap buffer and indexed by
/// `(face, row, col)`. The field is only ever rebuilt wholesale by
/// [`VelocityField::recompute`]; nothing updates individual cells while it
/// is being sampled.
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityField {
    dim: usize,
    cells: Vec<Vec3>,
}

impl VelocityField {
    /// Bytes per stored vector in the checkpoint format.
    const VECTOR_BYTES: usize = std::mem::size_of::<Vec3>();

    /// A zeroed field at resolution `dim` (at least 1).
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self {
            dim,
            cells: vec![Vec3::ZERO; FaceCell::cubemap_len(dim)],
        }
    }

    /// Per-face resolution.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// All flow vectors, face-major.
    pub fn cells(&self) -> &[Vec3] {
        &self.cells
    }

    /// Flow vectors of one face, row-major.
    pub fn face(&self, face: CubeFace) -> &[Vec3] {
        let n = self.dim * self.dim;
        &self.cells[face.index() * n..(face.index() + 1) * n]
    }

    /// Flow vector stored at `cell`.
    pub fn get(&self, cell: FaceCell) -> Vec3 {
        self.cells[cell.flat_index(self.dim)]
    }

    /// Overwrite the flow vector at `cell`.
    pub fn set(&mut self, cell: FaceCell, v: Vec3) {
        let index = cell.flat_index(self.dim);
        self.cells[index] = v;
    }

    /// Nearest-cell lookup of the flow at a point on (or off) the sphere.
    #[inline]
    pub fn sample(&self, p: Vec3) -> Vec3 {
        self.get(point_to_cell(p, self.dim))
    }

    /// Rebuild every cell from `generator` at time parameter `w`, one worker
    /// per face.
    pub fn recompute(&mut self, generator: &CurlVelocityGenerator, w: f32) {
        let dim = self.dim;
        let started = std::time::Instant::now();
        tracing::info!(dim, w, "Calculating velocity field");

        for_each_face("velocity-field", self.cells.chunks_mut(dim * dim), |face, cells| {
            for row in 0..dim {
                for col in 0..dim {
                    cells[row * dim + col] = generator.velocity_at(face, row, col, dim, w);
                }
            }
        });

        tracing::info!(
            elapsed_s = started.elapsed().as_secs_f32(),
            "velocity field computed"
        );
    }

    /// Byte length of a checkpointed field at resolution `dim`.
    pub fn byte_len(dim: usize) -> usize {
        FaceCell::cubemap_len(dim) * Self::VECTOR_BYTES
    }

    /// Checkpoint image of all six grids: native-endian `f32` triples,
    /// face-major, row-major within a face. Borrows the field's own storage.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }

    /// Writable view of the same bytes, for reading a checkpoint in place.
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.cells)
    }
}
