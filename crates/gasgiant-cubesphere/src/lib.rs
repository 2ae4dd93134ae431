//! Cube-sphere geometry: the six cubemap faces and the mapping between raster
//! cells on those faces and points on a sphere.

mod cube_face;
mod face_cell;
mod inverse;
mod projection;

pub use cube_face::{CubeFace, FACE_COUNT};
pub use face_cell::FaceCell;
pub use inverse::{direction_to_face, point_to_cell};
pub use projection::{cell_to_cube_point, cell_to_point};
