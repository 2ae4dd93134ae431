//! Run hooks that write face images and velocity-field checkpoints.

use std::path::PathBuf;

use gasgiant_flow::{CheckpointStore, VelocityField};
use gasgiant_sim::{OutputFace, RunHooks};

/// Writes `<prefix><face>.png` for each saved frame and dumps every
/// recomputed field to the checkpoint store, if any.
pub struct FrameWriter {
    prefix: String,
    checkpoint: Option<CheckpointStore>,
}

impl FrameWriter {
    pub fn new(prefix: impl Into<String>, checkpoint: Option<CheckpointStore>) -> Self {
        Self {
            prefix: prefix.into(),
            checkpoint,
        }
    }

    /// Output path of face `index`.
    pub fn face_path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("{}{index}.png", self.prefix))
    }

    /// Write all faces, logging and skipping any that fail. Returns the
    /// number written.
    pub fn write_faces(&self, faces: &[OutputFace]) -> usize {
        let mut written = 0;
        for (index, face) in faces.iter().enumerate() {
            let path = self.face_path(index);
            match face.image().save(&path) {
                Ok(()) => written += 1,
                Err(err) => tracing::warn!(path = %path.display(), "Failed to write face image: {err}"),
            }
        }
        written
    }
}

impl RunHooks for FrameWriter {
    fn save_frame(&mut self, iteration: u32, faces: &[OutputFace]) {
        let written = self.write_faces(faces);
        tracing::debug!(iteration, written, "Saved output images");
    }

    fn field_recomputed(&mut self, step: u32, field: &VelocityField) {
        if let Some(store) = &self.checkpoint {
            store.dump(field, Some(step));
        }
    }
}
