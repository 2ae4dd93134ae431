//! Structured fork/join over disjoint slices.
//!
//! Every phase of an iteration fans out to scoped worker threads and joins
//! them before returning. Work is handed out as `&mut` sub-slices produced by
//! `split_at_mut`/`chunks_mut`, so each worker is the only writer of its
//! partition and no locks are needed.

use std::ops::Range;
use std::thread;

use gasgiant_cubesphere::CubeFace;

/// Number of workers to use for particle advection.
///
/// An override is honoured only when it is positive and below the CPU count;
/// anything else falls back to one worker per CPU.
pub fn resolve_thread_count(requested: Option<usize>, cpus: usize) -> usize {
    let cpus = cpus.max(1);
    match requested {
        Some(n) if n > 0 && n < cpus => n,
        _ => cpus,
    }
}

/// Split `0..len` into `parts` contiguous ranges of `len / parts` items, the
/// last range absorbing the remainder.
pub fn partition_ranges(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let chunk = len / parts;
    (0..parts)
        .map(|t| {
            let start = t * chunk;
            let end = if t + 1 == parts { len } else { start + chunk };
            start..end
        })
        .collect()
}

/// Fixed-size pool description for range-partitioned work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerPool {
    threads: usize,
}

impl WorkerPool {
    /// Pool sized from the CPU count, with an optional override.
    pub fn new(requested: Option<usize>) -> Self {
        Self::with_threads(resolve_thread_count(requested, num_cpus::get()))
    }

    /// Pool with exactly `threads` workers (at least one).
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    /// Number of partitions work is split into.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `f` over `threads` contiguous partitions of `items` in parallel and
    /// wait for all of them.
    ///
    /// A worker that cannot be spawned is logged and its partition is left
    /// untouched for this call.
    pub fn for_each_partition<T, F>(&self, name: &str, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(&mut [T]) + Sync,
    {
        let ranges = partition_ranges(items.len(), self.threads);
        let f = &f;
        thread::scope(|scope| {
            let mut rest = items;
            for (t, range) in ranges.into_iter().enumerate() {
                let (part, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                rest = tail;
                let spawned = thread::Builder::new()
                    .name(format!("{name}-{t}"))
                    .spawn_scoped(scope, move || f(part));
                if let Err(err) = spawned {
                    tracing::error!(
                        worker = t,
                        items = range.len(),
                        "failed to spawn {name} worker: {err}"
                    );
                }
            }
        });
    }
}

/// Run `f` once per cube face, each on its own thread, and wait for all six.
///
/// `faces` yields the per-face work items in face index order (for example
/// `chunks_mut(dim * dim)` of a face-major buffer); extra items are ignored.
pub fn for_each_face<I, T, F>(name: &str, faces: I, f: F)
where
    I: IntoIterator<Item = T>,
    T: Send,
    F: Fn(CubeFace, T) + Sync,
{
    let f = &f;
    thread::scope(|scope| {
        for (face, item) in CubeFace::ALL.into_iter().zip(faces) {
            let spawned = thread::Builder::new()
                .name(format!("{name}-face{}", face.index()))
                .spawn_scoped(scope, move || f(face, item));
            if let Err(err) = spawned {
                tracing::error!(face = face.index(), "failed to spawn {name} worker: {err}");
            }
        }
    });
}
