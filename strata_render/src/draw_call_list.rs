//! The draw calls the renderer currently iterates.
//!
//! The list is only ever replaced as a whole. Readers take the lock through
//! [`DrawCallList::lock`] and keep it for their whole traversal, so they see either
//! the previous or the next set, never a mix.

use crate::draw_call::DrawCall;
use crate::gpu::GpuBackend;
use parking_lot::{Mutex, MutexGuard};
use std::ops::Deref;
use tracing::trace;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DrawCallStats {
    pub draw_calls: usize,
    pub vertices: usize,
    pub triangles: usize,
}

impl DrawCallStats {
    fn compute<B: GpuBackend>(draw_calls: &[DrawCall<B>]) -> Self {
        draw_calls.iter().fold(
            DrawCallStats {
                draw_calls: draw_calls.len(),
                ..Default::default()
            },
            |mut stats, call| {
                stats.vertices += call.vertex_count;
                stats.triangles += call.triangle_count;
                stats
            },
        )
    }
}

struct DrawCallListInner<B: GpuBackend> {
    draw_calls: Vec<DrawCall<B>>,
    stats: DrawCallStats,
    dirty: bool,
}

impl<B: GpuBackend> DrawCallListInner<B> {
    fn stats(&mut self) -> DrawCallStats {
        if self.dirty {
            self.stats = DrawCallStats::compute(&self.draw_calls);
            self.dirty = false;
        }
        self.stats
    }
}

pub struct DrawCallList<B: GpuBackend> {
    inner: Mutex<DrawCallListInner<B>>,
}

impl<B: GpuBackend> DrawCallList<B> {
    pub fn new() -> Self {
        DrawCallList {
            inner: Mutex::new(DrawCallListInner {
                draw_calls: Vec::new(),
                stats: DrawCallStats::default(),
                dirty: false,
            }),
        }
    }

    /// Replaces every draw call. Statistics are recomputed on the next query.
    pub fn submit_draw_calls(&self, draw_calls: Vec<DrawCall<B>>) {
        let previous = {
            let mut inner = self.inner.lock();
            inner.dirty = true;
            std::mem::replace(&mut inner.draw_calls, draw_calls)
        };
        trace!("Replaced {} draw calls", previous.len());
    }

    pub fn clear(&self) {
        let previous = {
            let mut inner = self.inner.lock();
            inner.stats = DrawCallStats::default();
            inner.dirty = false;
            std::mem::take(&mut inner.draw_calls)
        };
        // released outside the lock
        drop(previous);
    }

    pub fn lock(&self) -> DrawCallListGuard<'_, B> {
        DrawCallListGuard {
            inner: self.inner.lock(),
        }
    }

    pub fn stats(&self) -> DrawCallStats {
        self.inner.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().draw_calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().draw_calls.is_empty()
    }
}

impl<B: GpuBackend> Default for DrawCallList<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the list lock. Don't keep it across frames, the draw-call worker waits on it.
pub struct DrawCallListGuard<'a, B: GpuBackend> {
    inner: MutexGuard<'a, DrawCallListInner<B>>,
}

impl<B: GpuBackend> DrawCallListGuard<'_, B> {
    pub fn draw_calls(&self) -> &[DrawCall<B>] {
        &self.inner.draw_calls
    }

    pub fn stats(&mut self) -> DrawCallStats {
        self.inner.stats()
    }
}

impl<B: GpuBackend> Deref for DrawCallListGuard<'_, B> {
    type Target = [DrawCall<B>];

    fn deref(&self) -> &Self::Target {
        self.draw_calls()
    }
}
