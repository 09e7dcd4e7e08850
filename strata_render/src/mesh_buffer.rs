//! Ordering mesh buffers from any thread, creating them on the GPU thread.
//!
//! [`MeshBufferRequestList::request_mesh_buffer`] hands out a [`MeshBufferTicket`]
//! right away. The buffer behind the ticket only exists after the GPU thread ran
//! [`MeshBufferRequestList::process_requests`]. A ticket may be dropped before that
//! happens; the finished buffer is then discarded.

use crate::gpu::{GpuBackend, GpuThread};
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use strata_asset::Mesh;
use tracing::{error, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshRequestId(u64);

impl Display for MeshRequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct MeshBufferRequest<B: GpuBackend> {
    id: MeshRequestId,
    mesh: Mesh,
    reply: Sender<Arc<B::MeshBuffer>>,
}

/// Receiving end of one mesh buffer request.
pub struct MeshBufferTicket<B: GpuBackend> {
    id: MeshRequestId,
    receiver: Receiver<Arc<B::MeshBuffer>>,
    buffer: OnceLock<Arc<B::MeshBuffer>>,
}

impl<B: GpuBackend> MeshBufferTicket<B> {
    pub fn id(&self) -> MeshRequestId {
        self.id
    }

    /// The buffer, once the GPU thread created it.
    pub fn get(&self) -> Option<&Arc<B::MeshBuffer>> {
        if let Some(buffer) = self.buffer.get() {
            return Some(buffer);
        }

        match self.receiver.try_recv() {
            Ok(buffer) => Some(self.buffer.get_or_init(|| buffer)),
            Err(_) => self.buffer.get(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.get().is_some()
    }

    /// The GPU thread gave up on this request, it will never become ready.
    pub fn is_failed(&self) -> bool {
        self.buffer.get().is_none()
            && matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }
}

impl<B: GpuBackend> Debug for MeshBufferTicket<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshBufferTicket")
            .field("id", &self.id)
            .field("ready", &self.buffer.get().is_some())
            .finish()
    }
}

pub struct MeshBufferRequestList<B: GpuBackend> {
    queue: Mutex<VecDeque<MeshBufferRequest<B>>>,
    next_id: AtomicU64,
}

impl<B: GpuBackend> MeshBufferRequestList<B> {
    pub fn new() -> Self {
        MeshBufferRequestList {
            queue: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn request_mesh_buffer(&self, mesh: Mesh) -> MeshBufferTicket<B> {
        let id = MeshRequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (reply, receiver) = bounded(1);

        self.queue
            .lock()
            .push_back(MeshBufferRequest { id, mesh, reply });

        MeshBufferTicket {
            id,
            receiver,
            buffer: OnceLock::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Creates every queued buffer. Returns how many buffers were created.
    #[profiling::function]
    pub fn process_requests(&self, _gpu: &GpuThread, backend: &B) -> usize {
        let requests = std::mem::take(&mut *self.queue.lock());

        let mut created = 0;
        for MeshBufferRequest { id, mesh, reply } in requests {
            let buffer = match backend.create_mesh_buffer(&mesh) {
                Ok(buffer) => Arc::new(buffer),
                Err(e) => {
                    error!("Failed to create mesh buffer {id}: {e}");
                    continue;
                }
            };
            created += 1;

            if reply.send(buffer).is_err() {
                trace!("Mesh buffer {id} was no longer wanted");
            }
        }

        created
    }
}

impl<B: GpuBackend> Default for MeshBufferRequestList<B> {
    fn default() -> Self {
        Self::new()
    }
}
