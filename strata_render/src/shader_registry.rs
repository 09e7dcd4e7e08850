//! Compiled shader programs keyed by their source text.
//!
//! The key is the xxh3 hash of every present stage source concatenated in
//! [`ShaderStage::ORDER`](strata_asset::ShaderStage::ORDER). Two shader assets with
//! identical sources share one program, and a program is never compiled twice.

use crate::error::{BackendError, EmptyShaderErr};
use crate::gpu::{GpuBackend, GpuThread};
use snafu::ensure;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use strata_asset::ShaderSources;
use tracing::debug;
use xxhash_rust::xxh3::Xxh3;

/// Lives on the GPU thread; it is neither `Send` nor `Sync`.
pub struct ShaderRegistry<B: GpuBackend> {
    programs: RefCell<HashMap<u64, Arc<B::Program>>>,
    _gpu_thread: PhantomData<*const ()>,
}

impl<B: GpuBackend> ShaderRegistry<B> {
    pub fn new(_gpu: &GpuThread) -> Self {
        ShaderRegistry {
            programs: RefCell::new(HashMap::new()),
            _gpu_thread: PhantomData,
        }
    }

    pub fn source_key(sources: &ShaderSources) -> u64 {
        let mut hasher = Xxh3::new();
        for (_, code) in sources.stages() {
            hasher.update(code.as_bytes());
        }
        hasher.digest()
    }

    /// Returns the cached program for these sources or compiles it.
    ///
    /// A failed compilation is not cached, the next call tries again.
    #[profiling::function]
    pub fn get_or_create(
        &self,
        backend: &B,
        sources: &ShaderSources,
    ) -> Result<Arc<B::Program>, BackendError> {
        ensure!(!sources.is_empty(), EmptyShaderErr);

        let key = Self::source_key(sources);
        if let Some(program) = self.programs.borrow().get(&key) {
            return Ok(program.clone());
        }

        let program = Arc::new(backend.compile_program(sources)?);
        debug!("Compiled shader program {key:016x}");

        Ok(self
            .programs
            .borrow_mut()
            .entry(key)
            .or_insert(program)
            .clone())
    }

    pub fn contains(&self, sources: &ShaderSources) -> bool {
        self.programs
            .borrow()
            .contains_key(&Self::source_key(sources))
    }

    pub fn len(&self) -> usize {
        self.programs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.borrow().is_empty()
    }
}
