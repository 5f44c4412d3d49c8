// src/engine/cache.rs
//
// Role-keyed output buffers that live as long as the owning pipeline.
//
// A slot is reallocated if and only if the requested byte size differs from
// its current size; otherwise the same allocation is handed back and the
// stage overwrites it completely. Nothing is zeroed on reuse.

use crate::engine::common::PipelineResult;
use crate::error::PipelineError;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Logical owner of a cache slot: the stage whose output it holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferRole {
    /// Tight Y/U/V scratch for sources that need repacking before
    /// YUV conversion.
    IngestPlanar,
    Ingest,
    Crop,
    Scale,
    Rotate,
    Mirror,
    Format,
    DataType,
}

impl BufferRole {
    pub fn name(&self) -> &'static str {
        match self {
            BufferRole::IngestPlanar => "ingest-planar",
            BufferRole::Ingest => "post-ingest",
            BufferRole::Crop => "post-crop",
            BufferRole::Scale => "post-scale",
            BufferRole::Rotate => "post-rotate",
            BufferRole::Mirror => "post-mirror",
            BufferRole::Format => "post-format",
            BufferRole::DataType => "post-datatype",
        }
    }
}

impl fmt::Display for BufferRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default)]
pub struct BufferCache {
    slots: HashMap<BufferRole, Vec<u8>>,
    allocations: u64,
}

impl BufferCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer for `role` of exactly `byte_size` bytes.
    ///
    /// Returns the existing allocation when its size matches; otherwise the
    /// previous buffer is released and a new one allocated.
    pub fn get_or_allocate(
        &mut self,
        role: BufferRole,
        byte_size: usize,
    ) -> PipelineResult<&mut [u8]> {
        let slot = self.slots.entry(role).or_default();
        if slot.len() != byte_size {
            debug!(role = role.name(), byte_size, "allocating buffer");
            *slot = allocate(role, byte_size)?;
            self.allocations += 1;
        }
        Ok(slot.as_mut_slice())
    }

    /// Move the slot's buffer out so a stage can write it while reading
    /// another slot. Must be paired with [`BufferCache::restore`].
    pub(crate) fn checkout(&mut self, role: BufferRole, byte_size: usize) -> PipelineResult<Vec<u8>> {
        self.get_or_allocate(role, byte_size)?;
        Ok(self.slots.remove(&role).unwrap_or_default())
    }

    pub(crate) fn restore(&mut self, role: BufferRole, buffer: Vec<u8>) {
        self.slots.insert(role, buffer);
    }

    pub fn bytes(&self, role: BufferRole) -> Option<&[u8]> {
        self.slots.get(&role).map(Vec::as_slice)
    }

    /// Current size of the slot, if it has been allocated.
    pub fn capacity(&self, role: BufferRole) -> Option<usize> {
        self.slots.get(&role).map(Vec::len)
    }

    /// Number of (re)allocations performed over the cache's lifetime.
    pub fn allocation_count(&self) -> u64 {
        self.allocations
    }

    pub fn total_bytes(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Release every slot. The allocation counter is kept.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

fn allocate(role: BufferRole, byte_size: usize) -> PipelineResult<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(byte_size)
        .map_err(|_| PipelineError::out_of_memory(role.name(), byte_size))?;
    buffer.resize(byte_size, 0);
    Ok(buffer)
}
