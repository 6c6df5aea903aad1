//! Read-only views of named shared memory segments.
//!
//! - Unix: POSIX `shm_open` + `mmap(PROT_READ, MAP_SHARED)`
//! - Windows: `OpenFileMappingA` + `MapViewOfFile(FILE_MAP_READ)`
//!
//! The view is released when [`SharedMemory`] is dropped.

use crate::error::Result;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as platform;

#[cfg(windows)]
mod win32;
#[cfg(windows)]
use win32 as platform;

/// A mapped, read-only shared memory segment
pub struct SharedMemory {
    name: String,
    view: platform::View,
}

impl SharedMemory {
    /// Open an existing segment created by another process.
    ///
    /// Fails with `SegmentTooSmall` if fewer than `min_len` bytes are mapped.
    pub fn open_read_only(name: &str, min_len: usize) -> Result<Self> {
        let view = platform::View::open(name, min_len)?;
        Ok(Self {
            name: name.to_string(),
            view,
        })
    }

    /// Segment name as passed to [`open_read_only`](Self::open_read_only)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mapped length in bytes
    pub fn len(&self) -> usize {
        self.view.len()
    }

    /// True for a zero-length mapping
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the start of the segment into `dst`.
    ///
    /// Copies `min(dst.len(), self.len())` bytes and returns that count. The
    /// producer may be writing concurrently, so every byte is read with a
    /// volatile load and the copy as a whole is not atomic.
    pub fn copy_into(&self, dst: &mut [u8]) -> usize {
        let count = dst.len().min(self.view.len());
        let src = self.view.as_ptr();
        for (offset, byte) in dst[..count].iter_mut().enumerate() {
            // SAFETY: the view stays mapped for the lifetime of `self` and
            // spans at least `count` bytes.
            *byte = unsafe { std::ptr::read_volatile(src.add(offset)) };
        }
        count
    }
}

impl std::fmt::Debug for SharedMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedMemory")
            .field("name", &self.name)
            .field("len", &self.len())
            .finish()
    }
}
