use crate::error::{IoError, Result};
use std::ffi::CString;
use std::ptr::NonNull;
use tracing::warn;

/// POSIX names live in a flat namespace that starts with '/'
fn os_name(name: &str) -> String {
    if name.starts_with('/') {
        name.to_string()
    } else {
        format!("/{}", name)
    }
}

pub(super) struct View {
    ptr: NonNull<u8>,
    len: usize,
}

// The mapping is process-wide and only ever read through `as_ptr`.
unsafe impl Send for View {}

impl View {
    pub(super) fn open(name: &str, min_len: usize) -> Result<Self> {
        let path =
            CString::new(os_name(name)).map_err(|_| IoError::InvalidName(name.to_string()))?;

        let fd = unsafe { libc::shm_open(path.as_ptr(), libc::O_RDONLY, 0) };
        if fd == -1 {
            return Err(IoError::from_open_error(
                name,
                std::io::Error::last_os_error(),
            ));
        }

        let mapped = Self::map_fd(name, fd, min_len);
        unsafe {
            libc::close(fd); // mapping stays valid
        }
        mapped
    }

    fn map_fd(name: &str, fd: libc::c_int, min_len: usize) -> Result<Self> {
        let mut stat: libc::stat = unsafe { std::mem::zeroed() };
        if unsafe { libc::fstat(fd, &mut stat) } == -1 {
            return Err(std::io::Error::last_os_error().into());
        }

        let len = usize::try_from(stat.st_size).unwrap_or(0);
        if len < min_len || len == 0 {
            return Err(IoError::SegmentTooSmall {
                name: name.to_string(),
                expected: min_len,
                actual: len,
            });
        }

        let addr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(std::io::Error::last_os_error().into());
        }

        let ptr = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| IoError::Io(std::io::Error::other("mmap returned null")))?;
        Ok(Self { ptr, len })
    }

    pub(super) fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub(super) fn len(&self) -> usize {
        self.len
    }
}

impl Drop for View {
    fn drop(&mut self) {
        if unsafe { libc::munmap(self.ptr.as_ptr().cast(), self.len) } == -1 {
            warn!("munmap failed: {}", std::io::Error::last_os_error());
        }
    }
}
