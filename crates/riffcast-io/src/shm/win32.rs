use crate::error::{IoError, Result};
use std::ffi::CString;
use tracing::warn;
use windows::core::PCSTR;
use windows::Win32::Foundation::{CloseHandle, BOOL, HANDLE};
use windows::Win32::System::Memory::{
    MapViewOfFile, OpenFileMappingA, UnmapViewOfFile, VirtualQuery, FILE_MAP_READ,
    MEMORY_BASIC_INFORMATION, MEMORY_MAPPED_VIEW_ADDRESS,
};

pub(super) struct View {
    mapping: HANDLE,
    address: MEMORY_MAPPED_VIEW_ADDRESS,
    len: usize,
}

// The view is process-wide and only ever read through `as_ptr`.
unsafe impl Send for View {}

impl View {
    pub(super) fn open(name: &str, min_len: usize) -> Result<Self> {
        let os_name = CString::new(name).map_err(|_| IoError::InvalidName(name.to_string()))?;

        let mapping = unsafe {
            OpenFileMappingA(
                FILE_MAP_READ.0,
                BOOL::from(false),
                PCSTR::from_raw(os_name.as_ptr().cast()),
            )
        }
        .map_err(|err| IoError::from_open_error(name, err.into()))?;

        let address = unsafe { MapViewOfFile(mapping, FILE_MAP_READ, 0, 0, 0) };
        if address.Value.is_null() {
            let err = std::io::Error::last_os_error();
            unsafe {
                let _ = CloseHandle(mapping);
            }
            return Err(err.into());
        }

        // A view covers whole pages; the region size is the usable length.
        let mut info = MEMORY_BASIC_INFORMATION::default();
        let queried = unsafe {
            VirtualQuery(
                Some(address.Value as *const _),
                &mut info,
                std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
            )
        };
        let view = Self {
            mapping,
            address,
            len: if queried == 0 { 0 } else { info.RegionSize },
        };

        if view.len < min_len || view.len == 0 {
            return Err(IoError::SegmentTooSmall {
                name: name.to_string(),
                expected: min_len,
                actual: view.len,
            });
        }
        Ok(view)
    }

    pub(super) fn as_ptr(&self) -> *const u8 {
        self.address.Value.cast::<u8>()
    }

    pub(super) fn len(&self) -> usize {
        self.len
    }
}

impl Drop for View {
    fn drop(&mut self) {
        unsafe {
            if let Err(err) = UnmapViewOfFile(self.address) {
                warn!("UnmapViewOfFile failed: {}", err);
            }
            if let Err(err) = CloseHandle(self.mapping) {
                warn!("CloseHandle failed: {}", err);
            }
        }
    }
}
