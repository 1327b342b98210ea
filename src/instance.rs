use anyhow::Result;

/// Holds the named mutex that marks this process as the running watcher.
/// Released on drop.
pub struct InstanceGuard {
    #[cfg(target_os = "windows")]
    handle: winapi::um::winnt::HANDLE,
}

impl InstanceGuard {
    /// Returns `None` when another process already holds `name`.
    #[cfg(target_os = "windows")]
    pub fn acquire(name: &str) -> Result<Option<InstanceGuard>> {
        use std::ptr::null_mut;
        use winapi::shared::winerror::ERROR_ALREADY_EXISTS;
        use winapi::um::errhandlingapi::GetLastError;
        use winapi::um::handleapi::CloseHandle;
        use winapi::um::synchapi::CreateMutexW;

        let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        let handle = unsafe { CreateMutexW(null_mut(), 0, wide.as_ptr()) };
        if handle.is_null() {
            anyhow::bail!(
                "Failed to create mutex '{}': {}",
                name,
                std::io::Error::last_os_error()
            );
        }
        if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
            unsafe { CloseHandle(handle) };
            return Ok(None);
        }
        Ok(Some(InstanceGuard { handle }))
    }

    #[cfg(not(target_os = "windows"))]
    pub fn acquire(name: &str) -> Result<Option<InstanceGuard>> {
        log::debug!("Single-instance lock '{}' is not enforced on this platform", name);
        Ok(Some(InstanceGuard {}))
    }
}

#[cfg(target_os = "windows")]
impl Drop for InstanceGuard {
    fn drop(&mut self) {
        unsafe { winapi::um::handleapi::CloseHandle(self.handle) };
    }
}
