//! Scoped override of the process file-creation mask

/// Sets the process umask and restores the previous one when dropped.
///
/// The mask is process-wide: hold the guard only around the files that need
/// it and never across an `.await`.
#[derive(Debug)]
#[must_use = "the previous umask is restored when the guard is dropped"]
pub struct UmaskGuard {
    previous: libc::mode_t,
}

impl UmaskGuard {
    /// Set the umask to `mask`
    pub fn set(mask: u32) -> Self {
        // SAFETY: umask(2) cannot fail and only swaps an integer in the process.
        let previous = unsafe { libc::umask(mask as libc::mode_t) };
        Self { previous }
    }

    /// The mask that will be restored
    pub fn previous(&self) -> u32 {
        u32::from(self.previous)
    }
}

impl Drop for UmaskGuard {
    fn drop(&mut self) {
        // SAFETY: see `UmaskGuard::set`.
        unsafe {
            libc::umask(self.previous);
        }
    }
}
