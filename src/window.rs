//! Native window handle passed to `NP_RegisterWindowHandle`.
//!
//! The TrackIR software uses the window to detect when the client has gone
//! away, and refuses to send data without one. Any live top-level window
//! works; closing it stops the data feed.

use crate::{Result, TrackIrError};
use std::ffi::c_void;
use std::fmt;

/// An `HWND`, stored as an integer so it can cross thread and FFI boundaries.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(usize);

impl WindowHandle {
    /// Wrap a raw handle value. Returns `None` for the null handle.
    pub fn from_raw(raw: usize) -> Option<WindowHandle> {
        if raw == 0 {
            None
        } else {
            Some(WindowHandle(raw))
        }
    }

    /// Parse a handle from text: `0x`-prefixed hex (as printed by most
    /// toolkits) or plain decimal.
    ///
    /// Unprefixed text is always decimal, so bare hex such as `1a2b` is
    /// rejected; add the `0x` prefix.
    pub fn parse(text: &str) -> Result<WindowHandle> {
        let trimmed = text.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => usize::from_str_radix(hex, 16).ok(),
            None => trimmed.parse::<usize>().ok(),
        };

        parsed
            .and_then(WindowHandle::from_raw)
            .ok_or_else(|| TrackIrError::InvalidWindowHandle(text.to_string()))
    }

    /// The console window this process is attached to.
    #[cfg(windows)]
    pub fn console() -> Result<WindowHandle> {
        use winapi::um::wincon::GetConsoleWindow;

        // SAFETY: GetConsoleWindow has no preconditions.
        let hwnd = unsafe { GetConsoleWindow() };
        WindowHandle::from_raw(hwnd as usize)
            .ok_or_else(|| TrackIrError::InvalidWindowHandle("no console window".into()))
    }

    /// Console windows only exist on Windows.
    #[cfg(not(windows))]
    pub fn console() -> Result<WindowHandle> {
        Err(TrackIrError::InvalidWindowHandle(
            "no console window on this platform".into(),
        ))
    }

    pub fn as_raw(self) -> usize {
        self.0
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowHandle({:#x})", self.0)
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
