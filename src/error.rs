use crate::protocol::NpResult;
use std::fmt;

/// Errors that can occur when talking to the TrackIR client library.
#[derive(Debug, thiserror::Error)]
pub enum TrackIrError {
    #[error("Failed to load NPClient library: {0}")]
    Load(#[from] libloading::Error),

    #[error("NPClient library does not export {0}")]
    MissingSymbol(&'static str),

    #[error("NPClient library not found (is the TrackIR software installed?)")]
    LibraryNotFound,

    #[error("Registry lookup failed: {0}")]
    Registry(String),

    #[error("{call} returned {code}")]
    Np { call: &'static str, code: NpResult },

    #[error("Invalid window handle: {0:?}")]
    InvalidWindowHandle(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("TrackIR session already stopped")]
    SessionStopped,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackIrError {
    /// Vendor result code, if this error came from an NP call.
    pub fn np_code(&self) -> Option<NpResult> {
        match self {
            TrackIrError::Np { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Thread-safe last-error storage for the C FFI layer.
pub(crate) struct LastError {
    message: std::sync::Mutex<String>,
}

impl LastError {
    pub const fn new() -> Self {
        Self {
            message: std::sync::Mutex::new(String::new()),
        }
    }

    pub fn set(&self, err: &TrackIrError) {
        if let Ok(mut msg) = self.message.lock() {
            *msg = fmt::format(format_args!("{}\0", err));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut msg) = self.message.lock() {
            msg.clear();
        }
    }

    pub fn as_ptr(&self) -> *const std::ffi::c_char {
        match self.message.lock() {
            Ok(msg) if !msg.is_empty() => msg.as_ptr() as *const std::ffi::c_char,
            _ => std::ptr::null(),
        }
    }
}
