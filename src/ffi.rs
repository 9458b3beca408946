//! C FFI layer for trackir.
//!
//! Provides an opaque handle-based API for C consumers.
//! The generated C header is written to `include/trackir.h` by cbindgen.

use crate::client::Client;
use crate::config::Config;
use crate::error::LastError;
use crate::window::WindowHandle;
use crate::TrackIrError;
use std::ffi::{c_char, c_int};

static LAST_ERROR: LastError = LastError::new();

/// Opaque session handle for C consumers.
pub struct TirClient(Client);

/// One sample in C-compatible layout, already converted to degrees.
#[repr(C)]
pub struct TirPose {
    /// Vendor status word.
    pub status: i16,
    /// Frame counter (wraps at 16 bits).
    pub frame: i16,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

fn into_handle(result: crate::Result<Client>) -> *mut TirClient {
    match result {
        Ok(client) => {
            LAST_ERROR.clear();
            Box::into_raw(Box::new(TirClient(client)))
        }
        Err(e) => {
            LAST_ERROR.set(&e);
            std::ptr::null_mut()
        }
    }
}

/// Start a session using `TRACKIR_*` environment settings and the console
/// window (or `TRACKIR_HWND`).
/// Returns NULL on error (check tir_last_error()).
#[no_mangle]
pub extern "C" fn tir_open() -> *mut TirClient {
    into_handle(Client::open_from_config(&Config::from_env()))
}

/// Start a session registered against the given native window handle.
/// Returns NULL on error.
#[no_mangle]
pub extern "C" fn tir_open_with_hwnd(hwnd: usize) -> *mut TirClient {
    let result = WindowHandle::from_raw(hwnd)
        .ok_or_else(|| TrackIrError::InvalidWindowHandle(format!("{:#x}", hwnd)))
        .and_then(|hwnd| Client::open(hwnd, &Config::from_env()));
    into_handle(result)
}

/// Poll the latest sample into `pose`.
/// Returns 0 on success, -1 on error.
///
/// # Safety
/// `client` and `pose` must be valid pointers, or null.
#[no_mangle]
pub unsafe extern "C" fn tir_get_data(client: *mut TirClient, pose: *mut TirPose) -> c_int {
    if client.is_null() || pose.is_null() {
        LAST_ERROR.set(&TrackIrError::InvalidArgument("null client or pose pointer"));
        return -1;
    }
    let client = &mut *client;

    match client.0.get_data() {
        Ok(sample) => {
            let p = sample.pose();
            pose.write(TirPose {
                status: sample.status,
                frame: sample.frame,
                roll: p.roll,
                pitch: p.pitch,
                yaw: p.yaw,
                x: p.x,
                y: p.y,
                z: p.z,
            });
            0
        }
        Err(e) => {
            LAST_ERROR.set(&e);
            -1
        }
    }
}

/// Recenter the view. Returns 0 on success, -1 on error.
///
/// # Safety
/// `client` must be a valid client pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn tir_recenter(client: *mut TirClient) -> c_int {
    if client.is_null() {
        LAST_ERROR.set(&TrackIrError::InvalidArgument("null client pointer"));
        return -1;
    }
    let client = &mut *client;
    match client.0.recenter() {
        Ok(()) => 0,
        Err(e) => {
            LAST_ERROR.set(&e);
            -1
        }
    }
}

/// Stop the session and free its resources.
///
/// # Safety
/// `client` must be a pointer returned by `tir_open` or `tir_open_with_hwnd`, or null.
#[no_mangle]
pub unsafe extern "C" fn tir_close(client: *mut TirClient) {
    if !client.is_null() {
        let mut client = Box::from_raw(client);
        if let Err(e) = client.0.stop() {
            LAST_ERROR.set(&e);
        }
    }
}

/// Get the last error message. Returns NULL if no error.
/// The returned pointer is valid until the next trackir API call.
#[no_mangle]
pub extern "C" fn tir_last_error() -> *const c_char {
    LAST_ERROR.as_ptr()
}
