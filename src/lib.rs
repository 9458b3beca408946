//! # trackir - Rust bindings for the NaturalPoint TrackIR client library
//!
//! Loads the vendor `NPClient64.dll` at runtime and provides:
//! - The NP start/poll/stop session lifecycle against a host window handle
//! - Typed 6DOF samples with the vendor's 1:1 unit conversion
//! - A fixed-rate poll loop with frame de-duplication and CSV output
//! - C FFI for integration with C/C++ consumers
//!
//! The TrackIR software must be running for the library to report data.
//!
//! ## Quick Start
//! ```no_run
//! use trackir::{Client, Config, WindowHandle};
//!
//! let config = Config::from_env();
//! let hwnd = WindowHandle::console().unwrap();
//! let mut client = Client::open(hwnd, &config).unwrap();
//!
//! for _ in 0..100 {
//!     let sample = client.get_data().unwrap();
//!     let pose = sample.pose();
//!     println!("frame {} yaw {:.1}", sample.frame, pose.yaw);
//!     std::thread::sleep(std::time::Duration::from_millis(10));
//! }
//! ```

pub mod error;
pub mod types;
pub mod protocol;
pub mod locate;
pub mod library;
pub mod window;
pub mod config;
pub mod client;
pub mod poll;
pub mod csv;
pub mod ffi;

pub use client::{Client, NpApi};
pub use config::{Config, TimestampMode};
pub use error::TrackIrError;
pub use library::NpClientLibrary;
pub use poll::{PollLoop, PollStats};
pub use types::*;
pub use window::WindowHandle;

/// Result type alias for trackir operations.
pub type Result<T> = std::result::Result<T, TrackIrError>;
