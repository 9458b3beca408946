use crate::types::{PoseSample, Signature};
use crate::{Result, TrackIrError};
use std::fmt;

// -- Library location --
pub const REGISTRY_KEY: &str = r"Software\NaturalPoint\NATURALPOINT\NPClient Location";
pub const REGISTRY_VALUE: &str = "Path";
#[cfg(target_pointer_width = "64")]
pub const DLL_NAME: &str = "NPClient64.dll";
#[cfg(not(target_pointer_width = "64"))]
pub const DLL_NAME: &str = "NPClient.dll";

/// Program profile registered with the TrackIR software ("Unity 64-bit").
pub const DEFAULT_PROFILE_ID: u16 = 3750;

// -- Raw value scaling (vendor 1:1 mapping) --
pub const ROTATION_FULL_SCALE: f64 = 16383.0;
pub const TRANSLATION_DIVISOR: f64 = 64.0;

// -- Struct geometry --
pub const SIGNATURE_LEN: usize = 200;
pub const TIR_DATA_SIZE: usize = 68;

/// Result code returned by every NP entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpResult {
    Ok,
    DeviceNotPresent,
    UnsupportedOs,
    InvalidArg,
    DllNotFound,
    NoData,
    InternalData,
    /// The previous session never unregistered; the TrackIR software must be restarted.
    AlreadyRegistered,
    Unknown(i32),
}

impl NpResult {
    pub fn from_code(code: i32) -> NpResult {
        match code {
            0 => NpResult::Ok,
            1 => NpResult::DeviceNotPresent,
            2 => NpResult::UnsupportedOs,
            3 => NpResult::InvalidArg,
            4 => NpResult::DllNotFound,
            5 => NpResult::NoData,
            6 => NpResult::InternalData,
            7 => NpResult::AlreadyRegistered,
            other => NpResult::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            NpResult::Ok => 0,
            NpResult::DeviceNotPresent => 1,
            NpResult::UnsupportedOs => 2,
            NpResult::InvalidArg => 3,
            NpResult::DllNotFound => 4,
            NpResult::NoData => 5,
            NpResult::InternalData => 6,
            NpResult::AlreadyRegistered => 7,
            NpResult::Unknown(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NpResult::Ok => "OK",
            NpResult::DeviceNotPresent => "DEVICE_NOT_PRESENT",
            NpResult::UnsupportedOs => "UNSUPPORTED_OS",
            NpResult::InvalidArg => "INVALID_ARG",
            NpResult::DllNotFound => "DLL_NOT_FOUND",
            NpResult::NoData => "NO_DATA",
            NpResult::InternalData => "INTERNAL_DATA",
            NpResult::AlreadyRegistered => "ALREADY_REGISTERED",
            NpResult::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for NpResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// Map a raw NP return value to `Ok(())` or an error naming the call.
pub fn check(call: &'static str, code: i32) -> Result<()> {
    match NpResult::from_code(code) {
        NpResult::Ok => Ok(()),
        code => Err(TrackIrError::Np { call, code }),
    }
}

/// `struct tir_data` as filled by `NP_GetData`.
///
/// Layout (packed, 68 bytes):
/// - `[0..2]`: i16 status
/// - `[2..4]`: i16 frame
/// - `[4..8]`: u32 checksum
/// - `[8..32]`: f32 roll, pitch, yaw, tx, ty, tz
/// - `[32..68]`: f32 raw, delta and smoothed imager positions
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TirData {
    pub status: i16,
    pub frame: i16,
    pub cksum: u32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub tx: f32,
    pub ty: f32,
    pub tz: f32,
    pub rawx: f32,
    pub rawy: f32,
    pub rawz: f32,
    pub deltax: f32,
    pub deltay: f32,
    pub deltaz: f32,
    pub smoothx: f32,
    pub smoothy: f32,
    pub smoothz: f32,
}

impl TirData {
    pub fn to_sample(self) -> PoseSample {
        PoseSample {
            status: self.status,
            frame: self.frame,
            checksum: self.cksum,
            roll: self.roll,
            pitch: self.pitch,
            yaw: self.yaw,
            x: self.tx,
            y: self.ty,
            z: self.tz,
            raw: [self.rawx, self.rawy, self.rawz],
            delta: [self.deltax, self.deltay, self.deltaz],
            smooth: [self.smoothx, self.smoothy, self.smoothz],
        }
    }
}

/// `struct tir_signature` as filled by `NP_GetSignature`.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct TirSignature {
    pub dll_signature: [u8; SIGNATURE_LEN],
    pub app_signature: [u8; SIGNATURE_LEN],
}

impl Default for TirSignature {
    fn default() -> Self {
        TirSignature {
            dll_signature: [0; SIGNATURE_LEN],
            app_signature: [0; SIGNATURE_LEN],
        }
    }
}

impl TirSignature {
    pub fn to_signature(&self) -> Signature {
        let dll = self.dll_signature;
        let app = self.app_signature;
        Signature {
            dll: extract_string(&dll),
            app: extract_string(&app),
        }
    }
}

/// Extract a null-terminated string from a byte slice.
pub fn extract_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).to_string()
}

/// Split a packed `NP_QueryVersion` word into (major, minor).
pub fn split_version(version: u16) -> (u8, u8) {
    ((version >> 8) as u8, (version & 0xFF) as u8)
}

pub fn roll_to_degrees(raw: f32) -> f64 {
    -(raw as f64) * 90.0 / ROTATION_FULL_SCALE
}

pub fn pitch_to_degrees(raw: f32) -> f64 {
    -(raw as f64) * 180.0 / ROTATION_FULL_SCALE
}

pub fn yaw_to_degrees(raw: f32) -> f64 {
    -(raw as f64) * 180.0 / ROTATION_FULL_SCALE
}

pub fn x_to_units(raw: f32) -> f64 {
    -(raw as f64) / TRANSLATION_DIVISOR
}

pub fn y_to_units(raw: f32) -> f64 {
    raw as f64 / TRANSLATION_DIVISOR
}

pub fn z_to_units(raw: f32) -> f64 {
    raw as f64 / TRANSLATION_DIVISOR
}
