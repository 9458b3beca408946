use crate::protocol;

/// One `NP_GetData` result in the vendor's raw scale.
///
/// Rotations are in `-16383..=16383` and translations in `-16383..=16383`;
/// the imager fields are only filled when requested through [`DataFields`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseSample {
    /// Vendor status word (0 = tracking).
    pub status: i16,
    /// Frame counter, increments once per camera frame and wraps at 16 bits.
    pub frame: i16,
    pub checksum: u32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Raw object position from the imager [x, y, z] (0..25600).
    pub raw: [f32; 3],
    /// Deltas from the raw imager position [x, y, z].
    pub delta: [f32; 3],
    /// Smoothed object position from the imager [x, y, z].
    pub smooth: [f32; 3],
}

impl PoseSample {
    /// Convert to degrees and translation units using the vendor 1:1 mapping.
    pub fn pose(&self) -> Pose {
        Pose {
            roll: protocol::roll_to_degrees(self.roll),
            pitch: protocol::pitch_to_degrees(self.pitch),
            yaw: protocol::yaw_to_degrees(self.yaw),
            x: protocol::x_to_units(self.x),
            y: protocol::y_to_units(self.y),
            z: protocol::z_to_units(self.z),
        }
    }
}

/// 6DOF head pose after unit conversion.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Head tilt in degrees.
    pub roll: f64,
    /// Look up/down in degrees.
    pub pitch: f64,
    /// Turn left/right in degrees.
    pub yaw: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Identification strings reported by `NP_GetSignature`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub dll: String,
    pub app: String,
}

bitflags::bitflags! {
    /// Field selection passed to `NP_RequestData`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(C)]
    pub struct DataFields: u16 {
        const ROLL     = 1 << 0;
        const PITCH    = 1 << 1;
        const YAW      = 1 << 2;
        const X        = 1 << 4;
        const Y        = 1 << 5;
        const Z        = 1 << 6;
        const RAW_X    = 1 << 7;
        const RAW_Y    = 1 << 8;
        const RAW_Z    = 1 << 9;
        const DELTA_X  = 1 << 10;
        const DELTA_Y  = 1 << 11;
        const DELTA_Z  = 1 << 12;
        const SMOOTH_X = 1 << 13;
        const SMOOTH_Y = 1 << 14;
        const SMOOTH_Z = 1 << 15;

        /// Rotation and translation only (119).
        const SIX_DOF = Self::ROLL.bits() | Self::PITCH.bits() | Self::YAW.bits()
            | Self::X.bits() | Self::Y.bits() | Self::Z.bits();
    }
}

impl Default for DataFields {
    fn default() -> Self {
        DataFields::SIX_DOF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_dof_request_is_119() {
        assert_eq!(DataFields::SIX_DOF.bits(), 119);
        assert_eq!(DataFields::all().bits(), 65535 & !(1 << 3));
    }

    #[test]
    fn pose_applies_vendor_mapping() {
        let sample = PoseSample {
            roll: 16383.0,
            pitch: -16383.0,
            yaw: 8191.5,
            x: 64.0,
            y: 128.0,
            z: -320.0,
            ..Default::default()
        };
        let pose = sample.pose();
        assert!((pose.roll - -90.0).abs() < 1e-9);
        assert!((pose.pitch - 180.0).abs() < 1e-9);
        assert!((pose.yaw - -90.0).abs() < 1e-9);
        assert!((pose.x - -1.0).abs() < 1e-9);
        assert!((pose.y - 2.0).abs() < 1e-9);
        assert!((pose.z - -5.0).abs() < 1e-9);
    }
}
