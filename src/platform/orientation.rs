//! Orientation sampler
//!
//! Republishes raw device-orientation readings as a single normalized tilt
//! angle. Owns no game state.

use serde::{Deserialize, Serialize};

use crate::normalize_degrees;

/// Answer from the platform permission gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorAccess {
    Granted,
    Denied,
    Unsupported,
}

/// Sampler view of sensor access for this session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorStatus {
    /// Not asked yet; the player may enable sensors from the countdown screen
    #[default]
    Unknown,
    Granted,
    Denied,
    Unsupported,
}

impl SensorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStatus::Unknown => "unknown",
            SensorStatus::Granted => "granted",
            SensorStatus::Denied => "denied",
            SensorStatus::Unsupported => "unsupported",
        }
    }

    /// Whether gestures are available; otherwise play falls back to taps
    pub fn is_granted(&self) -> bool {
        *self == SensorStatus::Granted
    }
}

impl From<SensorAccess> for SensorStatus {
    fn from(access: SensorAccess) -> Self {
        match access {
            SensorAccess::Granted => SensorStatus::Granted,
            SensorAccess::Denied => SensorStatus::Denied,
            SensorAccess::Unsupported => SensorStatus::Unsupported,
        }
    }
}

/// Platform permission prompt.
///
/// Some browsers only honor the prompt from inside a user gesture handler,
/// so callers retry after a tap rather than prompting on their own.
pub trait PermissionGate {
    fn request(&mut self) -> SensorAccess;
}

/// How the device is held against the forehead; picks the tilt axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceHold {
    /// Upright; nodding changes front/back tilt (beta)
    Portrait,
    /// Sideways; nodding changes left/right tilt (gamma)
    #[default]
    Landscape,
}

impl DeviceHold {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceHold::Portrait => "portrait",
            DeviceHold::Landscape => "landscape",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "portrait" => Some(DeviceHold::Portrait),
            "landscape" => Some(DeviceHold::Landscape),
            _ => None,
        }
    }
}

/// One raw `deviceorientation` reading. Axes may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawOrientation {
    /// Front/back tilt, -180..180
    pub beta: Option<f64>,
    /// Left/right tilt, -90..90
    pub gamma: Option<f64>,
    /// Platform timestamp (ms)
    pub timestamp_ms: u64,
}

/// Normalized tilt angle (degrees, [-180, 180))
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltSample {
    pub angle: f32,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone)]
pub struct OrientationSampler {
    hold: DeviceHold,
    status: SensorStatus,
    closed: bool,
}

impl OrientationSampler {
    pub fn new(hold: DeviceHold) -> Self {
        Self {
            hold,
            status: SensorStatus::Unknown,
            closed: false,
        }
    }

    pub fn status(&self) -> SensorStatus {
        self.status
    }

    pub fn hold(&self) -> DeviceHold {
        self.hold
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Ask the gate for access unless the answer is already settled.
    ///
    /// A denial is final for the session: later calls return `Denied`
    /// without prompting again.
    pub fn request_access<G: PermissionGate + ?Sized>(&mut self, gate: &mut G) -> SensorStatus {
        if self.status != SensorStatus::Unknown {
            return self.status;
        }
        self.apply_access(gate.request())
    }

    /// Record an answer that arrived asynchronously
    pub fn apply_access(&mut self, access: SensorAccess) -> SensorStatus {
        match self.status {
            SensorStatus::Denied | SensorStatus::Unsupported | SensorStatus::Granted => {
                if self.status != SensorStatus::from(access) {
                    log::debug!(
                        "ignoring sensor answer {:?}, already {}",
                        access,
                        self.status.as_str()
                    );
                }
            }
            SensorStatus::Unknown => {
                self.status = access.into();
                match access {
                    SensorAccess::Granted => log::info!("Orientation sensors enabled"),
                    _ => log::warn!(
                        "Orientation sensors {}; using tap controls",
                        self.status.as_str()
                    ),
                }
            }
        }
        self.status
    }

    /// Normalize a raw reading.
    ///
    /// Returns `None` without access, after `close`, or when the platform
    /// reading is missing the axis for the current hold.
    pub fn sample(&self, raw: &RawOrientation) -> Option<TiltSample> {
        if self.closed || !self.status.is_granted() {
            return None;
        }
        let value = match self.hold {
            DeviceHold::Portrait => raw.beta,
            DeviceHold::Landscape => raw.gamma,
        }?;
        if !value.is_finite() {
            return None;
        }
        Some(TiltSample {
            angle: normalize_degrees(value as f32),
            timestamp_ms: raw.timestamp_ms,
        })
    }

    /// Stop producing samples. Cannot be reopened.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedGate {
        answer: SensorAccess,
        prompts: u32,
    }

    impl PermissionGate for ScriptedGate {
        fn request(&mut self) -> SensorAccess {
            self.prompts += 1;
            self.answer
        }
    }

    fn raw(beta: Option<f64>, gamma: Option<f64>) -> RawOrientation {
        RawOrientation {
            beta,
            gamma,
            timestamp_ms: 42,
        }
    }

    #[test]
    fn test_no_samples_before_access() {
        let sampler = OrientationSampler::new(DeviceHold::Landscape);
        assert_eq!(sampler.sample(&raw(Some(10.0), Some(10.0))), None);
    }

    #[test]
    fn test_denied_is_terminal() {
        let mut sampler = OrientationSampler::new(DeviceHold::Landscape);
        let mut gate = ScriptedGate {
            answer: SensorAccess::Denied,
            prompts: 0,
        };
        assert_eq!(sampler.request_access(&mut gate), SensorStatus::Denied);

        gate.answer = SensorAccess::Granted;
        assert_eq!(sampler.request_access(&mut gate), SensorStatus::Denied);
        assert_eq!(sampler.apply_access(SensorAccess::Granted), SensorStatus::Denied);
        assert_eq!(gate.prompts, 1);
    }

    #[test]
    fn test_granted_not_reprompted() {
        let mut sampler = OrientationSampler::new(DeviceHold::Portrait);
        let mut gate = ScriptedGate {
            answer: SensorAccess::Granted,
            prompts: 0,
        };
        sampler.request_access(&mut gate);
        sampler.request_access(&mut gate);
        assert_eq!(gate.prompts, 1);
        assert!(sampler.status().is_granted());
    }

    #[test]
    fn test_axis_follows_hold() {
        let mut portrait = OrientationSampler::new(DeviceHold::Portrait);
        portrait.apply_access(SensorAccess::Granted);
        let mut landscape = OrientationSampler::new(DeviceHold::Landscape);
        landscape.apply_access(SensorAccess::Granted);

        let reading = raw(Some(90.0), Some(-20.0));
        assert_eq!(portrait.sample(&reading).map(|s| s.angle), Some(90.0));
        assert_eq!(landscape.sample(&reading).map(|s| s.angle), Some(-20.0));
        assert_eq!(landscape.sample(&reading).map(|s| s.timestamp_ms), Some(42));
    }

    #[test]
    fn test_missing_or_bad_axis_is_no_sample() {
        let mut sampler = OrientationSampler::new(DeviceHold::Landscape);
        sampler.apply_access(SensorAccess::Granted);
        assert_eq!(sampler.sample(&raw(Some(10.0), None)), None);
        assert_eq!(sampler.sample(&raw(None, Some(f64::NAN))), None);
    }

    #[test]
    fn test_angle_normalized() {
        let mut sampler = OrientationSampler::new(DeviceHold::Portrait);
        sampler.apply_access(SensorAccess::Granted);
        assert_eq!(sampler.sample(&raw(Some(180.0), None)).map(|s| s.angle), Some(-180.0));
    }

    #[test]
    fn test_close_is_permanent() {
        let mut sampler = OrientationSampler::new(DeviceHold::Landscape);
        sampler.apply_access(SensorAccess::Granted);
        sampler.close();
        assert_eq!(sampler.sample(&raw(None, Some(5.0))), None);
        assert!(sampler.is_closed());
    }

    #[test]
    fn test_hold_from_str() {
        assert_eq!(DeviceHold::from_str("Portrait"), Some(DeviceHold::Portrait));
        assert_eq!(DeviceHold::from_str("sideways"), None);
    }
}
