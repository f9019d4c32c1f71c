//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Orientation sensor access and sampling
//! - Permission prompts (user-gesture gated on some browsers)
//! - Event subscriptions with scoped lifetimes

pub mod orientation;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use orientation::{
    DeviceHold, OrientationSampler, PermissionGate, RawOrientation, SensorAccess, SensorStatus,
    TiltSample,
};
