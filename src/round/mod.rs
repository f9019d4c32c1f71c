//! Round engine
//!
//! All round logic lives here. This module must be pure and deterministic:
//! - Time only advances through `RoundInput::Elapsed`
//! - One input applied at a time, in arrival order
//! - No rendering or platform dependencies

pub mod clock;
pub mod controller;
pub mod state;
pub mod timer;
pub mod view;

pub use clock::{ClockEvent, RoundClock};
pub use controller::{FrameInput, RoundConfig, RoundController, RoundInput, RoundNotice};
pub use state::{Outcome, Round, RoundResult, RoundState, TriggerEvent};
pub use timer::Timer;
pub use view::RoundView;
