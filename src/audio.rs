//! Sound and haptic cues using Web Audio and the Vibration API
//!
//! Procedurally generated tones - no external files needed.

use wasm_bindgen::JsValue;
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::round::Outcome;

/// Cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Countdown second
    CountdownBeep,
    /// Round is live
    Go,
    /// Word guessed
    Correct,
    /// Word passed
    Skip,
    /// Round clock ran out
    TimeUp,
}

impl From<Outcome> for Cue {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Correct => Cue::Correct,
            Outcome::Skip => Cue::Skip,
        }
    }
}

/// Sound + vibration feedback
pub struct CuePlayer {
    ctx: Option<AudioContext>,
    volume: f32,
    haptics: bool,
}

impl CuePlayer {
    pub fn new(volume: f32, haptics: bool) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: volume.clamp(0.0, 1.0),
            haptics,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn play(&self, cue: Cue) {
        self.vibrate(cue);

        if self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let vol = self.volume;
        match cue {
            Cue::CountdownBeep => self.tone(ctx, 440.0, None, OscillatorType::Sine, vol * 0.4, 0.12),
            Cue::Go => self.tone(ctx, 880.0, None, OscillatorType::Sine, vol * 0.5, 0.3),
            Cue::Correct => {
                self.tone(ctx, 523.0, Some(1046.0), OscillatorType::Triangle, vol * 0.5, 0.25)
            }
            Cue::Skip => self.tone(ctx, 220.0, Some(110.0), OscillatorType::Square, vol * 0.25, 0.3),
            Cue::TimeUp => self.tone(ctx, 330.0, Some(80.0), OscillatorType::Sawtooth, vol * 0.4, 0.8),
        }
    }

    /// Vibration patterns: triple buzz for correct, one long buzz for skip
    fn vibrate(&self, cue: Cue) {
        if !self.haptics {
            return;
        }
        let Some(navigator) = web_sys::window().map(|w| w.navigator()) else {
            return;
        };
        match cue {
            Cue::Correct => {
                let pattern = js_sys::Array::of3(
                    &JsValue::from(50),
                    &JsValue::from(50),
                    &JsValue::from(50),
                );
                navigator.vibrate_with_pattern(&pattern);
            }
            Cue::Skip => {
                navigator.vibrate_with_duration(200);
            }
            Cue::TimeUp => {
                navigator.vibrate_with_duration(500);
            }
            Cue::CountdownBeep | Cue::Go => {}
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Single tone, optionally sliding to `end_freq`, with a decay envelope
    fn tone(
        &self,
        ctx: &AudioContext,
        freq: f32,
        end_freq: Option<f32>,
        osc_type: OscillatorType,
        vol: f32,
        secs: f64,
    ) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + secs)
            .ok();
        if let Some(end) = end_freq {
            osc.frequency().set_value_at_time(freq, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(end, t + secs)
                .ok();
        }

        osc.start().ok();
        osc.stop_with_when(t + secs + 0.05).ok();
    }
}
