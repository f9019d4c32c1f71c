//! Round controller
//!
//! Drives one round through `Countdown -> Active -> Feedback -> Active | Ended`.
//! All inputs (elapsed time, tilt readings, taps, permission answers) go
//! through a single FIFO queue and are applied one at a time, so sensor and
//! timer callbacks can never interleave inside a transition.

use std::collections::VecDeque;

use super::clock::{ClockEvent, RoundClock};
use super::state::{Outcome, Round, RoundResult, RoundState, TriggerEvent};
use super::timer::Timer;
use super::view::RoundView;
use crate::consts::*;
use crate::error::RoundError;
use crate::gesture::{GestureConfig, GestureDebouncer};
use crate::platform::{
    DeviceHold, OrientationSampler, PermissionGate, RawOrientation, SensorAccess, SensorStatus,
    TiltSample,
};

/// Engine tuning for a round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundConfig {
    /// Pre-round countdown (seconds, at least 1)
    pub countdown_secs: u32,
    /// Feedback flash after each trigger (ms)
    pub feedback_ms: u32,
    pub gesture: GestureConfig,
    pub hold: DeviceHold,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            feedback_ms: DEFAULT_FEEDBACK_MS,
            gesture: GestureConfig::default(),
            hold: DeviceHold::default(),
        }
    }
}

/// Everything the controller consumes
#[derive(Debug, Clone, PartialEq)]
pub enum RoundInput {
    /// Time passed since the previous `Elapsed` (ms)
    Elapsed(u32),
    /// Raw sensor reading, normalized by the sampler
    Orientation(RawOrientation),
    /// Already-normalized tilt sample
    Tilt(TiltSample),
    /// Tap fallback
    Manual(Outcome),
    /// Late answer from an asynchronous permission prompt
    SensorAccess(SensorAccess),
}

/// Inputs gathered during one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub elapsed_ms: u32,
    pub orientation: Vec<RawOrientation>,
    pub manual: Option<Outcome>,
}

/// Output for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundNotice {
    Changed(RoundView),
    /// Delivered exactly once, on reaching Ended
    Finished(RoundResult),
}

pub struct RoundController {
    round: Round,
    config: RoundConfig,
    debouncer: GestureDebouncer,
    sampler: OrientationSampler,
    clock: RoundClock,
    countdown_timer: Option<Timer>,
    feedback_timer: Option<Timer>,
    queue: VecDeque<RoundInput>,
    notices: Vec<RoundNotice>,
    exited: bool,
}

impl RoundController {
    /// Start a round over `words` in the given order.
    ///
    /// Shuffling is the caller's job.
    pub fn start(
        words: Vec<String>,
        duration_secs: i64,
        config: RoundConfig,
    ) -> Result<Self, RoundError> {
        if words.is_empty() {
            return Err(RoundError::EmptyWordList);
        }
        if duration_secs <= 0 {
            return Err(RoundError::NonPositiveDuration(duration_secs));
        }
        if config.countdown_secs == 0 {
            return Err(RoundError::ZeroCountdown);
        }
        if config.feedback_ms == 0 {
            return Err(RoundError::ZeroFeedback);
        }
        let debouncer = GestureDebouncer::new(config.gesture.clone())?;
        let duration = u32::try_from(duration_secs).unwrap_or(u32::MAX);

        log::info!(
            "Round starting: {} words, {}s, {}s countdown",
            words.len(),
            duration,
            config.countdown_secs
        );

        let mut controller = Self {
            round: Round::new(words, duration, config.countdown_secs),
            sampler: OrientationSampler::new(config.hold),
            clock: RoundClock::new(duration),
            countdown_timer: Some(Timer::new(MS_PER_SECOND)),
            feedback_timer: None,
            queue: VecDeque::new(),
            notices: Vec::new(),
            exited: false,
            debouncer,
            config,
        };
        controller.notify();
        Ok(controller)
    }

    pub fn state(&self) -> &RoundState {
        &self.round.state
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn sensor_status(&self) -> SensorStatus {
        self.sampler.status()
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    pub fn is_finished(&self) -> bool {
        self.round.state.is_ended()
    }

    pub fn view(&self) -> RoundView {
        RoundView::project(&self.round, self.sampler.status())
    }

    /// Queue an input; nothing changes until `pump`
    pub fn push(&mut self, input: RoundInput) {
        if !self.exited {
            self.queue.push_back(input);
        }
    }

    /// Apply queued inputs in arrival order
    pub fn pump(&mut self) {
        while let Some(input) = self.queue.pop_front() {
            self.handle(input);
        }
    }

    /// Apply one frame of input.
    ///
    /// Elapsed time goes first, so if the clock runs out during this frame
    /// the frame's triggers are dropped.
    pub fn step(&mut self, frame: &FrameInput) {
        self.push(RoundInput::Elapsed(frame.elapsed_ms));
        for raw in &frame.orientation {
            self.push(RoundInput::Orientation(*raw));
        }
        if let Some(outcome) = frame.manual {
            self.push(RoundInput::Manual(outcome));
        }
        self.pump();
    }

    pub fn manual_trigger(&mut self, outcome: Outcome) {
        self.push(RoundInput::Manual(outcome));
        self.pump();
    }

    /// Prompt for sensor access through a synchronous gate
    pub fn request_sensor_access<G: PermissionGate + ?Sized>(
        &mut self,
        gate: &mut G,
    ) -> SensorStatus {
        if self.exited || self.round.state.is_ended() {
            return self.sampler.status();
        }
        let before = self.sampler.status();
        let status = self.sampler.request_access(gate);
        if status != before {
            self.notify();
        }
        status
    }

    /// Cancel the round. Timers die, the sampler closes, nothing is delivered.
    pub fn exit(&mut self) {
        if self.exited {
            return;
        }
        self.exited = true;
        self.countdown_timer = None;
        self.feedback_timer = None;
        self.clock.stop();
        self.sampler.close();
        self.queue.clear();
        self.notices.clear();
        log::info!(
            "Round exited at word {}/{}",
            self.round.cursor(),
            self.round.words().len()
        );
    }

    /// Take pending notices
    pub fn drain_notices(&mut self) -> Vec<RoundNotice> {
        std::mem::take(&mut self.notices)
    }

    fn handle(&mut self, input: RoundInput) {
        if self.exited || self.round.state.is_ended() {
            return;
        }
        match input {
            RoundInput::Elapsed(ms) => self.advance(ms),
            RoundInput::Orientation(raw) => {
                if let Some(sample) = self.sampler.sample(&raw) {
                    self.on_tilt(sample);
                }
            }
            RoundInput::Tilt(sample) => self.on_tilt(sample),
            RoundInput::Manual(outcome) => {
                let event = self.debouncer.force_trigger(outcome);
                self.on_trigger(event);
            }
            RoundInput::SensorAccess(access) => {
                let before = self.sampler.status();
                if self.sampler.apply_access(access) != before {
                    self.notify();
                }
            }
        }
    }

    /// The debouncer sees every sample so it can track arming, but only
    /// Active turns its output into a score.
    fn on_tilt(&mut self, sample: TiltSample) {
        if let Some(event) = self.debouncer.observe(&sample) {
            self.on_trigger(event);
        }
    }

    fn on_trigger(&mut self, event: TriggerEvent) {
        if self.round.state != RoundState::Active || self.clock.is_expired() {
            log::trace!(
                "ignoring {} trigger during {}",
                event.outcome.as_str(),
                self.round.state.name()
            );
            return;
        }
        let Some(word) = self.round.score_current(event.outcome) else {
            self.end("out of words");
            return;
        };
        log::debug!("{} -> {}", word, event.outcome.as_str());

        self.clock.pause();
        self.feedback_timer = Some(Timer::new(self.config.feedback_ms));
        self.round.state = RoundState::Feedback {
            outcome: event.outcome,
            word,
        };
        self.notify();
    }

    /// Spend `ms` of elapsed time phase by phase. Leftover time after a
    /// timer fires carries into the next phase.
    fn advance(&mut self, ms: u32) {
        let mut budget = ms;
        loop {
            match self.round.state {
                RoundState::Countdown(_) => {
                    let Some(timer) = self.countdown_timer.as_mut() else {
                        break;
                    };
                    match timer.advance(budget) {
                        Some(left) => {
                            budget = left;
                            self.countdown_second_elapsed();
                        }
                        None => break,
                    }
                }
                RoundState::Active => {
                    for event in self.clock.advance(budget) {
                        match event {
                            ClockEvent::Tick(remaining) => {
                                self.round.remaining = remaining;
                                self.notify();
                            }
                            ClockEvent::TimeExpired => self.end("time expired"),
                        }
                    }
                    break;
                }
                RoundState::Feedback { .. } => {
                    let Some(timer) = self.feedback_timer.as_mut() else {
                        break;
                    };
                    match timer.advance(budget) {
                        Some(left) => {
                            budget = left;
                            self.finish_feedback();
                        }
                        None => break,
                    }
                }
                RoundState::Ended => break,
            }
        }
    }

    fn countdown_second_elapsed(&mut self) {
        let RoundState::Countdown(n) = self.round.state else {
            return;
        };
        let left = n.saturating_sub(1);
        if left == 0 {
            self.countdown_timer = None;
            self.round.state = RoundState::Active;
            self.clock.start();
            log::info!("Round live");
        } else {
            self.round.state = RoundState::Countdown(left);
            self.countdown_timer = Some(Timer::new(MS_PER_SECOND));
        }
        self.notify();
    }

    fn finish_feedback(&mut self) {
        self.feedback_timer = None;
        if self.round.exhausted() {
            self.end("out of words");
            return;
        }
        self.round.state = RoundState::Active;
        self.clock.resume();
        self.notify();
    }

    /// Single path into Ended. A second call is a no-op, so the result
    /// cannot be delivered twice.
    fn end(&mut self, reason: &str) {
        if self.round.state.is_ended() {
            return;
        }
        self.round.state = RoundState::Ended;
        self.countdown_timer = None;
        self.feedback_timer = None;
        self.clock.stop();
        self.sampler.close();
        self.queue.clear();

        let result = self.round.result();
        log::info!(
            "Round over ({}): {} correct, {} skipped",
            reason,
            result.correct.len(),
            result.skipped.len()
        );
        self.notify();
        self.notices.push(RoundNotice::Finished(result));
    }

    fn notify(&mut self) {
        if self.exited {
            return;
        }
        let view = self.view();
        self.notices.push(RoundNotice::Changed(view));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn config() -> RoundConfig {
        RoundConfig {
            countdown_secs: 3,
            feedback_ms: 800,
            ..Default::default()
        }
    }

    fn started(list: &[&str], secs: i64) -> RoundController {
        RoundController::start(words(list), secs, config()).unwrap()
    }

    fn elapse(c: &mut RoundController, ms: u32) {
        c.push(RoundInput::Elapsed(ms));
        c.pump();
    }

    fn finished(notices: &[RoundNotice]) -> Vec<RoundResult> {
        notices
            .iter()
            .filter_map(|n| match n {
                RoundNotice::Finished(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    struct FixedGate(SensorAccess);

    impl PermissionGate for FixedGate {
        fn request(&mut self) -> SensorAccess {
            self.0
        }
    }

    #[test]
    fn test_start_rejects_invalid_input() {
        assert_eq!(
            RoundController::start(vec![], 10, config()).err(),
            Some(RoundError::EmptyWordList)
        );
        assert_eq!(
            RoundController::start(words(&["A"]), 0, config()).err(),
            Some(RoundError::NonPositiveDuration(0))
        );
        assert_eq!(
            RoundController::start(words(&["A"]), -5, config()).err(),
            Some(RoundError::NonPositiveDuration(-5))
        );
        let bad = RoundConfig {
            countdown_secs: 0,
            ..config()
        };
        assert_eq!(
            RoundController::start(words(&["A"]), 10, bad).err(),
            Some(RoundError::ZeroCountdown)
        );
        let bad = RoundConfig {
            feedback_ms: 0,
            ..config()
        };
        assert_eq!(
            RoundController::start(words(&["A"]), 10, bad).err(),
            Some(RoundError::ZeroFeedback)
        );
        let mut bad = config();
        bad.gesture.trigger_threshold = 10.0;
        assert!(matches!(
            RoundController::start(words(&["A"]), 10, bad),
            Err(RoundError::Gesture(_))
        ));
    }

    #[test]
    fn test_start_notifies_countdown() {
        let mut c = started(&["A"], 10);
        let notices = c.drain_notices();
        assert_eq!(notices.len(), 1);
        let RoundNotice::Changed(view) = &notices[0] else {
            panic!("expected Changed");
        };
        assert_eq!(view.state, RoundState::Countdown(3));
        assert_eq!(view.remaining, 10);
    }

    #[test]
    fn test_countdown_ticks_then_active() {
        let mut c = started(&["A", "B"], 10);
        elapse(&mut c, 999);
        assert_eq!(c.state(), &RoundState::Countdown(3));
        elapse(&mut c, 1);
        assert_eq!(c.state(), &RoundState::Countdown(2));
        elapse(&mut c, 2000);
        assert_eq!(c.state(), &RoundState::Active);
        assert_eq!(c.view().current_word.as_deref(), Some("A"));
        assert_eq!(c.round().remaining, 10);
    }

    #[test]
    fn test_countdown_leftover_runs_clock() {
        let mut c = started(&["A"], 10);
        elapse(&mut c, 4500);
        assert_eq!(c.state(), &RoundState::Active);
        assert_eq!(c.round().remaining, 9);
    }

    #[test]
    fn test_triggers_ignored_during_countdown() {
        let mut c = started(&["A", "B"], 10);
        c.manual_trigger(Outcome::Correct);
        assert_eq!(c.state(), &RoundState::Countdown(3));
        assert_eq!(c.round().cursor(), 0);
    }

    #[test]
    fn test_trigger_enters_feedback_and_ignores_repeats() {
        let mut c = started(&["A", "B"], 10);
        elapse(&mut c, 3000);
        c.manual_trigger(Outcome::Correct);
        assert_eq!(
            c.state(),
            &RoundState::Feedback {
                outcome: Outcome::Correct,
                word: "A".into()
            }
        );
        c.manual_trigger(Outcome::Skip);
        c.manual_trigger(Outcome::Correct);
        assert_eq!(c.round().correct(), &words(&["A"])[..]);
        assert!(c.round().skipped().is_empty());
        assert_eq!(c.round().cursor(), 1);
    }

    #[test]
    fn test_feedback_freezes_clock() {
        let mut c = started(&["A", "B", "C"], 10);
        elapse(&mut c, 3000);
        elapse(&mut c, 500);
        c.manual_trigger(Outcome::Skip);
        elapse(&mut c, 700);
        assert!(matches!(c.state(), RoundState::Feedback { .. }));
        assert_eq!(c.round().remaining, 10);
        // 100ms finishes feedback, 500ms more completes the first second
        elapse(&mut c, 600);
        assert_eq!(c.state(), &RoundState::Active);
        assert_eq!(c.round().remaining, 9);
        assert_eq!(c.view().current_word.as_deref(), Some("B"));
    }

    #[test]
    fn test_time_expired_discards_current_word() {
        let mut c = started(&["A", "B"], 5);
        elapse(&mut c, 3000);
        elapse(&mut c, 5000);
        assert!(c.is_finished());
        let results = finished(&c.drain_notices());
        assert_eq!(results, vec![RoundResult::default()]);
    }

    #[test]
    fn test_huge_elapsed_with_partial_second_ends_round() {
        let mut c = started(&["A", "B"], 10);
        elapse(&mut c, 3500);
        assert_eq!(c.state(), &RoundState::Active);
        elapse(&mut c, u32::MAX);
        assert!(c.is_finished());
        assert_eq!(c.round().remaining, 0);
        assert_eq!(finished(&c.drain_notices()), vec![RoundResult::default()]);
    }

    #[test]
    fn test_time_expired_wins_same_frame() {
        let mut c = started(&["A", "B"], 2);
        elapse(&mut c, 3000);
        elapse(&mut c, 1500);
        c.step(&FrameInput {
            elapsed_ms: 500,
            manual: Some(Outcome::Correct),
            ..Default::default()
        });
        assert!(c.is_finished());
        assert!(c.round().correct().is_empty());
        assert_eq!(c.round().cursor(), 0);
    }

    #[test]
    fn test_running_out_of_words_ends_early() {
        let mut c = started(&["A"], 60);
        elapse(&mut c, 3000);
        c.manual_trigger(Outcome::Correct);
        elapse(&mut c, 800);
        assert!(c.is_finished());
        let results = finished(&c.drain_notices());
        assert_eq!(
            results,
            vec![RoundResult {
                correct: words(&["A"]),
                skipped: vec![],
            }]
        );
        assert_eq!(c.round().result(), results[0]);
        assert_eq!(c.round().remaining, 60);
    }

    #[test]
    fn test_result_delivered_once() {
        let mut c = started(&["A"], 1);
        elapse(&mut c, 3000);
        elapse(&mut c, 1000);
        elapse(&mut c, 1000);
        c.manual_trigger(Outcome::Correct);
        let mut all = c.drain_notices();
        elapse(&mut c, 5000);
        all.extend(c.drain_notices());
        assert_eq!(finished(&all).len(), 1);
    }

    #[test]
    fn test_exit_silences_everything() {
        let mut c = started(&["A", "B"], 10);
        elapse(&mut c, 3000);
        c.drain_notices();
        c.exit();
        elapse(&mut c, 60_000);
        c.manual_trigger(Outcome::Correct);
        c.push(RoundInput::SensorAccess(SensorAccess::Granted));
        c.pump();
        assert!(c.drain_notices().is_empty());
        assert!(c.is_exited());
        assert_eq!(c.state(), &RoundState::Active);
    }

    #[test]
    fn test_exit_drops_pending_finish() {
        let mut c = started(&["A"], 1);
        elapse(&mut c, 4000);
        assert!(c.is_finished());
        c.exit();
        assert!(c.drain_notices().is_empty());
    }

    #[test]
    fn test_gesture_scoring_through_sampler() {
        let mut c = started(&["A", "B"], 30);
        assert_eq!(
            c.request_sensor_access(&mut FixedGate(SensorAccess::Granted)),
            SensorStatus::Granted
        );
        let reading = |gamma: f64, t: u64| RawOrientation {
            beta: None,
            gamma: Some(gamma),
            timestamp_ms: t,
        };
        // Held upright through the countdown arms the debouncer
        c.step(&FrameInput {
            elapsed_ms: 3000,
            orientation: vec![reading(2.0, 3000)],
            manual: None,
        });
        assert_eq!(c.state(), &RoundState::Active);

        // One nod produces many samples, one trigger
        c.step(&FrameInput {
            elapsed_ms: 16,
            orientation: vec![reading(50.0, 3016), reading(60.0, 3020), reading(70.0, 3030)],
            manual: None,
        });
        assert_eq!(c.round().correct(), &words(&["A"])[..]);
        assert_eq!(c.round().cursor(), 1);

        // Held tilted through the feedback pause, still nothing new
        c.step(&FrameInput {
            elapsed_ms: 800,
            orientation: vec![reading(70.0, 3800)],
            manual: None,
        });
        assert_eq!(c.state(), &RoundState::Active);
        c.step(&FrameInput {
            elapsed_ms: 16,
            orientation: vec![reading(70.0, 4200)],
            manual: None,
        });
        assert_eq!(c.round().cursor(), 1);

        // Back to neutral, then tilt the other way
        c.step(&FrameInput {
            elapsed_ms: 16,
            orientation: vec![reading(0.0, 4300), reading(-60.0, 4400)],
            manual: None,
        });
        assert_eq!(c.round().skipped(), &words(&["B"])[..]);
    }

    #[test]
    fn test_denied_sensors_still_playable() {
        let mut c = started(&["A", "B"], 30);
        c.request_sensor_access(&mut FixedGate(SensorAccess::Denied));
        assert_eq!(c.sensor_status(), SensorStatus::Denied);
        assert_eq!(
            c.request_sensor_access(&mut FixedGate(SensorAccess::Granted)),
            SensorStatus::Denied
        );
        elapse(&mut c, 3000);
        // Readings are dropped without access
        c.push(RoundInput::Orientation(RawOrientation {
            beta: None,
            gamma: Some(80.0),
            timestamp_ms: 1,
        }));
        c.pump();
        assert_eq!(c.round().cursor(), 0);

        c.manual_trigger(Outcome::Skip);
        elapse(&mut c, 800);
        c.manual_trigger(Outcome::Correct);
        elapse(&mut c, 800);
        assert!(c.is_finished());
        assert_eq!(c.round().skipped(), &words(&["A"])[..]);
        assert_eq!(c.round().correct(), &words(&["B"])[..]);
    }

    #[test]
    fn test_async_sensor_answer_notifies() {
        let mut c = started(&["A"], 30);
        c.drain_notices();
        c.push(RoundInput::SensorAccess(SensorAccess::Unsupported));
        c.pump();
        let notices = c.drain_notices();
        assert_eq!(notices.len(), 1);
        let RoundNotice::Changed(view) = &notices[0] else {
            panic!("expected Changed");
        };
        assert_eq!(view.sensor, SensorStatus::Unsupported);
        assert!(!view.offer_sensor_prompt());
    }

    #[test]
    fn test_every_tick_notifies() {
        let mut c = started(&["A"], 5);
        elapse(&mut c, 3000);
        c.drain_notices();
        elapse(&mut c, 2000);
        let remaining: Vec<u32> = c
            .drain_notices()
            .iter()
            .filter_map(|n| match n {
                RoundNotice::Changed(v) => Some(v.remaining),
                _ => None,
            })
            .collect();
        assert_eq!(remaining, vec![4, 3]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Elapse(u32),
        Tap(bool),
        Tilt(f32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u32..2500).prop_map(Op::Elapse),
            1 => any::<u32>().prop_map(Op::Elapse),
            4 => any::<bool>().prop_map(Op::Tap),
            4 => (-180.0f32..180.0).prop_map(Op::Tilt),
        ]
    }

    proptest! {
        #[test]
        fn prop_round_invariants(
            n_words in 1usize..8,
            duration in 1i64..20,
            ops in prop::collection::vec(op(), 0..120),
        ) {
            let list: Vec<String> = (0..n_words).map(|i| format!("W{i}")).collect();
            let mut c = RoundController::start(list.clone(), duration, config()).unwrap();
            let mut now = 0u64;
            let mut finishes = Vec::new();
            let mut last_remaining = duration as u32;

            for op in ops {
                match op {
                    Op::Elapse(ms) => {
                        now += ms as u64;
                        c.push(RoundInput::Elapsed(ms));
                    }
                    Op::Tap(correct) => c.push(RoundInput::Manual(
                        if correct { Outcome::Correct } else { Outcome::Skip },
                    )),
                    Op::Tilt(angle) => c.push(RoundInput::Tilt(TiltSample {
                        angle,
                        timestamp_ms: now,
                    })),
                }
                c.pump();

                let round = c.round();
                prop_assert!(round.invariant_holds());
                prop_assert!(round.remaining <= last_remaining);
                last_remaining = round.remaining;
                finishes.extend(finished(&c.drain_notices()));
            }

            prop_assert!(finishes.len() <= 1);
            if let Some(result) = finishes.first() {
                prop_assert!(c.is_finished());
                // correct and skipped interleave back into the scored prefix
                let scored = &list[..c.round().cursor()];
                let mut ci = result.correct.iter().peekable();
                let mut si = result.skipped.iter().peekable();
                for word in scored {
                    if ci.peek() == Some(&word) {
                        ci.next();
                    } else {
                        prop_assert_eq!(si.next(), Some(word));
                    }
                }
                prop_assert!(ci.next().is_none() && si.next().is_none());
            }
        }
    }
}
