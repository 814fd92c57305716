use std::time::Duration;

use bevy::prelude::*;
use constants::lighting::{
    BLINK_CYCLES, BLINK_INTERVAL_MS, FIXTURE_BRIGHT_INTENSITY, FIXTURE_DIM_INTENSITY,
};

use crate::engine::theme::ThemeMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlinkPhase {
    #[default]
    Idle,
    Blinking,
    SettledOn,
}

/// Emitted by `BlinkController::advance` when the sequence settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkSignal {
    Settled,
}

/// Per-fixture blink state machine.
///
/// Owns its interval timer: `Some` while blinking, `None` otherwise.
/// Entering dark mode starts lit at dim intensity; each tick flips the
/// lit flag and every off to on flip counts one cycle. After
/// `BLINK_CYCLES` cycles the timer is dropped and the fixture settles
/// at bright intensity.
#[derive(Component, Debug, Clone)]
pub struct BlinkController {
    phase: BlinkPhase,
    blink_count: u32,
    lit: bool,
    intensity: f32,
    timer: Option<Timer>,
    settle_signalled: bool,
}

impl Default for BlinkController {
    fn default() -> Self {
        Self {
            phase: BlinkPhase::Idle,
            blink_count: 0,
            lit: false,
            intensity: 0.0,
            timer: None,
            settle_signalled: false,
        }
    }
}

impl BlinkController {
    /// Controller already reacting to `mode`.
    pub fn for_mode(mode: ThemeMode) -> Self {
        let mut controller = Self::default();
        controller.on_theme(mode);
        controller
    }

    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    pub fn blink_count(&self) -> u32 {
        self.blink_count
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn has_active_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Apply a theme transition.
    pub fn on_theme(&mut self, mode: ThemeMode) {
        match mode {
            ThemeMode::Dark => self.start(),
            ThemeMode::Light => self.reset(),
        }
    }

    /// Fresh sequence. Replaces any running timer so at most one exists.
    fn start(&mut self) {
        self.phase = BlinkPhase::Blinking;
        self.blink_count = 0;
        self.lit = true;
        self.intensity = FIXTURE_DIM_INTENSITY;
        self.settle_signalled = false;
        self.timer = Some(Timer::new(
            Duration::from_millis(BLINK_INTERVAL_MS),
            TimerMode::Repeating,
        ));
    }

    fn reset(&mut self) {
        self.cancel();
        self.phase = BlinkPhase::Idle;
        self.blink_count = 0;
        self.lit = false;
        self.intensity = 0.0;
        self.settle_signalled = false;
    }

    /// Drop the timer. No-op when already cancelled.
    pub fn cancel(&mut self) {
        self.timer = None;
    }

    /// Advance by `delta` of frame time. Returns the settle signal on the
    /// frame the sequence completes, never again until restarted.
    pub fn advance(&mut self, delta: Duration) -> Option<BlinkSignal> {
        let timer = self.timer.as_mut()?;
        timer.tick(delta);
        let ticks = timer.times_finished_this_tick();

        for _ in 0..ticks {
            if let Some(signal) = self.toggle() {
                return Some(signal);
            }
        }
        None
    }

    fn toggle(&mut self) -> Option<BlinkSignal> {
        self.lit = !self.lit;
        self.intensity = if self.lit { FIXTURE_DIM_INTENSITY } else { 0.0 };

        if !self.lit {
            return None;
        }

        self.blink_count += 1;
        if self.blink_count < BLINK_CYCLES {
            return None;
        }

        self.cancel();
        self.intensity = FIXTURE_BRIGHT_INTENSITY;
        self.phase = BlinkPhase::SettledOn;

        if self.settle_signalled {
            return None;
        }
        self.settle_signalled = true;
        Some(BlinkSignal::Settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval() -> Duration {
        Duration::from_millis(BLINK_INTERVAL_MS)
    }

    fn tick_n(controller: &mut BlinkController, n: usize) -> Vec<BlinkSignal> {
        (0..n).filter_map(|_| controller.advance(interval())).collect()
    }

    #[test]
    fn starts_idle_and_dark() {
        let controller = BlinkController::default();
        assert_eq!(controller.phase(), BlinkPhase::Idle);
        assert_eq!(controller.intensity(), 0.0);
        assert!(!controller.has_active_timer());
    }

    #[test]
    fn settles_after_exactly_six_ticks() {
        let mut controller = BlinkController::default();
        controller.on_theme(ThemeMode::Dark);

        for tick in 1..=5 {
            assert!(controller.advance(interval()).is_none(), "tick {tick}");
            assert_eq!(controller.phase(), BlinkPhase::Blinking);
        }
        assert_eq!(controller.blink_count(), 2);

        assert_eq!(controller.advance(interval()), Some(BlinkSignal::Settled));
        assert_eq!(controller.phase(), BlinkPhase::SettledOn);
        assert_eq!(controller.blink_count(), 3);
        assert_eq!(controller.intensity(), FIXTURE_BRIGHT_INTENSITY);
        assert!(!controller.has_active_timer());
    }

    #[test]
    fn alternates_between_off_and_dim_while_blinking() {
        let mut controller = BlinkController::for_mode(ThemeMode::Dark);
        assert_eq!(controller.intensity(), FIXTURE_DIM_INTENSITY);

        controller.advance(interval());
        assert!(!controller.is_lit());
        assert_eq!(controller.intensity(), 0.0);

        controller.advance(interval());
        assert!(controller.is_lit());
        assert_eq!(controller.intensity(), FIXTURE_DIM_INTENSITY);
        assert_eq!(controller.blink_count(), 1);
    }

    #[test]
    fn partial_interval_does_not_toggle() {
        let mut controller = BlinkController::for_mode(ThemeMode::Dark);
        controller.advance(Duration::from_millis(BLINK_INTERVAL_MS - 1));
        assert!(controller.is_lit());
        assert_eq!(controller.blink_count(), 0);
    }

    #[test]
    fn long_frame_settles_and_signals_once() {
        let mut controller = BlinkController::for_mode(ThemeMode::Dark);
        let signal = controller.advance(interval() * 10);
        assert_eq!(signal, Some(BlinkSignal::Settled));
        assert_eq!(controller.blink_count(), 3);
        assert!(tick_n(&mut controller, 10).is_empty());
        assert_eq!(controller.intensity(), FIXTURE_BRIGHT_INTENSITY);
    }

    #[test]
    fn light_mode_zeroes_and_cancels_from_any_phase() {
        for ticks_before in [0, 1, 3, 6, 8] {
            let mut controller = BlinkController::for_mode(ThemeMode::Dark);
            tick_n(&mut controller, ticks_before);

            controller.on_theme(ThemeMode::Light);
            assert_eq!(controller.phase(), BlinkPhase::Idle);
            assert_eq!(controller.intensity(), 0.0);
            assert!(!controller.has_active_timer());

            assert!(tick_n(&mut controller, 20).is_empty());
            assert_eq!(controller.intensity(), 0.0);
            assert_eq!(controller.phase(), BlinkPhase::Idle);
        }
    }

    #[test]
    fn reentering_dark_restarts_sequence() {
        let mut controller = BlinkController::for_mode(ThemeMode::Dark);
        assert_eq!(tick_n(&mut controller, 6), vec![BlinkSignal::Settled]);

        controller.on_theme(ThemeMode::Light);
        controller.on_theme(ThemeMode::Dark);
        assert_eq!(controller.blink_count(), 0);
        assert_eq!(controller.phase(), BlinkPhase::Blinking);
        assert!(controller.has_active_timer());

        assert_eq!(tick_n(&mut controller, 6), vec![BlinkSignal::Settled]);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut controller = BlinkController::for_mode(ThemeMode::Dark);
        controller.cancel();
        controller.cancel();
        assert!(!controller.has_active_timer());
        assert!(controller.advance(interval()).is_none());
    }
}
