//! Reference pulse-train actuator over embedded-hal 1.0 pins.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{ActuatorError, Result};

use super::StepActuator;

/// Step pulse width in nanoseconds (most drivers need 1-10 µs).
const PULSE_WIDTH_NS: u32 = 2_000;

/// Software-stepped actuator driving STEP/DIR/EN pins.
///
/// [`StepActuator`] methods only record intent; pin writes happen in
/// [`service`](Self::service) so the trait methods stay infallible when
/// called from the tick context. Firmware calls `service` from its step
/// loop; each call emits at most one pulse and then waits one step interval.
///
/// The enable pin is treated as active-low, the common convention for
/// stepper drivers.
pub struct PulseStepper<STEP, DIR, EN, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
{
    step_pin: STEP,
    dir_pin: DIR,
    en_pin: EN,
    delay: DELAY,

    /// Steps left in the commanded move.
    pending: u32,

    /// Direction of the commanded move.
    forward: bool,

    /// Direction currently on the DIR pin (cached to avoid pin writes).
    applied_direction: Option<bool>,

    enabled: bool,

    /// Enable state currently on the EN pin.
    applied_enable: Option<bool>,

    step_rate: u32,
    max_rate: f32,
    moved_last_block: bool,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,
}

impl<STEP, DIR, EN, DELAY> PulseStepper<STEP, DIR, EN, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
{
    /// Create a new pulse stepper bound to its pins.
    pub fn new(step_pin: STEP, dir_pin: DIR, en_pin: EN, delay: DELAY) -> Self {
        Self {
            step_pin,
            dir_pin,
            en_pin,
            delay,
            pending: 0,
            forward: true,
            applied_direction: None,
            enabled: false,
            applied_enable: None,
            step_rate: 0,
            max_rate: 0.0,
            moved_last_block: false,
            invert_direction: false,
        }
    }

    /// Invert the DIR pin logic.
    pub fn with_inverted_direction(mut self) -> Self {
        self.invert_direction = true;
        self
    }

    /// Emit at most one step pulse and wait one step interval.
    ///
    /// Returns `true` if a pulse was emitted, `false` when idle or paused
    /// (zero step rate).
    pub fn service(&mut self) -> Result<bool> {
        self.apply_enable()?;

        if self.pending == 0 || self.step_rate == 0 {
            return Ok(false);
        }

        self.apply_direction()?;

        // Generate step pulse
        self.step_pin
            .set_high()
            .map_err(|_| ActuatorError::PinError)?;
        self.delay.delay_ns(PULSE_WIDTH_NS);
        self.step_pin
            .set_low()
            .map_err(|_| ActuatorError::PinError)?;

        self.pending -= 1;

        if self.pending > 0 {
            // Delay until the next step (subtract pulse width)
            let interval_ns = 1_000_000_000u32 / self.step_rate;
            let delay_ns = interval_ns.saturating_sub(PULSE_WIDTH_NS);
            if delay_ns > 0 {
                self.delay.delay_ns(delay_ns);
            }
        }

        Ok(true)
    }

    /// Whether the axis stepped during the last block.
    pub fn moved_last_block(&self) -> bool {
        self.moved_last_block
    }

    /// Release the hardware resources.
    pub fn release(self) -> (STEP, DIR, EN, DELAY) {
        (self.step_pin, self.dir_pin, self.en_pin, self.delay)
    }

    fn apply_direction(&mut self) -> Result<()> {
        if self.applied_direction == Some(self.forward) {
            return Ok(());
        }

        let pin_high = self.forward != self.invert_direction;
        if pin_high {
            self.dir_pin
                .set_high()
                .map_err(|_| ActuatorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| ActuatorError::PinError)?;
        }

        self.applied_direction = Some(self.forward);
        Ok(())
    }

    fn apply_enable(&mut self) -> Result<()> {
        if self.applied_enable == Some(self.enabled) {
            return Ok(());
        }

        // Active-low enable
        if self.enabled {
            self.en_pin.set_low().map_err(|_| ActuatorError::PinError)?;
        } else {
            self.en_pin
                .set_high()
                .map_err(|_| ActuatorError::PinError)?;
        }

        self.applied_enable = Some(self.enabled);
        Ok(())
    }
}

impl<STEP, DIR, EN, DELAY> StepActuator for PulseStepper<STEP, DIR, EN, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
{
    fn enable(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn move_steps(&mut self, forward: bool, steps: u32) {
        self.forward = forward;
        self.pending = steps;
    }

    fn stop(&mut self) {
        self.pending = 0;
    }

    fn set_step_rate(&mut self, steps_per_sec: u32) {
        self.step_rate = steps_per_sec;
    }

    fn step_rate(&self) -> u32 {
        self.step_rate
    }

    fn is_moving(&self) -> bool {
        self.pending > 0
    }

    fn max_rate(&self) -> f32 {
        self.max_rate
    }

    fn set_max_rate(&mut self, mm_per_sec: f32) {
        self.max_rate = mm_per_sec;
    }

    fn set_moved_last_block(&mut self, moved: bool) {
        self.moved_last_block = moved;
    }
}
