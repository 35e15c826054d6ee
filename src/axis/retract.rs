//! Firmware retract/recover sequencing.

use crate::command::AxisCommand;
use crate::config::RetractConfig;
use crate::hal::{BlockQueue, CommandSink};

/// Two-state retract sequencer with optional Z-hop.
///
/// Retract withdraws a fixed filament length; recover feeds it back plus an
/// optional extra length. Both are synthesized as relative feed moves and
/// pushed back through the external command entry point, followed by an
/// exclusive block so no later command overlaps them. Duplicate requests in
/// the current state are ignored.
#[derive(Debug, Clone)]
pub struct RetractController {
    config: RetractConfig,
    retracted: bool,
    cancel_zlift_restore: bool,
}

impl RetractController {
    /// Create a sequencer in the not-retracted state.
    pub fn new(config: RetractConfig) -> Self {
        Self {
            config,
            retracted: false,
            cancel_zlift_restore: false,
        }
    }

    /// Whether the filament is currently retracted.
    pub fn is_retracted(&self) -> bool {
        self.retracted
    }

    /// The retract parameters.
    pub fn config(&self) -> &RetractConfig {
        &self.config
    }

    /// Mutable access for runtime setting edits.
    pub fn config_mut(&mut self) -> &mut RetractConfig {
        &mut self.config
    }

    /// Perform the retract sequence. Returns `false` if already retracted.
    ///
    /// The hop is submitted before the main retract move, under saved and
    /// forced-relative global mode so the caller's positioning mode is
    /// untouched.
    pub fn retract<Q: BlockQueue + CommandSink>(&mut self, queue: &mut Q) -> bool {
        if self.retracted {
            return false;
        }
        self.retracted = true;
        self.cancel_zlift_restore = false;

        if self.config.zlift_length.value() > 0.0 {
            self.submit_hop(queue, self.config.zlift_length.value());
        }

        queue.submit(&AxisCommand::relative_feed(
            -self.config.length.value(),
            self.config.feed_rate,
        ));
        queue.queue_exclusive_block();
        true
    }

    /// Perform the recover sequence. Returns `false` if not retracted.
    pub fn unretract<Q: BlockQueue + CommandSink>(&mut self, queue: &mut Q) -> bool {
        if !self.retracted {
            return false;
        }
        self.retracted = false;

        if self.config.zlift_length.value() > 0.0 && !self.cancel_zlift_restore {
            self.submit_hop(queue, -self.config.zlift_length.value());
        }

        let recover = self.config.length.value() + self.config.recover_length.value();
        queue.submit(&AxisCommand::relative_feed(
            recover,
            self.config.recover_feed_rate,
        ));
        queue.queue_exclusive_block();
        true
    }

    /// Observe a processed motion command.
    ///
    /// An absolute Z move while retracted repositions Z on its own; the
    /// downward hop is skipped on the next recover so it is not replayed on
    /// top of the new height.
    pub fn note_command(&mut self, command: &AxisCommand) {
        if self.retracted && command.is_absolute_z_move() {
            self.cancel_zlift_restore = true;
        }
    }

    fn submit_hop<Q: BlockQueue + CommandSink>(&self, queue: &mut Q, delta: f32) {
        queue.push_state();
        queue.set_relative_mode();
        queue.submit(&AxisCommand::relative_z(delta, self.config.zlift_feed_rate));
        queue.pop_state();
    }
}
