//! Shared mock collaborators for the integration and property tests.

#![allow(dead_code)]

use extruder_motion::{
    AngleSensor, AxisCommand, BlockHandle, BlockQueue, CommandSink, StepActuator,
};

/// Everything the axis asked of the external queue, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    PushState,
    PopState,
    RelativeMode,
    Submit(AxisCommand),
    Exclusive,
    WaitForEmpty,
}

/// Recording stand-in for the external motion queue and command sink.
#[derive(Default)]
pub struct MockQueue {
    pub takes: Vec<BlockHandle>,
    pub releases: Vec<BlockHandle>,
    pub events: Vec<QueueEvent>,
}

impl MockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands submitted back through the sink, in order.
    pub fn submitted(&self) -> Vec<AxisCommand> {
        self.events
            .iter()
            .filter_map(|e| match e {
                QueueEvent::Submit(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

impl BlockQueue for MockQueue {
    fn take(&mut self, block: BlockHandle) {
        self.takes.push(block);
    }

    fn release(&mut self, block: BlockHandle) {
        self.releases.push(block);
    }

    fn queue_exclusive_block(&mut self) {
        self.events.push(QueueEvent::Exclusive);
    }

    fn wait_for_empty(&mut self) {
        self.events.push(QueueEvent::WaitForEmpty);
    }
}

impl CommandSink for MockQueue {
    fn push_state(&mut self) {
        self.events.push(QueueEvent::PushState);
    }

    fn pop_state(&mut self) {
        self.events.push(QueueEvent::PopState);
    }

    fn set_relative_mode(&mut self) {
        self.events.push(QueueEvent::RelativeMode);
    }

    fn submit(&mut self, command: &AxisCommand) {
        self.events.push(QueueEvent::Submit(*command));
    }
}

/// Recording step actuator.
#[derive(Default)]
pub struct MockActuator {
    pub moves: Vec<(bool, u32)>,
    pub rate: u32,
    pub max_rate: f32,
    pub moving: bool,
    pub enabled: bool,
    pub moved_last_block: Option<bool>,
    pub stopped: bool,
    /// Report moves as instantly complete (for blocking sequences).
    pub auto_finish: bool,
}

impl MockActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instant() -> Self {
        Self {
            auto_finish: true,
            ..Self::default()
        }
    }

    /// Net signed step count over all recorded moves.
    pub fn net_steps(&self) -> i64 {
        self.moves
            .iter()
            .map(|(forward, steps)| {
                if *forward {
                    i64::from(*steps)
                } else {
                    -i64::from(*steps)
                }
            })
            .sum()
    }
}

impl StepActuator for MockActuator {
    fn enable(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn move_steps(&mut self, forward: bool, steps: u32) {
        self.moves.push((forward, steps));
        self.moving = !self.auto_finish;
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.moving = false;
    }

    fn set_step_rate(&mut self, steps_per_sec: u32) {
        self.rate = steps_per_sec;
    }

    fn step_rate(&self) -> u32 {
        self.rate
    }

    fn is_moving(&self) -> bool {
        self.moving
    }

    fn max_rate(&self) -> f32 {
        self.max_rate
    }

    fn set_max_rate(&mut self, mm_per_sec: f32) {
        self.max_rate = mm_per_sec;
    }

    fn set_moved_last_block(&mut self, moved: bool) {
        self.moved_last_block = Some(moved);
    }
}

/// Angle sensor replaying a fixed sample sequence.
pub struct ScriptedSensor {
    samples: Vec<i32>,
    index: usize,
}

impl ScriptedSensor {
    pub fn new(samples: Vec<i32>) -> Self {
        Self { samples, index: 0 }
    }

    /// A flat baseline with one peak at the given sample index.
    pub fn peaking_at(index: usize, len: usize) -> Self {
        let mut samples = vec![100; len];
        samples[index] = 900;
        Self::new(samples)
    }
}

impl AngleSensor for ScriptedSensor {
    fn raw_value(&mut self) -> i32 {
        let value = self.samples.get(self.index).copied().unwrap_or(0);
        self.index += 1;
        value
    }
}
