//! Parsed machine-command view.
//!
//! The command-text parser/dispatcher lives outside this crate; it hands the
//! axis a pre-parsed view of each motion command. The same type is used for
//! the small synthetic commands the retract sequence submits back through
//! the external entry point.

use crate::config::units::{Millimeters, MmPerSec};

/// Coordinated travel below this is treated as zero (Solo move).
///
/// With floating point, commanded zero travel can arrive as a denormal
/// residue; the threshold must match the one used by the primary planner.
pub const TRAVEL_EPSILON: f32 = 1e-5;

/// A parsed motion command as seen by the feed axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisCommand {
    /// Feed amount parameter, if the command carries one.
    ///
    /// Linear mm (or mm³ in volumetric mode); an absolute spool angle in
    /// degrees when the axis is configured for rotary feed.
    pub feed: Option<f32>,

    /// Feed rate parameter in mm/s, if present.
    pub feed_rate: Option<MmPerSec>,

    /// Total travel of the other axes in this command's block, in mm.
    pub travel: Millimeters,

    /// Whether the global positioning mode was absolute when the command
    /// was evaluated.
    pub absolute: bool,

    /// Z word, if the command moves the Z axis.
    pub z: Option<Millimeters>,
}

impl AxisCommand {
    /// A feed-only command with no coordinated travel (Solo candidate).
    pub fn solo_feed(feed: f32, absolute: bool) -> Self {
        Self {
            feed: Some(feed),
            absolute,
            ..Self::default()
        }
    }

    /// A feed command accompanying `travel` mm of motion on the other axes.
    pub fn follow_feed(feed: f32, travel: f32, absolute: bool) -> Self {
        Self {
            feed: Some(feed),
            travel: Millimeters(travel),
            absolute,
            ..Self::default()
        }
    }

    /// A synthetic single-axis relative Z move with an explicit feed rate,
    /// as submitted around firmware retract for the Z-hop.
    pub fn relative_z(delta: f32, feed_rate: MmPerSec) -> Self {
        Self {
            z: Some(Millimeters(delta)),
            feed_rate: Some(feed_rate),
            absolute: false,
            ..Self::default()
        }
    }

    /// A synthetic relative feed move with an explicit feed rate, as
    /// submitted for the main retract/recover motion.
    pub fn relative_feed(delta: f32, feed_rate: MmPerSec) -> Self {
        Self {
            feed: Some(delta),
            feed_rate: Some(feed_rate),
            absolute: false,
            ..Self::default()
        }
    }

    /// Whether the accompanying multi-axis travel is effectively zero.
    #[inline]
    pub fn is_solo_travel(&self) -> bool {
        libm::fabsf(self.travel.value()) < TRAVEL_EPSILON
    }

    /// Whether this command moves Z in absolute mode.
    #[inline]
    pub fn is_absolute_z_move(&self) -> bool {
        self.absolute && self.z.is_some()
    }
}
