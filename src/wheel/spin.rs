//! Spin planning and boundary ticks

use rand::Rng;
use serde::Serialize;

use super::items::WheelItem;
use super::lottery::{Segment, pick_index, segments};
use crate::normalize_degrees;

/// Wheel angle (degrees) under the pointer
pub const POINTER_DEG: f64 = 270.0;
pub const SPIN_DURATION_MS: f64 = 6200.0;
const MIN_EXTRA_TURNS: u32 = 6;
const EXTRA_TURN_CHOICES: f64 = 4.0;
/// How close to a boundary counts as passing it
const TICK_WINDOW_DEG: f64 = 1.5;

/// A decided spin: who wins and how the wheel gets there
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinPlan {
    /// Index into the item list
    pub winner: usize,
    pub start_deg: f64,
    pub end_deg: f64,
    pub extra_turns: u32,
    pub duration_ms: f64,
}

impl SpinPlan {
    /// Wheel rotation `elapsed_ms` into the spin (cubic ease-out)
    pub fn angle_at(&self, elapsed_ms: f64) -> f64 {
        let t = (elapsed_ms / self.duration_ms).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        self.start_deg + (self.end_deg - self.start_deg) * eased
    }

    pub fn is_done(&self, elapsed_ms: f64) -> bool {
        elapsed_ms >= self.duration_ms
    }

    /// Rotation to keep once the spin is over, in [0, 360)
    pub fn settled_deg(&self) -> f64 {
        normalize_degrees(self.end_deg)
    }
}

/// Draw a winner and plan a spin that lands its segment under the pointer.
/// `None` when no item is drawable.
pub fn plan_spin<R: Rng + ?Sized>(items: &[WheelItem], current_deg: f64, rng: &mut R) -> Option<SpinPlan> {
    let segs = segments(items);
    let winner = pick_index(items, rng)?;
    let seg = segs.iter().find(|s| s.index == winner)?;

    let extra_turns = MIN_EXTRA_TURNS + (rng.random::<f64>() * EXTRA_TURN_CHOICES) as u32;
    let target = POINTER_DEG - seg.mid_deg();
    let end_deg = current_deg + (target - current_deg) + f64::from(extra_turns) * 360.0;

    log::debug!(
        "spin: winner {} ({}), {} extra turns, {:.1} -> {:.1}",
        winner,
        items[winner].name,
        extra_turns,
        current_deg,
        end_deg
    );

    Some(SpinPlan {
        winner,
        start_deg: current_deg,
        end_deg,
        extra_turns,
        duration_ms: SPIN_DURATION_MS,
    })
}

/// Fires once each time the wheel passes a segment boundary
#[derive(Debug, Clone)]
pub struct TickTracker {
    boundaries: Vec<f64>,
    last: Option<usize>,
}

impl TickTracker {
    pub fn new(segments: &[Segment]) -> Self {
        let mut boundaries: Vec<f64> = segments.iter().map(Segment::start_deg).collect();
        boundaries.sort_by(f64::total_cmp);
        Self {
            boundaries,
            last: None,
        }
    }

    pub fn for_items(items: &[WheelItem]) -> Self {
        Self::new(&segments(items))
    }

    /// Feed the current rotation; returns true when a tick should sound
    pub fn update(&mut self, angle_deg: f64) -> bool {
        let norm = normalize_degrees(angle_deg);
        let mut tick = false;
        for (i, &boundary) in self.boundaries.iter().enumerate() {
            let diff = ((norm - boundary + 540.0).rem_euclid(360.0) - 180.0).abs();
            if diff < TICK_WINDOW_DEG && self.last != Some(i) {
                self.last = Some(i);
                tick = true;
            }
        }
        tick
    }
}
