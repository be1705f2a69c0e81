//! Wheel draw
//!
//! Weighted item selection and spin timing. The wheel itself is drawn by the
//! host page; this module decides where it stops and when it ticks, and the
//! host calls `tension()`/`celebrate()` around the spin.

pub mod items;
pub mod lottery;
pub mod spin;

pub use items::{WheelItem, default_items, parse_items};
pub use lottery::{Segment, pick_index, segments};
pub use spin::{POINTER_DEG, SPIN_DURATION_MS, SpinPlan, TickTracker, plan_spin};
