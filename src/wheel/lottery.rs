//! Segment layout and the weighted draw

use std::f64::consts::{FRAC_PI_2, TAU};

use rand::Rng;

use super::items::WheelItem;

/// Angular extent of one drawable item (radians, clockwise from 12 o'clock
/// at -π/2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Index into the original item list
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub mid: f64,
}

impl Segment {
    #[inline]
    pub fn start_deg(&self) -> f64 {
        crate::normalize_degrees(self.start.to_degrees())
    }

    #[inline]
    pub fn mid_deg(&self) -> f64 {
        crate::normalize_degrees(self.mid.to_degrees())
    }
}

/// Lay out drawable items around the wheel, spans proportional to weight
pub fn segments(items: &[WheelItem]) -> Vec<Segment> {
    let total: f64 = items.iter().filter(|it| it.is_drawable()).map(|it| it.weight).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut acc = -FRAC_PI_2;
    items
        .iter()
        .enumerate()
        .filter(|(_, it)| it.is_drawable())
        .map(|(index, it)| {
            let start = acc;
            let end = acc + it.weight / total * TAU;
            acc = end;
            Segment {
                index,
                start,
                end,
                mid: (start + end) / 2.0,
            }
        })
        .collect()
}

/// Weighted draw over drawable items. Returns an index into `items`, or
/// `None` when nothing can be drawn.
pub fn pick_index<R: Rng + ?Sized>(items: &[WheelItem], rng: &mut R) -> Option<usize> {
    let total: f64 = items.iter().filter(|it| it.is_drawable()).map(|it| it.weight).sum();
    if total <= 0.0 {
        return None;
    }

    let mut t = rng.random::<f64>() * total;
    let mut last = None;
    for (index, item) in items.iter().enumerate().filter(|(_, it)| it.is_drawable()) {
        t -= item.weight;
        if t <= 0.0 {
            return Some(index);
        }
        last = Some(index);
    }
    // Rounding left a sliver of t
    last
}
