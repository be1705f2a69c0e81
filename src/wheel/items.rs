//! Wheel items

use serde::{Deserialize, Serialize};

use crate::error::FxError;

/// One wheel entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelItem {
    pub name: String,
    /// Relative probability; items with weight <= 0 are never drawn
    pub weight: f64,
    /// CSS color for the segment
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_color() -> String {
    "#888888".to_string()
}

fn default_active() -> bool {
    true
}

impl WheelItem {
    pub fn new(name: &str, weight: f64, color: &str) -> Self {
        Self {
            name: name.to_string(),
            weight,
            color: color.to_string(),
            active: true,
        }
    }

    /// Eligible for segments and the draw
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.active && self.weight > 0.0 && self.weight.is_finite()
    }
}

/// Starter list shown before the user edits anything
pub fn default_items() -> Vec<WheelItem> {
    vec![
        WheelItem::new("Sauna", 1.0, "#ff6b6b"),
        WheelItem::new("Board games", 1.0, "#4ecdc4"),
        WheelItem::new("Outdoor walk", 1.0, "#45b7d1"),
        WheelItem::new("Movie night", 1.0, "#96ceb4"),
        WheelItem::new("Cooking", 1.0, "#feca57"),
        WheelItem::new("Gaming", 1.0, "#ff9ff3"),
    ]
}

/// Parse an item list from JSON
pub fn parse_items(json: &str) -> Result<Vec<WheelItem>, FxError> {
    serde_json::from_str(json).map_err(|e| FxError::Items(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_all_drawable() {
        let items = default_items();
        assert_eq!(items.len(), 6);
        assert!(items.iter().all(WheelItem::is_drawable));
    }

    #[test]
    fn test_parse_fills_optional_fields() {
        let items = parse_items(r#"[{"name":"Tea","weight":2}]"#).unwrap();
        assert_eq!(items[0].weight, 2.0);
        assert!(items[0].active);
        assert_eq!(items[0].color, "#888888");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_items("{"), Err(FxError::Items(_))));
        assert!(matches!(parse_items(r#"[{"weight":1}]"#), Err(FxError::Items(_))));
    }

    #[test]
    fn test_zero_or_inactive_items_are_not_drawable() {
        let mut item = WheelItem::new("x", 0.0, "#000");
        assert!(!item.is_drawable());
        item.weight = 1.0;
        item.active = false;
        assert!(!item.is_drawable());
        item.active = true;
        item.weight = f64::NAN;
        assert!(!item.is_drawable());
    }
}
