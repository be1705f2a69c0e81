//! Effect settings and preferences
//!
//! Persisted in LocalStorage, separate from anything the host page stores.

use serde::{Deserialize, Serialize};

use crate::fx::{EffectOptions, EmitterCounts};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Emitter populations for this preset
    pub fn emitter_counts(&self) -> EmitterCounts {
        match self {
            QualityPreset::Low => EmitterCounts {
                burst: 400,
                confetti: 80,
            },
            QualityPreset::Medium => EmitterCounts::default(),
            QualityPreset::High => EmitterCounts {
                burst: 2000,
                confetti: 320,
            },
        }
    }
}

/// Effect settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Emitter population preset
    pub quality: QualityPreset,

    /// Sub-effect toggles
    pub options: EffectOptions,

    // === Accessibility ===
    /// Reduced motion (no camera shake or zoom)
    pub reduced_motion: bool,

    /// Cap on device pixel ratio for the drawing buffer
    pub max_pixel_ratio: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            options: EffectOptions::default(),
            reduced_motion: false,
            max_pixel_ratio: 2.0,
        }
    }
}

impl Settings {
    /// Effect toggles after accessibility overrides
    pub fn effective_options(&self) -> EffectOptions {
        EffectOptions {
            camera: self.options.camera && !self.reduced_motion,
            ..self.options
        }
    }

    pub fn emitter_counts(&self) -> EmitterCounts {
        self.quality.emitter_counts()
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "fortune_fx_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
