use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{LowerThirdError, Result};

/// Top-level configuration structure for the overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub timings: TimingConfig,
    pub layout: LayoutConfig,
    pub text: TextConfig,
    pub style: StyleConfig,
}

impl OverlayConfig {
    /// Reads a JSON config file. Sections missing from the file keep their
    /// defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.layout.min_width > self.layout.max_width {
            return Err(LowerThirdError::InvalidConfig(format!(
                "min_width {} exceeds max_width {}",
                self.layout.min_width, self.layout.max_width
            )));
        }
        if self.layout.min_width < 0.0 || self.layout.padding < 0.0 {
            return Err(LowerThirdError::InvalidConfig(
                "widths and padding must be non-negative".to_string(),
            ));
        }
        if self.timings.char_interval_ms == 0 {
            return Err(LowerThirdError::InvalidConfig(
                "char_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Phase timings, stored as whole milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between the reset and the box/logo moving on-stage.
    pub entrance_delay_ms: u64,
    /// Delay between entering and the box starting to widen.
    pub expand_delay_ms: u64,
    /// Delay between widening and the first character being revealed.
    pub reveal_delay_ms: u64,
    /// Base per-character reveal interval.
    pub char_interval_ms: u64,
    /// Strings longer than this many characters reveal at half the interval.
    pub long_text_threshold: usize,
    /// Pause after the last character before the next field starts.
    pub settle_delay_ms: u64,
    pub shimmer_duration_ms: u64,
    /// How long the fully revealed graphic stays up before hiding itself.
    pub hold_duration_ms: u64,
    pub exit_collapse_delay_ms: u64,
    pub exit_logo_flourish_delay_ms: u64,
    pub exit_logo_retreat_delay_ms: u64,
    pub exit_box_retreat_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            entrance_delay_ms: 100,
            expand_delay_ms: 700,
            reveal_delay_ms: 700,
            char_interval_ms: 45,
            long_text_threshold: 100,
            settle_delay_ms: 150,
            shimmer_duration_ms: 1_200,
            hold_duration_ms: 10_000,
            exit_collapse_delay_ms: 300,
            exit_logo_flourish_delay_ms: 500,
            exit_logo_retreat_delay_ms: 800,
            exit_box_retreat_delay_ms: 1_100,
        }
    }
}

impl TimingConfig {
    pub fn entrance_delay(&self) -> Duration {
        Duration::from_millis(self.entrance_delay_ms)
    }

    pub fn expand_delay(&self) -> Duration {
        Duration::from_millis(self.expand_delay_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn char_interval(&self) -> Duration {
        Duration::from_millis(self.char_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn shimmer_duration(&self) -> Duration {
        Duration::from_millis(self.shimmer_duration_ms)
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_duration_ms)
    }

    pub fn exit_collapse_delay(&self) -> Duration {
        Duration::from_millis(self.exit_collapse_delay_ms)
    }

    pub fn exit_logo_flourish_delay(&self) -> Duration {
        Duration::from_millis(self.exit_logo_flourish_delay_ms)
    }

    pub fn exit_logo_retreat_delay(&self) -> Duration {
        Duration::from_millis(self.exit_logo_retreat_delay_ms)
    }

    pub fn exit_box_retreat_delay(&self) -> Duration {
        Duration::from_millis(self.exit_box_retreat_delay_ms)
    }
}

/// Geometry of the text box, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Lateral padding added to the measured content width.
    pub padding: f32,
    /// Base width the box expands to before any text is revealed.
    pub min_width: f32,
    pub max_width: f32,
    /// Advance used by [`crate::CharWidthMeasure`].
    pub char_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 40.0,
            min_width: 320.0,
            max_width: 1_200.0,
            char_width: 14.0,
        }
    }
}

/// Fixed and fallback strings shown in the text box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub label: String,
    pub default_artist: String,
    pub default_song: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            label: "NOW PLAYING:".to_string(),
            default_artist: "Artist Name".to_string(),
            default_song: "Song Title".to_string(),
        }
    }
}

/// Presentation values handed through to whatever paints the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub box_color: String,
    pub text_color: String,
    pub accent_color: String,
    pub font_family: String,
    pub corner_radius: f32,
    pub shadow: String,
    pub logo_path: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            box_color: "#111111e6".to_string(),
            text_color: "#ffffff".to_string(),
            accent_color: "#e10600".to_string(),
            font_family: "Oswald, sans-serif".to_string(),
            corner_radius: 12.0,
            shadow: "0 4px 18px rgba(0, 0, 0, 0.45)".to_string(),
            logo_path: "assets/logo.png".to_string(),
        }
    }
}
