//! Character-by-character reveal of a single text field.
//!
//! A reveal pass turns a string into display units, decides how fast to show
//! them and tracks how many are visible. Scheduling the per-character steps is
//! left to the sequencer so they share its cancellation registry.

use std::time::Duration;

use crate::TextField;

/// Splits `text` into one display unit per character. Whitespace is kept
/// verbatim, never trimmed or collapsed, so a partly revealed string keeps
/// its trailing spaces and their width.
pub fn reveal_units(text: &str) -> Vec<char> {
    text.chars().collect()
}

/// Per-character interval: `base`, halved once the text is longer than
/// `long_text_threshold` characters.
pub fn reveal_interval(char_count: usize, base: Duration, long_text_threshold: usize) -> Duration {
    if char_count > long_text_threshold {
        base / 2
    } else {
        base
    }
}

/// Timing of one reveal pass, relative to its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealPlan {
    pub units: usize,
    pub interval: Duration,
    pub settle: Duration,
}

impl RevealPlan {
    pub fn new(units: usize, base: Duration, long_text_threshold: usize, settle: Duration) -> Self {
        Self {
            units,
            interval: reveal_interval(units, base, long_text_threshold),
            settle,
        }
    }

    pub fn char_offset(&self, index: usize) -> Duration {
        self.interval * index as u32
    }

    /// When the pass reports completion: after the last character's slot
    /// plus the settle delay.
    pub fn completion_offset(&self) -> Duration {
        self.interval * self.units as u32 + self.settle
    }
}

/// Progress of one field's reveal. The shown prefix grows in place, one
/// unit per step.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealState {
    field: TextField,
    units: Vec<char>,
    visible: usize,
    shown: String,
}

impl RevealState {
    pub fn new(field: TextField, text: &str) -> Self {
        Self {
            field,
            units: reveal_units(text),
            visible: 0,
            shown: String::with_capacity(text.len()),
        }
    }

    pub fn field(&self) -> TextField {
        self.field
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn unit(&self, index: usize) -> Option<char> {
        self.units.get(index).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.visible == self.units.len()
    }

    /// Makes every unit up to and including `index` visible. Out-of-range
    /// indices and indices already shown leave the state unchanged.
    pub fn reveal_through(&mut self, index: usize) -> bool {
        if index >= self.units.len() || index < self.visible {
            return false;
        }
        self.shown.extend(&self.units[self.visible..=index]);
        self.visible = index + 1;
        true
    }

    pub fn visible_text(&self) -> &str {
        &self.shown
    }
}
