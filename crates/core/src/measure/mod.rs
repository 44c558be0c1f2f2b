//! Measurement seam between the sequencer and whatever lays out the text.

use crate::{LayoutConfig, TextField};

/// Reports the rendered width of one text field. The container is as wide as
/// its widest field.
pub trait TextMeasure {
    fn text_width(&self, field: TextField, text: &str) -> f32;

    /// Width of `text` right after `appended` was pushed onto it, given its
    /// width before. Measures the whole string again unless the layout
    /// allows something cheaper.
    fn appended_width(&self, field: TextField, text: &str, _previous: f32, _appended: char) -> f32 {
        self.text_width(field, text)
    }
}

impl<F> TextMeasure for F
where
    F: Fn(TextField, &str) -> f32,
{
    fn text_width(&self, field: TextField, text: &str) -> f32 {
        self(field, text)
    }
}

/// Fixed-advance approximation: every character is `char_width` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharWidthMeasure {
    pub char_width: f32,
}

impl CharWidthMeasure {
    pub fn new(char_width: f32) -> Self {
        Self { char_width }
    }

    pub fn from_layout(layout: &LayoutConfig) -> Self {
        Self::new(layout.char_width)
    }
}

impl Default for CharWidthMeasure {
    fn default() -> Self {
        Self::from_layout(&LayoutConfig::default())
    }
}

impl TextMeasure for CharWidthMeasure {
    fn text_width(&self, _field: TextField, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }

    fn appended_width(&self, _field: TextField, _text: &str, previous: f32, _appended: char) -> f32 {
        previous + self.char_width
    }
}
