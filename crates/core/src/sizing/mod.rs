use crate::LayoutConfig;

/// Derives the text box width from measured content width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeCalculator {
    pub padding: f32,
    pub min_width: f32,
    pub max_width: f32,
}

impl SizeCalculator {
    pub fn new(padding: f32, min_width: f32, max_width: f32) -> Self {
        Self {
            padding,
            min_width,
            max_width: max_width.max(min_width),
        }
    }

    pub fn from_layout(layout: &LayoutConfig) -> Self {
        Self::new(layout.padding, layout.min_width, layout.max_width)
    }

    /// `clamp(measured + padding, min_width, max_width)`. Non-finite or
    /// negative measurements are treated as zero.
    pub fn width(&self, measured_content_width: f32) -> f32 {
        let measured = if measured_content_width.is_finite() {
            measured_content_width.max(0.0)
        } else if measured_content_width == f32::INFINITY {
            self.max_width
        } else {
            0.0
        };

        (measured + self.padding).clamp(self.min_width, self.max_width)
    }

    /// Width the box should grow to after a new measurement, or `None` when
    /// the current width already covers the content. Never shrinks.
    pub fn grow(&self, current_width: f32, measured_content_width: f32) -> Option<f32> {
        let target = self.width(measured_content_width);
        (target > current_width).then_some(target)
    }
}

impl Default for SizeCalculator {
    fn default() -> Self {
        Self::from_layout(&LayoutConfig::default())
    }
}
