use crate::foundation::core::Length;

/// Opaque sizing input used for line-height defaults.
///
/// Real font metrics come from an external collaborator; layout only asks for the default
/// line height of a font size.
pub trait FontMetricsProvider {
    /// Default line height for the given font size.
    fn line_height(&self, font_size: Length) -> Length;

    /// Font size used when a node does not specify one.
    fn default_font_size(&self) -> Length {
        12.0
    }
}

/// Metrics with a fixed line-height factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedMetrics {
    /// Line height as a multiple of the font size.
    pub line_height_factor: f64,
    /// Font size used when none is specified.
    pub font_size: Length,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            line_height_factor: 1.2,
            font_size: 12.0,
        }
    }
}

impl FontMetricsProvider for FixedMetrics {
    fn line_height(&self, font_size: Length) -> Length {
        font_size * self.line_height_factor
    }

    fn default_font_size(&self) -> Length {
        self.font_size
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/metrics.rs"]
mod tests;
