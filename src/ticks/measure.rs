use serde::{Deserialize, Serialize};

/// Direction labels run relative to the axis line.
///
/// A horizontal axis stacks labels side by side (width governs collisions);
/// a vertical axis stacks them top to bottom (height governs collisions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AxisOrientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Rendered size of one label in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelExtent {
    pub width_px: f64,
    pub height_px: f64,
}

impl LabelExtent {
    /// Extent along the axis direction for collision purposes.
    #[must_use]
    pub fn along(self, orientation: AxisOrientation) -> f64 {
        match orientation {
            AxisOrientation::Horizontal => self.width_px,
            AxisOrientation::Vertical => self.height_px,
        }
    }
}

/// One label's occupied interval along the axis, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelBox {
    pub min_px: f64,
    pub max_px: f64,
}

impl LabelBox {
    #[must_use]
    pub fn centered(center_px: f64, extent_px: f64) -> Self {
        Self {
            min_px: center_px - extent_px / 2.0,
            max_px: center_px + extent_px / 2.0,
        }
    }

    #[must_use]
    pub fn intersects(self, other: LabelBox) -> bool {
        self.min_px < other.max_px && other.min_px < self.max_px
    }
}

/// True when any two adjacent boxes overlap. Boxes must be in axis order.
#[must_use]
pub fn any_adjacent_collision(boxes: &[LabelBox]) -> bool {
    boxes
        .windows(2)
        .any(|pair| pair[0].intersects(pair[1]))
}

/// Host-supplied label measurement: string to rendered bounding box.
///
/// The core never touches fonts; a GUI adapter implements this against its
/// text stack.
pub trait LabelMeasurer {
    fn measure(&self, label: &str) -> LabelExtent;
}

/// Fixed-cell fallback measurer for headless use and tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharCellMeasurer {
    pub char_width_px: f64,
    pub line_height_px: f64,
}

impl Default for CharCellMeasurer {
    fn default() -> Self {
        Self {
            char_width_px: 7.0,
            line_height_px: 14.0,
        }
    }
}

impl LabelMeasurer for CharCellMeasurer {
    fn measure(&self, label: &str) -> LabelExtent {
        LabelExtent {
            width_px: self.char_width_px * label.chars().count() as f64,
            height_px: self.line_height_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_collision_detects_overlap() {
        let clear = [
            LabelBox::centered(0.0, 10.0),
            LabelBox::centered(20.0, 10.0),
        ];
        let packed = [
            LabelBox::centered(0.0, 30.0),
            LabelBox::centered(20.0, 30.0),
        ];
        assert!(!any_adjacent_collision(&clear));
        assert!(any_adjacent_collision(&packed));
    }

    #[test]
    fn char_cell_measurer_scales_with_length() {
        let measurer = CharCellMeasurer::default();
        let extent = measurer.measure("12.5");
        assert_eq!(extent.width_px, 28.0);
        assert_eq!(extent.along(AxisOrientation::Vertical), 14.0);
    }
}
