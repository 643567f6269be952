use crate::error::{PlotError, PlotResult};
use crate::raster::surface::{RgbaRaster, argb};

/// A 2-D grid of unsigned hit counts at device-pixel resolution.
///
/// Created per render pass and discarded after conversion to color.
/// Increments saturate rather than wrap, so arbitrarily dense data never
/// corrupts the counts.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelHistogram {
    width: usize,
    height: usize,
    counts: Vec<u32>,
}

impl PixelHistogram {
    pub fn new(width: usize, height: usize) -> PlotResult<Self> {
        if width == 0 || height == 0 {
            return Err(PlotError::InvalidData(format!(
                "histogram dimensions must be non-zero: {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            counts: vec![0; width * height],
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn increment(&mut self, column: usize, row: usize) {
        if column < self.width && row < self.height {
            let count = &mut self.counts[row * self.width + column];
            *count = count.saturating_add(1);
        }
    }

    #[must_use]
    pub fn count(&self, column: usize, row: usize) -> u32 {
        if column < self.width && row < self.height {
            self.counts[row * self.width + column]
        } else {
            0
        }
    }

    #[must_use]
    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    #[must_use]
    pub fn total_hits(&self) -> u64 {
        self.counts.iter().map(|count| u64::from(*count)).sum()
    }

    /// Saturating element-wise merge, used by the parallel fill path.
    pub fn merge(&mut self, other: &PixelHistogram) {
        debug_assert_eq!(self.counts.len(), other.counts.len());
        for (count, addend) in self.counts.iter_mut().zip(&other.counts) {
            *count = count.saturating_add(*addend);
        }
    }

    /// Alpha byte for a bin count under the given saturation calibration:
    /// full opacity at `saturation_hit_count` hits, linear below.
    #[must_use]
    pub fn alpha_for(count: u32, saturation_hit_count: u32) -> u8 {
        let saturation = saturation_hit_count.max(1);
        let scaled = u64::from(count) * 255 / u64::from(saturation);
        scaled.min(255) as u8
    }

    /// Blends the density shading onto `raster` in `base_rgb`.
    pub fn shade_onto(&self, raster: &mut RgbaRaster, base_rgb: u32, saturation_hit_count: u32) {
        for row in 0..self.height {
            for column in 0..self.width {
                let count = self.counts[row * self.width + column];
                if count == 0 {
                    continue;
                }
                let alpha = Self::alpha_for(count, saturation_hit_count);
                raster.blend_pixel(column as i32, row as i32, argb(alpha, base_rgb));
            }
        }
    }
}
