use crate::error::{PlotError, PlotResult};

/// Packs an ARGB pixel from an alpha byte and a 24-bit RGB color.
#[must_use]
pub const fn argb(alpha: u8, rgb: u32) -> u32 {
    ((alpha as u32) << 24) | (rgb & 0x00FF_FFFF)
}

#[must_use]
pub const fn alpha_of(pixel: u32) -> u8 {
    (pixel >> 24) as u8
}

/// One-dimensional affine pixel map `new_px = scale * old_px + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMap {
    pub scale: f64,
    pub offset: f64,
}

impl AffineMap {
    #[must_use]
    pub fn apply(self, pixel: f64) -> f64 {
        self.scale * pixel + self.offset
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        (pixel - self.offset) / self.scale
    }
}

const MAX_RASTER_PIXELS: usize = 1 << 26;

/// A CPU-side ARGB pixel buffer with the handful of drawing primitives the
/// plot core needs. Hosts blit the finished buffer into their surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaRaster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl RgbaRaster {
    pub fn new(width: u32, height: u32) -> PlotResult<Self> {
        if width == 0 || height == 0 {
            return Err(PlotError::InvalidData(format!(
                "raster dimensions must be non-zero: {width}x{height}"
            )));
        }
        let area = width as usize * height as usize;
        if area > MAX_RASTER_PIXELS {
            return Err(PlotError::InvalidData(format!(
                "raster too large: {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0; area],
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        (x < self.width && y < self.height)
            .then(|| self.pixels[y as usize * self.width as usize + x as usize])
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Writes a pixel, replacing whatever is there. Out-of-bounds writes are
    /// dropped silently: callers draw clamped device coordinates.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        self.pixels[y as usize * self.width as usize + x as usize] = color;
    }

    /// Source-over blend of `color` onto the pixel at `(x, y)`.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.pixels[index] = blend_over(color, self.pixels[index]);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: u32) {
        for yy in y..y + height as i32 {
            for xx in x..x + width as i32 {
                self.blend_pixel(xx, yy, color);
            }
        }
    }

    /// Bresenham line, blended.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let step_x = if x0 < x1 { 1 } else { -1 };
        let step_y = if y0 < y1 { 1 } else { -1 };
        let mut error = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.blend_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x += step_x;
            }
            if doubled <= dx {
                error += dx;
                y += step_y;
            }
        }
    }

    /// Blends `source` onto this raster with its top-left corner at `(x, y)`.
    pub fn blit(&mut self, source: &RgbaRaster, x: i32, y: i32) {
        for sy in 0..source.height {
            for sx in 0..source.width {
                let pixel = source.pixels[sy as usize * source.width as usize + sx as usize];
                if alpha_of(pixel) > 0 {
                    self.blend_pixel(x + sx as i32, y + sy as i32, pixel);
                }
            }
        }
    }

    /// Nearest-neighbour resample of this raster through per-axis affine
    /// maps (old pixel to new pixel). Dest pixels with no source fall back
    /// to transparent.
    pub fn affine_resample(
        &self,
        x_map: AffineMap,
        y_map: AffineMap,
        width: u32,
        height: u32,
    ) -> PlotResult<RgbaRaster> {
        if x_map.scale == 0.0 || y_map.scale == 0.0 {
            return Err(PlotError::InvalidData(
                "affine resample scale must be non-zero".to_owned(),
            ));
        }
        let mut out = RgbaRaster::new(width, height)?;
        for y in 0..height {
            let src_y = y_map.invert(f64::from(y) + 0.5).floor();
            for x in 0..width {
                let src_x = x_map.invert(f64::from(x) + 0.5).floor();
                if src_x >= 0.0
                    && src_y >= 0.0
                    && (src_x as u32) < self.width
                    && (src_y as u32) < self.height
                {
                    let pixel =
                        self.pixels[src_y as usize * self.width as usize + src_x as usize];
                    out.pixels[y as usize * width as usize + x as usize] = pixel;
                }
            }
        }
        Ok(out)
    }

    /// Blends a uniform color over every pixel, used for staleness tinting.
    pub fn tint(&mut self, color: u32) {
        for pixel in &mut self.pixels {
            *pixel = blend_over(color, *pixel);
        }
    }
}

fn blend_over(src: u32, dst: u32) -> u32 {
    let src_alpha = u32::from(alpha_of(src));
    if src_alpha == 255 {
        return src;
    }
    if src_alpha == 0 {
        return dst;
    }
    let inverse = 255 - src_alpha;
    let dst_alpha = u32::from(alpha_of(dst));
    let out_alpha = src_alpha + dst_alpha * inverse / 255;

    let channel = |shift: u32| -> u32 {
        let src_channel = (src >> shift) & 0xFF;
        let dst_channel = (dst >> shift) & 0xFF;
        if out_alpha == 0 {
            return 0;
        }
        (src_channel * src_alpha + dst_channel * dst_alpha * inverse / 255) / out_alpha
    };

    (out_alpha << 24) | (channel(16) << 16) | (channel(8) << 8) | channel(0)
}
