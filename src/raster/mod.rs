pub mod histogram;
pub mod rebin;
pub mod scatter;
pub mod surface;

pub use histogram::PixelHistogram;
pub use rebin::RebinDescriptor;
pub use scatter::{EnvelopeMode, ScatterOptions, ScatterRasterizer};
pub use surface::{AffineMap, RgbaRaster, alpha_of, argb};
