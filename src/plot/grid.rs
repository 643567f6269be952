use serde::{Deserialize, Serialize};

use crate::core::axis::Axis;
use crate::error::PlotResult;
use crate::plot::layer::{LayerContext, PlotLayer};
use crate::raster::surface::alpha_of;
use crate::ticks::tick_set::TickSet;

/// Grid lines at the tick positions of both axes.
///
/// Holds the tick sets it draws against; the host recomputes and replaces
/// them alongside the axis labels whenever an axis changes.
pub struct GridLayer {
    x_ticks: TickSet,
    y_ticks: TickSet,
    color_argb: u32,
    draw_minor: bool,
}

impl GridLayer {
    #[must_use]
    pub fn new(x_ticks: TickSet, y_ticks: TickSet, color_argb: u32, draw_minor: bool) -> Self {
        Self {
            x_ticks,
            y_ticks,
            color_argb,
            draw_minor,
        }
    }

    pub fn set_ticks(&mut self, x_ticks: TickSet, y_ticks: TickSet) {
        self.x_ticks = x_ticks;
        self.y_ticks = y_ticks;
    }

    fn minor_color(&self) -> u32 {
        let alpha = alpha_of(self.color_argb) / 3;
        (u32::from(alpha) << 24) | (self.color_argb & 0x00FF_FFFF)
    }
}

impl PlotLayer for GridLayer {
    fn name(&self) -> &str {
        "grid"
    }

    fn draw(&self, context: &mut LayerContext<'_>) -> PlotResult<()> {
        let width = context.raster.width() as i32;
        let height = context.raster.height() as i32;
        let x_origin = f64::from(context.x_axis.device_min());
        let y_origin = f64::from(context.y_axis.device_min());

        if self.draw_minor {
            let color = self.minor_color();
            for tick in self.x_ticks.minor() {
                let x = (context.x_axis.transform_datum(*tick)? - x_origin).round() as i32;
                context.raster.draw_line(x, 0, x, height - 1, color);
            }
            for tick in self.y_ticks.minor() {
                let y = (context.y_axis.transform_datum(*tick)? - y_origin).round() as i32;
                context.raster.draw_line(0, y, width - 1, y, color);
            }
        }
        for tick in self.x_ticks.major() {
            let x = (context.x_axis.transform_datum(*tick)? - x_origin).round() as i32;
            context.raster.draw_line(x, 0, x, height - 1, self.color_argb);
        }
        for tick in self.y_ticks.major() {
            let y = (context.y_axis.transform_datum(*tick)? - y_origin).round() as i32;
            context.raster.draw_line(0, y, width - 1, y, self.color_argb);
        }
        Ok(())
    }
}

/// One tick mark on the axis line, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickMark {
    pub pixel: f64,
    pub major: bool,
}

/// One label the host should render beside the axis line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub pixel: f64,
    pub text: String,
}

/// Pixel-space primitives for host-side axis drawing. The host owns fonts
/// and text rendering; this scene tells it where everything goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AxisLabelScene {
    pub tick_marks: Vec<TickMark>,
    pub labels: Vec<AxisLabel>,
}

/// Projects a tick set onto an axis's device interval.
pub fn axis_label_scene(axis: &Axis, ticks: &TickSet) -> PlotResult<AxisLabelScene> {
    let mut scene = AxisLabelScene::default();
    for tick in ticks.major() {
        let pixel = axis.transform_datum(*tick)?;
        scene.tick_marks.push(TickMark { pixel, major: true });
        scene.labels.push(AxisLabel {
            pixel,
            text: ticks.formatter().format(*tick)?,
        });
    }
    for tick in ticks.minor() {
        scene.tick_marks.push(TickMark {
            pixel: axis.transform_datum(*tick)?,
            major: false,
        });
    }
    Ok(scene)
}
