pub mod axis;
pub mod datum;
pub mod datum_range;
pub mod shared_range;
pub mod transform;
pub mod units;

pub use axis::{Axis, AxisMemento, ScaleKind};
pub use datum::Datum;
pub use datum_range::DatumRange;
pub use shared_range::{RangeId, SharedRange};
pub use transform::DEVICE_LIMIT_PX;
pub use units::{Unit, UnitFamily};
