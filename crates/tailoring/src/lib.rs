//! `shoploom-tailoring` — measurements and work tracking for tailoring
//! businesses.

pub mod measurement;
pub mod task;

pub use measurement::{Dimensions, GarmentType, Measurement, NewMeasurement};
pub use task::{NewTask, Task, TaskPatch, TaskStatus};
