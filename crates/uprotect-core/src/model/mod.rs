//! Domain model for cameras managed by a UniFi Protect NVR.
//!
//! Everything in here is plain data. The types are produced by
//! [`crate::convert`] from raw API payloads and live behind `Arc`s in the
//! [`crate::store::CameraStore`], so they stay cheap to clone and free of
//! any I/O concerns.

mod camera;
mod id;
mod nvr;

pub use camera::{CameraState, DeviceClass, IrMode, RecordingMode};
pub use id::CameraId;
pub use nvr::NvrInfo;
