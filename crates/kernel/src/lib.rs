//! Drive kernel: the per-frame update that makes the scene move.
//!
//! # Invariants
//! - Every frame is a pure function of the configured constants, the
//!   elapsed time, and which optional assets have resolved.
//! - Optional assets resolve at most once and are never removed.
//! - Terrain and wire overlay always share one scroll offset.
//! - Pooled instances are created once and only their transforms change.

mod assets;
mod config;
mod error;
mod pool;
mod scheduler;
mod scroll;
mod slot;
mod stage;
mod timer;

pub use assets::{
    AssetProvider, LoadedAsset, StandInAssets, WHEEL_CONTAINER, palm_prefab, vehicle_prefab,
};
pub use config::{DriveConfig, FlyerMotion, GroundConfig, TerrainConfig, VehicleMotion};
pub use error::KernelError;
pub use pool::{ObjectPool, PoolLayout, PooledInstance, instance_depth};
pub use scheduler::{FrameReport, FrameScheduler};
pub use scroll::{ScrollState, wrap, wrap_narrow, wrap_symmetric};
pub use slot::Slot;
pub use stage::{SceneHandles, Stage, TerrainRig, rgb, rgba};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "outrun-kernel v0.1.0"
}
