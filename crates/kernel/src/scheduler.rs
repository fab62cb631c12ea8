use std::f64::consts::TAU;

use glam::Quat;
use outrun_common::NodeId;
use outrun_render::{FrameSnapshot, RenderPipeline, ScrollUniforms};
use outrun_scene::{NodeKind, Scene};

use crate::assets::{AssetProvider, LoadedAsset, WHEEL_CONTAINER};
use crate::config::DriveConfig;
use crate::error::KernelError;
use crate::pool::ObjectPool;
use crate::scroll::{ScrollState, wrap_narrow};
use crate::stage::{SceneHandles, Stage};
use crate::timer::FrameTimer;

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    /// Scaled scene time in seconds.
    pub time: f64,
    pub delta_time: f32,
    pub resized: bool,
    pub uniforms: ScrollUniforms,
}

/// Per-frame driver of the drive scene.
///
/// The host calls [`FrameScheduler::tick`] once per display refresh with a
/// monotonically increasing raw time. Everything the tick writes is a
/// function of that time, of the terrain node's scale, and of which asset
/// slots have resolved.
///
/// Time and travel stay in `f64` until they are wrapped, so a session of
/// any length keeps per-frame resolution.
pub struct FrameScheduler {
    config: DriveConfig,
    scroll: ScrollState,
    handles: SceneHandles,
    /// Wheel nodes with their rotation at attach time.
    wheel_bases: Vec<(NodeId, Quat)>,
    timer: FrameTimer,
    frame: u64,
    running: bool,
}

impl FrameScheduler {
    pub fn new(config: DriveConfig, handles: SceneHandles) -> Result<Self, KernelError> {
        config.validate()?;
        let scroll = ScrollState::new(config.speed, config.fog, config.wire_thickness);
        Ok(Self {
            config,
            scroll,
            handles,
            wheel_bases: Vec::new(),
            timer: FrameTimer::default(),
            frame: 0,
            running: true,
        })
    }

    /// Add a loaded asset to the scene and resolve its slot.
    ///
    /// A second asset of the same kind is rejected before the scene is
    /// touched.
    pub fn attach(&mut self, asset: LoadedAsset, scene: &mut Scene) -> Result<(), KernelError> {
        match asset {
            LoadedAsset::Vehicle(prefab) => {
                if self.handles.vehicle.is_ready() {
                    return Err(KernelError::AlreadyResolved("vehicle"));
                }
                let vehicle = scene.instantiate(&prefab, None)?;
                self.handles.vehicle.resolve(vehicle, "vehicle")?;

                match scene.find_by_name(vehicle, WHEEL_CONTAINER) {
                    Some(wheels) => {
                        self.wheel_bases = scene
                            .children(wheels)
                            .iter()
                            .filter_map(|&id| scene.get(id).map(|n| (id, n.transform.rotation)))
                            .collect();
                        self.handles.wheels.resolve(wheels, "wheels")?;
                    }
                    None => tracing::warn!(container = WHEEL_CONTAINER, "vehicle has no wheel container"),
                }
                if let Some(light) = self.handles.tractor_light.and_then(|id| scene.get_mut(id)) {
                    if let NodeKind::PointLight { target, .. } = &mut light.kind {
                        *target = Some(vehicle);
                    }
                }
                tracing::info!(node = %vehicle.short(), wheels = self.wheel_bases.len(), "vehicle attached");
            }
            LoadedAsset::PropTemplate(prefab) => {
                if self.handles.props.is_ready() {
                    return Err(KernelError::AlreadyResolved("prop template"));
                }
                let mut pool = ObjectPool::create(scene, &prefab, self.config.pool.clone())?;
                pool.update_positions(self.scroll.time(), self.config.speed);
                pool.apply(scene);
                self.handles.props.resolve(pool, "prop template")?;
            }
        }
        Ok(())
    }

    /// Attach everything the provider has ready. An asset that fails to
    /// attach is logged and dropped; the rest still attach. Returns how
    /// many assets were attached.
    pub fn poll_assets<A: AssetProvider + ?Sized>(&mut self, provider: &mut A, scene: &mut Scene) -> usize {
        let mut attached = 0;
        for asset in provider.poll() {
            let label = asset.label();
            match self.attach(asset, scene) {
                Ok(()) => attached += 1,
                Err(e) => tracing::warn!(asset = label, "asset not attached: {e}"),
            }
        }
        attached
    }

    /// Build the terrain strip into a running scene. The next tick picks up
    /// its scale and starts scrolling it.
    pub fn attach_terrain(&mut self, scene: &mut Scene) -> Result<(), KernelError> {
        Stage::new(&self.config).attach_terrain(scene, &mut self.handles)
    }

    /// Run one frame. Returns `None` once stopped, without touching the
    /// scene or the pipeline.
    pub fn tick<P: RenderPipeline + ?Sized>(
        &mut self,
        raw_time: f64,
        scene: &mut Scene,
        pipeline: &mut P,
    ) -> Option<FrameReport> {
        if !self.running {
            return None;
        }
        let frame = self.frame;
        let _span = tracing::info_span!("frame", frame).entered();

        let time = raw_time * self.config.time_scale;
        let delta_time = self.scroll.advance(time);
        let terrain = self
            .handles
            .terrain
            .get()
            .copied()
            .and_then(|rig| scene.get(rig.mesh).map(|node| (rig, node.transform.scale.y)))
            .filter(|&(_, scale_y)| scale_y > 0.0);
        if let Some((rig, scale_y)) = terrain {
            self.scroll.set_scale(scale_y, rig.height_segments);
        }
        let speed = self.config.speed;
        let travel = speed as f64 * time;

        self.update_vehicle(time, scene);
        self.update_wheels(travel, scene);

        if let Some(ground) = self.handles.ground {
            set_depth(scene, ground, wrap_narrow(travel, self.config.ground.repeat_period as f64));
        }
        if let Some((rig, scale_y)) = terrain {
            let period = scale_y as f64 / self.config.terrain.wrap_divisor as f64;
            let z = wrap_narrow(travel, period);
            set_depth(scene, rig.mesh, z);
            set_depth(scene, rig.wire, z);
        }
        if let Some(pool) = self.handles.props.get_mut() {
            pool.update_positions(time, speed);
            pool.apply(scene);
        }

        let resized = pipeline.resize_if_needed();
        if resized {
            tracing::debug!(frame, "surface resized, updating projection");
            pipeline.update_projection();
        }

        let uniforms = self.scroll.snapshot();
        pipeline.submit_frame(
            scene,
            &FrameSnapshot {
                frame,
                delta_time,
                uniforms,
            },
        );

        self.timer.record(delta_time);
        self.frame += 1;
        tracing::trace!(time, delta_time, "frame done");
        Some(FrameReport {
            frame,
            time,
            delta_time,
            resized,
            uniforms,
        })
    }

    /// Vehicle drift, then the flyer, its light and the shadow following it.
    fn update_vehicle(&self, t: f64, scene: &mut Scene) {
        let Some(&vehicle) = self.handles.vehicle.get() else {
            return;
        };
        let Some(node) = scene.get_mut(vehicle) else {
            return;
        };
        let m = &self.config.vehicle;
        let pos = &mut node.transform.position;
        pos.x = oscillate(m.lateral_amplitude, m.lateral_frequency, t, f64::sin);
        pos.z = oscillate(m.longitudinal_amplitude, m.longitudinal_frequency, t, f64::cos);
        let car = *pos;

        let f = &self.config.flyer;
        let mut flyer_pos = None;
        if let Some(flyer) = self.handles.flyer.and_then(|id| scene.get_mut(id)) {
            let p = &mut flyer.transform.position;
            p.x = car.x + oscillate(f.sway_amplitude, f.sway_frequency, t, f64::sin);
            p.y = f.altitude;
            p.z = car.z + f.lead + oscillate(f.surge_amplitude, f.surge_frequency, t, f64::cos);
            flyer_pos = Some(*p);
        }
        if let (Some(light), Some(p)) = (self.handles.tractor_light.and_then(|id| scene.get_mut(id)), flyer_pos) {
            light.transform.position = p;
        }
        if let Some(shadow) = self.handles.shadow.and_then(|id| scene.get_mut(id)) {
            shadow.transform.position = car;
            shadow.transform.position.y += m.shadow_lift;
        }
    }

    /// Spin each wheel about its own local Z on top of its attach-time
    /// rotation, sign taken from the pattern by child order.
    fn update_wheels(&self, travel: f64, scene: &mut Scene) {
        let pattern = self.config.vehicle.wheel_pattern;
        for (k, &(wheel, base)) in self.wheel_bases.iter().enumerate() {
            if let Some(node) = scene.get_mut(wheel) {
                let angle = (travel * pattern[k % pattern.len()] as f64).rem_euclid(TAU);
                node.transform.rotation = base * Quat::from_rotation_z(angle as f32);
            }
        }
    }

    /// Stop the loop. Later ticks are no-ops.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            tracing::info!(frames = self.frame, "frame scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn uniforms(&self) -> ScrollUniforms {
        self.scroll.snapshot()
    }

    pub fn handles(&self) -> &SceneHandles {
        &self.handles
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }
}

/// `amplitude * wave(frequency * t)`, evaluated in `f64`.
fn oscillate(amplitude: f32, frequency: f32, t: f64, wave: fn(f64) -> f64) -> f32 {
    (amplitude as f64 * wave(frequency as f64 * t)) as f32
}

fn set_depth(scene: &mut Scene, id: NodeId, z: f32) {
    if let Some(node) = scene.get_mut(id) {
        node.transform.position.z = z;
    }
}
