use glam::Vec3;
use outrun_common::{NodeId, Transform};
use outrun_scene::{Prefab, Scene};
use serde::{Deserialize, Serialize};

use crate::error::KernelError;
use crate::scroll::wrap_symmetric;

/// Placement rule for recycled roadside props.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolLayout {
    pub count: usize,
    /// Depth gap between consecutive slots.
    pub spacing: f32,
    pub full_range: f32,
    pub half_range: f32,
    /// Distance from the road center; even slots sit on -X, odd on +X.
    pub lateral_offset: f32,
    pub elevation: f32,
}

impl Default for PoolLayout {
    fn default() -> Self {
        Self {
            count: 20,
            spacing: 100.0,
            full_range: 1000.0,
            half_range: 500.0,
            lateral_offset: 5.0,
            elevation: -2.0,
        }
    }
}

/// Wrapped depth of slot `index` at `time`. Lies in
/// `[-half_range, full_range - half_range)`.
pub fn instance_depth(layout: &PoolLayout, index: usize, time: f64, speed: f32) -> f32 {
    let depth = speed as f64 * time + layout.spacing as f64 * index as f64;
    let half = layout.half_range;
    let d = wrap_symmetric(depth, half as f64, layout.full_range as f64) as f32;
    // Narrowing can round up onto the open end of the window.
    if d >= layout.full_range - half { -half } else { d }
}

/// One slot of the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PooledInstance {
    pub index: usize,
    pub node: NodeId,
    pub mirrored: bool,
    pub lateral_offset: f32,
    pub depth_position: f32,
}

/// Fixed set of prop instances cloned once from a template.
///
/// After creation only the per-slot depth changes; nodes are never added or
/// removed, and mesh data stays shared with the template.
#[derive(Debug, Clone)]
pub struct ObjectPool {
    layout: PoolLayout,
    base: Transform,
    instances: Vec<PooledInstance>,
}

impl ObjectPool {
    /// Instantiate `template` `layout.count` times as new scene roots.
    pub fn create(
        scene: &mut Scene,
        template: &Prefab,
        layout: PoolLayout,
    ) -> Result<Self, KernelError> {
        if layout.count == 0 {
            return Err(KernelError::InvalidConfiguration(
                "object pool needs at least one instance".into(),
            ));
        }

        let mut instances = Vec::with_capacity(layout.count);
        for index in 0..layout.count {
            let node = scene.instantiate(template, None)?;
            if let Some(root) = scene.get_mut(node) {
                root.name = format!("{}#{index}", template.name);
            }
            let mirrored = index % 2 == 1;
            let side = if mirrored { 1.0 } else { -1.0 };
            instances.push(PooledInstance {
                index,
                node,
                mirrored,
                lateral_offset: side * layout.lateral_offset,
                depth_position: 0.0,
            });
        }

        tracing::info!(
            template = %template.name,
            count = layout.count,
            nodes_per_instance = template.node_count(),
            "object pool created"
        );

        Ok(Self {
            layout,
            base: template.transform,
            instances,
        })
    }

    /// Recompute every slot's depth. Depends only on `(index, time, speed)`.
    pub fn update_positions(&mut self, time: f64, speed: f32) {
        for inst in &mut self.instances {
            inst.depth_position = instance_depth(&self.layout, inst.index, time, speed);
        }
    }

    /// Write the current slot state into the scene nodes.
    pub fn apply(&self, scene: &mut Scene) {
        for inst in &self.instances {
            scene.set_transform(inst.node, self.transform_of(inst));
        }
    }

    /// Local transform of one slot.
    pub fn transform_of(&self, inst: &PooledInstance) -> Transform {
        let mirror = if inst.mirrored {
            Vec3::new(-1.0, 1.0, 1.0)
        } else {
            Vec3::ONE
        };
        Transform {
            position: Vec3::new(inst.lateral_offset, self.layout.elevation, inst.depth_position),
            rotation: self.base.rotation,
            scale: self.base.scale * mirror,
        }
    }

    pub fn instances(&self) -> &[PooledInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn layout(&self) -> &PoolLayout {
        &self.layout
    }
}
