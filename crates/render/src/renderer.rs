use std::collections::VecDeque;

use outrun_scene::{NodeKind, Scene};

use crate::uniforms::ScrollUniforms;

/// Everything a renderer needs about one frame besides the scene itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    /// Frame counter, starting at 0.
    pub frame: u64,
    /// Seconds since the previous frame.
    pub delta_time: f32,
    pub uniforms: ScrollUniforms,
}

/// The render pipeline the frame scheduler drives.
///
/// Renderers read the scene and the snapshot, then produce output. They
/// never mutate the scene; it is owned by the caller.
pub trait RenderPipeline {
    /// Match the output surface to its current size. Returns true if the
    /// size changed since the last call.
    fn resize_if_needed(&mut self) -> bool;

    /// Recompute viewport-dependent projection state after a resize.
    fn update_projection(&mut self);

    /// Submit one frame.
    fn submit_frame(&mut self, scene: &Scene, frame: &FrameSnapshot);
}

/// Snapshots a [`DebugTextRenderer`] keeps; older ones are dropped.
pub const SNAPSHOT_HISTORY: usize = 120;

/// Headless renderer producing a human-readable dump of each frame.
///
/// Used by the CLI and tests: it keeps the last output and the most recent
/// [`SNAPSHOT_HISTORY`] snapshots, counts every frame it was given, and can
/// be told a resize is pending.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    last_output: String,
    snapshots: VecDeque<FrameSnapshot>,
    frames_submitted: usize,
    pending_resize: bool,
    projection_updates: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the output surface changed size before the next frame.
    pub fn request_resize(&mut self) {
        self.pending_resize = true;
    }

    pub fn last_output(&self) -> &str {
        &self.last_output
    }

    /// Recent snapshots, oldest first.
    pub fn snapshots(&self) -> &VecDeque<FrameSnapshot> {
        &self.snapshots
    }

    pub fn frames_submitted(&self) -> usize {
        self.frames_submitted
    }

    pub fn projection_updates(&self) -> u64 {
        self.projection_updates
    }

    /// Text dump of a scene for one frame.
    pub fn describe(scene: &Scene, frame: &FrameSnapshot) -> String {
        let u = &frame.uniforms;
        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} (dt={:.4}s) ===\n",
            frame.frame, frame.delta_time
        ));
        out.push_str(&format!(
            "Uniforms: time={:.3} speed={:.1} scale={:.2} fog=({:.0}..{:.0})\n",
            u.time, u.speed, u.scale, u.fog.near, u.fog.far
        ));
        out.push_str(&format!("Nodes: {}\n", scene.len()));

        for item in scene.world_nodes() {
            let kind = match &item.node.kind {
                NodeKind::Group => "group",
                NodeKind::Mesh(_) => "mesh",
                NodeKind::PointLight { .. } => "point-light",
                NodeKind::DirectionalLight { .. } => "dir-light",
                NodeKind::AmbientLight { .. } => "ambient",
            };
            let p = item.world.w_axis;
            out.push_str(&format!(
                "  [{}] {:<12} {:<11} pos=({:.2}, {:.2}, {:.2}){}\n",
                item.id.short(),
                item.node.name,
                kind,
                p.x,
                p.y,
                p.z,
                if item.node.material.highlighted {
                    " *"
                } else {
                    ""
                }
            ));
        }

        out
    }
}

impl RenderPipeline for DebugTextRenderer {
    fn resize_if_needed(&mut self) -> bool {
        std::mem::take(&mut self.pending_resize)
    }

    fn update_projection(&mut self) {
        self.projection_updates += 1;
    }

    fn submit_frame(&mut self, scene: &Scene, frame: &FrameSnapshot) {
        self.last_output = Self::describe(scene, frame);
        if self.snapshots.len() == SNAPSHOT_HISTORY {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(*frame);
        self.frames_submitted += 1;
        tracing::trace!(frame = frame.frame, "debug frame rendered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use outrun_common::Transform;
    use outrun_scene::SceneNode;

    fn snapshot(frame: u64) -> FrameSnapshot {
        FrameSnapshot {
            frame,
            delta_time: 0.016,
            uniforms: ScrollUniforms::default(),
        }
    }

    #[test]
    fn describe_empty_scene() {
        let scene = Scene::new();
        let output = DebugTextRenderer::describe(&scene, &snapshot(0));
        assert!(output.contains("Frame 0"));
        assert!(output.contains("Nodes: 0"));
        assert!(output.contains("speed=47.0"));
    }

    #[test]
    fn describe_lists_nodes_with_positions() {
        let mut scene = Scene::new();
        scene.add(SceneNode::group("car").with_transform(Transform::from_position(Vec3::new(
            1.0, 2.0, 3.0,
        ))));
        let output = DebugTextRenderer::describe(&scene, &snapshot(3));
        assert!(output.contains("Nodes: 1"));
        assert!(output.contains("car"));
        assert!(output.contains("pos=(1.00, 2.00, 3.00)"));
    }

    #[test]
    fn submit_records_snapshots() {
        let scene = Scene::new();
        let mut renderer = DebugTextRenderer::new();
        renderer.submit_frame(&scene, &snapshot(0));
        renderer.submit_frame(&scene, &snapshot(1));
        assert_eq!(renderer.frames_submitted(), 2);
        assert_eq!(renderer.snapshots()[1].frame, 1);
        assert!(renderer.last_output().contains("Frame 1"));
    }

    #[test]
    fn snapshot_history_is_bounded() {
        let scene = Scene::new();
        let mut renderer = DebugTextRenderer::new();
        let total = SNAPSHOT_HISTORY as u64 * 3 + 7;
        for frame in 0..total {
            renderer.submit_frame(&scene, &snapshot(frame));
        }
        assert_eq!(renderer.frames_submitted(), total as usize);
        assert_eq!(renderer.snapshots().len(), SNAPSHOT_HISTORY);
        assert_eq!(renderer.snapshots().front().unwrap().frame, total - SNAPSHOT_HISTORY as u64);
        assert_eq!(renderer.snapshots().back().unwrap().frame, total - 1);
        assert!(renderer.last_output().contains(&format!("Frame {}", total - 1)));
    }

    #[test]
    fn resize_is_reported_once() {
        let mut renderer = DebugTextRenderer::new();
        assert!(!renderer.resize_if_needed());
        renderer.request_resize();
        assert!(renderer.resize_if_needed());
        assert!(!renderer.resize_if_needed());
    }
}
