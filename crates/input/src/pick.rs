use glam::Vec2;
use outrun_common::NodeId;
use outrun_scene::{Camera, RayIntersector, Scene};

use crate::pointer::{POINTER_SENTINEL, PointerEvent};

/// How a confirmed pick treats an object highlighted earlier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PickMode {
    /// Toggle only the hit object. Earlier highlights stay lit, so several
    /// objects can end up highlighted.
    #[default]
    ToggleInPlace,
    /// Clear the tracked highlight before lighting a different object.
    /// At most one object is highlighted.
    Exclusive,
}

/// Result of handling a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// No pick happened, or the ray hit nothing.
    Nothing,
    Highlighted(NodeId),
    Cleared(NodeId),
}

/// Click-to-highlight state machine.
///
/// Press clears the drag flag, any motion sets it, and release confirms a
/// pick only if the flag is still clear. A confirmed pick casts a ray from
/// the camera through the last pointer position and toggles the highlight
/// of the nearest hit.
#[derive(Debug, Clone)]
pub struct PickController {
    last_pointer: Vec2,
    dragging: bool,
    highlighted: Option<NodeId>,
    mode: PickMode,
}

impl Default for PickController {
    fn default() -> Self {
        Self::new(PickMode::default())
    }
}

impl PickController {
    pub fn new(mode: PickMode) -> Self {
        Self {
            last_pointer: POINTER_SENTINEL,
            dragging: false,
            highlighted: None,
            mode,
        }
    }

    pub fn mode(&self) -> PickMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PickMode) {
        self.mode = mode;
    }

    pub fn last_pointer(&self) -> Vec2 {
        self.last_pointer
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Most recently highlighted node that is still lit.
    pub fn highlighted(&self) -> Option<NodeId> {
        self.highlighted
    }

    /// Advance the state machine. Returns true when the event confirms a
    /// pick.
    pub fn on_event(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Move(ndc) => {
                self.last_pointer = ndc;
                self.dragging = true;
                false
            }
            PointerEvent::Leave => {
                self.last_pointer = POINTER_SENTINEL;
                false
            }
            PointerEvent::Down => {
                self.dragging = false;
                false
            }
            PointerEvent::Up => !self.dragging,
        }
    }

    /// Cast through the last pointer position and toggle the nearest hit.
    pub fn pick<I: RayIntersector + ?Sized>(
        &mut self,
        camera: &Camera,
        scene: &mut Scene,
        intersector: &I,
    ) -> PickOutcome {
        let p = self.last_pointer;
        if !(-1.0..=1.0).contains(&p.x) || !(-1.0..=1.0).contains(&p.y) {
            return PickOutcome::Nothing;
        }
        let ray = camera.ray_from_ndc(p);
        let Some(hit) = intersector.intersect(&ray, scene).first().map(|h| h.node) else {
            tracing::debug!(?p, "pick missed");
            return PickOutcome::Nothing;
        };

        if self.mode == PickMode::Exclusive {
            if let Some(previous) = self.highlighted.filter(|prev| *prev != hit) {
                if let Some(node) = scene.get_mut(previous) {
                    node.material.highlighted = false;
                }
                self.highlighted = None;
            }
        }

        let Some(node) = scene.get_mut(hit) else {
            return PickOutcome::Nothing;
        };
        node.material.highlighted = !node.material.highlighted;
        let lit = node.material.highlighted;
        tracing::debug!(node = %hit.short(), name = %node.name, lit, "pick toggled");

        if lit {
            self.highlighted = Some(hit);
            PickOutcome::Highlighted(hit)
        } else {
            if self.highlighted == Some(hit) {
                self.highlighted = None;
            }
            PickOutcome::Cleared(hit)
        }
    }

    /// Feed one event; pick if it confirms.
    pub fn handle<I: RayIntersector + ?Sized>(
        &mut self,
        event: PointerEvent,
        camera: &Camera,
        scene: &mut Scene,
        intersector: &I,
    ) -> PickOutcome {
        if self.on_event(event) {
            self.pick(camera, scene, intersector)
        } else {
            PickOutcome::Nothing
        }
    }

    /// Turn off the tracked highlight, if any.
    pub fn clear(&mut self, scene: &mut Scene) {
        if let Some(id) = self.highlighted.take() {
            if let Some(node) = scene.get_mut(id) {
                node.material.highlighted = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use outrun_common::Transform;
    use outrun_scene::{Material, MeshData, MeshIntersector, SceneNode};
    use std::sync::Arc;

    fn camera() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            aspect: 1.0,
            ..Camera::default()
        }
    }

    /// Two boxes: one dead center, one off to the right at NDC x ~0.5.
    fn scene() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let mesh = Arc::new(MeshData::cuboid("box", Vec3::ONE));
        let center = scene.add(SceneNode::mesh("center", mesh.clone(), Material::default()));
        let right = scene.add(
            SceneNode::mesh("right", mesh, Material::default())
                .with_transform(Transform::from_position(Vec3::new(3.5, 0.0, 0.0))),
        );
        (scene, center, right)
    }

    fn lit(scene: &Scene, id: NodeId) -> bool {
        scene.get(id).unwrap().material.highlighted
    }

    fn click(picker: &mut PickController, at: Vec2, scene: &mut Scene) -> PickOutcome {
        picker.on_event(PointerEvent::Move(at));
        picker.on_event(PointerEvent::Down);
        picker.handle(PointerEvent::Up, &camera(), scene, &MeshIntersector)
    }

    fn right_ndc() -> Vec2 {
        let clip = camera().view_projection() * Vec3::new(3.5, 0.0, 0.0).extend(1.0);
        Vec2::new(clip.x / clip.w, clip.y / clip.w)
    }

    #[test]
    fn starts_at_sentinel() {
        let picker = PickController::default();
        assert_eq!(picker.last_pointer(), POINTER_SENTINEL);
        assert_eq!(picker.mode(), PickMode::ToggleInPlace);
        assert_eq!(picker.highlighted(), None);
    }

    #[test]
    fn click_toggles_on_then_off() {
        let (mut scene, center, _) = scene();
        let mut picker = PickController::default();
        assert_eq!(click(&mut picker, Vec2::ZERO, &mut scene), PickOutcome::Highlighted(center));
        assert!(lit(&scene, center));
        assert_eq!(picker.highlighted(), Some(center));

        assert_eq!(click(&mut picker, Vec2::ZERO, &mut scene), PickOutcome::Cleared(center));
        assert!(!lit(&scene, center));
        assert_eq!(picker.highlighted(), None);
    }

    #[test]
    fn down_move_up_is_a_drag() {
        let (mut scene, center, _) = scene();
        let mut picker = PickController::default();
        picker.on_event(PointerEvent::Move(Vec2::ZERO));
        assert!(!picker.on_event(PointerEvent::Down));
        assert!(!picker.on_event(PointerEvent::Move(Vec2::new(0.01, 0.0))));
        let outcome = picker.handle(PointerEvent::Up, &camera(), &mut scene, &MeshIntersector);
        assert_eq!(outcome, PickOutcome::Nothing);
        assert!(!lit(&scene, center));
    }

    #[test]
    fn down_up_confirms() {
        let mut picker = PickController::default();
        picker.on_event(PointerEvent::Move(Vec2::ZERO));
        picker.on_event(PointerEvent::Down);
        assert!(picker.on_event(PointerEvent::Up));
        assert!(!picker.is_dragging());
    }

    #[test]
    fn leave_prevents_hits() {
        let (mut scene, center, _) = scene();
        let mut picker = PickController::default();
        picker.on_event(PointerEvent::Move(Vec2::ZERO));
        picker.on_event(PointerEvent::Leave);
        picker.on_event(PointerEvent::Down);
        let outcome = picker.handle(PointerEvent::Up, &camera(), &mut scene, &MeshIntersector);
        assert_eq!(outcome, PickOutcome::Nothing);
        assert!(!lit(&scene, center));
    }

    #[test]
    fn miss_is_not_an_error() {
        let (mut scene, _, _) = scene();
        let mut picker = PickController::default();
        assert_eq!(click(&mut picker, Vec2::new(-0.9, 0.9), &mut scene), PickOutcome::Nothing);
    }

    #[test]
    fn toggle_in_place_leaves_earlier_highlight() {
        let (mut scene, center, right) = scene();
        let mut picker = PickController::default();
        click(&mut picker, Vec2::ZERO, &mut scene);
        assert_eq!(click(&mut picker, right_ndc(), &mut scene), PickOutcome::Highlighted(right));
        assert!(lit(&scene, center));
        assert!(lit(&scene, right));
        assert_eq!(picker.highlighted(), Some(right));
    }

    #[test]
    fn exclusive_mode_keeps_one_highlight() {
        let (mut scene, center, right) = scene();
        let mut picker = PickController::new(PickMode::Exclusive);
        click(&mut picker, Vec2::ZERO, &mut scene);
        assert_eq!(click(&mut picker, right_ndc(), &mut scene), PickOutcome::Highlighted(right));
        assert!(!lit(&scene, center));
        assert!(lit(&scene, right));

        assert_eq!(click(&mut picker, right_ndc(), &mut scene), PickOutcome::Cleared(right));
        assert!(!lit(&scene, right));
    }

    #[test]
    fn clear_turns_off_tracked_node() {
        let (mut scene, center, _) = scene();
        let mut picker = PickController::default();
        click(&mut picker, Vec2::ZERO, &mut scene);
        picker.clear(&mut scene);
        assert!(!lit(&scene, center));
        assert_eq!(picker.highlighted(), None);
    }
}
