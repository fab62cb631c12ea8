use glam::Vec2;

/// Pointer position used when no pointer is over the surface. Far outside
/// `[-1, 1]`, so a ray through it can never be cast.
pub const POINTER_SENTINEL: Vec2 = Vec2::new(100_000.0, 100_000.0);

/// What the host's pointer source reports, already in normalized device
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move(Vec2),
    Down,
    Up,
    Leave,
}

/// Window pixels (origin top-left, y down) to NDC (origin center, y up).
/// A zero-sized surface maps everything to the sentinel.
pub fn ndc_from_pixels(position: Vec2, size: Vec2) -> Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return POINTER_SENTINEL;
    }
    Vec2::new(
        position.x / size.x * 2.0 - 1.0,
        position.y / size.y * -2.0 + 1.0,
    )
}
