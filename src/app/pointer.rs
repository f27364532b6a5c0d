use glam::Vec2;

/// Converts a position in container pixels to normalized device coordinates.
///
/// The container's top-left maps to `(-1, 1)` and its bottom-right to
/// `(1, -1)`. A degenerate container yields `None`.
#[must_use]
pub fn to_ndc(position: Vec2, container: Vec2) -> Option<Vec2> {
    if container.x <= 0.0 || container.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        position.x / container.x * 2.0 - 1.0,
        -(position.y / container.y) * 2.0 + 1.0,
    ))
}
