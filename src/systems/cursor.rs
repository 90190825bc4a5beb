//! Cursor and viewport tracking.
//!
//! Affordance systems reason in two spaces. Hit-testing happens in world
//! space against entity bounds. Placement math happens in screen space:
//! top-left origin, `y` down, logical pixels, the coordinate system the
//! original viewport contract is written in. The adapters here convert
//! between the two using the camera's world-space viewport rectangle.
use bevy::{camera::primitives::Aabb, prelude::*, window::PrimaryWindow};

/// Per-frame cursor truth shared by every affordance plugin. `None` while the
/// cursor is outside the window or no 2D camera exists.
#[derive(Resource, Default)]
pub struct CursorTracker {
    /// Cursor position in world coordinates.
    pub position: Option<Vec2>,
    /// The viewport's world-space rectangle.
    pub viewport: Option<Rect>,
}

pub fn track_cursor(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut tracker: ResMut<CursorTracker>,
) {
    let (Ok(window), Ok((camera, camera_transform))) = (windows.single(), cameras.single())
    else {
        tracker.position = None;
        tracker.viewport = None;
        return;
    };

    tracker.viewport = Some(Rect::from_center_size(
        camera_transform.translation().truncate(),
        Vec2::new(window.width(), window.height()),
    ));
    tracker.position = window
        .cursor_position()
        .and_then(|position| camera.viewport_to_world_2d(camera_transform, position).ok());
}

/// World-space bounding rectangle of an entity, from its `Aabb` scaled and
/// translated by its global transform. Rotation degrades to the bounding box
/// of the transformed corners.
pub fn world_rect(transform: &GlobalTransform, aabb: &Aabb) -> Rect {
    let matrix = transform.to_matrix();
    let center = Vec3::from(aabb.center);
    let half = Vec3::from(aabb.half_extents);

    let corners = [
        center + Vec3::new(-half.x, -half.y, 0.0),
        center + Vec3::new(half.x, -half.y, 0.0),
        center + Vec3::new(half.x, half.y, 0.0),
        center + Vec3::new(-half.x, half.y, 0.0),
    ];

    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    for corner in corners {
        let world = matrix.transform_point3(corner).truncate();
        min = min.min(world);
        max = max.max(world);
    }
    Rect { min, max }
}

/// Convert a world-space rectangle into screen space (top-left origin, `y`
/// down). The vertical flip swaps which world edge becomes `min.y`.
pub fn screen_rect(world: Rect, viewport: Rect) -> Rect {
    Rect {
        min: Vec2::new(world.min.x - viewport.min.x, viewport.max.y - world.max.y),
        max: Vec2::new(world.max.x - viewport.min.x, viewport.max.y - world.min.y),
    }
}

/// Convert a screen-space point back into world coordinates.
pub fn screen_to_world(point: Vec2, viewport: Rect) -> Vec2 {
    Vec2::new(viewport.min.x + point.x, viewport.max.y - point.y)
}
