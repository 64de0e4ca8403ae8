//! Pointer helpers that treat the left mouse button and the first touch as one pointer.
//!
//! Positions are window coordinates (origin at the top-left corner, y pointing down)
//! unless mapped through [`screen_to_world`].

use bevy::prelude::*;

pub fn just_pressed_screen_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.just_pressed(MouseButton::Left) {
        let cursor_position = windows.get_single().ok()?.cursor_position()?;
        Some(cursor_position)
    } else if touch_input.any_just_pressed() {
        let touch = touch_input.iter_just_pressed().next()?;
        Some(touch.position())
    } else {
        None
    }
}

/// Position of a pointer that is held down this frame, including the frame it was pressed.
pub fn pressed_screen_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.pressed(MouseButton::Left) {
        let cursor_position = windows.get_single().ok()?.cursor_position()?;
        Some(cursor_position)
    } else {
        let touch = touch_input.iter().next()?;
        Some(touch.position())
    }
}

pub fn just_released_screen_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.just_released(MouseButton::Left) {
        let cursor_position = windows.get_single().ok()?.cursor_position()?;
        Some(cursor_position)
    } else if touch_input.any_just_released() {
        let touch = touch_input.iter_just_released().next()?;
        Some(touch.position())
    } else {
        None
    }
}

/// Maps a window position to world coordinates through the only 2D camera.
pub fn screen_to_world(
    position: Vec2,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let (camera, camera_transform) = camera.get_single().ok()?;

    camera
        .viewport_to_world_2d(camera_transform, position)
        .ok()
}

/// Whether the platform cancelled a touch this frame (e.g. an incoming call or a system gesture).
pub fn just_cancelled(touch_input: &Touches) -> bool {
    touch_input.any_just_canceled()
}
