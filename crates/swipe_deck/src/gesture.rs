//! Turns raw pointer events into drag offsets and classifies releases.

use bevy::math::Vec2;
use strum::{Display, EnumIter};

#[derive(Display, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    /// -1 for left, 1 for right.
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// A pointer sample in screen coordinates (x right, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
    /// The platform took the pointer away (system gesture, interruption).
    Cancel,
}

/// What a drag did in response to one pointer event. Offsets are relative to the drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragUpdate {
    Began,
    Moved(Vec2),
    Released(Vec2),
    Cancelled(Vec2),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseDecision {
    Commit(SwipeDirection),
    Return,
}

/// Reducer over pointer events tracking one drag at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct DragTracker {
    origin: Option<Vec2>,
    last_offset: Vec2,
}

impl DragTracker {
    /// Forgets the current drag without reporting anything.
    pub const fn abort(&mut self) {
        self.origin = None;
        self.last_offset = Vec2::ZERO;
    }

    pub fn reduce(&mut self, event: PointerEvent) -> Option<DragUpdate> {
        match event {
            PointerEvent::Down(position) => {
                // A second press while dragging restarts from the new position.
                self.origin = Some(position);
                self.last_offset = Vec2::ZERO;
                Some(DragUpdate::Began)
            }
            PointerEvent::Move(position) => {
                let origin = self.origin?;
                self.last_offset = position - origin;
                Some(DragUpdate::Moved(self.last_offset))
            }
            PointerEvent::Up(position) => {
                let origin = self.origin.take()?;
                self.last_offset = position - origin;
                Some(DragUpdate::Released(self.last_offset))
            }
            PointerEvent::Cancel => {
                self.origin.take()?;
                Some(DragUpdate::Cancelled(self.last_offset))
            }
        }
    }
}

/// Only the horizontal offset decides; vertical motion never commits a swipe.
pub fn classify_release(dx: f32, threshold: f32) -> ReleaseDecision {
    if dx > threshold {
        ReleaseDecision::Commit(SwipeDirection::Right)
    } else if dx < -threshold {
        ReleaseDecision::Commit(SwipeDirection::Left)
    } else {
        ReleaseDecision::Return
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn offsets_are_cumulative_from_drag_start() {
        let mut tracker = DragTracker::default();

        assert_eq!(
            tracker.reduce(PointerEvent::Down(Vec2::new(100.0, 200.0))),
            Some(DragUpdate::Began),
            "press starts a drag"
        );
        assert_eq!(
            tracker.reduce(PointerEvent::Move(Vec2::new(130.0, 190.0))),
            Some(DragUpdate::Moved(Vec2::new(30.0, -10.0))),
            "first move"
        );
        assert_eq!(
            tracker.reduce(PointerEvent::Move(Vec2::new(180.0, 220.0))),
            Some(DragUpdate::Moved(Vec2::new(80.0, 20.0))),
            "moves are relative to the start, not the previous sample"
        );
        assert_eq!(
            tracker.reduce(PointerEvent::Up(Vec2::new(250.0, 220.0))),
            Some(DragUpdate::Released(Vec2::new(150.0, 20.0))),
            "release reports the final offset"
        );
        assert_eq!(tracker.reduce(PointerEvent::Cancel), None, "release ends the drag");
    }

    #[test]
    fn samples_without_a_press_are_ignored() {
        let mut tracker = DragTracker::default();

        assert_eq!(tracker.reduce(PointerEvent::Move(Vec2::ONE)), None, "stray move");
        assert_eq!(tracker.reduce(PointerEvent::Up(Vec2::ONE)), None, "stray release");
        assert_eq!(tracker.reduce(PointerEvent::Cancel), None, "stray cancel");
    }

    #[test]
    fn cancel_reports_last_offset() {
        let mut tracker = DragTracker::default();
        tracker.reduce(PointerEvent::Down(Vec2::ZERO));
        tracker.reduce(PointerEvent::Move(Vec2::new(-40.0, 5.0)));

        assert_eq!(
            tracker.reduce(PointerEvent::Cancel),
            Some(DragUpdate::Cancelled(Vec2::new(-40.0, 5.0))),
            "cancel carries the offset it interrupted"
        );
        assert_eq!(tracker.reduce(PointerEvent::Move(Vec2::ONE)), None, "cancel ends the drag");
    }

    #[test]
    fn abort_forgets_the_drag() {
        let mut tracker = DragTracker::default();
        tracker.reduce(PointerEvent::Down(Vec2::ZERO));

        tracker.abort();

        assert_eq!(tracker.reduce(PointerEvent::Up(Vec2::ONE)), None, "aborted drag has no release");
    }

    #[test]
    fn classification_is_strict_around_the_threshold() {
        assert_eq!(
            classify_release(150.0, 100.0),
            ReleaseDecision::Commit(SwipeDirection::Right),
            "past the right threshold"
        );
        assert_eq!(
            classify_release(-150.0, 100.0),
            ReleaseDecision::Commit(SwipeDirection::Left),
            "past the left threshold"
        );
        assert_eq!(classify_release(100.0, 100.0), ReleaseDecision::Return, "exactly at threshold");
        assert_eq!(classify_release(-100.0, 100.0), ReleaseDecision::Return, "exactly at -threshold");
        assert_eq!(classify_release(50.0, 100.0), ReleaseDecision::Return, "short drag");
    }

    #[test]
    fn direction_signs_are_opposite() {
        let total: f32 = SwipeDirection::iter().map(SwipeDirection::sign).sum();

        assert_eq!(total, 0.0, "left and right must cancel out");
        assert_eq!(SwipeDirection::Right.to_string(), "right", "display is lowercase");
    }
}
