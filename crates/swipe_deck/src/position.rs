//! The animated drag position of the top card.

use core::time::Duration;

use bevy::math::Vec2;

use crate::spring::{Spring, SpringConfig};

/// Shape of an animation towards a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    /// Physically simulated; runs until it settles, no fixed duration.
    Spring(SpringConfig),
    /// Constant speed over a fixed duration.
    Linear(Duration),
}

#[derive(Debug, Clone, Copy)]
enum Motion {
    Spring { x: Spring, y: Spring },
    Linear { from: Vec2, to: Vec2, elapsed: f32, duration: f32 },
}

#[derive(Debug, Clone)]
struct Animation<C> {
    motion: Motion,
    on_complete: C,
}

/// A 2D value that is either set directly or animated towards a target.
///
/// `C` is the completion tag handed back by [`AnimatedPosition::tick`] when an
/// animation finishes, so callers decide what completion means.
#[derive(Debug, Clone)]
pub struct AnimatedPosition<C> {
    value: Vec2,
    animation: Option<Animation<C>>,
}

impl<C> Default for AnimatedPosition<C> {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl<C> AnimatedPosition<C> {
    pub const fn new(value: Vec2) -> Self {
        Self {
            value,
            animation: None,
        }
    }

    pub const fn value(&self) -> Vec2 {
        self.value
    }

    pub const fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Sets the value and drops any running animation without completing it.
    pub fn set(&mut self, value: Vec2) {
        self.value = value;
        self.animation = None;
    }

    /// Starts animating towards `target`, replacing any running animation.
    pub fn animate_to(&mut self, target: Vec2, curve: Curve, on_complete: C) {
        let motion = match curve {
            Curve::Spring(config) => {
                let mut x = Spring::new(config, self.value.x);
                let mut y = Spring::new(config, self.value.y);
                x.set_target(target.x);
                y.set_target(target.y);
                Motion::Spring { x, y }
            }
            Curve::Linear(duration) => Motion::Linear {
                from: self.value,
                to: target,
                elapsed: 0.0,
                duration: duration.as_secs_f32(),
            },
        };
        self.animation = Some(Animation {
            motion,
            on_complete,
        });
    }

    /// Advances the running animation by `dt` seconds.
    ///
    /// Returns the completion tag exactly once, on the tick the animation lands on its target.
    pub fn tick(&mut self, dt: f32) -> Option<C> {
        let animation = self.animation.as_mut()?;

        let finished = match &mut animation.motion {
            Motion::Spring { x, y } => {
                // Both axes must be stepped every tick.
                let x_settled = x.step(dt);
                let y_settled = y.step(dt);
                self.value = Vec2::new(x.value(), y.value());
                x_settled && y_settled
            }
            Motion::Linear {
                from,
                to,
                elapsed,
                duration,
            } => {
                *elapsed += dt.max(0.0);
                let t = if *duration > 0.0 {
                    (*elapsed / *duration).min(1.0)
                } else {
                    1.0
                };
                self.value = if t >= 1.0 { *to } else { from.lerp(*to, t) };
                t >= 1.0
            }
        };

        if !finished {
            return None;
        }
        self.animation.take().map(|animation| animation.on_complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn linear_animation_completes_at_duration() {
        let mut position = AnimatedPosition::new(Vec2::new(20.0, 30.0));
        position.animate_to(
            Vec2::new(400.0, 0.0),
            Curve::Linear(Duration::from_millis(250)),
            "done",
        );

        assert_eq!(position.tick(0.125), None, "halfway is still running");
        let halfway = position.value();
        assert!(
            (halfway.x - 210.0).abs() < 1e-3 && (halfway.y - 15.0).abs() < 1e-3,
            "linear midpoint, got {halfway}"
        );

        assert_eq!(position.tick(0.2), Some("done"), "completes once the duration elapsed");
        assert_eq!(position.value(), Vec2::new(400.0, 0.0), "lands exactly on target");
        assert!(!position.is_animating(), "nothing left to run");
        assert_eq!(position.tick(FRAME), None, "completion is reported once");
    }

    #[test]
    fn spring_animation_lands_exactly_on_target() {
        let mut position = AnimatedPosition::new(Vec2::new(80.0, -45.0));
        position.animate_to(Vec2::ZERO, Curve::Spring(SpringConfig::snap_back()), 7_u8);

        let mut completion = None;
        for _ in 0..600 {
            if let Some(tag) = position.tick(FRAME) {
                completion = Some(tag);
                break;
            }
        }

        assert_eq!(completion, Some(7), "spring must finish within ten seconds");
        assert_eq!(position.value(), Vec2::ZERO, "settles on the exact origin");
    }

    #[test]
    fn set_overrides_running_animation() {
        let mut position = AnimatedPosition::new(Vec2::new(60.0, 0.0));
        position.animate_to(Vec2::ZERO, Curve::Spring(SpringConfig::snap_back()), ());
        position.tick(FRAME);

        position.set(Vec2::new(5.0, 5.0));

        assert!(!position.is_animating(), "set cancels the animation");
        assert_eq!(position.tick(FRAME), None, "a cancelled animation never completes");
        assert_eq!(position.value(), Vec2::new(5.0, 5.0), "set value sticks");
    }

    #[test]
    fn animate_to_replaces_the_previous_completion() {
        let mut position = AnimatedPosition::new(Vec2::ZERO);
        position.animate_to(Vec2::X, Curve::Linear(Duration::from_millis(100)), 1);
        position.animate_to(Vec2::Y, Curve::Linear(Duration::from_millis(100)), 2);

        assert_eq!(position.tick(1.0), Some(2), "last writer wins");
        assert_eq!(position.value(), Vec2::Y, "target of the last animation");
    }

    #[test]
    fn idle_position_ticks_to_nothing() {
        let mut position = AnimatedPosition::<()>::default();

        assert_eq!(position.tick(FRAME), None, "no animation, no completion");
        assert_eq!(position.value(), Vec2::ZERO, "default is the origin");
    }
}
