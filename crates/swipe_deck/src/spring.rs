//! Damped spring physics.
//!
//! RK4-integrated springs used for the snap-back of a released card and for the
//! stack's layout transitions. A spring has no fixed duration: it settles
//! asymptotically and snaps onto its target once the motion is imperceptible.

// Being within half a pixel and moving slower than 5px/s is imperceptible.
const SETTLE_EPSILON: f32 = 0.5;
const SETTLE_VELOCITY_EPSILON: f32 = 5.0;

// Frame hitches can deliver large deltas; integrate them in small slices to stay stable.
const MAX_STEP: f32 = 1.0 / 120.0;

// RK4 diverges once rate * step passes ~2.78 on the real axis; keep a margin.
const MAX_STABLE_RATE_STEP: f32 = 2.5;

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    pub const fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Slightly bouncy return used when a card is released below the swipe threshold.
    ///
    /// This is the classic tension 40 / friction 7 spring after Origami conversion.
    pub const fn snap_back() -> Self {
        Self::new(230.2, 22.0, 1.0)
    }

    /// A gentle, slow spring (good for cards settling into the stack)
    pub const fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    /// A stiff, snappy spring with little overshoot
    pub const fn stiff() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }

    /// Decay or oscillation rate of the spring's fastest mode, in 1/s.
    fn fastest_rate(&self) -> f32 {
        let discriminant = self
            .damping
            .mul_add(self.damping, -4.0 * self.stiffness * self.mass);
        if discriminant < 0.0 {
            (self.stiffness / self.mass).sqrt()
        } else {
            (self.damping + discriminant.sqrt()) / (2.0 * self.mass)
        }
    }

    /// Whether [`Spring::step`] can integrate this spring without diverging.
    ///
    /// Undamped springs never settle, so they are unusable as well.
    pub fn is_integrable(&self) -> bool {
        self.damping > 0.0 && self.fastest_rate() * MAX_STEP <= MAX_STABLE_RATE_STEP
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::snap_back()
    }
}

/// A one-dimensional spring-driven value.
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    pub const fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub const fn value(&self) -> f32 {
        self.value
    }

    pub const fn velocity(&self) -> f32 {
        self.velocity
    }

    pub const fn target(&self) -> f32 {
        self.target
    }

    pub const fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jumps to `value` and stops all motion.
    pub const fn snap_to(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Within epsilon of the target with minimal velocity
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < SETTLE_EPSILON
            && self.velocity.abs() < SETTLE_VELOCITY_EPSILON
    }

    /// Advances the simulation by `dt` seconds. Returns `true` once the spring rests on its target.
    pub fn step(&mut self, dt: f32) -> bool {
        let mut remaining = dt.max(0.0);
        while remaining > 0.0 {
            if self.is_settled() {
                break;
            }
            let slice = remaining.min(MAX_STEP);
            self.integrate(slice);
            remaining -= slice;
        }

        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return true;
        }
        false
    }

    fn integrate(&mut self, dt: f32) {
        let k1_v = self.acceleration(self.value, self.velocity);
        let k1_x = self.velocity;

        let k2_v = self.acceleration(
            (k1_x * dt).mul_add(0.5, self.value),
            (k1_v * dt).mul_add(0.5, self.velocity),
        );
        let k2_x = (k1_v * dt).mul_add(0.5, self.velocity);

        let k3_v = self.acceleration(
            (k2_x * dt).mul_add(0.5, self.value),
            (k2_v * dt).mul_add(0.5, self.velocity),
        );
        let k3_x = (k2_v * dt).mul_add(0.5, self.velocity);

        let k4_v = self.acceleration(k3_x.mul_add(dt, self.value), k3_v.mul_add(dt, self.velocity));
        let k4_x = k3_v.mul_add(dt, self.velocity);

        self.velocity += (2.0f32.mul_add(k2_v, k1_v) + 2.0f32.mul_add(k3_v, k4_v)) * dt / 6.0;
        self.value += (2.0f32.mul_add(k2_x, k1_x) + 2.0f32.mul_add(k3_x, k4_x)) * dt / 6.0;
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let spring_force = -self.config.stiffness * (x - self.target);
        let damping_force = -self.config.damping * v;
        (spring_force + damping_force) / self.config.mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn run_until_settled(spring: &mut Spring, max_seconds: f32) -> f32 {
        let mut elapsed = 0.0;
        while elapsed < max_seconds {
            if spring.step(FRAME) {
                return elapsed;
            }
            elapsed += FRAME;
        }
        elapsed
    }

    #[test]
    fn settles_exactly_on_target() {
        let mut spring = Spring::new(SpringConfig::snap_back(), 150.0);
        spring.set_target(0.0);

        let elapsed = run_until_settled(&mut spring, 5.0);

        assert!(elapsed < 5.0, "spring never settled");
        assert_eq!(spring.value(), 0.0, "settled value must be the exact target");
        assert_eq!(spring.velocity(), 0.0, "settled spring must be at rest");
    }

    #[test]
    fn underdamped_spring_overshoots() {
        let mut spring = Spring::new(SpringConfig::snap_back(), 100.0);
        spring.set_target(0.0);
        let mut min_value = f32::MAX;
        for _ in 0..120 {
            spring.step(FRAME);
            min_value = min_value.min(spring.value());
        }

        assert!(min_value < 0.0, "expected overshoot past the target, min was {min_value}");
    }

    #[test]
    fn large_delta_stays_stable() {
        let mut spring = Spring::new(SpringConfig::stiff(), 300.0);
        spring.set_target(0.0);

        spring.step(0.5);

        assert!(spring.value().is_finite(), "spring exploded on a long frame");
        assert!(spring.value().abs() < 300.0, "spring moved away from its target");
    }

    #[test]
    fn resting_spring_reports_settled_without_moving() {
        let mut spring = Spring::new(SpringConfig::gentle(), 10.0);

        assert!(spring.step(FRAME), "spring at its target is settled");
        assert_eq!(spring.value(), 10.0, "settled spring must not drift");
    }

    #[test]
    fn presets_are_integrable() {
        for config in [SpringConfig::snap_back(), SpringConfig::gentle(), SpringConfig::stiff()] {
            assert!(config.is_integrable(), "{config:?} must be usable");
        }
    }

    #[test]
    fn undamped_and_overly_stiff_springs_are_not_integrable() {
        assert!(
            !SpringConfig::new(230.2, 0.0, 1.0).is_integrable(),
            "without damping the card would oscillate forever"
        );
        assert!(
            !SpringConfig::new(1.0e6, 22.0, 1.0).is_integrable(),
            "a 1000 rad/s spring diverges at 120Hz steps"
        );
        assert!(
            !SpringConfig::new(100.0, 1_000.0, 1.0).is_integrable(),
            "heavy overdamping decays faster than a step can follow"
        );
    }

    #[test]
    fn snap_to_stops_motion() {
        let mut spring = Spring::new(SpringConfig::gentle(), 0.0);
        spring.set_target(50.0);
        spring.step(FRAME);

        spring.snap_to(20.0);

        assert_eq!(spring.target(), 20.0, "snap moves the target");
        assert_eq!(spring.velocity(), 0.0, "snap kills velocity");
    }
}
