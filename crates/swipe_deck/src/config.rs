use core::time::Duration;

use bevy::math::Vec2;
use thiserror::Error;

use crate::spring::SpringConfig;

// A portrait phone viewport and a card leaving a 20px margin on each side.
const DEFAULT_VIEWPORT_WIDTH: f32 = 360.0;
const DEFAULT_CARD_SIZE: Vec2 = Vec2::new(320.0, 440.0);

/// How cards move when the rendered set changes (a card is consumed, data is replaced).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutTransition {
    /// Cards spring towards their new stack offset.
    Spring(SpringConfig),
    /// Cards jump to their new stack offset.
    Instant,
}

impl Default for LayoutTransition {
    fn default() -> Self {
        Self::Spring(SpringConfig::gentle())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeckConfigError {
    #[error("Viewport width must be finite and positive, got {0}")]
    InvalidViewportWidth(f32),

    #[error("Swipe threshold fraction must be in (0, 1], got {0}")]
    InvalidThresholdFraction(f32),

    #[error("Swipe out duration must be non-zero")]
    ZeroSwipeOutDuration,

    #[error("Stack offset must be finite and non-negative, got {0}")]
    InvalidStackOffset(f32),

    #[error("Rotation must be finite with a positive range factor, got {max_degrees}° over {range_factor}x width")]
    InvalidRotation { max_degrees: f32, range_factor: f32 },

    #[error("Card size must be finite and positive, got {0}")]
    InvalidCardSize(Vec2),

    #[error("Spring '{name}' needs positive stiffness, damping and mass, got {config:?}")]
    InvalidSpring {
        name: &'static str,
        config: SpringConfig,
    },

    #[error("Spring '{name}' is too stiff to simulate at a stable step, got {config:?}")]
    UnstableSpring {
        name: &'static str,
        config: SpringConfig,
    },
}

/// Tunables of a deck. Defaults reproduce the classic swipe deck on a phone-sized viewport.
#[derive(Clone, Debug, PartialEq)]
pub struct DeckConfig {
    /// Width of the visible area; drives the threshold, the swipe-out distance and the rotation.
    pub viewport_width: f32,
    /// Share of the viewport width a release must exceed to commit a swipe.
    pub swipe_threshold_fraction: f32,
    pub swipe_out_duration: Duration,
    /// Size of a card. Presses outside the top card do not start a drag.
    pub card_size: Vec2,
    /// Vertical step between stacked cards, per position below the top card.
    pub stack_offset: f32,
    /// Rotation reached at `rotation_range_factor` viewport widths of horizontal drag.
    pub max_rotation_degrees: f32,
    pub rotation_range_factor: f32,
    /// Spring used to bring a released card back to the origin.
    pub return_spring: SpringConfig,
    pub layout_transition: LayoutTransition,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            swipe_threshold_fraction: 0.25,
            swipe_out_duration: Duration::from_millis(250),
            card_size: DEFAULT_CARD_SIZE,
            stack_offset: 10.0,
            max_rotation_degrees: 120.0,
            rotation_range_factor: 1.5,
            return_spring: SpringConfig::snap_back(),
            layout_transition: LayoutTransition::default(),
        }
    }
}

impl DeckConfig {
    #[must_use]
    pub const fn with_viewport_width(mut self, viewport_width: f32) -> Self {
        self.viewport_width = viewport_width;
        self
    }

    #[must_use]
    pub const fn with_swipe_threshold_fraction(mut self, fraction: f32) -> Self {
        self.swipe_threshold_fraction = fraction;
        self
    }

    #[must_use]
    pub const fn with_swipe_out_duration(mut self, duration: Duration) -> Self {
        self.swipe_out_duration = duration;
        self
    }

    #[must_use]
    pub const fn with_card_size(mut self, card_size: Vec2) -> Self {
        self.card_size = card_size;
        self
    }

    #[must_use]
    pub const fn with_stack_offset(mut self, stack_offset: f32) -> Self {
        self.stack_offset = stack_offset;
        self
    }

    #[must_use]
    pub const fn with_return_spring(mut self, spring: SpringConfig) -> Self {
        self.return_spring = spring;
        self
    }

    #[must_use]
    pub const fn with_layout_transition(mut self, transition: LayoutTransition) -> Self {
        self.layout_transition = transition;
        self
    }

    /// Horizontal distance a release must exceed to commit.
    pub fn swipe_threshold(&self) -> f32 {
        self.viewport_width * self.swipe_threshold_fraction
    }

    /// Horizontal drag at which the card reaches `max_rotation_degrees`.
    pub fn rotation_range(&self) -> f32 {
        self.viewport_width * self.rotation_range_factor
    }

    pub fn validate(&self) -> Result<(), DeckConfigError> {
        validate_viewport_width(self.viewport_width)?;

        let fraction = self.swipe_threshold_fraction;
        if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
            return Err(DeckConfigError::InvalidThresholdFraction(fraction));
        }

        if self.swipe_out_duration.is_zero() {
            return Err(DeckConfigError::ZeroSwipeOutDuration);
        }

        if !self.card_size.is_finite() || self.card_size.min_element() <= 0.0 {
            return Err(DeckConfigError::InvalidCardSize(self.card_size));
        }

        if !self.stack_offset.is_finite() || self.stack_offset < 0.0 {
            return Err(DeckConfigError::InvalidStackOffset(self.stack_offset));
        }

        if !self.max_rotation_degrees.is_finite()
            || !self.rotation_range_factor.is_finite()
            || self.rotation_range_factor <= 0.0
        {
            return Err(DeckConfigError::InvalidRotation {
                max_degrees: self.max_rotation_degrees,
                range_factor: self.rotation_range_factor,
            });
        }

        validate_spring("return", self.return_spring)?;
        if let LayoutTransition::Spring(spring) = self.layout_transition {
            validate_spring("layout", spring)?;
        }

        Ok(())
    }
}

pub(crate) fn validate_viewport_width(width: f32) -> Result<(), DeckConfigError> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(DeckConfigError::InvalidViewportWidth(width))
    }
}

fn validate_spring(name: &'static str, config: SpringConfig) -> Result<(), DeckConfigError> {
    let valid = config.stiffness.is_finite()
        && config.stiffness > 0.0
        && config.mass.is_finite()
        && config.mass > 0.0
        && config.damping.is_finite()
        && config.damping > 0.0;
    if !valid {
        return Err(DeckConfigError::InvalidSpring { name, config });
    }
    if !config.is_integrable() {
        return Err(DeckConfigError::UnstableSpring { name, config });
    }
    Ok(())
}
