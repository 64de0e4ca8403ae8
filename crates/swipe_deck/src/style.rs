//! Maps the drag position of the top card to its on-screen transform.

use bevy::math::Vec2;

use crate::config::DeckConfig;

/// Render-time transform of the interactive card, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CardTransform {
    pub translation: Vec2,
    /// Clockwise on screen.
    pub rotation_degrees: f32,
}

pub fn card_transform(drag_position: Vec2, config: &DeckConfig) -> CardTransform {
    let range = config.rotation_range();
    let max = config.max_rotation_degrees;
    let rotation_degrees = interpolate_clamped(
        drag_position.x,
        &[-range, 0.0, range],
        &[-max, 0.0, max],
    );

    CardTransform {
        translation: drag_position,
        rotation_degrees,
    }
}

/// Piecewise-linear interpolation that clamps outside the input domain.
///
/// `input` must be ascending. Extra stops on the longer slice are ignored, an
/// empty mapping yields 0 and zero-width segments resolve to their left output.
pub fn interpolate_clamped(value: f32, input: &[f32], output: &[f32]) -> f32 {
    let stops = input.len().min(output.len());
    let (Some(&first_in), Some(&first_out)) = (input.first(), output.first()) else {
        return 0.0;
    };
    if value <= first_in || stops == 1 {
        return first_out;
    }

    let segments = input.iter().zip(output).take(stops);
    let mut previous = (first_in, first_out);
    for (&x, &y) in segments.skip(1) {
        if value <= x {
            let (x0, y0) = previous;
            let span = x - x0;
            if span <= 0.0 {
                return y0;
            }
            let t = (value - x0) / span;
            return (y - y0).mul_add(t, y0);
        }
        previous = (x, y);
    }

    previous.1
}
