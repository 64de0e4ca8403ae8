use bevy::prelude::*;
use deck_helpers::WINDOW_WIDTH;
use swipe_deck::{Deck, DeckConfig, SwipeDeckPlugin};

mod controls;
mod profiles;

use controls::ControlsPlugin;
use profiles::{CARD_SIZE, Profile, ProfileCards, sample_profiles};

pub fn run() {
    let mut app = deck_helpers::get_default_app(env!("CARGO_PKG_NAME"));

    let config = DeckConfig::default()
        .with_viewport_width(WINDOW_WIDTH)
        .with_card_size(CARD_SIZE);
    let deck = match Deck::new(sample_profiles(), config) {
        Ok(deck) => deck,
        Err(err) => {
            error!("Invalid deck configuration: {err}");
            return;
        }
    };
    let deck = deck
        .on_swipe_right(|profile: &Profile| info!("Liked {}", profile.name))
        .on_swipe_left(|profile: &Profile| info!("Passed on {}", profile.name));

    app.add_plugins(SwipeDeckPlugin::new(deck, ProfileCards))
        .add_plugins(ControlsPlugin)
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}
