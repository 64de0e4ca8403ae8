use bevy::prelude::*;
use swipe_deck::{CardSwiped, DataRevision, DeckSystems, SwipeDeck, SwipeDirection};

use crate::profiles::{Profile, sample_profiles};

const HUD_FONT_SIZE: f32 = 20.0;

/// Likes and passes since the last restart.
#[derive(Resource, Default, Debug, PartialEq, Eq)]
pub struct SwipeTally {
    pub liked: u32,
    pub passed: u32,
}

impl SwipeTally {
    pub const fn record(&mut self, direction: SwipeDirection) {
        match direction {
            SwipeDirection::Right => self.liked += 1,
            SwipeDirection::Left => self.passed += 1,
        }
    }
}

#[derive(Component)]
struct HudText;

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SwipeTally>()
            .add_systems(Startup, spawn_hud)
            .add_systems(
                Update,
                (swipe_with_keys, restart_with_key).before(DeckSystems::Input),
            )
            .add_systems(
                Update,
                (tally_swipes, update_hud)
                    .chain()
                    .after(DeckSystems::Animate),
            );
    }
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        HudText,
        Text::new(""),
        TextFont {
            font_size: HUD_FONT_SIZE,
            ..default()
        },
        TextLayout::new_with_justify(JustifyText::Center),
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            width: Val::Percent(100.0),
            ..default()
        },
    ));
}

fn swipe_with_keys(keys: Res<ButtonInput<KeyCode>>, mut deck: ResMut<SwipeDeck<Profile>>) {
    let direction = if keys.just_pressed(KeyCode::ArrowLeft) {
        SwipeDirection::Left
    } else if keys.just_pressed(KeyCode::ArrowRight) {
        SwipeDirection::Right
    } else {
        return;
    };
    deck.force_swipe(direction);
}

fn restart_with_key(
    keys: Res<ButtonInput<KeyCode>>,
    mut deck: ResMut<SwipeDeck<Profile>>,
    mut tally: ResMut<SwipeTally>,
) {
    if !keys.just_pressed(KeyCode::KeyR) {
        return;
    }

    let mut profiles = sample_profiles();
    fastrand::shuffle(&mut profiles);
    let revision = deck.revision().next();
    deck.set_data(profiles, revision);
    *tally = SwipeTally::default();
}

fn tally_swipes(mut swiped: EventReader<CardSwiped<Profile>>, mut tally: ResMut<SwipeTally>) {
    for event in swiped.read() {
        tally.record(event.direction);
    }
}

// The deck resource is written every frame, so progress is compared by value.
fn update_hud(
    tally: Res<SwipeTally>,
    deck: Res<SwipeDeck<Profile>>,
    mut hud: Query<&mut Text, With<HudText>>,
    mut shown: Local<Option<(usize, DataRevision)>>,
) {
    let progress = (deck.current_index(), deck.revision());
    if !tally.is_changed() && *shown == Some(progress) {
        return;
    }
    *shown = Some(progress);

    let remaining = deck.items().len().saturating_sub(deck.current_index());
    for mut text in &mut hud {
        text.0 = format!(
            "Liked {}  Passed {}  Left {remaining}\n<- / -> to swipe, R to restart",
            tally.liked, tally.passed
        );
    }
}

#[cfg(test)]
mod tests {
    use swipe_deck::Deck;

    use super::*;

    const UNTOUCHED: &str = "untouched";

    fn hud_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<SwipeTally>()
            .insert_resource(SwipeDeck(Deck::with_defaults(sample_profiles())))
            .add_systems(Update, update_hud);
        app.world_mut().spawn((HudText, Text::new("")));
        app.update();
        app
    }

    fn hud_text(app: &mut App) -> String {
        let mut query = app.world_mut().query_filtered::<&Text, With<HudText>>();
        query.single(app.world()).0.clone()
    }

    fn mark_hud(app: &mut App) {
        let mut query = app.world_mut().query_filtered::<&mut Text, With<HudText>>();
        query.single_mut(app.world_mut()).0 = UNTOUCHED.to_owned();
    }

    #[test]
    fn tally_counts_each_direction() {
        let mut tally = SwipeTally::default();

        tally.record(SwipeDirection::Right);
        tally.record(SwipeDirection::Right);
        tally.record(SwipeDirection::Left);

        assert_eq!(tally, SwipeTally { liked: 2, passed: 1 }, "two likes and one pass");
    }

    #[test]
    fn hud_ignores_frames_without_progress() {
        let mut app = hud_app();
        assert!(hud_text(&mut app).contains("Left 6"), "first frame fills the hud");
        mark_hud(&mut app);

        // Ticking the deck touches the resource without advancing it.
        app.world_mut().resource_mut::<SwipeDeck<Profile>>().tick(0.016);
        app.update();

        assert_eq!(hud_text(&mut app), UNTOUCHED, "no rebuild without progress");
    }

    #[test]
    fn hud_follows_swipes_and_tally() {
        let mut app = hud_app();
        mark_hud(&mut app);

        {
            let mut deck = app.world_mut().resource_mut::<SwipeDeck<Profile>>();
            deck.force_swipe(SwipeDirection::Right);
            deck.tick(1.0);
        }
        app.update();
        assert!(hud_text(&mut app).contains("Left 5"), "swipe shows up in the hud");

        mark_hud(&mut app);
        app.world_mut().resource_mut::<SwipeTally>().record(SwipeDirection::Left);
        app.update();
        assert!(hud_text(&mut app).contains("Passed 1"), "tally shows up in the hud");
    }
}
