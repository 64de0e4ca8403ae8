use bevy::prelude::*;
use deck_helpers::WINDOW_WIDTH;
use swipe_deck::{CardContent, DeckItem};

pub const CARD_SIZE: Vec2 = Vec2::new(WINDOW_WIDTH - 40.0, 440.0);

const CAPTION_COLOR: Color = Color::WHITE;
const EMPTY_TEXT_COLOR: Color = Color::srgb(0.7, 0.7, 0.75);

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: u32,
    pub name: &'static str,
    pub age: u8,
    pub color: Color,
}

impl DeckItem for Profile {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

pub fn sample_profiles() -> Vec<Profile> {
    [
        ("Ada", 36, Color::srgb(0.85, 0.33, 0.31)),
        ("Linus", 28, Color::srgb(0.27, 0.55, 0.82)),
        ("Grace", 45, Color::srgb(0.36, 0.72, 0.45)),
        ("Alan", 41, Color::srgb(0.93, 0.68, 0.25)),
        ("Barbara", 33, Color::srgb(0.58, 0.40, 0.75)),
        ("Ken", 52, Color::srgb(0.20, 0.65, 0.65)),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, age, color), id)| Profile {
        id,
        name,
        age,
        color,
    })
    .collect()
}

/// Colored card with the name and age at the bottom.
pub struct ProfileCards;

impl CardContent<Profile> for ProfileCards {
    fn spawn_card(&self, card: &mut ChildBuilder, item: &Profile) {
        card.spawn((Sprite::from_color(item.color, CARD_SIZE), Transform::default()));
        card.spawn((
            Text2d::new(format!("{}, {}", item.name, item.age)),
            TextFont {
                font_size: 32.0,
                ..default()
            },
            TextColor(CAPTION_COLOR),
            Transform::from_xyz(0.0, -CARD_SIZE.y / 2.0 + 40.0, 0.1),
        ));
    }

    fn spawn_no_more_cards(&self, commands: &mut Commands) -> Entity {
        commands
            .spawn((
                Text2d::new("No more profiles\nPress R to start over"),
                TextFont {
                    font_size: 26.0,
                    ..default()
                },
                TextLayout::new_with_justify(JustifyText::Center),
                TextColor(EMPTY_TEXT_COLOR),
                Transform::default(),
            ))
            .id()
    }
}

#[cfg(test)]
mod tests {
    use bevy::utils::HashSet;

    use super::*;

    #[test]
    fn sample_ids_are_unique() {
        let profiles = sample_profiles();
        let ids: HashSet<u32> = profiles.iter().map(DeckItem::id).collect();

        assert_eq!(ids.len(), profiles.len(), "ids key the card entities and must not repeat");
    }
}
