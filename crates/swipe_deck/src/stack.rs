//! Which cards are visible, where they sit in the stack and in what order they are drawn.

use bevy::math::Vec2;

use crate::config::DeckConfig;
use crate::deck::{Deck, DeckItem};
use crate::style::{CardTransform, card_transform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardPlacement {
    /// The top card: follows the drag.
    Interactive(CardTransform),
    /// A card waiting below the top one, pushed down by its slot's `stack_offset`.
    Static,
}

/// One visible card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSlot<K> {
    pub key: K,
    pub index: usize,
    /// Distance from the top card; 0 for the interactive card.
    pub depth: usize,
    /// Resting vertical offset in the stack, before any drag is applied.
    pub stack_offset: f32,
    pub placement: CardPlacement,
}

impl<K> CardSlot<K> {
    pub const fn is_interactive(&self) -> bool {
        matches!(self.placement, CardPlacement::Interactive(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StackLayout<K> {
    /// Every card was swiped; the "no more cards" view takes over.
    Exhausted,
    /// Visible cards, back to front: the last item comes first so the top card is drawn last.
    Cards(Vec<CardSlot<K>>),
}

impl<K> StackLayout<K> {
    pub fn slots(&self) -> &[CardSlot<K>] {
        match self {
            Self::Exhausted => &[],
            Self::Cards(slots) => slots,
        }
    }
}

pub fn layout_stack<T: DeckItem>(
    items: &[T],
    current_index: usize,
    drag_position: Vec2,
    config: &DeckConfig,
) -> StackLayout<T::Id> {
    let Some(remaining) = items.get(current_index..).filter(|rest| !rest.is_empty()) else {
        return StackLayout::Exhausted;
    };

    let slots = remaining
        .iter()
        .enumerate()
        .rev()
        .map(|(depth, item)| {
            let placement = if depth == 0 {
                CardPlacement::Interactive(card_transform(drag_position, config))
            } else {
                CardPlacement::Static
            };
            CardSlot {
                key: item.id(),
                index: current_index + depth,
                depth,
                stack_offset: config.stack_offset * depth as f32,
                placement,
            }
        })
        .collect();

    StackLayout::Cards(slots)
}

/// Produces the visual content of cards. The deck only decides position, rotation and order.
pub trait DeckRenderer<T> {
    type View;

    fn render_card(&mut self, item: &T) -> Self::View;

    fn render_no_more_cards(&mut self) -> Self::View;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCard<K, V> {
    pub slot: CardSlot<K>,
    pub view: V,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedDeck<K, V> {
    NoMoreCards(V),
    /// Back to front, keyed by item id.
    Cards(Vec<RenderedCard<K, V>>),
}

pub fn render_stack<T, R>(deck: &Deck<T>, renderer: &mut R) -> RenderedDeck<T::Id, R::View>
where
    T: DeckItem,
    R: DeckRenderer<T>,
{
    match deck.layout() {
        StackLayout::Exhausted => RenderedDeck::NoMoreCards(renderer.render_no_more_cards()),
        StackLayout::Cards(slots) => RenderedDeck::Cards(
            slots
                .into_iter()
                .filter_map(|slot| {
                    let item = deck.items().get(slot.index)?;
                    let view = renderer.render_card(item);
                    Some(RenderedCard { slot, view })
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{PointerEvent, SwipeDirection};

    #[derive(Debug, Clone)]
    struct Card {
        id: u32,
    }

    impl DeckItem for Card {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    #[derive(Default)]
    struct LabelRenderer {
        cards_rendered: usize,
        empty_rendered: usize,
    }

    impl DeckRenderer<Card> for LabelRenderer {
        type View = String;

        fn render_card(&mut self, item: &Card) -> String {
            self.cards_rendered += 1;
            format!("card {}", item.id)
        }

        fn render_no_more_cards(&mut self) -> String {
            self.empty_rendered += 1;
            "no more cards".to_owned()
        }
    }

    fn deck(ids: &[u32]) -> Deck<Card> {
        let items = ids.iter().map(|&id| Card { id }).collect();
        Deck::new(items, DeckConfig::default().with_viewport_width(400.0)).unwrap()
    }

    #[test]
    fn layout_is_back_to_front_from_current_index() {
        let items: Vec<_> = [1, 2, 3, 4].map(|id| Card { id }).to_vec();
        let config = DeckConfig::default();

        let layout = layout_stack(&items, 1, Vec2::ZERO, &config);

        let keys: Vec<_> = layout.slots().iter().map(|slot| slot.key).collect();
        assert_eq!(keys, vec![4, 3, 2], "swiped items are omitted and the top card is last");
        let offsets: Vec<_> = layout.slots().iter().map(|slot| slot.stack_offset).collect();
        assert_eq!(offsets, vec![20.0, 10.0, 0.0], "10 units per depth");
        assert!(
            layout.slots()[..2]
                .iter()
                .all(|slot| slot.placement == CardPlacement::Static),
            "cards below the top rest on their stack offset"
        );
        assert!(
            layout.slots().last().is_some_and(CardSlot::is_interactive),
            "only the top card is interactive"
        );
        assert_eq!(
            layout.slots().iter().filter(|slot| slot.is_interactive()).count(),
            1,
            "exactly one interactive card"
        );
    }

    #[test]
    fn interactive_slot_carries_the_drag_transform() {
        let items = vec![Card { id: 9 }];
        let config = DeckConfig::default().with_viewport_width(400.0);

        let layout = layout_stack(&items, 0, Vec2::new(-60.0, 25.0), &config);

        let Some(CardPlacement::Interactive(transform)) =
            layout.slots().first().map(|slot| slot.placement)
        else {
            panic!("expected an interactive slot, got {layout:?}");
        };
        assert_eq!(transform.translation, Vec2::new(-60.0, 25.0), "translated by the drag");
        assert!((transform.rotation_degrees + 12.0).abs() < 1e-4, "-60px is -12 degrees");
    }

    #[test]
    fn index_past_the_end_is_exhausted() {
        let items = vec![Card { id: 1 }];
        let config = DeckConfig::default();

        assert_eq!(layout_stack(&items, 1, Vec2::ZERO, &config), StackLayout::Exhausted, "at len");
        assert_eq!(layout_stack(&items, 5, Vec2::ZERO, &config), StackLayout::Exhausted, "past len");
        assert_eq!(
            layout_stack::<Card>(&[], 0, Vec2::ZERO, &config),
            StackLayout::Exhausted,
            "empty list"
        );
    }

    #[test]
    fn render_uses_caller_views_keyed_by_id() {
        let deck = deck(&[1, 2, 3]);
        let mut renderer = LabelRenderer::default();

        let RenderedDeck::Cards(cards) = render_stack(&deck, &mut renderer) else {
            panic!("a fresh deck renders cards");
        };

        let views: Vec<_> = cards.iter().map(|card| (card.slot.key, card.view.as_str())).collect();
        assert_eq!(
            views,
            vec![(3, "card 3"), (2, "card 2"), (1, "card 1")],
            "back to front with caller content"
        );
        assert_eq!(renderer.empty_rendered, 0, "no empty view while cards remain");
    }

    #[test]
    fn exhausted_deck_renders_only_the_empty_view() {
        let mut deck = deck(&[1, 2, 3]);
        for _ in 0..3 {
            deck.force_swipe(SwipeDirection::Left);
            deck.tick(1.0);
        }
        let mut renderer = LabelRenderer::default();

        let rendered = render_stack(&deck, &mut renderer);

        assert_eq!(
            rendered,
            RenderedDeck::NoMoreCards("no more cards".to_owned()),
            "exhausted path"
        );
        assert_eq!(renderer.empty_rendered, 1, "empty view rendered exactly once");
        assert_eq!(renderer.cards_rendered, 0, "no card views");
    }

    #[test]
    fn next_render_shows_the_following_card_on_top() {
        let mut deck = deck(&[1, 2, 3]);
        let start = Vec2::new(200.0, 300.0);
        deck.handle_pointer(PointerEvent::Down(start));
        deck.handle_pointer(PointerEvent::Move(start + Vec2::new(150.0, 0.0)));
        deck.handle_pointer(PointerEvent::Up(start + Vec2::new(150.0, 0.0)));
        deck.tick(1.0);

        let layout = deck.layout();

        let top = layout.slots().last().map(|slot| (slot.key, slot.is_interactive()));
        assert_eq!(top, Some((2, true)), "item 2 is the interactive top card");
        assert_eq!(layout.slots().len(), 2, "item 1 is gone");
    }
}
