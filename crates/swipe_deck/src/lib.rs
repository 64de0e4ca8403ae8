//! A swipeable card deck.
//!
//! The user drags the top card; releasing it past a quarter of the viewport width
//! swipes it left or right, anything shorter springs it back. Swiped cards fly
//! off-screen and the next card becomes interactive.
//!
//! [`Deck`] is the headless core and can be driven by any host. [`SwipeDeckPlugin`]
//! hosts it in a bevy app.

mod config;
mod deck;
mod gesture;
mod plugin;
mod position;
mod spring;
mod stack;
mod style;

pub use config::{DeckConfig, DeckConfigError, LayoutTransition};
pub use deck::{CardPhase, CompletedSwipe, DataRevision, Deck, DeckItem};
pub use gesture::{
    DragTracker, DragUpdate, PointerEvent, ReleaseDecision, SwipeDirection, classify_release,
};
pub use plugin::{
    CardContent, CardSwiped, DeckCard, DeckContent, DeckPointer, DeckRoot, DeckSystems,
    NoMoreCards, Presence, StackSlot, SwipeDeck, SwipeDeckPlugin, card_world_transform,
};
pub use position::{AnimatedPosition, Curve};
pub use spring::{Spring, SpringConfig};
pub use stack::{
    CardPlacement, CardSlot, DeckRenderer, RenderedCard, RenderedDeck, StackLayout, layout_stack,
    render_stack,
};
pub use style::{CardTransform, card_transform, interpolate_clamped};
