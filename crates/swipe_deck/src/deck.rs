//! The deck state machine: progress through the items and the lifecycle of the top card.

use core::fmt::Debug;
use core::hash::Hash;

use bevy::log::{debug, info, warn};
use bevy::math::Vec2;

use crate::config::{DeckConfig, DeckConfigError, validate_viewport_width};
use crate::gesture::{
    DragTracker, DragUpdate, PointerEvent, ReleaseDecision, SwipeDirection, classify_release,
};
use crate::position::{AnimatedPosition, Curve};
use crate::stack::{StackLayout, layout_stack};
use crate::style::{CardTransform, card_transform};

/// Something a deck can show. The deck never looks past the id.
pub trait DeckItem: Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

/// Identity of an item list. Handing the deck a different revision restarts it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataRevision(pub u64);

impl DataRevision {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Lifecycle of the interactive card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardPhase {
    #[default]
    AtRest,
    Dragging,
    /// Springing back to the origin after a short drag.
    Returning,
    /// Flying off-screen; the card is consumed when this finishes.
    Committing(SwipeDirection),
}

/// Reported when a committed swipe has finished animating and the deck advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedSwipe {
    pub direction: SwipeDirection,
    /// Index of the swiped item, i.e. the top index before advancing.
    pub index: usize,
}

// Completion tags of the top card's animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settle {
    Returned,
    Committed(SwipeDirection),
}

type SwipeCallback<T> = Box<dyn FnMut(&T) + Send + Sync>;

pub struct Deck<T: DeckItem> {
    items: Vec<T>,
    revision: DataRevision,
    current_index: usize,
    phase: CardPhase,
    position: AnimatedPosition<Settle>,
    tracker: DragTracker,
    config: DeckConfig,
    on_swipe_left: SwipeCallback<T>,
    on_swipe_right: SwipeCallback<T>,
}

impl<T: DeckItem> Debug for Deck<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Deck")
            .field("len", &self.items.len())
            .field("revision", &self.revision)
            .field("current_index", &self.current_index)
            .field("phase", &self.phase)
            .field("position", &self.position.value())
            .finish_non_exhaustive()
    }
}

impl<T: DeckItem> Deck<T> {
    pub fn new(items: Vec<T>, config: DeckConfig) -> Result<Self, DeckConfigError> {
        config.validate()?;
        Ok(Self::from_parts(items, config))
    }

    /// A deck with the default configuration.
    pub fn with_defaults(items: Vec<T>) -> Self {
        Self::from_parts(items, DeckConfig::default())
    }

    fn from_parts(items: Vec<T>, config: DeckConfig) -> Self {
        Self {
            items,
            revision: DataRevision::default(),
            current_index: 0,
            phase: CardPhase::AtRest,
            position: AnimatedPosition::default(),
            tracker: DragTracker::default(),
            config,
            on_swipe_left: Box::new(|_| {}),
            on_swipe_right: Box::new(|_| {}),
        }
    }

    #[must_use]
    pub fn on_swipe_left(mut self, callback: impl FnMut(&T) + Send + Sync + 'static) -> Self {
        self.on_swipe_left = Box::new(callback);
        self
    }

    #[must_use]
    pub fn on_swipe_right(mut self, callback: impl FnMut(&T) + Send + Sync + 'static) -> Self {
        self.on_swipe_right = Box::new(callback);
        self
    }

    #[must_use]
    pub const fn with_revision(mut self, revision: DataRevision) -> Self {
        self.revision = revision;
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub const fn revision(&self) -> DataRevision {
        self.revision
    }

    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    pub const fn phase(&self) -> CardPhase {
        self.phase
    }

    pub const fn config(&self) -> &DeckConfig {
        &self.config
    }

    /// Live offset of the top card from its resting place.
    pub const fn drag_position(&self) -> Vec2 {
        self.position.value()
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.items.len()
    }

    /// The interactive item, if any.
    pub fn top_item(&self) -> Option<&T> {
        self.items.get(self.current_index)
    }

    pub fn card_transform(&self) -> CardTransform {
        card_transform(self.position.value(), &self.config)
    }

    pub fn layout(&self) -> StackLayout<T::Id> {
        layout_stack(
            &self.items,
            self.current_index,
            self.position.value(),
            &self.config,
        )
    }

    /// Whether `point` lies on the top card as it is currently drawn.
    ///
    /// `point` is in deck space: origin at the resting center of the top card, y down.
    pub fn top_card_contains(&self, point: Vec2) -> bool {
        if self.is_exhausted() {
            return false;
        }
        let transform = self.card_transform();
        let local = Vec2::from_angle(-transform.rotation_degrees.to_radians())
            .rotate(point - transform.translation);
        let half = self.config.card_size / 2.0;
        local.x.abs() <= half.x && local.y.abs() <= half.y
    }

    /// Follows a viewport resize. The threshold and swipe-out distance scale with it.
    pub fn set_viewport_width(&mut self, width: f32) -> Result<(), DeckConfigError> {
        validate_viewport_width(width)?;
        self.config.viewport_width = width;
        Ok(())
    }

    /// Replaces the item list.
    ///
    /// A different `revision` restarts the deck from the first item, whatever the new
    /// contents are. The same revision keeps progress, clamped to the new length.
    pub fn set_data(&mut self, items: Vec<T>, revision: DataRevision) {
        self.items = items;
        if revision != self.revision {
            info!(
                "Deck data changed ({:?} -> {:?}), restarting with {} items",
                self.revision,
                revision,
                self.items.len()
            );
            self.revision = revision;
            self.restart();
        } else {
            self.current_index = self.current_index.min(self.items.len());
        }
    }

    /// Back to the first item with the top card at rest. In-flight animations are dropped.
    pub fn restart(&mut self) {
        self.current_index = 0;
        self.phase = CardPhase::AtRest;
        self.tracker.abort();
        self.position.set(Vec2::ZERO);
    }

    /// Feeds one pointer sample to the top card.
    ///
    /// Input is ignored while the deck is exhausted or the top card is flying out.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if self.is_exhausted() {
            return;
        }
        if let CardPhase::Committing(direction) = self.phase {
            debug!("Ignoring {event:?} while swiping {direction}");
            return;
        }

        let Some(update) = self.tracker.reduce(event) else {
            return;
        };

        match update {
            DragUpdate::Began => {
                self.phase = CardPhase::Dragging;
            }
            DragUpdate::Moved(offset) => {
                self.phase = CardPhase::Dragging;
                self.position.set(offset);
            }
            DragUpdate::Released(offset) => {
                // A tap during the return spring leaves the card where the spring has it.
                if offset != Vec2::ZERO || !self.position.is_animating() {
                    self.position.set(offset);
                }
                let threshold = self.config.swipe_threshold();
                match classify_release(offset.x, threshold) {
                    ReleaseDecision::Commit(direction) => {
                        debug!("Release at dx={} passed {threshold}, swiping {direction}", offset.x);
                        self.start_commit(direction);
                    }
                    ReleaseDecision::Return => {
                        debug!("Release at dx={} within {threshold}, returning", offset.x);
                        self.start_return();
                    }
                }
            }
            DragUpdate::Cancelled(offset) => {
                debug!("Drag cancelled at {offset}, returning");
                self.start_return();
            }
        }
    }

    /// Commits a swipe without a gesture. Returns `false` when there is nothing to swipe
    /// or a swipe is already in flight.
    pub fn force_swipe(&mut self, direction: SwipeDirection) -> bool {
        if self.is_exhausted() {
            warn!("Cannot swipe {direction}: no more cards");
            return false;
        }
        if matches!(self.phase, CardPhase::Committing(_)) {
            return false;
        }
        self.tracker.abort();
        self.start_commit(direction);
        true
    }

    /// Springs the top card back to the origin unless it is already flying out.
    pub fn reset_position(&mut self) {
        if matches!(self.phase, CardPhase::Committing(_)) {
            return;
        }
        self.tracker.abort();
        self.start_return();
    }

    /// Advances animations by `dt` seconds.
    ///
    /// When a commit finishes, the matching callback runs with the swiped item, the
    /// position resets to the origin and the deck advances by one.
    pub fn tick(&mut self, dt: f32) -> Option<CompletedSwipe> {
        match self.position.tick(dt)? {
            Settle::Returned => {
                // A new drag may have taken over before the spring finished.
                if self.phase == CardPhase::Returning {
                    self.phase = CardPhase::AtRest;
                }
                None
            }
            Settle::Committed(direction) => Some(self.complete_swipe(direction)),
        }
    }

    fn start_commit(&mut self, direction: SwipeDirection) {
        self.phase = CardPhase::Committing(direction);
        let target = Vec2::new(direction.sign() * self.config.viewport_width, 0.0);
        self.position.animate_to(
            target,
            Curve::Linear(self.config.swipe_out_duration),
            Settle::Committed(direction),
        );
    }

    fn start_return(&mut self) {
        self.phase = CardPhase::Returning;
        self.position.animate_to(
            Vec2::ZERO,
            Curve::Spring(self.config.return_spring),
            Settle::Returned,
        );
    }

    fn complete_swipe(&mut self, direction: SwipeDirection) -> CompletedSwipe {
        let index = self.current_index;
        if let Some(item) = self.items.get(index) {
            let callback = match direction {
                SwipeDirection::Left => &mut self.on_swipe_left,
                SwipeDirection::Right => &mut self.on_swipe_right,
            };
            callback(item);
            info!("Swiped {direction} on {:?}", item.id());
        } else {
            warn!("Swipe {direction} completed past the end of the deck (index {index})");
        }

        self.position.set(Vec2::ZERO);
        self.phase = CardPhase::AtRest;
        self.current_index = (index + 1).min(self.items.len());
        if self.is_exhausted() {
            info!("Deck exhausted after {} cards", self.items.len());
        }

        CompletedSwipe { direction, index }
    }
}
