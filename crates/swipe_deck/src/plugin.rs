//! Hosts a [`Deck`] in a bevy app: pointer input in, card entities and swipe events out.
//!
//! Pointer positions are mapped into deck space (origin at the [`DeckRoot`], y down) and
//! only presses that land on the top card start a drag.

use std::sync::Arc;

use bevy::prelude::*;
use bevy::utils::{HashMap, HashSet};
use bevy::window::WindowResized;
use deck_helpers::input::{
    just_cancelled, just_pressed_screen_position, just_released_screen_position,
    pressed_screen_position, screen_to_world,
};
use parking_lot::Mutex;

use crate::config::LayoutTransition;
use crate::deck::{Deck, DeckItem};
use crate::gesture::{PointerEvent, SwipeDirection};
use crate::spring::{Spring, SpringConfig};
use crate::stack::{CardSlot, StackLayout};

// The top card is drawn above everything below it; each step down the stack sits one unit further back.
const TOP_CARD_Z: f32 = 100.0;
const DEPTH_Z_STEP: f32 = 1.0;

// Springs settle at pixel precision, so presence is simulated in percent.
const PRESENCE_UNITS: f32 = 100.0;

#[derive(Debug, Hash, PartialEq, Eq, Clone, SystemSet)]
pub enum DeckSystems {
    Input,
    Animate,
    Reconcile,
}

/// The deck driven by this app.
#[derive(Resource, Deref, DerefMut)]
pub struct SwipeDeck<T: DeckItem>(pub Deck<T>);

/// Spawns what cards look like. The plugin owns position, rotation and stacking.
pub trait CardContent<T>: Send + Sync + 'static {
    /// Spawns the visuals of `item` as children of its card entity.
    fn spawn_card(&self, card: &mut ChildBuilder, item: &T);

    /// Spawns the view shown once every card was swiped and returns its root entity.
    fn spawn_no_more_cards(&self, commands: &mut Commands) -> Entity;
}

#[derive(Resource)]
pub struct DeckContent<T: DeckItem>(Arc<dyn CardContent<T>>);

/// A pointer sample in deck space: origin at the resting center of the top card, y down.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DeckPointer(pub PointerEvent);

/// Sent once a swipe has finished animating, alongside the deck's own callbacks.
#[derive(Event, Debug, Clone)]
pub struct CardSwiped<T: DeckItem> {
    pub direction: SwipeDirection,
    pub item: T,
}

/// Parent of every card entity. Move it to move the deck.
#[derive(Component, Debug)]
pub struct DeckRoot;

/// Marks the root of the "no more cards" view.
#[derive(Component, Debug)]
pub struct NoMoreCards;

#[derive(Component, Debug, Clone)]
pub struct DeckCard<K: Send + Sync + 'static> {
    pub key: K,
    pub index: usize,
    pub depth: usize,
    pub interactive: bool,
}

impl<K: Clone + Send + Sync + 'static> DeckCard<K> {
    fn from_slot(slot: &CardSlot<K>) -> Self {
        Self {
            key: slot.key.clone(),
            index: slot.index,
            depth: slot.depth,
            interactive: slot.is_interactive(),
        }
    }

    fn follow(&mut self, slot: &CardSlot<K>) {
        self.index = slot.index;
        self.depth = slot.depth;
        self.interactive = slot.is_interactive();
    }
}

/// Vertical resting offset of a card inside the stack, eased by the layout transition.
#[derive(Component, Debug)]
pub struct StackSlot {
    offset: Spring,
}

impl StackSlot {
    /// New cards slide in from one step further back.
    fn entering(target: f32, step: f32, transition: LayoutTransition) -> Self {
        Self {
            offset: transition_spring(target + step, target, transition),
        }
    }

    fn retarget(&mut self, target: f32, transition: LayoutTransition) {
        match transition {
            LayoutTransition::Spring(_) => self.offset.set_target(target),
            LayoutTransition::Instant => self.offset.snap_to(target),
        }
    }

    pub const fn offset(&self) -> f32 {
        self.offset.value()
    }
}

/// Scale of a view entering or leaving the deck: cards removed by a data change and the
/// "no more cards" view. Leaving views are despawned once they have shrunk away.
#[derive(Component, Debug)]
pub struct Presence {
    scale: Spring,
    leaving: bool,
}

impl Presence {
    fn entering(transition: LayoutTransition) -> Self {
        Self {
            scale: transition_spring(0.0, PRESENCE_UNITS, transition),
            leaving: false,
        }
    }

    fn leaving(transition: LayoutTransition) -> Self {
        Self {
            scale: transition_spring(PRESENCE_UNITS, 0.0, transition),
            leaving: true,
        }
    }

    fn leave(&mut self, transition: LayoutTransition) {
        self.leaving = true;
        match transition {
            LayoutTransition::Spring(_) => self.scale.set_target(0.0),
            LayoutTransition::Instant => self.scale.snap_to(0.0),
        }
    }

    /// Current scale factor, 1 when fully present.
    pub fn scale(&self) -> f32 {
        (self.scale.value() / PRESENCE_UNITS).max(0.0)
    }

    pub const fn is_leaving(&self) -> bool {
        self.leaving
    }
}

/// A spring from `from` to `to`, or one already resting on `to` when transitions are instant.
fn transition_spring(from: f32, to: f32, transition: LayoutTransition) -> Spring {
    match transition {
        LayoutTransition::Spring(config) => {
            let mut spring = Spring::new(config, from);
            spring.set_target(to);
            spring
        }
        LayoutTransition::Instant => Spring::new(SpringConfig::default(), to),
    }
}

#[derive(Resource)]
struct CardRegistry<T: DeckItem> {
    root: Option<Entity>,
    cards: HashMap<T::Id, Entity>,
    no_more_cards: Option<Entity>,
    /// Card consumed by the last completed swipe; it skips the exit transition.
    swiped: Option<T::Id>,
}

impl<T: DeckItem> Default for CardRegistry<T> {
    fn default() -> Self {
        Self {
            root: None,
            cards: HashMap::default(),
            no_more_cards: None,
            swiped: None,
        }
    }
}

pub struct SwipeDeckPlugin<T: DeckItem> {
    // Moved into the app on build; callbacks are not clonable.
    deck: Mutex<Option<Deck<T>>>,
    content: Arc<dyn CardContent<T>>,
}

impl<T: DeckItem + Clone> SwipeDeckPlugin<T> {
    pub fn new(deck: Deck<T>, content: impl CardContent<T>) -> Self {
        Self {
            deck: Mutex::new(Some(deck)),
            content: Arc::new(content),
        }
    }
}

impl<T: DeckItem + Clone> Plugin for SwipeDeckPlugin<T> {
    fn build(&self, app: &mut App) {
        let Some(deck) = self.deck.lock().take() else {
            error!("SwipeDeckPlugin was built twice; its deck already lives in another app");
            return;
        };
        info!("Swipe deck ready with {} cards", deck.items().len());

        app.insert_resource(SwipeDeck(deck))
            .insert_resource(DeckContent(Arc::clone(&self.content)))
            .init_resource::<CardRegistry<T>>()
            .add_event::<DeckPointer>()
            .add_event::<CardSwiped<T>>()
            .add_event::<WindowResized>()
            .configure_sets(
                Update,
                (
                    DeckSystems::Input,
                    DeckSystems::Animate,
                    DeckSystems::Reconcile,
                )
                    .chain(),
            )
            .add_systems(Startup, spawn_deck_root::<T>)
            .add_systems(
                Update,
                (
                    read_pointer_input,
                    apply_pointer_events::<T>,
                    sync_viewport_width::<T>,
                )
                    .chain()
                    .in_set(DeckSystems::Input),
            )
            .add_systems(Update, advance_deck::<T>.in_set(DeckSystems::Animate))
            .add_systems(
                Update,
                (reconcile_cards::<T>, animate_cards::<T>, animate_presence)
                    .chain()
                    .in_set(DeckSystems::Reconcile),
            );
    }
}

fn spawn_deck_root<T: DeckItem>(mut commands: Commands, mut registry: ResMut<CardRegistry<T>>) {
    let root = commands
        .spawn((DeckRoot, Transform::default(), Visibility::default()))
        .id();
    registry.root = Some(root);
}

/// World position to deck space: relative to the deck root, y down.
fn world_to_deck(world: Vec2, root: &GlobalTransform) -> Vec2 {
    let local = root
        .affine()
        .inverse()
        .transform_point3(world.extend(0.0));
    Vec2::new(local.x, -local.y)
}

fn window_to_deck(
    position: Vec2,
    cameras: &Query<(&Camera, &GlobalTransform)>,
    root: &GlobalTransform,
) -> Option<Vec2> {
    screen_to_world(position, cameras).map(|world| world_to_deck(world, root))
}

fn read_pointer_input(
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    roots: Query<&GlobalTransform, With<DeckRoot>>,
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    mut pointer: EventWriter<DeckPointer>,
    mut last_position: Local<Option<Vec2>>,
) {
    let Ok(root) = roots.get_single() else {
        return;
    };

    if let Some(position) = just_pressed_screen_position(&buttons, &touches, &windows) {
        if let Some(point) = window_to_deck(position, &cameras, root) {
            pointer.send(DeckPointer(PointerEvent::Down(point)));
        }
        *last_position = Some(position);
    } else if let Some(position) = pressed_screen_position(&buttons, &touches, &windows) {
        if *last_position != Some(position) {
            if let Some(point) = window_to_deck(position, &cameras, root) {
                pointer.send(DeckPointer(PointerEvent::Move(point)));
            }
            *last_position = Some(position);
        }
    }

    if buttons.just_released(MouseButton::Left) || touches.any_just_released() {
        // A release outside the window has no position; treat it as lost.
        let event = just_released_screen_position(&buttons, &touches, &windows)
            .and_then(|position| window_to_deck(position, &cameras, root))
            .map_or(PointerEvent::Cancel, PointerEvent::Up);
        pointer.send(DeckPointer(event));
        *last_position = None;
    } else if just_cancelled(&touches) {
        pointer.send(DeckPointer(PointerEvent::Cancel));
        *last_position = None;
    }
}

fn apply_pointer_events<T: DeckItem>(
    mut events: EventReader<DeckPointer>,
    mut deck: ResMut<SwipeDeck<T>>,
) {
    for &DeckPointer(event) in events.read() {
        if let PointerEvent::Down(point) = event {
            if !deck.top_card_contains(point) {
                debug!("Press at {point} missed the top card");
                continue;
            }
        }
        deck.handle_pointer(event);
    }
}

fn sync_viewport_width<T: DeckItem>(
    mut resized: EventReader<WindowResized>,
    mut deck: ResMut<SwipeDeck<T>>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };
    match deck.set_viewport_width(last.width) {
        Ok(()) => debug!("Deck viewport width is now {}", last.width),
        Err(err) => warn!("Ignoring window resize: {err}"),
    }
}

fn advance_deck<T: DeckItem + Clone>(
    time: Res<Time>,
    mut deck: ResMut<SwipeDeck<T>>,
    mut registry: ResMut<CardRegistry<T>>,
    mut swiped: EventWriter<CardSwiped<T>>,
) {
    let Some(swipe) = deck.tick(time.delta_secs()) else {
        return;
    };
    let Some(item) = deck.items().get(swipe.index) else {
        return;
    };
    registry.swiped = Some(item.id());
    swiped.send(CardSwiped {
        direction: swipe.direction,
        item: item.clone(),
    });
}

fn reconcile_cards<T: DeckItem>(
    mut commands: Commands,
    deck: Res<SwipeDeck<T>>,
    content: Res<DeckContent<T>>,
    mut registry: ResMut<CardRegistry<T>>,
    mut cards: Query<(&mut DeckCard<T::Id>, &mut StackSlot)>,
    mut presences: Query<&mut Presence>,
) {
    let Some(root) = registry.root else {
        return;
    };
    let transition = deck.config().layout_transition;
    let step = deck.config().stack_offset;
    let swiped = registry.swiped.take();

    let slots = match deck.layout() {
        StackLayout::Exhausted => {
            for (key, entity) in registry.cards.drain() {
                let was_swiped = swiped.as_ref() == Some(&key);
                dismiss_card::<T::Id>(&mut commands, entity, was_swiped, transition);
            }
            if registry.no_more_cards.is_none() {
                let view = content.0.spawn_no_more_cards(&mut commands);
                commands
                    .entity(view)
                    .insert((NoMoreCards, Presence::entering(transition)));
                commands.entity(root).add_child(view);
                registry.no_more_cards = Some(view);
            }
            return;
        }
        StackLayout::Cards(slots) => slots,
    };

    if let Some(view) = registry.no_more_cards.take() {
        commands.entity(view).remove::<NoMoreCards>();
        match presences.get_mut(view) {
            Ok(mut presence) => presence.leave(transition),
            // Spawned earlier this frame.
            Err(_) => {
                commands.entity(view).insert(Presence::leaving(transition));
            }
        }
    }

    let visible: HashSet<&T::Id> = slots.iter().map(|slot| &slot.key).collect();
    registry.cards.retain(|key, entity| {
        let keep = visible.contains(key);
        if !keep {
            let was_swiped = swiped.as_ref() == Some(key);
            dismiss_card::<T::Id>(&mut commands, *entity, was_swiped, transition);
        }
        keep
    });

    let mut seen = HashSet::default();
    for slot in &slots {
        if !seen.insert(&slot.key) {
            warn!(
                "Duplicate card id {:?} at index {}, only the first card is shown",
                slot.key, slot.index
            );
            continue;
        }

        if let Some(&entity) = registry.cards.get(&slot.key) {
            // Cards spawned earlier this frame are not queryable yet and already match their slot.
            if let Ok((mut card, mut stack_slot)) = cards.get_mut(entity) {
                card.follow(slot);
                stack_slot.retarget(slot.stack_offset, transition);
            }
            continue;
        }

        let Some(item) = deck.items().get(slot.index) else {
            continue;
        };
        let entity = commands
            .spawn((
                DeckCard::from_slot(slot),
                StackSlot::entering(slot.stack_offset, step, transition),
                Transform::default(),
                Visibility::default(),
            ))
            .with_children(|card| content.0.spawn_card(card, item))
            .id();
        commands.entity(root).add_child(entity);
        registry.cards.insert(slot.key.clone(), entity);
    }
}

/// A swiped card has already flown out and goes at once; any other card shrinks away.
fn dismiss_card<K: Send + Sync + 'static>(
    commands: &mut Commands,
    entity: Entity,
    swiped: bool,
    transition: LayoutTransition,
) {
    if swiped {
        commands.entity(entity).despawn_recursive();
    } else {
        commands
            .entity(entity)
            .remove::<(DeckCard<K>, StackSlot)>()
            .insert(Presence::leaving(transition));
    }
}

fn animate_cards<T: DeckItem>(
    time: Res<Time>,
    deck: Res<SwipeDeck<T>>,
    mut cards: Query<(&DeckCard<T::Id>, &mut StackSlot, &mut Transform)>,
) {
    let dt = time.delta_secs();
    let drag = deck.card_transform();

    for (card, mut slot, mut transform) in &mut cards {
        slot.offset.step(dt);
        let resting = Vec2::new(0.0, slot.offset());
        *transform = if card.interactive {
            card_world_transform(resting + drag.translation, drag.rotation_degrees, card.depth)
        } else {
            card_world_transform(resting, 0.0, card.depth)
        };
    }
}

fn animate_presence(
    mut commands: Commands,
    time: Res<Time>,
    mut views: Query<(Entity, &mut Presence, Option<&mut Transform>)>,
) {
    let dt = time.delta_secs();
    for (entity, mut presence, transform) in &mut views {
        let settled = presence.scale.step(dt);
        if let Some(mut transform) = transform {
            transform.scale = Vec3::splat(presence.scale());
        }
        if settled && presence.leaving {
            commands.entity(entity).despawn_recursive();
        }
    }
}

/// Converts a screen-space card offset (y down, clockwise degrees) into a bevy transform.
pub fn card_world_transform(screen_offset: Vec2, rotation_degrees: f32, depth: usize) -> Transform {
    let z = (depth as f32).mul_add(-DEPTH_Z_STEP, TOP_CARD_Z);
    Transform::from_xyz(screen_offset.x, -screen_offset.y, z)
        .with_rotation(Quat::from_rotation_z(-rotation_degrees.to_radians()))
}
