//! Single-slot popup overlay.
//!
//! [`PopupOverlay`] owns at most one live [`PopupSession`]. Opening a popup
//! supersedes whatever is on screen (including backdrops still fading out);
//! closing starts the exit fade and schedules removal after the configured
//! close delay.
use std::time::Duration;

use bevy_ecs::{entity::Entity, prelude::*};
use bevy_time::Time;
use bevy_tweening::{Animator, EaseFunction, FloatLens, Tween};
use tracing::{debug, trace};

use crate::{
    config::DashboardConfig,
    controls::{PopupState, render_popup},
    ecs::{ClickAction, StyleClass, UiOverlayRoot, UiRoot},
    events::UiEventQueue,
    templates::{despawn_children, despawn_entity_tree, spawn_child},
};

/// Actions emitted by the overlay layer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayUiAction {
    /// The backdrop (not its content) was clicked.
    DismissBackdrop,
}

/// Backdrop hosting one popup's content.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopupBackdrop {
    pub visible: bool,
}

/// Content node placed inside a [`PopupBackdrop`].
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopupContent;

/// Animated backdrop opacity in `0.0..=1.0`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct PopupOpacity(pub f32);

/// The live popup: its nodes, the trigger that opened it, and renderer state.
#[derive(Debug)]
pub struct PopupSession {
    pub backdrop: Entity,
    pub content: Entity,
    pub anchor: Entity,
    pub state: PopupState,
}

#[derive(Debug, Clone, Copy)]
struct ClosingBackdrop {
    backdrop: Entity,
    remaining: Duration,
}

/// Popup overlay manager. Inserted by the app plugin; at most one session is live.
#[derive(Resource, Debug, Default)]
pub struct PopupOverlay {
    active: Option<PopupSession>,
    closing: Vec<ClosingBackdrop>,
}

impl PopupOverlay {
    #[must_use]
    pub fn session(&self) -> Option<&PopupSession> {
        self.active.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut PopupSession> {
        self.active.as_mut()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Backdrops still inside their close-animation window.
    #[must_use]
    pub fn closing_count(&self) -> usize {
        self.closing.len()
    }
}

fn first_overlay_root(world: &mut World) -> Option<Entity> {
    let mut query = world.query_filtered::<Entity, With<UiOverlayRoot>>();
    query.iter(world).next()
}

/// Ensure the overlay root exists and return its entity id.
pub fn ensure_overlay_root_entity(world: &mut World) -> Entity {
    if let Some(existing) = first_overlay_root(world) {
        return existing;
    }

    world.spawn((UiRoot, UiOverlayRoot)).id()
}

/// Startup system form of [`ensure_overlay_root_entity`].
pub fn ensure_overlay_root(world: &mut World) {
    let _ = ensure_overlay_root_entity(world);
}

fn fade_animator(from: f32, to: f32, duration: Duration) -> Animator<PopupOpacity> {
    Animator::new(Tween::new(
        EaseFunction::QuadraticInOut,
        duration,
        FloatLens::new(from, to, |opacity: &mut PopupOpacity| &mut opacity.0),
    ))
}

/// Discard every backdrop in the overlay region, live or fading.
fn clear_overlay(world: &mut World) {
    let (active, closing) = {
        let mut overlay = world.resource_mut::<PopupOverlay>();
        let active = overlay.active.take();
        let closing = std::mem::take(&mut overlay.closing);
        (active, closing)
    };

    if let Some(session) = active {
        trace!(backdrop = ?session.backdrop, "superseding open popup");
        if world.get_entity(session.backdrop).is_ok() {
            despawn_entity_tree(world, session.backdrop);
        }
    }
    for closing in closing {
        if world.get_entity(closing.backdrop).is_ok() {
            despawn_entity_tree(world, closing.backdrop);
        }
    }
}

/// Open a popup for `anchor` showing `state`, replacing any popup on screen.
///
/// The backdrop is spawned hidden, its content rendered, and only then flipped
/// visible so the entrance fade starts from the hidden state.
pub fn open_popup(world: &mut World, anchor: Entity, state: PopupState) -> Entity {
    clear_overlay(world);

    let overlay_root = ensure_overlay_root_entity(world);
    let fade = world.resource::<DashboardConfig>().popup_close_delay();

    let backdrop = spawn_child(
        world,
        overlay_root,
        (
            PopupBackdrop { visible: false },
            PopupOpacity(0.0),
            StyleClass::new(["popup-backdrop"]),
            ClickAction::target_only(OverlayUiAction::DismissBackdrop),
        ),
    );
    let mut classes = StyleClass::new(["popup-content"]);
    if let Some(class_name) = state.content_class() {
        classes.insert(class_name);
    }
    let content = spawn_child(world, backdrop, (PopupContent, classes));

    let mut session = PopupSession {
        backdrop,
        content,
        anchor,
        state,
    };
    render_popup(world, &mut session);

    if let Ok(mut backdrop_entity) = world.get_entity_mut(backdrop) {
        if let Some(mut flag) = backdrop_entity.get_mut::<PopupBackdrop>() {
            flag.visible = true;
        }
        if let Some(mut classes) = backdrop_entity.get_mut::<StyleClass>() {
            classes.insert("open");
        }
        backdrop_entity.insert(fade_animator(0.0, 1.0, fade));
    }

    debug!(?anchor, ?backdrop, kind = session.state.kind(), "opened popup");
    world.resource_mut::<PopupOverlay>().active = Some(session);
    backdrop
}

/// Rebuild the live popup's content from its (possibly mutated) session state.
pub fn rerender_popup(world: &mut World) {
    let Some(mut session) = world.resource_mut::<PopupOverlay>().active.take() else {
        return;
    };

    despawn_children(world, session.content);
    render_popup(world, &mut session);
    trace!(content = ?session.content, "re-rendered popup content");

    // A popup opened while rendering supersedes this one.
    let mut overlay = world.resource_mut::<PopupOverlay>();
    if overlay.active.is_none() {
        overlay.active = Some(session);
    }
}

/// Close the live popup: hide it now, remove its nodes after the close delay.
///
/// The session's renderer state (including any pending debounce) is dropped
/// immediately. No-op when nothing is open.
pub fn close_popup(world: &mut World) {
    let Some(session) = world.resource_mut::<PopupOverlay>().active.take() else {
        return;
    };

    let delay = world.resource::<DashboardConfig>().popup_close_delay();
    if let Ok(mut backdrop_entity) = world.get_entity_mut(session.backdrop) {
        let from = backdrop_entity
            .get::<PopupOpacity>()
            .map_or(1.0, |opacity| opacity.0);
        if let Some(mut flag) = backdrop_entity.get_mut::<PopupBackdrop>() {
            flag.visible = false;
        }
        if let Some(mut classes) = backdrop_entity.get_mut::<StyleClass>() {
            classes.remove("open");
        }
        backdrop_entity.insert(fade_animator(from, 0.0, delay));
    }

    debug!(backdrop = ?session.backdrop, "closing popup");
    world
        .resource_mut::<PopupOverlay>()
        .closing
        .push(ClosingBackdrop {
            backdrop: session.backdrop,
            remaining: delay,
        });
}

/// Remove closing backdrops whose close delay has elapsed by `delta`.
pub fn advance_popup_overlay(world: &mut World, delta: Duration) {
    let expired = {
        let mut overlay = world.resource_mut::<PopupOverlay>();
        let mut expired = Vec::new();
        overlay.closing.retain_mut(|closing| {
            closing.remaining = closing.remaining.saturating_sub(delta);
            if closing.remaining.is_zero() {
                expired.push(closing.backdrop);
                false
            } else {
                true
            }
        });
        expired
    };

    for backdrop in expired {
        if world.get_entity(backdrop).is_ok() {
            despawn_entity_tree(world, backdrop);
            trace!(?backdrop, "removed closed popup");
        }
    }
}

/// Per-frame system driving [`advance_popup_overlay`] from Bevy `Time`.
pub fn tick_popup_overlay(world: &mut World) {
    let delta = world.resource::<Time>().delta();
    advance_popup_overlay(world, delta);
}

/// Consume [`OverlayUiAction`] entries.
pub fn handle_overlay_actions(world: &mut World) {
    let actions = world
        .resource::<UiEventQueue>()
        .drain_actions::<OverlayUiAction>();

    for event in actions {
        match event.action {
            OverlayUiAction::DismissBackdrop => {
                let is_live_backdrop = world
                    .resource::<PopupOverlay>()
                    .session()
                    .is_some_and(|session| session.backdrop == event.entity);
                if is_live_backdrop {
                    close_popup(world);
                }
            }
        }
    }
}

/// Every popup backdrop currently in the overlay region, live or fading.
#[must_use]
pub fn overlay_backdrops(world: &mut World) -> Vec<Entity> {
    let mut query = world.query_filtered::<Entity, With<PopupBackdrop>>();
    query.iter(world).collect()
}
