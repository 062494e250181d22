//! Input entry points used by a host renderer (or tests) to feed pointer
//! interactions into the ECS.
use bevy_ecs::{hierarchy::ChildOf, prelude::*};
use tracing::trace;

use crate::{
    ecs::{ClickAction, Disabled, ScrollOffset, TextField},
    events::UiEventQueue,
};

/// Emitted whenever a scrollable node's offset changes through user input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiScrolled {
    pub offset: f32,
}

/// Click `entity`. The nearest node at or above it carrying a [`ClickAction`]
/// pushes its action, tagged with that node's entity.
///
/// Returns `false` when nothing handles the click: the entity is missing, a
/// [`Disabled`] node sits on the path, or the first action found is
/// target-only and belongs to an ancestor.
pub fn click(world: &mut World, entity: Entity) -> bool {
    let mut current = entity;
    loop {
        let Ok(node) = world.get_entity(current) else {
            return false;
        };
        if node.contains::<Disabled>() {
            trace!(?entity, ?current, "click swallowed by disabled node");
            return false;
        }
        if let Some(action) = node.get::<ClickAction>() {
            if current != entity && !action.accepts_bubbled() {
                trace!(?entity, ?current, "click stopped at target-only action");
                return false;
            }
            let action = action.clone();
            let queue = world.resource::<UiEventQueue>().clone();
            action.emit(current, &queue);
            return true;
        }
        let Some(parent) = node.get::<ChildOf>() else {
            return false;
        };
        current = parent.parent();
    }
}

/// Scroll `entity` to `offset` and notify listeners with [`UiScrolled`].
pub fn scroll_to(world: &mut World, entity: Entity, offset: f32) -> bool {
    let Some(mut scroll) = world.get_mut::<ScrollOffset>(entity) else {
        return false;
    };
    scroll.0 = offset.max(0.0);
    let offset = scroll.0;

    world
        .resource::<UiEventQueue>()
        .push_typed(entity, UiScrolled { offset });
    true
}

/// Replace the contents of a [`TextField`].
pub fn edit_text(world: &mut World, entity: Entity, value: impl Into<String>) -> bool {
    let Some(mut field) = world.get_mut::<TextField>(entity) else {
        return false;
    };
    field.value = value.into();
    true
}
