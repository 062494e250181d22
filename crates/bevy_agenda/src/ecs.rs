use std::{any::Any, fmt, sync::Arc};

use bevy_ecs::prelude::*;

use crate::events::UiEventQueue;

/// Marker component for UI tree roots.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UiRoot;

/// Marker for the single overlay region hosting popup backdrops.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UiOverlayRoot;

/// Built-in text label component.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct UiLabel {
    pub text: String,
}

impl UiLabel {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// CSS-like class names attached to an entity.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleClass(pub Vec<String>);

impl StyleClass {
    #[must_use]
    pub fn new<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
        Self(classes.into_iter().map(str::to_string).collect())
    }

    #[must_use]
    pub fn contains(&self, class_name: &str) -> bool {
        self.0.iter().any(|class| class == class_name)
    }

    pub fn insert(&mut self, class_name: &str) {
        if !self.contains(class_name) {
            self.0.push(class_name.to_string());
        }
    }

    pub fn remove(&mut self, class_name: &str) {
        self.0.retain(|class| class != class_name);
    }
}

/// Single-line editable text, e.g. the new-professional name or an exception description.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    pub value: String,
    pub placeholder: String,
}

impl TextField {
    #[must_use]
    pub fn new(value: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            placeholder: placeholder.into(),
        }
    }
}

/// Marks a button-like node as inert; clicks on it are swallowed.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Disabled;

/// Marks a node as hidden without removing it from the tree.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hidden;

/// Typed action a node emits onto [`UiEventQueue`] when clicked.
///
/// Clicks on nodes without one bubble up to the nearest ancestor that has one,
/// unless that action was built with [`ClickAction::target_only`].
#[derive(Component, Clone)]
pub struct ClickAction {
    emit: Arc<dyn Fn(Entity, &UiEventQueue) + Send + Sync>,
    target_only: bool,
}

impl ClickAction {
    #[must_use]
    pub fn new<A>(action: A) -> Self
    where
        A: Any + Clone + Send + Sync,
    {
        Self {
            emit: Arc::new(move |entity, queue| queue.push_typed(entity, action.clone())),
            target_only: false,
        }
    }

    /// Action that fires only when its own node is hit, never for clicks
    /// bubbling up from descendants.
    #[must_use]
    pub fn target_only<A>(action: A) -> Self
    where
        A: Any + Clone + Send + Sync,
    {
        Self {
            target_only: true,
            ..Self::new(action)
        }
    }

    #[must_use]
    pub fn accepts_bubbled(&self) -> bool {
        !self.target_only
    }

    pub fn emit(&self, entity: Entity, queue: &UiEventQueue) {
        (self.emit)(entity, queue);
    }
}

impl fmt::Debug for ClickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickAction")
            .field("target_only", &self.target_only)
            .finish_non_exhaustive()
    }
}

/// Vertical scroll position of a scrollable list node, in layout units.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollOffset(pub f32);
