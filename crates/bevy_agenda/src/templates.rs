use std::any::Any;

use bevy_ecs::{
    entity::Entity,
    hierarchy::{ChildOf, Children},
    prelude::*,
};

use crate::ecs::{ClickAction, StyleClass, UiLabel};

/// Direct children of `parent`, in insertion order.
#[must_use]
pub fn children_of(world: &World, parent: Entity) -> Vec<Entity> {
    world
        .get::<Children>(parent)
        .map(|children| children.iter().collect::<Vec<_>>())
        .unwrap_or_default()
}

/// Find the first child template part entity for `parent` tagged with marker `P`.
#[must_use]
pub fn find_template_part<P: Component>(world: &World, parent: Entity) -> Option<Entity> {
    let children = world.get::<Children>(parent)?;
    children
        .iter()
        .find(|child| world.get::<P>(*child).is_some())
}

/// Spawn a new node under `parent`.
pub fn spawn_child<B: Bundle>(world: &mut World, parent: Entity, bundle: B) -> Entity {
    world.spawn((bundle, ChildOf(parent))).id()
}

/// Spawn a labelled node with style classes under `parent`.
pub fn spawn_label(
    world: &mut World,
    parent: Entity,
    text: impl Into<String>,
    classes: &[&str],
) -> Entity {
    spawn_child(
        world,
        parent,
        (UiLabel::new(text), StyleClass::new(classes.iter().copied())),
    )
}

/// Spawn a labelled node under `parent` that emits `action` when clicked.
pub fn spawn_button<A>(
    world: &mut World,
    parent: Entity,
    text: impl Into<String>,
    classes: &[&str],
    action: A,
) -> Entity
where
    A: Any + Clone + Send + Sync,
{
    let button = spawn_label(world, parent, text, classes);
    world.entity_mut(button).insert(ClickAction::new(action));
    button
}

/// Ensure a child template part tagged with marker `P` exists.
pub fn ensure_template_part<P, B>(
    world: &mut World,
    parent: Entity,
    make_bundle: impl FnOnce() -> B,
) -> Entity
where
    P: Component + Default,
    B: Bundle,
{
    if let Some(existing) = find_template_part::<P>(world, parent) {
        return existing;
    }

    spawn_child(world, parent, (P::default(), make_bundle()))
}

/// Despawn `entity` together with its whole subtree.
pub fn despawn_entity_tree(world: &mut World, entity: Entity) {
    for child in children_of(world, entity) {
        if world.get_entity(child).is_ok() {
            despawn_entity_tree(world, child);
        }
    }

    let _ = world.despawn(entity);
}

/// Despawn every descendant of `parent`, keeping `parent` itself.
pub fn despawn_children(world: &mut World, parent: Entity) {
    for child in children_of(world, parent) {
        if world.get_entity(child).is_ok() {
            despawn_entity_tree(world, child);
        }
    }
}

/// All descendants of `root` carrying `C`, in depth-first order.
#[must_use]
pub fn find_descendants<C: Component>(world: &World, root: Entity) -> Vec<Entity> {
    let mut found = Vec::new();
    collect_descendants::<C>(world, root, &mut found);
    found
}

fn collect_descendants<C: Component>(world: &World, root: Entity, found: &mut Vec<Entity>) {
    for child in children_of(world, root) {
        if world.get::<C>(child).is_some() {
            found.push(child);
        }
        collect_descendants::<C>(world, child, found);
    }
}

/// Nearest strict ancestor of `entity` carrying `C`.
#[must_use]
pub fn find_ancestor<C: Component>(world: &World, entity: Entity) -> Option<Entity> {
    let mut current = world.get::<ChildOf>(entity).map(ChildOf::parent);
    while let Some(candidate) = current {
        if world.get::<C>(candidate).is_some() {
            return Some(candidate);
        }
        current = world.get::<ChildOf>(candidate).map(ChildOf::parent);
    }
    None
}

/// Whether `ancestor` is `entity` itself or one of its ancestors.
#[must_use]
pub fn is_within(world: &World, entity: Entity, ancestor: Entity) -> bool {
    let mut current = Some(entity);
    while let Some(candidate) = current {
        if candidate == ancestor {
            return true;
        }
        current = world.get::<ChildOf>(candidate).map(ChildOf::parent);
    }
    false
}
