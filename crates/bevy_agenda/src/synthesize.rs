use bevy_ecs::{hierarchy::Children, prelude::*};
use tracing::trace;

use crate::{
    ecs::{ClickAction, Disabled, Hidden, ScrollOffset, StyleClass, TextField, UiLabel, UiRoot},
    overlay::PopupOpacity,
};

/// Plain snapshot of one UI node, for host renderers and inspection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewNode {
    pub entity: Option<Entity>,
    pub text: Option<String>,
    pub classes: Vec<String>,
    pub clickable: bool,
    pub disabled: bool,
    pub hidden: bool,
    pub opacity: Option<f32>,
    pub scroll_offset: Option<f32>,
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    fn placeholder(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes.iter().any(|class| class == class_name)
    }

    /// Depth-first search over this node and its descendants.
    #[must_use]
    pub fn find(&self, predicate: &dyn Fn(&ViewNode) -> bool) -> Option<&ViewNode> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(predicate))
    }

    /// Every text in this subtree, depth-first.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        let mut texts = Vec::new();
        self.collect_texts(&mut texts);
        texts
    }

    fn collect_texts<'a>(&'a self, texts: &mut Vec<&'a str>) {
        if let Some(text) = &self.text {
            texts.push(text);
        }
        for child in &self.children {
            child.collect_texts(texts);
        }
    }
}

/// Snapshot containing synthesized root views for the current frame.
#[derive(Resource, Debug, Default)]
pub struct SynthesizedUiViews {
    pub roots: Vec<ViewNode>,
}

/// Snapshot metrics for the latest synthesis pass.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct UiSynthesisStats {
    pub root_count: usize,
    pub node_count: usize,
    pub cycle_count: usize,
    pub missing_entity_count: usize,
}

/// Collect all entities marked with [`UiRoot`].
pub fn gather_ui_roots(world: &mut World) -> Vec<Entity> {
    let mut query = world.query_filtered::<Entity, With<UiRoot>>();
    query.iter(world).collect()
}

/// Synthesize view snapshots and stats for provided roots.
pub fn synthesize_roots_with_stats(
    world: &World,
    roots: impl IntoIterator<Item = Entity>,
) -> (Vec<ViewNode>, UiSynthesisStats) {
    let roots = roots.into_iter().collect::<Vec<_>>();
    let mut output = Vec::with_capacity(roots.len());
    let mut stats = UiSynthesisStats {
        root_count: roots.len(),
        ..UiSynthesisStats::default()
    };
    let mut visiting = Vec::new();

    for root in roots {
        output.push(synthesize_entity(world, root, &mut visiting, &mut stats));
    }

    (output, stats)
}

/// Synthesize the subtree rooted at `entity`.
#[must_use]
pub fn synthesize_subtree(world: &World, entity: Entity) -> ViewNode {
    let (mut roots, _) = synthesize_roots_with_stats(world, [entity]);
    roots.pop().unwrap_or_default()
}

fn synthesize_entity(
    world: &World,
    entity: Entity,
    visiting: &mut Vec<Entity>,
    stats: &mut UiSynthesisStats,
) -> ViewNode {
    let Ok(entity_ref) = world.get_entity(entity) else {
        stats.node_count += 1;
        stats.missing_entity_count += 1;
        return ViewNode::placeholder(format!("[missing entity {entity:?}]"));
    };

    if visiting.contains(&entity) {
        stats.node_count += 1;
        stats.cycle_count += 1;
        return ViewNode::placeholder(format!("[cycle at {entity:?}]"));
    }

    visiting.push(entity);

    let child_entities = entity_ref
        .get::<Children>()
        .map(|children| children.iter().collect::<Vec<_>>())
        .unwrap_or_default();

    let children = child_entities
        .into_iter()
        .map(|child| synthesize_entity(world, child, visiting, stats))
        .collect::<Vec<_>>();

    let text = entity_ref
        .get::<UiLabel>()
        .map(|label| label.text.clone())
        .or_else(|| {
            entity_ref
                .get::<TextField>()
                .map(|field| field.value.clone())
        });

    let node = ViewNode {
        entity: Some(entity),
        text,
        classes: entity_ref
            .get::<StyleClass>()
            .map(|classes| classes.0.clone())
            .unwrap_or_default(),
        clickable: entity_ref.contains::<ClickAction>(),
        disabled: entity_ref.contains::<Disabled>(),
        hidden: entity_ref.contains::<Hidden>(),
        opacity: entity_ref.get::<PopupOpacity>().map(|opacity| opacity.0),
        scroll_offset: entity_ref.get::<ScrollOffset>().map(|offset| offset.0),
        children,
    };

    stats.node_count += 1;

    let popped = visiting.pop();
    debug_assert_eq!(popped, Some(entity));

    node
}

/// Bevy system that synthesizes all roots and updates [`SynthesizedUiViews`] and
/// [`UiSynthesisStats`].
pub fn synthesize_ui(world: &mut World) {
    let roots = gather_ui_roots(world);
    let (synthesized, stats) = synthesize_roots_with_stats(world, roots);
    trace!(
        roots = stats.root_count,
        nodes = stats.node_count,
        "synthesized ui"
    );

    world.resource_mut::<SynthesizedUiViews>().roots = synthesized;
    *world.resource_mut::<UiSynthesisStats>() = stats;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::spawn_label;

    #[test]
    fn snapshot_reflects_labels_classes_and_flags() {
        let mut world = World::new();
        let root = world.spawn((UiRoot, StyleClass::new(["root"]))).id();
        let child = spawn_label(&mut world, root, "Salvar", &["bg-success"]);
        world.entity_mut(child).insert(Disabled);

        let (roots, stats) = synthesize_roots_with_stats(&world, [root]);

        assert_eq!(stats.node_count, 2);
        let button = roots[0]
            .find(&|node| node.has_class("bg-success"))
            .expect("button node");
        assert_eq!(button.text.as_deref(), Some("Salvar"));
        assert!(button.disabled);
        assert!(!button.clickable);
        assert_eq!(roots[0].texts(), ["Salvar"]);
    }

    #[test]
    fn missing_roots_are_counted() {
        let mut world = World::new();
        let gone = world.spawn_empty().id();
        assert!(world.despawn(gone));

        let (_, stats) = synthesize_roots_with_stats(&world, [gone]);
        assert_eq!(stats.missing_entity_count, 1);
    }
}
