use std::{fmt, sync::Arc};

use bevy_ecs::{entity::Entity, prelude::*};
use tracing::{debug, trace};

use crate::{
    config::DashboardConfig,
    ecs::{StyleClass, UiLabel},
    events::UiEventQueue,
    storage::DashboardStorage,
    templates::{
        children_of, find_ancestor, find_descendants, find_template_part, spawn_button,
        spawn_child, spawn_label,
    },
    theme::{CssVariables, THEME_CATALOG, is_chart_variable, load_theme, save_current_theme},
    views::ButtonCallback,
};

/// Collaborators of the customization tab. Every callback is optional.
#[derive(Component, Clone, Default)]
pub struct CustomizationCallbacks {
    pub on_save_theme: Option<ButtonCallback>,
    pub on_reset_theme: Option<ButtonCallback>,
    /// Called after a `--chart-color*` variable changes.
    pub on_color_change: Option<Arc<dyn Fn(&mut World) + Send + Sync>>,
}

impl fmt::Debug for CustomizationCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomizationCallbacks")
            .field("on_save_theme", &self.on_save_theme.is_some())
            .field("on_reset_theme", &self.on_reset_theme.is_some())
            .field("on_color_change", &self.on_color_change.is_some())
            .finish()
    }
}

/// Marks a populated customization tab container.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomizationTab;

/// Color input bound to one theme variable.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ColorField {
    pub variable: String,
    pub value: String,
}

/// Text showing a [`ColorField`]'s current value.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartColorValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomizationUiAction {
    SaveTheme,
    ResetTheme,
}

/// Render the theme editor into `container`.
///
/// Renders only once: returns `false` without touching anything when the
/// container is missing or already has content.
pub fn populate_customization_tab(
    world: &mut World,
    container: Entity,
    callbacks: CustomizationCallbacks,
) -> bool {
    if world.get_entity(container).is_err() || !children_of(world, container).is_empty() {
        return false;
    }

    let key = world
        .resource::<DashboardConfig>()
        .theme_storage_key
        .clone();
    let stored = load_theme(world.resource::<DashboardStorage>(), &key);
    world
        .entity_mut(container)
        .insert((CustomizationTab, callbacks));

    let card = spawn_child(world, container, StyleClass::new(["bg-card"]));
    let header = spawn_child(world, card, StyleClass::new(["tab-header"]));
    spawn_label(world, header, "Customização da Aparência", &["heading"]);
    spawn_label(
        world,
        header,
        "Altere as cores do sistema. As alterações são salvas localmente de forma automática.",
        &["text-muted"],
    );
    spawn_button(
        world,
        header,
        "Resetar Cores",
        &["button", "bg-danger"],
        CustomizationUiAction::ResetTheme,
    );
    spawn_button(
        world,
        header,
        "Salvar Tema na Nuvem",
        &["button", "bg-success"],
        CustomizationUiAction::SaveTheme,
    );

    for category in &THEME_CATALOG {
        let section = spawn_child(world, card, StyleClass::new(["theme-section"]));
        spawn_label(world, section, category.title, &["section-title"]);
        let grid = spawn_child(world, section, StyleClass::new(["theme-grid"]));

        for entry in category.entries {
            let value = stored
                .get(entry.variable)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .or_else(|| {
                    world
                        .resource::<CssVariables>()
                        .get(entry.variable)
                        .map(|value| value.trim().to_string())
                })
                .unwrap_or_default();

            let field = spawn_child(
                world,
                grid,
                (
                    ColorField {
                        variable: entry.variable.to_string(),
                        value: value.clone(),
                    },
                    StyleClass::new(["color-field"]),
                ),
            );
            spawn_label(world, field, entry.label, &["text-muted"]);
            spawn_child(
                world,
                field,
                (PartColorValue, UiLabel::new(value), StyleClass::new(["font-mono"])),
            );
        }
    }

    debug!(?container, "populated customization tab");
    true
}

fn set_field_value(world: &mut World, field: Entity, value: &str) {
    if let Some(mut color) = world.get_mut::<ColorField>(field) {
        color.value = value.to_string();
    }
    let Some(part) = find_template_part::<PartColorValue>(world, field) else {
        return;
    };
    if let Some(mut label) = world.get_mut::<UiLabel>(part) {
        label.text = value.to_string();
    }
}

/// Color input handler: apply `value` live, show it, autosave, and signal a
/// chart redraw for chart variables.
pub fn set_theme_color(world: &mut World, field: Entity, value: &str) -> bool {
    let Some(variable) = world.get::<ColorField>(field).map(|f| f.variable.clone()) else {
        return false;
    };

    world
        .resource_mut::<CssVariables>()
        .set_property(&variable, value);
    set_field_value(world, field, value);
    save_current_theme(world);
    trace!(%variable, value, "theme color changed");

    if is_chart_variable(&variable) {
        let on_color_change = find_ancestor::<CustomizationTab>(world, field)
            .and_then(|tab| world.get::<CustomizationCallbacks>(tab))
            .and_then(|callbacks| callbacks.on_color_change.clone());
        if let Some(on_color_change) = on_color_change {
            on_color_change(world);
        }
    }
    true
}

/// Re-read every [`ColorField`] under `tab` from [`CssVariables`], e.g. after a reset.
pub fn refresh_color_fields(world: &mut World, tab: Entity) {
    for field in find_descendants::<ColorField>(world, tab) {
        let Some(variable) = world.get::<ColorField>(field).map(|f| f.variable.clone()) else {
            continue;
        };
        let value = world
            .resource::<CssVariables>()
            .get(&variable)
            .map(|value| value.trim().to_string())
            .unwrap_or_default();
        set_field_value(world, field, &value);
    }
}

/// Consume [`CustomizationUiAction`] entries by calling the tab's callbacks.
pub fn handle_customization_actions(world: &mut World) {
    let actions = world
        .resource::<UiEventQueue>()
        .drain_actions::<CustomizationUiAction>();

    for event in actions {
        let Some(callbacks) = find_ancestor::<CustomizationTab>(world, event.entity)
            .and_then(|tab| world.get::<CustomizationCallbacks>(tab))
            .cloned()
        else {
            continue;
        };

        let callback = match event.action {
            CustomizationUiAction::SaveTheme => callbacks.on_save_theme,
            CustomizationUiAction::ResetTheme => callbacks.on_reset_theme,
        };
        if let Some(callback) = callback {
            callback(world, event.entity);
        }
    }
}
