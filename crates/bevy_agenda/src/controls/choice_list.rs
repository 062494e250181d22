use bevy_ecs::{entity::Entity, prelude::*};

use crate::{
    controls::{ChoiceOption, PopupUiAction},
    ecs::{ClickAction, Disabled, StyleClass, UiLabel},
    templates::spawn_child,
};

/// Row of a rendered choice list.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRow {
    pub value: String,
}

/// Options and current value shown by one open choice popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceListSession {
    pub options: Vec<ChoiceOption>,
    pub selected: String,
}

impl ChoiceListSession {
    #[must_use]
    pub fn new(options: Vec<ChoiceOption>, selected: impl Into<String>) -> Self {
        Self {
            options,
            selected: selected.into(),
        }
    }
}

/// One row per option, in order. Disabled rows render but carry no action.
pub fn render_choice_list(world: &mut World, content: Entity, session: &ChoiceListSession) {
    let list = spawn_child(
        world,
        content,
        StyleClass::new(["custom-select-options", "scrollable-list"]),
    );

    for option in &session.options {
        let mut classes = StyleClass::new(["custom-select-option"]);
        if option.value == session.selected {
            classes.insert("selected");
        }
        if option.disabled {
            classes.insert("disabled");
        }

        let row = spawn_child(
            world,
            list,
            (
                ChoiceRow {
                    value: option.value.clone(),
                },
                UiLabel::new(option.label.clone()),
                classes,
            ),
        );

        if option.disabled {
            world.entity_mut(row).insert(Disabled);
        } else {
            world.entity_mut(row).insert(ClickAction::new(PopupUiAction::SelectOption {
                value: option.value.clone(),
                label: option.label.clone(),
            }));
        }
    }
}
