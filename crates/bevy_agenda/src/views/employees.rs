use std::{fmt, sync::Arc};

use bevy_ecs::{entity::Entity, hierarchy::ChildOf, prelude::*};
use tracing::{debug, trace};

use crate::{
    controls::{ChoiceOption, InputKind, OnChange, create_custom_input, custom_input_value},
    ecs::{Disabled, Hidden, StyleClass, TextField},
    events::UiEventQueue,
    locale::{SELECT_PROMPT, WEEKDAY_NAMES},
    schedule::{DaySchedule, EmployeeSchedule, ProfessionalSchedules, ScheduleException},
    templates::{
        children_of, despawn_children, despawn_entity_tree, find_ancestor, spawn_button,
        spawn_child, spawn_label,
    },
};

pub type SaveListCallback = Arc<dyn Fn(&mut World, &[String], Entity) + Send + Sync>;
pub type SaveScheduleCallback =
    Arc<dyn Fn(&mut World, &str, &EmployeeSchedule, Entity) + Send + Sync>;

/// Collaborators of the employees tab, each invoked with the clicked button.
#[derive(Component, Clone, Default)]
pub struct EmployeesCallbacks {
    pub on_save_list: Option<SaveListCallback>,
    pub on_save_schedule: Option<SaveScheduleCallback>,
}

impl fmt::Debug for EmployeesCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmployeesCallbacks")
            .field("on_save_list", &self.on_save_list.is_some())
            .field("on_save_schedule", &self.on_save_schedule.is_some())
            .finish()
    }
}

/// Nodes of a populated employees tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeesTabParts {
    pub roster: Entity,
    pub new_name: Entity,
    pub selector_mount: Entity,
    pub save_schedule_button: Entity,
    pub manager: Entity,
    pub week_body: Entity,
    pub lunch_body: Entity,
    pub exceptions_body: Entity,
}

/// Populated employees tab container.
#[derive(Component, Debug, Clone)]
pub struct EmployeesTab {
    pub parts: EmployeesTabParts,
    pub schedules: ProfessionalSchedules,
}

/// Roster entry.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleRowKind {
    Work,
    Lunch,
}

/// One weekday row of the work or lunch table.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub day: String,
    pub kind: ScheduleRowKind,
    pub start_mount: Entity,
    pub end_mount: Entity,
}

/// One exception row.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionRow {
    pub date_mount: Entity,
    pub start_mount: Entity,
    pub end_mount: Entity,
    pub desc: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeesUiAction {
    AddEmployee,
    /// Remove the roster or exception row containing the clicked button.
    RemoveRow,
    SaveList,
    AddException,
    SaveSchedule,
}

fn add_employee_row(world: &mut World, roster: Entity, name: &str) -> Entity {
    let row = spawn_child(
        world,
        roster,
        (
            EmployeeRow {
                name: name.to_string(),
            },
            StyleClass::new(["employee-row"]),
        ),
    );
    spawn_label(world, row, name, &["employee-name"]);
    spawn_button(
        world,
        row,
        "X",
        &["button", "remove-row-button"],
        EmployeesUiAction::RemoveRow,
    );
    row
}

fn add_exception_row(world: &mut World, body: Entity, exception: &ScheduleException) -> Entity {
    let row = spawn_child(world, body, StyleClass::new(["exception-row"]));
    let date_mount = spawn_child(world, row, StyleClass::new(["exception-date"]));
    let start_mount = spawn_child(world, row, StyleClass::new(["exception-start"]));
    let end_mount = spawn_child(world, row, StyleClass::new(["exception-end"]));
    let desc = spawn_child(
        world,
        row,
        (
            TextField::new(exception.desc.clone(), "Ex: Férias"),
            StyleClass::new(["desc-input"]),
        ),
    );
    spawn_button(
        world,
        row,
        "×",
        &["button", "remove-row-button"],
        EmployeesUiAction::RemoveRow,
    );

    let fields = [
        (InputKind::Date, date_mount, &exception.date),
        (InputKind::Time, start_mount, &exception.start),
        (InputKind::Time, end_mount, &exception.end),
    ];
    for (kind, mount, value) in fields {
        create_custom_input(world, kind, mount, None, value, None);
    }

    world.entity_mut(row).insert(ExceptionRow {
        date_mount,
        start_mount,
        end_mount,
        desc,
    });
    row
}

fn add_schedule_row(
    world: &mut World,
    body: Entity,
    day: &str,
    kind: ScheduleRowKind,
    start: &str,
    end: &str,
) {
    let row = spawn_child(world, body, StyleClass::new(["schedule-row"]));
    spawn_label(world, row, day, &["font-semibold"]);
    let start_mount = spawn_child(world, row, StyleClass::new(["schedule-start"]));
    let end_mount = spawn_child(world, row, StyleClass::new(["schedule-end"]));
    create_custom_input(world, InputKind::Time, start_mount, None, start, None);
    create_custom_input(world, InputKind::Time, end_mount, None, end, None);

    world.entity_mut(row).insert(ScheduleRow {
        day: day.to_string(),
        kind,
        start_mount,
        end_mount,
    });
}

/// Render the roster and schedule editor into `container`, replacing its
/// content. Returns `false` when the container is missing.
pub fn populate_employees_tab(
    world: &mut World,
    container: Entity,
    professionals: &[String],
    schedules: ProfessionalSchedules,
    callbacks: EmployeesCallbacks,
) -> bool {
    if world.get_entity(container).is_err() {
        return false;
    }
    despawn_children(world, container);

    let card = spawn_child(world, container, StyleClass::new(["bg-card"]));

    let roster_column = spawn_child(world, card, StyleClass::new(["roster-column"]));
    spawn_label(world, roster_column, "Profissionais", &["heading"]);
    spawn_label(
        world,
        roster_column,
        "Adicione e remova os profissionais da sua equipe.",
        &["text-muted"],
    );
    let roster = spawn_child(
        world,
        roster_column,
        StyleClass::new(["employees-list", "scrollable-list"]),
    );
    for name in professionals {
        add_employee_row(world, roster, name);
    }
    let new_name = spawn_child(
        world,
        roster_column,
        (
            TextField::new("", "Nome do profissional"),
            StyleClass::new(["new-employee-name"]),
        ),
    );
    spawn_button(
        world,
        roster_column,
        "Adicionar",
        &["button", "bg-info"],
        EmployeesUiAction::AddEmployee,
    );
    spawn_button(
        world,
        roster_column,
        "Salvar Lista de Profissionais",
        &["button", "bg-success"],
        EmployeesUiAction::SaveList,
    );

    let schedule_column = spawn_child(world, card, StyleClass::new(["schedule-column"]));
    spawn_label(
        world,
        schedule_column,
        "Horários do Profissional",
        &["heading"],
    );
    spawn_label(
        world,
        schedule_column,
        "Selecione um profissional para editar seus horários.",
        &["text-muted"],
    );
    let save_schedule_button = spawn_button(
        world,
        schedule_column,
        "Salvar Horários",
        &["button", "bg-success"],
        EmployeesUiAction::SaveSchedule,
    );
    world.entity_mut(save_schedule_button).insert(Disabled);
    let selector_mount = spawn_child(
        world,
        schedule_column,
        StyleClass::new(["employee-selector"]),
    );

    let manager = spawn_child(
        world,
        schedule_column,
        (Hidden, StyleClass::new(["schedule-manager"])),
    );
    spawn_label(world, manager, "Horário Padrão", &["section-title"]);
    let week_body = spawn_child(world, manager, StyleClass::new(["week-schedule-body"]));
    spawn_label(world, manager, "Horário de Almoço", &["section-title"]);
    let lunch_body = spawn_child(world, manager, StyleClass::new(["lunch-schedule-body"]));
    spawn_label(world, manager, "Exceções e Férias", &["section-title"]);
    let exceptions_body = spawn_child(world, manager, StyleClass::new(["exceptions-body"]));
    spawn_button(
        world,
        manager,
        "Adicionar Exceção",
        &["button", "bg-info"],
        EmployeesUiAction::AddException,
    );

    world.entity_mut(container).insert((
        EmployeesTab {
            parts: EmployeesTabParts {
                roster,
                new_name,
                selector_mount,
                save_schedule_button,
                manager,
                week_body,
                lunch_body,
                exceptions_body,
            },
            schedules,
        },
        callbacks,
    ));

    let mut options = vec![ChoiceOption::new("", SELECT_PROMPT).disabled()];
    for name in professionals {
        options.push(ChoiceOption::new(name.clone(), name.clone()));
    }
    create_custom_input(
        world,
        InputKind::Choice,
        selector_mount,
        Some(options),
        "",
        Some(OnChange::new(move |world, selected| {
            display_employee_schedule(world, container, selected);
        })),
    );

    debug!(?container, professionals = professionals.len(), "populated employees tab");
    true
}

/// Show the editor for `name`, or hide it (and disable saving) when `name` is empty.
pub fn display_employee_schedule(world: &mut World, tab: Entity, name: &str) -> bool {
    let Some(state) = world.get::<EmployeesTab>(tab) else {
        return false;
    };
    let parts = state.parts;
    let schedule = state.schedules.get(name).cloned().unwrap_or_default();

    if name.is_empty() {
        world.entity_mut(parts.manager).insert(Hidden);
        world
            .entity_mut(parts.save_schedule_button)
            .insert(Disabled);
        return true;
    }
    world.entity_mut(parts.manager).remove::<Hidden>();
    world
        .entity_mut(parts.save_schedule_button)
        .remove::<Disabled>();

    despawn_children(world, parts.week_body);
    despawn_children(world, parts.lunch_body);
    for day in WEEKDAY_NAMES {
        let entry = schedule.day(day).cloned().unwrap_or_default();
        add_schedule_row(
            world,
            parts.week_body,
            day,
            ScheduleRowKind::Work,
            &entry.start,
            &entry.end,
        );
        add_schedule_row(
            world,
            parts.lunch_body,
            day,
            ScheduleRowKind::Lunch,
            &entry.lunch_start,
            &entry.lunch_end,
        );
    }

    despawn_children(world, parts.exceptions_body);
    for exception in &schedule.exceptions {
        add_exception_row(world, parts.exceptions_body, exception);
    }

    trace!(?tab, name, "showing employee schedule");
    true
}

/// Names currently listed in the roster, in display order.
#[must_use]
pub fn roster_names(world: &World, tab: Entity) -> Vec<String> {
    let Some(state) = world.get::<EmployeesTab>(tab) else {
        return Vec::new();
    };
    children_of(world, state.parts.roster)
        .into_iter()
        .filter_map(|row| world.get::<EmployeeRow>(row).map(|row| row.name.clone()))
        .collect()
}

fn input_value(world: &World, mount: Entity) -> String {
    custom_input_value(world, mount).unwrap_or_default()
}

fn schedule_rows(world: &World, body: Entity) -> Vec<ScheduleRow> {
    children_of(world, body)
        .into_iter()
        .filter_map(|row| world.get::<ScheduleRow>(row).cloned())
        .collect()
}

/// Selected professional and the schedule currently shown in the editor.
///
/// Work and lunch rows are merged by weekday; exceptions without a date are
/// dropped. `None` when no professional is selected.
#[must_use]
pub fn collect_employee_schedule(world: &World, tab: Entity) -> Option<(String, EmployeeSchedule)> {
    let parts = world.get::<EmployeesTab>(tab)?.parts;
    let name = input_value(world, parts.selector_mount);
    if name.is_empty() {
        return None;
    }

    let lunch_rows = schedule_rows(world, parts.lunch_body);
    let standard = schedule_rows(world, parts.week_body)
        .into_iter()
        .map(|work| {
            let lunch = lunch_rows.iter().find(|lunch| lunch.day == work.day);
            DaySchedule {
                start: input_value(world, work.start_mount),
                end: input_value(world, work.end_mount),
                lunch_start: lunch.map_or_else(String::new, |l| input_value(world, l.start_mount)),
                lunch_end: lunch.map_or_else(String::new, |l| input_value(world, l.end_mount)),
                day: work.day,
            }
        })
        .collect();

    let exceptions = children_of(world, parts.exceptions_body)
        .into_iter()
        .filter_map(|row| world.get::<ExceptionRow>(row).copied())
        .map(|row| ScheduleException {
            date: input_value(world, row.date_mount),
            start: input_value(world, row.start_mount),
            end: input_value(world, row.end_mount),
            desc: world
                .get::<TextField>(row.desc)
                .map(|field| field.value.clone())
                .unwrap_or_default(),
        })
        .filter(|exception| !exception.date.is_empty())
        .collect();

    let schedule = EmployeeSchedule {
        standard,
        exceptions,
    };
    Some((name, schedule))
}

fn tab_of(
    world: &World,
    entity: Entity,
) -> Option<(Entity, EmployeesTabParts, EmployeesCallbacks)> {
    let tab = find_ancestor::<EmployeesTab>(world, entity)?;
    let parts = world.get::<EmployeesTab>(tab)?.parts;
    let callbacks = world
        .get::<EmployeesCallbacks>(tab)
        .cloned()
        .unwrap_or_default();
    Some((tab, parts, callbacks))
}

/// Consume [`EmployeesUiAction`] entries.
pub fn handle_employees_actions(world: &mut World) {
    let actions = world
        .resource::<UiEventQueue>()
        .drain_actions::<EmployeesUiAction>();

    for event in actions {
        let button = event.entity;
        let Some((tab, parts, callbacks)) = tab_of(world, button) else {
            continue;
        };

        match event.action {
            EmployeesUiAction::AddEmployee => {
                let name = world
                    .get::<TextField>(parts.new_name)
                    .map(|field| field.value.trim().to_string())
                    .unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                add_employee_row(world, parts.roster, &name);
                if let Some(mut field) = world.get_mut::<TextField>(parts.new_name) {
                    field.value.clear();
                }
            }
            EmployeesUiAction::RemoveRow => {
                let Some(row) = world.get::<ChildOf>(button).map(ChildOf::parent) else {
                    continue;
                };
                let removable = world.get::<EmployeeRow>(row).is_some()
                    || world.get::<ExceptionRow>(row).is_some();
                if removable {
                    despawn_entity_tree(world, row);
                }
            }
            EmployeesUiAction::SaveList => {
                let names = roster_names(world, tab);
                debug!(count = names.len(), "saving professional list");
                if let Some(on_save_list) = callbacks.on_save_list {
                    on_save_list(world, &names, button);
                }
            }
            EmployeesUiAction::AddException => {
                add_exception_row(world, parts.exceptions_body, &ScheduleException::default());
            }
            EmployeesUiAction::SaveSchedule => {
                let Some((name, schedule)) = collect_employee_schedule(world, tab) else {
                    continue;
                };
                debug!(%name, exceptions = schedule.exceptions.len(), "saving employee schedule");
                if let Some(on_save_schedule) = callbacks.on_save_schedule {
                    on_save_schedule(world, &name, &schedule, button);
                }
            }
        }
    }
}
