use std::{fmt, sync::Arc};

use bevy_ecs::{entity::Entity, hierarchy::ChildOf, prelude::*};
use tracing::{debug, trace};

use crate::{
    clock::DashboardClock,
    controls::{
        CLOSED_SENTINEL, CalendarSession, ChoiceListSession, PopupState, TimeScrollSession,
        format_hh_mm, format_iso_date, parse_hh_mm, parse_iso_date,
    },
    ecs::{ClickAction, StyleClass, UiLabel},
    events::UiEventQueue,
    locale::PLACEHOLDER_LABEL,
    overlay::open_popup,
    templates::{despawn_children, ensure_template_part, find_template_part, spawn_child},
};

/// Which popup a custom input opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Choice,
    Date,
    Time,
}

impl InputKind {
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Choice => "▾",
            Self::Date => "📅",
            Self::Time => "🕒",
        }
    }
}

/// Single choice entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub disabled: bool,
}

impl ChoiceOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Typed state of one custom input trigger.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct CustomInput {
    pub kind: InputKind,
    value: String,
    committed_label: Option<String>,
    pub options: Vec<ChoiceOption>,
    disabled: bool,
}

impl CustomInput {
    #[must_use]
    pub fn new(kind: InputKind, value: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        Self {
            kind,
            value: value.into(),
            committed_label: None,
            options,
            disabled: false,
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.committed_label = None;
    }

    /// Store a picked choice together with the label the user saw.
    pub fn set_choice(&mut self, value: impl Into<String>, label: impl Into<String>) {
        self.value = value.into();
        self.committed_label = Some(label.into());
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Text shown on the trigger.
    ///
    /// Choices show the label picked from the list, else the matching option's
    /// label, falling back to the first option; other kinds show the raw value.
    /// Empty results show `--`.
    #[must_use]
    pub fn display_label(&self) -> String {
        let label = match (self.kind, &self.committed_label) {
            (InputKind::Choice, Some(label)) => label.as_str(),
            (InputKind::Choice, None) => self
                .options
                .iter()
                .find(|option| option.value == self.value)
                .or_else(|| self.options.first())
                .map_or("", |option| option.label.as_str()),
            (InputKind::Date | InputKind::Time, _) => self.value.as_str(),
        };
        if label.is_empty() {
            PLACEHOLDER_LABEL.to_string()
        } else {
            label.to_string()
        }
    }
}

/// Caller-supplied change callback, invoked with the committed value.
#[derive(Component, Clone)]
pub struct OnChange(Arc<dyn Fn(&mut World, &str) + Send + Sync>);

impl OnChange {
    #[must_use]
    pub fn new(callback: impl Fn(&mut World, &str) + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    pub fn call(&self, world: &mut World, value: &str) {
        (self.0)(world, value);
    }
}

impl fmt::Debug for OnChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OnChange").finish_non_exhaustive()
    }
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartInputDisplay;

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartInputIcon;

/// Emitted when a custom input commits a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomInputChanged {
    pub input: Entity,
    pub mount: Entity,
    pub value: String,
}

/// Actions emitted by custom input triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputUiAction {
    Activate,
}

/// Value stored for `initial`: dates and times that do not parse fall back to
/// now. Empty times and the closed sentinel are kept as-is.
#[must_use]
pub fn normalize_initial_value(kind: InputKind, initial: &str, clock: &DashboardClock) -> String {
    match kind {
        InputKind::Choice => initial.to_string(),
        InputKind::Date => match parse_iso_date(initial) {
            Some(_) => initial.to_string(),
            None => format_iso_date(clock.today()),
        },
        InputKind::Time => {
            if initial.is_empty() || initial == CLOSED_SENTINEL {
                return initial.to_string();
            }
            let (hour, minute) = parse_hh_mm(initial).unwrap_or_else(|| clock.hour_minute());
            format_hh_mm(hour, minute)
        }
    }
}

fn refresh_trigger(world: &mut World, input: Entity) {
    let Some(state) = world.get::<CustomInput>(input) else {
        return;
    };
    let label = state.display_label();
    let icon = state.kind.icon();
    let disabled = state.is_disabled();

    let display = ensure_template_part::<PartInputDisplay, _>(world, input, || {
        (UiLabel::new(""), StyleClass::new(["truncate"]))
    });
    let icon_part = ensure_template_part::<PartInputIcon, _>(world, input, || {
        (UiLabel::new(""), StyleClass::new(["custom-input-icon"]))
    });

    if let Some(mut text) = world.get_mut::<UiLabel>(display) {
        text.text = label;
    }
    if let Some(mut text) = world.get_mut::<UiLabel>(icon_part) {
        text.text = icon.to_string();
    }
    if let Some(mut classes) = world.get_mut::<StyleClass>(input) {
        if disabled {
            classes.insert("disabled");
        } else {
            classes.remove("disabled");
        }
    }
}

/// Render a custom input into `mount`, replacing everything under it.
///
/// Returns the trigger entity, or `None` when `mount` does not exist.
pub fn create_custom_input(
    world: &mut World,
    kind: InputKind,
    mount: Entity,
    options: Option<Vec<ChoiceOption>>,
    initial_value: &str,
    on_change: Option<OnChange>,
) -> Option<Entity> {
    if world.get_entity(mount).is_err() {
        debug!(?mount, "custom input mount point is missing");
        return None;
    }
    despawn_children(world, mount);

    let value = normalize_initial_value(kind, initial_value, world.resource::<DashboardClock>());
    let options = match kind {
        InputKind::Choice => options.unwrap_or_default(),
        InputKind::Date | InputKind::Time => Vec::new(),
    };

    let trigger = spawn_child(
        world,
        mount,
        (
            CustomInput::new(kind, value, options),
            StyleClass::new(["custom-input"]),
            ClickAction::new(InputUiAction::Activate),
        ),
    );
    if let Some(on_change) = on_change {
        world.entity_mut(trigger).insert(on_change);
    }
    refresh_trigger(world, trigger);

    trace!(?mount, ?trigger, ?kind, "created custom input");
    Some(trigger)
}

/// Trigger entity rendered into `mount`.
#[must_use]
pub fn trigger_of(world: &World, mount: Entity) -> Option<Entity> {
    find_template_part::<CustomInput>(world, mount)
}

/// Committed value of the custom input rendered into `mount`.
#[must_use]
pub fn custom_input_value(world: &World, mount: Entity) -> Option<String> {
    let trigger = trigger_of(world, mount)?;
    world
        .get::<CustomInput>(trigger)
        .map(|input| input.value().to_string())
}

/// Enable or disable a trigger. Disabled triggers ignore activation.
pub fn set_input_disabled(world: &mut World, input: Entity, disabled: bool) {
    if let Some(mut state) = world.get_mut::<CustomInput>(input) {
        state.set_disabled(disabled);
    }
    refresh_trigger(world, input);
}

/// Store `value` on `input`, refresh its label, then notify listeners.
///
/// Returns `false` when `input` is not a custom input.
pub fn commit_selection(world: &mut World, input: Entity, value: &str) -> bool {
    commit(world, input, value, None)
}

/// [`commit_selection`] for a picked choice row. The trigger shows `label`
/// as-is, even when several options share `value`.
pub fn commit_choice(world: &mut World, input: Entity, value: &str, label: &str) -> bool {
    commit(world, input, value, Some(label))
}

fn commit(world: &mut World, input: Entity, value: &str, label: Option<&str>) -> bool {
    let Some(mut state) = world.get_mut::<CustomInput>(input) else {
        return false;
    };
    match label {
        Some(label) => state.set_choice(value, label),
        None => state.set_value(value),
    }
    refresh_trigger(world, input);

    let mount = world.get::<ChildOf>(input).map_or(input, ChildOf::parent);
    world.resource::<UiEventQueue>().push_typed(
        input,
        CustomInputChanged {
            input,
            mount,
            value: value.to_string(),
        },
    );
    debug!(?input, value, "custom input committed");

    if let Some(on_change) = world.get::<OnChange>(input).cloned() {
        on_change.call(world, value);
    }
    true
}

/// Open the popup for `input`. Disabled inputs and choices without options
/// do not open; returns whether a popup was opened.
pub fn activate_input(world: &mut World, input: Entity) -> bool {
    let Some(state) = world.get::<CustomInput>(input).cloned() else {
        return false;
    };
    if state.is_disabled() {
        trace!(?input, "activation ignored on disabled input");
        return false;
    }

    let clock = *world.resource::<DashboardClock>();
    let popup = match state.kind {
        InputKind::Choice => {
            if state.options.is_empty() {
                trace!(?input, "choice input has no options");
                return false;
            }
            let selected = state.value().to_string();
            PopupState::Choice(ChoiceListSession::new(state.options, selected))
        }
        InputKind::Date => PopupState::Calendar(CalendarSession::new(state.value(), clock.today())),
        InputKind::Time => {
            PopupState::TimeScroll(TimeScrollSession::new(state.value(), clock.hour_minute()))
        }
    };

    open_popup(world, input, popup);
    true
}

/// Consume [`InputUiAction`] entries.
pub fn handle_input_actions(world: &mut World) {
    let actions = world
        .resource::<UiEventQueue>()
        .drain_actions::<InputUiAction>();

    for event in actions {
        match event.action {
            InputUiAction::Activate => {
                activate_input(world, event.entity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDate;

    use super::*;
    use crate::{config::DashboardConfig, overlay::PopupOverlay};

    fn test_world() -> World {
        let mut world = World::new();
        let instant = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|date| date.and_hms_opt(14, 7, 0))
            .expect("valid instant");
        world.insert_resource(DashboardClock::Fixed(instant));
        world.insert_resource(DashboardConfig::default());
        world.init_resource::<UiEventQueue>();
        world.init_resource::<PopupOverlay>();
        world
    }

    fn display_text(world: &World, trigger: Entity) -> String {
        let display = find_template_part::<PartInputDisplay>(world, trigger).expect("display part");
        world.get::<UiLabel>(display).expect("label").text.clone()
    }

    #[test]
    fn initial_values_fall_back_to_now() {
        let clock = DashboardClock::Fixed(
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .and_then(|date| date.and_hms_opt(9, 5, 0))
                .expect("valid instant"),
        );

        let normalize = |kind: InputKind, value: &str| normalize_initial_value(kind, value, &clock);

        assert_eq!(normalize(InputKind::Date, "2023-01-31"), "2023-01-31");
        assert_eq!(normalize(InputKind::Date, "31/01/2023"), "2024-03-09");
        assert_eq!(normalize(InputKind::Date, ""), "2024-03-09");
        assert_eq!(normalize(InputKind::Time, "8:30"), "08:30");
        assert_eq!(normalize(InputKind::Time, "noon"), "09:05");
        assert_eq!(normalize(InputKind::Time, ""), "");
        assert_eq!(normalize(InputKind::Time, CLOSED_SENTINEL), "FECHADO");
    }

    #[test]
    fn choice_label_resolves_from_options() {
        let options = vec![
            ChoiceOption::new("a", "Alpha"),
            ChoiceOption::new("b", "Beta"),
        ];
        let label = |kind: InputKind, value: &str, options: Vec<ChoiceOption>| {
            CustomInput::new(kind, value, options).display_label()
        };

        assert_eq!(label(InputKind::Choice, "b", options.clone()), "Beta");
        assert_eq!(label(InputKind::Choice, "zz", options), "Alpha");
        assert_eq!(label(InputKind::Choice, "a", Vec::new()), "--");
        assert_eq!(label(InputKind::Time, "", Vec::new()), "--");
    }

    #[test]
    fn picked_label_wins_when_options_share_a_value() {
        let options = vec![ChoiceOption::new("x", "One"), ChoiceOption::new("x", "Two")];
        let mut input = CustomInput::new(InputKind::Choice, "x", options);
        assert_eq!(input.display_label(), "One");

        input.set_choice("x", "Two");
        assert_eq!(input.display_label(), "Two");

        input.set_value("x");
        assert_eq!(input.display_label(), "One");
    }

    #[test]
    fn create_replaces_mount_contents_and_skips_missing_mount() {
        let mut world = test_world();
        let mount = world.spawn_empty().id();
        let stale = spawn_child(&mut world, mount, UiLabel::new("old"));

        let trigger = create_custom_input(
            &mut world,
            InputKind::Date,
            mount,
            None,
            "2024-01-02",
            None,
        )
        .expect("trigger");

        assert!(world.get_entity(stale).is_err());
        assert_eq!(trigger_of(&world, mount), Some(trigger));
        assert_eq!(display_text(&world, trigger), "2024-01-02");
        let icon = find_template_part::<PartInputIcon>(&world, trigger).expect("icon part");
        assert_eq!(world.get::<UiLabel>(icon).expect("icon").text, "📅");

        assert!(world.despawn(mount));
        let missing = create_custom_input(&mut world, InputKind::Date, mount, None, "", None);
        assert!(missing.is_none());
    }

    #[test]
    fn commit_updates_label_and_calls_on_change() {
        let mut world = test_world();
        let mount = world.spawn_empty().id();
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = seen.clone();
        let trigger = create_custom_input(
            &mut world,
            InputKind::Time,
            mount,
            None,
            "",
            Some(OnChange::new(move |_, value| {
                sink.lock().expect("sink").push(value.to_string());
            })),
        )
        .expect("trigger");

        assert!(commit_selection(&mut world, trigger, "07:45"));

        assert_eq!(display_text(&world, trigger), "07:45");
        assert_eq!(custom_input_value(&world, mount).as_deref(), Some("07:45"));
        assert_eq!(*seen.lock().expect("sink"), ["07:45"]);
        let changed = world
            .resource::<UiEventQueue>()
            .drain_actions::<CustomInputChanged>();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].action.mount, mount);
    }

    #[test]
    fn disabled_or_empty_choice_does_not_open() {
        let mut world = test_world();
        let mount = world.spawn_empty().id();
        let empty = create_custom_input(
            &mut world,
            InputKind::Choice,
            mount,
            Some(Vec::new()),
            "",
            None,
        )
        .expect("trigger");
        assert!(!activate_input(&mut world, empty));

        let other_mount = world.spawn_empty().id();
        let time = create_custom_input(
            &mut world,
            InputKind::Time,
            other_mount,
            None,
            "10:00",
            None,
        )
        .expect("trigger");
        set_input_disabled(&mut world, time, true);
        assert!(!activate_input(&mut world, time));
        let classes = world.get::<StyleClass>(time).expect("classes");
        assert!(classes.contains("disabled"));

        set_input_disabled(&mut world, time, false);
        assert!(activate_input(&mut world, time));
        assert!(world.resource::<PopupOverlay>().is_open());
    }
}
