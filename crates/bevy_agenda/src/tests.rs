use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use bevy_app::App;
use bevy_ecs::{hierarchy::ChildOf, prelude::*};
use bevy_time::TimeUpdateStrategy;
use bevy_tweening::Animator;
use chrono::NaiveDate;

use crate::{
    BevyAgendaPlugin, CalendarDay, CalendarTitle, ChoiceOption, ChoiceRow, ColorField, CssVariables,
    CustomizationCallbacks, DashboardClock, DashboardStorage, EmployeeSchedule, EmployeesCallbacks,
    EmployeesTab, InputKind, MemoryStorage, OnChange, PartInputDisplay, PartInputIcon,
    PopupBackdrop, PopupOpacity, PopupOverlay, PopupState, PopupUiAction, ProfessionalSchedules,
    ScrollOffset, StyleClass, SynthesizedUiViews, TimeColumn, TimeScroller, UiEventQueue, UiLabel,
    UiRoot, click, close_popup, create_custom_input, custom_input_value, edit_text, load_theme,
    overlay_backdrops, populate_customization_tab, populate_employees_tab, refresh_color_fields,
    reset_theme_to_defaults, scroll_to, set_theme_color, trigger_of,
};
use crate::templates::{find_descendants, find_template_part};

const FRAME: Duration = Duration::from_millis(50);

fn test_app() -> App {
    let instant = NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|date| date.and_hms_opt(14, 7, 0))
        .expect("valid instant");

    let mut app = App::new();
    app.insert_resource(DashboardClock::Fixed(instant))
        .add_plugins(BevyAgendaPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.update();
    app
}

fn spawn_mount(app: &mut App) -> Entity {
    app.world_mut().spawn(UiRoot).id()
}

fn recorder() -> (Arc<Mutex<Vec<String>>>, OnChange) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let on_change = OnChange::new(move |_, value| {
        sink.lock().expect("recorder").push(value.to_string());
    });
    (seen, on_change)
}

fn recorded(seen: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    seen.lock().expect("recorder").clone()
}

fn click_and_update(app: &mut App, entity: Entity) {
    assert!(click(app.world_mut(), entity), "{entity:?} not clickable");
    app.update();
}

fn run_for(app: &mut App, duration: Duration) {
    let frames = duration.as_millis() / FRAME.as_millis() + 2;
    for _ in 0..frames {
        app.update();
    }
}

fn display_text(world: &World, trigger: Entity) -> String {
    let display = find_template_part::<PartInputDisplay>(world, trigger).expect("display part");
    let label = world.get::<UiLabel>(display).expect("display label");
    label.text.clone()
}

fn live_content(world: &World) -> Entity {
    world
        .resource::<PopupOverlay>()
        .session()
        .map(|session| session.content)
        .expect("a popup should be open")
}

fn find_by_class(world: &World, root: Entity, class_name: &str) -> Entity {
    find_descendants::<StyleClass>(world, root)
        .into_iter()
        .find(|entity| {
            world
                .get::<StyleClass>(*entity)
                .is_some_and(|classes| classes.contains(class_name))
        })
        .unwrap_or_else(|| panic!("no node with class {class_name}"))
}

fn find_by_text(world: &World, root: Entity, text: &str) -> Entity {
    find_descendants::<UiLabel>(world, root)
        .into_iter()
        .find(|entity| {
            world
                .get::<UiLabel>(*entity)
                .is_some_and(|label| label.text == text)
        })
        .unwrap_or_else(|| panic!("no node labelled {text}"))
}

fn scroller(world: &World, column: TimeColumn) -> Entity {
    find_descendants::<TimeScroller>(world, live_content(world))
        .into_iter()
        .find(|entity| {
            world
                .get::<TimeScroller>(*entity)
                .is_some_and(|s| s.column == column)
        })
        .expect("scroller")
}

fn scroll_offset(world: &World, entity: Entity) -> f32 {
    world.get::<ScrollOffset>(entity).expect("scroll offset").0
}

#[test]
fn choice_scenario_ignores_disabled_rows_and_reselect_fires_callback() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let (seen, on_change) = recorder();
    let trigger = create_custom_input(
        app.world_mut(),
        InputKind::Choice,
        mount,
        Some(vec![
            ChoiceOption::new("a", "Alpha"),
            ChoiceOption::new("b", "Beta").disabled(),
        ]),
        "a",
        Some(on_change),
    )
    .expect("trigger");
    assert_eq!(display_text(app.world(), trigger), "Alpha");

    click_and_update(&mut app, trigger);
    let content = live_content(app.world());
    let rows = find_descendants::<ChoiceRow>(app.world(), content);
    assert_eq!(rows.len(), 2);

    assert!(!click(app.world_mut(), rows[1]));
    app.update();
    assert!(app.world().resource::<PopupOverlay>().is_open());
    assert!(recorded(&seen).is_empty());

    click_and_update(&mut app, rows[0]);
    assert_eq!(recorded(&seen), ["a"]);
    assert_eq!(display_text(app.world(), trigger), "Alpha");
    assert!(!app.world().resource::<PopupOverlay>().is_open());
}

#[test]
fn time_popup_starts_at_current_time_when_value_is_empty() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let trigger = create_custom_input(app.world_mut(), InputKind::Time, mount, None, "", None)
        .expect("trigger");
    assert_eq!(display_text(app.world(), trigger), "--");

    click_and_update(&mut app, trigger);

    let world = app.world();
    let Some(PopupState::TimeScroll(time)) = world
        .resource::<PopupOverlay>()
        .session()
        .map(|session| &session.state)
    else {
        panic!("time popup should be open");
    };
    assert_eq!((time.hours.pending, time.minutes.pending), (14, 7));
    let hours = scroller(world, TimeColumn::Hours);
    let minutes = scroller(world, TimeColumn::Minutes);
    assert_eq!(scroll_offset(world, hours), 14.0 * 40.0);
    assert_eq!(scroll_offset(world, minutes), 7.0 * 40.0);
}

#[test]
fn scrolling_settles_on_nearest_item_and_ok_commits_it() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let (seen, on_change) = recorder();
    let trigger = create_custom_input(
        app.world_mut(),
        InputKind::Time,
        mount,
        None,
        "",
        Some(on_change),
    )
    .expect("trigger");
    click_and_update(&mut app, trigger);

    let minutes = scroller(app.world(), TimeColumn::Minutes);
    assert!(scroll_to(app.world_mut(), minutes, 8.0 * 40.0 + 9.0));

    let mut settled = false;
    for _ in 0..20 {
        app.update();
        let world = app.world();
        let pending = match world.resource::<PopupOverlay>().session().map(|s| &s.state) {
            Some(PopupState::TimeScroll(time)) => time.minutes.pending,
            _ => panic!("time popup should stay open"),
        };
        if pending == 8 && world.get::<Animator<ScrollOffset>>(minutes).is_none() {
            settled = true;
            break;
        }
    }
    assert!(settled, "minute column should settle on 8");
    assert!((scroll_offset(app.world(), minutes) - 320.0).abs() < 1e-3);

    let ok = find_by_text(app.world(), live_content(app.world()), "OK");
    click_and_update(&mut app, ok);

    assert_eq!(recorded(&seen), ["14:08"]);
    assert_eq!(
        custom_input_value(app.world(), mount).as_deref(),
        Some("14:08")
    );
    assert!(!app.world().resource::<PopupOverlay>().is_open());
}

#[test]
fn cancel_keeps_value_and_closed_commits_sentinel() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let (seen, on_change) = recorder();
    let trigger = create_custom_input(
        app.world_mut(),
        InputKind::Time,
        mount,
        None,
        "09:30",
        Some(on_change),
    )
    .expect("trigger");

    click_and_update(&mut app, trigger);
    let cancel = find_by_text(app.world(), live_content(app.world()), "Cancelar");
    click_and_update(&mut app, cancel);
    assert!(recorded(&seen).is_empty());
    assert_eq!(
        custom_input_value(app.world(), mount).as_deref(),
        Some("09:30")
    );
    assert!(!app.world().resource::<PopupOverlay>().is_open());

    click_and_update(&mut app, trigger);
    let closed = find_by_text(app.world(), live_content(app.world()), "Fechado");
    click_and_update(&mut app, closed);
    assert_eq!(recorded(&seen), ["FECHADO"]);
    assert_eq!(display_text(app.world(), trigger), "FECHADO");
}

#[test]
fn opening_a_second_popup_supersedes_the_first() {
    let mut app = test_app();
    let first_mount = spawn_mount(&mut app);
    let second_mount = spawn_mount(&mut app);
    let first = create_custom_input(
        app.world_mut(),
        InputKind::Choice,
        first_mount,
        Some(vec![ChoiceOption::new("a", "Alpha")]),
        "a",
        None,
    )
    .expect("first trigger");
    let second = create_custom_input(
        app.world_mut(),
        InputKind::Date,
        second_mount,
        None,
        "",
        None,
    )
    .expect("second trigger");

    click_and_update(&mut app, first);
    let first_content = live_content(app.world());

    click_and_update(&mut app, second);

    let world = app.world_mut();
    assert!(world.get_entity(first_content).is_err());
    assert_eq!(overlay_backdrops(world).len(), 1);
    let overlay = world.resource::<PopupOverlay>();
    let session = overlay.session().expect("second popup");
    assert_eq!(session.anchor, second);
    assert!(matches!(session.state, PopupState::Calendar(_)));
    assert_eq!(overlay.closing_count(), 0);
}

#[test]
fn backdrop_click_closes_after_fade_and_content_click_does_not() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let trigger = create_custom_input(app.world_mut(), InputKind::Date, mount, None, "", None)
        .expect("trigger");
    click_and_update(&mut app, trigger);

    let (backdrop, content) = {
        let session = app
            .world()
            .resource::<PopupOverlay>()
            .session()
            .expect("open popup");
        (session.backdrop, session.content)
    };
    let flag = app.world().get::<PopupBackdrop>(backdrop).expect("open");
    assert!(flag.visible);

    run_for(&mut app, Duration::from_millis(300));
    let opacity = app.world().get::<PopupOpacity>(backdrop).expect("opacity").0;
    assert!((opacity - 1.0).abs() < 1e-3);

    assert!(!click(app.world_mut(), content));
    app.update();
    assert!(app.world().resource::<PopupOverlay>().is_open());

    click_and_update(&mut app, backdrop);
    assert!(!app.world().resource::<PopupOverlay>().is_open());
    let flag = app.world().get::<PopupBackdrop>(backdrop).expect("fading");
    assert!(!flag.visible);

    run_for(&mut app, Duration::from_millis(300));
    assert!(app.world().get_entity(backdrop).is_err());
    assert!(overlay_backdrops(app.world_mut()).is_empty());
    assert_eq!(app.world().resource::<PopupOverlay>().closing_count(), 0);
}

#[test]
fn clicking_inside_the_trigger_opens_the_popup() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let trigger = create_custom_input(app.world_mut(), InputKind::Date, mount, None, "", None)
        .expect("trigger");

    let display = find_template_part::<PartInputDisplay>(app.world(), trigger).expect("display");
    click_and_update(&mut app, display);
    let overlay = app.world().resource::<PopupOverlay>();
    let anchor = overlay.session().map(|session| session.anchor);
    assert_eq!(anchor, Some(trigger));

    close_popup(app.world_mut());
    let icon = find_template_part::<PartInputIcon>(app.world(), trigger).expect("icon");
    click_and_update(&mut app, icon);
    assert!(app.world().resource::<PopupOverlay>().is_open());
}

#[test]
fn closing_with_nothing_open_is_a_no_op() {
    let mut app = test_app();

    close_popup(app.world_mut());
    app.update();

    assert!(!app.world().resource::<PopupOverlay>().is_open());
    assert_eq!(app.world().resource::<PopupOverlay>().closing_count(), 0);
    assert!(overlay_backdrops(app.world_mut()).is_empty());
}

#[test]
fn reopening_during_the_fade_keeps_the_new_popup() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let trigger = create_custom_input(app.world_mut(), InputKind::Date, mount, None, "", None)
        .expect("trigger");

    click_and_update(&mut app, trigger);
    let old_backdrop = app
        .world()
        .resource::<PopupOverlay>()
        .session()
        .map(|session| session.backdrop)
        .expect("open popup");
    click_and_update(&mut app, old_backdrop);
    click_and_update(&mut app, trigger);

    run_for(&mut app, Duration::from_millis(400));

    let world = app.world_mut();
    assert!(world.get_entity(old_backdrop).is_err());
    let backdrops = overlay_backdrops(world);
    let overlay = world.resource::<PopupOverlay>();
    let session = overlay.session().expect("reopened popup");
    assert_eq!(backdrops, [session.backdrop]);
    let flag = world.get::<PopupBackdrop>(session.backdrop);
    assert!(flag.is_some_and(|flag| flag.visible));
    assert_eq!(overlay.closing_count(), 0);
}

#[test]
fn actions_from_a_closing_popup_are_dropped() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let (seen, on_change) = recorder();
    let trigger = create_custom_input(
        app.world_mut(),
        InputKind::Choice,
        mount,
        Some(vec![
            ChoiceOption::new("a", "Alpha"),
            ChoiceOption::new("b", "Beta"),
        ]),
        "a",
        Some(on_change),
    )
    .expect("trigger");

    click_and_update(&mut app, trigger);
    let content = live_content(app.world());
    let beta = find_descendants::<ChoiceRow>(app.world(), content)[1];
    let backdrop = app
        .world()
        .resource::<PopupOverlay>()
        .session()
        .map(|session| session.backdrop)
        .expect("open popup");
    click_and_update(&mut app, backdrop);

    assert!(app.world().get_entity(beta).is_ok());
    click_and_update(&mut app, beta);

    assert!(recorded(&seen).is_empty());
    assert_eq!(custom_input_value(app.world(), mount).as_deref(), Some("a"));
    assert!(!app.world().resource::<PopupOverlay>().is_open());
}

#[test]
fn actions_from_outside_the_live_popup_are_dropped() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let (seen, on_change) = recorder();
    let trigger = create_custom_input(
        app.world_mut(),
        InputKind::Time,
        mount,
        None,
        "09:30",
        Some(on_change),
    )
    .expect("trigger");
    click_and_update(&mut app, trigger);

    let stray = PopupUiAction::SelectOption {
        value: "10:00".to_string(),
        label: "10:00".to_string(),
    };
    let queue = app.world().resource::<UiEventQueue>();
    queue.push_typed(mount, stray);
    app.update();

    assert!(recorded(&seen).is_empty());
    assert_eq!(
        custom_input_value(app.world(), mount).as_deref(),
        Some("09:30")
    );
    assert!(app.world().resource::<PopupOverlay>().is_open());
}

#[test]
fn options_sharing_a_value_show_the_picked_label() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let (seen, on_change) = recorder();
    let trigger = create_custom_input(
        app.world_mut(),
        InputKind::Choice,
        mount,
        Some(vec![ChoiceOption::new("x", "One"), ChoiceOption::new("x", "Two")]),
        "x",
        Some(on_change),
    )
    .expect("trigger");
    assert_eq!(display_text(app.world(), trigger), "One");

    click_and_update(&mut app, trigger);
    let content = live_content(app.world());
    let classes = app.world().get::<StyleClass>(content).expect("classes");
    assert!(!classes.contains("custom-select-options"));
    let lists: Vec<_> = find_descendants::<StyleClass>(app.world(), content)
        .into_iter()
        .filter(|entity| {
            app.world()
                .get::<StyleClass>(*entity)
                .is_some_and(|classes| classes.contains("custom-select-options"))
        })
        .collect();
    assert_eq!(lists.len(), 1);

    let two = find_by_text(app.world(), content, "Two");
    click_and_update(&mut app, two);

    assert_eq!(recorded(&seen), ["x"]);
    assert_eq!(display_text(app.world(), trigger), "Two");
}

#[test]
fn calendar_navigates_months_and_commits_iso_date() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let (seen, on_change) = recorder();
    let trigger = create_custom_input(
        app.world_mut(),
        InputKind::Date,
        mount,
        None,
        "2023-12-10",
        Some(on_change),
    )
    .expect("trigger");
    click_and_update(&mut app, trigger);

    let title = |world: &World| {
        let title = find_descendants::<CalendarTitle>(world, live_content(world))[0];
        world.get::<UiLabel>(title).expect("title").text.clone()
    };
    assert_eq!(title(app.world()), "Dezembro 2023");

    let next = find_by_class(app.world(), live_content(app.world()), "next-month-btn");
    click_and_update(&mut app, next);
    assert_eq!(title(app.world()), "Janeiro 2024");
    assert!(app.world().get_entity(next).is_err());

    for _ in 0..2 {
        let prev = find_by_class(app.world(), live_content(app.world()), "prev-month-btn");
        click_and_update(&mut app, prev);
    }
    assert_eq!(title(app.world()), "Novembro 2023");
    assert!(recorded(&seen).is_empty());

    let blank = find_by_class(app.world(), live_content(app.world()), "other-month");
    assert!(!click(app.world_mut(), blank));

    let target = NaiveDate::from_ymd_opt(2023, 11, 5).expect("valid date");
    let day = find_descendants::<CalendarDay>(app.world(), live_content(app.world()))
        .into_iter()
        .find(|entity| {
            app.world()
                .get::<CalendarDay>(*entity)
                .is_some_and(|d| d.date == target)
        })
        .expect("day cell");
    click_and_update(&mut app, day);

    assert_eq!(recorded(&seen), ["2023-11-05"]);
    assert_eq!(display_text(app.world(), trigger), "2023-11-05");
    assert!(!app.world().resource::<PopupOverlay>().is_open());
}

#[test]
fn invalid_date_opens_on_current_month() {
    let mut app = test_app();
    let mount = spawn_mount(&mut app);
    let trigger = create_custom_input(
        app.world_mut(),
        InputKind::Date,
        mount,
        None,
        "not-a-date",
        None,
    )
    .expect("trigger");
    assert_eq!(display_text(app.world(), trigger), "2024-03-09");

    click_and_update(&mut app, trigger);
    let today = find_by_class(app.world(), live_content(app.world()), "today");
    let classes = app.world().get::<StyleClass>(today).expect("classes");
    assert!(classes.contains("selected"));
    assert_eq!(app.world().get::<UiLabel>(today).expect("label").text, "9");
}

#[test]
fn employees_tab_edits_roster_and_saves_schedule() {
    let mut app = test_app();
    let container = spawn_mount(&mut app);
    let saved_lists = Arc::new(Mutex::new(Vec::<Vec<String>>::new()));
    let saved_schedules = Arc::new(Mutex::new(Vec::<(String, EmployeeSchedule)>::new()));
    let lists = saved_lists.clone();
    let schedules = saved_schedules.clone();

    assert!(populate_employees_tab(
        app.world_mut(),
        container,
        &["Ana".to_string(), "Bruno".to_string()],
        ProfessionalSchedules::new(),
        EmployeesCallbacks {
            on_save_list: Some(Arc::new(move |_, names, _| {
                lists.lock().expect("lists").push(names.to_vec());
            })),
            on_save_schedule: Some(Arc::new(move |_, name, schedule, _| {
                schedules
                    .lock()
                    .expect("schedules")
                    .push((name.to_string(), schedule.clone()));
            })),
        },
    ));
    app.update();
    let tab = app.world().get::<EmployeesTab>(container).expect("tab");
    let parts = tab.parts;

    let save_schedule = parts.save_schedule_button;
    assert!(!click(app.world_mut(), save_schedule));

    assert!(edit_text(app.world_mut(), parts.new_name, "  Carla  "));
    let add = find_by_text(app.world(), container, "Adicionar");
    click_and_update(&mut app, add);
    let remove_bruno = {
        let world = app.world();
        let bruno = find_by_text(world, parts.roster, "Bruno");
        let row = world.get::<ChildOf>(bruno).expect("row").parent();
        find_by_class(world, row, "remove-row-button")
    };
    click_and_update(&mut app, remove_bruno);
    let save_list = find_by_text(app.world(), container, "Salvar Lista de Profissionais");
    click_and_update(&mut app, save_list);
    assert_eq!(
        *saved_lists.lock().expect("lists"),
        [vec!["Ana".to_string(), "Carla".to_string()]]
    );

    let selector = trigger_of(app.world(), parts.selector_mount).expect("selector");
    click_and_update(&mut app, selector);
    let ana = find_by_text(app.world(), live_content(app.world()), "Ana");
    click_and_update(&mut app, ana);
    assert!(!app.world().resource::<PopupOverlay>().is_open());

    let add_exception = find_by_text(app.world(), container, "Adicionar Exceção");
    click_and_update(&mut app, add_exception);
    click_and_update(&mut app, save_schedule);

    let saved = saved_schedules.lock().expect("schedules");
    assert_eq!(saved.len(), 1);
    let (name, schedule) = &saved[0];
    assert_eq!(name, "Ana");
    assert_eq!(schedule.standard.len(), 7);
    assert_eq!(schedule.standard[0].day, "Domingo");
    assert_eq!(schedule.exceptions.len(), 1);
    assert_eq!(schedule.exceptions[0].date, "2024-03-09");
    assert_eq!(schedule.exceptions[0].start, "");
}

#[test]
fn customization_reset_callback_restores_defaults() {
    let storage = MemoryStorage::default();
    let mut app = App::new();
    app.insert_resource(DashboardStorage::new(storage.clone()))
        .add_plugins(BevyAgendaPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.update();

    let container = spawn_mount(&mut app);
    assert!(populate_customization_tab(
        app.world_mut(),
        container,
        CustomizationCallbacks {
            on_reset_theme: Some(Arc::new(move |world, _| {
                reset_theme_to_defaults(world);
                refresh_color_fields(world, container);
            })),
            ..Default::default()
        },
    ));

    let primary = find_descendants::<ColorField>(app.world(), container)[0];
    assert!(set_theme_color(app.world_mut(), primary, "#000000"));
    let stored = load_theme(&DashboardStorage::new(storage.clone()), "dashboard-theme");
    assert_eq!(stored.get("--color-primary"), Some("#000000"));

    let reset = find_by_text(app.world(), container, "Resetar Cores");
    click_and_update(&mut app, reset);

    let css = app.world().resource::<CssVariables>();
    assert_eq!(css.get("--color-primary"), Some("#6366f1"));
    let field = app.world().get::<ColorField>(primary).expect("field");
    assert_eq!(field.value, "#6366f1");
    let stored = load_theme(&DashboardStorage::new(storage), "dashboard-theme");
    assert_eq!(stored.get("--color-primary"), Some("#6366f1"));
}

#[test]
fn startup_applies_stored_theme_and_snapshots_roots() {
    let storage = MemoryStorage::default();
    let stored = r##"{"--color-info":"#010203","--unknown":"#ffffff"}"##;
    DashboardStorage::new(storage.clone()).write("dashboard-theme", stored);

    let mut app = App::new();
    app.insert_resource(DashboardStorage::new(storage))
        .add_plugins(BevyAgendaPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.update();

    let css = app.world().resource::<CssVariables>();
    assert_eq!(css.get("--color-info"), Some("#010203"));
    assert_eq!(css.get("--unknown"), None);
    assert_eq!(css.get("--color-primary"), Some("#6366f1"));

    // The overlay root is itself a UiRoot.
    assert_eq!(app.world().resource::<SynthesizedUiViews>().roots.len(), 1);
}
