use std::{collections::BTreeMap, sync::Arc, time::Duration};

use bevy_agenda::{
    BevyAgendaPlugin, ChoiceOption, ChoiceRow, CustomizationCallbacks, DashboardConfig,
    DashboardStorage, EmployeeSchedule, EmployeesCallbacks, EmployeesTab, FileStorage, InputKind,
    OnChange, PopupOverlay, SynthesizedUiViews, UiRoot, UiSynthesisStats, ViewNode,
    bevy_app::App, bevy_time::TimeUpdateStrategy, click, create_custom_input, custom_input_value,
    edit_text, format_currency, init_logging, populate_customization_tab, populate_employees_tab,
    refresh_color_fields, reset_theme_to_defaults, templates::find_descendants, trigger_of,
};
use bevy_ecs::prelude::*;
use tracing::{info, warn};

const CONFIG_PATH: &str = "dashboard.ron";

fn load_config() -> DashboardConfig {
    match DashboardConfig::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(error) => {
            warn!(%error, "using default dashboard config");
            DashboardConfig::default()
        }
    }
}

fn build_app() -> App {
    let storage_dir = std::env::temp_dir().join("bevy_agenda_demo");
    let mut app = App::new();
    app.insert_resource(load_config())
        .insert_resource(DashboardStorage::new(FileStorage::new(storage_dir)))
        .add_plugins(BevyAgendaPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
    app.update();
    app
}

fn spawn_tabs(app: &mut App) -> (Entity, Entity) {
    let world = app.world_mut();
    let employees = world.spawn(UiRoot).id();
    let customization = world.spawn(UiRoot).id();

    let mut schedules = BTreeMap::new();
    schedules.insert("Ana".to_string(), EmployeeSchedule::default());

    populate_employees_tab(
        world,
        employees,
        &["Ana".to_string(), "Bruno".to_string()],
        schedules,
        EmployeesCallbacks {
            on_save_list: Some(Arc::new(|_, names, _| {
                info!(?names, "professional list saved");
            })),
            on_save_schedule: Some(Arc::new(|_, name, schedule, _| {
                info!(
                    %name,
                    days = schedule.standard.len(),
                    exceptions = schedule.exceptions.len(),
                    "schedule saved"
                );
            })),
        },
    );

    populate_customization_tab(
        world,
        customization,
        CustomizationCallbacks {
            on_save_theme: Some(Arc::new(|_, _| info!("theme upload requested"))),
            on_reset_theme: Some(Arc::new(move |world, _| {
                reset_theme_to_defaults(world);
                refresh_color_fields(world, customization);
            })),
            on_color_change: Some(Arc::new(|_| info!("chart colors changed"))),
        },
    );

    (employees, customization)
}

fn find_labelled(app: &App, root: Entity, text: &str) -> Option<Entity> {
    let views = app.world().resource::<SynthesizedUiViews>();
    views
        .roots
        .iter()
        .find(|node| node.entity == Some(root))
        .and_then(|node| {
            node.find(&|node: &ViewNode| node.clickable && node.text.as_deref() == Some(text))
        })
        .and_then(|node| node.entity)
}

fn find_option_row(app: &App, value: &str) -> Option<Entity> {
    let world = app.world();
    let session = world.resource::<PopupOverlay>().session()?;
    find_descendants::<ChoiceRow>(world, session.content)
        .into_iter()
        .find(|row| {
            world
                .get::<ChoiceRow>(*row)
                .is_some_and(|row| row.value == value)
        })
}

fn press(app: &mut App, root: Entity, text: &str) {
    match find_labelled(app, root, text) {
        Some(entity) => {
            click(app.world_mut(), entity);
            app.update();
        }
        None => warn!(text, "no clickable node with that label"),
    }
}

fn main() {
    init_logging();

    let mut app = build_app();
    let (employees, _customization) = spawn_tabs(&mut app);
    app.update();

    let Some(tab) = app.world().get::<EmployeesTab>(employees) else {
        return;
    };
    let parts = tab.parts;
    edit_text(app.world_mut(), parts.new_name, "Carla");
    press(&mut app, employees, "Adicionar");
    press(&mut app, employees, "Salvar Lista de Profissionais");

    if let Some(selector) = trigger_of(app.world(), parts.selector_mount) {
        click(app.world_mut(), selector);
        app.update();
        if let Some(row) = find_option_row(&app, "Ana") {
            click(app.world_mut(), row);
            app.update();
        }
    }
    press(&mut app, employees, "Salvar Horários");

    let payment = app.world_mut().spawn(UiRoot).id();
    create_custom_input(
        app.world_mut(),
        InputKind::Choice,
        payment,
        Some(vec![
            ChoiceOption::new("pix", "Pix"),
            ChoiceOption::new("card", "Cartão"),
            ChoiceOption::new("cash", "Dinheiro").disabled(),
        ]),
        "card",
        Some(OnChange::new(|_, value| info!(value, "payment method changed"))),
    );
    app.update();

    info!(
        payment = custom_input_value(app.world(), payment).as_deref().unwrap_or_default(),
        total = %format_currency(1234.5),
        nodes = app.world().resource::<UiSynthesisStats>().node_count,
        "demo finished"
    );
}
