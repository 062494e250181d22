use bevy_app::{App, Last, Plugin, PostUpdate, PreUpdate, Startup, Update};
use bevy_ecs::{prelude::*, schedule::IntoScheduleConfigs};
use bevy_time::TimePlugin;
use bevy_tweening::AppTweeningExt;
use tracing::trace;

use crate::{
    clock::DashboardClock,
    config::DashboardConfig,
    controls::{
        handle_input_actions, handle_popup_actions, handle_time_scroll_events,
        tick_time_scroll_session,
    },
    ecs::ScrollOffset,
    events::UiEventQueue,
    overlay::{
        PopupOpacity, PopupOverlay, ensure_overlay_root, handle_overlay_actions, tick_popup_overlay,
    },
    storage::DashboardStorage,
    synthesize::{SynthesizedUiViews, UiSynthesisStats, synthesize_ui},
    theme::{CssVariables, default_theme, initialize_theme},
    views::{handle_customization_actions, handle_employees_actions},
};

/// Headless dashboard UI plugin.
///
/// Owns the composition root: the event queue, the popup overlay, config,
/// clock, local storage and the live CSS variables. Resources inserted before
/// the plugin is added (e.g. a [`DashboardConfig`] loaded from disk, a fixed
/// [`DashboardClock`], a file-backed [`DashboardStorage`]) are kept.
#[derive(Default)]
pub struct BevyAgendaPlugin;

impl Plugin for BevyAgendaPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<CssVariables>() {
            app.insert_resource(CssVariables::from_theme(&default_theme()));
        }

        app.add_plugins(TimePlugin)
            .init_resource::<UiEventQueue>()
            .init_resource::<PopupOverlay>()
            .init_resource::<DashboardConfig>()
            .init_resource::<DashboardClock>()
            .init_resource::<DashboardStorage>()
            .init_resource::<SynthesizedUiViews>()
            .init_resource::<UiSynthesisStats>()
            .add_animator::<PopupOpacity>()
            .add_animator::<ScrollOffset>()
            .add_systems(Startup, (ensure_overlay_root, initialize_theme).chain())
            .add_systems(
                PreUpdate,
                (
                    handle_input_actions,
                    handle_popup_actions,
                    handle_overlay_actions,
                    handle_time_scroll_events,
                    handle_customization_actions,
                    handle_employees_actions,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (tick_time_scroll_session, tick_popup_overlay).chain(),
            )
            .add_systems(PostUpdate, synthesize_ui)
            .add_systems(Last, discard_unhandled_ui_events);
    }
}

/// Drop queue entries nobody consumed this frame, such as
/// [`CustomInputChanged`](crate::controls::CustomInputChanged) notifications
/// an application chose not to read.
pub fn discard_unhandled_ui_events(world: &mut World) {
    let leftover = world.resource::<UiEventQueue>().drain_all();
    if !leftover.is_empty() {
        trace!(count = leftover.len(), "discarded unhandled ui events");
    }
}
