//! Custom input widgets and the popup content they open.
//!
//! [`create_custom_input`] builds the trigger; activating it opens one of three
//! renderers through the [`PopupOverlay`](crate::overlay::PopupOverlay). Each
//! renderer keeps its view state in a [`PopupState`] session, which lives exactly
//! as long as the popup does.
use bevy_ecs::prelude::*;
use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::{
    clock::DashboardClock,
    events::UiEventQueue,
    overlay::{PopupOverlay, PopupSession, close_popup, rerender_popup},
    templates::is_within,
};

mod calendar;
mod choice_list;
mod custom_input;
mod time_scroll;

pub use calendar::*;
pub use choice_list::*;
pub use custom_input::*;
pub use time_scroll::*;

/// View state of the content currently shown in the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupState {
    Choice(ChoiceListSession),
    Calendar(CalendarSession),
    TimeScroll(TimeScrollSession),
}

impl PopupState {
    /// Extra style class of the popup content node. Choice lists style their
    /// inner list instead.
    #[must_use]
    pub fn content_class(&self) -> Option<&'static str> {
        match self {
            Self::Choice(_) => None,
            Self::Calendar(_) => Some("custom-datepicker-container"),
            Self::TimeScroll(_) => Some("custom-timepicker-container"),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Choice(_) => "choice",
            Self::Calendar(_) => "calendar",
            Self::TimeScroll(_) => "time",
        }
    }
}

/// Actions emitted by nodes inside popup content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupUiAction {
    SelectOption { value: String, label: String },
    PrevMonth,
    NextMonth,
    SelectDay { date: NaiveDate },
    ConfirmTime,
    MarkClosed,
    CancelTime,
}

/// Build the content subtree for `session` under `session.content`.
pub fn render_popup(world: &mut World, session: &mut PopupSession) {
    let content = session.content;
    match &mut session.state {
        PopupState::Choice(choice) => render_choice_list(world, content, choice),
        PopupState::Calendar(calendar) => {
            let today = world.resource::<DashboardClock>().today();
            render_calendar(world, content, calendar, today);
        }
        PopupState::TimeScroll(time) => render_time_scroll(world, content, time),
    }
}

/// Commit `value` to the popup's trigger, then close the popup unless the
/// change callback already replaced it.
fn commit_and_close(
    world: &mut World,
    (anchor, backdrop): (Entity, Entity),
    value: &str,
    label: Option<&str>,
) {
    match label {
        Some(label) => commit_choice(world, anchor, value, label),
        None => commit_selection(world, anchor, value),
    };

    let still_live = world
        .resource::<PopupOverlay>()
        .session()
        .is_some_and(|session| session.backdrop == backdrop);
    if still_live {
        close_popup(world);
    }
}

fn navigate_calendar(world: &mut World, forward: bool) {
    let navigated = {
        let mut overlay = world.resource_mut::<PopupOverlay>();
        match overlay.session_mut().map(|session| &mut session.state) {
            Some(PopupState::Calendar(calendar)) => {
                if forward {
                    calendar.next_month();
                } else {
                    calendar.prev_month();
                }
                true
            }
            _ => false,
        }
    };
    if navigated {
        rerender_popup(world);
    }
}

/// Consume [`PopupUiAction`] entries coming from the live popup.
///
/// Actions from nodes that are gone, or that belong to a superseded or closing
/// popup, are dropped.
pub fn handle_popup_actions(world: &mut World) {
    let actions = world
        .resource::<UiEventQueue>()
        .drain_actions::<PopupUiAction>();

    for event in actions {
        if world.get_entity(event.entity).is_err() {
            trace!(entity = ?event.entity, "dropping action from despawned popup node");
            continue;
        }
        let Some((anchor, backdrop, content)) = world
            .resource::<PopupOverlay>()
            .session()
            .map(|session| (session.anchor, session.backdrop, session.content))
        else {
            continue;
        };
        if !is_within(world, event.entity, content) {
            trace!(entity = ?event.entity, "dropping action from stale popup");
            continue;
        }

        match event.action {
            PopupUiAction::SelectOption { value, label } => {
                debug!(?anchor, %value, %label, "option selected");
                commit_and_close(world, (anchor, backdrop), &value, Some(&label));
            }
            PopupUiAction::PrevMonth => navigate_calendar(world, false),
            PopupUiAction::NextMonth => navigate_calendar(world, true),
            PopupUiAction::SelectDay { date } => {
                let value = format_iso_date(date);
                commit_and_close(world, (anchor, backdrop), &value, None);
            }
            PopupUiAction::ConfirmTime => {
                let pending = match world
                    .resource::<PopupOverlay>()
                    .session()
                    .map(|session| &session.state)
                {
                    Some(PopupState::TimeScroll(time)) => Some(time.formatted()),
                    _ => None,
                };
                if let Some(value) = pending {
                    commit_and_close(world, (anchor, backdrop), &value, None);
                }
            }
            PopupUiAction::MarkClosed => {
                commit_and_close(world, (anchor, backdrop), CLOSED_SENTINEL, None);
            }
            PopupUiAction::CancelTime => close_popup(world),
        }
    }
}
