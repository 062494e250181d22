use std::time::Duration;

use bevy_ecs::{entity::Entity, prelude::*};
use bevy_time::Time;
use bevy_tweening::{Animator, EaseFunction, FloatLens, Tween};
use tracing::trace;

use crate::{
    config::DashboardConfig,
    controls::{PopupState, PopupUiAction},
    ecs::{ScrollOffset, StyleClass, UiLabel},
    events::UiEventQueue,
    interaction::UiScrolled,
    locale::{TIME_CANCEL, TIME_CLOSED, TIME_OK, TIME_PICKER_TITLE},
    overlay::PopupOverlay,
    templates::{spawn_button, spawn_child, spawn_label},
};

/// Value committed by the "Fechado" action. Distinct from an empty time.
pub const CLOSED_SENTINEL: &str = "FECHADO";

/// Parse `H:M` / `HH:MM` into `(hour, minute)` within `0..24` / `0..60`.
#[must_use]
pub fn parse_hh_mm(text: &str) -> Option<(u32, u32)> {
    let (hour, minute) = text.split_once(':')?;
    let field = |part: &str, limit: u32| {
        if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        part.parse::<u32>().ok().filter(|value| *value < limit)
    };
    Some((field(hour, 24)?, field(minute, 60)?))
}

#[must_use]
pub fn format_hh_mm(hour: u32, minute: u32) -> String {
    format!("{hour:02}:{minute:02}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeColumn {
    Hours,
    Minutes,
}

impl TimeColumn {
    #[must_use]
    pub fn item_count(self) -> u32 {
        match self {
            Self::Hours => 24,
            Self::Minutes => 60,
        }
    }

    fn scroller_class(self) -> &'static str {
        match self {
            Self::Hours => "hours-scroller",
            Self::Minutes => "minutes-scroller",
        }
    }
}

/// Index of the item closest to `offset`, clamped to the column.
#[must_use]
pub fn nearest_index(offset: f32, item_height: f32, item_count: u32) -> u32 {
    if item_height <= 0.0 || item_count == 0 || !offset.is_finite() {
        return 0;
    }
    let index = (offset / item_height).round().max(0.0);
    (index as u32).min(item_count - 1)
}

/// Restartable one-shot timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Debounce {
    remaining: Option<Duration>,
}

impl Debounce {
    /// (Re)arm the timer for `delay`, discarding any pending fire.
    pub fn reset(&mut self, delay: Duration) {
        self.remaining = Some(delay);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advance by `delta`; returns `true` exactly once when the delay elapses.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(remaining) = self.remaining else {
            return false;
        };
        let left = remaining.saturating_sub(delta);
        if left.is_zero() {
            self.remaining = None;
            true
        } else {
            self.remaining = Some(left);
            false
        }
    }
}

/// One scrollable column of the time popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollColumn {
    pub column: TimeColumn,
    /// Value that "OK" will commit.
    pub pending: u32,
    pub scroller: Option<Entity>,
    /// Set by the renderer; the first tick after rendering scrolls to `pending`.
    pub initial_scroll_pending: bool,
    pub debounce: Debounce,
}

impl ScrollColumn {
    fn new(column: TimeColumn, pending: u32) -> Self {
        Self {
            column,
            pending: pending.min(column.item_count() - 1),
            scroller: None,
            initial_scroll_pending: false,
            debounce: Debounce::default(),
        }
    }
}

/// Pending hour and minute of one open time popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeScrollSession {
    pub hours: ScrollColumn,
    pub minutes: ScrollColumn,
}

impl TimeScrollSession {
    /// Start from `initial`, or from `now` when it is empty, the closed
    /// sentinel, or unparseable.
    #[must_use]
    pub fn new(initial: &str, now: (u32, u32)) -> Self {
        let (hour, minute) = if initial.is_empty() || initial == CLOSED_SENTINEL {
            now
        } else {
            parse_hh_mm(initial).unwrap_or(now)
        };
        Self {
            hours: ScrollColumn::new(TimeColumn::Hours, hour),
            minutes: ScrollColumn::new(TimeColumn::Minutes, minute),
        }
    }

    /// Pending value as `HH:MM`.
    #[must_use]
    pub fn formatted(&self) -> String {
        format_hh_mm(self.hours.pending, self.minutes.pending)
    }

    pub fn column_mut(&mut self, column: TimeColumn) -> &mut ScrollColumn {
        match column {
            TimeColumn::Hours => &mut self.hours,
            TimeColumn::Minutes => &mut self.minutes,
        }
    }

    fn columns_mut(&mut self) -> [&mut ScrollColumn; 2] {
        [&mut self.hours, &mut self.minutes]
    }
}

/// Scrollable list node of one [`TimeColumn`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeScroller {
    pub column: TimeColumn,
}

/// Item inside a [`TimeScroller`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeItem {
    pub value: u32,
}

fn spawn_scroller(world: &mut World, body: Entity, column: TimeColumn) -> Entity {
    let scroller = spawn_child(
        world,
        body,
        (
            TimeScroller { column },
            ScrollOffset(0.0),
            StyleClass::new(["timepicker-scroller", column.scroller_class()]),
        ),
    );
    let items = spawn_child(
        world,
        scroller,
        StyleClass::new(["timepicker-scroller-content"]),
    );
    for value in 0..column.item_count() {
        spawn_child(
            world,
            items,
            (
                TimeItem { value },
                UiLabel::new(format!("{value:02}")),
                StyleClass::new(["timepicker-item"]),
            ),
        );
    }
    scroller
}

pub fn render_time_scroll(world: &mut World, content: Entity, session: &mut TimeScrollSession) {
    spawn_label(world, content, TIME_PICKER_TITLE, &["timepicker-header"]);

    let wrapper = spawn_child(world, content, StyleClass::new(["timepicker-body-wrapper"]));
    let body = spawn_child(world, wrapper, StyleClass::new(["timepicker-body"]));
    spawn_child(
        world,
        body,
        StyleClass::new(["timepicker-selection-indicator"]),
    );
    let hours = spawn_scroller(world, body, TimeColumn::Hours);
    spawn_label(world, body, ":", &["timepicker-separator"]);
    let minutes = spawn_scroller(world, body, TimeColumn::Minutes);

    let actions = spawn_child(world, content, StyleClass::new(["timepicker-actions"]));
    spawn_button(world, actions, TIME_CANCEL, &[], PopupUiAction::CancelTime);
    spawn_button(
        world,
        actions,
        TIME_OK,
        &["primary"],
        PopupUiAction::ConfirmTime,
    );
    spawn_button(
        world,
        actions,
        TIME_CLOSED,
        &["danger"],
        PopupUiAction::MarkClosed,
    );

    for (column, scroller) in [(&mut session.hours, hours), (&mut session.minutes, minutes)] {
        column.scroller = Some(scroller);
        column.initial_scroll_pending = true;
        column.debounce.cancel();
    }
}

/// Restart the settle debounce of whichever live column was scrolled.
pub fn handle_time_scroll_events(world: &mut World) {
    let scrolls = world
        .resource::<UiEventQueue>()
        .drain_actions::<UiScrolled>();
    if scrolls.is_empty() {
        return;
    }
    let delay = world.resource::<DashboardConfig>().scroll_debounce();

    for event in scrolls {
        let Some(column) = world.get::<TimeScroller>(event.entity).map(|s| s.column) else {
            continue;
        };

        let restarted = {
            let mut overlay = world.resource_mut::<PopupOverlay>();
            match overlay.session_mut().map(|session| &mut session.state) {
                Some(PopupState::TimeScroll(time)) => {
                    let scroll_column = time.column_mut(column);
                    if scroll_column.scroller == Some(event.entity) {
                        scroll_column.debounce.reset(delay);
                        true
                    } else {
                        false
                    }
                }
                _ => false,
            }
        };

        if restarted {
            trace!(?column, offset = event.action.offset, "time scroller moved");
            // Manual scrolling takes over from an in-flight snap.
            world
                .entity_mut(event.entity)
                .remove::<Animator<ScrollOffset>>();
        }
    }
}

enum ScrollerWork {
    Jump { scroller: Entity, offset: f32 },
    Settle { column: TimeColumn, scroller: Entity },
}

fn snap_animator(from: f32, to: f32, duration: Duration) -> Animator<ScrollOffset> {
    Animator::new(Tween::new(
        EaseFunction::CubicOut,
        duration,
        FloatLens::new(from, to, |offset: &mut ScrollOffset| &mut offset.0),
    ))
}

/// Apply the deferred initial scroll and settle debounced scrollers of the
/// live time popup.
pub fn tick_time_scroll_session(world: &mut World) {
    let delta = world.resource::<Time>().delta();
    let (item_height, snap) = {
        let config = world.resource::<DashboardConfig>();
        (config.time_item_height, config.scroll_snap())
    };

    let mut work = Vec::new();
    {
        let mut overlay = world.resource_mut::<PopupOverlay>();
        let state = overlay.session_mut().map(|session| &mut session.state);
        let Some(PopupState::TimeScroll(time)) = state else {
            return;
        };
        for column in time.columns_mut() {
            let Some(scroller) = column.scroller else {
                continue;
            };
            if column.initial_scroll_pending {
                column.initial_scroll_pending = false;
                work.push(ScrollerWork::Jump {
                    scroller,
                    offset: column.pending as f32 * item_height,
                });
            } else if column.debounce.tick(delta) {
                work.push(ScrollerWork::Settle {
                    column: column.column,
                    scroller,
                });
            }
        }
    }

    for item in work {
        match item {
            ScrollerWork::Jump { scroller, offset } => {
                if let Some(mut current) = world.get_mut::<ScrollOffset>(scroller) {
                    current.0 = offset;
                }
            }
            ScrollerWork::Settle { column, scroller } => {
                let Some(current) = world.get::<ScrollOffset>(scroller).map(|o| o.0) else {
                    continue;
                };
                let index = nearest_index(current, item_height, column.item_count());
                let target = index as f32 * item_height;
                world
                    .entity_mut(scroller)
                    .insert(snap_animator(current, target, snap));

                let mut overlay = world.resource_mut::<PopupOverlay>();
                if let Some(PopupState::TimeScroll(time)) =
                    overlay.session_mut().map(|session| &mut session.state)
                {
                    time.column_mut(column).pending = index;
                }
                trace!(?column, index, "time scroller settled");
            }
        }
    }
}
