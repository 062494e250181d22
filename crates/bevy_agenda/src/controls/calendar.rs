use bevy_ecs::{entity::Entity, prelude::*};
use chrono::{Datelike, NaiveDate};

use crate::{
    controls::PopupUiAction,
    ecs::{ClickAction, StyleClass, UiLabel},
    locale::{WEEKDAY_LETTERS, month_name},
    templates::{spawn_child, spawn_label},
};

/// Parse a strict `YYYY-MM-DD` string.
#[must_use]
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Format `date` as `YYYY-MM-DD` with zero-padded month and day.
#[must_use]
pub fn format_iso_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

fn first_of_month(year: i32, month0: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

/// Number of days in the 0-based `month0` of `year`.
#[must_use]
pub fn days_in_month(year: i32, month0: u32) -> u32 {
    let (next_year, next_month0) = if month0 >= 11 {
        (year + 1, 0)
    } else {
        (year, month0 + 1)
    };
    match (first_of_month(year, month0), first_of_month(next_year, next_month0)) {
        (Some(first), Some(next)) => {
            u32::try_from(next.signed_duration_since(first).num_days()).unwrap_or(0)
        }
        _ => 0,
    }
}

/// One cell of the calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarCell {
    /// Alignment filler before day 1.
    Blank,
    Day {
        date: NaiveDate,
        today: bool,
        selected: bool,
    },
}

/// Displayed month of one open date popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSession {
    pub view_year: i32,
    /// 0-based month.
    pub view_month: u32,
    pub selected: Option<NaiveDate>,
}

impl CalendarSession {
    /// View the month of `initial`, or of `today` when `initial` does not parse.
    #[must_use]
    pub fn new(initial: &str, today: NaiveDate) -> Self {
        let selected = parse_iso_date(initial);
        let shown = selected.unwrap_or(today);
        Self {
            view_year: shown.year(),
            view_month: shown.month0(),
            selected,
        }
    }

    pub fn prev_month(&mut self) {
        if self.view_month == 0 {
            self.view_month = 11;
            self.view_year -= 1;
        } else {
            self.view_month -= 1;
        }
    }

    pub fn next_month(&mut self) {
        if self.view_month >= 11 {
            self.view_month = 0;
            self.view_year += 1;
        } else {
            self.view_month += 1;
        }
    }

    /// `"Março 2024"`.
    #[must_use]
    pub fn header_label(&self) -> String {
        format!("{} {}", month_name(self.view_month), self.view_year)
    }

    /// Leading blanks (one per weekday before day 1, weeks start on Sunday)
    /// followed by every day of the displayed month.
    #[must_use]
    pub fn grid(&self, today: NaiveDate) -> Vec<CalendarCell> {
        let Some(first) = first_of_month(self.view_year, self.view_month) else {
            return Vec::new();
        };

        let offset = first.weekday().num_days_from_sunday() as usize;
        let mut cells = vec![CalendarCell::Blank; offset];
        cells.extend(
            first
                .iter_days()
                .take(days_in_month(self.view_year, self.view_month) as usize)
                .map(|date| CalendarCell::Day {
                    date,
                    today: date == today,
                    selected: Some(date) == self.selected,
                }),
        );
        cells
    }
}

/// Day cell of a rendered calendar.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
}

/// Month/year caption of a rendered calendar.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarTitle;

pub fn render_calendar(
    world: &mut World,
    content: Entity,
    session: &CalendarSession,
    today: NaiveDate,
) {
    let header = spawn_child(world, content, StyleClass::new(["datepicker-header"]));
    spawn_child(
        world,
        header,
        (
            UiLabel::new("‹"),
            StyleClass::new(["prev-month-btn"]),
            ClickAction::new(PopupUiAction::PrevMonth),
        ),
    );
    spawn_child(
        world,
        header,
        (
            CalendarTitle,
            UiLabel::new(session.header_label()),
            StyleClass::new(["datepicker-month-year"]),
        ),
    );
    spawn_child(
        world,
        header,
        (
            UiLabel::new("›"),
            StyleClass::new(["next-month-btn"]),
            ClickAction::new(PopupUiAction::NextMonth),
        ),
    );

    let grid = spawn_child(world, content, StyleClass::new(["datepicker-grid"]));
    for letter in WEEKDAY_LETTERS {
        spawn_label(world, grid, letter, &["datepicker-weekday"]);
    }

    for cell in session.grid(today) {
        match cell {
            CalendarCell::Blank => {
                spawn_child(
                    world,
                    grid,
                    StyleClass::new(["datepicker-day", "other-month"]),
                );
            }
            CalendarCell::Day {
                date,
                today,
                selected,
            } => {
                let mut classes = StyleClass::new(["datepicker-day"]);
                if today {
                    classes.insert("today");
                }
                if selected {
                    classes.insert("selected");
                }
                spawn_child(
                    world,
                    grid,
                    (
                        CalendarDay { date },
                        UiLabel::new(date.day().to_string()),
                        classes,
                        ClickAction::new(PopupUiAction::SelectDay { date }),
                    ),
                );
            }
        }
    }
}
