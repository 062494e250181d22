//! Fixed pt-BR strings shown by the dashboard widgets.

pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Sunday-first single-letter weekday headers.
pub const WEEKDAY_LETTERS: [&str; 7] = ["D", "S", "T", "Q", "Q", "S", "S"];

/// Sunday-first weekday names, as stored in `DaySchedule::day`.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Domingo",
    "Segunda-feira",
    "Terça-feira",
    "Quarta-feira",
    "Quinta-feira",
    "Sexta-feira",
    "Sábado",
];

pub const PLACEHOLDER_LABEL: &str = "--";
pub const SELECT_PROMPT: &str = "-- Selecione --";

pub const TIME_PICKER_TITLE: &str = "Selecionar Horário";
pub const TIME_CANCEL: &str = "Cancelar";
pub const TIME_OK: &str = "OK";
pub const TIME_CLOSED: &str = "Fechado";

/// Month name for a 0-based month index.
#[must_use]
pub fn month_name(month0: u32) -> &'static str {
    MONTH_NAMES.get(month0 as usize).copied().unwrap_or("?")
}
