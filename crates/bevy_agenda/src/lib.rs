//! ECS-driven UI layer for a small scheduling dashboard.
//!
//! `bevy_agenda` provides:
//! - custom choice / date / time inputs whose popups share a single overlay,
//! - a theme customization tab backed by CSS variables and local storage,
//! - a professional roster and weekly schedule editor.
//!
//! The UI is a plain entity tree: hosts render [`UiLabel`] / [`StyleClass`]
//! nodes (or the [`ViewNode`] snapshot in [`SynthesizedUiViews`]) and feed
//! pointer input back through [`click`], [`scroll_to`] and [`edit_text`].
//!
//! # Minimal setup
//!
//! ```no_run
//! use bevy_agenda::{
//!     BevyAgendaPlugin, ChoiceOption, InputKind, OnChange, UiRoot,
//!     bevy_app::App,
//!     create_custom_input,
//! };
//!
//! let mut app = App::new();
//! app.add_plugins(BevyAgendaPlugin);
//!
//! let mount = app.world_mut().spawn(UiRoot).id();
//! create_custom_input(
//!     app.world_mut(),
//!     InputKind::Choice,
//!     mount,
//!     Some(vec![ChoiceOption::new("a", "Alpha"), ChoiceOption::new("b", "Beta")]),
//!     "a",
//!     Some(OnChange::new(|_, value| println!("picked {value}"))),
//! );
//! app.update();
//! ```
#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod controls;
pub mod ecs;
pub mod events;
pub mod formatters;
pub mod interaction;
pub mod locale;
pub mod logging;
pub mod overlay;
pub mod plugin;
pub mod schedule;
pub mod storage;
pub mod synthesize;
pub mod templates;
pub mod theme;
pub mod views;

pub use bevy_app;
pub use bevy_ecs;
pub use bevy_time;
pub use bevy_tweening;

pub use clock::*;
pub use config::*;
pub use controls::*;
pub use ecs::*;
pub use events::*;
pub use formatters::*;
pub use interaction::*;
pub use logging::*;
pub use overlay::*;
pub use plugin::*;
pub use schedule::*;
pub use storage::*;
pub use synthesize::*;
pub use theme::*;
pub use views::*;

#[cfg(test)]
mod tests;
