//! Theme catalog, CSS-variable state and local-storage persistence.
//!
//! Only variables listed in [`THEME_CATALOG`] are ever read from or written to
//! storage. Persisted themes are a flat JSON object `{ "--var": "#rrggbb" }`.
use std::collections::{BTreeMap, HashMap};

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{config::DashboardConfig, storage::DashboardStorage};

/// One customizable CSS variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeEntry {
    pub label: &'static str,
    pub variable: &'static str,
}

/// A titled group of [`ThemeEntry`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeCategory {
    pub title: &'static str,
    pub entries: &'static [ThemeEntry],
}

const fn entry(label: &'static str, variable: &'static str) -> ThemeEntry {
    ThemeEntry { label, variable }
}

pub const THEME_CATALOG: [ThemeCategory; 5] = [
    ThemeCategory {
        title: "Cores Principais",
        entries: &[
            entry("Primária (Destaques)", "--color-primary"),
            entry("Primária (Hover)", "--color-primary-hover"),
            entry("Texto em Botão Primário", "--color-primary-text"),
        ],
    },
    ThemeCategory {
        title: "Cores de Fundo",
        entries: &[
            entry("Fundo Principal", "--color-bg-main"),
            entry("Fundo de Cards", "--color-bg-card"),
            entry("Fundo Interativo (Inputs)", "--color-bg-interactive"),
            entry("Fundo Interativo (Hover)", "--color-bg-interactive-hover"),
        ],
    },
    ThemeCategory {
        title: "Cores de Texto",
        entries: &[
            entry("Texto Principal", "--color-text-base"),
            entry("Texto Secundário", "--color-text-muted"),
            entry("Títulos", "--color-text-heading"),
        ],
    },
    ThemeCategory {
        title: "Cores de Ação",
        entries: &[
            entry("Sucesso (Verde)", "--color-success"),
            entry("Perigo (Vermelho)", "--color-danger"),
            entry("Informação (Azul)", "--color-info"),
            entry("Aviso (Laranja)", "--color-warning"),
        ],
    },
    ThemeCategory {
        title: "Cores dos Gráficos",
        entries: &[
            entry("Cor 1", "--chart-color-1"),
            entry("Cor 2", "--chart-color-2"),
            entry("Cor 3", "--chart-color-3"),
            entry("Cor 4", "--chart-color-4"),
            entry("Cor 5", "--chart-color-5"),
        ],
    },
];

/// Prefix of variables whose change requires dependent charts to redraw.
pub const CHART_VARIABLE_PREFIX: &str = "--chart-color";

/// Built-in palette, matching the stylesheet the dashboard ships with.
pub const DEFAULT_THEME_RON: &str = r##"{
    "--color-primary": "#6366f1",
    "--color-primary-hover": "#4f46e5",
    "--color-primary-text": "#ffffff",
    "--color-bg-main": "#111827",
    "--color-bg-card": "#1f2937",
    "--color-bg-interactive": "#374151",
    "--color-bg-interactive-hover": "#4b5563",
    "--color-text-base": "#d1d5db",
    "--color-text-muted": "#9ca3af",
    "--color-text-heading": "#f9fafb",
    "--color-success": "#10b981",
    "--color-danger": "#ef4444",
    "--color-info": "#3b82f6",
    "--color-warning": "#f59e0b",
    "--chart-color-1": "#6366f1",
    "--chart-color-2": "#10b981",
    "--chart-color-3": "#f59e0b",
    "--chart-color-4": "#ef4444",
    "--chart-color-5": "#3b82f6",
}"##;

pub fn catalog_entries() -> impl Iterator<Item = &'static ThemeEntry> {
    THEME_CATALOG
        .iter()
        .flat_map(|category| category.entries.iter())
}

#[must_use]
pub fn is_catalog_variable(variable: &str) -> bool {
    catalog_entries().any(|entry| entry.variable == variable)
}

#[must_use]
pub fn is_chart_variable(variable: &str) -> bool {
    variable.starts_with(CHART_VARIABLE_PREFIX)
}

/// Catalog variable → color string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(BTreeMap<String, String>);

impl Theme {
    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.0.get(variable).map(String::as_str)
    }

    /// Set a catalog variable. Unknown variables are ignored; returns whether it was stored.
    pub fn set(&mut self, variable: &str, value: impl Into<String>) -> bool {
        if !is_catalog_variable(variable) {
            return false;
        }
        self.0.insert(variable.to_string(), value.into());
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }

    /// Parse a persisted theme. Malformed JSON yields an empty theme; unknown
    /// keys and non-string values are dropped.
    #[must_use]
    pub fn from_json(text: &str) -> Self {
        let raw = match serde_json::from_str::<HashMap<String, serde_json::Value>>(text) {
            Ok(raw) => raw,
            Err(parse_error) => {
                error!(%parse_error, "failed to parse stored theme, using an empty theme");
                return Self::default();
            }
        };

        let mut theme = Self::default();
        for (variable, value) in raw {
            if let serde_json::Value::String(value) = value {
                theme.set(&variable, value);
            }
        }
        theme
    }
}

/// Built-in palette parsed from [`DEFAULT_THEME_RON`].
#[must_use]
pub fn default_theme() -> Theme {
    match ron::from_str::<BTreeMap<String, String>>(DEFAULT_THEME_RON) {
        Ok(map) => {
            let mut theme = Theme::default();
            for (variable, value) in map {
                theme.set(&variable, value);
            }
            theme
        }
        Err(parse_error) => {
            error!(%parse_error, "built-in theme palette failed to parse");
            Theme::default()
        }
    }
}

/// Live CSS custom properties of the dashboard's root element.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct CssVariables {
    values: HashMap<String, String>,
}

impl CssVariables {
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        let mut css = Self::default();
        apply_theme(&mut css, theme);
        css
    }

    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.values.get(variable).map(String::as_str)
    }

    pub fn set_property(&mut self, variable: &str, value: impl Into<String>) {
        self.values.insert(variable.to_string(), value.into());
    }
}

/// Write every non-empty theme value onto `css`.
pub fn apply_theme(css: &mut CssVariables, theme: &Theme) {
    for (variable, value) in theme.iter() {
        if !value.is_empty() {
            css.set_property(variable, value);
        }
    }
}

/// Stored theme, or empty when nothing (or something unreadable) is stored.
#[must_use]
pub fn load_theme(storage: &DashboardStorage, key: &str) -> Theme {
    storage
        .read(key)
        .map(|text| Theme::from_json(&text))
        .unwrap_or_default()
}

pub fn save_theme(storage: &DashboardStorage, key: &str, theme: &Theme) {
    storage.write(key, &theme.to_json());
}

/// Snapshot every catalog variable from [`CssVariables`].
#[must_use]
pub fn current_theme(css: &CssVariables) -> Theme {
    let mut theme = Theme::default();
    for entry in catalog_entries() {
        let value = css.get(entry.variable).unwrap_or_default().trim();
        theme.set(entry.variable, value);
    }
    theme
}

/// Persist the live CSS variables as the stored theme.
pub fn save_current_theme(world: &mut World) {
    let theme = current_theme(world.resource::<CssVariables>());
    let key = world
        .resource::<DashboardConfig>()
        .theme_storage_key
        .clone();
    save_theme(world.resource::<DashboardStorage>(), &key, &theme);
    debug!(entries = theme.len(), "saved current theme");
}

/// Load the stored theme and apply it. Runs once at startup.
pub fn initialize_theme(world: &mut World) {
    let key = world
        .resource::<DashboardConfig>()
        .theme_storage_key
        .clone();
    let theme = load_theme(world.resource::<DashboardStorage>(), &key);
    apply_theme(&mut world.resource_mut::<CssVariables>(), &theme);
    debug!(entries = theme.len(), "initialized theme from storage");
}

/// Restore the built-in palette and persist it.
pub fn reset_theme_to_defaults(world: &mut World) {
    let defaults = default_theme();
    apply_theme(&mut world.resource_mut::<CssVariables>(), &defaults);
    save_current_theme(world);
}
