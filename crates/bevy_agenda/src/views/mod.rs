//! Dashboard tabs built on top of the custom inputs.
use std::sync::Arc;

use bevy_ecs::{entity::Entity, world::World};

mod customization;
mod employees;

pub use customization::*;
pub use employees::*;

/// Callback bound to a button, invoked with the clicked button entity.
pub type ButtonCallback = Arc<dyn Fn(&mut World, Entity) + Send + Sync>;
