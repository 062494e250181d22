//! Minimal component tweening used for popup fades and scroller snapping.
//!
//! A [`Tween`] interpolates one component type through a [`Lens`]. Attach an
//! [`Animator`] next to the target component and step it with
//! [`step_animators`], or let [`AppTweeningExt::add_animator`] schedule that.
use std::{fmt, marker::PhantomData, time::Duration};

use bevy_app::{App, Update};
use bevy_ecs::{component::Mutable, entity::Entity, prelude::*};
use bevy_time::Time;

/// Easing curve applied to the linear progress ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EaseFunction {
    #[default]
    Linear,
    QuadraticInOut,
    /// Fast start, gentle landing. Matches browser `behavior: 'smooth'` scrolling.
    CubicOut,
}

impl EaseFunction {
    #[must_use]
    pub fn sample(self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        match self {
            Self::Linear => x,
            Self::QuadraticInOut => {
                if x < 0.5 {
                    2.0 * x * x
                } else {
                    1.0 - ((-2.0 * x + 2.0).powi(2) / 2.0)
                }
            }
            Self::CubicOut => 1.0 - (1.0 - x).powi(3),
        }
    }
}

/// Interpolation lens for tweening a component.
pub trait Lens<T>: Send + Sync + 'static {
    fn lerp(&mut self, target: &mut T, ratio: f32);
}

/// Linear `f32` lens built from a field accessor.
///
/// ```
/// use bevy_ecs::prelude::*;
/// use bevy_tweening::{FloatLens, Lens};
///
/// #[derive(Component)]
/// struct Opacity(f32);
///
/// let mut lens = FloatLens::new(0.0, 1.0, |o: &mut Opacity| &mut o.0);
/// let mut opacity = Opacity(0.0);
/// lens.lerp(&mut opacity, 0.5);
/// assert!((opacity.0 - 0.5).abs() < f32::EPSILON);
/// ```
pub struct FloatLens<T> {
    pub start: f32,
    pub end: f32,
    field: fn(&mut T) -> &mut f32,
}

impl<T> FloatLens<T> {
    #[must_use]
    pub fn new(start: f32, end: f32, field: fn(&mut T) -> &mut f32) -> Self {
        Self { start, end, field }
    }
}

impl<T: 'static> Lens<T> for FloatLens<T> {
    fn lerp(&mut self, target: &mut T, ratio: f32) {
        *(self.field)(target) = self.start + (self.end - self.start) * ratio;
    }
}

/// Tween description for one component type.
pub struct Tween<T: Component> {
    pub ease: EaseFunction,
    pub duration: Duration,
    lens: Box<dyn Lens<T>>,
}

impl<T: Component> Tween<T> {
    #[must_use]
    pub fn new<L>(ease: EaseFunction, duration: Duration, lens: L) -> Self
    where
        L: Lens<T>,
    {
        Self {
            ease,
            duration,
            lens: Box::new(lens),
        }
    }

    fn apply(&mut self, target: &mut T, ratio: f32) {
        self.lens.lerp(target, self.ease.sample(ratio));
    }
}

impl<T: Component> fmt::Debug for Tween<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("ease", &self.ease)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

/// Drives a [`Tween`] against the sibling component `T`.
///
/// Inserting a new animator replaces the running one, so a retargeted tween
/// always starts from the component's current value.
#[derive(Component)]
pub struct Animator<T: Component> {
    tween: Tween<T>,
    elapsed: Duration,
    _marker: PhantomData<T>,
}

impl<T: Component> Animator<T> {
    #[must_use]
    pub fn new(tween: Tween<T>) -> Self {
        Self {
            tween,
            elapsed: Duration::ZERO,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.tween.duration
    }

    /// Linear progress in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.tween.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / self.tween.duration.as_secs_f32()).clamp(0.0, 1.0)
        }
    }

    /// Advance by `delta` and write the interpolated value. Returns `true` once complete.
    pub fn tick(&mut self, target: &mut T, delta: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(delta);
        let ratio = self.progress();
        self.tween.apply(target, ratio);
        ratio >= 1.0
    }
}

impl<T: Component> fmt::Debug for Animator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("tween", &self.tween)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

/// Advance all [`Animator<T>`] components for one frame using Bevy `Time`.
///
/// Completed animators are removed automatically.
pub fn step_animators<T: Component<Mutability = Mutable>>(world: &mut World) {
    let delta = world.resource::<Time>().delta();

    let mut finished_entities = Vec::<Entity>::new();
    let mut query = world.query::<(Entity, &mut Animator<T>, &mut T)>();

    for (entity, mut animator, mut target) in query.iter_mut(world) {
        if animator.tick(&mut *target, delta) {
            finished_entities.push(entity);
        }
    }

    for entity in finished_entities {
        if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            entity_mut.remove::<Animator<T>>();
        }
    }
}

/// App extension for scheduling animator stepping per component type.
pub trait AppTweeningExt {
    /// Step `Animator<T>` every `Update`.
    fn add_animator<T: Component<Mutability = Mutable>>(&mut self) -> &mut Self;
}

impl AppTweeningExt for App {
    fn add_animator<T: Component<Mutability = Mutable>>(&mut self) -> &mut Self {
        self.add_systems(Update, step_animators::<T>)
    }
}
