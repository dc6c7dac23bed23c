#![deny(unsafe_code)]
//! Touch-driven shallow-water surface.
//!
//! A [`WaterSurface`] owns double-buffered height and velocity grids and
//! advances them once per rendered frame. Touches from any thread are
//! coalesced into one Gaussian impulse per tick (directional for fast
//! swipes), device tilt biases the flow, shakes splash broad bumps across
//! the surface, and strong touches throw splash particles whose landings
//! ripple back into the field.
//!
//! The renderer reads the current height, velocity, normal and foam grids
//! and the particle list; none of them feed back into the simulation.

pub mod config;
pub mod derived;
pub mod impulse;
pub mod integrator;
pub mod motion;
pub mod particles;
pub mod store;
pub mod surface;
pub mod touch;

pub use config::SimConfig;
pub use impulse::ImpulseApplicator;
pub use integrator::{cap_dt, Integrator, MAX_DT};
pub use motion::MotionForcing;
pub use particles::{Landing, ParticleSystem, SplashParticle};
pub use store::{FieldKind, FieldStore, Slot};
pub use surface::{SurfaceStats, WaterSurface};
pub use touch::{CoalescedTouch, CoalescerSettings, TouchCoalescer, TouchEvent, TouchQueue};
