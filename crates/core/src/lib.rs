#![deny(unsafe_code)]
//! Core types and traits for the ripple water surface.
//!
//! Provides the `Simulation` trait, fixed-size `Grid` storage with
//! edge-replicated sampling, the `PingPong` double buffer, `SimError`,
//! the `Xorshift64` PRNG, JSON parameter helpers, and the `Seed` replay
//! record.

pub mod error;
pub mod grid;
pub mod params;
pub mod ping_pong;
pub mod prng;
pub mod seed;
pub mod simulation;

pub use error::SimError;
pub use grid::{Finite, Grid, NormalGrid, ScalarGrid, VectorGrid};
pub use ping_pong::PingPong;
pub use prng::Xorshift64;
pub use seed::Seed;
pub use simulation::Simulation;
