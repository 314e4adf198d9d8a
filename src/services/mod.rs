//! Business logic services
//!
//! Hydraulic state and the pure derivations on top of it, kept separate from
//! HTTP concerns.

pub mod connection;
pub mod hydraulics;
pub mod recommendations;
pub mod tags;
