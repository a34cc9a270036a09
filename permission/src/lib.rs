//! Project permission model.
//!
//! [`PermissionLevel`] is the closed set of ranks a member can hold, each with
//! a fixed capability table. [`policy::authorize`] decides whether an actor may
//! perform a [`policy::ProjectOperation`] given levels already resolved from
//! the store, so it never performs I/O itself.

pub mod level;
pub mod policy;

pub use level::{Capability, PermissionLevel};
pub use policy::{authorize, Decision, Denial, ProjectOperation};
