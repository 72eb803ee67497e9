//! Marker types describing what a typed value stands for.

/// Marker of an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker of an entity modification.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marker of an expiration moment.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker of the last time something was watched.
#[derive(Clone, Copy, Debug)]
pub struct Watching;
