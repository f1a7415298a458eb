//! Named accessors for canonical routine references.
//!
//! Each facade pairs an [`EmitCoordinator`](crate::EmitCoordinator) with a
//! subject area and exposes one method per routine the subject area is
//! expected to provide. Every method accepts an optional identity override
//! that replaces the subject area in the generated name.

mod assurance;
mod context;
mod lifecycle;
mod observability;

pub use assurance::Assurance;
pub use context::{Context, ContextStorage};
pub use lifecycle::Lifecycle;
pub use observability::Observability;
