//! Shared record types

mod inertia;
mod info;
mod math;
mod node;

pub use inertia::*;
pub use info::*;
pub use math::*;
pub use node::*;
