//! Pointer input mapped to orbit actions.
//!
//! The window layer feeds raw button, cursor and wheel events into a
//! [`PointerTracker`]; the stage consumes [`OrbitAction`]s, never raw events.
//!
//! # Invariants
//! - A drag produces actions only while its button is held.
//! - The first cursor move after a press produces no action.

pub mod pointer;

pub use pointer::{OrbitAction, PointerButton, PointerTracker};
