//! Session layer for the sonogram viewer: explicit state, action dispatch
//! and menu model on top of [`sonogram_core`]. Front-ends own a [`Session`]
//! and feed it actions; no globals are involved.

pub mod action;
pub mod error;
pub mod menu;
pub mod session;

pub use action::{Action, ActionTable, Outcome};
pub use error::SessionError;
pub use session::{Phase, Session, SessionState};

pub use sonogram_core;
