//! Controlled text input that keeps its caret across outside re-renders.

mod events;
mod state;

pub use events::{EditKey, InputChange};
pub use state::ControlledInput;
