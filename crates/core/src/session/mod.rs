//! Quiz session state machine.
//!
//! `QuizState` is only ever changed by [`reduce`], a pure function over
//! tagged [`QuizAction`]s. Side effects (network, persistence) live in the
//! calling layer and observe the state after each reduction.

mod action;
mod progress;
mod reducer;
mod state;

pub use action::QuizAction;
pub use progress::QuizProgress;
pub use reducer::reduce;
pub use state::{QuizState, SessionPhase};
