//! Terminal output helpers
//!
//! Spinners and styled status lines in an interactive terminal, plain
//! prefixed lines in CI. Status output goes to stderr so that report
//! output on stdout stays machine-readable.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{confirm, step_info, step_ok, step_warn};
pub use progress::TaskSpinner;
