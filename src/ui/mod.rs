//! Terminal output for the CLI
//!
//! Uses `cliclack` for spinners, prompts and step logs in an interactive
//! terminal, and plain prefixed lines everywhere else (CI, pipes, tests).

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, step_error_detail, step_info, step_ok, step_ok_detail,
    step_warn_hint, toast,
};
pub use progress::TaskSpinner;
pub use prompts::confirm;
pub use theme::{init_theme, SwTheme};
