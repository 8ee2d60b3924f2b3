//! Spinner with plain-output fallback

use super::context::UiContext;
use console::style;

/// A task spinner; prints plain status lines when not on a terminal
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        self.finish(message, style("[OK]").green());
    }

    /// Stop with warning message
    pub fn stop_warn(&mut self, message: &str) {
        self.finish(message, style("[WARN]").yellow());
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.error(message),
            None => println!("{} {}", style("[FAIL]").red(), message),
        }
    }

    fn finish(&mut self, message: &str, tag: console::StyledObject<&str>) {
        match self.spinner.take() {
            Some(spinner) => spinner.stop(message),
            None => println!("{} {}", tag, message),
        }
    }
}
