//! Output functions for consistent CLI formatting

use super::context::UiContext;
use crate::bootstrap::{Severity, Toast};
use console::style;

/// Display intro banner
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).blue().bold()).ok();
    } else {
        println!("{}", style(title).blue().bold());
    }
}

/// Display success outro
pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).green().bold()).ok();
    } else {
        println!("{} {}", style("[OK]").green(), message);
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        println!("  {} {}", style("[OK]").green(), message);
    }
}

/// Display a success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
    } else {
        println!("  {} {} ({})", style("[OK]").green(), message, detail);
    }
}

/// Display a warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::warning(format!("{} - {}", message, style(hint).dim())).ok();
    } else {
        println!("  {} {} - {}", style("[WARN]").yellow(), message, hint);
    }
}

/// Display an error step with detail
pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::error(format!("{}: {}", message, style(detail).red())).ok();
    } else {
        println!("  {} {}: {}", style("[FAIL]").red(), message, detail);
    }
}

/// Display an info step
pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::info(message).ok();
    } else {
        println!("  {} {}", style("[INFO]").cyan(), message);
    }
}

/// Print a key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Display a bootstrap toast as a step of matching severity
pub fn toast(ctx: &UiContext, toast: &Toast) {
    let message = toast.message.as_str();
    if ctx.use_fancy_output() {
        let shown = match toast.severity {
            Severity::Success => cliclack::log::success(message),
            Severity::Warning => cliclack::log::warning(message),
            Severity::Error => cliclack::log::error(message),
            Severity::Info => cliclack::log::info(message),
        };
        shown.ok();
    } else {
        let tag = match toast.severity {
            Severity::Success => style("[OK]").green(),
            Severity::Warning => style("[WARN]").yellow(),
            Severity::Error => style("[FAIL]").red(),
            Severity::Info => style("[INFO]").cyan(),
        };
        println!("  {} {}", tag, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_non_interactive() {
        let ctx = UiContext::non_interactive();
        intro(&ctx, "Installing v1");
        step_ok(&ctx, "Cached 6 asset(s)");
        step_error_detail(&ctx, "/app.js", "connection refused");
        toast(&ctx, &Toast::new(Severity::Warning, "You are offline"));
        outro_success(&ctx, "v1 active");
    }
}
