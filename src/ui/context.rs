//! Interactive vs plain output detection

use std::io::IsTerminal;

/// Set to force plain output even on a terminal
pub const PLAIN_ENV: &str = "SWCACHE_PLAIN";

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    interactive: bool,
    /// Whether --yes was passed (auto-approve prompts)
    auto_yes: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(),
            auto_yes: false,
        }
    }

    /// Create a non-interactive context
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            auto_yes: false,
        }
    }

    /// Set auto-yes mode (bypass prompts)
    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }

    /// Whether to use spinners and cliclack logs
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    fn detect_interactive() -> bool {
        if !std::io::stdout().is_terminal() || !std::io::stdin().is_terminal() {
            return false;
        }
        !["CI", PLAIN_ENV, "GITHUB_ACTIONS", "GITLAB_CI", "BUILDKITE", "TF_BUILD"]
            .iter()
            .any(|var| std::env::var_os(var).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_context() {
        let ctx = UiContext::non_interactive();
        assert!(!ctx.is_interactive());
        assert!(!ctx.use_fancy_output());
        assert!(!ctx.auto_yes());
    }

    #[test]
    fn with_auto_yes() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(ctx.auto_yes());
    }
}
