//! cliclack theme

use cliclack::ThemeState;
use console::Style;

/// Blue theme matching the info toast colour
#[derive(Debug, Clone, Default)]
pub struct SwTheme;

impl cliclack::Theme for SwTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().blue().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install the theme globally
pub fn init_theme() {
    cliclack::set_theme(SwTheme);
}
