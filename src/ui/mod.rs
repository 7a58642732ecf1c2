//! Terminal output for zani commands
//!
//! Interactive terminals get `cliclack` prompts, spinners and an `indicatif`
//! bar while hashing. Pipes and CI get plain prefixed lines and prompts
//! resolve to their defaults.
//!
//! # Example
//!
//! ```rust,ignore
//! use zani::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! ui::intro(&ctx, "zani check");
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Creating context cache...");
//! // ... upload ...
//! spinner.stop("Cache created");
//!
//! if ui::confirm(&ctx, "Rebuild cache now?", false).await? {
//!     // ...
//! }
//! ```

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, outro_warn, remark, section, step_info,
    step_ok, step_warn, step_warn_hint, verdict,
};
pub use progress::{ScanProgress, TaskSpinner};
pub use prompts::confirm;

use cliclack::ThemeState;
use console::Style;

/// Prompt styling: magenta while a prompt is open, green tick once answered
#[derive(Debug, Clone, Default)]
pub struct ZaniTheme;

impl ZaniTheme {
    fn by_state(state: &ThemeState, submitted: Style) -> Style {
        match state {
            ThemeState::Active => Style::new().magenta(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => submitted,
        }
    }
}

impl cliclack::Theme for ZaniTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        Self::by_state(state, Style::new().magenta().dim())
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        Self::by_state(state, Style::new().green())
    }
}

/// Use [`ZaniTheme`] for every cliclack prompt in this process
pub fn init_theme() {
    cliclack::set_theme(ZaniTheme);
}
