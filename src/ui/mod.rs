//! Terminal UI: the listing browser, the creation wizard, and shared
//! widgets.

pub mod browse;
pub mod dialogs;
pub mod form_field;
pub mod terminal_guard;
pub mod wizard;

pub use browse::{Browser, BrowserAction};
pub use dialogs::{centered_rect, ConfirmDialog, ConfirmSelection};
pub use form_field::{FormField, StepForm};
pub use terminal_guard::{install_panic_hook, TerminalGuard};
pub use wizard::{WizardResult, WizardScreen};
