use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

use crate::config::Config;
use crate::listing::Catalog;
use crate::ui::{
    install_panic_hook, Browser, BrowserAction, ConfirmDialog, ConfirmSelection, TerminalGuard,
    WizardResult, WizardScreen,
};

/// What a pending confirm dialog will do when the user says yes.
enum PendingConfirm {
    DeleteListing(String),
    DiscardDraft,
}

pub struct App {
    config: Config,
    catalog: Catalog,
    browser: Browser,
    wizard: Option<WizardScreen>,
    confirm: Option<(ConfirmDialog, PendingConfirm)>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let catalog = Catalog::open_file(config.listings_path())?;
        Ok(Self {
            config,
            catalog,
            browser: Browser::new(),
            wizard: None,
            confirm: None,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let _guard = TerminalGuard::new()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        while !self.should_quit {
            terminal.draw(|f| {
                if let Some(ref mut wizard) = self.wizard {
                    wizard.render(f);
                } else {
                    self.browser.render(f, f.area(), &self.catalog, &self.config.ui);
                }
                if let Some((dialog, _)) = &self.confirm {
                    dialog.render(f);
                }
            })?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        // An open dialog swallows every key.
        if let Some((dialog, _)) = &mut self.confirm {
            if let Some(selection) = dialog.handle_key(key) {
                if let Some((_, pending)) = self.confirm.take() {
                    if selection == ConfirmSelection::Yes {
                        self.resolve_confirm(pending);
                    }
                }
            }
            return;
        }

        if let Some(wizard) = &mut self.wizard {
            match wizard.handle_key(key, &mut self.catalog) {
                WizardResult::Continue => {}
                WizardResult::RequestCancel => {
                    if wizard.is_dirty() {
                        self.confirm = Some((
                            ConfirmDialog::new(
                                "Discard draft",
                                "Leave the wizard and discard what you typed?",
                            ),
                            PendingConfirm::DiscardDraft,
                        ));
                    } else {
                        self.wizard = None;
                    }
                }
                WizardResult::Committed(listing) => {
                    tracing::info!(id = %listing.id, title = %listing.title, "listing published");
                    self.browser.set_status(format!("Published \"{}\"", listing.title));
                    self.wizard = None;
                }
            }
            return;
        }

        match self.browser.handle_key(key, &mut self.catalog) {
            BrowserAction::Continue => {}
            BrowserAction::NewListing => self.wizard = Some(WizardScreen::new()),
            BrowserAction::DeleteRequested(id) => {
                let title = self
                    .catalog
                    .get(&id)
                    .map(|l| l.title.clone())
                    .unwrap_or_else(|| id.clone());
                self.confirm = Some((
                    ConfirmDialog::new("Delete listing", format!("Delete \"{title}\"?")),
                    PendingConfirm::DeleteListing(id),
                ));
            }
            BrowserAction::Quit => self.should_quit = true,
        }
    }

    fn resolve_confirm(&mut self, pending: PendingConfirm) {
        match pending {
            PendingConfirm::DeleteListing(id) => match self.catalog.remove(&id) {
                Ok(true) => self.browser.set_status("Listing deleted"),
                Ok(false) => self.browser.set_status("Listing was already gone"),
                Err(err) => {
                    tracing::warn!(%err, %id, "delete failed");
                    self.browser.set_status(format!("Delete failed: {err}"));
                }
            },
            PendingConfirm::DiscardDraft => {
                if let Some(wizard) = &mut self.wizard {
                    wizard.cancel();
                }
                self.wizard = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn app() -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.data = dir.path().to_string_lossy().to_string();
        (App::new(config).unwrap(), dir)
    }

    #[test]
    fn q_quits_from_the_browser() {
        let (mut app, _dir) = app();
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn n_opens_the_wizard() {
        let (mut app, _dir) = app();
        app.handle_key(KeyCode::Char('n'));
        assert!(app.wizard.is_some());
    }

    #[test]
    fn esc_on_clean_wizard_closes_without_dialog() {
        let (mut app, _dir) = app();
        app.handle_key(KeyCode::Char('n'));
        app.handle_key(KeyCode::Esc);
        assert!(app.wizard.is_none());
        assert!(app.confirm.is_none());
    }

    #[test]
    fn esc_on_dirty_wizard_asks_first() {
        let (mut app, _dir) = app();
        app.handle_key(KeyCode::Char('n'));
        app.handle_key(KeyCode::Char('C'));
        app.handle_key(KeyCode::Esc);
        assert!(app.wizard.is_some());
        assert!(app.confirm.is_some());

        // Saying no keeps the wizard and the draft.
        app.handle_key(KeyCode::Char('n'));
        assert!(app.confirm.is_none());
        assert!(app.wizard.as_ref().unwrap().is_dirty());

        // Saying yes discards.
        app.handle_key(KeyCode::Esc);
        app.handle_key(KeyCode::Char('y'));
        assert!(app.wizard.is_none());
    }
}
