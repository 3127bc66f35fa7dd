//! The three-step listing creation wizard screen.
//!
//! The screen owns the draft store, the step controller, and the validation
//! display state; the catalog is borrowed in only for the commit on the
//! review step.

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::listing::{
    Catalog, CommitError, DraftStore, Field, ImageSlot, PersistedListing, StepController,
    StepOutcome, ValidationState, WizardStep,
};
use crate::ui::dialogs::centered_rect;

/// What a keypress on the wizard meant for the caller.
#[derive(Debug)]
pub enum WizardResult {
    /// Still composing.
    Continue,
    /// The user asked to leave from the first step; caller decides whether
    /// to confirm before calling [`WizardScreen::cancel`].
    RequestCancel,
    /// Commit succeeded; the wizard is done.
    Committed(PersistedListing),
}

/// Fields shown on a step, in display order. A superset of the fields the
/// step gates on: the optional extras live where they make sense visually.
fn display_fields(step: WizardStep) -> &'static [Field] {
    match step {
        WizardStep::Basics => &[
            Field::Title,
            Field::Description,
            Field::ListingType,
            Field::Image(ImageSlot::First),
            Field::Image(ImageSlot::Second),
            Field::Image(ImageSlot::Third),
        ],
        WizardStep::Details => &[
            Field::Category,
            Field::City,
            Field::Landmark,
            Field::Rent,
            Field::Guests,
            Field::Amenities,
        ],
        WizardStep::Review => &[],
    }
}

pub struct WizardScreen {
    drafts: DraftStore,
    controller: StepController,
    vstate: ValidationState,
    form: super::form_field::StepForm,
    /// Transient persistence-failure notice shown on the review step.
    status: Option<String>,
}

impl Default for WizardScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardScreen {
    pub fn new() -> Self {
        let drafts = DraftStore::new();
        let controller = StepController::new();
        let form =
            super::form_field::StepForm::new(display_fields(controller.step()), &drafts.snapshot());
        Self {
            drafts,
            controller,
            vstate: ValidationState::new(),
            form,
            status: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.controller.step()
    }

    /// Whether the draft has anything worth a discard confirmation.
    pub fn is_dirty(&self) -> bool {
        !self.drafts.snapshot().is_empty()
    }

    /// Discard the draft (explicit cancel path).
    pub fn cancel(&mut self) {
        self.drafts.reset();
        self.vstate.clear();
    }

    fn rebuild_form(&mut self) {
        self.form = super::form_field::StepForm::new(
            display_fields(self.controller.step()),
            &self.drafts.snapshot(),
        );
    }

    fn sync_focused(&mut self) {
        if let Some(field) = self.form.focused_field() {
            self.form.sync_field(field, &mut self.drafts);
            self.vstate.touch(field, &self.drafts.snapshot());
        }
    }

    fn advance(&mut self) {
        self.form.sync_all(&mut self.drafts);
        match self.controller.advance(&self.drafts.snapshot()) {
            StepOutcome::Moved(_) => self.rebuild_form(),
            StepOutcome::Blocked { errors, .. } => self.vstate.absorb(&errors),
        }
    }

    fn retreat(&mut self) {
        self.form.sync_all(&mut self.drafts);
        self.controller.retreat();
        self.rebuild_form();
    }

    fn jump(&mut self, target: WizardStep) {
        match self.controller.jump_to(target, &self.drafts.snapshot()) {
            StepOutcome::Moved(_) => self.rebuild_form(),
            StepOutcome::Blocked { errors, .. } => self.vstate.absorb(&errors),
        }
    }

    fn commit(&mut self, catalog: &mut Catalog) -> WizardResult {
        match catalog.commit(&mut self.drafts) {
            Ok(listing) => WizardResult::Committed(listing),
            Err(CommitError::Validation(errors)) => {
                self.vstate.absorb(&errors);
                WizardResult::Continue
            }
            Err(CommitError::Persistence(err)) => {
                // Draft is preserved; tell the user and let them retry.
                tracing::warn!(%err, "commit failed at the durable store");
                self.status = Some(format!("Save failed: {err}. Press Enter to retry."));
                WizardResult::Continue
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, catalog: &mut Catalog) -> WizardResult {
        self.status = None;
        match self.controller.step() {
            WizardStep::Review => match key {
                KeyCode::Enter => return self.commit(catalog),
                KeyCode::Esc | KeyCode::Backspace => self.retreat(),
                KeyCode::Char('1') => self.jump(WizardStep::Basics),
                KeyCode::Char('2') => self.jump(WizardStep::Details),
                _ => {}
            },
            _ => match key {
                KeyCode::Enter => self.advance(),
                KeyCode::Esc => {
                    if self.controller.step() == WizardStep::Basics {
                        return WizardResult::RequestCancel;
                    }
                    self.retreat();
                }
                KeyCode::Tab => {
                    self.sync_focused();
                    self.form.next_field();
                }
                KeyCode::BackTab => {
                    self.sync_focused();
                    self.form.prev_field();
                }
                other => {
                    if let Some(field) = self.form.handle_key(other) {
                        self.form.sync_field(field, &mut self.drafts);
                        self.vstate.touch(field, &self.drafts.snapshot());
                    }
                }
            },
        }
        WizardResult::Continue
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let step = self.controller.step();
        let area = centered_rect(70, 85, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" New Listing "),
                Span::styled(
                    format!("— Step {}/3: {} ", step.number(), step.title()),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
            ]))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Min(5), Constraint::Length(2)])
            .split(inner);

        if step == WizardStep::Review {
            self.render_review(frame, chunks[0]);
        } else {
            let vstate = &self.vstate;
            self.form.render(frame, chunks[0], |field| {
                vstate.error(field).map(ToString::to_string)
            });
        }

        let hints = match step {
            WizardStep::Review => "Enter publish · Esc back · 1/2 edit a step",
            WizardStep::Basics => "Tab next field · Enter continue · Esc discard",
            WizardStep::Details => "Tab next field · Enter review · Esc back",
        };
        let footer = Paragraph::new(Line::from(Span::styled(
            hints,
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(footer, chunks[1]);
    }

    fn render_review(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let draft = self.drafts.snapshot();
        let mut lines: Vec<Line> = Vec::new();

        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{label:<12}"), Style::default().fg(Color::Gray)),
                Span::raw(value),
            ])
        };

        lines.push(row("Title", draft.title.clone()));
        lines.push(row("Type", match draft.listing_type {
            Some(t) => t.label().to_string(),
            None => "—".to_string(),
        }));
        lines.push(row("Category", draft.category.clone()));
        lines.push(row("City", draft.city.clone()));
        lines.push(row("Landmark", draft.landmark.clone()));
        lines.push(row("Rent", draft.rent.clone()));
        if !draft.guests.trim().is_empty() {
            lines.push(row("Guests", draft.guests.clone()));
        }
        let amenities = draft.amenity_list();
        if !amenities.is_empty() {
            lines.push(row("Amenities", amenities.join(", ")));
        }
        for slot in ImageSlot::all() {
            if let Some(image) = draft.image(*slot) {
                lines.push(row(Field::Image(*slot).label(), image.describe()));
            }
        }
        lines.push(Line::raw(""));

        let description = draft.description.trim();
        if !description.is_empty() {
            lines.push(Line::from(Span::styled(
                "Description",
                Style::default().fg(Color::Gray),
            )));
            for text_line in description.lines() {
                lines.push(Line::raw(format!("  {text_line}")));
            }
            lines.push(Line::raw(""));
        }

        for (field, message) in self.vstate.errors() {
            lines.push(Line::from(Span::styled(
                format!("✗ {}: {message}", field.label()),
                Style::default().fg(Color::Red),
            )));
        }
        if let Some(status) = &self.status {
            lines.push(Line::from(Span::styled(
                status.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
        }

        let para = Paragraph::new(lines).wrap(ratatui::widgets::Wrap { trim: false });
        frame.render_widget(para, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{CollectionStore, StoreError};

    struct MemStore;

    impl CollectionStore for MemStore {
        fn load(&self) -> Result<Vec<PersistedListing>, StoreError> {
            Ok(Vec::new())
        }
        fn save(&self, _listings: &[PersistedListing]) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn catalog() -> Catalog {
        Catalog::open(Box::new(MemStore)).unwrap()
    }

    fn type_str(screen: &mut WizardScreen, catalog: &mut Catalog, s: &str) {
        for c in s.chars() {
            screen.handle_key(KeyCode::Char(c), catalog);
        }
    }

    #[test]
    fn enter_on_invalid_basics_stays_on_step_one() {
        let mut screen = WizardScreen::new();
        let mut cat = catalog();
        screen.handle_key(KeyCode::Enter, &mut cat);
        assert_eq!(screen.step(), WizardStep::Basics);
    }

    #[test]
    fn esc_on_first_step_requests_cancel() {
        let mut screen = WizardScreen::new();
        let mut cat = catalog();
        let result = screen.handle_key(KeyCode::Esc, &mut cat);
        assert!(matches!(result, WizardResult::RequestCancel));
    }

    #[test]
    fn typed_input_lands_in_the_draft() {
        let mut screen = WizardScreen::new();
        let mut cat = catalog();
        type_str(&mut screen, &mut cat, "Cozy Cabin Retreat");
        assert!(screen.is_dirty());
        assert_eq!(screen.drafts.snapshot().title, "Cozy Cabin Retreat");
    }

    #[test]
    fn full_pass_through_the_wizard_commits() {
        let mut screen = WizardScreen::new();
        let mut cat = catalog();

        // Step 1: title, description, type, photo URL.
        type_str(&mut screen, &mut cat, "Cozy Cabin Retreat");
        screen.handle_key(KeyCode::Tab, &mut cat);
        type_str(&mut screen, &mut cat, "A lovely 20+ character description here");
        screen.handle_key(KeyCode::Tab, &mut cat);
        screen.handle_key(KeyCode::Down, &mut cat); // pick "For rent"
        screen.handle_key(KeyCode::Tab, &mut cat);
        type_str(&mut screen, &mut cat, "https://img.example/cabin.jpg");
        screen.handle_key(KeyCode::Enter, &mut cat);
        assert_eq!(screen.step(), WizardStep::Details);

        // Step 2: category, city, landmark, rent.
        for _ in 0..4 {
            // "Cabin" is the fourth category option.
            screen.handle_key(KeyCode::Down, &mut cat);
        }
        screen.handle_key(KeyCode::Tab, &mut cat);
        type_str(&mut screen, &mut cat, "Goa");
        screen.handle_key(KeyCode::Tab, &mut cat);
        type_str(&mut screen, &mut cat, "Near the main beach road");
        screen.handle_key(KeyCode::Tab, &mut cat);
        type_str(&mut screen, &mut cat, "1200");
        screen.handle_key(KeyCode::Enter, &mut cat);
        assert_eq!(screen.step(), WizardStep::Review);

        // Step 3: publish.
        let result = screen.handle_key(KeyCode::Enter, &mut cat);
        match result {
            WizardResult::Committed(listing) => {
                assert_eq!(listing.title, "Cozy Cabin Retreat");
                assert_eq!(listing.category, "Cabin");
                assert!(!listing.id.is_empty());
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert!(!screen.is_dirty());
        assert_eq!(cat.len(), 1);
    }

    #[test]
    fn retreat_from_details_keeps_input() {
        let mut screen = WizardScreen::new();
        let mut cat = catalog();
        type_str(&mut screen, &mut cat, "Cozy Cabin Retreat");
        screen.handle_key(KeyCode::Tab, &mut cat);
        type_str(&mut screen, &mut cat, "A lovely 20+ character description here");
        screen.handle_key(KeyCode::Tab, &mut cat);
        screen.handle_key(KeyCode::Down, &mut cat);
        screen.handle_key(KeyCode::Tab, &mut cat);
        type_str(&mut screen, &mut cat, "https://img.example/cabin.jpg");
        screen.handle_key(KeyCode::Enter, &mut cat);
        assert_eq!(screen.step(), WizardStep::Details);

        screen.handle_key(KeyCode::Esc, &mut cat);
        assert_eq!(screen.step(), WizardStep::Basics);
        assert_eq!(screen.drafts.snapshot().title, "Cozy Cabin Retreat");
    }

    #[test]
    fn cancel_discards_the_draft() {
        let mut screen = WizardScreen::new();
        let mut cat = catalog();
        type_str(&mut screen, &mut cat, "Half-finished");
        screen.cancel();
        assert!(!screen.is_dirty());
    }
}
