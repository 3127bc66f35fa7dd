//! Form field widgets for the wizard, keyed by the domain [`Field`] enum.

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

use crate::listing::{
    Draft, DraftStore, Field, FieldValue, ImageRef, ListingType, CATEGORIES,
};

/// One input widget. Which variant a field gets is decided by
/// [`StepForm::widget_for`].
pub enum FormField {
    /// Single-line text input
    TextInput {
        value: String,
        cursor_pos: usize,
        placeholder: String,
        max_length: Option<usize>,
    },
    /// Multi-line text input using tui-textarea
    TextArea {
        textarea: Box<TextArea<'static>>,
        placeholder: String,
    },
    /// Pick-one selection; starts unselected so required choices stay
    /// unmade until the user acts.
    Select {
        options: Vec<String>,
        selected: Option<usize>,
        list_state: ListState,
    },
}

impl FormField {
    fn text(value: &str, placeholder: &str, max_length: Option<usize>) -> Self {
        FormField::TextInput {
            cursor_pos: value.len(),
            value: value.to_string(),
            placeholder: placeholder.to_string(),
            max_length,
        }
    }

    fn area(value: &str, placeholder: &str) -> Self {
        let mut textarea = TextArea::default();
        if !value.is_empty() {
            textarea.insert_str(value);
        }
        FormField::TextArea {
            textarea: Box::new(textarea),
            placeholder: placeholder.to_string(),
        }
    }

    fn select(options: Vec<String>, current: Option<&str>) -> Self {
        let selected = current.and_then(|c| options.iter().position(|o| o == c));
        let mut list_state = ListState::default();
        list_state.select(selected);
        FormField::Select { options, selected, list_state }
    }

    /// Current value as a string (selects yield the selected option or "").
    pub fn value(&self) -> String {
        match self {
            FormField::TextInput { value, .. } => value.clone(),
            FormField::TextArea { textarea, .. } => textarea.lines().join("\n"),
            FormField::Select { options, selected, .. } => selected
                .and_then(|i| options.get(i).cloned())
                .unwrap_or_default(),
        }
    }

    /// Handle a key event, returns true if the key was consumed.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self {
            FormField::TextInput { value, cursor_pos, max_length, .. } => match key {
                KeyCode::Char(c) => {
                    if max_length.map(|m| value.chars().count() < m).unwrap_or(true) {
                        value.insert(*cursor_pos, c);
                        *cursor_pos += c.len_utf8();
                    }
                    true
                }
                KeyCode::Backspace => {
                    if *cursor_pos > 0 {
                        let prev = floor_char_boundary(value, *cursor_pos - 1);
                        value.remove(prev);
                        *cursor_pos = prev;
                    }
                    true
                }
                KeyCode::Delete => {
                    if *cursor_pos < value.len() {
                        value.remove(*cursor_pos);
                    }
                    true
                }
                KeyCode::Left => {
                    if *cursor_pos > 0 {
                        *cursor_pos = floor_char_boundary(value, *cursor_pos - 1);
                    }
                    true
                }
                KeyCode::Right => {
                    if *cursor_pos < value.len() {
                        *cursor_pos = ceil_char_boundary(value, *cursor_pos + 1);
                    }
                    true
                }
                KeyCode::Home => {
                    *cursor_pos = 0;
                    true
                }
                KeyCode::End => {
                    *cursor_pos = value.len();
                    true
                }
                _ => false,
            },
            FormField::TextArea { textarea, .. } => match key {
                // Enter is reserved for step navigation; everything else
                // goes straight to the textarea.
                KeyCode::Enter => false,
                other => {
                    textarea.input(crossterm::event::KeyEvent::new(
                        other,
                        crossterm::event::KeyModifiers::NONE,
                    ));
                    true
                }
            },
            FormField::Select { options, selected, list_state } => match key {
                KeyCode::Up | KeyCode::Char('k') => {
                    let next = match *selected {
                        Some(0) | None => 0,
                        Some(i) => i - 1,
                    };
                    *selected = Some(next);
                    list_state.select(*selected);
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let last = options.len().saturating_sub(1);
                    let next = match *selected {
                        None => 0,
                        Some(i) => (i + 1).min(last),
                    };
                    *selected = Some(next);
                    list_state.select(*selected);
                    true
                }
                _ => false,
            },
        }
    }

    /// Height needed to render this field (content only, label excluded).
    pub fn render_height(&self) -> u16 {
        match self {
            FormField::TextInput { .. } => 1,
            FormField::TextArea { .. } => 4,
            FormField::Select { options, .. } => (options.len() as u16).min(5),
        }
    }

    /// Render the field into `area`.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        match self {
            FormField::TextInput { value, cursor_pos, placeholder, .. } => {
                let content = if value.is_empty() && !focused {
                    Line::from(Span::styled(
                        placeholder.as_str(),
                        Style::default().fg(Color::DarkGray),
                    ))
                } else {
                    let mut text = value.clone();
                    if focused {
                        if *cursor_pos < text.len() {
                            text.insert(*cursor_pos, '|');
                        } else {
                            text.push('|');
                        }
                    }
                    Line::from(text)
                };

                let para = Paragraph::new(content).style(Style::default().fg(if focused {
                    Color::White
                } else {
                    Color::Gray
                }));
                frame.render_widget(para, area);
            }
            FormField::TextArea { textarea, placeholder } => {
                textarea.set_cursor_line_style(Style::default());
                textarea.set_cursor_style(if focused {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                });
                textarea.set_block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(if focused {
                            Color::Cyan
                        } else {
                            Color::Gray
                        })),
                );
                if textarea.lines().iter().all(String::is_empty) {
                    textarea.set_placeholder_text(placeholder.clone());
                    textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));
                }
                frame.render_widget(&**textarea, area);
            }
            FormField::Select { options, selected, list_state } => {
                let items: Vec<ListItem> = options
                    .iter()
                    .enumerate()
                    .map(|(i, opt)| {
                        let style = if Some(i) == *selected {
                            Style::default().add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(Color::Gray)
                        };
                        ListItem::new(Span::styled(opt.as_str(), style))
                    })
                    .collect();

                let list = List::new(items)
                    .highlight_style(
                        Style::default()
                            .add_modifier(Modifier::REVERSED)
                            .fg(Color::Cyan),
                    )
                    .highlight_symbol(if focused { "> " } else { "  " });
                frame.render_stateful_widget(list, area, list_state);
            }
        }
    }
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// The fields of one wizard step as an ordered, focusable form.
pub struct StepForm {
    fields: Vec<(Field, FormField)>,
    focused: usize,
}

impl StepForm {
    /// Build a form for the given fields, seeding widget values from the
    /// current draft so retreat/advance round-trips keep user input.
    pub fn new(fields: &[Field], draft: &Draft) -> Self {
        let fields = fields
            .iter()
            .map(|f| (*f, Self::widget_for(*f, draft)))
            .collect();
        Self { fields, focused: 0 }
    }

    fn widget_for(field: Field, draft: &Draft) -> FormField {
        match field {
            Field::Title => FormField::text(&draft.title, "e.g. Cozy Cabin Retreat", Some(100)),
            Field::Description => {
                FormField::area(&draft.description, "What makes this place worth staying at?")
            }
            Field::City => FormField::text(&draft.city, "e.g. Goa", Some(50)),
            Field::Landmark => {
                FormField::text(&draft.landmark, "e.g. Near the main beach road", Some(100))
            }
            Field::Category => FormField::select(
                CATEGORIES.iter().map(ToString::to_string).collect(),
                Some(draft.category.as_str()).filter(|c| !c.is_empty()),
            ),
            Field::ListingType => FormField::select(
                ListingType::all().iter().map(|t| t.label().to_string()).collect(),
                draft.listing_type.map(|t| t.label()),
            ),
            Field::Amenities => {
                FormField::text(&draft.amenities, "comma-separated, e.g. wifi, pool", None)
            }
            Field::Rent => FormField::text(&draft.rent, "monthly amount, e.g. 1200", Some(6)),
            Field::Guests => FormField::text(&draft.guests, "optional, e.g. 4", Some(2)),
            Field::Image(slot) => {
                let current = draft
                    .image(slot)
                    .map(|img| match img {
                        ImageRef::Url { url } => url.clone(),
                        ImageRef::Blob { path, .. } => path.display().to_string(),
                    })
                    .unwrap_or_default();
                FormField::text(&current, "file path or https:// URL", None)
            }
        }
    }

    pub fn focused_field(&self) -> Option<Field> {
        self.fields.get(self.focused).map(|(f, _)| *f)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focused = if self.focused == 0 {
                self.fields.len() - 1
            } else {
                self.focused - 1
            };
        }
    }

    /// Send a key to the focused widget. Returns the field it touched when
    /// the key was consumed.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<Field> {
        let (field, widget) = self.fields.get_mut(self.focused)?;
        widget.handle_key(key).then_some(*field)
    }

    /// Write one field's widget value into the draft store.
    pub fn sync_field(&self, field: Field, drafts: &mut DraftStore) {
        let Some((_, widget)) = self.fields.iter().find(|(f, _)| *f == field) else {
            return;
        };
        drafts.set_field(field, Self::field_value(field, widget));
    }

    /// Write every widget value into the draft store (called before any
    /// step navigation so the validator sees what is on screen).
    pub fn sync_all(&self, drafts: &mut DraftStore) {
        for (field, widget) in &self.fields {
            drafts.set_field(*field, Self::field_value(*field, widget));
        }
    }

    fn field_value(field: Field, widget: &FormField) -> FieldValue {
        let raw = widget.value();
        match field {
            Field::ListingType => {
                let choice = ListingType::all()
                    .iter()
                    .copied()
                    .find(|t| t.label() == raw);
                FieldValue::Choice(choice)
            }
            Field::Image(_) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    FieldValue::Image(None)
                } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
                    FieldValue::Image(Some(ImageRef::url(trimmed)))
                } else {
                    match ImageRef::from_path(trimmed) {
                        Ok(image) => FieldValue::Image(Some(image)),
                        Err(err) => {
                            // Unreadable path: leave the slot empty and let
                            // required-photo validation surface it.
                            tracing::debug!(path = trimmed, %err, "photo path not readable");
                            FieldValue::Image(None)
                        }
                    }
                }
            }
            _ => FieldValue::Text(raw),
        }
    }

    /// Render all fields stacked vertically with labels and inline errors.
    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        error_for: impl Fn(Field) -> Option<String>,
    ) {
        let mut y = area.y;
        for (i, (field, widget)) in self.fields.iter_mut().enumerate() {
            let focused = i == self.focused;
            if y >= area.bottom() {
                break;
            }

            let label_style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let label = Paragraph::new(Line::from(Span::styled(field.label(), label_style)));
            frame.render_widget(label, Rect::new(area.x, y, area.width, 1));
            y += 1;

            let height = widget.render_height().min(area.bottom().saturating_sub(y));
            if height == 0 {
                break;
            }
            widget.render(frame, Rect::new(area.x, y, area.width, height), focused);
            y += height;

            if let Some(message) = error_for(*field) {
                if y < area.bottom() {
                    let error = Paragraph::new(Line::from(Span::styled(
                        format!("  {message}"),
                        Style::default().fg(Color::Red),
                    )));
                    frame.render_widget(error, Rect::new(area.x, y, area.width, 1));
                    y += 1;
                }
            }
            y += 1; // spacer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ImageSlot;

    #[test]
    fn text_input_handles_chars() {
        let mut field = FormField::text("", "test", None);
        assert!(field.handle_key(KeyCode::Char('h')));
        assert!(field.handle_key(KeyCode::Char('i')));
        assert_eq!(field.value(), "hi");
    }

    #[test]
    fn text_input_respects_max_length() {
        let mut field = FormField::text("", "test", Some(3));
        for c in ['a', 'b', 'c', 'd'] {
            field.handle_key(KeyCode::Char(c));
        }
        assert_eq!(field.value(), "abc");
    }

    #[test]
    fn text_input_backspace_and_cursor() {
        let mut field = FormField::text("abc", "", None);
        field.handle_key(KeyCode::Backspace);
        assert_eq!(field.value(), "ab");
        field.handle_key(KeyCode::Home);
        field.handle_key(KeyCode::Delete);
        assert_eq!(field.value(), "b");
    }

    #[test]
    fn select_starts_unselected() {
        let field = FormField::select(vec!["For rent".to_string()], None);
        assert_eq!(field.value(), "");
    }

    #[test]
    fn select_navigation_picks_options() {
        let mut field = FormField::select(
            ListingType::all().iter().map(|t| t.label().to_string()).collect(),
            None,
        );
        field.handle_key(KeyCode::Down);
        assert_eq!(field.value(), "For rent");
        field.handle_key(KeyCode::Down);
        assert_eq!(field.value(), "For purchase");
        field.handle_key(KeyCode::Down); // clamped at last option
        assert_eq!(field.value(), "For purchase");
        field.handle_key(KeyCode::Up);
        assert_eq!(field.value(), "For rent");
    }

    #[test]
    fn form_seeds_from_draft_and_syncs_back() {
        let mut drafts = DraftStore::new();
        drafts.set_field(Field::Title, FieldValue::text("Cozy Cabin Retreat"));

        let mut form = StepForm::new(&[Field::Title, Field::ListingType], &drafts.snapshot());
        assert_eq!(form.focused_field(), Some(Field::Title));

        // Edit the title and pick a type, then sync.
        form.handle_key(KeyCode::Char('!'));
        form.next_field();
        form.handle_key(KeyCode::Down);
        form.sync_all(&mut drafts);

        let snap = drafts.snapshot();
        assert_eq!(snap.title, "Cozy Cabin Retreat!");
        assert_eq!(snap.listing_type, Some(ListingType::Rent));
    }

    #[test]
    fn form_focus_wraps_both_directions() {
        let drafts = DraftStore::new();
        let mut form = StepForm::new(&[Field::Title, Field::City], &drafts.snapshot());
        form.next_field();
        form.next_field();
        assert_eq!(form.focused_field(), Some(Field::Title));
        form.prev_field();
        assert_eq!(form.focused_field(), Some(Field::City));
    }

    #[test]
    fn image_url_syncs_as_url_ref() {
        let mut drafts = DraftStore::new();
        let mut form = StepForm::new(&[Field::Image(ImageSlot::First)], &drafts.snapshot());
        for c in "https://img.example/a.jpg".chars() {
            form.handle_key(KeyCode::Char(c));
        }
        form.sync_all(&mut drafts);
        assert_eq!(
            drafts.snapshot().image(ImageSlot::First),
            Some(&ImageRef::url("https://img.example/a.jpg"))
        );
    }

    #[test]
    fn unreadable_image_path_leaves_slot_empty() {
        let mut drafts = DraftStore::new();
        let mut form = StepForm::new(&[Field::Image(ImageSlot::First)], &drafts.snapshot());
        for c in "/no/such/file.png".chars() {
            form.handle_key(KeyCode::Char(c));
        }
        form.sync_all(&mut drafts);
        assert_eq!(drafts.snapshot().image(ImageSlot::First), None);
    }
}
