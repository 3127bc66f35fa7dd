//! The listing browser: the filtered, sorted view over the catalog that the
//! app lands on.

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::config::UiConfig;
use crate::listing::{Catalog, ListingQuery, SortOrder, CATEGORIES};

/// What the app should do after a keypress on the browser.
#[derive(Debug, PartialEq, Eq)]
pub enum BrowserAction {
    Continue,
    /// Open the creation wizard.
    NewListing,
    /// Ask for confirmation before deleting this listing id.
    DeleteRequested(String),
    Quit,
}

pub struct Browser {
    query: ListingQuery,
    sort: SortOrder,
    list_state: ListState,
    /// When set, keystrokes edit the city search instead of navigating.
    searching: bool,
    /// Index into [`CATEGORIES`] for the category filter; `None` is "all".
    category_index: Option<usize>,
    status: Option<String>,
}

impl Default for Browser {
    fn default() -> Self {
        Self::new()
    }
}

impl Browser {
    pub fn new() -> Self {
        Self {
            query: ListingQuery::default(),
            sort: SortOrder::default(),
            list_state: ListState::default(),
            searching: false,
            category_index: None,
            status: None,
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// The id of the listing under the cursor, in display order.
    pub fn selected_id(&self, catalog: &Catalog) -> Option<String> {
        let visible = catalog.list(&self.query, self.sort);
        let index = self.list_state.selected()?;
        visible.get(index).map(|l| l.id.clone())
    }

    fn clamp_selection(&mut self, catalog: &Catalog) {
        let count = catalog.list(&self.query, self.sort).len();
        match self.list_state.selected() {
            _ if count == 0 => self.list_state.select(None),
            None => self.list_state.select(Some(0)),
            Some(i) if i >= count => self.list_state.select(Some(count - 1)),
            Some(_) => {}
        }
    }

    fn move_selection(&mut self, catalog: &Catalog, delta: i64) {
        let count = catalog.list(&self.query, self.sort).len();
        if count == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as i64;
        let next = (current + delta).clamp(0, count as i64 - 1) as usize;
        self.list_state.select(Some(next));
    }

    fn cycle_category(&mut self) {
        self.category_index = match self.category_index {
            None => Some(0),
            Some(i) if i + 1 < CATEGORIES.len() => Some(i + 1),
            Some(_) => None,
        };
        self.query.category = self.category_index.map(|i| CATEGORIES[i].to_string());
    }

    fn handle_search_key(&mut self, key: KeyCode) {
        let city = self.query.city_contains.get_or_insert_with(String::new);
        match key {
            KeyCode::Char(c) => city.push(c),
            KeyCode::Backspace => {
                city.pop();
            }
            KeyCode::Enter => self.searching = false,
            KeyCode::Esc => {
                self.query.city_contains = None;
                self.searching = false;
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, catalog: &mut Catalog) -> BrowserAction {
        self.status = None;
        if self.searching {
            self.handle_search_key(key);
            self.clamp_selection(catalog);
            return BrowserAction::Continue;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => return BrowserAction::Quit,
            KeyCode::Char('n') => return BrowserAction::NewListing,
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id(catalog) {
                    return BrowserAction::DeleteRequested(id);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(catalog, -1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(catalog, 1),
            KeyCode::Char('s') => self.sort = self.sort.next(),
            KeyCode::Char('/') => {
                self.searching = true;
                self.query.city_contains.get_or_insert_with(String::new);
            }
            KeyCode::Char('c') => {
                self.cycle_category();
                self.clamp_selection(catalog);
            }
            KeyCode::Char('p') => {
                if let Some(id) = self.selected_id(catalog) {
                    let next = catalog
                        .get(&id)
                        .map(|l| l.status.next())
                        .unwrap_or_default();
                    if let Err(err) = catalog.set_status(&id, next) {
                        tracing::warn!(%err, %id, "status change failed");
                        self.status = Some(format!("Status change failed: {err}"));
                    }
                }
            }
            _ => {}
        }
        BrowserAction::Continue
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, catalog: &Catalog, ui: &UiConfig) {
        self.clamp_selection(catalog);
        let visible = catalog.list(&self.query, self.sort);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        // Filter/sort header.
        let mut header = vec![
            Span::styled("sort ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.sort.label(), Style::default().fg(Color::Cyan)),
        ];
        if let Some(category) = self.query.category.as_deref() {
            header.push(Span::styled("  category ", Style::default().fg(Color::DarkGray)));
            header.push(Span::styled(category, Style::default().fg(Color::Cyan)));
        }
        match self.query.city_contains.as_deref() {
            Some(city) if self.searching || !city.is_empty() => {
                header.push(Span::styled("  city ", Style::default().fg(Color::DarkGray)));
                let style = if self.searching {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Cyan)
                };
                header.push(Span::styled(city.to_string(), style));
                if self.searching {
                    header.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
                }
            }
            _ => {}
        }
        frame.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

        let items: Vec<ListItem> = visible
            .iter()
            .map(|listing| {
                let title = truncate(&listing.title, ui.title_max_length);
                let line = Line::from(vec![
                    Span::styled(
                        format!("{:<width$}", title, width = ui.title_max_length + 2),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("{:<12}", listing.category),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(
                        format!("{:<14}", listing.city),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::raw(format!("{}{:<8}", ui.currency, listing.rent)),
                    Span::styled(
                        listing.status.label(),
                        match listing.status {
                            crate::listing::ListingStatus::Active => {
                                Style::default().fg(Color::Green)
                            }
                            crate::listing::ListingStatus::Pending => {
                                Style::default().fg(Color::Yellow)
                            }
                            crate::listing::ListingStatus::Draft => {
                                Style::default().fg(Color::DarkGray)
                            }
                        },
                    ),
                ]);
                ListItem::new(line)
            })
            .collect();

        let title = format!(" Listings ({}) ", visible.len());
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, chunks[1], &mut self.list_state);

        let footer = match &self.status {
            Some(message) => Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Yellow),
            )),
            None => Line::from(Span::styled(
                "n new · d delete · p status · s sort · / search city · c category · q quit",
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(Paragraph::new(footer), chunks[2]);
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{
        sample_listing, CollectionStore, PersistedListing, StoreError,
    };

    struct MemStore(Vec<PersistedListing>);

    impl CollectionStore for MemStore {
        fn load(&self) -> Result<Vec<PersistedListing>, StoreError> {
            Ok(self.0.clone())
        }
        fn save(&self, _listings: &[PersistedListing]) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn catalog_with(n: usize) -> Catalog {
        let listings = (0..n)
            .map(|i| {
                let mut l = sample_listing();
                l.id = format!("id-{i}");
                l.title = format!("Listing {i}");
                l
            })
            .collect();
        Catalog::open(Box::new(MemStore(listings))).unwrap()
    }

    #[test]
    fn n_opens_the_wizard_and_q_quits() {
        let mut browser = Browser::new();
        let mut cat = catalog_with(0);
        assert_eq!(
            browser.handle_key(KeyCode::Char('n'), &mut cat),
            BrowserAction::NewListing
        );
        assert_eq!(browser.handle_key(KeyCode::Char('q'), &mut cat), BrowserAction::Quit);
    }

    #[test]
    fn delete_needs_a_selection() {
        let mut browser = Browser::new();
        let mut empty = catalog_with(0);
        assert_eq!(
            browser.handle_key(KeyCode::Char('d'), &mut empty),
            BrowserAction::Continue
        );

        let mut cat = catalog_with(2);
        browser.handle_key(KeyCode::Down, &mut cat);
        let action = browser.handle_key(KeyCode::Char('d'), &mut cat);
        assert!(matches!(action, BrowserAction::DeleteRequested(_)));
    }

    #[test]
    fn sort_key_cycles_orders() {
        let mut browser = Browser::new();
        let mut cat = catalog_with(1);
        assert_eq!(browser.sort, SortOrder::Newest);
        browser.handle_key(KeyCode::Char('s'), &mut cat);
        assert_eq!(browser.sort, SortOrder::Oldest);
    }

    #[test]
    fn search_mode_captures_keys_until_enter() {
        let mut browser = Browser::new();
        let mut cat = catalog_with(1);
        browser.handle_key(KeyCode::Char('/'), &mut cat);
        for c in "goa".chars() {
            browser.handle_key(KeyCode::Char(c), &mut cat);
        }
        // 'q' is text while searching, not quit.
        assert_eq!(
            browser.handle_key(KeyCode::Char('q'), &mut cat),
            BrowserAction::Continue
        );
        browser.handle_key(KeyCode::Backspace, &mut cat);
        browser.handle_key(KeyCode::Enter, &mut cat);
        assert_eq!(browser.query.city_contains.as_deref(), Some("goa"));
        assert_eq!(browser.handle_key(KeyCode::Char('q'), &mut cat), BrowserAction::Quit);
    }

    #[test]
    fn esc_clears_the_search() {
        let mut browser = Browser::new();
        let mut cat = catalog_with(1);
        browser.handle_key(KeyCode::Char('/'), &mut cat);
        browser.handle_key(KeyCode::Char('x'), &mut cat);
        browser.handle_key(KeyCode::Esc, &mut cat);
        assert_eq!(browser.query.city_contains, None);
    }

    #[test]
    fn category_filter_cycles_back_to_all() {
        let mut browser = Browser::new();
        let mut cat = catalog_with(1);
        for _ in 0..CATEGORIES.len() {
            browser.handle_key(KeyCode::Char('c'), &mut cat);
        }
        assert!(browser.query.category.is_some());
        browser.handle_key(KeyCode::Char('c'), &mut cat);
        assert_eq!(browser.query.category, None);
    }

    #[test]
    fn status_key_cycles_selected_listing() {
        let mut browser = Browser::new();
        let mut cat = catalog_with(1);
        browser.handle_key(KeyCode::Down, &mut cat);
        let id = browser.selected_id(&cat).unwrap();
        let before = cat.get(&id).unwrap().status;
        browser.handle_key(KeyCode::Char('p'), &mut cat);
        assert_eq!(cat.get(&id).unwrap().status, before.next());
    }

    #[test]
    fn selection_clamps_when_the_view_shrinks() {
        let mut browser = Browser::new();
        let mut cat = catalog_with(3);
        browser.handle_key(KeyCode::Down, &mut cat);
        browser.handle_key(KeyCode::Down, &mut cat);
        browser.handle_key(KeyCode::Down, &mut cat);
        assert_eq!(browser.list_state.selected(), Some(2));

        // A category filter nothing matches empties the view.
        browser.handle_key(KeyCode::Char('c'), &mut cat);
        browser.query.category = Some("Penthouse".to_string());
        browser.clamp_selection(&cat);
        assert_eq!(browser.list_state.selected(), None);
    }

    #[test]
    fn truncate_keeps_short_titles_intact() {
        assert_eq!(truncate("Cozy Cabin", 40), "Cozy Cabin");
        assert_eq!(truncate("abcdefgh", 5), "abcd…");
    }
}
