use ratatui::widgets::ListState;

use crate::notify::NotificationRequest;
use crate::poll::PollMsg;
use crate::query::QueryState;
use crate::source::NewsItem;

/// What key presses currently do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typed characters go into the search query.
    Search,
}

pub struct App {
    /// Today's items from the latest refresh, newest first.
    pub items: Vec<NewsItem>,
    /// Category and search filters applied on screen.
    pub query: QueryState,
    /// Selection within the *filtered* list.
    pub list_state: ListState,
    pub mode: InputMode,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Whether a refresh is in flight.
    pub loading: bool,
    /// Last poll status message.
    pub status: String,
    /// Most recent notification, shown until the next one replaces it.
    pub last_notification: Option<NotificationRequest>,
}

impl App {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            query: QueryState::default(),
            list_state: ListState::default(),
            mode: InputMode::Normal,
            quit: false,
            loading: false,
            status: "Starting…".into(),
            last_notification: None,
        }
    }

    /// Apply one message from the poller.
    pub fn handle_poll_msg(&mut self, msg: PollMsg) {
        match msg {
            PollMsg::Refreshing => {
                self.loading = true;
                self.status = "Refreshing…".into();
            }
            PollMsg::Items(items) => {
                self.status = format!("{} items today", items.len());
                self.set_items(items);
            }
            PollMsg::Notified(request) => {
                self.status = format!("🔔 {}", request.title);
                self.last_notification = Some(request);
            }
            PollMsg::Error(e) => {
                self.status = format!("Error: {e}");
            }
        }
    }

    /// Replace the list wholesale.  Filters reset, as a fresh result may not
    /// contain the previously selected category.
    pub fn set_items(&mut self, items: Vec<NewsItem>) {
        self.items = items;
        self.loading = false;
        self.query.reset();
        self.mode = InputMode::Normal;
        self.reset_selection();
    }

    /// Items passing the current filters.
    pub fn visible(&self) -> Vec<&NewsItem> {
        self.query.apply(&self.items)
    }

    pub fn selected_item(&self) -> Option<&NewsItem> {
        let index = self.list_state.selected()?;
        self.visible().get(index).copied()
    }

    fn reset_selection(&mut self) {
        let selected = if self.visible().is_empty() { None } else { Some(0) };
        self.list_state.select(selected);
    }

    // -- filters -------------------------------------------------------------

    pub fn cycle_category(&mut self) {
        self.query.cycle_category(&self.items);
        self.reset_selection();
    }

    pub fn start_search(&mut self) {
        self.mode = InputMode::Search;
    }

    pub fn finish_search(&mut self) {
        self.mode = InputMode::Normal;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.query.search.push(c);
        self.reset_selection();
    }

    pub fn pop_search_char(&mut self) {
        self.query.search.pop();
        self.reset_selection();
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.visible().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.visible().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }
}
