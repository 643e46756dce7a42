//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! Layout: the filtered item list on top, a detail pane for the selected
//! item below it, and a one-line status bar at the bottom.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::source::NewsItem;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [list_area, detail_area, status_area] = Layout::vertical([
        Constraint::Percentage(55),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_feed_list(app, frame, list_area);
    draw_detail(app, frame, detail_area);
    draw_status_bar(app, frame, status_area);
}

fn local_time(item: &NewsItem) -> String {
    item.published()
        .map(|d| d.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".into())
}

/// Render the filtered item list.
fn draw_feed_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .visible()
        .into_iter()
        .map(|item| {
            let mut spans = vec![
                Span::styled(format!("{:<6}", local_time(item)), Style::default().fg(Color::DarkGray)),
                Span::raw(" "),
                Span::styled(item.title.clone(), Style::default().fg(Color::White)),
            ];
            if !item.category.is_empty() {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    format!("[{}]", item.category),
                    Style::default().fg(Color::Cyan),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(" Today's news · {} · search: {:?} ", app.query.category, app.query.search);
    let list = List::new(list_items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the selected item's full text.
fn draw_detail(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Detail ").borders(Borders::ALL);

    let Some(item) = app.selected_item() else {
        let empty = if app.loading { "Loading…" } else { "No items today." };
        frame.render_widget(Paragraph::new(empty).block(block), area);
        return;
    };

    let lines = vec![
        Line::from(Span::styled(
            item.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(item.pub_date.clone(), Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(item.link.clone(), Style::default().fg(Color::Blue))),
        Line::raw(""),
        Line::raw(item.summary.clone()),
    ];
    let detail = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(detail, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let help = match app.mode {
        InputMode::Normal => "  q: quit  ↑/↓: scroll  c: category  /: search  r: refresh",
        InputMode::Search => "  type to search  Enter/Esc: done",
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(app.status.clone(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} shown", app.visible().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw(help),
    ]));
    frame.render_widget(status, area);
}
