//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * Every screen is a two-row split: a main area on top and a one-line
//!   status bar at the bottom.
//! * Popups (the prompt dialog and the source selector) are drawn last, over
//!   a [`Clear`]ed rectangle.
//! * Colours and styles are defined inline.

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use headline_gate::biometric::GateDecision;
use headline_gate::source::{catalog, Article};
use headline_gate::timestamp;

use crate::app::{App, Screen};

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    match app.screen {
        Screen::Auth => draw_auth(app, frame, main_area),
        Screen::Headlines => draw_headlines(app, frame, main_area),
        Screen::Detail => draw_detail(app, frame, main_area),
    }
    draw_status_bar(app, frame, status_area);

    if app.screen == Screen::Auth {
        draw_prompt_dialog(app, frame, main_area);
    }
    if app.selector.is_some() {
        draw_selector(app, frame, main_area);
    }
}

/// `width` columns wide and `height` rows tall, centred in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn published_label(article: &Article) -> String {
    timestamp::parse(article.published_at.as_deref())
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "no date".into())
}

// ---------------------------------------------------------------------------
// Auth screen
// ---------------------------------------------------------------------------

fn draw_auth(app: &App, frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::styled(
            "Welcome To The TOP News App",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::styled(
            "[ Enter: Authenticate ]",
            Style::default().fg(Color::DarkGray).bg(Color::Gray),
        ),
    ];

    if let Some(outcome) = &app.last_outcome {
        if outcome.decision() == GateDecision::Block {
            lines.push(Line::raw(""));
            lines.push(Line::styled(outcome.to_string(), Style::default().fg(Color::Red)));
        }
    }

    let height = lines.len() as u16;
    let body = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(body, centered(inner, inner.width, height));
}

fn draw_prompt_dialog(app: &App, frame: &mut Frame, area: Rect) {
    let Some((request, failed_attempts)) = app.pending_prompt() else {
        return;
    };

    let mut lines = vec![Line::raw(request.description), Line::raw("")];
    if failed_attempts > 0 {
        lines.push(Line::styled(
            format!("Not recognised ({failed_attempts}). Try again."),
            Style::default().fg(Color::Red),
        ));
        lines.push(Line::raw(""));
    }
    lines.push(Line::styled(
        "y/Enter: accept   n: reject   Esc: cancel",
        Style::default().fg(Color::DarkGray),
    ));

    let popup = centered(area, area.width.min(54), lines.len() as u16 + 2);
    let dialog = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(format!(" {} ", request.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    frame.render_widget(Clear, popup);
    frame.render_widget(dialog, popup);
}

// ---------------------------------------------------------------------------
// Headline list
// ---------------------------------------------------------------------------

fn draw_headlines(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .items
        .iter()
        .map(|item| {
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<18}", published_label(item)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(item.title.as_str(), Style::default().fg(Color::White)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let mut title = vec![Span::styled(
        format!(" {} ▾ ", app.current_label()),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if matches!(&app.last_outcome, Some(o) if o.decision() == GateDecision::FallThrough) {
        title.push(Span::styled(" unauthenticated ", Style::default().fg(Color::Yellow)));
    }

    let list = List::new(list_items)
        .block(Block::default().title(Line::from(title)).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_selector(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(state) = app.selector.as_mut() else {
        return;
    };

    let items: Vec<ListItem> = catalog::SOURCES
        .iter()
        .map(|(label, _)| ListItem::new(*label))
        .collect();
    let popup = centered(area, area.width.min(32), catalog::SOURCES.len() as u16 + 2);
    let list = List::new(items)
        .block(Block::default().title(" Source ").borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan))
        .highlight_symbol("▸ ");

    frame.render_widget(Clear, popup);
    frame.render_stateful_widget(list, popup, state);
}

// ---------------------------------------------------------------------------
// Article detail
// ---------------------------------------------------------------------------

fn draw_detail(app: &App, frame: &mut Frame, area: Rect) {
    let Some(article) = app.selected_article() else {
        return;
    };

    let byline = [article.author.as_deref(), article.source_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" · ");

    let mut lines = vec![
        Line::styled(
            article.title.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            format!("{}  {byline}", published_label(article)),
            Style::default().fg(Color::DarkGray),
        ),
        Line::raw(""),
    ];
    for text in [&article.description, &article.content].into_iter().flatten() {
        lines.push(Line::raw(text.as_str()));
        lines.push(Line::raw(""));
    }
    for (name, link) in [("image", &article.image_url), ("link", &article.url)] {
        if let Some(link) = link {
            lines.push(Line::styled(
                format!("{name}: {link}"),
                Style::default().fg(Color::Cyan),
            ));
        }
    }

    let body = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" Article ").borders(Borders::ALL));
    frame.render_widget(body, area);
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let help = match app.screen {
        Screen::Auth => "  Enter: authenticate  q: quit",
        Screen::Headlines if app.selector.is_some() => "  ↑/↓: choose  Enter: select  Esc: close",
        Screen::Headlines => "  q: quit  ↑/↓: scroll  Enter: open  s: source",
        Screen::Detail => "  Esc: back  q: quit",
    };

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(app.status.as_str(), Style::default().fg(Color::Yellow)),
    ];
    if app.screen != Screen::Auth {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} items", app.items.len()),
            Style::default().fg(Color::Green),
        ));
    }
    spans.push(Span::raw(help));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
