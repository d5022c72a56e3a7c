//! Rendering: notification table, preview split, status line, overlays.

use super::app::{App, Overlay, Phase, SPINNER_FRAMES};
use crate::pipeline::filter::ALL_CAUGHT_UP;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    match app.phase {
        Phase::Previewing => {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[0]);
            draw_table(f, app, split[0]);
            draw_preview(f, app, split[1]);
        }
        _ => draw_table(f, app, chunks[0]),
    }

    draw_status(f, app, chunks[1]);

    match app.overlay {
        Overlay::Help => draw_help(f),
        Overlay::Comment => draw_comment(f, app),
        Overlay::None => {}
    }
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" notifications ");

    if app.filtered_indices.is_empty() {
        let text = if app.all_caught_up {
            ALL_CAUGHT_UP
        } else if app.rows.is_empty() {
            "Nothing to show"
        } else {
            "No match"
        };
        let para = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(para, area);
        return;
    }

    let header = Row::new(vec!["", "", "AGE", "REPO", "TYPE", "ID", "REASON", "TITLE"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .filtered_indices
        .iter()
        .map(|&idx| {
            let row = &app.rows[idx];
            let sel = if app.selected.contains(&idx) { "▌" } else { " " };
            let unread_style = if row.unread {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let title_style = if row.unread {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(vec![
                Cell::from(sel).style(Style::default().fg(Color::Yellow)),
                Cell::from(row.unread_marker()).style(unread_style),
                Cell::from(row.relative_time.clone()),
                Cell::from(row.repo_abbrev.clone()).style(Style::default().fg(Color::Cyan)),
                Cell::from(row.type_label()),
                Cell::from(row.display.clone()).style(Style::default().fg(Color::Magenta)),
                Cell::from(row.reason.clone()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(&row.title, 80)).style(title_style),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Length(24),
            Constraint::Length(11),
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(block);

    let mut state = TableState::default().with_selected(Some(app.cursor));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_preview(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" preview ");

    let Some(row) = app.cursor_row() else {
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(
                format!("{:<12}", label),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(value),
        ])
    };

    let lines = vec![
        field("Title", row.title.clone()),
        field("Repository", row.repo_full_name.clone()),
        field("Type", row.type_label().to_string()),
        field("Id", row.display.clone()),
        field("Reason", row.reason.clone()),
        field(
            "Updated",
            row.updated_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        ),
        field(
            "State",
            if row.unread { "unread" } else { "read" }.to_string(),
        ),
        field("Thread", row.thread_id.clone()),
        field("Web", row.browse_url()),
        field(
            "API",
            row.subject_url.clone().unwrap_or_else(|| "-".to_string()),
        ),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    f.render_widget(para, area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();

    if app.phase == Phase::Reloading {
        spans.push(Span::styled(
            format!(" {} reloading ", SPINNER_FRAMES[app.spinner_frame]),
            Style::default().fg(Color::Yellow),
        ));
    } else {
        spans.push(Span::raw(format!(
            " {}/{} ",
            app.filtered_indices.len(),
            app.rows.len()
        )));
    }

    if !app.selected.is_empty() {
        spans.push(Span::styled(
            format!("[{} selected] ", app.selected.len()),
            Style::default().fg(Color::Yellow),
        ));
    }

    if app.search_mode || !app.query.is_empty() {
        spans.push(Span::styled(
            format!("/{}", app.query),
            Style::default().fg(Color::Cyan),
        ));
        if app.search_mode {
            spans.push(Span::styled("█", Style::default().fg(Color::Cyan)));
        }
        spans.push(Span::raw(" "));
    }

    spans.push(Span::styled(
        "tab:select  m:read  d:done  o:open  c:comment  p:preview  r:reload  ?:help",
        Style::default().fg(Color::DarkGray),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(50, 60, f.area());
    f.render_widget(Clear, area);

    let bindings = [
        ("j / k", "move down / up"),
        ("g / G", "first / last row"),
        ("Tab", "toggle selection"),
        ("p", "toggle preview split"),
        ("/", "live query (fuzzy, client-side)"),
        ("m", "mark selection read"),
        ("d", "mark selection done"),
        ("o / Enter", "open in browser"),
        ("c", "comment and exit"),
        ("r", "reload from GitHub"),
        ("q / Esc", "quit"),
    ];

    let lines: Vec<Line> = bindings
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(
                    format!("  {:<10}", key),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(*desc),
            ])
        })
        .collect();

    let para = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" keys (Esc to close) "),
    );
    f.render_widget(para, area);
}

fn draw_comment(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 20, f.area());
    f.render_widget(Clear, area);

    let target = app
        .single_target()
        .map(|r| format!(" comment on {} {} ", r.repo_abbrev, r.display))
        .unwrap_or_else(|_| " comment ".to_string());

    let para = Paragraph::new(vec![
        Line::from(format!("{}█", app.comment_draft)),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: post and exit   Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).title(target));
    f.render_widget(para, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Truncate to a display width, appending an ellipsis when cut.
fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push('…');
    out
}
