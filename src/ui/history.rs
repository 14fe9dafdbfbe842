//! Past attempts of the signed-in user.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::context::UserContext;

use super::{controls, truncate};

const NAME_WIDTH: usize = 40;

pub fn render(frame: &mut Frame, area: Rect, user: &UserContext, scroll: usize) {
    let chunks = Layout::vertical([
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let summary = match user.profile() {
        Some(profile) => format!(
            "{} points  ·  {} completed  ·  average {}",
            profile.points, profile.total_quizzes_completed, profile.average_score
        ),
        None => String::new(),
    };
    let header = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "HISTORY",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(summary, Style::default().fg(Color::Gray))),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(header, chunks[0]);

    let attempts = user.attempts();
    if attempts.is_empty() {
        let empty = Paragraph::new("No quizzes taken yet.")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray);
        frame.render_widget(empty, chunks[1]);
    } else {
        let lines: Vec<Line> = attempts
            .iter()
            .map(|attempt| {
                let (symbol, color) = if attempt.is_completed() {
                    ("+", Color::Green)
                } else {
                    ("-", Color::Yellow)
                };
                let when = attempt
                    .completed_at
                    .as_deref()
                    .and_then(|stamp| stamp.get(..10))
                    .unwrap_or("");

                Line::from(vec![
                    Span::styled(format!(" {symbol} "), Style::default().fg(color)),
                    Span::styled(
                        format!(
                            "{:<width$}",
                            truncate(&attempt.name, NAME_WIDTH),
                            width = NAME_WIDTH + 3
                        ),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(
                        format!("{:>4}%  ", attempt.score),
                        Style::default().fg(color),
                    ),
                    Span::styled(when, Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();

        let widget = Paragraph::new(lines)
            .block(Block::default().padding(Padding::horizontal(1)))
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
        frame.render_widget(widget, chunks[1]);
    }

    frame.render_widget(controls("j/k scroll  ·  enter back  ·  q quit"), chunks[2]);
}
