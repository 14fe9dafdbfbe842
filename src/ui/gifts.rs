//! Reward wallet: earned gifts and their point totals.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::context::UserContext;
use crate::models::{Gift, GiftPoints};

use super::{controls, truncate};

const MESSAGE_WIDTH: usize = 48;

pub fn render(frame: &mut Frame, area: Rect, user: &UserContext, scroll: usize) {
    let chunks = Layout::vertical([
        Constraint::Length(5),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let points = user
        .profile()
        .map(|profile| profile.gift_points())
        .unwrap_or_default();
    render_totals(frame, chunks[0], points, user.gifts().len());

    if user.gifts().is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(Span::styled(
                "No rewards yet",
                Style::default().fg(Color::Gray).bold(),
            )),
            Line::from(Span::styled(
                "Complete a quiz to earn points.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(empty, chunks[1]);
    } else {
        let lines: Vec<Line> = user.gifts().iter().map(gift_line).collect();
        let widget = Paragraph::new(lines)
            .block(Block::default().padding(Padding::horizontal(1)))
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
        frame.render_widget(widget, chunks[1]);
    }

    frame.render_widget(controls("j/k scroll  ·  enter back  ·  q quit"), chunks[2]);
}

fn render_totals(frame: &mut Frame, area: Rect, points: GiftPoints, count: usize) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "REWARDS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(vec![
            Span::styled(
                format!("{} total", points.total),
                Style::default().fg(Color::White).bold(),
            ),
            Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{} available", points.available),
                Style::default().fg(Color::Green).bold(),
            ),
            Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{} used", points.used),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(Span::styled(
            format!("{count} rewards"),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn gift_line(gift: &Gift) -> Line<'_> {
    let (symbol, color) = if gift.is_used {
        ("x", Color::DarkGray)
    } else {
        ("*", Color::Green)
    };
    let text = if gift.message.is_empty() {
        &gift.description
    } else {
        &gift.message
    };
    let when = gift
        .created_at
        .as_deref()
        .and_then(|stamp| stamp.get(..10))
        .unwrap_or("");
    let status = if gift.is_used { "used  " } else { "" };

    Line::from(vec![
        Span::styled(format!(" {symbol} "), Style::default().fg(color)),
        Span::styled(
            format!("{:>+5} pts  ", gift.point),
            Style::default().fg(color).bold(),
        ),
        Span::styled(
            format!("{:<width$}", truncate(text, MESSAGE_WIDTH), width = MESSAGE_WIDTH + 3),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(status, Style::default().fg(Color::DarkGray)),
        Span::styled(when, Style::default().fg(Color::DarkGray)),
    ])
}
