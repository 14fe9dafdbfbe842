use ratatui::{prelude::*, widgets::Paragraph};

use super::TITLE;

pub fn render(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(Span::styled(title, Style::default().fg(Color::Red).bold())),
        Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] back to quizzes  ·  [Q] quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    render_centered(frame, area, content);
}

pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Yellow))),
        Line::from(""),
    ];

    render_centered(frame, area, content);
}

pub fn render_centered(frame: &mut Frame, area: Rect, content: Vec<Line>) {
    let height = u16::try_from(content.len()).unwrap_or(u16::MAX);
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(height),
        Constraint::Percentage(40),
    ])
    .split(area);

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}
