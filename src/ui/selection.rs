//! Catalogue of active quizzes.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::context::UserContext;
use crate::models::QuizSummary;

use super::{TITLE, controls, truncate};

const NAME_WIDTH: usize = 48;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    quizzes: &[QuizSummary],
    selected: usize,
    error: Option<&str>,
    user: &UserContext,
) {
    let chunks = Layout::vertical([
        Constraint::Length(5),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], user);

    match error {
        Some(message) => render_error(frame, chunks[1], message),
        None if quizzes.is_empty() => {
            let empty = Paragraph::new("No active quizzes right now.")
                .alignment(Alignment::Center)
                .fg(Color::Yellow);
            frame.render_widget(empty, chunks[1]);
        }
        None => render_list(frame, chunks[1], quizzes, selected, user),
    }

    let hint = "j/k navigate  ·  enter start  ·  h history  ·  g rewards  ·  r refresh  ·  q quit";
    frame.render_widget(controls(hint), chunks[2]);
}

fn render_header(frame: &mut Frame, area: Rect, user: &UserContext) {
    let greeting = match (user.user_id(), user.profile()) {
        (_, Some(profile)) => Line::from(vec![
            Span::styled("Welcome, ", Style::default().fg(Color::White)),
            Span::styled(
                profile.name.as_str(),
                Style::default().fg(Color::Green).bold(),
            ),
            Span::styled(
                format!("  ·  {} points", profile.points),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        (Some(user_id), None) => Line::from(Span::styled(
            format!("Signed in as {user_id}"),
            Style::default().fg(Color::Gray),
        )),
        (None, None) => Line::from(Span::styled(
            "Not signed in: results will not be recorded",
            Style::default().fg(Color::Yellow),
        )),
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold())),
        greeting,
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Could not load quizzes",
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
    ];
    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), area);
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    quizzes: &[QuizSummary],
    selected: usize,
    user: &UserContext,
) {
    let attempts = user.profile();
    let lines: Vec<Line> = quizzes
        .iter()
        .enumerate()
        .map(|(index, quiz)| {
            let is_selected = index == selected;
            let style = if is_selected {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if is_selected { ">" } else { " " };

            let status = match attempts.and_then(|profile| profile.attempt_for(quiz.id)) {
                Some(attempt) => Span::styled(
                    format!("  done · {}%", attempt.score),
                    Style::default().fg(Color::Green),
                ),
                None => Span::styled(
                    format!("  {} questions", quiz.question_count()),
                    Style::default().fg(Color::DarkGray),
                ),
            };

            Line::from(vec![
                Span::styled(format!(" {marker} "), style),
                Span::styled(truncate(&quiz.name, NAME_WIDTH), style),
                status,
            ])
        })
        .collect();

    let visible = usize::from(area.height.saturating_sub(1)).max(1);
    let scroll = selected.saturating_sub(visible - 1);
    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(widget, area);
}
