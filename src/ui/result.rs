use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::models::SubmissionResult;
use crate::session::Outcome;

use super::{TITLE, controls, notice};

pub fn render(frame: &mut Frame, area: Rect, quiz_name: &str, outcome: &Outcome) {
    let Some(result) = outcome.result() else {
        let reason = match outcome {
            Outcome::Unavailable { reason } => reason.as_str(),
            _ => "",
        };
        notice::render(frame, area, "No result available", reason);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], quiz_name, result);
    render_details(frame, chunks[2], outcome, result);
    frame.render_widget(
        controls("enter back to quizzes  ·  h history  ·  g rewards  ·  q quit"),
        chunks[3],
    );
}

fn grade_color(percentage: u32) -> Color {
    match percentage {
        90.. => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, quiz_name: &str, result: &SubmissionResult) {
    let submission = &result.submission;
    let color = grade_color(submission.score);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold())),
        Line::from(Span::styled(quiz_name, Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} / {} correct  ({}%)",
                submission.correct_answers, submission.total_questions, submission.score
            ),
            Style::default().fg(color).bold(),
        )),
        Line::from(Span::styled(
            format!("Time spent: {}", format_duration(submission.time_spent)),
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

fn render_details(frame: &mut Frame, area: Rect, outcome: &Outcome, result: &SubmissionResult) {
    let mut lines = Vec::new();

    match outcome {
        Outcome::PriorAttempt(_) => lines.push(Line::from(Span::styled(
            "You already took this quiz. Showing your earlier result.",
            Style::default().fg(Color::Yellow),
        ))),
        Outcome::LocalFallback(_) => lines.push(Line::from(Span::styled(
            "You already took this quiz. This summary was computed locally and is not verified.",
            Style::default().fg(Color::Yellow),
        ))),
        _ => {}
    }

    if let Some(reward) = &result.reward {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Reward: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("+{} points", reward.points),
                Style::default().fg(Color::Green).bold(),
            ),
            Span::styled(
                format!("  ({})", reward.level),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        if !reward.message.is_empty() {
            lines.push(Line::from(Span::styled(
                reward.message.as_str(),
                Style::default().fg(Color::White),
            )));
        }
    }

    if let Some(stats) = &result.user_stats {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "Total points: {}  ·  Quizzes completed: {}  ·  Average score: {}",
                stats.total_points, stats.total_quizzes_completed, stats.average_score
            ),
            Style::default().fg(Color::Gray),
        )));
    }

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().padding(Padding::horizontal(1)));
    frame.render_widget(widget, area);
}

fn format_duration(seconds: u32) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else {
        format!("{}m {:02}s", seconds / 60, seconds % 60)
    }
}
