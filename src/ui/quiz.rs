use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::models::{MediaKind, Prompt, Question, QuestionKind};
use crate::session::{Phase, QuizSession, Selection};

use super::{controls, notice, option_label};

pub fn render(frame: &mut Frame, area: Rect, session: &QuizSession, cursor: usize) {
    if session.phase() != Phase::Presenting {
        notice::render_loading(frame, area, "Submitting answers...");
        return;
    }

    let question = session.current_question();
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], session);
    render_timer(frame, chunks[1], session.remaining(), session.question_seconds());
    render_prompt(frame, chunks[2], &question.content);
    render_options(frame, chunks[3], question, session.draft(), cursor);
    render_status(frame, chunks[4], session);

    let hint = control_hint(session.is_last_question(), session.can_go_back());
    frame.render_widget(controls(&hint), chunks[5]);
}

fn control_hint(is_last: bool, can_go_back: bool) -> String {
    let advance = if is_last { "enter complete" } else { "enter next" };
    let mut parts = vec!["j/k move", "space/1-9 choose", advance];
    if can_go_back {
        parts.push("p back");
    }
    parts.push("esc leave");
    parts.join("  ·  ")
}

fn render_progress(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let chunks = Layout::horizontal([Constraint::Fill(1), Constraint::Length(20)]).split(area);

    let title = Paragraph::new(session.quiz().name.as_str())
        .fg(Color::Cyan)
        .bold();
    frame.render_widget(title, chunks[0]);

    let progress = format!(
        "{}/{}",
        session.current_index() + 1,
        session.question_count()
    );
    let widget = Paragraph::new(progress)
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(widget, chunks[1]);
}

/// Red in the last ten seconds, yellow in the ten before.
fn timer_color(remaining: u32) -> Color {
    match remaining {
        0..=10 => Color::Red,
        11..=20 => Color::Yellow,
        _ => Color::Green,
    }
}

fn render_timer(frame: &mut Frame, area: Rect, remaining: u32, budget: u32) {
    let ratio = if budget == 0 {
        0.0
    } else {
        f64::from(remaining.min(budget)) / f64::from(budget)
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(timer_color(remaining)))
        .label(format!("{remaining}s"))
        .ratio(ratio);
    frame.render_widget(gauge, area);
}

fn render_prompt(frame: &mut Frame, area: Rect, prompt: &Prompt) {
    let mut lines = vec![Line::from(Span::styled(
        prompt.text.as_str(),
        Style::default().fg(Color::White).bold(),
    ))];

    if let Some(media) = &prompt.media {
        let tag = match prompt.kind {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
            MediaKind::Text => "media",
        };
        lines.push(Line::from(Span::styled(
            format!("[{tag}] {}", media.url),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    draft: &Selection,
    cursor: usize,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(question.option_count() * 2);

    for (index, option) in question.answers.iter().enumerate() {
        let is_chosen = draft.contains(index);
        let style = if is_chosen {
            Style::default().fg(Color::Green).bold()
        } else if index == cursor {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if index == cursor { ">" } else { " " };
        let check = match (question.kind, is_chosen) {
            (QuestionKind::Multi, true) => "[x] ",
            (QuestionKind::Multi, false) => "[ ] ",
            (QuestionKind::Single, true) => "(*) ",
            (QuestionKind::Single, false) => "( ) ",
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {marker} "), style),
            Span::styled(check, style),
            Span::styled(format!("{}. ", option_label(index)), style),
            Span::styled(option.content.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_status(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let (text, color) = if session.is_frozen(session.current_index()) {
        ("Time is up for this question. Answers are locked.", Color::Red)
    } else if session.current_question().kind == QuestionKind::Multi {
        ("Choose all that apply.", Color::DarkGray)
    } else if !session.can_advance() {
        ("Pick an answer to continue.", Color::DarkGray)
    } else {
        ("", Color::DarkGray)
    };

    frame.render_widget(Paragraph::new(text).fg(color), area);
}
