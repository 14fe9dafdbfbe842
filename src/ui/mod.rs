//! Screen rendering. Pure functions of the app state.

mod gifts;
mod history;
mod notice;
mod quiz;
mod result;
mod selection;

use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph},
};

use crate::app::Screen;
use crate::context::UserContext;

const TITLE: &str = "QUIZDESK";

pub fn render(frame: &mut Frame, screen: &Screen, user: &UserContext) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match screen {
        Screen::Selection {
            quizzes,
            selected,
            error,
        } => selection::render(frame, area, quizzes, *selected, error.as_deref(), user),
        Screen::Loading { message } => notice::render_loading(frame, area, message),
        Screen::Quiz { session, cursor } => quiz::render(frame, area, session, *cursor),
        Screen::Result { quiz_name, outcome } => result::render(frame, area, quiz_name, outcome),
        Screen::Notice { title, message } => notice::render(frame, area, title, message),
        Screen::History { scroll } => history::render(frame, area, user, *scroll),
        Screen::Gifts { scroll } => gifts::render(frame, area, user, *scroll),
    }
}

/// `A`, `B`, ... for the first 26 options, then plain numbers.
fn option_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

fn controls(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray)
}
