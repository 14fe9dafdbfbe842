//! Screen flow and the event loop.
//!
//! Everything runs on one task: keyboard events and the one-second ticker
//! are multiplexed with `tokio::select!`, and backend calls are awaited in
//! between, so no input is processed while a load or submission is in
//! flight.

use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use futures_util::StreamExt;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::QuizError;
use crate::api::Backend;
use crate::context::UserContext;
use crate::models::QuizSummary;
use crate::session::{Outcome, QuizSession, SessionOptions, Transition};
use crate::terminal::AppTerminal;
use crate::ui;

pub enum Screen {
    /// Catalogue of active quizzes.
    Selection {
        quizzes: Vec<QuizSummary>,
        selected: usize,
        error: Option<String>,
    },
    Loading {
        message: String,
    },
    Quiz {
        session: QuizSession,
        /// Highlighted option, independent of what is selected.
        cursor: usize,
    },
    Result {
        quiz_name: String,
        outcome: Outcome,
    },
    /// A dead end with a way back, e.g. "quiz not found".
    Notice {
        title: String,
        message: String,
    },
    History {
        scroll: usize,
    },
    /// Reward wallet of the signed-in user.
    Gifts {
        scroll: usize,
    },
}

/// Backend work queued by input, performed between events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Catalog,
    Open(u64),
    Submit,
    History,
    Gifts,
}

pub struct App<B> {
    backend: B,
    user: UserContext,
    options: SessionOptions,
    screen: Screen,
    pending: Option<Pending>,
    should_quit: bool,
}

impl<B: Backend> App<B> {
    /// Start on the quiz catalogue.
    pub fn new(backend: B, user: UserContext, options: SessionOptions) -> Self {
        Self {
            backend,
            user,
            options,
            screen: Screen::Loading {
                message: "Loading quizzes...".to_string(),
            },
            pending: Some(Pending::Catalog),
            should_quit: false,
        }
    }

    /// Skip the catalogue and open a quiz directly.
    pub fn open_quiz(&mut self, quiz_id: u64) {
        self.screen = Screen::Loading {
            message: format!("Loading quiz {quiz_id}..."),
        };
        self.pending = Some(Pending::Open(quiz_id));
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn run(&mut self, terminal: &mut AppTerminal) -> io::Result<()> {
        let mut events = EventStream::new();
        let mut ticker = time::interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, &self.screen, &self.user))?;

            if self.process_pending().await {
                // A fresh question gets a full first second
                ticker.reset();
                continue;
            }

            tokio::select! {
                _ = ticker.tick() => self.on_tick(),
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.on_key(key.code);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err),
                    None => break,
                },
            }
        }

        Ok(())
    }

    /// Perform queued backend work. Returns `true` if anything ran.
    pub async fn process_pending(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        match pending {
            Pending::Catalog => self.load_catalog().await,
            Pending::Open(quiz_id) => self.load_quiz(quiz_id).await,
            Pending::Submit => self.submit().await,
            Pending::History => self.load_history().await,
            Pending::Gifts => self.load_gifts().await,
        }
        true
    }

    async fn refresh_user(&mut self) {
        if let Err(err) = self.user.refresh(&self.backend).await {
            warn!(error = %err, "profile refresh failed");
        }
    }

    async fn load_catalog(&mut self) {
        self.refresh_user().await;

        self.screen = match self.backend.list_active().await {
            Ok(quizzes) => Screen::Selection {
                quizzes,
                selected: 0,
                error: None,
            },
            Err(err) => {
                warn!(error = %err, "failed to list quizzes");
                Screen::Selection {
                    quizzes: Vec::new(),
                    selected: 0,
                    error: Some(err.to_string()),
                }
            }
        };
    }

    async fn load_quiz(&mut self, quiz_id: u64) {
        self.screen = match QuizSession::start(&self.backend, quiz_id, self.options).await {
            Ok(session) => Screen::Quiz { session, cursor: 0 },
            Err(err) => {
                warn!(quiz_id, error = %err, "quiz unavailable");
                let title = match &err {
                    QuizError::EmptyQuiz(_) => "Invalid quiz",
                    err if err.is_not_found() => "Quiz not found",
                    _ => "Could not load quiz",
                };
                Screen::Notice {
                    title: title.to_string(),
                    message: err.to_string(),
                }
            }
        };
    }

    async fn submit(&mut self) {
        let Screen::Quiz { session, .. } = &mut self.screen else {
            return;
        };

        let quiz_name = session.quiz().name.clone();
        let Some(outcome) = session.submit(&self.backend, &self.user).await else {
            return;
        };

        info!(verified = outcome.is_verified(), "results ready");
        self.screen = Screen::Result { quiz_name, outcome };
        self.refresh_user().await;
    }

    async fn load_history(&mut self) {
        self.screen = match self.user.refresh(&self.backend).await {
            Ok(()) if self.user.is_signed_in() => Screen::History { scroll: 0 },
            Ok(()) => Screen::Notice {
                title: "No history".to_string(),
                message: "Sign in to see past attempts.".to_string(),
            },
            Err(err) => Screen::Notice {
                title: "Could not load history".to_string(),
                message: err.to_string(),
            },
        };
    }

    async fn load_gifts(&mut self) {
        self.screen = match self.user.refresh(&self.backend).await {
            Ok(()) if self.user.is_signed_in() => Screen::Gifts { scroll: 0 },
            Ok(()) => Screen::Notice {
                title: "No rewards".to_string(),
                message: "Sign in to see your rewards.".to_string(),
            },
            Err(err) => Screen::Notice {
                title: "Could not load rewards".to_string(),
                message: err.to_string(),
            },
        };
    }

    pub fn on_tick(&mut self) {
        if let Screen::Quiz { session, cursor } = &mut self.screen {
            let transition = session.tick();
            if let Some(pending) = after_transition(transition, cursor) {
                self.pending = Some(pending);
            }
        }
    }

    pub fn on_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q')) {
            self.should_quit = true;
            return;
        }

        match &mut self.screen {
            Screen::Selection {
                quizzes, selected, ..
            } => match key {
                KeyCode::Up | KeyCode::Char('k') => {
                    *selected = selected.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if *selected + 1 < quizzes.len() {
                        *selected += 1;
                    }
                }
                KeyCode::Enter => {
                    if let Some(quiz) = quizzes.get(*selected) {
                        let quiz_id = quiz.id;
                        self.open_quiz(quiz_id);
                    }
                }
                KeyCode::Char('h') => self.pending = Some(Pending::History),
                KeyCode::Char('g') => self.pending = Some(Pending::Gifts),
                KeyCode::Char('r') => self.pending = Some(Pending::Catalog),
                KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
            Screen::Quiz { session, cursor } => {
                let option_count = session.current_question().option_count().max(1);
                let transition = match key {
                    KeyCode::Up | KeyCode::Char('k') => {
                        *cursor = (*cursor + option_count - 1) % option_count;
                        None
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        *cursor = (*cursor + 1) % option_count;
                        None
                    }
                    KeyCode::Char(' ') => Some(session.select(*cursor)),
                    KeyCode::Char(c @ '1'..='9') => {
                        let option = c as usize - '1' as usize;
                        if option < option_count {
                            *cursor = option;
                        }
                        Some(session.select(option))
                    }
                    KeyCode::Enter | KeyCode::Right | KeyCode::Char('n') => Some(session.next()),
                    KeyCode::Left | KeyCode::Char('p') => Some(session.previous()),
                    KeyCode::Esc => {
                        info!(session_id = %session.id(), "session abandoned");
                        self.pending = Some(Pending::Catalog);
                        None
                    }
                    _ => None,
                };

                if let Some(pending) = transition.and_then(|t| after_transition(t, cursor)) {
                    self.pending = Some(pending);
                }
            }
            Screen::Result { .. } => match key {
                KeyCode::Enter | KeyCode::Esc => self.pending = Some(Pending::Catalog),
                KeyCode::Char('h') => self.pending = Some(Pending::History),
                KeyCode::Char('g') => self.pending = Some(Pending::Gifts),
                _ => {}
            },
            Screen::Notice { .. } => {
                if matches!(key, KeyCode::Enter | KeyCode::Esc) {
                    self.pending = Some(Pending::Catalog);
                }
            }
            Screen::History { scroll } => match key {
                KeyCode::Down | KeyCode::Char('j') => {
                    let max_scroll = self.user.attempts().len().saturating_sub(1);
                    *scroll = (*scroll + 1).min(max_scroll);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    *scroll = scroll.saturating_sub(1);
                }
                KeyCode::Enter | KeyCode::Esc => self.pending = Some(Pending::Catalog),
                _ => {}
            },
            Screen::Gifts { scroll } => match key {
                KeyCode::Down | KeyCode::Char('j') => {
                    let max_scroll = self.user.gifts().len().saturating_sub(1);
                    *scroll = (*scroll + 1).min(max_scroll);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    *scroll = scroll.saturating_sub(1);
                }
                KeyCode::Enter | KeyCode::Esc => self.pending = Some(Pending::Catalog),
                _ => {}
            },
            Screen::Loading { .. } => {}
        }
    }
}

/// Reset the cursor on a move; queue the submission on completion.
fn after_transition(transition: Transition, cursor: &mut usize) -> Option<Pending> {
    match transition {
        Transition::Moved { .. } => {
            *cursor = 0;
            None
        }
        Transition::Completed { .. } => Some(Pending::Submit),
        Transition::Stayed | Transition::Rejected(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::api::file::FileBackend;
    use crate::session::Phase;

    fn write_quiz(dir: &Path) {
        let quiz = serde_json::json!({
            "id": 3,
            "name": "Two steps",
            "rewards": {
                "top": {"level": "top", "points": 25, "message": "All right", "minScore": 100}
            },
            "questions": [
                {"id": 1, "type": "single", "content": {"text": "First"},
                 "answers": [{"content": "Right", "isCorrect": true}, {"content": "Wrong"}]},
                {"id": 2, "type": "multi", "content": {"text": "Second"},
                 "answers": [{"content": "X", "isCorrect": true}, {"content": "Y"}, {"content": "Z", "isCorrect": true}]}
            ]
        });
        std::fs::write(dir.join("3.json"), quiz.to_string()).unwrap();
        std::fs::write(
            dir.join("4.json"),
            r#"{"id": 4, "name": "Empty", "questions": []}"#,
        )
        .unwrap();
    }

    fn app(dir: &Path) -> App<FileBackend> {
        App::new(
            FileBackend::new(dir),
            UserContext::new(Some("tester".into())),
            SessionOptions::default(),
        )
    }

    #[tokio::test]
    async fn full_flow_reaches_scored_result() {
        let dir = tempfile::tempdir().unwrap();
        write_quiz(dir.path());
        let mut app = app(dir.path());

        assert!(app.process_pending().await);
        let Screen::Selection { quizzes, .. } = app.screen() else {
            panic!("expected selection screen");
        };
        assert_eq!(quizzes.len(), 2);

        app.on_key(KeyCode::Enter);
        app.process_pending().await;
        assert!(matches!(app.screen(), Screen::Quiz { .. }));

        // Next is refused until a single-choice option is picked
        app.on_key(KeyCode::Enter);
        let Screen::Quiz { session, .. } = app.screen() else {
            panic!("expected quiz screen");
        };
        assert_eq!(session.current_index(), 0);

        app.on_key(KeyCode::Char('1'));
        app.on_key(KeyCode::Enter);
        app.on_key(KeyCode::Char(' '));
        app.on_key(KeyCode::Down);
        app.on_key(KeyCode::Down);
        app.on_key(KeyCode::Char(' '));
        app.on_key(KeyCode::Enter);

        let Screen::Quiz { session, .. } = app.screen() else {
            panic!("expected quiz screen while submitting");
        };
        assert_eq!(session.phase(), Phase::Submitting);

        // Input is ignored while the submission is pending
        app.on_key(KeyCode::Left);

        assert!(app.process_pending().await);
        let Screen::Result { outcome, .. } = app.screen() else {
            panic!("expected result screen");
        };
        let result = outcome.result().unwrap();
        assert!(outcome.is_verified());
        assert_eq!(result.submission.correct_answers, 2);
        assert_eq!(app.user().attempts().len(), 1);

        app.on_key(KeyCode::Char('g'));
        assert!(app.process_pending().await);
        assert!(matches!(app.screen(), Screen::Gifts { scroll: 0 }));
        let points = app.user().profile().unwrap().gift_points();
        assert_eq!(points.total, 25);
        assert_eq!(points.available, 25);
    }

    #[tokio::test]
    async fn gifts_need_a_user() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(
            FileBackend::new(dir.path()),
            UserContext::anonymous(),
            SessionOptions::default(),
        );
        app.process_pending().await;

        app.on_key(KeyCode::Char('g'));
        app.process_pending().await;
        assert!(matches!(app.screen(), Screen::Notice { title, .. } if title == "No rewards"));
    }

    #[tokio::test]
    async fn missing_quiz_shows_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());

        app.open_quiz(77);
        app.process_pending().await;
        let Screen::Notice { title, .. } = app.screen() else {
            panic!("expected notice");
        };
        assert_eq!(title, "Quiz not found");

        app.on_key(KeyCode::Esc);
        assert!(app.process_pending().await);
        assert!(matches!(app.screen(), Screen::Selection { .. }));
    }

    #[tokio::test]
    async fn empty_quiz_shows_invalid_notice() {
        let dir = tempfile::tempdir().unwrap();
        write_quiz(dir.path());
        let mut app = app(dir.path());

        app.open_quiz(4);
        app.process_pending().await;
        assert!(matches!(app.screen(), Screen::Notice { title, .. } if title == "Invalid quiz"));
    }

    #[tokio::test]
    async fn ticks_expire_questions() {
        let dir = tempfile::tempdir().unwrap();
        write_quiz(dir.path());
        let mut app = app(dir.path());

        app.open_quiz(3);
        app.process_pending().await;
        for _ in 0..60 {
            app.on_tick();
        }

        app.process_pending().await;
        let Screen::Result { outcome, .. } = app.screen() else {
            panic!("expected result screen");
        };
        assert_eq!(outcome.result().unwrap().submission.correct_answers, 0);
        assert_eq!(outcome.result().unwrap().submission.time_spent, 60);
    }

    #[test]
    fn quit_key_works_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.on_key(KeyCode::Char('q'));
        assert!(app.should_quit());
    }
}
