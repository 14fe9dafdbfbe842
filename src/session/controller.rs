//! Navigation and submission controller for a quiz-taking session.
//!
//! A session owns the answer record, the frozen remaining times and the
//! current index. Timer ticks, option selection and next/previous requests
//! all go through [`QuizSession`]; each call runs to completion before the
//! next one, so a transition always commits a final snapshot of the draft
//! selection before the index moves.

use tracing::{debug, info};
use uuid::Uuid;

use crate::QuizError;
use crate::api::{QuizLoader, SubmissionSink};
use crate::context::UserContext;
use crate::models::{Question, QuestionKind, Quiz, SubmissionRequest, SubmittedAnswer};

use super::answers::{AnswerRecord, QuestionElapsed, Selection};
use super::outcome::{self, Outcome};
use super::timer::{Countdown, DEFAULT_QUESTION_SECONDS, Tick};

/// Knobs applied when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub question_seconds: u32,
    pub shuffle_answers: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            question_seconds: DEFAULT_QUESTION_SECONDS,
            shuffle_answers: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A question is on screen and accepts input.
    Presenting,
    /// Waiting on the submission sink. All input is ignored.
    Submitting,
    /// The submission settled.
    Finished,
}

/// Why a request left the session unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotPresenting,
    /// The active question's timer ran out.
    FrozenQuestion,
    NoSuchOption,
    /// A single-choice question needs a choice before moving on.
    NothingSelected,
    AtFirstQuestion,
    /// The previous question's timer ran out, it cannot be revisited.
    PreviousFrozen,
    /// An expiry for a question that is no longer active, or already handled.
    StaleExpiry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Input accepted, still on the same question.
    Stayed,
    Moved { from: usize, to: usize },
    /// The last question was left; a submission is pending.
    Completed { elapsed_seconds: u32 },
    Rejected(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Manual,
    Expiry,
}

/// Everything needed to submit a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub session_id: Uuid,
    pub quiz_id: u64,
    pub total_questions: usize,
    pub elapsed_seconds: u32,
    pub record: AnswerRecord,
    pub answers: Vec<SubmittedAnswer>,
}

impl Submission {
    pub fn to_request(&self, user_id: &str) -> SubmissionRequest {
        SubmissionRequest {
            user_id: user_id.to_string(),
            quiz_id: self.quiz_id,
            time_spent: self.elapsed_seconds,
            answers: self.answers.clone(),
        }
    }

    /// Questions committed with a real choice.
    pub fn answered_count(&self) -> usize {
        self.record.answered_count()
    }
}

pub struct QuizSession {
    id: Uuid,
    quiz: Quiz,
    index: usize,
    countdown: Countdown,
    draft: Selection,
    answers: AnswerRecord,
    elapsed: QuestionElapsed,
    phase: Phase,
    completed: bool,
    pending: Option<Submission>,
}

impl QuizSession {
    /// Load a quiz and start presenting its first question.
    ///
    /// A load failure or an empty quiz never yields a session.
    pub async fn start(
        loader: &dyn QuizLoader,
        quiz_id: u64,
        options: SessionOptions,
    ) -> Result<Self, QuizError> {
        let quiz = loader.load_quiz(quiz_id).await?;
        Self::new(quiz, options)
    }

    pub fn new(mut quiz: Quiz, options: SessionOptions) -> Result<Self, QuizError> {
        let Some(first_kind) = quiz.questions.first().map(|q| q.kind) else {
            return Err(QuizError::EmptyQuiz(quiz.id));
        };

        if options.shuffle_answers {
            quiz.shuffle_answers(&mut rand::thread_rng());
        }

        let question_count = quiz.question_count();
        let mut session = Self {
            id: Uuid::new_v4(),
            quiz,
            index: 0,
            countdown: Countdown::new(options.question_seconds),
            draft: Selection::empty(first_kind),
            answers: AnswerRecord::default(),
            elapsed: QuestionElapsed::new(question_count),
            phase: Phase::Presenting,
            completed: false,
            pending: None,
        };
        session.enter(0);

        info!(
            session_id = %session.id,
            quiz_id = session.quiz.id,
            questions = question_count,
            "session started"
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn question_count(&self) -> usize {
        self.quiz.question_count()
    }

    pub fn current_question(&self) -> &Question {
        &self.quiz.questions[self.index]
    }

    pub fn is_last_question(&self) -> bool {
        self.index + 1 == self.question_count()
    }

    /// Live countdown value of the active question.
    pub fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn question_seconds(&self) -> u32 {
        self.countdown.budget()
    }

    /// In-progress selection of the active question.
    pub fn draft(&self) -> &Selection {
        &self.draft
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    pub fn elapsed(&self) -> &QuestionElapsed {
        &self.elapsed
    }

    pub fn is_frozen(&self, index: usize) -> bool {
        self.elapsed.is_frozen(index)
    }

    pub fn can_go_back(&self) -> bool {
        self.phase == Phase::Presenting && self.index > 0 && !self.is_frozen(self.index - 1)
    }

    pub fn can_advance(&self) -> bool {
        self.phase == Phase::Presenting
            && (self.is_frozen(self.index)
                || self.current_question().kind == QuestionKind::Multi
                || self.draft.is_answered())
    }

    /// Seconds spent so far, counting the live countdown of the active
    /// question.
    pub fn elapsed_seconds(&self) -> u32 {
        let mut snapshot = self.elapsed.clone();
        if self.phase == Phase::Presenting && !self.is_frozen(self.index) {
            snapshot.record(self.index, self.countdown.remaining());
        }
        snapshot.total_spent(self.countdown.budget())
    }

    /// Choose (single) or toggle (multi) an option of the active question.
    pub fn select(&mut self, option: usize) -> Transition {
        if self.phase != Phase::Presenting {
            return Transition::Rejected(Rejection::NotPresenting);
        }
        if self.is_frozen(self.index) {
            return Transition::Rejected(Rejection::FrozenQuestion);
        }
        if option >= self.current_question().option_count() {
            return Transition::Rejected(Rejection::NoSuchOption);
        }

        self.draft.choose(option);
        Transition::Stayed
    }

    /// "Next", or "Complete" on the last question.
    pub fn next(&mut self) -> Transition {
        if self.phase != Phase::Presenting {
            return Transition::Rejected(Rejection::NotPresenting);
        }
        if !self.can_advance() {
            return Transition::Rejected(Rejection::NothingSelected);
        }

        self.leave(Trigger::Manual)
    }

    /// "Previous". Refused on the first question and when the previous
    /// question is frozen.
    pub fn previous(&mut self) -> Transition {
        if self.phase != Phase::Presenting {
            return Transition::Rejected(Rejection::NotPresenting);
        }
        if self.index == 0 {
            return Transition::Rejected(Rejection::AtFirstQuestion);
        }
        if self.is_frozen(self.index - 1) {
            return Transition::Rejected(Rejection::PreviousFrozen);
        }

        let from = self.index;
        self.freeze_current(Trigger::Manual);
        self.enter(from - 1);
        debug!(session_id = %self.id, from, to = self.index, "moved back");
        Transition::Moved {
            from,
            to: self.index,
        }
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Transition {
        if self.phase != Phase::Presenting {
            return Transition::Stayed;
        }

        match self.countdown.tick() {
            Tick::Expired => {
                debug!(session_id = %self.id, index = self.index, "time up");
                self.leave(Trigger::Expiry)
            }
            Tick::Running(_) | Tick::Idle => Transition::Stayed,
        }
    }

    /// An expiry signal raised outside [`tick`](Self::tick) for question
    /// `index`. The first expiry per question entry wins; later ones, or
    /// ones for a question that is no longer active, are no-ops.
    pub fn time_up(&mut self, index: usize) -> Transition {
        if self.phase != Phase::Presenting || index != self.index {
            return Transition::Rejected(Rejection::StaleExpiry);
        }

        self.countdown.stop();
        if !self.countdown.claim_expiry() {
            return Transition::Rejected(Rejection::StaleExpiry);
        }

        debug!(session_id = %self.id, index, "time up");
        self.leave(Trigger::Expiry)
    }

    /// Hand out the pending submission. Yields it at most once.
    pub fn take_submission(&mut self) -> Option<Submission> {
        self.pending.take()
    }

    /// Submit the pending answer set and settle the outcome.
    ///
    /// Returns `None` when there is nothing to submit, either because the
    /// session has not completed or because it was already submitted.
    pub async fn submit(
        &mut self,
        sink: &dyn SubmissionSink,
        user: &UserContext,
    ) -> Option<Outcome> {
        let submission = self.take_submission()?;
        let outcome = outcome::settle(sink, user, &submission).await;
        self.phase = Phase::Finished;
        Some(outcome)
    }

    fn enter(&mut self, index: usize) {
        self.index = index;
        self.countdown.enter(self.elapsed.get(index));

        let kind = self.quiz.questions[index].kind;
        self.draft = self
            .answers
            .get(index)
            .cloned()
            .unwrap_or_else(|| Selection::empty(kind));
    }

    /// Stop the countdown and commit remaining time and selection for the
    /// active question. Frozen questions keep what they had.
    fn freeze_current(&mut self, trigger: Trigger) {
        let live = self.countdown.stop();
        if self.is_frozen(self.index) {
            return;
        }

        let remaining = match trigger {
            Trigger::Manual => live,
            Trigger::Expiry => 0,
        };
        self.elapsed.record(self.index, remaining);
        self.answers.commit(self.index, self.draft.clone());
    }

    fn leave(&mut self, trigger: Trigger) -> Transition {
        let from = self.index;
        self.freeze_current(trigger);

        if from + 1 < self.question_count() {
            self.enter(from + 1);
            debug!(session_id = %self.id, from, to = self.index, ?trigger, "moved forward");
            Transition::Moved {
                from,
                to: self.index,
            }
        } else {
            self.complete()
        }
    }

    fn complete(&mut self) -> Transition {
        if self.completed {
            return Transition::Rejected(Rejection::NotPresenting);
        }
        self.completed = true;
        self.phase = Phase::Submitting;

        let elapsed_seconds = self.elapsed.total_spent(self.countdown.budget());
        let answers = self
            .answers
            .iter()
            .filter_map(|(index, selection)| {
                let question = self.quiz.question(index)?;
                Some(SubmittedAnswer {
                    question_id: question.id,
                    answers: selection.texts(question),
                })
            })
            .collect();

        self.pending = Some(Submission {
            session_id: self.id,
            quiz_id: self.quiz.id,
            total_questions: self.question_count(),
            elapsed_seconds,
            record: self.answers.clone(),
            answers,
        });

        info!(
            session_id = %self.id,
            elapsed_seconds,
            answered = self.answers.answered_count(),
            "session completed"
        );
        Transition::Completed { elapsed_seconds }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::{AnswerOption, MediaKind, Prompt};

    fn question(id: u64, kind: QuestionKind, options: usize) -> Question {
        Question {
            id,
            kind,
            points: 10,
            content: Prompt {
                text: format!("Question {id}"),
                kind: MediaKind::Text,
                media: None,
            },
            answers: (0..options)
                .map(|i| AnswerOption {
                    content: format!("Option {i}"),
                    is_correct: i == 0,
                })
                .collect(),
        }
    }

    fn quiz(kinds: &[QuestionKind]) -> Quiz {
        Quiz {
            id: 1,
            name: "Test quiz".into(),
            total_points: 10 * kinds.len() as u32,
            rewards: Default::default(),
            questions: kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| question(100 + i as u64, *kind, 4))
                .collect(),
        }
    }

    fn session(kinds: &[QuestionKind]) -> QuizSession {
        QuizSession::new(quiz(kinds), SessionOptions::default()).unwrap()
    }

    fn ticks(session: &mut QuizSession, n: u32) -> Vec<Transition> {
        (0..n).map(|_| session.tick()).collect()
    }

    use QuestionKind::{Multi, Single};

    #[test]
    fn test_empty_quiz_is_rejected() {
        let err = QuizSession::new(quiz(&[]), SessionOptions::default()).err().unwrap();
        assert!(matches!(err, QuizError::EmptyQuiz(1)));
    }

    #[test]
    fn test_next_saves_remaining_time_and_answer() {
        let mut s = session(&[Single, Single, Single]);
        s.select(0);
        ticks(&mut s, 8);

        assert_eq!(s.next(), Transition::Moved { from: 0, to: 1 });
        assert_eq!(s.elapsed().get(0), Some(22));
        assert_eq!(s.answers().get(0), Some(&Selection::Single(Some(0))));
        assert_eq!(s.remaining(), 30);
        assert_eq!(s.draft(), &Selection::Single(None));
    }

    #[test]
    fn test_three_single_questions_complete_once() {
        let mut s = session(&[Single, Single, Single]);
        s.select(0);
        ticks(&mut s, 8);
        s.next();
        s.select(1);
        ticks(&mut s, 5);
        s.next();
        s.select(2);
        ticks(&mut s, 3);

        assert_eq!(
            s.next(),
            Transition::Completed {
                elapsed_seconds: 16
            }
        );
        assert_eq!(s.phase(), Phase::Submitting);

        let submission = s.take_submission().unwrap();
        assert_eq!(submission.answers.len(), 3);
        assert!(submission.answers.iter().all(|a| a.is_answered()));
        assert_eq!(submission.answers[1].answers, vec!["Option 1".to_string()]);
        assert!(s.take_submission().is_none());
    }

    #[test]
    fn test_expiry_commits_unanswered_and_advances() {
        let mut s = session(&[Single, Single]);
        let transitions = ticks(&mut s, 30);

        assert_eq!(transitions.last(), Some(&Transition::Moved { from: 0, to: 1 }));
        assert_eq!(s.answers().get(0), Some(&Selection::Single(None)));
        assert!(s.is_frozen(0));
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.remaining(), 30);
    }

    #[test]
    fn test_expiry_keeps_unconfirmed_choice() {
        let mut s = session(&[Single, Single]);
        s.select(3);
        ticks(&mut s, 30);
        assert_eq!(s.answers().get(0), Some(&Selection::Single(Some(3))));
    }

    #[test]
    fn test_multi_toggle_commits_set() {
        let mut s = session(&[Multi, Single]);
        s.select(1);
        s.select(3);
        s.select(1);
        s.next();

        assert_eq!(s.answers().get(0), Some(&Selection::Multi(BTreeSet::from([3]))));
    }

    #[test]
    fn test_multi_may_advance_empty() {
        let mut s = session(&[Multi, Single]);
        assert!(s.can_advance());
        assert_eq!(s.next(), Transition::Moved { from: 0, to: 1 });
        assert_eq!(s.answers().get(0), Some(&Selection::Multi(BTreeSet::new())));
    }

    #[test]
    fn test_single_requires_choice_for_manual_next() {
        let mut s = session(&[Single, Single]);
        assert_eq!(s.next(), Transition::Rejected(Rejection::NothingSelected));
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn test_record_kinds_match_question_kinds() {
        let kinds = [Single, Multi, Single, Multi];
        let mut s = session(&kinds);
        for _ in 0..kinds.len() {
            s.select(2);
            ticks(&mut s, 30);
        }

        for (index, selection) in s.answers().iter() {
            assert_eq!(selection.kind(), kinds[index]);
        }
    }

    #[test]
    fn test_previous_resumes_saved_countdown() {
        let mut s = session(&[Single, Single]);
        s.select(1);
        ticks(&mut s, 4);
        s.next();
        ticks(&mut s, 2);

        assert_eq!(s.previous(), Transition::Moved { from: 1, to: 0 });
        assert_eq!(s.remaining(), 26);
        assert_eq!(s.draft(), &Selection::Single(Some(1)));
        assert_eq!(s.elapsed().get(1), Some(28));

        // Revisiting replaces, never appends
        s.select(2);
        s.next();
        assert_eq!(s.answers().get(0), Some(&Selection::Single(Some(2))));
        assert_eq!(s.answers().len(), 2);
        assert_eq!(s.remaining(), 28);
    }

    #[test]
    fn test_frozen_question_cannot_be_revisited() {
        let mut s = session(&[Single, Single, Single]);
        ticks(&mut s, 30);
        assert!(!s.can_go_back());
        assert_eq!(s.previous(), Transition::Rejected(Rejection::PreviousFrozen));
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.answers().get(0), Some(&Selection::Single(None)));
    }

    #[test]
    fn test_first_question_has_no_previous() {
        let mut s = session(&[Single]);
        assert_eq!(s.previous(), Transition::Rejected(Rejection::AtFirstQuestion));
    }

    #[test]
    fn test_out_of_range_option_is_rejected() {
        let mut s = session(&[Single]);
        assert_eq!(s.select(4), Transition::Rejected(Rejection::NoSuchOption));
        assert!(!s.draft().is_answered());
    }

    #[test]
    fn test_expiry_on_last_question_completes() {
        let mut s = session(&[Single, Single]);
        s.select(0);
        s.next();
        let transitions = ticks(&mut s, 30);

        assert_eq!(
            transitions.last(),
            Some(&Transition::Completed {
                elapsed_seconds: 30
            })
        );
        let submission = s.take_submission().unwrap();
        assert_eq!(submission.answers[1].answers, Vec::<String>::new());
    }

    #[test]
    fn test_double_fire_at_boundary_completes_once() {
        let mut s = session(&[Single]);
        s.select(0);
        ticks(&mut s, 29);

        assert!(matches!(s.time_up(0), Transition::Completed { .. }));
        assert_eq!(s.tick(), Transition::Stayed);
        assert_eq!(s.time_up(0), Transition::Rejected(Rejection::StaleExpiry));
        assert_eq!(s.next(), Transition::Rejected(Rejection::NotPresenting));
        assert!(s.take_submission().is_some());
        assert!(s.take_submission().is_none());
    }

    #[test]
    fn test_click_wins_over_late_expiry() {
        let mut s = session(&[Single, Single]);
        s.select(0);
        ticks(&mut s, 29);
        assert_eq!(s.next(), Transition::Moved { from: 0, to: 1 });

        // Expiry raised for the question that was just left
        assert_eq!(s.time_up(0), Transition::Rejected(Rejection::StaleExpiry));
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.elapsed().get(0), Some(1));
        assert!(!s.is_frozen(0));
    }

    #[test]
    fn test_no_input_while_submitting() {
        let mut s = session(&[Single]);
        s.select(0);
        s.next();

        assert_eq!(s.select(1), Transition::Rejected(Rejection::NotPresenting));
        assert_eq!(s.previous(), Transition::Rejected(Rejection::NotPresenting));
        assert_eq!(s.tick(), Transition::Stayed);
    }

    #[test]
    fn test_active_index_always_in_bounds() {
        let mut s = session(&[Single, Multi, Single]);
        let script = [1usize, 0, 2, 0, 1, 1, 0, 2, 2, 1, 0, 1];
        for step in script {
            match step {
                0 => {
                    s.select(1);
                    s.next();
                }
                1 => {
                    s.previous();
                }
                _ => {
                    ticks(&mut s, 11);
                }
            }
            assert!(s.current_index() < s.question_count());
        }
    }

    #[test]
    fn test_elapsed_seconds_counts_live_question() {
        let mut s = session(&[Single, Single]);
        s.select(0);
        ticks(&mut s, 10);
        s.next();
        ticks(&mut s, 5);
        assert_eq!(s.elapsed_seconds(), 15);
    }
}
