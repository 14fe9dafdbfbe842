//! Answer capture and the per-question records kept by a session.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Question, QuestionKind};

/// Selection state for one question.
///
/// The variant always matches the question kind: a single-choice question
/// never holds a set, a multi-select question never holds a bare index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// `None` is the unanswered sentinel.
    Single(Option<usize>),
    Multi(BTreeSet<usize>),
}

impl Selection {
    pub fn empty(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::Single => Selection::Single(None),
            QuestionKind::Multi => Selection::Multi(BTreeSet::new()),
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Selection::Single(_) => QuestionKind::Single,
            Selection::Multi(_) => QuestionKind::Multi,
        }
    }

    /// Replace the choice (single) or toggle membership (multi).
    pub fn choose(&mut self, option: usize) {
        match self {
            Selection::Single(choice) => *choice = Some(option),
            Selection::Multi(chosen) => {
                if !chosen.remove(&option) {
                    chosen.insert(option);
                }
            }
        }
    }

    pub fn contains(&self, option: usize) -> bool {
        match self {
            Selection::Single(choice) => *choice == Some(option),
            Selection::Multi(chosen) => chosen.contains(&option),
        }
    }

    pub fn is_answered(&self) -> bool {
        match self {
            Selection::Single(choice) => choice.is_some(),
            Selection::Multi(chosen) => !chosen.is_empty(),
        }
    }

    /// Chosen option indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Selection::Single(choice) => choice.iter().copied().collect(),
            Selection::Multi(chosen) => chosen.iter().copied().collect(),
        }
    }

    /// Texts of the chosen options, in option order.
    pub fn texts(&self, question: &Question) -> Vec<String> {
        self.indices()
            .into_iter()
            .filter_map(|index| question.option_text(index))
            .map(str::to_string)
            .collect()
    }
}

/// Committed selection per question index. One entry per index; a later
/// commit replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerRecord {
    entries: BTreeMap<usize, Selection>,
}

impl AnswerRecord {
    pub fn commit(&mut self, index: usize, selection: Selection) {
        self.entries.insert(index, selection);
    }

    pub fn get(&self, index: usize) -> Option<&Selection> {
        self.entries.get(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of committed entries holding a real choice.
    pub fn answered_count(&self) -> usize {
        self.entries.values().filter(|s| s.is_answered()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Selection)> {
        self.entries.iter().map(|(index, selection)| (*index, selection))
    }
}

/// Remaining seconds captured when each question was left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionElapsed {
    remaining: Vec<Option<u32>>,
}

impl QuestionElapsed {
    pub fn new(question_count: usize) -> Self {
        Self {
            remaining: vec![None; question_count],
        }
    }

    pub fn record(&mut self, index: usize, remaining: u32) {
        if let Some(slot) = self.remaining.get_mut(index) {
            *slot = Some(remaining);
        }
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.remaining.get(index).copied().flatten()
    }

    /// A question whose timer ran out.
    pub fn is_frozen(&self, index: usize) -> bool {
        self.get(index) == Some(0)
    }

    /// Seconds spent over all questions, `budget - remaining` each, clamped
    /// to `[0, budget]`. Questions never left count as untouched.
    pub fn total_spent(&self, budget: u32) -> u32 {
        self.remaining
            .iter()
            .map(|slot| budget - slot.unwrap_or(budget).min(budget))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_choice_replaces() {
        let mut selection = Selection::empty(QuestionKind::Single);
        assert!(!selection.is_answered());

        selection.choose(2);
        selection.choose(0);
        assert_eq!(selection, Selection::Single(Some(0)));
        assert_eq!(selection.indices(), vec![0]);
    }

    #[test]
    fn test_multi_choice_toggles() {
        let mut selection = Selection::empty(QuestionKind::Multi);
        selection.choose(1);
        selection.choose(3);
        selection.choose(1);

        assert_eq!(selection, Selection::Multi(BTreeSet::from([3])));
        assert!(selection.contains(3));
        assert!(!selection.contains(1));

        selection.choose(3);
        assert!(!selection.is_answered());
        assert_eq!(selection.kind(), QuestionKind::Multi);
    }

    #[test]
    fn test_record_overwrites_same_index() {
        let mut record = AnswerRecord::default();
        record.commit(0, Selection::Single(Some(1)));
        record.commit(0, Selection::Single(None));
        record.commit(1, Selection::Multi(BTreeSet::from([0, 2])));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get(0), Some(&Selection::Single(None)));
        assert_eq!(record.answered_count(), 1);
    }

    #[test]
    fn test_total_spent_clamps_terms() {
        let mut elapsed = QuestionElapsed::new(4);
        elapsed.record(0, 22);
        elapsed.record(1, 0);
        elapsed.record(2, 40);

        assert!(elapsed.is_frozen(1));
        assert!(!elapsed.is_frozen(3));
        // 8 + 30 + 0 + 0
        assert_eq!(elapsed.total_spent(30), 38);
    }

    #[test]
    fn test_record_ignores_out_of_range() {
        let mut elapsed = QuestionElapsed::new(1);
        elapsed.record(5, 3);
        assert_eq!(elapsed.get(5), None);
    }
}
