use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Selection mode of a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    /// Exactly one option may be held at a time.
    #[default]
    Single,
    /// Any subset of the options, including none.
    Multi,
}

impl QuestionKind {
    /// Map a backend type tag. Unknown tags are treated as single choice.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "multi" | "multiple" | "multiple_choice" | "multi_select" | "checkbox" => Self::Multi,
            _ => Self::Single,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }
}

impl Serialize for QuestionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for QuestionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// What kind of media accompanies a prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    /// Plain text, also used for tags this client does not know.
    #[default]
    #[serde(other)]
    Text,
}

/// A media attachment referenced by URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub url: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Question prompt: text plus an optional media reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: MediaKind,
    #[serde(default)]
    pub media: Option<Media>,
}

/// One selectable option of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub content: String,
    /// Only consulted by scoring backends, never by the screens.
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub points: u32,
    pub content: Prompt,
    #[serde(default)]
    pub answers: Vec<AnswerOption>,
}

impl Question {
    pub fn option_count(&self) -> usize {
        self.answers.len()
    }

    pub fn option_text(&self, index: usize) -> Option<&str> {
        self.answers.get(index).map(|option| option.content.as_str())
    }
}

/// Reward granted when a score reaches `min_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTier {
    pub level: String,
    pub points: u32,
    pub message: String,
    pub min_score: u32,
}

/// A full quiz definition as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub rewards: BTreeMap<String, RewardTier>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// The highest tier whose threshold the score reaches.
    pub fn reward_for(&self, score: u32) -> Option<&RewardTier> {
        self.rewards
            .values()
            .filter(|tier| tier.min_score <= score)
            .max_by_key(|tier| tier.min_score)
    }

    /// Randomize option order within every question.
    pub fn shuffle_answers<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for question in &mut self.questions {
            question.answers.shuffle(rng);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStub {
    pub id: u64,
}

/// Catalogue entry for the quiz selection screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    questions: Vec<QuestionStub>,
}

impl QuizSummary {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            name: quiz.name.clone(),
            total_points: quiz.total_points,
            questions: quiz
                .questions
                .iter()
                .map(|question| QuestionStub { id: question.id })
                .collect(),
        }
    }
}
