use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches the enumeration prefix of an answer option, e.g. "a." or "b)".
static ANSWER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][.)]").expect("answer prefix pattern is valid"));

/// A question as it appears in the question bank file. `question_number` is
/// not required to be unique or contiguous across a pool.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub question_number: u32,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer_text: String,
    pub is_duplicate: bool,
}

/// An answer option with its enumeration prefix split off, so correctness
/// checks compare plain text instead of re-parsing the raw string.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnswerOption {
    pub label: String,
    pub text: String,
}

impl AnswerOption {
    pub fn parse(raw: &str) -> Self {
        match ANSWER_PREFIX.find(raw) {
            Some(m) => Self {
                label: m.as_str().to_string(),
                text: raw[m.end()..].trim().to_string(),
            },
            None => Self {
                label: String::new(),
                text: raw.trim().to_string(),
            },
        }
    }

    /// The option as shown to the user, prefix included.
    pub fn display(&self) -> String {
        if self.label.is_empty() {
            self.text.clone()
        } else {
            format!("{} {}", self.label, self.text)
        }
    }
}

impl std::fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// An independent copy of a question selected into a session. Options are
/// parsed once here; mutating a prepared question never touches the pool.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PreparedQuestion {
    pub question_number: u32,
    pub question: String,
    pub options: Vec<AnswerOption>,
    pub correct_answer_text: String,
    pub is_duplicate: bool,
}

impl From<&Question> for PreparedQuestion {
    fn from(question: &Question) -> Self {
        Self {
            question_number: question.question_number,
            question: question.question.clone(),
            options: question
                .answers
                .iter()
                .map(|raw| AnswerOption::parse(raw))
                .collect(),
            correct_answer_text: question.correct_answer_text.clone(),
            is_duplicate: question.is_duplicate,
        }
    }
}

impl PreparedQuestion {
    /// Back to the wire form, for exporting subsets of a session.
    pub fn to_question(&self) -> Question {
        Question {
            question_number: self.question_number,
            question: self.question.clone(),
            answers: self.options.iter().map(|o| o.display()).collect(),
            correct_answer_text: self.correct_answer_text.clone(),
            is_duplicate: self.is_duplicate,
        }
    }
}
