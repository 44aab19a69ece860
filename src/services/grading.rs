use crate::models::{AnswerOption, PreparedQuestion};

/// Checks a candidate answer against the canonical correct-answer text.
/// The candidate may carry an enumeration prefix ("a." or "a)"); comparison
/// is on the stripped text, case-sensitive.
pub fn is_answer_correct(question: &PreparedQuestion, selected: &str) -> bool {
    AnswerOption::parse(selected).text == question.correct_answer_text
}

/// The first option whose text matches the canonical answer. `None` means
/// the bank entry is defective and the question cannot be answered
/// correctly; that is a data bug, not a runtime error.
pub fn correct_answer_option(question: &PreparedQuestion) -> Option<&AnswerOption> {
    question
        .options
        .iter()
        .find(|option| option.text == question.correct_answer_text)
}
