use rand::Rng;

use crate::models::{PreparedQuestion, Question};

/// Fisher-Yates over a fresh copy; the input is never mutated.
pub fn shuffle<T: Clone>(items: &[T]) -> Vec<T> {
    shuffle_with(items, &mut rand::thread_rng())
}

pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

/// Selects the questions for one session: a window of `number_of_questions`
/// starting at the first question numbered >= `start_question_number`,
/// wrapping around to the head of the pool when the tail runs short.
/// Question order and each copy's option order are shuffled independently.
///
/// Degrades gracefully on out-of-range arguments; `QuizSettings`
/// validation is the caller's gate, not this function's.
pub fn prepare_questions(
    pool: &[Question],
    start_question_number: u32,
    number_of_questions: usize,
) -> Vec<PreparedQuestion> {
    prepare_questions_with(
        pool,
        start_question_number,
        number_of_questions,
        &mut rand::thread_rng(),
    )
}

pub fn prepare_questions_with<R: Rng + ?Sized>(
    pool: &[Question],
    start_question_number: u32,
    number_of_questions: usize,
    rng: &mut R,
) -> Vec<PreparedQuestion> {
    let mut selected: Vec<&Question> = pool.iter().collect();

    if start_question_number > 1 {
        if let Some(start_index) = pool
            .iter()
            .position(|q| q.question_number >= start_question_number)
        {
            selected = pool[start_index..].iter().collect();
        }
    }

    // Wrap around to the head of the pool when the tail is too short.
    // Duplicates across the wrap boundary are accepted when the request
    // exceeds the pool size.
    if selected.len() < number_of_questions {
        let remaining = number_of_questions - selected.len();
        selected.extend(pool.iter().take(remaining));
    }

    selected.truncate(number_of_questions);

    let prepared: Vec<PreparedQuestion> =
        selected.into_iter().map(PreparedQuestion::from).collect();
    let mut prepared = shuffle_with(&prepared, rng);
    for question in &mut prepared {
        question.options = shuffle_with(&question.options, rng);
    }
    prepared
}

/// The lowest selectable starting number; 0 only for an empty pool.
pub fn min_question_number(pool: &[Question]) -> u32 {
    if pool.is_empty() {
        0
    } else {
        1
    }
}

pub fn max_question_number(pool: &[Question]) -> u32 {
    pool.iter().map(|q| q.question_number).max().unwrap_or(0)
}
