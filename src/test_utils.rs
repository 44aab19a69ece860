use crate::models::{PreparedQuestion, Question, QuizSettings};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// Creates a well-formed question: the "c" option carries the canonical
    /// answer text.
    pub fn test_question(number: u32) -> Question {
        Question {
            question_number: number,
            question: format!("Question number {}?", number),
            answers: vec![
                format!("a. Wrong option one for {}", number),
                format!("b. Wrong option two for {}", number),
                format!("c. Right option for {}", number),
                format!("d. Wrong option three for {}", number),
            ],
            correct_answer_text: format!("Right option for {}", number),
            is_duplicate: false,
        }
    }

    /// A pool of questions numbered 1..=count.
    pub fn question_pool(count: u32) -> Vec<Question> {
        (1..=count).map(test_question).collect()
    }

    /// The same pool, parsed into session form without shuffling.
    pub fn prepared_pool(count: u32) -> Vec<PreparedQuestion> {
        question_pool(count)
            .iter()
            .map(PreparedQuestion::from)
            .collect()
    }

    pub fn test_settings() -> QuizSettings {
        QuizSettings {
            start_question_number: 1,
            number_of_questions: 3,
            available_questions: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_question_is_well_formed() {
        let question = test_question(5);
        let stripped: Vec<&str> = question
            .answers
            .iter()
            .map(|a| a[2..].trim())
            .collect();
        assert!(stripped.contains(&question.correct_answer_text.as_str()));
    }

    #[test]
    fn test_fixtures_pool_numbers_are_sequential() {
        let pool = question_pool(4);
        let numbers: Vec<u32> = pool.iter().map(|q| q.question_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_fixtures_prepared_pool_parses_options() {
        let prepared = prepared_pool(2);
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0].options.len(), 4);
        assert_eq!(prepared[0].options[2].label, "c.");
    }
}
