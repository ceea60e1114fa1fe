//! Data-collection collaborator: the question sequence and raw-answer
//! validation.

use std::fmt;

/// Completed answer set, ordered as asked. The engine treats this as an
/// opaque token and only hands it whole to the analyzer and the query log.
pub type CollectedData = Vec<(String, String)>;

/// Outcome of feeding one user answer to a collector.
#[derive(Debug, Clone)]
pub enum CollectorStep {
    /// Send this prompt and keep collecting.
    Ask(String),
    /// All required fields are gathered.
    Complete(CollectedData),
}

/// Collector failure. Caught at the engine boundary; aborts the conversation.
#[derive(Debug)]
pub struct CollectorError(pub String);

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collector error: {}", self.0)
    }
}

impl std::error::Error for CollectorError {}

/// Stateful question-sequence collaborator. One instance per conversation,
/// owned by the session.
pub trait Collector: Send {
    /// The opening prompt for a fresh conversation.
    fn start_conversation(&mut self) -> String;

    /// Feed one free-text answer and get the next step.
    fn process_user_input(&mut self, text: &str) -> Result<CollectorStep, CollectorError>;
}

/// The questions asked, in order: (field name, prompt).
const QUESTIONS: &[(&str, &str)] = &[
    ("business_idea", "💡 What is your business idea? Describe it in one or two sentences."),
    ("target_audience", "🎯 Who is your target audience?"),
    ("budget", "💰 What starting budget do you have?"),
    ("experience", "📊 What experience do you have in this field?"),
    ("region", "🌍 In which region or market do you plan to operate?"),
];

/// Fixed five-question business questionnaire.
///
/// Blank answers re-ask the current question. Input after completion is an
/// error (the session should already be gone by then).
pub struct QuestionnaireCollector {
    answers: CollectedData,
    next_question: usize,
}

impl QuestionnaireCollector {
    pub fn new() -> Self {
        Self { answers: Vec::new(), next_question: 0 }
    }
}

impl Default for QuestionnaireCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for QuestionnaireCollector {
    fn start_conversation(&mut self) -> String {
        QUESTIONS[0].1.to_string()
    }

    fn process_user_input(&mut self, text: &str) -> Result<CollectorStep, CollectorError> {
        let (field, prompt) = QUESTIONS
            .get(self.next_question)
            .ok_or_else(|| CollectorError("conversation already complete".into()))?;

        let answer = text.trim();
        if answer.is_empty() {
            return Ok(CollectorStep::Ask(format!(
                "Please give a short answer to continue.\n\n{}",
                prompt
            )));
        }

        self.answers.push((field.to_string(), answer.to_string()));
        self.next_question += 1;

        match QUESTIONS.get(self.next_question) {
            Some((_, next_prompt)) => Ok(CollectorStep::Ask(next_prompt.to_string())),
            None => Ok(CollectorStep::Complete(std::mem::take(&mut self.answers))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_prompt_is_first_question() {
        let mut collector = QuestionnaireCollector::new();
        assert_eq!(collector.start_conversation(), QUESTIONS[0].1);
    }

    #[test]
    fn test_full_walk_collects_all_fields_in_order() {
        let mut collector = QuestionnaireCollector::new();
        collector.start_conversation();

        let answers = ["coffee shop", "students", "$20k", "barista for 3 years"];
        for answer in answers {
            match collector.process_user_input(answer).unwrap() {
                CollectorStep::Ask(_) => {}
                CollectorStep::Complete(_) => panic!("completed too early"),
            }
        }

        let data = match collector.process_user_input("Berlin").unwrap() {
            CollectorStep::Complete(data) => data,
            CollectorStep::Ask(q) => panic!("expected completion, got question: {q}"),
        };

        let fields: Vec<&str> = data.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(
            fields,
            vec!["business_idea", "target_audience", "budget", "experience", "region"]
        );
        assert_eq!(data[0].1, "coffee shop");
        assert_eq!(data[4].1, "Berlin");
    }

    #[test]
    fn test_blank_answer_reasks_same_question() {
        let mut collector = QuestionnaireCollector::new();
        collector.start_conversation();

        let step = collector.process_user_input("   ").unwrap();
        let reask = match step {
            CollectorStep::Ask(q) => q,
            CollectorStep::Complete(_) => panic!("blank answer should not complete"),
        };
        assert!(reask.contains(QUESTIONS[0].1));

        // A real answer still lands on the first field
        match collector.process_user_input("food truck").unwrap() {
            CollectorStep::Ask(q) => assert_eq!(q, QUESTIONS[1].1),
            CollectorStep::Complete(_) => panic!("completed too early"),
        }
    }

    #[test]
    fn test_answers_are_trimmed() {
        let mut collector = QuestionnaireCollector::new();
        collector.start_conversation();
        collector.process_user_input("  bakery  ").unwrap();
        assert_eq!(collector.answers[0].1, "bakery");
    }

    #[test]
    fn test_input_after_completion_is_an_error() {
        let mut collector = QuestionnaireCollector::new();
        collector.start_conversation();
        for answer in ["a", "b", "c", "d", "e"] {
            collector.process_user_input(answer).unwrap();
        }
        assert!(collector.process_user_input("f").is_err());
    }
}
