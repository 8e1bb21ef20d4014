use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// An educational content unit with an optional quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
}

impl Module {
    /// Grade submitted answers against the stored correct answers, in
    /// question order. Missing answers count as wrong; extra answers are
    /// ignored.
    pub fn grade(&self, answers: &[String]) -> QuizScore {
        let correct = self
            .quiz
            .iter()
            .zip(answers)
            .filter(|(question, answer)| question.answer == **answer)
            .count();
        QuizScore {
            correct,
            total: self.quiz.len(),
        }
    }
}
