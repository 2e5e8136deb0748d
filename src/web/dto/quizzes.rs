use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::Quiz;

/// Quiz as handed to a client about to take it: the answer key and the
/// explanations stay on the server.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizResponse {
    id: Uuid,
    lesson_id: Option<Uuid>,
    title: String,
    questions: Vec<QuizQuestionResponse>,
    passing_score: i32,
    points_reward: i32,
    time_limit: i32,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizQuestionResponse {
    question: String,
    options: Vec<String>,
}

impl From<Quiz> for QuizResponse {
    fn from(quiz: Quiz) -> Self {
        Self {
            id: quiz.id(),
            lesson_id: quiz.lesson_id(),
            title: quiz.title().to_string(),
            passing_score: quiz.passing_score(),
            points_reward: quiz.points_reward(),
            time_limit: quiz.time_limit(),
            questions: quiz
                .questions()
                .iter()
                .map(|q| QuizQuestionResponse {
                    question: q.question.clone(),
                    options: q.options.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizSubmitRequest {
    pub answers: Vec<i32>,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizSubmitResponse {
    pub score: i32,
    pub passed: bool,
    pub correct_count: usize,
    pub total_questions: usize,
    pub points_earned: i64,
    pub total_points: i64,
}
