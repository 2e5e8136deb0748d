use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i32,
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Quiz {
    id: Uuid,
    lesson_id: Option<Uuid>,
    title: String,
    #[schema(value_type = Vec<QuizQuestion>)]
    questions: Json<Vec<QuizQuestion>>,
    points_reward: i32,
    passing_score: i32,
    time_limit: i32,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Quiz {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Quiz
    }
}

impl Quiz {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lesson_id(&self) -> Option<Uuid> {
        self.lesson_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions.0
    }

    pub fn points_reward(&self) -> i32 {
        self.points_reward
    }

    pub fn passing_score(&self) -> i32 {
        self.passing_score
    }

    pub fn time_limit(&self) -> i32 {
        self.time_limit
    }

    /// Grades an answer sheet against the question sequence. Answers line up
    /// by position; a missing answer is simply wrong, an extra one is
    /// ignored. Returns `None` for a quiz with no questions, which callers
    /// must reject before any write.
    pub fn grade(&self, answers: &[i32]) -> Option<QuizGrade> {
        let questions = self.questions();
        if questions.is_empty() {
            return None;
        }

        let correct_count = questions
            .iter()
            .enumerate()
            .filter(|(i, q)| answers.get(*i) == Some(&q.correct_answer))
            .count();

        let total_questions = questions.len();
        let score = (correct_count as f64 / total_questions as f64 * 100.0).round() as i32;
        let passed = score >= self.passing_score;

        Some(QuizGrade {
            correct_count,
            total_questions,
            score,
            passed,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizGrade {
    pub correct_count: usize,
    pub total_questions: usize,
    pub score: i32,
    pub passed: bool,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuizCreate {
    pub lesson_id: Option<Uuid>,
    pub title: String,
    pub questions: Vec<QuizQuestion>,
    pub points_reward: Option<i32>,
    pub passing_score: Option<i32>,
    pub time_limit: Option<i32>,
}

#[async_trait]
impl CrudRepository<Quiz, QuizCreate, uuid::Uuid> for Quiz {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let points_reward = data.points_reward.unwrap_or(20);
        let passing_score = data.passing_score.unwrap_or(60);
        let time_limit = data.time_limit.unwrap_or(300);
        let result = sqlx::query(
            "INSERT INTO quizzes (id, lesson_id, title, questions, points_reward, passing_score, time_limit) \
             VALUES ($1,$2,$3,$4,$5,$6,$7) RETURNING id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(data.lesson_id)
        .bind(&data.title)
        .bind(Json(&data.questions))
        .bind(points_reward)
        .bind(passing_score)
        .bind(time_limit)
        .fetch_one(mm.executor())
        .await?;

        let id = result.try_get("id")?;
        let created_at = result.try_get("created_at")?;
        Ok(Quiz {
            id,
            lesson_id: data.lesson_id,
            title: data.title,
            questions: Json(data.questions),
            points_reward,
            passing_score,
            time_limit,
            created_at,
        })
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let points_reward = data.points_reward.unwrap_or(20);
        let passing_score = data.passing_score.unwrap_or(60);
        let time_limit = data.time_limit.unwrap_or(300);
        sqlx::query(
            "UPDATE quizzes SET lesson_id = $1, title = $2, questions = $3, points_reward = $4, \
             passing_score = $5, time_limit = $6 WHERE id = $7",
        )
        .bind(data.lesson_id)
        .bind(&data.title)
        .bind(Json(&data.questions))
        .bind(points_reward)
        .bind(passing_score)
        .bind(time_limit)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.lesson_id = data.lesson_id;
        self.title = data.title;
        self.questions = Json(data.questions);
        self.points_reward = points_reward;
        self.passing_score = passing_score;
        self.time_limit = time_limit;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: uuid::Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }

        Ok(Some(result?))
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM quizzes LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn quiz_with(correct: &[i32], passing_score: i32) -> Quiz {
        let questions = correct
            .iter()
            .map(|&c| QuizQuestion {
                question: String::from("?"),
                options: vec![String::from("a"), String::from("b"), String::from("c")],
                correct_answer: c,
                explanation: None,
            })
            .collect();

        Quiz {
            id: Uuid::new_v4(),
            lesson_id: None,
            title: String::from("test quiz"),
            questions: Json(questions),
            points_reward: 20,
            passing_score,
            time_limit: 300,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn grade_counts_exact_matches_only() {
        let quiz = quiz_with(&[1, 0, 2], 60);
        let grade = quiz.grade(&[1, 0, 0]).unwrap();
        assert_eq!(grade.correct_count, 2);
        assert_eq!(grade.total_questions, 3);
        assert_eq!(grade.score, 67); // round(2/3 * 100)
        assert!(grade.passed);
    }

    #[test]
    fn grade_tolerates_short_answer_sheet() {
        let quiz = quiz_with(&[1, 0, 2], 60);
        let grade = quiz.grade(&[1]).unwrap();
        assert_eq!(grade.correct_count, 1);
        assert_eq!(grade.score, 33);
        assert!(!grade.passed);
    }

    #[test]
    fn grade_ignores_extra_answers() {
        let quiz = quiz_with(&[0], 60);
        let grade = quiz.grade(&[0, 2, 2, 2]).unwrap();
        assert_eq!(grade.correct_count, 1);
        assert_eq!(grade.score, 100);
    }

    #[test]
    fn grade_empty_answer_sheet_scores_zero() {
        let quiz = quiz_with(&[1, 1], 60);
        let grade = quiz.grade(&[]).unwrap();
        assert_eq!(grade.correct_count, 0);
        assert_eq!(grade.score, 0);
        assert!(!grade.passed);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        // 3 of 5 correct = 60, exactly at the bar
        let quiz = quiz_with(&[0, 0, 0, 0, 0], 60);
        assert!(quiz.grade(&[0, 0, 0, 1, 1]).unwrap().passed);

        // 59 via threshold shift: same sheet against a 61 bar fails
        let strict = quiz_with(&[0, 0, 0, 0, 0], 61);
        assert!(!strict.grade(&[0, 0, 0, 1, 1]).unwrap().passed);
    }

    #[test]
    fn grade_refuses_empty_quiz() {
        let quiz = quiz_with(&[], 60);
        assert!(quiz.grade(&[0]).is_none());
    }
}
