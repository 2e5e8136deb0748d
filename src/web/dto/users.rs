use serde::Serialize;

use crate::model::entity::{
    LeaderboardRow, LessonCompletion, QuizAttempt, UserBadge, UserEntity, UserStatsRow,
    level_for_points,
};

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserStatsResponse {
    total_points: i64,
    level: &'static str,
    badges_count: i64,
    lessons_completed: i64,
    quizzes_completed: i64,
    average_quiz_score: i64,
}

impl From<UserStatsRow> for UserStatsResponse {
    fn from(row: UserStatsRow) -> Self {
        Self {
            total_points: row.total_points,
            level: level_for_points(row.total_points),
            badges_count: row.badges_count,
            lessons_completed: row.lessons_completed,
            quizzes_completed: row.quizzes_completed,
            average_quiz_score: row.average_quiz_score,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardLocation {
    state: Option<String>,
    district: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardEntry {
    name: String,
    points: i64,
    level: &'static str,
    badges: Vec<String>,
    location: LeaderboardLocation,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            name: row.name,
            points: row.points,
            level: level_for_points(row.points),
            badges: row.badges,
            location: LeaderboardLocation {
                state: row.state,
                district: row.district,
            },
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    user: UserEntity,
    points: i64,
    level: &'static str,
    badges: Vec<String>,
    completed_lessons: Vec<LessonCompletion>,
    quiz_attempts: Vec<QuizAttempt>,
}

impl MeResponse {
    pub fn new(
        user: UserEntity,
        points: i64,
        badges: Vec<UserBadge>,
        completed_lessons: Vec<LessonCompletion>,
        quiz_attempts: Vec<QuizAttempt>,
    ) -> Self {
        Self {
            user,
            points,
            level: level_for_points(points),
            badges: badges.into_iter().map(|b| b.badge().to_string()).collect(),
            completed_lessons,
            quiz_attempts,
        }
    }
}
