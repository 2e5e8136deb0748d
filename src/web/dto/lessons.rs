use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct LessonCompleteResponse {
    pub message: &'static str,
    pub points_earned: i64,
    pub total_points: i64,
}
