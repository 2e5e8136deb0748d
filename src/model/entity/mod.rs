mod user;
pub use user::{LeaderboardRow, UserEntity, UserEntityCreateUpdate, UserStatsRow, level_for_points};

mod lesson;
pub use lesson::{Lesson, LessonCreate};

mod quiz;
pub use quiz::{Quiz, QuizCreate, QuizGrade, QuizQuestion};

mod lesson_completion;
pub use lesson_completion::LessonCompletion;

mod quiz_attempt;
pub use quiz_attempt::QuizAttempt;

mod badge;
pub use badge::UserBadge;

mod scam_alert;
pub use scam_alert::{ScamAlert, ScamAlertCreate};
