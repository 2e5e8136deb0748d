pub mod investments;
pub mod lessons;
pub mod quizzes;
pub mod users;
