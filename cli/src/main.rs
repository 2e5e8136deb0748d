use clap::{Parser, Subcommand};
use saathi::model::entity::{
    Lesson, LessonCreate, Quiz, QuizCreate, QuizQuestion, UserBadge, UserEntity,
    UserEntityCreateUpdate,
};
use saathi::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use saathi::web::AuthenticatedUser;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the Saathi DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Manage quizzes
    Quiz {
        #[command(subcommand)]
        action: QuizCommands,
    },

    /// Manage badges
    Badge {
        #[command(subcommand)]
        action: BadgeCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "Beginner")]
        difficulty: String,
        /// Path to a Markdown file with lesson content
        #[arg(long)]
        file: String,
        #[arg(long, default_value_t = 10)]
        points_reward: i32,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

/// Quiz management
#[derive(Subcommand, Debug)]
pub enum QuizCommands {
    Add {
        /// Lesson title to attach the quiz to
        #[arg(long)]
        lesson_title: String,
        #[arg(long)]
        title: String,
        /// Path to a JSON file with the question sequence
        #[arg(long)]
        file: String,
        #[arg(long, default_value_t = 20)]
        points_reward: i32,
        #[arg(long, default_value_t = 60)]
        passing_score: i32,
    },
}

/// Badge management
#[derive(Subcommand, Debug)]
pub enum BadgeCommands {
    Award {
        /// Email of the user to award
        #[arg(long)]
        email: String,
        #[arg(long)]
        badge: String,
    },
}

#[tokio::main]
async fn main() -> saathi::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let db_con = DbConnection::connect(&std::env::var("DATABASE_URL").unwrap())?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { name, email, password, role } => {
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        name,
                        email: email.trim().to_lowercase(),
                        phone: None,
                        password_hash: saathi::auth::hash_password(&password).unwrap(),
                        language: String::from("en"),
                        state: None,
                        district: None,
                    },
                )
                .await?;

                if role != "user" {
                    sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
                        .bind(&role)
                        .bind(user.id())
                        .execute(mm.executor())
                        .await
                        .map_err(DatabaseError::SqlxError)?;
                }
                println!("User created: {:?}", user);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                title,
                description,
                category,
                difficulty,
                file,
                points_reward,
                order_index,
            } => {
                let content = std::fs::read_to_string(file)?;
                let lesson = Lesson::create(
                    &mm,
                    &actor,
                    LessonCreate {
                        title,
                        description,
                        category,
                        difficulty: Some(difficulty),
                        content,
                        estimated_time: None,
                        points_reward: Some(points_reward),
                        quiz_id: None,
                        order_index: Some(order_index),
                    },
                )
                .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },

        Commands::Quiz { action } => match action {
            QuizCommands::Add {
                lesson_title,
                title,
                file,
                points_reward,
                passing_score,
            } => {
                let lesson_id: uuid::Uuid =
                    sqlx::query_scalar("SELECT id FROM lessons WHERE title = $1")
                        .bind(&lesson_title)
                        .fetch_one(mm.executor())
                        .await
                        .map_err(DatabaseError::SqlxError)?;

                let raw = std::fs::read_to_string(file)?;
                let questions: Vec<QuizQuestion> =
                    serde_json::from_str(&raw).map_err(DatabaseError::SerdeError)?;

                let quiz = Quiz::create(
                    &mm,
                    &actor,
                    QuizCreate {
                        lesson_id: Some(lesson_id),
                        title,
                        questions,
                        points_reward: Some(points_reward),
                        passing_score: Some(passing_score),
                        time_limit: None,
                    },
                )
                .await?;

                // point the lesson back at its quiz
                sqlx::query("UPDATE lessons SET quiz_id = $1 WHERE id = $2")
                    .bind(quiz.id())
                    .bind(lesson_id)
                    .execute(mm.executor())
                    .await
                    .map_err(DatabaseError::SqlxError)?;

                println!("Quiz created: {:?}", quiz);
            }
        },

        Commands::Badge { action } => match action {
            BadgeCommands::Award { email, badge } => {
                let user_id: uuid::Uuid =
                    sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
                        .bind(email.trim().to_lowercase())
                        .fetch_one(mm.executor())
                        .await
                        .map_err(DatabaseError::SqlxError)?;

                let awarded = UserBadge::award(&mm, &actor, user_id, &badge).await?;
                println!("Badge awarded: {:?}", awarded);
            }
        },
    }

    Ok(())
}
