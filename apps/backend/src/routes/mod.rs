pub mod auth;
pub mod flashcards;
pub mod pomodoro;
pub mod quizzes;
pub mod stats;
pub mod syllabus;
