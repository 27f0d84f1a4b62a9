//! SQLite database operations

pub mod date_utils;

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(std::time::Duration::from_secs(30));

        // Every connection to an in-memory database sees its own empty schema,
        // so keep exactly one alive for the lifetime of the pool
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await?
        };

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // === User Repository ===

    /// Create a user with default pomodoro settings
    pub async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password_hash: Option<&str>,
        is_guest: bool,
    ) -> Result<User> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, is_guest, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(is_guest)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("INSERT INTO pomodoro_settings (user_id) VALUES (?)")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(User {
            id,
            username: username.to_string(),
            email: email.map(str::to_string),
            password_hash: password_hash.map(str::to_string),
            is_guest,
            created_at: now,
        })
    }

    /// Get user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, is_guest, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, is_guest, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Delete a user and everything they own
    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let statements = [
            "DELETE FROM flashcard_reviews WHERE user_id = ?",
            "DELETE FROM flashcards WHERE deck_id IN (SELECT id FROM flashcard_decks WHERE user_id = ?)",
            "DELETE FROM flashcard_decks WHERE user_id = ?",
            "DELETE FROM quiz_attempts WHERE quiz_id IN (SELECT id FROM quizzes WHERE user_id = ?)",
            "DELETE FROM quiz_attempts WHERE user_id = ?",
            "DELETE FROM quiz_questions WHERE quiz_id IN (SELECT id FROM quizzes WHERE user_id = ?)",
            "DELETE FROM quizzes WHERE user_id = ?",
            "DELETE FROM pomodoro_sessions WHERE user_id = ?",
            "DELETE FROM pomodoro_settings WHERE user_id = ?",
            "DELETE FROM syllabi WHERE user_id = ?",
            "DELETE FROM daily_stats WHERE user_id = ?",
            "DELETE FROM sessions WHERE user_id = ?",
            "DELETE FROM users WHERE id = ?",
        ];
        for sql in statements {
            sqlx::query(sql).bind(user_id).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // === Session Repository ===

    /// Issue a new bearer token for a user
    pub async fn create_session(&self, user_id: i64) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(token)
    }

    /// Resolve a bearer token to its user
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.is_guest, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn delete_session(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // === Deck Repository ===

    /// Create a deck
    pub async fn create_deck(
        &self,
        user_id: i64,
        name: &str,
        description: &str,
        subject: &str,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let id = insert_deck(&mut tx, user_id, name, description, subject).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// List a user's decks with total and due card counts
    pub async fn list_decks(&self, user_id: i64, today: NaiveDate) -> Result<Vec<DeckSummary>> {
        let decks = sqlx::query_as::<_, DeckSummary>(
            r#"
            SELECT d.id, d.name, d.description, d.subject, d.updated_at,
                   COUNT(f.id) AS card_count,
                   COALESCE(SUM(CASE WHEN f.next_review_date <= ? THEN 1 ELSE 0 END), 0) AS due_count
            FROM flashcard_decks d
            LEFT JOIN flashcards f ON f.deck_id = d.id
            WHERE d.user_id = ?
            GROUP BY d.id
            ORDER BY d.updated_at DESC, d.id DESC
            "#,
        )
        .bind(today)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(decks)
    }

    /// Get deck owned by user
    pub async fn get_deck(&self, user_id: i64, deck_id: i64) -> Result<Option<DbDeck>> {
        let deck = sqlx::query_as::<_, DbDeck>(
            r#"
            SELECT id, user_id, name, description, subject, created_at, updated_at
            FROM flashcard_decks
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(deck_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deck)
    }

    /// Overwrite deck metadata
    pub async fn update_deck(&self, deck: &DbDeck) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE flashcard_decks
            SET name = ?, description = ?, subject = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&deck.name)
        .bind(&deck.description)
        .bind(&deck.subject)
        .bind(Utc::now())
        .bind(deck.id)
        .bind(deck.user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a deck with its cards and their review log
    pub async fn delete_deck(&self, user_id: i64, deck_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM flashcard_reviews WHERE flashcard_id IN (
                SELECT f.id FROM flashcards f
                JOIN flashcard_decks d ON d.id = f.deck_id
                WHERE d.id = ? AND d.user_id = ?
            )
            "#,
        )
        .bind(deck_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM flashcards
            WHERE deck_id IN (SELECT id FROM flashcard_decks WHERE id = ? AND user_id = ?)
            "#,
        )
        .bind(deck_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM flashcard_decks WHERE id = ? AND user_id = ?")
            .bind(deck_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    /// Number of decks owned by user
    pub async fn count_decks(&self, user_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM flashcard_decks WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // === Flashcard Repository ===

    /// Add a card to a deck; it is due on `today`
    pub async fn add_card(
        &self,
        deck_id: i64,
        front: &str,
        back: &str,
        today: NaiveDate,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let id = insert_card(&mut tx, deck_id, front, back, today).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// All cards in a deck, oldest first
    pub async fn get_cards(&self, deck_id: i64) -> Result<Vec<DbFlashcard>> {
        let cards = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT id, deck_id, front, back, ease_factor, interval_days, repetitions,
                   next_review_date, last_reviewed_at, created_at
            FROM flashcards
            WHERE deck_id = ?
            ORDER BY created_at, id
            "#,
        )
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    /// Get card if it belongs to one of the user's decks
    pub async fn get_card(&self, user_id: i64, card_id: i64) -> Result<Option<DbFlashcard>> {
        let card = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT f.id, f.deck_id, f.front, f.back, f.ease_factor, f.interval_days,
                   f.repetitions, f.next_review_date, f.last_reviewed_at, f.created_at
            FROM flashcards f
            JOIN flashcard_decks d ON d.id = f.deck_id
            WHERE f.id = ? AND d.user_id = ?
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    pub async fn update_card_content(&self, card_id: i64, front: &str, back: &str) -> Result<()> {
        sqlx::query("UPDATE flashcards SET front = ?, back = ? WHERE id = ?")
            .bind(front)
            .bind(back)
            .bind(card_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a card owned by user, with its review log
    pub async fn delete_card(&self, user_id: i64, card_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT f.id FROM flashcards f
            JOIN flashcard_decks d ON d.id = f.deck_id
            WHERE f.id = ? AND d.user_id = ?
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM flashcard_reviews WHERE flashcard_id = ?")
            .bind(card_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM flashcards WHERE id = ?")
            .bind(card_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Cards in a deck due on or before `today`, most overdue first
    pub async fn get_due_cards(&self, deck_id: i64, today: NaiveDate) -> Result<Vec<DbFlashcard>> {
        let cards = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT id, deck_id, front, back, ease_factor, interval_days, repetitions,
                   next_review_date, last_reviewed_at, created_at
            FROM flashcards
            WHERE deck_id = ? AND next_review_date <= ?
            ORDER BY next_review_date ASC, id ASC
            "#,
        )
        .bind(deck_id)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    /// Count of due cards across all of the user's decks
    pub async fn count_due_cards(&self, user_id: i64, today: NaiveDate) -> Result<i64> {
        let count = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM flashcards f
            JOIN flashcard_decks d ON d.id = f.deck_id
            WHERE d.user_id = ? AND f.next_review_date <= ?
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Persist a review: new schedule, review log entry and daily counter
    pub async fn record_review(
        &self,
        user_id: i64,
        card_id: i64,
        quality: ReviewQuality,
        schedule: &CardSchedule,
        next_review_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE flashcards
            SET ease_factor = ?, interval_days = ?, repetitions = ?,
                next_review_date = ?, last_reviewed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(schedule.ease_factor)
        .bind(i64::from(schedule.interval_days))
        .bind(i64::from(schedule.repetitions))
        .bind(next_review_date)
        .bind(now)
        .bind(card_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO flashcard_reviews (flashcard_id, user_id, quality, reviewed_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .bind(i64::from(quality.value()))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        update_daily_stats(&mut tx, user_id, today, |c| c.record_card_review()).await?;

        tx.commit().await?;
        Ok(())
    }

    // === Quiz Repository ===

    pub async fn create_quiz(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
        subject: &str,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let id = insert_quiz(&mut tx, user_id, title, description, subject).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// List quizzes with question count and best attempt percentage
    pub async fn list_quizzes(&self, user_id: i64) -> Result<Vec<QuizSummary>> {
        let quizzes = sqlx::query_as::<_, QuizSummary>(
            r#"
            SELECT q.id, q.title, q.description, q.subject, q.updated_at,
                   (SELECT COUNT(*) FROM quiz_questions qq WHERE qq.quiz_id = q.id) AS question_count,
                   (SELECT MAX(percentage) FROM quiz_attempts a WHERE a.quiz_id = q.id) AS best_score
            FROM quizzes q
            WHERE q.user_id = ?
            ORDER BY q.updated_at DESC, q.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    pub async fn get_quiz(&self, user_id: i64, quiz_id: i64) -> Result<Option<DbQuiz>> {
        let quiz = sqlx::query_as::<_, DbQuiz>(
            r#"
            SELECT id, user_id, title, description, subject, created_at, updated_at
            FROM quizzes
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    pub async fn update_quiz(&self, quiz: &DbQuiz) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE quizzes
            SET title = ?, description = ?, subject = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(&quiz.subject)
        .bind(Utc::now())
        .bind(quiz.id)
        .bind(quiz.user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a quiz with its questions and attempts
    pub async fn delete_quiz(&self, user_id: i64, quiz_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM quizzes WHERE id = ? AND user_id = ?")
            .bind(quiz_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted > 0 {
            sqlx::query("DELETE FROM quiz_questions WHERE quiz_id = ?")
                .bind(quiz_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM quiz_attempts WHERE quiz_id = ?")
                .bind(quiz_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(deleted > 0)
    }

    pub async fn count_quizzes(&self, user_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Questions of a quiz in display order
    pub async fn get_questions(&self, quiz_id: i64) -> Result<Vec<DbQuestion>> {
        let questions = sqlx::query_as::<_, DbQuestion>(
            r#"
            SELECT id, quiz_id, question_text, question_type, correct_answer, options,
                   explanation, points, order_num
            FROM quiz_questions
            WHERE quiz_id = ?
            ORDER BY order_num, id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    /// Get question if its quiz belongs to the user
    pub async fn get_question(&self, user_id: i64, question_id: i64) -> Result<Option<DbQuestion>> {
        let question = sqlx::query_as::<_, DbQuestion>(
            r#"
            SELECT qq.id, qq.quiz_id, qq.question_text, qq.question_type, qq.correct_answer,
                   qq.options, qq.explanation, qq.points, qq.order_num
            FROM quiz_questions qq
            JOIN quizzes q ON q.id = qq.quiz_id
            WHERE qq.id = ? AND q.user_id = ?
            "#,
        )
        .bind(question_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    /// Append a question after the current last one. The position is
    /// computed by the INSERT itself so the read and write are one statement.
    pub async fn add_question(&self, quiz_id: i64, question: &NewQuestion) -> Result<i64> {
        let id = sqlx::query(
            r#"
            INSERT INTO quiz_questions (quiz_id, question_text, question_type, correct_answer,
                                        options, explanation, points, order_num)
            SELECT ?, ?, ?, ?, ?, ?, ?, COALESCE(MAX(order_num), 0) + 1
            FROM quiz_questions
            WHERE quiz_id = ?
            "#,
        )
        .bind(quiz_id)
        .bind(&question.question_text)
        .bind(question.question_type.as_str())
        .bind(&question.correct_answer)
        .bind(encode_options(&question.options))
        .bind(&question.explanation)
        .bind(question.points)
        .bind(quiz_id)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn update_question(&self, question_id: i64, question: &NewQuestion) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE quiz_questions
            SET question_text = ?, question_type = ?, correct_answer = ?, options = ?,
                explanation = ?, points = ?
            WHERE id = ?
            "#,
        )
        .bind(&question.question_text)
        .bind(question.question_type.as_str())
        .bind(&question.correct_answer)
        .bind(encode_options(&question.options))
        .bind(&question.explanation)
        .bind(question.points)
        .bind(question_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_question(&self, question_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM quiz_questions WHERE id = ?")
            .bind(question_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Store a graded attempt and fold it into today's stats
    pub async fn record_attempt(
        &self,
        user_id: i64,
        quiz_id: i64,
        grade: &QuizGrade,
        time_taken_seconds: i64,
        answers_json: &str,
        today: NaiveDate,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO quiz_attempts (quiz_id, user_id, score, total_points, percentage,
                                       time_taken_seconds, answers, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .bind(grade.score)
        .bind(grade.total_points)
        .bind(grade.percentage)
        .bind(time_taken_seconds)
        .bind(answers_json)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let percentage = grade.percentage;
        update_daily_stats(&mut tx, user_id, today, |c| c.record_quiz(percentage)).await?;

        tx.commit().await?;
        Ok(id)
    }

    // === Generated Content ===

    /// Create a quiz and all its questions atomically
    pub async fn create_quiz_with_questions(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
        subject: &str,
        questions: &[NewQuestion],
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let quiz_id = insert_quiz(&mut tx, user_id, title, description, subject).await?;
        for (i, question) in questions.iter().enumerate() {
            insert_question(&mut tx, quiz_id, question, i as i64 + 1).await?;
        }
        tx.commit().await?;
        Ok(quiz_id)
    }

    /// Create a deck and all its cards atomically
    pub async fn create_deck_with_cards(
        &self,
        user_id: i64,
        name: &str,
        description: &str,
        subject: &str,
        cards: &[(String, String)],
        today: NaiveDate,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let deck_id = insert_deck(&mut tx, user_id, name, description, subject).await?;
        for (front, back) in cards {
            insert_card(&mut tx, deck_id, front, back, today).await?;
        }
        tx.commit().await?;
        Ok(deck_id)
    }

    // === Pomodoro Repository ===

    pub async fn get_pomodoro_settings(&self, user_id: i64) -> Result<Option<DbPomodoroSettings>> {
        let settings = sqlx::query_as::<_, DbPomodoroSettings>(
            r#"
            SELECT user_id, focus_duration, short_break_duration, long_break_duration,
                   sessions_until_long_break, auto_start_breaks, auto_start_focus, sound_enabled
            FROM pomodoro_settings
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    pub async fn upsert_pomodoro_settings(
        &self,
        user_id: i64,
        settings: &PomodoroSettings,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pomodoro_settings (user_id, focus_duration, short_break_duration,
                long_break_duration, sessions_until_long_break, auto_start_breaks,
                auto_start_focus, sound_enabled)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                focus_duration = excluded.focus_duration,
                short_break_duration = excluded.short_break_duration,
                long_break_duration = excluded.long_break_duration,
                sessions_until_long_break = excluded.sessions_until_long_break,
                auto_start_breaks = excluded.auto_start_breaks,
                auto_start_focus = excluded.auto_start_focus,
                sound_enabled = excluded.sound_enabled
            "#,
        )
        .bind(user_id)
        .bind(i64::from(settings.focus_duration))
        .bind(i64::from(settings.short_break_duration))
        .bind(i64::from(settings.long_break_duration))
        .bind(i64::from(settings.sessions_until_long_break))
        .bind(settings.auto_start_breaks)
        .bind(settings.auto_start_focus)
        .bind(settings.sound_enabled)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Log a finished session; focus sessions count towards today's stats.
    /// Returns today's counters after the update.
    pub async fn record_pomodoro_session(
        &self,
        user_id: i64,
        session_type: SessionType,
        duration_minutes: i64,
        notes: &str,
        today: NaiveDate,
    ) -> Result<DailyCounters> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO pomodoro_sessions (user_id, session_type, duration_minutes, notes, completed_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(session_type.as_str())
        .bind(duration_minutes)
        .bind(notes)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let counters = update_daily_stats(&mut tx, user_id, today, |c| {
            if session_type.is_focus() {
                c.record_focus(duration_minutes);
            }
        })
        .await?;

        tx.commit().await?;
        Ok(counters)
    }

    /// Most recent sessions first
    pub async fn recent_pomodoro_sessions(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<DbPomodoroSession>> {
        let sessions = sqlx::query_as::<_, DbPomodoroSession>(
            r#"
            SELECT id, user_id, session_type, duration_minutes, notes, completed_at
            FROM pomodoro_sessions
            WHERE user_id = ?
            ORDER BY completed_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    // === Syllabus Repository ===

    pub async fn create_syllabus(&self, user_id: i64, name: &str, content: &str) -> Result<i64> {
        let id = sqlx::query(
            "INSERT INTO syllabi (user_id, name, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(name)
        .bind(content)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn set_study_plan(&self, syllabus_id: i64, study_plan: &str) -> Result<()> {
        sqlx::query("UPDATE syllabi SET study_plan = ? WHERE id = ?")
            .bind(study_plan)
            .bind(syllabus_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_syllabi(&self, user_id: i64) -> Result<Vec<DbSyllabus>> {
        let syllabi = sqlx::query_as::<_, DbSyllabus>(
            r#"
            SELECT id, user_id, name, content, study_plan, created_at
            FROM syllabi
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(syllabi)
    }

    pub async fn get_syllabus(&self, user_id: i64, syllabus_id: i64) -> Result<Option<DbSyllabus>> {
        let syllabus = sqlx::query_as::<_, DbSyllabus>(
            r#"
            SELECT id, user_id, name, content, study_plan, created_at
            FROM syllabi
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(syllabus_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(syllabus)
    }

    pub async fn delete_syllabus(&self, user_id: i64, syllabus_id: i64) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM syllabi WHERE id = ? AND user_id = ?")
            .bind(syllabus_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    // === Daily Stats Repository ===

    pub async fn get_daily_stats(&self, user_id: i64, date: NaiveDate) -> Result<DailyCounters> {
        let stats = sqlx::query_as::<_, DbDailyStats>(
            r#"
            SELECT user_id, date, pomodoro_count, focus_minutes, cards_reviewed,
                   quizzes_taken, average_quiz_score
            FROM daily_stats
            WHERE user_id = ? AND date = ?
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stats.map(|s| s.to_counters()).unwrap_or_default())
    }
}

// === Transaction helpers ===

async fn insert_deck(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    name: &str,
    description: &str,
    subject: &str,
) -> Result<i64> {
    let now = Utc::now();
    let id = sqlx::query(
        r#"
        INSERT INTO flashcard_decks (user_id, name, description, subject, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(description)
    .bind(subject)
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await?
    .last_insert_rowid();

    Ok(id)
}

async fn insert_card(
    tx: &mut Transaction<'_, Sqlite>,
    deck_id: i64,
    front: &str,
    back: &str,
    today: NaiveDate,
) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO flashcards (deck_id, front, back, next_review_date, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(deck_id)
    .bind(front)
    .bind(back)
    .bind(today)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?
    .last_insert_rowid();

    Ok(id)
}

async fn insert_quiz(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    title: &str,
    description: &str,
    subject: &str,
) -> Result<i64> {
    let now = Utc::now();
    let id = sqlx::query(
        r#"
        INSERT INTO quizzes (user_id, title, description, subject, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(description)
    .bind(subject)
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await?
    .last_insert_rowid();

    Ok(id)
}

async fn insert_question(
    tx: &mut Transaction<'_, Sqlite>,
    quiz_id: i64,
    question: &NewQuestion,
    order_num: i64,
) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO quiz_questions (quiz_id, question_text, question_type, correct_answer,
                                    options, explanation, points, order_num)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(quiz_id)
    .bind(&question.question_text)
    .bind(question.question_type.as_str())
    .bind(&question.correct_answer)
    .bind(encode_options(&question.options))
    .bind(&question.explanation)
    .bind(question.points)
    .bind(order_num)
    .execute(&mut **tx)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Read-modify-write today's counters inside the caller's transaction
async fn update_daily_stats<F>(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    date: NaiveDate,
    apply: F,
) -> Result<DailyCounters>
where
    F: FnOnce(&mut DailyCounters),
{
    let existing = sqlx::query_as::<_, DbDailyStats>(
        r#"
        SELECT user_id, date, pomodoro_count, focus_minutes, cards_reviewed,
               quizzes_taken, average_quiz_score
        FROM daily_stats
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(&mut **tx)
    .await?;

    let mut counters = existing.map(|s| s.to_counters()).unwrap_or_default();
    apply(&mut counters);

    sqlx::query(
        r#"
        INSERT INTO daily_stats (user_id, date, pomodoro_count, focus_minutes, cards_reviewed,
                                 quizzes_taken, average_quiz_score)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id, date) DO UPDATE SET
            pomodoro_count = excluded.pomodoro_count,
            focus_minutes = excluded.focus_minutes,
            cards_reviewed = excluded.cards_reviewed,
            quizzes_taken = excluded.quizzes_taken,
            average_quiz_score = excluded.average_quiz_score
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(counters.pomodoro_count)
    .bind(counters.focus_minutes)
    .bind(counters.cards_reviewed)
    .bind(counters.quizzes_taken)
    .bind(counters.average_quiz_score)
    .execute(&mut **tx)
    .await?;

    Ok(counters)
}

fn encode_options(options: &[String]) -> String {
    serde_json::to_string(options).unwrap_or_else(|_| "[]".to_string())
}
