use crate::error::AppError;
use crate::models::course::Course;
use crate::models::notification::{Notification, NotificationFeedItem};
use crate::models::professor::Professor;
use crate::models::review::{NewReview, Review, ReviewUpdate};
use crate::models::subscription::Subscription;
use crate::models::vote::Vote;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use uuid::Uuid;

    // Helper function to create test database
    pub(crate) async fn create_test_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.create_schema().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_schema_creation() {
        let db = create_test_db().await;

        // Verify tables exist
        let conn = db.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert!(tables.contains(&"courses".to_string()));
        assert!(tables.contains(&"professors".to_string()));
        assert!(tables.contains(&"reviews".to_string()));
        assert!(tables.contains(&"votes".to_string()));
        assert!(tables.contains(&"subscriptions".to_string()));
        assert!(tables.contains(&"notifications".to_string()));
    }

    #[tokio::test]
    async fn test_subscription_requires_exactly_one_target() {
        let db = create_test_db().await;
        let user = Uuid::new_v4().to_string();

        // No target
        let err = db.create_subscription(&user, None, None, None).await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        // Two targets
        let err = db
            .create_subscription(&user, Some(101), Some(7), None)
            .await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        // Empty subscriber
        let err = db.create_subscription("", Some(101), None, None).await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        // Exactly one target succeeds
        let sub = db
            .create_subscription(&user, Some(101), None, None)
            .await
            .unwrap();
        assert_eq!(sub.user_id, user);
        assert_eq!(sub.course_code, Some(101));
        assert_eq!(sub.professor_id, None);
        assert_eq!(sub.review_id, None);
    }

    #[tokio::test]
    async fn test_subscription_lookup_and_delete() {
        let db = create_test_db().await;
        let alice = Uuid::new_v4().to_string();
        let bob = Uuid::new_v4().to_string();

        let s1 = db
            .create_subscription(&alice, Some(101), None, None)
            .await
            .unwrap();
        db.create_subscription(&bob, Some(101), None, None)
            .await
            .unwrap();
        db.create_subscription(&alice, None, Some(7), None)
            .await
            .unwrap();

        assert_eq!(db.find_subscriptions_by_course(101).await.unwrap().len(), 2);
        assert_eq!(db.find_subscriptions_by_professor(7).await.unwrap().len(), 1);
        assert_eq!(db.find_subscriptions_by_review(1).await.unwrap().len(), 0);
        assert_eq!(db.find_subscriptions_by_user(&alice).await.unwrap().len(), 2);

        db.delete_subscription(s1.id).await.unwrap();
        assert_eq!(db.find_subscriptions_by_course(101).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notification_target_validation() {
        let db = create_test_db().await;
        let user = Uuid::new_v4().to_string();
        let author = Uuid::new_v4().to_string();
        let review = db
            .insert_review(&sample_review(&author, 101, None))
            .await
            .unwrap();
        let vote = db.insert_vote(&user, review.id, true).await.unwrap();

        // Missing recipient
        let err = db
            .create_notification("", Some(101), None, None, None)
            .await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        // No reference at all
        let err = db.create_notification(&user, None, None, None, None).await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        // Course and professor together
        let err = db
            .create_notification(&user, Some(101), Some(7), None, None)
            .await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        // Course target with the triggering review riding along
        let n = db
            .create_notification(&user, Some(101), None, Some(review.id), None)
            .await
            .unwrap();
        assert_eq!(n.course_code, Some(101));
        assert_eq!(n.review_id, Some(review.id));
        assert!(!n.read);

        // Review target with a vote modifier
        let n = db
            .create_notification(&user, None, None, Some(review.id), Some(vote.id))
            .await
            .unwrap();
        assert_eq!(n.review_id, Some(review.id));
        assert_eq!(n.vote_id, Some(vote.id));
    }

    #[tokio::test]
    async fn test_notification_vote_lookup_and_read_flag() {
        let db = create_test_db().await;
        let user = Uuid::new_v4().to_string();
        let author = Uuid::new_v4().to_string();
        let review = db
            .insert_review(&sample_review(&author, 101, None))
            .await
            .unwrap();
        let vote = db.insert_vote(&user, review.id, true).await.unwrap();

        let n = db
            .create_notification(&user, None, None, Some(review.id), Some(vote.id))
            .await
            .unwrap();

        let found = db.find_notification_by_vote(&user, vote.id).await.unwrap();
        assert_eq!(found.unwrap().id, n.id);
        assert!(db
            .find_notification_by_vote(&user, vote.id + 1)
            .await
            .unwrap()
            .is_none());

        db.mark_notification_read(n.id).await.unwrap();
        let feed = db.find_notifications_by_recipient(&user).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert!(feed[0].notification.read);

        db.delete_notification(n.id).await.unwrap();
        assert!(db
            .find_notifications_by_recipient(&user)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_professor_lookup_is_case_insensitive() {
        let db = create_test_db().await;
        let prof = db.insert_professor(Some("Jane"), "Smith").await.unwrap();
        assert_eq!(prof.first_name.as_deref(), Some("JANE"));
        assert_eq!(prof.last_name, "SMITH");
        assert_eq!(db.get_professors().await.unwrap().len(), 1);

        let found = db
            .find_professor_by_name(Some("JANE"), "SMITH")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, prof.id);

        // Last-name-only lookup matches regardless of first name
        let found = db.find_professor_by_name(None, "smith").await.unwrap();
        assert_eq!(found.unwrap().id, prof.id);

        assert!(db
            .find_professor_by_name(Some("JOHN"), "SMITH")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_review_insert_update_delete() {
        let db = create_test_db().await;
        let user = Uuid::new_v4().to_string();
        let review = db
            .insert_review(&sample_review(&user, 101, None))
            .await
            .unwrap();
        assert_eq!(review.course_code, 101);
        assert_eq!(review.created_at, review.last_modified);

        let update = ReviewUpdate {
            title: "Harder than it looks".into(),
            content: review.content.clone(),
            rating: 2,
            difficulty_rating: 5,
            workload: 12,
            professor_quality_rating: 3,
            professor_difficulty_rating: 4,
            lecture_rating: 3,
        };
        let updated = db.update_review(review.id, &update).await.unwrap();
        assert_eq!(updated.rating, 2);
        // One write covers the fields and the timestamp together
        assert_ne!(updated.last_modified, review.last_modified);
        assert_eq!(updated.created_at, review.created_at);

        let deleted = db.delete_review(review.id).await.unwrap();
        assert_eq!(deleted.id, review.id);
        assert!(db.get_review(review.id).await.unwrap().is_none());
        assert!(matches!(
            db.delete_review(review.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_vote_upsert_and_cascade() {
        let db = create_test_db().await;
        let author = Uuid::new_v4().to_string();
        let voter = Uuid::new_v4().to_string();
        let review = db
            .insert_review(&sample_review(&author, 101, None))
            .await
            .unwrap();

        let vote = db.insert_vote(&voter, review.id, true).await.unwrap();
        assert!(vote.upvote);
        assert_eq!(
            db.find_vote(&voter, review.id).await.unwrap().unwrap().id,
            vote.id
        );

        let flipped = db.set_vote_flag(vote.id, false).await.unwrap();
        assert_eq!(flipped.id, vote.id);
        assert!(!flipped.upvote);

        // Deleting the review cascades to its votes
        db.delete_review(review.id).await.unwrap();
        assert!(db.find_vote(&voter, review.id).await.unwrap().is_none());
    }

    pub(crate) fn sample_review(
        user_id: &str,
        course_code: i64,
        professor_id: Option<i64>,
    ) -> NewReview {
        NewReview {
            user_id: user_id.to_string(),
            course_code,
            professor_id,
            year: 2024,
            semester: 1,
            title: "Solid intro course".into(),
            content: "Weekly assignments, fair exams.".into(),
            rating: 4,
            difficulty_rating: 3,
            workload: 8,
            professor_quality_rating: 4,
            professor_difficulty_rating: 3,
            lecture_rating: 4,
        }
    }
}

// Define a struct to represent a database connection
#[derive(Debug, Clone)]
pub struct Database {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Database {
    // Create a new database connection
    pub fn new(db_path: &str) -> Result<Self, AppError> {
        let conn = Connection::open(db_path)?;
        // Cascade cleanup of votes, subscriptions and notifications relies on
        // foreign keys being enforced
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        info!("database connection established at: {}", db_path);
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // Create the database schema
    pub async fn create_schema(&self) -> Result<(), AppError> {
        let conn = self.conn.lock().await;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS courses (
                code INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS professors (
                id INTEGER PRIMARY KEY,
                first_name TEXT,
                last_name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                course_code INTEGER NOT NULL,
                professor_id INTEGER,
                year INTEGER NOT NULL,
                semester INTEGER NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                rating INTEGER NOT NULL,
                difficulty_rating INTEGER NOT NULL,
                workload INTEGER NOT NULL,
                professor_quality_rating INTEGER NOT NULL,
                professor_difficulty_rating INTEGER NOT NULL,
                lecture_rating INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                last_modified TEXT NOT NULL,
                FOREIGN KEY (professor_id) REFERENCES professors(id) ON DELETE SET NULL
            );

            CREATE TABLE IF NOT EXISTS votes (
                id INTEGER PRIMARY KEY,
                review_id INTEGER NOT NULL,
                user_id TEXT NOT NULL,
                upvote INTEGER NOT NULL,
                UNIQUE (review_id, user_id),
                FOREIGN KEY (review_id) REFERENCES reviews(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS subscriptions (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                course_code INTEGER,
                professor_id INTEGER,
                review_id INTEGER,
                FOREIGN KEY (review_id) REFERENCES reviews(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS notifications (
                id INTEGER PRIMARY KEY,
                recipient_id TEXT NOT NULL,
                course_code INTEGER,
                professor_id INTEGER,
                review_id INTEGER,
                vote_id INTEGER,
                read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (review_id) REFERENCES reviews(id) ON DELETE CASCADE,
                FOREIGN KEY (vote_id) REFERENCES votes(id) ON DELETE CASCADE
            );",
        )?;
        Ok(())
    }

    // ---- courses ----

    pub async fn insert_course(&self, code: i64, name: &str) -> Result<Course, AppError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO courses (code, name) VALUES (?, ?)",
            params![code, name],
        )?;
        let course = conn.query_row(
            "SELECT code, name FROM courses WHERE code = ?",
            [code],
            |row| {
                Ok(Course {
                    code: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )?;
        info!("course inserted: {} {}", course.code, course.name);
        Ok(course)
    }

    pub async fn get_courses(&self) -> Result<Vec<Course>, AppError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT code, name FROM courses ORDER BY code")?;
        let rows = stmt.query_map([], |row| {
            Ok(Course {
                code: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        let mut courses = Vec::new();
        for row in rows {
            courses.push(row?);
        }
        Ok(courses)
    }

    // ---- professors ----

    pub async fn insert_professor(
        &self,
        first_name: Option<&str>,
        last_name: &str,
    ) -> Result<Professor, AppError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO professors (first_name, last_name) VALUES (?, ?)",
            params![
                first_name.map(|f| f.to_uppercase()),
                last_name.to_uppercase()
            ],
        )?;
        let id = conn.last_insert_rowid();
        let professor = conn.query_row(
            "SELECT id, first_name, last_name FROM professors WHERE id = ?",
            [id],
            professor_from_row,
        )?;
        info!("professor inserted: {}", professor.last_name);
        Ok(professor)
    }

    pub async fn get_professors(&self) -> Result<Vec<Professor>, AppError> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT id, first_name, last_name FROM professors ORDER BY last_name")?;
        let rows = stmt.query_map([], professor_from_row)?;
        let mut professors = Vec::new();
        for row in rows {
            professors.push(row?);
        }
        Ok(professors)
    }

    /// Exact match on uppercased names. A missing first name matches on last
    /// name alone, the way the original form treats single-token input.
    pub async fn find_professor_by_name(
        &self,
        first_name: Option<&str>,
        last_name: &str,
    ) -> Result<Option<Professor>, AppError> {
        let conn = self.conn.lock().await;
        let professor = match first_name {
            Some(first) => conn
                .query_row(
                    "SELECT id, first_name, last_name FROM professors
                     WHERE first_name = ? AND last_name = ? LIMIT 1",
                    params![first.to_uppercase(), last_name.to_uppercase()],
                    professor_from_row,
                )
                .optional()?,
            None => conn
                .query_row(
                    "SELECT id, first_name, last_name FROM professors
                     WHERE last_name = ? LIMIT 1",
                    params![last_name.to_uppercase()],
                    professor_from_row,
                )
                .optional()?,
        };
        Ok(professor)
    }

    // ---- reviews ----

    pub async fn insert_review(&self, new: &NewReview) -> Result<Review, AppError> {
        let conn = self.conn.lock().await;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO reviews (
                user_id, course_code, professor_id, year, semester, title, content,
                rating, difficulty_rating, workload, professor_quality_rating,
                professor_difficulty_rating, lecture_rating, created_at, last_modified
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                new.user_id,
                new.course_code,
                new.professor_id,
                new.year,
                new.semester,
                new.title,
                new.content,
                new.rating,
                new.difficulty_rating,
                new.workload,
                new.professor_quality_rating,
                new.professor_difficulty_rating,
                new.lecture_rating,
                now,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();
        let review = conn
            .query_row("SELECT * FROM reviews WHERE id = ?", [id], review_from_row)
            .optional()?
            .ok_or_else(|| AppError::Creation("review insert returned no record".into()))?;
        info!(
            "review {} created for course {}",
            review.id, review.course_code
        );
        Ok(review)
    }

    pub async fn get_review(&self, review_id: i64) -> Result<Option<Review>, AppError> {
        let conn = self.conn.lock().await;
        let review = conn
            .query_row(
                "SELECT * FROM reviews WHERE id = ?",
                [review_id],
                review_from_row,
            )
            .optional()?;
        Ok(review)
    }

    pub async fn get_reviews_by_course(&self, course_code: i64) -> Result<Vec<Review>, AppError> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT * FROM reviews WHERE course_code = ? ORDER BY created_at DESC")?;
        let rows = stmt.query_map([course_code], review_from_row)?;
        let mut reviews = Vec::new();
        for row in rows {
            reviews.push(row?);
        }
        Ok(reviews)
    }

    /// Overwrites the editable fields and stamps `last_modified` in the same
    /// write.
    pub async fn update_review(
        &self,
        review_id: i64,
        update: &ReviewUpdate,
    ) -> Result<Review, AppError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE reviews SET
                title = ?, content = ?, rating = ?, difficulty_rating = ?,
                workload = ?, professor_quality_rating = ?,
                professor_difficulty_rating = ?, lecture_rating = ?,
                last_modified = ?
             WHERE id = ?",
            params![
                update.title,
                update.content,
                update.rating,
                update.difficulty_rating,
                update.workload,
                update.professor_quality_rating,
                update.professor_difficulty_rating,
                update.lecture_rating,
                Utc::now().to_rfc3339(),
                review_id
            ],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound(format!(
                "review {} not found",
                review_id
            )));
        }
        let review = conn.query_row(
            "SELECT * FROM reviews WHERE id = ?",
            [review_id],
            review_from_row,
        )?;
        info!("review {} updated", review_id);
        Ok(review)
    }

    /// Deletes the review and returns it. Votes, subscriptions and
    /// notifications referencing it go with it via the schema's cascades.
    pub async fn delete_review(&self, review_id: i64) -> Result<Review, AppError> {
        let conn = self.conn.lock().await;
        let review = conn
            .query_row(
                "SELECT * FROM reviews WHERE id = ?",
                [review_id],
                review_from_row,
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("review {} not found", review_id)))?;
        conn.execute("DELETE FROM reviews WHERE id = ?", [review_id])?;
        info!("review {} deleted", review_id);
        Ok(review)
    }

    // ---- votes ----

    pub async fn find_vote(&self, user_id: &str, review_id: i64) -> Result<Option<Vote>, AppError> {
        let conn = self.conn.lock().await;
        let vote = conn
            .query_row(
                "SELECT id, review_id, user_id, upvote FROM votes
                 WHERE user_id = ? AND review_id = ?",
                params![user_id, review_id],
                vote_from_row,
            )
            .optional()?;
        Ok(vote)
    }

    pub async fn insert_vote(
        &self,
        user_id: &str,
        review_id: i64,
        upvote: bool,
    ) -> Result<Vote, AppError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO votes (review_id, user_id, upvote) VALUES (?, ?, ?)",
            params![review_id, user_id, upvote],
        )?;
        let id = conn.last_insert_rowid();
        let vote = conn.query_row(
            "SELECT id, review_id, user_id, upvote FROM votes WHERE id = ?",
            [id],
            vote_from_row,
        )?;
        Ok(vote)
    }

    pub async fn set_vote_flag(&self, vote_id: i64, upvote: bool) -> Result<Vote, AppError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE votes SET upvote = ? WHERE id = ?",
            params![upvote, vote_id],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound(format!("vote {} not found", vote_id)));
        }
        let vote = conn.query_row(
            "SELECT id, review_id, user_id, upvote FROM votes WHERE id = ?",
            [vote_id],
            vote_from_row,
        )?;
        Ok(vote)
    }

    pub async fn delete_vote(&self, vote_id: i64) -> Result<(), AppError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM votes WHERE id = ?", [vote_id])?;
        Ok(())
    }

    // ---- subscriptions ----

    /// Fails unless the subscriber id is non-empty and exactly one of the
    /// three targets is set.
    pub async fn create_subscription(
        &self,
        user_id: &str,
        course_code: Option<i64>,
        professor_id: Option<i64>,
        review_id: Option<i64>,
    ) -> Result<Subscription, AppError> {
        if user_id.is_empty() {
            return Err(AppError::Validation(
                "must provide a user id to create a subscription".into(),
            ));
        }
        let targets = [
            course_code.is_some(),
            professor_id.is_some(),
            review_id.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();
        if targets != 1 {
            return Err(AppError::Validation(
                "must provide exactly one of a course, professor, or review to subscribe to".into(),
            ));
        }

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO subscriptions (user_id, course_code, professor_id, review_id)
             VALUES (?, ?, ?, ?)",
            params![user_id, course_code, professor_id, review_id],
        )?;
        let id = conn.last_insert_rowid();
        let subscription = conn.query_row(
            "SELECT id, user_id, course_code, professor_id, review_id
             FROM subscriptions WHERE id = ?",
            [id],
            subscription_from_row,
        )?;
        info!(
            "subscription {} created for user {}",
            subscription.id, user_id
        );
        Ok(subscription)
    }

    pub async fn find_subscriptions_by_course(
        &self,
        course_code: i64,
    ) -> Result<Vec<Subscription>, AppError> {
        self.find_subscriptions("course_code", course_code).await
    }

    pub async fn find_subscriptions_by_professor(
        &self,
        professor_id: i64,
    ) -> Result<Vec<Subscription>, AppError> {
        self.find_subscriptions("professor_id", professor_id).await
    }

    pub async fn find_subscriptions_by_review(
        &self,
        review_id: i64,
    ) -> Result<Vec<Subscription>, AppError> {
        self.find_subscriptions("review_id", review_id).await
    }

    async fn find_subscriptions(
        &self,
        column: &str,
        value: i64,
    ) -> Result<Vec<Subscription>, AppError> {
        let conn = self.conn.lock().await;
        // Column name comes from the three wrappers above, never from input
        let mut stmt = conn.prepare(&format!(
            "SELECT id, user_id, course_code, professor_id, review_id
             FROM subscriptions WHERE {} = ?",
            column
        ))?;
        let rows = stmt.query_map([value], subscription_from_row)?;
        let mut subscriptions = Vec::new();
        for row in rows {
            subscriptions.push(row?);
        }
        Ok(subscriptions)
    }

    pub async fn find_subscriptions_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Subscription>, AppError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, course_code, professor_id, review_id
             FROM subscriptions WHERE user_id = ?",
        )?;
        let rows = stmt.query_map([user_id], subscription_from_row)?;
        let mut subscriptions = Vec::new();
        for row in rows {
            subscriptions.push(row?);
        }
        Ok(subscriptions)
    }

    pub async fn delete_subscription(&self, subscription_id: i64) -> Result<(), AppError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM subscriptions WHERE id = ?", [subscription_id])?;
        Ok(())
    }

    // ---- notifications ----

    /// A notification must name a recipient and reference something that
    /// changed. Course and professor are mutually exclusive subscription
    /// targets; `review_id` rides along with either as the triggering review
    /// and stands alone for vote events; `vote_id` is always a modifier.
    pub async fn create_notification(
        &self,
        recipient_id: &str,
        course_code: Option<i64>,
        professor_id: Option<i64>,
        review_id: Option<i64>,
        vote_id: Option<i64>,
    ) -> Result<Notification, AppError> {
        if recipient_id.is_empty() {
            return Err(AppError::Validation(
                "must provide a recipient to create a notification".into(),
            ));
        }
        if course_code.is_none() && professor_id.is_none() && review_id.is_none() {
            return Err(AppError::Validation(
                "must provide a course, professor, or review to create a notification".into(),
            ));
        }
        if course_code.is_some() && professor_id.is_some() {
            return Err(AppError::Validation(
                "a notification cannot target both a course and a professor".into(),
            ));
        }

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO notifications
                (recipient_id, course_code, professor_id, review_id, vote_id, read, created_at)
             VALUES (?, ?, ?, ?, ?, 0, ?)",
            params![
                recipient_id,
                course_code,
                professor_id,
                review_id,
                vote_id,
                Utc::now().to_rfc3339()
            ],
        )?;
        let id = conn.last_insert_rowid();
        let notification = conn.query_row(
            "SELECT id, recipient_id, course_code, professor_id, review_id, vote_id, read, created_at
             FROM notifications WHERE id = ?",
            [id],
            notification_from_row,
        )?;
        Ok(notification)
    }

    /// Everything the notification panel needs in one query: each
    /// notification joined with its review, that review's course and
    /// professor, and the vote that triggered it.
    pub async fn find_notifications_by_recipient(
        &self,
        user_id: &str,
    ) -> Result<Vec<NotificationFeedItem>, AppError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT
                n.id, n.recipient_id, n.course_code, n.professor_id, n.review_id,
                n.vote_id, n.read, n.created_at,
                r.id, r.user_id, r.course_code, r.professor_id, r.year, r.semester,
                r.title, r.content, r.rating, r.difficulty_rating, r.workload,
                r.professor_quality_rating, r.professor_difficulty_rating,
                r.lecture_rating, r.created_at, r.last_modified,
                c.code, c.name,
                p.id, p.first_name, p.last_name,
                v.id, v.review_id, v.user_id, v.upvote
             FROM notifications n
             LEFT JOIN reviews r ON r.id = n.review_id
             LEFT JOIN courses c ON c.code = r.course_code
             LEFT JOIN professors p ON p.id = r.professor_id
             LEFT JOIN votes v ON v.id = n.vote_id
             WHERE n.recipient_id = ?
             ORDER BY n.created_at DESC",
        )?;

        let rows = stmt.query_map([user_id], |row| {
            let notification = notification_from_row(row)?;

            let review = match row.get::<_, Option<i64>>(8)? {
                Some(id) => Some(Review {
                    id,
                    user_id: row.get(9)?,
                    course_code: row.get(10)?,
                    professor_id: row.get(11)?,
                    year: row.get(12)?,
                    semester: row.get(13)?,
                    title: row.get(14)?,
                    content: row.get(15)?,
                    rating: row.get(16)?,
                    difficulty_rating: row.get(17)?,
                    workload: row.get(18)?,
                    professor_quality_rating: row.get(19)?,
                    professor_difficulty_rating: row.get(20)?,
                    lecture_rating: row.get(21)?,
                    created_at: row.get(22)?,
                    last_modified: row.get(23)?,
                }),
                None => None,
            };

            let course = match row.get::<_, Option<i64>>(24)? {
                Some(code) => Some(Course {
                    code,
                    name: row.get(25)?,
                }),
                None => None,
            };

            let professor = match row.get::<_, Option<i64>>(26)? {
                Some(id) => Some(Professor {
                    id,
                    first_name: row.get(27)?,
                    last_name: row.get(28)?,
                }),
                None => None,
            };

            let vote = match row.get::<_, Option<i64>>(29)? {
                Some(id) => Some(Vote {
                    id,
                    review_id: row.get(30)?,
                    user_id: row.get(31)?,
                    upvote: row.get(32)?,
                }),
                None => None,
            };

            Ok(NotificationFeedItem {
                notification,
                review,
                course,
                professor,
                vote,
            })
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Locates the notification created for a specific vote event, if any.
    /// Used to clean up when the vote is retracted.
    pub async fn find_notification_by_vote(
        &self,
        recipient_id: &str,
        vote_id: i64,
    ) -> Result<Option<Notification>, AppError> {
        let conn = self.conn.lock().await;
        let notification = conn
            .query_row(
                "SELECT id, recipient_id, course_code, professor_id, review_id, vote_id, read, created_at
                 FROM notifications WHERE recipient_id = ? AND vote_id = ?",
                params![recipient_id, vote_id],
                notification_from_row,
            )
            .optional()?;
        Ok(notification)
    }

    pub async fn delete_notification(&self, notification_id: i64) -> Result<(), AppError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM notifications WHERE id = ?", [notification_id])?;
        Ok(())
    }

    pub async fn mark_notification_read(&self, notification_id: i64) -> Result<(), AppError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE notifications SET read = 1 WHERE id = ?",
            [notification_id],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound(format!(
                "notification {} not found",
                notification_id
            )));
        }
        Ok(())
    }
}

fn review_from_row(row: &Row) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        user_id: row.get(1)?,
        course_code: row.get(2)?,
        professor_id: row.get(3)?,
        year: row.get(4)?,
        semester: row.get(5)?,
        title: row.get(6)?,
        content: row.get(7)?,
        rating: row.get(8)?,
        difficulty_rating: row.get(9)?,
        workload: row.get(10)?,
        professor_quality_rating: row.get(11)?,
        professor_difficulty_rating: row.get(12)?,
        lecture_rating: row.get(13)?,
        created_at: row.get(14)?,
        last_modified: row.get(15)?,
    })
}

fn professor_from_row(row: &Row) -> rusqlite::Result<Professor> {
    Ok(Professor {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
    })
}

fn vote_from_row(row: &Row) -> rusqlite::Result<Vote> {
    Ok(Vote {
        id: row.get(0)?,
        review_id: row.get(1)?,
        user_id: row.get(2)?,
        upvote: row.get(3)?,
    })
}

fn subscription_from_row(row: &Row) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: row.get(0)?,
        user_id: row.get(1)?,
        course_code: row.get(2)?,
        professor_id: row.get(3)?,
        review_id: row.get(4)?,
    })
}

fn notification_from_row(row: &Row) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        course_code: row.get(2)?,
        professor_id: row.get(3)?,
        review_id: row.get(4)?,
        vote_id: row.get(5)?,
        read: row.get(6)?,
        created_at: row.get(7)?,
    })
}
