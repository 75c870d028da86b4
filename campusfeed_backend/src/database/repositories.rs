use super::models::{CommentRecord, NotificationRecord, PostRecord, UserRecord};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

pub trait UserRepository {
    fn create(&self, record: &UserRecord) -> Result<()>;
    fn update(&self, record: &UserRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<UserRecord>>;
    fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>>;
    fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>>;
    /// Random sample of users excluding the given one, for suggestions.
    fn sample_excluding(&self, user_id: &str, limit: usize) -> Result<Vec<UserRecord>>;
}

pub trait PostRepository {
    fn create(&self, record: &PostRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<PostRecord>>;
    fn delete(&self, id: &str) -> Result<bool>;
    fn page_all(&self, limit: usize, offset: usize) -> Result<Vec<PostRecord>>;
    fn count_all(&self) -> Result<usize>;
    fn page_public_by_authors(
        &self,
        author_ids: &[String],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostRecord>>;
    fn count_public_by_authors(&self, author_ids: &[String]) -> Result<usize>;
    fn page_public_by_category(
        &self,
        category: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostRecord>>;
    fn count_public_by_category(&self, category: &str) -> Result<usize>;
    /// Fetches the given posts sorted most recent first.
    fn get_many(&self, ids: &[String]) -> Result<Vec<PostRecord>>;
}

pub trait CommentRepository {
    fn add(&self, record: &CommentRecord) -> Result<()>;
    fn list_for_post(&self, post_id: &str) -> Result<Vec<CommentRecord>>;
    fn count_for_post(&self, post_id: &str) -> Result<usize>;
}

pub trait LikeRepository {
    /// Returns false when the like already existed.
    fn add(&self, post_id: &str, user_id: &str, created_at: &str) -> Result<bool>;
    /// Returns false when there was no like to remove.
    fn remove(&self, post_id: &str, user_id: &str) -> Result<bool>;
    fn exists(&self, post_id: &str, user_id: &str) -> Result<bool>;
    fn count_for_post(&self, post_id: &str) -> Result<usize>;
    /// Post ids liked by the user in like-insertion order, oldest first.
    fn liked_post_ids(&self, user_id: &str) -> Result<Vec<String>>;
}

pub trait FollowRepository {
    fn insert(&self, follower_id: &str, followee_id: &str, created_at: &str) -> Result<bool>;
    fn remove(&self, follower_id: &str, followee_id: &str) -> Result<bool>;
    fn exists(&self, follower_id: &str, followee_id: &str) -> Result<bool>;
    fn followers_of(&self, user_id: &str) -> Result<Vec<String>>;
    fn following_of(&self, user_id: &str) -> Result<Vec<String>>;
}

pub trait NotificationRepository {
    fn create(&self, record: &NotificationRecord) -> Result<()>;
    fn list_for_user(&self, user_id: &str) -> Result<Vec<NotificationRecord>>;
    /// Scoped to the target user so only they can flip the read flag.
    fn mark_read(&self, id: &str, to_user_id: &str) -> Result<bool>;
    fn clear_for_user(&self, user_id: &str) -> Result<usize>;
    fn count_unread(&self, user_id: &str) -> Result<usize>;
}

pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn users(&self) -> impl UserRepository + '_ {
        SqliteUserRepository { conn: self.conn }
    }

    pub fn posts(&self) -> impl PostRepository + '_ {
        SqlitePostRepository { conn: self.conn }
    }

    pub fn comments(&self) -> impl CommentRepository + '_ {
        SqliteCommentRepository { conn: self.conn }
    }

    pub fn likes(&self) -> impl LikeRepository + '_ {
        SqliteLikeRepository { conn: self.conn }
    }

    pub fn follows(&self) -> impl FollowRepository + '_ {
        SqliteFollowRepository { conn: self.conn }
    }

    pub fn notifications(&self) -> impl NotificationRepository + '_ {
        SqliteNotificationRepository { conn: self.conn }
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        email: row.get(3)?,
        university: row.get(4)?,
        bio: row.get(5)?,
        link: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRecord> {
    Ok(PostRecord {
        id: row.get(0)?,
        author_id: row.get(1)?,
        body: row.get(2)?,
        image_url: row.get(3)?,
        category: row.get(4)?,
        university: row.get(5)?,
        anonymous: row.get::<_, i64>(6)? != 0,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const USER_COLUMNS: &str =
    "id, username, full_name, email, university, bio, link, created_at, updated_at";
const POST_COLUMNS: &str =
    "id, author_id, body, image_url, category, university, anonymous, created_at, updated_at";

struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> UserRepository for SqliteUserRepository<'conn> {
    fn create(&self, record: &UserRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO users (id, username, full_name, email, university, bio, link, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.id,
                record.username,
                record.full_name,
                record.email,
                record.university,
                record.bio,
                record.link,
                record.created_at,
                record.updated_at
            ],
        )?;
        Ok(())
    }

    fn update(&self, record: &UserRecord) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE users
            SET username = ?2, full_name = ?3, email = ?4, university = ?5,
                bio = ?6, link = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
            params![
                record.id,
                record.username,
                record.full_name,
                record.email,
                record.university,
                record.bio,
                record.link,
                record.updated_at
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], user_from_row)
            .optional()?)
    }

    fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![username], user_from_row)
            .optional()?)
    }

    fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![email], user_from_row)
            .optional()?)
    }

    fn sample_excluding(&self, user_id: &str, limit: usize) -> Result<Vec<UserRecord>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id != ?1 ORDER BY RANDOM() LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, limit as i64], user_from_row)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }
}

struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    fn count(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl<'conn> PostRepository for SqlitePostRepository<'conn> {
    fn create(&self, record: &PostRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO posts (id, author_id, body, image_url, category, university, anonymous, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.id,
                record.author_id,
                record.body,
                record.image_url,
                record.category,
                record.university,
                if record.anonymous { 1 } else { 0 },
                record.created_at,
                record.updated_at
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<PostRecord>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], post_from_row)
            .optional()?)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn page_all(&self, limit: usize, offset: usize) -> Result<Vec<PostRecord>> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            ORDER BY datetime(created_at) DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64, offset as i64], post_from_row)?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }

    fn count_all(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM posts", &[])
    }

    fn page_public_by_authors(
        &self,
        author_ids: &[String],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostRecord>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; author_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE anonymous = 0 AND author_id IN ({placeholders})
            ORDER BY datetime(created_at) DESC, rowid DESC
            LIMIT ? OFFSET ?
            "#
        );
        let limit = limit as i64;
        let offset = offset as i64;
        let mut bound: Vec<&dyn ToSql> = author_ids.iter().map(|id| id as &dyn ToSql).collect();
        bound.push(&limit);
        bound.push(&offset);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(bound.as_slice(), post_from_row)?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }

    fn count_public_by_authors(&self, author_ids: &[String]) -> Result<usize> {
        if author_ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; author_ids.len()].join(", ");
        let sql = format!(
            "SELECT COUNT(*) FROM posts WHERE anonymous = 0 AND author_id IN ({placeholders})"
        );
        let bound: Vec<&dyn ToSql> = author_ids.iter().map(|id| id as &dyn ToSql).collect();
        self.count(&sql, bound.as_slice())
    }

    fn page_public_by_category(
        &self,
        category: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostRecord>> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE anonymous = 0 AND category = ?1
            ORDER BY datetime(created_at) DESC, rowid DESC
            LIMIT ?2 OFFSET ?3
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![category, limit as i64, offset as i64],
            post_from_row,
        )?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }

    fn count_public_by_category(&self, category: &str) -> Result<usize> {
        self.count(
            "SELECT COUNT(*) FROM posts WHERE anonymous = 0 AND category = ?1",
            &[&category as &dyn ToSql],
        )
    }

    fn get_many(&self, ids: &[String]) -> Result<Vec<PostRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE id IN ({placeholders})
            ORDER BY datetime(created_at) DESC, rowid DESC
            "#
        );
        let bound: Vec<&dyn ToSql> = ids.iter().map(|id| id as &dyn ToSql).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(bound.as_slice(), post_from_row)?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }
}

struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> CommentRepository for SqliteCommentRepository<'conn> {
    fn add(&self, record: &CommentRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO comments (id, post_id, author_id, body, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.id,
                record.post_id,
                record.author_id,
                record.body,
                record.created_at
            ],
        )?;
        Ok(())
    }

    fn list_for_post(&self, post_id: &str) -> Result<Vec<CommentRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, post_id, author_id, body, created_at
            FROM comments
            WHERE post_id = ?1
            ORDER BY rowid ASC
            "#,
        )?;
        let rows = stmt.query_map(params![post_id], |row| {
            Ok(CommentRecord {
                id: row.get(0)?,
                post_id: row.get(1)?,
                author_id: row.get(2)?,
                body: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }

    fn count_for_post(&self, post_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

struct SqliteLikeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> LikeRepository for SqliteLikeRepository<'conn> {
    fn add(&self, post_id: &str, user_id: &str, created_at: &str) -> Result<bool> {
        let inserted = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO post_likes (post_id, user_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![post_id, user_id, created_at],
        )?;
        Ok(inserted > 0)
    }

    fn remove(&self, post_id: &str, user_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM post_likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
        )?;
        Ok(removed > 0)
    }

    fn exists(&self, post_id: &str, user_id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM post_likes WHERE post_id = ?1 AND user_id = ?2",
                params![post_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn count_for_post(&self, post_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM post_likes WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn liked_post_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT post_id FROM post_likes
            WHERE user_id = ?1
            ORDER BY rowid ASC
            "#,
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}

struct SqliteFollowRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> FollowRepository for SqliteFollowRepository<'conn> {
    fn insert(&self, follower_id: &str, followee_id: &str, created_at: &str) -> Result<bool> {
        let inserted = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO follows (follower_id, followee_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![follower_id, followee_id, created_at],
        )?;
        Ok(inserted > 0)
    }

    fn remove(&self, follower_id: &str, followee_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
            params![follower_id, followee_id],
        )?;
        Ok(removed > 0)
    }

    fn exists(&self, follower_id: &str, followee_id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
                params![follower_id, followee_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn followers_of(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT follower_id FROM follows
            WHERE followee_id = ?1
            ORDER BY datetime(created_at) ASC, rowid ASC
            "#,
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    fn following_of(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT followee_id FROM follows
            WHERE follower_id = ?1
            ORDER BY datetime(created_at) ASC, rowid ASC
            "#,
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}

struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> NotificationRepository for SqliteNotificationRepository<'conn> {
    fn create(&self, record: &NotificationRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO notifications (id, from_user_id, to_user_id, kind, is_read, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.from_user_id,
                record.to_user_id,
                record.kind,
                if record.is_read { 1 } else { 0 },
                record.created_at
            ],
        )?;
        Ok(())
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<NotificationRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, from_user_id, to_user_id, kind, is_read, created_at
            FROM notifications
            WHERE to_user_id = ?1
            ORDER BY datetime(created_at) DESC, rowid DESC
            "#,
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(NotificationRecord {
                id: row.get(0)?,
                from_user_id: row.get(1)?,
                to_user_id: row.get(2)?,
                kind: row.get(3)?,
                is_read: row.get::<_, i64>(4)? != 0,
                created_at: row.get(5)?,
            })
        })?;
        let mut notifications = Vec::new();
        for row in rows {
            notifications.push(row?);
        }
        Ok(notifications)
    }

    fn mark_read(&self, id: &str, to_user_id: &str) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND to_user_id = ?2",
            params![id, to_user_id],
        )?;
        Ok(updated > 0)
    }

    fn clear_for_user(&self, user_id: &str) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM notifications WHERE to_user_id = ?1",
            params![user_id],
        )?;
        Ok(deleted)
    }

    fn count_unread(&self, user_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE to_user_id = ?1 AND is_read = 0",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MIGRATIONS;

    fn setup_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        conn.execute_batch(MIGRATIONS).expect("migrations");
        conn
    }

    fn user(id: &str, username: &str, university: &str) -> UserRecord {
        UserRecord {
            id: id.into(),
            username: username.into(),
            full_name: username.to_uppercase(),
            email: format!("{username}@students.nust.edu.pk"),
            university: university.into(),
            bio: String::new(),
            link: String::new(),
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: None,
        }
    }

    fn post(id: &str, author_id: &str, created_at: &str, anonymous: bool) -> PostRecord {
        PostRecord {
            id: id.into(),
            author_id: author_id.into(),
            body: format!("body of {id}"),
            image_url: None,
            category: "Events".into(),
            university: "NUST".into(),
            anonymous,
            created_at: created_at.into(),
            updated_at: None,
        }
    }

    #[test]
    fn user_repository_round_trips() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);

        let record = user("u1", "alice", "NUST");
        repos.users().create(&record).unwrap();

        let fetched = repos.users().get("u1").unwrap().unwrap();
        assert_eq!(fetched.username, "alice");
        assert!(repos.users().get_by_username("alice").unwrap().is_some());
        assert!(repos
            .users()
            .get_by_email("alice@students.nust.edu.pk")
            .unwrap()
            .is_some());
        assert!(repos.users().get("missing").unwrap().is_none());
    }

    #[test]
    fn post_pagination_orders_most_recent_first() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        repos.users().create(&user("u1", "alice", "NUST")).unwrap();

        repos
            .posts()
            .create(&post("p1", "u1", "2024-01-01T00:00:00Z", false))
            .unwrap();
        repos
            .posts()
            .create(&post("p2", "u1", "2024-01-02T00:00:00Z", false))
            .unwrap();
        repos
            .posts()
            .create(&post("p3", "u1", "2024-01-03T00:00:00Z", true))
            .unwrap();

        let page = repos.posts().page_all(2, 0).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "p3");
        assert_eq!(page[1].id, "p2");
        assert_eq!(repos.posts().count_all().unwrap(), 3);

        // Author-scoped reads exclude anonymous posts.
        let by_author = repos
            .posts()
            .page_public_by_authors(&["u1".to_string()], 10, 0)
            .unwrap();
        assert_eq!(by_author.len(), 2);
        assert_eq!(
            repos
                .posts()
                .count_public_by_authors(&["u1".to_string()])
                .unwrap(),
            2
        );
    }

    #[test]
    fn like_set_semantics_never_duplicate() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        repos.users().create(&user("u1", "alice", "NUST")).unwrap();
        repos
            .posts()
            .create(&post("p1", "u1", "2024-01-01T00:00:00Z", false))
            .unwrap();

        assert!(repos.likes().add("p1", "u1", "2024-01-01T01:00:00Z").unwrap());
        assert!(!repos.likes().add("p1", "u1", "2024-01-01T02:00:00Z").unwrap());
        assert_eq!(repos.likes().count_for_post("p1").unwrap(), 1);
        assert!(repos.likes().remove("p1", "u1").unwrap());
        assert!(!repos.likes().remove("p1", "u1").unwrap());
    }

    #[test]
    fn liked_post_ids_preserve_insertion_order() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        repos.users().create(&user("u1", "alice", "NUST")).unwrap();
        for (id, created) in [
            ("p1", "2024-01-03T00:00:00Z"),
            ("p2", "2024-01-01T00:00:00Z"),
            ("p3", "2024-01-02T00:00:00Z"),
        ] {
            repos.posts().create(&post(id, "u1", created, false)).unwrap();
        }

        // Liked newest-created last; insertion order is what we keep.
        repos.likes().add("p2", "u1", "2024-02-01T00:00:00Z").unwrap();
        repos.likes().add("p1", "u1", "2024-02-02T00:00:00Z").unwrap();
        repos.likes().add("p3", "u1", "2024-02-03T00:00:00Z").unwrap();

        let ids = repos.likes().liked_post_ids("u1").unwrap();
        assert_eq!(ids, vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn follow_edges_are_symmetric_views_of_one_row() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        repos.users().create(&user("u1", "alice", "NUST")).unwrap();
        repos.users().create(&user("u2", "bob", "NUST")).unwrap();

        assert!(repos.follows().insert("u1", "u2", "2024-01-01T00:00:00Z").unwrap());
        assert!(repos.follows().exists("u1", "u2").unwrap());
        assert!(!repos.follows().exists("u2", "u1").unwrap());
        assert_eq!(repos.follows().following_of("u1").unwrap(), vec!["u2"]);
        assert_eq!(repos.follows().followers_of("u2").unwrap(), vec!["u1"]);

        assert!(repos.follows().remove("u1", "u2").unwrap());
        assert!(repos.follows().following_of("u1").unwrap().is_empty());
        assert!(repos.follows().followers_of("u2").unwrap().is_empty());
    }

    #[test]
    fn notifications_list_clear_and_count() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        repos.users().create(&user("u1", "alice", "NUST")).unwrap();
        repos.users().create(&user("u2", "bob", "NUST")).unwrap();

        for (id, kind, created) in [
            ("n1", "follow", "2024-01-01T00:00:00Z"),
            ("n2", "like", "2024-01-02T00:00:00Z"),
        ] {
            repos
                .notifications()
                .create(&NotificationRecord {
                    id: id.into(),
                    from_user_id: "u1".into(),
                    to_user_id: "u2".into(),
                    kind: kind.into(),
                    is_read: false,
                    created_at: created.into(),
                })
                .unwrap();
        }

        let listed = repos.notifications().list_for_user("u2").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "n2");

        assert!(repos.notifications().mark_read("n1", "u2").unwrap());
        assert!(!repos.notifications().mark_read("missing", "u2").unwrap());
        // Wrong target user cannot flip the flag.
        assert!(!repos.notifications().mark_read("n2", "u1").unwrap());
        assert_eq!(repos.notifications().count_unread("u2").unwrap(), 1);

        assert_eq!(repos.notifications().clear_for_user("u2").unwrap(), 2);
        assert_eq!(repos.notifications().count_unread("u2").unwrap(), 0);
    }
}
