//! Append-only notification records for follow, unfollow, and like events.
//!
//! Delivery is pull-based: clients poll the unread count. Records are never
//! mutated except the read flag, and never deleted individually; the target
//! user may bulk-clear their list.

use crate::database::models::NotificationRecord;
use crate::database::repositories::{NotificationRepository, SqliteRepositories, UserRepository};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::utils::now_utc_iso;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Follow,
    Unfollow,
    Like,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Follow => "follow",
            NotificationKind::Unfollow => "unfollow",
            NotificationKind::Like => "like",
        }
    }
}

/// Inserts a notification inside the caller's repository scope so the write
/// lands in the same transaction as the graph or like mutation.
pub(crate) fn record(
    repos: &SqliteRepositories<'_>,
    from_user_id: &str,
    to_user_id: &str,
    kind: NotificationKind,
) -> Result<()> {
    repos.notifications().create(&NotificationRecord {
        id: Uuid::new_v4().to_string(),
        from_user_id: from_user_id.to_string(),
        to_user_id: to_user_id.to_string(),
        kind: kind.as_str().to_string(),
        is_read: false,
        created_at: now_utc_iso(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: String,
    pub from_user_id: String,
    pub from_username: Option<String>,
    pub kind: String,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Clone)]
pub struct NotificationService {
    database: Database,
}

impl NotificationService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Most recent first.
    pub fn list(&self, user_id: &str) -> ServiceResult<Vec<NotificationView>> {
        let views = self.database.with_repositories(|repos| {
            let records = repos.notifications().list_for_user(user_id)?;
            let mut views = Vec::with_capacity(records.len());
            for record in records {
                let from_username = repos
                    .users()
                    .get(&record.from_user_id)?
                    .map(|user| user.username);
                views.push(NotificationView {
                    id: record.id,
                    from_user_id: record.from_user_id,
                    from_username,
                    kind: record.kind,
                    is_read: record.is_read,
                    created_at: record.created_at,
                });
            }
            Ok(views)
        })?;
        Ok(views)
    }

    /// Flips the read flag; the only mutation a notification ever sees.
    /// Only the target user's own notifications are reachable.
    pub fn mark_read(&self, notification_id: &str, user_id: &str) -> ServiceResult<()> {
        let updated = self
            .database
            .with_repositories(|repos| repos.notifications().mark_read(notification_id, user_id))?;
        if !updated {
            return Err(ServiceError::not_found("notification not found"));
        }
        Ok(())
    }

    pub fn clear_all(&self, user_id: &str) -> ServiceResult<usize> {
        let deleted = self
            .database
            .with_repositories(|repos| repos.notifications().clear_for_user(user_id))?;
        Ok(deleted)
    }

    pub fn count_unread(&self, user_id: &str) -> ServiceResult<usize> {
        let count = self
            .database
            .with_repositories(|repos| repos.notifications().count_unread(user_id))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::UserRecord;

    fn setup() -> (Database, NotificationService) {
        let db = Database::open_in_memory().expect("in-memory db");
        let service = NotificationService::new(db.clone());
        (db, service)
    }

    fn add_user(db: &Database, id: &str, username: &str) {
        db.with_repositories(|repos| {
            repos.users().create(&UserRecord {
                id: id.into(),
                username: username.into(),
                full_name: username.to_uppercase(),
                email: format!("{username}@students.lums.edu.pk"),
                university: "LUMS".into(),
                bio: String::new(),
                link: String::new(),
                created_at: now_utc_iso(),
                updated_at: None,
            })
        })
        .unwrap();
    }

    #[test]
    fn list_includes_sender_username_most_recent_first() {
        let (db, service) = setup();
        add_user(&db, "u1", "alice");
        add_user(&db, "u2", "bob");

        db.with_repositories(|repos| {
            record(&repos, "u1", "u2", NotificationKind::Follow)?;
            record(&repos, "u1", "u2", NotificationKind::Like)?;
            Ok(())
        })
        .unwrap();

        let views = service.list("u2").unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].kind, "like");
        assert_eq!(views[1].kind, "follow");
        assert_eq!(views[0].from_username.as_deref(), Some("alice"));
    }

    #[test]
    fn mark_read_and_unread_count() {
        let (db, service) = setup();
        add_user(&db, "u1", "alice");
        add_user(&db, "u2", "bob");

        db.with_repositories(|repos| record(&repos, "u1", "u2", NotificationKind::Follow))
            .unwrap();

        assert_eq!(service.count_unread("u2").unwrap(), 1);
        let id = service.list("u2").unwrap()[0].id.clone();

        // Only the target user can mark it read.
        let err = service.mark_read(&id, "u1").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        service.mark_read(&id, "u2").unwrap();
        assert_eq!(service.count_unread("u2").unwrap(), 0);

        let err = service.mark_read("missing", "u2").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn clear_all_reports_deleted_count() {
        let (db, service) = setup();
        add_user(&db, "u1", "alice");
        add_user(&db, "u2", "bob");

        db.with_repositories(|repos| {
            record(&repos, "u1", "u2", NotificationKind::Follow)?;
            record(&repos, "u1", "u2", NotificationKind::Unfollow)?;
            Ok(())
        })
        .unwrap();

        assert_eq!(service.clear_all("u2").unwrap(), 2);
        assert!(service.list("u2").unwrap().is_empty());
        assert_eq!(service.clear_all("u2").unwrap(), 0);
    }
}
