//! The follow graph and its fan-out notifications.
//!
//! Follows live in a single edge table, so follower and following views can
//! never disagree: toggling writes or deletes one row, and the notification
//! insert shares the same repository scope.

use crate::database::repositories::{FollowRepository, UserRepository};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::notifications::{self, NotificationKind};
use crate::users::UserSummary;
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowOutcome {
    Followed,
    Unfollowed,
}

#[derive(Clone)]
pub struct SocialService {
    database: Database,
}

impl SocialService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Follows the target if not already followed, otherwise unfollows.
    /// Either branch emits the matching notification to the target.
    pub fn follow_toggle(
        &self,
        acting_user_id: &str,
        target_user_id: &str,
    ) -> ServiceResult<FollowOutcome> {
        if acting_user_id == target_user_id {
            return Err(ServiceError::validation(
                "you cannot follow or unfollow yourself",
            ));
        }

        let outcome = self.database.with_repositories(|repos| {
            let users = repos.users();
            if users.get(acting_user_id)?.is_none() || users.get(target_user_id)?.is_none() {
                return Ok(None);
            }

            let follows = repos.follows();
            let outcome = if follows.exists(acting_user_id, target_user_id)? {
                follows.remove(acting_user_id, target_user_id)?;
                notifications::record(
                    &repos,
                    acting_user_id,
                    target_user_id,
                    NotificationKind::Unfollow,
                )?;
                FollowOutcome::Unfollowed
            } else {
                follows.insert(acting_user_id, target_user_id, &now_utc_iso())?;
                notifications::record(
                    &repos,
                    acting_user_id,
                    target_user_id,
                    NotificationKind::Follow,
                )?;
                FollowOutcome::Followed
            };
            Ok(Some(outcome))
        })?;

        outcome.ok_or_else(|| ServiceError::not_found("user not found"))
    }

    pub fn followers(&self, user_id: &str) -> ServiceResult<Vec<UserSummary>> {
        self.member_summaries(user_id, true)
    }

    pub fn following(&self, user_id: &str) -> ServiceResult<Vec<UserSummary>> {
        self.member_summaries(user_id, false)
    }

    fn member_summaries(&self, user_id: &str, followers: bool) -> ServiceResult<Vec<UserSummary>> {
        let summaries = self.database.with_repositories(|repos| {
            let users = repos.users();
            if users.get(user_id)?.is_none() {
                return Ok(None);
            }
            let ids = if followers {
                repos.follows().followers_of(user_id)?
            } else {
                repos.follows().following_of(user_id)?
            };
            let mut summaries = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(record) = users.get(&id)? {
                    summaries.push(UserSummary::from_record(record));
                }
            }
            Ok(Some(summaries))
        })?;
        summaries.ok_or_else(|| ServiceError::not_found("user not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::UserRecord;
    use crate::notifications::NotificationService;

    fn setup() -> (Database, SocialService) {
        let db = Database::open_in_memory().expect("in-memory db");
        let service = SocialService::new(db.clone());
        (db, service)
    }

    fn add_user(db: &Database, id: &str, username: &str) {
        db.with_repositories(|repos| {
            repos.users().create(&UserRecord {
                id: id.into(),
                username: username.into(),
                full_name: username.to_uppercase(),
                email: format!("{username}@students.nust.edu.pk"),
                university: "NUST".into(),
                bio: String::new(),
                link: String::new(),
                created_at: now_utc_iso(),
                updated_at: None,
            })
        })
        .unwrap();
    }

    #[test]
    fn odd_toggles_follow_even_toggles_unfollow() {
        let (db, service) = setup();
        add_user(&db, "a", "alice");
        add_user(&db, "b", "bob");

        assert_eq!(
            service.follow_toggle("a", "b").unwrap(),
            FollowOutcome::Followed
        );
        assert_eq!(service.following("a").unwrap().len(), 1);
        assert_eq!(service.followers("b").unwrap().len(), 1);

        assert_eq!(
            service.follow_toggle("a", "b").unwrap(),
            FollowOutcome::Unfollowed
        );
        assert!(service.following("a").unwrap().is_empty());
        assert!(service.followers("b").unwrap().is_empty());

        assert_eq!(
            service.follow_toggle("a", "b").unwrap(),
            FollowOutcome::Followed
        );
        assert_eq!(service.followers("b").unwrap()[0].username, "alice");
    }

    #[test]
    fn self_follow_always_rejected() {
        let (db, service) = setup();
        add_user(&db, "a", "alice");

        let err = service.follow_toggle("a", "a").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        // Missing users also never reach the graph.
        let err = service.follow_toggle("a", "ghost").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn both_branches_notify_the_target() {
        let (db, service) = setup();
        add_user(&db, "a", "alice");
        add_user(&db, "b", "bob");
        let notifications = NotificationService::new(db.clone());

        service.follow_toggle("a", "b").unwrap();
        assert_eq!(notifications.count_unread("b").unwrap(), 1);

        service.follow_toggle("a", "b").unwrap();
        let views = notifications.list("b").unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].kind, "unfollow");
        assert_eq!(views[1].kind, "follow");
        assert_eq!(notifications.count_unread("b").unwrap(), 2);
    }
}
