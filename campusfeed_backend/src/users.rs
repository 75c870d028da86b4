//! Member accounts: registration, profile reads and updates, suggestions.
//!
//! Credential custody lives elsewhere; this service only owns the profile
//! record and its derived institution. The one-time-code delivery on signup
//! is fire-and-forget through the `CodeSender` capability.

use crate::database::models::UserRecord;
use crate::database::repositories::{FollowRepository, UserRepository};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::oracles::CodeSender;
use crate::university;
use crate::utils::now_utc_iso;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub university: String,
}

impl UserSummary {
    pub(crate) fn from_record(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            full_name: record.full_name,
            university: record.university,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub university: String,
    pub bio: String,
    pub link: String,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub link: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    database: Database,
    code_sender: Arc<dyn CodeSender>,
}

impl UserService {
    pub fn new(database: Database, code_sender: Arc<dyn CodeSender>) -> Self {
        Self {
            database,
            code_sender,
        }
    }

    pub fn register(&self, input: RegisterInput) -> ServiceResult<UserProfile> {
        if input.username.trim().is_empty()
            || input.full_name.trim().is_empty()
            || input.email.trim().is_empty()
        {
            return Err(ServiceError::validation(
                "username, full name, and email are required",
            ));
        }
        if !email_regex().is_match(&input.email) {
            return Err(ServiceError::validation("invalid email format"));
        }
        let Some(institution) = university::resolve(&input.email) else {
            return Err(ServiceError::validation(
                "email does not belong to a recognized university",
            ));
        };

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: input.username.clone(),
            full_name: input.full_name.clone(),
            email: input.email.clone(),
            university: institution.to_string(),
            bio: input.bio.clone(),
            link: String::new(),
            created_at: now_utc_iso(),
            updated_at: None,
        };

        let created = self.database.with_repositories(|repos| {
            let users = repos.users();
            if users.get_by_username(&record.username)?.is_some()
                || users.get_by_email(&record.email)?.is_some()
            {
                return Ok(false);
            }
            users.create(&record)?;
            Ok(true)
        })?;
        if !created {
            return Err(ServiceError::validation("user already exists"));
        }

        self.deliver_verification_code(record.email.clone());

        self.get_profile(&record.id)
    }

    /// Fire-and-forget: delivery failure is logged, never propagated to the
    /// signup caller.
    fn deliver_verification_code(&self, email: String) {
        let code = format!("{:06}", rand::rng().random_range(100_000..1_000_000));
        let sender = self.code_sender.clone();
        tokio::spawn(async move {
            if let Err(err) = sender.send(&email, &code).await {
                tracing::warn!(error = %err, "one-time code delivery failed");
            }
        });
    }

    pub fn get_profile(&self, user_id: &str) -> ServiceResult<UserProfile> {
        let profile = self.database.with_repositories(|repos| {
            let Some(record) = repos.users().get(user_id)? else {
                return Ok(None);
            };
            let followers = repos.follows().followers_of(user_id)?;
            let following = repos.follows().following_of(user_id)?;
            Ok(Some(UserProfile {
                id: record.id,
                username: record.username,
                full_name: record.full_name,
                email: record.email,
                university: record.university,
                bio: record.bio,
                link: record.link,
                followers,
                following,
                created_at: record.created_at,
            }))
        })?;
        profile.ok_or_else(|| ServiceError::not_found("user not found"))
    }

    pub fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> ServiceResult<UserProfile> {
        // Resolver check happens outside the repository scope so a rejected
        // email never reaches the record.
        let new_institution = match &input.email {
            Some(email) => {
                if !email_regex().is_match(email) {
                    return Err(ServiceError::validation("invalid email format"));
                }
                match university::resolve(email) {
                    Some(institution) => Some(institution.to_string()),
                    None => {
                        return Err(ServiceError::validation(
                            "email does not belong to a recognized university",
                        ))
                    }
                }
            }
            None => None,
        };

        enum Outcome {
            Updated(UserRecord),
            Missing,
            UsernameTaken,
            EmailTaken,
        }

        let outcome = self.database.with_repositories(|repos| {
            let users = repos.users();
            let Some(mut record) = users.get(user_id)? else {
                return Ok(Outcome::Missing);
            };

            if let Some(username) = &input.username {
                if username != &record.username {
                    if users.get_by_username(username)?.is_some() {
                        return Ok(Outcome::UsernameTaken);
                    }
                    record.username = username.clone();
                }
            }
            if let Some(email) = &input.email {
                if email != &record.email && users.get_by_email(email)?.is_some() {
                    return Ok(Outcome::EmailTaken);
                }
                record.email = email.clone();
            }
            if let Some(institution) = &new_institution {
                // Institution follows the email; recomputed only here.
                record.university = institution.clone();
            }
            if let Some(full_name) = &input.full_name {
                record.full_name = full_name.clone();
            }
            if let Some(bio) = &input.bio {
                record.bio = bio.clone();
            }
            if let Some(link) = &input.link {
                record.link = link.clone();
            }
            record.updated_at = Some(now_utc_iso());
            users.update(&record)?;
            Ok(Outcome::Updated(record))
        })?;

        match outcome {
            Outcome::Updated(record) => self.get_profile(&record.id),
            Outcome::Missing => Err(ServiceError::not_found("user not found")),
            Outcome::UsernameTaken => Err(ServiceError::validation("username already taken")),
            Outcome::EmailTaken => Err(ServiceError::validation("email already in use")),
        }
    }

    /// Up to five members the actor does not yet follow, sampled at random.
    pub fn suggested(&self, user_id: &str) -> ServiceResult<Vec<UserSummary>> {
        let suggestions = self.database.with_repositories(|repos| {
            let following = repos.follows().following_of(user_id)?;
            let candidates = repos.users().sample_excluding(user_id, 10)?;
            Ok(candidates
                .into_iter()
                .filter(|candidate| !following.contains(&candidate.id))
                .take(5)
                .map(UserSummary::from_record)
                .collect())
        })?;
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracles::{LoggingCodeSender, OracleError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingSender(Mutex<Vec<(String, String)>>);

    #[async_trait]
    impl CodeSender for RecordingSender {
        async fn send(&self, address: &str, code: &str) -> Result<(), OracleError> {
            self.0
                .lock()
                .unwrap()
                .push((address.to_string(), code.to_string()));
            Ok(())
        }
    }

    fn service() -> UserService {
        let db = Database::open_in_memory().expect("in-memory db");
        UserService::new(db, Arc::new(LoggingCodeSender))
    }

    fn register_input(username: &str, email: &str) -> RegisterInput {
        RegisterInput {
            username: username.into(),
            full_name: format!("{username} khan"),
            email: email.into(),
            bio: String::new(),
        }
    }

    #[tokio::test]
    async fn register_stamps_institution_from_email() {
        let service = service();
        let profile = service
            .register(register_input("ali", "ali@students.nust.edu.pk"))
            .unwrap();
        assert_eq!(profile.university, "NUST");
        assert!(profile.followers.is_empty());
    }

    #[tokio::test]
    async fn register_rejects_unrecognized_domain_and_duplicates() {
        let service = service();
        let err = service
            .register(register_input("ali", "ali@example.com"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        service
            .register(register_input("ali", "ali@students.nust.edu.pk"))
            .unwrap();
        let err = service
            .register(register_input("ali", "ali2@students.nust.edu.pk"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn register_sends_one_time_code() {
        let db = Database::open_in_memory().expect("in-memory db");
        let sender = Arc::new(RecordingSender(Mutex::new(Vec::new())));
        let service = UserService::new(db, sender.clone());

        service
            .register(register_input("ali", "ali@students.nust.edu.pk"))
            .unwrap();
        // Delivery is spawned; give it a tick.
        tokio::task::yield_now().await;

        let sent = sender.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "ali@students.nust.edu.pk");
        assert_eq!(sent[0].1.len(), 6);
    }

    #[tokio::test]
    async fn email_change_recomputes_institution() {
        let service = service();
        let profile = service
            .register(register_input("ali", "ali@students.nust.edu.pk"))
            .unwrap();

        let updated = service
            .update_profile(
                &profile.id,
                UpdateProfileInput {
                    email: Some("ali@students.lums.edu.pk".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.university, "LUMS");

        let err = service
            .update_profile(
                &profile.id,
                UpdateProfileInput {
                    email: Some("ali@nowhere.com".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        // Rejected update left the record untouched.
        assert_eq!(service.get_profile(&profile.id).unwrap().university, "LUMS");
    }

    #[tokio::test]
    async fn suggestions_exclude_self() {
        let service = service();
        let me = service
            .register(register_input("ali", "ali@students.nust.edu.pk"))
            .unwrap();
        service
            .register(register_input("sara", "sara@students.lums.edu.pk"))
            .unwrap();

        let suggestions = service.suggested(&me.id).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].username, "sara");
    }
}
