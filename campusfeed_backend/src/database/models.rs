use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub university: String,
    pub bio: String,
    pub link: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    /// Always the true author, even for anonymous posts. Anonymity is a
    /// display hint; authorization and notifications use this field.
    pub author_id: String,
    pub body: String,
    pub image_url: Option<String>,
    pub category: String,
    /// Institution stamped from the author at creation, immutable afterwards.
    pub university: String,
    pub anonymous: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub kind: String,
    pub is_read: bool,
    pub created_at: String,
}
