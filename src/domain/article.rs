use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::{ProfileView, User};

/// Transient copy of a persisted article. The author is an embedded snapshot
/// of the user document, looked up from the verified token at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
    pub author: User,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn view(&self) -> ArticleView {
        ArticleView {
            slug: self.slug.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            body: self.body.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            author: self.author.profile(false),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: ProfileView,
}

/// New article payload as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
}

/// Partial article fields submitted to the update endpoint. Author
/// reassignment is not representable here; the author always comes from the
/// verified token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticlePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Derives the natural lookup key from a title: lowercased, runs of
/// non-alphanumeric characters collapsed to a single `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_separator = true;
        }
    }

    slug
}
