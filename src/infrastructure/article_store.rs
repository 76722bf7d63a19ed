use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::domain::slugify;
use crate::infrastructure::EnvelopeHandler;
use crate::messaging::{Action, Envelope, Reply, fields};

/// Persisted article record. The author is an embedded snapshot of the
/// user document taken when the article was created.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredArticle {
    slug: String,
    title: String,
    description: String,
    body: String,
    author: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ArticleSubmission {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    body: String,
    author: Value,
}

/// Actor state for the `persistence.articles` address, keyed by slug.
#[derive(Default)]
pub struct ArticleStore {
    articles_by_slug: HashMap<String, StoredArticle>,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&mut self, document: Option<Value>) -> Reply {
        let Some(document) = document else {
            return Reply::failure("article payload is required");
        };
        let submission: ArticleSubmission = match serde_json::from_value(document) {
            Ok(submission) => submission,
            Err(error) => return Reply::failure(format!("malformed article payload: {error}")),
        };

        let slug = slugify(&submission.title);
        if slug.is_empty() {
            return Reply::failure("title must contain at least one alphanumeric character");
        }
        if self.articles_by_slug.contains_key(&slug) {
            return Reply::failure(format!("article with slug '{slug}' already exists"));
        }

        let now = Utc::now();
        let article = StoredArticle {
            slug: slug.clone(),
            title: submission.title,
            description: submission.description,
            body: submission.body,
            author: submission.author,
            created_at: now,
            updated_at: now,
        };
        let details = document_of(&article);
        self.articles_by_slug.insert(slug.clone(), article);

        info!(slug, "article created");
        Reply::success(details)
    }

    fn lookup_by_field(&self, field: Option<&str>, value: Option<&str>) -> Reply {
        let (Some(field), Some(value)) = (field, value) else {
            return Reply::failure("lookup field and value are required");
        };
        if field != "slug" {
            return Reply::failure(format!("unsupported lookup field '{field}'"));
        }
        match self.articles_by_slug.get(value) {
            Some(article) => Reply::success(document_of(article)),
            None => Reply::failure(format!("no article found for slug '{value}'")),
        }
    }

    fn update(&mut self, value: Option<&str>, document: Option<Value>) -> Reply {
        let Some(slug) = value else {
            return Reply::failure("update target slug is required");
        };
        let Some(Value::Object(changes)) = document else {
            return Reply::failure("update document is required");
        };
        // Everything is validated before any field is written, so a failed
        // update leaves the record untouched.
        for (key, value) in &changes {
            if !matches!(key.as_str(), "title" | "description" | "body") {
                return Reply::failure(format!("unsupported update field '{key}'"));
            }
            if !value.is_string() {
                return Reply::failure(format!("update field '{key}' must be a string"));
            }
        }
        let Some(article) = self.articles_by_slug.get_mut(slug) else {
            return Reply::failure(format!("no article found for slug '{slug}'"));
        };

        for (key, value) in &changes {
            let Some(value) = value.as_str() else {
                continue;
            };
            // The slug stays stable across updates; it is the natural key.
            match key.as_str() {
                "title" => article.title = value.to_string(),
                "description" => article.description = value.to_string(),
                "body" => article.body = value.to_string(),
                _ => {}
            }
        }
        article.updated_at = Utc::now();

        info!(slug, "article updated");
        Reply::success(document_of(article))
    }

    fn delete(&mut self, value: Option<&str>) -> Reply {
        let Some(slug) = value else {
            return Reply::failure("delete target slug is required");
        };
        if self.articles_by_slug.remove(slug).is_none() {
            return Reply::failure(format!("no article found for slug '{slug}'"));
        }

        info!(slug, "article deleted");
        Reply::success(Value::Null)
    }
}

#[async_trait]
impl EnvelopeHandler for ArticleStore {
    async fn handle(&mut self, mut envelope: Envelope) -> Reply {
        match envelope.action() {
            Action::CreateArticle => {
                let document = envelope.take_document();
                self.create(document)
            }
            Action::LookupByField => {
                self.lookup_by_field(envelope.field(fields::FIELD), envelope.field(fields::VALUE))
            }
            Action::Update => {
                let slug = envelope.field(fields::VALUE).map(str::to_string);
                let document = envelope.take_document();
                self.update(slug.as_deref(), document)
            }
            Action::Delete => self.delete(envelope.field(fields::VALUE)),
            other => Reply::failure(format!("unsupported action {other:?} for article store")),
        }
    }
}

fn document_of(article: &StoredArticle) -> Value {
    serde_json::to_value(article).unwrap_or(Value::Null)
}
