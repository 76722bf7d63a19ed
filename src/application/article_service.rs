use std::sync::Arc;

use serde_json::{Map, Value};

use crate::application::resolve_user;
use crate::auth::TokenAuthority;
use crate::domain::{Article, ArticleDraft, ArticlePatch, ArticleView, FlowError};
use crate::messaging::{ARTICLES_ADDRESS, Action, Envelope, MessageBus, fields};

#[derive(Clone)]
pub struct ArticleService {
    bus: Arc<MessageBus>,
    tokens: Arc<TokenAuthority>,
}

impl ArticleService {
    pub fn new(bus: Arc<MessageBus>, tokens: Arc<TokenAuthority>) -> Self {
        Self { bus, tokens }
    }

    pub async fn article(&self, slug: &str) -> Result<ArticleView, FlowError> {
        if slug.trim().is_empty() {
            return Err(FlowError::validation("slug must not be empty"));
        }

        let details = self
            .bus
            .send(
                ARTICLES_ADDRESS,
                Envelope::new(Action::LookupByField)
                    .with_field(fields::FIELD, "slug")
                    .with_field(fields::VALUE, slug),
            )
            .await?;

        let article: Article = serde_json::from_value(details)?;
        Ok(article.view())
    }

    /// Resolves the author from the verified token and attaches the user
    /// document to the submitted draft before persisting.
    pub async fn create(&self, token: &str, draft: ArticleDraft) -> Result<ArticleView, FlowError> {
        let author = resolve_user(&self.bus, &self.tokens, token).await?;

        let mut document = serde_json::to_value(&draft)?;
        document["author"] = serde_json::to_value(&author)?;

        let details = self
            .bus
            .send(
                ARTICLES_ADDRESS,
                Envelope::new(Action::CreateArticle).with_document(document),
            )
            .await?;

        let article: Article = serde_json::from_value(details)?;
        Ok(article.view())
    }

    /// The update diff carries only title/description/body; the author is
    /// fixed by the verified token and cannot be reassigned here.
    pub async fn update(
        &self,
        token: &str,
        slug: &str,
        patch: ArticlePatch,
    ) -> Result<ArticleView, FlowError> {
        if slug.trim().is_empty() {
            return Err(FlowError::validation("slug must not be empty"));
        }

        resolve_user(&self.bus, &self.tokens, token).await?;

        let mut changes = Map::new();
        for (key, value) in [
            ("title", &patch.title),
            ("description", &patch.description),
            ("body", &patch.body),
        ] {
            if let Some(value) = value {
                changes.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        let details = self
            .bus
            .send(
                ARTICLES_ADDRESS,
                Envelope::new(Action::Update)
                    .with_field(fields::FIELD, "slug")
                    .with_field(fields::VALUE, slug)
                    .with_document(Value::Object(changes)),
            )
            .await?;

        let article: Article = serde_json::from_value(details)?;
        Ok(article.view())
    }

    pub async fn delete(&self, token: &str, slug: &str) -> Result<(), FlowError> {
        if slug.trim().is_empty() {
            return Err(FlowError::validation("slug must not be empty"));
        }

        resolve_user(&self.bus, &self.tokens, token).await?;

        self.bus
            .send(
                ARTICLES_ADDRESS,
                Envelope::new(Action::Delete)
                    .with_field(fields::FIELD, "slug")
                    .with_field(fields::VALUE, slug),
            )
            .await?;

        Ok(())
    }
}
