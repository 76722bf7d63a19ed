use serde::{Deserialize, Serialize};

use crate::domain::{
    ArticleDraft, ArticlePatch, ArticleView, Credentials, ProfileView, Registration, UserPatch,
    UserView,
};

// Request bodies arrive under the `user` / `article` wrappers.

#[derive(Debug, Deserialize)]
pub struct RegistrationBody {
    pub user: Registration,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    pub user: Credentials,
}

#[derive(Debug, Deserialize)]
pub struct UserPatchBody {
    pub user: UserPatch,
}

#[derive(Debug, Deserialize)]
pub struct ArticleDraftBody {
    pub article: ArticleDraft,
}

#[derive(Debug, Deserialize)]
pub struct ArticlePatchBody {
    pub article: ArticlePatch,
}

// Response bodies mirror the same wrappers.

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct ProfileBody {
    pub profile: ProfileView,
}

#[derive(Debug, Serialize)]
pub struct ArticleBody {
    pub article: ArticleView,
}

#[derive(Debug, Serialize)]
pub struct ArticleListBody {
    pub articles: Vec<ArticleView>,
    #[serde(rename = "articlesCount")]
    pub articles_count: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
}
