use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transient copy of a persisted user, held only for the duration of one
/// request chain. The credential hash never leaves the persistence actor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image: String,
}

impl User {
    pub fn view(&self, token: Option<String>) -> UserView {
        UserView {
            email: self.email.clone(),
            token,
            username: self.username.clone(),
            bio: self.bio.clone(),
            image: self.image.clone(),
        }
    }

    pub fn profile(&self, following: bool) -> ProfileView {
        ProfileView {
            username: self.username.clone(),
            bio: self.bio.clone(),
            image: self.image.clone(),
            following,
        }
    }
}

/// Wire representation of the calling user. `token` is populated only on
/// responses that issue a fresh credential.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub email: String,
    pub token: Option<String>,
    pub username: String,
    pub bio: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub username: String,
    pub bio: String,
    pub image: String,
    pub following: bool,
}

/// Registration payload as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Login payload; also the claims the login envelope carries as lookup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Partial user fields submitted to the self-update endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}
