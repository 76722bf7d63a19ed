pub mod article;
pub mod errors;
pub mod user;

pub use article::{Article, ArticleDraft, ArticlePatch, ArticleView, slugify};
pub use errors::FlowError;
pub use user::{Credentials, ProfileView, Registration, User, UserPatch, UserView};
