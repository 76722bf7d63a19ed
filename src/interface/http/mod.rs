pub mod articles_handler;
pub mod bearer;
pub mod problem;
pub mod profiles_handler;
pub mod users_handler;
