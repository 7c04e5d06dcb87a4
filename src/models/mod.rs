mod project;
mod user;

pub use project::{Project, ProjectStatus};
pub use user::User;
