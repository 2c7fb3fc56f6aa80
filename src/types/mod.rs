mod issue;
mod label;
mod milestone;
mod repository;
mod user;

pub use issue::{Issue, State};
pub use label::{Label, DEPARTMENT_PREFIX};
pub use milestone::Milestone;
pub use repository::{RepoRef, Repository};
pub use user::User;
