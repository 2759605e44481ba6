//! Services sitting between the HTTP handlers and the stores.

mod tasks;
mod users;

pub use tasks::TaskService;
pub use users::{RegisterInput, UserService};
