pub mod task;
pub mod user;

pub use task::{Task, UpsertTask, ESTADO_PENDIENTE};
pub use user::User;
