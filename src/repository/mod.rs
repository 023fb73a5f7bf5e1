pub mod base;
pub mod query;
pub mod tasks;
pub mod users;

pub use base::{Entity, Page, Repository, SearchOptions};
pub use query::{
    Change, CompareOp, FieldDef, FieldKind, FilterMap, Ordering, PageRequest, PageSize, SqlValue,
};
pub use tasks::TaskRepository;
pub use users::UserRepository;
