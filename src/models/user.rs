use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::repository::{Entity, FieldDef, FieldKind};

#[derive(Debug, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    /// Bcrypt hash. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    const TABLE: &'static str = "users";

    // The password column is deliberately absent: it is neither filterable
    // nor orderable.
    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("id", FieldKind::Int),
            FieldDef::new("email", FieldKind::Text),
            FieldDef::new("name", FieldKind::Text),
            FieldDef::new("is_active", FieldKind::Bool),
            FieldDef::new("is_superuser", FieldKind::Bool),
            FieldDef::new("created_at", FieldKind::Timestamp),
            FieldDef::new("updated_at", FieldKind::Timestamp),
        ];
        FIELDS
    }
}
