use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::repository::{Change, Entity, FieldDef, FieldKind, SqlValue};

/// Default state for a newly created task.
pub const ESTADO_PENDIENTE: &str = "pendiente";

lazy_static! {
    // Closed vocabulary for the task state.
    static ref ESTADO_REGEX: regex::Regex =
        regex::Regex::new(r"^(pendiente|en_progreso|completada)$").unwrap();
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: i32,
    /// The title of the task.
    pub titulo: String,
    /// An optional description for the task.
    pub descripcion: Option<String>,
    /// The current state of the task (`pendiente`, `en_progreso`, `completada`).
    pub estado: String,
    /// When the task was created, as reported to clients.
    pub fecha_creacion: DateTime<Utc>,
    /// Identifier of the user who owns the task. Immutable after creation.
    pub id_usuario: i32,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the row.
    pub updated_at: DateTime<Utc>,
}

impl Entity for Task {
    const TABLE: &'static str = "tasks";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("id", FieldKind::Int),
            FieldDef::new("titulo", FieldKind::Text),
            FieldDef::new("descripcion", FieldKind::Text),
            FieldDef::new("estado", FieldKind::Text),
            FieldDef::new("fecha_creacion", FieldKind::Timestamp),
            FieldDef::new("id_usuario", FieldKind::Int),
            FieldDef::new("created_at", FieldKind::Timestamp),
            FieldDef::new("updated_at", FieldKind::Timestamp),
        ];
        FIELDS
    }
}

/// Create/update payload for a task. Every field is optional so the same
/// shape serves both the create body (where `titulo` must be present) and a
/// partial update that only names the fields to change.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpsertTask {
    /// The title of the task. Required on create.
    #[validate(length(min = 1, max = 200))]
    pub titulo: Option<String>,

    /// An optional description for the task.
    #[validate(length(max = 1000))]
    pub descripcion: Option<String>,

    /// The state of the task. Defaults to `pendiente` on create.
    #[validate(regex(
        path = "ESTADO_REGEX",
        message = "estado must be one of pendiente, en_progreso, completada"
    ))]
    pub estado: Option<String>,
}

impl UpsertTask {
    /// The columns this payload sets; absent fields are left untouched.
    pub fn changes(&self) -> Vec<Change> {
        let mut changes: Vec<Change> = Vec::new();
        if let Some(titulo) = &self.titulo {
            changes.push(("titulo", SqlValue::Text(titulo.clone())));
        }
        if let Some(descripcion) = &self.descripcion {
            changes.push(("descripcion", SqlValue::Text(descripcion.clone())));
        }
        if let Some(estado) = &self.estado {
            changes.push(("estado", SqlValue::Text(estado.clone())));
        }
        changes
    }
}
