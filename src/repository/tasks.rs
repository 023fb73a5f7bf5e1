//!
//! # Owner-Scoped Task Repository
//!
//! Wraps the generic repository so that every read, update and delete is
//! conjoined with an equality predicate on the owning user. A caller can
//! never observe or mutate another user's rows; a missing row and a foreign
//! row produce the same not-found signal.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{Task, UpsertTask, ESTADO_PENDIENTE};
use crate::repository::base::{Entity, Page, Repository};
use crate::repository::query::{Change, CompareOp, FilterMap, PageRequest, SqlValue};

const NOT_FOUND: &str = "Task not found or not authorized";

pub struct TaskRepository {
    repo: Repository<Task>,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: Repository::new(pool),
        }
    }

    fn owner_scope(user_id: i32) -> FilterMap {
        FilterMap::eq("id_usuario", SqlValue::Int(user_id as i64))
    }

    /// Lists the user's tasks, applying any filter and pagination directives
    /// from the query-string parameters. The ownership predicate is always
    /// conjoined, so a client-supplied `id_usuario` filter cannot widen the
    /// result set.
    pub async fn find_for_user(
        &self,
        user_id: i32,
        params: &HashMap<String, String>,
    ) -> Result<Page<Task>, AppError> {
        let mut filter = FilterMap::parse(params, Task::fields())?;
        filter.push("id_usuario", CompareOp::Eq, SqlValue::Int(user_id as i64));
        let request = PageRequest::from_map(params)?;
        self.repo.find(&filter, &request).await
    }

    /// Returns the task with the given id when it belongs to the user.
    pub async fn get_by_id_and_user(&self, task_id: i32, user_id: i32) -> Result<Task, AppError> {
        let mut filter = Self::owner_scope(user_id);
        filter.push("id", CompareOp::Eq, SqlValue::Int(task_id as i64));
        self.repo
            .find_one(&filter)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
    }

    /// Creates a task owned by the caller. The owning user always comes from
    /// the authenticated identity, never from client input, and `estado`
    /// defaults to `pendiente`.
    pub async fn create_for_user(
        &self,
        input: &UpsertTask,
        user_id: i32,
    ) -> Result<Task, AppError> {
        let titulo = input
            .titulo
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("titulo is required".into()))?;
        let mut changes: Vec<Change> = vec![("titulo", SqlValue::Text(titulo.to_string()))];
        if let Some(descripcion) = &input.descripcion {
            changes.push(("descripcion", SqlValue::Text(descripcion.clone())));
        }
        let estado = input.estado.as_deref().unwrap_or(ESTADO_PENDIENTE);
        changes.push(("estado", SqlValue::Text(estado.to_string())));
        changes.push(("fecha_creacion", SqlValue::Timestamp(Utc::now())));
        changes.push(("id_usuario", SqlValue::Int(user_id as i64)));
        self.repo.create(&changes).await
    }

    /// Applies the fields set in `patch` to the user's task. An empty patch
    /// reads the task back unchanged; a missing or foreign id is not-found.
    pub async fn update_by_id_and_user(
        &self,
        task_id: i32,
        user_id: i32,
        patch: &UpsertTask,
    ) -> Result<Task, AppError> {
        let changes = patch.changes();
        if changes.is_empty() {
            return self.get_by_id_and_user(task_id, user_id).await;
        }
        self.repo
            .update(task_id, &changes, &Self::owner_scope(user_id))
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
    }

    /// Replaces every mutable field of the user's task from a complete
    /// payload. Fields absent from the payload fall back to their create
    /// defaults (`descripcion` to null, `estado` to `pendiente`).
    pub async fn replace_by_id_and_user(
        &self,
        task_id: i32,
        user_id: i32,
        input: &UpsertTask,
    ) -> Result<Task, AppError> {
        let titulo = input
            .titulo
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("titulo is required".into()))?;
        let descripcion = input
            .descripcion
            .clone()
            .map(SqlValue::Text)
            .unwrap_or(SqlValue::Null);
        let estado = input.estado.as_deref().unwrap_or(ESTADO_PENDIENTE);
        let changes: Vec<Change> = vec![
            ("titulo", SqlValue::Text(titulo.to_string())),
            ("descripcion", descripcion),
            ("estado", SqlValue::Text(estado.to_string())),
        ];
        self.repo
            .whole_update(task_id, &changes, &Self::owner_scope(user_id))
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
    }

    /// Sets exactly the `estado` column on the user's task.
    pub async fn update_estado(
        &self,
        task_id: i32,
        user_id: i32,
        estado: &str,
    ) -> Result<Task, AppError> {
        self.repo
            .update_attr(
                task_id,
                "estado",
                SqlValue::Text(estado.to_string()),
                &Self::owner_scope(user_id),
            )
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
    }

    /// Deletes the user's task; a missing or foreign id is not-found.
    pub async fn delete_by_id_and_user(&self, task_id: i32, user_id: i32) -> Result<(), AppError> {
        let deleted = self
            .repo
            .delete_by_id(task_id, &Self::owner_scope(user_id))
            .await?;
        if !deleted {
            return Err(AppError::NotFound(NOT_FOUND.into()));
        }
        Ok(())
    }
}
