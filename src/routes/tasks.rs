use std::collections::HashMap;

use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::UpsertTask,
    repository::TaskRepository,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Retrieves a page of tasks for the authenticated user.
///
/// Query-string parameters form a filter map against the task fields, plus
/// pagination directives. A field name may carry a comparison suffix
/// (`estado__ne=completada`, `fecha_creacion__gte=...`, `titulo__like=%x%`);
/// a bare name means equality. Unknown field names are ignored.
///
/// ## Query Parameters:
/// - `page` (optional): 1-based page number, default 1.
/// - `page_size` (optional): positive integer or `all`, default 20.
/// - `ordering` (optional): field name, with a leading `-` for descending;
///   default `-id`.
/// - any task field, optionally suffixed with `__eq`, `__ne`, `__gt`,
///   `__gte`, `__lt`, `__lte` or `__like`.
///
/// ## Responses:
/// - `200 OK`: `{ "founds": [Task], "search_options": { page, page_size, ordering, total_count } }`.
/// - `400 Bad Request`: unparsable filter value, bad pagination directive, or
///   an ordering field that does not exist.
/// - `401 Unauthorized`: if the request lacks a valid authentication token.
/// - `500 Internal Server Error`: for database errors or other unexpected issues.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    query_params: web::Query<HashMap<String, String>>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let tasks = TaskRepository::new(pool.get_ref().clone());
    let page = tasks.find_for_user(user.0, &query_params).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Creates a new task for the authenticated user.
///
/// The owning user is always the authenticated identity; an `id_usuario`
/// supplied by the client is never trusted. `estado` defaults to
/// `pendiente` when absent.
///
/// ## Request Body:
/// - `titulo`: the title of the task (required).
/// - `descripcion` (optional): a description of the task.
/// - `estado` (optional): `pendiente`, `en_progreso` or `completada`.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task` object as JSON.
/// - `400 Bad Request`: missing `titulo`.
/// - `401 Unauthorized`: if the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: if input validation fails (e.g., unknown estado).
/// - `500 Internal Server Error`: for database errors or other unexpected issues.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<UpsertTask>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    // Validate input
    task_data.validate()?;

    let tasks = TaskRepository::new(pool.get_ref().clone());
    let task = tasks.create_for_user(&task_data, user.0).await?;

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// The authenticated user must be the owner of the task; a task owned by a
/// different user is indistinguishable from a missing one.
///
/// ## Responses:
/// - `200 OK`: Returns the `Task` object as JSON if found and owned by the user.
/// - `401 Unauthorized`: if the request lacks a valid authentication token.
/// - `404 Not Found`: if the task does not exist or is not owned by the user.
/// - `500 Internal Server Error`: for database errors or other unexpected issues.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let tasks = TaskRepository::new(pool.get_ref().clone());
    let task = tasks
        .get_by_id_and_user(task_id.into_inner(), user.0)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task owned by the authenticated user.
///
/// Only the fields present in the body are applied; absent fields are left
/// untouched. The owning user of a task can never be changed.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task` object as JSON.
/// - `401 Unauthorized`: if the request lacks a valid authentication token.
/// - `404 Not Found`: if the task does not exist or is not owned by the user.
/// - `422 Unprocessable Entity`: if input validation fails.
/// - `500 Internal Server Error`: for database errors or other unexpected issues.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    task_data: web::Json<UpsertTask>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let tasks = TaskRepository::new(pool.get_ref().clone());
    let task = tasks
        .update_by_id_and_user(task_id.into_inner(), user.0, &task_data)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task owned by the authenticated user.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `401 Unauthorized`: if the request lacks a valid authentication token.
/// - `404 Not Found`: if the task does not exist or is not owned by the user.
/// - `500 Internal Server Error`: for database errors or other unexpected issues.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let tasks = TaskRepository::new(pool.get_ref().clone());
    tasks
        .delete_by_id_and_user(task_id.into_inner(), user.0)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
