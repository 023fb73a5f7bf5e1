//!
//! # Generic Repository
//!
//! A generic reader/mutator over one entity table at a time. Reads combine a
//! [`FilterMap`](crate::repository::query::FilterMap) conjunction with an
//! ordering directive and a page window; mutations apply by primary key and
//! signal not-found and uniqueness-violation conditions through
//! [`AppError`].
//!
//! Every operation acquires its own short-lived connection (a transaction
//! when more than one statement is issued) and holds no state across calls.

use std::marker::PhantomData;

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::repository::query::{
    Change, CompareOp, FieldDef, FilterMap, PageRequest, PageSize, SqlValue,
};

/// A tabular entity the generic repository can operate on.
///
/// The field registry lists the columns a caller may filter or order by;
/// column names used in generated SQL only ever come from here.
pub trait Entity: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;

    fn fields() -> &'static [FieldDef];
}

/// Echoed pagination metadata attached to a page of results.
#[derive(Debug, Serialize)]
pub struct SearchOptions {
    pub page: i64,
    pub page_size: PageSize,
    pub ordering: String,
    pub total_count: i64,
}

/// One page of matching rows plus the pre-pagination total count.
#[derive(Debug, Serialize)]
pub struct Page<E> {
    pub founds: Vec<E>,
    pub search_options: SearchOptions,
}

/// Generic repository over a single entity table.
pub struct Repository<E: Entity> {
    pool: PgPool,
    _entity: PhantomData<E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// Returns the page of rows matching `filter` in the requested order,
    /// plus the total number of matches across all pages.
    ///
    /// The ordering field is validated against the entity's registry before
    /// any SQL runs. Page and count queries share one transaction. With
    /// `page_size=all` every match is returned and the total count is the
    /// returned length.
    pub async fn find(
        &self,
        filter: &FilterMap,
        request: &PageRequest,
    ) -> Result<Page<E>, AppError> {
        let (order_column, descending) = request.ordering.resolve(E::fields())?;
        let window = request.window()?;
        log::debug!(
            "find {} page={} page_size={} ordering={}",
            E::TABLE,
            request.page,
            request.page_size,
            request.ordering.raw()
        );

        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        builder.push(E::TABLE).push(" WHERE TRUE");
        filter.apply(&mut builder);
        builder
            .push(" ORDER BY ")
            .push(order_column)
            .push(if descending { " DESC" } else { " ASC" });

        let mut total_count = None;
        if let Some((limit, offset)) = window {
            builder
                .push(" LIMIT ")
                .push_bind(limit)
                .push(" OFFSET ")
                .push_bind(offset);

            let mut count_builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
            count_builder.push(E::TABLE).push(" WHERE TRUE");
            filter.apply(&mut count_builder);
            total_count = Some(
                count_builder
                    .build_query_scalar::<i64>()
                    .fetch_one(&mut *tx)
                    .await?,
            );
        }

        let founds = builder.build_query_as::<E>().fetch_all(&mut *tx).await?;
        tx.commit().await?;

        let total_count = total_count.unwrap_or(founds.len() as i64);
        log::debug!("find {} done count={}", E::TABLE, founds.len());
        Ok(Page {
            search_options: SearchOptions {
                page: request.page,
                page_size: request.page_size,
                ordering: request.ordering.raw().to_string(),
                total_count,
            },
            founds,
        })
    }

    /// Returns the single row matching `filter`, if any.
    pub async fn find_one(&self, filter: &FilterMap) -> Result<Option<E>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        builder.push(E::TABLE).push(" WHERE TRUE");
        filter.apply(&mut builder);
        builder.push(" LIMIT 1");
        Ok(builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Returns the row with the given primary key, or `NotFound`.
    pub async fn find_by_id(&self, id: i32) -> Result<E, AppError> {
        log::debug!("find_by_id {} id={}", E::TABLE, id);
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        builder.push(E::TABLE).push(" WHERE id = ").push_bind(id);
        builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("not found id : {}", id)))
    }

    /// Inserts a row with the supplied columns and returns it including
    /// generated fields. A uniqueness violation surfaces as
    /// `AppError::Duplicated` with the constraint detail.
    pub async fn create(&self, changes: &[Change]) -> Result<E, AppError> {
        if changes.is_empty() {
            return Err(AppError::BadRequest("nothing to insert".into()));
        }
        log::debug!("create {}", E::TABLE);
        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ");
        builder.push(E::TABLE).push(" (");
        for (i, (column, _)) in changes.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column);
        }
        builder.push(") VALUES (");
        for (i, (_, value)) in changes.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            value.push_to(&mut builder);
        }
        builder.push(") RETURNING *");
        let row = builder.build_query_as::<E>().fetch_one(&self.pool).await?;
        log::debug!("create {} done", E::TABLE);
        Ok(row)
    }

    /// Applies exactly the supplied columns to the row with the given key,
    /// conjoined with `scope`, refreshing `updated_at`. Returns `None` when
    /// no row matched; an update against a missing key is never a silent
    /// no-op.
    ///
    /// An empty change set reads the row back unchanged.
    pub async fn update(
        &self,
        id: i32,
        changes: &[Change],
        scope: &FilterMap,
    ) -> Result<Option<E>, AppError> {
        if changes.is_empty() {
            let mut filter = scope.clone();
            filter.push("id", CompareOp::Eq, SqlValue::Int(id as i64));
            return self.find_one(&filter).await;
        }
        log::debug!("update {} id={}", E::TABLE, id);
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE ");
        builder.push(E::TABLE).push(" SET ");
        for (i, (column, value)) in changes.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column).push(" = ");
            value.push_to(&mut builder);
        }
        builder.push(", updated_at = NOW() WHERE id = ").push_bind(id);
        scope.apply(&mut builder);
        builder.push(" RETURNING *");
        let row = builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await?;
        log::debug!("update {} id={} done matched={}", E::TABLE, id, row.is_some());
        Ok(row)
    }

    /// Replaces all mutable fields of the row with the given key. The caller
    /// supplies the complete change set; the machinery is the partial update.
    pub async fn whole_update(
        &self,
        id: i32,
        changes: &[Change],
        scope: &FilterMap,
    ) -> Result<Option<E>, AppError> {
        self.update(id, changes, scope).await
    }

    /// Sets exactly one named column on the row with the given key. The
    /// column must exist in the entity's registry.
    pub async fn update_attr(
        &self,
        id: i32,
        column: &str,
        value: SqlValue,
        scope: &FilterMap,
    ) -> Result<Option<E>, AppError> {
        let field = E::fields()
            .iter()
            .find(|field| field.name == column)
            .ok_or_else(|| AppError::BadRequest(format!("unknown column '{}'", column)))?;
        self.update(id, &[(field.name, value)], scope).await
    }

    /// Deletes the row with the given key, conjoined with `scope`. Returns
    /// whether a row was removed.
    pub async fn delete_by_id(&self, id: i32, scope: &FilterMap) -> Result<bool, AppError> {
        log::debug!("delete_by_id {} id={}", E::TABLE, id);
        let mut builder = QueryBuilder::<Postgres>::new("DELETE FROM ");
        builder.push(E::TABLE).push(" WHERE id = ").push_bind(id);
        scope.apply(&mut builder);
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
