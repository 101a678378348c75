//! CRUD handlers shared by quotes and comments
//!
//! Each handler is generic over the resource; the router instantiates them
//! once per collection with that collection's store as state.

use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use qotd_core::{ListParams, ListQuery, Resource, Store};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Handler state: the store of one resource collection
pub type StoreState<R> = State<Arc<dyn Store<R>>>;

/// Bounds every record type served over HTTP must meet
pub trait Record: Resource + Serialize + DeserializeOwned {}

impl<R: Resource + Serialize + DeserializeOwned> Record for R {}

fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid ID format"))
}

pub async fn list<R: Record>(
    State(store): StoreState<R>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<R>>> {
    let query = ListQuery::from(&params);
    let records = store.list(&query).await?;
    Ok(Json(records))
}

pub async fn get<R: Record>(
    State(store): StoreState<R>,
    Path(id): Path<String>,
) -> ApiResult<Json<R>> {
    let id = parse_id(&id)?;
    let record = store.get_by_id(id).await?;
    Ok(Json(record))
}

pub async fn create<R: Record>(
    State(store): StoreState<R>,
    payload: Result<Json<R>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<R>)> {
    let Json(mut record) = payload?;
    record.validate()?;

    store.create(&mut record).await?;
    tracing::debug!("Created {} {}", R::KIND, record.id());
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update<R: Record>(
    State(store): StoreState<R>,
    Path(id): Path<String>,
    payload: Result<Json<R>, JsonRejection>,
) -> ApiResult<Json<R>> {
    let id = parse_id(&id)?;
    let Json(mut record) = payload?;
    record.validate()?;

    store.update(id, &mut record).await?;
    tracing::debug!("Updated {} {}", R::KIND, id);
    Ok(Json(record))
}

pub async fn delete<R: Record>(
    State(store): StoreState<R>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    store.delete(id).await?;
    tracing::debug!("Deleted {} {}", R::KIND, id);
    Ok(StatusCode::NO_CONTENT)
}
