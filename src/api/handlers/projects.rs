use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::cookies::RequireAuth;
use crate::api::response::{ApiError, AppQuery, JSend, JSendPaginated, Pagination};
use crate::backend::models::{Document, Project};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListDocumentsParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    /// Skip the tab cache and refetch from the backend
    #[serde(default)]
    pub refresh: bool,
}

fn default_limit() -> u32 {
    50
}

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    RequireAuth(token): RequireAuth,
) -> Result<Json<JSend<Vec<Project>>>, ApiError> {
    let projects = state.backend.list_projects(&token).await?;
    Ok(JSend::success(projects))
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    RequireAuth(token): RequireAuth,
    Path(project_id): Path<String>,
    AppQuery(params): AppQuery<ListDocumentsParams>,
) -> Result<Json<JSendPaginated<Document>>, ApiError> {
    if params.limit == 0 {
        return Err(ApiError::bad_request("limit must be greater than 0"));
    }

    let cached = if params.refresh {
        None
    } else {
        state.cache.documents(&project_id)
    };

    let documents = match cached {
        Some(documents) => documents,
        None => {
            let documents = state.backend.list_documents(&token, &project_id).await?;
            state.cache.set_documents(&project_id, documents.clone());
            documents
        }
    };

    let total = documents.len() as u64;
    let items: Vec<Document> = documents
        .into_iter()
        .skip(params.offset as usize)
        .take(params.limit as usize)
        .collect();

    Ok(JSendPaginated::success(
        items,
        Pagination {
            limit: params.limit,
            offset: params.offset,
            total,
        },
    ))
}
