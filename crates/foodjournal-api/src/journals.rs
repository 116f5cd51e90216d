use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};

use foodjournal_db::{JournalRow, JournalUpdate, NewJournal};
use foodjournal_types::api::{Claims, JournalListQuery, JournalRequest};
use foodjournal_types::models::{CategoryFilter, Journal};

use crate::auth::AppState;
use crate::store_status;

/// The signed-in user's entries, newest first, optionally narrowed to one category.
pub async fn list_journals(
    State(state): State<AppState>,
    Query(query): Query<JournalListQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let filter: CategoryFilter = match query.category.as_deref() {
        None => CategoryFilter::All,
        Some(raw) => raw.parse().map_err(|_| StatusCode::BAD_REQUEST)?,
    };

    let rows = state
        .store
        .list_journals(claims.sub)
        .await
        .map_err(store_status)?;

    let journals: Vec<Journal> = rows
        .into_iter()
        .filter(|row| filter.matches(&row.category))
        .map(to_journal)
        .collect();

    Ok(Json(journals))
}

pub async fn create_journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<JournalRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let (image, description) = validate(&req)?;

    let new = NewJournal {
        user_id: claims.sub,
        image,
        description,
        category: req.category.as_str().to_string(),
        date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    // FK failure here means the token names a user that no longer exists.
    let id = state.store.insert_journal(&new).await.map_err(|e| {
        if e.is_constraint_violation() {
            StatusCode::UNAUTHORIZED
        } else {
            store_status(e)
        }
    })?;

    info!("Journal {} saved for user {}", id, claims.sub);
    let row = JournalRow {
        id,
        user_id: new.user_id,
        image: Some(new.image),
        description: new.description,
        date: new.date,
        category: new.category,
    };
    Ok((StatusCode::CREATED, Json(to_journal(row))))
}

pub async fn get_journal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let row = owned_journal(&state, id, &claims).await?;
    Ok(Json(to_journal(row)))
}

pub async fn update_journal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<JournalRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let (image, description) = validate(&req)?;
    let existing = owned_journal(&state, id, &claims).await?;

    let update = JournalUpdate {
        image,
        description,
        category: req.category.as_str().to_string(),
    };
    let updated = state
        .store
        .update_journal(id, &update)
        .await
        .map_err(store_status)?;
    if !updated {
        // Deleted between the ownership check and the update.
        return Err(StatusCode::NOT_FOUND);
    }

    info!("Journal {} updated", id);
    Ok(Json(to_journal(JournalRow {
        image: Some(update.image),
        description: update.description,
        category: update.category,
        ..existing
    })))
}

pub async fn delete_journal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    owned_journal(&state, id, &claims).await?;

    let deleted = state
        .store
        .delete_journal(id)
        .await
        .map_err(store_status)?;
    if !deleted {
        return Err(StatusCode::NOT_FOUND);
    }

    info!("Journal {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

/// An entry needs both an image reference and a non-blank description.
/// The image reference is stored as given; the description is trimmed.
fn validate(req: &JournalRequest) -> Result<(String, String), StatusCode> {
    let description = req.description.trim();
    if req.image.trim().is_empty() || description.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok((req.image.clone(), description.to_string()))
}

/// Other users' entries are reported as missing rather than forbidden.
async fn owned_journal(state: &AppState, id: i64, claims: &Claims) -> Result<JournalRow, StatusCode> {
    state
        .store
        .get_journal(id)
        .await
        .map_err(store_status)?
        .filter(|row| row.user_id == claims.sub)
        .ok_or(StatusCode::NOT_FOUND)
}

fn to_journal(row: JournalRow) -> Journal {
    let date = DateTime::parse_from_rfc3339(&row.date)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!("Corrupt date '{}' on journal '{}': {}", row.date, row.id, e);
            DateTime::default()
        });

    Journal {
        id: row.id,
        user_id: row.user_id,
        image: row.image,
        description: row.description,
        date,
        category: row.category,
    }
}
