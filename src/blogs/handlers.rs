use axum::{
    body::Bytes,
    extract::State,
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateBlogRequest, ListQuery, UpdateBlogRequest},
    repo_types::Blog,
};
use crate::{
    auth::{ownership::ensure_owner, AuthUser},
    error::ApiError,
    extract::{parse_json, AppJson, AppPath, AppQuery},
    state::AppState,
    store::NewBlog,
};

pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(list_blogs).post(create_blog))
        .route(
            "/blogs/:id",
            get(get_blog).put(update_blog).delete(delete_blog),
        )
}

#[instrument(skip(state))]
pub async fn list_blogs(
    State(state): State<AppState>,
    AppQuery(q): AppQuery<ListQuery>,
) -> Result<Json<Vec<Blog>>, ApiError> {
    q.validate()?;
    let blogs = match q.author_id {
        Some(author_id) => {
            state
                .store
                .list_blogs_by_author(author_id, q.limit, q.offset)
                .await?
        }
        None => state.store.list_blogs(q.limit, q.offset).await?,
    };
    Ok(Json(blogs))
}

#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Blog>, ApiError> {
    state
        .store
        .find_blog(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Blog", id))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_blog(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(body): AppJson<CreateBlogRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Blog>), ApiError> {
    // A token can outlive its user, e.g. after the account is removed.
    if state.store.find_user_by_id(user.id).await?.is_none() {
        warn!(user_id = %user.id, "token for unknown user");
        return Err(ApiError::unauthenticated("User not found"));
    }

    let (title, content) = body.validate()?;

    let blog = state
        .store
        .create_blog(NewBlog {
            title: &title,
            content: &content,
            author_id: user.id,
        })
        .await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/blogs/{}", blog.id)) {
        headers.insert(LOCATION, location);
    }

    info!(blog_id = %blog.id, "blog created");
    Ok((StatusCode::CREATED, headers, Json(blog)))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_blog(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    body: Bytes,
) -> Result<Json<Blog>, ApiError> {
    let existing = state
        .store
        .find_blog(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog", id))?;
    ensure_owner(existing.author_id, &user)?;

    // Parsed only once ownership is settled.
    let changes = parse_json::<UpdateBlogRequest>(&body)?.into_changes()?;
    let blog = state
        .store
        .update_blog(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog", id))?;

    info!(blog_id = %blog.id, "blog updated");
    Ok(Json(blog))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_blog(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = state
        .store
        .find_blog(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog", id))?;
    ensure_owner(existing.author_id, &user)?;

    if !state.store.delete_blog(id).await? {
        return Err(ApiError::not_found("Blog", id));
    }

    info!(blog_id = %id, "blog deleted");
    Ok(StatusCode::NO_CONTENT)
}
