use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use connector_database::basic_db::SafeDatabase;
use connector_service::parser::post::{Comment, Like, Post, TextInput};

use crate::auth::AuthUser;
use crate::error::{ApiError, Message};
use crate::state::AppState;

pub async fn create_post<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<TextInput>, JsonRejection>,
) -> Result<Json<Post>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.posts().create(user, input.text)?))
}

pub async fn get_posts<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    _user: AuthUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.posts().list()?))
}

pub async fn get_post<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    _user: AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.posts().get(&post_id)?))
}

pub async fn delete_post<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    state.posts().delete(&post_id, user)?;
    Ok(Message::new("Post Deleted"))
}

pub async fn like_post<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    Ok(Json(state.posts().like(&post_id, user)?))
}

pub async fn unlike_post<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    Ok(Json(state.posts().unlike(&post_id, user)?))
}

pub async fn add_comment<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    payload: Result<Json<TextInput>, JsonRejection>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.posts().add_comment(&post_id, user, input.text)?))
}

pub async fn delete_comment<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(state.posts().remove_comment(&post_id, &comment_id, user)?))
}
