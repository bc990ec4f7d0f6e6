use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use connector_database::basic_db::SafeDatabase;
use connector_service::parser::profile::{EducationInput, ExperienceInput, Profile, ProfileInput, ProfileView};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, Message};
use crate::state::AppState;

pub async fn get_my_profile<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ProfileView>, ApiError> {
    Ok(Json(state.profiles().me(user)?))
}

pub async fn profile_write<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<ProfileInput>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.profiles().upsert(user, input)?))
}

pub async fn get_all_profiles<T: SafeDatabase>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<ProfileView>>, ApiError> {
    Ok(Json(state.profiles().all()?))
}

pub async fn get_profile_by_user<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    Ok(Json(state.profiles().by_user(&user_id)?))
}

pub async fn delete_account<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Message>, ApiError> {
    state.profiles().delete_account(user)?;
    Ok(Message::new("User Deleted"))
}

pub async fn add_experience<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<ExperienceInput>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Json(input) = payload?;
    let profile = state.profiles().add_experience(user, input)?;
    info!(%user, entries = profile.experience.len(), "experience added");
    Ok(Json(profile))
}

pub async fn delete_experience<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(state.profiles().remove_experience(user, &exp_id)?))
}

pub async fn add_education<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<EducationInput>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Json(input) = payload?;
    let profile = state.profiles().add_education(user, input)?;
    info!(%user, entries = profile.education.len(), "education added");
    Ok(Json(profile))
}

pub async fn delete_education<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(state.profiles().remove_education(user, &edu_id)?))
}

pub async fn github_repos<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(state.github.repos(&username).await?))
}
