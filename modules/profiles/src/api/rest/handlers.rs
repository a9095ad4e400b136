use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    http::Uri,
    Extension, Json,
};
use folio_kit::{api::problem::Problem, BearerToken, ProblemResponse};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::rest::dto::{
    AvatarUploadForm, AvatarUploadedDto, GuardQuery, ProfileDto, SuccessDto, UpdateProfileReq,
};
use crate::api::rest::error::{bad_request, map_domain_error};
use crate::contract::model::AvatarFile;
use crate::domain::guard::GuardDecision;
use crate::domain::service::Service;

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "profiles",
    responses(
        (status = 200, description = "Current profile; all fields null without a session", body = ProfileDto),
        (status = 500, description = "Provider error", body = Problem)
    )
)]
pub async fn get_profile(
    Extension(svc): Extension<Arc<Service>>,
    BearerToken(token): BearerToken,
    uri: Uri,
) -> Result<Json<ProfileDto>, ProblemResponse> {
    match svc.get_profile(token.as_ref()).await {
        Ok(profile) => Ok(Json(profile.into())),
        Err(e) => {
            error!("Failed to load profile: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Update profile fields
#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "profiles",
    request_body = UpdateProfileReq,
    responses(
        (status = 200, description = "Profile updated", body = SuccessDto),
        (status = 400, description = "Bad input", body = Problem),
        (status = 401, description = "Not authenticated", body = Problem),
        (status = 500, description = "Provider error", body = Problem)
    )
)]
pub async fn update_profile(
    Extension(svc): Extension<Arc<Service>>,
    BearerToken(token): BearerToken,
    uri: Uri,
    payload: Result<Json<UpdateProfileReq>, JsonRejection>,
) -> Result<Json<SuccessDto>, ProblemResponse> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text(), uri.path()))?;

    match svc.update_profile(token.as_ref(), req.into()).await {
        Ok(_) => Ok(Json(SuccessDto::ok())),
        Err(e) => {
            error!("Failed to update profile: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Upload a new avatar (first multipart part)
#[utoipa::path(
    post,
    path = "/api/profile/avatar",
    tag = "profiles",
    request_body(content = AvatarUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar stored and linked", body = AvatarUploadedDto),
        (status = 400, description = "Bad input", body = Problem),
        (status = 401, description = "Not authenticated", body = Problem),
        (status = 500, description = "Upload or provider error", body = Problem)
    )
)]
pub async fn upload_avatar(
    Extension(svc): Extension<Arc<Service>>,
    BearerToken(token): BearerToken,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AvatarUploadedDto>, ProblemResponse> {
    let mut multipart = multipart.map_err(|e| bad_request(e.body_text(), uri.path()))?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text(), uri.path()))?
        .filter(|f| f.file_name().is_some())
        .ok_or_else(|| bad_request("No file uploaded", uri.path()))?;

    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_owned);
    let data = field
        .bytes()
        .await
        .map_err(|e| bad_request(e.body_text(), uri.path()))?;

    info!(file_name = %file_name, size = data.len(), "Avatar upload received");

    let file = AvatarFile {
        file_name,
        content_type,
        data,
    };
    match svc.upload_avatar(token.as_ref(), file).await {
        Ok(public_url) => Ok(Json(AvatarUploadedDto { public_url })),
        Err(e) => {
            error!("Failed to upload avatar: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete the caller's avatar
#[utoipa::path(
    delete,
    path = "/api/profile/avatar",
    tag = "profiles",
    responses(
        (status = 200, description = "Avatar removed, or there was none", body = SuccessDto),
        (status = 401, description = "Not authenticated", body = Problem),
        (status = 500, description = "Provider error", body = Problem)
    )
)]
pub async fn delete_avatar(
    Extension(svc): Extension<Arc<Service>>,
    BearerToken(token): BearerToken,
    uri: Uri,
) -> Result<Json<SuccessDto>, ProblemResponse> {
    match svc.delete_avatar(token.as_ref()).await {
        Ok(()) => Ok(Json(SuccessDto::ok())),
        Err(e) => {
            error!("Failed to delete avatar: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Decide whether a navigation may proceed
#[utoipa::path(
    get,
    path = "/api/navigation/guard",
    tag = "navigation",
    params(GuardQuery),
    responses(
        (status = 200, description = "Continue or redirect", body = GuardDecision),
        (status = 400, description = "Bad input", body = Problem),
        (status = 500, description = "Provider error", body = Problem)
    )
)]
pub async fn navigation_guard(
    Extension(svc): Extension<Arc<Service>>,
    BearerToken(token): BearerToken,
    uri: Uri,
    query: Result<Query<GuardQuery>, QueryRejection>,
) -> Result<Json<GuardDecision>, ProblemResponse> {
    let Query(q) = query.map_err(|e| bad_request(e.body_text(), uri.path()))?;

    match svc.check_navigation(token.as_ref(), &q.to, q.origin).await {
        Ok(decision) => Ok(Json(decision)),
        Err(e) => {
            error!("Navigation check failed: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
