use crate::api::rest::{dto, handlers};
use crate::domain::guard::{GuardDecision, NavigationOrigin};
use crate::domain::service::Service;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use folio_kit::api::problem::Problem;
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_profile,
        handlers::update_profile,
        handlers::upload_avatar,
        handlers::delete_avatar,
        handlers::navigation_guard,
    ),
    components(schemas(
        dto::ProfileDto,
        dto::UpdateProfileReq,
        dto::SuccessDto,
        dto::AvatarUploadedDto,
        dto::AvatarUploadForm,
        GuardDecision,
        NavigationOrigin,
        Problem,
    )),
    tags(
        (name = "profiles", description = "Profile fields and avatar"),
        (name = "navigation", description = "Route guard")
    )
)]
pub struct ProfilesApi;

pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let routes = Router::new()
        .route(
            "/api/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route(
            "/api/profile/avatar",
            post(handlers::upload_avatar).delete(handlers::delete_avatar),
        )
        .route("/api/navigation/guard", get(handlers::navigation_guard))
        .layer(Extension(service));

    Ok(router.merge(routes))
}
