use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{FieldUpdate, ProfileUpdate, UserProfile};
use crate::domain::guard::NavigationOrigin;

/// REST DTO for the caller's profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileDto {
    pub id: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<UserProfile> for ProfileDto {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            full_name: p.full_name,
            description: p.description,
            avatar_url: p.avatar_url,
        }
    }
}

/// Omitted keys stay as they are; `null` clears the field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileReq {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub full_name: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub avatar_url: FieldUpdate<String>,
}

impl From<UpdateProfileReq> for ProfileUpdate {
    fn from(req: UpdateProfileReq) -> Self {
        Self {
            full_name: req.full_name,
            description: req.description,
            avatar_url: req.avatar_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessDto {
    pub success: bool,
}

impl SuccessDto {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvatarUploadedDto {
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GuardQuery {
    /// Destination path, query string allowed.
    pub to: String,
    #[serde(default)]
    #[param(inline)]
    pub origin: NavigationOrigin,
}

/// Multipart form for avatar uploads; only the first part is read.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct AvatarUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
