use serde::{Deserialize, Serialize};

use crate::domain::avatar::AvatarPathStrategy;

/// Configuration for the profiles module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilesConfig {
    #[serde(default = "default_avatar_bucket")]
    pub avatar_bucket: String,
    #[serde(default)]
    pub avatar_paths: AvatarPathStrategy,
    #[serde(default = "default_max_avatar_bytes")]
    pub max_avatar_bytes: usize,
    #[serde(default = "default_max_field_length")]
    pub max_field_length: usize,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_profile_path")]
    pub profile_path: String,
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            avatar_bucket: default_avatar_bucket(),
            avatar_paths: AvatarPathStrategy::default(),
            max_avatar_bytes: default_max_avatar_bytes(),
            max_field_length: default_max_field_length(),
            login_path: default_login_path(),
            profile_path: default_profile_path(),
            public_paths: default_public_paths(),
        }
    }
}

fn default_avatar_bucket() -> String {
    "avatars".to_string()
}

fn default_max_avatar_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_max_field_length() -> usize {
    1000
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_profile_path() -> String {
    "/profile".to_string()
}

fn default_public_paths() -> Vec<String> {
    vec!["/".to_string(), "/confirm".to_string()]
}
