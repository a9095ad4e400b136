use std::sync::Arc;

use folio_kit::AccessToken;
use platform::{AuthProvider, AuthUser, MetadataPatch, ObjectStore, UploadOptions};
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{AvatarFile, FieldUpdate, ProfileUpdate, UserProfile, AVATAR_URL};
use crate::domain::avatar::{avatar_extension, AvatarPathStrategy};
use crate::domain::error::DomainError;
use crate::domain::guard::{self, GuardDecision, GuardRules, NavigationOrigin};

/// Profile workflow over the auth provider and object store.
/// Every step waits for its remote call; nothing is retried or rolled back.
#[derive(Clone)]
pub struct Service {
    auth: Arc<dyn AuthProvider>,
    storage: Arc<dyn ObjectStore>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub avatar_bucket: String,
    pub avatar_paths: AvatarPathStrategy,
    pub max_avatar_bytes: usize,
    pub max_field_length: usize,
    pub guard: GuardRules,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            avatar_bucket: "avatars".to_string(),
            avatar_paths: AvatarPathStrategy::Deterministic,
            max_avatar_bytes: 5 * 1024 * 1024,
            max_field_length: 1000,
            guard: GuardRules::default(),
        }
    }
}

impl Service {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        storage: Arc<dyn ObjectStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            auth,
            storage,
            config,
        }
    }

    async fn require_user(&self, token: Option<&AccessToken>) -> Result<AuthUser, DomainError> {
        let token = token.ok_or(DomainError::NotAuthenticated)?;
        self.auth
            .current_user(token)
            .await
            .map_err(DomainError::remote)
    }

    /// Snapshot of the caller's profile; anonymous (all `None`) without a valid session.
    #[instrument(name = "profiles.service.get_profile", skip_all)]
    pub async fn get_profile(&self, token: Option<&AccessToken>) -> Result<UserProfile, DomainError> {
        match self.require_user(token).await {
            Ok(user) => Ok(UserProfile::from(&user)),
            Err(DomainError::NotAuthenticated) => {
                debug!("no session; returning anonymous profile");
                Ok(UserProfile::anonymous())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply a tagged update in a single metadata call.
    #[instrument(name = "profiles.service.update_profile", skip_all)]
    pub async fn update_profile(
        &self,
        token: Option<&AccessToken>,
        update: ProfileUpdate,
    ) -> Result<UserProfile, DomainError> {
        let token = token.ok_or(DomainError::NotAuthenticated)?;
        self.validate_update(&update)?;

        let user = self
            .auth
            .update_user_metadata(token, &update.to_patch())
            .await
            .map_err(DomainError::remote)?;
        info!(user_id = %user.id, "profile updated");
        Ok(UserProfile::from(&user))
    }

    /// Upload, resolve the public URL, then point the profile at it.
    /// A failed metadata write leaves the uploaded object in place.
    #[instrument(
        name = "profiles.service.upload_avatar",
        skip_all,
        fields(file_name = %file.file_name, size = file.data.len())
    )]
    pub async fn upload_avatar(
        &self,
        token: Option<&AccessToken>,
        file: AvatarFile,
    ) -> Result<String, DomainError> {
        let token = token.ok_or(DomainError::NotAuthenticated)?;
        let ext = self.validate_avatar(&file)?;
        let user = self.require_user(Some(token)).await?;

        let path = self.config.avatar_paths.object_path(&user.id, &ext);
        let content_type = file
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(&file.file_name)
                    .first_or_octet_stream()
                    .to_string()
            });
        let opts = UploadOptions {
            content_type,
            upsert: true,
        };

        self.storage
            .upload(token, &self.config.avatar_bucket, &path, file.data, &opts)
            .await
            .map_err(DomainError::upload)?;

        let public_url = self.storage.public_url(&self.config.avatar_bucket, &path);

        let update = ProfileUpdate {
            avatar_url: FieldUpdate::Set(public_url.clone()),
            ..Default::default()
        };
        if let Err(e) = self.auth.update_user_metadata(token, &update.to_patch()).await {
            warn!(user_id = %user.id, path = %path, error = %e, "avatar stored but profile not updated");
            return Err(DomainError::remote(e));
        }

        info!(user_id = %user.id, path = %path, "avatar uploaded");
        Ok(public_url)
    }

    /// Remove every avatar object whose name contains the user id, then clear
    /// `avatar_url`. Without a current avatar this touches no storage.
    #[instrument(name = "profiles.service.delete_avatar", skip_all)]
    pub async fn delete_avatar(&self, token: Option<&AccessToken>) -> Result<(), DomainError> {
        let token = token.ok_or(DomainError::NotAuthenticated)?;
        let user = self.require_user(Some(token)).await?;

        if !UserProfile::from(&user)
            .avatar_url
            .is_some_and(|u| !u.is_empty())
        {
            debug!(user_id = %user.id, "no avatar to delete");
            return Ok(());
        }

        let bucket = &self.config.avatar_bucket;
        let paths: Vec<String> = self
            .storage
            .list(token, bucket, "", &user.id)
            .await
            .map_err(DomainError::remote)?
            .into_iter()
            .map(|o| o.name)
            .collect();

        if !paths.is_empty() {
            self.storage
                .remove(token, bucket, &paths)
                .await
                .map_err(DomainError::remote)?;
        }

        self.auth
            .update_user_metadata(token, &MetadataPatch::new().clear(AVATAR_URL))
            .await
            .map_err(DomainError::remote)?;

        info!(user_id = %user.id, removed = paths.len(), "avatar deleted");
        Ok(())
    }

    #[instrument(name = "profiles.service.check_navigation", skip(self, token))]
    pub async fn check_navigation(
        &self,
        token: Option<&AccessToken>,
        destination: &str,
        origin: NavigationOrigin,
    ) -> Result<GuardDecision, DomainError> {
        let profile = self.get_profile(token).await?;
        Ok(guard::evaluate(&self.config.guard, &profile, destination, origin))
    }

    fn validate_update(&self, update: &ProfileUpdate) -> Result<(), DomainError> {
        for (key, field) in update.fields() {
            if let Some(value) = field.as_set() {
                if value.chars().count() > self.config.max_field_length {
                    return Err(DomainError::bad_input(format!(
                        "{key} must be at most {} characters",
                        self.config.max_field_length
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_avatar(&self, file: &AvatarFile) -> Result<String, DomainError> {
        if file.data.is_empty() {
            return Err(DomainError::bad_input("Avatar file is empty"));
        }
        if file.data.len() > self.config.max_avatar_bytes {
            return Err(DomainError::bad_input(format!(
                "Avatar file exceeds {} bytes",
                self.config.max_avatar_bytes
            )));
        }
        avatar_extension(&file.file_name)
            .ok_or_else(|| DomainError::bad_input("Avatar file name must have an extension"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::memory::{MemoryAuth, MemoryObjectStore};
    use tracing_test::traced_test;

    fn service() -> Service {
        Service::new(
            Arc::new(MemoryAuth::new()),
            Arc::new(MemoryObjectStore::default()),
            ServiceConfig::default(),
        )
    }

    #[tokio::test]
    #[traced_test]
    async fn anonymous_read_is_logged_under_service_span() {
        let profile = service().get_profile(None).await.unwrap();
        assert!(!profile.is_authenticated());
        assert!(logs_contain("profiles.service.get_profile"));
        assert!(logs_contain("no session; returning anonymous profile"));
    }

    #[test]
    fn overlong_fields_report_the_key() {
        let svc = Service::new(
            Arc::new(MemoryAuth::new()),
            Arc::new(MemoryObjectStore::default()),
            ServiceConfig {
                max_field_length: 3,
                ..Default::default()
            },
        );
        let update = ProfileUpdate {
            full_name: FieldUpdate::Set("Grace".into()),
            ..Default::default()
        };
        assert_eq!(
            svc.validate_update(&update),
            Err(DomainError::BadInput(
                "full_name must be at most 3 characters".into()
            ))
        );
    }
}
