use bytes::Bytes;
use platform::{AuthUser, MetadataPatch};
use serde::{Deserialize, Deserializer};

/// Auth metadata keys backing the profile fields.
pub const FULL_NAME: &str = "full_name";
pub const DESCRIPTION: &str = "description";
pub const AVATAR_URL: &str = "avatar_url";

/// Profile projected from the auth user; every field is `None` for anonymous callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }

    /// A blank name counts as unset.
    pub fn has_full_name(&self) -> bool {
        self.full_name
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty())
    }
}

impl From<&AuthUser> for UserProfile {
    fn from(user: &AuthUser) -> Self {
        let field = |key: &str| user.metadata_str(key).map(str::to_owned);
        Self {
            id: Some(user.id.clone()),
            email: user.email.clone(),
            full_name: field(FULL_NAME),
            description: field(DESCRIPTION),
            avatar_url: field(AVATAR_URL),
        }
    }
}

/// Per-field change. In JSON a missing key is `Unchanged`, `null` is `Clear`
/// and a value is `Set`; the field needs `#[serde(default)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Unchanged,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldUpdate::Set(v) => Some(v),
            _ => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => FieldUpdate::Set(v),
            None => FieldUpdate::Clear,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: FieldUpdate<String>,
    pub description: FieldUpdate<String>,
    pub avatar_url: FieldUpdate<String>,
}

impl ProfileUpdate {
    pub fn fields(&self) -> [(&'static str, &FieldUpdate<String>); 3] {
        [
            (FULL_NAME, &self.full_name),
            (DESCRIPTION, &self.description),
            (AVATAR_URL, &self.avatar_url),
        ]
    }

    /// Auth metadata patch: unchanged fields are left out entirely.
    pub fn to_patch(&self) -> MetadataPatch {
        self.fields()
            .into_iter()
            .fold(MetadataPatch::new(), |patch, (key, field)| match field {
                FieldUpdate::Unchanged => patch,
                FieldUpdate::Clear => patch.clear(key),
                FieldUpdate::Set(v) => patch.set(key, v.clone()),
            })
    }
}

/// Uploaded avatar image as received from the client.
#[derive(Debug, Clone)]
pub struct AvatarFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}
