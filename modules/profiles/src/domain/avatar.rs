use rand::Rng;
use serde::{Deserialize, Serialize};

/// How avatar object paths are derived from the user id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvatarPathStrategy {
    /// `{id}.{ext}`, overwritten on every upload.
    #[default]
    Deterministic,
    /// `{id}-{random}.{ext}`, one object per upload.
    RandomSuffix,
}

impl AvatarPathStrategy {
    pub fn object_path(&self, user_id: &str, ext: &str) -> String {
        match self {
            AvatarPathStrategy::Deterministic => format!("{user_id}.{ext}"),
            AvatarPathStrategy::RandomSuffix => format!("{user_id}-{}.{ext}", random_suffix()),
        }
    }
}

/// Ten base-36 characters.
fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..10)
        .filter_map(|_| std::char::from_digit(rng.random_range(0..36), 36))
        .collect()
}

/// Extension after the last dot, reduced to lowercase ASCII alphanumerics.
pub fn avatar_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext: String = ext
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (!ext.is_empty()).then_some(ext)
}
