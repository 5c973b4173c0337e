use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefabKeyError {
    #[error("prefab key must not be empty")]
    Empty,
    #[error("prefab key must not start with '.'")]
    LeadingDot,
    #[error("prefab key must not end with '.'")]
    TrailingDot,
    #[error("prefab key must not contain '..'")]
    EmptySegment,
    #[error("prefab key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Prefab keys are dotted lowercase names such as `pickup.sports` or
/// `overlay.light`.
pub fn validate_prefab_key(key: &str) -> Result<(), PrefabKeyError> {
    if key.is_empty() {
        return Err(PrefabKeyError::Empty);
    }
    if key.starts_with('.') {
        return Err(PrefabKeyError::LeadingDot);
    }
    if key.ends_with('.') {
        return Err(PrefabKeyError::TrailingDot);
    }
    if key.contains("..") {
        return Err(PrefabKeyError::EmptySegment);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '.' | '-') {
            continue;
        }
        return Err(PrefabKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}
