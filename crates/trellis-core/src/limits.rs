//! Input validation limits for labels, type names and bulk mutations

/// Maximum length for edge and vertex labels (256 chars)
pub const MAX_LABEL_LEN: usize = 256;

/// Maximum length for a property key (128 chars)
pub const MAX_PROPERTY_KEY_LEN: usize = 128;

/// Maximum length for a frame type name (128 chars)
pub const MAX_TYPE_NAME_LEN: usize = 128;

/// Maximum peers accepted by a single edge-set replacement (10000)
pub const MAX_REPLACEMENT_PEERS: usize = 10_000;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyLabel,
    LabelTooLong { len: usize, max: usize },
    EmptyPropertyKey,
    PropertyKeyTooLong { len: usize, max: usize },
    EmptyTypeName,
    TypeNameTooLong { len: usize, max: usize },
    TooManyPeers { count: usize, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLabel => write!(f, "Label cannot be empty"),
            Self::LabelTooLong { len, max } => {
                write!(f, "Label too long: {} chars (max {})", len, max)
            }
            Self::EmptyPropertyKey => write!(f, "Property key cannot be empty"),
            Self::PropertyKeyTooLong { len, max } => {
                write!(f, "Property key too long: {} chars (max {})", len, max)
            }
            Self::EmptyTypeName => write!(f, "Type name cannot be empty"),
            Self::TypeNameTooLong { len, max } => {
                write!(f, "Type name too long: {} chars (max {})", len, max)
            }
            Self::TooManyPeers { count, max } => {
                write!(f, "Too many peers in edge-set replacement: {} (max {})", count, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate an element label
pub fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.is_empty() {
        return Err(ValidationError::EmptyLabel);
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(ValidationError::LabelTooLong {
            len: label.len(),
            max: MAX_LABEL_LEN,
        });
    }
    Ok(())
}

/// Validate a property key
pub fn validate_property_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyPropertyKey);
    }
    if key.len() > MAX_PROPERTY_KEY_LEN {
        return Err(ValidationError::PropertyKeyTooLong {
            len: key.len(),
            max: MAX_PROPERTY_KEY_LEN,
        });
    }
    Ok(())
}

/// Validate a frame type name
pub fn validate_type_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyTypeName);
    }
    if name.len() > MAX_TYPE_NAME_LEN {
        return Err(ValidationError::TypeNameTooLong {
            len: name.len(),
            max: MAX_TYPE_NAME_LEN,
        });
    }
    Ok(())
}

/// Validate the number of peers in an edge-set replacement
pub fn validate_peer_count(count: usize) -> Result<(), ValidationError> {
    if count > MAX_REPLACEMENT_PEERS {
        return Err(ValidationError::TooManyPeers {
            count,
            max: MAX_REPLACEMENT_PEERS,
        });
    }
    Ok(())
}
