use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickcap_core::ValidationError),

    #[error("{0}")]
    Command(String),

    #[error(transparent)]
    Store(#[from] tickcap_core::StoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Store(_) => 3,
            Self::Serialization(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickcap_core::{StoreError, ValidationError};

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(CliError::Validation(ValidationError::EmptySymbol).exit_code(), 2);
        assert_eq!(
            CliError::Command(String::from("symbol XRPAUD is not tracked")).exit_code(),
            2
        );
        assert_eq!(
            CliError::Store(StoreError::Backend(String::from("disk I/O error"))).exit_code(),
            3
        );
    }
}
