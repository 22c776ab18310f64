use dealscope_core::{CoreError, PricingError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", .0.user_message())]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(error) => Self::Validation(error),
            CoreError::Pricing(error) => Self::Pricing(error),
            CoreError::Serialization(error) => Self::Serialization(error),
            CoreError::Io(error) => Self::Io(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Pricing(_) => 3,
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_failures_use_user_message_and_exit_three() {
        let error = CliError::from(PricingError::NoDataAvailable {
            failures: Vec::new(),
        });

        assert_eq!(error.to_string(), "pricing unavailable for this item");
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn core_validation_errors_exit_two() {
        let error = CliError::from(CoreError::Validation(ValidationError::EmptySetId));
        assert_eq!(error.exit_code(), 2);
    }
}
