use crate::domain::model::ValidationResult;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Malformed form state in '{field}': {message}")]
    ContractViolation { field: String, message: String },

    #[error("Submission blocked: {} field(s) failed validation", .errors.len())]
    SubmissionBlocked { errors: ValidationResult },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Contract,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CheckoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CheckoutError::IoError(_) => ErrorCategory::Io,
            CheckoutError::ConfigValidationError { .. }
            | CheckoutError::InvalidConfigValueError { .. }
            | CheckoutError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CheckoutError::SerializationError(_) | CheckoutError::ContractViolation { .. } => {
                ErrorCategory::Contract
            }
            CheckoutError::SubmissionBlocked { .. } => ErrorCategory::Validation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 表單驗證失敗是使用者輸入問題，不是系統錯誤
            ErrorCategory::Validation => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Contract => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CheckoutError::IoError(_) => {
                "Check that the file exists and is readable".to_string()
            }
            CheckoutError::SerializationError(_) => {
                "Make sure the form file is valid JSON".to_string()
            }
            CheckoutError::ConfigValidationError { field, .. }
            | CheckoutError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' entry in the configuration file", field)
            }
            CheckoutError::MissingConfigError { field } => {
                format!("Add the '{}' entry to the configuration file", field)
            }
            CheckoutError::ContractViolation { field, .. } => {
                format!("The caller must supply '{}' in the documented shape", field)
            }
            CheckoutError::SubmissionBlocked { errors } => format!(
                "Correct the highlighted fields ({}) and submit again",
                errors.field_names().collect::<Vec<_>>().join(", ")
            ),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CheckoutError::SubmissionBlocked { errors } => {
                let details: Vec<String> = errors
                    .iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .collect();
                format!("The order cannot be submitted yet. {}", details.join("; "))
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation_is_high_severity() {
        let err = CheckoutError::ContractViolation {
            field: "quantities".to_string(),
            message: "expected an object".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Contract);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("quantities"));
    }

    #[test]
    fn test_submission_blocked_lists_fields() {
        let err = CheckoutError::SubmissionBlocked {
            errors: ValidationResult::default(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(
            err.to_string(),
            "Submission blocked: 0 field(s) failed validation"
        );
    }
}
