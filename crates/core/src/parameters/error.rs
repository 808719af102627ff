//! Parameter error types

/// Errors from parameter store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    /// No parameter registered under that name
    UnknownParameter,
    /// Name exceeds `PARAM_NAME_LEN`
    NameTooLong,
    /// Value type differs from the registered default
    TypeMismatch,
    /// Store is full
    StoreFull,
    /// Read-only parameter cannot be modified
    ReadOnly,
}

impl ParameterError {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterError::UnknownParameter => "UnknownParameter",
            ParameterError::NameTooLong => "NameTooLong",
            ParameterError::TypeMismatch => "TypeMismatch",
            ParameterError::StoreFull => "StoreFull",
            ParameterError::ReadOnly => "ReadOnly",
        }
    }
}

impl core::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParameterError::UnknownParameter => write!(f, "unknown parameter"),
            ParameterError::NameTooLong => write!(f, "parameter name too long"),
            ParameterError::TypeMismatch => write!(f, "parameter type mismatch"),
            ParameterError::StoreFull => write!(f, "parameter store full"),
            ParameterError::ReadOnly => write!(f, "parameter is read-only"),
        }
    }
}
