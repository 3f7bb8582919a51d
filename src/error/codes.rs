//! Error code constants.
//!
//! Error codes are organized by category:
//! - 1xxx: Allocation errors
//! - 3xxx: Validation errors
//! - 4xxx: Resource errors
//! - 5xxx: Internal/System errors

/// Error code type with semantic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(i32);

impl ErrorCode {
    // ===== Allocation Errors (1xxx) =====

    /// Not enough unused permutations left in the identifier space.
    pub const CAPACITY_EXCEEDED: Self = Self(1004);

    // ===== Validation Errors (3xxx) =====

    /// Bad request / invalid parameters.
    pub const BAD_REQUEST: Self = Self(3001);

    /// Invalid parameter value.
    pub const INVALID_PARAM: Self = Self(3003);

    // ===== Resource Errors (4xxx) =====

    /// Resource not found.
    pub const NOT_FOUND: Self = Self(4001);

    // ===== Internal/System Errors (5xxx) =====

    /// Storage backend error.
    pub const STORAGE_ERROR: Self = Self(5001);

    /// Service unavailable.
    pub const SERVICE_UNAVAILABLE: Self = Self(5003);

    /// Get the error code as an i32.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::CAPACITY_EXCEEDED.as_i32(), 1004);
        assert_eq!(ErrorCode::BAD_REQUEST.as_i32(), 3001);
        assert_eq!(ErrorCode::INVALID_PARAM.as_i32(), 3003);
        assert_eq!(ErrorCode::NOT_FOUND.as_i32(), 4001);
        assert_eq!(ErrorCode::STORAGE_ERROR.as_i32(), 5001);
        assert_eq!(ErrorCode::SERVICE_UNAVAILABLE.to_string(), "5003");
    }
}
