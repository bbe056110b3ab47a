//! Error types for TPM marshaling

use thiserror::Error;

/// Errors produced while encoding or decoding TPM wire structures.
///
/// Everything except `UnregisteredVariant`, `SelectorMismatch` and `SchemaMismatch` is driven
/// by the input bytes, so callers should expect to see them for truncated, hostile or
/// version-skewed TPM responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TpmError {
    /// Fewer bytes remain than a fixed-width or declared-length read requires
    #[error("buffer underrun at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A size prefix announces more bytes than the buffer holds
    #[error("sized field at offset {offset} declares {declared} bytes, only {remaining} remaining")]
    TruncatedSizedField {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    /// A size-prefixed structure consumed a different number of bytes than it declared
    #[error("{type_name} declared {declared} bytes but consumed {consumed}")]
    SizeMismatch {
        type_name: &'static str,
        declared: usize,
        consumed: usize,
    },

    /// No variant of the union is registered for the selector read from the wire
    #[error("unknown selector 0x{selector:X} for union {union}")]
    UnknownUnionSelector { union: &'static str, selector: u32 },

    /// A top-level decode finished before the end of the buffer
    #[error("{count} trailing bytes after {type_name}")]
    TrailingData { type_name: &'static str, count: usize },

    /// The variant being encoded has no selector in its union's table
    #[error("variant {variant} is not registered in union {union}")]
    UnregisteredVariant {
        union: &'static str,
        variant: &'static str,
    },

    /// A byte buffer or array is too long for its length prefix
    #[error("length {len} does not fit a {width}-byte prefix")]
    LengthOverflow { len: usize, width: usize },

    /// Two unions keyed on the same selector field hold different selectors
    #[error("{type_name}.{field} selector 0x{found:X} disagrees with selector field value 0x{expected:X}")]
    SelectorMismatch {
        type_name: &'static str,
        field: &'static str,
        expected: u32,
        found: u32,
    },

    /// A structure's field accessors do not agree with its schema
    #[error("schema mismatch in {type_name}.{field}")]
    SchemaMismatch {
        type_name: &'static str,
        field: &'static str,
    },

    /// Value is not a known constant of a TPM enumeration
    #[error("invalid {type_name} value 0x{value:X}")]
    InvalidEnumValue { type_name: &'static str, value: u64 },
}

impl TpmError {
    /// Whether the error was caused by the input bytes rather than by a schema or caller bug
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::BufferUnderrun { .. }
                | Self::TruncatedSizedField { .. }
                | Self::SizeMismatch { .. }
                | Self::UnknownUnionSelector { .. }
                | Self::TrailingData { .. }
                | Self::InvalidEnumValue { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = TpmError::UnknownUnionSelector {
            union: "TPMU_SIGNATURE",
            selector: 0x99,
        };
        assert_eq!(err.to_string(), "unknown selector 0x99 for union TPMU_SIGNATURE");

        let err = TpmError::SizeMismatch {
            type_name: "TPMT_PUBLIC",
            declared: 10,
            consumed: 12,
        };
        assert_eq!(err.to_string(), "TPMT_PUBLIC declared 10 bytes but consumed 12");
    }

    #[test]
    fn test_data_errors_are_classified() {
        assert!(TpmError::TrailingData {
            type_name: "TPML_DIGEST",
            count: 1
        }
        .is_data_error());
        assert!(!TpmError::UnregisteredVariant {
            union: "TPMU_SIGNATURE",
            variant: "hmac"
        }
        .is_data_error());
    }
}
