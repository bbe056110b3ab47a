/*
 *  Copyright (c) Microsoft Corporation. All rights reserved.
 *  Licensed under the MIT License. See the LICENSE file in the project root for full license information.
 */

use crate::{tpm_buffer::TpmBuffer, tpm_schema::IntWidth, tpm_types::ENUM_TO_STR_MAP};

/// Convert a numeric enum value to its string representation
///
/// # Arguments
///
/// * `enum_val` - The numeric value of the enum
/// * `enum_id` - The identifier of the enum type
///
/// # Returns
///
/// The string representation of the enum value, or a formatted string of OR'd values.
/// Bits with no name are rendered in hex. Empty if the enum type is not registered.
pub fn enum_to_str(enum_val: u64, enum_id: std::any::TypeId) -> String {
    let mut res = String::new();

    // Try to find the exact enum value in the map
    if let Some(enum_map) = ENUM_TO_STR_MAP.get(&enum_id) {
        if let Some(name) = enum_map.get(&enum_val) {
            return name.to_string();
        }

        // If not found as an exact match, try to decompose as bit flags
        for bit in 0..u64::BITS {
            let cur_bit = 1u64 << bit;
            if (cur_bit & enum_val) == 0 {
                continue;
            }

            if !res.is_empty() {
                res.push_str(" | ");
            }

            match enum_map.get(&cur_bit) {
                Some(bit_name) => res.push_str(bit_name),
                None => res.push_str(&format!("0x{:X}", cur_bit)),
            }
        }
    }

    res
}

/// Big-endian encoding of `val` in `width` bytes
pub fn int_to_tpm(val: u64, width: IntWidth) -> Vec<u8> {
    let mut buffer = TpmBuffer::with_capacity(width.bytes());
    buffer.write_num(val, width);
    buffer.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tpm_types::{TPMA_ALGORITHM, TPM_ALG_ID};
    use std::any::TypeId;

    #[test]
    fn test_enum_to_str_exact() {
        assert_eq!(enum_to_str(0x000B, TypeId::of::<TPM_ALG_ID>()), "SHA256");
    }

    #[test]
    fn test_enum_to_str_flags() {
        assert_eq!(
            enum_to_str(0x0109, TypeId::of::<TPMA_ALGORITHM>()),
            "asymmetric | object | signing"
        );
        assert_eq!(
            enum_to_str(0x1001, TypeId::of::<TPMA_ALGORITHM>()),
            "asymmetric | 0x1000"
        );
    }

    #[test]
    fn test_enum_to_str_unregistered_type() {
        assert_eq!(enum_to_str(1, TypeId::of::<u32>()), "");
    }

    #[test]
    fn test_int_to_tpm() {
        assert_eq!(int_to_tpm(0x0102, IntWidth::U16), vec![0x01, 0x02]);
        assert_eq!(int_to_tpm(7, IntWidth::U32), vec![0, 0, 0, 7]);
    }
}
