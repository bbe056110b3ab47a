/*
 *  Copyright (c) Microsoft Corporation. All rights reserved.
 *  Licensed under the MIT License. See the LICENSE file in the project root for full license information.
 */

//! Union resolution: mapping between wire selectors and union variants.
//!
//! Each TPM union kind (`TPMU_SIGNATURE`, `TPMU_CAPABILITIES`, ...) is a Rust enum whose
//! variants carry the concrete payload structure, plus a static `UnionSchema` listing the
//! selector registered for every variant. Union kinds that accept "no algorithm" register a
//! zero-field placeholder for it and name that selector in `null_selector`.

use std::fmt::Debug;

use crate::error::TpmError;
use crate::tpm_schema::IntWidth;
use crate::tpm_structure::TpmStructure;

/// One registered union variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnionVariant {
    pub selector: u32,
    pub name: &'static str,
}

/// Selector table of a union kind
#[derive(Debug)]
pub struct UnionSchema {
    pub name: &'static str,
    /// Width of the selector on the wire
    pub selector_width: IntWidth,
    pub variants: &'static [UnionVariant],
    /// Selector that decodes to an empty placeholder, if this union admits one
    pub null_selector: Option<u32>,
}

impl UnionSchema {
    pub fn variant(&self, selector: u32) -> Option<&'static UnionVariant> {
        self.variants.iter().find(|v| v.selector == selector)
    }

    pub fn contains(&self, selector: u32) -> bool {
        self.variant(selector).is_some()
    }

    pub fn is_null(&self, selector: u32) -> bool {
        self.null_selector == Some(selector)
    }
}

/// Trait for TPM union types
pub trait TpmUnion: Debug {
    fn union_schema(&self) -> &'static UnionSchema;

    /// Selector of the variant currently held
    fn selector(&self) -> u32;

    /// Name of the variant currently held
    fn variant_name(&self) -> &'static str;

    fn variant(&self) -> &dyn TpmStructure;

    fn variant_mut(&mut self) -> &mut dyn TpmStructure;

    /// Replaces the held value with an empty instance of the variant for `selector`.
    /// Returns false if this union has no such variant.
    fn select(&mut self, selector: u32) -> bool;
}

/// Encode direction: the selector to write for the variant held by `value`
pub fn selector_for(value: &dyn TpmUnion) -> Result<u32, TpmError> {
    let schema = value.union_schema();
    let selector = value.selector();
    if schema.contains(selector) {
        Ok(selector)
    } else {
        Err(TpmError::UnregisteredVariant {
            union: schema.name,
            variant: value.variant_name(),
        })
    }
}

/// Decode direction: switches `value` to the empty variant registered for `selector` and
/// returns it so the payload can be read into it
pub fn variant_for(
    value: &mut dyn TpmUnion,
    selector: u32,
) -> Result<&mut dyn TpmStructure, TpmError> {
    let schema = value.union_schema();
    if !schema.contains(selector) || !value.select(selector) {
        log::debug!("no {} variant for selector 0x{:X}", schema.name, selector);
        return Err(TpmError::UnknownUnionSelector {
            union: schema.name,
            selector,
        });
    }
    log::trace!(
        "{} selector 0x{:X} -> {}",
        schema.name,
        selector,
        value.variant_name()
    );
    Ok(value.variant_mut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tpm_types::*;

    /// Hand-written union whose `selector` can return a code missing from its table
    #[derive(Debug, Default)]
    struct Unregistered {
        payload: TPMS_SCHEME_HASH,
    }

    static UNREGISTERED_SCHEMA: UnionSchema = UnionSchema {
        name: "UNREGISTERED",
        selector_width: IntWidth::U16,
        variants: &[UnionVariant {
            selector: 0x0004,
            name: "sha1",
        }],
        null_selector: None,
    };

    impl TpmUnion for Unregistered {
        fn union_schema(&self) -> &'static UnionSchema {
            &UNREGISTERED_SCHEMA
        }

        fn selector(&self) -> u32 {
            0x000B
        }

        fn variant_name(&self) -> &'static str {
            "sha256"
        }

        fn variant(&self) -> &dyn TpmStructure {
            &self.payload
        }

        fn variant_mut(&mut self) -> &mut dyn TpmStructure {
            &mut self.payload
        }

        fn select(&mut self, selector: u32) -> bool {
            selector == 0x0004
        }
    }

    #[test]
    fn test_selector_for_registered_variant() {
        let sig = TPMU_SIGNATURE::ecdsa(TPMS_SIGNATURE_ECDSA::default());
        assert_eq!(selector_for(&sig), Ok(u32::from(TPM_ALG_ID::ECDSA.0)));
    }

    #[test]
    fn test_selector_for_unregistered_variant() {
        assert_eq!(
            selector_for(&Unregistered::default()),
            Err(TpmError::UnregisteredVariant {
                union: "UNREGISTERED",
                variant: "sha256"
            })
        );
    }

    #[test]
    fn test_variant_for_switches_variant() {
        let mut sig = TPMU_SIGNATURE::default();
        assert!(variant_for(&mut sig, u32::from(TPM_ALG_ID::RSAPSS.0)).is_ok());
        assert!(matches!(sig, TPMU_SIGNATURE::rsapss(_)));
    }

    #[test]
    fn test_variant_for_unknown_selector() {
        let mut sig = TPMU_SIGNATURE::default();
        assert_eq!(
            variant_for(&mut sig, 0x7777).err(),
            Some(TpmError::UnknownUnionSelector {
                union: "TPMU_SIGNATURE",
                selector: 0x7777
            })
        );
    }

    #[test]
    fn test_null_variant_is_explicit_per_union() {
        let null = u32::from(TPM_ALG_ID::NULL.0);
        assert!(TPMU_SIGNATURE::SCHEMA.is_null(null));
        assert!(TPMU_SIGNATURE::SCHEMA.contains(null));

        assert!(!TPMU_PUBLIC_PARMS::SCHEMA.contains(null));
        let mut parms = TPMU_PUBLIC_PARMS::default();
        assert!(matches!(
            variant_for(&mut parms, null),
            Err(TpmError::UnknownUnionSelector { .. })
        ));
    }
}
