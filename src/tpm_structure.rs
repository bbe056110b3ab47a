/*
 *  Copyright (c) Microsoft Corporation. All rights reserved.
 *  Licensed under the MIT License. See the LICENSE file in the project root for full license information.
 */

//! TPM structure traits
//!
//! A `TpmStructure` pairs a static `StructSchema` with typed access to the fields the
//! schema names. The marshaller only ever talks to structures through these accessors.

use std::fmt::Debug;

use crate::error::*;
use crate::tpm_schema::{FieldDescriptor, IntWidth, StructSchema};
use crate::tpm_types::TPM_HANDLE;
use crate::tpm_union::TpmUnion;

pub use crate::tpm_schema::SessEncInfo;

/// Integer types that can back a fixed-width field
pub trait TpmInt: Debug {
    fn to_wire(&self) -> u64;
    /// Stores the value read from the wire, truncating to this type's width
    fn set_from_wire(&mut self, value: u64);
}

macro_rules! impl_tpm_int {
    ($($ty:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl TpmInt for $ty {
                fn to_wire(&self) -> u64 {
                    *self as $unsigned as u64
                }

                fn set_from_wire(&mut self, value: u64) {
                    *self = value as $unsigned as $ty;
                }
            }
        )*
    };
}

impl_tpm_int!(
    u8 => u8, u16 => u16, u32 => u32, u64 => u64,
    i8 => u8, i16 => u16, i32 => u32, i64 => u64,
);

/// Read-only view of one field, as seen by the encoder
pub enum FieldRef<'a> {
    Int(u64),
    Bytes(&'a [u8]),
    Struct(&'a dyn TpmStructure),
    OptStruct(Option<&'a dyn TpmStructure>),
    Array(&'a dyn StructArray),
    IntArray(&'a dyn IntArray),
    Union(&'a dyn TpmUnion),
}

/// Mutable view of one field, as seen by the decoder
pub enum FieldMut<'a> {
    Int(&'a mut dyn TpmInt),
    Bytes(&'a mut Vec<u8>),
    Struct(&'a mut dyn TpmStructure),
    OptStruct(&'a mut dyn OptionalStructure),
    Array(&'a mut dyn StructArray),
    IntArray(&'a mut dyn IntArray),
    Union(&'a mut dyn TpmUnion),
}

/// Ordered, homogeneous sequence of structures
pub trait StructArray {
    fn len(&self) -> usize;
    fn element(&self, index: usize) -> &dyn TpmStructure;
    fn clear(&mut self);
    /// Appends a default element and returns it for decoding
    fn push_default(&mut self) -> &mut dyn TpmStructure;
}

impl<T: TpmStructure + Default> StructArray for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> &dyn TpmStructure {
        &self[index]
    }

    fn clear(&mut self) {
        Vec::clear(self)
    }

    fn push_default(&mut self) -> &mut dyn TpmStructure {
        self.push(T::default());
        let last = Vec::len(self) - 1;
        &mut self[last]
    }
}

/// Ordered sequence of integers
pub trait IntArray {
    fn len(&self) -> usize;
    fn value(&self, index: usize) -> u64;
    fn clear(&mut self);
    fn push_wire(&mut self, value: u64);
}

impl<T: TpmInt + Default> IntArray for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn value(&self, index: usize) -> u64 {
        self[index].to_wire()
    }

    fn clear(&mut self) {
        Vec::clear(self)
    }

    fn push_wire(&mut self, value: u64) {
        let mut v = T::default();
        v.set_from_wire(value);
        self.push(v);
    }
}

/// Size-prefixed structure that may be absent (zero length on the wire)
pub trait OptionalStructure {
    fn get(&self) -> Option<&dyn TpmStructure>;
    fn clear(&mut self);
    fn insert_default(&mut self) -> &mut dyn TpmStructure;
}

impl<T: TpmStructure + Default> OptionalStructure for Option<T> {
    fn get(&self) -> Option<&dyn TpmStructure> {
        self.as_ref().map(|v| v as &dyn TpmStructure)
    }

    fn clear(&mut self) {
        *self = None;
    }

    fn insert_default(&mut self) -> &mut dyn TpmStructure {
        self.insert(T::default())
    }
}

/// Trait for structures that can be marshaled to/from TPM wire format
pub trait TpmStructure: Debug {
    fn schema(&self) -> &'static StructSchema;

    /// Field at `index` of the schema. Selector fields have no storage and return `None`.
    fn field(&self, index: usize) -> Option<FieldRef<'_>>;

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;

    fn type_name(&self) -> &'static str {
        self.schema().name
    }
}

/// Integers and algorithm IDs double as single-field structures so they can be union
/// payloads (e.g. the key size carried by `TPMU_SYM_KEY_BITS`).
macro_rules! impl_primitive_structure {
    ($($ty:ty => $name:literal, $width:ident);* $(;)?) => {
        $(
            impl TpmStructure for $ty {
                fn schema(&self) -> &'static StructSchema {
                    static SCHEMA: StructSchema = StructSchema {
                        name: $name,
                        handles: 0,
                        fields: &[FieldDescriptor::new(
                            "value",
                            $crate::tpm_schema::FieldKind::Int(IntWidth::$width),
                        )],
                    };
                    &SCHEMA
                }

                fn field(&self, index: usize) -> Option<FieldRef<'_>> {
                    (index == 0).then(|| FieldRef::Int(self.to_wire()))
                }

                fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
                    if index == 0 {
                        Some(FieldMut::Int(self))
                    } else {
                        None
                    }
                }
            }
        )*
    };
}

impl_primitive_structure!(
    u8 => "UINT8", U8;
    u16 => "UINT16", U16;
    u32 => "UINT32", U32;
    u64 => "UINT64", U64;
);

/// Common trait for all TPM enumeration types
pub trait TpmEnum<T> {
    /// Get the numeric value of the enum
    fn get_value(&self) -> T;
    /// Create enum from a numeric value, failing for values with no named constant
    fn try_from_trait(value: u64) -> Result<Self, TpmError>
    where
        Self: Sized;
    /// Create enum from any numeric value
    fn new_from_trait(value: u64) -> Result<Self, TpmError>
    where
        Self: Sized;
}

/// <summary> Base trait for custom (not defined by TPM 2.0 Part 2) data structures representing
/// a TPM command or response parameters and handles, if any. </summary>
///
/// <remarks> The first `num_handles()` fields of the schema form the handle area. They are
/// skipped by `write_params()`/`read_params()` and are accessed via `ReqStructure` and
/// `RespStructure` instead. </remarks>
pub trait CmdStructure: TpmStructure {
    /// <returns> Number of TPM handles contained (as fields) in this data structure </returns>
    fn num_handles(&self) -> u16 {
        self.schema().handles as u16
    }

    /// <returns> Non-zero size info of the encryptable command/response parameter if session
    /// based encryption can be applied to this object (i.e. its first non-handle field is
    /// marshaled in size-prefixed form). Otherwise returns zero initialized struct. </returns>
    fn sess_enc_info(&self) -> SessEncInfo {
        self.schema().sess_enc_info()
    }
}

/// <summary> Base trait for data structures representing a TPM command parameters and
/// handles, if any. </summary>
pub trait ReqStructure: CmdStructure {
    /// <returns> A vector of TPM handles contained in this request data structure </returns>
    fn get_handles(&self) -> Vec<TPM_HANDLE>;

    /// <returns> Number of authorization TPM handles contained in this data structure </returns>
    fn num_auth_handles(&self) -> u16 {
        0
    }
}

/// <summary> Base trait for data structures representing a TPM response parameters and
/// handles, if any. </summary>
pub trait RespStructure: CmdStructure {
    /// <returns> this structure's handle field value </returns>
    fn get_handle(&self) -> TPM_HANDLE {
        TPM_HANDLE::default()
    }

    /// <summary> Sets this structure's handle field (TPM_HANDLE) if it is present </summary>
    fn set_handle(&mut self, _handle: &TPM_HANDLE) {}
}
