/*
 *  Copyright (c) Microsoft Corporation. All rights reserved.
 *  Licensed under the MIT License. See the LICENSE file in the project root for full license information.
 */

//! Static description of TPM structure layouts.
//!
//! A `StructSchema` is the ordered list of fields that the marshaller walks for one TPM
//! type. Schemas are `'static` data shared by every encode/decode call; nothing here is
//! mutated after compilation.

use crate::error::TpmError;
use crate::tpm_union::UnionSchema;

/// Width of a big-endian integer, length prefix or count prefix on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    U8,
    U16,
    U32,
    U64,
}

impl IntWidth {
    /// Number of bytes occupied on the wire
    pub const fn bytes(self) -> usize {
        match self {
            IntWidth::U8 => 1,
            IntWidth::U16 => 2,
            IntWidth::U32 => 4,
            IntWidth::U64 => 8,
        }
    }

    /// Largest value representable in this width
    pub const fn max_value(self) -> u64 {
        match self {
            IntWidth::U8 => u8::MAX as u64,
            IntWidth::U16 => u16::MAX as u64,
            IntWidth::U32 => u32::MAX as u64,
            IntWidth::U64 => u64::MAX,
        }
    }

    pub const fn from_bytes(bytes: usize) -> Option<IntWidth> {
        match bytes {
            1 => Some(IntWidth::U8),
            2 => Some(IntWidth::U16),
            4 => Some(IntWidth::U32),
            8 => Some(IntWidth::U64),
            _ => None,
        }
    }
}

/// Wire representation of a single structure field
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Fixed-width big-endian integer
    Int(IntWidth),
    /// Byte buffer preceded by its length
    SizedBytes(IntWidth),
    /// Byte buffer filling the rest of the enclosing sized structure (or of the input)
    Remainder,
    /// Nested structure with no length prefix
    Struct,
    /// Nested structure preceded by its encoded length
    SizedStruct(IntWidth),
    /// `{count}{element}*count` array of structures
    Array { count: IntWidth },
    /// `{count}{value}*count` array of integers
    IntArray { count: IntWidth, elem: IntWidth },
    /// Selector value of the union at field index `union`, marshaled where it stands.
    /// Has no backing storage; the value always comes from (or goes to) the union.
    Selector { union: usize },
    /// Discriminated union. With `selector: None` the selector is marshaled inline right
    /// before the variant; otherwise it is the value of the selector field at that index.
    Union {
        schema: &'static UnionSchema,
        selector: Option<usize>,
    },
}

/// One named field of a structure schema
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldDescriptor { name, kind }
    }
}

/// Layout of a TPM structure
#[derive(Debug)]
pub struct StructSchema {
    pub name: &'static str,
    /// Number of leading fields that form a command's handle area
    pub handles: usize,
    pub fields: &'static [FieldDescriptor],
}

/// <summary> Parameters of the TPM command request data structure field, to which session
/// based encryption can be applied (i.e. the first non-handle field marshaled in size-prefixed
/// form, if any) </summary>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessEncInfo {
    /// <summary> Length of the size prefix in bytes. The size prefix contains the number of
    /// elements in the sized area filed (normally just bytes). </summary>
    pub size_len: u16,

    /// <summary> Length of an element of the sized area in bytes (in most cases 1) </summary>
    pub val_len: u16,
}

impl StructSchema {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Fields after the handle area
    pub fn params(&self) -> &'static [FieldDescriptor] {
        &self.fields[self.handles.min(self.fields.len())..]
    }

    /// Size-prefix info of the first parameter if session encryption can apply to it
    pub fn sess_enc_info(&self) -> SessEncInfo {
        let info = |size: IntWidth, val: IntWidth| SessEncInfo {
            size_len: size.bytes() as u16,
            val_len: val.bytes() as u16,
        };
        match self.params().first().map(|f| f.kind) {
            Some(FieldKind::SizedBytes(w)) | Some(FieldKind::SizedStruct(w)) => info(w, IntWidth::U8),
            Some(FieldKind::IntArray { count, elem }) => info(count, elem),
            _ => SessEncInfo::default(),
        }
    }

    /// Checks that selector fields and the unions keyed on them reference each other
    pub fn validate(&self) -> Result<(), TpmError> {
        let bad = |field: &'static str| TpmError::SchemaMismatch {
            type_name: self.name,
            field,
        };

        if self.handles > self.fields.len() {
            return Err(bad("<handles>"));
        }

        for (index, field) in self.fields.iter().enumerate() {
            match field.kind {
                FieldKind::Selector { union } => match self.fields.get(union).map(|f| f.kind) {
                    Some(FieldKind::Union {
                        selector: Some(sel), ..
                    }) if sel == index && union > index => {}
                    _ => return Err(bad(field.name)),
                },
                FieldKind::Union {
                    schema,
                    selector: Some(sel),
                } => {
                    if sel >= index {
                        return Err(bad(field.name));
                    }
                    // The selector field may be driven by a different union, but it has to
                    // be a union of the same kind so both agree on width and values.
                    let driver = match self.fields[sel].kind {
                        FieldKind::Selector { union } => self.fields.get(union).map(|f| f.kind),
                        _ => return Err(bad(field.name)),
                    };
                    match driver {
                        Some(FieldKind::Union { schema: other, .. })
                            if other.selector_width == schema.selector_width => {}
                        _ => return Err(bad(field.name)),
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SIZED_FIRST: StructSchema = StructSchema {
        name: "SIZED_FIRST",
        handles: 1,
        fields: &[
            FieldDescriptor::new("handle", FieldKind::Int(IntWidth::U32)),
            FieldDescriptor::new("data", FieldKind::SizedBytes(IntWidth::U16)),
            FieldDescriptor::new("flags", FieldKind::Int(IntWidth::U8)),
        ],
    };

    static DANGLING_SELECTOR: StructSchema = StructSchema {
        name: "DANGLING_SELECTOR",
        handles: 0,
        fields: &[
            FieldDescriptor::new("type", FieldKind::Selector { union: 1 }),
            FieldDescriptor::new("value", FieldKind::Int(IntWidth::U16)),
        ],
    };

    #[test]
    fn test_widths() {
        assert_eq!(IntWidth::U16.bytes(), 2);
        assert_eq!(IntWidth::U8.max_value(), 0xFF);
        assert_eq!(IntWidth::from_bytes(4), Some(IntWidth::U32));
        assert_eq!(IntWidth::from_bytes(3), None);
    }

    #[test]
    fn test_sess_enc_info_skips_handles() {
        assert_eq!(
            SIZED_FIRST.sess_enc_info(),
            SessEncInfo {
                size_len: 2,
                val_len: 1
            }
        );
        assert_eq!(SIZED_FIRST.params().len(), 2);
        assert_eq!(SIZED_FIRST.field_index("flags"), Some(2));
    }

    #[test]
    fn test_validate_rejects_dangling_selector() {
        assert!(SIZED_FIRST.validate().is_ok());
        assert_eq!(
            DANGLING_SELECTOR.validate(),
            Err(TpmError::SchemaMismatch {
                type_name: "DANGLING_SELECTOR",
                field: "type"
            })
        );
    }
}
