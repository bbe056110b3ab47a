/*
 *  Copyright (c) Microsoft Corporation. All rights reserved.
 *  Licensed under the MIT License. See the LICENSE file in the project root for full license information.
 */

//! Structure engine: schema-driven marshaling of TPM structures.
//!
//! One pair of walkers serves every structure type. `write_structure` visits the fields of
//! a schema in order and appends their wire form; `read_structure` performs the inverse,
//! filling a default-constructed instance in place.

use crate::error::TpmError;
use crate::tpm_buffer::{TpmBuffer, TpmReader};
use crate::tpm_schema::{FieldDescriptor, FieldKind, IntWidth, StructSchema};
use crate::tpm_structure::{FieldMut, FieldRef, TpmStructure};
use crate::tpm_union::{selector_for, variant_for, TpmUnion};

fn schema_mismatch(schema: &StructSchema, field: &FieldDescriptor) -> TpmError {
    TpmError::SchemaMismatch {
        type_name: schema.name,
        field: field.name,
    }
}

/// Wire width of a selector field, taken from the union it drives
fn selector_width(
    schema: &StructSchema,
    desc: &FieldDescriptor,
    union: usize,
) -> Result<IntWidth, TpmError> {
    match schema.fields.get(union).map(|f| f.kind) {
        Some(FieldKind::Union { schema: us, .. }) => Ok(us.selector_width),
        _ => Err(schema_mismatch(schema, desc)),
    }
}

/// Selector currently held by the union that drives the selector field at `selector_index`
fn driven_selector(s: &dyn TpmStructure, selector_index: usize) -> Result<u32, TpmError> {
    let schema = s.schema();
    let field = schema
        .fields
        .get(selector_index)
        .ok_or(TpmError::SchemaMismatch {
            type_name: schema.name,
            field: "<selector>",
        })?;
    let union = match field.kind {
        FieldKind::Selector { union } => union,
        _ => return Err(schema_mismatch(schema, field)),
    };
    match s.field(union) {
        Some(FieldRef::Union(u)) => selector_for(u),
        _ => Err(schema_mismatch(schema, field)),
    }
}

/// Appends the wire form of `s`
pub fn write_structure(buf: &mut TpmBuffer, s: &dyn TpmStructure) -> Result<(), TpmError> {
    write_fields(buf, s, 0)
}

/// Appends the wire form of the fields after a command structure's handle area
pub fn write_params(buf: &mut TpmBuffer, s: &dyn TpmStructure) -> Result<(), TpmError> {
    write_fields(buf, s, s.schema().handles)
}

fn write_fields(buf: &mut TpmBuffer, s: &dyn TpmStructure, first: usize) -> Result<(), TpmError> {
    let schema = s.schema();

    for (index, desc) in schema.fields.iter().enumerate().skip(first) {
        if let FieldKind::Selector { union } = desc.kind {
            let width = selector_width(schema, desc, union)?;
            let selector = driven_selector(s, index)?;
            buf.write_num(u64::from(selector), width);
            continue;
        }

        let field = s.field(index).ok_or_else(|| schema_mismatch(schema, desc))?;
        match (desc.kind, field) {
            (FieldKind::Int(width), FieldRef::Int(value)) => buf.write_num(value, width),
            (FieldKind::SizedBytes(width), FieldRef::Bytes(data)) => {
                buf.write_sized_byte_buf(data, width)?
            }
            (FieldKind::Remainder, FieldRef::Bytes(data)) => buf.write_byte_buf(data),
            (FieldKind::Struct, FieldRef::Struct(nested)) => write_structure(buf, nested)?,
            (FieldKind::SizedStruct(width), FieldRef::Struct(nested)) => {
                write_sized_structure(buf, Some(nested), width)?
            }
            (FieldKind::SizedStruct(width), FieldRef::OptStruct(nested)) => {
                write_sized_structure(buf, nested, width)?
            }
            (FieldKind::Array { count }, FieldRef::Array(arr)) => {
                buf.write_len(arr.len(), count)?;
                for i in 0..arr.len() {
                    write_structure(buf, arr.element(i))?;
                }
            }
            (FieldKind::IntArray { count, elem }, FieldRef::IntArray(arr)) => {
                buf.write_len(arr.len(), count)?;
                for i in 0..arr.len() {
                    buf.write_num(arr.value(i), elem);
                }
            }
            (FieldKind::Union { schema: us, selector }, FieldRef::Union(u)) => {
                write_union(buf, s, desc, us.selector_width, selector, u)?
            }
            _ => return Err(schema_mismatch(schema, desc)),
        }
    }
    Ok(())
}

fn write_union(
    buf: &mut TpmBuffer,
    owner: &dyn TpmStructure,
    desc: &FieldDescriptor,
    width: IntWidth,
    selector_field: Option<usize>,
    u: &dyn TpmUnion,
) -> Result<(), TpmError> {
    let selector = selector_for(u)?;
    match selector_field {
        None => buf.write_num(u64::from(selector), width),
        Some(index) => {
            let expected = driven_selector(owner, index)?;
            if expected != selector {
                return Err(TpmError::SelectorMismatch {
                    type_name: owner.schema().name,
                    field: desc.name,
                    expected,
                    found: selector,
                });
            }
        }
    }
    write_structure(buf, u.variant())
}

/// Writes `s` preceded by its encoded length. `None` is written as a zero length.
pub fn write_sized_structure(
    buf: &mut TpmBuffer,
    s: Option<&dyn TpmStructure>,
    width: IntWidth,
) -> Result<(), TpmError> {
    let mut tmp = TpmBuffer::new();
    if let Some(s) = s {
        write_structure(&mut tmp, s)?;
    }
    buf.write_sized_byte_buf(tmp.trim(), width)
}

/// Fills `s` from the reader, leaving the cursor right after it
pub fn read_structure(reader: &mut TpmReader, s: &mut dyn TpmStructure) -> Result<(), TpmError> {
    read_fields(reader, s, 0)
}

/// Fills the fields after a command structure's handle area
pub fn read_params(reader: &mut TpmReader, s: &mut dyn TpmStructure) -> Result<(), TpmError> {
    let first = s.schema().handles;
    read_fields(reader, s, first)
}

fn read_fields(
    reader: &mut TpmReader,
    s: &mut dyn TpmStructure,
    first: usize,
) -> Result<(), TpmError> {
    let schema = s.schema();
    log::trace!("reading {} at offset {}", schema.name, reader.position());

    // Selector values read so far, by field index
    let mut selectors: Vec<Option<u32>> = Vec::new();

    for (index, desc) in schema.fields.iter().enumerate().skip(first) {
        match desc.kind {
            FieldKind::Selector { union } => {
                let width = selector_width(schema, desc, union)?;
                let value = reader.read_num(width)? as u32;
                if selectors.len() <= index {
                    selectors.resize(index + 1, None);
                }
                selectors[index] = Some(value);
            }
            FieldKind::Union {
                schema: us,
                selector,
            } => {
                let value = match selector {
                    None => reader.read_num(us.selector_width)? as u32,
                    Some(sel) => selectors
                        .get(sel)
                        .copied()
                        .flatten()
                        .ok_or_else(|| schema_mismatch(schema, desc))?,
                };
                match s.field_mut(index) {
                    Some(FieldMut::Union(u)) => {
                        let variant = variant_for(u, value)?;
                        read_structure(reader, variant)?;
                    }
                    _ => return Err(schema_mismatch(schema, desc)),
                }
            }
            kind => {
                let field = s.field_mut(index).ok_or_else(|| schema_mismatch(schema, desc))?;
                read_field(reader, schema, desc, kind, field)?;
            }
        }
    }
    Ok(())
}

fn read_field(
    reader: &mut TpmReader,
    schema: &StructSchema,
    desc: &FieldDescriptor,
    kind: FieldKind,
    field: FieldMut<'_>,
) -> Result<(), TpmError> {
    match (kind, field) {
        (FieldKind::Int(width), FieldMut::Int(value)) => {
            value.set_from_wire(reader.read_num(width)?);
        }
        (FieldKind::SizedBytes(width), FieldMut::Bytes(data)) => {
            *data = reader.read_sized_byte_buf(width)?;
        }
        (FieldKind::Remainder, FieldMut::Bytes(data)) => {
            let len = reader.remainder_len()?;
            *data = reader.read_byte_buf(len)?;
        }
        (FieldKind::Struct, FieldMut::Struct(nested)) => read_structure(reader, nested)?,
        (FieldKind::SizedStruct(width), FieldMut::Struct(nested)) => {
            read_sized_structure(reader, nested, width)?;
        }
        (FieldKind::SizedStruct(width), FieldMut::OptStruct(slot)) => {
            let declared = reader.read_num(width)? as usize;
            if declared == 0 {
                slot.clear();
            } else {
                read_sized_body(reader, slot.insert_default(), declared)?;
            }
        }
        (FieldKind::Array { count }, FieldMut::Array(arr)) => {
            let n = read_count(reader, count)?;
            arr.clear();
            for _ in 0..n {
                read_structure(reader, arr.push_default())?;
            }
        }
        (FieldKind::IntArray { count, elem }, FieldMut::IntArray(arr)) => {
            let n = read_count(reader, count)?;
            let needed = n.saturating_mul(elem.bytes());
            if needed > reader.remaining() {
                return Err(TpmError::BufferUnderrun {
                    offset: reader.position(),
                    needed,
                    remaining: reader.remaining(),
                });
            }
            arr.clear();
            for _ in 0..n {
                arr.push_wire(reader.read_num(elem)?);
            }
        }
        _ => return Err(schema_mismatch(schema, desc)),
    }
    Ok(())
}

/// Reads an element count. Every element occupies at least one byte, so a count larger than
/// what is left cannot be satisfied; rejecting it up front keeps the loop bounded by the input.
fn read_count(reader: &mut TpmReader, width: IntWidth) -> Result<usize, TpmError> {
    let n = reader.read_num(width)? as usize;
    if n > reader.remaining() {
        return Err(TpmError::BufferUnderrun {
            offset: reader.position(),
            needed: n,
            remaining: reader.remaining(),
        });
    }
    Ok(n)
}

/// Reads a `width`-byte length and decodes `s` from exactly that many bytes
pub fn read_sized_structure(
    reader: &mut TpmReader,
    s: &mut dyn TpmStructure,
    width: IntWidth,
) -> Result<(), TpmError> {
    let declared = reader.read_num(width)? as usize;
    read_sized_body(reader, s, declared)
}

fn read_sized_body(
    reader: &mut TpmReader,
    s: &mut dyn TpmStructure,
    declared: usize,
) -> Result<(), TpmError> {
    reader.push_size_context(declared, s.schema().name)?;
    let result = read_structure(reader, s);
    let popped = reader.pop_size_context();
    result?;
    popped.map(|_| ())
}

/// Marshals `s` into a fresh byte vector
pub fn encode(s: &dyn TpmStructure) -> Result<Vec<u8>, TpmError> {
    let mut buf = TpmBuffer::new();
    write_structure(&mut buf, s)?;
    Ok(buf.into_bytes())
}

/// Decodes a complete `T` from `bytes`; leftover bytes are an error
pub fn decode<T: TpmStructure + Default>(bytes: &[u8]) -> Result<T, TpmError> {
    let mut value = T::default();
    decode_into(bytes, &mut value)?;
    Ok(value)
}

/// Decodes `bytes` into `s`, which must consume the whole buffer
pub fn decode_into(bytes: &[u8], s: &mut dyn TpmStructure) -> Result<(), TpmError> {
    let mut reader = TpmReader::new(bytes);
    read_structure(&mut reader, s)?;
    if !reader.is_at_end() {
        let count = reader.remaining_in_buffer();
        log::debug!("{} trailing bytes after {}", count, s.type_name());
        return Err(TpmError::TrailingData {
            type_name: s.type_name(),
            count,
        });
    }
    Ok(())
}

/// Convenience marshaling methods available on every TPM structure
pub trait TpmMarshaller: TpmStructure + Sized {
    /// Serialize this structure into the given TPM buffer
    fn to_tpm(&self, buf: &mut TpmBuffer) -> Result<(), TpmError> {
        write_structure(buf, self)
    }

    /// Populate this structure from the reader's current position
    fn init_from_tpm(&mut self, reader: &mut TpmReader) -> Result<(), TpmError> {
        read_structure(reader, self)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, TpmError> {
        encode(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, TpmError>
    where
        Self: Default,
    {
        decode(bytes)
    }

    /// Wire form wrapped in a 2-byte size prefix (the structure's TPM2B form)
    fn as_tpm2b(&self) -> Result<Vec<u8>, TpmError> {
        let mut buf = TpmBuffer::new();
        write_sized_structure(&mut buf, Some(self as &dyn TpmStructure), IntWidth::U16)?;
        Ok(buf.into_bytes())
    }

    fn from_tpm2b(bytes: &[u8]) -> Result<Self, TpmError>
    where
        Self: Default,
    {
        let mut value = Self::default();
        let mut reader = TpmReader::new(bytes);
        read_sized_structure(&mut reader, &mut value, IntWidth::U16)?;
        if !reader.is_at_end() {
            return Err(TpmError::TrailingData {
                type_name: value.type_name(),
                count: reader.remaining_in_buffer(),
            });
        }
        Ok(value)
    }
}

impl<T: TpmStructure> TpmMarshaller for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tpm_types::*;
    use proptest::prelude::*;

    tpm_struct! {
        struct PAIR {
            data: Vec<u8> => sized(U16),
            value: u32 => int(U32),
        }
    }

    tpm_struct! {
        struct WRAPPED {
            inner: PAIR => sized_structure(U16),
        }
    }

    tpm_struct! {
        struct OUTER {
            wrapped: WRAPPED => sized_structure(U16),
        }
    }

    tpm_struct! {
        struct ECC_POINT_SIG {
            signatureR: Vec<u8> => sized(U16),
            signatureS: Vec<u8> => sized(U16),
        }
    }

    tpm_union! {
        enum POINT_SIGNATURE: TPM_ALG_ID[U16], default = ecdsa {
            ecdsa(ECC_POINT_SIG) = ECDSA,
            sm2(ECC_POINT_SIG) = SM2,
        }
    }

    tpm_struct! {
        struct SIGNED {
            signature: POINT_SIGNATURE => union(POINT_SIGNATURE),
        }
    }

    /// Declares an integer field but hands out bytes
    #[derive(Debug, Default)]
    struct MISDECLARED {
        data: Vec<u8>,
    }

    impl TpmStructure for MISDECLARED {
        fn schema(&self) -> &'static StructSchema {
            static SCHEMA: StructSchema = StructSchema {
                name: "MISDECLARED",
                handles: 0,
                fields: &[FieldDescriptor::new("count", FieldKind::Int(IntWidth::U16))],
            };
            &SCHEMA
        }

        fn field(&self, index: usize) -> Option<FieldRef<'_>> {
            (index == 0).then(|| FieldRef::Bytes(&self.data))
        }

        fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
            if index == 0 {
                Some(FieldMut::Bytes(&mut self.data))
            } else {
                None
            }
        }
    }

    fn pair() -> PAIR {
        PAIR {
            data: vec![1, 2, 3],
            value: 7,
        }
    }

    const PAIR_BYTES: [u8; 9] = [0x00, 0x03, 0x01, 0x02, 0x03, 0x00, 0x00, 0x00, 0x07];

    #[test]
    fn test_encode_sized_bytes_then_int() {
        assert_eq!(encode(&pair()).unwrap(), PAIR_BYTES.to_vec());
        assert_eq!(decode::<PAIR>(&PAIR_BYTES).unwrap(), pair());
    }

    #[test]
    fn test_union_selector_precedes_variant() {
        let signed = SIGNED {
            signature: POINT_SIGNATURE::ecdsa(ECC_POINT_SIG {
                signatureR: vec![0xAA],
                signatureS: vec![0xBB],
            }),
        };
        let bytes = signed.to_bytes().unwrap();
        assert_eq!(bytes, vec![0x00, 0x18, 0x00, 0x01, 0xAA, 0x00, 0x01, 0xBB]);
        assert_eq!(SIGNED::from_bytes(&bytes).unwrap(), signed);
    }

    #[test]
    fn test_union_decode_picks_variant_by_selector() {
        let bytes = [0x00, 0x1B, 0x00, 0x00, 0x00, 0x01, 0xCC];
        let signed = SIGNED::from_bytes(&bytes).unwrap();
        assert_eq!(
            signed.signature,
            POINT_SIGNATURE::sm2(ECC_POINT_SIG {
                signatureR: vec![],
                signatureS: vec![0xCC],
            })
        );
    }

    #[test]
    fn test_union_unknown_selector() {
        let bytes = [0x00, 0x16, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(
            SIGNED::from_bytes(&bytes),
            Err(TpmError::UnknownUnionSelector {
                union: "POINT_SIGNATURE",
                selector: 0x0016
            })
        );
    }

    #[test]
    fn test_sized_structure_prefix() {
        let wrapped = WRAPPED { inner: pair() };
        let bytes = wrapped.to_bytes().unwrap();
        assert_eq!(&bytes[..2], &[0x00, 0x09]);
        assert_eq!(&bytes[2..], &PAIR_BYTES[..]);
        assert_eq!(WRAPPED::from_bytes(&bytes).unwrap(), wrapped);
        assert_eq!(pair().as_tpm2b().unwrap(), bytes);
        assert_eq!(PAIR::from_tpm2b(&bytes).unwrap(), pair());
    }

    #[test]
    fn test_sized_structure_declared_too_large() {
        let mut bytes = vec![0x00, 0x0A];
        bytes.extend_from_slice(&PAIR_BYTES);
        bytes.push(0xEE);
        assert_eq!(
            WRAPPED::from_bytes(&bytes),
            Err(TpmError::SizeMismatch {
                type_name: "PAIR",
                declared: 10,
                consumed: 9
            })
        );
    }

    #[test]
    fn test_sized_structure_declared_too_small() {
        let mut bytes = vec![0x00, 0x08];
        bytes.extend_from_slice(&PAIR_BYTES);
        assert_eq!(
            WRAPPED::from_bytes(&bytes),
            Err(TpmError::SizeMismatch {
                type_name: "PAIR",
                declared: 8,
                consumed: 9
            })
        );
    }

    #[test]
    fn test_inner_size_exceeds_outer() {
        let mut bytes = vec![0x00, 0x03, 0x00, 0x09];
        bytes.extend_from_slice(&PAIR_BYTES);
        assert_eq!(
            OUTER::from_bytes(&bytes),
            Err(TpmError::SizeMismatch {
                type_name: "WRAPPED",
                declared: 3,
                consumed: 11
            })
        );
    }

    #[test]
    fn test_nested_sized_round_trip() {
        let outer = OUTER {
            wrapped: WRAPPED { inner: pair() },
        };
        let bytes = outer.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0x00, 0x0B, 0x00, 0x09]);
        assert_eq!(OUTER::from_bytes(&bytes).unwrap(), outer);
    }

    #[test]
    fn test_size_contexts_are_released_after_error() {
        let mut bytes = vec![0x00, 0x0A];
        bytes.extend_from_slice(&PAIR_BYTES);
        bytes.push(0xEE);
        let mut reader = TpmReader::new(&bytes);
        let mut wrapped = WRAPPED::default();
        assert!(wrapped.init_from_tpm(&mut reader).is_err());
        assert_eq!(reader.depth(), 0);
    }

    #[test]
    fn test_trailing_data() {
        let mut bytes = PAIR_BYTES.to_vec();
        bytes.push(0xFF);
        assert_eq!(
            decode::<PAIR>(&bytes),
            Err(TpmError::TrailingData {
                type_name: "PAIR",
                count: 1
            })
        );

        // Streaming reads leave the rest for the caller
        let mut reader = TpmReader::new(&bytes);
        let mut value = PAIR::default();
        value.init_from_tpm(&mut reader).unwrap();
        assert_eq!(value, pair());
        assert_eq!(reader.read_u8(), Ok(0xFF));
    }

    #[test]
    fn test_buffer_underrun() {
        assert_eq!(
            decode::<PAIR>(&PAIR_BYTES[..7]),
            Err(TpmError::BufferUnderrun {
                offset: 5,
                needed: 4,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_truncated_sized_field() {
        assert_eq!(
            decode::<PAIR>(&[0x00, 0x05, 0x01, 0x02]),
            Err(TpmError::TruncatedSizedField {
                offset: 2,
                declared: 5,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_length_overflow() {
        let sel = TPMS_PCR_SELECTION {
            hash: TPM_ALG_ID::SHA1,
            pcrSelect: vec![0; 256],
        };
        assert_eq!(
            sel.to_bytes(),
            Err(TpmError::LengthOverflow { len: 256, width: 1 })
        );
    }

    #[test]
    fn test_array_count_beyond_input() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00];
        assert!(matches!(
            TPML_DIGEST::from_bytes(&bytes),
            Err(TpmError::BufferUnderrun { needed: 0xFFFF_FFFF, .. })
        ));
        assert!(matches!(
            TPML_HANDLE::from_bytes(&[0x00, 0x00, 0x00, 0x02, 0x81, 0x00, 0x00, 0x01]),
            Err(TpmError::BufferUnderrun { needed: 8, remaining: 4, .. })
        ));
    }

    #[test]
    fn test_empty_array_and_empty_buffer() {
        let list = TPML_DIGEST::default();
        assert_eq!(list.to_bytes().unwrap(), vec![0, 0, 0, 0]);
        assert_eq!(TPML_DIGEST::from_bytes(&[0, 0, 0, 0]).unwrap(), list);
        assert_eq!(
            TPM2B_DIGEST::from_bytes(&[0, 0]).unwrap(),
            TPM2B_DIGEST::default()
        );
    }

    #[test]
    fn test_decode_resets_previous_contents() {
        let mut list = TPML_DIGEST {
            digests: vec![TPM2B_DIGEST::new(&[1]), TPM2B_DIGEST::new(&[2])],
        };
        decode_into(&[0, 0, 0, 1, 0, 1, 9], &mut list).unwrap();
        assert_eq!(list.digests, vec![TPM2B_DIGEST::new(&[9])]);
    }

    #[test]
    fn test_schema_mismatch() {
        let value = MISDECLARED { data: vec![1] };
        assert_eq!(
            encode(&value),
            Err(TpmError::SchemaMismatch {
                type_name: "MISDECLARED",
                field: "count"
            })
        );
        let mut target = MISDECLARED::default();
        assert!(matches!(
            decode_into(&[0, 1], &mut target),
            Err(TpmError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_write_params_without_handles_matches_structure() {
        let mut params = TpmBuffer::new();
        write_params(&mut params, &pair()).unwrap();
        assert_eq!(params.trim(), &PAIR_BYTES[..]);

        let mut reader = TpmReader::new(&PAIR_BYTES);
        let mut value = PAIR::default();
        read_params(&mut reader, &mut value).unwrap();
        assert_eq!(value, pair());
    }

    proptest! {
        #[test]
        fn pair_round_trip(data in proptest::collection::vec(any::<u8>(), 0..300), value in any::<u32>()) {
            let original = PAIR { data, value };
            let bytes = original.to_bytes().unwrap();
            prop_assert_eq!(bytes.len(), 2 + original.data.len() + 4);
            prop_assert_eq!(PAIR::from_bytes(&bytes).unwrap(), original);
        }

        #[test]
        fn digest_list_round_trip(digests in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..64), 0..8)) {
            let list = TPML_DIGEST {
                digests: digests.iter().map(|d| TPM2B_DIGEST::new(d)).collect(),
            };
            let bytes = list.to_bytes().unwrap();
            prop_assert_eq!(TPML_DIGEST::from_bytes(&bytes).unwrap(), list);
        }

        #[test]
        fn every_strict_prefix_fails(data in proptest::collection::vec(any::<u8>(), 0..16), value in any::<u32>()) {
            let outer = OUTER {
                wrapped: WRAPPED { inner: PAIR { data, value } },
            };
            let bytes = outer.to_bytes().unwrap();
            for len in 0..bytes.len() {
                let result = OUTER::from_bytes(&bytes[..len]);
                prop_assert!(result.is_err());
                prop_assert!(result.unwrap_err().is_data_error());
            }
        }

        #[test]
        fn ecc_signature_round_trip(r in proptest::collection::vec(any::<u8>(), 0..48), s in proptest::collection::vec(any::<u8>(), 0..48), extra in any::<u8>()) {
            let sig = TPMT_SIGNATURE::new(TPMU_SIGNATURE::ecdsa(TPMS_SIGNATURE_ECDSA {
                hash: TPM_ALG_ID::SHA384,
                signatureR: r,
                signatureS: s,
            }));
            let mut bytes = sig.to_bytes().unwrap();
            prop_assert_eq!(TPMT_SIGNATURE::from_bytes(&bytes).unwrap(), sig);

            bytes.push(extra);
            prop_assert_eq!(
                TPMT_SIGNATURE::from_bytes(&bytes),
                Err(TpmError::TrailingData { type_name: "TPMT_SIGNATURE", count: 1 })
            );
        }

        #[test]
        fn arbitrary_capability_data_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            if let Err(e) = TPMS_CAPABILITY_DATA::from_bytes(&bytes) {
                prop_assert!(e.is_data_error());
            }
        }
    }
}
