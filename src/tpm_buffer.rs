//! Byte-level TPM wire codec.
//!
//! `TpmBuffer` is the append-only output side; `TpmReader` is a cursor over a borrowed
//! response buffer that also carries the stack of size contexts opened by size-prefixed
//! structures. A reader lives for one decode call, so the stack is never shared.

use crate::error::TpmError;
use crate::tpm_schema::IntWidth;

/// Output buffer for marshaling TPM structures. Writes always append.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TpmBuffer {
    buffer: Vec<u8>,
}

impl TpmBuffer {
    pub fn new() -> Self {
        TpmBuffer { buffer: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TpmBuffer {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Marshaled bytes written so far
    pub fn trim(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes the low `width` bytes of `value`, most significant first
    pub fn write_num(&mut self, value: u64, width: IntWidth) {
        let bytes = value.to_be_bytes();
        self.buffer.extend_from_slice(&bytes[8 - width.bytes()..]);
    }

    /// Raw copy, no length prefix
    pub fn write_byte_buf(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Writes `data.len()` as a `width`-byte prefix followed by `data`
    pub fn write_sized_byte_buf(&mut self, data: &[u8], width: IntWidth) -> Result<(), TpmError> {
        self.write_len(data.len(), width)?;
        self.write_byte_buf(data);
        Ok(())
    }

    /// Writes a length or element count, rejecting values the prefix cannot hold
    pub fn write_len(&mut self, len: usize, width: IntWidth) -> Result<(), TpmError> {
        if len as u64 > width.max_value() {
            return Err(TpmError::LengthOverflow {
                len,
                width: width.bytes(),
            });
        }
        self.write_num(len as u64, width);
        Ok(())
    }
}

/// Declared extent of a size-prefixed structure currently being decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeContext {
    pub start: usize,
    pub declared: usize,
    pub type_name: &'static str,
}

impl SizeContext {
    fn end(&self) -> usize {
        self.start + self.declared
    }
}

/// Cursor over a TPM response buffer
#[derive(Debug, Clone)]
pub struct TpmReader<'a> {
    data: &'a [u8],
    position: usize,
    contexts: Vec<SizeContext>,
}

impl<'a> TpmReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        TpmReader {
            data,
            position: 0,
            contexts: Vec::new(),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left before the innermost size context (or the buffer) ends
    pub fn remaining(&self) -> usize {
        self.limit().saturating_sub(self.position)
    }

    /// Bytes left in the underlying buffer, ignoring size contexts
    pub fn remaining_in_buffer(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    fn limit(&self) -> usize {
        self.contexts
            .last()
            .map_or(self.data.len(), |ctx| ctx.end())
    }

    /// Consumes `n` bytes. Crossing the end of an open size context means the enclosing
    /// structure is longer than it declared, which is reported as a size mismatch.
    fn take(&mut self, n: usize) -> Result<&'a [u8], TpmError> {
        let end = self.position.checked_add(n).ok_or(TpmError::BufferUnderrun {
            offset: self.position,
            needed: n,
            remaining: self.remaining_in_buffer(),
        })?;

        if let Some(ctx) = self.contexts.last() {
            if end > ctx.end() {
                log::debug!(
                    "{} overruns its declared size {} at offset {}",
                    ctx.type_name,
                    ctx.declared,
                    self.position
                );
                return Err(TpmError::SizeMismatch {
                    type_name: ctx.type_name,
                    declared: ctx.declared,
                    consumed: end - ctx.start,
                });
            }
        }

        if end > self.data.len() {
            return Err(TpmError::BufferUnderrun {
                offset: self.position,
                needed: n,
                remaining: self.remaining_in_buffer(),
            });
        }

        let data = self.data;
        let bytes = &data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, TpmError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, TpmError> {
        Ok(self.read_num(IntWidth::U16)? as u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, TpmError> {
        Ok(self.read_num(IntWidth::U32)? as u32)
    }

    pub fn read_u64(&mut self) -> Result<u64, TpmError> {
        self.read_num(IntWidth::U64)
    }

    /// Reads a `width`-byte big-endian unsigned integer
    pub fn read_num(&mut self, width: IntWidth) -> Result<u64, TpmError> {
        let bytes = self.take(width.bytes())?;
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    /// Raw copy of the next `n` bytes
    pub fn read_byte_buf(&mut self, n: usize) -> Result<Vec<u8>, TpmError> {
        Ok(self.take(n)?.to_vec())
    }

    /// Reads a `width`-byte length and then exactly that many bytes
    pub fn read_sized_byte_buf(&mut self, width: IntWidth) -> Result<Vec<u8>, TpmError> {
        let declared = self.read_num(width)? as usize;
        if declared > self.remaining_in_buffer() {
            return Err(TpmError::TruncatedSizedField {
                offset: self.position,
                declared,
                remaining: self.remaining_in_buffer(),
            });
        }
        self.read_byte_buf(declared)
    }

    /// Length of a remainder field: whatever is left of the innermost size context
    pub fn remainder_len(&self) -> Result<usize, TpmError> {
        match self.contexts.last() {
            Some(ctx) => ctx
                .end()
                .checked_sub(self.position)
                .ok_or(TpmError::SizeMismatch {
                    type_name: ctx.type_name,
                    declared: ctx.declared,
                    consumed: self.position - ctx.start,
                }),
            None => Ok(self.remaining_in_buffer()),
        }
    }

    /// Opens a size context of `declared` bytes starting at the current position
    pub fn push_size_context(
        &mut self,
        declared: usize,
        type_name: &'static str,
    ) -> Result<(), TpmError> {
        if declared > self.remaining_in_buffer() {
            return Err(TpmError::TruncatedSizedField {
                offset: self.position,
                declared,
                remaining: self.remaining_in_buffer(),
            });
        }
        if declared > self.remaining() {
            // Fits the buffer but not the enclosing structure
            let outer = self.contexts.last().copied();
            if let Some(ctx) = outer {
                return Err(TpmError::SizeMismatch {
                    type_name: ctx.type_name,
                    declared: ctx.declared,
                    consumed: self.position + declared - ctx.start,
                });
            }
        }
        self.contexts.push(SizeContext {
            start: self.position,
            declared,
            type_name,
        });
        Ok(())
    }

    /// Closes the innermost size context, verifying that exactly its declared size was consumed
    pub fn pop_size_context(&mut self) -> Result<SizeContext, TpmError> {
        let ctx = self.contexts.pop().ok_or(TpmError::SchemaMismatch {
            type_name: "TpmReader",
            field: "<size context>",
        })?;
        let consumed = self.position - ctx.start;
        if consumed != ctx.declared {
            log::debug!(
                "{} declared {} bytes but consumed {}",
                ctx.type_name,
                ctx.declared,
                consumed
            );
            return Err(TpmError::SizeMismatch {
                type_name: ctx.type_name,
                declared: ctx.declared,
                consumed,
            });
        }
        Ok(ctx)
    }
}
