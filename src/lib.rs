/*
 *  Copyright (c) Microsoft Corporation. All rights reserved.
 *  Licensed under the MIT License. See the LICENSE file in the project root for full license information.
 */

//! Marshaling of TPM 2.0 structures to and from their big-endian wire form.
//!
//! Every structure carries a static schema (`tpm_schema`) and exposes its fields through
//! typed accessors (`tpm_structure`). A single engine (`tpm_marshaller`) walks the schema to
//! encode and decode, tracking nested size-prefixed regions on the reader (`tpm_buffer`).

#[macro_use]
mod tpm_macros;

pub mod error;
pub mod tpm2_helpers;
pub mod tpm_buffer;
pub mod tpm_commands;
pub mod tpm_marshaller;
pub mod tpm_schema;
pub mod tpm_structure;
pub mod tpm_types;
pub mod tpm_union;

pub use error::TpmError;
pub use tpm_buffer::{TpmBuffer, TpmReader};
pub use tpm_marshaller::{decode, encode, TpmMarshaller};
pub use tpm_structure::{CmdStructure, ReqStructure, RespStructure, TpmStructure};
pub use tpm_union::TpmUnion;
