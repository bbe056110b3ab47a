/*
 *  Copyright (c) Microsoft Corporation. All rights reserved.
 *  Licensed under the MIT License. See the LICENSE file in the project root for full license information.
 */

//! TPM 2.0 constants, structures and unions (TPM 2.0 Part 2 names)

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use derivative::Derivative;
use lazy_static::lazy_static;

use crate::error::TpmError;
use crate::tpm2_helpers::enum_to_str;
use crate::tpm_schema::{FieldDescriptor, FieldKind, IntWidth, StructSchema};
use crate::tpm_structure::{FieldMut, FieldRef, TpmEnum, TpmInt, TpmStructure};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Algorithm identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TPM_ALG_ID(pub u16);

impl TPM_ALG_ID {
    pub const ERROR: Self = Self(0x0000);
    pub const RSA: Self = Self(0x0001);
    pub const TDES: Self = Self(0x0003);
    pub const SHA1: Self = Self(0x0004);
    pub const HMAC: Self = Self(0x0005);
    pub const AES: Self = Self(0x0006);
    pub const MGF1: Self = Self(0x0007);
    pub const KEYEDHASH: Self = Self(0x0008);
    pub const XOR: Self = Self(0x000A);
    pub const SHA256: Self = Self(0x000B);
    pub const SHA384: Self = Self(0x000C);
    pub const SHA512: Self = Self(0x000D);
    pub const NULL: Self = Self(0x0010);
    pub const SM3_256: Self = Self(0x0012);
    pub const SM4: Self = Self(0x0013);
    pub const RSASSA: Self = Self(0x0014);
    pub const RSAES: Self = Self(0x0015);
    pub const RSAPSS: Self = Self(0x0016);
    pub const OAEP: Self = Self(0x0017);
    pub const ECDSA: Self = Self(0x0018);
    pub const ECDH: Self = Self(0x0019);
    pub const ECDAA: Self = Self(0x001A);
    pub const SM2: Self = Self(0x001B);
    pub const ECSCHNORR: Self = Self(0x001C);
    pub const ECMQV: Self = Self(0x001D);
    pub const KDF1_SP800_56A: Self = Self(0x0020);
    pub const KDF2: Self = Self(0x0021);
    pub const KDF1_SP800_108: Self = Self(0x0022);
    pub const ECC: Self = Self(0x0023);
    pub const SYMCIPHER: Self = Self(0x0025);
    pub const CAMELLIA: Self = Self(0x0026);
    pub const CTR: Self = Self(0x0040);
    pub const OFB: Self = Self(0x0041);
    pub const CBC: Self = Self(0x0042);
    pub const CFB: Self = Self(0x0043);
    pub const ECB: Self = Self(0x0044);
}

const ALG_NAMES: &[(u64, &str)] = &[
    (0x0000, "ERROR"),
    (0x0001, "RSA"),
    (0x0003, "TDES"),
    (0x0004, "SHA1"),
    (0x0005, "HMAC"),
    (0x0006, "AES"),
    (0x0007, "MGF1"),
    (0x0008, "KEYEDHASH"),
    (0x000A, "XOR"),
    (0x000B, "SHA256"),
    (0x000C, "SHA384"),
    (0x000D, "SHA512"),
    (0x0010, "NULL"),
    (0x0012, "SM3_256"),
    (0x0013, "SM4"),
    (0x0014, "RSASSA"),
    (0x0015, "RSAES"),
    (0x0016, "RSAPSS"),
    (0x0017, "OAEP"),
    (0x0018, "ECDSA"),
    (0x0019, "ECDH"),
    (0x001A, "ECDAA"),
    (0x001B, "SM2"),
    (0x001C, "ECSCHNORR"),
    (0x001D, "ECMQV"),
    (0x0020, "KDF1_SP800_56A"),
    (0x0021, "KDF2"),
    (0x0022, "KDF1_SP800_108"),
    (0x0023, "ECC"),
    (0x0025, "SYMCIPHER"),
    (0x0026, "CAMELLIA"),
    (0x0040, "CTR"),
    (0x0041, "OFB"),
    (0x0042, "CBC"),
    (0x0043, "CFB"),
    (0x0044, "ECB"),
];

/// Capability category selector of `TPM2_GetCapability`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TPM_CAP(pub u32);

impl TPM_CAP {
    pub const ALGS: Self = Self(0x0000_0000);
    pub const HANDLES: Self = Self(0x0000_0001);
    pub const COMMANDS: Self = Self(0x0000_0002);
    pub const PP_COMMANDS: Self = Self(0x0000_0003);
    pub const AUDIT_COMMANDS: Self = Self(0x0000_0004);
    pub const PCRS: Self = Self(0x0000_0005);
    pub const TPM_PROPERTIES: Self = Self(0x0000_0006);
    pub const PCR_PROPERTIES: Self = Self(0x0000_0007);
    pub const ECC_CURVES: Self = Self(0x0000_0008);
}

const CAP_NAMES: &[(u64, &str)] = &[
    (0x0, "ALGS"),
    (0x1, "HANDLES"),
    (0x2, "COMMANDS"),
    (0x3, "PP_COMMANDS"),
    (0x4, "AUDIT_COMMANDS"),
    (0x5, "PCRS"),
    (0x6, "TPM_PROPERTIES"),
    (0x7, "PCR_PROPERTIES"),
    (0x8, "ECC_CURVES"),
];

/// Structure tags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TPM_ST(pub u16);

impl TPM_ST {
    pub const NO_SESSIONS: Self = Self(0x8001);
    pub const SESSIONS: Self = Self(0x8002);
    pub const VERIFIED: Self = Self(0x8022);
    pub const HASHCHECK: Self = Self(0x8024);
}

const ST_NAMES: &[(u64, &str)] = &[
    (0x8001, "NO_SESSIONS"),
    (0x8002, "SESSIONS"),
    (0x8022, "VERIFIED"),
    (0x8024, "HASHCHECK"),
];

/// Algorithm attribute bits reported by `TPM_CAP::ALGS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TPMA_ALGORITHM(pub u32);

impl TPMA_ALGORITHM {
    pub const asymmetric: Self = Self(0x0000_0001);
    pub const symmetric: Self = Self(0x0000_0002);
    pub const hash: Self = Self(0x0000_0004);
    pub const object: Self = Self(0x0000_0008);
    pub const signing: Self = Self(0x0000_0100);
    pub const encrypting: Self = Self(0x0000_0200);
    pub const method: Self = Self(0x0000_0400);

    pub fn contains(&self, other: TPMA_ALGORITHM) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for TPMA_ALGORITHM {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

const TPMA_ALGORITHM_NAMES: &[(u64, &str)] = &[
    (0x0001, "asymmetric"),
    (0x0002, "symmetric"),
    (0x0004, "hash"),
    (0x0008, "object"),
    (0x0100, "signing"),
    (0x0200, "encrypting"),
    (0x0400, "method"),
];

/// Object attribute bits of a public area
pub type TPMA_OBJECT = u32;

/// ECC curve identifier
pub type TPM_ECC_CURVE = u16;

lazy_static! {
    /// Names of known constants, per enumeration type
    pub static ref ENUM_TO_STR_MAP: HashMap<TypeId, HashMap<u64, &'static str>> = {
        let mut map = HashMap::new();
        map.insert(TypeId::of::<TPM_ALG_ID>(), ALG_NAMES.iter().copied().collect());
        map.insert(TypeId::of::<TPM_CAP>(), CAP_NAMES.iter().copied().collect());
        map.insert(TypeId::of::<TPM_ST>(), ST_NAMES.iter().copied().collect());
        map.insert(TypeId::of::<TPMA_ALGORITHM>(), TPMA_ALGORITHM_NAMES.iter().copied().collect());
        map
    };
}

fn enum_name<T: 'static>(value: u64) -> Option<&'static str> {
    ENUM_TO_STR_MAP
        .get(&TypeId::of::<T>())
        .and_then(|names| names.get(&value).copied())
}

fn is_known<T: 'static>(value: u64) -> bool {
    enum_name::<T>(value).is_some()
}

// `constants` render only exact names; `bits` decompose into OR'd flag names
macro_rules! impl_tpm_enum {
    (@name constants $ty:ident, $value:expr) => {
        enum_name::<$ty>($value).unwrap_or_default().to_string()
    };
    (@name bits $ty:ident, $value:expr) => {
        enum_to_str($value, TypeId::of::<$ty>())
    };
    ($($kind:ident $ty:ident($repr:ty)),* $(,)?) => {
        $(
            impl TpmInt for $ty {
                fn to_wire(&self) -> u64 {
                    u64::from(self.0)
                }

                fn set_from_wire(&mut self, value: u64) {
                    self.0 = value as $repr;
                }
            }

            impl TpmEnum<$repr> for $ty {
                fn get_value(&self) -> $repr {
                    self.0
                }

                fn try_from_trait(value: u64) -> Result<Self, TpmError> {
                    if value <= u64::from(<$repr>::MAX) && is_known::<$ty>(value) {
                        Ok($ty(value as $repr))
                    } else {
                        Err(TpmError::InvalidEnumValue {
                            type_name: stringify!($ty),
                            value,
                        })
                    }
                }

                fn new_from_trait(value: u64) -> Result<Self, TpmError> {
                    if value <= u64::from(<$repr>::MAX) {
                        Ok($ty(value as $repr))
                    } else {
                        Err(TpmError::InvalidEnumValue {
                            type_name: stringify!($ty),
                            value,
                        })
                    }
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    let name = impl_tpm_enum!(@name $kind $ty, u64::from(self.0));
                    if name.is_empty() {
                        write!(f, "0x{:X}", self.0)
                    } else {
                        f.write_str(&name)
                    }
                }
            }
        )*
    };
}

impl_tpm_enum!(
    constants TPM_ALG_ID(u16),
    constants TPM_CAP(u32),
    constants TPM_ST(u16),
    bits TPMA_ALGORITHM(u32),
);

// Algorithm IDs are union payloads in TPMU_SYM_MODE
impl TpmStructure for TPM_ALG_ID {
    fn schema(&self) -> &'static StructSchema {
        static SCHEMA: StructSchema = StructSchema {
            name: "TPM_ALG_ID",
            handles: 0,
            fields: &[FieldDescriptor::new("value", FieldKind::Int(IntWidth::U16))],
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

/// Handle of a TPM entity. Only `handle` goes on the wire; the authorization value and name
/// are kept alongside for the session layer.
#[derive(Derivative, Clone, Default)]
#[derivative(Debug, PartialEq, Eq)]
pub struct TPM_HANDLE {
    pub handle: u32,

    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    pub auth_value: Vec<u8>,

    #[derivative(PartialEq = "ignore")]
    pub name: Vec<u8>,
}

impl TPM_HANDLE {
    pub const PW: u32 = 0x4000_0009;
    pub const OWNER: u32 = 0x4000_0001;

    pub fn new(handle: u32) -> Self {
        TPM_HANDLE {
            handle,
            ..Default::default()
        }
    }

    pub fn persistent(index: u32) -> Self {
        Self::new(0x8100_0000 + index)
    }

    pub fn pcr(index: u32) -> Self {
        Self::new(index)
    }
}

impl TpmInt for TPM_HANDLE {
    fn to_wire(&self) -> u64 {
        u64::from(self.handle)
    }

    fn set_from_wire(&mut self, value: u64) {
        self.handle = value as u32;
    }
}

// ---------------------------------------------------------------------------
// Sized buffers and simple structures
// ---------------------------------------------------------------------------

tpm_struct! {
    /// Payload of union selectors that carry no data
    pub struct TPMS_NULL_UNION {}
}

pub type TPMS_EMPTY = TPMS_NULL_UNION;
pub type TPMS_ENC_SCHEME_RSAES = TPMS_EMPTY;

tpm_struct! {
    /// Digest buffer
    pub struct TPM2B_DIGEST {
        buffer: Vec<u8> => sized(U16),
    }
}

impl TPM2B_DIGEST {
    pub fn new(buffer: &[u8]) -> Self {
        TPM2B_DIGEST {
            buffer: buffer.to_vec(),
        }
    }
}

tpm_struct! {
    /// RSA public modulus
    pub struct TPM2B_PUBLIC_KEY_RSA {
        buffer: Vec<u8> => sized(U16),
    }
}

tpm_struct! {
    /// Scheme parameterized only by a hash algorithm
    pub struct TPMS_SCHEME_HASH {
        hashAlg: TPM_ALG_ID => int(U16),
    }
}

impl TPMS_SCHEME_HASH {
    pub fn new(hash_alg: TPM_ALG_ID) -> Self {
        TPMS_SCHEME_HASH { hashAlg: hash_alg }
    }
}

pub type TPMS_SIG_SCHEME_RSASSA = TPMS_SCHEME_HASH;
pub type TPMS_SIG_SCHEME_RSAPSS = TPMS_SCHEME_HASH;
pub type TPMS_SIG_SCHEME_ECDSA = TPMS_SCHEME_HASH;
pub type TPMS_SIG_SCHEME_SM2 = TPMS_SCHEME_HASH;
pub type TPMS_SIG_SCHEME_ECSCHNORR = TPMS_SCHEME_HASH;
pub type TPMS_ENC_SCHEME_OAEP = TPMS_SCHEME_HASH;
pub type TPMS_KEY_SCHEME_ECDH = TPMS_SCHEME_HASH;
pub type TPMS_KEY_SCHEME_ECMQV = TPMS_SCHEME_HASH;
pub type TPMS_SCHEME_MGF1 = TPMS_SCHEME_HASH;
pub type TPMS_SCHEME_KDF1_SP800_56A = TPMS_SCHEME_HASH;
pub type TPMS_SCHEME_KDF2 = TPMS_SCHEME_HASH;
pub type TPMS_SCHEME_KDF1_SP800_108 = TPMS_SCHEME_HASH;
pub type TPMS_SCHEME_HMAC = TPMS_SCHEME_HASH;

tpm_struct! {
    pub struct TPMS_SCHEME_ECDAA {
        hashAlg: TPM_ALG_ID => int(U16),
        count: u16 => int(U16),
    }
}

pub type TPMS_SIG_SCHEME_ECDAA = TPMS_SCHEME_ECDAA;

tpm_struct! {
    pub struct TPMS_SCHEME_XOR {
        hashAlg: TPM_ALG_ID => int(U16),
        kdf: TPM_ALG_ID => int(U16),
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

tpm_struct! {
    pub struct TPMS_SIGNATURE_RSA {
        hash: TPM_ALG_ID => int(U16),
        sig: Vec<u8> => sized(U16),
    }
}

pub type TPMS_SIGNATURE_RSASSA = TPMS_SIGNATURE_RSA;
pub type TPMS_SIGNATURE_RSAPSS = TPMS_SIGNATURE_RSA;

tpm_struct! {
    pub struct TPMS_SIGNATURE_ECC {
        hash: TPM_ALG_ID => int(U16),
        signatureR: Vec<u8> => sized(U16),
        signatureS: Vec<u8> => sized(U16),
    }
}

pub type TPMS_SIGNATURE_ECDSA = TPMS_SIGNATURE_ECC;
pub type TPMS_SIGNATURE_ECDAA = TPMS_SIGNATURE_ECC;
pub type TPMS_SIGNATURE_SM2 = TPMS_SIGNATURE_ECC;
pub type TPMS_SIGNATURE_ECSCHNORR = TPMS_SIGNATURE_ECC;

tpm_union! {
    pub enum TPMU_SIGNATURE: TPM_ALG_ID[U16], default = null, null = NULL {
        rsassa(TPMS_SIGNATURE_RSASSA) = RSASSA,
        rsapss(TPMS_SIGNATURE_RSAPSS) = RSAPSS,
        ecdsa(TPMS_SIGNATURE_ECDSA) = ECDSA,
        ecdaa(TPMS_SIGNATURE_ECDAA) = ECDAA,
        sm2(TPMS_SIGNATURE_SM2) = SM2,
        ecschnorr(TPMS_SIGNATURE_ECSCHNORR) = ECSCHNORR,
        null(TPMS_NULL_UNION) = NULL,
    }
}

tpm_struct! {
    /// Signature tagged with its scheme (`sigAlg` is the union selector)
    pub struct TPMT_SIGNATURE {
        signature: TPMU_SIGNATURE => union(TPMU_SIGNATURE),
    }
}

impl TPMT_SIGNATURE {
    pub fn new(signature: TPMU_SIGNATURE) -> Self {
        TPMT_SIGNATURE { signature }
    }
}

// ---------------------------------------------------------------------------
// Schemes
// ---------------------------------------------------------------------------

tpm_union! {
    pub enum TPMU_ASYM_SCHEME: TPM_ALG_ID[U16], default = null, null = NULL {
        ecdh(TPMS_KEY_SCHEME_ECDH) = ECDH,
        ecmqv(TPMS_KEY_SCHEME_ECMQV) = ECMQV,
        rsassa(TPMS_SIG_SCHEME_RSASSA) = RSASSA,
        rsapss(TPMS_SIG_SCHEME_RSAPSS) = RSAPSS,
        ecdsa(TPMS_SIG_SCHEME_ECDSA) = ECDSA,
        ecdaa(TPMS_SIG_SCHEME_ECDAA) = ECDAA,
        sm2(TPMS_SIG_SCHEME_SM2) = SM2,
        ecschnorr(TPMS_SIG_SCHEME_ECSCHNORR) = ECSCHNORR,
        rsaes(TPMS_ENC_SCHEME_RSAES) = RSAES,
        oaep(TPMS_ENC_SCHEME_OAEP) = OAEP,
        null(TPMS_NULL_UNION) = NULL,
    }
}

tpm_struct! {
    pub struct TPMT_RSA_SCHEME {
        details: TPMU_ASYM_SCHEME => union(TPMU_ASYM_SCHEME),
    }
}

tpm_struct! {
    pub struct TPMT_ECC_SCHEME {
        details: TPMU_ASYM_SCHEME => union(TPMU_ASYM_SCHEME),
    }
}

tpm_union! {
    pub enum TPMU_KDF_SCHEME: TPM_ALG_ID[U16], default = null, null = NULL {
        mgf1(TPMS_SCHEME_MGF1) = MGF1,
        kdf1_sp800_56a(TPMS_SCHEME_KDF1_SP800_56A) = KDF1_SP800_56A,
        kdf2(TPMS_SCHEME_KDF2) = KDF2,
        kdf1_sp800_108(TPMS_SCHEME_KDF1_SP800_108) = KDF1_SP800_108,
        null(TPMS_NULL_UNION) = NULL,
    }
}

tpm_struct! {
    pub struct TPMT_KDF_SCHEME {
        details: TPMU_KDF_SCHEME => union(TPMU_KDF_SCHEME),
    }
}

tpm_union! {
    pub enum TPMU_SCHEME_KEYEDHASH: TPM_ALG_ID[U16], default = null, null = NULL {
        hmac(TPMS_SCHEME_HMAC) = HMAC,
        xor(TPMS_SCHEME_XOR) = XOR,
        null(TPMS_NULL_UNION) = NULL,
    }
}

tpm_struct! {
    pub struct TPMT_KEYEDHASH_SCHEME {
        details: TPMU_SCHEME_KEYEDHASH => union(TPMU_SCHEME_KEYEDHASH),
    }
}

// ---------------------------------------------------------------------------
// Symmetric definitions
// ---------------------------------------------------------------------------

tpm_union! {
    /// Key size in bits, or the hash algorithm for XOR obfuscation
    pub enum TPMU_SYM_KEY_BITS: TPM_ALG_ID[U16], default = null, null = NULL {
        aes(u16) = AES,
        sm4(u16) = SM4,
        camellia(u16) = CAMELLIA,
        xor(TPM_ALG_ID) = XOR,
        null(TPMS_NULL_UNION) = NULL,
    }
}

tpm_union! {
    /// Block cipher mode; XOR and NULL carry none
    pub enum TPMU_SYM_MODE: TPM_ALG_ID[U16], default = null, null = NULL {
        aes(TPM_ALG_ID) = AES,
        sm4(TPM_ALG_ID) = SM4,
        camellia(TPM_ALG_ID) = CAMELLIA,
        xor(TPMS_NULL_UNION) = XOR,
        null(TPMS_NULL_UNION) = NULL,
    }
}

/// `TPMT_SYM_DEF` and `TPMT_SYM_DEF_OBJECT` share one layout: `algorithm` selects both
/// `keyBits` and `mode`, and the (always empty) `details` union is omitted.
static SYM_DEF_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::new("algorithm", FieldKind::Selector { union: 1 }),
    FieldDescriptor::new(
        "keyBits",
        FieldKind::Union {
            schema: &TPMU_SYM_KEY_BITS::SCHEMA,
            selector: Some(0),
        },
    ),
    FieldDescriptor::new(
        "mode",
        FieldKind::Union {
            schema: &TPMU_SYM_MODE::SCHEMA,
            selector: Some(0),
        },
    ),
];

macro_rules! sym_def {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            pub keyBits: TPMU_SYM_KEY_BITS,
            pub mode: TPMU_SYM_MODE,
        }

        impl $name {
            pub fn new(key_bits: TPMU_SYM_KEY_BITS, mode: TPMU_SYM_MODE) -> Self {
                $name {
                    keyBits: key_bits,
                    mode,
                }
            }

            pub fn null() -> Self {
                Self::default()
            }

            pub fn aes(key_bits: u16, mode: TPM_ALG_ID) -> Self {
                Self::new(TPMU_SYM_KEY_BITS::aes(key_bits), TPMU_SYM_MODE::aes(mode))
            }

            /// The `algorithm` selector as it will appear on the wire
            pub fn algorithm(&self) -> TPM_ALG_ID {
                use $crate::tpm_union::TpmUnion;
                TPM_ALG_ID(self.keyBits.selector() as u16)
            }
        }

        impl TpmStructure for $name {
            fn schema(&self) -> &'static StructSchema {
                static SCHEMA: StructSchema = StructSchema {
                    name: stringify!($name),
                    handles: 0,
                    fields: &SYM_DEF_FIELDS,
                };
                &SCHEMA
            }

            fn field(&self, index: usize) -> Option<FieldRef<'_>> {
                match index {
                    1 => Some(FieldRef::Union(&self.keyBits)),
                    2 => Some(FieldRef::Union(&self.mode)),
                    _ => None,
                }
            }

            fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
                match index {
                    1 => Some(FieldMut::Union(&mut self.keyBits)),
                    2 => Some(FieldMut::Union(&mut self.mode)),
                    _ => None,
                }
            }
        }
    };
}

sym_def!(
    /// Symmetric algorithm definition (parameter encryption, session keys)
    TPMT_SYM_DEF
);

impl TPMT_SYM_DEF {
    pub fn xor(hash_alg: TPM_ALG_ID) -> Self {
        Self::new(TPMU_SYM_KEY_BITS::xor(hash_alg), TPMU_SYM_MODE::xor(TPMS_NULL_UNION {}))
    }
}

sym_def!(
    /// Symmetric algorithm of a storage or symmetric-cipher object
    TPMT_SYM_DEF_OBJECT
);

// ---------------------------------------------------------------------------
// Public area
// ---------------------------------------------------------------------------

tpm_struct! {
    pub struct TPMS_KEYEDHASH_PARMS {
        scheme: TPMT_KEYEDHASH_SCHEME => structure,
    }
}

tpm_struct! {
    pub struct TPMS_SYMCIPHER_PARMS {
        sym: TPMT_SYM_DEF_OBJECT => structure,
    }
}

tpm_struct! {
    pub struct TPMS_RSA_PARMS {
        symmetric: TPMT_SYM_DEF_OBJECT => structure,
        scheme: TPMT_RSA_SCHEME => structure,
        keyBits: u16 => int(U16),
        exponent: u32 => int(U32),
    }
}

tpm_struct! {
    pub struct TPMS_ECC_PARMS {
        symmetric: TPMT_SYM_DEF_OBJECT => structure,
        scheme: TPMT_ECC_SCHEME => structure,
        curveID: TPM_ECC_CURVE => int(U16),
        kdf: TPMT_KDF_SCHEME => structure,
    }
}

tpm_union! {
    pub enum TPMU_PUBLIC_PARMS: TPM_ALG_ID[U16], default = rsaDetail {
        keyedHashDetail(TPMS_KEYEDHASH_PARMS) = KEYEDHASH,
        symDetail(TPMS_SYMCIPHER_PARMS) = SYMCIPHER,
        rsaDetail(TPMS_RSA_PARMS) = RSA,
        eccDetail(TPMS_ECC_PARMS) = ECC,
    }
}

tpm_struct! {
    pub struct TPMS_ECC_POINT {
        x: Vec<u8> => sized(U16),
        y: Vec<u8> => sized(U16),
    }
}

tpm_union! {
    pub enum TPMU_PUBLIC_ID: TPM_ALG_ID[U16], default = rsa {
        keyedHash(TPM2B_DIGEST) = KEYEDHASH,
        sym(TPM2B_DIGEST) = SYMCIPHER,
        rsa(TPM2B_PUBLIC_KEY_RSA) = RSA,
        ecc(TPMS_ECC_POINT) = ECC,
    }
}

/// Public area of an object. `type` is marshaled first and selects both `parameters` and
/// `unique`; its value is taken from `parameters`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TPMT_PUBLIC {
    pub nameAlg: TPM_ALG_ID,
    pub objectAttributes: TPMA_OBJECT,
    pub authPolicy: Vec<u8>,
    pub parameters: TPMU_PUBLIC_PARMS,
    pub unique: TPMU_PUBLIC_ID,
}

impl TPMT_PUBLIC {
    pub fn new(
        name_alg: TPM_ALG_ID,
        object_attributes: TPMA_OBJECT,
        auth_policy: &[u8],
        parameters: TPMU_PUBLIC_PARMS,
        unique: TPMU_PUBLIC_ID,
    ) -> Self {
        TPMT_PUBLIC {
            nameAlg: name_alg,
            objectAttributes: object_attributes,
            authPolicy: auth_policy.to_vec(),
            parameters,
            unique,
        }
    }

    /// Object type, i.e. the selector of `parameters`
    pub fn object_type(&self) -> TPM_ALG_ID {
        use crate::tpm_union::TpmUnion;
        TPM_ALG_ID(self.parameters.selector() as u16)
    }
}

impl TpmStructure for TPMT_PUBLIC {
    fn schema(&self) -> &'static StructSchema {
        static SCHEMA: StructSchema = StructSchema {
            name: "TPMT_PUBLIC",
            handles: 0,
            fields: &[
                FieldDescriptor::new("type", FieldKind::Selector { union: 4 }),
                FieldDescriptor::new("nameAlg", FieldKind::Int(IntWidth::U16)),
                FieldDescriptor::new("objectAttributes", FieldKind::Int(IntWidth::U32)),
                FieldDescriptor::new("authPolicy", FieldKind::SizedBytes(IntWidth::U16)),
                FieldDescriptor::new(
                    "parameters",
                    FieldKind::Union {
                        schema: &TPMU_PUBLIC_PARMS::SCHEMA,
                        selector: Some(0),
                    },
                ),
                FieldDescriptor::new(
                    "unique",
                    FieldKind::Union {
                        schema: &TPMU_PUBLIC_ID::SCHEMA,
                        selector: Some(0),
                    },
                ),
            ],
        };
        &SCHEMA
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            1 => Some(FieldRef::Int(self.nameAlg.to_wire())),
            2 => Some(FieldRef::Int(self.objectAttributes.to_wire())),
            3 => Some(FieldRef::Bytes(&self.authPolicy)),
            4 => Some(FieldRef::Union(&self.parameters)),
            5 => Some(FieldRef::Union(&self.unique)),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        match index {
            1 => Some(FieldMut::Int(&mut self.nameAlg)),
            2 => Some(FieldMut::Int(&mut self.objectAttributes)),
            3 => Some(FieldMut::Bytes(&mut self.authPolicy)),
            4 => Some(FieldMut::Union(&mut self.parameters)),
            5 => Some(FieldMut::Union(&mut self.unique)),
            _ => None,
        }
    }
}

tpm_struct! {
    /// Public area in its size-prefixed form; an empty buffer means no public area
    pub struct TPM2B_PUBLIC {
        publicArea: Option<TPMT_PUBLIC> => optional_sized_structure(U16),
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

tpm_struct! {
    /// Credential blob. `encIdentity` runs to the end of the enclosing `TPM2B_ID_OBJECT`.
    pub struct TPMS_ID_OBJECT {
        integrityHMAC: Vec<u8> => sized(U16),
        encIdentity: Vec<u8> => remainder,
    }
}

tpm_struct! {
    pub struct TPM2B_ID_OBJECT {
        credential: TPMS_ID_OBJECT => sized_structure(U16),
    }
}

// ---------------------------------------------------------------------------
// Lists and capability data
// ---------------------------------------------------------------------------

tpm_struct! {
    pub struct TPMS_PCR_SELECTION {
        hash: TPM_ALG_ID => int(U16),
        pcrSelect: Vec<u8> => sized(U8),
    }
}

impl TPMS_PCR_SELECTION {
    /// Selection of `pcrs` in the bank of `hash`, with the minimum 3-byte bitmap
    pub fn new(hash: TPM_ALG_ID, pcrs: &[u32]) -> Self {
        let max = pcrs.iter().copied().max().unwrap_or(0) as usize;
        let mut pcr_select = vec![0u8; (max / 8 + 1).max(3)];
        for pcr in pcrs {
            pcr_select[*pcr as usize / 8] |= 1 << (pcr % 8);
        }
        TPMS_PCR_SELECTION {
            hash,
            pcrSelect: pcr_select,
        }
    }

    pub fn is_selected(&self, pcr: u32) -> bool {
        self.pcrSelect
            .get(pcr as usize / 8)
            .map_or(false, |b| b & (1 << (pcr % 8)) != 0)
    }
}

tpm_struct! {
    pub struct TPML_PCR_SELECTION {
        pcrSelections: Vec<TPMS_PCR_SELECTION> => array(U32),
    }
}

tpm_struct! {
    pub struct TPML_DIGEST {
        digests: Vec<TPM2B_DIGEST> => array(U32),
    }
}

tpm_struct! {
    pub struct TPMS_ALG_PROPERTY {
        alg: TPM_ALG_ID => int(U16),
        algProperties: TPMA_ALGORITHM => int(U32),
    }
}

tpm_struct! {
    pub struct TPML_ALG_PROPERTY {
        algProperties: Vec<TPMS_ALG_PROPERTY> => array(U32),
    }
}

tpm_struct! {
    pub struct TPML_HANDLE {
        handle: Vec<TPM_HANDLE> => int_array(U32, U32),
    }
}

tpm_struct! {
    pub struct TPMS_TAGGED_PROPERTY {
        property: u32 => int(U32),
        value: u32 => int(U32),
    }
}

tpm_struct! {
    pub struct TPML_TAGGED_TPM_PROPERTY {
        tpmProperty: Vec<TPMS_TAGGED_PROPERTY> => array(U32),
    }
}

tpm_union! {
    pub enum TPMU_CAPABILITIES: TPM_CAP[U32], default = algorithms {
        algorithms(TPML_ALG_PROPERTY) = ALGS,
        handles(TPML_HANDLE) = HANDLES,
        assignedPCR(TPML_PCR_SELECTION) = PCRS,
        tpmProperties(TPML_TAGGED_TPM_PROPERTY) = TPM_PROPERTIES,
    }
}

tpm_struct! {
    /// Capability data tagged with its category (`capability` is the union selector)
    pub struct TPMS_CAPABILITY_DATA {
        data: TPMU_CAPABILITIES => union(TPMU_CAPABILITIES),
    }
}

tpm_struct! {
    /// Ticket proving a signature was verified by the TPM
    pub struct TPMT_TK_VERIFIED {
        tag: TPM_ST => int(U16),
        hierarchy: TPM_HANDLE => int(U32),
        digest: Vec<u8> => sized(U16),
    }
}
