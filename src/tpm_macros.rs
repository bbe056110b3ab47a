/*
 *  Copyright (c) Microsoft Corporation. All rights reserved.
 *  Licensed under the MIT License. See the LICENSE file in the project root for full license information.
 */

//! Declarative schema macros.
//!
//! `tpm_struct!` declares a structure together with its `StructSchema` and field accessors;
//! `tpm_union!` declares a union enum together with its selector table. Each field is
//! written as `name: Type => kind(args)` where `kind` is one of
//!
//! | kind                               | Rust type          | wire                          |
//! |------------------------------------|--------------------|-------------------------------|
//! | `int(W)`                           | any `TpmInt`       | `uintW`                       |
//! | `sized(W)`                         | `Vec<u8>`          | `{len:W}{bytes}`              |
//! | `remainder`                        | `Vec<u8>`          | rest of enclosing sized struct|
//! | `structure`                        | `TpmStructure`     | nested, no prefix             |
//! | `sized_structure(W)`               | `TpmStructure`     | `{len:W}{struct}`             |
//! | `optional_sized_structure(W)`      | `Option<T>`        | `{len:W}{struct?}`            |
//! | `array(W)`                         | `Vec<T>`           | `{count:W}{struct}*count`     |
//! | `int_array(W, E)`                  | `Vec<I>`           | `{count:W}{uintE}*count`      |
//! | `union(U)`                         | `tpm_union!` enum  | `{selector}{variant}`         |
//!
//! Structures whose selector is a separate, possibly shared field (`TPMT_PUBLIC`) implement
//! `TpmStructure` by hand.

#[macro_export]
#[doc(hidden)]
macro_rules! tpm_field_kind {
    (int($w:ident)) => {
        $crate::tpm_schema::FieldKind::Int($crate::tpm_schema::IntWidth::$w)
    };
    (sized($w:ident)) => {
        $crate::tpm_schema::FieldKind::SizedBytes($crate::tpm_schema::IntWidth::$w)
    };
    (remainder) => {
        $crate::tpm_schema::FieldKind::Remainder
    };
    (structure) => {
        $crate::tpm_schema::FieldKind::Struct
    };
    (sized_structure($w:ident)) => {
        $crate::tpm_schema::FieldKind::SizedStruct($crate::tpm_schema::IntWidth::$w)
    };
    (optional_sized_structure($w:ident)) => {
        $crate::tpm_schema::FieldKind::SizedStruct($crate::tpm_schema::IntWidth::$w)
    };
    (array($w:ident)) => {
        $crate::tpm_schema::FieldKind::Array {
            count: $crate::tpm_schema::IntWidth::$w,
        }
    };
    (int_array($c:ident, $e:ident)) => {
        $crate::tpm_schema::FieldKind::IntArray {
            count: $crate::tpm_schema::IntWidth::$c,
            elem: $crate::tpm_schema::IntWidth::$e,
        }
    };
    (union($u:ty)) => {
        $crate::tpm_schema::FieldKind::Union {
            schema: &<$u>::SCHEMA,
            selector: None,
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! tpm_field_ref {
    (int, $f:expr) => {
        $crate::tpm_structure::FieldRef::Int($crate::tpm_structure::TpmInt::to_wire(&$f))
    };
    (sized, $f:expr) => {
        $crate::tpm_structure::FieldRef::Bytes(&$f)
    };
    (remainder, $f:expr) => {
        $crate::tpm_structure::FieldRef::Bytes(&$f)
    };
    (structure, $f:expr) => {
        $crate::tpm_structure::FieldRef::Struct(&$f)
    };
    (sized_structure, $f:expr) => {
        $crate::tpm_structure::FieldRef::Struct(&$f)
    };
    (optional_sized_structure, $f:expr) => {
        $crate::tpm_structure::FieldRef::OptStruct($crate::tpm_structure::OptionalStructure::get(&$f))
    };
    (array, $f:expr) => {
        $crate::tpm_structure::FieldRef::Array(&$f)
    };
    (int_array, $f:expr) => {
        $crate::tpm_structure::FieldRef::IntArray(&$f)
    };
    (union, $f:expr) => {
        $crate::tpm_structure::FieldRef::Union(&$f)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! tpm_field_mut {
    (int, $f:expr) => {
        $crate::tpm_structure::FieldMut::Int(&mut $f)
    };
    (sized, $f:expr) => {
        $crate::tpm_structure::FieldMut::Bytes(&mut $f)
    };
    (remainder, $f:expr) => {
        $crate::tpm_structure::FieldMut::Bytes(&mut $f)
    };
    (structure, $f:expr) => {
        $crate::tpm_structure::FieldMut::Struct(&mut $f)
    };
    (sized_structure, $f:expr) => {
        $crate::tpm_structure::FieldMut::Struct(&mut $f)
    };
    (optional_sized_structure, $f:expr) => {
        $crate::tpm_structure::FieldMut::OptStruct(&mut $f)
    };
    (array, $f:expr) => {
        $crate::tpm_structure::FieldMut::Array(&mut $f)
    };
    (int_array, $f:expr) => {
        $crate::tpm_structure::FieldMut::IntArray(&mut $f)
    };
    (union, $f:expr) => {
        $crate::tpm_structure::FieldMut::Union(&mut $f)
    };
}

/// Declares a TPM structure and its schema.
///
/// ```
/// use tss_marshal::tpm_struct;
///
/// tpm_struct! {
///     /// Counter with a label
///     pub struct LABELED_COUNTER {
///         label: Vec<u8> => sized(U16),
///         count: u32 => int(U32),
///     }
/// }
/// ```
#[macro_export]
macro_rules! tpm_struct {
    (@handles) => {
        0
    };
    (@handles $handles:literal) => {
        $handles
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $([handles = $handles:literal])? {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $ty:ty => $kind:ident $(($($arg:tt)*))?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        impl $crate::tpm_structure::TpmStructure for $name {
            fn schema(&self) -> &'static $crate::tpm_schema::StructSchema {
                static SCHEMA: $crate::tpm_schema::StructSchema = $crate::tpm_schema::StructSchema {
                    name: stringify!($name),
                    handles: $crate::tpm_struct!(@handles $($handles)?),
                    fields: &[
                        $(
                            $crate::tpm_schema::FieldDescriptor::new(
                                stringify!($field),
                                $crate::tpm_field_kind!($kind $(($($arg)*))?),
                            ),
                        )*
                    ],
                };
                &SCHEMA
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field(&self, index: usize) -> Option<$crate::tpm_structure::FieldRef<'_>> {
                let mut i = 0usize;
                $(
                    if index == i {
                        return Some($crate::tpm_field_ref!($kind, self.$field));
                    }
                    i += 1;
                )*
                None
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field_mut(&mut self, index: usize) -> Option<$crate::tpm_structure::FieldMut<'_>> {
                let mut i = 0usize;
                $(
                    if index == i {
                        return Some($crate::tpm_field_mut!($kind, self.$field));
                    }
                    i += 1;
                )*
                None
            }
        }
    };
}

/// Declares a TPM union enum and its selector table.
///
/// Every variant carries a payload structure; selectors that carry no data use a zero-field
/// structure. `null = X` marks the "no algorithm" selector of unions that admit one.
///
/// ```
/// use tss_marshal::tpm_types::{TPM_ALG_ID, TPMS_NULL_UNION, TPMS_SCHEME_HASH};
/// use tss_marshal::tpm_union;
///
/// tpm_union! {
///     pub enum HASH_CHOICE: TPM_ALG_ID[U16], default = null, null = NULL {
///         sha256(TPMS_SCHEME_HASH) = SHA256,
///         null(TPMS_NULL_UNION) = NULL,
///     }
/// }
/// ```
#[macro_export]
macro_rules! tpm_union {
    (@null $sel_ty:ident) => {
        None
    };
    (@null $sel_ty:ident $null:ident) => {
        Some($sel_ty::$null.0 as u32)
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $sel_ty:ident [$width:ident], default = $default:ident $(, null = $null:ident)? {
            $(
                $(#[$vmeta:meta])*
                $variant:ident ( $vty:ty ) = $sel:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant($vty),
            )+
        }

        impl $name {
            pub const SCHEMA: $crate::tpm_union::UnionSchema = $crate::tpm_union::UnionSchema {
                name: stringify!($name),
                selector_width: $crate::tpm_schema::IntWidth::$width,
                variants: &[
                    $(
                        $crate::tpm_union::UnionVariant {
                            selector: $sel_ty::$sel.0 as u32,
                            name: stringify!($variant),
                        },
                    )+
                ],
                null_selector: $crate::tpm_union!(@null $sel_ty $($null)?),
            };
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default(Default::default())
            }
        }

        impl $crate::tpm_union::TpmUnion for $name {
            fn union_schema(&self) -> &'static $crate::tpm_union::UnionSchema {
                &Self::SCHEMA
            }

            fn selector(&self) -> u32 {
                match self {
                    $( Self::$variant(_) => $sel_ty::$sel.0 as u32, )+
                }
            }

            fn variant_name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => stringify!($variant), )+
                }
            }

            fn variant(&self) -> &dyn $crate::tpm_structure::TpmStructure {
                match self {
                    $( Self::$variant(v) => v as &dyn $crate::tpm_structure::TpmStructure, )+
                }
            }

            fn variant_mut(&mut self) -> &mut dyn $crate::tpm_structure::TpmStructure {
                match self {
                    $( Self::$variant(v) => v as &mut dyn $crate::tpm_structure::TpmStructure, )+
                }
            }

            fn select(&mut self, selector: u32) -> bool {
                $(
                    if selector == $sel_ty::$sel.0 as u32 {
                        *self = Self::$variant(Default::default());
                        return true;
                    }
                )+
                false
            }
        }
    };
}
