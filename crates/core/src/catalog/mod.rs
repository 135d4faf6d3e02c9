//! Static C -> C# mapping tables.
//!
//! Lookups are total for the enumerated keys and return `None` otherwise; the
//! rewriters leave unknown names untouched and the validator decides whether a
//! surviving C spelling is acceptable.

use crate::model::TypeDescriptor;

/// Fixed-width and pointer-sized C integer types.
const TYPE_MAPPINGS: &[(&str, &str)] = &[
    ("int8_t", "sbyte"),
    ("int16_t", "short"),
    ("int32_t", "int"),
    ("int64_t", "long"),
    ("uint8_t", "byte"),
    ("uint16_t", "ushort"),
    ("uint32_t", "uint"),
    ("uint64_t", "ulong"),
    ("size_t", "nuint"),
    ("ssize_t", "nint"),
];

/// Numeric-limit macros.
const MACRO_CONSTANTS: &[(&str, &str)] = &[
    ("INT_MIN", "int.MinValue"),
    ("INT_MAX", "int.MaxValue"),
    ("INT32_MIN", "int.MinValue"),
    ("INT32_MAX", "int.MaxValue"),
    ("LLONG_MIN", "long.MinValue"),
    ("LLONG_MAX", "long.MaxValue"),
    ("INT64_MIN", "long.MinValue"),
    ("INT64_MAX", "long.MaxValue"),
];

/// Spelled-out limit literals, matched by value on the tree.
pub const INT_MAX_VALUE: u64 = 2_147_483_647;
pub const LONG_MAX_VALUE: u64 = 9_223_372_036_854_775_807;

/// Multi-word C spellings the cast rewriter knows how to collapse.
const COMPOUND_SPELLINGS: &[(&str, &str)] = &[
    ("unsigned int", "uint"),
    ("unsigned", "uint"),
    ("signed int", "int"),
    ("unsigned char", "byte"),
    ("signed char", "sbyte"),
    ("unsigned short", "ushort"),
    ("long long", "long"),
    ("unsigned long long", "ulong"),
];

/// Types narrower than `int`; returning a wider expression through them needs
/// an explicit narrowing the rewriters never insert.
const NARROW_TARGET_TYPES: &[&str] = &["byte", "sbyte", "short", "ushort"];

/// The two-field rational struct built from `{num, den}` initializers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalStruct {
    pub type_name: &'static str,
    pub numerator: &'static str,
    pub denominator: &'static str,
}

/// A same-size union used for bit reinterpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PunningUnion {
    pub union_name: &'static str,
    pub float_member: &'static str,
    pub float_type: &'static str,
    pub int_member: &'static str,
    pub int_type: &'static str,
}

impl PunningUnion {
    /// C type obtained by reading `member` back out of the union.
    pub fn member_type(&self, member: &str) -> Option<&'static str> {
        if member == self.float_member {
            Some(self.float_type)
        } else if member == self.int_member {
            Some(self.int_type)
        } else {
            None
        }
    }
}

const PUNNING_UNIONS: &[PunningUnion] = &[
    PunningUnion {
        union_name: "av_intfloat32",
        float_member: "f",
        float_type: "float",
        int_member: "i",
        int_type: "uint32_t",
    },
    PunningUnion {
        union_name: "av_intfloat64",
        float_member: "f",
        float_type: "double",
        int_member: "i",
        int_type: "uint64_t",
    },
];

/// Read-only mapping tables shared by every rewrite pass.
#[derive(Debug, Clone)]
pub struct Catalog {
    rational: RationalStruct,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            rational: RationalStruct {
                type_name: "AVRational",
                numerator: "num",
                denominator: "den",
            },
        }
    }

    /// Target primitive for a fixed-width/pointer-sized C type name.
    pub fn map_type(&self, c_name: &str) -> Option<&'static str> {
        TYPE_MAPPINGS.iter().find(|(c, _)| *c == c_name).map(|(_, cs)| *cs)
    }

    /// Whether `name` is one of the C-side keys of the type table.
    pub fn is_c_type_key(&self, name: &str) -> bool {
        self.map_type(name).is_some()
    }

    /// Target constant expression for a numeric-limit macro.
    pub fn map_macro(&self, name: &str) -> Option<&'static str> {
        MACRO_CONSTANTS.iter().find(|(m, _)| *m == name).map(|(_, cs)| *cs)
    }

    /// Target constant for a spelled-out limit value (`2147483647`, `9223372036854775807LL`).
    pub fn map_limit_literal(&self, value: u64, long_suffix: bool) -> Option<&'static str> {
        match value {
            INT_MAX_VALUE if !long_suffix => Some("int.MaxValue"),
            LONG_MAX_VALUE => Some("long.MaxValue"),
            _ => None,
        }
    }

    /// Minimum counterpart of a maximum constant, for the `-MAX - 1` spelling.
    pub fn min_for(&self, max_constant: &str) -> Option<&'static str> {
        match max_constant {
            "int.MaxValue" => Some("int.MinValue"),
            "long.MaxValue" => Some("long.MinValue"),
            _ => None,
        }
    }

    /// Collapse a multi-word C spelling (`unsigned int`) into a target primitive.
    pub fn map_compound(&self, spelling: &str) -> Option<&'static str> {
        COMPOUND_SPELLINGS.iter().find(|(c, _)| *c == spelling).map(|(_, cs)| *cs)
    }

    /// Plain `char` written in a body. As a value it is C's signed byte; behind
    /// a pointer it is a byte buffer, spelled the way signatures spell it.
    pub fn map_plain_char(&self, is_pointer: bool) -> &'static str {
        if is_pointer {
            "byte"
        } else {
            "sbyte"
        }
    }

    pub fn rational(&self) -> &RationalStruct {
        &self.rational
    }

    pub fn punning_union(&self, union_name: &str) -> Option<&'static PunningUnion> {
        PUNNING_UNIONS.iter().find(|u| u.union_name == union_name)
    }

    pub fn is_narrow_target(&self, target_name: &str) -> bool {
        NARROW_TARGET_TYPES.contains(&target_name)
    }

    /// Render a signature type in target syntax (const dropped, pointers kept).
    pub fn target_type(&self, ty: &TypeDescriptor) -> String {
        let base = self.target_base(&ty.name);
        format!("{}{}", base, "*".repeat(ty.pointer_depth as usize))
    }

    /// Target spelling for a base name as it appears in a signature.
    pub fn target_base(&self, c_name: &str) -> String {
        let trimmed = c_name.trim();
        if let Some(mapped) = self.map_type(trimmed).or_else(|| self.map_compound(trimmed)) {
            return mapped.to_string();
        }
        match trimmed {
            "char" => "byte".to_string(),
            "_Bool" => "bool".to_string(),
            other => other.to_string(),
        }
    }
}
