//! The sweet type system: the `Type` value and its compatibility and
//! range-checking rules (spec §4.3).
//!
//! `Type` is a plain data record, not a tagged enum, because the
//! language has a fixed, flat set of named atoms (`u8`, `int`,
//! `string`, ...) rather than user-defined nominal types — the parser
//! only ever constructs a `Type` from an identifier plus pointer/array
//! suffixes, so there is nothing to discriminate beyond that.

use sweetc_util::Symbol;
use std::fmt;

/// Host pointer width in bits for the sole target this core emits for:
/// x86-64 System V (spec §1 Non-goals rule out any other target).
const PTR_BITS: u32 = 64;

/// A type: a named atom, a pointer level, and an optional array arity.
///
/// Invariant: `is_array` implies `array_size.is_some()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Type {
    pub name: Symbol,
    pub pointer_level: u32,
    pub is_array: bool,
    pub array_size: Option<usize>,
}

impl Type {
    /// A plain, non-pointer, non-array named type.
    pub fn named(name: &str) -> Self {
        Self {
            name: Symbol::intern(name),
            pointer_level: 0,
            is_array: false,
            array_size: None,
        }
    }

    /// `self` with the pointer level incremented by one.
    pub fn pointer_to(self) -> Self {
        Self {
            pointer_level: self.pointer_level + 1,
            ..self
        }
    }

    /// `self` with the pointer level decremented by one (dereference).
    ///
    /// Panics if `pointer_level == 0`; callers must check
    /// [`Type::pointer_level`] first (the type checker does, producing a
    /// proper diagnostic instead of a panic).
    pub fn dereferenced(self) -> Self {
        assert!(self.pointer_level > 0, "dereferenced a non-pointer type");
        Self {
            pointer_level: self.pointer_level - 1,
            ..self
        }
    }

    /// Builds the array type of `len` elements of `self` (self must be a
    /// plain element type; `is_array`/`array_size` on `self` are ignored).
    pub fn array_of(self, len: usize) -> Self {
        Self {
            is_array: true,
            array_size: Some(len),
            ..self
        }
    }

    fn name_str(&self) -> &'static str {
        self.name.as_str()
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        self.pointer_level == 0
            && matches!(
                self.name_str(),
                "u8" | "u16"
                    | "u32"
                    | "u64"
                    | "i8"
                    | "i16"
                    | "i32"
                    | "i64"
                    | "usize"
                    | "isize"
                    | "int"
                    | "uint"
                    | "char"
            )
    }

    #[inline]
    pub fn is_signed(&self) -> bool {
        self.pointer_level == 0
            && matches!(self.name_str(), "i8" | "i16" | "i32" | "i64" | "isize" | "int")
    }

    #[inline]
    pub fn is_unsigned(&self) -> bool {
        self.pointer_level == 0
            && matches!(
                self.name_str(),
                "u8" | "u16" | "u32" | "u64" | "usize" | "uint" | "char"
            )
    }

    #[inline]
    pub fn is_char(&self) -> bool {
        self.pointer_level == 0 && self.name_str() == "char"
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        self.pointer_level == 0 && self.name_str() == "string"
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        self.pointer_level == 0 && self.name_str() == "bool"
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        self.pointer_level == 0 && matches!(self.name_str(), "f32" | "f64")
    }

    #[inline]
    pub fn can_have_len_property(&self) -> bool {
        self.is_array
    }

    /// The cornerstone relation used by variable definitions, assignments,
    /// return statements, and argument passing (spec §4.3).
    pub fn is_compatible_with(&self, other: &Type) -> bool {
        if self == other {
            return true;
        }

        let a = self.name_str();
        let b = other.name_str();

        if (a == "string" && b == "u8" && other.pointer_level == 1)
            || (b == "string" && a == "u8" && self.pointer_level == 1)
        {
            return true;
        }

        if (a == "string" && b == "char" && other.pointer_level == 1)
            || (b == "string" && a == "char" && self.pointer_level == 1)
        {
            return true;
        }

        if self.pointer_level == 0 && other.pointer_level == 0 {
            if self.is_unsigned() && b == "int" {
                return true;
            }
            if self.is_signed() && b == "uint" {
                return true;
            }
            if self.is_char() && matches!(b, "u8" | "i8") {
                return true;
            }
            if other.is_char() && matches!(a, "u8" | "i8") {
                return true;
            }
        }

        if self.pointer_level > 0 || other.pointer_level > 0 {
            if self.pointer_level == other.pointer_level {
                if a == b || a == "void" || b == "void" {
                    return true;
                }
                if a == "char" || b == "char" {
                    return true;
                }
            }
        }

        false
    }

    /// The inclusive `[min, max]` range a literal of this type must fall
    /// within, or `None` if `self` is not an integer-like type (in which
    /// case no range check applies).
    pub fn integer_bounds(&self) -> Option<(i128, i128)> {
        if !self.is_integer() {
            return None;
        }
        let name = self.name_str();
        Some(match name {
            "usize" | "uint" => (0, (1i128 << PTR_BITS) - 1),
            "isize" | "int" => (-(1i128 << (PTR_BITS - 1)), (1i128 << (PTR_BITS - 1)) - 1),
            "char" => (0, 255),
            _ if name.starts_with('u') && name[1..].chars().all(|c| c.is_ascii_digit()) => {
                let bits: u32 = name[1..].parse().ok()?;
                (0, (1i128 << bits) - 1)
            }
            _ if name.starts_with('i') && name[1..].chars().all(|c| c.is_ascii_digit()) => {
                let bits: u32 = name[1..].parse().ok()?;
                (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
            }
            _ => return None,
        })
    }

    /// Whether `value` lies within `self`'s representable range, for
    /// `self.is_float()` types with a 32-bit representation. Non-`f32`
    /// float types, and non-finite values, are always accepted.
    pub fn f32_value_in_range(value: f64) -> bool {
        const MAX: f64 = 3.4028235e38;
        value.is_nan() || value.is_infinite() || (-MAX..=MAX).contains(&value)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for _ in 0..self.pointer_level {
            write!(f, "*")?;
        }
        if self.is_array {
            write!(f, "[{}]", self.array_size.unwrap_or(0))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_types_are_compatible() {
        let a = Type::named("int");
        assert!(a.is_compatible_with(&a));
    }

    #[test]
    fn unsigned_and_int_are_compatible() {
        let u = Type::named("u32");
        let int_ty = Type::named("int");
        assert!(u.is_compatible_with(&int_ty));
        assert!(int_ty.is_compatible_with(&u));
    }

    #[test]
    fn signed_and_uint_are_compatible() {
        let i = Type::named("i32");
        let uint_ty = Type::named("uint");
        assert!(i.is_compatible_with(&uint_ty));
        assert!(uint_ty.is_compatible_with(&i));
    }

    #[test]
    fn char_and_u8_i8_are_compatible() {
        let c = Type::named("char");
        assert!(c.is_compatible_with(&Type::named("u8")));
        assert!(c.is_compatible_with(&Type::named("i8")));
        assert!(Type::named("u8").is_compatible_with(&c));
    }

    #[test]
    fn string_interoperates_with_u8_ptr_and_char_ptr() {
        let string_ty = Type::named("string");
        let u8_ptr = Type::named("u8").pointer_to();
        let char_ptr = Type::named("char").pointer_to();
        assert!(string_ty.is_compatible_with(&u8_ptr));
        assert!(u8_ptr.is_compatible_with(&string_ty));
        assert!(string_ty.is_compatible_with(&char_ptr));
    }

    #[test]
    fn string_does_not_interoperate_with_u8_value() {
        let string_ty = Type::named("string");
        let u8_ty = Type::named("u8");
        assert!(!string_ty.is_compatible_with(&u8_ty));
    }

    #[test]
    fn equal_pointer_levels_with_void_are_compatible() {
        let void_ptr = Type::named("void").pointer_to();
        let int_ptr = Type::named("int").pointer_to();
        assert!(void_ptr.is_compatible_with(&int_ptr));
        assert!(int_ptr.is_compatible_with(&void_ptr));
    }

    #[test]
    fn mismatched_pointer_levels_are_incompatible() {
        let ptr1 = Type::named("int").pointer_to();
        let ptr2 = Type::named("int").pointer_to().pointer_to();
        assert!(!ptr1.is_compatible_with(&ptr2));
    }

    #[test]
    fn distinct_named_pointers_are_incompatible_unless_void_or_char() {
        let int_ptr = Type::named("int").pointer_to();
        let bool_ptr = Type::named("bool").pointer_to();
        assert!(!int_ptr.is_compatible_with(&bool_ptr));
    }

    #[test]
    fn u8_range_bounds() {
        let bounds = Type::named("u8").integer_bounds().unwrap();
        assert_eq!(bounds, (0, 255));
    }

    #[test]
    fn i8_range_bounds() {
        let bounds = Type::named("i8").integer_bounds().unwrap();
        assert_eq!(bounds, (-128, 127));
    }

    #[test]
    fn non_integer_type_has_no_bounds() {
        assert!(Type::named("string").integer_bounds().is_none());
        assert!(Type::named("f64").integer_bounds().is_none());
    }

    #[test]
    fn display_formats_pointer_and_array_suffixes() {
        let ty = Type::named("u8").pointer_to().array_of(4);
        assert_eq!(ty.to_string(), "u8*[4]");
    }

    #[quickcheck_macros::quickcheck]
    fn compatibility_is_reflexive(name_idx: u8) -> bool {
        const NAMES: &[&str] = &["int", "uint", "u8", "i8", "char", "string", "bool", "f32"];
        let ty = Type::named(NAMES[name_idx as usize % NAMES.len()]);
        ty.is_compatible_with(&ty)
    }
}
