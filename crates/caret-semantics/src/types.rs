//! Types and declaration modifiers.

use caret_syntax::TokenKind;
use smol_str::SmolStr;
use std::fmt;

/// The type of a value, a field or a method's return.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Long,
    Double,
    Boolean,
    Char,
    Void,
    /// Type of the `null` literal
    Null,
    /// A class type, by name
    Class(SmolStr),
    /// Could not be determined; compatible with everything
    Unknown,
}

impl Type {
    pub fn class(name: impl Into<SmolStr>) -> Self {
        Type::Class(name.into())
    }

    /// Type named by a primitive keyword token
    pub fn from_keyword(kind: &TokenKind) -> Option<Self> {
        let ty = match kind {
            TokenKind::Int => Type::Int,
            TokenKind::Long => Type::Long,
            TokenKind::Double => Type::Double,
            TokenKind::Boolean => Type::Boolean,
            TokenKind::Char => Type::Char,
            TokenKind::Void => Type::Void,
            _ => return None,
        };
        Some(ty)
    }

    pub fn is_void_or_null(&self) -> bool {
        matches!(self, Type::Void | Type::Null)
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::Class(name) if name == "String")
    }

    /// Widening order `char < int < long < double`
    fn numeric_rank(&self) -> Option<u8> {
        match self {
            Type::Char => Some(1),
            Type::Int => Some(2),
            Type::Long => Some(3),
            Type::Double => Some(4),
            _ => None,
        }
    }

    /// The wider of two numeric types
    pub fn widen(&self, other: &Type) -> Option<Type> {
        let (a, b) = (self.numeric_rank()?, other.numeric_rank()?);
        // char arithmetic promotes to int
        let ty = if a >= b { self } else { other };
        Some(if *ty == Type::Char { Type::Int } else { ty.clone() })
    }

    /// Whether a value of type `source` can be stored where `self` is expected.
    pub fn is_assignable_from(&self, source: &Type) -> bool {
        if self.is_unknown() || source.is_unknown() || self == source {
            return true;
        }
        match (self, source) {
            (Type::Void, _) | (_, Type::Void) => false,
            (Type::Class(_), Type::Null) => true,
            (Type::Class(name), _) if name == "Object" => true,
            (Type::Class(name), Type::Int) | (Type::Int, Type::Class(name)) => name == "Integer",
            _ => match (self.numeric_rank(), source.numeric_rank()) {
                (Some(target), Some(source)) => target >= source,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Long => write!(f, "long"),
            Type::Double => write!(f, "double"),
            Type::Boolean => write!(f, "boolean"),
            Type::Char => write!(f, "char"),
            Type::Void => write!(f, "void"),
            Type::Null => write!(f, "null"),
            Type::Class(name) => write!(f, "{}", name),
            Type::Unknown => write!(f, "?"),
        }
    }
}

/// A set of declaration modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const STATIC: Modifiers = Modifiers(1);
    pub const FINAL: Modifiers = Modifiers(1 << 1);
    pub const PUBLIC: Modifiers = Modifiers(1 << 2);
    pub const PRIVATE: Modifiers = Modifiers(1 << 3);
    pub const PROTECTED: Modifiers = Modifiers(1 << 4);

    pub fn from_keyword(kind: &TokenKind) -> Option<Self> {
        let modifier = match kind {
            TokenKind::Static => Modifiers::STATIC,
            TokenKind::Final => Modifiers::FINAL,
            TokenKind::Public => Modifiers::PUBLIC,
            TokenKind::Private => Modifiers::PRIVATE,
            TokenKind::Protected => Modifiers::PROTECTED,
            _ => return None,
        };
        Some(modifier)
    }

    /// True if every modifier in `other` is present
    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Modifiers::PUBLIC, "public"),
            (Modifiers::PROTECTED, "protected"),
            (Modifiers::PRIVATE, "private"),
            (Modifiers::STATIC, "static"),
            (Modifiers::FINAL, "final"),
        ];
        let mut first = true;
        for (modifier, name) in names {
            if self.contains(modifier) {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_widening() {
        assert!(Type::Long.is_assignable_from(&Type::Int));
        assert!(Type::Double.is_assignable_from(&Type::Char));
        assert!(Type::Int.is_assignable_from(&Type::Char));
        assert!(!Type::Int.is_assignable_from(&Type::Long));
        assert!(!Type::Char.is_assignable_from(&Type::Int));
        assert!(!Type::Boolean.is_assignable_from(&Type::Int));
    }

    #[test]
    fn test_class_assignability() {
        let string = Type::class("String");
        assert!(string.is_assignable_from(&Type::Null));
        assert!(Type::class("Object").is_assignable_from(&string));
        assert!(Type::class("Object").is_assignable_from(&Type::Int));
        assert!(!string.is_assignable_from(&Type::Int));
        assert!(!Type::Int.is_assignable_from(&Type::Null));
        assert!(Type::class("Integer").is_assignable_from(&Type::Int));
        assert!(!Type::class("Object").is_assignable_from(&Type::Void));
    }

    #[test]
    fn test_unknown_is_compatible() {
        assert!(Type::Int.is_assignable_from(&Type::Unknown));
        assert!(Type::Unknown.is_assignable_from(&Type::class("List")));
    }

    #[test]
    fn test_widen() {
        assert_eq!(Type::Int.widen(&Type::Double), Some(Type::Double));
        assert_eq!(Type::Char.widen(&Type::Char), Some(Type::Int));
        assert_eq!(Type::Int.widen(&Type::Boolean), None);
    }

    #[test]
    fn test_modifiers() {
        let mods = Modifiers::STATIC | Modifiers::FINAL | Modifiers::PUBLIC;
        assert!(mods.contains(Modifiers::STATIC | Modifiers::FINAL));
        assert!(!Modifiers::STATIC.contains(Modifiers::STATIC | Modifiers::FINAL));
        assert!(mods.contains(Modifiers::NONE));
        assert_eq!(mods.to_string(), "public static final");
    }

    #[test]
    fn test_display() {
        let types = [
            Type::Int,
            Type::Long,
            Type::Double,
            Type::Boolean,
            Type::Char,
            Type::Void,
            Type::Null,
            Type::class("List"),
            Type::Unknown,
        ];
        let shown: Vec<String> = types.iter().map(Type::to_string).collect();
        insta::assert_snapshot!(shown.join(" "), @"int long double boolean char void null List ?");
    }
}
