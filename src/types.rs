//! SIMPL-2021's type lattice.
//!
//! The original compiler (`examples/original_source/src/valtypes.h`) packs
//! this into a bitmask (`ARRAY = 1, BOOLEAN = 2, INTEGER = 4, CALLABLE =
//! 8`) so a single `unsigned int` can be tested with `&`. `spec.md` §9
//! "strictly recommends" replacing that with a tagged enum now that
//! there's no C union backing it — a bitmask with only four flags, one
//! of which (`CALLABLE`) is orthogonal to the other three, doesn't buy
//! anything once matching is free. `ValType` below is that enum, in the
//! style of `examples/navicore-cem3/compiler/src/types.rs`'s `Type`.

use std::fmt;

/// The two (and only two) scalar base types in SIMPL-2021.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Integer,
    Boolean,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Integer => write!(f, "integer"),
            BaseType::Boolean => write!(f, "boolean"),
        }
    }
}

/// The type of a value, as opposed to the type of an identifier: every
/// expression has exactly one of these. Procedures/functions are not
/// `ValType`s themselves — they're `ValType::Scalar`/`Array` only at the
/// call site's *result* position, while the identifier naming the
/// procedure/function carries `IdentKind::Callable` (see [`IdentKind`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValType {
    Scalar(BaseType),
    Array(BaseType),
}

impl ValType {
    pub fn base(&self) -> BaseType {
        match self {
            ValType::Scalar(b) | ValType::Array(b) => *b,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ValType::Array(_))
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValType::Scalar(b) => write!(f, "{}", b),
            ValType::Array(b) => write!(f, "array of {}", b),
        }
    }
}

impl ValType {
    /// The JVM field-descriptor letter for this type: scalars are `I`
    /// (integer) or `Z` (boolean); arrays of either are `[I`/`[Z` since
    /// SIMPL-2021 has no nested array types.
    pub fn jvm_descriptor(&self) -> &'static str {
        match self {
            ValType::Scalar(BaseType::Integer) => "I",
            ValType::Scalar(BaseType::Boolean) => "Z",
            ValType::Array(BaseType::Integer) => "[I",
            ValType::Array(BaseType::Boolean) => "[Z",
        }
    }
}

/// A procedure or function signature: parameter types in declaration
/// order, plus a return type for functions (`None` for procedures).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<ValType>,
    pub return_type: Option<ValType>,
}

impl Signature {
    /// The JVM method descriptor for this signature, e.g. `"(II)I"`.
    pub fn jvm_descriptor(&self) -> String {
        let mut out = String::from("(");
        for p in &self.params {
            out.push_str(p.jvm_descriptor());
        }
        out.push(')');
        match &self.return_type {
            Some(t) => out.push_str(t.jvm_descriptor()),
            None => out.push('V'),
        }
        out
    }
}

/// What an identifier names, which determines what the parser is allowed
/// to do with it at a use site. This is the symbol table's value type;
/// `ValType` above is what an *expression* evaluates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentKind {
    Variable(ValType),
    Callable(Signature),
}

impl IdentKind {
    pub fn describe(&self) -> &'static str {
        match self {
            IdentKind::Variable(ValType::Scalar(_)) => "scalar variable",
            IdentKind::Variable(ValType::Array(_)) => "array variable",
            IdentKind::Callable(sig) if sig.return_type.is_some() => "function",
            IdentKind::Callable(_) => "procedure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_display_matches_original_phrasing() {
        assert_eq!(ValType::Array(BaseType::Integer).to_string(), "array of integer");
        assert_eq!(ValType::Scalar(BaseType::Boolean).to_string(), "boolean");
    }

    #[test]
    fn signature_descriptor_matches_jvm_convention() {
        let sig = Signature {
            params: vec![ValType::Scalar(BaseType::Integer), ValType::Array(BaseType::Boolean)],
            return_type: Some(ValType::Scalar(BaseType::Integer)),
        };
        assert_eq!(sig.jvm_descriptor(), "(I[Z)I");
        let proc = Signature { params: vec![], return_type: None };
        assert_eq!(proc.jvm_descriptor(), "()V");
    }

    #[test]
    fn callable_describe_distinguishes_function_from_procedure() {
        let func = IdentKind::Callable(Signature {
            params: vec![],
            return_type: Some(ValType::Scalar(BaseType::Integer)),
        });
        let proc = IdentKind::Callable(Signature { params: vec![], return_type: None });
        assert_eq!(func.describe(), "function");
        assert_eq!(proc.describe(), "procedure");
    }
}
