//! Structural type model used for interface satisfaction.
//!
//! Only as much of a type system as the matcher needs: enough to describe
//! method signatures and to decide whether two types are identical.

use serde::{Deserialize, Serialize};

use crate::graph::Identity;
use crate::implements::same_id;

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A type as it appears in a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    /// A predeclared type such as `int` or `string`.
    Basic(String),
    /// A named type. Named types are identical only to themselves.
    Named {
        #[serde(default)]
        package: Option<String>,
        name: String,
    },
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array { len: u64, elem: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Chan { dir: ChanDir, elem: Box<Type> },
    Func(Signature),
    Interface(Interface),
    Struct(Vec<Field>),
}

impl Type {
    pub fn basic(name: impl Into<String>) -> Self {
        Type::Basic(name.into())
    }

    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        Type::Named {
            package: Some(package.into()),
            name: name.into(),
        }
    }

    pub fn pointer(elem: Type) -> Self {
        Type::Pointer(Box::new(elem))
    }

    pub fn slice(elem: Type) -> Self {
        Type::Slice(Box::new(elem))
    }
}

/// A struct field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub package: Option<String>,
    pub ty: Type,
    #[serde(default)]
    pub embedded: bool,
}

/// A function or method signature. Parameter names are not recorded;
/// they play no part in identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<Type>,
    #[serde(default)]
    pub results: Vec<Type>,
    #[serde(default)]
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<Type>, results: Vec<Type>) -> Self {
        Self {
            params,
            results,
            variadic: false,
        }
    }
}

/// A method: an identifier with a signature, optionally tied to the graph
/// node that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    /// Package the method is declared in. Unexported names are scoped to it.
    #[serde(default)]
    pub package: Option<String>,
    pub signature: Signature,
    /// Identity of the declaring node, for concrete methods.
    #[serde(default)]
    pub identity: Option<Identity>,
}

impl Method {
    pub fn new(name: impl Into<String>, package: Option<&str>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            package: package.map(str::to_string),
            signature,
            identity: None,
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn exported(&self) -> bool {
        is_exported(&self.name)
    }
}

/// An interface type: the set of methods a type must have.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl Interface {
    pub fn new(methods: Vec<Method>) -> Self {
        Self { methods }
    }

    /// The empty interface is satisfied by every type.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// The methods callable on a concrete type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSet {
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl MethodSet {
    pub fn new(methods: Vec<Method>) -> Self {
        Self { methods }
    }

    /// Find the method with the same identifier as `name` seen from `package`.
    pub fn lookup(&self, package: Option<&str>, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| same_id(&m.name, m.package.as_deref(), package, name))
    }
}

/// Whether a name is visible outside its package: it starts with an
/// upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Structural type identity.
pub fn identical(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Basic(x), Type::Basic(y)) => x == y,
        (
            Type::Named {
                package: pa,
                name: na,
            },
            Type::Named {
                package: pb,
                name: nb,
            },
        ) => pa == pb && na == nb,
        (Type::Pointer(x), Type::Pointer(y)) | (Type::Slice(x), Type::Slice(y)) => identical(x, y),
        (Type::Array { len: la, elem: ea }, Type::Array { len: lb, elem: eb }) => {
            la == lb && identical(ea, eb)
        }
        (Type::Map { key: ka, value: va }, Type::Map { key: kb, value: vb }) => {
            identical(ka, kb) && identical(va, vb)
        }
        (Type::Chan { dir: da, elem: ea }, Type::Chan { dir: db, elem: eb }) => {
            da == db && identical(ea, eb)
        }
        (Type::Func(x), Type::Func(y)) => identical_signatures(x, y),
        (Type::Interface(x), Type::Interface(y)) => identical_interfaces(x, y),
        (Type::Struct(x), Type::Struct(y)) => {
            x.len() == y.len()
                && x.iter().zip(y).all(|(f, g)| {
                    f.embedded == g.embedded
                        && same_id(&f.name, f.package.as_deref(), g.package.as_deref(), &g.name)
                        && identical(&f.ty, &g.ty)
                })
        }
        _ => false,
    }
}

/// Signatures are identical when their parameter and result types are,
/// position by position, and they agree on variadicity.
pub fn identical_signatures(a: &Signature, b: &Signature) -> bool {
    a.variadic == b.variadic
        && a.params.len() == b.params.len()
        && a.results.len() == b.results.len()
        && a.params.iter().zip(&b.params).all(|(x, y)| identical(x, y))
        && a.results.iter().zip(&b.results).all(|(x, y)| identical(x, y))
}

// Interfaces are compared as method sets; declaration order is irrelevant.
fn identical_interfaces(a: &Interface, b: &Interface) -> bool {
    a.methods.len() == b.methods.len()
        && a.methods.iter().all(|m| {
            b.methods.iter().any(|n| {
                same_id(&n.name, n.package.as_deref(), m.package.as_deref(), &m.name)
                    && identical_signatures(&m.signature, &n.signature)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_sig() -> Signature {
        Signature::new(
            vec![Type::slice(Type::basic("byte"))],
            vec![Type::basic("int"), Type::basic("error")],
        )
    }

    #[test]
    fn test_is_exported() {
        assert!(is_exported("Read"));
        assert!(!is_exported("read"));
        assert!(!is_exported("_"));
        assert!(!is_exported(""));
    }

    #[test]
    fn test_identical_ignores_nothing_structural() {
        assert!(identical(&Type::Func(read_sig()), &Type::Func(read_sig())));

        let mut variadic = read_sig();
        variadic.variadic = true;
        assert!(!identical_signatures(&read_sig(), &variadic));

        let mut fewer_results = read_sig();
        fewer_results.results.pop();
        assert!(!identical_signatures(&read_sig(), &fewer_results));
    }

    #[test]
    fn test_named_types_differ_by_package() {
        assert!(!identical(
            &Type::named("a", "Buffer"),
            &Type::named("b", "Buffer")
        ));
        assert!(!identical(&Type::named("a", "int"), &Type::basic("int")));
    }

    #[test]
    fn test_interfaces_identical_regardless_of_order() {
        let close = Method::new("Close", Some("io"), Signature::default());
        let read = Method::new("Read", Some("io"), read_sig());
        let a = Interface::new(vec![close.clone(), read.clone()]);
        let b = Interface::new(vec![read, close]);
        assert!(identical(&Type::Interface(a), &Type::Interface(b)));
    }

    #[test]
    fn test_unexported_struct_fields_are_package_scoped() {
        let field = |pkg: &str| Field {
            name: "n".to_string(),
            package: Some(pkg.to_string()),
            ty: Type::basic("int"),
            embedded: false,
        };
        assert!(identical(
            &Type::Struct(vec![field("p")]),
            &Type::Struct(vec![field("p")])
        ));
        assert!(!identical(
            &Type::Struct(vec![field("p")]),
            &Type::Struct(vec![field("q")])
        ));
    }

    #[test]
    fn test_method_set_lookup_respects_package_scope() {
        let set = MethodSet::new(vec![
            Method::new("flush", Some("w"), Signature::default()),
            Method::new("Write", Some("w"), Signature::default()),
        ]);
        assert!(set.lookup(Some("w"), "flush").is_some());
        assert!(set.lookup(Some("other"), "flush").is_none());
        assert!(set.lookup(Some("other"), "Write").is_some());
    }
}
