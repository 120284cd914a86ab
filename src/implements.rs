//! Interface satisfaction.
//!
//! Answers "does type V satisfy interface T?" structurally, without touching
//! any graph. The graph-building pass uses it to record interface-typed
//! references (see [`PartialGraph::link_implementation`]).
//!
//! [`PartialGraph::link_implementation`]: crate::graph::PartialGraph::link_implementation

use crate::typemodel::{identical_signatures, is_exported, Interface, Method, MethodSet};

/// The type being tested against an interface.
#[derive(Debug, Clone, Copy)]
pub enum Implementor<'a> {
    /// V is itself an interface.
    Interface(&'a Interface),
    /// V is a concrete type with the given method set.
    Concrete(&'a MethodSet),
}

/// One interface method matched to the concrete method that provides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding<'a> {
    pub interface_method: &'a Method,
    pub method: &'a Method,
}

/// Whether the object named `obj_name`, declared in `obj_package`, is the
/// same identifier as `name` referenced from `package`.
///
/// Two identifiers are different if they are spelled differently, or if
/// they are unexported and belong to different packages.
pub fn same_id(obj_name: &str, obj_package: Option<&str>, package: Option<&str>, name: &str) -> bool {
    if name != obj_name {
        return false;
    }
    if is_exported(obj_name) {
        return true;
    }
    obj_package == package
}

/// Index and value of the method in `methods` with the same identifier as
/// `name` seen from `package`. The blank identifier never matches.
pub fn lookup_method<'a>(
    methods: &'a [Method],
    package: Option<&str>,
    name: &str,
) -> Option<(usize, &'a Method)> {
    if name == "_" {
        return None;
    }
    methods
        .iter()
        .enumerate()
        .find(|(_, m)| same_id(&m.name, m.package.as_deref(), package, name))
}

/// Check whether `v` satisfies `t`.
///
/// Returns `None` when it does not. On success, a concrete `v` yields one
/// binding per method of `t`; an interface `v` and the empty interface
/// yield no bindings.
pub fn implements<'a>(v: Implementor<'a>, t: &'a Interface) -> Option<Vec<Binding<'a>>> {
    if t.is_empty() {
        return Some(Vec::new());
    }

    match v {
        Implementor::Interface(iface) => {
            for m in &t.methods {
                let (_, found) = lookup_method(&iface.methods, m.package.as_deref(), &m.name)?;
                if !identical_signatures(&found.signature, &m.signature) {
                    return None;
                }
            }
            Some(Vec::new())
        }
        Implementor::Concrete(method_set) => {
            let mut bindings = Vec::with_capacity(t.methods.len());
            for m in &t.methods {
                let found = method_set.lookup(m.package.as_deref(), &m.name)?;
                if !identical_signatures(&found.signature, &m.signature) {
                    return None;
                }
                bindings.push(Binding {
                    interface_method: m,
                    method: found,
                });
            }
            Some(bindings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typemodel::{Signature, Type};

    fn read(param: Type) -> Method {
        Method::new(
            "Read",
            Some("io"),
            Signature::new(vec![param], vec![Type::basic("int"), Type::basic("error")]),
        )
    }

    fn bytes() -> Type {
        Type::slice(Type::basic("byte"))
    }

    #[test]
    fn test_empty_interface_is_always_satisfied() {
        let empty = Interface::default();
        let concrete = MethodSet::default();
        let bindings = implements(Implementor::Concrete(&concrete), &empty).unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_concrete_read_matches() {
        let reader = Interface::new(vec![read(bytes())]);
        let file = MethodSet::new(vec![
            Method::new("Close", Some("os"), Signature::default()),
            read(bytes()),
        ]);

        let bindings = implements(Implementor::Concrete(&file), &reader).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].method.name, "Read");
        assert_eq!(bindings[0].interface_method, &reader.methods[0]);
    }

    #[test]
    fn test_changed_parameter_type_fails() {
        let reader = Interface::new(vec![read(bytes())]);
        let file = MethodSet::new(vec![read(Type::basic("string"))]);
        assert!(implements(Implementor::Concrete(&file), &reader).is_none());
    }

    #[test]
    fn test_missing_method_fails() {
        let reader = Interface::new(vec![read(bytes())]);
        let closer = MethodSet::new(vec![Method::new("Close", None, Signature::default())]);
        assert!(implements(Implementor::Concrete(&closer), &reader).is_none());
    }

    #[test]
    fn test_unexported_method_from_other_package_fails() {
        let iface = Interface::new(vec![Method::new("flush", Some("a"), Signature::default())]);
        let same_pkg = MethodSet::new(vec![Method::new("flush", Some("a"), Signature::default())]);
        let other_pkg = MethodSet::new(vec![Method::new("flush", Some("b"), Signature::default())]);

        assert!(implements(Implementor::Concrete(&same_pkg), &iface).is_some());
        assert!(implements(Implementor::Concrete(&other_pkg), &iface).is_none());
    }

    #[test]
    fn test_interface_implementor_yields_no_bindings() {
        let reader = Interface::new(vec![read(bytes())]);
        let read_closer = Interface::new(vec![
            read(bytes()),
            Method::new("Close", Some("io"), Signature::default()),
        ]);

        let bindings = implements(Implementor::Interface(&read_closer), &reader).unwrap();
        assert!(bindings.is_empty());
        assert!(implements(Implementor::Interface(&reader), &read_closer).is_none());
    }

    #[test]
    fn test_blank_name_never_looked_up() {
        let methods = vec![Method::new("_", Some("p"), Signature::default())];
        assert!(lookup_method(&methods, Some("p"), "_").is_none());
    }

    #[test]
    fn test_same_id() {
        assert!(same_id("Read", Some("a"), Some("b"), "Read"));
        assert!(!same_id("read", Some("a"), Some("b"), "read"));
        assert!(same_id("read", None, None, "read"));
        assert!(!same_id("Read", Some("a"), Some("a"), "Write"));
    }
}
