//! Capability interface declarations and the plugin instance surface.
//!
//! Interfaces are declared statically (`static FOO: InterfaceInfo = ...`);
//! their member lists drive both proxy type synthesis and parameter
//! marshaling.

use crate::value::{Value, ValueType};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Process-unique identity of a declared type (its name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterfaceId(&'static str);

impl InterfaceId {
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for InterfaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Whether a declaration is an abstract capability interface or a concrete
/// object type. Only interfaces can be proxied or marshaled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Interface,
    Object,
}

/// Declared property of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub value_type: ValueType,
    pub writable: bool,
}

impl PropertySpec {
    pub const fn read_write(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            writable: true,
        }
    }

    pub const fn read_only(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            writable: false,
        }
    }
}

/// Declared method signature of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: &'static str,
    pub args: &'static [ValueType],
    pub returns: ValueType,
}

impl MethodSpec {
    pub const fn new(name: &'static str, args: &'static [ValueType], returns: ValueType) -> Self {
        Self {
            name,
            args,
            returns,
        }
    }
}

/// Static description of a capability interface.
#[derive(Debug, PartialEq, Eq)]
pub struct InterfaceInfo {
    name: &'static str,
    kind: TypeKind,
    properties: &'static [PropertySpec],
    methods: &'static [MethodSpec],
}

impl InterfaceInfo {
    pub const fn interface(
        name: &'static str,
        properties: &'static [PropertySpec],
        methods: &'static [MethodSpec],
    ) -> Self {
        Self {
            name,
            kind: TypeKind::Interface,
            properties,
            methods,
        }
    }

    /// Declares a concrete object type. Such declarations are rejected
    /// wherever an interface is required.
    pub const fn object(
        name: &'static str,
        properties: &'static [PropertySpec],
        methods: &'static [MethodSpec],
    ) -> Self {
        Self {
            name,
            kind: TypeKind::Object,
            properties,
            methods,
        }
    }

    pub fn id(&self) -> InterfaceId {
        InterfaceId(self.name)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn properties(&self) -> &'static [PropertySpec] {
        self.properties
    }

    pub fn methods(&self) -> &'static [MethodSpec] {
        self.methods
    }

    pub fn find_property(&self, name: &str) -> Option<&'static PropertySpec> {
        self.properties.iter().find(|spec| spec.name == name)
    }

    pub fn find_method(&self, name: &str) -> Option<&'static MethodSpec> {
        self.methods.iter().find(|spec| spec.name == name)
    }
}

/// Errors raised by plugin instance implementations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjectError {
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("property is read-only: {0}")]
    ReadOnly(String),
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error("property {property} expects {expected}, got {actual}")]
    TypeMismatch {
        property: String,
        expected: ValueType,
        actual: ValueType,
    },
    #[error("{0}")]
    Failed(String),
}

/// Surface every loaded plugin instance exposes, whatever produced it.
///
/// Implementations must be usable from several threads at once; setters take
/// `&self` and rely on interior mutability.
pub trait ExtensionObject: Send + Sync {
    /// Concrete type name, for diagnostics.
    fn type_name(&self) -> &str;

    /// Whether this instance natively implements `interface`.
    fn implements(&self, interface: InterfaceId) -> bool;

    fn property(&self, name: &str) -> Result<Value, ObjectError>;

    fn set_property(&self, name: &str, value: Value) -> Result<(), ObjectError>;

    /// Runs `method` of `interface` with already type-checked arguments.
    ///
    /// Returns `ObjectError::UnknownMethod` when this instance does not serve
    /// the method.
    fn call(&self, interface: InterfaceId, method: &str, args: &[Value]) -> Result<Value, ObjectError>;

    /// Whether the instance offers a configuration surface.
    fn is_configurable(&self) -> bool {
        false
    }
}
