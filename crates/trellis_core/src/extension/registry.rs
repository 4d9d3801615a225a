//! Proxy type registry.
//!
//! Proxy types are resolved once per (proxy kind, interface) pair and then
//! shared for the lifetime of the registry. Each type carries a dispatch
//! table bound from the interface's declared methods at synthesis time.

use crate::extension::interface::{
    ExtensionObject, InterfaceId, InterfaceInfo, MethodSpec, ObjectError,
};
use crate::extension::{ExtensionError, ExtensionResult};
use crate::value::Value;
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

/// Base behavior a proxy type derives from, one per loader technology.
///
/// `name()` must be unique per process; it is half of the registry key.
pub trait ProxyKind: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Identifier of the loader whose instances this kind wraps.
    fn loader_id(&self) -> &'static str;

    /// Marshals a checked call onto `instance`.
    fn call(
        &self,
        instance: &dyn ExtensionObject,
        interface: &'static InterfaceInfo,
        method: &'static MethodSpec,
        args: &[Value],
    ) -> ExtensionResult<Value> {
        instance
            .call(interface.id(), method.name, args)
            .map_err(|err| match err {
                ObjectError::UnknownMethod(name) => ExtensionError::NoSuchMethod {
                    interface: interface.id(),
                    method: name,
                },
                other => ExtensionError::Instance(other),
            })
    }

    fn get_property(&self, instance: &dyn ExtensionObject, name: &str) -> ExtensionResult<Value> {
        instance.property(name).map_err(ExtensionError::Instance)
    }

    fn set_property(
        &self,
        instance: &dyn ExtensionObject,
        name: &str,
        value: Value,
    ) -> ExtensionResult<()> {
        instance
            .set_property(name, value)
            .map_err(ExtensionError::Instance)
    }
}

/// Proxy kind for instances produced by the built-in `"c"` loader; every
/// operation is forwarded unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProxyKind;

impl ProxyKind for NativeProxyKind {
    fn name(&self) -> &'static str {
        "NativeExtension"
    }

    fn loader_id(&self) -> &'static str {
        crate::config::DEFAULT_LOADER
    }
}

pub static NATIVE_PROXY_KIND: NativeProxyKind = NativeProxyKind;

/// Registry key: one proxy type per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionTypeKey {
    pub interface: InterfaceId,
    pub kind: &'static str,
}

type Forwarder = Box<dyn Fn(&dyn ExtensionObject, &[Value]) -> ExtensionResult<Value> + Send + Sync>;

pub(crate) struct MethodSlot {
    pub(crate) spec: &'static MethodSpec,
    pub(crate) forward: Forwarder,
}

/// Concrete proxy type for one (kind, interface) pair.
pub struct ProxyType {
    key: ExtensionTypeKey,
    type_name: String,
    kind: &'static dyn ProxyKind,
    interface: &'static InterfaceInfo,
    methods: HashMap<&'static str, MethodSlot>,
}

impl ProxyType {
    fn synthesize(kind: &'static dyn ProxyKind, interface: &'static InterfaceInfo) -> Self {
        let methods = interface
            .methods()
            .iter()
            .map(|spec| {
                let forward: Forwarder =
                    Box::new(move |instance: &dyn ExtensionObject, args: &[Value]| {
                        kind.call(instance, interface, spec, args)
                    });
                (spec.name, MethodSlot { spec, forward })
            })
            .collect();

        Self {
            key: ExtensionTypeKey {
                interface: interface.id(),
                kind: kind.name(),
            },
            type_name: format!("{}+{}", kind.name(), interface.name()),
            kind,
            interface,
            methods,
        }
    }

    pub fn key(&self) -> ExtensionTypeKey {
        self.key
    }

    /// `"<KindName>+<InterfaceName>"`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> &'static dyn ProxyKind {
        self.kind
    }

    pub fn interface(&self) -> &'static InterfaceInfo {
        self.interface
    }

    pub fn implements(&self, interface: InterfaceId) -> bool {
        self.interface.id() == interface
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub(crate) fn method(&self, name: &str) -> Option<&MethodSlot> {
        self.methods.get(name)
    }
}

impl Debug for ProxyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyType")
            .field("type_name", &self.type_name)
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Cache of synthesized proxy types. Entries are never evicted.
#[derive(Default)]
pub struct ExtensionTypeRegistry {
    types: Mutex<HashMap<ExtensionTypeKey, Arc<ProxyType>>>,
}

impl ExtensionTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the proxy type for `(kind, interface)`, synthesizing it on
    /// first request.
    ///
    /// Lookup and synthesis happen under one lock, so racing callers for the
    /// same pair all receive the same `Arc`.
    ///
    /// # Errors
    /// `NotAnInterface` when `interface` declares a concrete object type.
    pub fn resolve(
        &self,
        kind: &'static dyn ProxyKind,
        interface: &'static InterfaceInfo,
    ) -> ExtensionResult<Arc<ProxyType>> {
        if !interface.is_interface() {
            return Err(ExtensionError::NotAnInterface(interface.id()));
        }
        let key = ExtensionTypeKey {
            interface: interface.id(),
            kind: kind.name(),
        };

        let mut types = self.types.lock().unwrap_or_else(PoisonError::into_inner);
        let proxy_type = types.entry(key).or_insert_with(|| {
            let synthesized = Arc::new(ProxyType::synthesize(kind, interface));
            debug!(
                "event=proxy_type_synthesized module=extension status=ok type={} methods={}",
                synthesized.type_name(),
                synthesized.methods.len()
            );
            synthesized
        });
        Ok(Arc::clone(proxy_type))
    }

    pub fn contains(&self, kind: &dyn ProxyKind, interface: &InterfaceInfo) -> bool {
        let key = ExtensionTypeKey {
            interface: interface.id(),
            kind: kind.name(),
        };
        self.types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.types.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static GLOBAL_REGISTRY: Lazy<ExtensionTypeRegistry> = Lazy::new(ExtensionTypeRegistry::new);

/// Process-wide registry, empty at start-up.
pub fn global_registry() -> &'static ExtensionTypeRegistry {
    &GLOBAL_REGISTRY
}

/// Resolves `(kind, interface)` against the process-wide registry.
pub fn resolve_proxy_type(
    kind: &'static dyn ProxyKind,
    interface: &'static InterfaceInfo,
) -> ExtensionResult<Arc<ProxyType>> {
    global_registry().resolve(kind, interface)
}

#[cfg(test)]
mod tests {
    use super::{ExtensionTypeRegistry, NATIVE_PROXY_KIND};
    use crate::extension::interface::{InterfaceInfo, MethodSpec};
    use crate::extension::ExtensionError;
    use crate::value::ValueType;
    use std::sync::Arc;

    static GREETER: InterfaceInfo = InterfaceInfo::interface(
        "TestGreeter",
        &[],
        &[MethodSpec::new("greet", &[ValueType::String], ValueType::String)],
    );
    static WIDGET: InterfaceInfo = InterfaceInfo::object("TestWidget", &[], &[]);

    #[test]
    fn resolves_same_type_twice() {
        let registry = ExtensionTypeRegistry::new();
        let first = registry
            .resolve(&NATIVE_PROXY_KIND, &GREETER)
            .expect("first resolve");
        let second = registry
            .resolve(&NATIVE_PROXY_KIND, &GREETER)
            .expect("second resolve");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(first.type_name(), "NativeExtension+TestGreeter");
        assert!(first.has_method("greet"));
    }

    #[test]
    fn rejects_object_types() {
        let registry = ExtensionTypeRegistry::new();
        let err = registry
            .resolve(&NATIVE_PROXY_KIND, &WIDGET)
            .expect_err("object type must be rejected");
        assert_eq!(err, ExtensionError::NotAnInterface(WIDGET.id()));
        assert!(registry.is_empty());
    }
}
