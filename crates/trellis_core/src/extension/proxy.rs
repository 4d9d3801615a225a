//! Extension proxy: a [`ProxyType`] instance wrapping one plugin instance.

use crate::extension::interface::{ExtensionObject, InterfaceId, InterfaceInfo};
use crate::extension::registry::{
    global_registry, ExtensionTypeRegistry, ProxyKind, ProxyType, NATIVE_PROXY_KIND,
};
use crate::extension::{ExtensionError, ExtensionResult};
use crate::value::Value;
use log::debug;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, PoisonError, RwLock};

/// Presents an owned plugin instance as an implementation of one interface.
///
/// The proxy declares no properties of its own, so property names always
/// reach the instance unshadowed.
///
/// Forwarded calls run without holding the proxy's lock, so an instance may
/// dispose its own proxy from inside a call.
pub struct ExtensionProxy {
    proxy_type: Arc<ProxyType>,
    instance: RwLock<Option<Arc<dyn ExtensionObject>>>,
}

impl ExtensionProxy {
    /// Wraps `instance` as `interface` using the native proxy kind and the
    /// process-wide registry.
    pub fn create(
        interface: &'static InterfaceInfo,
        instance: Box<dyn ExtensionObject>,
    ) -> ExtensionResult<Self> {
        Self::create_with_kind(&NATIVE_PROXY_KIND, interface, instance)
    }

    pub fn create_with_kind(
        kind: &'static dyn ProxyKind,
        interface: &'static InterfaceInfo,
        instance: Box<dyn ExtensionObject>,
    ) -> ExtensionResult<Self> {
        Self::create_in(global_registry(), kind, interface, instance)
    }

    /// Wraps `instance` with a proxy type resolved from `registry`.
    pub fn create_in(
        registry: &ExtensionTypeRegistry,
        kind: &'static dyn ProxyKind,
        interface: &'static InterfaceInfo,
        instance: Box<dyn ExtensionObject>,
    ) -> ExtensionResult<Self> {
        let proxy_type = registry.resolve(kind, interface)?;
        Ok(Self {
            proxy_type,
            instance: RwLock::new(Some(Arc::from(instance))),
        })
    }

    /// Interface this proxy was created to satisfy.
    pub fn extension_type(&self) -> &'static InterfaceInfo {
        self.proxy_type.interface()
    }

    pub fn proxy_type(&self) -> &Arc<ProxyType> {
        &self.proxy_type
    }

    pub fn implements(&self, interface: InterfaceId) -> bool {
        self.proxy_type.implements(interface)
    }

    pub fn is_disposed(&self) -> bool {
        self.instance
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Reads `name` from the wrapped instance.
    pub fn get_property(&self, name: &str) -> ExtensionResult<Value> {
        let instance = self.live()?;
        self.proxy_type.kind().get_property(instance.as_ref(), name)
    }

    /// Writes `name` on the wrapped instance.
    pub fn set_property(&self, name: &str, value: Value) -> ExtensionResult<()> {
        let instance = self.live()?;
        self.proxy_type
            .kind()
            .set_property(instance.as_ref(), name, value)
    }

    /// Calls `method` of the extension interface on the wrapped instance.
    ///
    /// # Errors
    /// - `Disposed` after [`dispose`](Self::dispose).
    /// - `NoSuchMethod` when the interface declares no such method or the
    ///   instance does not serve it.
    /// - `InvalidArguments` when `args` or the result do not fit the declared
    ///   signature.
    pub fn invoke(&self, method: &str, args: &[Value]) -> ExtensionResult<Value> {
        let instance = self.live()?;
        let interface = self.proxy_type.interface();

        let slot = self
            .proxy_type
            .method(method)
            .ok_or_else(|| self.no_such_method(method))?;
        if !instance.implements(interface.id()) {
            return Err(self.no_such_method(method));
        }

        let spec = slot.spec;
        if args.len() != spec.args.len() {
            return Err(self.invalid_arguments(
                method,
                format!("expected {} arguments, got {}", spec.args.len(), args.len()),
            ));
        }
        let coerced = args
            .iter()
            .zip(spec.args)
            .enumerate()
            .map(|(index, (arg, expected))| {
                arg.clone().coerce_to(*expected).map_err(|actual| {
                    self.invalid_arguments(
                        method,
                        format!(
                            "argument {index} expects {expected}, got {}",
                            actual.value_type()
                        ),
                    )
                })
            })
            .collect::<ExtensionResult<Vec<_>>>()?;

        let result = (slot.forward)(instance.as_ref(), &coerced)?;
        result.coerce_to(spec.returns).map_err(|actual| {
            self.invalid_arguments(
                method,
                format!(
                    "return value expects {}, got {}",
                    spec.returns,
                    actual.value_type()
                ),
            )
        })
    }

    /// Releases the wrapped instance. Returns `true` only for the call that
    /// actually released it.
    ///
    /// Calls already in flight finish against the instance; it is dropped
    /// when the last of them returns.
    pub fn dispose(&self) -> bool {
        let released = self
            .instance
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match released {
            Some(instance) => {
                debug!(
                    "event=extension_disposed module=extension status=ok type={} instance={}",
                    self.proxy_type.type_name(),
                    instance.type_name()
                );
                true
            }
            None => false,
        }
    }

    // Clones the instance out so no lock is held while it runs.
    fn live(&self) -> ExtensionResult<Arc<dyn ExtensionObject>> {
        self.instance
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ExtensionError::Disposed(self.proxy_type.interface().id()))
    }

    fn no_such_method(&self, method: &str) -> ExtensionError {
        ExtensionError::NoSuchMethod {
            interface: self.proxy_type.interface().id(),
            method: method.to_string(),
        }
    }

    fn invalid_arguments(&self, method: &str, reason: String) -> ExtensionError {
        ExtensionError::InvalidArguments {
            interface: self.proxy_type.interface().id(),
            method: method.to_string(),
            reason,
        }
    }
}

impl Drop for ExtensionProxy {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Debug for ExtensionProxy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionProxy")
            .field("type", &self.proxy_type.type_name())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
