//! Extension proxies.
//!
//! # Responsibility
//! - Declare capability interfaces and the instance surface plugins expose.
//! - Resolve one proxy type per (proxy kind, interface) pair and wrap loaded
//!   instances in proxies of that type.
//!
//! # Invariants
//! - For a fixed pair, every resolution in the process returns the same
//!   proxy type.
//! - A proxy releases its instance exactly once; afterwards every call fails
//!   with `Disposed`.

use thiserror::Error;

pub mod interface;
pub mod loader;
pub mod marshal;
pub mod proxy;
pub mod registry;

pub use interface::{
    ExtensionObject, InterfaceId, InterfaceInfo, MethodSpec, ObjectError, PropertySpec, TypeKind,
};
pub use loader::{create_extension, ExtensionLoader, LoaderError};
pub use marshal::{collect_parameters, MarshalError, Parameter};
pub use proxy::ExtensionProxy;
pub use registry::{
    global_registry, resolve_proxy_type, ExtensionTypeKey, ExtensionTypeRegistry, NativeProxyKind,
    ProxyKind, ProxyType, NATIVE_PROXY_KIND,
};

pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Failures of proxy resolution and forwarding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtensionError {
    #[error("{0} is not an interface type")]
    NotAnInterface(InterfaceId),
    #[error("no method `{method}` on interface {interface}")]
    NoSuchMethod {
        interface: InterfaceId,
        method: String,
    },
    #[error("invalid arguments for {interface}.{method}: {reason}")]
    InvalidArguments {
        interface: InterfaceId,
        method: String,
        reason: String,
    },
    #[error("extension for {0} has been disposed")]
    Disposed(InterfaceId),
    #[error("instance error: {0}")]
    Instance(ObjectError),
    #[error(transparent)]
    Marshal(#[from] MarshalError),
    #[error(transparent)]
    Loader(#[from] LoaderError),
}
