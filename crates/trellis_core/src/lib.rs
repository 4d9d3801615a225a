//! Core of the trellis plugin runtime.
//!
//! Parses plugin descriptors into shared records and wraps loaded plugin
//! instances in proxies implementing statically declared capability
//! interfaces.

pub mod config;
pub mod extension;
pub mod logging;
pub mod manifest;
pub mod value;

pub use config::{
    ManifestConfig, SearchPath, DEFAULT_ICON_NAME, DEFAULT_LOADER, PLUGIN_FILE_EXTENSION,
};
pub use extension::{
    collect_parameters, create_extension, global_registry, resolve_proxy_type, ExtensionError,
    ExtensionLoader, ExtensionObject, ExtensionProxy, ExtensionResult, ExtensionTypeKey,
    ExtensionTypeRegistry, InterfaceId, InterfaceInfo, LoaderError, MarshalError, MethodSpec,
    NativeProxyKind, ObjectError, Parameter, PropertySpec, ProxyKind, ProxyType,
    NATIVE_PROXY_KIND,
};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use manifest::{
    discover, parse, parse_contents, parse_with_config, ActiveInstance, DiscoveryReport,
    ManifestError, ManifestResult, PluginInfo, SharedInstance, SharedPluginInfo,
};
pub use value::{Value, ValueType};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
