//! Loader seam.
//!
//! Loaders turn a record's module identity into live instances for one
//! implementation technology. This crate only defines the contract and the
//! glue that wraps what a loader returns in an [`ExtensionProxy`].

use crate::extension::interface::{ExtensionObject, InterfaceInfo};
use crate::extension::marshal::{collect_parameters, Parameter};
use crate::extension::proxy::ExtensionProxy;
use crate::extension::registry::ProxyKind;
use crate::extension::ExtensionResult;
use crate::manifest::PluginInfo;
use crate::value::Value;
use log::warn;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    #[error("plugin {0} is not available")]
    Unavailable(String),
    #[error("plugin {plugin} uses loader `{expected}`, not `{actual}`")]
    WrongLoader {
        plugin: String,
        expected: String,
        actual: String,
    },
    #[error("plugin {plugin} provides no implementation of {interface}")]
    NotProvided { plugin: String, interface: String },
    #[error("loader failed for plugin {plugin}: {reason}")]
    Failed { plugin: String, reason: String },
}

/// One implementation technology's instance factory.
pub trait ExtensionLoader: Send + Sync {
    /// Identifier matched against [`PluginInfo::loader`].
    fn id(&self) -> &str;

    /// Proxy kind used to wrap this loader's instances.
    fn proxy_kind(&self) -> &'static dyn ProxyKind;

    /// Creates an instance of `info`'s module implementing `interface`,
    /// constructed with `params`.
    fn instantiate(
        &self,
        info: &PluginInfo,
        interface: &'static InterfaceInfo,
        params: &[Parameter],
    ) -> Result<Box<dyn ExtensionObject>, LoaderError>;
}

/// Marshals `pairs`, asks `loader` for an instance and wraps it.
///
/// The record's availability flag is left untouched; deciding what a failure
/// means for the plugin is the caller's job.
pub fn create_extension<'a, I>(
    loader: &dyn ExtensionLoader,
    info: &PluginInfo,
    interface: &'static InterfaceInfo,
    pairs: I,
) -> ExtensionResult<ExtensionProxy>
where
    I: IntoIterator<Item = (&'a str, Value)>,
{
    if !info.is_available() {
        return Err(LoaderError::Unavailable(info.module_name().to_string()).into());
    }
    if loader.id() != info.loader() {
        return Err(LoaderError::WrongLoader {
            plugin: info.module_name().to_string(),
            expected: info.loader().to_string(),
            actual: loader.id().to_string(),
        }
        .into());
    }

    let params = collect_parameters(interface, pairs)?;
    let instance = loader
        .instantiate(info, interface, &params)
        .inspect_err(|err| {
            warn!(
                "event=extension_create module=extension status=error plugin={} interface={} reason={}",
                info.module_name(),
                interface.name(),
                err
            );
        })?;
    ExtensionProxy::create_with_kind(loader.proxy_kind(), interface, instance)
}
