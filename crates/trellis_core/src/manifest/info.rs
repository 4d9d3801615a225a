//! Plugin info record.
//!
//! # Responsibility
//! - Hold everything a descriptor declares about one plugin.
//! - Track the runtime flags (`available`, `visible`) and the active instance
//!   attached by a loader.
//!
//! # Invariants
//! - Records are only built by the manifest parser and shared as
//!   `Arc<PluginInfo>`; the last dropped handle releases the active instance.
//! - `module_name`, `name` and `loader` are never empty.
//! - At most one active instance is attached at a time.

use crate::config::DEFAULT_ICON_NAME;
use crate::extension::interface::ExtensionObject;
use crate::value::Value;
use log::debug;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared handle to a parsed record. Cloning is the reference increment,
/// dropping the decrement.
pub type SharedPluginInfo = Arc<PluginInfo>;

/// Instance a loader hands to a record.
pub type ActiveInstance = Box<dyn ExtensionObject>;

/// Attached instance as held by the record and returned on detach.
pub type SharedInstance = Arc<dyn ExtensionObject>;

/// Fields captured from a descriptor, assembled by the parser.
pub(crate) struct PluginInfoFields {
    pub file: PathBuf,
    pub module_name: String,
    pub module_dir: PathBuf,
    pub data_dir: PathBuf,
    pub interface_age: u32,
    pub dependencies: Vec<String>,
    pub loader: String,
    pub name: String,
    pub description: Option<String>,
    pub icon_name: Option<String>,
    pub authors: Vec<String>,
    pub copyright: Option<String>,
    pub website: Option<String>,
    pub version: Option<String>,
    pub keys: BTreeMap<String, Value>,
}

/// Everything known about one plugin.
pub struct PluginInfo {
    fields: PluginInfoFields,
    available: AtomicBool,
    visible: AtomicBool,
    active: Mutex<Option<SharedInstance>>,
}

impl PluginInfo {
    pub(crate) fn from_fields(fields: PluginInfoFields) -> SharedPluginInfo {
        Arc::new(Self {
            fields,
            available: AtomicBool::new(true),
            visible: AtomicBool::new(true),
            active: Mutex::new(None),
        })
    }

    /// Descriptor path the record was parsed from.
    pub fn file(&self) -> &Path {
        &self.fields.file
    }

    pub fn module_name(&self) -> &str {
        &self.fields.module_name
    }

    pub fn module_dir(&self) -> &Path {
        &self.fields.module_dir
    }

    /// Data root joined with the module name.
    pub fn data_dir(&self) -> &Path {
        &self.fields.data_dir
    }

    pub fn interface_age(&self) -> u32 {
        self.fields.interface_age
    }

    pub fn dependencies(&self) -> &[String] {
        &self.fields.dependencies
    }

    pub fn loader(&self) -> &str {
        &self.fields.loader
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.description.as_deref()
    }

    /// Declared icon name, or the default icon when none is declared.
    pub fn icon_name(&self) -> &str {
        self.fields.icon_name.as_deref().unwrap_or(DEFAULT_ICON_NAME)
    }

    /// Like [`icon_name`](Self::icon_name), also falling back to the default
    /// when `has_icon` cannot resolve the declared name.
    pub fn icon_name_resolved(&self, has_icon: impl Fn(&str) -> bool) -> &str {
        match self.fields.icon_name.as_deref() {
            Some(icon) if has_icon(icon) => icon,
            _ => DEFAULT_ICON_NAME,
        }
    }

    pub fn authors(&self) -> &[String] {
        &self.fields.authors
    }

    pub fn copyright(&self) -> Option<&str> {
        self.fields.copyright.as_deref()
    }

    pub fn website(&self) -> Option<&str> {
        self.fields.website.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.fields.version.as_deref()
    }

    /// Descriptor keys outside the recognized set, as `Bool` or `String`.
    pub fn keys(&self) -> &BTreeMap<String, Value> {
        &self.fields.keys
    }

    pub fn key(&self, name: &str) -> Option<&Value> {
        self.fields.keys.get(name)
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Marks whether any loader can activate the plugin.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }

    /// Available and holding an active instance.
    pub fn is_active(&self) -> bool {
        self.is_available() && self.lock_active().is_some()
    }

    /// Active, and the active instance reports a configuration surface.
    pub fn is_configurable(&self) -> bool {
        if !self.is_available() {
            return false;
        }
        self.active_instance()
            .is_some_and(|instance| instance.is_configurable())
    }

    /// Takes ownership of `instance`.
    ///
    /// # Errors
    /// Hands `instance` back when one is already attached; callers must
    /// [`detach_instance`](Self::detach_instance) first.
    pub fn attach_instance(&self, instance: ActiveInstance) -> Result<(), ActiveInstance> {
        let mut active = self.lock_active();
        if active.is_some() {
            return Err(instance);
        }
        debug!(
            "event=instance_attached module=manifest status=ok plugin={} type={}",
            self.fields.module_name,
            instance.type_name()
        );
        *active = Some(Arc::from(instance));
        Ok(())
    }

    /// Releases the record's hold on the active instance, if any.
    pub fn detach_instance(&self) -> Option<SharedInstance> {
        self.lock_active().take()
    }

    /// Runs `f` against the active instance.
    ///
    /// The record is not locked while `f` runs, so `f` may call back into it;
    /// a concurrent detach only takes effect once `f` returns.
    pub fn with_active_instance<R>(&self, f: impl FnOnce(&dyn ExtensionObject) -> R) -> Option<R> {
        self.active_instance().map(|instance| f(instance.as_ref()))
    }

    fn active_instance(&self) -> Option<SharedInstance> {
        self.lock_active().clone()
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<SharedInstance>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PluginInfo {
    fn drop(&mut self) {
        let had_instance = self
            .active
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        debug!(
            "event=plugin_info_released module=manifest status=ok plugin={} released_instance={}",
            self.fields.module_name, had_instance
        );
    }
}

impl Debug for PluginInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginInfo")
            .field("file", &self.fields.file)
            .field("module_name", &self.fields.module_name)
            .field("loader", &self.fields.loader)
            .field("interface_age", &self.fields.interface_age)
            .field("available", &self.is_available())
            .field("visible", &self.is_visible())
            .finish_non_exhaustive()
    }
}
