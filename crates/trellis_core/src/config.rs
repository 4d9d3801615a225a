//! Manifest parsing configuration.
//!
//! # Responsibility
//! - Carry the per-application inputs of descriptor parsing: application
//!   name, module/data directory roots and the locale preference list.
//! - Derive the locale preference list from the process environment.
//!
//! # Invariants
//! - `locales` always ends with `"C"`, so an untranslated key is reachable.
//! - The descriptor section header is always `"<app_name> Plugin"`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Loader identifier used when a descriptor names none.
pub const DEFAULT_LOADER: &str = "c";
/// Icon name reported when a plugin ships no usable icon.
pub const DEFAULT_ICON_NAME: &str = "trellis-plugin";
/// File extension of plugin descriptors on disk.
pub const PLUGIN_FILE_EXTENSION: &str = "plugin";

const C_LOCALE: &str = "C";
const LOCALE_ENV_VARS: &[&str] = &["LANGUAGE", "LC_ALL", "LC_MESSAGES", "LANG"];

/// Inputs shared by every descriptor parsed for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Application name; selects the `"<app_name> Plugin"` section.
    pub app_name: String,
    /// Directory holding plugin modules, copied verbatim into records.
    pub module_dir: PathBuf,
    /// Root of per-plugin data directories.
    pub data_dir: PathBuf,
    /// Locale preference list, most specific first.
    #[serde(default = "environment_locales")]
    pub locales: Vec<String>,
}

impl ManifestConfig {
    /// Creates a config whose locale list comes from the environment.
    pub fn new(
        app_name: impl Into<String>,
        module_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            module_dir: module_dir.into(),
            data_dir: data_dir.into(),
            locales: environment_locales(),
        }
    }

    /// Replaces the locale list. `"C"` is appended when missing.
    pub fn with_locales<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = locales.into_iter().map(Into::into).collect();
        if !list.iter().any(|locale| locale == C_LOCALE) {
            list.push(C_LOCALE.to_string());
        }
        self.locales = list;
        self
    }

    pub fn section_header(&self) -> String {
        section_header(&self.app_name)
    }
}

/// One (module directory, data directory) pair scanned during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPath {
    pub module_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl SearchPath {
    pub fn new(module_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            module_dir: module_dir.into(),
            data_dir: data_dir.into(),
        }
    }
}

/// Returns the descriptor section header for `app_name`.
pub fn section_header(app_name: &str) -> String {
    format!("{app_name} Plugin")
}

/// Locale preference list derived from `LANGUAGE`, `LC_ALL`, `LC_MESSAGES`
/// and `LANG`, in that order of precedence.
pub fn environment_locales() -> Vec<String> {
    let raw = LOCALE_ENV_VARS.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .filter(|value| !value.trim().is_empty())
    });
    locales_from_value(raw.as_deref().unwrap_or(C_LOCALE))
}

/// Expands a colon separated locale value into its preference list.
pub fn locales_from_value(value: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for locale in value.split(':').map(str::trim).filter(|v| !v.is_empty()) {
        for variant in locale_variants(locale) {
            if !out.contains(&variant) {
                out.push(variant);
            }
        }
    }
    if !out.iter().any(|locale| locale == C_LOCALE) {
        out.push(C_LOCALE.to_string());
    }
    out
}

const COMPONENT_CODESET: u8 = 1 << 0;
const COMPONENT_TERRITORY: u8 = 1 << 1;
const COMPONENT_MODIFIER: u8 = 1 << 2;

/// Expands `ll_CC.codeset@modifier` into its variants, most specific first.
pub fn locale_variants(locale: &str) -> Vec<String> {
    let (rest, modifier) = split_component(locale, '@');
    let (rest, codeset) = split_component(rest, '.');
    let (language, territory) = split_component(rest, '_');

    let mut mask = 0u8;
    if territory.is_some() {
        mask |= COMPONENT_TERRITORY;
    }
    if codeset.is_some() {
        mask |= COMPONENT_CODESET;
    }
    if modifier.is_some() {
        mask |= COMPONENT_MODIFIER;
    }

    (0..=mask)
        .map(|step| mask - step)
        .filter(|bits| bits & !mask == 0)
        .map(|bits| {
            let mut variant = language.to_string();
            if let (true, Some(territory)) = (bits & COMPONENT_TERRITORY != 0, territory) {
                variant.push('_');
                variant.push_str(territory);
            }
            if let (true, Some(codeset)) = (bits & COMPONENT_CODESET != 0, codeset) {
                variant.push('.');
                variant.push_str(codeset);
            }
            if let (true, Some(modifier)) = (bits & COMPONENT_MODIFIER != 0, modifier) {
                variant.push('@');
                variant.push_str(modifier);
            }
            variant
        })
        .collect()
}

fn split_component(value: &str, separator: char) -> (&str, Option<&str>) {
    match value.split_once(separator) {
        Some((head, tail)) => (head, Some(tail)),
        None => (value, None),
    }
}
