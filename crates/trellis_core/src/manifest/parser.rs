//! Descriptor parser.
//!
//! Turns one `"<App> Plugin"` section into a [`PluginInfo`] record. Only
//! `IAge`, `Module` and `Name` are mandatory; every other recognized key is
//! optional, and unrecognized keys land in the record's side-table.

use crate::config::{ManifestConfig, DEFAULT_LOADER};
use crate::manifest::info::{PluginInfo, PluginInfoFields, SharedPluginInfo};
use crate::manifest::keyfile::{split_localized_key, KeyFile};
use crate::manifest::{ManifestError, ManifestResult};
use crate::value::Value;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::Path;

pub const KEY_IAGE: &str = "IAge";
pub const KEY_MODULE: &str = "Module";
pub const KEY_DEPENDS: &str = "Depends";
pub const KEY_LOADER: &str = "Loader";
pub const KEY_NAME: &str = "Name";
pub const KEY_DESCRIPTION: &str = "Description";
pub const KEY_ICON: &str = "Icon";
pub const KEY_AUTHORS: &str = "Authors";
pub const KEY_COPYRIGHT: &str = "Copyright";
pub const KEY_WEBSITE: &str = "Website";
pub const KEY_VERSION: &str = "Version";

const RECOGNIZED_KEYS: &[&str] = &[
    KEY_IAGE,
    KEY_MODULE,
    KEY_DEPENDS,
    KEY_LOADER,
    KEY_NAME,
    KEY_DESCRIPTION,
    KEY_ICON,
    KEY_AUTHORS,
    KEY_COPYRIGHT,
    KEY_WEBSITE,
    KEY_VERSION,
];

// Only these keys have their translations excluded from the side-table.
const LOCALIZED_RECOGNIZED_KEYS: &[&str] = &[KEY_NAME, KEY_DESCRIPTION];

/// Whether `key` is consumed by a typed record field.
pub fn is_recognized_key(key: &str) -> bool {
    if RECOGNIZED_KEYS.contains(&key) {
        return true;
    }
    matches!(
        split_localized_key(key),
        Some((base, _)) if LOCALIZED_RECOGNIZED_KEYS.contains(&base)
    )
}

/// Parses the descriptor at `file` for application `app_name`.
///
/// Locale-aware keys are resolved against the process environment.
pub fn parse(
    file: impl AsRef<Path>,
    app_name: &str,
    module_dir: impl AsRef<Path>,
    data_dir: impl AsRef<Path>,
) -> ManifestResult<SharedPluginInfo> {
    let config = ManifestConfig::new(app_name, module_dir.as_ref(), data_dir.as_ref());
    parse_with_config(file, &config)
}

/// Parses the descriptor at `file` using `config`.
///
/// # Errors
/// - `InvalidArgument` for an empty path or application name.
/// - `Malformed` when the file cannot be read or is not a group file.
/// - `MissingField` when `IAge`, `Module` or `Name` is absent.
pub fn parse_with_config(
    file: impl AsRef<Path>,
    config: &ManifestConfig,
) -> ManifestResult<SharedPluginInfo> {
    let file = file.as_ref();
    if file.as_os_str().is_empty() {
        return Err(ManifestError::InvalidArgument("file path must not be empty"));
    }
    let source = std::fs::read_to_string(file).map_err(|err| {
        warn!(
            "event=manifest_parse module=manifest status=error file={} reason=unreadable",
            file.display()
        );
        ManifestError::Malformed {
            path: file.to_path_buf(),
            reason: err.to_string(),
        }
    })?;
    parse_contents(&source, file, config)
}

/// Parses descriptor text already in memory; `file` is recorded verbatim.
pub fn parse_contents(
    source: &str,
    file: &Path,
    config: &ManifestConfig,
) -> ManifestResult<SharedPluginInfo> {
    if config.app_name.trim().is_empty() {
        return Err(ManifestError::InvalidArgument(
            "application name must not be empty",
        ));
    }

    let result = build_fields(source, file, config);
    match &result {
        Ok(fields) => debug!(
            "event=manifest_parse module=manifest status=ok file={} plugin={} loader={}",
            file.display(),
            fields.module_name,
            fields.loader
        ),
        Err(err) => warn!(
            "event=manifest_parse module=manifest status=error file={} reason={}",
            file.display(),
            err
        ),
    }
    result.map(PluginInfo::from_fields)
}

fn build_fields(
    source: &str,
    file: &Path,
    config: &ManifestConfig,
) -> ManifestResult<PluginInfoFields> {
    let keyfile = KeyFile::parse(source).map_err(|err| ManifestError::Malformed {
        path: file.to_path_buf(),
        reason: err.to_string(),
    })?;
    let section = config.section_header();
    let missing = |field: &'static str| ManifestError::MissingField {
        path: file.to_path_buf(),
        field,
    };

    // Presence of IAge is what marks the file as a descriptor for this app.
    if !keyfile.has_key(&section, KEY_IAGE) {
        return Err(missing(KEY_IAGE));
    }
    let interface_age = keyfile
        .integer(&section, KEY_IAGE)
        .map(|age| u32::try_from(age.max(0)).unwrap_or(u32::MAX))
        .unwrap_or(0);

    let module_name = keyfile
        .string(&section, KEY_MODULE)
        .filter(|module| !module.is_empty())
        .ok_or_else(|| missing(KEY_MODULE))?;

    let dependencies = keyfile
        .string_list(&section, KEY_DEPENDS)
        .unwrap_or_default();

    let loader = keyfile
        .string(&section, KEY_LOADER)
        .filter(|loader| !loader.is_empty())
        .unwrap_or_else(|| DEFAULT_LOADER.to_string());

    let name = keyfile
        .locale_string(&section, KEY_NAME, &config.locales)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| missing(KEY_NAME))?;

    let description = keyfile.locale_string(&section, KEY_DESCRIPTION, &config.locales);
    let icon_name = keyfile.locale_string(&section, KEY_ICON, &config.locales);
    let authors = keyfile
        .string_list(&section, KEY_AUTHORS)
        .unwrap_or_default();
    let copyright = keyfile.string(&section, KEY_COPYRIGHT);
    let website = keyfile.string(&section, KEY_WEBSITE);
    let version = keyfile.string(&section, KEY_VERSION);

    let keys = extra_keys(&keyfile, &section);

    Ok(PluginInfoFields {
        file: file.to_path_buf(),
        data_dir: config.data_dir.join(&module_name),
        module_dir: config.module_dir.clone(),
        module_name,
        interface_age,
        dependencies,
        loader,
        name,
        description,
        icon_name,
        authors,
        copyright,
        website,
        version,
        keys,
    })
}

/// Collects unrecognized keys, reading each as a boolean first and as a
/// string second. Keys readable as neither are dropped.
fn extra_keys(keyfile: &KeyFile, section: &str) -> BTreeMap<String, Value> {
    let mut keys = BTreeMap::new();
    for key in keyfile.keys(section) {
        if is_recognized_key(key) {
            continue;
        }
        let value = match keyfile.boolean(section, key) {
            Some(flag) => Value::Bool(flag),
            None => match keyfile.string(section, key) {
                Some(text) => Value::String(text),
                None => {
                    debug!(
                        "event=manifest_extra_key module=manifest status=skip key={} reason=unreadable",
                        key
                    );
                    continue;
                }
            },
        };
        keys.insert(key.to_string(), value);
    }
    keys
}
