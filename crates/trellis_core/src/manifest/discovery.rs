//! Descriptor discovery across search paths.

use crate::config::{ManifestConfig, SearchPath, PLUGIN_FILE_EXTENSION};
use crate::manifest::info::SharedPluginInfo;
use crate::manifest::parser::parse_with_config;
use crate::manifest::ManifestError;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Outcome of scanning all search paths.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Parsed records, in search path order then file name order.
    pub plugins: Vec<SharedPluginInfo>,
    /// Descriptors that failed to parse, with their error.
    pub failures: Vec<(PathBuf, ManifestError)>,
}

impl DiscoveryReport {
    pub fn find(&self, module_name: &str) -> Option<&SharedPluginInfo> {
        self.plugins
            .iter()
            .find(|info| info.module_name() == module_name)
    }
}

/// Parses every `*.plugin` file directly inside each search path's module
/// directory.
///
/// A module name seen twice keeps its first record; later duplicates are
/// skipped with a warning.
pub fn discover(search_paths: &[SearchPath], app_name: &str, locales: &[String]) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();
    let mut seen = BTreeSet::new();

    for search_path in search_paths {
        let config = ManifestConfig::new(
            app_name,
            search_path.module_dir.clone(),
            search_path.data_dir.clone(),
        )
        .with_locales(locales.iter().cloned());

        let files = match descriptor_files(&search_path.module_dir) {
            Ok(files) => files,
            Err(err) => {
                debug!(
                    "event=manifest_discovery module=manifest status=skip dir={} reason={}",
                    search_path.module_dir.display(),
                    err
                );
                continue;
            }
        };

        for file in files {
            match parse_with_config(&file, &config) {
                Ok(info) => {
                    if !seen.insert(info.module_name().to_string()) {
                        warn!(
                            "event=manifest_discovery module=manifest status=skip file={} plugin={} reason=duplicate_module",
                            file.display(),
                            info.module_name()
                        );
                        continue;
                    }
                    report.plugins.push(info);
                }
                Err(err) => report.failures.push((file, err)),
            }
        }
    }

    info!(
        "event=manifest_discovery module=manifest status=ok plugins={} failures={}",
        report.plugins.len(),
        report.failures.len()
    );
    report
}

fn descriptor_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_descriptor = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == PLUGIN_FILE_EXTENSION);
        if is_descriptor {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
