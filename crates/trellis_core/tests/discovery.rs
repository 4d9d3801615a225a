use std::path::Path;
use trellis_core::{discover, ManifestError, SearchPath};

fn write(dir: &Path, file_name: &str, body: &str) {
    std::fs::write(dir.join(file_name), body).expect("write descriptor");
}

fn descriptor(module: &str) -> String {
    format!("[Gedit Plugin]\nIAge=2\nModule={module}\nName={module} plugin\n")
}

#[test]
fn scans_search_paths_and_reports_failures_individually() {
    let user_modules = tempfile::tempdir().expect("user modules");
    let system_modules = tempfile::tempdir().expect("system modules");

    write(user_modules.path(), "b-spell.plugin", &descriptor("spell"));
    write(user_modules.path(), "a-broken.plugin", "[Gedit Plugin]\nIAge=1\nName=No module\n");
    write(user_modules.path(), "notes.txt", "not a descriptor");
    write(system_modules.path(), "spell.plugin", &descriptor("spell"));
    write(system_modules.path(), "taglist.plugin", &descriptor("taglist"));

    let search_paths = vec![
        SearchPath::new(user_modules.path(), "/home/user/.local/share/gedit"),
        SearchPath::new(system_modules.path(), "/usr/share/gedit"),
    ];
    let report = discover(&search_paths, "Gedit", &[]);

    let names: Vec<&str> = report
        .plugins
        .iter()
        .map(|info| info.module_name())
        .collect();
    assert_eq!(names, vec!["spell", "taglist"]);

    let spell = report.find("spell").expect("spell discovered");
    assert_eq!(spell.module_dir(), user_modules.path());
    assert_eq!(
        spell.data_dir(),
        Path::new("/home/user/.local/share/gedit/spell")
    );

    assert_eq!(report.failures.len(), 1);
    let (path, err) = &report.failures[0];
    assert!(path.ends_with("a-broken.plugin"));
    assert!(matches!(err, ManifestError::MissingField { field: "Module", .. }));
}

#[test]
fn skips_missing_directories() {
    let modules = tempfile::tempdir().expect("modules");
    write(modules.path(), "one.plugin", &descriptor("one"));

    let search_paths = vec![
        SearchPath::new(modules.path().join("does-not-exist"), "/data"),
        SearchPath::new(modules.path(), "/data"),
    ];
    let report = discover(&search_paths, "Gedit", &[]);

    assert_eq!(report.plugins.len(), 1);
    assert!(report.failures.is_empty());
}

#[test]
fn applies_locale_preferences() {
    let modules = tempfile::tempdir().expect("modules");
    write(
        modules.path(),
        "loc.plugin",
        "[Gedit Plugin]\nIAge=1\nModule=loc\nName=Sorter\nName[es]=Ordenador\n",
    );

    let report = discover(
        &[SearchPath::new(modules.path(), "/data")],
        "Gedit",
        &["es".to_string()],
    );
    assert_eq!(report.find("loc").expect("loc discovered").name(), "Ordenador");
}
