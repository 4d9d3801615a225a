use std::path::{Path, PathBuf};
use trellis_core::{
    parse, parse_contents, parse_with_config, ManifestConfig, ManifestError, Value,
    DEFAULT_ICON_NAME,
};

const MODULE_DIR: &str = "/usr/lib/gedit/plugins";
const DATA_DIR: &str = "/usr/share/gedit/plugins";

fn config() -> ManifestConfig {
    ManifestConfig::new("Gedit", MODULE_DIR, DATA_DIR).with_locales(Vec::<String>::new())
}

fn write_descriptor(dir: &Path, file_name: &str, body: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, body).expect("write descriptor");
    path
}

fn parse_body(body: &str) -> Result<trellis_core::SharedPluginInfo, ManifestError> {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_descriptor(dir.path(), "sample.plugin", body);
    parse_with_config(&path, &config())
}

#[test]
fn parses_sample_descriptor_end_to_end() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_descriptor(
        dir.path(),
        "sample.plugin",
        "[Gedit Plugin]\nIAge=1\nModule=sample\nName=Sample Plugin\nLoader=c\nExperimental=true\n",
    );

    let info = parse_with_config(&path, &config()).expect("sample descriptor parses");

    assert_eq!(info.interface_age(), 1);
    assert_eq!(info.module_name(), "sample");
    assert_eq!(info.name(), "Sample Plugin");
    assert_eq!(info.loader(), "c");
    assert!(info.dependencies().is_empty());
    assert_eq!(info.keys().len(), 1);
    assert_eq!(info.key("Experimental"), Some(&Value::Bool(true)));
    assert!(info.is_available());
    assert!(info.is_visible());
    assert!(!info.is_active());
    assert_eq!(info.file(), path.as_path());
    assert_eq!(info.module_dir(), Path::new(MODULE_DIR));
    assert_eq!(info.data_dir(), Path::new(DATA_DIR).join("sample").as_path());
}

#[test]
fn clamps_negative_interface_age_to_zero() {
    let info = parse_body("[Gedit Plugin]\nIAge=-5\nModule=m\nName=N\n").expect("parses");
    assert_eq!(info.interface_age(), 0);

    let info = parse_body("[Gedit Plugin]\nIAge=3\nModule=m\nName=N\n").expect("parses");
    assert_eq!(info.interface_age(), 3);
}

#[test]
fn unparsable_interface_age_reads_as_zero() {
    let info = parse_body("[Gedit Plugin]\nIAge=two\nModule=m\nName=N\n")
        .expect("present IAge is enough");
    assert_eq!(info.interface_age(), 0);
}

#[test]
fn defaults_loader_when_absent_or_empty() {
    let info = parse_body("[Gedit Plugin]\nIAge=1\nModule=m\nName=N\n").expect("parses");
    assert_eq!(info.loader(), "c");

    let info = parse_body("[Gedit Plugin]\nIAge=1\nModule=m\nName=N\nLoader=\n").expect("parses");
    assert_eq!(info.loader(), "c");

    let info =
        parse_body("[Gedit Plugin]\nIAge=1\nModule=m\nName=N\nLoader=python3\n").expect("parses");
    assert_eq!(info.loader(), "python3");
}

#[test]
fn reads_optional_presentation_fields() {
    let info = parse_body(
        "[Gedit Plugin]
IAge=2
Module=spell
Depends=text;search;
Name=Spell Checker
Description=Checks the spelling of the current document.
Icon=gtk-spell-check
Authors=Paolo Maggi;Steve Frécinaux
Copyright=Copyright © 2002-2005 Paolo Maggi
Website=http://example.org/spell
Version=2.30.0
",
    )
    .expect("full descriptor parses");

    assert_eq!(info.dependencies(), ["text", "search"]);
    assert_eq!(
        info.description(),
        Some("Checks the spelling of the current document.")
    );
    assert_eq!(info.icon_name(), "gtk-spell-check");
    assert_eq!(info.authors(), ["Paolo Maggi", "Steve Frécinaux"]);
    assert_eq!(info.copyright(), Some("Copyright © 2002-2005 Paolo Maggi"));
    assert_eq!(info.website(), Some("http://example.org/spell"));
    assert_eq!(info.version(), Some("2.30.0"));
    assert!(info.keys().is_empty());
}

#[test]
fn leaves_optional_fields_unset_when_absent() {
    let info = parse_body("[Gedit Plugin]\nIAge=1\nModule=m\nName=N\n").expect("parses");
    assert_eq!(info.description(), None);
    assert_eq!(info.icon_name(), DEFAULT_ICON_NAME);
    assert!(info.authors().is_empty());
    assert_eq!(info.copyright(), None);
    assert_eq!(info.website(), None);
    assert_eq!(info.version(), None);
}

#[test]
fn collects_unrecognized_keys_as_bool_or_string() {
    let info = parse_body(
        "[Gedit Plugin]\nIAge=1\nModule=m\nName=N\nFoo=true\nBar=hello\nOff=false\nBroken=bad\\qescape\n",
    )
    .expect("parses");

    assert_eq!(info.key("Foo"), Some(&Value::Bool(true)));
    assert_eq!(info.key("Bar"), Some(&Value::String("hello".to_string())));
    assert_eq!(info.key("Off"), Some(&Value::Bool(false)));
    assert_eq!(info.key("Broken"), None);
    assert!(info.key("Name").is_none());
}

#[test]
fn translations_of_name_and_description_stay_out_of_side_table() {
    let source = "[Gedit Plugin]
IAge=1
Module=m
Name=Sample
Name[fr]=Exemple
Description=Plain
Description[fr]=Simple
Icon[fr]=icone
";
    let french = config().with_locales(["fr_FR", "fr"]);
    let info = parse_contents(source, Path::new("m.plugin"), &french).expect("parses");

    assert_eq!(info.name(), "Exemple");
    assert_eq!(info.description(), Some("Simple"));
    assert!(info.key("Name[fr]").is_none());
    assert!(info.key("Description[fr]").is_none());
    assert_eq!(info.key("Icon[fr]"), Some(&Value::String("icone".to_string())));
}

#[test]
fn falls_back_to_untranslated_name() {
    let source = "[Gedit Plugin]\nIAge=1\nModule=m\nName=Sample\nName[fr]=Exemple\n";
    let german = config().with_locales(["de_DE", "de"]);
    let info = parse_contents(source, Path::new("m.plugin"), &german).expect("parses");
    assert_eq!(info.name(), "Sample");
}

#[test]
fn fails_without_interface_age() {
    let err = parse_body("[Gedit Plugin]\nModule=m\nName=N\n").expect_err("IAge required");
    assert_eq!(err.missing_field(), Some("IAge"));
}

#[test]
fn descriptor_for_another_app_reads_as_missing_interface_age() {
    let err = parse_body("[Rhythmbox Plugin]\nIAge=1\nModule=m\nName=N\n")
        .expect_err("wrong section");
    assert_eq!(err.missing_field(), Some("IAge"));
}

#[test]
fn fails_without_module_or_with_empty_module() {
    let err = parse_body("[Gedit Plugin]\nIAge=1\nName=N\n").expect_err("Module required");
    assert_eq!(err.missing_field(), Some("Module"));

    let err = parse_body("[Gedit Plugin]\nIAge=1\nModule=\nName=N\n").expect_err("empty Module");
    assert_eq!(err.missing_field(), Some("Module"));
}

#[test]
fn fails_without_name() {
    let err = parse_body("[Gedit Plugin]\nIAge=1\nModule=m\nDescription=D\n")
        .expect_err("Name required");
    assert!(matches!(
        err,
        ManifestError::MissingField { field: "Name", .. }
    ));
}

#[test]
fn fails_with_empty_name() {
    let err = parse_body("[Gedit Plugin]\nIAge=1\nModule=m\nName=\n")
        .expect_err("empty Name rejected");
    assert_eq!(err.missing_field(), Some("Name"));
}

#[test]
fn fails_when_matching_translation_is_empty() {
    let config = config().with_locales(["fr"]);
    let err = parse_contents(
        "[Gedit Plugin]\nIAge=1\nModule=m\nName=Sample\nName[fr]=\n",
        Path::new("m.plugin"),
        &config,
    )
    .expect_err("empty translated Name rejected");
    assert_eq!(err.missing_field(), Some("Name"));
}

#[test]
fn rejects_malformed_group_file() {
    let err = parse_body("this is not a descriptor\n").expect_err("garbage must fail");
    assert!(matches!(err, ManifestError::Malformed { .. }));
    assert!(err.to_string().contains("line 1"));
}

#[test]
fn rejects_unreadable_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = parse_with_config(dir.path().join("missing.plugin"), &config())
        .expect_err("missing file must fail");
    assert!(matches!(err, ManifestError::Malformed { .. }));
}

#[test]
fn rejects_empty_arguments() {
    let err = parse_with_config("", &config()).expect_err("empty path");
    assert!(matches!(err, ManifestError::InvalidArgument(_)));

    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_descriptor(dir.path(), "m.plugin", "[ Plugin]\nIAge=1\nModule=m\nName=N\n");
    let err = parse(&path, "", MODULE_DIR, DATA_DIR).expect_err("empty app name");
    assert!(matches!(err, ManifestError::InvalidArgument(_)));
}

#[test]
fn repeated_failures_report_the_same_error() {
    for _ in 0..50 {
        let err = parse_body("[Gedit Plugin]\nIAge=1\nName=N\n").expect_err("must fail");
        assert_eq!(err.missing_field(), Some("Module"));
    }
}

#[test]
fn parse_uses_application_section() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_descriptor(
        dir.path(),
        "m.plugin",
        "[Totem Plugin]\nIAge=1\nModule=m\nName=Movie Helper\n",
    );
    let info = parse(&path, "Totem", MODULE_DIR, DATA_DIR).expect("parses");
    assert_eq!(info.module_name(), "m");
}
