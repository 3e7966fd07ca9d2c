//! Catalogs Tests
//!
//! End-to-end operations over a copy of the fixture pod.

#[path = "testing/pod.rs"]
mod pod_util;

use pod_catalogs::i18n::{Mo, Serializer};
use pod_catalogs::logging::LogLevel;
use pod_catalogs::providers::{LocalSheetSource, SheetProvider};
use pod_catalogs::{CatalogError, Catalogs, ExtractOptions, Locale, Message};
use pod_util::TestPod;
use std::collections::BTreeMap;
use std::fs;

fn extract(catalogs: &Catalogs, include_obsolete: bool) -> pod_catalogs::Extraction {
    catalogs
        .extract(ExtractOptions {
            include_obsolete: Some(include_obsolete),
            ..Default::default()
        })
        .unwrap()
}

fn extract_localized(catalogs: &Catalogs) -> pod_catalogs::Extraction {
    catalogs
        .extract(ExtractOptions {
            localized: Some(true),
            ..Default::default()
        })
        .unwrap()
}

#[test]
fn should_list_podspec_locales() {
    let pod = TestPod::new();
    let locales: Vec<String> = pod
        .catalogs()
        .list_locales()
        .iter()
        .map(|l| l.to_string())
        .collect();
    assert_eq!(locales, vec!["de", "fr", "en", "it", "ja"]);
}

#[test]
fn should_fail_to_open_a_pod_without_podspec() {
    let dir = tempfile::tempdir().unwrap();
    let fs = std::sync::Arc::new(pod_catalogs::file_system::LocalFileSystem::new(dir.path()));
    assert!(matches!(Catalogs::new(fs), Err(CatalogError::Io { .. })));
}

#[test]
fn should_iterate_existing_catalogs() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();
    let found: Vec<(String, usize)> = catalogs
        .iter()
        .unwrap()
        .map(|c| {
            let c = c.unwrap();
            (c.locale.as_ref().unwrap().to_string(), c.len())
        })
        .collect();
    assert_eq!(found, vec![("de".to_string(), 7), ("fr".to_string(), 14)]);
}

#[test]
fn should_get_catalogs_and_templates() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();

    let de = catalogs.get("de").unwrap();
    assert!(de.exists);
    assert_eq!(de.len(), 7);

    let it = catalogs.get("it").unwrap();
    assert!(!it.exists);
    assert!(it.is_empty());
    assert_eq!(it.locale.map(|l| l.to_string()), Some("it".to_string()));

    let template = catalogs.get_template(None).unwrap();
    assert!(template.exists);
    assert_eq!(template.len(), 1);

    let missing = catalogs.get_template(Some("messages.test.pot")).unwrap();
    assert!(!missing.exists);
    assert_eq!(missing.len(), 0);

    assert!(matches!(catalogs.get("not a locale"), Err(CatalogError::Locale(_))));
}

#[test]
fn should_extract_the_template() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();
    let extraction = extract(&catalogs, false);

    assert_eq!(extraction.template.len(), 30);
    assert_eq!(extraction.files, 15);
    assert_eq!(extraction.written, vec![catalogs.template_path()]);

    let template = catalogs.get_template(None).unwrap();
    assert_eq!(template.len(), 30);
    let pot = pod.read("translations/messages.pot");
    assert!(pot.starts_with("# Translations template for pod.\n"));
    assert!(pot.contains("#: /content/pages/strings.csv:3\nmsgid \"Global string in CSV\"\n"));
    assert!(pot.contains("msgid \"%(num)s new message\"\nmsgid_plural \"%(num)s new messages\"\nmsgstr[0] \"\"\nmsgstr[1] \"\"\n"));
    assert!(pod
        .logger
        .messages(LogLevel::Info)
        .iter()
        .any(|m| m == "Extracting: /views/home.html"));
}

#[test]
fn should_keep_or_drop_obsolete_template_entries() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();
    let mut template = catalogs.get_template(None).unwrap();
    template.insert(Message::new("foo"));
    catalogs.write_template(&template).unwrap();

    let kept = extract(&catalogs, true);
    assert!(kept.template.get("foo").unwrap().is_obsolete());
    assert_eq!(kept.template.live().count(), 30);
    assert!(pod.read("translations/messages.pot").contains("#~ msgid \"foo\"\n"));

    let dropped = extract(&catalogs, false);
    assert!(dropped.template.get("foo").is_none());
    assert!(!pod.read("translations/messages.pot").contains("foo"));
}

#[test]
fn should_extract_localized_catalogs() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();
    let extraction = extract_localized(&catalogs);

    // The template on disk is left alone.
    assert_eq!(catalogs.get_template(None).unwrap().len(), 1);
    assert_eq!(extraction.written.len(), 6);

    let sizes: BTreeMap<String, usize> = ["de", "fr", "en", "it", "ja", "hi_IN"]
        .iter()
        .map(|l| (l.to_string(), catalogs.get(l).unwrap().len()))
        .collect();
    assert_eq!(sizes["de"], 29);
    assert_eq!(sizes["fr"], 26);
    assert_eq!(sizes["it"], 25);
    assert_eq!(sizes["en"], 21);
    assert_eq!(sizes["ja"], 21);
    assert_eq!(sizes["hi_IN"], 12);

    let fr = catalogs.get("fr").unwrap();
    assert!(fr.contains("Tagged localized title."));
    assert!(fr.contains("Blueprint locales"));
    assert!(!fr.contains("Tagged localized body."));
    assert!(!fr.contains("AboutDE"));
    assert!(!fr.contains("Greeting for German readers"));

    let de = catalogs.get("de").unwrap();
    assert!(de.contains("AboutDE"));
    assert!(de.contains("Greeting for German readers"));
    assert!(!de.contains("Tagged localized body."));

    let hi = catalogs.get("hi_IN").unwrap();
    for id in ["Tagged localized title.", "Tagged localized body.", "Hello World!", "Global string in CSV"] {
        assert!(hi.contains(id), "hi_IN is missing {}", id);
    }
    for id in ["Home", "Tagged String", "Pages", "Blueprint locales"] {
        assert!(!hi.contains(id), "hi_IN should not contain {}", id);
    }
    assert_eq!(hi.header.get("Language"), Some("hi_IN"));
}

#[test]
fn should_extract_only_requested_locales() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();
    let extraction = catalogs
        .extract(ExtractOptions {
            localized: Some(true),
            locales: Some(vec!["ja".to_string()]),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(extraction.written, vec![catalogs.catalog_path(&Locale::parse("ja").unwrap())]);
    assert!(!catalogs.get("en").unwrap().exists);
    assert!(pod
        .logger
        .messages(LogLevel::Info)
        .contains(&"ja: 21 untranslated / 21 total".to_string()));
}

#[test]
fn should_preserve_translations_when_merging() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();
    extract_localized(&catalogs);

    let de = catalogs.get("de").unwrap();
    let hello = de.get("Hello World!").unwrap();
    assert_eq!(hello.translation(), Some("Hallo Welt!"));
    assert_eq!(hello.user_comments, vec!["Keep it informal.".to_string()]);
    assert_eq!(
        de.get("DE body content with ünicodé").unwrap().translation(),
        Some("Inhalt mit Ünicodé")
    );
    assert_eq!(de.num_translated(), 4);
    assert_ne!(de.header.get("PO-Revision-Date"), Some("2024-01-02 09:30+0000"));
}

#[test]
fn should_leave_files_untouched_on_repeated_extraction() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();

    extract(&catalogs, false);
    let first = pod.read("translations/messages.pot");
    let again = extract(&catalogs, false);
    assert!(again.written.is_empty());
    assert_eq!(pod.read("translations/messages.pot"), first);

    extract_localized(&catalogs);
    let de = pod.read("translations/de/LC_MESSAGES/messages.po");
    let hi = pod.read("translations/hi_IN/LC_MESSAGES/messages.po");
    let again = extract_localized(&catalogs);
    assert!(again.written.is_empty());
    assert_eq!(pod.read("translations/de/LC_MESSAGES/messages.po"), de);
    assert_eq!(pod.read("translations/hi_IN/LC_MESSAGES/messages.po"), hi);
}

#[test]
fn should_compile_existing_catalogs() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();
    let compiled = catalogs.compile().unwrap();
    let paths: Vec<&str> = compiled.iter().map(|p| p.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/translations/de/LC_MESSAGES/messages.mo",
            "/translations/fr/LC_MESSAGES/messages.mo",
        ]
    );

    let bytes = fs::read(pod.path("translations/de/LC_MESSAGES/messages.mo")).unwrap();
    let mo = Mo::new().load(&bytes, "messages.mo").unwrap();
    assert_eq!(mo.len(), 4);
    assert_eq!(mo.get("Hello World!").unwrap().translation(), Some("Hallo Welt!"));
}

#[test]
fn should_skip_existing_catalogs_on_init() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();
    let before = pod.read("translations/fr/LC_MESSAGES/messages.po");

    let created = catalogs.init(&["fr", "it"]).unwrap();
    let created: Vec<String> = created.iter().map(|l| l.to_string()).collect();
    assert_eq!(created, vec!["it"]);
    assert_eq!(pod.read("translations/fr/LC_MESSAGES/messages.po"), before);
    assert!(pod
        .logger
        .messages(LogLevel::Warn)
        .contains(&"Skipped: /translations/fr/LC_MESSAGES/messages.po already exists".to_string()));

    let it = catalogs.get("it").unwrap();
    assert!(it.exists);
    assert_eq!(it.ids().collect::<Vec<_>>(), vec!["Hello World!"]);
    assert_eq!(it.header.get("POT-Creation-Date"), Some("2024-01-01 00:00+0000"));
}

#[test]
fn should_update_catalogs_from_the_template() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();
    let extraction = extract(&catalogs, false);

    let fr_only = ["fr"];
    let report = catalogs.update(Some(&fr_only[..]), false).unwrap();
    assert!(report.is_success());
    let fr = catalogs.get("fr").unwrap();
    assert_eq!(fr.len(), extraction.template.live().count());
    assert!(fr.contains("Greeting for German readers"));

    let report = catalogs.update::<&str>(None, false).unwrap();
    assert_eq!(report.updated.len(), 5);
    assert_eq!(catalogs.get("de").unwrap().get("Global string").unwrap().translation(), Some("Globale Zeichenkette"));
}

fn add_removed_translation(catalogs: &Catalogs) {
    let mut de = catalogs.get("de").unwrap();
    de.insert(Message::new("Removed source string").with_translation("Entfernter Text"));
    catalogs.write_catalog(&de).unwrap();
}

fn assert_kept_as_obsolete(catalogs: &Catalogs, pod: &TestPod) {
    let de = catalogs.get("de").unwrap();
    let removed = de.get("Removed source string").unwrap();
    assert!(removed.is_obsolete());
    assert_eq!(removed.translation(), Some("Entfernter Text"));
    assert!(pod
        .read("translations/de/LC_MESSAGES/messages.po")
        .contains("#~ msgid \"Removed source string\"\n#~ msgstr \"Entfernter Text\"\n"));
}

#[test]
fn should_keep_vanished_translations_as_obsolete_on_update() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();
    extract(&catalogs, false);
    add_removed_translation(&catalogs);

    let de_only = ["de"];
    assert!(catalogs.update(Some(&de_only[..]), false).unwrap().is_success());
    assert_kept_as_obsolete(&catalogs, &pod);

    assert!(catalogs.update(Some(&de_only[..]), true).unwrap().is_success());
    assert!(!catalogs.get("de").unwrap().contains("Removed source string"));
}

#[test]
fn should_keep_vanished_translations_as_obsolete_on_localized_extraction() {
    let pod = TestPod::new();
    let catalogs = pod.catalogs();
    add_removed_translation(&catalogs);

    extract_localized(&catalogs);
    assert_kept_as_obsolete(&catalogs, &pod);
    assert_eq!(catalogs.get("de").unwrap().live().count(), 29);

    catalogs
        .extract(ExtractOptions {
            localized: Some(true),
            purge_obsolete: true,
            ..Default::default()
        })
        .unwrap();
    let de = catalogs.get("de").unwrap();
    assert!(!de.contains("Removed source string"));
    assert_eq!(de.len(), 29);
}

#[test]
fn should_run_content_providers_before_extraction() {
    let pod = TestPod::new();
    let export = pod.dir.path().join("export.csv");
    fs::write(&export, "key,label@\ncta,Sign up today\n").unwrap();
    let catalogs = pod
        .catalogs()
        .with_provider(Box::new(SheetProvider::new(
            LocalSheetSource::new(export.clone()),
            "/content/pages/sheet.csv",
        )));

    let deposited = catalogs.run_providers().unwrap();
    assert_eq!(deposited.len(), 1);
    let extraction = extract(&catalogs, false);
    assert_eq!(
        extraction.template.get("Sign up today").unwrap().locations[0].to_string(),
        "/content/pages/sheet.csv:2"
    );
}
