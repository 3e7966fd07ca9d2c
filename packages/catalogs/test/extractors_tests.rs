//! Extractor Tests
//!
//! The full extraction pipeline over the fixture pod: which messages are
//! found, where, and for which locales.

#[path = "testing/pod.rs"]
mod pod_util;

use pod_catalogs::config::Podspec;
use pod_catalogs::file_system::MockFileSystem;
use pod_catalogs::i18n::{ExtractionOutput, ExtractionPipeline, Location, MessageBundle};
use pod_catalogs::logging::{CapturingLogger, LogLevel, NullLogger};
use pod_catalogs::Message;
use pod_util::TestPod;
use std::sync::atomic::AtomicBool;

fn extract_fixture() -> ExtractionOutput {
    let pod = TestPod::new();
    let podspec = Podspec::load(pod.fs.as_ref()).unwrap();
    let cancelled = AtomicBool::new(false);
    ExtractionPipeline::new(pod.fs.as_ref(), &podspec, &NullLogger::new(), &cancelled)
        .run()
        .unwrap()
}

fn locales_of(bundle: &MessageBundle, id: &str) -> Vec<String> {
    let message: &Message = bundle.get(id).unwrap_or_else(|| panic!("{} not extracted", id));
    message.locales.iter().map(|l| l.to_string()).collect()
}

#[test]
fn should_extract_every_tagged_string_once() {
    let output = extract_fixture();
    let bundle = &output.bundle;
    assert_eq!(bundle.len(), 30);
    assert_eq!(output.files, 15);
    for id in [
        "Hello World!",
        "Hello World 2!",
        "Tagged String",
        "Tagged String in List 1",
        "Tagged String in List 2",
        "Tagged localized title.",
        "Tagged localized body.",
        "Tagged field in podspec",
        "string content tagged",
        "standalone string content tagged",
        "General body content",
        "DE body content with ünicodé",
        "Global string",
        "Global string in HTML",
        "Global string in CSV",
        "CSV with blueprint locales",
        "Body content for blueprint locales",
        "YAML content for blueprint locales",
    ] {
        assert!(bundle.get(id).is_some(), "{} not extracted", id);
    }
    for id in ["Untagged String", "Untagged field in podspec", "string content untagged"] {
        assert!(bundle.get(id).is_none(), "{} should not be extracted", id);
    }
}

#[test]
fn should_follow_scan_order() {
    let output = extract_fixture();
    let ids: Vec<&str> = output.bundle.get_messages().map(|m| m.id.as_str()).collect();
    assert_eq!(ids[0], "Tagged field in podspec");
    assert_eq!(ids[1], "Blueprint locales");
    assert_eq!(ids.last(), Some(&"Greeting for German readers"));
}

#[test]
fn should_merge_locations_of_repeated_messages() {
    let output = extract_fixture();
    let tagged = output.bundle.get("Tagged String").unwrap();
    let paths: Vec<String> = tagged.locations.iter().map(|l| l.to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "/content/pages/home.yaml",
            "/content/pages/yaml_test.html",
            "/content/pages/yaml_test.yaml",
        ]
    );

    let hello = output.bundle.get("Hello World!").unwrap();
    assert_eq!(
        hello.locations,
        vec![
            Location::new("/views/base.html", Some(1)),
            Location::new("/views/home.html", Some(2)),
        ]
    );
    assert_eq!(hello.auto_comments, vec!["Main greeting.".to_string()]);
}

#[test]
fn should_record_lines_for_bodies_and_rows() {
    let output = extract_fixture();
    let line = |id: &str| output.bundle.get(id).unwrap().locations[0].clone();
    assert_eq!(line("DE body content with ünicodé"), Location::new("/content/pages/about.html", Some(9)));
    assert_eq!(line("Global string in HTML"), Location::new("/content/pages/yaml_test.html", Some(5)));
    assert_eq!(line("Global string in CSV"), Location::new("/content/pages/strings.csv", Some(3)));
    assert_eq!(line("Body content for blueprint locales"), Location::new("/content/blueprint_locales/page.md", Some(5)));
}

#[test]
fn should_read_plurals_and_comment_keys() {
    let output = extract_fixture();
    let plural = output.bundle.get("%(num)s new message").unwrap();
    assert_eq!(plural.plural.as_deref(), Some("%(num)s new messages"));

    let caption = output.bundle.get("Hero caption").unwrap();
    assert_eq!(caption.auto_comments, vec!["Shown under the hero image.".to_string()]);
}

#[test]
fn should_scope_global_content_to_every_declared_locale() {
    let output = extract_fixture();
    let all = vec!["de", "fr", "en", "it", "ja", "hi_IN"];
    let global: Vec<String> = output.resolver.global().iter().map(|l| l.to_string()).collect();
    assert_eq!(global, all);

    for id in [
        "Tagged field in podspec",
        "string content tagged",
        "Global string in CSV",
        "CSV with blueprint locales",
        "standalone string content tagged",
        "Global string",
        "Copyright notice",
    ] {
        assert_eq!(locales_of(&output.bundle, id), all, "scope of {}", id);
    }
}

#[test]
fn should_scope_documents_narrowly() {
    let output = extract_fixture();
    let bundle = &output.bundle;
    assert_eq!(locales_of(bundle, "Home"), vec!["de", "fr", "en", "it", "ja"]);
    assert_eq!(locales_of(bundle, "Global string in HTML"), vec!["de", "fr", "en", "it", "ja"]);
    assert_eq!(locales_of(bundle, "Tagged localized title."), vec!["hi_IN", "fr", "de"]);
    assert_eq!(locales_of(bundle, "Tagged localized body."), vec!["hi_IN"]);
    assert_eq!(locales_of(bundle, "AboutDE"), vec!["de"]);
    assert_eq!(locales_of(bundle, "DE body content with ünicodé"), vec!["de"]);
    assert_eq!(locales_of(bundle, "General body content"), vec!["de", "fr", "en", "it", "ja"]);
    assert_eq!(locales_of(bundle, "Greeting for German readers"), vec!["de"]);
    assert_eq!(locales_of(bundle, "Blueprint locales"), vec!["de", "fr", "it"]);
    assert_eq!(locales_of(bundle, "YAML content for blueprint locales"), vec!["de", "fr", "it"]);
    assert_eq!(locales_of(bundle, "Body content for blueprint locales"), vec!["de", "fr", "it"]);
}

#[test]
fn should_warn_and_continue_on_malformed_sources() {
    let fs = MockFileSystem::new();
    fs.init_with_files(&[
        ("/podspec.yaml", "localization:\n  locales: [de]\n"),
        ("/content/pages/broken.yaml", "title@: [unclosed\n"),
        ("/content/pages/good.yaml", "title@: Still extracted\n"),
        ("/content/pages/unreadable.yaml", "title@: Never read\n"),
        ("/views/broken.html", "{{ _('Unterminated }}\n"),
        ("/views/a.html", "{{ ngettext('%(n)s item', '%(n)s items', n) }}\n"),
        ("/views/b.html", "{{ _('%(n)s item') }}\n"),
    ]);
    fs.set_unreadable("/content/pages/unreadable.yaml");
    let podspec = Podspec::load(&fs).unwrap();
    let logger = CapturingLogger::new(LogLevel::Debug);
    let cancelled = AtomicBool::new(false);

    let output = ExtractionPipeline::new(&fs, &podspec, &logger, &cancelled)
        .run()
        .unwrap();

    assert!(output.bundle.get("Still extracted").is_some());
    assert_eq!(
        output.bundle.get("%(n)s item").unwrap().plural.as_deref(),
        Some("%(n)s items")
    );
    let warnings = output.bundle.warnings();
    assert!(warnings.iter().all(|w| w.is_warning()));
    assert!(warnings.iter().any(|w| w.location.url == "/content/pages/broken.yaml"));
    assert!(warnings.iter().any(|w| w.location.url == "/content/pages/unreadable.yaml"));
    assert!(warnings.iter().any(|w| w.location.url == "/views/broken.html"));
    assert!(warnings.iter().any(|w| w.msg.starts_with("plural form")));
    assert!(!logger.messages(LogLevel::Warn).is_empty());
}

#[test]
fn should_extract_identically_twice() {
    let first = extract_fixture();
    let second = extract_fixture();
    let flatten = |output: &ExtractionOutput| -> Vec<(String, Vec<String>, Vec<String>)> {
        output
            .bundle
            .get_messages()
            .map(|m| {
                (
                    m.id.clone(),
                    m.locations.iter().map(|l| l.to_string()).collect(),
                    m.locales.iter().map(|l| l.to_string()).collect(),
                )
            })
            .collect()
    };
    assert_eq!(flatten(&first), flatten(&second));
}
