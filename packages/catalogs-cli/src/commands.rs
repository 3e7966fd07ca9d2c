//! Commands
//!
//! Argument definitions and dispatch for the `pod-catalogs` binary. Every
//! subcommand maps onto one operation of [`Catalogs`].

use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use pod_catalogs::file_system::LocalFileSystem;
use pod_catalogs::{Catalogs, ExtractOptions, FilterOptions};
use std::sync::Arc;

pub fn cli() -> Command {
    Command::new("pod-catalogs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage the translation catalogs of a pod")
        .subcommand_required(true)
        .arg(
            Arg::new("pod")
                .short('p')
                .long("pod")
                .value_name("DIR")
                .default_value(".")
                .global(true)
                .help("Pod directory (the one holding podspec.yaml)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log debug output"),
        )
        .subcommand(Command::new("locales").about("List the locales declared by the project"))
        .subcommand(
            Command::new("extract")
                .about("Extract messages into the template or the locale catalogs")
                .arg(
                    Arg::new("include-obsolete")
                        .long("include-obsolete")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("purge-obsolete")
                        .help("Keep messages that are no longer found"),
                )
                .arg(purge_arg())
                .arg(
                    Arg::new("localized")
                        .long("localized")
                        .action(ArgAction::SetTrue)
                        .help("Write one catalog per locale instead of the template"),
                )
                .arg(locale_arg(false)),
        )
        .subcommand(
            Command::new("init")
                .about("Create catalogs for new locales from the template")
                .arg(Arg::new("locales").required(true).num_args(1..)),
        )
        .subcommand(
            Command::new("update")
                .about("Merge the template into existing catalogs")
                .arg(Arg::new("locales").num_args(0..))
                .arg(purge_arg()),
        )
        .subcommand(Command::new("compile").about("Compile catalogs to MO files"))
        .subcommand(
            Command::new("filter")
                .about("Write catalogs holding only what still needs translation")
                .arg(locale_arg(true))
                .arg(
                    Arg::new("path")
                        .long("path")
                        .value_name("POD_PATH")
                        .action(ArgAction::Append)
                        .help("Only keep messages found in this file"),
                )
                .arg(
                    Arg::new("out-path")
                        .short('o')
                        .long("out-path")
                        .value_name("POD_PATH")
                        .help("Destination of the shared catalog"),
                )
                .arg(
                    Arg::new("out-dir")
                        .long("out-dir")
                        .value_name("POD_PATH")
                        .help("Root of the per-locale catalogs"),
                )
                .arg(
                    Arg::new("localized")
                        .long("localized")
                        .action(ArgAction::SetTrue)
                        .help("One catalog per locale"),
                ),
        )
}

fn purge_arg() -> Arg {
    Arg::new("purge-obsolete")
        .long("purge-obsolete")
        .action(ArgAction::SetTrue)
        .help("Delete messages that are no longer found instead of marking them obsolete")
}

fn locale_arg(required: bool) -> Arg {
    Arg::new("locale")
        .short('l')
        .long("locale")
        .value_name("LOCALE")
        .action(ArgAction::Append)
        .required(required)
}

fn values(matches: &ArgMatches, id: &str) -> Option<Vec<String>> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
}

fn open(matches: &ArgMatches) -> anyhow::Result<Catalogs> {
    let pod = matches
        .get_one::<String>("pod")
        .map(String::as_str)
        .unwrap_or(".");
    let fs = Arc::new(LocalFileSystem::new(pod));
    Catalogs::new(fs).with_context(|| format!("cannot open pod at {}", pod))
}

pub fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let catalogs = open(matches)?;

    match matches.subcommand() {
        Some(("locales", _)) => {
            for locale in catalogs.list_locales() {
                println!("{}", locale);
            }
        }
        Some(("extract", sub)) => {
            let include_obsolete = if sub.get_flag("include-obsolete") {
                Some(true)
            } else if sub.get_flag("purge-obsolete") {
                Some(false)
            } else {
                None
            };
            let extraction = catalogs
                .extract(ExtractOptions {
                    include_obsolete,
                    localized: sub.get_flag("localized").then_some(true),
                    locales: values(sub, "locale"),
                    purge_obsolete: sub.get_flag("purge-obsolete"),
                })
                .context("extraction failed")?;
            println!(
                "Extracted {} messages from {} files ({} warnings)",
                extraction.template.live().count(),
                extraction.files,
                extraction.warnings.len()
            );
        }
        Some(("init", sub)) => {
            let locales = values(sub, "locales").unwrap_or_default();
            let created = catalogs.init(&locales).context("init failed")?;
            for locale in created {
                println!("Created: {}", catalogs.catalog_path(&locale));
            }
        }
        Some(("update", sub)) => {
            let locales = values(sub, "locales").filter(|l| !l.is_empty());
            let report = catalogs
                .update(locales.as_deref(), sub.get_flag("purge-obsolete"))
                .context("update failed")?;
            if !report.is_success() {
                for (locale, error) in &report.failures {
                    eprintln!("{}: {}", locale, error);
                }
                bail!("{} catalog(s) could not be updated", report.failures.len());
            }
        }
        Some(("compile", _)) => {
            let compiled = catalogs.compile().context("compile failed")?;
            println!("Compiled {} catalog(s)", compiled.len());
        }
        Some(("filter", sub)) => {
            let filtered = catalogs
                .filter(FilterOptions {
                    locales: values(sub, "locale").unwrap_or_default(),
                    paths: values(sub, "path"),
                    out_path: sub.get_one::<String>("out-path").cloned(),
                    out_dir: sub.get_one::<String>("out-dir").cloned(),
                    localized: sub.get_flag("localized"),
                })
                .context("filter failed")?;
            for catalog in filtered {
                let label = catalog
                    .locale
                    .as_ref()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "shared".to_string());
                println!("{}: {} messages", label, catalog.len());
            }
        }
        Some((other, _)) => bail!("unknown command {}", other),
        None => bail!("no command given"),
    }
    Ok(())
}

/// Run a parsed command line and turn the outcome into an exit code.
pub fn main_catalogs(matches: &ArgMatches) -> i32 {
    match run(matches) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn run_args(root: &Path, args: &[&str]) -> anyhow::Result<()> {
        let mut argv = vec!["pod-catalogs", "--pod", root.to_str().unwrap()];
        argv.extend_from_slice(args);
        run(&cli().try_get_matches_from(argv)?)
    }

    fn pod() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "podspec.yaml", "localization:\n  locales: [de, fr]\n");
        write(dir.path(), "views/base.html", "<h1>{{ _('Hello World!') }}</h1>\n");
        dir
    }

    #[test]
    fn should_extract_init_and_compile() {
        let dir = pod();
        run_args(dir.path(), &["extract"]).unwrap();
        assert!(dir.path().join("translations/messages.pot").exists());

        run_args(dir.path(), &["init", "de"]).unwrap();
        let po = fs::read_to_string(dir.path().join("translations/de/LC_MESSAGES/messages.po")).unwrap();
        assert!(po.contains("msgid \"Hello World!\""));

        run_args(dir.path(), &["update"]).unwrap();
        assert!(dir.path().join("translations/fr/LC_MESSAGES/messages.po").exists());

        run_args(dir.path(), &["compile"]).unwrap();
        assert!(dir.path().join("translations/de/LC_MESSAGES/messages.mo").exists());
    }

    #[test]
    fn should_mark_vanished_messages_obsolete_unless_purged() {
        let dir = pod();
        run_args(dir.path(), &["extract"]).unwrap();
        run_args(dir.path(), &["init", "de"]).unwrap();
        write(dir.path(), "views/base.html", "<h1>{{ _('Welcome!') }}</h1>\n");
        run_args(dir.path(), &["extract"]).unwrap();
        let de_path = dir.path().join("translations/de/LC_MESSAGES/messages.po");

        run_args(dir.path(), &["update", "de"]).unwrap();
        let po = fs::read_to_string(&de_path).unwrap();
        assert!(po.contains("msgid \"Welcome!\""));
        assert!(po.contains("#~ msgid \"Hello World!\""));

        run_args(dir.path(), &["update", "--purge-obsolete", "de"]).unwrap();
        let po = fs::read_to_string(&de_path).unwrap();
        assert!(!po.contains("Hello World!"));
    }

    #[test]
    fn should_fail_without_podspec() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_args(dir.path(), &["locales"]).unwrap_err();
        assert!(format!("{:#}", err).contains("cannot open pod"));
    }

    #[test]
    fn should_require_filter_destination() {
        let dir = pod();
        run_args(dir.path(), &["extract"]).unwrap();
        assert!(run_args(dir.path(), &["filter", "-l", "de"]).is_err());
        run_args(dir.path(), &["filter", "-l", "de", "-o", "/untranslated.po"]).unwrap();
        assert!(dir.path().join("untranslated.po").exists());
    }

    #[test]
    fn should_reject_conflicting_obsolete_flags() {
        assert!(cli()
            .try_get_matches_from(["pod-catalogs", "extract", "--include-obsolete", "--purge-obsolete"])
            .is_err());
    }
}
