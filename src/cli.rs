use clap::{crate_authors, crate_description, crate_version, Arg, ArgAction, ArgMatches, Command};
use pretty_env_logger::env_logger::Builder;
use std::env;
use std::io::Write;
use std::process::exit;

use dnsrewrites_rs::adguard::AdGuardBackend;
use dnsrewrites_rs::common::RewriteIdentity;
use dnsrewrites_rs::panel::{self, Column, PageController, PreferenceStore};
use dnsrewrites_rs::Config;

fn syslog_priority(level: log::Level) -> u8 {
    match level {
        log::Level::Error => 3,
        log::Level::Warn => 4,
        log::Level::Info => 6,
        log::Level::Debug | log::Level::Trace => 7,
    }
}

/// Journald reads the `<N>` prefix as the syslog priority.
fn journal_builder() -> Builder {
    let mut builder = Builder::new();
    builder.format(|buf, record| {
        writeln!(
            buf,
            "<{}>{}: {}",
            syslog_priority(record.level()),
            record.target(),
            record.args()
        )
    });
    builder
}

fn setup_logger() {
    let mut builder = match env::var("RUST_LOG_STYLE").as_deref() {
        Ok("SYSTEMD") => journal_builder(),
        _ => pretty_env_logger::formatted_builder(),
    };
    // Without RUST_LOG only this crate logs below warn.
    match env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder
            .filter_level(log::LevelFilter::Warn)
            .filter_module("dnsrewrites_rs", log::LevelFilter::Info),
    };
    builder.init();
}

fn identity_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("domain").required(true).help("Domain of the rewrite"))
        .arg(Arg::new("answer").required(true).help("Answer of the rewrite"))
}

fn identity(args: &ArgMatches) -> RewriteIdentity {
    RewriteIdentity::new(
        args.get_one::<String>("domain").cloned().unwrap_or_default(),
        args.get_one::<String>("answer").cloned().unwrap_or_default(),
    )
}

fn command() -> Command {
    Command::new("DNSRewrites")
        .about(format!(
            "{}\n{} {}",
            crate_description!(),
            "Configuration is managed using environment variables",
            "prefixed with REWRITES_, e.g. REWRITES_ADGUARD__BASE_URL.",
        ))
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("Show the rewrites table")
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .value_parser(["domain", "answer"])
                        .help("Sort by column"),
                )
                .arg(
                    Arg::new("desc")
                        .action(ArgAction::SetTrue)
                        .long("desc")
                        .requires("sort")
                        .help("Sort descending"),
                )
                .arg(
                    Arg::new("page")
                        .long("page")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1")
                        .help("Page to show, starting at 1"),
                ),
        )
        .subcommand(identity_args(
            Command::new("add").about("Add a rewrite"),
        ))
        .subcommand(
            identity_args(Command::new("edit").about("Replace a rewrite's domain or answer"))
                .arg(Arg::new("new-domain").long("domain").help("New domain"))
                .arg(Arg::new("new-answer").long("answer").help("New answer")),
        )
        .subcommand(identity_args(
            Command::new("delete").about("Delete a rewrite"),
        ))
        .subcommand(identity_args(
            Command::new("toggle").about("Enable or disable a rewrite"),
        ))
        .subcommand(Command::new("global").about("Turn all rewrites on or off"))
        .subcommand(
            Command::new("page-size")
                .about("Set the number of rows per page")
                .arg(
                    Arg::new("size")
                        .required(true)
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .version(crate_version!())
        .author(crate_authors!("\n"))
}

type Controller = PageController<Box<dyn PreferenceStore>>;

/// Row actions only apply to rewrites present in the list.
fn unlisted(controller: &Controller, target: &RewriteIdentity) -> Option<String> {
    match controller.store().find(target) {
        Some(_) => None,
        None => Some(format!("No rewrite {target} in the current list")),
    }
}

fn require_listed(controller: &Controller, args: &ArgMatches) -> RewriteIdentity {
    let target = identity(args);
    if let Some(message) = unlisted(controller, &target) {
        eprintln!("{message}");
        exit(1);
    }
    target
}

/// Drives the page the way the web panel does: one command per user action.
fn run(
    controller: &mut Controller,
    backend: &mut AdGuardBackend,
    name: &str,
    args: &ArgMatches,
) {
    use panel::Command::*;

    match name {
        "list" => {
            if let Some(sort) = args.get_one::<String>("sort") {
                let column = match sort.as_str() {
                    "answer" => Column::Answer,
                    _ => Column::Domain,
                };
                controller.dispatch(SortBy(column), backend);
                if args.get_flag("desc") {
                    controller.dispatch(SortBy(column), backend);
                }
            }
            let page = args.get_one::<usize>("page").copied().unwrap_or(1);
            controller.dispatch(SetPage(page.saturating_sub(1)), backend);
        }
        "add" => {
            let target = identity(args);
            controller.dispatch(OpenAdd, backend);
            controller.dispatch(SetDomain(target.domain), backend);
            controller.dispatch(SetAnswer(target.answer), backend);
            controller.dispatch(Submit, backend);
        }
        "edit" => {
            let target = require_listed(controller, args);
            controller.dispatch(OpenEdit(target), backend);
            if let Some(domain) = args.get_one::<String>("new-domain") {
                controller.dispatch(SetDomain(domain.clone()), backend);
            }
            if let Some(answer) = args.get_one::<String>("new-answer") {
                controller.dispatch(SetAnswer(answer.clone()), backend);
            }
            controller.dispatch(Submit, backend);
        }
        "delete" => {
            let target = require_listed(controller, args);
            controller.dispatch(OpenDelete(target), backend);
            controller.dispatch(ConfirmDelete, backend);
        }
        "toggle" => {
            let target = require_listed(controller, args);
            controller.dispatch(Toggle(target), backend);
        }
        "global" => controller.dispatch(ToggleAll, backend),
        "page-size" => {
            let size = args.get_one::<usize>("size").copied().unwrap_or_default();
            controller.dispatch(SetPageSize(size), backend);
        }
        _ => unreachable!("subcommand is required"),
    }
}

fn print_page(controller: &Controller) {
    if let Some(settings) = controller.store().settings() {
        println!(
            "Rewrites are {}",
            if settings.enabled { "enabled" } else { "disabled" }
        );
    }

    let page = controller.page();
    if page.is_empty() {
        println!("No rewrites configured.");
        return;
    }

    let domain_width = page
        .rows
        .iter()
        .map(|r| r.record.domain.len())
        .max()
        .unwrap_or_default()
        .max("DOMAIN".len());
    let answer_width = page
        .rows
        .iter()
        .map(|r| r.record.answer.len())
        .max()
        .unwrap_or_default()
        .max("ANSWER".len());

    println!("{:<domain_width$}  {:<answer_width$}  ENABLED", "DOMAIN", "ANSWER");
    for row in &page.rows {
        println!(
            "{:<domain_width$}  {:<answer_width$}  {}",
            row.record.domain,
            row.record.answer,
            if row.record.enabled { "yes" } else { "no" }
        );
    }
    println!(
        "Page {}/{} ({} rewrites, {} per page)",
        page.page + 1,
        page.page_count,
        page.total,
        page.page_size
    );
}

pub(crate) fn main() {
    let args = command().get_matches();

    setup_logger();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(err) => {
            eprintln!("{err}");
            exit(2);
        }
    };

    let (mut backend, preferences) = match config.backend().and_then(|b| {
        let prefs = config.preference_store()?;
        Ok((b, prefs))
    }) {
        Ok(parts) => parts,
        Err(err) => {
            eprintln!("{err}");
            exit(2);
        }
    };

    let mut controller = PageController::new(preferences);
    controller.dispatch(panel::Command::Mount, &mut backend);

    if let Some((name, sub_args)) = args.subcommand() {
        run(&mut controller, &mut backend, name, sub_args);
    }

    if let Some(error) = controller.modal().error() {
        eprintln!("{error}");
        exit(1);
    }

    print_page(&controller);

    if let Some(notice) = controller.store().notice() {
        eprintln!("{notice}");
        exit(1);
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;
    use serde_json::json;

    use dnsrewrites_rs::panel::MemoryPreferences;

    use super::*;

    fn mounted(server: &mut Server) -> Controller {
        let _list = server
            .mock("GET", "/control/rewrite/list")
            .with_status(200)
            .with_body(json!([{"domain": "a.example", "answer": "10.0.0.1"}]).to_string())
            .create();
        let _settings = server
            .mock("GET", "/control/rewrite/settings")
            .with_status(200)
            .with_body(json!({"enabled": true}).to_string())
            .create();

        let mut backend = AdGuardBackend::new(&url::Url::parse(&server.url()).unwrap());
        let preferences: Box<dyn PreferenceStore> = Box::new(MemoryPreferences::default());
        let mut controller = PageController::new(preferences);
        controller.dispatch(panel::Command::Mount, &mut backend);
        controller
    }

    #[test]
    fn row_actions_require_a_listed_rewrite() {
        let mut server = Server::new();
        let controller = mounted(&mut server);

        assert!(unlisted(&controller, &RewriteIdentity::new("a.example", "10.0.0.1")).is_none());
        let message = unlisted(&controller, &RewriteIdentity::new("a.example", "10.0.0.2"));
        assert_eq!(
            message.as_deref(),
            Some("No rewrite a.example -> 10.0.0.2 in the current list")
        );
    }

    #[test]
    fn toggle_takes_domain_and_answer() {
        let args = command()
            .try_get_matches_from(["dnsrewrites", "toggle", "a.example", "10.0.0.1"])
            .unwrap();
        let (name, sub_args) = args.subcommand().unwrap();
        assert_eq!(name, "toggle");
        assert_eq!(
            identity(sub_args),
            RewriteIdentity::new("a.example", "10.0.0.1")
        );
        assert!(command()
            .try_get_matches_from(["dnsrewrites", "toggle", "a.example"])
            .is_err());
    }
}
