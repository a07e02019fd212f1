// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use roster_app::{ListCommand, ListEvent, RecordId};
use roster_client::{Api, HttpTransport, Mutation};
use roster_store::{AuthSession, FeatureFlags, PrefStore, ThemePreference, ThemeSettings};
use roster_testkit::{MockBackend, MockServer};
use runtime::{Entity, ListSession, parse_record_id};
use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Prints every list event before the table when enabled.
const SHOW_EVENTS_FLAG: &str = "show-events";
const DEFAULT_FLAGS: [(&str, bool); 1] = [(SHOW_EVENTS_FLAG, false)];

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `roster --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    init_logging(config.log_level());

    let prefs_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.prefs_path()?
    };
    if options.print_prefs_path {
        println!("{}", prefs_path.display());
        return Ok(());
    }

    let store = PrefStore::open(&prefs_path).with_context(|| {
        format!(
            "open preferences {} -- if this path is wrong, set [storage].prefs_path or {}",
            prefs_path.display(),
            roster_store::PREFS_PATH_ENV
        )
    })?;
    store.bootstrap()?;

    let latency = config.demo_latency()?;
    let demo_server = if options.demo {
        Some(MockServer::start(Arc::new(MockBackend::new(latency)))?)
    } else {
        None
    };
    let base_url = demo_server
        .as_ref()
        .map_or_else(|| config.base_url(), |server| server.base_url());
    let timeout = config.timeout()?;
    let transport = HttpTransport::new(base_url, timeout).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    if options.check_only {
        return Ok(());
    }
    let api = Api::new(Arc::new(transport));
    info!(base_url, demo = options.demo, "starting");

    apply_preferences(&store, &api, &options)?;

    let mut flags = FeatureFlags::load(&store)?;
    flags.register_defaults(&DEFAULT_FLAGS);
    for name in &options.toggle_flags {
        let enabled = flags.toggle(name)?;
        println!("flag {name}: {}", if enabled { "on" } else { "off" });
    }
    let show_events = flags.is_enabled(SHOW_EVENTS_FLAG);

    let list_config = options
        .entity
        .list_config(options.page_size.or(config.page_size()), config.debounce()?);
    let mut session = ListSession::new(&api, options.entity, list_config);
    let wait = timeout
        .saturating_add(latency.saturating_mul(2))
        .saturating_add(Duration::from_secs(1));

    let mut events = session.reload();
    events.extend(session.pump(wait));

    if let Some(search) = &options.search {
        events.extend(session.dispatch(ListCommand::SearchInput(search.clone())));
        events.extend(session.pump(wait));
    }
    for column in &options.sorts {
        events.extend(session.dispatch(ListCommand::SortHeaderClick(column.clone())));
    }
    if let Some(page_size) = options.page_size {
        events.extend(session.dispatch(ListCommand::SetPageSize(page_size)));
    }
    if let Some(id) = options.delete {
        events.extend(session.mutate(Mutation::Delete(id)));
        events.extend(session.pump(wait));
    }
    if let Some(page) = options.page {
        events.extend(session.dispatch(ListCommand::PageClick(page)));
    }

    for event in &events {
        if let ListEvent::SortUnavailable(column) = event {
            warn!(column = column.as_str(), "column is not sortable");
            eprintln!("column {column:?} is not sortable");
        }
        if show_events {
            println!("event: {event:?}");
        }
    }

    let mut stdout = io::stdout().lock();
    session.render(&mut stdout)?;
    session.dispose();
    Ok(())
}

/// Session and theme changes requested on the command line.
fn apply_preferences(store: &PrefStore, api: &Api, options: &CliOptions) -> Result<()> {
    let mut session = AuthSession::restore(store)?;
    if options.logout {
        session.sign_out()?;
        api.logout();
        println!("signed out");
    }
    if let Some((email, password)) = &options.login {
        let response = api.login(email, password).context("sign in")?;
        session.sign_in(&response)?;
        println!("signed in as {}", response.user.name);
    } else if let Some(token) = session.token() {
        api.set_token(Some(token.to_owned()));
        info!(user = session.user_name(), "restored session");
    }

    if let Some(theme) = options.theme {
        let mut settings = ThemeSettings::load(store)?;
        settings.set(theme)?;
        println!("theme: {theme}");
    }
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_prefs_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    entity: Entity,
    search: Option<String>,
    sorts: Vec<String>,
    page: Option<usize>,
    page_size: Option<usize>,
    delete: Option<RecordId>,
    login: Option<(String, String)>,
    logout: bool,
    theme: Option<ThemePreference>,
    toggle_flags: Vec<String>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_prefs_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        entity: Entity::Products,
        search: None,
        sorts: Vec::new(),
        page: None,
        page_size: None,
        delete: None,
        login: None,
        logout: false,
        theme: None,
        toggle_flags: Vec::new(),
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                options.config_path =
                    PathBuf::from(next_value(&mut iter, "--config", "a file path")?);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_prefs_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            "--collection" => {
                let value = next_value(&mut iter, "--collection", "products or users")?;
                options.entity = Entity::parse(&value).ok_or_else(|| {
                    anyhow!("unknown collection {value:?}; use products or users")
                })?;
            }
            "--search" => {
                options.search = Some(next_value(&mut iter, "--search", "a search text")?);
            }
            "--sort" => {
                options.sorts.push(next_value(&mut iter, "--sort", "a column name")?);
            }
            "--page" => {
                let value = next_value(&mut iter, "--page", "a number")?;
                options.page = Some(parse_positive("--page", &value)?);
            }
            "--page-size" => {
                options.page_size = Some(parse_positive(
                    "--page-size",
                    &next_value(&mut iter, "--page-size", "a number")?,
                )?);
            }
            "--delete" => {
                let value = next_value(&mut iter, "--delete", "a record id")?;
                options.delete = Some(parse_record_id(&value)?);
            }
            "--login" => {
                let email = next_value(&mut iter, "--login", "an email and a password")?;
                let password = next_value(&mut iter, "--login", "an email and a password")?;
                options.login = Some((email, password));
            }
            "--logout" => {
                options.logout = true;
            }
            "--theme" => {
                let value = next_value(&mut iter, "--theme", "light, dark, or system")?;
                options.theme = Some(ThemePreference::parse(&value).ok_or_else(|| {
                    anyhow!("unknown theme {value:?}; use light, dark, or system")
                })?);
            }
            "--toggle-flag" => {
                let name = next_value(&mut iter, "--toggle-flag", "a flag name")?;
                options.toggle_flags.push(name);
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn next_value<I, S>(iter: &mut I, flag: &str, what: &str) -> Result<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    iter.next()
        .map(|value| value.as_ref().to_owned())
        .ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn parse_positive(flag: &str, raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(anyhow!("{flag} expects a positive number, got {raw:?}")),
    }
}

fn print_help() {
    println!("roster");
    println!("  --config <path>            Use a specific config path");
    println!("  --print-config-path        Print resolved config path");
    println!("  --print-path               Print resolved preferences path");
    println!("  --print-example-config     Print a config template");
    println!("  --demo                     Serve seeded demo data from a local mock backend");
    println!("  --check                    Validate config + preferences + API settings");
    println!("  --collection <name>        List products (default) or users");
    println!("  --search <text>            Filter rows by text");
    println!("  --sort <column>            Click a column header; repeat to cycle asc/desc/none");
    println!("  --page <n>                 Show page n");
    println!("  --page-size <n>            Rows per page");
    println!("  --delete <id>              Delete a record, then reload the list");
    println!("  --login <email> <password> Sign in and remember the session");
    println!("  --logout                   Forget the stored session");
    println!("  --theme <name>             Store light, dark, or system");
    println!("  --toggle-flag <name>       Flip a feature flag (show-events prints list events)");
    println!("  --help                     Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use crate::runtime::Entity;
    use anyhow::Result;
    use roster_app::RecordId;
    use roster_store::ThemePreference;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/roster-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_prefs_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
                entity: Entity::Products,
                search: None,
                sorts: Vec::new(),
                page: None,
                page_size: None,
                delete: None,
                login: None,
                logout: false,
                theme: None,
                toggle_flags: Vec::new(),
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--login", "admin@demo.com"], default_options_path())
            .expect_err("missing password should fail");
        assert!(error.to_string().contains("--login requires"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_reads_list_controls() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--demo",
                "--collection",
                "users",
                "--search",
                "john",
                "--sort",
                "name",
                "--sort",
                "name",
                "--page",
                "2",
                "--page-size",
                "5",
                "--delete",
                "3",
            ],
            default_options_path(),
        )?;
        assert!(options.demo);
        assert_eq!(options.entity, Entity::Users);
        assert_eq!(options.search.as_deref(), Some("john"));
        assert_eq!(options.sorts, vec!["name", "name"]);
        assert_eq!(options.page, Some(2));
        assert_eq!(options.page_size, Some(5));
        assert_eq!(options.delete, Some(RecordId::new(3)));
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_bad_numbers_and_names() {
        for args in [
            vec!["--page", "0"],
            vec!["--page-size", "many"],
            vec!["--delete", "-1"],
            vec!["--collection", "orders"],
            vec!["--theme", "purple"],
        ] {
            assert!(
                parse_cli_args(args.clone(), default_options_path()).is_err(),
                "{args:?} should fail"
            );
        }
    }

    #[test]
    fn parse_cli_args_reads_session_and_preferences() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--login",
                "admin@demo.com",
                "secret",
                "--theme",
                "dark",
                "--toggle-flag",
                "show-events",
            ],
            default_options_path(),
        )?;
        assert_eq!(
            options.login,
            Some(("admin@demo.com".to_owned(), "secret".to_owned()))
        );
        assert_eq!(options.theme, Some(ThemePreference::Dark));
        assert_eq!(options.toggle_flags, vec!["show-events"]);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
