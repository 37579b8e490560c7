// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;

use anyhow::{Context, Result, bail};
use config::Config;
use crudkit_app::{ContainerCommand, ContainerOptions, CrudContainer, EntityType};
use crudkit_testkit::{JAIL_TYPE, JailFaker, MemoryBackend, World, jail_identity, jail_schema};
use logging::LogTarget;
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::info;

const DEMO_SEED: u64 = 42;
const DEMO_WORLDS: usize = 3;
const DEMO_JAILS: usize = 45;

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
            "load config {}; run `crudkit --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let target = if options.check_only {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    logging::init_logging(&config.log_filter(), target)?;

    let data_path = if options.demo {
        None
    } else {
        options.data_path.clone().or_else(|| config.data_path())
    };
    let rows = match &data_path {
        Some(path) => load_rows(path)?,
        None => demo_rows(),
    };
    info!(rows = rows.len(), source = ?data_path, "entities loaded");

    let mut container = jail_container(&config, rows)?;
    if options.check_only {
        container.dispatch(ContainerCommand::Mount);
        container.pump();
        println!("{}", check_summary(&container));
        container.dispatch(ContainerCommand::Unmount);
        return Ok(());
    }

    crudkit_tui::run_app(&mut container)
}

fn demo_rows() -> Vec<Value> {
    let mut faker = JailFaker::new(DEMO_SEED);
    let worlds = faker.worlds(DEMO_WORLDS);
    faker.jails(DEMO_JAILS, &worlds)
}

fn load_rows(path: &Path) -> Result<Vec<Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read data file {} -- fix [data].path or --data", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parse JSON data file {}", path.display()))?;
    match value {
        Value::Array(rows) => Ok(rows),
        _ => bail!(
            "data file {} must hold a JSON array of entities",
            path.display()
        ),
    }
}

/// Worlds referenced by the rows, in first-seen order. Rows without a
/// `location.world` object are skipped.
fn worlds_from_rows(rows: &[Value]) -> Vec<World> {
    let mut seen = BTreeMap::new();
    let mut worlds = Vec::new();
    for world in rows.iter().filter_map(|row| row.pointer("/location/world")) {
        let (Some(uuid), Some(name)) = (
            world.get("uuid").and_then(Value::as_str),
            world.get("name").and_then(Value::as_str),
        ) else {
            continue;
        };
        if seen.insert(uuid.to_owned(), ()).is_none() {
            worlds.push(World {
                uuid: uuid.to_owned(),
                name: name.to_owned(),
            });
        }
    }
    worlds
}

fn jail_container(config: &Config, rows: Vec<Value>) -> Result<CrudContainer<MemoryBackend>> {
    let worlds = worlds_from_rows(&rows);
    let entity_type = EntityType::new(JAIL_TYPE);
    let mut options = ContainerOptions::new(entity_type.clone(), jail_schema(&worlds)?);
    options.identity = Box::new(jail_identity()?);
    options.page_size = config.page_size();
    options.permissions = Box::new(config.permissions.clone());
    options.translate = Box::new(config.catalog());

    let (tx, rx) = mpsc::channel();
    let backend = MemoryBackend::new(entity_type, rows, worlds, tx.clone());
    Ok(CrudContainer::new(options, backend, tx, rx))
}

fn check_summary(container: &CrudContainer<MemoryBackend>) -> String {
    let view = container.table_view();
    let status = container.status().unwrap_or("ok");
    format!(
        "{}: {} rows, {} pages, create {}, delete {} ({status})",
        container.entity_type(),
        container.list().len(),
        view.page_count,
        allowed(container.can_create()),
        allowed(container.can_delete()),
    )
}

fn allowed(flag: bool) -> &'static str {
    if flag { "allowed" } else { "denied" }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    data_path: Option<PathBuf>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        data_path: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--data" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--data requires a JSON file path"))?;
                options.data_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
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
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("crudkit");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --data <path>            Load entities from a JSON array file");
    println!("  --demo                   Launch with seeded demo jails");
    println!("  --check                  Load config and data, print a summary and exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{
        CliOptions, check_summary, demo_rows, jail_container, load_rows, parse_cli_args,
        worlds_from_rows,
    };
    use crate::config::Config;
    use anyhow::Result;
    use crudkit_app::{ContainerCommand, PermissionTree};
    use serde_json::json;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/crudkit-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                data_path: None,
                print_config_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_paths() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml", "--data", "/srv/jails.json"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(options.data_path, Some(PathBuf::from("/srv/jails.json")));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--data"], default_options_path())
            .expect_err("missing data value should fail");
        assert!(error.to_string().contains("--data requires"));
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
    fn parse_cli_args_sets_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check", "--demo", "-h"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(options.demo);
        assert!(options.show_help);
        Ok(())
    }

    #[test]
    fn data_file_must_be_an_array() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("jails.json");
        std::fs::write(&path, r#"{"name": "Jail1"}"#)?;
        let error = load_rows(&path).expect_err("object should fail");
        assert!(error.to_string().contains("JSON array"));

        std::fs::write(&path, r#"[{"name": "Jail1"}, {"name": "Jail2"}]"#)?;
        assert_eq!(load_rows(&path)?.len(), 2);
        Ok(())
    }

    #[test]
    fn worlds_are_collected_once_in_order() {
        let rows = vec![
            json!({"location": {"world": {"uuid": "b", "name": "nether"}}}),
            json!({"location": {"world": {"uuid": "a", "name": "world"}}}),
            json!({"location": {"world": {"uuid": "b", "name": "nether"}}}),
            json!({"location": {"world": "dangling"}}),
            json!({"name": "nowhere"}),
        ];
        let worlds = worlds_from_rows(&rows);
        let names: Vec<&str> = worlds.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["nether", "world"]);
    }

    #[test]
    fn check_summary_reports_demo_list() -> Result<()> {
        let mut config = Config::default();
        config.permissions = PermissionTree::deny_all()
            .with(&["jail", "jail", "list"], true)
            .with(&["jail", "jail", "delete"], true);
        let mut container = jail_container(&config, demo_rows())?;
        container.dispatch(ContainerCommand::Mount);
        container.pump();
        assert_eq!(
            check_summary(&container),
            "jail/jail: 45 rows, 3 pages, create denied, delete allowed (ok)"
        );
        Ok(())
    }
}
