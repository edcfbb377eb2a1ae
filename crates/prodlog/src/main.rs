//! `prodlog` - CLI for production data entry
//!
//! This binary records production entries, lists them, and deletes them.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use prodlog::cli::{
    AddCommand, Cli, Command, ConfigCommand, DeleteCommand, ListCommand, ShowCommand,
};
use prodlog::table::{self, OutputFormat};
use prodlog::{init_logging, Config, Error, Prompter, RecordStore};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Validation must still work when the configured file is broken
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        let path = file.clone().or_else(|| cli.config.clone());
        handle_validate(path);
        return Ok(());
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    let data_file = cli.data.clone().unwrap_or_else(|| config.data_file());

    match cli.command {
        Command::Add(cmd) => handle_add(&config, &data_file, &cmd),
        Command::List(cmd) => handle_list(&data_file, &cmd),
        Command::Show(cmd) => handle_show(&data_file, &cmd),
        Command::Delete(cmd) => handle_delete(&data_file, &cmd),
        Command::Export(cmd) => {
            let store = open_store(&data_file)?;
            let count = store
                .export(&cmd.path)
                .with_context(|| format!("failed to export to {}", cmd.path.display()))?;
            println!("Exported {count} entries to {}", cmd.path.display());
            Ok(())
        }
        Command::Config(cmd) => handle_config(&config, &data_file, cmd),
    }
}

fn open_store(data_file: &Path) -> Result<RecordStore> {
    RecordStore::open(data_file)
        .with_context(|| format!("failed to open data file {}", data_file.display()))
}

fn handle_add(config: &Config, data_file: &Path, cmd: &AddCommand) -> Result<()> {
    let mut store = open_store(data_file)?;
    let today = Local::now().date_naive();
    let draft = cmd.to_form();

    let entry = if cmd.interactive {
        let mut prompter = Prompter::new(io::stdin().lock(), io::stdout().lock(), &config.form);
        prompter.collect(draft, today)?
    } else {
        draft.build(&config.form, today)?
    };

    let id = store.append(entry)?.id;
    let index = store.len() - 1;

    let mut out = io::stdout().lock();
    writeln!(out, "Entry saved.")?;
    table::render(
        &store.records()[index..],
        index,
        OutputFormat::Plain,
        &mut out,
    )?;
    tracing::debug!("Appended record {} at row {}", id, index);
    Ok(())
}

fn handle_list(data_file: &Path, cmd: &ListCommand) -> Result<()> {
    let store = open_store(data_file)?;
    let records = store.records();
    let skip = cmd
        .last
        .map_or(0, |n| records.len().saturating_sub(n));

    let mut out = io::stdout().lock();
    table::render(&records[skip..], skip, cmd.format.into(), &mut out)?;
    Ok(())
}

fn handle_show(data_file: &Path, cmd: &ShowCommand) -> Result<()> {
    let store = open_store(data_file)?;
    let index = store
        .position(cmd.id)
        .ok_or(Error::RecordNotFound { id: cmd.id })?;
    let records = &store.records()[index..=index];

    let mut out = io::stdout().lock();
    if cmd.json {
        table::render(records, index, OutputFormat::Json, &mut out)?;
    } else {
        table::render_detail(&records[0], index, &mut out)?;
    }
    Ok(())
}

fn handle_delete(data_file: &Path, cmd: &DeleteCommand) -> Result<()> {
    let mut store = open_store(data_file)?;

    let (index, removed) = match (cmd.index, cmd.id) {
        (Some(index), _) => (index, store.delete_at(index)?),
        (None, Some(id)) => {
            let index = store.position(id);
            let removed = store.delete(id)?;
            (index.unwrap_or_default(), removed)
        }
        (None, None) => anyhow::bail!("either --index or --id is required"),
    };

    println!("Deleted row {index} (id {}).", removed.id);
    Ok(())
}

fn handle_config(config: &Config, data_file: &Path, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let form = &config.form;
                let minutes: Vec<String> = form
                    .down_time_minutes
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data file:          {}", data_file.display());
                println!();
                println!("[Form]");
                println!("  Shifts:             {}", form.shifts.join(", "));
                println!("  Materials:          {}", form.materials.join(", "));
                println!("  Sizes:              {}", form.sizes.join(", "));
                println!("  Times:              {}", form.times.join(", "));
                println!("  Models:             {}", form.models.join(", "));
                println!("  Down time (min):    {}", minutes.join(", "));
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => handle_validate(file),
    }
    Ok(())
}

fn handle_validate(file: Option<std::path::PathBuf>) {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => println!("Configuration is valid."),
        Err(e) => println!("Configuration error: {e}"),
    }
}
