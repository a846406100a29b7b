use anyhow::{Context, Result};
use clap::Parser;
use plotnamer_core::{
    finalize_file, preview_name, redo_last, rename_batch, rename_file, scan, undo_all, undo_last,
    BatchResult, Config, EngineError, FileCandidate, HistoryResult, MachineTag, OutcomeKind,
    OutputFormat, OutputFormatter, PartyTable, RedoResult, RenameContext, RenameOutcome,
    ScanItem, ScanResult, UndoAllResult, UndoResult,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;

mod cli;
mod session;

use cli::{Cli, Commands, KeywordsAction};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(ref dir) = cli.directory {
        if let Err(e) = std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to change to directory: {}", dir.display()))
        {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        },
    }
}

fn run(cli: Cli) -> Result<i32> {
    let format: OutputFormat = cli.output.into();
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let plotnamer_dir = current_dir.join(".plotnamer");
    let config = Config::load().unwrap_or_default();

    let machine = resolve_machine(cli.machine, &config);
    let parties_arg = cli.parties;

    match cli.command {
        Commands::Scan { root, finalized } => {
            let parties = load_parties(parties_arg.as_deref(), &config, &plotnamer_dir)?;
            let root = root.unwrap_or_else(|| PathBuf::from("."));
            let candidates = scan(&root, finalized)?;
            let files = candidates
                .iter()
                .map(|c| ScanItem {
                    code: parties.code_or_unknown(&c.party).to_string(),
                    party: c.party.clone(),
                    name: c.file_name(),
                    path: c.path.clone(),
                })
                .collect();
            let result = ScanResult {
                finalized_mode: finalized,
                files,
            };
            print!("{}", result.format(format));
            Ok(0)
        },

        Commands::Preview { file } => {
            let parties = load_parties(parties_arg.as_deref(), &config, &plotnamer_dir)?;
            let ctx = RenameContext {
                parties: &parties,
                keywords: &config.quantity_keywords,
                machine,
            };
            let candidate =
                FileCandidate::from_path(&file).ok_or_else(|| EngineError::MissingFile {
                    path: file.clone(),
                })?;
            match preview_name(&candidate, &ctx) {
                Ok(name) => {
                    match format {
                        OutputFormat::Summary => println!("Preview: {name}"),
                        OutputFormat::Json => println!(
                            "{}",
                            serde_json::json!({
                                "success": true,
                                "operation": "preview",
                                "file": file,
                                "preview": name,
                            })
                        ),
                    }
                    Ok(0)
                },
                Err(e) => Ok(print_outcome(
                    &RenameOutcome::failure(file, e.to_string()),
                    format,
                )),
            }
        },

        Commands::Rename { file } => {
            let parties = load_parties(parties_arg.as_deref(), &config, &plotnamer_dir)?;
            let ctx = RenameContext {
                parties: &parties,
                keywords: &config.quantity_keywords,
                machine,
            };
            let mut log = session::load_log(&plotnamer_dir)?;
            let outcome = match rename_file(&file, &ctx, &mut log) {
                Ok(new_path) => RenameOutcome::success(file, new_path),
                Err(EngineError::PartialMove { renamed_to, source }) => {
                    let detail = format!(
                        "renamed to '{}' but moving it into Done failed: {source}",
                        renamed_to.display()
                    );
                    RenameOutcome::partial(file, renamed_to, detail)
                },
                Err(e) => RenameOutcome::failure(file, e.to_string()),
            };
            session::save_log(&plotnamer_dir, &log)?;
            Ok(print_outcome(&outcome, format))
        },

        Commands::Batch { root } => {
            let parties = load_parties(parties_arg.as_deref(), &config, &plotnamer_dir)?;
            let ctx = RenameContext {
                parties: &parties,
                keywords: &config.quantity_keywords,
                machine,
            };
            let root = root.unwrap_or_else(|| PathBuf::from("."));
            let candidates = scan(&root, false)?;
            let mut log = session::load_log(&plotnamer_dir)?;
            let summary = rename_batch(&candidates, &ctx, &mut log)?;
            session::save_log(&plotnamer_dir, &log)?;
            let result = BatchResult {
                renamed: summary.renamed,
                failed: summary.failed,
            };
            print!("{}", result.format(format));
            Ok(i32::from(summary.failed > 0))
        },

        Commands::Finalize {
            file,
            qty,
            category,
        } => {
            let Some(machine) = machine else {
                return Ok(print_outcome(
                    &RenameOutcome::failure(file, EngineError::NoMachineSelected.to_string()),
                    format,
                ));
            };
            let mut log = session::load_log(&plotnamer_dir)?;
            let outcome = match finalize_file(&file, qty, &category, machine, &mut log) {
                Ok(new_path) => RenameOutcome::success(file, new_path),
                Err(e) => RenameOutcome::failure(file, e.to_string()),
            };
            session::save_log(&plotnamer_dir, &log)?;
            Ok(print_outcome(&outcome, format))
        },

        Commands::Undo => {
            let mut log = session::load_log(&plotnamer_dir)?;
            let (result, code) = match undo_last(&mut log) {
                Ok(Some(record)) => (
                    UndoResult {
                        undone: true,
                        restored_to: Some(record.old),
                    },
                    0,
                ),
                Ok(None) => (
                    UndoResult {
                        undone: false,
                        restored_to: None,
                    },
                    0,
                ),
                Err(e) => {
                    // The cursor has already moved; keep that state so the
                    // entry stays redoable, and report the conflict.
                    session::save_log(&plotnamer_dir, &log)?;
                    eprintln!("Error: {e}");
                    return Ok(1);
                },
            };
            session::save_log(&plotnamer_dir, &log)?;
            print!("{}", result.format(format));
            Ok(code)
        },

        Commands::Redo => {
            let mut log = session::load_log(&plotnamer_dir)?;
            let (result, code) = match redo_last(&mut log) {
                Ok(Some(path)) => (
                    RedoResult {
                        redone: true,
                        path: Some(path),
                    },
                    0,
                ),
                Ok(None) => (
                    RedoResult {
                        redone: false,
                        path: None,
                    },
                    0,
                ),
                Err(e) => {
                    session::save_log(&plotnamer_dir, &log)?;
                    eprintln!("Error: {e}");
                    return Ok(1);
                },
            };
            session::save_log(&plotnamer_dir, &log)?;
            print!("{}", result.format(format));
            Ok(code)
        },

        Commands::UndoAll => {
            let mut log = session::load_log(&plotnamer_dir)?;
            let summary = undo_all(&mut log);
            session::save_log(&plotnamer_dir, &log)?;
            let result = UndoAllResult {
                restored: summary.restored,
                failed: summary.failed,
            };
            print!("{}", result.format(format));
            Ok(i32::from(summary.failed > 0))
        },

        Commands::History { limit } => {
            let log = session::load_log(&plotnamer_dir)?;
            let entries = log.entries();
            let take = limit.unwrap_or(entries.len()).min(entries.len());
            let skipped = entries.len() - take;
            let result = HistoryResult {
                entries: entries[skipped..].to_vec(),
                active: log.active_len().saturating_sub(skipped),
            };
            print!("{}", result.format(format));
            Ok(0)
        },

        Commands::ExportLog { out } => {
            let log = session::load_log(&plotnamer_dir)?;
            let file = File::create(&out)
                .with_context(|| format!("Failed to create export file: {}", out.display()))?;
            log.export_csv(BufWriter::new(file))
                .with_context(|| format!("Failed to write export file: {}", out.display()))?;
            println!("Exported {} entries to {}", log.entries().len(), out.display());
            Ok(0)
        },

        Commands::Keywords { action } => {
            let mut config = config;
            let config_path = plotnamer_dir.join("config.toml");
            match action {
                KeywordsAction::List => {
                    for (i, kw) in config.quantity_keywords.iter().enumerate() {
                        println!("{}. {}", i + 1, kw);
                    }
                },
                KeywordsAction::Add { keyword } => {
                    if config.add_keyword(&keyword) {
                        config.save_to_path(&config_path)?;
                        println!("Added '{}'", keyword.trim().to_lowercase());
                    } else {
                        println!("Keyword already present or empty");
                    }
                },
                KeywordsAction::Remove { keyword } => {
                    if config.remove_keyword(&keyword) {
                        config.save_to_path(&config_path)?;
                        println!("Removed '{}'", keyword.trim().to_lowercase());
                    } else {
                        println!("No such keyword");
                    }
                },
                KeywordsAction::Reset => {
                    config.reset_keywords();
                    config.save_to_path(&config_path)?;
                    println!("Keywords reset to defaults");
                },
            }
            Ok(0)
        },
    }
}

fn resolve_machine(arg: Option<cli::MachineArg>, config: &Config) -> Option<MachineTag> {
    if let Some(arg) = arg {
        return Some(arg.into());
    }
    config
        .defaults
        .machine
        .as_deref()
        .and_then(|s| s.parse().ok())
}

fn load_parties(
    arg: Option<&Path>,
    config: &Config,
    plotnamer_dir: &Path,
) -> Result<PartyTable> {
    let path = arg
        .map(Path::to_path_buf)
        .or_else(|| config.defaults.parties_csv.as_deref().map(PathBuf::from))
        .unwrap_or_else(|| plotnamer_dir.join("parties.csv"));
    if !path.exists() {
        PartyTable::write_default(&path)?;
        eprintln!("Created starter party table: {}", path.display());
    }
    PartyTable::load(&path)
}

fn print_outcome(outcome: &RenameOutcome, format: OutputFormat) -> i32 {
    print!("{}", outcome.format(format));
    match outcome.kind {
        OutcomeKind::Success => 0,
        OutcomeKind::Partial | OutcomeKind::Failure => 1,
    }
}
