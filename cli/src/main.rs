//! cpf - Copy File
//!
//! Copy, archive, hard-link or move a single filesystem entry, powered by
//! copyfile.

use clap::{Parser, ValueEnum};
use copyfile::{
    CopyBuilder, Error as CopyfileError, ErrorCode, MetadataFlags, Operation,
    ProgressBarCallback, create_progress_bar,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// cpf - copy a single file, symlink, directory or special file
///
/// DEST is the full path of the new entry. Directories are created, not
/// copied recursively.
///
/// Usage:
///   cpf SOURCE DEST
///   cpf -a SOURCE DEST
///   cpf -m SOURCE DEST
#[derive(Parser, Debug)]
#[command(name = "cpf", version, about, long_about = None)]
struct Args {
    /// Entry to copy
    source: PathBuf,

    /// Path of the new entry
    dest: PathBuf,

    /// Copy the entry together with its metadata
    #[arg(short = 'a', long, group = "mode")]
    archive: bool,

    /// Hard-link the entry, copying it where linking is not possible
    #[arg(short = 'l', long, group = "mode")]
    link: bool,

    /// Move the entry, copying and removing it across filesystems
    #[arg(short = 'm', long = "move", group = "mode")]
    move_entry: bool,

    /// Metadata to preserve (implies --archive)
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        value_name = "LIST",
        conflicts_with_all = ["link", "move_entry"]
    )]
    preserve: Vec<PreserveItem>,

    /// Size of each read in bytes
    #[arg(long, value_name = "BYTES")]
    buffer_size: Option<usize>,

    /// Do not reserve destination space before copying
    #[arg(long)]
    no_preallocate: bool,

    /// Sync the destination to disk before finishing
    #[arg(long)]
    fsync: bool,

    /// Disable progress bar and summary
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum PreserveItem {
    /// User and group ownership
    Owner,
    /// Permission bits
    Mode,
    /// Access and modification times
    Timestamps,
    /// Extended attributes
    Xattr,
    /// Everything above
    All,
}

impl PreserveItem {
    fn flags(self) -> MetadataFlags {
        match self {
            Self::Owner => MetadataFlags::OWNER,
            Self::Mode => MetadataFlags::MODE,
            Self::Timestamps => MetadataFlags::TIMES,
            Self::Xattr => MetadataFlags::XATTR,
            Self::All => MetadataFlags::ALL,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to {operation} {path}: {source}")]
    Copy {
        operation: Operation,
        path: PathBuf,
        source: CopyfileError,
    },

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::Copy { source, .. } => source.code(),
            Self::JsonSerialize { .. } => ErrorCode::Internal,
        }
    }
}

fn exit_code_for(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::Aborted => 130,
        _ => 1,
    }
}

/// Outcome of one invocation, as reported by `--output json`.
#[derive(Debug)]
struct Report<'a> {
    source: &'a Path,
    destination: &'a Path,
    operation: Operation,
    applied: MetadataFlags,
    error: Option<&'a CliError>,
}

impl Report<'_> {
    fn outcome(&self) -> &'static str {
        match self.error {
            None => "done",
            Some(error) if error.code() == ErrorCode::Aborted => "aborted",
            Some(_) => "failed",
        }
    }

    fn to_json_value(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("source".to_owned(), Value::String(display_path(self.source)));
        obj.insert(
            "destination".to_owned(),
            Value::String(display_path(self.destination)),
        );
        obj.insert(
            "operation".to_owned(),
            Value::String(self.operation.as_str().to_owned()),
        );
        obj.insert("outcome".to_owned(), Value::String(self.outcome().to_owned()));
        obj.insert(
            "metadata_applied".to_owned(),
            Value::Array(
                self.applied
                    .names()
                    .map(|name| Value::String(name.to_owned()))
                    .collect(),
            ),
        );

        if let Some(error) = self.error {
            obj.insert(
                "error_code".to_owned(),
                Value::String(error.code().as_str().to_owned()),
            );
            obj.insert("error_message".to_owned(), Value::String(error.to_string()));
        }

        Value::Object(obj)
    }
}

fn main() {
    if let Err(error) = run() {
        if error.code() == ErrorCode::Aborted {
            eprintln!("Cancelled.");
        } else {
            eprintln!("error[{}]: {}", error.code().as_str(), error);
        }
        std::process::exit(exit_code_for(error.code()));
    }
}

fn run() -> CliResult<()> {
    let args = Args::parse();

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel_clone = cancel.clone();
        ctrlc::set_handler(move || {
            if cancel_clone.load(Ordering::Relaxed) {
                eprintln!("\nForce quit.");
                std::process::exit(130);
            }
            cancel_clone.store(true, Ordering::Relaxed);
            eprintln!("\nCancelling... Press Ctrl+C again to abort immediately.");
        })
        .ok();
    }

    let builder = build_copy(&args, cancel.clone());
    let operation = builder.selected_operation();

    let show_progress = args.output == OutputMode::Human && !args.quiet;
    let result = if show_progress {
        let mut callback =
            ProgressBarCallback::new(create_progress_bar(0)).with_cancel_flag(cancel);
        let result = builder.run_with(&mut callback);
        callback.progress_bar().finish_and_clear();
        result
    } else {
        builder.run()
    };

    let (applied, error) = match result {
        Ok(applied) => (applied, None),
        Err(source) => (
            MetadataFlags::EMPTY,
            Some(CliError::Copy {
                operation,
                path: args.source.clone(),
                source,
            }),
        ),
    };

    match args.output {
        OutputMode::Human => {
            if error.is_none() && !args.quiet {
                print_summary(operation, &args.source, &args.dest, applied);
            }
        }
        OutputMode::Json => {
            let report = Report {
                source: &args.source,
                destination: &args.dest,
                operation,
                applied,
                error: error.as_ref(),
            };
            print_json_value(&report.to_json_value())?;
        }
    }

    error.map_or(Ok(()), Err)
}

fn build_copy(args: &Args, cancel: Arc<AtomicBool>) -> CopyBuilder {
    let mut builder = CopyBuilder::new(&args.source, &args.dest).cancel_token(cancel);

    if !args.preserve.is_empty() {
        let flags = args
            .preserve
            .iter()
            .fold(MetadataFlags::EMPTY, |acc, item| acc | item.flags());
        builder = builder.preserve(flags);
    }
    if args.archive {
        if args.preserve.is_empty() {
            builder = builder.archive();
        }
    } else if args.link {
        builder = builder.hard_link();
    } else if args.move_entry {
        builder = builder.rename();
    }

    if let Some(size) = args.buffer_size {
        builder = builder.buffer_size(size);
    }
    if args.no_preallocate {
        builder = builder.no_preallocate();
    }
    if args.fsync {
        builder = builder.fsync();
    }

    builder
}

fn print_summary(operation: Operation, source: &Path, dest: &Path, applied: MetadataFlags) {
    let verb = match operation {
        Operation::Copy => "Copied",
        Operation::Archive => "Archived",
        Operation::Link => "Linked",
        Operation::Move => "Moved",
    };
    if applied.is_empty() {
        println!("{verb} {} -> {}", source.display(), dest.display());
    } else {
        println!(
            "{verb} {} -> {} (preserved: {applied})",
            source.display(),
            dest.display()
        );
    }
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
