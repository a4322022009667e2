//! `kiln replay`: feed recorded diagnostics through a configured aggregator.
//!
//! 1. Find project root (walk up looking for `kiln.toml`)
//! 2. Load config via `kiln_config` and apply CLI overrides
//! 3. Build the aggregator and its listeners
//! 4. Replay every input file, one rayon worker per file
//! 5. Flush listeners and print the summary

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use kiln_config::Overrides;
use kiln_diagnostics::{Aggregator, Category, Diagnostic, DiagnosticCode};
use rayon::prelude::*;

use crate::pipeline::{build_listeners, explicit_config_file, resolve_project_root};
use crate::{GlobalArgs, ReplayArgs};

/// Code attached to lines that are not valid diagnostics.
const MALFORMED_INPUT: DiagnosticCode = DiagnosticCode {
    category: Category::Build,
    number: 1,
};

/// Code attached to input files that cannot be read.
const UNREADABLE_INPUT: DiagnosticCode = DiagnosticCode {
    category: Category::Build,
    number: 2,
};

/// Runs the `kiln replay` command.
///
/// Returns exit code 0 if the replayed run succeeded, 1 if it failed.
pub fn run(args: &ReplayArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    // Step 1: Find project root
    let project_dir = resolve_project_root(global)?;

    // Step 2: Load config and merge CLI overrides; an explicit --config must exist
    let config = match explicit_config_file(global) {
        Some(path) => kiln_config::load_config_file(&path)?,
        None => kiln_config::load_config(&project_dir)?,
    };
    let overrides = Overrides {
        threshold: args.threshold,
        warnings_as_errors: args.warnings_as_errors.then_some(true),
        throttle_limit: args.throttle_limit,
    };
    let resolved = kiln_config::resolve_diagnostics(&config, &project_dir, &overrides)?;

    // Step 3: Aggregator and listeners
    let aggregator = Arc::new(resolved.aggregator_builder().build()?);
    for listener in build_listeners(&resolved, args.format, global)? {
        aggregator.register_listener(listener);
    }

    tracing::info!(
        files = args.files.len(),
        threshold = %resolved.threshold,
        warnings_as_errors = resolved.warnings_as_errors,
        throttle_limit = resolved.throttle_limit,
        "replaying diagnostics",
    );

    // Step 4: Replay; files run in parallel, lines within a file stay in order
    let replayed: usize = args
        .files
        .par_iter()
        .map(|path| replay_file(path, &aggregator))
        .sum();

    tracing::debug!(replayed, "replay finished");

    // Step 5: Flush and summarize
    aggregator.flush();
    if !global.quiet {
        aggregator.print_summary();
    }

    Ok(if aggregator.has_failed() { 1 } else { 0 })
}

/// Logs every diagnostic in one JSON-lines file. Returns the number of lines logged.
///
/// Blank lines are skipped. Lines that do not parse, and files that cannot be
/// read, are reported as errors through the aggregator instead of aborting.
pub fn replay_file(path: &Path, aggregator: &Aggregator) -> usize {
    let display = path.display().to_string();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            aggregator.log(
                Diagnostic::error(format!("cannot read diagnostics file: {e}"))
                    .with_file(display)
                    .with_code(UNREADABLE_INPUT),
            );
            return 0;
        }
    };

    let mut logged = 0;
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line_no = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                aggregator.log(
                    Diagnostic::error(format!("cannot read diagnostics file: {e}"))
                        .with_file(display.clone())
                        .with_line(line_no)
                        .with_code(UNREADABLE_INPUT),
                );
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let diagnostic = match serde_json::from_str::<Diagnostic>(trimmed) {
            Ok(diagnostic) => diagnostic,
            Err(e) => Diagnostic::error(format!("malformed diagnostic: {e}"))
                .with_file(display.clone())
                .with_line(line_no)
                .with_code(MALFORMED_INPUT),
        };
        aggregator.log(diagnostic);
        logged += 1;
    }
    logged
}
