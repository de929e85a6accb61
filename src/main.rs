use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use lms_anonymizer::grades::read_grade_identities;
use lms_anonymizer::mapping;
use lms_anonymizer::pipeline::read_log_identities;
use lms_anonymizer::{anonymize_grades_file, anonymize_logs_file, PassSummary, Session};

#[derive(Parser)]
#[command(name = "lms-anonymizer")]
#[command(
    about = "Anonymize Moodle logs and grade sheets, replacing student names and ids with consistent pseudonyms",
    long_about = None
)]
struct Cli {
    /// Seed for reproducible pseudonyms. Omit for a fresh random session.
    #[arg(long, global = true, env = "LMS_ANON_SEED")]
    seed: Option<u64>,

    /// Name mapping file, loaded before the run if it exists and saved after it.
    /// Keeps pseudonyms consistent when logs and grades are anonymized separately.
    /// The file links real names to pseudonyms: keep it private.
    #[arg(long, global = true, env = "LMS_ANON_MAPPING")]
    mapping: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Anonymize an activity log CSV (drops origin and IP address columns)
    Logs {
        /// Moodle log export (CSV)
        source: PathBuf,

        /// Where to write the anonymized log
        target: PathBuf,
    },

    /// Anonymize a grade sheet (xlsx, xls, ods or csv)
    Grades {
        /// Moodle grade export
        source: PathBuf,

        /// Where to write the anonymized sheet (.xlsx or .csv)
        target: PathBuf,
    },

    /// Anonymize logs and grades together so names match across both outputs
    Session {
        /// Log source and target
        #[arg(long, num_args = 2, value_names = ["SOURCE", "TARGET"], required = true)]
        logs: Vec<PathBuf>,

        /// Grade sheet source and target
        #[arg(long, num_args = 2, value_names = ["SOURCE", "TARGET"], required = true)]
        grades: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if let Some(path) = cli.mapping.as_deref().filter(|p| p.is_dir()) {
        bail!("Mapping path {} is a directory, expected a CSV file", path.display());
    }

    let mut session = match cli.seed {
        Some(seed) => Session::seeded(seed),
        None => Session::from_entropy(),
    };

    if let Some(path) = cli.mapping.as_deref().filter(|p| p.exists()) {
        let previous = mapping::load_name_map(path).context("Failed to read mapping file")?;
        session
            .preload_names(&previous)
            .context("Mapping file conflicts with this session")?;
        println!("Loaded {} name mappings from {}", previous.len(), path.display());
    }

    match cli.command {
        Commands::Logs { source, target } => {
            logs(&mut session, &source, &target)?;
        }
        Commands::Grades { source, target } => {
            grades(&mut session, &source, &target)?;
        }
        Commands::Session { logs: log_paths, grades: grade_paths } => {
            // Names from both files are off-limits as pseudonyms before either pass runs
            let mut identities = read_log_identities(&log_paths[0])
                .with_context(|| format!("Failed to read {}", log_paths[0].display()))?;
            identities.extend(
                read_grade_identities(&grade_paths[0])
                    .with_context(|| format!("Failed to read {}", grade_paths[0].display()))?,
            );
            session
                .reserve_identities(&identities)
                .context("Mapping file conflicts with these inputs")?;
            logs(&mut session, &log_paths[0], &log_paths[1])?;
            grades(&mut session, &grade_paths[0], &grade_paths[1])?;
        }
    }

    if let Some(path) = &cli.mapping {
        mapping::save_name_map(session.name_map(), path).context("Failed to write mapping file")?;
        println!("Saved {} name mappings to {}", session.name_map().len(), path.display());
    }

    Ok(())
}

fn logs(session: &mut Session, source: &Path, target: &Path) -> Result<()> {
    println!("Anonymizing logs: {}", source.display());
    let summary = anonymize_logs_file(session, source, target)
        .with_context(|| format!("Failed to anonymize {}", source.display()))?;
    print_summary(&summary);
    println!("  {} distinct user ids replaced", summary.user_ids);
    if !summary.dropped_columns.is_empty() {
        println!("  Removed columns: {}", summary.dropped_columns.join(", "));
    }
    println!("Written: {}", target.display());
    Ok(())
}

fn grades(session: &mut Session, source: &Path, target: &Path) -> Result<()> {
    println!("Anonymizing grades: {}", source.display());
    let summary = anonymize_grades_file(session, source, target)
        .with_context(|| format!("Failed to anonymize {}", source.display()))?;
    print_summary(&summary);
    println!("Written: {}", target.display());
    Ok(())
}

fn print_summary(summary: &PassSummary) {
    println!("  {} rows", summary.rows);
    println!(
        "  {} distinct names ({} new pseudonyms)",
        summary.names_seen, summary.new_pseudonyms
    );
}
