//! End-to-end run: read → identify → resolve → assemble → write.
//!
//! Nothing is written until every fatal check has passed, so a failed run
//! never leaves a partial graph behind.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::bridge::{instructor_ids, IdentityBridge};
use crate::config::Config;
use crate::course::CourseResolver;
use crate::directory::DirectoryLookup;
use crate::error::Result;
use crate::graph::{assemble_statements, write_graph, GraphFormat};
use crate::ingest::{compute_file_hash, read_offerings};
use crate::mint::{IdGenerator, IdentifierMinter};
use crate::registry::EntityRegistry;
use crate::report::{write_side_logs, RunSummary};
use crate::term::{check_term_codes, TermCalendar};

/// Everything a run needs besides its input and output paths.
pub struct PipelineOptions {
    pub namespace: String,
    pub course_prefix: String,
    pub short_id_attribute: String,
    pub concurrency: usize,
    pub encoding: String,
    pub format: GraphFormat,
    pub log_dir: PathBuf,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            namespace: config.graph.namespace.clone(),
            course_prefix: config.graph.course_prefix.clone(),
            short_id_attribute: config.directory.short_id_attribute.clone(),
            concurrency: config.directory.concurrency,
            encoding: config.ingest.encoding.clone(),
            format: config.graph.format,
            log_dir: config.logging.log_dir.clone(),
        }
    }
}

/// External collaborators of a run.
pub struct Services {
    pub directory: Arc<dyn DirectoryLookup>,
    pub registry: Arc<dyn EntityRegistry>,
    pub ids: Box<dyn IdGenerator>,
}

/// What `--check` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub rows: usize,
    pub terms: usize,
    pub instructors: usize,
}

/// Validate input shape and term codes without contacting any service.
pub fn check_input(input: &Path, encoding: &str) -> Result<CheckReport> {
    let rows = read_offerings(input, encoding)?;
    check_term_codes(&rows)?;
    Ok(CheckReport {
        rows: rows.len(),
        terms: rows.iter().map(|r| &r.term_code).collect::<BTreeSet<_>>().len(),
        instructors: instructor_ids(&rows).len(),
    })
}

/// Run the whole ingest and write the graph plus side logs.
pub async fn run(input: &Path, output: &Path, options: &PipelineOptions, services: Services) -> Result<RunSummary> {
    let started_at = Utc::now();
    let Services {
        directory,
        registry,
        ids,
    } = services;

    log::info!("Reading offerings from {}", input.display());
    let rows = read_offerings(input, &options.encoding)?;
    check_term_codes(&rows)?;
    let rows_read = rows.len();

    log::info!("Loading short ids from registry");
    let registry_index = registry.short_id_index().await?;

    let bridge = IdentityBridge::new(directory.as_ref(), options.short_id_attribute.clone(), options.concurrency);
    let outcome = bridge.run(rows, &registry_index).await;
    let rows_identified = outcome.identified.len();
    let distinct_instructors = outcome.directory_index.len();

    let minter = IdentifierMinter::new(registry, options.namespace.clone(), ids);
    let mut resolver = CourseResolver::new(
        TermCalendar::new(options.namespace.clone()),
        minter,
        options.course_prefix.clone(),
    );
    let resolved = resolver.resolve_all(outcome.identified).await?;

    let statements = assemble_statements(resolver.terms().terms(), &resolved);
    write_graph(output, &statements, options.format)?;

    let stats = resolver.stats();
    let summary = RunSummary {
        run_id: Uuid::new_v4().to_string(),
        input: input.to_path_buf(),
        input_sha256: compute_file_hash(input)?,
        output: output.to_path_buf(),
        started_at,
        finished_at: Utc::now(),
        rows_read,
        rows_identified,
        rows_skipped: outcome.skipped.len(),
        distinct_instructors,
        courses_minted: stats.minted,
        rows_merged: stats.merged,
        terms: resolver.terms().len(),
        statements: statements.len(),
    };
    write_side_logs(&options.log_dir, &outcome.directory_index, &outcome.skipped, &summary)?;

    log::info!(
        "Run complete: {} rows read, {} identified, {} skipped, {} courses, {} terms, {} statements",
        summary.rows_read,
        summary.rows_identified,
        summary.rows_skipped,
        summary.courses_minted,
        summary.terms,
        summary.statements
    );
    Ok(summary)
}
