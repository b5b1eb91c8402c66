//! The two-phase driver. Every grouping decision is made during the scan
//! phase, before any file is touched, so aborting mid-run never leaves a
//! half-grouped library; the move phase only replays recorded decisions.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::keys::{GroupKey, KeyBuilder};
use crate::media::{self, MediaKind};
use crate::metadata::{MediaMetadata, MetadataAdapter};
use crate::plan::plan_path;
use crate::resolve::{EventDecision, EventResolver};
use crate::transfer::{Mover, TransferOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAssignment {
    pub source: PathBuf,
    pub kind: MediaKind,
    pub key: GroupKey,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ScanOutcome {
    pub decisions: HashMap<GroupKey, EventDecision>,
    pub assignments: Vec<FileAssignment>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub transferred: usize,
    pub skipped_existing: usize,
    pub ignored: usize,
}

pub struct MediaRoots {
    pub image: PathBuf,
    pub video: PathBuf,
}

impl MediaRoots {
    pub fn for_kind(&self, kind: MediaKind) -> &Path {
        match kind {
            MediaKind::Video => &self.video,
            MediaKind::Raw | MediaKind::Jpeg => &self.image,
        }
    }
}

fn kind_rank(kind: MediaKind) -> u8 {
    match kind {
        MediaKind::Raw => 0,
        MediaKind::Jpeg => 1,
        MediaKind::Video => 2,
    }
}

/// Top-level regular files of the pool, classified by extension. Order is
/// fixed (raw, then jpeg, then video, name-sorted within each class) so
/// prompting order is reproducible between runs.
pub fn enumerate_pool(source: &Path) -> Result<Vec<(PathBuf, MediaKind)>> {
    let mut files = Vec::new();
    let entries = fs::read_dir(source)
        .with_context(|| format!("reading pool directory {}", source.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", source.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match media::classify(&path) {
            Some(kind) => files.push((path, kind)),
            None => debug!("skipping unclassified file {}", path.display()),
        }
    }
    files.sort_by(|a, b| {
        kind_rank(a.1)
            .cmp(&kind_rank(b.1))
            .then_with(|| a.0.file_name().cmp(&b.0.file_name()))
    });
    Ok(files)
}

/// Scan phase: extract metadata, build keys, resolve each key on first
/// sight, and record one assignment per file. No file is touched here.
pub fn scan_pool(
    files: &[(PathBuf, MediaKind)],
    adapter: &dyn MetadataAdapter,
    key_builder: &KeyBuilder,
    resolver: &mut EventResolver<'_>,
    roots: &MediaRoots,
) -> Result<ScanOutcome> {
    let mut decisions: HashMap<GroupKey, EventDecision> = HashMap::new();
    let mut assignments = Vec::with_capacity(files.len());

    for (path, kind) in files {
        let meta = match adapter.read(path, *kind) {
            Ok(meta) => meta,
            Err(err) => {
                warn!("{err}");
                MediaMetadata::empty(*kind)
            }
        };
        let key = key_builder.build(path, &meta);
        if !decisions.contains_key(&key) {
            let decision = resolver.resolve(&key, roots.for_kind(*kind))?;
            match &decision {
                EventDecision::Resolved(dir) => info!("{key} -> {}", dir.display()),
                EventDecision::Ignored => info!("{key} -> ignored"),
            }
            decisions.insert(key.clone(), decision);
        }
        assignments.push(FileAssignment { source: path.clone(), kind: *kind, key });
    }

    Ok(ScanOutcome { decisions, assignments })
}

/// Move phase: replay the recorded decisions in scan order. Metadata is
/// never re-read; an assignment without a decision is a logic fault, not
/// a user error.
pub fn transfer_pool(outcome: &ScanOutcome, mover: &Mover) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    let pb = ProgressBar::new(outcome.assignments.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) Transferring files...")
            .expect("Failed to set progress bar style"),
    );

    for assignment in &outcome.assignments {
        let decision = outcome.decisions.get(&assignment.key).ok_or_else(|| {
            anyhow!(
                "no event decision recorded for {} (key {})",
                assignment.source.display(),
                assignment.key
            )
        })?;
        match decision {
            EventDecision::Ignored => summary.ignored += 1,
            EventDecision::Resolved(event_dir) => {
                let file_name = assignment
                    .source
                    .file_name()
                    .ok_or_else(|| anyhow!("assignment without a file name: {}", assignment.source.display()))?;
                let dest = plan_path(event_dir, assignment.kind, file_name);
                match mover.transfer(&assignment.source, &dest)? {
                    TransferOutcome::Transferred => summary.transferred += 1,
                    TransferOutcome::SkippedExisting => summary.skipped_existing += 1,
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Transfer complete");
    Ok(summary)
}
