//! Event resolution. Each distinct group key is decided exactly once per
//! run: either it maps to a destination event directory (existing or newly
//! named) or it is ignored. The driver memoizes the outcome; this module
//! only ever sees a key's first observation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info};

use crate::geocode::GeoLookup;
use crate::keys::{GroupKey, sanitize_segment};
use crate::prompt::Prompt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDecision {
    Resolved(PathBuf),
    Ignored,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Non-interactive: pick the Nth matching directory, clamped to the
    /// last match when out of range.
    pub match_index: Option<usize>,
    /// Treat every event with at least one matching directory as already
    /// imported.
    pub ignore_all: bool,
    /// Name new events after the reverse-geocoded location.
    pub gps_naming: bool,
    /// Skip the free-text name prompt when no matches exist; the bare date
    /// becomes the directory name.
    pub date_only: bool,
}

pub struct EventResolver<'a> {
    options: ResolveOptions,
    prompt: &'a mut dyn Prompt,
    geo: &'a dyn GeoLookup,
}

impl<'a> EventResolver<'a> {
    pub fn new(
        options: ResolveOptions,
        prompt: &'a mut dyn Prompt,
        geo: &'a dyn GeoLookup,
    ) -> Self {
        Self { options, prompt, geo }
    }

    pub fn resolve(&mut self, key: &GroupKey, media_root: &Path) -> Result<EventDecision> {
        let stem = media_root.join(&key.make).join(&key.model).join(key.year_str());
        let candidates = matching_event_dirs(&stem, &key.date_str())?;
        debug!("{key}: {} matching directories under {}", candidates.len(), stem.display());

        // Precedence: match-index override, ignore-all, GPS naming, prompt.
        if let Some(index) = self.options.match_index
            && !candidates.is_empty()
        {
            let pick = index.min(candidates.len() - 1);
            if pick != index {
                info!("match index {index} out of range for {key}, clamping to {pick}");
            }
            return Ok(EventDecision::Resolved(candidates[pick].clone()));
        }
        if self.options.ignore_all && !candidates.is_empty() {
            return Ok(EventDecision::Ignored);
        }
        if self.options.gps_naming
            && let Some(cell) = key.gps
        {
            let name = if let Some(place) = self.geo.lookup(cell.lat(), cell.lon())
                && let Some(location) = place.display_name()
            {
                format!("{} {}", key.date_str(), sanitize_segment(location))
            } else {
                // No usable address: the event still resolves, named by
                // date alone.
                key.date_str()
            };
            return Ok(EventDecision::Resolved(stem.join(name)));
        }
        self.resolve_interactively(key, &stem, &candidates)
    }

    fn resolve_interactively(
        &mut self,
        key: &GroupKey,
        stem: &Path,
        candidates: &[PathBuf],
    ) -> Result<EventDecision> {
        let menu = render_menu(key, candidates);
        loop {
            let answer = self.prompt.ask(&menu)?;
            match answer.trim() {
                "n" | "N" => {
                    let name = self.new_event_name(key, candidates)?;
                    return Ok(EventDecision::Resolved(stem.join(name)));
                }
                "i" | "I" => return Ok(EventDecision::Ignored),
                other => {
                    if let Ok(index) = other.parse::<usize>()
                        && index < candidates.len()
                    {
                        return Ok(EventDecision::Resolved(candidates[index].clone()));
                    }
                    eprintln!("Unrecognized choice: {other:?}");
                }
            }
        }
    }

    fn new_event_name(&mut self, key: &GroupKey, candidates: &[PathBuf]) -> Result<String> {
        if self.options.date_only && candidates.is_empty() {
            return Ok(key.date_str());
        }
        let title = self.prompt.ask("Event name (empty for date only): ")?;
        let title = sanitize_segment(title.trim());
        if title.is_empty() {
            Ok(key.date_str())
        } else {
            Ok(format!("{} {}", key.date_str(), title))
        }
    }
}

/// Existing event directories under the stem whose name starts with the
/// key's date, name-sorted for a stable prompt order. A stem that does not
/// exist yet simply has no matches.
fn matching_event_dirs(stem: &Path, date_str: &str) -> io::Result<Vec<PathBuf>> {
    let mut matches = Vec::new();
    let entries = match fs::read_dir(stem) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(matches),
        Err(err) => return Err(err),
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir()
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
            && name.starts_with(date_str)
        {
            matches.push(path);
        }
    }
    matches.sort();
    Ok(matches)
}

fn render_menu(key: &GroupKey, candidates: &[PathBuf]) -> String {
    let mut menu = String::new();
    if candidates.is_empty() {
        menu.push_str(&format!("No existing events for {key}.\n"));
    } else {
        menu.push_str(&format!("Existing events for {key}:\n"));
        for (index, path) in candidates.iter().enumerate() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
            menu.push_str(&format!("  [{index}] {name}\n"));
        }
    }
    menu.push_str("Choose a number, [n]ew event, or [i]gnore: ");
    menu
}
