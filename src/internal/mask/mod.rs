//! Session-scoped identifier masking.
//!
//! Real APS identifiers (hub ids, project ids, folder/item URNs, version URNs) are long and
//! sometimes sensitive. Every identifier a tool observes is registered here and replaced with a
//! short surrogate of the form `<kind>_<n>`, where `n` starts at 1 and grows by one per newly
//! seen identifier of that kind. Surrogates handed back by a client are resolved to the real
//! identifier before any upstream call.
//!
//! The registry only ever grows and lives as long as the server process.

use std::{collections::HashMap, fmt};

use once_cell::sync::Lazy;
use regex::Regex;

/// Returned by [`MaskRegistry::mask`] for an empty identifier. Never registered.
pub const UNKNOWN_ID: &str = "Unknown";

static SURROGATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(hub|project|folder|item|version)_\d+$").expect("surrogate grammar is valid")
});

/// Kind of entity an identifier belongs to. Each kind has its own sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Hub,
    Project,
    Folder,
    Item,
    Version,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Hub,
        EntityKind::Project,
        EntityKind::Folder,
        EntityKind::Item,
        EntityKind::Version,
    ];

    /// Surrogate prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Hub => "hub",
            EntityKind::Project => "project",
            EntityKind::Folder => "folder",
            EntityKind::Item => "item",
            EntityKind::Version => "version",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Bidirectional real <-> surrogate mapping for one kind.
#[derive(Debug, Default)]
struct KindMap {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
}

impl KindMap {
    fn mask(&mut self, kind: EntityKind, real_id: &str) -> String {
        if let Some(masked) = self.forward.get(real_id) {
            return masked.clone();
        }
        // Never shrinks, so len + 1 is the next unused sequence number.
        let masked = format!("{}_{}", kind.prefix(), self.forward.len() + 1);
        self.forward.insert(real_id.to_string(), masked.clone());
        self.reverse.insert(masked.clone(), real_id.to_string());
        tracing::trace!(%kind, surrogate = %masked, "registered identifier");
        masked
    }
}

/// Registry of every identifier observed during the session.
///
/// Plain data with `&mut self` mutation; callers that share it across tasks wrap it in a mutex.
#[derive(Debug, Default)]
pub struct MaskRegistry {
    maps: [KindMap; 5],
    project_hubs: HashMap<String, String>,
}

impl MaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the surrogate for `real_id`, allocating the next one for `kind` on first sight.
    ///
    /// An empty `real_id` yields [`UNKNOWN_ID`] and leaves the registry untouched.
    pub fn mask(&mut self, kind: EntityKind, real_id: &str) -> String {
        if real_id.is_empty() {
            return UNKNOWN_ID.to_string();
        }
        self.maps[kind.index()].mask(kind, real_id)
    }

    /// Same as [`mask`](Self::mask) for an optional identifier.
    pub fn mask_opt(&mut self, kind: EntityKind, real_id: Option<&str>) -> String {
        self.mask(kind, real_id.unwrap_or_default())
    }

    /// Strict reverse lookup: `None` when `surrogate` was never issued for `kind`.
    pub fn lookup(&self, kind: EntityKind, surrogate: &str) -> Option<&str> {
        self.maps[kind.index()]
            .reverse
            .get(surrogate)
            .map(String::as_str)
    }

    /// Returns the real identifier behind `surrogate`, or `surrogate` itself when unknown.
    pub fn unmask(&self, kind: EntityKind, surrogate: &str) -> String {
        self.lookup(kind, surrogate).unwrap_or(surrogate).to_string()
    }

    /// Syntactic check against `^(hub|project|folder|item|version)_\d+$`.
    pub fn is_surrogate(candidate: &str) -> bool {
        SURROGATE_RE.is_match(candidate)
    }

    /// Turns caller input into a real identifier: surrogates are unmasked, anything else passes
    /// through unchanged.
    pub fn resolve(&self, kind: EntityKind, input: &str) -> String {
        if Self::is_surrogate(input) {
            self.unmask(kind, input)
        } else {
            input.to_string()
        }
    }

    /// Records the owning hub of a project. Last write wins.
    pub fn register_project_hub(&mut self, project_id: &str, hub_id: &str) {
        if let Some(previous) = self
            .project_hubs
            .insert(project_id.to_string(), hub_id.to_string())
            && previous != hub_id
        {
            tracing::debug!(project = %project_id, "project moved to a different hub");
        }
    }

    /// Hub registered for `project_id`, if `list_projects` has seen it.
    pub fn hub_of(&self, project_id: &str) -> Option<&str> {
        self.project_hubs.get(project_id).map(String::as_str)
    }

    /// Number of identifiers registered for `kind`.
    pub fn len(&self, kind: EntityKind) -> usize {
        self.maps[kind.index()].forward.len()
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|kind| self.len(*kind) == 0)
    }
}
