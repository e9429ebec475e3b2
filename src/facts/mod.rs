// src/facts/mod.rs
//! Package fact resolution: an ordered chain of sources, each contributing a
//! partial record, merged first-writer-wins per field.

pub mod extract;
pub mod sources;

use async_trait::async_trait;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Shown when no source produced a version.
pub const UNKNOWN_VERSION: &str = "—";

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "trackers_source_attempts_total",
            "Fact source attempts, labelled by source."
        );
        describe_counter!(
            "trackers_source_empty_total",
            "Fact source attempts that contributed nothing."
        );
        describe_histogram!(
            "trackers_resolve_ms",
            "Wall time of one package resolution in milliseconds."
        );
    });
}

/// Partial or merged facts for one package. Every field is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRecord {
    pub latest_version: Option<String>,
    pub summary: Option<String>,
    pub download_count: Option<u64>,
}

impl FactRecord {
    pub fn is_complete(&self) -> bool {
        self.latest_version.is_some() && self.summary.is_some() && self.download_count.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.latest_version.is_none() && self.summary.is_none() && self.download_count.is_none()
    }

    /// Fill still-empty fields from `partial`; filled fields are never
    /// replaced. Blank strings count as empty. Returns the number of fields
    /// newly filled.
    pub fn absorb(&mut self, partial: FactRecord) -> usize {
        let mut filled = 0;
        if self.latest_version.is_none() {
            if let Some(v) = non_blank(partial.latest_version) {
                self.latest_version = Some(v);
                filled += 1;
            }
        }
        if self.summary.is_none() {
            if let Some(s) = non_blank(partial.summary) {
                self.summary = Some(s);
                filled += 1;
            }
        }
        if self.download_count.is_none() {
            if let Some(n) = partial.download_count {
                self.download_count = Some(n);
                filled += 1;
            }
        }
        filled
    }

    /// Apply display defaults to whatever is still missing.
    pub fn finalize(self) -> Facts {
        Facts {
            latest_version: self
                .latest_version
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            summary: self.summary.unwrap_or_default(),
            download_count: self.download_count.unwrap_or(0),
        }
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Finalized facts handed to presentation. An empty summary means "omit".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facts {
    pub latest_version: String,
    pub summary: String,
    pub download_count: u64,
}

/// Outcome of one source attempt. Absence is expected, so it is a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    Partial(FactRecord),
    Empty,
}

impl From<FactRecord> for Enrichment {
    fn from(rec: FactRecord) -> Self {
        if rec.is_empty() {
            Enrichment::Empty
        } else {
            Enrichment::Partial(rec)
        }
    }
}

impl From<Option<FactRecord>> for Enrichment {
    fn from(rec: Option<FactRecord>) -> Self {
        rec.map(Enrichment::from).unwrap_or(Enrichment::Empty)
    }
}

/// One tier of the fallback chain. Implementations swallow their own
/// failures and report them as [`Enrichment::Empty`].
#[async_trait]
pub trait FactSource: Send + Sync {
    /// `known` is the record merged so far; sources use it to skip work
    /// for fields that are already filled.
    async fn attempt(&self, package: &str, known: &FactRecord) -> Enrichment;
    fn name(&self) -> &'static str;
}

/// Run `sources` in order and merge their partial records.
pub async fn resolve_facts(package: &str, sources: &[Box<dyn FactSource>]) -> FactRecord {
    ensure_metrics_described();
    let t0 = std::time::Instant::now();

    let mut record = FactRecord::default();
    for source in sources {
        if record.is_complete() {
            break;
        }
        counter!("trackers_source_attempts_total", "source" => source.name()).increment(1);
        match source.attempt(package, &record).await {
            Enrichment::Partial(partial) => {
                let filled = record.absorb(partial);
                tracing::debug!(
                    target: "facts",
                    package,
                    source = source.name(),
                    filled,
                    "source contributed"
                );
            }
            Enrichment::Empty => {
                counter!("trackers_source_empty_total", "source" => source.name()).increment(1);
                tracing::debug!(target: "facts", package, source = source.name(), "source empty");
            }
        }
    }

    histogram!("trackers_resolve_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    record
}
