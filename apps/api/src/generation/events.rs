//! Progress reporting for pack runs.
//!
//! The pipeline never logs directly about artifacts; it emits `PackEvent`s to
//! whatever sink the caller injected. `TracingSink` is the production default,
//! `CollectingSink` keeps the lines for the preview endpoints and tests.

use std::fmt;
use std::sync::Mutex;

use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum PackEvent {
    SeedResolved { source: &'static str, chars: usize },
    SeedFetchFailed { url: String },
    TextGenerated { artifact: String, tokens: u32 },
    TextFallback { artifact: String },
    ImageGenerated { artifact: String, url: String },
    ImageStored { path: String, source_url: String },
    ImageSkipped { artifact: String },
}

impl PackEvent {
    fn is_degraded(&self) -> bool {
        matches!(
            self,
            PackEvent::SeedFetchFailed { .. }
                | PackEvent::TextFallback { .. }
                | PackEvent::ImageSkipped { .. }
        )
    }
}

impl fmt::Display for PackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackEvent::SeedResolved { source, chars } => {
                write!(f, "seed resolved from {source} ({chars} chars)")
            }
            PackEvent::SeedFetchFailed { url } => write!(f, "seed fetch failed for {url}"),
            PackEvent::TextGenerated { artifact, tokens } => {
                write!(f, "AI generated {artifact} ({tokens} tokens)")
            }
            PackEvent::TextFallback { artifact } => {
                write!(f, "template fallback used for {artifact}")
            }
            PackEvent::ImageGenerated { artifact, url } => {
                write!(f, "image generated for {artifact} at {url}")
            }
            PackEvent::ImageStored { path, source_url } => {
                write!(f, "image stored at {path} from {source_url}")
            }
            PackEvent::ImageSkipped { artifact } => write!(f, "image skipped for {artifact}"),
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: PackEvent);
}

/// Forwards events to `tracing`; degraded outcomes log at WARN.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PackEvent) {
        if event.is_degraded() {
            warn!("{event}");
        } else {
            info!("{event}");
        }
    }
}

/// Captures rendered event lines in order, also forwarding to `tracing`.
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn into_lines(self) -> Vec<String> {
        match self.lines.into_inner() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: PackEvent) {
        let line = event.to_string();
        TracingSink.emit(event);
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}
