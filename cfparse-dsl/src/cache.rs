//! Per-session parse cache.
//!
//! Entries are keyed by `(namespace, filename)` and hold the statements of
//! one successful parse. The cache never checks whether a file changed on
//! disk; `source_digest` exposes what was parsed so callers can decide.

use crate::parser::Statement;
use cfparse_core::{Namespace, ParseError, ParseResult, ParserConfig, Range, WarningSink};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    namespace: String,
    filename: String,
}

impl CacheKey {
    fn new(namespace: &Namespace, filename: &str) -> Self {
        Self {
            namespace: namespace.get_full_name(),
            filename: filename.to_string(),
        }
    }
}

/// The stored result of parsing one file.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    statements: Arc<Vec<Statement>>,
    source_digest: String,
}

impl CacheEntry {
    pub fn new(statements: Vec<Statement>, source: &str) -> Self {
        Self {
            statements: Arc::new(statements),
            source_digest: digest(source),
        }
    }

    pub fn statements(&self) -> &Arc<Vec<Statement>> {
        &self.statements
    }
}

fn digest(source: &str) -> String {
    hex::encode(Sha256::digest(source.as_bytes()))
}

/// Snapshot of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Misses whose parse failed; nothing was stored for them.
    pub failures: u64,
}

impl CacheStats {
    /// Share of lookups served from the cache, in percent.
    pub fn hit_percentage(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 * 100.0 / total as f64
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

/// Shared parse cache. Clones share the same entries and counters.
#[derive(Debug, Clone, Default)]
pub struct ParseCache {
    config: ParserConfig,
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    counters: Arc<Counters>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose `get_or_parse` parses with `config`.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn read(
        &self,
        filename: &str,
    ) -> ParseResult<RwLockReadGuard<'_, HashMap<CacheKey, CacheEntry>>> {
        self.entries.read().map_err(|_| poisoned(filename))
    }

    fn write(
        &self,
        filename: &str,
    ) -> ParseResult<RwLockWriteGuard<'_, HashMap<CacheKey, CacheEntry>>> {
        self.entries.write().map_err(|_| poisoned(filename))
    }

    /// Statements for `filename`, parsing with this cache's configuration on a miss.
    pub fn get_or_parse(
        &self,
        namespace: &Arc<Namespace>,
        filename: &str,
        content: Option<&str>,
        warnings: &dyn WarningSink,
    ) -> ParseResult<Arc<Vec<Statement>>> {
        crate::parse_with(&self.config, self, namespace, filename, content, warnings)
    }

    /// Cached statements for the key, or the result of `build` which is
    /// stored when it succeeds. A failed build stores nothing.
    pub fn get_or_insert_with<F>(
        &self,
        namespace: &Namespace,
        filename: &str,
        build: F,
    ) -> ParseResult<Arc<Vec<Statement>>>
    where
        F: FnOnce() -> ParseResult<CacheEntry>,
    {
        let key = CacheKey::new(namespace, filename);
        if let Some(entry) = self.read(filename)?.get(&key) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(file = filename, namespace = %namespace, "parse cache hit");
            return Ok(entry.statements.clone());
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(file = filename, namespace = %namespace, "parse cache miss");

        let entry = match build() {
            Ok(entry) => entry,
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        };

        // A concurrent miss on the same key may have stored first; keep that one.
        let mut entries = self.write(filename)?;
        let stored = entries.entry(key).or_insert(entry);
        Ok(stored.statements.clone())
    }

    pub fn invalidate(&self, namespace: &Namespace, filename: &str) -> ParseResult<bool> {
        let key = CacheKey::new(namespace, filename);
        Ok(self.write(filename)?.remove(&key).is_some())
    }

    pub fn clear(&self) -> ParseResult<()> {
        self.write("")?.clear();
        Ok(())
    }

    pub fn len(&self) -> ParseResult<usize> {
        Ok(self.read("")?.len())
    }

    pub fn is_empty(&self) -> ParseResult<bool> {
        Ok(self.read("")?.is_empty())
    }

    /// SHA-256 (hex) of the source behind a cached entry.
    pub fn source_digest(
        &self,
        namespace: &Namespace,
        filename: &str,
    ) -> ParseResult<Option<String>> {
        let key = CacheKey::new(namespace, filename);
        Ok(self
            .read(filename)?
            .get(&key)
            .map(|entry| entry.source_digest.clone()))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    pub fn reset_stats(&self) {
        self.counters.hits.store(0, Ordering::Relaxed);
        self.counters.misses.store(0, Ordering::Relaxed);
        self.counters.failures.store(0, Ordering::Relaxed);
    }

    pub fn log_stats(&self) {
        let stats = self.stats();
        tracing::debug!(
            hits = stats.hits,
            misses = stats.misses,
            failures = stats.failures,
            "Compiler cache observed {} hits and {} misses ({:.0}%)",
            stats.hits,
            stats.misses,
            stats.hit_percentage()
        );
    }
}

fn poisoned(filename: &str) -> ParseError {
    ParseError::Internal {
        location: Range::file_start(filename),
        message: "parse cache lock poisoned".to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
