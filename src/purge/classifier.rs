use futures::{StreamExt, stream};
use tokio_util::sync::CancellationToken;

use super::metadata::MetadataReader;
use crate::{
    db::{DbError, DbResult},
    models::{Classification, ColumnDescriptor, EarliestValueSample},
};

/// Decides whether a column may be a creation column at all, by name.
///
/// A column is rejected when its lowercased name contains any of the
/// patterns. The default pattern is `update`.
#[derive(Debug, Clone)]
pub struct CreationColumnFilter {
    patterns: Vec<String>,
}

impl Default for CreationColumnFilter {
    fn default() -> Self {
        Self::new(["update"])
    }
}

impl CreationColumnFilter {
    /// Empty patterns are dropped.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn admits(&self, column: &ColumnDescriptor) -> bool {
        self.admits_name(&column.name)
    }

    pub fn admits_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        !self.patterns.iter().any(|p| name.contains(p.as_str()))
    }
}

/// Picks the column holding each row's creation time.
///
/// 1. Date/datetime columns are fetched from the catalog.
/// 2. Columns rejected by the [`CreationColumnFilter`] are dropped.
/// 3. A single remaining column is returned without touching user data.
/// 4. Otherwise every remaining column's `MIN` is probed and the earliest
///    wins. Dates count as midnight. Equal minimums go to the column that
///    comes first in the catalog.
///
/// A failed probe removes only that column from the comparison.
pub struct ColumnClassifier {
    reader: MetadataReader,
    filter: CreationColumnFilter,
    probe_concurrency: usize,
}

impl ColumnClassifier {
    pub fn new(reader: MetadataReader, filter: CreationColumnFilter) -> Self {
        Self {
            reader,
            filter,
            probe_concurrency: 1,
        }
    }

    /// Allow up to `n` MIN probes in flight per table. Results are still
    /// compared in catalog order.
    pub fn with_probe_concurrency(mut self, n: usize) -> Self {
        self.probe_concurrency = n.max(1);
        self
    }

    pub fn reader(&self) -> &MetadataReader {
        &self.reader
    }

    /// The creation column of `schema.table`, if one can be determined.
    pub async fn classify(&self, schema: &str, table: &str) -> Option<String> {
        self.classify_detailed(schema, table, &CancellationToken::new())
            .await
            .into_column()
    }

    /// Same as [`classify`](Self::classify) but reports why no column was
    /// found. Once `cancel` fires the result is `Cancelled`, never a column.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn classify_detailed(
        &self,
        schema: &str,
        table: &str,
        cancel: &CancellationToken,
    ) -> Classification {
        if cancel.is_cancelled() {
            return Classification::Cancelled;
        }

        let columns = match self.reader.fetch_candidates(schema, table).await {
            Ok(columns) => columns,
            Err(e) if e.source.is_connection_lost() => return Classification::ConnectionLost,
            Err(_) => return Classification::Unavailable,
        };
        if cancel.is_cancelled() {
            return Classification::Cancelled;
        }

        let candidates: Vec<ColumnDescriptor> = columns
            .into_iter()
            .filter(|c| {
                let admitted = self.filter.admits(c);
                if !admitted {
                    tracing::debug!(column = %c.name, "Excluded by name");
                }
                admitted
            })
            .collect();

        match candidates.as_slice() {
            [] => return Classification::NoCandidates,
            [only] => return Classification::Resolved(only.name.clone()),
            _ => {}
        }

        tracing::debug!(
            candidates = candidates.len(),
            "Several candidate columns; comparing earliest values"
        );

        let samples = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Classification::Cancelled,
            samples = self.sample_earliest(schema, table, &candidates) => samples,
        };
        if cancel.is_cancelled() {
            return Classification::Cancelled;
        }
        let samples = match samples {
            Ok(samples) => samples,
            Err(e) => {
                tracing::error!(error = %e, "Connection lost while comparing earliest values");
                return Classification::ConnectionLost;
            }
        };

        match select_earliest(&samples) {
            Some(column) => Classification::Resolved(column.to_string()),
            None => {
                tracing::warn!("No candidate column produced an earliest value");
                Classification::Unavailable
            }
        }
    }

    async fn sample_earliest(
        &self,
        schema: &str,
        table: &str,
        candidates: &[ColumnDescriptor],
    ) -> Result<Vec<EarliestValueSample>, DbError> {
        let samples: Vec<DbResult<EarliestValueSample>> = stream::iter(candidates)
            .map(|column| async move {
                let earliest = match self.reader.probe_min(schema, table, &column.name).await {
                    Ok(value) => value.map(|v| v.normalized()),
                    Err(e) if e.is_connection_lost() => return Err(e),
                    Err(e) => {
                        tracing::warn!(
                            schema,
                            table,
                            column = %column.name,
                            error = %e,
                            "MIN probe failed; ignoring column"
                        );
                        None
                    }
                };
                Ok(EarliestValueSample {
                    column_name: column.name.clone(),
                    earliest,
                })
            })
            .buffered(self.probe_concurrency)
            .collect()
            .await;

        samples.into_iter().collect()
    }
}

/// The sample with the earliest value; the first one on ties.
pub fn select_earliest(samples: &[EarliestValueSample]) -> Option<&str> {
    samples
        .iter()
        .filter_map(|s| s.earliest.map(|earliest| (earliest, s.column_name.as_str())))
        .min_by_key(|(earliest, _)| *earliest)
        .map(|(_, column)| column)
}
