//! In-memory `CatalogRepo` for classifier and planner tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use crate::{
    db::{CatalogRepo, DbError, DbResult},
    models::{ColumnDescriptor, ColumnMetadata, TemporalValue},
};

enum Probe {
    Value(Option<TemporalValue>),
    Fail,
    #[cfg(feature = "database-sqlite")]
    Disconnect,
}

struct MockTable {
    name: String,
    columns: Vec<ColumnDescriptor>,
    probes: HashMap<String, Probe>,
    delays: HashMap<String, Duration>,
    fail_metadata: bool,
    #[cfg(feature = "database-sqlite")]
    disconnect_metadata: bool,
}

#[derive(Default)]
pub struct MockCatalog {
    tables: Vec<MockTable>,
    fail_listing: bool,
    probe_delay: Duration,
    cancel_on_probe: Option<CancellationToken>,
    probe_count: AtomicUsize,
    probed: Mutex<Vec<String>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, name: &str, columns: Vec<ColumnDescriptor>) -> Self {
        self.tables.push(MockTable {
            name: name.to_string(),
            columns,
            probes: HashMap::new(),
            delays: HashMap::new(),
            fail_metadata: false,
            #[cfg(feature = "database-sqlite")]
            disconnect_metadata: false,
        });
        self
    }

    /// A table whose column metadata cannot be read.
    pub fn failing_table(mut self, name: &str) -> Self {
        self = self.table(name, Vec::new());
        if let Some(t) = self.tables.last_mut() {
            t.fail_metadata = true;
        }
        self
    }

    /// A table whose metadata query finds the pool closed.
    #[cfg(feature = "database-sqlite")]
    pub fn disconnected_table(mut self, name: &str) -> Self {
        self = self.table(name, Vec::new());
        if let Some(t) = self.tables.last_mut() {
            t.disconnect_metadata = true;
        }
        self
    }

    /// A column whose MIN query finds the pool closed.
    #[cfg(feature = "database-sqlite")]
    pub fn disconnected_min(mut self, table: &str, column: &str) -> Self {
        self.table_mut(table)
            .probes
            .insert(column.to_string(), Probe::Disconnect);
        self
    }

    pub fn min(mut self, table: &str, column: &str, value: TemporalValue) -> Self {
        self.table_mut(table)
            .probes
            .insert(column.to_string(), Probe::Value(Some(value)));
        self
    }

    pub fn failing_probe(mut self, table: &str, column: &str) -> Self {
        self.table_mut(table)
            .probes
            .insert(column.to_string(), Probe::Fail);
        self
    }

    /// Delay one column's probe, to make completion order differ from
    /// catalog order.
    pub fn column_delay(mut self, table: &str, column: &str, delay: Duration) -> Self {
        self.table_mut(table)
            .delays
            .insert(column.to_string(), delay);
        self
    }

    pub fn probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Cancel `token` as soon as any MIN probe starts.
    pub fn cancel_on_probe(mut self, token: CancellationToken) -> Self {
        self.cancel_on_probe = Some(token);
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probe_count.load(Ordering::SeqCst)
    }

    /// `table.column` for every probe issued, in issue order.
    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }

    fn table_mut(&mut self, name: &str) -> &mut MockTable {
        self.tables
            .iter_mut()
            .find(|t| t.name == name)
            .expect("table must be registered before its probes")
    }

    fn find(&self, name: &str) -> Option<&MockTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

#[async_trait]
impl CatalogRepo for MockCatalog {
    async fn list_tables(&self, _schema: &str) -> DbResult<Vec<String>> {
        if self.fail_listing {
            return Err(DbError::Internal("connection refused".into()));
        }
        let mut names: Vec<String> = self.tables.iter().map(|t| t.name.clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn date_time_columns(
        &self,
        _schema: &str,
        table: &str,
    ) -> DbResult<Vec<ColumnDescriptor>> {
        match self.find(table) {
            #[cfg(feature = "database-sqlite")]
            Some(t) if t.disconnect_metadata => Err(DbError::Sqlx(sqlx::Error::PoolClosed)),
            Some(t) if t.fail_metadata => Err(DbError::Internal("connection reset by peer".into())),
            Some(t) => Ok(t
                .columns
                .iter()
                .filter(|c| c.data_type.is_temporal())
                .cloned()
                .collect()),
            None => Ok(Vec::new()),
        }
    }

    async fn min_value(
        &self,
        _schema: &str,
        table: &str,
        column: &str,
    ) -> DbResult<Option<TemporalValue>> {
        self.probe_count.fetch_add(1, Ordering::SeqCst);
        self.probed.lock().unwrap().push(format!("{table}.{column}"));
        if let Some(token) = &self.cancel_on_probe {
            token.cancel();
        }

        let t = self
            .find(table)
            .ok_or_else(|| DbError::Internal(format!("no such table: {table}")))?;

        let delay = t.delays.get(column).copied().unwrap_or(self.probe_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match t.probes.get(column) {
            Some(Probe::Value(v)) => Ok(*v),
            Some(Probe::Fail) => Err(DbError::Internal(format!("probe failed: {column}"))),
            #[cfg(feature = "database-sqlite")]
            Some(Probe::Disconnect) => Err(DbError::Sqlx(sqlx::Error::PoolClosed)),
            None => Ok(None),
        }
    }

    async fn table_columns(&self, _schema: &str, table: &str) -> DbResult<Vec<ColumnMetadata>> {
        Ok(self
            .find(table)
            .map(|t| {
                t.columns
                    .iter()
                    .map(|c| ColumnMetadata {
                        name: c.name.clone(),
                        data_type: c.declared_type.clone(),
                        is_nullable: c.is_nullable,
                        is_primary_key: false,
                        default: None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn datetime_column(name: &str) -> ColumnDescriptor {
    ColumnDescriptor::new(name, "datetime", true)
}

pub fn date_column(name: &str) -> ColumnDescriptor {
    ColumnDescriptor::new(name, "date", true)
}

pub fn text_column(name: &str) -> ColumnDescriptor {
    ColumnDescriptor::new(name, "varchar", true)
}

pub fn date(y: i32, m: u32, d: u32) -> TemporalValue {
    TemporalValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

pub fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> TemporalValue {
    TemporalValue::DateTime(
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap(),
    )
}
