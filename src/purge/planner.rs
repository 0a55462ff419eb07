use chrono::NaiveDate;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::{classifier::ColumnClassifier, generator::QueryGenerator};
use crate::{
    db::DbError,
    models::{Classification, SchemaDeletionPlan},
};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Could not list tables: {0}")]
    Connection(#[source] DbError),

    #[error("Connection lost while classifying table {table}")]
    ConnectionLost { table: String },

    #[error("Planning was cancelled")]
    Cancelled,
}

/// Builds the deletion plan for one schema.
///
/// Tables are processed one at a time in name order. A table that cannot be
/// classified is recorded as skipped and never stops its siblings, unless
/// the connection itself was lost. Then the schema fails as a whole.
pub struct SchemaPlanner {
    classifier: ColumnClassifier,
    generator: QueryGenerator,
    cancel: CancellationToken,
}

impl SchemaPlanner {
    pub fn new(
        classifier: ColumnClassifier,
        generator: QueryGenerator,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            classifier,
            generator,
            cancel,
        }
    }

    #[tracing::instrument(skip(self, cutoff), fields(cutoff = %cutoff))]
    pub async fn plan(
        &self,
        schema: &str,
        cutoff: NaiveDate,
    ) -> Result<SchemaDeletionPlan, PlanError> {
        let tables = self
            .classifier
            .reader()
            .list_tables(schema)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to list tables");
                PlanError::Connection(e)
            })?;

        tracing::info!(tables = tables.len(), "Planning deletions");

        let mut mapping = Vec::with_capacity(tables.len());
        let mut skipped = Vec::new();

        for table in tables {
            if self.cancel.is_cancelled() {
                tracing::warn!(table = %table, "Cancelled before table");
                return Err(PlanError::Cancelled);
            }

            match self
                .classifier
                .classify_detailed(schema, &table, &self.cancel)
                .await
            {
                Classification::Resolved(column) => {
                    tracing::debug!(table = %table, column = %column, "Creation column found");
                    mapping.push((table, Some(column)));
                }
                Classification::Cancelled => {
                    tracing::warn!(table = %table, "Cancelled while classifying");
                    return Err(PlanError::Cancelled);
                }
                Classification::ConnectionLost => {
                    tracing::error!(table = %table, "Connection lost; abandoning schema");
                    return Err(PlanError::ConnectionLost { table });
                }
                reason => {
                    tracing::info!(table = %table, reason = %reason, "No creation column; skipping table");
                    mapping.push((table.clone(), None));
                    skipped.push((table, reason));
                }
            }
        }

        let mut plan = self.generator.generate_for_schema(schema, mapping, cutoff);
        for (table, reason) in skipped {
            plan.skip(table, reason);
        }

        tracing::info!(
            statements = plan.len(),
            skipped = plan.skipped.len(),
            "Plan complete"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        db::SqlDialect,
        purge::{
            classifier::CreationColumnFilter,
            metadata::MetadataReader,
            test_support::{MockCatalog, date, date_column, datetime_column, text_column},
        },
    };

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    fn planner(catalog: Arc<MockCatalog>, cancel: CancellationToken) -> SchemaPlanner {
        let reader = MetadataReader::new(catalog, Duration::from_secs(5));
        SchemaPlanner::new(
            ColumnClassifier::new(reader, CreationColumnFilter::default()),
            QueryGenerator::new(SqlDialect::MySql),
            cancel,
        )
    }

    fn shop() -> MockCatalog {
        MockCatalog::new()
            .table(
                "orders",
                vec![datetime_column("created_at"), datetime_column("updated_at")],
            )
            .table(
                "events",
                vec![date_column("event_date"), date_column("logged_on")],
            )
            .min("events", "event_date", date(2020, 1, 1))
            .min("events", "logged_on", date(2021, 6, 1))
            .table("sessions", vec![text_column("token")])
            .failing_table("legacy")
    }

    #[tokio::test]
    async fn test_plan_covers_each_table_in_name_order() {
        let plan = planner(Arc::new(shop()), CancellationToken::new())
            .plan("shop", cutoff())
            .await
            .unwrap();

        assert_eq!(plan.table_names().collect::<Vec<_>>(), vec!["events", "orders"]);
        assert_eq!(
            plan.get("orders").unwrap().text,
            "DELETE FROM `orders` WHERE `created_at` <= '2023-01-01';"
        );
        assert_eq!(
            plan.get("events").unwrap().text,
            "DELETE FROM `events` WHERE `event_date` <= '2023-01-01';"
        );
    }

    #[tokio::test]
    async fn test_plan_records_skipped_tables_with_reason() {
        let plan = planner(Arc::new(shop()), CancellationToken::new())
            .plan("shop", cutoff())
            .await
            .unwrap();

        let skipped: Vec<_> = plan
            .skipped
            .iter()
            .map(|s| (s.table_name.as_str(), s.reason.clone()))
            .collect();
        assert_eq!(
            skipped,
            vec![
                ("legacy", Classification::Unavailable),
                ("sessions", Classification::NoCandidates),
            ]
        );
    }

    #[tokio::test]
    async fn test_listing_failure_is_connection_error() {
        let catalog = Arc::new(MockCatalog::new().failing_listing());

        let err = planner(catalog, CancellationToken::new())
            .plan("shop", cutoff())
            .await
            .unwrap_err();

        assert!(matches!(err, PlanError::Connection(_)));
        assert!(err.to_string().starts_with("Could not list tables"));
    }

    #[cfg(feature = "database-sqlite")]
    #[tokio::test]
    async fn test_lost_connection_fails_schema_instead_of_partial_plan() {
        // "events" resolves first; "gone" then finds the pool closed, so
        // no plan comes back for the tables already done.
        let catalog = Arc::new(shop().disconnected_table("gone"));

        let err = planner(catalog, CancellationToken::new())
            .plan("shop", cutoff())
            .await
            .unwrap_err();

        match &err {
            PlanError::ConnectionLost { table } => assert_eq!(table, "gone"),
            other => panic!("expected ConnectionLost, got {other:?}"),
        }
        assert!(err.to_string().contains("gone"));
    }

    #[tokio::test]
    async fn test_empty_schema_yields_empty_plan() {
        let plan = planner(Arc::new(MockCatalog::new()), CancellationToken::new())
            .plan("empty", cutoff())
            .await
            .unwrap();
        assert!(plan.is_empty());
        assert!(plan.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_first_table() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let catalog = Arc::new(shop());

        let err = planner(catalog.clone(), cancel)
            .plan("shop", cutoff())
            .await
            .unwrap_err();

        assert!(matches!(err, PlanError::Cancelled));
        assert_eq!(catalog.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_mid_schema_stops_processing() {
        // "events" is first and needs probes; cancelling there must stop
        // before "orders" is reached.
        let cancel = CancellationToken::new();
        let catalog = Arc::new(shop().cancel_on_probe(cancel.clone()));

        let err = planner(catalog.clone(), cancel)
            .plan("shop", cutoff())
            .await
            .unwrap_err();

        assert!(matches!(err, PlanError::Cancelled));
        assert!(catalog.probed().iter().all(|p| p.starts_with("events.")));
    }

    #[cfg(feature = "database-sqlite")]
    #[tokio::test]
    async fn test_plan_against_sqlite() {
        use crate::db::{
            DbPool,
            tests::harness::{create_sqlite_pool, load_sqlite_fixture},
        };

        let pool = create_sqlite_pool().await;
        load_sqlite_fixture(
            &pool,
            r#"
            CREATE TABLE orders (id INTEGER PRIMARY KEY, created_at TIMESTAMP, updated_at TIMESTAMP);
            CREATE TABLE events (id INTEGER PRIMARY KEY, event_date DATE, logged_on DATE);
            CREATE TABLE sessions (id INTEGER PRIMARY KEY, token TEXT);
            INSERT INTO events (event_date, logged_on) VALUES
                ('2020-01-01', '2021-06-01'),
                ('2022-02-02', '2019-12-31 23:00:00');
            "#,
        )
        .await;
        let db = DbPool::from_sqlite(pool);

        let reader = MetadataReader::new(db.catalog(), Duration::from_secs(5));
        let planner = SchemaPlanner::new(
            ColumnClassifier::new(reader, CreationColumnFilter::default()),
            QueryGenerator::new(db.dialect()),
            CancellationToken::new(),
        );

        let plan = planner.plan("main", cutoff()).await.unwrap();

        let texts: Vec<_> = plan.statements().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "DELETE FROM \"events\" WHERE \"logged_on\" <= '2023-01-01';",
                "DELETE FROM \"orders\" WHERE \"created_at\" <= '2023-01-01';",
            ]
        );
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].table_name, "sessions");
    }
}
