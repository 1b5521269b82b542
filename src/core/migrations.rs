// src/core/migrations.rs
//! Ordered, versioned schema steps for the jobs table.
//!
//! Every step inspects the live schema first and only runs when the table,
//! column or constraint it provides is missing, so reconciling an up-to-date
//! table issues no statements at all.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub enum MigrationStep {
    CreateTable,
    AddColumn {
        name: &'static str,
        definition: &'static str,
    },
    /// Tables written by other tools may lack a key on `id`; upserts need one.
    UniqueId,
}

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub step: MigrationStep,
}

/// A step that actually ran during reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedMigration {
    pub version: i64,
    pub description: &'static str,
    pub statement: String,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create jobs table",
        step: MigrationStep::CreateTable,
    },
    Migration {
        version: 2,
        description: "add job_description",
        step: MigrationStep::AddColumn {
            name: "job_description",
            definition: "TEXT",
        },
    },
    Migration {
        version: 3,
        description: "add hidden flag",
        step: MigrationStep::AddColumn {
            name: "hidden",
            definition: "INTEGER NOT NULL DEFAULT 0",
        },
    },
    Migration {
        version: 4,
        description: "add applied flag",
        step: MigrationStep::AddColumn {
            name: "applied",
            definition: "INTEGER NOT NULL DEFAULT 0",
        },
    },
    Migration {
        version: 5,
        description: "add interview flag",
        step: MigrationStep::AddColumn {
            name: "interview",
            definition: "INTEGER NOT NULL DEFAULT 0",
        },
    },
    Migration {
        version: 6,
        description: "add rejected flag",
        step: MigrationStep::AddColumn {
            name: "rejected",
            definition: "INTEGER NOT NULL DEFAULT 0",
        },
    },
    Migration {
        version: 7,
        description: "add cover_letter",
        step: MigrationStep::AddColumn {
            name: "cover_letter",
            definition: "TEXT",
        },
    },
    Migration {
        version: 8,
        description: "add resume",
        step: MigrationStep::AddColumn {
            name: "resume",
            definition: "TEXT",
        },
    },
    Migration {
        version: 9,
        description: "unique job id",
        step: MigrationStep::UniqueId,
    },
];

/// Bring `table` up to date, returning the steps that were executed
pub async fn reconcile(pool: &SqlitePool, table: &str) -> Result<Vec<AppliedMigration>> {
    ensure_ledger(pool).await?;

    let mut applied = Vec::new();

    for migration in MIGRATIONS {
        let statement = match migration.step {
            MigrationStep::CreateTable => {
                if table_exists(pool, table).await? {
                    continue;
                }
                create_table_sql(table)
            }
            MigrationStep::AddColumn { name, definition } => {
                if table_columns(pool, table).await?.iter().any(|c| c == name) {
                    continue;
                }
                format!("ALTER TABLE \"{}\" ADD COLUMN {} {}", table, name, definition)
            }
            MigrationStep::UniqueId => {
                if id_is_unique(pool, table).await? {
                    continue;
                }
                // keep the newest row of any duplicated id so the index can be built
                format!(
                    "DELETE FROM \"{t}\" WHERE rowid NOT IN \
                     (SELECT MAX(rowid) FROM \"{t}\" GROUP BY id); \
                     CREATE UNIQUE INDEX IF NOT EXISTS \"{t}_id_idx\" ON \"{t}\"(id)",
                    t = table
                )
            }
        };

        let mut tx = pool.begin().await?;
        for part in statement.split("; ") {
            sqlx::query(part)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Migration {} failed: {}", migration.version, part))?;
        }
        tx.commit().await?;

        record(pool, table, migration).await?;

        info!(
            "Applied migration {} ({}) on {}",
            migration.version, migration.description, table
        );

        applied.push(AppliedMigration {
            version: migration.version,
            description: migration.description,
            statement,
        });
    }

    if applied.is_empty() {
        info!("Schema for {} is up to date", table);
    }

    Ok(applied)
}

fn create_table_sql(table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS "{}" (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL DEFAULT '',
            company TEXT NOT NULL DEFAULT '',
            location TEXT NOT NULL DEFAULT '',
            date TEXT NOT NULL DEFAULT '',
            job_url TEXT NOT NULL DEFAULT ''
        )"#,
        table
    )
}

async fn ensure_ledger(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            table_name TEXT NOT NULL,
            version INTEGER NOT NULL,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL,
            PRIMARY KEY (table_name, version)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;
    Ok(())
}

async fn record(pool: &SqlitePool, table: &str, migration: &Migration) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO schema_migrations (table_name, version, description, applied_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(table)
    .bind(migration.version)
    .bind(migration.description)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to record migration")?;
    Ok(())
}

pub async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool> {
    let row = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
        .bind(table)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(&format!("PRAGMA table_info(\"{}\")", table))
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to inspect table {}", table))?;

    rows.iter()
        .map(|row| row.try_get::<String, _>("name").map_err(Into::into))
        .collect()
}

/// Whether `id` is the sole primary key column or covered by a single-column
/// unique index
pub async fn id_is_unique(pool: &SqlitePool, table: &str) -> Result<bool> {
    let columns = sqlx::query(&format!("PRAGMA table_info(\"{}\")", table))
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to inspect table {}", table))?;

    let mut key_columns = Vec::new();
    for column in &columns {
        if column.try_get::<i64, _>("pk")? > 0 {
            key_columns.push(column.try_get::<String, _>("name")?);
        }
    }
    if key_columns == ["id"] {
        return Ok(true);
    }

    let indexes = sqlx::query(&format!("PRAGMA index_list(\"{}\")", table))
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to list indexes of {}", table))?;

    for index in &indexes {
        if index.try_get::<i64, _>("unique")? == 0 {
            continue;
        }
        let name: String = index.try_get("name")?;
        let indexed = sqlx::query(&format!("PRAGMA index_info(\"{}\")", name))
            .fetch_all(pool)
            .await?;
        // expression columns have no name
        let indexed: Vec<Option<String>> = indexed
            .iter()
            .map(|row| row.try_get::<Option<String>, _>("name"))
            .collect::<Result<_, _>>()?;
        if indexed.len() == 1 && indexed[0].as_deref() == Some("id") {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Versions recorded for `table`, in order
pub async fn recorded_versions(pool: &SqlitePool, table: &str) -> Result<Vec<i64>> {
    let rows = sqlx::query(
        "SELECT version FROM schema_migrations WHERE table_name = ? ORDER BY version ASC",
    )
    .bind(table)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| row.try_get::<i64, _>("version").map_err(Into::into))
        .collect()
}
