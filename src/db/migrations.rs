use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::debug;

/// Run all pending migrations.
pub async fn run(pool: &SqlitePool) -> Result<()> {
    create_migration_table(pool).await?;
    let current_version = get_schema_version(pool).await?;

    if current_version < 1 {
        debug!("Running migration v1");
        run_migration_v1(pool).await?;
        set_schema_version(pool, 1).await?;
    }

    if current_version < 2 {
        debug!("Running migration v2");
        run_migration_v2(pool).await?;
        set_schema_version(pool, 2).await?;
    }

    Ok(())
}

async fn create_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS _schema_version (
            version INTEGER PRIMARY KEY
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create schema version table")?;

    Ok(())
}

async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT version FROM _schema_version LIMIT 1")
        .fetch_optional(pool)
        .await
        .context("Failed to get schema version")?;

    Ok(row.map_or(0, |(v,)| v))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("DELETE FROM _schema_version")
        .execute(pool)
        .await?;
    sqlx::query("INSERT INTO _schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

async fn run_migration_v1(pool: &SqlitePool) -> Result<()> {
    debug!("Running migration v1: creating document tables");

    // Profiles; list-valued fields are stored as JSON text
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS public_figures (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            name_kr TEXT NOT NULL DEFAULT '',
            gender TEXT NOT NULL DEFAULT '',
            nationality TEXT NOT NULL DEFAULT '',
            occupation TEXT NOT NULL DEFAULT '[]',
            profile_pic TEXT,
            birth_date TEXT,
            is_group INTEGER NOT NULL DEFAULT 0,
            group_name TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create public_figures table")?;

    // One content document per figure
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS figure_content (
            figure_id TEXT PRIMARY KEY NOT NULL REFERENCES public_figures(id) ON DELETE CASCADE,
            main_overview TEXT NOT NULL,
            timeline_content TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create figure_content table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS articles (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            sub_title TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL DEFAULT '',
            source TEXT NOT NULL DEFAULT '',
            send_date TEXT NOT NULL DEFAULT '',
            link TEXT NOT NULL DEFAULT '',
            image_urls TEXT NOT NULL DEFAULT '[]'
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create articles table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS article_summaries (
            public_figure TEXT NOT NULL REFERENCES public_figures(id) ON DELETE CASCADE,
            id TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT '',
            sub_category TEXT NOT NULL DEFAULT '',
            title TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            event_contents TEXT NOT NULL DEFAULT '{}',
            PRIMARY KEY (public_figure, id)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create article_summaries table")?;

    Ok(())
}

async fn run_migration_v2(pool: &SqlitePool) -> Result<()> {
    debug!("Running migration v2: figure search index");

    // Create FTS5 virtual table for figure search
    sqlx::query(
        r"
        CREATE VIRTUAL TABLE IF NOT EXISTS public_figures_fts USING fts5(
            name,
            name_kr,
            occupation,
            group_name,
            content='public_figures',
            content_rowid='rowid'
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create FTS5 table")?;

    // Triggers to keep FTS in sync with public_figures
    sqlx::query(
        r"
        CREATE TRIGGER IF NOT EXISTS public_figures_fts_insert AFTER INSERT ON public_figures BEGIN
            INSERT INTO public_figures_fts(rowid, name, name_kr, occupation, group_name)
            VALUES (new.rowid, new.name, new.name_kr, new.occupation, new.group_name);
        END
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create FTS insert trigger")?;

    sqlx::query(
        r"
        CREATE TRIGGER IF NOT EXISTS public_figures_fts_delete AFTER DELETE ON public_figures BEGIN
            INSERT INTO public_figures_fts(public_figures_fts, rowid, name, name_kr, occupation, group_name)
            VALUES ('delete', old.rowid, old.name, old.name_kr, old.occupation, old.group_name);
        END
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create FTS delete trigger")?;

    sqlx::query(
        r"
        CREATE TRIGGER IF NOT EXISTS public_figures_fts_update AFTER UPDATE ON public_figures BEGIN
            INSERT INTO public_figures_fts(public_figures_fts, rowid, name, name_kr, occupation, group_name)
            VALUES ('delete', old.rowid, old.name, old.name_kr, old.occupation, old.group_name);
            INSERT INTO public_figures_fts(rowid, name, name_kr, occupation, group_name)
            VALUES (new.rowid, new.name, new.name_kr, new.occupation, new.group_name);
        END
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create FTS update trigger")?;

    // Indexes for common queries
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_public_figures_name ON public_figures(name)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_article_summaries_figure ON article_summaries(public_figure)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
