//! Schema initialization, version tracking, and the identifier migration.
//!
//! Schema-ensure runs on every cycle that had to (re)open a connection
//! and is idempotent. First contact with a pre-existing database at
//! version 0 triggers the one-time migration: add the identifier column,
//! backfill identifiers for legacy rows, then record version 1. A failed
//! backfill leaves the version unwritten so the migration is retried on
//! the next startup; the backfill itself skips already-migrated rows, so
//! a retry does no redundant work.

use rusqlite::{params, Connection};

use crate::error::Result;

use super::backend::ConnectionSource;
use super::config::SchemaNames;
use super::schema;

/// Resolves player names to stable identifiers during migration.
///
/// Consulted once per legacy row by the backfill. A miss is not an
/// error: the row keeps a null identifier and continues to be addressed
/// by name.
pub trait IdentityResolver: Send + Sync {
    /// Resolves a player name to an identifier, or `None` when the name
    /// cannot be resolved.
    fn resolve(&self, name: &str) -> Option<String>;
}

/// An identity resolver that never resolves anything.
///
/// For deployments without an identity service: legacy rows stay keyed
/// by name and fresh installs never need resolution in the first place.
///
/// # Examples
///
/// ```
/// use ingot::{IdentityResolver, NullResolver};
///
/// assert!(NullResolver.resolve("alice").is_none());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResolver;

impl IdentityResolver for NullResolver {
    fn resolve(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Brings the schema up to the current generation on a fresh connection.
///
/// Table creation is idempotent, so a partially completed earlier
/// attempt is safe to retry. The distinction between a fresh install and
/// a pre-existing database is taken *before* the `CREATE TABLE`
/// statements run; only pre-existing databases enter the migration path.
///
/// # Errors
///
/// Returns an error if table detection or creation fails, or if the
/// backfill hits an unrecoverable storage failure. A failure to add the
/// identifier column is tolerated (the column may already exist on a
/// partially migrated store).
pub(super) fn ensure_schema(
    backend: &dyn ConnectionSource,
    resolver: &dyn IdentityResolver,
    names: &SchemaNames,
    conn: &Connection,
) -> Result<()> {
    let pre_existing = backend.table_exists(conn, &names.accounts_table)?;

    conn.execute(&schema::create_accounts_table(names), [])?;
    conn.execute(&schema::create_version_table(names), [])?;

    if pre_existing {
        if read_version(names, conn)? == 0 {
            if backend.supports_column_modify() {
                conn.execute(&schema::widen_name_column(names), [])?;
                conn.execute(&schema::widen_money_column(names), [])?;
            }

            // The column may already exist on a partially migrated store
            if let Err(err) = conn.execute(&schema::add_uuid_column(names), []) {
                log::debug!("identifier column not added ({err}), assuming it exists");
            }

            let migrated = backfill_uuids(resolver, names, conn)?;
            log::info!("identifier migration complete, {migrated} row(s) backfilled");

            write_version(names, conn, schema::SCHEMA_VERSION)?;
        }
    } else {
        // Fresh install: no legacy rows to backfill
        write_version(names, conn, schema::SCHEMA_VERSION)?;
    }

    Ok(())
}

/// Reads the schema generation from the version table.
///
/// A missing row reads as 0, the pre-migration default.
pub(super) fn read_version(names: &SchemaNames, conn: &Connection) -> Result<i64> {
    match conn.query_row(&schema::select_version(names), [], |row| row.get(0)) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(err) => Err(err.into()),
    }
}

/// Rewrites the version row.
///
/// Always delete-then-insert, never update-in-place: a table that has
/// drifted to zero or multiple rows collapses back to exactly one.
pub(super) fn write_version(names: &SchemaNames, conn: &Connection, version: i64) -> Result<()> {
    conn.execute(&schema::delete_version(names), [])?;
    conn.execute(&schema::insert_version(names), [version])?;
    Ok(())
}

/// Populates identifiers for rows that lack one.
///
/// Only rows with a null identifier are considered, so a retried
/// migration skips rows a previous attempt already resolved.
/// Unresolvable names are left as-is. Returns the number of rows
/// backfilled.
///
/// # Errors
///
/// Returns an error only on a storage failure, never on a per-row
/// resolution miss.
pub(super) fn backfill_uuids(
    resolver: &dyn IdentityResolver,
    names: &SchemaNames,
    conn: &Connection,
) -> Result<usize> {
    let mut stmt = conn.prepare(&schema::select_missing_uuid(names))?;
    let legacy_rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    drop(stmt);

    let mut update = conn.prepare(&schema::update_uuid_by_rowid(names))?;
    let mut migrated = 0usize;

    for (rowid, name) in legacy_rows {
        match resolver.resolve(&name) {
            Some(uuid) => {
                update.execute(params![uuid, rowid])?;
                migrated += 1;
            }
            None => log::debug!("no identifier for '{name}', leaving row unmigrated"),
        }
    }

    Ok(migrated)
}
