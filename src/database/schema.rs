//! SQL text for the accounts schema.
//!
//! Table and column names are configurable per deployment, so the SQL is
//! built from a validated [`SchemaNames`] rather than kept as constants.
//! Only identifiers are interpolated; every value travels as a bound
//! parameter.

use super::config::SchemaNames;

/// Current schema generation, written to the version table once the
/// identifier migration has completed.
pub(super) const SCHEMA_VERSION: i64 = 1;

/// Statement creating the accounts table.
pub(super) fn create_accounts_table(names: &SchemaNames) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} ({name} varchar(64) NOT NULL, {uuid} varchar(36), {money} double NOT NULL)",
        table = names.accounts_table,
        name = names.name_column,
        uuid = names.uuid_column,
        money = names.money_column,
    )
}

/// Statement creating the single-row schema-version table.
pub(super) fn create_version_table(names: &SchemaNames) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (version int NOT NULL)",
        table = names.version_table,
    )
}

/// Migration statement adding the identifier column to a legacy table.
pub(super) fn add_uuid_column(names: &SchemaNames) -> String {
    format!(
        "ALTER TABLE {table} ADD COLUMN {uuid} varchar(36)",
        table = names.accounts_table,
        uuid = names.uuid_column,
    )
}

/// Migration statement widening the name column on backends that support
/// in-place column redefinition.
pub(super) fn widen_name_column(names: &SchemaNames) -> String {
    format!(
        "ALTER TABLE {table} MODIFY {name} varchar(64) NOT NULL",
        table = names.accounts_table,
        name = names.name_column,
    )
}

/// Migration statement widening the money column on backends that
/// support in-place column redefinition.
pub(super) fn widen_money_column(names: &SchemaNames) -> String {
    format!(
        "ALTER TABLE {table} MODIFY {money} double NOT NULL",
        table = names.accounts_table,
        money = names.money_column,
    )
}

/// Query returning the stored schema version, if any.
pub(super) fn select_version(names: &SchemaNames) -> String {
    format!("SELECT version FROM {table} LIMIT 1", table = names.version_table)
}

/// Statement clearing the version table.
///
/// Pairs with [`insert_version`]: the version row is always rewritten by
/// delete-then-insert so a table drifted to zero or multiple rows heals
/// itself on the next write.
pub(super) fn delete_version(names: &SchemaNames) -> String {
    format!("DELETE FROM {table}", table = names.version_table)
}

/// Statement inserting the version row.
pub(super) fn insert_version(names: &SchemaNames) -> String {
    format!(
        "INSERT INTO {table} (version) VALUES (?1)",
        table = names.version_table,
    )
}

/// Query selecting every account row in storage order.
pub(super) fn select_all(names: &SchemaNames) -> String {
    format!(
        "SELECT {name}, {uuid}, {money} FROM {table} ORDER BY rowid",
        table = names.accounts_table,
        name = names.name_column,
        uuid = names.uuid_column,
        money = names.money_column,
    )
}

/// Query selecting the top accounts by balance.
///
/// Ties are broken by rowid so equal balances come back in storage
/// order, keeping leaderboard output stable across runs.
pub(super) fn select_top(names: &SchemaNames) -> String {
    format!(
        "SELECT {name}, {uuid}, {money} FROM {table} ORDER BY {money} DESC, rowid LIMIT ?1",
        table = names.accounts_table,
        name = names.name_column,
        uuid = names.uuid_column,
        money = names.money_column,
    )
}

/// Returns the column used to match an account: the identifier column
/// when an identifier is available, else the name column.
fn key_column<'a>(names: &'a SchemaNames, by_uuid: bool) -> &'a str {
    if by_uuid {
        &names.uuid_column
    } else {
        &names.name_column
    }
}

/// Query returning the balance of one account, matched case-insensitively.
pub(super) fn select_balance(names: &SchemaNames, by_uuid: bool) -> String {
    format!(
        "SELECT {money} FROM {table} WHERE UPPER({key}) = UPPER(?1)",
        table = names.accounts_table,
        money = names.money_column,
        key = key_column(names, by_uuid),
    )
}

/// Statement updating an account's balance and refreshing its stored name.
pub(super) fn update_account(names: &SchemaNames, by_uuid: bool) -> String {
    format!(
        "UPDATE {table} SET {money} = ?1, {name} = ?2 WHERE UPPER({key}) = UPPER(?3)",
        table = names.accounts_table,
        money = names.money_column,
        name = names.name_column,
        key = key_column(names, by_uuid),
    )
}

/// Statement inserting a new account row.
pub(super) fn insert_account(names: &SchemaNames) -> String {
    format!(
        "INSERT INTO {table} ({name}, {uuid}, {money}) VALUES (?1, ?2, ?3)",
        table = names.accounts_table,
        name = names.name_column,
        uuid = names.uuid_column,
        money = names.money_column,
    )
}

/// Statement deleting one account, matched case-insensitively.
pub(super) fn delete_account(names: &SchemaNames, by_uuid: bool) -> String {
    format!(
        "DELETE FROM {table} WHERE UPPER({key}) = UPPER(?1)",
        table = names.accounts_table,
        key = key_column(names, by_uuid),
    )
}

/// Statement truncating the accounts table.
pub(super) fn delete_all_accounts(names: &SchemaNames) -> String {
    format!("DELETE FROM {table}", table = names.accounts_table)
}

/// Query selecting the names of accounts sitting at a given balance.
pub(super) fn select_names_at_balance(names: &SchemaNames) -> String {
    format!(
        "SELECT {name} FROM {table} WHERE {money} = ?1",
        table = names.accounts_table,
        name = names.name_column,
        money = names.money_column,
    )
}

/// Statement deleting the listed account names in one batch.
pub(super) fn delete_names_in(names: &SchemaNames, count: usize) -> String {
    let placeholders = vec!["?"; count].join(", ");
    format!(
        "DELETE FROM {table} WHERE {name} IN ({placeholders})",
        table = names.accounts_table,
        name = names.name_column,
    )
}

/// Query selecting rows still lacking an identifier, keyed by rowid for
/// the backfill write-back.
pub(super) fn select_missing_uuid(names: &SchemaNames) -> String {
    format!(
        "SELECT rowid, {name} FROM {table} WHERE {uuid} IS NULL",
        table = names.accounts_table,
        name = names.name_column,
        uuid = names.uuid_column,
    )
}

/// Statement writing a resolved identifier back to one row.
pub(super) fn update_uuid_by_rowid(names: &SchemaNames) -> String {
    format!(
        "UPDATE {table} SET {uuid} = ?1 WHERE rowid = ?2",
        table = names.accounts_table,
        uuid = names.uuid_column,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_accounts_table_uses_configured_names() {
        let mut names = SchemaNames::default();
        names.accounts_table = "eco_accounts".to_string();
        names.money_column = "holdings".to_string();

        let sql = create_accounts_table(&names);
        assert!(sql.contains("eco_accounts"));
        assert!(sql.contains("holdings double NOT NULL"));
    }

    #[test]
    fn test_key_column_prefers_uuid() {
        let names = SchemaNames::default();
        assert!(select_balance(&names, true).contains("UPPER(uuid)"));
        assert!(select_balance(&names, false).contains("UPPER(name)"));
    }

    #[test]
    fn test_delete_names_in_placeholders() {
        let names = SchemaNames::default();
        let sql = delete_names_in(&names, 3);
        assert!(sql.ends_with("IN (?, ?, ?)"));
    }

    #[test]
    fn test_values_are_never_interpolated() {
        let names = SchemaNames::default();
        for sql in [
            select_balance(&names, false),
            update_account(&names, true),
            insert_account(&names),
            delete_account(&names, false),
            insert_version(&names),
            select_names_at_balance(&names),
            update_uuid_by_rowid(&names),
        ] {
            assert!(sql.contains('?'), "expected bound parameter in: {sql}");
        }
    }
}
