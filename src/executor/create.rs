//! CREATE TABLE execution
//!
//! Creation is a single terminal step: register the table in the catalog,
//! then allocate the heap page that will back its rows.

use tracing::debug;

use super::plan::CreatePlan;
use crate::catalog::schema::Table;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::storage::table_store::TableStore;

/// Register the table and allocate its storage. Returns the assigned oid.
pub fn execute_create(
    plan: &CreatePlan<'_>,
    catalog: &mut Catalog,
    store: &mut TableStore,
) -> Result<u32> {
    let table = Table {
        oid: 0,
        name: plan.table_name,
        columns: plan.columns,
    };
    let oid = catalog.register_table(&table)?;
    store.create(oid);

    debug!(name = plan.table_name, oid, "created table");
    Ok(oid)
}
