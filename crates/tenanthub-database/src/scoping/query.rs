//! SQL generation for scoped reads.

use sqlx::{Postgres, QueryBuilder};

use tenanthub_entity::{OrganizationRef, ScopeRegistration};

use super::filter::ScopeFilter;

/// Build the `SELECT` for a registered entity under `filter`.
///
/// Table and column names come from static registrations only; every
/// tenant identifier is bound as a parameter.
pub fn scoped_select(
    registration: &ScopeRegistration,
    filter: &ScopeFilter,
    include_deleted: bool,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT * FROM {} WHERE TRUE", registration.table));

    if !include_deleted {
        if let Some(predicate) = registration.live_predicate {
            query.push(format!(" AND ({predicate})"));
        }
    }

    match (filter, registration.reference) {
        (ScopeFilter::Unscoped, _) => {}
        (ScopeFilter::Nothing, _) => {
            query.push(" AND FALSE");
        }
        (ScopeFilter::Organization(id), OrganizationRef::Organization(column)) => {
            query.push(format!(" AND {column} = "));
            query.push_bind(*id);
        }
        (ScopeFilter::Organization(id), OrganizationRef::Subunit(column)) => {
            query.push(format!(
                " AND {column} IN (SELECT id FROM subunits WHERE organization_id = "
            ));
            query.push_bind(*id);
            query.push(")");
        }
        (ScopeFilter::Federation(id), OrganizationRef::Organization(column)) => {
            query.push(format!(
                " AND {column} IN (SELECT id FROM organizations WHERE federation_id = "
            ));
            query.push_bind(*id);
            query.push(")");
        }
        (ScopeFilter::Federation(id), OrganizationRef::Subunit(column)) => {
            query.push(format!(
                " AND {column} IN (SELECT s.id FROM subunits s \
                 JOIN organizations o ON o.id = s.organization_id WHERE o.federation_id = "
            ));
            query.push_bind(*id);
            query.push(")");
        }
    }

    query.push(format!(" ORDER BY {}", registration.order_by));
    query
}
