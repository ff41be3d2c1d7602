#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Contract tests for plan building and scoped listing, exercised through the
//! public API only.

use carepath_listing::eval::{FieldValue, Record, execute};
use carepath_listing::{
    Condition, ListQueryParams, ListQuerySpec, OrderBy, SortDirection, build_plan,
    build_scoped_plan,
};
use carepath_security::AccessScope;
use carepath_security::access_scope::properties;
use uuid::Uuid;

const ORG_A: &str = "6f1d3a40-0000-4000-8000-00000000000a";
const ORG_B: &str = "6f1d3a40-0000-4000-8000-00000000000b";

fn org(id: &str) -> Uuid {
    Uuid::parse_str(id).unwrap()
}

fn patients_spec() -> ListQuerySpec {
    ListQuerySpec::builder("patients")
        .searchable(["firstName", "lastName", "email"])
        .filter_enum("gender", "gender", ["male", "female", "other"])
        .filter_date_after("createdAfter", "createdAt")
        .sortable("lastName", "lastName")
        .sortable("createdAt", "createdAt")
        .scope_field(properties::ORGANIZATION_ID, "organizationId")
        .default_sort("createdAt", SortDirection::Desc)
        .page_sizes(10, 100)
        .build()
        .unwrap()
}

#[test]
fn default_request_yields_default_plan() {
    let plan = build_plan(
        &patients_spec(),
        &ListQueryParams::new().page(1).page_size(10),
    );
    assert_eq!(plan.limit, 10);
    assert_eq!(plan.offset, 0);
    assert_eq!(plan.order_by, OrderBy::new("createdAt", SortDirection::Desc));
    assert!(plan.conditions.is_empty());
}

#[test]
fn plan_is_always_ordered() {
    let spec = patients_spec();
    for params in [
        ListQueryParams::new(),
        ListQueryParams::new().sort("", None),
        ListQueryParams::new().sort("password", Some(SortDirection::Asc)),
        ListQueryParams::from_query_str("sortBy=lastName&sortDirection=upwards"),
    ] {
        let plan = build_plan(&spec, &params);
        assert!(!plan.order_by.field.is_empty());
        assert!(!plan.ordering().is_empty());
    }
}

#[test]
fn unknown_filter_key_is_dropped() {
    let spec = patients_spec();
    let base = ListQueryParams::new().page(2).page_size(10);
    let with_bogus = base.clone().filter("bogusKey", "x");
    assert_eq!(
        build_plan(&spec, &with_bogus).conditions,
        build_plan(&spec, &base).conditions
    );
}

#[test]
fn whitespace_search_adds_no_condition() {
    let plan = build_plan(&patients_spec(), &ListQueryParams::new().search("   "));
    assert!(plan.conditions.is_empty());
}

#[test]
fn page_size_beyond_maximum_is_clamped() {
    let plan = build_plan(&patients_spec(), &ListQueryParams::new().page_size(10_000));
    assert_eq!(plan.limit, 100);
    assert_eq!(plan.page.page_size(), 100);
}

#[test]
fn plans_from_equivalent_query_strings_are_identical() {
    let spec = patients_spec();
    let a = build_plan(
        &spec,
        &ListQueryParams::from_query_str("gender=female&createdAfter=2024-01-01&q=ann"),
    );
    let b = build_plan(
        &spec,
        &ListQueryParams::from_query_str("q=ann&createdAfter=2024-01-01&gender=FEMALE"),
    );
    assert_eq!(a, b);
    assert_eq!(a.conditions.len(), 3);
}

#[test]
fn scoped_plan_appends_organization_condition() {
    let spec = patients_spec();
    let plan = build_scoped_plan(
        &spec,
        &ListQueryParams::new(),
        &AccessScope::for_organization(org(ORG_A)),
    );
    assert_eq!(
        plan.conditions,
        vec![Condition::is_in("organizationId", vec![org(ORG_A)])]
    );
}

#[test]
fn scoped_plan_with_deny_all_matches_nothing() {
    let plan = build_scoped_plan(
        &patients_spec(),
        &ListQueryParams::new().search("ann"),
        &AccessScope::deny_all(),
    );
    assert_eq!(plan.conditions.last(), Some(&Condition::Never));
}

#[derive(Clone, Debug)]
struct PatientRow {
    id: Uuid,
    organization_id: Uuid,
    last_name: &'static str,
}

impl Record for PatientRow {
    fn field(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.into(),
            "organizationId" => self.organization_id.into(),
            "lastName" => self.last_name.into(),
            _ => FieldValue::Null,
        }
    }
}

#[test]
fn scoped_plan_executes_against_rows_of_permitted_organizations_only() {
    let rows = vec![
        PatientRow {
            id: Uuid::from_u128(1),
            organization_id: org(ORG_A),
            last_name: "Nguyen",
        },
        PatientRow {
            id: Uuid::from_u128(2),
            organization_id: org(ORG_B),
            last_name: "Novak",
        },
        PatientRow {
            id: Uuid::from_u128(3),
            organization_id: org(ORG_A),
            last_name: "Abbott",
        },
    ];
    let plan = build_scoped_plan(
        &patients_spec(),
        &ListQueryParams::new().sort("lastName", Some(SortDirection::Asc)),
        &AccessScope::for_organization(org(ORG_A)),
    );
    let (page, total) = execute(&rows, &plan);
    let result = plan.paginate(page, total);

    assert!(result.success);
    assert_eq!(result.pagination.total_count, 2);
    let names: Vec<_> = result.data.iter().map(|r| r.last_name).collect();
    assert_eq!(names, vec!["Abbott", "Nguyen"]);
}
