//! Cross-module checks for ordinals, basenames and canonical routine names.

use std::path::Path;

use pgdcp_core::naming::{
    UNDETERMINED_IDENTITY, destination_basename, source_stem, subject_area_of, subject_areas,
};
use pgdcp_core::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn coordinator() -> EmitCoordinator {
    EmitCoordinator::new(CoordinatorProvenance {
        identity: "pgdcp".to_string(),
        version: "1.2.3".to_string(),
        source: "file:///repo/gen/020_billing.sqla.ts".to_string(),
    })
}

fn entries(indexes: &[Option<u32>]) -> Vec<ProvenanceEntry> {
    indexes
        .iter()
        .enumerate()
        .map(|(i, index)| {
            let entry = ProvenanceEntry::literal(format!("part{i}.sql"), "SELECT 1;");
            match index {
                Some(index) => entry.with_index(*index),
                None => entry,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Ordinals
// ---------------------------------------------------------------------------

#[test]
fn test_ordinals_start_at_zero_and_increment() {
    assert_eq!(resolve_ordinals(&entries(&[None, None, None])), vec![0, 1, 2]);
}

#[test]
fn test_explicit_index_resets_counter() {
    let ordinals = resolve_ordinals(&entries(&[None, Some(5), None, Some(20), None]));
    assert_eq!(ordinals, vec![0, 5, 6, 20, 21]);
    assert!(validate_ordinals(&ordinals).is_empty());
}

#[test]
fn test_ordinals_are_strictly_increasing_when_valid() {
    let list = entries(&[Some(3), None, Some(10), None, None]);
    assert!(validate_entries(&list).is_empty());
    let ordinals = resolve_ordinals(&list);
    assert!(ordinals.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_regressing_index_is_reported() {
    let list = entries(&[Some(10), Some(4)]);
    let errors = validate_entries(&list);
    assert_eq!(
        errors,
        vec![ValidationError::OrdinalRegression {
            ordinal: 4,
            previous: 10,
            position: 1
        }]
    );
}

// ---------------------------------------------------------------------------
// Basenames
// ---------------------------------------------------------------------------

#[test]
fn test_basename_is_deterministic() {
    let source = Path::new("/repo/gen/context.sqla.ts");
    let first = destination_basename(source, 7);
    let second = destination_basename(source, 7);
    assert_eq!(first, "007_context.auto.psql");
    assert_eq!(first, second);
}

#[test]
fn test_basename_pads_and_overflows_width() {
    assert_eq!(destination_basename(Path::new("a"), 0), "000_a.auto.psql");
    assert_eq!(
        destination_basename(Path::new("x.sqla.sh"), 1234),
        "1234_x.auto.psql"
    );
}

#[test]
fn test_source_stem_variants() {
    assert_eq!(source_stem(Path::new("lifecycle.sqla.ts")), "lifecycle");
    assert_eq!(source_stem(Path::new("seed.sql")), "seed.sql");
    assert_eq!(source_stem(Path::new("plain")), "plain");
}

// ---------------------------------------------------------------------------
// Subject areas and routine names
// ---------------------------------------------------------------------------

#[test]
fn test_prefix_stripping() {
    assert_eq!(subject_area_of("dcp_observability"), "observability");
    assert_eq!(subject_area_of("billing"), "billing");
    assert_eq!(
        subject_areas(["dcp_a", "b", "dcp_c"]),
        vec!["a", "b", "c"]
    );
    assert_eq!(subject_area_of(&DcpSchema::LifecycleDestroy), "lifecycle_destroy");
}

#[test]
fn test_lifecycle_names_use_distinct_namespaces() {
    let ec = coordinator();
    let lc = Lifecycle::new(&ec, "billing");

    let construct = lc.construct_storage(None);
    let destroy = lc.destroy_storage(None);
    assert_eq!(construct.qualified_name(), "dcp_lifecycle.billing_construct_storage");
    assert_eq!(destroy.qualified_name(), "dcp_lifecycle_destroy.billing_destroy_storage");
    assert_ne!(construct.namespace, destroy.namespace);

    assert_eq!(lc.upgrade(Some("invoice")).name, "invoice_upgrade");
}

#[test]
fn test_every_lifecycle_name_is_unique() {
    let ec = coordinator();
    let names: Vec<String> = Lifecycle::new(&ec, "billing")
        .all(None)
        .iter()
        .map(RoutineRef::qualified_name)
        .collect();
    let mut deduped = names.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(names.len(), LifecyclePhase::ALL.len());
    assert_eq!(deduped.len(), names.len());
}

#[test]
fn test_assurance_and_observability_names() {
    let ec = coordinator();
    let ae = Assurance::new(&ec, "billing");
    assert_eq!(ae.unit_test(None).qualified_name(), "dcp_assurance.test_billing");
    assert_eq!(ae.doctor(None).name, "test_doctor_billing");
    assert_eq!(ae.unit_test(None).kind, RoutineKind::SetOfTextFunction);

    let obs = Observability::new(&ec, "dcp_billing");
    assert_eq!(
        obs.metrics(None).qualified_name(),
        "dcp_observability.observability_metrics_billing"
    );
}

#[test]
fn test_missing_identity_uses_sentinel() {
    let ec = coordinator();
    let lc = Lifecycle::new(&ec, "");
    assert_eq!(
        lc.construct_storage(None).name,
        format!("{UNDETERMINED_IDENTITY}_construct_storage")
    );

    let state = DcpState::new(&ec, StateInit::default());
    assert_eq!(state.subject_area, UNDETERMINED_IDENTITY);
}

#[test]
fn test_coordinator_header_names_generator() {
    let ec = coordinator();
    assert_eq!(ec.psql_basename(".psql"), "020_billing.psql");
    assert_eq!(
        ec.psql_header(),
        "-- generated from pgdcp version 1.2.3 (basename: 020_billing.psql)"
    );
}
