//! Tests for the full resolution cascade

use super::*;
use crate::app::models::VariableColumnSpec;
use crate::app::services::column_resolver::ColumnResolver;
use crate::config::ResolverConfig;
use crate::error::ObsError;

fn resolver() -> ColumnResolver {
    ColumnResolver::new(ResolverConfig::default())
}

fn scattering_spec() -> VariableColumnSpec {
    VariableColumnSpec::new("scatc550aer", &[SCATTERING]).with_wavelength(510.0)
}

#[test]
fn test_wavelength_selects_nearest_column() {
    let file = create_test_file(
        vec![
            scattering_column(0, "500 nm"),
            scattering_column(1, "520 nm"),
            scattering_column(2, "600 nm"),
        ],
        constant_rows(&[1.0, 2.0, 3.0], 5),
    );

    let resolver = resolver();
    assert_eq!(resolver.resolve(&scattering_spec(), &file).unwrap(), 1);
}

#[test]
fn test_resolution_is_deterministic() {
    let file = create_test_file(
        vec![
            scattering_column(0, "500 nm"),
            scattering_column(1, "520 nm"),
            scattering_column(2, "600 nm"),
        ],
        constant_rows(&[1.0, 2.0, 3.0], 5),
    );
    let resolver = resolver();
    let spec = scattering_spec();

    let first = resolver.resolve(&spec, &file).unwrap();
    for _ in 0..10 {
        assert_eq!(resolver.resolve(&spec, &file).unwrap(), first);
    }
}

#[test]
fn test_not_found_when_no_candidate() {
    let file = create_test_file(
        vec![ColumnDef::new(0, "aerosol_absorption_coefficient")],
        constant_rows(&[1.0], 2),
    );

    let err = resolver().resolve(&scattering_spec(), &file).unwrap_err();
    assert!(matches!(err, ObsError::VariableNotFound { .. }));
    assert!(err.is_not_found());
}

#[test]
fn test_not_found_when_all_out_of_wavelength_range() {
    let file = create_test_file(
        vec![scattering_column(0, "700 nm")],
        constant_rows(&[1.0], 2),
    );

    assert!(matches!(
        resolver().resolve(&scattering_spec(), &file),
        Err(ObsError::VariableNotFound { .. })
    ));
}

#[test]
fn test_matrix_preference_breaks_tie() {
    let file = create_test_file(
        vec![
            ColumnDef::new(0, SCATTERING).with_attr("matrix", "pm25"),
            ColumnDef::new(1, SCATTERING).with_attr("matrix", "pm10"),
        ],
        constant_rows(&[1.0, 2.0], 3),
    );
    let spec = VariableColumnSpec::new("scatc550aer", &[SCATTERING]).with_matrix(&["pm10", "pm25"]);

    assert_eq!(resolver().resolve(&spec, &file).unwrap(), 1);
}

#[test]
fn test_default_statistic_preference_breaks_tie() {
    let file = create_test_file(
        vec![
            ColumnDef::new(0, SCATTERING).with_attr("statistics", "median"),
            ColumnDef::new(1, SCATTERING).with_attr("statistics", "arithmetic mean"),
        ],
        constant_rows(&[1.0, 2.0], 3),
    );
    let spec = VariableColumnSpec::new("scatc550aer", &[SCATTERING]);

    assert_eq!(resolver().resolve(&spec, &file).unwrap(), 1);
}

#[test]
fn test_fewest_missing_samples_breaks_tie() {
    let file = create_test_file(
        vec![scattering_column(0, "550 nm"), scattering_column(1, "550 nm")],
        vec![
            vec![f64::NAN, 1.0],
            vec![2.0, 2.0],
            vec![f64::NAN, f64::NAN],
        ],
    );
    let spec = VariableColumnSpec::new("scatc550aer", &[SCATTERING]).with_wavelength(550.0);

    assert_eq!(resolver().resolve(&spec, &file).unwrap(), 1);
}

#[test]
fn test_residual_tie_uses_lowest_index() {
    let file = create_test_file(
        vec![scattering_column(0, "550 nm"), scattering_column(1, "550 nm")],
        constant_rows(&[1.0, 2.0], 3),
    );
    let spec = VariableColumnSpec::new("scatc550aer", &[SCATTERING]).with_wavelength(550.0);

    assert_eq!(resolver().resolve(&spec, &file).unwrap(), 0);
}

#[test]
fn test_residual_tie_fails_when_unique_required() {
    let file = create_test_file(
        vec![scattering_column(0, "550 nm"), scattering_column(1, "550 nm")],
        constant_rows(&[1.0, 2.0], 3),
    );
    let spec = VariableColumnSpec::new("scatc550aer", &[SCATTERING])
        .with_wavelength(550.0)
        .with_require_unique();

    match resolver().resolve(&spec, &file) {
        Err(ObsError::ResolutionFailure { candidates, .. }) => assert_eq!(candidates, vec![0, 1]),
        other => panic!("expected resolution failure, got {:?}", other),
    }
}

#[test]
fn test_spec_tolerance_overrides_default() {
    let file = create_test_file(
        vec![scattering_column(0, "530 nm")],
        constant_rows(&[1.0], 2),
    );
    let spec = VariableColumnSpec::new("scatc550aer", &[SCATTERING])
        .with_wavelength(550.0)
        .with_wavelength_tolerance(10.0);

    assert!(resolver().resolve(&spec, &file).is_err());
}

#[test]
fn test_wavelength_columns_need_wavelength_definition() {
    let file = create_test_file(
        vec![
            scattering_column(0, "450 nm"),
            scattering_column(1, "550 nm"),
            scattering_column(2, "700 nm"),
        ],
        constant_rows(&[1.0, 2.0, 3.0], 4),
    );
    let spec = VariableColumnSpec::new("scatc550aer", &[SCATTERING]);

    assert!(matches!(
        resolver().resolve(&spec, &file),
        Err(ObsError::VariableDefinition { .. })
    ));
}

#[test]
fn test_mixed_matrices_without_preference_fail() {
    let file = create_test_file(
        vec![
            ColumnDef::new(0, SCATTERING).with_attr("matrix", "pm25"),
            ColumnDef::new(1, SCATTERING).with_attr("matrix", "pm10"),
        ],
        constant_rows(&[1.0, 2.0], 3),
    );
    let spec = VariableColumnSpec::new("scatc550aer", &[SCATTERING]);

    match resolver().resolve(&spec, &file) {
        Err(ObsError::ResolutionFailure { candidates, .. }) => assert_eq!(candidates, vec![0, 1]),
        other => panic!("expected resolution failure, got {:?}", other),
    }
}

#[test]
fn test_shared_matrix_without_preference_resolves() {
    // column 1 states the file default matrix explicitly
    let file = create_test_file(
        vec![
            ColumnDef::new(0, SCATTERING),
            ColumnDef::new(1, SCATTERING).with_attr("matrix", "pm10"),
        ],
        vec![vec![f64::NAN, 1.0], vec![2.0, 2.0]],
    );
    let spec = VariableColumnSpec::new("scatc550aer", &[SCATTERING]);

    assert_eq!(resolver().resolve(&spec, &file).unwrap(), 1);
}
