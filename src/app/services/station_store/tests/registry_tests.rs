//! Tests for the variable index and metadata entries

use super::*;
use crate::app::services::station_store::{StationMeta, VarIndex};

#[test]
fn test_var_index_first_seen_order() {
    let mut index = VarIndex::new();
    assert_eq!(index.get_or_assign("scatc550aer"), 0);
    assert_eq!(index.get_or_assign("absc550aer"), 1);
    assert_eq!(index.get_or_assign("scatc550aer"), 0);
    assert_eq!(index.name(1), Some("absc550aer"));
    assert_eq!(index.get("od550aer"), None);
}

#[test]
fn test_var_idx_stable_across_files() {
    let mut store = create_test_store(50);
    store
        .append_record(&create_test_record("Zeppelin", "a.nas", 2, &["x"]))
        .unwrap();
    store
        .append_record(&create_test_record("Zeppelin", "b.nas", 2, &["y", "x"]))
        .unwrap();
    store
        .append_record(&create_test_record("Zeppelin", "c.nas", 2, &["z", "y"]))
        .unwrap();

    let index = store.var_index();
    assert_eq!(index.get("x"), Some(0));
    assert_eq!(index.get("y"), Some(1));
    assert_eq!(index.get("z"), Some(2));
}

#[test]
fn test_meta_entry_from_record() {
    let record = create_test_record("Zeppelin", "a.nas", 2, &["x", "y"]);
    let meta = StationMeta::from_record(&record);

    assert_eq!(meta.station_name(), "Zeppelin");
    assert_eq!(meta.variables, vec!["x", "y"]);
    assert_eq!(meta.meta_map(), record.meta_map());
}

#[test]
fn test_incompatible_units_not_collapsed() {
    let a = create_test_record("Zeppelin", "a.nas", 2, &["x"]);
    let mut b = create_test_record("Zeppelin", "b.nas", 2, &["x"]);
    b.var_info.get_mut("x").unwrap().unit = Some("ug m-3".to_string());

    let meta_a = StationMeta::from_record(&a);
    let meta_b = StationMeta::from_record(&b);
    assert!(!meta_a.compatible_var_info(&meta_b));
}
