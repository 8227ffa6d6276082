#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use parcelplot_core_wasm::measure;

use geo_types::polygon;

// Smoke tests run with `wasm-pack test` to confirm the geometry math behaves
// the same inside the wasm sandbox.

#[wasm_bindgen_test]
fn unit_square_measures_in_wasm() {
    let square = polygon![
        (x: 0.0, y: 0.0),
        (x: 1.0, y: 0.0),
        (x: 1.0, y: 1.0),
        (x: 0.0, y: 1.0),
        (x: 0.0, y: 0.0),
    ];

    let lengths = measure::side_lengths(&square);
    assert_eq!(lengths.len(), 4);
    for length in lengths {
        assert!((length - 1.0).abs() < 1e-12);
    }
    assert!((measure::area(&square) - 1.0).abs() < 1e-12);
}

#[wasm_bindgen_test]
fn session_stats_round_trip() {
    assert!(parcelplot_core_wasm::reset_session_stats());
    let stats = parcelplot_core_wasm::get_session_stats().unwrap();
    assert!(stats.is_object());
}
