// Browser smoke tests, run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use fishing_arcade::FishingGame;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn round_runs_in_browser() {
    let Ok(mut game) = FishingGame::with_sample_catalog(Some(3)) else {
        panic!("sample catalog rejected");
    };
    game.start_round(90.0, true, 5.0);
    game.begin_fishing();
    for _ in 0..120 {
        game.step(1.0 / 60.0);
    }
    assert!(game.fish_count() >= 12);
    assert!(game.snapshot().is_ok());
}

#[wasm_bindgen_test]
fn bad_catalog_raises() {
    assert!(FishingGame::new("not json", Some(1)).is_err());
    assert!(FishingGame::new("[]", Some(1)).is_err());
}

#[wasm_bindgen_test]
fn config_override_is_validated() {
    let catalog = fishing_arcade::SAMPLE_CATALOG_JSON;
    assert!(FishingGame::with_config(catalog, r#"{ "detectionRange": 8 }"#, Some(1)).is_ok());
    assert!(FishingGame::with_config(catalog, r#"{ "maxDt": 0 }"#, Some(1)).is_err());
}
