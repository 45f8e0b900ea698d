#![cfg(feature = "serde")]

use machine_mac128::{MacConfig, MacModel};

#[test]
fn config_round_trips_through_json() {
    let config = MacConfig::new(MacModel::MacSeFdhd, vec![0; 4]).with_ram(2 * 1024 * 1024);
    let json = serde_json::to_string(&config).expect("serialise");
    assert!(json.contains("MacSeFdhd"));
    let back: MacConfig = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(back.model, MacModel::MacSeFdhd);
    assert_eq!(back.ram_size, Some(2 * 1024 * 1024));
    assert_eq!(back.rom, vec![0; 4]);
}
