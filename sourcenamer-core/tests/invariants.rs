//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use sourcenamer_core::{
    fields::{Casing, FieldConfig, FieldUpdate, Joining, NamerConfig},
    processor::{process, sanitize},
    render::{render, RenderInputs},
    store::ConfigStore,
    validation::Validator,
};

fn create_test_config() -> NamerConfig {
    let mut config = NamerConfig::empty();
    config.template = "{Site}.{Hostname}_{IPAddress}".to_string();
    config.fields = vec![
        FieldConfig::new(1, "Hostname")
            .with_casing(Casing::Sentence)
            .with_joining(Joining::Kebab),
        FieldConfig::new(2, "IPAddress"),
        FieldConfig::new(3, "Site")
            .with_casing(Casing::Lowercase)
            .with_joining(Joining::Snake),
    ];
    config
}

fn inputs(pairs: &[(u32, &str)]) -> RenderInputs {
    pairs.iter().map(|(id, v)| (*id, v.to_string())).collect()
}

#[test]
fn invariant_hostname_scenario() {
    let config = create_test_config();
    let hostname = config.field_by_name("Hostname").unwrap();
    assert_eq!(process("  WEB server 01  ", hostname), "Web-server-01");
}

#[test]
fn invariant_render_end_to_end() {
    let config = create_test_config();
    let out = render(
        &config,
        &inputs(&[(1, "  WEB server 01  "), (2, "10.0.0.1"), (3, "İzmir Çiğli")]),
    );
    assert_eq!(out.output, "izmir_cigli.Web-server-01_10.0.0.1");
    assert!(out.is_complete());
}

#[test]
fn invariant_missing_input_skipped() {
    let config = create_test_config();
    let out = render(&config, &inputs(&[(3, "Ankara")]));
    assert_eq!(out.output, "ankara.{Hostname}_{IPAddress}");
    assert_eq!(out.skipped, vec![1, 2]);
}

#[test]
fn invariant_process_is_pure() {
    let config = create_test_config();
    let before = config.clone();
    let field = &config.fields[0];
    let a = process("Some Value. again", field);
    let b = process("Some Value. again", field);
    assert_eq!(a, b);
    assert_eq!(config, before);
}

#[test]
fn invariant_sanitized_output_is_ascii() {
    for input in ["Ğüneş", "naïve café", "日本語 text", "emoji 🚀 here", "tab\tsep"] {
        let once = sanitize(input);
        assert!(once.is_ascii(), "{input:?} -> {once:?}");
        assert!(!once.contains("  "));
        assert_eq!(sanitize(&once), once);
    }
}

#[test]
fn invariant_unknown_variants_degrade() {
    let json = r#"{
        "template": "{Code}",
        "fields": [{"id": 1, "name": "Code", "trim": true, "casing": "SHOUT", "joining": "pascal"}]
    }"#;
    let config: NamerConfig = serde_json::from_str(json).unwrap();
    let out = render(&config, &inputs(&[(1, "Ab Cd")]));
    assert_eq!(out.output, "Ab Cd");
}

#[test]
fn invariant_field_ids_stable_across_rename() {
    let mut config = create_test_config();
    config
        .update_field(3, FieldUpdate { name: Some("Region".into()), ..Default::default() })
        .unwrap();
    config.template = config.template.replace("{Site}", "{Region}");

    let out = render(&config, &inputs(&[(3, "EU West")]));
    assert_eq!(out.output, "eu_west.{Hostname}_{IPAddress}");
    assert_eq!(config.field(3).unwrap().name, "Region");
}

#[test]
fn invariant_store_roundtrip_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    let config = create_test_config();

    assert!(Validator::new().validate(&config).valid);
    store.save(&config).unwrap();

    let loaded = store.load().unwrap();
    let ids: Vec<_> = loaded.fields.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(loaded, config);
}
