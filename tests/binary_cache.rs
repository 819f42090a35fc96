#![cfg(feature = "binary-cache")]

use ruleit::{
    DeserializeError, EngineConfig, MemoryStore, Record, RuleEngine, RuleId, RuleStore, Verdict,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn populated_store() -> MemoryStore {
    let mut engine = RuleEngine::new();
    engine
        .compile("age >= 18 AND status = 'active'", Some("eligible"))
        .unwrap();
    engine
        .combine(
            Some("fast_track"),
            &["tier = 'premium'", "score > 90.5"],
            &["OR"],
        )
        .unwrap();
    let edited = engine.compile("x + 1", None).unwrap();
    engine.edit(edited.id, "x * 2").unwrap();
    engine.into_store()
}

fn sample_record() -> Record {
    Record::new()
        .set("age", 25)
        .set("status", "active")
        .set("tier", "basic")
        .set("score", 95)
        .set("x", 4)
}

fn engine_over(store: MemoryStore) -> RuleEngine {
    RuleEngine::with_store(store, EngineConfig::default())
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn round_trip_preserves_rules_and_answers() {
    let original = populated_store();
    let bytes = original.to_bytes().unwrap();
    let restored = MemoryStore::from_bytes(&bytes).unwrap();

    assert_eq!(restored.len(), original.len());
    assert_eq!(restored.node_count(), original.node_count());

    let (original, restored) = (engine_over(original), engine_over(restored));
    let record = sample_record();
    for name in ["eligible", "fast_track"] {
        assert_eq!(
            original.evaluate(name, &record).unwrap(),
            restored.evaluate(name, &record).unwrap()
        );
        assert_eq!(original.render(name).unwrap(), restored.render(name).unwrap());
    }
    assert_eq!(
        restored.evaluate(RuleId(3), &record).unwrap(),
        Verdict::Number(8.0)
    );
}

#[test]
fn restored_store_continues_id_sequence() {
    let bytes = populated_store().to_bytes().unwrap();
    let mut engine = engine_over(MemoryStore::from_bytes(&bytes).unwrap());
    let rule = engine.compile("y < 3", None).unwrap();
    assert_eq!(rule.id, RuleId(4));
    // names survive as an index, not only as rule fields
    assert!(engine.compile("y > 3", Some("eligible")).is_err());
}

#[test]
fn round_trip_after_sweep() {
    let mut store = populated_store();
    assert!(store.sweep() > 0);
    let restored = MemoryStore::from_bytes(&store.to_bytes().unwrap()).unwrap();
    let engine = engine_over(restored);
    assert_eq!(
        engine.evaluate("eligible", &sample_record()).unwrap(),
        Verdict::Bool(true)
    );
}

#[test]
fn empty_store_round_trip() {
    let bytes = MemoryStore::new().to_bytes().unwrap();
    let restored = MemoryStore::from_bytes(&bytes).unwrap();
    assert!(restored.is_empty());
    assert_eq!(restored.node_count(), 0);
}

#[test]
fn file_round_trip() {
    let path = std::env::temp_dir().join("ruleit_binary_cache_test.rlit");
    let store = populated_store();
    store.to_binary_file(&path).unwrap();
    let restored = MemoryStore::from_binary_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(restored.len(), store.len());
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join("ruleit_does_not_exist.rlit");
    let err = MemoryStore::from_binary_file(path).unwrap_err();
    assert!(matches!(err, DeserializeError::Io(_)), "got: {err}");
}

// ---------------------------------------------------------------------------
// Corruption
// ---------------------------------------------------------------------------

#[test]
fn corruption_byte_flip() {
    let mut bytes = populated_store().to_bytes().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    let err = MemoryStore::from_bytes(&bytes).unwrap_err();
    assert!(
        matches!(err, DeserializeError::ChecksumMismatch),
        "expected ChecksumMismatch, got: {err}"
    );
}

#[test]
fn corruption_truncation() {
    let bytes = populated_store().to_bytes().unwrap();
    let err = MemoryStore::from_bytes(&bytes[..33]).unwrap_err();
    assert!(
        matches!(err, DeserializeError::LengthMismatch { .. }),
        "expected LengthMismatch, got: {err}"
    );
}

#[test]
fn bad_magic() {
    let mut bytes = populated_store().to_bytes().unwrap();
    bytes[0..4].copy_from_slice(b"OORO");
    let err = MemoryStore::from_bytes(&bytes).unwrap_err();
    assert!(
        matches!(err, DeserializeError::BadMagic),
        "expected BadMagic, got: {err}"
    );
}

#[test]
fn version_mismatch() {
    let mut bytes = populated_store().to_bytes().unwrap();
    bytes[4] = 99;
    bytes[5] = 0;
    let err = MemoryStore::from_bytes(&bytes).unwrap_err();
    assert!(
        matches!(
            err,
            DeserializeError::IncompatibleVersion {
                blob: 99,
                supported: 1
            }
        ),
        "expected IncompatibleVersion, got: {err}"
    );
}

#[test]
fn empty_input() {
    assert!(matches!(
        MemoryStore::from_bytes(&[]).unwrap_err(),
        DeserializeError::LengthMismatch { .. }
    ));
}
