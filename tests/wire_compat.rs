//! Wire-format compatibility: the encoding is pinned to known bytes so that
//! field tags can never drift, and decoding tolerates fields this version
//! does not know about.

use routewire::{wire, AttributeFilter, Broker, ConfigSnapshot, Trigger};

/// Snapshot at generation 7 with one broker (`b1`, topic `t`, namespace
/// `ns`, name `n`) carrying one trigger (`t1`, `{type: foo}`, destination
/// `http://d`), encoded with the frozen tag assignment:
/// trigger { attributes = 1, destination = 2, id = 3 },
/// broker { id = 1, topic = 2, dead_letter_sink = 3, triggers = 4,
/// namespace = 5, name = 6 },
/// snapshot { brokers = 1, volume_generation = 2 }.
const GOLDEN: &str =
    "0a2b0a026231120174221b0a0b0a04747970651203666f6f1208687474703a2f2f641a0274312a026e7332016e1007";

fn golden_snapshot() -> ConfigSnapshot {
    let broker = Broker::new("b1", "t", "ns", "n")
        .unwrap()
        .with_trigger(
            Trigger::new("t1", AttributeFilter::new().with("type", "foo"), "http://d").unwrap(),
        )
        .unwrap();
    ConfigSnapshot::new(7, vec![broker]).unwrap()
}

#[test]
fn encoding_matches_the_pinned_bytes() {
    let bytes = wire::encode_snapshot(&golden_snapshot());
    assert_eq!(hex::encode(&bytes), GOLDEN);
}

#[test]
fn pinned_bytes_decode_to_the_expected_snapshot() {
    let bytes = hex::decode(GOLDEN).unwrap();
    let snapshot = wire::decode_snapshot(&bytes).unwrap();
    assert_eq!(snapshot, golden_snapshot());

    let broker = snapshot.broker("b1").unwrap();
    assert_eq!(broker.topic(), "t");
    assert_eq!(broker.dead_letter_sink(), None);
    assert_eq!(broker.triggers()[0].destination(), "http://d");
}

#[test]
fn unknown_fields_are_ignored_on_decode() {
    // A newer producer appending a field this version has no tag for
    // (field 9, varint) must not break decoding.
    let mut bytes = hex::decode(GOLDEN).unwrap();
    bytes.extend_from_slice(&[0x48, 0x01]);

    let snapshot = wire::decode_snapshot(&bytes).unwrap();
    assert_eq!(snapshot, golden_snapshot());
}

#[test]
fn empty_snapshot_encodes_to_generation_only() {
    let snapshot = ConfigSnapshot::new(3, Vec::new()).unwrap();
    let bytes = wire::encode_snapshot(&snapshot);
    assert_eq!(hex::encode(&bytes), "1003");

    let decoded = wire::decode_snapshot(&bytes).unwrap();
    assert_eq!(decoded.generation(), 3);
    assert!(decoded.is_empty());
}
