#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use meshrelay_core::crypto::ChannelKey;
use meshrelay_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
channel:
  name: "LongFast"
  kee: "AQ==" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
    assert!(err.is_fatal());
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.channel.name, "LongFast");
    assert_eq!(cfg.mqtt.topic_filter, "msh/#");
    assert_eq!(cfg.mqtt.max_envelope_bytes, 4096);
    assert_eq!(cfg.relay.max_line_bytes, 510);
    assert!(!cfg.relay.enabled);
    assert!(cfg.channel.channel_key().unwrap().is_default());
}

#[test]
fn full_config() {
    let ok = r##"
version: 1
channel:
  name: "Private"
  key: "1PG7OiApB1nwvP-rz05pAQ"
mqtt:
  topic_filter: "msh/+/2/e/#"
  max_envelope_bytes: 1024
gateway:
  listen: "127.0.0.1:9000"
  ping_interval_ms: 10000
  idle_timeout_ms: 30000
  event_buffer: 64
relay:
  enabled: true
  channel: "#mesh"
  max_line_bytes: 400
  include_diagnostics: true
  queue_depth: 16
"##;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.listen, "127.0.0.1:9000");
    assert_eq!(cfg.relay.channel, "#mesh");
    assert!(cfg.channel.channel_key().unwrap().is_default());
}

#[test]
fn empty_key_means_open_channel() {
    let cfg = config::load_from_str("version: 1\nchannel:\n  key: \"\"\n").unwrap();
    assert_eq!(cfg.channel.channel_key().unwrap(), ChannelKey::Open);
}

#[test]
fn rejects_bad_values() {
    let cases = [
        ("version: 2\n", "version"),
        ("version: 1\nchannel:\n  key: \"AAAA\"\n", "key length"),
        ("version: 1\nchannel:\n  key: \"not base64!\"\n", "key alphabet"),
        ("version: 1\nmqtt:\n  topic_filter: \"msh/#/x\"\n", "hash not last"),
        ("version: 1\nmqtt:\n  max_envelope_bytes: 10\n", "envelope limit"),
        ("version: 1\ngateway:\n  listen: \"nope\"\n", "listen"),
        (
            "version: 1\ngateway:\n  ping_interval_ms: 30000\n  idle_timeout_ms: 20000\n",
            "idle <= ping",
        ),
        ("version: 1\nrelay:\n  channel: \"mesh\"\n", "relay channel"),
        ("version: 1\nrelay:\n  max_line_bytes: 600\n", "line limit"),
    ];
    for (yaml, what) in cases {
        let err = config::load_from_str(yaml).err().unwrap_or_else(|| panic!("{what} must fail"));
        assert!(err.is_fatal(), "{what}: {err}");
    }
}

#[test]
fn shipped_sample_config_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../meshrelay.yaml");
    let cfg = config::load_from_file(path).expect("sample config must load");
    assert_eq!(cfg.channel.name, "LongFast");
    assert_eq!(cfg.relay.channel, "#meshtastic");
}
