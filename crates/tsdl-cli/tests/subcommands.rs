//! End-to-end tests for the `check` and `resolve` subcommands on files.

use std::fs;
use std::path::{Path, PathBuf};

use tsdl_cli::check::{run_check, CheckArgs};
use tsdl_cli::load::{load_trace_class, Format};
use tsdl_cli::resolve::{run_resolve, ResolveArgs};
use tsdl_core::{FieldClass, FieldIndex, FieldPath, Scope};
use tsdl_resolve::ResolveConfig;

const SCHEMA_JSON: &str = r#"{
  "packet_header": {
    "type": "struct",
    "members": [
      {"name": "magic", "fc": {"type": "int", "size": 32, "alignment": 8}},
      {"name": "stream_id", "fc": {"type": "int", "size": 8, "alignment": 8}}
    ]
  },
  "stream_classes": [
    {
      "id": 0,
      "packet_context": {
        "type": "struct",
        "members": [
          {"name": "content_size", "fc": {"type": "int", "size": 64, "alignment": 8}},
          {"name": "flags", "fc": {"type": "int", "size": 8, "alignment": 8}}
        ]
      },
      "event_header": {
        "type": "struct",
        "members": [
          {"name": "id", "fc": {"type": "enum",
                                "int": {"size": 8, "alignment": 8},
                                "mappings": [
                                  {"label": "compact", "ranges": [{"lower": 0, "upper": 30}]},
                                  {"label": "extended", "ranges": [{"lower": 31, "upper": 31}]}
                                ]}},
          {"name": "v", "fc": {"type": "variant", "tag_ref": "id",
                               "options": [
                                 {"name": "compact", "fc": {"type": "int", "size": 27}},
                                 {"name": "extended", "fc": {"type": "int", "size": 64}}
                               ]}}
        ]
      },
      "event_classes": [
        {
          "id": 1,
          "name": "log_line",
          "payload": {
            "type": "struct",
            "members": [
              {"name": "len", "fc": {"type": "int", "size": 16, "alignment": 8}},
              {"name": "msg", "fc": {"type": "sequence", "length_ref": "len",
                                     "elem": {"type": "int", "size": 8, "alignment": 8,
                                              "encoding": "utf8"}}},
              {"name": "extra", "fc": {"type": "sequence",
                                       "length_ref": "stream.packet.context.flags",
                                       "elem": {"type": "int", "size": 32}}}
            ]
          }
        }
      ]
    }
  ]
}"#;

const BROKEN_YAML: &str = "
stream_classes:
  - id: 0
    event_classes:
      - id: 1
        name: broken
        payload:
          type: struct
          members:
            - name: data
              fc:
                type: sequence
                length_ref: len
                elem: {type: int, size: 8}
            - name: len
              fc: {type: int, size: 8}
";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn check_accepts_valid_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "metadata.json", SCHEMA_JSON);
    for json in [false, true] {
        let args = CheckArgs {
            path: path.clone(),
            json,
        };
        assert_eq!(run_check(&args, &ResolveConfig::default()).unwrap(), 0);
    }
}

#[test]
fn check_rejects_forward_reference() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "broken.yaml", BROKEN_YAML);
    let args = CheckArgs { path, json: false };
    assert_eq!(run_check(&args, &ResolveConfig::default()).unwrap(), 1);
}

#[test]
fn check_reports_missing_file_as_error() {
    let dir = tempfile::tempdir().unwrap();
    let args = CheckArgs {
        path: dir.path().join("absent.yaml"),
        json: false,
    };
    let err = run_check(&args, &ResolveConfig::default()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read"));
}

#[test]
fn resolve_writes_completed_trace_class() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "metadata.json", SCHEMA_JSON);
    let output = dir.path().join("resolved.yaml");
    let args = ResolveArgs {
        path: input,
        output: Some(output.clone()),
        format: None,
    };
    assert_eq!(run_resolve(&args, &ResolveConfig::default()).unwrap(), 0);

    let tc = load_trace_class(&output).unwrap();
    let sc = &tc.stream_classes[0];

    let Some(FieldClass::Struct(header)) = &sc.event_header else {
        panic!("expected an event header structure");
    };
    let FieldClass::Variant(v) = &header.members[1].fc else {
        panic!("expected a variant");
    };
    assert_eq!(
        v.tag_path,
        Some(FieldPath::new(Scope::EventHeader, vec![FieldIndex::Member(0)]))
    );

    let Some(FieldClass::Struct(payload)) = &sc.event_classes[0].payload else {
        panic!("expected a payload structure");
    };
    let FieldClass::Sequence(msg) = &payload.members[1].fc else {
        panic!("expected a sequence");
    };
    assert_eq!(
        msg.length_path,
        Some(FieldPath::new(Scope::EventPayload, vec![FieldIndex::Member(0)]))
    );
    assert!(msg.is_text);

    let FieldClass::Sequence(extra) = &payload.members[2].fc else {
        panic!("expected a sequence");
    };
    assert_eq!(
        extra.length_path,
        Some(FieldPath::new(Scope::PacketContext, vec![FieldIndex::Member(1)]))
    );
    assert!(!extra.is_text);
}

#[test]
fn resolve_honours_config_and_format() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "metadata.json", SCHEMA_JSON);
    let output = dir.path().join("resolved.out");
    let args = ResolveArgs {
        path: input,
        output: Some(output.clone()),
        format: Some(Format::Json),
    };
    let config = ResolveConfig {
        update_text_arrays: false,
        ..ResolveConfig::default()
    };
    assert_eq!(run_resolve(&args, &config).unwrap(), 0);

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.trim_start().starts_with('{'));
    assert!(!text.contains("\"is_text\": true"));
}

#[test]
fn resolve_writes_nothing_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "broken.yaml", BROKEN_YAML);
    let output = dir.path().join("resolved.yaml");
    let args = ResolveArgs {
        path: input,
        output: Some(output.clone()),
        format: None,
    };
    assert_eq!(run_resolve(&args, &ResolveConfig::default()).unwrap(), 1);
    assert!(!output.exists());
}
