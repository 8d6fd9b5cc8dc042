//! Batch commands run through RunContext against files in a temporary workspace

use std::fs;
use tagtree::cli::{Commands, RunContext};
use tagtree::error::ApiError;
use tagtree::store::{Document, SledChunkStore, StorageBackend};
use tagtree::tag::{Tag, TagCompound};
use tempfile::TempDir;

use crate::integration::{level_root, read_tag, write_document};

fn workspace() -> (TempDir, RunContext) {
    let dir = TempDir::new().unwrap();
    write_document(&dir.path().join("level.dat"), level_root());
    let config = dir.path().join("tagtree.toml");
    fs::write(&config, "[editor]\nshow_types = false\n").unwrap();
    let context = RunContext::new(dir.path().to_path_buf(), Some(config)).unwrap();
    (dir, context)
}

fn failure_report(result: Result<String, ApiError>) -> String {
    match result {
        Err(ApiError::OperationFailed(report)) => report,
        other => panic!("expected a failed batch, got {:?}", other),
    }
}

#[test]
fn test_print_with_types() {
    let (_dir, context) = workspace();
    let output = context
        .execute(&Commands::Print {
            path: "level.dat/Data/Player/Health".to_string(),
            types: true,
        })
        .unwrap();
    assert_eq!(
        output,
        "<s> Health: 20\nOperation complete.  Nodes succeeded: 1  Nodes failed: 0"
    );
}

#[test]
fn test_set_value_saves_document() {
    let (dir, context) = workspace();
    let output = context
        .execute(&Commands::SetValue {
            path: "level.dat/Data/Player/Health".to_string(),
            value: "-7".to_string(),
        })
        .unwrap();
    assert!(output.starts_with("level.dat/Data/Player/Health: OK"));

    let path = dir.path().join("level.dat");
    assert_eq!(
        read_tag(&path, &["Data", "Player", "Health"]),
        Some(Tag::Short(-7))
    );
    // Untouched entries survive the rewrite.
    assert_eq!(
        read_tag(&path, &["Data", "LevelName"]),
        Some(Tag::String("World".to_string()))
    );
}

#[test]
fn test_set_value_out_of_range_reports_error() {
    let (dir, context) = workspace();
    let report = failure_report(context.execute(&Commands::SetValue {
        path: "level.dat/Data/Player/Health".to_string(),
        value: "99999".to_string(),
    }));
    assert!(report.contains("level.dat/Data/Player/Health: ERROR (apply: Parse error"));
    assert!(report.ends_with("Nodes succeeded: 0  Nodes failed: 1"));
    assert_eq!(
        read_tag(&dir.path().join("level.dat"), &["Data", "Player", "Health"]),
        Some(Tag::Short(20))
    );
}

#[test]
fn test_set_list_replaces_elements() {
    let (dir, context) = workspace();
    context
        .execute(&Commands::SetList {
            path: "level.dat/Data/Player/Scores".to_string(),
            values: vec!["10".to_string(), "-20".to_string()],
        })
        .unwrap();
    let scores = read_tag(&dir.path().join("level.dat"), &["Data", "Player", "Scores"]).unwrap();
    let values: Vec<Tag> = scores
        .as_list()
        .unwrap()
        .iter()
        .map(|item| item.borrow().deep_copy())
        .collect();
    assert_eq!(values, vec![Tag::Int(10), Tag::Int(-20)]);
}

#[test]
fn test_set_list_with_bad_token_keeps_list() {
    let (dir, context) = workspace();
    let report = failure_report(context.execute(&Commands::SetList {
        path: "level.dat/Data/Player/Scores".to_string(),
        values: ["1", "2", "bad", "4"].iter().map(|v| v.to_string()).collect(),
    }));
    assert!(report.contains("ERROR (apply:"));

    let scores = read_tag(&dir.path().join("level.dat"), &["Data", "Player", "Scores"]).unwrap();
    assert_eq!(scores.child_count(), Some(3));
}

#[test]
fn test_invalid_command_for_node_kind() {
    let (_dir, context) = workspace();
    let report = failure_report(context.execute(&Commands::SetList {
        path: "level.dat/Data/Player/Health".to_string(),
        values: vec!["1".to_string()],
    }));
    assert_eq!(
        report,
        "level.dat/Data/Player/Health: ERROR (invalid command)\n\
         Operation complete.  Nodes succeeded: 0  Nodes failed: 1"
    );
}

#[test]
fn test_delete_entry() {
    let (dir, context) = workspace();
    context
        .execute(&Commands::Delete {
            path: "level.dat/Data/Player/Name".to_string(),
        })
        .unwrap();
    let path = dir.path().join("level.dat");
    assert_eq!(read_tag(&path, &["Data", "Player", "Name"]), None);
    assert_eq!(
        read_tag(&path, &["Data", "Player", "Health"]),
        Some(Tag::Short(20))
    );
}

#[test]
fn test_delete_document_is_invalid() {
    let (_dir, context) = workspace();
    let report = failure_report(context.execute(&Commands::Delete {
        path: "level.dat".to_string(),
    }));
    assert!(report.starts_with("level.dat: ERROR (invalid command)"));
}

#[test]
fn test_json_export() {
    let (dir, context) = workspace();
    let out = dir.path().join("player.json");
    context
        .execute(&Commands::Json {
            path: "level.dat/Data/Player".to_string(),
            out: out.clone(),
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["Health"], 20);
    assert_eq!(value["Name"], "Steve");
    assert_eq!(value["Pos"], serde_json::json!([0.5, 64.0]));
}

#[test]
fn test_print_tree_of_compound() {
    let (_dir, context) = workspace();
    let output = context
        .execute(&Commands::PrintTree {
            path: "level.dat/Data/Player/Scores".to_string(),
            types: false,
        })
        .unwrap();
    assert!(output.starts_with("Scores: 3 entries\n├─ 1\n├─ 2\n└─ 3\n"));
}

#[test]
fn test_ls_lists_children() {
    let (_dir, context) = workspace();
    let output = context
        .execute(&Commands::Ls {
            path: "level.dat/Data".to_string(),
        })
        .unwrap();
    assert!(output.starts_with("level.dat/Data\n"));
    assert!(output.contains("LevelName"));
    assert!(output.contains("Compound"));
}

#[test]
fn test_unknown_tag_path() {
    let (_dir, context) = workspace();
    let err = context
        .execute(&Commands::Print {
            path: "level.dat/Data/Nope".to_string(),
            types: false,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Edit(_)));
}

#[test]
fn test_unknown_file() {
    let (_dir, context) = workspace();
    let err = context
        .execute(&Commands::Print {
            path: "missing.dat/Data".to_string(),
            types: false,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidPath(_)));
}

#[test]
fn test_set_value_in_chunk_store() {
    let (dir, context) = workspace();
    let store_path = dir.path().join("world.chunks");
    {
        let store = SledChunkStore::open(&store_path).unwrap();
        store
            .put(
                "0.0",
                &Document::new("", TagCompound::new().with("Level", Tag::Compound(TagCompound::new().with("xPos", Tag::Int(0))))),
            )
            .unwrap();
        store.flush().unwrap();
    }

    context
        .execute(&Commands::SetValue {
            path: "world.chunks/0.0/Level/xPos".to_string(),
            value: "12".to_string(),
        })
        .unwrap();

    let store = SledChunkStore::open(&store_path).unwrap();
    let document = store.chunk("0.0").open_root().unwrap();
    let root = document.root.borrow();
    let level = root.as_compound().unwrap().get("Level").unwrap().clone();
    let level = level.borrow();
    let x = level.as_compound().unwrap().get("xPos").unwrap().borrow().deep_copy();
    assert_eq!(x, Tag::Int(12));
}

fn write_party(dir: &TempDir) {
    let player = |health: i16| Tag::Compound(TagCompound::new().with("Health", Tag::Short(health)));
    write_document(
        &dir.path().join("party.dat"),
        TagCompound::new()
            .with("Alex", player(10))
            .with("Sam", player(12))
            .with("Note", Tag::String("hi".to_string())),
    );
}

#[test]
fn test_wildcard_applies_to_every_match() {
    let (dir, context) = workspace();
    write_party(&dir);
    let output = context
        .execute(&Commands::SetValue {
            path: "party.dat/*/Health".to_string(),
            value: "5".to_string(),
        })
        .unwrap();
    assert_eq!(
        output,
        "party.dat/Alex/Health: OK\n\
         party.dat/Sam/Health: OK\n\
         Operation complete.  Nodes succeeded: 2  Nodes failed: 0"
    );

    let path = dir.path().join("party.dat");
    assert_eq!(read_tag(&path, &["Alex", "Health"]), Some(Tag::Short(5)));
    assert_eq!(read_tag(&path, &["Sam", "Health"]), Some(Tag::Short(5)));
}

#[test]
fn test_wildcard_continues_after_failures() {
    let (dir, context) = workspace();
    write_party(&dir);
    let report = failure_report(context.execute(&Commands::SetValue {
        path: "party.dat/*".to_string(),
        value: "bye".to_string(),
    }));
    assert_eq!(
        report,
        "party.dat/Alex: ERROR (invalid command)\n\
         party.dat/Sam: ERROR (invalid command)\n\
         party.dat/Note: OK\n\
         Operation complete.  Nodes succeeded: 1  Nodes failed: 2"
    );
    assert_eq!(
        read_tag(&dir.path().join("party.dat"), &["Note"]),
        Some(Tag::String("bye".to_string()))
    );
}

#[test]
fn test_double_star_matches_any_depth() {
    let (dir, context) = workspace();
    write_party(&dir);
    let output = context
        .execute(&Commands::Print {
            path: "party.dat/**/Health".to_string(),
            types: false,
        })
        .unwrap();
    assert_eq!(
        output,
        "Health: 10\nHealth: 12\nOperation complete.  Nodes succeeded: 2  Nodes failed: 0"
    );
}

#[test]
fn test_wildcard_delete_removes_each_match() {
    let (dir, context) = workspace();
    write_party(&dir);
    context
        .execute(&Commands::Delete {
            path: "party.dat/*/Health".to_string(),
        })
        .unwrap();
    let path = dir.path().join("party.dat");
    assert_eq!(read_tag(&path, &["Alex", "Health"]), None);
    assert_eq!(read_tag(&path, &["Sam", "Health"]), None);
    assert_eq!(read_tag(&path, &["Note"]), Some(Tag::String("hi".to_string())));
}

#[test]
fn test_find_lists_matching_tags() {
    let (dir, context) = workspace();
    write_party(&dir);
    let output = context
        .execute(&Commands::Find {
            path: "party.dat".to_string(),
            name: Some("Health".to_string()),
            value: None,
        })
        .unwrap();
    assert_eq!(
        output,
        "party.dat/Alex/Health: 10\nparty.dat/Sam/Health: 12\nFound 2 matching nodes."
    );
}
