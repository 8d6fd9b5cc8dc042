//! End-to-end editing through TagTree: create, rename, move, save and refresh

use std::rc::Rc;
use tagtree::clipboard::Clipboard;
use tagtree::editor::FixedText;
use tagtree::error::EditError;
use tagtree::node::{NodeId, TagTree};
use tagtree::store::FileStore;
use tagtree::tag::{Tag, TagKind};
use tempfile::TempDir;

use crate::integration::{level_root, read_tag, write_document};

fn open_level() -> (TempDir, TagTree, NodeId) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("level.dat");
    write_document(&path, level_root());
    let mut tree = TagTree::new(Rc::new(Clipboard::new()));
    let doc = tree.open_document("level.dat", Box::new(FileStore::new(&path)));
    (dir, tree, doc)
}

#[test]
fn test_create_rename_and_save() {
    let (dir, mut tree, doc) = open_level();
    let player = tree.resolve(doc, "Data/Player").unwrap();

    tree.create_node(player, TagKind::Int, Some("Level")).unwrap();
    let level = tree.resolve(player, "Level").unwrap();
    tree.edit_node(level, &mut FixedText::new("30")).unwrap();
    tree.rename_node(level, "XpLevel").unwrap();

    let root = tree.root();
    assert_eq!(tree.save(root).unwrap(), 1);
    assert!(!tree.is_modified(doc));

    let path = dir.path().join("level.dat");
    assert_eq!(
        read_tag(&path, &["Data", "Player", "XpLevel"]),
        Some(Tag::Int(30))
    );
    assert_eq!(read_tag(&path, &["Data", "Player", "Level"]), None);
}

#[test]
fn test_move_and_save_order() {
    let (dir, mut tree, doc) = open_level();
    let last = tree.resolve(doc, "Data/Player/Scores/2").unwrap();
    assert!(tree.can_move(last, -2));
    tree.move_node(last, -2).unwrap();
    tree.save(doc).unwrap();

    let scores = read_tag(&dir.path().join("level.dat"), &["Data", "Player", "Scores"]).unwrap();
    let order: Vec<Tag> = scores
        .as_list()
        .unwrap()
        .iter()
        .map(|item| item.borrow().deep_copy())
        .collect();
    assert_eq!(order, vec![Tag::Int(3), Tag::Int(1), Tag::Int(2)]);
}

#[test]
fn test_refresh_discards_nothing_after_save() {
    let (_dir, mut tree, doc) = open_level();
    let health = tree.resolve(doc, "Data/Player/Health").unwrap();
    tree.edit_node(health, &mut FixedText::new("3")).unwrap();
    assert!(matches!(tree.refresh(doc), Err(EditError::CapabilityDenied(_))));

    tree.save(doc).unwrap();
    assert!(tree.refresh(doc).unwrap());
    let health = tree.resolve(doc, "Data/Player/Health").unwrap();
    assert_eq!(tree.display(health), "Health: 3");
}

#[test]
fn test_collapse_keeps_modified_children() {
    let (_dir, mut tree, doc) = open_level();
    let player = tree.resolve(doc, "Data/Player").unwrap();
    tree.expand(player).unwrap();
    let name = tree.resolve(player, "Name").unwrap();
    tree.edit_node(name, &mut FixedText::new("Alex")).unwrap();

    assert!(!tree.collapse(player).unwrap());
    assert!(tree.is_expanded(player));
    tree.save(doc).unwrap();
    assert!(tree.collapse(player).unwrap());
    assert!(!tree.is_expanded(player));
    assert!(tree.has_children(player));
}

#[test]
fn test_cut_and_paste_moves_entry() {
    let (_dir, mut tree, doc) = open_level();
    let name = tree.resolve(doc, "Data/Player/Name").unwrap();
    tree.cut_node(name).unwrap();
    let data = tree.resolve(doc, "Data").unwrap();
    tree.paste_node(data).unwrap();

    assert!(tree.resolve(doc, "Data/Player/Name").is_err());
    let moved = tree.resolve(doc, "Data/Name").unwrap();
    assert_eq!(tree.display(moved), "Name: Steve");
}

#[test]
fn test_list_element_paths_follow_index() {
    let (_dir, mut tree, doc) = open_level();
    let first = tree.resolve(doc, "Data/Player/Pos/0").unwrap();
    assert_eq!(tree.path(first), "level.dat/Data/Player/Pos/0");
    assert_eq!(tree.name(first), None);
    assert!(!tree.capabilities(first).rename);
    assert!(tree.capabilities(first).reorder);
}
