//! Storage backends driven through the tree: files, sled chunk stores, directories

use std::fs;
use std::rc::Rc;
use tagtree::clipboard::Clipboard;
use tagtree::editor::FixedText;
use tagtree::error::{EditError, StorageError};
use tagtree::node::{NodeData, TagTree};
use tagtree::store::{Document, FileStore, MemoryStore, SledChunkStore, StorageBackend};
use tagtree::tag::{BinaryCodec, Tag, TagCodec, TagCompound};
use tempfile::TempDir;

use crate::integration::{level_root, read_tag, write_document};

fn tree() -> TagTree {
    TagTree::new(Rc::new(Clipboard::new()))
}

#[test]
fn test_file_round_trip_keeps_root_name() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("named.dat");
    FileStore::new(&path)
        .save(&Document::new("Level", level_root()))
        .unwrap();

    let mut tree = tree();
    let doc = tree.open_path(&path).unwrap();
    tree.expand(doc).unwrap();
    assert_eq!(tree.display(doc), "named.dat [Level: 1 entry]");

    tree.rename_node(doc, "Renamed").unwrap();
    tree.save(doc).unwrap();
    let reopened = FileStore::new(&path).open_root().unwrap();
    assert_eq!(reopened.name, "Renamed");
}

#[test]
fn test_save_from_tag_node_persists_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("level.dat");
    write_document(&path, level_root());

    let mut tree = tree();
    let doc = tree.open_path(&path).unwrap();
    let health = tree.resolve(doc, "Data/Player/Health").unwrap();
    tree.edit_node(health, &mut FixedText::new("5")).unwrap();

    assert_eq!(tree.save(health).unwrap(), 1);
    let root = tree.root();
    assert_eq!(tree.save(root).unwrap(), 0);
    assert_eq!(
        read_tag(&path, &["Data", "Player", "Health"]),
        Some(Tag::Short(5))
    );
}

#[test]
fn test_non_compound_root_rejected() {
    let bytes = BinaryCodec.encode("", &Tag::Int(5)).unwrap();
    let mut tree = tree();
    let doc = tree.open_document("odd.dat", Box::new(MemoryStore::from_bytes("odd", bytes)));
    assert!(matches!(
        tree.expand(doc),
        Err(EditError::Storage(StorageError::RootNotCompound(_)))
    ));
    assert!(!tree.is_expanded(doc));
}

#[test]
fn test_memory_store_counts_saves() {
    let store = Rc::new(MemoryStore::new("", level_root()).unwrap());

    struct Shared(Rc<MemoryStore>);
    impl StorageBackend for Shared {
        fn open_root(&self) -> Result<Document, StorageError> {
            self.0.open_root()
        }
        fn save(&self, document: &Document) -> Result<(), StorageError> {
            self.0.save(document)
        }
        fn describe(&self) -> String {
            self.0.describe()
        }
    }

    let mut tree = tree();
    let doc = tree.open_document("level.dat", Box::new(Shared(Rc::clone(&store))));
    let health = tree.resolve(doc, "Data/Player/Health").unwrap();
    tree.edit_node(health, &mut FixedText::new("1")).unwrap();

    let root = tree.root();
    tree.save(root).unwrap();
    tree.save(root).unwrap();
    assert_eq!(store.save_count(), 1);
}

#[test]
fn test_directory_lists_documents_and_stores() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("region")).unwrap();
    write_document(&dir.path().join("level.dat"), level_root());
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    {
        let store = SledChunkStore::open(dir.path().join("world.chunks")).unwrap();
        store
            .put("0.0", &Document::new("", TagCompound::new().with("y", Tag::Int(0))))
            .unwrap();
        store.flush().unwrap();
    }

    let mut tree = tree();
    let top = tree.open_directory(dir.path());
    assert_eq!(tree.expand(top).unwrap(), 3);
    let names: Vec<String> = tree
        .children(top)
        .unwrap()
        .iter()
        .map(|child| tree.path_name(*child))
        .collect();
    assert_eq!(names, vec!["region", "level.dat", "world.chunks"]);

    let chunk = tree.resolve(top, "world.chunks/0.0").unwrap();
    assert!(matches!(
        tree.node(chunk).map(|node| node.data()),
        Some(NodeData::Document(_))
    ));
    assert_eq!(tree.kind_marker(chunk), "r");
    let y = tree.resolve(chunk, "y").unwrap();
    assert_eq!(tree.display(y), "y: 0");
}

#[test]
fn test_chunk_store_refresh_keeps_handle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("world.chunks");
    {
        let store = SledChunkStore::open(&path).unwrap();
        store
            .put("1.1", &Document::new("", TagCompound::new().with("x", Tag::Int(1))))
            .unwrap();
        store.flush().unwrap();
    }

    let mut tree = tree();
    let top = tree.open_chunk_store(&path);
    let x = tree.resolve(top, "1.1/x").unwrap();
    tree.edit_node(x, &mut FixedText::new("9")).unwrap();
    assert_eq!(tree.save(top).unwrap(), 1);

    assert!(tree.refresh(top).unwrap());
    let x = tree.resolve(top, "1.1/x").unwrap();
    assert_eq!(tree.display(x), "x: 9");
}
