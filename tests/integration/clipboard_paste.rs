//! Clipboard behaviour across documents sharing one clipboard

use std::rc::Rc;
use tagtree::clipboard::{Clipboard, CLIPBOARD_ROOT_KEY};
use tagtree::error::EditError;
use tagtree::node::TagTree;
use tagtree::store::MemoryStore;
use tagtree::tag::{same_tag, BinaryCodec, Tag, TagCodec, TagCompound, TagList};

use crate::integration::level_root;

fn two_documents() -> (TagTree, tagtree::node::NodeId, tagtree::node::NodeId) {
    let mut tree = TagTree::new(Rc::new(Clipboard::new()));
    let level = tree.open_document("level.dat", Box::new(MemoryStore::new("", level_root()).unwrap()));
    let shorts = TagCompound::new().with(
        "Values",
        Tag::List(TagList::from_tags(vec![Tag::Short(1)]).unwrap()),
    );
    let other = tree.open_document("other.dat", Box::new(MemoryStore::new("", shorts).unwrap()));
    (tree, level, other)
}

#[test]
fn test_copy_between_documents_is_deep() {
    let (mut tree, level, other) = two_documents();
    let health = tree.resolve(level, "Data/Player/Health").unwrap();
    tree.copy_node(health).unwrap();

    let values = tree.resolve(other, "Values").unwrap();
    tree.expand(values).unwrap();
    assert!(tree.can_paste_into(values));
    let pasted = tree.paste_node(values).unwrap().unwrap();

    let original = tree.tag(health).unwrap();
    let copy = tree.tag(pasted).unwrap();
    assert_eq!(*copy.borrow(), Tag::Short(20));
    assert!(!same_tag(&original, &copy));

    // Editing the copy leaves the original alone.
    tree.set_tag(pasted, Tag::Short(5)).unwrap();
    assert_eq!(*original.borrow(), Tag::Short(20));
    assert!(tree.is_modified(other));
    assert!(!tree.is_modified(level));
}

#[test]
fn test_paste_compound_into_document_root() {
    let (mut tree, level, other) = two_documents();
    let player = tree.resolve(level, "Data/Player").unwrap();
    tree.copy_node(player).unwrap();
    tree.paste_node(other).unwrap();

    let pasted = tree.resolve(other, "Player/Name").unwrap();
    assert_eq!(tree.display(pasted), "Name: Steve");
}

#[test]
fn test_string_into_int_list_rejected() {
    let (mut tree, level, _) = two_documents();
    let name = tree.resolve(level, "Data/Player/Name").unwrap();
    tree.copy_node(name).unwrap();

    let scores = tree.resolve(level, "Data/Player/Scores").unwrap();
    assert!(!tree.can_paste_into(scores));
    assert!(matches!(tree.paste_node(scores), Err(EditError::TypeMismatch(_))));
    assert_eq!(tree.tag(scores).unwrap().borrow().child_count(), Some(3));
}

#[test]
fn test_empty_and_malformed_clipboard() {
    let (mut tree, level, _) = two_documents();
    let data = tree.resolve(level, "Data").unwrap();
    assert!(matches!(tree.paste_node(data), Err(EditError::NotFound(_))));

    // A buffer whose compound lacks the root key
    let stray = BinaryCodec
        .encode("", &Tag::Compound(TagCompound::new().with("other", Tag::Int(1))))
        .unwrap();
    tree.clipboard().set_raw(stray);
    assert!(matches!(tree.paste_node(data), Err(EditError::NotFound(_))));

    tree.clipboard().set_raw(vec![0x0a, 0x00]);
    assert!(tree.paste_node(data).is_err());
}

#[test]
fn test_clipboard_buffer_layout() {
    let clipboard = Clipboard::new();
    clipboard.copy("Health", &Tag::Short(20)).unwrap();
    assert_eq!(clipboard.peek_kind(), Some(tagtree::tag::TagKind::Short));

    let entry = clipboard.paste().unwrap();
    assert_eq!(entry.name, "Health");
    assert_eq!(entry.tag, Tag::Short(20));
    assert_eq!(CLIPBOARD_ROOT_KEY, "root");
}
