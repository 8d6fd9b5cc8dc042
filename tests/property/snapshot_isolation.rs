//! Snapshots keep observing the contents they were taken over

use proptest::collection::vec;
use proptest::prelude::*;
use tagtree::snapshot::SnapshotList;

#[derive(Debug, Clone)]
enum Edit {
    Push(u32),
    Insert(usize, u32),
    Remove(usize),
    Clear,
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        any::<u32>().prop_map(Edit::Push),
        (any::<usize>(), any::<u32>()).prop_map(|(at, v)| Edit::Insert(at, v)),
        any::<usize>().prop_map(Edit::Remove),
        Just(Edit::Clear),
    ]
}

fn apply(list: &mut SnapshotList<u32>, model: &mut Vec<u32>, edit: &Edit) {
    match edit {
        Edit::Push(v) => {
            list.push(*v);
            model.push(*v);
        }
        Edit::Insert(at, v) => {
            let at = at % (model.len() + 1);
            list.insert(at, *v);
            model.insert(at, *v);
        }
        Edit::Remove(at) => {
            if !model.is_empty() {
                let at = at % model.len();
                list.remove_at(at);
                model.remove(at);
            }
        }
        Edit::Clear => {
            list.clear();
            model.clear();
        }
    }
}

/// A snapshot taken before any edits still reports the original contents
#[test]
fn test_snapshot_isolation_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(vec(any::<u32>(), 0..16), vec(edit(), 0..24)), |(initial, edits)| {
            let mut list = SnapshotList::from(initial.clone());
            let mut model = initial.clone();

            let before = list.snapshot();
            let mut midway = None;
            for (step, edit) in edits.iter().enumerate() {
                if step == edits.len() / 2 {
                    midway = Some((list.snapshot(), model.clone()));
                }
                apply(&mut list, &mut model, edit);
            }

            prop_assert_eq!(&*before, initial.as_slice());
            if let Some((snapshot, expected)) = &midway {
                prop_assert_eq!(&**snapshot, expected.as_slice());
            }
            prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), model);

            drop(midway);
            drop(before);
            prop_assert_eq!(list.active_snapshots(), 0);
            Ok(())
        })
        .unwrap();
}
