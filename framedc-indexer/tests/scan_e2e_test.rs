//! End-to-end scan tests against a real temporary tree: walk, persist,
//! reopen, render.

use framedc_cache::{FileStore, HotMap, KeyedStore, MemStore};
use framedc_indexer::emit::{render, Protocol};
use framedc_indexer::{apply_outcome, scan_root, OsFs};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

fn touch(path: &Path) {
    fs::write(path, b"").expect("touch");
}

fn gwf() -> BTreeSet<String> {
    ["gwf".to_string()].into_iter().collect()
}

#[test]
fn scan_persist_reopen_render() {
    let tree = tempfile::tempdir().expect("tempdir");
    let run1 = tree.path().join("run1");
    fs::create_dir(&run1).expect("mkdir");
    touch(&run1.join("H-R-1000-16.gwf"));
    touch(&run1.join("H-R-1016-16.gwf"));
    touch(&run1.join("H-R-1064-16.gwf"));
    touch(&run1.join("ignore.txt"));

    let cache = tempfile::tempdir().expect("cache dir");
    let store_path = cache.path().join("ns.shlv");

    let mut hot = HotMap::new();
    let outcome = scan_root(&OsFs, tree.path(), &hot);
    assert_eq!(outcome.errors, 0);
    assert_eq!(outcome.fragments.len(), 1);

    let mut store = FileStore::open(&store_path).expect("open store");
    apply_outcome(&mut store, &outcome).expect("apply");
    hot.extend(outcome.hot);
    store.close(0o644).expect("close");

    // A concurrent-reader view: reopen the published image and render.
    let store = FileStore::open(&store_path).expect("reopen");
    assert_eq!(store.len(), 1);

    let out = render(&store, &hot, Protocol::Ldas, &gwf()).expect("render");
    let text = String::from_utf8(out).expect("utf8");
    let run1_key = run1.to_string_lossy();
    let mtime = hot.get(run1_key.as_ref()).expect("hot entry for run1");
    assert_eq!(
        text,
        format!("{run1_key},H,R,1,16 {mtime} 3 {{1000 1032 1064 1080}}\n")
    );
}

#[test]
fn unchanged_tree_rescans_to_nothing() {
    let tree = tempfile::tempdir().expect("tempdir");
    let leaf = tree.path().join("leaf");
    fs::create_dir(&leaf).expect("mkdir");
    touch(&leaf.join("H-R-1000-16.gwf"));

    let mut hot = HotMap::new();
    let first = scan_root(&OsFs, tree.path(), &hot);
    assert_eq!(first.fragments.len(), 1);
    hot.extend(first.hot);

    // Nothing changed: the leaf is hot, so the second pass produces no
    // fragments and records nothing new.
    let second = scan_root(&OsFs, tree.path(), &hot);
    assert!(second.fragments.is_empty());
    assert!(second.hot.is_empty());
    assert_eq!(second.errors, 0);
}

#[test]
fn new_file_reopens_only_its_directory() {
    let tree = tempfile::tempdir().expect("tempdir");
    let a = tree.path().join("a");
    let b = tree.path().join("b");
    fs::create_dir(&a).expect("mkdir a");
    fs::create_dir(&b).expect("mkdir b");
    touch(&a.join("H-R-1000-16.gwf"));
    touch(&b.join("L-R-1000-16.gwf"));

    let mut hot = HotMap::new();
    let first = scan_root(&OsFs, tree.path(), &hot);
    assert_eq!(first.fragments.len(), 2);
    hot.extend(first.hot);

    // Drop a new frame into `a` and force its mtime past the recorded
    // watermark (filesystem mtime granularity can swallow sub-second
    // touches).
    touch(&a.join("H-R-1016-16.gwf"));
    let a_key = a.to_string_lossy().into_owned();
    if let Some(entry) = hot.get_mut(&a_key) {
        *entry -= 10;
    }

    let second = scan_root(&OsFs, tree.path(), &hot);
    assert!(second.fragments.contains_key(&a_key), "a must be rescanned");
    assert_eq!(second.fragments.len(), 1, "b must stay pruned");
}

#[test]
fn empty_root_records_itself_hot() {
    let tree = tempfile::tempdir().expect("tempdir");

    let hot = HotMap::new();
    let outcome = scan_root(&OsFs, tree.path(), &hot);
    assert!(outcome.fragments.is_empty());
    let key = tree.path().to_string_lossy().into_owned();
    assert!(outcome.hot.contains_key(&key));

    // And with the record in place the next pass skips it entirely.
    let mut hot = HotMap::new();
    hot.extend(outcome.hot);
    let second = scan_root(&OsFs, tree.path(), &hot);
    assert!(second.hot.is_empty());
}

#[test]
fn worker_store_and_master_store_agree() {
    let tree = tempfile::tempdir().expect("tempdir");
    touch(&tree.path().join("H-R-1000-16.gwf"));

    let outcome = scan_root(&OsFs, tree.path(), &HotMap::new());

    let cache = tempfile::tempdir().expect("cache dir");
    let mut file_store = FileStore::open(&cache.path().join("ns.shlv")).expect("open");
    let mut mem_store = MemStore::new();
    apply_outcome(&mut file_store, &outcome).expect("apply file");
    apply_outcome(&mut mem_store, &outcome).expect("apply mem");

    let key = tree.path().to_string_lossy();
    assert_eq!(file_store.get(&key), mem_store.get(&key));
}
