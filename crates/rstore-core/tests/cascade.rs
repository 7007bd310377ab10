//! Version cascade scenarios, run against both backend pairs.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use rstore_blob::{BlobListing, BlobResult};
use rstore_core::{
    BlobStore, FileVersionStore, FolderItem, FsBlobStore, InMemoryBlobStore,
    InMemoryVersionStore, StorageCoordinator, StorageError, StoragePath, VersionStore,
    FOLDER_CONTEXT,
};

fn p(raw: &str) -> StoragePath {
    StoragePath::parse(raw).unwrap()
}

/// A coordinator plus whatever keeps its backing storage alive.
struct Fixture {
    storage: StorageCoordinator,
    _dir: Option<tempfile::TempDir>,
}

fn in_memory() -> Fixture {
    Fixture {
        storage: StorageCoordinator::in_memory(),
        _dir: None,
    }
}

fn on_disk() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let blobs = FsBlobStore::open(dir.path().join("data")).unwrap();
    let versions = FileVersionStore::open(dir.path().join("versions.json")).unwrap();
    Fixture {
        storage: StorageCoordinator::new(Arc::new(blobs), Arc::new(versions)),
        _dir: Some(dir),
    }
}

fn each_backend(check: impl Fn(&StorageCoordinator)) {
    for fixture in [in_memory(), on_disk()] {
        check(&fixture.storage);
    }
}

#[test]
fn put_document() {
    each_backend(|r| {
        let doc = p("/admin/messages/foo/hello.txt");
        r.put_document(&doc, "text/plain", b"Hello World!").unwrap();

        let read = r.get_document(&doc).unwrap();
        assert_eq!(read.content, b"Hello World!");
        assert_eq!(read.content_type, "text/plain");
        assert_eq!(read.version, 1);
        assert_eq!(r.version(&doc).unwrap(), Some(1));
    });
}

#[test]
fn update_increments_version() {
    each_backend(|r| {
        let doc = p("/admin/messages/a.json");
        for expected in 1..=5 {
            let v = r
                .put_document(&doc, "application/json", format!("{expected}").as_bytes())
                .unwrap();
            assert_eq!(v, expected);
        }
        let read = r.get_document(&doc).unwrap();
        assert_eq!(read.content, b"5");
        assert_eq!(read.version, 5);
    });
}

#[test]
fn content_type_follows_latest_put() {
    each_backend(|r| {
        let doc = p("/admin/messages/a");
        r.put_document(&doc, "text/plain", b"x").unwrap();
        r.put_document(&doc, "application/json", b"{}").unwrap();
        assert_eq!(r.get_document(&doc).unwrap().content_type, "application/json");
    });
}

#[test]
fn put_multiple_documents() {
    each_backend(|r| {
        let hello = p("/admin/messages/foo/hello.txt");
        let bar = p("/admin/messages/foo/bar.txt");
        r.put_document(&hello, "text/plain", b"Hello World!").unwrap();
        r.put_document(&bar, "text/plain", b"Hello Foo!").unwrap();

        assert_eq!(r.get_document(&hello).unwrap().content, b"Hello World!");
        assert_eq!(r.version(&hello).unwrap(), Some(1));
        assert_eq!(r.get_document(&bar).unwrap().content, b"Hello Foo!");
        assert_eq!(r.version(&bar).unwrap(), Some(1));
        // every versioned ancestor saw two writes
        assert_eq!(r.version(&p("/admin/messages/foo/")).unwrap(), Some(2));
        assert_eq!(r.version(&p("/admin/messages/")).unwrap(), Some(2));
        assert_eq!(r.version(&p("/admin/")).unwrap(), None);
    });
}

#[test]
fn folder_version_counts_writes_in_subtree() {
    each_backend(|r| {
        r.put_document(&p("/admin/m/a/x"), "text/plain", b"1").unwrap();
        r.put_document(&p("/admin/m/a/b/y"), "text/plain", b"2").unwrap();
        r.put_document(&p("/admin/m/a/b/c/z"), "text/plain", b"3").unwrap();
        r.put_document(&p("/admin/m/a/x"), "text/plain", b"4").unwrap();

        assert_eq!(r.version(&p("/admin/m/")).unwrap(), Some(4));
        assert_eq!(r.version(&p("/admin/m/a/")).unwrap(), Some(4));
        assert_eq!(r.version(&p("/admin/m/a/b/")).unwrap(), Some(2));
        assert_eq!(r.version(&p("/admin/m/a/b/c/")).unwrap(), Some(1));
    });
}

#[test]
fn delete_document() {
    each_backend(|r| {
        let doc = p("/admin/messages/foo/baz.txt");
        r.put_document(&doc, "text/plain", b"Hello World!").unwrap();

        let removed = r.delete_document(&doc).unwrap();
        assert_eq!(
            removed,
            vec![doc.clone(), p("/admin/messages/foo/"), p("/admin/messages/")]
        );
        assert_eq!(r.version(&doc).unwrap(), None);
        assert!(matches!(
            r.get_document(&doc),
            Err(StorageError::DocumentNotFound(_))
        ));
        // the emptied folders are gone as well
        assert_eq!(r.version(&p("/admin/messages/foo/")).unwrap(), None);
        assert_eq!(r.version(&p("/admin/messages/")).unwrap(), None);
    });
}

#[test]
fn delete_multiple_documents() {
    each_backend(|r| {
        let baz = p("/admin/messages/foo/baz.txt");
        let bar = p("/admin/messages/foo/bar.txt");
        r.put_document(&baz, "text/plain", b"Hello Baz!").unwrap();
        r.put_document(&bar, "text/plain", b"Hello Bar!").unwrap();

        let removed = r.delete_document(&baz).unwrap();
        assert_eq!(removed, vec![baz.clone()]);
        assert_eq!(r.version(&baz).unwrap(), None);
        assert_eq!(r.version(&bar).unwrap(), Some(1));
        assert_eq!(r.version(&p("/admin/messages/foo/")).unwrap(), Some(3));
        assert_eq!(r.version(&p("/admin/messages/")).unwrap(), Some(3));
    });
}

#[test]
fn delete_clears_up_to_first_non_empty_ancestor() {
    each_backend(|r| {
        r.put_document(&p("/admin/m/keep.txt"), "text/plain", b"k").unwrap();
        r.put_document(&p("/admin/m/a/b/deep.txt"), "text/plain", b"d").unwrap();

        let removed = r.delete_document(&p("/admin/m/a/b/deep.txt")).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(r.version(&p("/admin/m/a/b/")).unwrap(), None);
        assert_eq!(r.version(&p("/admin/m/a/")).unwrap(), None);
        assert_eq!(r.version(&p("/admin/m/")).unwrap(), Some(3));
        assert_eq!(r.version(&p("/admin/m/keep.txt")).unwrap(), Some(1));
    });
}

#[test]
fn delete_missing_document() {
    each_backend(|r| {
        let err = r.delete_document(&p("/admin/messages/none.txt")).unwrap_err();
        assert!(matches!(err, StorageError::DocumentNotFound(_)));
    });
}

#[test]
fn recreate_after_delete_starts_over() {
    each_backend(|r| {
        let doc = p("/admin/messages/foo/a.txt");
        r.put_document(&doc, "text/plain", b"1").unwrap();
        r.put_document(&doc, "text/plain", b"2").unwrap();
        r.delete_document(&doc).unwrap();
        assert_eq!(r.put_document(&doc, "text/plain", b"3").unwrap(), 1);
        assert_eq!(r.version(&p("/admin/messages/foo/")).unwrap(), Some(1));
    });
}

#[test]
fn get_folder() {
    each_backend(|r| {
        let baz = p("/admin/messages/foo/baz.txt");
        let bar = p("/admin/messages/foo/bar.txt");
        let folder = p("/admin/messages/foo/");
        r.put_document(&baz, "text/plain", b"Hello Baz!").unwrap();
        r.put_document(&bar, "text/plain", b"Hello Bar!").unwrap();
        r.put_document(&bar, "text/plain", b"Hello Updated Bar!").unwrap();

        let listing = r.folder(&folder).unwrap();
        assert_eq!(listing.context, FOLDER_CONTEXT);
        assert_eq!(listing.items.len(), 2);
        assert_eq!(
            listing.items["bar.txt"],
            FolderItem::document(2, "text/plain".into(), 18)
        );
        assert_eq!(
            listing.items["baz.txt"],
            FolderItem::document(1, "text/plain".into(), 10)
        );
        assert_eq!(listing.version, Some(3));
        assert_eq!(r.version(&folder).unwrap(), Some(3));
    });
}

#[test]
fn get_folder_with_folder() {
    each_backend(|r| {
        let baz = p("/admin/messages/foo/baz.txt");
        let bar = p("/admin/messages/foo/foobar/bar.txt");
        let folder = p("/admin/messages/foo/");
        r.put_document(&baz, "text/plain", b"Hello Baz!").unwrap();
        r.put_document(&bar, "text/plain", b"Hello Bar!").unwrap();
        r.put_document(&bar, "text/plain", b"Hello Updated Bar!").unwrap();

        let json = serde_json::to_value(r.folder(&folder).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "@context": "http://remotestorage.io/spec/folder-description",
                "items": {
                    "foobar/": { "ETag": "2" },
                    "baz.txt": {
                        "ETag": "1",
                        "Content-Type": "text/plain",
                        "Content-Length": 10
                    }
                }
            })
        );
        assert_eq!(r.version(&folder).unwrap(), Some(3));
    });
}

#[test]
fn get_folder_after_delete() {
    each_backend(|r| {
        r.put_document(&p("/admin/messages/foo/hello.txt"), "text/plain", b"Hello World!")
            .unwrap();
        r.put_document(&p("/admin/messages/foo/bar.txt"), "text/plain", b"Hello Foo!")
            .unwrap();
        assert_eq!(r.version(&p("/admin/messages/foo/")).unwrap(), Some(2));

        r.delete_document(&p("/admin/messages/foo/hello.txt")).unwrap();
        assert_eq!(r.version(&p("/admin/messages/foo/hello.txt")).unwrap(), None);
        assert_eq!(r.version(&p("/admin/messages/foo/bar.txt")).unwrap(), Some(1));
        assert_eq!(r.version(&p("/admin/messages/foo/")).unwrap(), Some(3));

        let listing = r.folder(&p("/admin/messages/foo/")).unwrap();
        assert_eq!(listing.items.len(), 1);
        assert_eq!(
            listing.items["bar.txt"],
            FolderItem::document(1, "text/plain".into(), 10)
        );
    });
}

#[test]
fn never_written_folder_is_empty() {
    each_backend(|r| {
        let listing = r.folder(&p("/admin/foo/bar/")).unwrap();
        assert!(listing.is_empty());
        assert_eq!(listing.version, None);
        assert_eq!(
            serde_json::to_value(&listing).unwrap(),
            serde_json::json!({
                "@context": "http://remotestorage.io/spec/folder-description",
                "items": {}
            })
        );
    });
}

#[test]
fn disjoint_users_do_not_interact() {
    each_backend(|r| {
        r.put_document(&p("/alice/notes/a"), "text/plain", b"a").unwrap();
        r.put_document(&p("/bob/notes/a"), "text/plain", b"b").unwrap();
        r.delete_document(&p("/bob/notes/a")).unwrap();

        assert_eq!(r.version(&p("/alice/notes/")).unwrap(), Some(1));
        assert_eq!(r.get_document(&p("/alice/notes/a")).unwrap().content, b"a");
    });
}

#[test]
fn documents_with_any_name_are_listed() {
    each_backend(|r| {
        let doc = p("/admin/m/.rstore-tmp-notes");
        r.put_document(&doc, "text/plain", b"notes").unwrap();

        let listing = r.folder(&p("/admin/m/")).unwrap();
        assert_eq!(
            listing.items[".rstore-tmp-notes"],
            FolderItem::document(1, "text/plain".into(), 5)
        );
        assert_eq!(listing.version, Some(1));

        r.delete_document(&doc).unwrap();
        assert_eq!(r.version(&p("/admin/m/")).unwrap(), None);
    });
}

#[test]
fn interrupted_write_does_not_keep_folder_alive() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        StorageCoordinator::new(
            Arc::new(FsBlobStore::open(dir.path().join("data")).unwrap()),
            Arc::new(FileVersionStore::open(dir.path().join("versions.json")).unwrap()),
        )
    };

    let doc = p("/admin/m/f/a.txt");
    open().put_document(&doc, "text/plain", b"a").unwrap();
    std::fs::write(dir.path().join("data/.staging/left-over"), b"half").unwrap();

    let removed = open().delete_document(&doc).unwrap();
    assert_eq!(removed.len(), 3);
    let reopened = open();
    assert_eq!(reopened.version(&p("/admin/m/f/")).unwrap(), None);
    assert_eq!(reopened.version(&p("/admin/m/")).unwrap(), None);
}

#[test]
fn concurrent_writers_share_ancestor_versions() {
    let fixture = on_disk();
    let storage = Arc::new(fixture.storage);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let storage = Arc::clone(&storage);
            thread::spawn(move || {
                for i in 0..10 {
                    let doc = p(&format!("/admin/messages/shared/t{t}-{i}.txt"));
                    storage.put_document(&doc, "text/plain", b"x").unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("writer thread should not panic");
    }

    assert_eq!(storage.version(&p("/admin/messages/shared/")).unwrap(), Some(40));
    assert_eq!(storage.version(&p("/admin/messages/")).unwrap(), Some(40));
    assert_eq!(storage.folder(&p("/admin/messages/shared/")).unwrap().items.len(), 40);
}

#[test]
fn on_disk_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        StorageCoordinator::new(
            Arc::new(FsBlobStore::open(dir.path().join("data")).unwrap()),
            Arc::new(FileVersionStore::open(dir.path().join("versions.json")).unwrap()),
        )
    };

    open()
        .put_document(&p("/admin/messages/a.txt"), "text/plain", b"persisted")
        .unwrap();

    let reopened = open();
    let doc = reopened.get_document(&p("/admin/messages/a.txt")).unwrap();
    assert_eq!(doc.content, b"persisted");
    assert_eq!(doc.version, 1);
    assert_eq!(reopened.version(&p("/admin/messages/")).unwrap(), Some(1));
}

/// Blob store that stops every delete after the blob is gone and before
/// the caller gets to apply its version cascade.
struct PausedDelete<B> {
    inner: B,
    deleted: Barrier,
    resume: Barrier,
}

impl<B> PausedDelete<B> {
    fn new(inner: B) -> Self {
        Self {
            inner,
            deleted: Barrier::new(2),
            resume: Barrier::new(2),
        }
    }
}

impl<B: BlobStore> BlobStore for PausedDelete<B> {
    fn get(&self, path: &StoragePath) -> BlobResult<Vec<u8>> {
        self.inner.get(path)
    }

    fn put(&self, path: &StoragePath, content: &[u8]) -> BlobResult<()> {
        self.inner.put(path, content)
    }

    fn delete(&self, path: &StoragePath) -> BlobResult<Vec<StoragePath>> {
        let removed = self.inner.delete(path)?;
        self.deleted.wait();
        self.resume.wait();
        Ok(removed)
    }

    fn list(&self, folder: &StoragePath) -> BlobResult<BlobListing> {
        self.inner.list(folder)
    }

    fn size(&self, path: &StoragePath) -> BlobResult<Option<u64>> {
        self.inner.size(path)
    }
}

fn put_during_pruning_delete<B: BlobStore + 'static>(blobs: B, versions: Arc<dyn VersionStore>) {
    let blobs = Arc::new(PausedDelete::new(blobs));
    let storage = Arc::new(StorageCoordinator::new(blobs.clone(), versions));
    storage
        .put_document(&p("/admin/m/f/b.txt"), "text/plain", b"b")
        .unwrap();

    let deleter = {
        let storage = Arc::clone(&storage);
        thread::spawn(move || storage.delete_document(&p("/admin/m/f/b.txt")))
    };
    blobs.deleted.wait();

    // f/ and m/ are gone on disk but their versions are not cleared yet.
    let writer = {
        let storage = Arc::clone(&storage);
        thread::spawn(move || storage.put_document(&p("/admin/m/f/a.txt"), "text/plain", b"a"))
    };
    thread::sleep(Duration::from_millis(50));
    blobs.resume.wait();

    let removed = deleter.join().expect("delete thread should not panic").unwrap();
    assert_eq!(removed.len(), 3);
    assert_eq!(writer.join().expect("put thread should not panic").unwrap(), 1);

    assert_eq!(storage.version(&p("/admin/m/f/")).unwrap(), Some(1));
    assert_eq!(storage.version(&p("/admin/m/")).unwrap(), Some(1));
    let listing = storage.folder(&p("/admin/m/")).unwrap();
    assert_eq!(listing.items["f/"], FolderItem::folder(1));
    assert_eq!(storage.get_document(&p("/admin/m/f/a.txt")).unwrap().content, b"a");
}

#[test]
fn put_waits_for_delete_pruning_its_folder() {
    put_during_pruning_delete(InMemoryBlobStore::new(), Arc::new(InMemoryVersionStore::new()));

    let dir = tempfile::tempdir().unwrap();
    put_during_pruning_delete(
        FsBlobStore::open(dir.path().join("data")).unwrap(),
        Arc::new(FileVersionStore::open(dir.path().join("versions.json")).unwrap()),
    );
}

#[test]
fn other_users_are_not_blocked_by_a_pending_delete() {
    let blobs = Arc::new(PausedDelete::new(InMemoryBlobStore::new()));
    let storage = Arc::new(StorageCoordinator::new(
        blobs.clone(),
        Arc::new(InMemoryVersionStore::new()),
    ));
    storage
        .put_document(&p("/alice/m/a.txt"), "text/plain", b"a")
        .unwrap();

    let deleter = {
        let storage = Arc::clone(&storage);
        thread::spawn(move || storage.delete_document(&p("/alice/m/a.txt")))
    };
    blobs.deleted.wait();

    storage
        .put_document(&p("/bob/m/b.txt"), "text/plain", b"b")
        .unwrap();
    assert_eq!(storage.version(&p("/bob/m/")).unwrap(), Some(1));

    blobs.resume.wait();
    deleter.join().expect("delete thread should not panic").unwrap();
    assert_eq!(storage.version(&p("/alice/m/")).unwrap(), None);
}
