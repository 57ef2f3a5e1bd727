//! Domain operations over a [`RecordStore`].
//!
//! Validates new items, fills defaults, and turns a missing row into
//! [`ItemsError::InvalidItemId`]. State transitions are not enforced: any
//! state may be written through `update_item`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::db::DB_FILE;
use crate::error::{ItemsError, Result};
use crate::model::{Item, ItemPatch, State};
use crate::store::{RecordStore, SqliteStore};

pub struct ItemsDb<S = SqliteStore> {
    path: PathBuf,
    store: S,
}

impl ItemsDb<SqliteStore> {
    /// Open (creating if needed) the database inside `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let path = dir.into();
        if !path.exists() {
            fs::create_dir_all(&path)?;
        }
        let store = SqliteStore::open(&path.join(DB_FILE))?;
        Ok(Self { path, store })
    }
}

impl<S: RecordStore> ItemsDb<S> {
    pub fn with_store(path: impl Into<PathBuf>, store: S) -> Self {
        Self {
            path: path.into(),
            store,
        }
    }

    /// Store a copy of `item` and return its new id. Any id already on `item`
    /// is ignored, so adding a fetched item creates a second record.
    pub fn add_item(&self, item: &Item) -> Result<i64> {
        if item.summary.is_empty() {
            return Err(ItemsError::MissingSummary);
        }
        let mut fresh = Item {
            id: None,
            summary: item.summary.clone(),
            owner: Some(item.owner().to_string()),
            state: item.state.clone(),
        };
        self.store.create(&mut fresh)
    }

    pub fn get_item(&self, id: i64) -> Result<Item> {
        self.store.read(id)?.ok_or(ItemsError::InvalidItemId(id))
    }

    /// Items whose owner and state equal the given filters. Unset filters
    /// match everything.
    pub fn list_items(&self, owner: Option<&str>, state: Option<&str>) -> Result<Vec<Item>> {
        let mut items = self.store.read_all()?;
        items.retain(|item| {
            owner.map_or(true, |o| item.owner() == o) && state.map_or(true, |s| item.state == s)
        });
        Ok(items)
    }

    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }

    /// Apply the set fields of `mods`. A set summary must not be empty.
    pub fn update_item(&self, id: i64, mods: &ItemPatch) -> Result<()> {
        if mods.summary.as_deref() == Some("") {
            return Err(ItemsError::MissingSummary);
        }
        let rows = self.store.update(id, &mods.fields())?;
        if rows == 0 {
            return Err(ItemsError::InvalidItemId(id));
        }
        Ok(())
    }

    pub fn start(&self, id: i64) -> Result<()> {
        self.update_item(id, &ItemPatch::default().state(State::InProgress.as_str()))
    }

    pub fn finish(&self, id: i64) -> Result<()> {
        self.update_item(id, &ItemPatch::default().state(State::Done.as_str()))
    }

    pub fn delete_item(&self, id: i64) -> Result<()> {
        if self.store.delete(id)? == 0 {
            return Err(ItemsError::InvalidItemId(id));
        }
        Ok(())
    }

    pub fn delete_all(&self) -> Result<()> {
        self.store.delete_all()?;
        Ok(())
    }

    /// The storage directory this instance was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn close(self) -> Result<()> {
        self.store.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items_db() -> ItemsDb {
        ItemsDb::with_store(":memory:", SqliteStore::open_memory().unwrap())
    }

    fn known_set() -> Vec<Item> {
        vec![
            Item::new("zero").with_owner("veit").with_state("todo"),
            Item::new("one").with_owner("veit").with_state("in progress"),
            Item::new("two").with_owner("veit").with_state("done"),
            Item::new("three").with_owner("vsc").with_state("todo"),
            Item::new("four").with_owner("vsc").with_state("in progress"),
            Item::new("five").with_owner("vsc").with_state("done"),
            Item::new("six").with_state("todo"),
            Item::new("seven").with_state("in progress"),
            Item::new("eight").with_state("done"),
        ]
    }

    fn db_filled() -> (ItemsDb, Vec<Item>) {
        let db = items_db();
        let known = known_set();
        for item in &known {
            db.add_item(item).unwrap();
        }
        (db, known)
    }

    fn contains(list: &[Item], item: &Item) -> bool {
        list.iter().any(|i| i.same_content(item))
    }

    #[test]
    fn add_and_get() {
        let db = items_db();
        let item = Item::new("something").with_owner("veit");
        let id = db.add_item(&item).unwrap();
        let got = db.get_item(id).unwrap();
        assert!(got.same_content(&item));
        assert_eq!(got.id, Some(id));
    }

    #[test]
    fn add_defaults_owner_to_empty() {
        let db = items_db();
        let id = db.add_item(&Item::new("no owner")).unwrap();
        let got = db.get_item(id).unwrap();
        assert_eq!(got.owner.as_deref(), Some(""));
        assert_eq!(got.state, "todo");
    }

    #[test]
    fn add_without_summary_fails() {
        let db = items_db();
        let err = db.add_item(&Item::default().with_owner("veit")).unwrap_err();
        assert!(matches!(err, ItemsError::MissingSummary));
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn add_fetched_item_creates_new_record() {
        let db = items_db();
        let id = db.add_item(&Item::new("twice")).unwrap();
        let fetched = db.get_item(id).unwrap();
        let second = db.add_item(&fetched).unwrap();
        assert_ne!(id, second);
        assert_eq!(db.count().unwrap(), 2);
        assert!(db.get_item(second).unwrap().same_content(&fetched));
        assert!(db.get_item(id).unwrap().same_content(&fetched));
    }

    #[test]
    fn get_missing_fails() {
        let err = items_db().get_item(42).unwrap_err();
        assert!(matches!(err, ItemsError::InvalidItemId(42)));
    }

    #[test]
    fn list_no_items() {
        assert!(items_db().list_items(None, None).unwrap().is_empty());
    }

    #[test]
    fn list_several_items() {
        let db = items_db();
        let orig = vec![
            Item::new("Update pytest section"),
            Item::new("Update cibuildwheel section").with_owner("veit"),
            Item::new("Update mock tests")
                .with_owner("vsc")
                .with_state("in progress"),
        ];
        for item in &orig {
            db.add_item(item).unwrap();
        }
        let list = db.list_items(None, None).unwrap();
        assert_eq!(list.len(), orig.len());
        for item in &orig {
            assert!(contains(&list, item));
        }
    }

    #[test]
    fn list_filters() {
        let (db, known) = db_filled();
        let cases: &[(Option<&str>, Option<&str>, &[usize])] = &[
            (Some(""), None, &[6, 7, 8]),
            (Some("veit"), None, &[0, 1, 2]),
            (Some("vsc"), None, &[3, 4, 5]),
            (None, Some("todo"), &[0, 3, 6]),
            (None, Some("in progress"), &[1, 4, 7]),
            (None, Some("done"), &[2, 5, 8]),
            (Some("veit"), Some("todo"), &[0]),
            (Some("nobody"), None, &[]),
        ];
        for (owner, state, expected) in cases {
            let result = db.list_items(*owner, *state).unwrap();
            assert_eq!(result.len(), expected.len(), "owner={owner:?} state={state:?}");
            for &i in *expected {
                assert!(contains(&result, &known[i]), "missing {}", known[i].summary);
            }
        }
        assert_eq!(db.list_items(None, None).unwrap().len(), 9);
    }

    #[test]
    fn filter_is_exact_match() {
        let (db, _) = db_filled();
        assert!(db.list_items(Some("vei"), None).unwrap().is_empty());
        assert!(db.list_items(None, Some("progress")).unwrap().is_empty());
    }

    #[test]
    fn count_equals_unfiltered_list() {
        let (db, _) = db_filled();
        assert_eq!(db.count().unwrap(), db.list_items(None, None).unwrap().len());
    }

    #[test]
    fn partial_update_keeps_unset_fields() {
        let db = items_db();
        let id = db
            .add_item(&Item::new("orig").with_owner("veit"))
            .unwrap();
        db.update_item(id, &ItemPatch::default().summary("foo"))
            .unwrap();
        let got = db.get_item(id).unwrap();
        assert!(got.same_content(&Item::new("foo").with_owner("veit").with_state("todo")));
    }

    #[test]
    fn update_with_empty_summary_fails() {
        let db = items_db();
        let item = Item::new("keep").with_owner("veit");
        let id = db.add_item(&item).unwrap();
        let err = db
            .update_item(id, &ItemPatch::default().summary("").owner("vsc"))
            .unwrap_err();
        assert!(matches!(err, ItemsError::MissingSummary));
        assert!(db.get_item(id).unwrap().same_content(&item));
    }

    #[test]
    fn update_accepts_unknown_state() {
        let db = items_db();
        let id = db.add_item(&Item::new("x")).unwrap();
        db.update_item(id, &ItemPatch::default().state("blocked"))
            .unwrap();
        assert_eq!(db.get_item(id).unwrap().state, "blocked");
    }

    #[test]
    fn update_missing_fails() {
        let db = items_db();
        let err = db
            .update_item(42, &ItemPatch::default().owner("veit"))
            .unwrap_err();
        assert!(matches!(err, ItemsError::InvalidItemId(42)));
        let err = db.update_item(42, &ItemPatch::default()).unwrap_err();
        assert!(matches!(err, ItemsError::InvalidItemId(42)));
    }

    #[test]
    fn empty_patch_on_existing_item_is_noop() {
        let db = items_db();
        let item = Item::new("x").with_owner("o");
        let id = db.add_item(&item).unwrap();
        db.update_item(id, &ItemPatch::default()).unwrap();
        assert!(db.get_item(id).unwrap().same_content(&item));
    }

    #[test]
    fn start_and_finish() {
        let db = items_db();
        let id = db.add_item(&Item::new("x")).unwrap();
        db.start(id).unwrap();
        assert_eq!(db.get_item(id).unwrap().state, "in progress");
        db.finish(id).unwrap();
        assert_eq!(db.get_item(id).unwrap().state, "done");
        // No ordering is enforced.
        db.start(id).unwrap();
        assert_eq!(db.get_item(id).unwrap().state, "in progress");
    }

    #[test]
    fn start_finish_missing_fail() {
        let db = items_db();
        assert!(matches!(db.start(3), Err(ItemsError::InvalidItemId(3))));
        assert!(matches!(db.finish(3), Err(ItemsError::InvalidItemId(3))));
    }

    #[test]
    fn delete_from_many() {
        let db = items_db();
        let a = db.add_item(&Item::new("Update pytest section")).unwrap();
        let b = db.add_item(&Item::new("Update cibuildwheel section")).unwrap();
        let c = db.add_item(&Item::new("Update mock tests")).unwrap();
        db.delete_item(b).unwrap();
        assert_eq!(db.count().unwrap(), 2);
        assert!(matches!(db.get_item(b), Err(ItemsError::InvalidItemId(_))));
        db.get_item(a).unwrap();
        db.get_item(c).unwrap();
    }

    #[test]
    fn delete_last_item() {
        let db = items_db();
        let id = db.add_item(&Item::new("only")).unwrap();
        db.delete_item(id).unwrap();
        assert_eq!(db.count().unwrap(), 0);
        assert!(matches!(db.get_item(id), Err(ItemsError::InvalidItemId(_))));
    }

    #[test]
    fn delete_missing_fails() {
        let err = items_db().delete_item(42).unwrap_err();
        assert!(matches!(err, ItemsError::InvalidItemId(42)));
    }

    #[test]
    fn delete_all_on_empty_store() {
        let db = items_db();
        db.delete_all().unwrap();
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn delete_all_removes_everything() {
        let (db, _) = db_filled();
        db.delete_all().unwrap();
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn open_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("items_db");
        let db = ItemsDb::open(&dir).unwrap();
        assert_eq!(db.path(), dir.as_path());
        db.add_item(&Item::new("persisted")).unwrap();
        db.close().unwrap();
        assert!(dir.join(DB_FILE).exists());

        let db = ItemsDb::open(&dir).unwrap();
        assert_eq!(db.count().unwrap(), 1);
        db.close().unwrap();
    }
}
