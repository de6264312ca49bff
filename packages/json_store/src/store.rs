//! A JSON-backed configuration store addressed by key paths.

use std::fs;
use std::io;
use std::path::{Path as FsPath, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use soulconf_core_store::{Error, Path, Value};

use crate::codec;
use crate::resolver::{FileResolver, SearchPathResolver};

/// Application name used for the default search directories.
pub const APP_NAME: &str = "newsoul";

/// Hierarchical configuration backed by a single JSON file.
///
/// Reads are total: a missing path or a node of the wrong type coerces to a
/// default instead of failing. Writes create whatever intermediate objects
/// they need. With autosave on, every successful mutation rewrites the whole
/// backing file, and dropping the store saves once more.
///
/// # Example
///
/// ```rust
/// use soulconf_json_store::ConfigStore;
/// use soulconf_json_store::path;
///
/// let mut config = ConfigStore::from_reader(&br#"{"downloads": {"maxspeed": 42}}"#[..], false);
/// assert_eq!(config.get_int(&path!("downloads", "maxspeed")), 42);
///
/// config.set(&path!("users", "buddies"), vec!["alice"]);
/// assert!(config.contains(&path!("users", "buddies"), "alice"));
/// ```
pub struct ConfigStore {
    root: Value,
    file: Option<PathBuf>,
    autosave: bool,
}

impl ConfigStore {
    /// Build a store from a document stream with nowhere to save to.
    ///
    /// An unreadable, empty or malformed stream yields an empty document.
    pub fn from_reader<R: io::Read>(reader: R, autosave: bool) -> Self {
        ConfigStore {
            root: load(Some(reader)),
            file: None,
            autosave,
        }
    }

    /// Build a store from a document stream that saves to `file`.
    pub fn from_reader_with_file<R: io::Read>(
        reader: R,
        file: impl Into<PathBuf>,
        autosave: bool,
    ) -> Self {
        ConfigStore {
            root: load(Some(reader)),
            file: Some(file.into()),
            autosave,
        }
    }

    /// Open the configuration at `candidate`, falling back through the
    /// default search directories.
    pub fn open(candidate: impl AsRef<FsPath>, autosave: bool) -> Self {
        Self::open_with(candidate, &SearchPathResolver::new(APP_NAME), autosave)
    }

    /// Open the configuration at `candidate` using `resolver` to find it.
    pub fn open_with(
        candidate: impl AsRef<FsPath>,
        resolver: &dyn FileResolver,
        autosave: bool,
    ) -> Self {
        let resolution = resolver.resolve(candidate.as_ref());
        ConfigStore {
            root: load(resolution.reader),
            file: Some(resolution.write_to),
            autosave,
        }
    }

    /// The whole document. Always a map.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Where `save` writes to, if anywhere.
    pub fn file(&self) -> Option<&FsPath> {
        self.file.as_deref()
    }

    pub fn autosave(&self) -> bool {
        self.autosave
    }

    pub fn set_autosave(&mut self, autosave: bool) {
        self.autosave = autosave;
    }

    /// The node at `path`, if there is one.
    pub fn get(&self, path: &Path) -> Option<&Value> {
        self.root.get(path)
    }

    /// The integer at `path`, or `0`.
    pub fn get_int(&self, path: &Path) -> i64 {
        self.get(path).map_or(0, Value::as_int)
    }

    /// The string form of the node at `path`, or `""`.
    pub fn get_str(&self, path: &Path) -> String {
        self.get(path).map(Value::to_text).unwrap_or_default()
    }

    /// The boolean at `path`, or `false`.
    pub fn get_bool(&self, path: &Path) -> bool {
        self.get(path).is_some_and(Value::as_bool)
    }

    /// The elements of the array at `path` in their string form.
    ///
    /// Empty when the node is missing or not an array.
    pub fn get_vec(&self, path: &Path) -> Vec<String> {
        self.get(path)
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(Value::to_text).collect())
            .unwrap_or_default()
    }

    /// Deserialize the subtree at `path` into `T`.
    ///
    /// `None` when the path is missing or the subtree does not fit `T`.
    pub fn get_typed<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let value = self.get(path)?.clone();
        match codec::from_value(value) {
            Ok(data) => Some(data),
            Err(err) => {
                log::debug!("Value at {} does not match the requested type: {}", path, err);
                None
            }
        }
    }

    /// Whether the array at `path` holds an element whose string form is `value`.
    pub fn contains(&self, path: &Path, value: &str) -> bool {
        self.get(path)
            .and_then(Value::as_array)
            .is_some_and(|arr| arr.iter().any(|item| item.to_text() == value))
    }

    /// Write `value` at `path`, replacing whatever was there.
    ///
    /// Missing intermediate objects are created, and intermediate nodes that
    /// are not objects are replaced by empty ones.
    pub fn set(&mut self, path: &Path, value: impl Into<Value>) {
        self.root.set(path, value.into());
        self.persist_if_autosave();
    }

    /// Serialize `data` and write it at `path`.
    pub fn set_typed<T: Serialize>(&mut self, path: &Path, data: &T) -> Result<(), Error> {
        let value = codec::to_value(data)?;
        self.set(path, value);
        Ok(())
    }

    /// Add `value` to the array at `path`, treating the array as a set.
    ///
    /// A node at `path` that is not an array is replaced by a new array.
    /// Returns `false` (and changes nothing) when the value was already
    /// present.
    pub fn add(&mut self, path: &Path, value: &str) -> bool {
        if self.contains(path, value) {
            return false;
        }

        let item = Value::from(value);
        match self.root.get_mut(path) {
            Some(Value::Array(arr)) => arr.push(item),
            _ => {
                self.root.set(path, Value::Array(vec![item]));
            }
        }
        self.persist_if_autosave();
        true
    }

    /// Delete `key` from the object at `path`, or remove the value `key`
    /// from the array at `path`.
    ///
    /// Returns `false` when the node is neither an object holding `key` nor
    /// an array holding an element equal to `key`.
    pub fn del(&mut self, path: &Path, key: &str) -> bool {
        let has_member = matches!(self.get(path), Some(Value::Map(map)) if map.contains_key(key));
        if has_member {
            self.delete_key(path, key)
        } else if matches!(self.get(path), Some(Value::Array(_))) {
            self.delete_value(path, key)
        } else {
            false
        }
    }

    /// Remove member `key` from the object at `path`.
    pub fn delete_key(&mut self, path: &Path, key: &str) -> bool {
        let removed = match self.root.get_mut(path) {
            Some(Value::Map(map)) => map.remove(key).is_some(),
            _ => false,
        };
        if removed {
            self.persist_if_autosave();
        }
        removed
    }

    /// Remove every element whose string form is `value` from the array at
    /// `path`, keeping the order of the rest.
    pub fn delete_value(&mut self, path: &Path, value: &str) -> bool {
        let removed = match self.root.get_mut(path) {
            Some(Value::Array(arr)) => {
                let before = arr.len();
                arr.retain(|item| item.to_text() != value);
                arr.len() != before
            }
            _ => false,
        };
        if removed {
            self.persist_if_autosave();
        }
        removed
    }

    /// The canonical text form written by `save`.
    pub fn to_json_string(&self) -> Result<String, Error> {
        codec::encode(&self.root)
    }

    /// Overwrite the backing file with the whole document.
    ///
    /// The file's directory is created if it does not exist yet.
    pub fn save(&self) -> Result<(), Error> {
        let file = self.file.as_ref().ok_or(Error::NoBackingFile)?;
        let text = self.to_json_string()?;

        log::debug!("Writing {}...", file.display());
        let write = || -> io::Result<()> {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(file, text)
        };
        write().map_err(|error| Error::Write {
            path: file.clone(),
            error,
        })
    }

    fn persist_if_autosave(&self) {
        if !self.autosave {
            return;
        }
        if self.file.is_none() {
            log::trace!("Autosave skipped: configuration has no backing file");
            return;
        }
        if let Err(err) = self.save() {
            log::warn!("Autosave failed: {}", err);
        }
    }
}

impl Drop for ConfigStore {
    fn drop(&mut self) {
        self.persist_if_autosave();
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("file", &self.file)
            .field("autosave", &self.autosave)
            .finish_non_exhaustive()
    }
}

fn load<R: io::Read>(reader: Option<R>) -> Value {
    let Some(mut reader) = reader else {
        log::debug!("No configuration found, starting with an empty document");
        return Value::map();
    };

    let mut bytes = Vec::new();
    if let Err(err) = reader.read_to_end(&mut bytes) {
        log::warn!("Could not read configuration, starting empty: {}", err);
        return Value::map();
    }

    match codec::decode(&bytes) {
        Ok(root) => root,
        Err(err) => {
            log::warn!("Could not parse configuration, starting empty: {}", err);
            Value::map()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use soulconf_core_store::path;

    fn store_with(doc: serde_json::Value) -> ConfigStore {
        ConfigStore::from_reader(doc.to_string().as_bytes(), false)
    }

    fn empty_store() -> ConfigStore {
        ConfigStore::from_reader(io::empty(), false)
    }

    #[test]
    fn reads_typed_values() {
        let store = store_with(json!({
            "server": {"host": "server.slsknet.org", "port": 2242},
            "uploads": {"onlybuddies": true},
            "users": {"buddies": ["alice", "bob"]},
        }));

        assert_eq!(store.get_str(&path!("server", "host")), "server.slsknet.org");
        assert_eq!(store.get_int(&path!("server", "port")), 2242);
        assert!(store.get_bool(&path!("uploads", "onlybuddies")));
        assert_eq!(store.get_vec(&path!("users", "buddies")), vec!["alice", "bob"]);
    }

    #[test]
    fn missing_paths_yield_defaults() {
        let store = store_with(json!({"a": {"b": 1}}));
        for p in [path!("x"), path!("a", "c"), path!("a", "b", "c"), path!("x", "y", "z")] {
            assert_eq!(store.get(&p), None);
            assert_eq!(store.get_int(&p), 0);
            assert_eq!(store.get_str(&p), "");
            assert!(!store.get_bool(&p));
            assert!(store.get_vec(&p).is_empty());
            assert!(!store.contains(&p, "anything"));
        }
    }

    #[test]
    fn wrong_tags_coerce() {
        let store = store_with(json!({
            "s": "text",
            "n": 7,
            "f": 2.5,
            "o": {"k": "v"},
            "mixed": ["a", 1, true, null, {"k": 2}],
        }));

        assert_eq!(store.get_int(&path!("s")), 0);
        assert_eq!(store.get_int(&path!("f")), 2);
        assert_eq!(store.get_str(&path!("n")), "7");
        assert_eq!(store.get_str(&path!("o")), r#"{"k":"v"}"#);
        assert!(store.get_bool(&path!("n")));
        assert!(store.get_vec(&path!("s")).is_empty());
        assert!(store.get_vec(&path!("o")).is_empty());
        assert_eq!(
            store.get_vec(&path!("mixed")),
            vec!["a", "1", "true", "", r#"{"k":2}"#]
        );
        assert!(store.contains(&path!("mixed"), "1"));
        assert!(store.contains(&path!("mixed"), "true"));
        assert!(!store.contains(&path!("o"), "k"));
    }

    #[test]
    fn set_round_trips_through_missing_intermediates() {
        let mut store = empty_store();
        store.set(&path!("downloads", "maxspeed"), 42i64);
        store.set(&path!("server", "host"), "localhost");
        store.set(&path!("uploads", "onlybuddies"), true);
        store.set(&path!("a", "b", "c", "d"), -5i32);

        assert_eq!(store.get_int(&path!("downloads", "maxspeed")), 42);
        assert_eq!(store.get_str(&path!("server", "host")), "localhost");
        assert!(store.get_bool(&path!("uploads", "onlybuddies")));
        assert_eq!(store.get_int(&path!("a", "b", "c", "d")), -5);
        assert!(store.get(&path!("a", "b", "c")).unwrap().is_map());
    }

    #[test]
    fn set_replaces_scalar_intermediate() {
        let mut store = store_with(json!({"downloads": 5}));
        store.set(&path!("downloads", "maxspeed"), 10i64);
        assert_eq!(store.get_int(&path!("downloads", "maxspeed")), 10);
    }

    #[test]
    fn set_raw_values() {
        let mut store = empty_store();
        store.set(&path!("encoding", "rooms"), Value::map());
        store.set(&path!("encoding", "rooms", "nicotine"), "UTF-8");
        assert_eq!(store.get_str(&path!("encoding", "rooms", "nicotine")), "UTF-8");
    }

    #[test]
    fn add_is_set_like() {
        let mut store = empty_store();
        let p = path!("users", "buddies");

        assert!(store.add(&p, "x"));
        assert!(store.contains(&p, "x"));
        assert!(!store.add(&p, "x"));
        assert!(store.contains(&p, "x"));
        assert_eq!(store.get_vec(&p), vec!["x"]);

        assert!(store.add(&p, "y"));
        assert_eq!(store.get_vec(&p), vec!["x", "y"]);
    }

    #[test]
    fn add_replaces_non_array() {
        let mut store = store_with(json!({"users": {"buddies": "alice"}}));
        assert!(store.add(&path!("users", "buddies"), "bob"));
        assert_eq!(store.get_vec(&path!("users", "buddies")), vec!["bob"]);
    }

    #[test]
    fn add_treats_non_string_elements_by_text() {
        let mut store = store_with(json!({"ports": [2234]}));
        assert!(!store.add(&path!("ports"), "2234"));
        assert_eq!(store.get(&path!("ports")), Some(&Value::from(vec![2234i64])));
    }

    #[test]
    fn del_object_member() {
        let mut store = store_with(json!({"wishlist": {"rare album": 0, "other": 1}}));
        let p = path!("wishlist");

        assert!(store.del(&p, "rare album"));
        assert_eq!(store.get(&path!("wishlist", "rare album")), None);
        assert_eq!(store.get_int(&path!("wishlist", "other")), 1);
        assert!(!store.del(&p, "rare album"));
    }

    #[test]
    fn del_array_value_keeps_order() {
        let mut store = store_with(json!({"users": {"banned": ["a", "v", "b", "c"]}}));
        let p = path!("users", "banned");

        assert!(store.del(&p, "v"));
        assert_eq!(store.get_vec(&p), vec!["a", "b", "c"]);
        assert!(!store.del(&p, "v"));
        assert_eq!(store.get_vec(&p), vec!["a", "b", "c"]);
    }

    #[test]
    fn del_on_missing_or_scalar_fails() {
        let mut store = store_with(json!({"s": "text", "o": {}}));
        assert!(!store.del(&path!("nope"), "x"));
        assert!(!store.del(&path!("s"), "text"));
        assert!(!store.del(&path!("o"), "x"));
    }

    #[test]
    fn explicit_delete_operations_do_not_cross_over() {
        let mut store = store_with(json!({"o": {"k": 1}, "a": ["k"]}));
        assert!(!store.delete_value(&path!("o"), "k"));
        assert!(!store.delete_key(&path!("a"), "k"));
        assert!(store.delete_key(&path!("o"), "k"));
        assert!(store.delete_value(&path!("a"), "k"));
        assert!(store.get_vec(&path!("a")).is_empty());
    }

    #[test]
    fn malformed_input_falls_back_to_empty_object() {
        for input in ["", "{", "not json at all", "[1,2]", "null", "\"str\""] {
            let mut store = ConfigStore::from_reader(input.as_bytes(), false);
            assert_eq!(store.root(), &Value::map(), "input {:?}", input);
            assert_eq!(store.get_int(&path!("a", "b")), 0);
            assert_eq!(store.get_str(&path!("a")), "");

            store.set(&path!("a", "b"), 1i64);
            assert_eq!(store.get_int(&path!("a", "b")), 1);
        }
    }

    #[test]
    fn unreadable_stream_falls_back_to_empty_object() {
        struct Broken;
        impl io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("device unplugged"))
            }
        }

        let store = ConfigStore::from_reader(Broken, false);
        assert_eq!(store.root(), &Value::map());
    }

    #[test]
    fn save_without_file_is_an_error() {
        let store = empty_store();
        assert!(matches!(store.save(), Err(Error::NoBackingFile)));
    }

    #[test]
    fn autosave_without_file_is_silent() {
        let mut store = ConfigStore::from_reader(io::empty(), true);
        store.set(&path!("a"), 1i64);
        assert!(store.add(&path!("b"), "x"));
        assert!(store.del(&path!("b"), "x"));
        assert_eq!(store.get_int(&path!("a")), 1);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Listen {
        first: u16,
        last: u16,
    }

    #[test]
    fn typed_subtrees() {
        let mut store = empty_store();
        let p = path!("listen");
        store
            .set_typed(&p, &Listen { first: 2234, last: 2240 })
            .unwrap();
        assert_eq!(store.get_int(&path!("listen", "last")), 2240);
        assert_eq!(
            store.get_typed::<Listen>(&p),
            Some(Listen { first: 2234, last: 2240 })
        );

        store.set(&path!("listen", "first"), "not a port");
        assert_eq!(store.get_typed::<Listen>(&p), None);
        assert_eq!(store.get_typed::<Listen>(&path!("missing")), None);
    }

    #[test]
    fn json_string_is_canonical() {
        let mut store = empty_store();
        store.set(&path!("b"), 1i64);
        store.set(&path!("a"), "x");
        assert_eq!(
            store.to_json_string().unwrap(),
            "{\n  \"a\": \"x\",\n  \"b\": 1\n}\n"
        );
    }
}
