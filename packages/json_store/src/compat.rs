//! Projection of the hierarchical configuration onto the legacy flat schema.
//!
//! The legacy format is a set of named groups, each a string-to-string
//! mapping. The projection is a closed table: a hierarchical field without a
//! rule here is not exported.

use std::collections::BTreeMap;

use soulconf_core_store::{Path, PathError, Value};

use crate::store::ConfigStore;
use ScalarKind::{Bool, Int, Str};
use Shape::{Bag, Members, Object};

/// Legacy groups keyed by group name.
pub type CompatData = BTreeMap<String, CompatGroup>;

/// One legacy group.
pub type CompatGroup = BTreeMap<String, String>;

/// How a scalar is read and rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Int,
    Bool,
}

/// How the node at a rule's source is re-emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Array elements become keys with empty values. Elements whose string
    /// form is empty are dropped.
    Members,
    /// One scalar becomes one key.
    Scalar { key: &'static str, kind: ScalarKind },
    /// Every member of an object is copied in its string form.
    Object,
    /// Members of an object are copied when they are strings or integers.
    Bag,
    /// Array elements are joined into a single value.
    Joined {
        key: &'static str,
        separator: &'static str,
    },
}

/// One entry of the projection table.
#[derive(Clone, Copy, Debug)]
pub struct CompatRule {
    pub source: &'static [&'static str],
    pub group: &'static str,
    pub shape: Shape,
}

impl CompatRule {
    pub const fn new(source: &'static [&'static str], group: &'static str, shape: Shape) -> Self {
        CompatRule {
            source,
            group,
            shape,
        }
    }

    pub fn path(&self) -> Result<Path, PathError> {
        Path::new(self.source.iter().copied())
    }

    fn apply(&self, config: &ConfigStore, out: &mut CompatGroup) {
        let path = match self.path() {
            Ok(path) => path,
            Err(err) => {
                log::warn!("Skipping compat rule for group {}: {}", self.group, err);
                return;
            }
        };
        match self.shape {
            Shape::Members => {
                for item in config.get_vec(&path) {
                    if !item.is_empty() {
                        out.insert(item, String::new());
                    }
                }
            }
            Shape::Scalar { key, kind } => {
                let text = match kind {
                    ScalarKind::Str => config.get_str(&path),
                    ScalarKind::Int => config.get_int(&path).to_string(),
                    ScalarKind::Bool => bool_text(config.get_bool(&path)).to_string(),
                };
                out.insert(key.to_string(), text);
            }
            Shape::Object => {
                if let Some(map) = config.get(&path).and_then(Value::as_map) {
                    for (key, value) in map {
                        out.insert(key.clone(), value.to_text());
                    }
                }
            }
            Shape::Bag => {
                if let Some(map) = config.get(&path).and_then(Value::as_map) {
                    for (key, value) in map {
                        let text = match value {
                            Value::String(s) => s.clone(),
                            Value::Integer(i) => i.to_string(),
                            Value::Unsigned(u) => u.to_string(),
                            _ => continue,
                        };
                        out.insert(key.clone(), text);
                    }
                }
            }
            Shape::Joined { key, separator } => {
                out.insert(key.to_string(), config.get_vec(&path).join(separator));
            }
        }
    }
}

fn bool_text(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

const fn scalar(key: &'static str, kind: ScalarKind) -> Shape {
    Shape::Scalar { key, kind }
}

/// The projection table, processed in order.
pub const RULES: &[CompatRule] = &[
    CompatRule::new(&["server"], "server", Bag),
    CompatRule::new(&["listen", "first"], "listen", scalar("first", Int)),
    CompatRule::new(&["listen", "last"], "listen", scalar("last", Int)),
    CompatRule::new(&["downloads", "maxspeed"], "transfers", scalar("download_rate", Int)),
    CompatRule::new(&["downloads", "slots"], "transfers", scalar("download_slots", Int)),
    CompatRule::new(&["downloads", "dir"], "transfers", scalar("download_dir", Str)),
    CompatRule::new(&["downloads", "incompletedir"], "transfers", scalar("incomplete_dir", Str)),
    CompatRule::new(&["downloads", "retry"], "transfers", scalar("autoretry_downloads", Bool)),
    CompatRule::new(
        &["downloads", "blacklist"],
        "transfers",
        Shape::Joined {
            key: "download_blacklist",
            separator: ";",
        },
    ),
    CompatRule::new(&["uploads", "maxspeed"], "transfers", scalar("upload_rate", Int)),
    CompatRule::new(&["uploads", "slots"], "transfers", scalar("upload_slots", Int)),
    CompatRule::new(&["uploads", "onlybuddies"], "transfers", scalar("only_buddies", Bool)),
    CompatRule::new(&["uploads", "privilegebuddies"], "transfers", scalar("privilege_buddies", Bool)),
    CompatRule::new(&["uploads", "trustedbuddies"], "transfers", scalar("trust_uploads", Bool)),
    CompatRule::new(&["uploads", "warnings"], "transfers", scalar("user_warnings", Bool)),
    CompatRule::new(&["users", "buddies"], "buddies", Members),
    CompatRule::new(&["users", "banned"], "banned", Members),
    CompatRule::new(&["users", "ignored"], "ignored", Members),
    CompatRule::new(&["users", "trusted"], "trusted", Members),
    CompatRule::new(&["rooms", "autojoin"], "autojoin", Members),
    CompatRule::new(&["rooms", "tickers"], "tickers", Object),
    CompatRule::new(&["rooms", "defaultticker"], "default-ticker", scalar("ticker", Str)),
    CompatRule::new(&["interests", "like"], "interests.like", Members),
    CompatRule::new(&["interests", "hate"], "interests.hate", Members),
    CompatRule::new(&["encoding", "network"], "encoding", scalar("network", Str)),
    CompatRule::new(&["encoding", "filesystem"], "encoding", scalar("filesystem", Str)),
    CompatRule::new(&["encoding", "rooms"], "encoding.rooms", Object),
    CompatRule::new(&["encoding", "users"], "encoding.users", Object),
    CompatRule::new(&["userinfo", "text"], "userinfo", scalar("text", Str)),
    CompatRule::new(&["userinfo", "image"], "userinfo", scalar("image", Str)),
    CompatRule::new(&["shares", "database"], "shares", scalar("database", Str)),
    CompatRule::new(&["shares", "buddydatabase"], "buddy.shares", scalar("database", Str)),
    CompatRule::new(&["privaterooms", "enabled"], "priv_rooms", scalar("enable_priv_room", Bool)),
    CompatRule::new(&["interfaces", "password"], "interfaces", scalar("password", Str)),
    CompatRule::new(&["interfaces", "bind"], "interfaces.bind", Members),
    CompatRule::new(&["wishlist"], "wishlist", Object),
];

/// Project `config` onto the legacy schema using [`RULES`].
///
/// Every group named by the table is present in the result, empty or not.
pub fn compat_data(config: &ConfigStore) -> CompatData {
    project(config, RULES)
}

/// Project `config` using an arbitrary rule table.
pub fn project(config: &ConfigStore, rules: &[CompatRule]) -> CompatData {
    let mut data = CompatData::new();
    for rule in rules {
        let group = data.entry(rule.group.to_string()).or_default();
        rule.apply(config, group);
    }
    data
}

impl ConfigStore {
    /// The legacy flat view of this configuration.
    pub fn compat_data(&self) -> CompatData {
        compat_data(self)
    }
}
