//! Path type: an ordered, non-empty sequence of object keys.

use std::fmt;

/// Errors related to path construction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path must name at least one key.
    #[error("invalid path: a path needs at least one key")]
    Empty,
    /// A key within the path is empty.
    #[error("invalid path component '{component}' at position {position}: {message}")]
    InvalidComponent {
        component: String,
        position: usize,
        message: String,
    },
}

/// A location in a configuration tree.
///
/// Each component is looked up as an object member, starting at the root.
/// Components are arbitrary non-empty strings: room names and user names are
/// used as keys, so nothing beyond emptiness is rejected.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    components: Vec<String>,
}

impl Path {
    /// Build a path from its keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use soulconf_core_store::Path;
    ///
    /// let path = Path::new(["encoding", "rooms", "nicotine/dev"]).unwrap();
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(path.last(), "nicotine/dev");
    /// ```
    pub fn new<I, S>(components: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let components: Vec<String> = components.into_iter().map(Into::into).collect();
        Self::validate(&components)?;
        Ok(Path { components })
    }

    /// Parse a `/`-separated path string.
    ///
    /// Empty components are ignored, so `//` and leading or trailing slashes
    /// are normalized away. Use [`Path::new`] for keys that contain `/`.
    ///
    /// ```rust
    /// use soulconf_core_store::Path;
    ///
    /// assert_eq!(Path::parse("/users/buddies/").unwrap(), Path::parse("users/buddies").unwrap());
    /// assert!(Path::parse("").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        Self::new(s.split('/').filter(|c| !c.is_empty()))
    }

    fn validate(components: &[String]) -> Result<(), PathError> {
        if components.is_empty() {
            return Err(PathError::Empty);
        }
        for (position, component) in components.iter().enumerate() {
            if component.is_empty() {
                return Err(PathError::InvalidComponent {
                    component: component.clone(),
                    position,
                    message: "empty component".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get the number of components. Always at least one.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Paths are never empty; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over components.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.components.iter()
    }

    /// All components but the last one.
    pub fn parent(&self) -> &[String] {
        &self.components[..self.components.len() - 1]
    }

    /// The final component.
    pub fn last(&self) -> &str {
        &self.components[self.components.len() - 1]
    }

    /// Append one key, returning the extended path.
    pub fn child(&self, key: &str) -> Result<Path, PathError> {
        let mut components = self.components.clone();
        components.push(key.to_string());
        Path::new(components)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("/"))
    }
}

impl std::ops::Index<usize> for Path {
    type Output = String;

    fn index(&self, i: usize) -> &Self::Output {
        &self.components[i]
    }
}

/// Macro for creating paths from literal keys.
///
/// # Example
///
/// ```rust
/// use soulconf_core_store::path;
///
/// let p = path!("downloads", "maxspeed");
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! path {
    ($($component:expr),+ $(,)?) => {
        $crate::Path::new([$($component),+]).expect("invalid path literal")
    };
}
