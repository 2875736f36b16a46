//! Seed data for the in-memory strategy.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{ShoppingList, User};

const BUILT_IN_SEED: &str = include_str!("../../../fixtures/mock-seed.json");

/// Errors returned while loading a mock seed.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Seed file could not be read.
    #[error("failed to read mock seed at {path}: {source}")]
    Read {
        /// Path to the seed file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Seed JSON did not match the expected shape or broke a list invariant.
    #[error("mock seed parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Users and lists the in-memory strategy starts with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockSeed {
    /// Users known to the directory.
    #[serde(default)]
    pub users: Vec<User>,
    /// Lists the store starts with.
    #[serde(default)]
    pub shopping_lists: Vec<ShoppingList>,
}

impl MockSeed {
    /// The seed shipped with the crate.
    ///
    /// # Examples
    /// ```
    /// use shared_lists::outbound::mock::MockSeed;
    ///
    /// let seed = MockSeed::built_in().expect("built-in seed parses");
    /// assert!(!seed.shopping_lists.is_empty());
    /// ```
    pub fn built_in() -> Result<Self, SeedError> {
        Self::from_json(BUILT_IN_SEED)
    }

    /// Parse a seed document.
    pub fn from_json(contents: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Read and parse a seed file.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let read_error = |source: std::io::Error| SeedError::Read {
            path: path.to_path_buf(),
            source,
        };
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_name = path.file_name().ok_or_else(|| {
            read_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seed path must be a file",
            ))
        })?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let contents = dir.read_to_string(Path::new(file_name)).map_err(read_error)?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    //! Seed parsing and file loading.

    use std::io::Write;

    use super::*;
    use crate::domain::access;
    use rstest::rstest;

    #[rstest]
    fn built_in_seed_satisfies_invariants() {
        let seed = MockSeed::built_in().expect("built-in seed parses");

        assert_eq!(seed.users.len(), 4);
        assert!(
            seed.shopping_lists
                .iter()
                .all(|list| access::is_member(list.owner_id(), list))
        );
    }

    #[rstest]
    fn loads_seed_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{ "shoppingLists": [
                {{ "id": "x1", "title": "Snacks", "ownerId": "u9", "memberIds": ["u9"] }}
            ] }}"#
        )
        .expect("write seed");

        let seed = MockSeed::load(file.path()).expect("seed loads");

        assert!(seed.users.is_empty());
        assert_eq!(seed.shopping_lists.len(), 1);
    }

    #[rstest]
    fn missing_file_reports_path() {
        let err = MockSeed::load(Path::new("definitely/not/here.json")).expect_err("missing");
        assert!(matches!(err, SeedError::Read { .. }));
        assert!(err.to_string().contains("definitely/not/here.json"));
    }

    #[rstest]
    fn seed_breaking_owner_membership_is_rejected() {
        let err = MockSeed::from_json(
            r#"{ "shoppingLists": [
                { "id": "x1", "title": "Snacks", "ownerId": "u9", "memberIds": ["u1"] }
            ] }"#,
        )
        .expect_err("owner missing from members");
        assert!(matches!(err, SeedError::Parse(_)));
    }
}
