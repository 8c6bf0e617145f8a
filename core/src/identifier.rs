//! Object identifiers.
//!
//! Every object in a project description is keyed by a 24 character
//! uppercase token. Identifiers carry no meaning beyond uniqueness inside one
//! document; collisions between random identifiers are treated as negligible.

use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::model::ProjectDescription;

/// Length of every identifier minted by this crate.
pub const IDENTIFIER_LEN: usize = 24;

/// Opaque key of an object inside a project description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wrap an identifier read from an existing document.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mint a fresh identifier from a random 128-bit UUID.
///
/// The hyphen-free hex form is uppercased and truncated to
/// [`IDENTIFIER_LEN`] characters.
pub fn generate_identifier() -> ObjectId {
    let mut raw = Uuid::new_v4().simple().to_string().to_uppercase();
    raw.truncate(IDENTIFIER_LEN);
    ObjectId(raw)
}

/// Supplier of identifiers for one generation or patch run.
pub trait IdentifierSource {
    fn next_id(&mut self) -> ObjectId;
}

/// Random identifiers, see [`generate_identifier`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdentifiers;

impl IdentifierSource for RandomIdentifiers {
    fn next_id(&mut self) -> ObjectId {
        generate_identifier()
    }
}

/// Counter-based identifiers for reproducible output.
///
/// A run starting from the same seed always yields the same sequence, which
/// makes generated projects diffable.
#[derive(Debug, Clone)]
pub struct SequentialIdentifiers {
    seed: u32,
    counter: u64,
}

impl SequentialIdentifiers {
    pub const fn new(seed: u32) -> Self {
        Self { seed, counter: 0 }
    }
}

impl Default for SequentialIdentifiers {
    fn default() -> Self {
        Self::new(0)
    }
}

impl IdentifierSource for SequentialIdentifiers {
    fn next_id(&mut self) -> ObjectId {
        self.counter += 1;
        // 8 hex digits of seed + 16 hex digits of counter = 24
        ObjectId(format!("{:08X}{:016X}", self.seed, self.counter))
    }
}

impl<S: IdentifierSource + ?Sized> IdentifierSource for &mut S {
    fn next_id(&mut self) -> ObjectId {
        (**self).next_id()
    }
}

/// Draw from `source` until the identifier is not used by `project`.
pub fn mint_unique<S: IdentifierSource + ?Sized>(
    source: &mut S,
    project: &ProjectDescription,
) -> ObjectId {
    loop {
        let id = source.next_id();
        if !project.contains(&id) {
            return id;
        }
        debug!("Identifier {id} already in use, drawing another");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_identifiers_are_24_uppercase_alphanumerics() {
        let id = generate_identifier();
        assert_eq!(id.as_str().len(), IDENTIFIER_LEN);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn random_identifiers_do_not_repeat() {
        let mut source = RandomIdentifiers;
        let ids: HashSet<_> = (0..1000).map(|_| source.next_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn sequential_identifiers_are_reproducible() {
        let mut a = SequentialIdentifiers::new(7);
        let mut b = SequentialIdentifiers::new(7);
        for _ in 0..5 {
            assert_eq!(a.next_id(), b.next_id());
        }
        assert_eq!(a.next_id().as_str(), "000000070000000000000006");
    }

    #[test]
    fn mint_unique_skips_identifiers_in_use() {
        let taken = SequentialIdentifiers::new(1).next_id();
        let mut project = ProjectDescription::new("Demo", taken.clone());
        project
            .insert(crate::model::Object::new(taken.clone(), "PBXProject"))
            .unwrap();

        let minted = mint_unique(&mut SequentialIdentifiers::new(1), &project);
        assert_ne!(minted, taken);
        assert_eq!(minted.as_str(), "000000010000000000000002");
    }
}
