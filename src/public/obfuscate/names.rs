//! Generated selector names: `prefix + [a-z]+ + suffix`.

use globset::{Glob, GlobSet, GlobSetBuilder};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::public::PublicError;

/// `0 -> a`, `25 -> z`, `26 -> aa`, `27 -> ab`, ...
fn letters(mut n: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'a' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Prefix and suffix around generated names.
#[derive(Debug, Clone)]
pub struct Affixes {
    pub prefix: String,
    pub suffix: String,
}

impl Affixes {
    pub fn generate(&self, n: usize) -> String {
        format!("{}{}{}", self.prefix, letters(n), self.suffix)
    }
}

/// Names never renamed.
#[derive(Debug)]
pub struct Exclusions(GlobSet);

impl Exclusions {
    pub fn new(patterns: &[String]) -> Result<Self, PublicError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|source| PublicError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| PublicError::Pattern {
            pattern: patterns.join(", "),
            source,
        })?;
        Ok(Self(set))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.is_match(name)
    }
}

/// Original to generated names for one namespace (classes, ids or keyframes).
#[derive(Debug, Default)]
pub struct NameMap {
    map: FxHashMap<String, String>,
    /// Names whose draw was themselves.
    unchanged: FxHashSet<String>,
    next: usize,
}

impl NameMap {
    /// Assign the next free generated name to `original`, unless it already
    /// has one. Names in `taken` are never handed out.
    ///
    /// A name that draws itself is left unmapped; the draw is still used up.
    pub fn assign(&mut self, original: &str, affixes: &Affixes, taken: &FxHashSet<String>) {
        if self.map.contains_key(original) || self.unchanged.contains(original) {
            return;
        }
        let name = loop {
            let candidate = affixes.generate(self.next);
            self.next += 1;
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        if name == original {
            self.unchanged.insert(name);
        } else {
            self.map.insert(original.to_string(), name);
        }
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.map.get(original).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            map: pairs
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            unchanged: FxHashSet::default(),
            next: pairs.len(),
        }
    }
}
