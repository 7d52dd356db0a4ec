use crate::rng::SimRng;
use std::collections::HashSet;

/// Display name given to the origin node.
pub const ORIGIN_NAME: &str = "Earth";
/// Display name given to the target node.
pub const TARGET_NAME: &str = "Planet X";

/// The set of body names that generated nodes are named from.
///
/// Built from newline-delimited text. Each line is sanitized (byte-order
/// marks, NUL and other control or non-character code points removed,
/// surrounding whitespace trimmed); empty lines and repeats are dropped.
/// The order of first appearance is kept so a seeded shuffle is
/// reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamePool {
    names: Vec<String>,
}

impl NamePool {
    pub fn from_lines(text: &str) -> Self {
        Self::from_names(text.lines())
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for raw in names {
            let name = sanitize(raw.as_ref());
            if !name.is_empty() && seen.insert(name.clone()) {
                out.push(name);
            }
        }
        Self { names: out }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// A copy of the pool in an order determined by `rng`.
    pub fn shuffled(&self, rng: &mut SimRng) -> Vec<String> {
        let mut names = self.names.clone();
        rng.shuffle(&mut names);
        names
    }
}

/// Strip characters that cannot appear in a display name.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|&c| !c.is_control() && !is_noncharacter(c))
        .collect::<String>()
        .trim()
        .to_string()
}

// U+FEFF (byte-order mark) and the U+FFF0..=U+FFFF specials block.
fn is_noncharacter(c: char) -> bool {
    c == '\u{FEFF}' || ('\u{FFF0}'..='\u{FFFF}').contains(&c)
}
