use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Sibling rank inside a parent scope. Rendered on the wire as a decimal string.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Position(u64);

impl Position {
    pub fn new(rank: u64) -> Self {
        Self(rank)
    }

    pub fn rank(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn parse_position(value: &str) -> Option<Position> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u64>().ok().map(Position)
}

/// Hands out append ranks per parent scope.
///
/// The next rank is one past the larger of the highest rank this sequence has
/// issued for the scope and the highest rank currently held by a sibling. With
/// no deletes in between this equals `siblings + 1`; once siblings are removed
/// it keeps climbing instead of reusing a rank that is still in use. Returns
/// `None` once the scope holds `u64::MAX`; the scope is left untouched.
#[derive(Clone, Debug)]
pub struct RankSequence<K> {
    issued: HashMap<K, u64>,
}

impl<K> Default for RankSequence<K> {
    fn default() -> Self {
        Self {
            issued: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> RankSequence<K> {
    pub fn next(&mut self, scope: K, sibling_max: Option<Position>) -> Option<Position> {
        let issued = self.issued.get(&scope).copied().unwrap_or(0);
        let next = issued
            .max(sibling_max.map_or(0, Position::rank))
            .checked_add(1)?;
        self.issued.insert(scope, next);
        Some(Position(next))
    }
}
