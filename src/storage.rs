use itertools::Itertools;
use thiserror::Error;
use tracing::trace;

use crate::automaton::{Automaton, StateId, TransitionMap};
use crate::error::AutomatonError;
use crate::math::{OrderedMap, OrderedSet};

/// The delimiter between transition entries in the persisted textual form.
pub const TRANSITION_DELIMITER: &str = "|";

/// Errors produced when decoding a stored record back into an automaton.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A transition entry did not match the `state,symbol=destination` shape.
    #[error("malformed transition entry {0:?}")]
    MalformedTransition(String),
    /// The decoded components do not form a valid automaton.
    #[error(transparent)]
    Invalid(#[from] AutomatonError),
}

/// The flat textual form an automaton takes in the persistence layer: space-separated state and
/// alphabet lists, the bare initial state name, and `state,symbol=destination` transition
/// entries (empty symbol denoting epsilon) joined by [`TRANSITION_DELIMITER`].
///
/// This shape is the one contract the core shares with the storage collaborator, so
/// [`StoredAutomaton::encode`] must be stable: all lists are emitted in sorted order and a
/// decode/encode round trip reproduces the record bit for bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAutomaton {
    /// Space-separated, sorted state names.
    pub states: String,
    /// Space-separated, sorted alphabet symbols.
    pub alphabet: String,
    /// The initial state name.
    pub initial: String,
    /// Space-separated, sorted final state names.
    pub finals: String,
    /// Transition entries joined by [`TRANSITION_DELIMITER`], one entry per destination.
    pub transitions: String,
}

impl StoredAutomaton {
    /// Renders an automaton into its persisted form.
    pub fn encode(automaton: &Automaton) -> Self {
        let transitions = automaton
            .transitions()
            .iter()
            .flat_map(|((source, symbol), targets)| {
                targets
                    .iter()
                    .map(move |target| format!("{source},{symbol}={target}"))
            })
            .join(TRANSITION_DELIMITER);
        Self {
            states: automaton.states().iter().join(" "),
            alphabet: automaton.alphabet().iter().join(" "),
            initial: automaton.initial().clone(),
            finals: automaton.finals().iter().join(" "),
            transitions,
        }
    }

    /// Parses the record back into a validated automaton.
    ///
    /// Parsing is lenient about the transition arrow: `=`, `->` and `>` are all accepted, and
    /// whitespace around the parts is ignored. Anything else yields
    /// [`StorageError::MalformedTransition`]; components that parse but violate an automaton
    /// invariant yield [`StorageError::Invalid`].
    pub fn decode(&self) -> Result<Automaton, StorageError> {
        let states: OrderedSet<StateId> =
            self.states.split_whitespace().map(str::to_owned).collect();
        let alphabet: OrderedSet<String> =
            self.alphabet.split_whitespace().map(str::to_owned).collect();
        let finals: OrderedSet<StateId> =
            self.finals.split_whitespace().map(str::to_owned).collect();

        let mut transitions = TransitionMap::new();
        for entry in self
            .transitions
            .split(TRANSITION_DELIMITER)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
        {
            let (source, symbol, target) = parse_transition(entry)?;
            transitions
                .entry((source, symbol))
                .or_insert_with(OrderedSet::new)
                .insert(target);
        }
        trace!("decoded {} transition keys from stored record", transitions.len());

        Automaton::from_components(
            states,
            alphabet,
            self.initial.trim().to_owned(),
            finals,
            transitions,
        )
        .map_err(StorageError::from)
    }
}

/// Splits one `state,symbol=destination` entry. The symbol part may be empty (epsilon); the
/// arrow may be any of `->`, `=` or `>`.
fn parse_transition(entry: &str) -> Result<(StateId, String, StateId), StorageError> {
    let malformed = || StorageError::MalformedTransition(entry.to_owned());
    let (left, target) = ["->", "=", ">"]
        .iter()
        .find_map(|arrow| entry.split_once(arrow))
        .ok_or_else(malformed)?;
    let (source, symbol) = left.split_once(',').ok_or_else(malformed)?;
    let source = source.trim();
    let target = target.trim();
    if source.is_empty() || target.is_empty() {
        return Err(malformed());
    }
    Ok((source.to_owned(), symbol.trim().to_owned(), target.to_owned()))
}

/// A cache over the records most recently stored per owner, meant to back autocomplete-style
/// lookups in the session layer.
///
/// This replaces what used to be ambient module state in earlier incarnations of the host: the
/// cache is an explicit value with a single owner, and staleness is handled by the owner calling
/// [`RecentCache::invalidate`] (or [`RecentCache::clear`]) whenever the underlying store
/// changes, rather than by timers or global flushes.
#[derive(Debug, Clone, Default)]
pub struct RecentCache<O: Ord, T> {
    entries: OrderedMap<O, Vec<T>>,
}

impl<O: Ord, T> RecentCache<O, T> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: OrderedMap::new(),
        }
    }

    /// Replaces the cached records for `owner`.
    pub fn store(&mut self, owner: O, records: Vec<T>) {
        self.entries.insert(owner, records);
    }

    /// Appends one record for `owner`, creating the slot if necessary.
    pub fn push(&mut self, owner: O, record: T) {
        self.entries.entry(owner).or_default().push(record);
    }

    /// The cached records for `owner`, if any are held.
    pub fn lookup(&self, owner: &O) -> Option<&[T]> {
        self.entries.get(owner).map(Vec::as_slice)
    }

    /// Drops the cached records for `owner`. Call this after the owner's stored records
    /// changed.
    pub fn invalidate(&mut self, owner: &O) {
        self.entries.remove(owner);
    }

    /// Drops everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The number of owners with cached records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
