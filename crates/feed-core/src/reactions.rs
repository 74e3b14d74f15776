//! Per-activity reaction bookkeeping.
//!
//! An activity carries three views of its reactions keyed by kind: the
//! viewer's own reactions, the latest reactions by anyone, and a total count.
//! Optimistic local updates go through [`add_own_reaction`] and
//! [`delete_own_reaction`], which keep the three views in step.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type ReactionKind = String;

/// Anything that can be stored in a [`ReactionAggregate`].
pub trait ReactionRecord {
    fn id(&self) -> &str;
    fn kind(&self) -> &str;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: String,
    pub kind: ReactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(
        default,
        with = "crate::time::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "crate::time::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Reaction {
    pub fn new(id: impl Into<String>, kind: impl Into<ReactionKind>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            user_id: None,
            activity_id: None,
            parent: None,
            data: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl ReactionRecord for Reaction {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        &self.kind
    }
}

/// The three reaction views of one activity.
///
/// Sequences are most-recent-first. Missing or `null` fields in a server
/// payload hydrate as empty maps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "R: Serialize",
    deserialize = "R: Deserialize<'de>"
))]
pub struct ReactionAggregate<R = Reaction> {
    #[serde(default, deserialize_with = "null_as_empty")]
    own_reactions: BTreeMap<ReactionKind, Vec<R>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    latest_reactions: BTreeMap<ReactionKind, Vec<R>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    reaction_counts: BTreeMap<ReactionKind, u64>,
}

impl<R> Default for ReactionAggregate<R> {
    fn default() -> Self {
        Self {
            own_reactions: BTreeMap::new(),
            latest_reactions: BTreeMap::new(),
            reaction_counts: BTreeMap::new(),
        }
    }
}

impl<R> ReactionAggregate<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an aggregate from views the server already computed.
    pub fn from_parts(
        own_reactions: BTreeMap<ReactionKind, Vec<R>>,
        latest_reactions: BTreeMap<ReactionKind, Vec<R>>,
        reaction_counts: BTreeMap<ReactionKind, u64>,
    ) -> Self {
        Self {
            own_reactions,
            latest_reactions,
            reaction_counts,
        }
    }

    pub fn own_reactions(&self) -> &BTreeMap<ReactionKind, Vec<R>> {
        &self.own_reactions
    }

    pub fn latest_reactions(&self) -> &BTreeMap<ReactionKind, Vec<R>> {
        &self.latest_reactions
    }

    pub fn reaction_counts(&self) -> &BTreeMap<ReactionKind, u64> {
        &self.reaction_counts
    }

    pub fn own_reactions_of(&self, kind: &str) -> &[R] {
        self.own_reactions.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn latest_reactions_of(&self, kind: &str) -> &[R] {
        self.latest_reactions
            .get(kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count_of(&self, kind: &str) -> u64 {
        self.reaction_counts.get(kind).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.own_reactions.is_empty()
            && self.latest_reactions.is_empty()
            && self.reaction_counts.is_empty()
    }
}

impl<R> ReactionAggregate<R>
where
    R: ReactionRecord + Clone,
{
    pub fn add_own_reaction(&mut self, reaction: R) {
        add_own_reaction(self, reaction);
    }

    pub fn delete_own_reaction<Q>(&mut self, reaction: &Q) -> bool
    where
        Q: ReactionRecord + ?Sized,
    {
        delete_own_reaction(self, reaction)
    }
}

/// Records a new reaction by the current viewer.
///
/// The reaction goes to the front of both the own and latest sequences for
/// its kind and the kind's count goes up by one. Ids are not deduplicated.
pub fn add_own_reaction<R>(aggregate: &mut ReactionAggregate<R>, reaction: R)
where
    R: ReactionRecord + Clone,
{
    let kind = reaction.kind().to_string();
    aggregate
        .latest_reactions
        .entry(kind.clone())
        .or_default()
        .insert(0, reaction.clone());
    aggregate
        .own_reactions
        .entry(kind.clone())
        .or_default()
        .insert(0, reaction);
    *aggregate.reaction_counts.entry(kind).or_insert(0) += 1;
}

/// Removes one of the viewer's own reactions, matched by id within its kind.
///
/// Nothing changes unless the reaction is found among the own reactions.
/// The latest-reactions entry is removed if still present, and the count
/// only decrements while positive. Returns whether a reaction was removed.
pub fn delete_own_reaction<R, Q>(aggregate: &mut ReactionAggregate<R>, reaction: &Q) -> bool
where
    R: ReactionRecord,
    Q: ReactionRecord + ?Sized,
{
    let kind = reaction.kind();
    let id = reaction.id();

    let Some(own) = aggregate.own_reactions.get_mut(kind) else {
        tracing::debug!(kind, id, "no own reactions of this kind; delete ignored");
        return false;
    };
    let Some(index) = own.iter().position(|entry| entry.id() == id) else {
        tracing::debug!(kind, id, "own reaction not found; delete ignored");
        return false;
    };
    own.remove(index);

    if let Some(latest) = aggregate.latest_reactions.get_mut(kind) {
        if let Some(index) = latest.iter().position(|entry| entry.id() == id) {
            latest.remove(index);
        }
    }

    if let Some(count) = aggregate.reaction_counts.get_mut(kind) {
        if *count > 0 {
            *count -= 1;
        }
    }
    true
}

/// Implemented by models that own a [`ReactionAggregate`]. The provided
/// methods only forward to the free functions on the aggregate returned by
/// [`Reactionable::reactions_mut`].
pub trait Reactionable {
    type Reaction: ReactionRecord + Clone;

    fn reactions(&self) -> &ReactionAggregate<Self::Reaction>;

    fn reactions_mut(&mut self) -> &mut ReactionAggregate<Self::Reaction>;

    fn add_own_reaction(&mut self, reaction: Self::Reaction) {
        add_own_reaction(self.reactions_mut(), reaction);
    }

    fn delete_own_reaction<Q>(&mut self, reaction: &Q) -> bool
    where
        Q: ReactionRecord + ?Sized,
    {
        delete_own_reaction(self.reactions_mut(), reaction)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
