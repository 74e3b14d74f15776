use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reactions::{Reaction, ReactionAggregate, Reactionable};

/// An activity as returned by feed endpoints, with its reaction views.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub actor: String,
    pub verb: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(
        default,
        with = "crate::time::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub reactions: ReactionAggregate<Reaction>,
}

impl Reactionable for Activity {
    type Reaction = Reaction;

    fn reactions(&self) -> &ReactionAggregate<Reaction> {
        &self.reactions
    }

    fn reactions_mut(&mut self) -> &mut ReactionAggregate<Reaction> {
        &mut self.reactions
    }
}
