#![doc = r#"
Client-side core for a hosted activity-feed API.

Two independent pieces live here:

- The response pipeline: a transport hands over a [`TransportOutcome`]; a
  [`ResponseDecoder`] turns it into a status code, a typed value, or a
  [`DecodedEnvelope`] page, classifying every failure into one
  [`ClientError`] and delivering the result on the caller's
  [`CallbackContext`].
- The reaction aggregate: [`ReactionAggregate`] keeps an activity's own
  reactions, latest reactions, and reaction counts consistent under
  optimistic add/delete.

| Wire concept | Type |
| --- | --- |
| `{"results": [...], "next": "..."}` | `DecodedEnvelope<T>` |
| `"next": ""` | `DecodedEnvelope::next == None` |
| `own_reactions` / `latest_reactions` / `reaction_counts` | `ReactionAggregate` |
| activity timestamps (`2019-02-12T10:49:53.123456`) | `time` serde helpers |
"#]

pub mod activity;
pub mod config;
pub mod context;
pub mod decoder;
pub mod envelope;
pub mod errors;
pub mod reactions;
pub mod response;
pub mod source;
pub mod time;

pub use activity::Activity;
pub use config::{ConfigError, FeedConfig};
pub use context::{CallbackContext, Job, QueueRunner, SerialQueue};
pub use decoder::{Delivery, ResponseDecoder, parse_envelope, parse_status, parse_value};
pub use envelope::{DecodedEnvelope, NO_NEXT_PAGE};
pub use errors::{BoxError, ClientError, ClientErrorKind, ClientResult, DecodeFailure, classify};
pub use reactions::{
    Reaction, ReactionAggregate, ReactionKind, ReactionRecord, Reactionable, add_own_reaction,
    delete_own_reaction,
};
pub use reqwest::StatusCode;
pub use response::{RawResponse, TransportOutcome};
pub use source::{ReqwestSource, ResponseSource};
