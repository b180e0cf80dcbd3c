//! Side-output descriptors returned by processors.

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// A batch of documents destined for an alternate output target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtraData {
    pub documents: Vec<Event>,
    pub target: String,
}

impl ExtraData {
    #[must_use]
    pub fn new(documents: Vec<Event>, target: impl Into<String>) -> Self {
        Self {
            documents,
            target: target.into(),
        }
    }
}

/// What a processor produced besides mutating the event in place.
///
/// The engine forwards every `(documents, target)` pair to the output's
/// `store_custom`, document by document, immediately after the producing
/// processor runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ExtraOutputs {
    /// The processor only mutated the event.
    #[default]
    None,
    /// A single batch for one target.
    One(ExtraData),
    /// Ordered batches, possibly for different targets.
    Many(Vec<ExtraData>),
}

impl ExtraOutputs {
    /// Iterate the batches in forwarding order.
    pub fn iter(&self) -> impl Iterator<Item = &ExtraData> {
        let batches: &[ExtraData] = match self {
            Self::None => &[],
            Self::One(data) => std::slice::from_ref(data),
            Self::Many(list) => list,
        };
        batches.iter()
    }

    /// Returns `true` if there is nothing to forward.
    #[must_use]
    pub fn is_none(&self) -> bool {
        match self {
            Self::None => true,
            Self::One(data) => data.documents.is_empty(),
            Self::Many(list) => list.iter().all(|d| d.documents.is_empty()),
        }
    }
}
