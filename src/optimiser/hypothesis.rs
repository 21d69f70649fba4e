//! Candidate explanations for tracklet boundary events.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::optimiser::errors::{OptimiserError, OptimiserResult};

/// The event a hypothesis proposes for a tracklet.
///
/// Discriminants match the codes used by the tracking engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Fate {
    /// The whole tracklet is a spurious detection
    FalsePositive = 0,
    /// The tracklet starts here (field edge, first frame)
    Initialize = 1,
    /// The tracklet ends here (field edge, last frame)
    Terminate = 2,
    /// Continues into another tracklet
    Link = 3,
    /// Ends by splitting into two children
    Divide = 4,
    /// Ends by object death
    Apoptosis = 5,
    /// Starts from two parents joining
    Merge = 6,
}

impl Fate {
    pub const ALL: [Fate; 7] = [
        Fate::FalsePositive,
        Fate::Initialize,
        Fate::Terminate,
        Fate::Link,
        Fate::Divide,
        Fate::Apoptosis,
        Fate::Merge,
    ];

    /// Numeric code as exchanged with the engine.
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Fate::FalsePositive => "FALSE_POSITIVE",
            Fate::Initialize => "INITIALIZE",
            Fate::Terminate => "TERMINATE",
            Fate::Link => "LINK",
            Fate::Divide => "DIVIDE",
            Fate::Apoptosis => "APOPTOSIS",
            Fate::Merge => "MERGE",
        }
    }
}

impl fmt::Display for Fate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u32> for Fate {
    type Error = OptimiserError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Fate::ALL
            .into_iter()
            .find(|fate| fate.code() == code)
            .ok_or(OptimiserError::UnknownFate(code))
    }
}

/// Fate together with the tracklets it couples to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Event {
    FalsePositive,
    Initialize,
    Terminate,
    Apoptosis,
    Link {
        link_id: u32,
    },
    Divide {
        child_one_id: u32,
        child_two_id: u32,
    },
    Merge {
        parent_one_id: u32,
        parent_two_id: u32,
    },
}

impl Event {
    pub fn fate(&self) -> Fate {
        match self {
            Event::FalsePositive => Fate::FalsePositive,
            Event::Initialize => Fate::Initialize,
            Event::Terminate => Fate::Terminate,
            Event::Apoptosis => Fate::Apoptosis,
            Event::Link { .. } => Fate::Link,
            Event::Divide { .. } => Fate::Divide,
            Event::Merge { .. } => Fate::Merge,
        }
    }

    /// Ids of the other tracklets this event touches.
    pub fn references(&self) -> Vec<u32> {
        match *self {
            Event::FalsePositive | Event::Initialize | Event::Terminate | Event::Apoptosis => {
                vec![]
            }
            Event::Link { link_id } => vec![link_id],
            Event::Divide {
                child_one_id,
                child_two_id,
            } => vec![child_one_id, child_two_id],
            Event::Merge {
                parent_one_id,
                parent_two_id,
            } => vec![parent_one_id, parent_two_id],
        }
    }
}

/// Hypothesis record as exposed by the tracking engine.
///
/// Reference fields are zero when absent. Their meaning depends on the fate:
/// `ref_one` is the link target, first child or first parent; `ref_two` is the
/// second child or second parent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawHypothesis {
    pub fate_code: u32,
    pub id: u32,
    pub log_likelihood: f64,
    pub ref_one: u32,
    pub ref_two: u32,
}

/// A candidate explanation for a tracklet-boundary event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackHypothesis {
    /// 1-based id of the subject tracklet
    pub id: u32,
    /// Plausibility score, higher is better
    pub log_likelihood: f64,
    /// Proposed event
    pub event: Event,
}

impl TrackHypothesis {
    pub fn new(id: u32, event: Event, log_likelihood: f64) -> Self {
        Self {
            id,
            log_likelihood,
            event,
        }
    }

    pub fn false_positive(id: u32, log_likelihood: f64) -> Self {
        Self::new(id, Event::FalsePositive, log_likelihood)
    }

    pub fn initialize(id: u32, log_likelihood: f64) -> Self {
        Self::new(id, Event::Initialize, log_likelihood)
    }

    pub fn terminate(id: u32, log_likelihood: f64) -> Self {
        Self::new(id, Event::Terminate, log_likelihood)
    }

    pub fn apoptosis(id: u32, log_likelihood: f64) -> Self {
        Self::new(id, Event::Apoptosis, log_likelihood)
    }

    pub fn link(id: u32, link_id: u32, log_likelihood: f64) -> Self {
        Self::new(id, Event::Link { link_id }, log_likelihood)
    }

    pub fn divide(id: u32, child_one_id: u32, child_two_id: u32, log_likelihood: f64) -> Self {
        Self::new(
            id,
            Event::Divide {
                child_one_id,
                child_two_id,
            },
            log_likelihood,
        )
    }

    pub fn merge(id: u32, parent_one_id: u32, parent_two_id: u32, log_likelihood: f64) -> Self {
        Self::new(
            id,
            Event::Merge {
                parent_one_id,
                parent_two_id,
            },
            log_likelihood,
        )
    }

    pub fn fate(&self) -> Fate {
        self.event.fate()
    }

    /// Minimisation cost of accepting this hypothesis.
    pub fn cost(&self) -> f64 {
        -self.log_likelihood
    }

    /// Convert an engine record, failing on unknown codes and bad references.
    ///
    /// `index` is the record's position in the pool and only used for error
    /// reporting. With `strict_references` set, references on fates that do
    /// not use them are rejected instead of ignored.
    pub fn from_raw(
        index: usize,
        raw: &RawHypothesis,
        strict_references: bool,
    ) -> OptimiserResult<Self> {
        let fate = Fate::try_from(raw.fate_code)?;
        if raw.id == 0 {
            return Err(OptimiserError::InvalidTrackId { index, id: raw.id });
        }

        let required = |field: &'static str, value: u32| {
            if value == 0 {
                Err(OptimiserError::MissingReference { index, fate, field })
            } else {
                Ok(value)
            }
        };
        let forbidden = |field: &'static str, value: u32| {
            if strict_references && value != 0 {
                Err(OptimiserError::UnexpectedReference { index, fate, field })
            } else {
                Ok(())
            }
        };

        let event = match fate {
            Fate::FalsePositive | Fate::Initialize | Fate::Terminate | Fate::Apoptosis => {
                forbidden("ref_one", raw.ref_one)?;
                forbidden("ref_two", raw.ref_two)?;
                match fate {
                    Fate::FalsePositive => Event::FalsePositive,
                    Fate::Initialize => Event::Initialize,
                    Fate::Terminate => Event::Terminate,
                    _ => Event::Apoptosis,
                }
            }
            Fate::Link => {
                let link_id = required("link_id", raw.ref_one)?;
                forbidden("ref_two", raw.ref_two)?;
                Event::Link { link_id }
            }
            Fate::Divide => Event::Divide {
                child_one_id: required("child_one_id", raw.ref_one)?,
                child_two_id: required("child_two_id", raw.ref_two)?,
            },
            Fate::Merge => Event::Merge {
                parent_one_id: required("parent_one_id", raw.ref_one)?,
                parent_two_id: required("parent_two_id", raw.ref_two)?,
            },
        };

        Ok(Self::new(raw.id, event, raw.log_likelihood))
    }

    /// Engine representation of this hypothesis.
    pub fn to_raw(&self) -> RawHypothesis {
        let refs = self.event.references();
        RawHypothesis {
            fate_code: self.fate().code(),
            id: self.id,
            log_likelihood: self.log_likelihood,
            ref_one: refs.first().copied().unwrap_or(0),
            ref_two: refs.get(1).copied().unwrap_or(0),
        }
    }
}

impl TryFrom<RawHypothesis> for TrackHypothesis {
    type Error = OptimiserError;

    fn try_from(raw: RawHypothesis) -> Result<Self, Self::Error> {
        Self::from_raw(0, &raw, true)
    }
}
