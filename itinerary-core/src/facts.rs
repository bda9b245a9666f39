//! Typed facts held in the fact store.
//!
//! Every fact kind is a plain struct wrapped by the closed [`Fact`] enum.
//! Rule patterns address fact attributes through the closed [`Field`]
//! enum, so field access is an exhaustive match rather than a lookup by
//! attribute name.

use crate::knowledge::{Month, Region};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority given to places that arrive without a route-order hint.
pub const UNRANKED_PRIORITY: i32 = 99;

fn unranked() -> i32 {
    UNRANKED_PRIORITY
}

/// Position of a fact in the store, assigned in assertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactId(pub(crate) usize);

impl FactId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f-{}", self.0)
    }
}

/// The traveller's request. Exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRequest {
    /// Trip length in days.
    pub duration: u32,
    pub month: Month,
    /// Lower-cased interest tags, without duplicates, in the order given.
    pub interests: Vec<String>,
}

impl UserRequest {
    pub fn wants(&self, interest: &str) -> bool {
        self.interests.iter().any(|i| i == interest)
    }
}

/// A place that can become a stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    /// The interest tag this place serves, e.g. "beach".
    pub kind: String,
    pub region: Region,
    /// Route-order hint; lower comes earlier.
    #[serde(default = "unranked")]
    pub priority: i32,
    #[serde(default)]
    pub description: String,
}

impl Location {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, region: Region) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            region,
            priority: UNRANKED_PRIORITY,
            description: String::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// `bad_region` has adverse travel conditions in `month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weather {
    pub bad_region: Region,
    pub month: Month,
}

impl Weather {
    pub fn new(bad_region: Region, month: Month) -> Self {
        Self { bad_region, month }
    }
}

/// Whether a recommendation steers away from or towards a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Avoid,
    Suggest,
}

/// Intermediate conclusion about a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub verdict: Verdict,
    pub region: Region,
    pub reason: Option<String>,
}

impl Recommendation {
    pub fn avoid(region: Region) -> Self {
        Self {
            verdict: Verdict::Avoid,
            region,
            reason: None,
        }
    }

    pub fn suggest(region: Region) -> Self {
        Self {
            verdict: Verdict::Suggest,
            region,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn avoid_region(&self) -> Option<Region> {
        (self.verdict == Verdict::Avoid).then_some(self.region)
    }

    pub fn suggest_region(&self) -> Option<Region> {
        (self.verdict == Verdict::Suggest).then_some(self.region)
    }
}

/// User-facing caution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Work item: no known place serves this interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindInfo {
    pub interest: String,
}

/// A candidate stop before final selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotentialMatch {
    pub location: String,
    pub kind: String,
    pub region: Region,
    pub priority: i32,
    pub description: String,
}

/// One numbered stop of the final itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryItem {
    /// 1-based, contiguous.
    pub stop_number: u32,
    pub location: String,
    pub reason: String,
    pub description: String,
    pub region: Region,
    pub priority: i32,
}

/// Marks that every unknown interest has been looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapsResolved {
    pub looked_up: usize,
    pub found: usize,
}

/// Discriminant of [`Fact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactKind {
    UserRequest,
    Location,
    Weather,
    Recommendation,
    Warning,
    FindInfo,
    PotentialMatch,
    ItineraryItem,
    GapsResolved,
}

/// Any fact the engine can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "snake_case")]
pub enum Fact {
    UserRequest(UserRequest),
    Location(Location),
    Weather(Weather),
    Recommendation(Recommendation),
    Warning(Warning),
    FindInfo(FindInfo),
    PotentialMatch(PotentialMatch),
    ItineraryItem(ItineraryItem),
    GapsResolved(GapsResolved),
}

/// Addressable fact attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Duration,
    Month,
    Interests,
    Name,
    Kind,
    Region,
    Priority,
    Description,
    BadRegion,
    AvoidRegion,
    SuggestRegion,
    Reason,
    Message,
    Interest,
    Location,
    StopNumber,
    LookedUp,
    Found,
}

/// A field value as seen by rule patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
    List(Vec<String>),
    Region(Region),
    Month(Month),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_region(&self) -> Option<Region> {
        match self {
            Value::Region(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_month(&self) -> Option<Month> {
        match self {
            Value::Month(m) => Some(*m),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<Region> for Value {
    fn from(r: Region) -> Self {
        Value::Region(r)
    }
}

impl From<Month> for Value {
    fn from(m: Month) -> Self {
        Value::Month(m)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::List(items) => write!(f, "{items:?}"),
            Value::Region(r) => write!(f, "{r}"),
            Value::Month(m) => write!(f, "{m}"),
        }
    }
}

impl Fact {
    pub fn kind(&self) -> FactKind {
        match self {
            Fact::UserRequest(_) => FactKind::UserRequest,
            Fact::Location(_) => FactKind::Location,
            Fact::Weather(_) => FactKind::Weather,
            Fact::Recommendation(_) => FactKind::Recommendation,
            Fact::Warning(_) => FactKind::Warning,
            Fact::FindInfo(_) => FactKind::FindInfo,
            Fact::PotentialMatch(_) => FactKind::PotentialMatch,
            Fact::ItineraryItem(_) => FactKind::ItineraryItem,
            Fact::GapsResolved(_) => FactKind::GapsResolved,
        }
    }

    /// Read one attribute. `None` when this kind has no such field, or
    /// when an optional field (like `avoid_region` on a suggestion) is absent.
    pub fn get(&self, field: Field) -> Option<Value> {
        let text = |s: &String| Some(Value::Text(s.clone()));
        let int = |n: i32| Some(Value::Int(n.into()));

        match self {
            Fact::UserRequest(r) => match field {
                Field::Duration => Some(Value::Int(r.duration.into())),
                Field::Month => Some(Value::Month(r.month)),
                Field::Interests => Some(Value::List(r.interests.clone())),
                _ => None,
            },
            Fact::Location(l) => match field {
                Field::Name => text(&l.name),
                Field::Kind => text(&l.kind),
                Field::Region => Some(Value::Region(l.region)),
                Field::Priority => int(l.priority),
                Field::Description => text(&l.description),
                _ => None,
            },
            Fact::Weather(w) => match field {
                Field::BadRegion => Some(Value::Region(w.bad_region)),
                Field::Month => Some(Value::Month(w.month)),
                _ => None,
            },
            Fact::Recommendation(r) => match field {
                Field::AvoidRegion => r.avoid_region().map(Value::Region),
                Field::SuggestRegion => r.suggest_region().map(Value::Region),
                Field::Reason => r.reason.as_ref().and_then(text),
                _ => None,
            },
            Fact::Warning(w) => match field {
                Field::Message => text(&w.message),
                _ => None,
            },
            Fact::FindInfo(f) => match field {
                Field::Interest => text(&f.interest),
                _ => None,
            },
            Fact::PotentialMatch(m) => match field {
                Field::Location => text(&m.location),
                Field::Kind => text(&m.kind),
                Field::Region => Some(Value::Region(m.region)),
                Field::Priority => int(m.priority),
                Field::Description => text(&m.description),
                _ => None,
            },
            Fact::ItineraryItem(i) => match field {
                Field::StopNumber => Some(Value::Int(i.stop_number.into())),
                Field::Location => text(&i.location),
                Field::Reason => text(&i.reason),
                Field::Description => text(&i.description),
                Field::Region => Some(Value::Region(i.region)),
                Field::Priority => int(i.priority),
                _ => None,
            },
            Fact::GapsResolved(g) => match field {
                Field::LookedUp => i64::try_from(g.looked_up).ok().map(Value::Int),
                Field::Found => i64::try_from(g.found).ok().map(Value::Int),
                _ => None,
            },
        }
    }
}

/// A concrete fact struct that can be recovered from a [`Fact`].
pub trait FactType: Into<Fact> + 'static {
    const KIND: FactKind;

    fn from_fact(fact: &Fact) -> Option<&Self>;
}

macro_rules! fact_types {
    ($($name:ident),* $(,)?) => {
        $(
            impl From<$name> for Fact {
                fn from(fact: $name) -> Self {
                    Fact::$name(fact)
                }
            }

            impl FactType for $name {
                const KIND: FactKind = FactKind::$name;

                fn from_fact(fact: &Fact) -> Option<&Self> {
                    match fact {
                        Fact::$name(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

fact_types!(
    UserRequest,
    Location,
    Weather,
    Recommendation,
    Warning,
    FindInfo,
    PotentialMatch,
    ItineraryItem,
    GapsResolved,
);
