use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Room used when a request does not name one
pub const DEFAULT_ROOM: &str = "default";

/// Number of question slots in a room
pub const SLOT_COUNT: usize = 4;

/// Participant name under which the AI answer is stored in `responses`
pub const AI_PARTICIPANT: &str = "IA";

/// `currentQuestion` value meaning no question is active
pub const NO_ACTIVE_QUESTION: i64 = -1;

pub type ParticipantId = String;
pub type JurorId = String;

/// Answers for one slot, keyed by participant/group
pub type SlotAnswers = BTreeMap<ParticipantId, String>;

/// Identifier of a quiz room
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    /// Resolve an optional room name, falling back to [`DEFAULT_ROOM`] when absent or blank
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(name) if !name.is_empty() => Self(name.to_string()),
            _ => Self(DEFAULT_ROOM.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store key holding this room's state document
    pub fn state_key(&self) -> String {
        format!("room:{}:state", self.0)
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self(DEFAULT_ROOM.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the fixed question slots `q0..q3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u8);

impl Slot {
    /// Slot for a `currentQuestion` index, if the index is in range
    pub fn from_index(index: i64) -> Option<Self> {
        (0..SLOT_COUNT as i64)
            .contains(&index)
            .then_some(Self(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = Slot> {
        (0..SLOT_COUNT as u8).map(Slot)
    }

    fn parse(key: &str) -> Option<Self> {
        let index: i64 = key.strip_prefix('q')?.parse().ok()?;
        // "q01" and "q+1" parse as integers but are not slot keys
        Self::from_index(index).filter(|slot| slot.to_string() == key)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SlotVisitor;

        impl de::Visitor<'_> for SlotVisitor {
            type Value = Slot;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a slot key q0..q3")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Slot, E> {
                Slot::parse(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(SlotVisitor)
    }
}

/// A jury vote, only ever "A" or "B"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Vote {
    A,
    B,
}

impl Vote {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "A" => Some(Vote::A),
            "B" => Some(Vote::B),
            _ => None,
        }
    }
}

/// The shared state document of one room.
///
/// `questions` and `currentQuestion` have no serde default: a stored document
/// missing either is not a room state and gets replaced by the default one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    pub questions: Vec<String>,
    pub current_question: i64,
    #[serde(default = "empty_responses")]
    pub responses: BTreeMap<Slot, SlotAnswers>,
    #[serde(default = "hidden_slots")]
    pub revealed: BTreeMap<Slot, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub votes: BTreeMap<JurorId, Vote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ia: Option<String>,
    /// Fields this server does not interpret, kept as written by clients
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for RoomState {
    fn default() -> Self {
        Self {
            questions: vec![String::new(); SLOT_COUNT],
            current_question: NO_ACTIVE_QUESTION,
            responses: empty_responses(),
            revealed: hidden_slots(),
            votes: BTreeMap::new(),
            ia: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl RoomState {
    /// The slot of the currently active question, if any
    pub fn active_slot(&self) -> Option<Slot> {
        Slot::from_index(self.current_question)
    }
}

fn empty_responses() -> BTreeMap<Slot, SlotAnswers> {
    Slot::all().map(|slot| (slot, SlotAnswers::new())).collect()
}

fn hidden_slots() -> BTreeMap<Slot, bool> {
    Slot::all().map(|slot| (slot, false)).collect()
}

/// A partial room state as sent to the merge-update operation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdate {
    #[serde(default, deserialize_with = "deserialize_questions")]
    pub questions: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub current_question: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub responses: Option<BTreeMap<Slot, SlotAnswers>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub revealed: Option<BTreeMap<Slot, bool>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub votes: Option<BTreeMap<JurorId, Vote>>,
    /// `Some(None)` is an explicit `null`, which clears the stored answer
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub ia: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn deserialize_questions<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let questions = Vec::<String>::deserialize(deserializer)?;
    if questions.len() != SLOT_COUNT {
        return Err(de::Error::invalid_length(
            questions.len(),
            &"exactly four questions",
        ));
    }
    Ok(Some(questions))
}

/// A field that, when present, must hold a value (`null` is rejected)
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Tell an absent field (`None`) apart from an explicit `null` (`Some(None)`)
fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_id_defaults() {
        assert_eq!(RoomId::resolve(None).as_str(), "default");
        assert_eq!(RoomId::resolve(Some("  ")).as_str(), "default");
        assert_eq!(RoomId::resolve(Some("turma-3")).as_str(), "turma-3");
        assert_eq!(
            RoomId::resolve(Some("turma-3")).state_key(),
            "room:turma-3:state"
        );
    }

    #[test]
    fn test_slot_bounds() {
        assert_eq!(Slot::from_index(-1), None);
        assert_eq!(Slot::from_index(4), None);
        assert_eq!(Slot::from_index(3).map(|s| s.to_string()), Some("q3".into()));
        assert!(serde_json::from_value::<Slot>(json!("q4")).is_err());
        assert!(serde_json::from_value::<Slot>(json!("q01")).is_err());
        assert_eq!(serde_json::from_value::<Slot>(json!("q2")).unwrap().index(), 2);
    }

    #[test]
    fn test_default_document_shape() {
        let value = serde_json::to_value(RoomState::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "questions": ["", "", "", ""],
                "currentQuestion": -1,
                "responses": { "q0": {}, "q1": {}, "q2": {}, "q3": {} },
                "revealed": { "q0": false, "q1": false, "q2": false, "q3": false }
            })
        );
    }

    #[test]
    fn test_document_without_current_question_is_rejected() {
        let doc = json!({ "questions": ["", "", "", ""] });
        assert!(serde_json::from_value::<RoomState>(doc).is_err());
    }

    #[test]
    fn test_unknown_fields_survive() {
        let doc = json!({
            "questions": ["a", "b", "c", "d"],
            "currentQuestion": 1,
            "theme": "dark"
        });
        let state: RoomState = serde_json::from_value(doc).unwrap();
        assert_eq!(state.extra.get("theme"), Some(&json!("dark")));
        assert_eq!(state.responses.len(), SLOT_COUNT);
        assert_eq!(state.active_slot(), Slot::from_index(1));

        let back = serde_json::to_value(&state).unwrap();
        assert_eq!(back["theme"], json!("dark"));
    }

    #[test]
    fn test_invalid_vote_never_decodes() {
        let doc = json!({
            "questions": ["", "", "", ""],
            "currentQuestion": -1,
            "votes": { "j1": "C" }
        });
        assert!(serde_json::from_value::<RoomState>(doc).is_err());
        assert_eq!(Vote::parse("A"), Some(Vote::A));
        assert_eq!(Vote::parse("a"), None);
    }

    #[test]
    fn test_update_requires_four_questions() {
        let short = json!({ "questions": ["only one"] });
        assert!(serde_json::from_value::<RoomUpdate>(short).is_err());

        let full = json!({ "questions": ["1", "2", "3", "4"] });
        let update: RoomUpdate = serde_json::from_value(full).unwrap();
        assert_eq!(update.questions.map(|q| q.len()), Some(4));
    }

    #[test]
    fn test_update_tells_null_ia_from_absent() {
        let absent: RoomUpdate = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.ia, None);

        let null: RoomUpdate = serde_json::from_value(json!({ "ia": null })).unwrap();
        assert_eq!(null.ia, Some(None));

        let set: RoomUpdate = serde_json::from_value(json!({ "ia": "x" })).unwrap();
        assert_eq!(set.ia, Some(Some("x".to_string())));

        assert!(serde_json::from_value::<RoomUpdate>(json!({ "currentQuestion": null })).is_err());
    }
}
