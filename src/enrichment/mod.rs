//! Resolves the person ids embedded in touchpoints with one lookup per batch.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::store::{ActivityEvent, ActivityStore, Person, StoreError};

pub const UNKNOWN_PERSON: &str = "Unknown Person";

/// One entry of an event's `people` list, read leniently.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersonRef {
    pub id: Option<String>,
    pub role_in_touchpoint: Option<Value>,
    pub extra: Map<String, Value>,
}

impl PersonRef {
    fn from_json(value: &Value) -> Self {
        let Value::Object(fields) = value else {
            return Self::default();
        };
        let mut extra = fields.clone();
        let id = extra.remove("id").and_then(|id| match id {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let role_in_touchpoint = extra.remove("role_in_touchpoint");
        // names always come from the directory, never from the embedded entry
        extra.remove("first_name");
        extra.remove("last_name");
        Self {
            id,
            role_in_touchpoint,
            extra,
        }
    }
}

/// Parses an event's `people` column. Non-array values are treated as an empty list.
pub fn person_refs(event: &ActivityEvent) -> Vec<PersonRef> {
    match &event.people {
        Value::Array(items) => items.iter().map(PersonRef::from_json).collect(),
        Value::Null => Vec::new(),
        other => {
            log::warn!(
                "Touchpoint {} has malformed people data ({}), treating as empty",
                event.id,
                other
            );
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
}

impl From<&Person> for PersonName {
    fn from(p: &Person) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
        }
    }
}

/// id -> name map built from a single batch lookup.
#[derive(Debug, Clone, Default)]
pub struct PersonDirectory {
    names: HashMap<String, PersonName>,
}

impl PersonDirectory {
    pub fn from_persons(persons: &[Person]) -> Self {
        Self {
            names: persons
                .iter()
                .map(|p| (p.id.clone(), PersonName::from(p)))
                .collect(),
        }
    }

    /// Looks up every id in `ids` with one store call. No call is made for an empty set.
    pub async fn resolve(
        store: &dyn ActivityStore,
        org_id: &str,
        ids: BTreeSet<String>,
    ) -> Result<Self, StoreError> {
        if ids.is_empty() {
            return Ok(Self::default());
        }
        let ids: Vec<String> = ids.into_iter().collect();
        let persons = store.find_persons_by_ids(org_id, &ids).await?;
        log::debug!(
            "Resolved {} of {} referenced people for org {}",
            persons.len(),
            ids.len(),
            org_id
        );
        Ok(Self::from_persons(&persons))
    }

    pub fn get(&self, id: &str) -> Option<&PersonName> {
        self.names.get(id)
    }

    pub fn display_name(&self, id: Option<&str>) -> String {
        id.and_then(|id| self.get(id))
            .map(|n| format!("{} {}", n.first_name, n.last_name))
            .unwrap_or_else(|| UNKNOWN_PERSON.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub fn collect_person_ids(events: &[ActivityEvent]) -> BTreeSet<String> {
    events
        .iter()
        .flat_map(person_refs)
        .filter_map(|r| r.id)
        .collect()
}

pub fn collect_primary_person_ids(events: &[ActivityEvent]) -> BTreeSet<String> {
    events
        .iter()
        .filter_map(|e| person_refs(e).into_iter().next())
        .filter_map(|r| r.id)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedPersonRef {
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_in_touchpoint: Option<Value>,
    pub first_name: String,
    pub last_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An event with its `people` list rewritten to carry names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedEvent {
    pub id: i64,
    pub touchpoint_id: String,
    pub customer_org_id: String,
    pub account_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub channel: Option<String>,
    pub status: Option<String>,
    pub direction: Option<String>,
    pub activity: Option<String>,
    pub people: Vec<EnrichedPersonRef>,
    pub involved_team_ids: Value,
}

/// Order, ids, roles and extra keys are preserved; unresolved ids get empty names.
pub fn apply_directory(event: ActivityEvent, directory: &PersonDirectory) -> EnrichedEvent {
    let people = person_refs(&event)
        .into_iter()
        .map(|r| {
            let name = r.id.as_deref().and_then(|id| directory.get(id));
            EnrichedPersonRef {
                first_name: name.map(|n| n.first_name.clone()).unwrap_or_default(),
                last_name: name.map(|n| n.last_name.clone()).unwrap_or_default(),
                id: r.id,
                role_in_touchpoint: r.role_in_touchpoint,
                extra: r.extra,
            }
        })
        .collect();

    EnrichedEvent {
        id: event.id,
        touchpoint_id: event.touchpoint_id,
        customer_org_id: event.customer_org_id,
        account_id: event.account_id,
        timestamp: event.timestamp,
        channel: event.channel,
        status: event.status,
        direction: event.direction,
        activity: event.activity,
        people,
        involved_team_ids: event.involved_team_ids,
    }
}

pub async fn enrich_events(
    store: &dyn ActivityStore,
    org_id: &str,
    events: Vec<ActivityEvent>,
) -> Result<Vec<EnrichedEvent>, StoreError> {
    let directory = PersonDirectory::resolve(store, org_id, collect_person_ids(&events)).await?;
    Ok(events
        .into_iter()
        .map(|e| apply_directory(e, &directory))
        .collect())
}

/// Display name of the first referenced person and the count of the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryContact {
    pub name: String,
    pub additional_people: usize,
}

pub fn primary_contact(event: &ActivityEvent, directory: &PersonDirectory) -> PrimaryContact {
    let refs = person_refs(event);
    let first_id = refs.first().and_then(|r| r.id.as_deref());
    PrimaryContact {
        name: directory.display_name(first_id),
        additional_people: refs.len().saturating_sub(1),
    }
}
