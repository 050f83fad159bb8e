use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A single deliverable attached to one week's topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DueItem {
    pub title: String,
    /// Calendar date as written by the formatter; not validated
    pub due_date: String,
}

/// One week of a course schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleEntry {
    pub week: String,
    pub topic: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub due_items: Vec<DueItem>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<DueItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<DueItem>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ordered schedule derived from a syllabus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule(pub Vec<ScheduleEntry>);

impl Schedule {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Schedule(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.0.iter()
    }

    pub fn into_entries(self) -> Vec<ScheduleEntry> {
        self.0
    }

    /// Total number of due items across all entries
    pub fn due_item_count(&self) -> usize {
        self.0.iter().map(|e| e.due_items.len()).sum()
    }

    /// Serialize in the exact array shape the formatter is asked to produce
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}

impl From<Vec<ScheduleEntry>> for Schedule {
    fn from(entries: Vec<ScheduleEntry>) -> Self {
        Schedule(entries)
    }
}

/// Why a formatter response could not be turned into a [`Schedule`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleParseError {
    #[error("response is not valid JSON (line {line}, column {column}): {message}")]
    Malformed {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("expected a JSON array of schedule entries, found {found}")]
    NotAnArray { found: &'static str },

    #[error("schedule entry {index} is invalid: {message}")]
    InvalidEntry { index: usize, message: String },
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse raw formatter output into a typed schedule.
///
/// Surrounding whitespace is ignored. Anything else around the array (code fences,
/// commentary) makes the response malformed. Unknown fields on entries are ignored.
pub fn parse_schedule(raw: &str) -> Result<Schedule, ScheduleParseError> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|e| ScheduleParseError::Malformed {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ScheduleParseError::NotAnArray {
                found: json_kind(&other),
            })
        }
    };

    let entries = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<ScheduleEntry>(item).map_err(|e| {
                ScheduleParseError::InvalidEntry {
                    index,
                    message: e.to_string(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Schedule(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schedule {
        Schedule(vec![
            ScheduleEntry {
                week: "Week 1".to_string(),
                topic: "Intro".to_string(),
                due_items: vec![DueItem {
                    title: "HW1".to_string(),
                    due_date: "2024-09-01".to_string(),
                }],
            },
            ScheduleEntry {
                week: "Week 2".to_string(),
                topic: "Sorting".to_string(),
                due_items: vec![
                    DueItem {
                        title: "Quiz 1".to_string(),
                        due_date: "2024-09-08".to_string(),
                    },
                    DueItem {
                        title: "HW2".to_string(),
                        due_date: "2024-09-10".to_string(),
                    },
                ],
            },
            ScheduleEntry {
                week: "Week 3".to_string(),
                topic: "Review".to_string(),
                due_items: vec![],
            },
        ])
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let schedule = sample();
        let json = schedule.to_json().unwrap();
        let parsed = parse_schedule(&json).unwrap();
        assert_eq!(parsed, schedule);
        assert_eq!(parsed.due_item_count(), 3);
    }

    #[test]
    fn test_parse_formatter_output() {
        let raw = r#"[{"week":"Week 1","topic":"Intro","due_items":[{"title":"HW1","due_date":"2024-09-01"}]}]"#;
        let schedule = parse_schedule(raw).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.entries()[0].topic, "Intro");
        assert_eq!(schedule.entries()[0].due_items[0].title, "HW1");
    }

    #[test]
    fn test_missing_or_null_due_items_become_empty() {
        let raw = r#"
            [
              {"week": "Week 1", "topic": "Intro"},
              {"week": "Week 2", "topic": "Graphs", "due_items": null, "notes": "ignored"}
            ]
        "#;
        let schedule = parse_schedule(raw).unwrap();
        assert_eq!(schedule.len(), 2);
        assert!(schedule.iter().all(|e| e.due_items.is_empty()));
    }

    #[test]
    fn test_commentary_is_malformed() {
        let raw = "Here is your schedule:\n[{\"week\":\"Week 1\",\"topic\":\"Intro\"}]";
        let err = parse_schedule(raw).unwrap_err();
        assert!(matches!(err, ScheduleParseError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_code_fence_is_malformed() {
        let raw = "```json\n[]\n```";
        assert!(matches!(
            parse_schedule(raw),
            Err(ScheduleParseError::Malformed { .. })
        ));
    }

    #[test]
    fn test_object_is_not_an_array() {
        let err = parse_schedule(r#"{"week":"Week 1"}"#).unwrap_err();
        assert_eq!(
            err,
            ScheduleParseError::NotAnArray {
                found: "an object"
            }
        );
    }

    #[test]
    fn test_invalid_entry_reports_index() {
        let raw = r#"[{"week":"Week 1","topic":"Intro"},{"week":"Week 2"}]"#;
        match parse_schedule(raw) {
            Err(ScheduleParseError::InvalidEntry { index, message }) => {
                assert_eq!(index, 1);
                assert!(message.contains("topic"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_array_is_empty_schedule() {
        let schedule = parse_schedule("  []\n").unwrap();
        assert!(schedule.is_empty());
    }
}
