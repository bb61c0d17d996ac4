// Request validation at the API boundary.
// Every check produces either a typed value or a ValidationError whose
// Display text is the message returned to the client.
use serde_json::{Map, Value};
use thiserror::Error;

use crate::app::models::{ListQuery, SortDirection, SortField, TaskDraft, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Task title is required")]
    MissingTitle,

    #[error("Due date must be a string in YYYY-MM-DD format or null")]
    InvalidDueDate,

    #[error("Status must be active or done")]
    InvalidStatus,

    #[error("Direction must be asc or desc")]
    InvalidDirection,

    #[error("Valid task ID is required")]
    InvalidTaskId,

    #[error("Request body must be valid JSON")]
    MalformedBody,
}

/// Raw query parameters of `GET /api/tasks`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListTasksParams {
    pub status: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl ListTasksParams {
    // Repeated keys are joined with commas, which never matches a valid value.
    // Unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "status" => &mut params.status,
                "sort" => &mut params.sort,
                "direction" => &mut params.direction,
                _ => continue,
            };
            match slot {
                Some(existing) => {
                    existing.push(',');
                    existing.push_str(&value);
                }
                None => *slot = Some(value),
            }
        }
        params
    }
}

// Parses a raw request body. Bodies that are valid JSON but not objects
// are treated as an object with no fields.
pub fn parse_body(raw: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Ok(Map::new()),
        Err(_) => Err(ValidationError::MalformedBody),
    }
}

pub fn parse_task_id(segment: &str) -> Result<i64, ValidationError> {
    segment
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidTaskId)
}

pub fn validate_task_body(body: &Map<String, Value>) -> Result<TaskDraft, ValidationError> {
    let title = match body.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => title.trim().to_string(),
        _ => return Err(ValidationError::MissingTitle),
    };

    let due_date = match body.get("dueDate") {
        None | Some(Value::Null) => None,
        Some(Value::String(date)) => {
            let date = date.trim();
            (!date.is_empty()).then(|| date.to_string())
        }
        Some(_) => return Err(ValidationError::InvalidDueDate),
    };

    let status = match body.get("status") {
        None => TaskStatus::Active,
        Some(value) => status_from_value(value)?,
    };

    Ok(TaskDraft {
        title,
        description: optional_text(body.get("description")),
        due_date,
        notes: optional_text(body.get("notes")),
        status,
    })
}

pub fn validate_status_body(body: &Map<String, Value>) -> Result<TaskStatus, ValidationError> {
    body.get("status")
        .map_or(Err(ValidationError::InvalidStatus), status_from_value)
}

pub fn parse_list_query(params: &ListTasksParams) -> Result<ListQuery, ValidationError> {
    let status = match non_empty(&params.status) {
        Some(status) => Some(
            status
                .parse::<TaskStatus>()
                .map_err(|_| ValidationError::InvalidStatus)?,
        ),
        None => None,
    };

    let direction = match non_empty(&params.direction) {
        Some("asc") => SortDirection::Asc,
        Some("desc") | None => SortDirection::Desc,
        Some(_) => return Err(ValidationError::InvalidDirection),
    };

    // Without a recognized sort the listing is newest first, whatever the direction
    let (sort, direction) = match non_empty(&params.sort).and_then(SortField::parse) {
        Some(sort) => (sort, direction),
        None => (SortField::Created, SortDirection::Desc),
    };

    Ok(ListQuery {
        status,
        sort,
        direction,
    })
}

fn status_from_value(value: &Value) -> Result<TaskStatus, ValidationError> {
    value
        .as_str()
        .and_then(|status| status.parse().ok())
        .ok_or(ValidationError::InvalidStatus)
}

// Strings are kept trimmed; anything else becomes null
fn optional_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text.trim().to_string()),
        _ => None,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(fields) => fields,
            _ => panic!("test body must be an object"),
        }
    }

    fn params(status: Option<&str>, sort: Option<&str>, direction: Option<&str>) -> ListTasksParams {
        ListTasksParams {
            status: status.map(str::to_string),
            sort: sort.map(str::to_string),
            direction: direction.map(str::to_string),
        }
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({"title": ""}))]
    #[case(json!({"title": "   "}))]
    #[case(json!({"title": null}))]
    #[case(json!({"title": 42}))]
    fn rejects_missing_or_blank_title(#[case] body: Value) {
        assert_eq!(
            validate_task_body(&object(body)),
            Err(ValidationError::MissingTitle)
        );
    }

    #[test]
    fn defaults_optional_fields_and_status() {
        let draft = validate_task_body(&object(json!({"title": "  Buy milk "}))).unwrap();

        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.description, None);
        assert_eq!(draft.due_date, None);
        assert_eq!(draft.notes, None);
        assert_eq!(draft.status, TaskStatus::Active);
    }

    #[test]
    fn rejects_null_status_on_task_body() {
        assert_eq!(
            validate_task_body(&object(json!({"title": "x", "status": null}))),
            Err(ValidationError::InvalidStatus)
        );
    }

    #[test]
    fn trims_text_and_drops_non_string_text() {
        let draft = validate_task_body(&object(json!({
            "title": "Plan",
            "description": "  details  ",
            "notes": 12,
            "dueDate": " 2026-04-15 ",
            "status": "done"
        })))
        .unwrap();

        assert_eq!(draft.description.as_deref(), Some("details"));
        assert_eq!(draft.notes, None);
        assert_eq!(draft.due_date.as_deref(), Some("2026-04-15"));
        assert_eq!(draft.status, TaskStatus::Done);
    }

    #[rstest]
    #[case(json!({"title": "A", "dueDate": ""}), None)]
    #[case(json!({"title": "A", "dueDate": null}), None)]
    #[case(json!({"title": "A", "dueDate": "2026-01-02"}), Some("2026-01-02"))]
    fn accepts_string_or_null_due_dates(#[case] body: Value, #[case] expected: Option<&str>) {
        let draft = validate_task_body(&object(body)).unwrap();
        assert_eq!(draft.due_date.as_deref(), expected);
    }

    #[test]
    fn rejects_non_string_due_date() {
        assert_eq!(
            validate_task_body(&object(json!({"title": "A", "dueDate": 20260101}))),
            Err(ValidationError::InvalidDueDate)
        );
    }

    #[rstest]
    #[case(json!({"title": "A", "status": "paused"}))]
    #[case(json!({"title": "A", "status": "DONE"}))]
    #[case(json!({"title": "A", "status": true}))]
    fn rejects_unknown_status(#[case] body: Value) {
        assert_eq!(
            validate_task_body(&object(body)),
            Err(ValidationError::InvalidStatus)
        );
    }

    #[rstest]
    #[case(json!({"status": "done"}), Ok(TaskStatus::Done))]
    #[case(json!({"status": "active"}), Ok(TaskStatus::Active))]
    #[case(json!({"status": "archived"}), Err(ValidationError::InvalidStatus))]
    #[case(json!({}), Err(ValidationError::InvalidStatus))]
    fn validates_status_body(
        #[case] body: Value,
        #[case] expected: Result<TaskStatus, ValidationError>,
    ) {
        assert_eq!(validate_status_body(&object(body)), expected);
    }

    #[rstest]
    #[case("12", Ok(12))]
    #[case("abc", Err(ValidationError::InvalidTaskId))]
    #[case("1.5", Err(ValidationError::InvalidTaskId))]
    #[case("12abc", Err(ValidationError::InvalidTaskId))]
    #[case("", Err(ValidationError::InvalidTaskId))]
    fn parses_task_ids(#[case] segment: &str, #[case] expected: Result<i64, ValidationError>) {
        assert_eq!(parse_task_id(segment), expected);
    }

    #[test]
    fn parses_bodies() {
        assert!(parse_body(b"").unwrap().is_empty());
        assert!(parse_body(b"[1, 2]").unwrap().is_empty());
        assert_eq!(parse_body(b"{\"title\":"), Err(ValidationError::MalformedBody));
        assert_eq!(parse_body(b"{\"title\": \"A\"}").unwrap()["title"], "A");
    }

    #[test]
    fn list_query_defaults_to_newest_first() {
        let query = parse_list_query(&ListTasksParams::default()).unwrap();
        assert_eq!(query, ListQuery::default());
        assert_eq!(query.sort, SortField::Created);
        assert_eq!(query.direction, SortDirection::Desc);
    }

    #[rstest]
    #[case(params(Some("invalid"), None, None), ValidationError::InvalidStatus)]
    #[case(params(None, Some("title"), Some("invalid")), ValidationError::InvalidDirection)]
    #[case(params(Some("bogus"), None, Some("sideways")), ValidationError::InvalidStatus)]
    fn rejects_bad_list_params(#[case] input: ListTasksParams, #[case] expected: ValidationError) {
        assert_eq!(parse_list_query(&input), Err(expected));
    }

    #[test]
    fn empty_params_count_as_absent() {
        let query = parse_list_query(&params(Some(""), Some(""), Some(""))).unwrap();
        assert_eq!(query, ListQuery::default());
    }

    #[rstest]
    #[case(params(None, None, Some("asc")))]
    #[case(params(None, Some("bogus"), Some("asc")))]
    #[case(params(Some("active"), Some("priority"), Some("asc")))]
    fn unrecognized_sort_ignores_direction(#[case] input: ListTasksParams) {
        let query = parse_list_query(&input).unwrap();
        assert_eq!(query.sort, SortField::Created);
        assert_eq!(query.direction, SortDirection::Desc);
    }

    #[test]
    fn collects_params_from_query_pairs() {
        let pairs = [("status", "done"), ("page", "2"), ("sort", "title")]
            .map(|(key, value)| (key.to_string(), value.to_string()));

        assert_eq!(
            ListTasksParams::from_pairs(pairs),
            params(Some("done"), Some("title"), None)
        );
    }

    #[rstest]
    #[case("status", ValidationError::InvalidStatus)]
    #[case("direction", ValidationError::InvalidDirection)]
    fn repeated_keys_are_invalid(#[case] key: &str, #[case] expected: ValidationError) {
        let value = if key == "status" { "active" } else { "asc" };
        let pairs = vec![
            (key.to_string(), value.to_string()),
            (key.to_string(), value.to_string()),
        ];

        assert_eq!(
            parse_list_query(&ListTasksParams::from_pairs(pairs)),
            Err(expected)
        );
    }

    #[test]
    fn explicit_created_sort_keeps_direction() {
        let query = parse_list_query(&params(None, Some("created"), Some("asc"))).unwrap();
        assert_eq!(query.sort, SortField::Created);
        assert_eq!(query.direction, SortDirection::Asc);
    }

    #[test]
    fn parses_full_list_query() {
        let query = parse_list_query(&params(Some("done"), Some("dueDate"), Some("asc"))).unwrap();
        assert_eq!(
            query,
            ListQuery {
                status: Some(TaskStatus::Done),
                sort: SortField::DueDate,
                direction: SortDirection::Asc,
            }
        );
    }
}
