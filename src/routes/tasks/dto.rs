use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Field name -> human readable message.
pub type FieldErrors = BTreeMap<String, String>;

/// Raw `GET /tasks` query string. Empty values (`?page=`) count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    #[serde(default, deserialize_with = "optional_flag")]
    pub completed: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "optional_param")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "optional_param")]
    pub limit: Option<i64>,
}

fn optional_param<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Accepts `1|t|true` and `0|f|false` in any case.
fn optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "t" | "true" => Ok(Some(true)),
            "0" | "f" | "false" => Ok(Some(false)),
            _ => Err(serde::de::Error::custom(format!(
                "invalid boolean `{}`",
                raw.trim()
            ))),
        },
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Err(e) = validate_title(&self.title) {
            errors.insert("title".into(), e);
        }
        if let Some(description) = &self.description {
            if let Err(e) = validate_description(description) {
                errors.insert("description".into(), e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A request field that can be left out, sent as `null`, or sent with a value.
///
/// Use with `#[serde(default)]` so an omitted key becomes [`Patch::Missing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub completed: Patch<bool>,
}

impl UpdateTaskRequest {
    /// True when the request names no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_missing() && self.description.is_missing() && self.completed.is_missing()
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        match &self.title {
            Patch::Missing => {}
            Patch::Null => {
                errors.insert("title".into(), NOT_NULL.into());
            }
            Patch::Value(title) => {
                if let Err(e) = validate_title(title) {
                    errors.insert("title".into(), e);
                }
            }
        }

        // null clears the description, so only a value needs checking
        if let Patch::Value(description) = &self.description {
            if let Err(e) = validate_description(description) {
                errors.insert("description".into(), e);
            }
        }

        if self.completed == Patch::Null {
            errors.insert("completed".into(), NOT_NULL.into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

const NOT_NULL: &str = "This field must not be null";
const NO_NUL: &str = "This field must not contain NUL characters";

pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("This field is required".to_string());
    }
    if title.contains('\0') {
        return Err(NO_NUL.to_string());
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(format!(
            "This field must be at most {} characters long",
            TITLE_MAX_CHARS
        ));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), String> {
    if description.contains('\0') {
        return Err(NO_NUL.to_string());
    }
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(format!(
            "This field must be at most {} characters long",
            DESCRIPTION_MAX_CHARS
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_missing_null_and_value() {
        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"description": null, "completed": true}"#).unwrap();

        assert_eq!(req.title, Patch::Missing);
        assert_eq!(req.description, Patch::Null);
        assert_eq!(req.completed, Patch::Value(true));
        assert!(!req.is_empty());
    }

    #[test]
    fn empty_string_is_a_value_not_null() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"description": ""}"#).unwrap();
        assert_eq!(req.description, Patch::Value(String::new()));
    }

    #[test]
    fn empty_body_is_empty_update() {
        let req: UpdateTaskRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_rejects_null_title_and_completed() {
        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"title": null, "completed": null}"#).unwrap();
        let errors = req.validate().unwrap_err();

        assert_eq!(errors["title"], "This field must not be null");
        assert_eq!(errors["completed"], "This field must not be null");
    }

    #[test]
    fn create_requires_title() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"description": "x"}"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors["title"], "This field is required");
        assert!(!errors.contains_key("description"));

        let blank = CreateTaskRequest { title: "   ".into(), description: None };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn create_enforces_length_limits_in_chars() {
        let ok = CreateTaskRequest {
            title: "é".repeat(TITLE_MAX_CHARS),
            description: Some("d".repeat(DESCRIPTION_MAX_CHARS)),
        };
        assert!(ok.validate().is_ok());

        let too_long = CreateTaskRequest {
            title: "t".repeat(TITLE_MAX_CHARS + 1),
            description: Some("d".repeat(DESCRIPTION_MAX_CHARS + 1)),
        };
        let errors = too_long.validate().unwrap_err();
        assert_eq!(errors["title"], "This field must be at most 255 characters long");
        assert_eq!(errors["description"], "This field must be at most 1000 characters long");
    }

    #[test]
    fn list_query_treats_blank_params_as_absent() {
        let query: TaskListQuery =
            serde_json::from_str(r#"{"completed": "", "page": "2", "limit": " "}"#).unwrap();

        assert_eq!(query.completed, None);
        assert_eq!(query.page, Some(2));
        assert_eq!(query.limit, None);
    }

    #[test]
    fn list_query_rejects_garbage() {
        let result: Result<TaskListQuery, _> = serde_json::from_str(r#"{"completed": "maybe"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn list_query_accepts_flag_spellings() {
        for (raw, expected) in [("1", true), ("TRUE", true), ("t", true), ("0", false), ("F", false)] {
            let query: TaskListQuery =
                serde_json::from_str(&format!(r#"{{"completed": "{raw}"}}"#)).unwrap();
            assert_eq!(query.completed, Some(expected), "completed={raw}");
        }
    }

    #[test]
    fn nul_characters_are_rejected() {
        let create = CreateTaskRequest {
            title: "a\0b".into(),
            description: Some("c\0".into()),
        };
        let errors = create.validate().unwrap_err();
        assert_eq!(errors["title"], "This field must not contain NUL characters");
        assert_eq!(errors["description"], "This field must not contain NUL characters");

        let update: UpdateTaskRequest =
            serde_json::from_str(r#"{"description": "x\u0000y"}"#).unwrap();
        assert!(update.validate().unwrap_err().contains_key("description"));
    }
}
