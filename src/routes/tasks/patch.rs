//! Builds the SET clause of a partial update.

use super::dto::{Patch, UpdateTaskRequest};

/// One `column = value` pair of an UPDATE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    Title(String),
    Description(String),
    Completed(bool),
    /// Current time, resolved by the store.
    UpdatedAtNow,
}

impl Assignment {
    pub fn column(&self) -> &'static str {
        match self {
            Assignment::Title(_) => "title",
            Assignment::Description(_) => "description",
            Assignment::Completed(_) => "completed",
            Assignment::UpdatedAtNow => "updated_at",
        }
    }
}

/// Assignments for every field the request supplied, in declaration order,
/// followed by `updated_at = now`. Empty when nothing was supplied.
///
/// Expects a request that already passed `UpdateTaskRequest::validate`; a
/// `null` title or completed flag is skipped rather than written.
pub fn compose(request: &UpdateTaskRequest) -> Vec<Assignment> {
    let mut set = Vec::with_capacity(4);

    if let Patch::Value(title) = &request.title {
        set.push(Assignment::Title(title.clone()));
    }

    match &request.description {
        Patch::Missing => {}
        Patch::Null => set.push(Assignment::Description(String::new())),
        Patch::Value(description) => set.push(Assignment::Description(description.clone())),
    }

    if let Patch::Value(completed) = request.completed {
        set.push(Assignment::Completed(completed));
    }

    if !set.is_empty() {
        set.push(Assignment::UpdatedAtNow);
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_composes_nothing() {
        assert!(compose(&UpdateTaskRequest::default()).is_empty());
    }

    #[test]
    fn single_field_gets_updated_at() {
        let request = UpdateTaskRequest {
            completed: Patch::Value(true),
            ..Default::default()
        };

        assert_eq!(
            compose(&request),
            vec![Assignment::Completed(true), Assignment::UpdatedAtNow]
        );
    }

    #[test]
    fn order_follows_declaration_not_input() {
        let request: UpdateTaskRequest = serde_json::from_str(
            r#"{"completed": false, "description": "d", "title": "t"}"#,
        )
        .unwrap();

        let columns: Vec<_> = compose(&request).iter().map(Assignment::column).collect();
        assert_eq!(columns, vec!["title", "description", "completed", "updated_at"]);
    }

    #[test]
    fn null_description_clears_it() {
        let request = UpdateTaskRequest {
            description: Patch::Null,
            ..Default::default()
        };

        assert_eq!(compose(&request)[0], Assignment::Description(String::new()));
    }
}
