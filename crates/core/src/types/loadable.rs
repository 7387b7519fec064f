//! Explicit three-state result for backend queries.
//!
//! A query that has not answered yet is `Pending`. A query that answered
//! with nothing is `Empty`. Keeping the two apart means an empty leaderboard
//! is never rendered as a spinner, and a spinner is never rendered as "no
//! entries".

use serde::{Deserialize, Serialize};

/// State of a query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Loadable<T> {
    /// No answer yet.
    #[default]
    Pending,
    /// Answered, nothing to show.
    Empty,
    /// Answered with data.
    Populated(T),
}

impl<T> Loadable<T> {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Data if populated.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Populated(data) => Some(data),
            Self::Pending | Self::Empty => None,
        }
    }

    /// Map populated data, keeping `Pending` and `Empty` as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loadable<U> {
        match self {
            Self::Pending => Loadable::Pending,
            Self::Empty => Loadable::Empty,
            Self::Populated(data) => Loadable::Populated(f(data)),
        }
    }
}

impl<T> Loadable<Vec<T>> {
    /// Classify a list answer: `None` is pending, an empty list is empty.
    #[must_use]
    pub fn from_list(list: Option<Vec<T>>) -> Self {
        match list {
            None => Self::Pending,
            Some(items) if items.is_empty() => Self::Empty,
            Some(items) => Self::Populated(items),
        }
    }

    /// Number of entries; zero unless populated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Loadable<serde_json::Value> {
    /// Classify a raw JSON answer.
    ///
    /// `null` is pending; an empty array or object is empty.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Self {
        match &value {
            serde_json::Value::Null => Self::Pending,
            serde_json::Value::Array(items) if items.is_empty() => Self::Empty,
            serde_json::Value::Object(fields) if fields.is_empty() => Self::Empty,
            _ => Self::Populated(value),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_list_distinguishes_pending_and_empty() {
        assert_eq!(Loadable::<Vec<u32>>::from_list(None), Loadable::Pending);
        assert_eq!(Loadable::<Vec<u32>>::from_list(Some(vec![])), Loadable::Empty);
        assert_eq!(
            Loadable::from_list(Some(vec![1, 2])),
            Loadable::Populated(vec![1, 2])
        );
    }

    #[test]
    fn test_from_json() {
        assert!(Loadable::from_json(serde_json::Value::Null).is_pending());
        assert_eq!(Loadable::from_json(json!([])), Loadable::Empty);
        assert_eq!(
            Loadable::from_json(json!({"total": 3})),
            Loadable::Populated(json!({"total": 3}))
        );
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(Loadable::Populated(vec![7])).unwrap();
        assert_eq!(value, json!({"state": "populated", "data": [7]}));

        let value = serde_json::to_value(Loadable::<Vec<u8>>::Empty).unwrap();
        assert_eq!(value, json!({"state": "empty"}));
    }

    #[test]
    fn test_len_is_zero_unless_populated() {
        assert_eq!(Loadable::<Vec<u8>>::Pending.len(), 0);
        assert_eq!(Loadable::Populated(vec![1, 2, 3]).len(), 3);
    }
}
