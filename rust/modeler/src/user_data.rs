// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed key-value side table attached to each placed mesh.
//!
//! User data never takes part in deduplication: two meshes sharing a geometry
//! can carry entirely different tables.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A typed value stored in a mesh's user data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UserValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<UserValue>),
}

impl UserValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            UserValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            UserValue::Double(v) => Some(*v),
            UserValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            UserValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for UserValue {
    fn from(v: bool) -> Self {
        UserValue::Bool(v)
    }
}

impl From<i64> for UserValue {
    fn from(v: i64) -> Self {
        UserValue::Int(v)
    }
}

impl From<f64> for UserValue {
    fn from(v: f64) -> Self {
        UserValue::Double(v)
    }
}

impl From<&str> for UserValue {
    fn from(v: &str) -> Self {
        UserValue::String(v.to_string())
    }
}

impl From<String> for UserValue {
    fn from(v: String) -> Self {
        UserValue::String(v)
    }
}

/// Per-mesh user data. Keys are unique; iteration order is unspecified.
pub type UserData = FxHashMap<String, UserValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(UserValue::from(42i64).as_int(), Some(42));
        assert_eq!(UserValue::from(1.5).as_double(), Some(1.5));
        assert_eq!(UserValue::from(2i64).as_double(), Some(2.0));
        assert_eq!(UserValue::from("node").as_str(), Some("node"));
        assert_eq!(UserValue::from(true), UserValue::Bool(true));
        assert_eq!(UserValue::from(true).as_int(), None);
    }

    #[test]
    fn last_write_wins() {
        let mut data = UserData::default();
        data.insert("node".to_string(), UserValue::Int(1));
        data.insert("node".to_string(), UserValue::Int(2));
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("node"), Some(&UserValue::Int(2)));
    }

    #[test]
    fn nested_list_round_trips_through_json() {
        let value = UserValue::List(vec![
            UserValue::Int(1),
            UserValue::Double(2.0),
            UserValue::String("three".to_string()),
            UserValue::List(vec![UserValue::Bool(false)]),
        ]);

        let json = serde_json::to_string(&value).unwrap();
        let back: UserValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
