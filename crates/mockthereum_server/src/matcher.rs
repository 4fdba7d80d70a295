use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::RecordedRequest;

/// A predicate over incoming requests.
///
/// All matchers of a rule must match for the rule to apply.
pub trait RequestMatcher: fmt::Debug + Send + Sync {
    /// Whether the request satisfies this matcher.
    fn matches(&self, request: &RecordedRequest) -> bool;
}

/// Matches requests whose JSON body contains the expected value.
///
/// Objects match when every expected key is present with a matching value;
/// additional keys are ignored. Arrays match positionally on the expected
/// prefix. Hex strings compare case-insensitively.
#[derive(Clone, Debug)]
pub struct JsonBodyFlexibleMatcher {
    expected: Value,
}

impl JsonBodyFlexibleMatcher {
    /// Constructs a new instance.
    pub fn new(expected: Value) -> Self {
        Self { expected }
    }

    /// The expected JSON subset.
    pub fn expected(&self) -> &Value {
        &self.expected
    }
}

impl RequestMatcher for JsonBodyFlexibleMatcher {
    fn matches(&self, request: &RecordedRequest) -> bool {
        request
            .json()
            .is_some_and(|actual| json_subset_matches(&self.expected, actual))
    }
}

type Predicate = dyn Fn(&RecordedRequest) -> bool + Send + Sync;

/// Matches requests using an arbitrary predicate.
#[derive(Clone)]
pub struct CallbackMatcher {
    description: String,
    predicate: Arc<Predicate>,
}

impl CallbackMatcher {
    /// Constructs a new instance. The description is only used for debug
    /// output.
    pub fn new(
        description: impl Into<String>,
        predicate: impl Fn(&RecordedRequest) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl fmt::Debug for CallbackMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackMatcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl RequestMatcher for CallbackMatcher {
    fn matches(&self, request: &RecordedRequest) -> bool {
        (self.predicate)(request)
    }
}

/// Whether `actual` contains `expected`, following the rules of
/// [`JsonBodyFlexibleMatcher`].
pub fn json_subset_matches(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => {
            expected.iter().all(|(key, expected)| {
                actual
                    .get(key)
                    .is_some_and(|actual| json_subset_matches(expected, actual))
            })
        }
        (Value::Array(expected), Value::Array(actual)) => {
            expected.len() <= actual.len()
                && expected
                    .iter()
                    .zip(actual)
                    .all(|(expected, actual)| json_subset_matches(expected, actual))
        }
        (Value::String(expected), Value::String(actual)) => {
            expected == actual
                || (is_hex(expected) && is_hex(actual) && expected.eq_ignore_ascii_case(actual))
        }
        (expected, actual) => expected == actual,
    }
}

fn is_hex(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|digits| digits.bytes().all(|byte| byte.is_ascii_hexdigit()))
}
