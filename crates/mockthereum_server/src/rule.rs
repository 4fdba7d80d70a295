use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::{RecordedRequest, RequestHandler, RequestMatcher};

/// Ordering of rules. Rules of a higher priority are evaluated first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RulePriority {
    /// Only applies when no [`RulePriority::Normal`] rule matches.
    Fallback,
    /// Explicitly declared rules.
    #[default]
    Normal,
}

/// A request rule: matchers, a handler and a priority.
///
/// A rule without matchers matches every request.
#[derive(Clone, Debug)]
pub struct RequestRule {
    matchers: Vec<Arc<dyn RequestMatcher>>,
    handler: RequestHandler,
    priority: RulePriority,
}

impl RequestRule {
    /// Constructs a rule with the provided handler, no matchers and
    /// [`RulePriority::Normal`].
    pub fn new(handler: impl Into<RequestHandler>) -> Self {
        Self {
            matchers: Vec::new(),
            handler: handler.into(),
            priority: RulePriority::Normal,
        }
    }

    /// Adds a matcher.
    pub fn with_matcher(mut self, matcher: impl RequestMatcher + 'static) -> Self {
        self.matchers.push(Arc::new(matcher));
        self
    }

    /// Adds shared matchers.
    pub fn with_matchers(
        mut self,
        matchers: impl IntoIterator<Item = Arc<dyn RequestMatcher>>,
    ) -> Self {
        self.matchers.extend(matchers);
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: RulePriority) -> Self {
        self.priority = priority;
        self
    }

    /// The handler.
    pub fn handler(&self) -> &RequestHandler {
        &self.handler
    }

    /// The priority.
    pub fn priority(&self) -> RulePriority {
        self.priority
    }

    /// Whether every matcher matches the request.
    pub fn matches(&self, request: &RecordedRequest) -> bool {
        self.matchers.iter().all(|matcher| matcher.matches(request))
    }
}

/// Handle to a registered rule, giving access to the requests it handled.
#[derive(Clone, Debug)]
pub struct MockedEndpoint {
    id: Uuid,
    seen_requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockedEndpoint {
    pub(crate) fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            seen_requests: Arc::default(),
        }
    }

    /// Unique identifier of the endpoint.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The requests handled by the rule, in arrival order.
    pub fn seen_requests(&self) -> Vec<RecordedRequest> {
        self.seen_requests.lock().clone()
    }

    pub(crate) fn record(&self, request: RecordedRequest) {
        self.seen_requests.lock().push(request);
    }
}
