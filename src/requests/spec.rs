//! Request descriptions and response outcomes.

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{ActionCollection, EventContext, PlayerId};
use crate::tasks::TaskId;

/// Validator evaluated against the request context merged with a response.
pub type ValidatorFn<E> = dyn Fn(&E, &EventContext) -> bool;

/// Context key holding the responding player while a validator runs.
pub const RESPONDER_KEY: &str = "responder";

/// How many targeted players must answer before a request completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponsePolicy {
    /// The first accepted response completes the request.
    #[default]
    Any,
    /// Every target must give an accepted response.
    All,
}

/// Description of a player request.
///
/// ```
/// use std::time::Duration;
/// use ccg_sync::core::{EventContext, PlayerId};
/// use ccg_sync::requests::{RequestSpec, ResponsePolicy};
///
/// let spec: RequestSpec<()> = RequestSpec::new(
///         [PlayerId::new(1), PlayerId::new(2)],
///         EventContext::new("ChooseCard").with("cards", vec![1, 2, 3]),
///     )
///     .with_timeout(Duration::from_secs(3))
///     .with_validator(|_, ctx| {
///         let card = ctx.get_int_or("card", -1);
///         ctx.get_list("cards")
///             .is_some_and(|cards| cards.iter().any(|c| c.as_int() == Some(card)))
///     })
///     .require_all();
///
/// assert_eq!(spec.targets.len(), 2);
/// assert_eq!(spec.policy, ResponsePolicy::All);
/// ```
pub struct RequestSpec<E> {
    /// Players allowed to answer.
    pub targets: SmallVec<[PlayerId; 4]>,

    /// Any vs. all responders.
    pub policy: ResponsePolicy,

    /// Context of the request task. Responses are merged into it.
    pub context: EventContext,

    /// Countdown length. `None` uses the scheduler's default.
    pub timeout: Option<Duration>,

    /// Actions run when the countdown expires unanswered.
    pub timeout_actions: ActionCollection<E>,

    pub(crate) validator: Option<Rc<ValidatorFn<E>>>,
}

impl<E> RequestSpec<E> {
    /// Create a request addressed to `targets`.
    pub fn new(targets: impl IntoIterator<Item = PlayerId>, context: EventContext) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            policy: ResponsePolicy::Any,
            context,
            timeout: None,
            timeout_actions: ActionCollection::new(),
            validator: None,
        }
    }

    /// Create a request addressed to a single player.
    pub fn to(target: PlayerId, context: EventContext) -> Self {
        Self::new([target], context)
    }

    /// Set the countdown length (builder pattern).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the actions run on timeout (builder pattern).
    #[must_use]
    pub fn on_timeout(mut self, actions: impl Into<ActionCollection<E>>) -> Self {
        self.timeout_actions = actions.into();
        self
    }

    /// Set the response validator (builder pattern).
    ///
    /// The validator sees the request context merged with the response and
    /// with [`RESPONDER_KEY`] set to the responding player.
    #[must_use]
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&E, &EventContext) -> bool + 'static,
    {
        self.validator = Some(Rc::new(validator));
        self
    }

    /// Require every target to answer (builder pattern).
    #[must_use]
    pub fn require_all(mut self) -> Self {
        self.policy = ResponsePolicy::All;
        self
    }
}

/// Result of delivering a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseOutcome {
    /// The response completed the request; the task has finished.
    Accepted(TaskId),
    /// The response was accepted but other targets still have to answer.
    Waiting(TaskId),
    /// The validator refused the response; nothing was changed.
    Rejected(TaskId),
    /// No pending request awaits this responder.
    NoPendingRequest,
}

impl ResponseOutcome {
    /// The request task concerned, if any.
    #[must_use]
    pub fn task(&self) -> Option<TaskId> {
        match self {
            Self::Accepted(task) | Self::Waiting(task) | Self::Rejected(task) => Some(*task),
            Self::NoPendingRequest => None,
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}
