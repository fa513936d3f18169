//! # State Accessors
//!
//! The four callbacks the runner needs from the surrounding declarative
//! framework, plus [`TrackedState`], an in-memory implementation.

use crate::context::OpContext;
use crate::diagnostics::Diagnostics;

/// Plan/state plumbing consumed by [`CrudRunner`](crate::CrudRunner).
///
/// `get_plan` and `get_state` fill a freshly zeroed record; any error they
/// return aborts the operation before a remote call is made.
pub trait StateAccess<S>: Send {
    fn get_plan(&mut self, ctx: &OpContext, state: &mut S) -> Diagnostics;
    fn get_state(&mut self, ctx: &OpContext, state: &mut S) -> Diagnostics;
    fn set_state(&mut self, ctx: &OpContext, state: &S) -> Diagnostics;
    /// Drops the record from tracked state.
    fn remove(&mut self, ctx: &OpContext);
}

/// Planned and tracked record for one resource instance, held in memory.
#[derive(Debug, Clone, Default)]
pub struct TrackedState<S> {
    plan: Option<S>,
    tracked: Option<S>,
}

impl<S: Clone> TrackedState<S> {
    pub fn new() -> Self {
        Self {
            plan: None,
            tracked: None,
        }
    }

    pub fn with_plan(plan: S) -> Self {
        Self {
            plan: Some(plan),
            tracked: None,
        }
    }

    pub fn with_tracked(tracked: S) -> Self {
        Self {
            plan: None,
            tracked: Some(tracked),
        }
    }

    pub fn set_plan(&mut self, plan: S) {
        self.plan = Some(plan);
    }

    pub fn tracked(&self) -> Option<&S> {
        self.tracked.as_ref()
    }

    pub fn into_tracked(self) -> Option<S> {
        self.tracked
    }
}

impl<S: Clone + Send> StateAccess<S> for TrackedState<S> {
    fn get_plan(&mut self, _ctx: &OpContext, state: &mut S) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match &self.plan {
            Some(plan) => *state = plan.clone(),
            None => diags.add_error("missing plan", "no planned values were supplied"),
        }
        diags
    }

    fn get_state(&mut self, _ctx: &OpContext, state: &mut S) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match &self.tracked {
            Some(tracked) => *state = tracked.clone(),
            None => diags.add_error("missing state", "the resource is not tracked"),
        }
        diags
    }

    fn set_state(&mut self, _ctx: &OpContext, state: &S) -> Diagnostics {
        self.tracked = Some(state.clone());
        Diagnostics::new()
    }

    fn remove(&mut self, _ctx: &OpContext) {
        self.tracked = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_state_round_trip() {
        let ctx = OpContext::new();
        let mut access = TrackedState::with_plan("planned".to_string());

        let mut state = String::new();
        assert!(access.get_plan(&ctx, &mut state).is_empty());
        assert_eq!(state, "planned");

        assert!(access.get_state(&ctx, &mut state).has_error());

        access.set_state(&ctx, &"applied".to_string());
        assert_eq!(access.tracked().map(String::as_str), Some("applied"));

        access.remove(&ctx);
        assert!(access.tracked().is_none());
    }
}
