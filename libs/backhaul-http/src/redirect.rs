//! Redirect policy for the transport stacks.

use tower_http::follow_redirect::policy::{Action, Attempt, Policy};

/// Redirect hops followed before giving up and returning the response as-is.
pub const MAX_REDIRECTS: usize = 10;

/// Policy that follows every redirect, up to [`MAX_REDIRECTS`] hops.
///
/// Cross-origin hops and scheme changes are followed; the executor's contract
/// is "always follow", with no per-call opt-out. The request body is replayed
/// so 307/308 re-sends carry it. The redirect layer clones this policy per
/// request, so the hop counter never leaks between calls.
#[derive(Debug, Clone)]
pub struct FollowAll {
    remaining: usize,
}

impl FollowAll {
    #[must_use]
    pub fn new() -> Self {
        Self {
            remaining: MAX_REDIRECTS,
        }
    }

    fn next_action(&mut self) -> Action {
        if self.remaining == 0 {
            return Action::Stop;
        }
        self.remaining -= 1;
        Action::Follow
    }
}

impl Default for FollowAll {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, E> Policy<B, E> for FollowAll
where
    B: Clone,
{
    fn redirect(&mut self, _attempt: &Attempt<'_>) -> Result<Action, E> {
        Ok(self.next_action())
    }

    fn clone_body(&self, body: &B) -> Option<B> {
        Some(body.clone())
    }
}
