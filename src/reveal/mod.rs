use crate::bindings::{TimerId, VideoId};
use crate::wasm_bindgen;

/// Number of milliseconds after the first play request past which a video is
/// revealed even without a confirmed playback start, under the
/// `FailSafeTimeout` policy.
pub(crate) const REVEAL_FAIL_SAFE_TIMEOUT: f64 = 4000.;

/// Number of milliseconds between a reveal and the cosmetic removal of the
/// entry-transition style, so that removal does not add rendering cost to the
/// reveal itself.
pub(crate) const TRANSITION_CLEANUP_DELAY: f64 = 1000.;

/// Policy deciding whether a video may ever be revealed without an observed
/// playback start.
///
/// There is no single right answer here: `OnPlaybackOnly` never lies to the
/// user about playback, `FailSafeTimeout` never leaves an autoplay-blocked
/// video blurred forever. The default is `FailSafeTimeout`: a permanently
/// masked element is the worse failure, and a user can still start an already
/// legible video manually.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealPolicy {
    /// Keep the mask until the playback-started signal, however long that
    /// takes.
    OnPlaybackOnly = 0,

    /// Also reveal once `REVEAL_FAIL_SAFE_TIMEOUT` elapses after the first
    /// play request.
    FailSafeTimeout = 1,
}

/// Bookkeeping for mask removals: which fail-safe and cleanup timers are
/// pending for which video.
///
/// Timers themselves run on the JavaScript-side; the `Dispatcher` core starts
/// and clears them and reports their ids here. Whether the mask may actually
/// be removed for a given video is guarded by that video's `revealed` flag,
/// which stays with the element state.
pub(crate) struct RevealScheduler {
    policy: RevealPolicy,

    /// Pending fail-safe timers, at most one per video.
    fail_safe_timers: Vec<(TimerId, VideoId)>,

    /// Pending transition-cleanup timers, at most one per video.
    cleanup_timers: Vec<(TimerId, VideoId)>,
}

impl RevealScheduler {
    pub(crate) fn new(policy: RevealPolicy) -> Self {
        Self {
            policy,
            fail_safe_timers: vec![],
            cleanup_timers: vec![],
        }
    }

    pub(crate) fn policy(&self) -> RevealPolicy {
        self.policy
    }

    pub(crate) fn set_policy(&mut self, policy: RevealPolicy) {
        self.policy = policy;
    }

    /// Returns `true` if a fail-safe timer should be started for this video:
    /// the policy asks for one and none is pending yet. The timeout counts
    /// from the first play request, so an already-pending timer is never
    /// re-armed.
    pub(crate) fn should_arm_fail_safe(&self, video_id: VideoId) -> bool {
        self.policy == RevealPolicy::FailSafeTimeout
            && !self.fail_safe_timers.iter().any(|x| x.1 == video_id)
    }

    pub(crate) fn note_fail_safe_timer(&mut self, id: TimerId, video_id: VideoId) {
        self.fail_safe_timers.push((id, video_id));
    }

    /// Resolve an elapsed fail-safe timer to its video, forgetting it.
    ///
    /// `None` for timers cancelled or never armed, in which case the elapse is
    /// to be ignored.
    pub(crate) fn take_fail_safe(&mut self, id: TimerId) -> Option<VideoId> {
        let found = self.fail_safe_timers.iter().position(|x| x.0 == id)?;
        Some(self.fail_safe_timers.remove(found).1)
    }

    /// Forget the pending fail-safe timer of this video, if any, returning its
    /// id so it can be cleared. Called when the real playback-started signal
    /// wins the race.
    pub(crate) fn cancel_fail_safe(&mut self, video_id: VideoId) -> Option<TimerId> {
        let found = self.fail_safe_timers.iter().position(|x| x.1 == video_id)?;
        Some(self.fail_safe_timers.remove(found).0)
    }

    pub(crate) fn note_cleanup_timer(&mut self, id: TimerId, video_id: VideoId) {
        self.cleanup_timers.push((id, video_id));
    }

    /// Resolve an elapsed transition-cleanup timer to its video, forgetting
    /// it.
    pub(crate) fn take_cleanup(&mut self, id: TimerId) -> Option<VideoId> {
        let found = self.cleanup_timers.iter().position(|x| x.0 == id)?;
        Some(self.cleanup_timers.remove(found).1)
    }

    /// Forget every pending timer, returning their ids so they can all be
    /// cleared. Called on disposal.
    pub(crate) fn drain_timer_ids(&mut self) -> Vec<TimerId> {
        self.fail_safe_timers
            .drain(..)
            .chain(self.cleanup_timers.drain(..))
            .map(|x| x.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_safe_armed_only_under_the_fail_safe_policy() {
        let scheduler = RevealScheduler::new(RevealPolicy::OnPlaybackOnly);
        assert!(!scheduler.should_arm_fail_safe(1));

        let scheduler = RevealScheduler::new(RevealPolicy::FailSafeTimeout);
        assert!(scheduler.should_arm_fail_safe(1));
    }

    #[test]
    fn test_fail_safe_not_rearmed_while_pending() {
        let mut scheduler = RevealScheduler::new(RevealPolicy::FailSafeTimeout);
        scheduler.note_fail_safe_timer(10., 1);
        assert!(!scheduler.should_arm_fail_safe(1));
        // Other videos are unaffected
        assert!(scheduler.should_arm_fail_safe(2));
    }

    #[test]
    fn test_elapsed_fail_safe_resolves_once() {
        let mut scheduler = RevealScheduler::new(RevealPolicy::FailSafeTimeout);
        scheduler.note_fail_safe_timer(10., 1);
        assert_eq!(scheduler.take_fail_safe(10.), Some(1));
        assert_eq!(scheduler.take_fail_safe(10.), None);
    }

    #[test]
    fn test_cancelled_fail_safe_is_forgotten() {
        let mut scheduler = RevealScheduler::new(RevealPolicy::FailSafeTimeout);
        scheduler.note_fail_safe_timer(10., 1);

        // The playback-started signal wins the race: the timer is handed back
        // for clearing, and a later elapse of the same id is a no-op.
        assert_eq!(scheduler.cancel_fail_safe(1), Some(10.));
        assert_eq!(scheduler.take_fail_safe(10.), None);
        assert_eq!(scheduler.cancel_fail_safe(1), None);
    }

    #[test]
    fn test_cleanup_timers_resolve_to_their_video() {
        let mut scheduler = RevealScheduler::new(RevealPolicy::FailSafeTimeout);
        scheduler.note_cleanup_timer(20., 1);
        scheduler.note_cleanup_timer(21., 2);
        assert_eq!(scheduler.take_cleanup(21.), Some(2));
        assert_eq!(scheduler.take_cleanup(20.), Some(1));
        assert_eq!(scheduler.take_cleanup(20.), None);
    }

    #[test]
    fn test_drain_returns_every_pending_timer() {
        let mut scheduler = RevealScheduler::new(RevealPolicy::FailSafeTimeout);
        scheduler.note_fail_safe_timer(10., 1);
        scheduler.note_cleanup_timer(20., 2);
        let mut drained = scheduler.drain_timer_ids();
        drained.sort_by(f64::total_cmp);
        assert_eq!(drained, vec![10., 20.]);
        assert_eq!(scheduler.take_fail_safe(10.), None);
        assert_eq!(scheduler.take_cleanup(20.), None);
    }
}
