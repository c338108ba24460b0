use super::{ControllerState, Dispatcher};
use crate::{
    bindings::{
        jsClearTimer, jsClearVideoTransition, jsLoadVideo, jsPauseVideo, jsPlayVideo,
        jsRevealVideo, jsTimer, jsUpdateSourceUrl, PlaybackErrorCode, TimerId, TimerReason,
        VideoId,
    },
    reveal::{REVEAL_FAIL_SAFE_TIMEOUT, TRANSITION_CLEANUP_DELAY},
    video_element::ElementAction,
    visibility::{select_observation_strategy, IntersectionSnapshot, ScrollPoller},
    Logger,
};

impl Dispatcher {
    /// Pick the observation strategy for this environment and start it on
    /// every registered video.
    pub(super) fn initialize_core(&mut self) {
        self.state = ControllerState::Running;
        let video_ids: Vec<VideoId> = self.videos.iter().map(|v| v.id()).collect();
        if video_ids.is_empty() {
            Logger::info("Core: no lazy video registered, nothing to observe");
            return;
        }

        let mut strategy = select_observation_strategy();
        if let Err(err) = strategy.start(&video_ids) {
            Logger::warn(&format!(
                "Core: could not start {}: {err}. Falling back to scroll polling",
                strategy.name()
            ));
            strategy = Box::new(ScrollPoller::new());
            if let Err(err) = strategy.start(&video_ids) {
                // No way left to observe anything: the feature degrades to a
                // no-op rather than failing the page.
                Logger::error(&format!("Core: visibility tracking unavailable: {err}"));
                return;
            }
        }
        Logger::info(&format!(
            "Core: observing {} videos through {}",
            video_ids.len(),
            strategy.name()
        ));
        self.observer = Some(strategy);
    }

    /// Stop observing and clear every pending timer.
    pub(super) fn dispose_core(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.stop();
        }
        for timer_id in self.reveal.drain_timer_ids() {
            jsClearTimer(timer_id);
        }
        self.videos.clear();
        self.state = ControllerState::Disposed;
        Logger::info("Core: disposed");
    }

    /// React to one visibility measure: let the element's state machine decide
    /// and apply whatever it returns, in order.
    pub(super) fn handle_snapshot(&mut self, snapshot: IntersectionSnapshot) {
        if self.state != ControllerState::Running {
            return;
        }
        match self.video_index(snapshot.video_id) {
            Some(idx) => {
                let truly_visible = snapshot.truly_visible();
                let actions = self.videos[idx].on_visibility(snapshot.is_intersecting, truly_visible);
                for action in actions {
                    self.apply_action(idx, action);
                }
            }
            None => Logger::warn(&format!(
                "Core: visibility event for unknown video {}",
                snapshot.video_id
            )),
        }
    }

    /// A play request's promise fulfilled. The element reconciles the outcome
    /// against its wanted state; a late fulfillment after an intervening exit
    /// comes back as a corrective pause.
    pub(super) fn on_play_outcome_resolved(&mut self, video_id: VideoId) {
        if let Some(idx) = self.video_index(video_id) {
            if let Some(action) = self.videos[idx].on_play_resolved() {
                Logger::debug(&format!(
                    "Core: play settled after an exit, re-pausing video {video_id}"
                ));
                self.apply_action(idx, action);
            }
        }
    }

    /// A play request's promise rejected. Expected under autoplay policies:
    /// absorbed here, never propagated.
    pub(super) fn on_play_outcome_rejected(&mut self, video_id: VideoId, code: PlaybackErrorCode) {
        Logger::info(&format!(
            "Core: play request rejected for video {video_id} ({code})"
        ));
        if let Some(idx) = self.video_index(video_id) {
            self.videos[idx].on_play_rejected();
        }
    }

    /// The one-shot playback-started signal fired: reveal the element, cancel
    /// its fail-safe timer if one is racing, and schedule the cosmetic
    /// cleanup.
    pub(super) fn on_playback_started_core(&mut self, video_id: VideoId) {
        if self.state != ControllerState::Running {
            return;
        }
        if let Some(idx) = self.video_index(video_id) {
            if self.videos[idx].mark_revealed() {
                Logger::debug(&format!("Core: playback started, revealing video {video_id}"));
                jsRevealVideo(video_id);
                if let Some(timer_id) = self.reveal.cancel_fail_safe(video_id) {
                    jsClearTimer(timer_id);
                }
                self.schedule_transition_cleanup(video_id);
            }
        }
    }

    /// Method to call once a timer started with the jsTimer JavaScript
    /// function has finished, with the corresponding `TimerId` as argument.
    pub(super) fn on_timer_ended_core(&mut self, id: TimerId, reason: TimerReason) {
        match reason {
            TimerReason::RevealFailSafe => self.on_reveal_fail_safe_elapsed(id),
            TimerReason::TransitionCleanup => self.on_transition_cleanup_elapsed(id),
        }
    }

    fn apply_action(&mut self, idx: usize, action: ElementAction) {
        match action {
            ElementAction::BindSources => self.bind_sources(idx),
            ElementAction::RequestPlay => self.request_play(idx),
            ElementAction::RequestPause => self.request_pause(idx),
        }
    }

    /// Perform the one-time source swap: copy each deferred URL into its live
    /// slot, then ask the browser to load. The element's `activated` guard
    /// already made sure this runs at most once.
    fn bind_sources(&mut self, idx: usize) {
        let video = &self.videos[idx];
        let video_id = video.id();
        if video.sources().is_empty() {
            Logger::warn(&format!("Core: video {video_id} has no deferred source"));
        }
        for (source_index, source) in video.sources().iter().enumerate() {
            Logger::debug(&format!(
                "Core: binding {} source {} on video {video_id}",
                source.mime_type(),
                source.deferred_url()
            ));
            jsUpdateSourceUrl(video_id, source_index as u32, source.deferred_url());
        }
        jsLoadVideo(video_id);
        Logger::info(&format!("Core: video {video_id} activated"));
    }

    fn request_play(&mut self, idx: usize) {
        self.videos[idx].note_play_requested();
        let video_id = self.videos[idx].id();
        let revealed = self.videos[idx].revealed();
        jsPlayVideo(video_id);
        if !revealed && self.reveal.should_arm_fail_safe(video_id) {
            let timer_id = jsTimer(REVEAL_FAIL_SAFE_TIMEOUT, TimerReason::RevealFailSafe);
            self.reveal.note_fail_safe_timer(timer_id, video_id);
        }
    }

    fn request_pause(&mut self, idx: usize) {
        let video = &self.videos[idx];
        // Pausing a non-activated element is a no-op, not an error.
        if video.activated() {
            jsPauseVideo(video.id());
        }
    }

    /// A fail-safe timer elapsed: playback never visibly started, reveal the
    /// element anyway per the `FailSafeTimeout` policy.
    fn on_reveal_fail_safe_elapsed(&mut self, id: TimerId) {
        if let Some(video_id) = self.reveal.take_fail_safe(id) {
            if let Some(idx) = self.video_index(video_id) {
                if self.videos[idx].mark_revealed() {
                    Logger::warn(&format!(
                        "Core: no playback-started signal for video {video_id}, revealing anyway"
                    ));
                    jsRevealVideo(video_id);
                    self.schedule_transition_cleanup(video_id);
                }
            }
        }
    }

    fn on_transition_cleanup_elapsed(&mut self, id: TimerId) {
        if let Some(video_id) = self.reveal.take_cleanup(id) {
            jsClearVideoTransition(video_id);
        }
    }

    fn schedule_transition_cleanup(&mut self, video_id: VideoId) {
        let timer_id = jsTimer(TRANSITION_CLEANUP_DELAY, TimerReason::TransitionCleanup);
        self.reveal.note_cleanup_timer(timer_id, video_id);
    }

    fn video_index(&self, video_id: VideoId) -> Option<usize> {
        self.videos.iter().position(|v| v.id() == video_id)
    }
}
