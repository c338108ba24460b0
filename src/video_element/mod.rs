use crate::bindings::VideoId;

/// One alternate media resource of a managed video, still in its deferred
/// form: the URL has been read from the page's deferred-URL attribute but not
/// yet copied into the live one.
#[derive(Clone, Debug)]
pub(crate) struct DeferredSource {
    mime_type: String,
    deferred_url: String,
}

impl DeferredSource {
    pub(crate) fn new(mime_type: String, deferred_url: String) -> Self {
        Self {
            mime_type,
            deferred_url,
        }
    }

    pub(crate) fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub(crate) fn deferred_url(&self) -> &str {
        &self.deferred_url
    }
}

/// Last playback intent decided for an element.
///
/// Play requests settle asynchronously, so this, not the last command sent, is
/// the source of truth: whenever a pending play request resolves, it is
/// reconciled against this value and a corrective pause is issued if an exit
/// event changed the intent in the meantime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WantedPlayback {
    Playing,
    Paused,
}

/// Browser-facing action decided by the element's state machine.
///
/// The state machine itself never touches the page; the `Dispatcher` core
/// turns these into the corresponding JavaScript calls, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ElementAction {
    /// Copy every deferred URL into its live slot and request a media load.
    BindSources,

    /// Call the play primitive.
    RequestPlay,

    /// Call the pause primitive.
    RequestPause,
}

/// Structure linked to one managed HTMLVideoElement, owning the state the
/// activation logic needs about it:
///   - whether its deferred sources have been bound (`activated`)
///   - whether it currently overlaps the true viewport (`visible`)
///   - whether its entry mask has been removed (`revealed`)
///   - the last playback intent and whether a play request is in flight
///
/// The DOM node itself stays on the JavaScript-side, reachable through `id`.
pub(crate) struct VideoElementRef {
    id: VideoId,

    /// Deferred source descriptors, in page order.
    sources: Vec<DeferredSource>,

    /// `true` once the source swap and the load request have been emitted.
    /// Monotonic: never goes back to `false`, which is what guards against
    /// duplicate fetches when several entries arrive in a burst.
    activated: bool,

    /// `true` while the element overlaps the true (unbuffered) viewport.
    visible: bool,

    /// `true` while the element intersects the buffered region. Tracked so a
    /// pause is emitted once per exit, not once per outside sample.
    in_buffered_region: bool,

    /// `true` once the entry mask has been removed. Monotonic, like
    /// `activated`.
    revealed: bool,

    /// Last decided playback intent.
    wanted: WantedPlayback,

    /// `true` while a play request's promise has not settled yet.
    play_request_pending: bool,
}

impl VideoElementRef {
    pub(crate) fn new(id: VideoId) -> Self {
        Self {
            id,
            sources: vec![],
            activated: false,
            visible: false,
            in_buffered_region: false,
            revealed: false,
            wanted: WantedPlayback::Paused,
            play_request_pending: false,
        }
    }

    pub(crate) fn id(&self) -> VideoId {
        self.id
    }

    pub(crate) fn add_source(&mut self, source: DeferredSource) {
        self.sources.push(source);
    }

    pub(crate) fn sources(&self) -> &[DeferredSource] {
        &self.sources
    }

    pub(crate) fn activated(&self) -> bool {
        self.activated
    }

    pub(crate) fn visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn revealed(&self) -> bool {
        self.revealed
    }

    pub(crate) fn wanted(&self) -> WantedPlayback {
        self.wanted
    }

    pub(crate) fn play_request_pending(&self) -> bool {
        self.play_request_pending
    }

    /// Decide what to do about a new visibility measure for this element.
    ///
    /// `is_intersecting` is relative to the buffered region, `truly_visible`
    /// to the unbuffered viewport. Returned actions are to be applied in
    /// order.
    ///
    /// The decision only depends on the measure and on this element's own
    /// state, so measures for different elements can be processed in any
    /// order; measures for the same element must keep arrival order, as
    /// `activated` is monotonic.
    pub(crate) fn on_visibility(
        &mut self,
        is_intersecting: bool,
        truly_visible: bool,
    ) -> Vec<ElementAction> {
        let mut actions = vec![];
        if is_intersecting {
            self.in_buffered_region = true;

            // Entered the buffered region: bind sources now so the fetch is
            // underway before the element reaches the viewport. The
            // `activated` guard makes a second entry in the same burst a
            // no-op.
            if !self.activated {
                self.activated = true;
                actions.push(ElementAction::BindSources);
            }

            if truly_visible {
                self.visible = true;
                self.wanted = WantedPlayback::Playing;
                actions.push(ElementAction::RequestPlay);
            } else {
                // Pre-buffered but not on screen yet (or not anymore).
                self.visible = false;
                self.wanted = WantedPlayback::Paused;
                actions.push(ElementAction::RequestPause);
            }
        } else {
            let was_inside = self.in_buffered_region;
            self.in_buffered_region = false;
            self.visible = false;
            if self.activated && was_inside {
                // Left the buffered region entirely.
                self.wanted = WantedPlayback::Paused;
                actions.push(ElementAction::RequestPause);
            }
        }
        actions
    }

    /// Note that the play primitive has been called for this element.
    pub(crate) fn note_play_requested(&mut self) {
        self.play_request_pending = true;
    }

    /// A pending play request's promise fulfilled.
    ///
    /// If the intent changed to paused while the request was in flight, the
    /// browser is now playing an element we want paused: a corrective pause is
    /// returned so the late resolution cannot undo the intervening pause.
    pub(crate) fn on_play_resolved(&mut self) -> Option<ElementAction> {
        self.play_request_pending = false;
        if self.wanted == WantedPlayback::Paused {
            Some(ElementAction::RequestPause)
        } else {
            None
        }
    }

    /// A pending play request's promise rejected.
    ///
    /// Nothing to correct: the element stays activated and eligible for a
    /// later play request when it re-enters the viewport.
    pub(crate) fn on_play_rejected(&mut self) {
        self.play_request_pending = false;
    }

    /// Mark the element revealed.
    ///
    /// Returns `true` only on the first call, so the mask removal runs exactly
    /// once no matter how many triggers race for it.
    pub(crate) fn mark_revealed(&mut self) -> bool {
        if self.revealed {
            false
        } else {
            self.revealed = true;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entered_buffer(video: &mut VideoElementRef) -> Vec<ElementAction> {
        video.on_visibility(true, false)
    }

    fn entered_viewport(video: &mut VideoElementRef) -> Vec<ElementAction> {
        video.on_visibility(true, true)
    }

    fn left_buffer(video: &mut VideoElementRef) -> Vec<ElementAction> {
        video.on_visibility(false, false)
    }

    #[test]
    fn test_activation_happens_at_most_once() {
        let mut video = VideoElementRef::new(1);

        let first = entered_buffer(&mut video);
        assert_eq!(
            first,
            vec![ElementAction::BindSources, ElementAction::RequestPause]
        );
        assert!(video.activated());

        // Two rapid entries for a not-yet-activated element must produce a
        // single source swap: the second one only re-decides playback.
        let second = entered_buffer(&mut video);
        assert_eq!(second, vec![ElementAction::RequestPause]);
        assert!(video.activated());
    }

    #[test]
    fn test_never_intersecting_produces_no_actions() {
        let mut video = VideoElementRef::new(1);
        for _ in 0..3 {
            assert_eq!(left_buffer(&mut video), vec![]);
        }
        assert!(!video.activated());
        assert!(!video.visible());
    }

    #[test]
    fn test_play_never_requested_outside_true_viewport() {
        for is_intersecting in [true, false] {
            let mut video = VideoElementRef::new(1);
            let actions = video.on_visibility(is_intersecting, false);
            assert!(!actions.contains(&ElementAction::RequestPlay));
        }
    }

    #[test]
    fn test_buffered_entry_then_viewport_entry_then_exit() {
        let mut video = VideoElementRef::new(1);

        // Enters the 500px buffer: load starts, no play.
        let actions = entered_buffer(&mut video);
        assert!(actions.contains(&ElementAction::BindSources));
        assert!(!actions.contains(&ElementAction::RequestPlay));
        assert!(!video.visible());

        // Enters the true viewport: play.
        let actions = entered_viewport(&mut video);
        assert_eq!(actions, vec![ElementAction::RequestPlay]);
        assert!(video.visible());
        assert_eq!(video.wanted(), WantedPlayback::Playing);

        // Scrolls fully past the buffer: pause, activation is kept.
        let actions = left_buffer(&mut video);
        assert_eq!(actions, vec![ElementAction::RequestPause]);
        assert!(video.activated());
        assert!(!video.visible());
    }

    #[test]
    fn test_pause_emitted_once_per_exit() {
        let mut video = VideoElementRef::new(1);
        entered_viewport(&mut video);

        assert_eq!(left_buffer(&mut video), vec![ElementAction::RequestPause]);

        // Further outside samples (as the polling mode produces) are silent.
        assert_eq!(left_buffer(&mut video), vec![]);
        assert_eq!(left_buffer(&mut video), vec![]);

        // A new round trip pauses again.
        entered_viewport(&mut video);
        assert_eq!(left_buffer(&mut video), vec![ElementAction::RequestPause]);
    }

    #[test]
    fn test_buffered_but_not_visible_pauses_activated_element() {
        let mut video = VideoElementRef::new(1);
        entered_viewport(&mut video);

        // Still in the buffer, no longer on screen.
        let actions = entered_buffer(&mut video);
        assert_eq!(actions, vec![ElementAction::RequestPause]);
        assert!(video.activated());
    }

    #[test]
    fn test_rejected_play_keeps_element_eligible() {
        let mut video = VideoElementRef::new(1);
        entered_viewport(&mut video);
        video.note_play_requested();

        video.on_play_rejected();
        assert!(!video.play_request_pending());
        assert!(video.activated());

        // Re-entering the viewport asks for play again.
        left_buffer(&mut video);
        let actions = entered_viewport(&mut video);
        assert_eq!(actions, vec![ElementAction::RequestPlay]);
    }

    #[test]
    fn test_late_play_resolution_cannot_undo_a_pause() {
        let mut video = VideoElementRef::new(1);
        entered_viewport(&mut video);
        video.note_play_requested();

        // The element leaves while the play promise is still in flight.
        assert_eq!(left_buffer(&mut video), vec![ElementAction::RequestPause]);

        // When the promise finally fulfills, the stale outcome is reconciled
        // against the wanted state and corrected.
        assert_eq!(video.on_play_resolved(), Some(ElementAction::RequestPause));
        assert!(!video.play_request_pending());
    }

    #[test]
    fn test_play_resolution_with_unchanged_intent_needs_no_correction() {
        let mut video = VideoElementRef::new(1);
        entered_viewport(&mut video);
        video.note_play_requested();
        assert_eq!(video.on_play_resolved(), None);
    }

    #[test]
    fn test_reveal_is_exactly_once() {
        let mut video = VideoElementRef::new(1);
        assert!(video.mark_revealed());
        assert!(!video.mark_revealed());
        assert!(video.revealed());
    }

    #[test]
    fn test_sources_keep_page_order() {
        let mut video = VideoElementRef::new(1);
        video.add_source(DeferredSource::new(
            "video/webm".to_string(),
            "/media/clip.webm".to_string(),
        ));
        video.add_source(DeferredSource::new(
            "video/mp4".to_string(),
            "/media/clip.mp4".to_string(),
        ));
        let sources = video.sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].mime_type(), "video/webm");
        assert_eq!(sources[1].deferred_url(), "/media/clip.mp4");
    }
}
