use crate::{
    bindings::{PlaybackErrorCode, TimerId, TimerReason, VideoId},
    dispatcher::Dispatcher,
    visibility::{ElementBounds, IntersectionSnapshot},
    wasm_bindgen,
};

/// Methods triggered on JavaScript events by the JavaScript code.
#[wasm_bindgen]
impl Dispatcher {
    /// The JS code should call this method for each entry produced by the
    /// IntersectionObserver created through `jsStartObservation`.
    ///
    /// Entries for different videos may arrive in any order; entries for the
    /// same video must keep the order the observer produced them in.
    pub fn on_visibility_entry(&mut self, entry: VisibilityEntry) {
        self.handle_snapshot(entry.snapshot());
    }

    /// The JS code should call this method for every video on each
    /// scroll-polling sample, when the degraded mode started with
    /// `jsStartScrollPolling` is in use.
    ///
    /// # Arguments
    ///
    /// * `video_id` - The measured video.
    ///
    /// * `top` / `bottom` - The video's bounding rectangle edges, in CSS
    ///   pixels relative to the top of the viewport.
    ///
    /// * `viewport_height` - Height of the visual viewport at measure time.
    pub fn on_scroll_tick(
        &mut self,
        video_id: VideoId,
        top: f64,
        bottom: f64,
        viewport_height: f64,
    ) {
        let snapshot = IntersectionSnapshot::from_scroll_sample(
            video_id,
            ElementBounds::new(top, bottom),
            viewport_height,
        );
        self.handle_snapshot(snapshot);
    }

    /// The JS code should call this method when the promise returned by a
    /// `jsPlayVideo` call fulfilled.
    pub fn on_play_promise_resolved(&mut self, video_id: VideoId) {
        self.on_play_outcome_resolved(video_id);
    }

    /// The JS code should call this method when the promise returned by a
    /// `jsPlayVideo` call rejected, with the `PlaybackErrorCode` matching the
    /// rejection's DOMException.
    ///
    /// Rejections are expected (autoplay policy, missing user gesture...) and
    /// absorbed: no error surfaces to the page.
    pub fn on_play_promise_rejected(&mut self, video_id: VideoId, code: PlaybackErrorCode) {
        self.on_play_outcome_rejected(video_id, code);
    }

    /// The JS code should call this method the first time the video behind
    /// `video_id` emits its `playing` event (a one-shot listener attached at
    /// registration).
    ///
    /// This, not the play call, is what proves playback observably began and
    /// allows the entry mask to drop.
    pub fn on_playback_started(&mut self, video_id: VideoId) {
        self.on_playback_started_core(video_id);
    }

    /// The JS code should call this method each time a timer started with the
    /// `jsTimer` function finished.
    ///
    /// # Arguments
    ///
    /// * `id` - The `TimerId` given by `jsTimer` when the timer was
    ///   started. This allows the `Dispatcher` to identify which timer
    ///   actually finished.
    ///
    /// * `reason` - The `TimerReason` given by the Rust code when that timer
    ///   was started. Using this supplementary attribute allows to better
    ///   discriminate between timers used for different purposes and thus
    ///   to simplify the logic handling a resolved timer.
    pub fn on_timer_ended(&mut self, id: TimerId, reason: TimerReason) {
        self.on_timer_ended_core(id, reason);
    }
}

/// One IntersectionObserver entry, as forwarded by the JavaScript-side.
///
/// `is_intersecting` is relative to the buffered region (the observer's root
/// margin); the raw rectangle edges come along so the true-viewport overlap
/// can be computed independently of it.
#[wasm_bindgen]
pub struct VisibilityEntry {
    video_id: VideoId,
    is_intersecting: bool,
    top: f64,
    bottom: f64,
    viewport_height: f64,
}

#[wasm_bindgen]
impl VisibilityEntry {
    #[wasm_bindgen(constructor)]
    pub fn new(
        video_id: VideoId,
        is_intersecting: bool,
        top: f64,
        bottom: f64,
        viewport_height: f64,
    ) -> Self {
        Self {
            video_id,
            is_intersecting,
            top,
            bottom,
            viewport_height,
        }
    }
}

impl VisibilityEntry {
    pub(crate) fn snapshot(&self) -> IntersectionSnapshot {
        IntersectionSnapshot::from_observer_entry(
            self.video_id,
            self.is_intersecting,
            ElementBounds::new(self.top, self.bottom),
            self.viewport_height,
        )
    }
}
