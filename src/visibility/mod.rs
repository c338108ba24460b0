use thiserror::Error;

use crate::bindings::{
    jsIsIntersectionObserverSupported, jsObserveVideo, jsStartObservation, jsStartScrollPolling,
    jsStopObservation, jsStopScrollPolling, JsResult, StartObservationErrorCode, VideoId,
};

/// Distance, in CSS pixels, by which the observed region extends below the
/// visual viewport.
///
/// Elements are activated (sources bound, load requested) as soon as they
/// enter this buffered region, well before they become truly visible.
pub(crate) const BUFFER_MARGIN: f64 = 500.;

/// Visibility fractions at which the observation must re-fire.
///
/// The `0.` entry makes the observer fire the instant the buffered region is
/// touched; the intermediate fractions make sure a fast scroll-through still
/// produces entries between two wide-apart samples.
pub(crate) const VISIBILITY_THRESHOLDS: [f64; 5] = [0., 0.25, 0.5, 0.75, 1.];

/// Vertical extent of an element's bounding rectangle, relative to the top of
/// the visual viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ElementBounds {
    /// Position of the element's top edge, in CSS pixels. Negative when the
    /// edge is above the viewport's top.
    pub(crate) top: f64,

    /// Position of the element's bottom edge, in CSS pixels.
    pub(crate) bottom: f64,
}

impl ElementBounds {
    pub(crate) fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Returns `true` if the element overlaps the true (unbuffered) viewport:
    /// its top edge is above the viewport's bottom edge and its bottom edge is
    /// below the viewport's top edge.
    pub(crate) fn overlaps_viewport(&self, viewport_height: f64) -> bool {
        self.top < viewport_height && self.bottom > 0.
    }

    /// Returns `true` if the element overlaps the viewport extended by
    /// `margin` below it.
    ///
    /// The margin is one-sided: only downward scrolling is pre-triggered,
    /// matching the observed region the native observer is configured with.
    pub(crate) fn overlaps_buffered_region(&self, viewport_height: f64, margin: f64) -> bool {
        self.top < viewport_height + margin && self.bottom > 0.
    }
}

/// A single visibility measure for one video, normalized so the rest of the
/// crate never needs to know which observation mode produced it.
///
/// Ephemeral: produced by one of the observation paths, consumed once by the
/// `Dispatcher`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct IntersectionSnapshot {
    pub(crate) video_id: VideoId,

    /// `true` if the element currently intersects the buffered region.
    pub(crate) is_intersecting: bool,

    /// Raw bounding rectangle data, kept so true-viewport overlap stays
    /// computable independently of `is_intersecting`.
    pub(crate) bounds: ElementBounds,

    /// Height of the visual viewport at measure time, in CSS pixels.
    pub(crate) viewport_height: f64,
}

impl IntersectionSnapshot {
    /// Build a snapshot from a native IntersectionObserver entry, whose
    /// `isIntersecting` bit already accounts for the buffered root margin.
    pub(crate) fn from_observer_entry(
        video_id: VideoId,
        is_intersecting: bool,
        bounds: ElementBounds,
        viewport_height: f64,
    ) -> Self {
        Self {
            video_id,
            is_intersecting,
            bounds,
            viewport_height,
        }
    }

    /// Build a snapshot from a raw scroll-polling measure.
    ///
    /// Without the native observer there is no ready-made intersection bit, so
    /// it is recomputed here from the same rectangle, against the same
    /// buffered region the observer would have used. Playback decisions keep
    /// going through `truly_visible` either way.
    pub(crate) fn from_scroll_sample(
        video_id: VideoId,
        bounds: ElementBounds,
        viewport_height: f64,
    ) -> Self {
        Self {
            video_id,
            is_intersecting: bounds.overlaps_buffered_region(viewport_height, BUFFER_MARGIN),
            bounds,
            viewport_height,
        }
    }

    /// Returns `true` if the element overlaps the true viewport, excluding the
    /// buffer margin. This is the bit gating play/pause.
    pub(crate) fn truly_visible(&self) -> bool {
        self.bounds.overlaps_viewport(self.viewport_height)
    }
}

/// Error that may be returned when starting an observation strategy.
#[derive(Error, Debug)]
pub(crate) enum ObservationSetupError {
    #[error("IntersectionObserver is not usable in this environment.")]
    ObserverUnsupported,
    #[error("Uncategorized error when starting visibility observation: {message}")]
    UnknownError { message: String },
}

impl From<(StartObservationErrorCode, Option<String>)> for ObservationSetupError {
    fn from(x: (StartObservationErrorCode, Option<String>)) -> Self {
        match x.0 {
            StartObservationErrorCode::ObserverUnsupported => {
                ObservationSetupError::ObserverUnsupported
            }
            StartObservationErrorCode::UnknownError => ObservationSetupError::UnknownError {
                message: x.1.unwrap_or_else(|| "Unknown Error.".to_string()),
            },
        }
    }
}

/// One of the two interchangeable ways of watching videos against the
/// viewport.
///
/// Both implementations feed the `Dispatcher` the same `IntersectionSnapshot`
/// contract; which one runs is decided once, at initialization, from
/// capability detection. Neither mutates element state: they only arrange for
/// snapshots to be produced.
pub(crate) trait ObservationStrategy {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Start producing visibility events for the given videos.
    fn start(&mut self, video_ids: &[VideoId]) -> Result<(), ObservationSetupError>;

    /// Stop producing visibility events and release what `start` set up.
    fn stop(&mut self);
}

/// Observation through the browser's IntersectionObserver, configured with the
/// buffered root margin and the threshold list.
pub(crate) struct NativeObserver {}

impl NativeObserver {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

impl ObservationStrategy for NativeObserver {
    fn name(&self) -> &'static str {
        "IntersectionObserver"
    }

    fn start(&mut self, video_ids: &[VideoId]) -> Result<(), ObservationSetupError> {
        jsStartObservation(BUFFER_MARGIN, VISIBILITY_THRESHOLDS.to_vec()).result()?;
        for video_id in video_ids {
            jsObserveVideo(*video_id);
        }
        Ok(())
    }

    fn stop(&mut self) {
        jsStopObservation();
    }
}

/// Degraded observation keyed off scroll events: the JavaScript-side measures
/// every registered video on each sample and the snapshots are synthesized
/// Rust-side through `IntersectionSnapshot::from_scroll_sample`.
pub(crate) struct ScrollPoller {}

impl ScrollPoller {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

impl ObservationStrategy for ScrollPoller {
    fn name(&self) -> &'static str {
        "scroll polling"
    }

    fn start(&mut self, _video_ids: &[VideoId]) -> Result<(), ObservationSetupError> {
        jsStartScrollPolling();
        Ok(())
    }

    fn stop(&mut self) {
        jsStopScrollPolling();
    }
}

/// Pick the observation strategy for this environment, once, at
/// initialization.
pub(crate) fn select_observation_strategy() -> Box<dyn ObservationStrategy> {
    if jsIsIntersectionObserverSupported() {
        Box::new(NativeObserver::new())
    } else {
        Box::new(ScrollPoller::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_viewport_overlap() {
        // Partially entered from below
        assert!(ElementBounds::new(500., 900.).overlaps_viewport(768.));
        // Fully inside
        assert!(ElementBounds::new(100., 400.).overlaps_viewport(768.));
        // Partially scrolled past, bottom still on screen
        assert!(ElementBounds::new(-200., 150.).overlaps_viewport(768.));
        // Fully below the viewport
        assert!(!ElementBounds::new(800., 1100.).overlaps_viewport(768.));
        // Fully above the viewport
        assert!(!ElementBounds::new(-500., -100.).overlaps_viewport(768.));
    }

    #[test]
    fn test_viewport_overlap_is_strict_at_the_edges() {
        // Top edge exactly on the viewport's bottom edge: not visible yet
        assert!(!ElementBounds::new(768., 1000.).overlaps_viewport(768.));
        // Bottom edge exactly on the viewport's top edge: not visible anymore
        assert!(!ElementBounds::new(-300., 0.).overlaps_viewport(768.));
        // One pixel in on either side flips the result
        assert!(ElementBounds::new(767., 1000.).overlaps_viewport(768.));
        assert!(ElementBounds::new(-300., 1.).overlaps_viewport(768.));
    }

    #[test]
    fn test_degenerate_viewport() {
        // A zero-height viewport can never truly show anything below it
        assert!(!ElementBounds::new(5., 10.).overlaps_viewport(0.));
        // An element straddling position 0 still counts as overlapping the
        // degenerate interval, as 1-D interval overlap dictates
        assert!(ElementBounds::new(-5., 5.).overlaps_viewport(0.));
    }

    #[test]
    fn test_buffered_region_overlap() {
        // 300px below the viewport's bottom: inside the 500px buffer
        let bounds = ElementBounds::new(768. + 300., 768. + 700.);
        assert!(bounds.overlaps_buffered_region(768., BUFFER_MARGIN));
        assert!(!bounds.overlaps_viewport(768.));

        // 600px below: outside the buffer
        let bounds = ElementBounds::new(768. + 600., 768. + 900.);
        assert!(!bounds.overlaps_buffered_region(768., BUFFER_MARGIN));

        // The margin is one-sided: an element fully above the viewport is
        // outside the buffered region no matter the margin
        let bounds = ElementBounds::new(-700., -300.);
        assert!(!bounds.overlaps_buffered_region(768., BUFFER_MARGIN));
    }

    #[test]
    fn test_scroll_sample_synthesis() {
        // In the buffer but not on screen: intersecting, not truly visible
        let snapshot =
            IntersectionSnapshot::from_scroll_sample(1, ElementBounds::new(900., 1300.), 768.);
        assert!(snapshot.is_intersecting);
        assert!(!snapshot.truly_visible());

        // On screen: both
        let snapshot =
            IntersectionSnapshot::from_scroll_sample(1, ElementBounds::new(200., 600.), 768.);
        assert!(snapshot.is_intersecting);
        assert!(snapshot.truly_visible());

        // Far below: neither
        let snapshot =
            IntersectionSnapshot::from_scroll_sample(1, ElementBounds::new(2000., 2400.), 768.);
        assert!(!snapshot.is_intersecting);
        assert!(!snapshot.truly_visible());
    }

    #[test]
    fn test_observer_entry_keeps_raw_rectangle() {
        // The observer's intersection bit accounts for the buffer, so a
        // pre-buffered entry must still report not-truly-visible from its raw
        // rectangle
        let snapshot = IntersectionSnapshot::from_observer_entry(
            3,
            true,
            ElementBounds::new(1000., 1400.),
            768.,
        );
        assert!(snapshot.is_intersecting);
        assert!(!snapshot.truly_visible());
    }
}
