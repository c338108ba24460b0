use crate::wasm_bindgen;
use std::fmt;

/// # js_functions
///
/// This file lists all JavaScript functions that are callable from Rust as well as
/// struct and enumeration used by those functions.

#[wasm_bindgen]
extern "C" {
    // Log the given text in the JavaScript console, with the log level given.
    pub fn jsLog(log_level: LogLevel, log: &str);

    // Starts a timer for the number of milliseconds indicated by the `duration` argument.
    //
    // Once this timer has elapsed, and unless `jsClearTimer` has been called since with
    // the `TimerId` returned by this function, the `on_timer_ended` method of the
    // `Dispatcher` will be called with both the corresponding `TimerId` and `reason`,
    // which you can use on your side to better categorize timer categories.
    pub fn jsTimer(duration: f64, reason: TimerReason) -> TimerId;

    // Clear a timer started with `jsTimer`.
    pub fn jsClearTimer(id: TimerId);

    // Returns `true` if the `IntersectionObserver` API is usable in the current
    // environment.
    //
    // The `Dispatcher` relies on this to choose between native viewport
    // observation and the degraded scroll-polling mode.
    pub fn jsIsIntersectionObserverSupported() -> bool;

    // Create the IntersectionObserver instance all lazy videos will be observed
    // through.
    //
    // `buffer_margin` is the distance, in CSS pixels, by which the observed
    // region extends below the visual viewport (it translates to a one-sided
    // `rootMargin`). `thresholds` is the ordered list of visibility fractions
    // at which the observer must re-fire.
    //
    // Once created, each entry produced by the observer must be forwarded to
    // the `Dispatcher` through its `on_visibility_entry` method.
    //
    // This function performs the creation synchronously and may fail, see
    // `StartObservationResult` for more details on the return value.
    pub fn jsStartObservation(buffer_margin: f64, thresholds: Vec<f64>) -> StartObservationResult;

    // Start observing the video element behind `video_id` with the observer
    // previously created through `jsStartObservation`.
    pub fn jsObserveVideo(video_id: VideoId);

    // Disconnect the observer created through `jsStartObservation`, if one,
    // releasing every element observed through `jsObserveVideo`.
    pub fn jsStopObservation();

    // Begin the scroll-polling degraded mode: the JavaScript-side must measure
    // the bounding rectangle of every registered video on each scroll (and
    // resize) sample and forward each measure to the `Dispatcher` through its
    // `on_scroll_tick` method.
    //
    // Used when `jsIsIntersectionObserverSupported` returned `false` or when
    // `jsStartObservation` failed.
    pub fn jsStartScrollPolling();

    // Stop the scroll-polling mode started with `jsStartScrollPolling`.
    pub fn jsStopScrollPolling();

    // Copy `url` into the live URL attribute of the `source_index`th `<source>`
    // child of the video element behind `video_id`.
    //
    // This is the "source swap" half of an activation. It has no effect on the
    // media element until `jsLoadVideo` is called.
    pub fn jsUpdateSourceUrl(video_id: VideoId, source_index: u32, url: &str);

    // Call the media element's load primitive on the video behind `video_id`,
    // so the browser starts fetching the sources bound through
    // `jsUpdateSourceUrl`.
    pub fn jsLoadVideo(video_id: VideoId);

    // Call the media element's play primitive on the video behind `video_id`.
    //
    // The outcome is asynchronous: the JavaScript-side must call
    // `on_play_promise_resolved` on the `Dispatcher` once the returned promise
    // fulfills, or `on_play_promise_rejected` with a `PlaybackErrorCode` if it
    // rejects (autoplay policy, user gesture requirement, resource error...).
    // Both calls always happen asynchronously after the `jsPlayVideo` call.
    //
    // A rejection is an expected, recoverable event for the `Dispatcher`, not
    // something to surface to the page.
    pub fn jsPlayVideo(video_id: VideoId);

    // Call the media element's pause primitive on the video behind `video_id`.
    //
    // Unlike play, pausing is synchronous and cannot fail in a way the
    // `Dispatcher` cares about.
    pub fn jsPauseVideo(video_id: VideoId);

    // Remove the entry visual mask (the blur filter) from the video element
    // behind `video_id`, making it legible to the user.
    pub fn jsRevealVideo(video_id: VideoId);

    // Remove the now-irrelevant entry-transition style from the video element
    // behind `video_id`.
    //
    // Purely cosmetic cleanup, scheduled some time after the reveal itself so
    // it does not add rendering cost to it.
    pub fn jsClearVideoTransition(video_id: VideoId);
}

/// Trait allowing to convert "JavaScript Results" as exposed by the JavaScript functions into
/// `Result` structs more idiomatic to Rust.
pub(crate) trait JsResult<T, E> {
    fn result(self) -> Result<T, (E, Option<String>)>;
}

/// Errors that can arise when attempting to create the IntersectionObserver
/// through `jsStartObservation`.
#[wasm_bindgen]
pub enum StartObservationErrorCode {
    /// The `IntersectionObserver` constructor is missing or threw at creation
    /// time.
    ObserverUnsupported,

    /// The observer could not be created because of an unknown error.
    UnknownError,
}

/// Result of calling the `jsStartObservation` JavaScript function.
///
/// Creation of a `StartObservationResult` should only be performed by the JavaScript side
/// through the exposed static constructors.
#[wasm_bindgen]
pub struct StartObservationResult {
    error: Option<(StartObservationErrorCode, Option<String>)>,
}

#[wasm_bindgen]
impl StartObservationResult {
    /// Creates a `StartObservationResult` indicating success.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn success() -> Self {
        Self { error: None }
    }

    /// Creates a `StartObservationResult` indicating failure, with the corresponding
    /// error.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn error(err: StartObservationErrorCode, desc: Option<String>) -> Self {
        Self {
            error: Some((err, desc)),
        }
    }
}

impl JsResult<(), StartObservationErrorCode> for StartObservationResult {
    /// Basically unwrap and consume the `StartObservationResult`, converting it into a
    /// Result enum.
    fn result(self) -> Result<(), (StartObservationErrorCode, Option<String>)> {
        if let Some(err) = self.error {
            Err(err)
        } else {
            Ok(())
        }
    }
}

/// Reason for which a play request's promise was rejected by the browser.
///
/// Communicated by the JavaScript-side through the `on_play_promise_rejected`
/// method, from the rejection's DOMException name.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackErrorCode {
    /// The browser's autoplay policy (or a missing user gesture) blocked the
    /// play request.
    NotAllowed = 0,

    /// No bound source could be decoded or played.
    NotSupported = 1,

    /// The play request was interrupted, generally by a load or pause call
    /// arriving before it settled.
    Aborted = 2,

    /// Any other rejection.
    Unknown = 3,
}

impl fmt::Display for PlaybackErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PlaybackErrorCode::NotAllowed => "NotAllowedError",
                PlaybackErrorCode::NotSupported => "NotSupportedError",
                PlaybackErrorCode::Aborted => "AbortError",
                PlaybackErrorCode::Unknown => "UnknownError",
            }
        )
    }
}

/// "Reason" associated to a timer started by the Dispatcher.
///
/// This can then help to identify what the timer was for once resolved.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerReason {
    /// The timer is the fail-safe guarding against a video staying masked
    /// forever when playback never starts.
    RevealFailSafe = 0,

    /// The timer defers the cosmetic entry-transition cleanup performed after
    /// a reveal.
    TransitionCleanup = 1,
}

/// Levels with which a log can be emitted.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd)]
pub enum LogLevel {
    /// Log level reserved for very important errors and highly unexpected events.
    Error = 0,

    /// Log level reserved for less important errors and unexpected events.
    Warn = 1,

    /// Log level reserved for important events
    Info = 2,

    /// Log level used when debugging. Small-ish yet impactful events should be logged with it.
    Debug = 3,
}

/// Identify a video element registered on the JavaScript-side.
///
/// The JavaScript bootstrap allocates one per DOM node carrying the lazy-video
/// marker and keeps the id-to-node association for as long as the page lives.
pub type VideoId = u32;

/// Identify a pending timer.
pub type TimerId = f64;
