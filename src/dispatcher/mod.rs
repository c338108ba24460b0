use crate::{
    reveal::RevealScheduler, video_element::VideoElementRef, visibility::ObservationStrategy,
    wasm_bindgen,
};

mod api;
mod core;
mod event_listeners;

pub use event_listeners::VisibilityEntry;

/// The `Dispatcher` is the interface exported to the JavaScript-side,
/// consuming the page's visibility and media events and deciding, for each
/// registered video, when to bind its deferred sources, play, pause, and drop
/// its entry mask.
#[wasm_bindgen]
pub struct Dispatcher {
    /// Current `ControllerState` the `Dispatcher` is in.
    state: ControllerState,

    /// State of every registered video, in registration order.
    ///
    /// Owned exclusively here: nothing else mutates an element's `activated`,
    /// `visible` or `revealed` flags.
    videos: Vec<VideoElementRef>,

    /// The observation strategy chosen at initialization.
    ///
    /// `None` before `initialize`, after `dispose`, and when even the degraded
    /// mode could not start, in which case the whole feature is a no-op.
    observer: Option<Box<dyn ObservationStrategy>>,

    /// Reveal policy and pending reveal-related timers.
    reveal: RevealScheduler,
}

/// Identify the lifecycle state the `Dispatcher` is in.
///
/// The page bootstrap owns a single init/dispose cycle; holding it as explicit
/// state is what makes a repeated `initialize` call a detectable no-op rather
/// than a second competing setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ControllerState {
    /// Videos can be registered; nothing is observed yet.
    Idle,

    /// `initialize` ran: visibility events are flowing and acted upon.
    Running,

    /// `dispose` ran: every event arriving from now on is ignored.
    Disposed,
}
