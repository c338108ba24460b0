use crate::{
    bindings::VideoId,
    reveal::{RevealPolicy, RevealScheduler},
    utils::logger::LoggerLevel,
    video_element::{DeferredSource, VideoElementRef},
    wasm_bindgen, Logger,
};

use super::{ControllerState, Dispatcher};

/// Methods exposed to the JavaScript-side.
///
/// Note that these are not the only methods callable by JavaScript. There's
/// also "event_listeners" which as its name point at, should be called when particular
/// events happen. Such "event_listeners" are defined in its own file.
#[wasm_bindgen]
impl Dispatcher {
    /// Create a new `Dispatcher` with no video registered yet.
    ///
    /// The page bootstrap should register every marked video (and its deferred
    /// sources) before calling `initialize`.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Dispatcher {
            state: ControllerState::Idle,
            videos: vec![],
            observer: None,
            reveal: RevealScheduler::new(RevealPolicy::FailSafeTimeout),
        }
    }

    /// Register one video element carrying the lazy-video marker.
    ///
    /// Must happen before `initialize`; a duplicate id is ignored.
    pub fn register_video(&mut self, video_id: VideoId) {
        if self.state != ControllerState::Idle {
            Logger::warn("API: cannot register a video after initialization");
            return;
        }
        if self.videos.iter().any(|v| v.id() == video_id) {
            Logger::warn(&format!("API: video {video_id} registered twice, ignoring"));
            return;
        }
        self.videos.push(VideoElementRef::new(video_id));
    }

    /// Declare one deferred source of an already-registered video, in page
    /// order: its mime-type and the URL read from the deferred-URL attribute.
    pub fn add_video_source(&mut self, video_id: VideoId, mime_type: String, deferred_url: String) {
        if self.state != ControllerState::Idle {
            Logger::warn("API: cannot add a source after initialization");
            return;
        }
        match self.videos.iter_mut().find(|v| v.id() == video_id) {
            Some(video) => video.add_source(DeferredSource::new(mime_type, deferred_url)),
            None => Logger::warn(&format!("API: source for unregistered video {video_id}")),
        }
    }

    /// Choose whether a video may be revealed without a confirmed playback
    /// start. Only effective before `initialize`.
    pub fn set_reveal_policy(&mut self, policy: RevealPolicy) {
        if self.state != ControllerState::Idle {
            Logger::warn("API: cannot change the reveal policy after initialization");
            return;
        }
        self.reveal.set_policy(policy);
    }

    /// Update the level from which logs are forwarded to the console.
    pub fn set_logger_level(&mut self, level: LoggerLevel) {
        Logger::set_logger_level(level);
    }

    /// Start observing the registered videos, to call once the document-ready
    /// signal has fired.
    ///
    /// Calling it a second time is a silent no-op: the first initialization
    /// stays in charge.
    pub fn initialize(&mut self) {
        match self.state {
            ControllerState::Idle => self.initialize_core(),
            ControllerState::Running => Logger::info("API: already initialized, ignoring"),
            ControllerState::Disposed => Logger::warn("API: cannot initialize after disposal"),
        }
    }

    /// Stop observing, clear every pending timer and drop the per-video state.
    ///
    /// To call on page teardown. The `Dispatcher` cannot be re-initialized
    /// afterwards; the bootstrap creates a fresh one instead.
    pub fn dispose(&mut self) {
        if self.state == ControllerState::Running {
            self.dispose_core();
        } else {
            self.state = ControllerState::Disposed;
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dispatcher_is_idle_and_empty() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.state, ControllerState::Idle);
        assert!(dispatcher.videos.is_empty());
        assert!(dispatcher.observer.is_none());
        assert_eq!(dispatcher.reveal.policy(), RevealPolicy::FailSafeTimeout);
    }

    #[test]
    fn test_registration_attaches_sources_to_their_video() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_video(1);
        dispatcher.register_video(2);
        dispatcher.add_video_source(1, "video/mp4".to_string(), "/a.mp4".to_string());
        dispatcher.add_video_source(2, "video/webm".to_string(), "/b.webm".to_string());
        dispatcher.add_video_source(2, "video/mp4".to_string(), "/b.mp4".to_string());

        assert_eq!(dispatcher.videos.len(), 2);
        assert_eq!(dispatcher.videos[0].sources().len(), 1);
        assert_eq!(dispatcher.videos[1].sources().len(), 2);
        assert_eq!(dispatcher.videos[1].sources()[0].deferred_url(), "/b.webm");
    }

    #[test]
    fn test_reveal_policy_is_settable_while_idle() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.set_reveal_policy(RevealPolicy::OnPlaybackOnly);
        assert_eq!(dispatcher.reveal.policy(), RevealPolicy::OnPlaybackOnly);
    }
}
