//! Background music collaborator
//!
//! The loop only ever calls `play()`/`pause()` on an externally owned
//! handle. Decoding and loading belong to the host page.

use crate::error::Result;

/// Music handle driven at session start, pause and stop
pub trait AudioSink {
    /// Start or resume playback. Rejection (autoplay policy) is reported, never fatal.
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
}

/// Sink for headless runs and muted sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::HtmlAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::HtmlAudioElement;

    use super::AudioSink;
    use crate::error::{GameError, Result};

    /// `<audio>` element owned by the page
    pub struct HtmlAudio {
        element: HtmlAudioElement,
    }

    impl HtmlAudio {
        /// Look up the page's audio element by id
        pub fn from_element_id(id: &str) -> Result<Self> {
            let element = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(id))
                .ok_or_else(|| GameError::Audio(format!("no element #{id}")))?
                .dyn_into::<HtmlAudioElement>()
                .map_err(|_| GameError::Audio(format!("#{id} is not an audio element")))?;
            Ok(Self { element })
        }

        /// Volume in 0..1
        pub fn set_volume(&self, volume: f32) {
            self.element.set_volume(volume.clamp(0.0, 1.0) as f64);
        }
    }

    impl AudioSink for HtmlAudio {
        fn play(&mut self) -> Result<()> {
            let promise = self
                .element
                .play()
                .map_err(|e| GameError::Audio(format!("{e:?}")))?;
            // Autoplay rejection arrives asynchronously; log it and move on
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("Music playback rejected: {e:?}");
                }
            });
            Ok(())
        }

        fn pause(&mut self) {
            if let Err(e) = self.element.pause() {
                log::warn!("Failed to pause music: {e:?}");
            }
        }
    }
}
