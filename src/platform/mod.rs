//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Key/value storage (LocalStorage on web, in-memory natively)
//! - Animation-frame scheduling with explicit cancellation
//! - Idle-time callbacks (with a timer fallback)
//! - DOM event listeners that detach as a group

use std::collections::HashMap;

use crate::error::Result;

/// Minimal string key/value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Store backed by a map. Used natively and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Default store for the current target
pub fn default_store() -> Box<dyn KeyValueStore> {
    #[cfg(target_arch = "wasm32")]
    {
        match web::LocalStore::open() {
            Ok(store) => return Box::new(store),
            Err(e) => log::warn!("LocalStorage unavailable, scores will not persist: {e}"),
        }
    }
    Box::new(MemoryStore::default())
}

#[cfg(target_arch = "wasm32")]
pub use web::{EventListeners, FrameScheduler, LocalStore, request_idle};

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use super::KeyValueStore;
    use crate::error::{GameError, Result};

    fn js_err(e: JsValue) -> GameError {
        GameError::Storage(format!("{e:?}"))
    }

    /// `window.localStorage`
    pub struct LocalStore {
        storage: web_sys::Storage,
    }

    impl LocalStore {
        pub fn open() -> Result<Self> {
            let storage = web_sys::window()
                .ok_or_else(|| GameError::Storage("no window".into()))?
                .local_storage()
                .map_err(js_err)?
                .ok_or_else(|| GameError::Storage("localStorage disabled".into()))?;
            Ok(Self { storage })
        }
    }

    impl KeyValueStore for LocalStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.storage.get_item(key).map_err(js_err)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.storage.set_item(key, value).map_err(js_err)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.storage.remove_item(key).map_err(js_err)
        }
    }

    type FrameCallback = Closure<dyn FnMut(f64)>;

    /// Self-rescheduling `requestAnimationFrame` chain.
    ///
    /// The frame closure returns whether to keep going. `cancel` clears the
    /// running flag and cancels the pending request, so no callback fires
    /// after a session is torn down.
    pub struct FrameScheduler {
        running: Rc<Cell<bool>>,
        pending: Rc<Cell<Option<i32>>>,
        callback: Rc<RefCell<Option<FrameCallback>>>,
    }

    impl Default for FrameScheduler {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FrameScheduler {
        pub fn new() -> Self {
            Self {
                running: Rc::new(Cell::new(false)),
                pending: Rc::new(Cell::new(None)),
                callback: Rc::new(RefCell::new(None)),
            }
        }

        pub fn is_running(&self) -> bool {
            self.running.get()
        }

        /// Start calling `frame(now_ms)` every animation frame until it returns false
        pub fn start(&self, mut frame: impl FnMut(f64) -> bool + 'static) {
            self.cancel();
            self.running.set(true);

            let running = self.running.clone();
            let pending = self.pending.clone();
            let slot = self.callback.clone();
            let closure = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
                pending.set(None);
                if !running.get() {
                    return;
                }
                if !frame(now) {
                    running.set(false);
                    return;
                }
                if let Some(cb) = slot.borrow().as_ref() {
                    pending.set(request_frame(cb));
                }
            });
            self.pending.set(request_frame(&closure));
            *self.callback.borrow_mut() = Some(closure);
        }

        /// Stop the chain and cancel any outstanding request. Idempotent.
        pub fn cancel(&self) {
            self.running.set(false);
            if let Some(id) = self.pending.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
        }
    }

    impl Drop for FrameScheduler {
        fn drop(&mut self) {
            self.cancel();
            // Break the closure's self reference
            self.callback.borrow_mut().take();
        }
    }

    type EventCallback = Closure<dyn FnMut(web_sys::Event)>;

    /// DOM listeners owned by the host instead of leaked, so a session can
    /// remove every one of them on teardown.
    #[derive(Default)]
    pub struct EventListeners {
        attached: RefCell<Vec<(web_sys::EventTarget, &'static str, EventCallback)>>,
    }

    impl EventListeners {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_empty(&self) -> bool {
            self.attached.borrow().is_empty()
        }

        pub fn attach(
            &self,
            target: &web_sys::EventTarget,
            event: &'static str,
            handler: impl FnMut(web_sys::Event) + 'static,
        ) {
            let closure = EventCallback::new(handler);
            match target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
                Ok(()) => self
                    .attached
                    .borrow_mut()
                    .push((target.clone(), event, closure)),
                Err(e) => log::warn!("Failed to attach {event} listener: {e:?}"),
            }
        }

        /// Remove every listener. Idempotent; returns how many were removed.
        pub fn detach_all(&self) -> usize {
            let attached = std::mem::take(&mut *self.attached.borrow_mut());
            let count = attached.len();
            for (target, event, closure) in attached {
                if let Err(e) =
                    target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
                {
                    log::warn!("Failed to detach {event} listener: {e:?}");
                }
            }
            count
        }
    }

    impl Drop for EventListeners {
        fn drop(&mut self) {
            self.detach_all();
        }
    }

    fn request_frame(cb: &FrameCallback) -> Option<i32> {
        let window = web_sys::window()?;
        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {e:?}");
                None
            }
        }
    }

    /// Run `work` when the browser is idle, or after a short timeout where
    /// `requestIdleCallback` is missing.
    pub fn request_idle(work: impl FnOnce() + 'static) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::once_into_js(work);
        let idle = js_sys::Reflect::get(&window, &JsValue::from_str("requestIdleCallback"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        let scheduled = match idle {
            Some(func) => func.call1(&window, &callback).is_ok(),
            None => false,
        };
        if !scheduled {
            let func: &js_sys::Function = callback.unchecked_ref();
            if let Err(e) =
                window.set_timeout_with_callback_and_timeout_and_arguments_0(func, 1_000)
            {
                log::warn!("Idle fallback timer failed: {e:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::default();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "42").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("42"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
