/// Pointer-lock status plumbing.
///
/// The platform reports one logical "lock status changed" notification
/// under several event names. Registration and removal both iterate
/// [`LOCK_CHANGE_EVENTS`], so a subscription can never leak a listener or
/// remove one it did not add.
use cfg_if::cfg_if;

/// Known names for the lock-change notification, standard first.
pub const LOCK_CHANGE_EVENTS: [&str; 3] = [
    "pointerlockchange",
    "mozpointerlockchange",
    "webkitpointerlockchange",
];

/// "Is some element currently holding the pointer lock?" The overlay
/// re-derives its flag from this on every notification instead of
/// tracking transitions.
pub trait LockProbe {
    fn lock_target_present(&self) -> bool;
}

/// Listener surface a subscription needs from the platform. The token
/// returned by `attach` is whatever the hub needs to detach that exact
/// listener again.
pub trait LockEventHub {
    type Token;
    fn attach(&self, event: &'static str) -> Self::Token;
    fn detach(&self, event: &'static str, token: Self::Token);
}

/// Exactly one listener per name in [`LOCK_CHANGE_EVENTS`], attached on
/// construction and detached symmetrically on drop. The overlay is mounted
/// once per session in normal operation, but hot-reload and forced
/// unmount still go through `Drop`, so cleanup has to be exact.
pub struct LockSubscription<H: LockEventHub> {
    hub: H,
    tokens: Vec<(&'static str, Option<H::Token>)>,
}

impl<H: LockEventHub> LockSubscription<H> {
    pub fn subscribe(hub: H) -> Self {
        let tokens = LOCK_CHANGE_EVENTS
            .iter()
            .map(|name| (*name, Some(hub.attach(name))))
            .collect();
        Self { hub, tokens }
    }
}

impl<H: LockEventHub> Drop for LockSubscription<H> {
    fn drop(&mut self) {
        // Walks the same (name, token) pairs recorded at registration, so
        // the two sides cannot diverge.
        for (name, token) in self.tokens.iter_mut() {
            if let Some(token) = token.take() {
                self.hub.detach(*name, token);
            }
        }
    }
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        use std::rc::Rc;
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::{JsCast, JsValue};
        use web_sys::Document;

        /// Vendor accessors checked in addition to the standard
        /// `pointerLockElement`. web-sys only binds the standard one, so
        /// the prefixed properties go through reflection.
        const VENDOR_LOCK_TARGET_PROPS: [&str; 2] =
            ["mozPointerLockElement", "webkitPointerLockElement"];

        pub struct DocumentLockProbe {
            document: Document,
        }

        impl DocumentLockProbe {
            pub fn new(document: Document) -> Self {
                Self { document }
            }
        }

        impl LockProbe for DocumentLockProbe {
            fn lock_target_present(&self) -> bool {
                if self.document.pointer_lock_element().is_some() {
                    return true;
                }
                VENDOR_LOCK_TARGET_PROPS.iter().any(|prop| {
                    js_sys::Reflect::get(self.document.as_ref(), &JsValue::from_str(prop))
                        .map(|v| !v.is_null() && !v.is_undefined())
                        .unwrap_or(false)
                })
            }
        }

        /// DOM-backed hub: every attached listener is non-capturing and
        /// forwards to the same notify callback.
        pub struct DomLockHub {
            document: Document,
            notify: Rc<dyn Fn()>,
        }

        impl DomLockHub {
            pub fn new(document: Document, notify: Rc<dyn Fn()>) -> Self {
                Self { document, notify }
            }
        }

        impl LockEventHub for DomLockHub {
            type Token = Closure<dyn FnMut(web_sys::Event)>;

            fn attach(&self, event: &'static str) -> Self::Token {
                let notify = self.notify.clone();
                let handler = Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    (*notify)();
                }) as Box<dyn FnMut(web_sys::Event)>);
                self.document
                    .add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
                    .expect("lock-change listener registration failed");
                handler
            }

            fn detach(&self, event: &'static str, token: Self::Token) {
                // Same event name, same (bubble) phase as attach. Dropping
                // the token releases the JS closure.
                let _ = self
                    .document
                    .remove_event_listener_with_callback(event, token.as_ref().unchecked_ref());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Hub that only counts active listeners per event name.
    #[derive(Clone, Default)]
    struct CountingHub {
        active: Rc<RefCell<HashMap<&'static str, i32>>>,
    }

    impl LockEventHub for CountingHub {
        type Token = &'static str;

        fn attach(&self, event: &'static str) -> Self::Token {
            *self.active.borrow_mut().entry(event).or_insert(0) += 1;
            event
        }

        fn detach(&self, event: &'static str, token: Self::Token) {
            assert_eq!(event, token, "detached under a different name than attached");
            *self.active.borrow_mut().entry(event).or_insert(0) -= 1;
        }
    }

    #[test]
    fn test_event_names_are_unique() {
        let mut names = LOCK_CHANGE_EVENTS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), LOCK_CHANGE_EVENTS.len());
    }

    #[test]
    fn test_subscribe_attaches_one_listener_per_event() {
        let hub = CountingHub::default();
        let sub = LockSubscription::subscribe(hub.clone());
        for name in LOCK_CHANGE_EVENTS {
            assert_eq!(hub.active.borrow().get(name), Some(&1), "{name}");
        }
        drop(sub);
        for name in LOCK_CHANGE_EVENTS {
            assert_eq!(hub.active.borrow().get(name), Some(&0), "{name} leaked");
        }
    }

    #[test]
    fn test_repeated_cycles_stay_balanced() {
        let hub = CountingHub::default();
        for _ in 0..3 {
            let sub = LockSubscription::subscribe(hub.clone());
            for name in LOCK_CHANGE_EVENTS {
                assert_eq!(hub.active.borrow().get(name), Some(&1), "{name} double-registered");
            }
            drop(sub);
        }
        for name in LOCK_CHANGE_EVENTS {
            assert_eq!(hub.active.borrow().get(name), Some(&0));
        }
    }
}
