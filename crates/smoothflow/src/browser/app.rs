//! WASM host entry point.
//!
//! ```javascript
//! import init, { SmoothReflow } from './smoothflow.js';
//!
//! await init();
//! const reflow = new SmoothReflow('#app');
//! reflow.registerElement('{"element": ".list"}');
//! reflow.registerElementRef(document.querySelector('.card'), '{"property": "transform"}');
//! reflow.mounted();
//!
//! reflow.beforeUpdate();
//! renderList();
//! await reflow.updated();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use smoothflow_core::{ElementRef, ReflowError, ReflowOrchestrator};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{window, AddEventListenerOptions, Element, TransitionEvent};

use super::dom::DomSurface;
use super::events::transition_end_to_signal;
use crate::manifest::ReflowManifest;

const TRANSITION_END: &str = "transitionend";

struct Host {
    surface: DomSurface,
    orchestrator: ReflowOrchestrator<Element>,
}

/// Smooth reflow for one host root element.
#[wasm_bindgen]
pub struct SmoothReflow {
    root: Element,
    host: Rc<RefCell<Host>>,
    transitionend_callback: Option<Closure<dyn FnMut(TransitionEvent)>>,
}

#[wasm_bindgen]
impl SmoothReflow {
    /// Create a host bound to the element matching `root_selector`.
    #[wasm_bindgen(constructor)]
    pub fn new(root_selector: &str) -> Result<SmoothReflow, JsValue> {
        console_error_panic_hook::set_once();

        let document = window()
            .ok_or("No window")?
            .document()
            .ok_or("No document")?;
        let root = document
            .query_selector(root_selector)?
            .ok_or_else(|| format!("Root '{root_selector}' not found"))?;
        let surface = DomSurface::new().ok_or("No window")?;

        Ok(Self {
            host: Rc::new(RefCell::new(Host {
                surface,
                orchestrator: ReflowOrchestrator::with_root(root.clone()),
            })),
            root,
            transitionend_callback: None,
        })
    }

    /// Track one element or a list of elements described as JSON manifests.
    #[wasm_bindgen(js_name = registerElement)]
    pub fn register_element(&self, json: &str) -> Result<(), JsValue> {
        let options = ReflowManifest::list_from_json(json)
            .and_then(|entries| {
                entries
                    .into_iter()
                    .map(ReflowManifest::into_options)
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(to_js)?;
        self.host
            .borrow_mut()
            .orchestrator
            .register_all(options)
            .map_err(to_js)
    }

    /// Stop tracking one element or a list of elements. Only the `element`
    /// key of each manifest is used.
    #[wasm_bindgen(js_name = unregisterElement)]
    pub fn unregister_element(&self, json: &str) -> Result<(), JsValue> {
        let elements: Vec<ElementRef<Element>> = ReflowManifest::list_from_json(json)
            .map_err(to_js)?
            .into_iter()
            .map(|entry| entry.element.map_or(ElementRef::Root, ElementRef::Selector))
            .collect();
        let mut host = self.host.borrow_mut();
        let Host {
            surface,
            orchestrator,
        } = &mut *host;
        orchestrator.unregister_all(&*surface, &elements).map_err(to_js)
    }

    /// Track `element` directly. `json` may hold one manifest entry without
    /// an `element` key; omitted, the defaults apply.
    #[wasm_bindgen(js_name = registerElementRef)]
    pub fn register_element_ref(
        &self,
        element: Element,
        json: Option<String>,
    ) -> Result<(), JsValue> {
        let entry = match json.as_deref() {
            Some(json) => ReflowManifest::from_json(json).map_err(to_js)?,
            None => ReflowManifest::default(),
        };
        let options = entry.into_options_for(element).map_err(to_js)?;
        self.host
            .borrow_mut()
            .orchestrator
            .register(options)
            .map_err(to_js)
    }

    /// Stop tracking an element registered by reference or by a selector
    /// that resolves to it.
    #[wasm_bindgen(js_name = unregisterElementRef)]
    pub fn unregister_element_ref(&self, element: Element) -> Result<(), JsValue> {
        let mut host = self.host.borrow_mut();
        let Host {
            surface,
            orchestrator,
        } = &mut *host;
        orchestrator
            .unregister(&*surface, &ElementRef::Node(element))
            .map_err(to_js)
    }

    /// Listen for `transitionend` on the root.
    pub fn mounted(&mut self) -> Result<(), JsValue> {
        if self.transitionend_callback.is_some() {
            return Ok(());
        }

        let host = Rc::clone(&self.host);
        let cb = Closure::new(move |e: TransitionEvent| {
            let Some(signal) = transition_end_to_signal(&e) else {
                return;
            };
            // Skip signals dispatched while a phase is running.
            let Ok(mut host) = host.try_borrow_mut() else {
                return;
            };
            let Host {
                surface,
                orchestrator,
            } = &mut *host;
            orchestrator.on_completion(surface, &signal);
        });

        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        self.root
            .add_event_listener_with_callback_and_add_event_listener_options(
                TRANSITION_END,
                cb.as_ref().unchecked_ref(),
                &options,
            )?;
        self.host
            .borrow_mut()
            .orchestrator
            .attach_listener(self.root.clone());
        self.transitionend_callback = Some(cb);
        Ok(())
    }

    /// Remove the `transitionend` listener. Registrations are kept.
    pub fn destroyed(&mut self) {
        if let Some(cb) = self.transitionend_callback.take() {
            self.root
                .remove_event_listener_with_callback(TRANSITION_END, cb.as_ref().unchecked_ref())
                .ok();
        }
        self.host.borrow_mut().orchestrator.detach_listener();
    }

    /// Call before the host mutates its DOM.
    #[wasm_bindgen(js_name = beforeUpdate)]
    pub fn before_update(&self) {
        let mut host = self.host.borrow_mut();
        let Host {
            surface,
            orchestrator,
        } = &mut *host;
        orchestrator.before_phase(surface);
    }

    /// Call after the host mutated its DOM. Resolves with the number of
    /// transitions started, one microtask later.
    pub fn updated(&self) -> js_sys::Promise {
        let host = Rc::clone(&self.host);
        future_to_promise(async move {
            JsFuture::from(js_sys::Promise::resolve(&JsValue::UNDEFINED)).await?;
            let mut host = host.borrow_mut();
            let Host {
                surface,
                orchestrator,
            } = &mut *host;
            let started = orchestrator.after_phase(surface);
            Ok(JsValue::from(started as u32))
        })
    }

    /// Number of tracked elements.
    #[wasm_bindgen(getter)]
    pub fn tracked(&self) -> usize {
        self.host.borrow().orchestrator.len()
    }
}

fn to_js(err: ReflowError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Initialize panic hook for better error messages.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console.
#[wasm_bindgen]
pub fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}
