//! Script-tag bridge for the browser.
//!
//! Each injection appends a `<script>` element to the document body and binds
//! a global function under the requested callback name. The catalog response
//! calls that function with its JSON payload; a failed load fires the element's
//! `error` handler instead. Both paths settle the completion once.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    script::{ScriptCompletion, ScriptHandle, ScriptHost, ScriptOutcome},
};
use js_sys::Reflect;
use tracing::{debug, trace};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Event, HtmlScriptElement, Window};

use crate::error::{js_error, WasmError};

struct InjectedScript {
    element: HtmlScriptElement,
    callback_name: String,
    _on_payload: Closure<dyn FnMut(JsValue)>,
    _on_error: Closure<dyn FnMut(Event)>,
}

/// [`ScriptHost`] backed by DOM script elements.
pub struct DomScriptHost {
    window: Window,
    document: Document,
    scripts: RefCell<HashMap<ScriptHandle, InjectedScript>>,
    next_id: Cell<u64>,
}

impl DomScriptHost {
    pub fn new() -> BridgeResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| BridgeError::NotAvailable("document".to_string()))?;

        Ok(Self {
            window,
            document,
            scripts: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        })
    }

    /// Scripts currently attached to the document.
    pub fn active_scripts(&self) -> usize {
        self.scripts.borrow().len()
    }
}

impl ScriptHost for DomScriptHost {
    fn inject(
        &self,
        src: &str,
        callback_name: &str,
        on_complete: ScriptCompletion,
    ) -> BridgeResult<ScriptHandle> {
        let element: HtmlScriptElement = self
            .document
            .create_element("script")
            .map_err(|err| js_error("create script element", err))?
            .dyn_into()
            .map_err(|_| BridgeError::OperationFailed("script element has wrong type".into()))?;
        element.set_async(true);

        let settled = Rc::new(Cell::new(false));

        let on_payload = {
            let settled = Rc::clone(&settled);
            let on_complete = on_complete.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |data: JsValue| {
                if settled.replace(true) {
                    return;
                }
                let outcome = match serde_wasm_bindgen::from_value::<serde_json::Value>(data) {
                    Ok(payload) => ScriptOutcome::Payload(payload),
                    Err(err) => ScriptOutcome::LoadFailed(WasmError::from(err).to_string()),
                };
                on_complete(outcome);
            })
        };

        let on_error = {
            let src = src.to_string();
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                if settled.replace(true) {
                    return;
                }
                on_complete(ScriptOutcome::LoadFailed(format!("unable to load {src}")));
            })
        };

        let body = self
            .document
            .body()
            .ok_or_else(|| BridgeError::NotAvailable("document.body".to_string()))?;

        Reflect::set(
            &self.window,
            &JsValue::from_str(callback_name),
            on_payload.as_ref(),
        )
        .map_err(|err| js_error("bind callback", err))?;

        element.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        element.set_src(src);

        if let Err(err) = body.append_child(&element) {
            let _ = Reflect::delete_property(&self.window, &JsValue::from_str(callback_name));
            return Err(js_error("append script", err));
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let handle = ScriptHandle::new(format!("script-{id}"));

        trace!(script = %handle, callback = callback_name, "Injected script");
        self.scripts.borrow_mut().insert(
            handle.clone(),
            InjectedScript {
                element,
                callback_name: callback_name.to_string(),
                _on_payload: on_payload,
                _on_error: on_error,
            },
        );

        Ok(handle)
    }

    fn remove(&self, handle: ScriptHandle) {
        let Some(script) = self.scripts.borrow_mut().remove(&handle) else {
            return;
        };

        script.element.set_onerror(None);
        script.element.remove();
        if Reflect::delete_property(&self.window, &JsValue::from_str(&script.callback_name))
            .is_err()
        {
            debug!(callback = %script.callback_name, "Failed to delete global callback");
        }
        trace!(script = %handle, "Removed script");
    }
}
