//! `fetch`-backed [`HttpClient`] for the relay transports.
//!
//! Requests are CORS `GET`s, so only relays that send cross-origin headers are
//! reachable from the page. Every request carries an `AbortSignal`; the fetch
//! is aborted when its timeout elapses or when the caller drops the future
//! (the relay transport races it against its own deadline).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    http::{HttpClient, HttpRequest, HttpResponse},
};
use bytes::Bytes;
use futures::future::{select, Either};
use gloo_timers::future::TimeoutFuture;
use js_sys::{try_iter, Array, Uint8Array};
use tracing::trace;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AbortController, AbortSignal, Headers, Request, RequestInit, RequestMode, Response, Window,
};

use crate::error::js_error;

pub struct WasmHttpClient {
    window: Window,
}

/// Aborts the fetch unless [`disarm`](Self::disarm) ran first.
struct AbortOnDrop {
    controller: AbortController,
    armed: bool,
}

impl AbortOnDrop {
    fn new() -> BridgeResult<Self> {
        let controller =
            AbortController::new().map_err(|err| js_error("create abort controller", err))?;
        Ok(Self {
            controller,
            armed: true,
        })
    }

    fn signal(&self) -> AbortSignal {
        self.controller.signal()
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.controller.abort();
        }
    }
}

impl WasmHttpClient {
    pub fn new() -> BridgeResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".to_string()))?;
        Ok(Self { window })
    }

    fn to_request(request: &HttpRequest, signal: &AbortSignal) -> BridgeResult<Request> {
        let headers = Headers::new().map_err(|err| js_error("create headers", err))?;
        for (name, value) in &request.headers {
            headers
                .set(name, value)
                .map_err(|err| js_error("set header", err))?;
        }

        let init = RequestInit::new();
        init.set_method("GET");
        init.set_mode(RequestMode::Cors);
        init.set_headers(&headers);
        init.set_signal(Some(signal));

        Request::new_with_str_and_init(&request.url, &init)
            .map_err(|err| js_error("build request", err))
    }

    async fn send(&self, request: &Request) -> BridgeResult<Response> {
        let value = JsFuture::from(self.window.fetch_with_request(request))
            .await
            .map_err(|err| js_error("fetch", err))?;
        value
            .dyn_into::<Response>()
            .map_err(|_| BridgeError::OperationFailed("fetch did not return a Response".into()))
    }
}

async fn body_bytes(response: &Response) -> BridgeResult<Bytes> {
    let promise = response
        .array_buffer()
        .map_err(|err| js_error("read body", err))?;
    let buffer = JsFuture::from(promise)
        .await
        .map_err(|err| js_error("read body", err))?;
    Ok(Bytes::from(Uint8Array::new(&buffer).to_vec()))
}

fn header_map(headers: &Headers) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(Some(entries)) = try_iter(&JsValue::from(headers.clone())) else {
        return map;
    };

    for entry in entries.flatten() {
        let pair = Array::from(&entry);
        if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
            map.insert(name, value);
        }
    }
    map
}

fn millis(duration: Duration) -> u32 {
    duration.as_millis().min(u128::from(u32::MAX)) as u32
}

#[async_trait(?Send)]
impl HttpClient for WasmHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let mut abort = AbortOnDrop::new()?;
        let js_request = Self::to_request(&request, &abort.signal())?;

        let response = match request.timeout {
            Some(limit) => {
                let fetch = self.send(&js_request);
                let deadline = TimeoutFuture::new(millis(limit));
                futures::pin_mut!(fetch);
                futures::pin_mut!(deadline);

                match select(fetch, deadline).await {
                    Either::Left((response, _)) => response?,
                    // Dropping `abort` cancels the fetch.
                    Either::Right(_) => return Err(BridgeError::Timeout(limit)),
                }
            }
            None => self.send(&js_request).await?,
        };

        let body = body_bytes(&response).await?;
        abort.disarm();

        trace!(
            url = %request.url,
            status = response.status(),
            bytes = body.len(),
            "fetch completed"
        );

        Ok(HttpResponse {
            status: response.status(),
            headers: header_map(&response.headers()),
            body,
        })
    }
}
