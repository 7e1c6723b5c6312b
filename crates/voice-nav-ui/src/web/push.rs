//! Push channel subscription
//!
//! One WebSocket to the backend carrying `{"event", "data"}` frames. The
//! socket is reopened after a close so the subscription outlives backend
//! restarts.

use super::{post_weak, Host};
use crate::client::ClientEvent;
use std::rc::{Rc, Weak};
use voice_nav_types::PushEvent;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

/// Delay before reopening a closed push socket (milliseconds)
const RECONNECT_DELAY_MS: i32 = 3000;

/// The open socket and the handlers it calls. Replacing it on reconnect
/// detaches and frees the previous handlers.
pub(crate) struct PushSocket {
    socket: WebSocket,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl Drop for PushSocket {
    fn drop(&mut self) {
        self.socket.set_onmessage(None);
        self.socket.set_onclose(None);
    }
}

pub(crate) fn connect(host: &Rc<Host>) -> Result<(), JsValue> {
    let socket = WebSocket::new(&host.push_url)?;

    let weak = Rc::downgrade(host);
    let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
        let Some(frame) = event.data().as_string() else {
            tracing::warn!("ignoring non-text push frame");
            return;
        };
        match PushEvent::from_frame(&frame) {
            Ok(push) => post_weak(&weak, ClientEvent::Push(push)),
            Err(e) => tracing::warn!(error = %e, "dropping push frame"),
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

    let weak = Rc::downgrade(host);
    let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
        tracing::warn!(code = event.code(), "push channel closed; reconnecting");
        schedule_reconnect(weak.clone());
    }) as Box<dyn FnMut(CloseEvent)>);
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

    tracing::info!(url = %host.push_url, "push channel subscribed");
    *host.push.borrow_mut() = Some(PushSocket {
        socket,
        _on_message: on_message,
        _on_close: on_close,
    });
    Ok(())
}

fn schedule_reconnect(host: Weak<Host>) {
    let Some(window) = web_sys::window() else { return };

    // Runs once and is freed by wasm-bindgen afterwards
    let retry = Closure::once_into_js(move || {
        let Some(host) = host.upgrade() else { return };
        if let Err(e) = connect(&host) {
            tracing::warn!(error = ?e, "push channel reconnect failed");
            schedule_reconnect(Rc::downgrade(&host));
        }
    });

    if let Err(e) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(retry.unchecked_ref(), RECONNECT_DELAY_MS)
    {
        tracing::warn!(error = ?e, "cannot schedule push reconnect");
    }
}
