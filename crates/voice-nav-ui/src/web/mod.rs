//! Browser host
//!
//! Wires the client to the page: DOM targets, speech synthesis, timers,
//! fetch and the push socket.
//!
//! Architecture:
//! ```text
//! DOM / WebSocket / SpeechSynthesis / setTimeout
//!          │ Closure
//!          ▼
//!   Host::post ──► EventQueue ──► VoiceClient::handle
//!          ▲                              │
//!          └──── spawn_local(fetch) ◄─────┘ ClientCommand
//! ```

mod dom;
mod push;
mod speech;

use crate::api::ApiClient;
use crate::client::{ClientCommand, ClientEvent, ClientParts, VoiceClient};
use crate::config::ClientConfig;
use crate::queue::EventQueue;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;

pub(crate) struct Host {
    client: RefCell<VoiceClient>,
    queue: RefCell<EventQueue>,
    api: ApiClient,
    push_url: String,
    /// Current push subscription; replaced on every reconnect
    push: RefCell<Option<push::PushSocket>>,
}

// Host lives for the lifetime of the page (thread-local for WASM)
thread_local! {
    static HOST: RefCell<Option<Rc<Host>>> = const { RefCell::new(None) };
}

impl Host {
    /// Queue `event` and, unless a drain is already running further up the
    /// stack, process everything queued in arrival order.
    pub(crate) fn post(self: &Rc<Self>, event: ClientEvent) {
        {
            let mut queue = self.queue.borrow_mut();
            queue.push(event);
            if !queue.begin_drain() {
                return;
            }
        }

        loop {
            let next = self.queue.borrow_mut().pop();
            let Some(event) = next else { break };

            let commands = {
                let mut client = self.client.borrow_mut();
                client.handle(event);
                client.take_commands()
            };
            for command in commands {
                self.run(command);
            }
        }

        self.queue.borrow_mut().end_drain();
    }

    fn run(self: &Rc<Self>, command: ClientCommand) {
        let api = self.api.clone();
        let host = Rc::downgrade(self);

        wasm_bindgen_futures::spawn_local(async move {
            let event = match command {
                ClientCommand::Session(request) => ClientEvent::SessionCompleted {
                    request,
                    result: api.send_session(request).await,
                },
                ClientCommand::QueryStatus => ClientEvent::StatusLoaded(api.voice_status().await),
            };
            post_weak(&host, event);
        });
    }
}

/// Post from a callback that must not keep the host alive.
pub(crate) fn post_weak(host: &Weak<Host>, event: ClientEvent) {
    if let Some(host) = host.upgrade() {
        host.post(event);
    }
}

/// Start voice control on the current page.
///
/// `config` is an optional partial [`ClientConfig`] object. Calling this a
/// second time is a no-op.
#[wasm_bindgen]
pub fn start_voice_control(config: JsValue) -> Result<(), JsValue> {
    let already_started = HOST.with(|host| host.borrow().is_some());
    if already_started {
        tracing::debug!("voice control already started");
        return Ok(());
    }

    let config: ClientConfig = if config.is_undefined() || config.is_null() {
        ClientConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let push_url = config
        .push_url()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let page = dom::PageTargets::resolve(&document, &config);
    let toggle_element = page.toggle_element();
    let location = window.location();

    let host = Rc::new_cyclic(|weak: &Weak<Host>| {
        let parts = ClientParts {
            toggle: Box::new(page.toggle()),
            status_surface: Box::new(page.status()),
            scheduler: Box::new(speech::WebScheduler::new(weak.clone())),
            speech: Box::new(speech::WebSpeech::new(weak.clone())),
            navigator: Box::new(dom::DomNavigator::new(location)),
            capture: page.capture_targets(),
        };
        Host {
            client: RefCell::new(VoiceClient::new(&config, parts)),
            queue: RefCell::new(EventQueue::default()),
            api: ApiClient::new(&config.base_url),
            push_url,
            push: RefCell::new(None),
        }
    });

    if let Some(element) = toggle_element {
        dom::install_toggle_listeners(&element, &host)?;
    } else {
        tracing::warn!(id = %config.toggle_id, "voice control toggle not found");
    }

    push::connect(&host)?;

    HOST.with(|slot| *slot.borrow_mut() = Some(host.clone()));
    host.post(ClientEvent::Startup);

    tracing::info!("voice control started");
    Ok(())
}
