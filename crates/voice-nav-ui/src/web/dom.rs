//! DOM targets
//!
//! Elements are looked up once, by id, when voice control starts. Any of
//! them may be missing; the adapters then do nothing.

use super::{post_weak, Host};
use crate::client::ClientEvent;
use crate::config::ClientConfig;
use crate::dispatch::{AudioSink, CaptureTargets, Navigator, TextRegion};
use crate::session::ToggleAffordance;
use crate::status::{Severity, StatusSurface};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlAudioElement, HtmlElement, Location};

const ACTIVE_CLASS: &str = "active";

pub(crate) struct PageTargets {
    toggle: Option<Element>,
    status: Option<HtmlElement>,
    status_text: Option<HtmlElement>,
    text_region: Option<Element>,
    audio: Option<HtmlAudioElement>,
}

impl PageTargets {
    pub(crate) fn resolve(document: &Document, config: &ClientConfig) -> Self {
        let html = |id: &str| {
            document
                .get_element_by_id(id)
                .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        };

        let targets = Self {
            toggle: document.get_element_by_id(&config.toggle_id),
            status: html(&config.status_id),
            status_text: html(&config.status_text_id),
            text_region: document.get_element_by_id(&config.text_region_id),
            audio: document
                .get_element_by_id(&config.audio_id)
                .and_then(|e| e.dyn_into::<HtmlAudioElement>().ok()),
        };

        tracing::debug!(
            toggle = targets.toggle.is_some(),
            status = targets.status.is_some(),
            text_region = targets.text_region.is_some(),
            audio = targets.audio.is_some(),
            "page targets resolved"
        );
        targets
    }

    pub(crate) fn toggle_element(&self) -> Option<Element> {
        self.toggle.clone()
    }

    pub(crate) fn toggle(&self) -> DomToggle {
        DomToggle {
            element: self.toggle.clone(),
        }
    }

    pub(crate) fn status(&self) -> DomStatus {
        DomStatus {
            container: self.status.clone(),
            text: self.status_text.clone(),
        }
    }

    pub(crate) fn capture_targets(&self) -> CaptureTargets {
        CaptureTargets {
            text_region: self
                .text_region
                .clone()
                .map(|element| Box::new(DomTextRegion { element }) as Box<dyn TextRegion>),
            audio: self
                .audio
                .clone()
                .map(|element| Box::new(DomAudio { element }) as Box<dyn AudioSink>),
        }
    }
}

pub(crate) struct DomToggle {
    element: Option<Element>,
}

impl ToggleAffordance for DomToggle {
    fn set_active(&mut self, active: bool) {
        let Some(element) = &self.element else { return };
        let classes = element.class_list();
        let result = if active {
            classes.add_1(ACTIVE_CLASS)
        } else {
            classes.remove_1(ACTIVE_CLASS)
        };
        if let Err(e) = result {
            tracing::warn!(error = ?e, "cannot update toggle class");
        }
    }
}

pub(crate) struct DomStatus {
    container: Option<HtmlElement>,
    text: Option<HtmlElement>,
}

impl StatusSurface for DomStatus {
    fn render(&mut self, text: &str, severity: Severity) {
        let Some(element) = &self.text else { return };
        element.set_text_content(Some(text));
        if let Err(e) = element.style().set_property("color", severity.color()) {
            tracing::warn!(error = ?e, "cannot colour status text");
        }
    }

    fn set_visible(&mut self, visible: bool) {
        let Some(container) = &self.container else { return };
        let display = if visible { "block" } else { "none" };
        if let Err(e) = container.style().set_property("display", display) {
            tracing::warn!(error = ?e, "cannot toggle status visibility");
        }
    }
}

pub(crate) struct DomNavigator {
    location: Location,
}

impl DomNavigator {
    pub(crate) fn new(location: Location) -> Self {
        Self { location }
    }
}

impl Navigator for DomNavigator {
    fn navigate(&mut self, url: &str) {
        if let Err(e) = self.location.set_href(url) {
            tracing::warn!(%url, error = ?e, "navigation failed");
        }
    }
}

struct DomTextRegion {
    element: Element,
}

impl TextRegion for DomTextRegion {
    fn set_text(&mut self, text: &str) {
        self.element.set_text_content(Some(text));
    }
}

struct DomAudio {
    element: HtmlAudioElement,
}

impl AudioSink for DomAudio {
    fn play_source(&mut self, url: &str) {
        self.element.set_src(url);
        self.element.load();

        match self.element.play() {
            Ok(promise) => {
                // Autoplay policies reject the promise; that is not our error to show
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                        tracing::warn!(error = ?e, "narration playback rejected");
                    }
                });
            }
            Err(e) => tracing::warn!(error = ?e, "narration playback failed"),
        }
    }
}

/// Click toggles the session; hovering previews the label.
pub(crate) fn install_toggle_listeners(element: &Element, host: &Rc<Host>) -> Result<(), JsValue> {
    let listeners = [
        ("click", ClientEvent::ToggleClicked),
        ("mouseenter", ClientEvent::PointerEntered),
        ("mouseleave", ClientEvent::PointerLeft),
    ];

    for (name, event) in listeners {
        let host = Rc::downgrade(host);
        let callback = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            post_weak(&host, event.clone());
        }) as Box<dyn FnMut(web_sys::Event)>);

        element.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())?;

        // Listener lives as long as the page
        callback.forget();
    }

    tracing::debug!("toggle listeners installed");
    Ok(())
}
