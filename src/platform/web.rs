//! Browser glue (wasm32 only)

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, KeyboardEvent, TouchEvent, Window};

use crate::sim::{Frame, PanelItemView, PanelView, Phase};

// Hand each frame to whatever renderer the page registered
#[wasm_bindgen(inline_js = "
    export function render_frame(json) {
        const render = window.orbitFolioRender;
        if (typeof render === 'function') {
            render(JSON.parse(json));
        }
    }
")]
extern "C" {
    fn render_frame(json: &str);
}

/// Fire listeners that exist only while the defense round runs
///
/// Installing adds `keydown` (Space) and `touchstart` listeners on the
/// window; dropping the value removes both.
pub struct DefenseInput {
    window: Window,
    keydown: Closure<dyn FnMut(KeyboardEvent)>,
    touchstart: Closure<dyn FnMut(TouchEvent)>,
}

impl DefenseInput {
    pub fn install<F: FnMut() + 'static>(on_fire: F) -> Option<Self> {
        let window = web_sys::window()?;
        let on_fire = Rc::new(RefCell::new(on_fire));

        let keydown = {
            let on_fire = on_fire.clone();
            Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.code() == "Space" {
                    event.prevent_default();
                    let mut fire = on_fire.borrow_mut();
                    (*fire)();
                }
            })
        };
        let touchstart = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
            let mut fire = on_fire.borrow_mut();
            (*fire)();
        });

        window
            .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())
            .ok()?;
        window
            .add_event_listener_with_callback("touchstart", touchstart.as_ref().unchecked_ref())
            .ok()?;
        log::info!("Defense input installed");

        Some(Self {
            window,
            keydown,
            touchstart,
        })
    }
}

impl Drop for DefenseInput {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("keydown", self.keydown.as_ref().unchecked_ref());
        let _ = self.window.remove_event_listener_with_callback(
            "touchstart",
            self.touchstart.as_ref().unchecked_ref(),
        );
        log::info!("Defense input removed");
    }
}

/// Send the frame to the JS renderer
pub fn publish_frame(frame: &Frame) {
    match serde_json::to_string(frame) {
        Ok(json) => render_frame(&json),
        Err(e) => log::warn!("Frame serialization failed: {}", e),
    }
}

/// Viewport size in CSS pixels
pub fn viewport_size() -> (f32, f32) {
    let Some(window) = web_sys::window() else {
        return (0.0, 0.0);
    };
    let read = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    (read(window.inner_width()), read(window.inner_height()))
}

/// Update the HTML overlay from the frame
pub fn update_overlay(frame: &Frame) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    // CSS shows the panel matching the current phase
    if let Some(body) = document.body() {
        let _ = body.set_attribute("data-phase", frame.phase.as_str());
    }

    if let Some(el) = document.get_element_by_id("hud-hits") {
        let text = format!("DEFEND THE PLANET ({}/{})", frame.hits, frame.victory_hits);
        if el.text_content().as_deref() != Some(text.as_str()) {
            el.set_text_content(Some(&text));
        }
    }

    if let Some(el) = document.get_element_by_id("reveal-text") {
        if el.text_content().as_deref() != Some(frame.reveal_text.as_str()) {
            el.set_text_content(Some(&frame.reveal_text));
        }
    }

    set_hidden(&document, "continue-btn", !frame.show_continue);
    set_hidden(&document, "defense-hud", frame.phase != Phase::Defense);

    if let Some(el) = document.get_element_by_id("nav-btn") {
        match frame.nav {
            Some(nav) => {
                el.set_text_content(Some(nav.label()));
                let _ = el.class_list().remove_1("hidden");
            }
            None => {
                let _ = el.class_list().add_1("hidden");
            }
        }
    }

    if let Some(el) = document.get_element_by_id("contact-panel") {
        let _ = el.class_list().toggle_with_force("open", frame.contact_open);
    }

    update_panel(&document, frame.panel.as_ref());

    if let Some(el) = document.get_element_by_id("image-modal") {
        let _ = el.class_list().toggle_with_force("open", frame.modal_image.is_some());
    }
    if let (Some(img), Some(src)) = (
        document.get_element_by_id("modal-image"),
        frame.modal_image.as_deref(),
    ) {
        if img.get_attribute("src").as_deref() != Some(src) {
            let _ = img.set_attribute("src", src);
        }
    }
}

/// Rebuild the explore panel when the focused category changes
fn update_panel(document: &Document, panel: Option<&PanelView>) {
    let Some(root) = document.get_element_by_id("explore-panel") else {
        return;
    };
    let shown = panel.map_or("", |p| p.name.as_str());
    if root.get_attribute("data-category").unwrap_or_default() == shown {
        return;
    }
    let _ = root.set_attribute("data-category", shown);
    let _ = root.class_list().toggle_with_force("hidden", panel.is_none());

    let Some(panel) = panel else {
        return;
    };
    if let Some(el) = document.get_element_by_id("panel-title") {
        el.set_text_content(Some(&panel.name));
        let _ = el.set_attribute("style", &format!("color: {}", panel.color));
    }
    if let Some(el) = document.get_element_by_id("panel-description") {
        el.set_text_content(panel.description.as_deref());
    }
    if let Some(list) = document.get_element_by_id("panel-items") {
        list.set_text_content(None);
        for item in &panel.items {
            if let Err(e) = append_item(document, &list, item) {
                log::warn!("Failed to render panel item {}: {:?}", item.name, e);
            }
        }
    }
}

// Image buttons carry `data-image`; the host turns clicks into view_image
fn append_item(document: &Document, list: &Element, item: &PanelItemView) -> Result<(), JsValue> {
    let entry = document.create_element("li")?;
    entry.set_attribute("style", &format!("border-color: {}", item.color))?;

    let title = document.create_element("h3")?;
    title.set_text_content(Some(&item.name));
    entry.append_child(&title)?;

    if let Some(detail) = &item.detail {
        let text = document.create_element("p")?;
        text.set_text_content(Some(detail));
        entry.append_child(&text)?;
    }
    if let Some(href) = &item.external_link {
        let anchor = document.create_element("a")?;
        anchor.set_attribute("href", href)?;
        anchor.set_attribute("target", "_blank")?;
        anchor.set_attribute("rel", "noopener noreferrer")?;
        anchor.set_text_content(Some("Visit"));
        entry.append_child(&anchor)?;
    }
    if let Some(link) = &item.link {
        let button = document.create_element("button")?;
        button.set_attribute("data-image", link)?;
        button.set_text_content(Some(&item.link_label));
        entry.append_child(&button)?;
    }

    list.append_child(&entry)?;
    Ok(())
}

fn set_hidden(document: &web_sys::Document, id: &str, hidden: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let _ = el.class_list().toggle_with_force("hidden", hidden);
    }
}
