//! The DOM side of the experience: a single prompt image over an initially
//! hidden render canvas.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::assets::format_url;
use crate::config;

pub struct Prompt {
    image: web_sys::HtmlImageElement,
}

impl Prompt {
    pub fn get() -> Self {
        let document = web_sys::window().unwrap().document().unwrap();
        let image = document
            .get_element_by_id(config::PROMPT_IMAGE_ID)
            .expect("prompt image element missing from page")
            .dyn_into()
            .unwrap();
        Self { image }
    }

    pub fn show_loading(&self) {
        self.set_source(config::LOADING_IMAGE_FILE);
    }

    /// Signals that the experience is ready to enter.
    pub fn show_enter(&self) {
        self.set_source(config::ENTER_IMAGE_FILE);
    }

    pub fn show_unsupported(&self) {
        self.set_source(config::UNSUPPORTED_IMAGE_FILE);
    }

    pub fn hide(&self) {
        self.image.set_hidden(true);
    }

    /// Replaces any previous click handler; the closure lives for the rest
    /// of the page.
    pub fn on_click(&self, handler: impl FnMut() + 'static) {
        let closure = Closure::<dyn FnMut()>::new(handler);
        self.image
            .set_onclick(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }

    fn set_source(&self, file_name: &str) {
        self.image.set_src(format_url(file_name).as_str());
    }
}

fn canvas_element() -> web_sys::HtmlElement {
    web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .get_element_by_id("canvas")
        .expect("render canvas missing from page")
        .dyn_into()
        .unwrap()
}

pub fn reveal_canvas() {
    canvas_element().set_hidden(false);
}
