mod app;
mod assets;
mod components;
mod config;
mod device;
mod events;
mod frame_time;
mod input;
mod logging;
mod math;
mod model;
mod renderers;
mod systems;
mod texture;

#[cfg(target_arch = "wasm32")]
mod ui;
#[cfg(target_arch = "wasm32")]
mod xr;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use crate::logging::{init_logging, printlog};

/// Boots the viewer: probe immersive support, then either the desktop
/// free-roam branch, the immersive branch, or the unsupported screen.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub async fn run() {
    init_logging();
    printlog("starting victory lounge");

    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            let prompt = ui::Prompt::get();
            prompt.show_loading();

            // Check if vr is supported. If not, exit the experience
            let supported = xr::probe_immersive_support().await;
            if !supported && !config::FORCE_DESKTOP {
                prompt.show_unsupported();
                return;
            }

            app::run_experience(supported).await
        } else {
            // No WebXR runtime outside the browser; always the desktop branch
            app::run_experience(false).await
        }
    }
}

/// Native entry point for desktop-debug runs.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_blocking() {
    pollster::block_on(run());
}
