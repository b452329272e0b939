#![cfg(web_sys_unstable_apis)]

#[allow(unused_imports)]
use log::{debug, error, info};
use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::*;

use crate::app::App;
use crate::logging::printlog;
use crate::math::{Mat4, Mat4f, Quat, Rect, UnitQuat, Vec3f};
use crate::xr::utils;

fn request_animation_frame(session: &XrSession, f: &Closure<dyn FnMut(f64, XrFrame)>) -> u32 {
    // This turns the Closure into a js_sys::Function
    // See https://rustwasm.github.io/wasm-bindgen/api/wasm_bindgen/closure/struct.Closure.html#casting-a-closure-to-a-js_sysfunction
    session.request_animation_frame(f.as_ref().unchecked_ref())
}

// We need to take care here because:
// * WebGL matrices are stored as an array in column-major order
// * nalgebra::Matrix4::new args are in row-major order
// https://developer.mozilla.org/en-US/docs/Web/API/XRRigidTransform/matrix
fn to_mat(v: &Vec<f32>) -> Mat4f {
    Mat4::new(
        v[0], v[4], v[8], v[12],
        v[1], v[5], v[9], v[13],
        v[2], v[6], v[10], v[14],
        v[3], v[7], v[11], v[15],
    )
}

fn js_array(values: &[&str]) -> JsValue {
    return JsValue::from(
        values
            .iter()
            .map(|x| JsValue::from_str(x))
            .collect::<js_sys::Array>(),
    );
}

fn create_webgl_context(xr_mode: bool) -> Result<WebGl2RenderingContext, JsValue> {
    let canvas = web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .get_element_by_id("canvas")
        .unwrap()
        .dyn_into::<HtmlCanvasElement>()
        .unwrap();

    let gl: WebGl2RenderingContext = if xr_mode {
        let gl_attribs = Object::new();
        Reflect::set(
            &gl_attribs,
            &JsValue::from_str("xrCompatible"),
            &JsValue::TRUE,
        )
        .unwrap();

        canvas
            .get_context_with_context_options("webgl2", &gl_attribs)?
            .unwrap()
            .dyn_into()?
    } else {
        canvas.get_context("webgl2")?.unwrap().dyn_into()?
    };

    Ok(gl)
}

/// Asks the runtime whether an immersive-vr session can be created.
/// Browsers without WebXR at all answer no.
pub async fn probe_immersive_support() -> bool {
    let navigator: web_sys::Navigator = web_sys::window().unwrap().navigator();
    let xr = navigator.xr();
    let xr_value: &JsValue = xr.as_ref();
    if xr_value.is_undefined() {
        return false;
    }
    let supported =
        wasm_bindgen_futures::JsFuture::from(xr.is_session_supported(XrSessionMode::ImmersiveVr))
            .await;
    match supported {
        Ok(value) => value.as_bool().unwrap_or(false),
        Err(_) => false,
    }
}

pub struct WebXRApp {
    session: Rc<RefCell<XrSession>>,
    ref_space: Rc<RefCell<XrReferenceSpace>>,
    gl: Rc<WebGl2RenderingContext>,
}

impl WebXRApp {
    /// Requests the immersive session. Must be reached from a user gesture
    /// or the browser rejects the request.
    pub async fn new(floor_mesh_names: &[String]) -> Self {
        printlog("Starting WebGL2 for WebXR");

        let gl = Rc::new(create_webgl_context(true).unwrap());

        printlog("Starting WebXR...");
        let navigator: web_sys::Navigator = web_sys::window().unwrap().navigator();
        let xr = navigator.xr();
        let session_mode = XrSessionMode::ImmersiveVr;

        let mut session_init = XrSessionInit::new();
        session_init.optional_features(&js_array(&["bounded-floor"]));
        let xr_session_promise = xr.request_session_with_options(session_mode, &session_init);
        let xr_session = wasm_bindgen_futures::JsFuture::from(xr_session_promise).await;
        let xr_session: XrSession = xr_session.unwrap().into();

        // The walkable-surface allowlist for the session's teleportation
        printlog(&format!(
            "Teleportation floors: {}",
            floor_mesh_names.join(", ")
        ));

        let xr_gl_layer =
            XrWebGlLayer::new_with_web_gl2_rendering_context(&xr_session, &gl).unwrap();
        let mut render_state_init = XrRenderStateInit::new();
        render_state_init.base_layer(Some(&xr_gl_layer));
        xr_session.update_render_state_with_state(&render_state_init);

        // The installation tracks the bounded play area
        let ref_space_promise =
            xr_session.request_reference_space(XrReferenceSpaceType::BoundedFloor);
        let ref_space = wasm_bindgen_futures::JsFuture::from(ref_space_promise).await;
        let ref_space: XrReferenceSpace = ref_space.unwrap().into();

        let session = Rc::new(RefCell::new(xr_session));
        let ref_space = Rc::new(RefCell::new(ref_space));

        Self {
            session,
            ref_space,
            gl,
        }
    }

    pub fn start(&self, app: Rc<RefCell<App>>) {
        let f = Rc::new(RefCell::new(None));
        let g = f.clone();

        let app = app.clone();
        let gl = self.gl.clone();
        let ref_space = self.ref_space.clone();
        let last_frame_time = Rc::new(RefCell::new(0.));

        *g.borrow_mut() = Some(Closure::new(move |time: f64, frame: XrFrame| {
            let sess: XrSession = frame.session();
            let mut app = app.borrow_mut();
            let ref_space = &ref_space.borrow_mut();

            let xr_gl_layer = sess.render_state().base_layer().unwrap();

            let framebuffer = {
                match xr_gl_layer.framebuffer() {
                    Some(lfb) => {
                        debug!("Found XRWebGLLayer framebuffer!");
                        lfb
                    }
                    None => {
                        debug!("XRWebGLLayer is null, using default one");
                        gl.get_parameter(WebGl2RenderingContext::FRAMEBUFFER_BINDING)
                            .unwrap()
                            .into()
                    }
                }
            };

            let color_texture = utils::create_view_from_device_framebuffer(
                app.device(),
                framebuffer,
                &xr_gl_layer,
                app.color_format(),
                "device framebuffer (colour)",
            );

            let delta_time =
                std::time::Duration::from_millis((time - *last_frame_time.borrow()) as u64);
            last_frame_time.replace(time);
            app.update_scene(delta_time);

            let viewer_pose = frame.get_viewer_pose(ref_space).unwrap();
            for (view_idx, view) in viewer_pose.views().iter().enumerate() {
                let view: XrView = view.into();
                let viewport = xr_gl_layer.get_viewport(&view).unwrap();
                let vp = Rect {
                    x: viewport.x() as f32,
                    y: viewport.y() as f32,
                    w: viewport.width() as f32,
                    h: viewport.height() as f32,
                };

                // Decomposed position and orientation are easier to operate
                // on than the raw view matrix
                let pos = view.transform().position();
                let position = Vec3f::new(pos.x() as f32, pos.y() as f32, pos.z() as f32);
                let r = view.transform().orientation();
                let rotation = Quat::new(r.w() as f32, r.x() as f32, r.y() as f32, r.z() as f32);
                let rotation = UnitQuat::new_normalize(rotation);

                app.update_camera(position, rotation, to_mat(&view.projection_matrix()));

                // Each view renders to a different region of the same
                // framebuffer, so only clear before the first pass.
                let clear = view_idx == 0;
                app.render_to_texture(&color_texture, Some(vp), clear);
            }

            // Schedule ourself for another requestAnimationFrame callback.
            request_animation_frame(&sess, f.borrow().as_ref().unwrap());
        }));

        let session = &self.session.borrow();
        request_animation_frame(session, g.borrow().as_ref().unwrap());
    }
}
