use crate::assets::Assets;
use crate::device::{Device, SurfaceSize};
use crate::events::{
    CameraSetEvent, FrameTimeEvent, KeyboardEvent, MouseEvent, RoomCycleEvent, WindowResizeEvent,
};
use crate::frame_time::FrameTime;
use crate::input::Input;
use crate::math::{Mat4f, Rect, UnitQuatf, Vec3f};
use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemState;
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};

#[cfg(target_arch = "wasm32")]
use winit::platform::web::EventLoopExtWebSys;

use winit::event::{DeviceEvent, ElementState, Event, KeyboardInput, WindowEvent};
use winit::window::{Window, WindowBuilder};

use crate::assets::Renderers;
use crate::components::{Camera, Player, SceneMesh, Transform};
use crate::systems::*;

use crate::logging::printlog;

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Resource)]
pub struct AppState {
    pub running: bool,
    pub webxr: bool,
}

/// Scene-wide render settings. The clear color starts opaque black for the
/// desktop path and goes transparent when an immersive session begins.
#[derive(Resource)]
pub struct SceneSettings {
    pub clear_color: wgpu::Color,
}

pub struct App {
    pub world: World,
}

impl App {
    pub async fn new(window: Window, webxr: bool) -> Self {
        let mut world = World::default();
        world.init_resource::<Schedules>();

        printlog("running App::new - created world");
        let device = Device::new(&window).await;

        world.insert_resource(device);
        world.insert_non_send_resource(window);

        world.insert_resource(AppState {
            running: true,
            webxr,
        });
        world.insert_resource(SceneSettings {
            clear_color: wgpu::Color::BLACK,
        });
        world.insert_resource(Renderers::init());
        world.insert_resource(FrameTime::new(webxr));
        world.insert_resource(Input::new());
        world.insert_resource(RoomCycle::new());

        // Events
        world.init_resource::<Events<WindowResizeEvent>>();
        world.init_resource::<Events<KeyboardEvent>>();
        world.init_resource::<Events<MouseEvent>>();
        world.init_resource::<Events<FrameTimeEvent>>();
        world.init_resource::<Events<CameraSetEvent>>();
        world.init_resource::<Events<RoomCycleEvent>>();

        // Schedules
        let spawn_scene_schedule = new_spawn_scene_schedule(webxr);
        world.add_schedule(spawn_scene_schedule.0, spawn_scene_schedule.1);
        let preupdate_schedule = new_preupdate_schedule();
        world.add_schedule(preupdate_schedule.0, preupdate_schedule.1);
        let update_schedule = new_update_schedule();
        world.add_schedule(update_schedule.0, update_schedule.1);
        let camera_update_schedule = new_camera_update_schedule();
        world.add_schedule(camera_update_schedule.0, camera_update_schedule.1);
        let xr_init_schedule = new_xr_init_schedule();
        world.add_schedule(xr_init_schedule.0, xr_init_schedule.1);
        let render_schedule = new_render_schedule();
        world.add_schedule(render_schedule.0, render_schedule.1);

        Self { world }
    }

    pub async fn load_assets(&mut self) {
        printlog("Loading assets");
        let webxr = self.world.resource::<AppState>().webxr;
        let assets = Assets::load_and_return(self.world.resource::<Device>(), webxr).await;
        self.world.insert_resource(assets);
        #[cfg(target_arch = "wasm32")]
        self.world
            .insert_non_send_resource(crate::assets::VideoSource::new(crate::config::VIDEO_FILE));
        printlog("Done loading assets");
    }

    fn world_systemstate_get_mut(
        &mut self,
    ) -> (
        NonSend<Window>,
        EventWriter<WindowResizeEvent>,
        EventWriter<KeyboardEvent>,
        EventWriter<MouseEvent>,
        EventWriter<FrameTimeEvent>,
        EventWriter<CameraSetEvent>,
    ) {
        let mut world_systemstate: SystemState<(
            NonSend<Window>,
            EventWriter<WindowResizeEvent>,
            EventWriter<KeyboardEvent>,
            EventWriter<MouseEvent>,
            EventWriter<FrameTimeEvent>,
            EventWriter<CameraSetEvent>,
        )> = SystemState::from_world(&mut self.world);
        world_systemstate.get_mut(&mut self.world)
    }

    #[allow(dead_code)]
    pub fn device(&self) -> &Device {
        self.world.resource::<Device>()
    }

    #[allow(dead_code)]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.world.resource::<Device>().surface_texture_format()
    }

    /// One simulation step, driven by the XR frame callback.
    #[allow(dead_code)]
    pub fn update_scene(&mut self, duration: std::time::Duration) {
        let (_, _, _, _, mut frametime_events, _) = self.world_systemstate_get_mut();
        frametime_events.send(FrameTimeEvent { duration });
        self.world.run_schedule(SpawnLabel);
        self.world.run_schedule(PreupdateLabel);
        self.world.run_schedule(UpdateLabel);
    }

    /// Adopt an XR view pose as the active camera.
    #[allow(dead_code)]
    pub fn update_camera(&mut self, pos: Vec3f, rot: UnitQuatf, projection_matrix: Mat4f) {
        let (_, _, _, _, _, mut cameraset_events) = self.world_systemstate_get_mut();
        cameraset_events.send(CameraSetEvent {
            pos,
            rot,
            projection_matrix,
        });
        self.world.run_schedule(CameraUpdateLabel);
    }

    /// Session bootstrap; invoked exactly once per immersive session.
    #[allow(dead_code)]
    pub fn on_xr_session_init(&mut self) {
        self.world.run_schedule(XrInitLabel);
    }

    #[allow(dead_code)]
    pub fn render_to_texture(
        &mut self,
        color_texture: &wgpu::Texture,
        viewport: Option<Rect>,
        clear: bool,
    ) {
        let mut world_w_queries_systemstate: SystemState<(
            Res<Device>,
            Res<Assets>,
            ResMut<Renderers>,
            Res<SceneSettings>,
            Query<&Camera, With<Player>>,
            Query<(&SceneMesh, &Transform)>,
        )> = SystemState::from_world(&mut self.world);
        let (device, assets, mut renderers, settings, camera_qry, meshes_qry) =
            world_w_queries_systemstate.get_mut(&mut self.world);

        render_to_texture(
            &device,
            &assets,
            &mut renderers,
            &settings,
            camera_qry,
            meshes_qry,
            color_texture,
            viewport,
            clear,
        );
    }
}

pub struct Experience {
    pub app: Rc<RefCell<App>>,
}

impl Experience {
    async fn new(window: Window, xr_supported: bool) -> Self {
        let mut app = App::new(window, xr_supported).await;
        app.load_assets().await;
        let app = Rc::new(RefCell::new(app));

        #[cfg(target_arch = "wasm32")]
        Self::wire_enter_prompt(&app, xr_supported);

        Self { app }
    }

    /// Wires the single click on the prompt image, then swaps it to the
    /// enter graphic. There is deliberately no guard against a second click
    /// and no handling of a rejected session request, matching the
    /// installation's single-shot UI.
    #[cfg(target_arch = "wasm32")]
    fn wire_enter_prompt(app: &Rc<RefCell<App>>, xr_supported: bool) {
        use crate::ui;

        let prompt = ui::Prompt::get();

        if xr_supported {
            let floor_meshes = {
                let app = app.borrow();
                let assets = app.world.resource::<Assets>();
                assets.room_model.floor_mesh_names()
            };
            let app = app.clone();
            prompt.on_click(move || {
                let app = app.clone();
                let floor_meshes = floor_meshes.clone();
                // future_to_promise instead of spawn_local: the session
                // request must stay within the user-activation window on the
                // Meta Quest browser.
                let _ = wasm_bindgen_futures::future_to_promise(async move {
                    let xr_app = crate::xr::WebXRApp::new(&floor_meshes).await;
                    app.borrow_mut().on_xr_session_init();
                    xr_app.start(app.clone());
                    let prompt = ui::Prompt::get();
                    prompt.hide();
                    ui::reveal_canvas();
                    app.borrow()
                        .world
                        .non_send_resource::<crate::assets::VideoSource>()
                        .play();
                    Ok(wasm_bindgen::JsValue::UNDEFINED)
                });
            });
        } else {
            let app = app.clone();
            prompt.on_click(move || {
                let prompt = ui::Prompt::get();
                prompt.hide();
                ui::reveal_canvas();
                app.borrow()
                    .world
                    .non_send_resource::<crate::assets::VideoSource>()
                    .play();
            });
        }

        prompt.show_enter();
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_window_canvas(window: &Window, surface_size: SurfaceSize) {
    // Winit prevents sizing with CSS, so we have to set
    // the size manually when on web.
    window.set_inner_size(surface_size);

    use winit::platform::web::WindowExtWebSys;
    web_sys::window()
        .and_then(|win| win.document())
        .and_then(|doc| {
            let dst = doc.get_element_by_id(crate::config::CANVAS_CONTAINER_ID)?;
            let canvas = window.canvas();
            // Revealed by the enter click
            canvas.set_hidden(true);
            let canvas = web_sys::Element::from(canvas);
            canvas.set_id("canvas");
            dst.append_child(&canvas).ok()?;
            Some(())
        })
        .expect("Couldn't append canvas to document body.");
}

pub async fn run_experience(xr_supported: bool) {
    printlog("running run_experience - starting");

    let event_loop = EventLoop::new();

    let surface_size = SurfaceSize::new(1900, 1200);

    let window = WindowBuilder::new()
        .with_title("Victory Lounge")
        .with_inner_size(surface_size)
        .build(&event_loop)
        .unwrap();

    #[cfg(target_arch = "wasm32")]
    {
        setup_window_canvas(&window, surface_size);
    }

    let experience = Experience::new(window, xr_supported).await;
    printlog("running run_experience - created experience");

    let event_handler = move |event: Event<()>,
                              _: &EventLoopWindowTarget<()>,
                              control_flow: &mut ControlFlow| {
        let mut app = experience.app.borrow_mut();

        let (window, mut resize_events, mut keyboard_events, mut mouse_events, _, _) =
            app.world_systemstate_get_mut();

        match event {
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => mouse_events.send(MouseEvent::Move(delta.0 as f32, delta.1 as f32)),

            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => match event {
                WindowEvent::MouseInput { state, button, .. } => {
                    mouse_events.send(MouseEvent::Button {
                        button: *button,
                        pressed: *state == ElementState::Pressed,
                    });
                }

                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: key_state,
                            virtual_keycode: Some(keycode),
                            ..
                        },
                    ..
                } => {
                    keyboard_events.send(KeyboardEvent {
                        code: *keycode,
                        pressed: *key_state == ElementState::Pressed,
                    });
                }

                WindowEvent::Resized(new_size) => {
                    if xr_supported {
                        return;
                    }
                    resize_events.send(WindowResizeEvent {
                        new_size: *new_size,
                    });
                }

                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    if xr_supported {
                        return;
                    }
                    resize_events.send(WindowResizeEvent {
                        new_size: **new_inner_size,
                    });
                }

                _ => (),
            },

            Event::RedrawRequested(window_id) if window_id == window.id() => {
                // In-session frames are driven by the XR callback instead
                if xr_supported {
                    return;
                }
                app.world.run_schedule(SpawnLabel);
                app.world.run_schedule(PreupdateLabel);
                app.world.run_schedule(UpdateLabel);
                app.world.run_schedule(RenderLabel);
            }

            Event::RedrawEventsCleared => {
                // RedrawRequested will only trigger once, unless we manually
                // request it.
                if xr_supported {
                    return;
                }
                window.request_redraw();
            }

            _ => {}
        }

        if !app.world.resource::<AppState>().running {
            *control_flow = ControlFlow::Exit;
        }
    };

    #[cfg(target_arch = "wasm32")]
    {
        event_loop.spawn(event_handler);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        event_loop.run(event_handler);
    }
}
