use anyhow::Result;
use bevy_ecs::prelude::Resource;
use cfg_if::cfg_if;

use crate::config;
use crate::device::Device;
use crate::logging::printlog;
use crate::model::RoomModel;
use crate::renderers::InstallationPass;
use crate::texture::Texture;

#[cfg(target_arch = "wasm32")]
pub fn format_url(file_name: &str) -> reqwest::Url {
    let base = match reqwest::Url::parse(config::ASSET_BASE_URL) {
        Ok(url) => url,
        // A relative base resolves against the page origin
        Err(_) => {
            let window = web_sys::window().unwrap();
            let origin = window.location().origin().unwrap();
            reqwest::Url::parse(&format!("{}{}", origin, config::ASSET_BASE_URL)).unwrap()
        }
    };
    base.join(file_name).unwrap()
}

pub async fn load_binary(file_name: &str) -> Result<Vec<u8>> {
    cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            let url = format_url(file_name);
            printlog(url.as_str());
            let data = reqwest::get(url)
                .await?
                .bytes()
                .await?
                .to_vec();
        } else {
            let path = std::path::Path::new(env!("OUT_DIR"))
                .join("res")
                .join(file_name);
            let data = std::fs::read(path)?;
        }
    }

    Ok(data)
}

#[derive(Resource)]
pub struct Assets {
    pub room_model: RoomModel,
    /// Populated lazily on wasm once the video reports a frame; a static
    /// placeholder on native where no video element exists.
    pub video_texture: Option<Texture>,
    /// Bumped whenever `video_texture` is (re)created so cached bind groups
    /// know to rebuild.
    pub video_generation: u32,
}

impl Assets {
    pub async fn load_and_return(device: &Device, webxr: bool) -> Self {
        printlog("Loading the room model");
        let glb = load_binary(config::ROOM_MODEL_FILE).await.unwrap();
        let mut room_model = RoomModel::from_glb(device, &glb).unwrap();
        printlog("Done loading the room model");

        if webxr {
            crate::components::TeleportVisual::register_meshes(&mut room_model, device);
        }

        cfg_if! {
            if #[cfg(target_arch = "wasm32")] {
                let (video_texture, video_generation) = (None, 0);
            } else {
                let placeholder =
                    Texture::from_color(device, device.queue(), [24, 24, 24, 255], "video placeholder");
                let (video_texture, video_generation) = (Some(placeholder), 1);
            }
        }

        Self {
            room_model,
            video_texture,
            video_generation,
        }
    }
}

#[derive(Resource)]
pub struct Renderers {
    pub installation: Option<InstallationPass>,
}

impl Renderers {
    pub fn init() -> Self {
        Self { installation: None }
    }
}

/// Handle on the looping video. Lives as a non-send resource because the
/// underlying element is a DOM object.
#[cfg(target_arch = "wasm32")]
pub struct VideoSource {
    element: web_sys::HtmlVideoElement,
}

#[cfg(target_arch = "wasm32")]
impl VideoSource {
    pub fn new(file_name: &str) -> Self {
        use wasm_bindgen::JsCast;

        let document = web_sys::window().unwrap().document().unwrap();
        let element: web_sys::HtmlVideoElement = document
            .create_element("video")
            .unwrap()
            .dyn_into()
            .unwrap();
        element.set_src(format_url(file_name).as_str());
        element.set_loop(true);
        element.set_muted(true);
        element.set_cross_origin(Some("anonymous"));
        element.set_preload("auto");
        element.set_attribute("playsinline", "").unwrap();
        Self { element }
    }

    /// Fire-and-forget, as the installation does; a rejected play() promise
    /// is not handled.
    pub fn play(&self) {
        let _ = self.element.play();
    }

    pub fn frame_ready(&self) -> bool {
        // HAVE_CURRENT_DATA
        self.element.ready_state() >= 2
    }

    pub fn size(&self) -> (u32, u32) {
        (self.element.video_width(), self.element.video_height())
    }

    pub fn copy_to(&self, device: &Device, texture: &Texture) {
        device.queue().copy_external_image_to_texture(
            &wgpu::ImageCopyExternalImage {
                source: wgpu::ExternalImageSource::HTMLVideoElement(self.element.clone()),
                origin: wgpu::Origin2d::ZERO,
                flip_y: false,
            },
            wgpu::ImageCopyTextureTagged {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
                color_space: wgpu::PredefinedColorSpace::Srgb,
                premultiplied_alpha: false,
            },
            texture.texture.size(),
        );
    }
}

