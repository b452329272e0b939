use bevy_ecs::prelude::*;

use crate::app::{AppState, SceneSettings};
use crate::assets::{Assets, Renderers};
use crate::components::{Camera, Player, SceneMesh, Transform};
use crate::device::Device;
use crate::math::Rect;
use crate::model::MeshData;

pub fn prepare_render_pipelines(
    device: Res<Device>,
    appstate: Res<AppState>,
    mut renderers: ResMut<Renderers>,
) {
    renderers.installation = Some(crate::renderers::InstallationPass::new(
        &device,
        device.surface_texture_format(),
        appstate.webxr,
    ));
}

fn gather<'a>(
    assets: &'a Assets,
    meshes: impl Iterator<Item = (&'a SceneMesh, &'a Transform)>,
) -> Vec<(&'a MeshData, &'a SceneMesh, &'a Transform)> {
    let mut nodes = vec![];
    for (mesh, transform) in meshes {
        if !mesh.enabled {
            continue;
        }
        match assets.room_model.meshes.get(&mesh.name) {
            Some(data) => nodes.push((data, mesh, transform)),
            None => log::error!("no mesh data registered for {}", mesh.name),
        }
    }
    nodes
}

/// Desktop path: draw straight to the window surface.
pub fn render(
    device: Res<Device>,
    assets: Res<Assets>,
    mut renderers: ResMut<Renderers>,
    appstate: Res<AppState>,
    settings: Res<SceneSettings>,
    camera_qry: Query<&Camera, With<Player>>,
    meshes_qry: Query<(&SceneMesh, &Transform)>,
) {
    if appstate.webxr {
        // In-session frames go through render_to_texture instead
        return;
    }
    let camera = camera_qry.single();
    let nodes = gather(&assets, meshes_qry.iter());
    let video = assets
        .video_texture
        .as_ref()
        .map(|t| (t, assets.video_generation));

    let surface_texture = device.surface().get_current_texture().unwrap();
    let color_view = surface_texture
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let pass = renderers.installation.as_mut().unwrap();
    let cmd_buffer = pass.draw(
        &color_view,
        Some(&device.depth_tex().view),
        &device,
        device.queue(),
        &nodes,
        camera.to_uniform(),
        settings.clear_color,
        video,
        &None,
        true,
        true,
    );

    device.queue().submit([cmd_buffer]);
    surface_texture.present();
}

/// Immersive path: draw one XR view into the session framebuffer texture.
#[allow(clippy::too_many_arguments)]
pub fn render_to_texture(
    device: &Device,
    assets: &Assets,
    renderers: &mut Renderers,
    settings: &SceneSettings,
    camera_qry: Query<&Camera, With<Player>>,
    meshes_qry: Query<(&SceneMesh, &Transform)>,
    color_texture: &wgpu::Texture,
    viewport: Option<Rect>,
    clear: bool,
) {
    let camera = camera_qry.single();
    let nodes = gather(assets, meshes_qry.iter());
    let video = assets
        .video_texture
        .as_ref()
        .map(|t| (t, assets.video_generation));

    let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

    let pass = renderers.installation.as_mut().unwrap();
    pass.ensure_xr_depth(device, color_texture.width(), color_texture.height());
    let cmd_buffer = pass.draw(
        &color_view,
        None,
        device,
        device.queue(),
        &nodes,
        camera.xr_camera.to_uniform(),
        settings.clear_color,
        video,
        &viewport,
        clear,
        clear,
    );

    device.queue().submit([cmd_buffer]);
}

/// Upload the current video frame. Creates (and re-creates) the backing
/// texture once the element knows its dimensions.
#[cfg(target_arch = "wasm32")]
pub fn refresh_video_texture(
    video: NonSend<crate::assets::VideoSource>,
    device: Res<Device>,
    mut assets: ResMut<Assets>,
) {
    use crate::texture::Texture;

    if !video.frame_ready() {
        return;
    }
    let (width, height) = video.size();
    if width == 0 || height == 0 {
        return;
    }
    let recreate = match &assets.video_texture {
        Some(t) => t.texture.width() != width || t.texture.height() != height,
        None => true,
    };
    if recreate {
        assets.video_texture = Some(Texture::new_video_target(
            &device,
            width,
            height,
            "video texture",
        ));
        assets.video_generation += 1;
    }
    video.copy_to(&device, assets.video_texture.as_ref().unwrap());
}
