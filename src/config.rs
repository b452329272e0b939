//! Fixed names and tunables of the installation. Nothing here is
//! user-configurable at runtime.

// Switch between cloud and local file locations
pub const ASSET_BASE_URL: &str = "https://allotropeijk.blob.core.windows.net/2021summerexhibit/";
//pub const ASSET_BASE_URL: &str = "/resources/";

pub const ROOM_MODEL_FILE: &str = "victory.loop.glb";
pub const VIDEO_FILE: &str = "2020.11.07.modularseattle.nickbigelow.loop.mp4";
pub const LOADING_IMAGE_FILE: &str = "at.victory.lounge.01.loading.png";
pub const ENTER_IMAGE_FILE: &str = "at.victory.lounge.01.enter.png";
pub const UNSUPPORTED_IMAGE_FILE: &str = "at.victory.lounge.01.unsupported.png";

// Material names as authored in the room model
pub const ROOM_MATERIAL_NAME: &str = "room.001";
pub const FLOOR_MATERIAL_NAME: &str = "floor.001";

// Meshes that stay enabled when everything else is hidden after load.
// room.01 is the default variant; the cycler takes over from there.
pub const ROOT_MESH_NAME: &str = "__root__";
pub const DEFAULT_ROOM_MESH_NAME: &str = "room.01";
pub const GROUND_MESH_NAME: &str = "ground.01";

pub const ROOM_VARIANT_COUNT: usize = 4;

/// Milliseconds of accumulated frame time between variant switches. The
/// 60/70.5 factor retunes the four-second interval to the frame rate the
/// installation was authored against.
pub const CYCLE_PERIOD_MS: f32 = 4.0 * 1000.0 * (60.0 / 70.5);

/// Run the desktop free-roam camera when immersive-vr is unavailable
/// instead of showing the unsupported screen.
pub const FORCE_DESKTOP: bool = true;

// Teleportation helper visuals spawned for the immersive session
pub const TELEPORT_TARGET_MESH_NAME: &str = "teleportationTarget";
pub const TELEPORT_TORUS_MESH_NAME: &str = "torusTeleportation";
pub const TELEPORT_CONE_MESH_NAME: &str = "rotationCone";

// DOM ids the wasm build expects in the hosting page
pub const CANVAS_CONTAINER_ID: &str = "victory-lounge";
pub const PROMPT_IMAGE_ID: &str = "image";

/// Active variant mesh name for a cycle index, 1-based in the name.
pub fn room_variant_name(index: usize) -> String {
    format!("room.0{}", index + 1)
}
