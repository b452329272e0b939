mod camera;
mod player;
mod scene_mesh;
mod teleport;
mod transform;

pub use camera::{Camera, CameraUniform, Projection, XrCamera};
pub use player::Player;
pub use scene_mesh::{MaterialRole, RoomMesh, SceneMesh};
pub use teleport::TeleportVisual;
pub use transform::Transform;
