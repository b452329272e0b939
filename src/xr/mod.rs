mod utils;
mod webxr;

pub use webxr::{probe_immersive_support, WebXRApp};
