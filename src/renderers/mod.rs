mod installation;
mod shader_utils;

pub use installation::InstallationPass;
