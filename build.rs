use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

// Native builds read assets from OUT_DIR/res; the wasm build fetches them
// from the asset base URL instead and never touches this copy.
fn main() -> Result<()> {
    for entry in glob::glob("res/**/*")? {
        println!("cargo:rerun-if-changed={}", entry?.display());
    }

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    if manifest_dir.join("res").exists() {
        copy_items(&vec!["res/"], out_dir, &copy_options)?;
    }

    Ok(())
}
