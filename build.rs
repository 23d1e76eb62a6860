use clap::CommandFactory;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

const MANPAGE: &str = "facetscope.1";

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=crates/facetscope-cli/src/lib.rs");

    let mut page = Vec::new();
    clap_mangen::Man::new(facetscope_cli::Args::command()).render(&mut page)?;

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::other("OUT_DIR not set"))?;
    fs::write(out_dir.join(MANPAGE), &page)?;

    // Release builds also drop the page next to the binary (target/release/).
    if env::var("PROFILE").as_deref() == Ok("release") {
        if let Some(target_dir) = out_dir.ancestors().nth(3) {
            fs::write(target_dir.join(MANPAGE), &page)?;
        }
    }

    Ok(())
}
