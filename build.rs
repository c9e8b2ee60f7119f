//! Build script rendering the `osi-reassembly(1)` manual page.
//!
//! The page lands in `target/generated-man/` so packaging can pick it up at a
//! stable path; `OUT_DIR` is hashed per build. Set
//! `OSI_REASSEMBLY_MAN_DIR` to write it elsewhere.

use std::{env, fs, path::PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
mod cli;

const MAN_DIR_VAR: &str = "OSI_REASSEMBLY_MAN_DIR";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-env-changed={MAN_DIR_VAR}");

    let out_dir = env::var_os(MAN_DIR_VAR)
        .map_or_else(|| PathBuf::from("target/generated-man"), PathBuf::from);
    fs::create_dir_all(&out_dir)?;

    let man = Man::new(cli::Cli::command());
    let mut page = Vec::new();
    man.render(&mut page)?;
    fs::write(out_dir.join("osi-reassembly.1"), page)?;

    Ok(())
}
