//! Command-line entry point: parse a scene description, running every
//! `render` directive it contains as the parser reaches it (§2/§6).

use octatrace::scene::{load_scene, LoadOptions};
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(name = "octatrace", about = "Offline Monte-Carlo path tracer")]
struct Opt {
    /// Path to the scene description file.
    #[structopt(parse(from_os_str))]
    scene: PathBuf,

    /// Directory `define shape obj` resolves mesh/material files against
    /// (default: the scene file's own directory).
    #[structopt(long, parse(from_os_str))]
    obj_dir: Option<PathBuf>,

    /// Write ASCII P3 PPMs instead of the default binary P6.
    #[structopt(long)]
    ascii_ppm: bool,

    /// Print info-level progress (pass twice for debug-level).
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn main() {
    let opt = Opt::from_args();
    let level = match opt.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = LoadOptions {
        obj_dir: opt.obj_dir.as_deref(),
        ascii_ppm: opt.ascii_ppm,
    };

    let (_scene, jobs) = match load_scene(&opt.scene, options) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::error!("failed to load {}: {}", opt.scene.display(), err);
            process::exit(1);
        }
    };

    if jobs.is_empty() {
        log::warn!("{} queued no render jobs, nothing to do", opt.scene.display());
    }
}
