#![recursion_limit = "1024"]

mod output {
    pub mod path;
}

use clap::{App, Arg};
use colored::*;
use log::{error, info};
use pbr::ProgressBar;
use sigma_core::config::Settings;
use sigma_core::errors::*;
use sigma_core::field::Boundary;
use sigma_core::grid::Grid;
use sigma_core::orchestrator::Orchestrator;
use sigma_core::output::{collect_frame, BincodeSink, ConstantsFrame, Dimensions, OutputSink};
use sigma_core::restart::Snapshot;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::output::path::OutputPath;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> String {
    let mut s = String::from("");
    if cfg!(feature = "single") {
        s.push_str("-s");
    }
    format!("{}{}", VERSION, s)
}

fn main() {
    env_logger::init();

    if let Err(ref e) = run() {
        error!("{}: {}", "error".red(), e);

        for e in e.iter().skip(1) {
            error!("caused by: {}", e);
        }

        if let Some(backtrace) = e.backtrace() {
            error!("backtrace: {:?}", backtrace);
        }

        std::process::exit(1);
    }

    std::process::exit(0);
}

/// Parse arguments, build (or resume) the orchestrator, and drive the
/// stepping loop. Owns no dynamical-core logic: only sequencing and
/// reporting, per the front end's place as an external collaborator.
fn run() -> Result<()> {
    let matches = App::new("sigma_gcm")
        .version(version().as_str())
        .about("Hydrostatic sigma-coordinate dynamical core")
        .arg(
            Arg::with_name("parameter_file")
                .short("p")
                .long("parameter-file")
                .takes_value(true)
                .required(true)
                .help("Path to the TOML parameter file"),
        )
        .arg(
            Arg::with_name("output_directory")
                .short("o")
                .long("output-directory")
                .takes_value(true)
                .default_value("output")
                .help("Directory the run's output and snapshot go into"),
        )
        .arg(
            Arg::with_name("resume")
                .long("resume")
                .takes_value(true)
                .value_name("SNAPSHOT")
                .help("Resume from a restart snapshot written by a previous run"),
        )
        .arg(
            Arg::with_name("progress_bar")
                .long("progress-bar")
                .help("Show a progress bar on stderr"),
        )
        .get_matches();

    let settings = Settings::read_parameter_file(matches.value_of("parameter_file").unwrap())
        .chain_err(|| "error reading parameter file")?;

    let output_dir = Path::new(matches.value_of("output_directory").unwrap());
    let path = OutputPath::new(output_dir, "sigma_gcm");
    path.create().chain_err(|| "cannot create output directory")?;

    let grid = Grid::new(settings.grid.into()).chain_err(|| "invalid grid configuration")?;

    let mut orchestrator = if let Some(snapshot_path) = matches.value_of("resume") {
        info!("Resuming from snapshot '{}'.", snapshot_path);
        let snapshot =
            Snapshot::read(snapshot_path, &grid.desc).chain_err(|| "cannot load restart snapshot")?;
        Orchestrator::from_snapshot(settings.clone(), snapshot)
            .chain_err(|| "cannot restore orchestrator state")?
    } else {
        let boundary = Boundary::new(&grid);
        Orchestrator::new(settings.clone(), boundary).chain_err(|| "cannot initialize orchestrator")?
    };

    let mut sink = BincodeSink::create(path.with_extension("out"))
        .chain_err(|| "cannot create output file")?;
    sink.write_dimensions(&Dimensions::new(&orchestrator.grid))
        .chain_err(|| "cannot write output dimensions")?;
    sink.write_constants(&ConstantsFrame::from_boundary(
        &orchestrator.boundary,
        orchestrator.grid.nb(),
    ))
    .chain_err(|| "cannot write output constants")?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        })
        .chain_err(|| "cannot install interrupt handler")?;
    }

    let show_progress = matches.is_present("progress_bar");
    let mut pb = ProgressBar::new(settings.time.num_steps as u64);
    pb.format("┫██░┣");
    pb.show_bar = show_progress;
    pb.show_counter = show_progress;
    pb.show_percent = show_progress;
    pb.show_speed = show_progress;
    pb.show_time_left = show_progress;
    pb.show_message = show_progress;

    let interval = settings.output.output_interval.max(1);
    let dt = settings.time.dt;

    for _ in 0..settings.time.num_steps {
        if !running.load(Ordering::SeqCst) {
            info!("Caught interrupt; writing final snapshot and exiting early.");
            break;
        }

        orchestrator.step().chain_err(|| "numerical breakdown during timestep")?;
        pb.inc();

        if orchestrator.timestep % interval == 0 {
            let frame = collect_frame(
                &orchestrator.grid,
                &orchestrator.state,
                &orchestrator.diag,
                orchestrator.timestep,
                orchestrator.timestep as sigma_core::Float * dt,
                &settings.output.output_fields,
            );
            sink.write_frame(&frame).chain_err(|| "cannot write output frame")?;
        }
    }

    pb.finish_print(&format!("{} {} ", "done".green().bold(), "✓"));
    println!();

    let snapshot_path = path.with_extension("restart");
    orchestrator
        .to_snapshot()
        .write(&snapshot_path)
        .chain_err(|| "error writing final snapshot")?;
    info!("Wrote final snapshot to '{}'.", snapshot_path.display());

    Ok(())
}
