use particle_life::driver::start_simulation;
use particle_life::frame::write_frame;
use particle_life::{ParticleLife, Simulation, SimulationParameters, SimulationStatistics};

use std::path::PathBuf;
use std::sync::mpsc::channel;

use eyre::WrapErr;
use structopt::StructOpt;
use tracing::{info, Level};

#[derive(StructOpt, Debug)]
#[structopt(name = "particle_life")]
struct Opt {
    /// JSON file with simulation parameters. Missing fields use the defaults.
    #[structopt(short, long)]
    config: Option<PathBuf>,
    /// Write every frame as MessagePack into this directory.
    #[structopt(short, long)]
    output_dir: Option<PathBuf>,
    #[structopt(short, long, default_value = "600")]
    frames: usize,
    #[structopt(long, default_value = "1")]
    steps_per_frame: usize,
    /// Overrides the seed from the config file.
    #[structopt(long)]
    seed: Option<u64>,
    /// Print the default parameters as JSON and exit.
    #[structopt(long)]
    print_config: bool,
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn main() -> eyre::Result<()> {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if opt.print_config {
        let json = serde_json::to_string_pretty(&SimulationParameters::default())?;
        println!("{}", json);
        return Ok(());
    }

    let mut params = match &opt.config {
        Some(path) => SimulationParameters::load(path)?,
        None => SimulationParameters::default(),
    };
    if opt.seed.is_some() {
        params.seed = opt.seed;
    }

    let mut sim = ParticleLife::new(params)?;
    let steps_per_frame = opt.steps_per_frame.max(1);

    if let Some(dir) = opt.output_dir {
        std::fs::create_dir_all(&dir)
            .wrap_err_with(|| format!("Failed to create output directory: {:?}", &dir))?;

        let (stop_tx, stop_rx) = channel();
        let vert_rx = start_simulation(sim, steps_per_frame, stop_rx)?;

        for frame in 0..opt.frames {
            let verts = vert_rx.recv()?;
            let path = write_frame(&dir, frame, &verts)?;
            info!(frame, ?path, "Wrote frame");
        }

        drop(stop_tx);
    } else {
        info!("No output directory given, running headless.");
        for frame in 0..opt.frames {
            sim.simulate_frame();
            for _ in 1..steps_per_frame {
                sim.step();
            }

            if frame % 60 == 0 || frame + 1 == opt.frames {
                info!(
                    frame,
                    time = sim.total_time(),
                    kinetic_energy = sim.kinetic_energy(),
                    mean_speed = sim.mean_speed(),
                    "Progress"
                );
            }
        }
    }

    Ok(())
}
