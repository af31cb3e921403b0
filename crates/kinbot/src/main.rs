use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use kbchem::Species;
use kinbot::{
    InputKind, calculation, config::Config, load_json, molpro_energy,
    postprocess, write_gauss_script, write_molpro_input, write_submit_script,
};
use nalgebra::Vector3;

const DEFAULT_CONFIG: &str = "kinbot.toml";

/// Molpro and Gaussian input generation and post-processing for KinBot
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// Configuration file. Defaults to kinbot.toml if it exists and to the
    /// built-in settings otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Arguments identifying a single Molpro job
#[derive(clap::Args, Debug)]
struct Job {
    /// JSON file describing the species
    species: PathBuf,

    /// The job name. Defaults to the species name for wells and transition
    /// states and to the chemid otherwise.
    #[arg(short, long, default_value_t = String::new())]
    name: String,

    /// Use the species name even for products.
    #[arg(long, default_value_t = false)]
    from_name: bool,

    /// The Molpro directory.
    #[arg(short, long, default_value = "molpro")]
    dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a Molpro input file
    MolproInput {
        #[command(flatten)]
        job: Job,

        #[arg(short, long, value_enum, default_value_t = InputKind::SinglePoint)]
        kind: InputKind,

        /// Scan the last NATOM1 atoms along this vector in a barrierless
        /// product calculation.
        #[arg(
            long,
            num_args = 3,
            action = clap::ArgAction::Set,
            value_names = ["X", "Y", "Z"],
            allow_negative_numbers = true,
            requires = "natom1"
        )]
        shift: Option<Vec<f64>>,

        /// The number of atoms in the fragment being moved by --shift.
        #[arg(long, requires = "shift")]
        natom1: Option<usize>,
    },

    /// Print the energy from a Molpro output file
    MolproEnergy {
        #[command(flatten)]
        job: Job,

        /// The Molpro variable to read. Defaults to single_point_key from the
        /// configuration.
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Write the queue submission script for a Molpro job
    MolproSubmit {
        #[command(flatten)]
        job: Job,
    },

    /// Write the summary and PES viewer input for a finished PES
    Postprocess {
        /// JSON file describing the PES
        pes: PathBuf,

        /// The directory to write into.
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Skip writing the xyz/ directory of geometries.
        #[arg(long, default_value_t = false)]
        no_xyz: bool,
    },

    /// Write the ASE driver script for a Gaussian TS end point optimization
    GaussScript {
        /// JSON file describing the species
        species: PathBuf,

        /// The job label, used for the script, log, and checkpoint files.
        #[arg(short, long)]
        label: String,

        /// The directory to write into.
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(p) => Config::load(p),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            Config::load(DEFAULT_CONFIG)
        }
        None => {
            log::info!("no {DEFAULT_CONFIG} found, using default settings");
            Ok(Config::default())
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    log::debug!("{config}");

    match args.command {
        Command::MolproInput {
            job,
            kind,
            shift,
            natom1,
        } => {
            let species: Species = load_json(&job.species)?;
            let shift = match (shift.as_deref(), natom1) {
                (Some(&[x, y, z]), Some(n)) => Some((Vector3::new(x, y, z), n)),
                (None, None) => None,
                (shift, natom1) => bail!(
                    "--shift needs 3 components and --natom1, got {shift:?} \
                     and {natom1:?}"
                ),
            };
            let calc = calculation(&config, kind, shift)?;
            let path = write_molpro_input(
                &config,
                &species,
                &job.dir,
                &job.name,
                job.from_name,
                &calc,
            )?;
            println!("{}", path.display());
        }
        Command::MolproEnergy { job, key } => {
            let species: Species = load_json(&job.species)?;
            let energy = molpro_energy(
                &config,
                &species,
                &job.dir,
                &job.name,
                job.from_name,
                key.as_deref(),
            )?;
            println!("{energy}");
        }
        Command::MolproSubmit { job } => {
            let species: Species = load_json(&job.species)?;
            let path = write_submit_script(
                &config,
                &species,
                &job.dir,
                &job.name,
                job.from_name,
            )?;
            println!("{}", path.display());
        }
        Command::Postprocess { pes, dir, no_xyz } => {
            let pes = load_json(&pes)?;
            std::fs::create_dir_all(&dir).with_context(|| {
                format!("failed to create {}", dir.display())
            })?;
            let (summary, viewer) = postprocess(&config, pes, &dir, !no_xyz)?;
            println!("{}", summary.display());
            println!("{}", viewer.display());
        }
        Command::GaussScript {
            species,
            label,
            dir,
        } => {
            let species: Species = load_json(&species)?;
            let path = write_gauss_script(&config, &species, &label, &dir)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
