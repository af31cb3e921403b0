use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use kbchem::Species;
use nalgebra::Vector3;
use pes::Pes;
use qcio::{
    program::gaussian::{AseGaussian, Kwargs},
    program::molpro::{Calculation, Molpro},
    queue::{Pbs, Queue, Slurm},
};
use serde::de::DeserializeOwned;

pub mod config;

use config::{Config, QueueKind};


/// The kinds of Molpro input KinBot writes
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum InputKind {
    SinglePoint,
    Barrierless,
    VrcTst,
}

/// deserialize the JSON file at `path`
pub fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&s)
        .with_context(|| format!("failed to deserialize {}", path.display()))
}

/// build the [Calculation] for `kind` from the settings in `config`. a `shift`
/// vector and the number of atoms in the second fragment turn a barrierless
/// calculation into a product scan
pub fn calculation(
    config: &Config,
    kind: InputKind,
    shift: Option<(Vector3<f64>, usize)>,
) -> anyhow::Result<Calculation> {
    Ok(match (kind, shift) {
        (InputKind::SinglePoint, None) => Calculation::SinglePoint,
        (InputKind::Barrierless, None) => {
            Calculation::Barrierless(config.active_space)
        }
        (InputKind::Barrierless, Some((shift, natom1))) => {
            Calculation::BarrierlessScan {
                space: config.active_space,
                shift,
                natom1,
            }
        }
        (InputKind::VrcTst, None) => Calculation::VrcTst(config.vrc_tst.clone()),
        (kind, Some(_)) => {
            bail!("a shift vector only applies to barrierless inputs, not {kind:?}")
        }
    })
}

/// write the Molpro input for `calc` on `species` into `dir`
pub fn write_molpro_input(
    config: &Config,
    species: &Species,
    dir: &Path,
    name: &str,
    from_name: bool,
    calc: &Calculation,
) -> anyhow::Result<PathBuf> {
    let template = config.template(calc);
    Molpro::new(species, dir)
        .write_input(&template, name, from_name, calc)
        .with_context(|| {
            format!("failed to write molpro input for {}", species.name)
        })
}

/// read the energy stored under the configured key from the Molpro output for
/// `species`, or under `key` if one is given
pub fn molpro_energy(
    config: &Config,
    species: &Species,
    dir: &Path,
    name: &str,
    from_name: bool,
    key: Option<&str>,
) -> anyhow::Result<f64> {
    let key = key.unwrap_or(&config.energy_key);
    Molpro::new(species, dir)
        .read_energy(key, name, from_name)
        .with_context(|| {
            format!("failed to read {key} for {}", species.name)
        })
}

/// write the submit script for the Molpro job of `species` into `dir`
pub fn write_submit_script(
    config: &Config,
    species: &Species,
    dir: &Path,
    name: &str,
    from_name: bool,
) -> anyhow::Result<PathBuf> {
    let job = Molpro::new(species, dir).job_name(name, from_name);
    let template = config.queue_template.clone();
    let res = match config.queuing {
        QueueKind::Pbs => Pbs::new(config.resources(), template)
            .write_submit_script(dir, &job),
        QueueKind::Slurm => Slurm::new(
            config.resources(),
            config.slurm_feature.clone(),
            template,
        )
        .write_submit_script(dir, &job),
    };
    res.with_context(|| format!("failed to write submit script for {job}"))
}

/// write the summary and PES viewer input for `pes` into `dir`, returning
/// their paths
pub fn postprocess(
    config: &Config,
    mut pes: Pes,
    dir: &Path,
    use_xyz: bool,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    pes.high_level |= config.high_level;
    let summary = pes::create_summary_file(&pes, dir)
        .context("failed to write summary")?;
    let viewer = pes::create_pesviewer_input(&pes, dir, use_xyz)
        .context("failed to write PES viewer input")?;
    Ok((summary, viewer))
}

/// write the ASE driver that optimizes `species` as the end point of a TS
/// search to `dir/LABEL.py`
pub fn write_gauss_script(
    config: &Config,
    species: &Species,
    label: &str,
    dir: &Path,
) -> anyhow::Result<PathBuf> {
    let g = &config.gaussian;
    let kwargs =
        Kwargs::ts_end(species, label, &g.method, &g.basis, g.ppn, &g.memory);
    let template = config
        .gauss_template
        .clone()
        .unwrap_or_else(AseGaussian::default_template);
    AseGaussian::new(species, label, kwargs)
        .write_script(&template, &g.working_dir, &g.qc_command, dir)
        .with_context(|| format!("failed to write gaussian driver for {label}"))
}
