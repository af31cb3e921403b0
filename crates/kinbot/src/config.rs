//! Configuration settings for the KinBot quantum chemistry steps, read from
//! `kinbot.toml`

use std::{
    fmt::{Debug, Display},
    fs::read_to_string,
    path::Path,
};

use anyhow::{Context, bail};
use qcio::{
    program::{
        ProgramError, Template,
        molpro::{ActiveSpace, Calculation, VrcTst},
    },
    queue::Resources,
};
use serde::Deserialize;

#[cfg(test)]
mod tests;

/// Templates can either be literal strings in the config file, or the name of a
/// file to be loaded
#[derive(Clone, Deserialize, PartialEq, Debug)]
#[serde(untagged)]
enum TemplateSrc {
    Literal(String),
    File { file: String },
}

impl TryFrom<TemplateSrc> for Template {
    type Error = ProgramError;

    fn try_from(value: TemplateSrc) -> Result<Self, Self::Error> {
        match value {
            TemplateSrc::Literal(s) => Ok(s.into()),
            TemplateSrc::File { file } => Template::load(file),
        }
    }
}

fn load_template(
    src: Option<TemplateSrc>,
) -> Result<Option<Template>, ProgramError> {
    src.map(Template::try_from).transpose()
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    /// Molpro template for the single-point energies of wells, products and
    /// transition states. Supported directives are {{.name}}, {{.natom}},
    /// {{.geom}}, {{.nelectron}}, {{.symm}}, {{.spin}}, and {{.charge}}.
    single_point_template: Option<TemplateSrc>,

    /// Molpro template for barrierless saddle points. In addition to the
    /// single-point directives, {{.state}}, {{.closed}}, and {{.occ}} are
    /// filled from the active space settings.
    barrierless_saddle_single_point_template: Option<TemplateSrc>,

    /// Molpro template for scanning the products of a barrierless reaction
    /// apart, with the extra directives {{.scancoo}}, {{.scanstart}}, and
    /// {{.shift}}.
    barrierless_saddle_prod_single_point_template: Option<TemplateSrc>,

    /// Molpro template for a VRC-TST sampling point.
    vrc_tst_template: Option<TemplateSrc>,

    /// The header of the queue submission script for Molpro jobs, with
    /// {{.name}}, {{.ppn}}, {{.queue_name}}, {{.errdir}}, and {{.command}}
    /// directives, as well as {{.slurm_feature}} for Slurm.
    q_temp_l3: Option<TemplateSrc>,

    /// The driver script for Gaussian jobs run through ASE.
    gauss_template: Option<TemplateSrc>,

    /// The number of active electrons in barrierless saddle point
    /// calculations.
    #[serde(default = "default_bls_nelectron")]
    barrierless_saddle_nelectron: usize,

    /// The number of active orbitals in barrierless saddle point
    /// calculations.
    #[serde(default = "default_bls_norbital")]
    barrierless_saddle_norbital: usize,

    /// The number of states to average over in barrierless saddle point
    /// calculations.
    #[serde(default = "default_bls_nstate")]
    barrierless_saddle_nstate: usize,

    /// The settings for VRC-TST inputs. See [VrcTst] for the fields.
    #[serde(default)]
    vrc_tst: VrcTst,

    /// The queuing system to submit Molpro jobs to. Currently-supported values
    /// are "pbs" and "slurm".
    #[serde(default)]
    queuing: QueueKind,

    /// The name of the queue or partition to submit to.
    #[serde(default = "default_queue_name")]
    queue_name: String,

    /// The number of processors to request for each Molpro job.
    #[serde(default = "default_ppn")]
    single_point_ppn: usize,

    /// The command used to run Molpro in the submit script.
    #[serde(default = "default_command")]
    single_point_command: String,

    /// An extra line for Slurm headers, typically a `#SBATCH -C` constraint.
    #[serde(default)]
    slurm_feature: String,

    /// Whether the high-level calculations were run. When they were not,
    /// R_Addition_MultipleBond barriers are taken relative to the MP2 well.
    #[serde(default)]
    high_level: bool,

    /// The Molpro variable holding the energy to read from single-point
    /// outputs.
    #[serde(default = "default_key")]
    single_point_key: String,

    /// Settings for Gaussian jobs.
    #[serde(default)]
    gaussian: Gaussian,
}

fn default_bls_nelectron() -> usize {
    2
}

fn default_bls_norbital() -> usize {
    2
}

fn default_bls_nstate() -> usize {
    1
}

fn default_queue_name() -> String {
    "medium".to_owned()
}

fn default_ppn() -> usize {
    4
}

fn default_command() -> String {
    "molpro".to_owned()
}

fn default_key() -> String {
    "MYENA".to_owned()
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum QueueKind {
    #[default]
    #[serde(alias = "pbs")]
    Pbs,
    #[serde(alias = "slurm")]
    Slurm,
}

impl Display for QueueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                QueueKind::Pbs => "pbs",
                QueueKind::Slurm => "slurm",
            }
        )
    }
}

/// The settings for Gaussian transition state end point jobs
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Gaussian {
    pub method: String,
    pub basis: String,
    pub ppn: usize,
    pub memory: String,
    /// the command ASE uses to run Gaussian
    pub qc_command: String,
    /// the directory holding `kinbot.db`
    pub working_dir: String,
}

impl Default for Gaussian {
    fn default() -> Self {
        Self {
            method: "b3lyp".to_owned(),
            basis: "6-31G".to_owned(),
            ppn: 1,
            memory: "1000MB".to_owned(),
            qc_command: "g09".to_owned(),
            working_dir: ".".to_owned(),
        }
    }
}

/// Construct a full `Config` using [Config::load] on a TOML file or start from
/// [Config::default]
#[derive(Clone, Deserialize, PartialEq, Debug)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    /// user templates overriding the ones embedded in [qcio]. `None` means use
    /// the default for that kind of calculation
    pub single_point_template: Option<Template>,
    pub barrierless_template: Option<Template>,
    pub barrierless_prod_template: Option<Template>,
    pub vrc_tst_template: Option<Template>,

    /// the queue header template. the queue's default header is used if this
    /// is `None`
    pub queue_template: Option<Template>,

    pub gauss_template: Option<Template>,

    pub active_space: ActiveSpace,

    pub vrc_tst: VrcTst,

    pub queuing: QueueKind,

    pub queue_name: String,

    /// processors per Molpro job
    pub ppn: usize,

    pub command: String,

    pub slurm_feature: String,

    pub high_level: bool,

    /// the Molpro variable to read energies from
    pub energy_key: String,

    pub gaussian: Gaussian,
}

impl TryFrom<RawConfig> for Config {
    type Error = ProgramError;

    fn try_from(rc: RawConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            single_point_template: load_template(rc.single_point_template)?,
            barrierless_template: load_template(
                rc.barrierless_saddle_single_point_template,
            )?,
            barrierless_prod_template: load_template(
                rc.barrierless_saddle_prod_single_point_template,
            )?,
            vrc_tst_template: load_template(rc.vrc_tst_template)?,
            queue_template: load_template(rc.q_temp_l3)?,
            gauss_template: load_template(rc.gauss_template)?,
            active_space: ActiveSpace {
                nelectron: rc.barrierless_saddle_nelectron,
                norbital: rc.barrierless_saddle_norbital,
                nstate: rc.barrierless_saddle_nstate,
            },
            vrc_tst: rc.vrc_tst,
            queuing: rc.queuing,
            queue_name: rc.queue_name,
            ppn: rc.single_point_ppn,
            command: rc.single_point_command,
            slurm_feature: rc.slurm_feature,
            high_level: rc.high_level,
            energy_key: rc.single_point_key,
            gaussian: rc.gaussian,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            single_point_template: None,
            barrierless_template: None,
            barrierless_prod_template: None,
            vrc_tst_template: None,
            queue_template: None,
            gauss_template: None,
            active_space: ActiveSpace {
                nelectron: default_bls_nelectron(),
                norbital: default_bls_norbital(),
                nstate: default_bls_nstate(),
            },
            vrc_tst: VrcTst::default(),
            queuing: QueueKind::default(),
            queue_name: default_queue_name(),
            ppn: default_ppn(),
            command: default_command(),
            slurm_feature: String::new(),
            high_level: false,
            energy_key: default_key(),
            gaussian: Gaussian::default(),
        }
    }
}

impl Config {
    /// load a [Config] from the TOML file specified by `filename` and check
    /// that its settings make sense
    pub fn load<P>(filename: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path> + Debug,
    {
        let contents = read_to_string(&filename)
            .with_context(|| format!("failed to load config file {filename:?}"))?;
        let ret: Self = toml::from_str(&contents).with_context(|| {
            format!("failed to deserialize config file {filename:?}")
        })?;
        ret.validate()?;
        Ok(ret)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.ppn == 0 {
            bail!("single_point_ppn must be at least 1");
        }
        if self.gaussian.ppn == 0 {
            bail!("gaussian.ppn must be at least 1");
        }
        let ActiveSpace {
            nelectron,
            norbital,
            nstate,
        } = self.active_space;
        if nstate == 0 {
            bail!("barrierless_saddle_nstate must be at least 1");
        }
        if nelectron > 2 * norbital {
            bail!(
                "{nelectron} active electrons do not fit in {norbital} \
                 active orbitals"
            );
        }
        Ok(())
    }

    /// the template to use for `calc`, preferring the user's over the default
    pub fn template(&self, calc: &Calculation) -> Template {
        let user = match calc {
            Calculation::SinglePoint => &self.single_point_template,
            Calculation::Barrierless(_) => &self.barrierless_template,
            Calculation::BarrierlessScan { .. } => &self.barrierless_prod_template,
            Calculation::VrcTst(_) => &self.vrc_tst_template,
        };
        match user {
            Some(t) => t.clone(),
            None => calc.default_template(),
        }
    }

    pub fn resources(&self) -> Resources {
        Resources {
            ppn: self.ppn,
            queue_name: self.queue_name.clone(),
            command: self.command.clone(),
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Config {
            single_point_template,
            barrierless_template,
            barrierless_prod_template,
            vrc_tst_template,
            queue_template,
            gauss_template,
            active_space,
            vrc_tst,
            queuing,
            queue_name,
            ppn,
            command,
            slurm_feature,
            high_level,
            energy_key,
            gaussian,
        } = self;
        let src = |t: &Option<Template>| match t {
            Some(_) => "user",
            None => "default",
        };
        write!(
            f,
            "
Configuration Options:
single_point_template = {}
barrierless_saddle_single_point_template = {}
barrierless_saddle_prod_single_point_template = {}
vrc_tst_template = {}
q_temp_l3 = {}
gauss_template = {}
barrierless_saddle_nelectron = {}
barrierless_saddle_norbital = {}
barrierless_saddle_nstate = {}
vrc_tst basis = {}
queuing = {queuing}
queue_name = {queue_name}
single_point_ppn = {ppn}
single_point_command = {command}
slurm_feature = {slurm_feature}
high_level = {high_level}
single_point_key = {energy_key}
gaussian = {} / {} on {} processors with {}
",
            src(single_point_template),
            src(barrierless_template),
            src(barrierless_prod_template),
            src(vrc_tst_template),
            src(queue_template),
            src(gauss_template),
            active_space.nelectron,
            active_space.norbital,
            active_space.nstate,
            vrc_tst.basis,
            gaussian.method,
            gaussian.basis,
            gaussian.ppn,
            gaussian.memory,
        )
    }
}
