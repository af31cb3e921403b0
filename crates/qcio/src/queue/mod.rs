//! Submission scripts for running Molpro jobs on a queuing system. A script is
//! the queue header template followed by the program invocation template.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::program::{ProgramError, Template, write_file};

pub mod pbs;
pub mod slurm;

pub use pbs::Pbs;
pub use slurm::Slurm;

/// The resources requested for a single-point job
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    /// processors per node
    pub ppn: usize,
    pub queue_name: String,
    /// the command that runs Molpro
    pub command: String,
}

pub trait Queue {
    /// the extension to append to submit scripts for this type of Queue
    const SCRIPT_EXT: &'static str;

    /// the header distributed with KinBot
    fn default_header(&self) -> Template;

    /// a user-supplied header to use instead of [Queue::default_header]
    fn header(&self) -> Option<&Template>;

    /// the part of the script that runs Molpro
    fn program_template(&self) -> Template;

    /// the directory for the queue's own output and error files
    fn errdir(&self) -> &str;

    fn resources(&self) -> &Resources;

    /// values for the directives in the submit script for the job `name`
    fn substitutions(&self, name: &str) -> Vec<(&'static str, String)> {
        let res = self.resources();
        vec![
            ("name", name.to_owned()),
            ("ppn", res.ppn.to_string()),
            ("queue_name", res.queue_name.clone()),
            ("errdir", self.errdir().to_owned()),
            ("command", res.command.clone()),
        ]
    }

    /// the full text of the submit script for `name`
    fn submit_script(&self, name: &str) -> String {
        let head = match self.header() {
            Some(h) => h.clone(),
            None => self.default_header(),
        };
        head.join(&self.program_template())
            .fill(&self.substitutions(name))
    }

    /// write the submit script for `name` to `dir/NAME.SCRIPT_EXT` and return
    /// its path
    fn write_submit_script(
        &self,
        dir: &Path,
        name: &str,
    ) -> Result<PathBuf, ProgramError> {
        let path = dir.join(format!("{name}.{}", Self::SCRIPT_EXT));
        write_file(&path, &self.submit_script(name))?;
        log::debug!("wrote submit script {}", path.display());
        Ok(path)
    }
}
