use super::{Queue, Resources};
use crate::program::Template;

/// Slurm holds the information for writing a Slurm submission script
#[derive(Debug)]
pub struct Slurm {
    pub resources: Resources,
    /// an extra line for the header, typically an `#SBATCH -C` constraint
    pub slurm_feature: String,
    pub template: Option<Template>,
}

impl Slurm {
    pub fn new(
        resources: Resources,
        slurm_feature: String,
        template: Option<Template>,
    ) -> Self {
        Self {
            resources,
            slurm_feature,
            template,
        }
    }
}

impl Queue for Slurm {
    const SCRIPT_EXT: &'static str = "slurm";

    fn default_header(&self) -> Template {
        Template::from(include_str!("../../templates/slurm.tpl"))
    }

    fn header(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    fn program_template(&self) -> Template {
        Template::from(include_str!("../../templates/slurm_molpro.tpl"))
    }

    fn errdir(&self) -> &str {
        "."
    }

    fn resources(&self) -> &Resources {
        &self.resources
    }

    fn substitutions(&self, name: &str) -> Vec<(&'static str, String)> {
        let res = &self.resources;
        vec![
            ("name", name.to_owned()),
            ("ppn", res.ppn.to_string()),
            ("queue_name", res.queue_name.clone()),
            ("errdir", self.errdir().to_owned()),
            ("command", res.command.clone()),
            ("slurm_feature", self.slurm_feature.clone()),
        ]
    }
}
