use super::{Queue, Resources};
use crate::program::Template;

/// Pbs holds the information for writing a PBS submission script
#[derive(Debug)]
pub struct Pbs {
    pub resources: Resources,
    pub template: Option<Template>,
}

impl Pbs {
    pub fn new(resources: Resources, template: Option<Template>) -> Self {
        Self {
            resources,
            template,
        }
    }
}

impl Queue for Pbs {
    const SCRIPT_EXT: &'static str = "pbs";

    fn default_header(&self) -> Template {
        Template::from(include_str!("../../templates/pbs.tpl"))
    }

    fn header(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    fn program_template(&self) -> Template {
        Template::from(include_str!("../../templates/pbs_molpro.tpl"))
    }

    /// PBS runs the script from the submission directory, so its output goes
    /// next to the Molpro files
    fn errdir(&self) -> &str {
        "molpro"
    }

    fn resources(&self) -> &Resources {
        &self.resources
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn pbs(template: Option<Template>) -> Pbs {
        Pbs::new(
            Resources {
                ppn: 8,
                queue_name: "medium".to_owned(),
                command: "molpro".to_owned(),
            },
            template,
        )
    }

    #[test]
    fn default() {
        let dir = tempfile::tempdir().unwrap();
        let path = pbs(None).write_submit_script(dir.path(), "well0").unwrap();
        assert_eq!(path, dir.path().join("well0.pbs"));
        let got = std::fs::read_to_string(path).unwrap();
        assert_snapshot!(got, @r"
        #!/bin/bash
        #PBS -N well0
        #PBS -l nodes=1:ppn=8
        #PBS -q medium
        #PBS -o molpro/well0.pbsout
        #PBS -e molpro/well0.pbserr
        #PBS -j oe

        cd $PBS_O_WORKDIR
        cd molpro
        molpro -n 8 --no-xml-output well0.inp
        ");
    }

    #[test]
    fn user_header() {
        let q = pbs(Some(Template::from("#PBS -N {{.name}} -l ppn={{.ppn}}\n")));
        assert_eq!(
            q.submit_script("ts1"),
            "#PBS -N ts1 -l ppn=8\ncd molpro\nmolpro -n 8 --no-xml-output ts1.inp\n"
        );
    }
}
