//! Driver scripts that run Gaussian through ASE. The script itself handles
//! the retry after a failed optimization and records the outcome in the ASE
//! database in the working directory.

use std::{
    fmt::{Display, Write},
    path::{Path, PathBuf},
};

use kbchem::Species;

use super::{ProgramError, Template, read_file, write_file};

/// A value in the Gaussian calculator keyword dictionary, rendered as a Python
/// literal
#[derive(Clone, Debug, PartialEq)]
pub enum PyValue {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
}

impl Display for PyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PyValue::Str(s) => {
                let s = s
                    .replace('\\', "\\\\")
                    .replace('\'', "\\'")
                    .replace('\n', "\\n")
                    .replace('\r', "\\r");
                write!(f, "'{s}'")
            }
            PyValue::Int(i) => write!(f, "{i}"),
            PyValue::Bool(true) => write!(f, "True"),
            PyValue::Bool(false) => write!(f, "False"),
            PyValue::None => write!(f, "None"),
        }
    }
}

impl From<&str> for PyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for PyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for PyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for PyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Keyword arguments for `ase.calculators.gaussian.Gaussian`, kept in
/// insertion order. Setting an existing key replaces its value in place
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Kwargs(Vec<(String, PyValue)>);

impl Kwargs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<PyValue>) -> &mut Self {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.0.push((key.to_owned(), value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&PyValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// the keywords KinBot uses to optimize the end point of a transition
    /// state search and compute its frequencies
    pub fn ts_end(
        species: &Species,
        label: &str,
        method: &str,
        basis: &str,
        ppn: usize,
        mem: &str,
    ) -> Self {
        let mut ret = Self::new();
        ret.set("method", method)
            .set("basis", basis)
            .set("nprocshared", ppn as i64)
            .set("mem", mem)
            .set("chk", label)
            .set("label", label)
            .set("NoSymm", "NoSymm")
            .set("multiplicity", species.mult as i64)
            .set("charge", species.charge as i64)
            .set("scf", "xqc")
            .set("opt", "CalcFC, TS, NoEigenTest, MaxCycle=999")
            .set("freq", "freq");
        ret
    }
}

impl Display for Kwargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {v}", PyValue::Str(k.clone()))?;
        }
        write!(f, "}}")
    }
}

/// A Gaussian job run by an ASE driver script
pub struct AseGaussian<'a> {
    species: &'a Species,
    pub label: String,
    pub kwargs: Kwargs,
}

impl<'a> AseGaussian<'a> {
    pub fn new(species: &'a Species, label: &str, kwargs: Kwargs) -> Self {
        Self {
            species,
            label: label.to_owned(),
            kwargs,
        }
    }

    /// the driver KinBot uses for the end point of a TS search
    pub fn default_template() -> Template {
        Template::from(include_str!("../../templates/ase_gauss_ts_end.tpl.py"))
    }

    /// the atomic symbols as a Python list
    fn atom_list(&self) -> String {
        let syms: Vec<_> = self
            .species
            .symbols()
            .into_iter()
            .map(|s| format!("'{s}'"))
            .collect();
        format!("[{}]", syms.join(", "))
    }

    /// the cartesian geometry as a nested Python list
    fn geom_list(&self) -> String {
        let mut ret = String::from("[");
        for (i, a) in self.species.atoms.iter().enumerate() {
            if i > 0 {
                ret.push_str(", ");
            }
            write!(ret, "[{:.8}, {:.8}, {:.8}]", a.x, a.y, a.z).unwrap();
        }
        ret.push(']');
        ret
    }

    /// render `template` into a Python script
    pub fn script(
        &self,
        template: &Template,
        working_dir: &str,
        qc_command: &str,
    ) -> String {
        template.fill(&[
            ("working_dir", working_dir.to_owned()),
            ("atom", self.atom_list()),
            ("geom", self.geom_list()),
            ("kwargs", self.kwargs.to_string()),
            ("qc_command", qc_command.to_owned()),
            ("label", self.label.clone()),
        ])
    }

    /// write the script to `dir/LABEL.py`, returning its path
    pub fn write_script(
        &self,
        template: &Template,
        working_dir: &str,
        qc_command: &str,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf, ProgramError> {
        let path = dir.as_ref().join(format!("{}.py", self.label));
        write_file(&path, &self.script(template, working_dir, qc_command))?;
        log::debug!("wrote gaussian driver {}", path.display());
        Ok(path)
    }
}

/// whether the driver script has finished with the Gaussian log at `log`,
/// as marked by the final `done` line it appends
pub fn job_done(log: impl AsRef<Path>) -> Result<bool, ProgramError> {
    let contents = read_file(log.as_ref())?;
    Ok(contents
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .is_some_and(|l| l.trim() == "done"))
}
