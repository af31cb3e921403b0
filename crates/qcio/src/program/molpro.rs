use std::{
    fmt::Write,
    path::{Path, PathBuf},
};

use kbchem::{Species, consts::PROTON_CHEMID, zmat::simple_zmat};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::{ProgramError, Template, parse_energy, read_file, write_file};

#[cfg(test)]
pub(crate) mod tests;

/// the length of the step taken along the shift vector in a barrierless
/// product scan, in Å
const SCAN_STEP: f64 = 0.5;

const DEFAULT_VRC_TST_OPTIONS: &str = "GPRINT,ORBITALS,ORBEN,CIVECTOR;
GTHRESH,energy=1.d-7;
bohr;
orient,noorient;
";

/// The size of the active space for the CASPT2-like barrierless saddle point
/// calculations
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveSpace {
    /// number of active electrons
    pub nelectron: usize,
    /// number of active orbitals
    pub norbital: usize,
    /// number of states to average over
    pub nstate: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeomType {
    #[default]
    Xyz,
    Zmat,
}

/// Which z-matrix variables to hold fixed or to optimize in an `optg` block.
/// `inactive` takes precedence over `active` when both are given
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Displacements {
    pub optg: bool,
    pub active: Vec<String>,
    pub inactive: Vec<String>,
}

/// Extra files for Molpro to `put` after the calculation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Put {
    pub xml: bool,
    pub molden: bool,
    pub xyz: bool,
}

/// The settings for a single VRC-TST scan point
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VrcTst {
    /// the basis set, spliced in as `basis = {basis}`
    pub basis: String,
    /// the method lines following `rhf;`
    pub method: String,
    /// global options. defaults to printing orbitals with a loose energy
    /// threshold and no reorientation
    pub options: Option<String>,
    pub displacements: Displacements,
    pub put: Put,
    /// user variable definitions placed before any z-matrix variables
    pub variables: String,
    pub geom_type: GeomType,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Calculation {
    SinglePoint,
    /// a barrierless saddle point single point
    Barrierless(ActiveSpace),
    /// a scan moving the last `natom1` atoms along `shift`
    BarrierlessScan {
        space: ActiveSpace,
        shift: Vector3<f64>,
        natom1: usize,
    },
    VrcTst(VrcTst),
}

impl Calculation {
    /// the template distributed with KinBot for this kind of calculation
    pub fn default_template(&self) -> Template {
        Template::from(match self {
            Calculation::SinglePoint => {
                include_str!("../../templates/molpro.tpl")
            }
            Calculation::Barrierless(_) => {
                include_str!("../../templates/molpro_bls.tpl")
            }
            Calculation::BarrierlessScan { .. } => {
                include_str!("../../templates/molpro_bls_prod.tpl")
            }
            Calculation::VrcTst(_) => {
                include_str!("../../templates/molpro_vrc_tst.tpl")
            }
        })
    }
}

/// Writes Molpro input files for, and reads energies from the output files
/// of, a single species
pub struct Molpro<'a> {
    species: &'a Species,
    dir: PathBuf,
}

impl<'a> Molpro<'a> {
    /// `dir` is the directory holding the input and output files, usually
    /// `molpro`
    pub fn new(species: &'a Species, dir: impl Into<PathBuf>) -> Self {
        Self {
            species,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// the base name of the job. an explicit `name` wins, then the species
    /// name for wells, transition states, or when `from_name` is set, and
    /// finally the chemid
    pub fn job_name(&self, name: &str, from_name: bool) -> String {
        if !name.is_empty() {
            name.to_owned()
        } else if self.species.wellorts || from_name {
            self.species.name.clone()
        } else {
            self.species.chemid.clone()
        }
    }

    /// the index of the Molpro point group irrep to use for the ground state
    /// of some small open-shell species
    pub fn symm(&self) -> usize {
        let mult = self.species.mult;
        let mut atoms = self.species.symbols();
        match atoms.as_slice() {
            ["O"] | ["S"] | ["O", "O"] if mult == 3 => return 4,
            _ => {}
        }
        atoms.sort_unstable();
        if atoms == ["H", "O"] && mult == 2 {
            return 2;
        }
        1
    }

    fn spin(&self) -> usize {
        self.species.mult.saturating_sub(1)
    }

    /// one `sym x y z` line per atom
    fn geom(&self) -> String {
        let mut ret = String::with_capacity(50 * self.species.natom());
        for atom in &self.species.atoms {
            writeln!(
                ret,
                "{} {:.8} {:.8} {:.8}",
                atom.label(),
                atom.x,
                atom.y,
                atom.z
            )
            .unwrap();
        }
        ret
    }

    /// the substitutions shared by every kind of input
    fn common(&self, name: &str) -> Vec<(&'static str, String)> {
        vec![
            ("name", name.to_owned()),
            ("nelectron", self.species.nelectron().to_string()),
            ("symm", self.symm().to_string()),
            ("spin", self.spin().to_string()),
            ("charge", self.species.charge.to_string()),
        ]
    }

    fn active_space(
        &self,
        space: &ActiveSpace,
    ) -> Result<Vec<(&'static str, String)>, ProgramError> {
        let inactive = self.species.nelectron() - space.nelectron as isize;
        if inactive < 0 {
            return Err(ProgramError::InvalidInput(format!(
                "{} active electrons requested for {} with only {}",
                space.nelectron,
                self.species.name,
                self.species.nelectron()
            )));
        }
        let closed = inactive as f64 / 2.0;
        if closed.fract() != 0.0 {
            log::warn!(
                "The number of closed orbitals for {} is not an integer ({closed}). \
                 The CASPT2-like calculation will crash. Revise the number of \
                 active electrons",
                self.species.name
            );
        }
        let occ = closed + space.norbital as f64;
        Ok(vec![
            ("state", space.nstate.to_string()),
            ("closed", closed.to_string()),
            ("occ", occ.to_string()),
        ])
    }

    /// split the geometry into the fixed fragment and the scan variables for
    /// the last `natom1` atoms
    fn scan(
        &self,
        shift: &Vector3<f64>,
        natom1: usize,
    ) -> Result<Vec<(&'static str, String)>, ProgramError> {
        let natom = self.species.natom();
        if natom1 > natom {
            return Err(ProgramError::InvalidInput(format!(
                "cannot scan {natom1} atoms of {} with {natom} atoms",
                self.species.name
            )));
        }
        let norm = shift.norm();
        if norm == 0.0 || !norm.is_finite() {
            return Err(ProgramError::InvalidInput(format!(
                "invalid shift vector {shift:?} for {}",
                self.species.name
            )));
        }
        let shift = shift / norm * SCAN_STEP;
        let mut geom = String::new();
        let mut scancoo = String::new();
        let mut scanstart = String::new();
        let mut steps = String::new();
        for (i, atom) in self.species.atoms.iter().enumerate() {
            let (x, y, z) = (atom.x, atom.y, atom.z);
            let sym = atom.label();
            if i < natom - natom1 {
                writeln!(geom, "{sym} {x:.8} {y:.8} {z:.8}").unwrap();
                continue;
            }
            let k = 3 * i;
            writeln!(scancoo, "{sym} s{k} s{} s{}", k + 1, k + 2).unwrap();
            writeln!(
                scanstart,
                "s{k} = {x:.8}\ns{}= {y:.8}\ns{}= {z:.8}",
                k + 1,
                k + 2
            )
            .unwrap();
            for (j, d) in shift.iter().enumerate() {
                writeln!(steps, "s{0} = s{0} + {d:.8}", k + j).unwrap();
            }
        }
        Ok(vec![
            ("geom", geom),
            ("scancoo", scancoo),
            ("scanstart", scanstart),
            ("shift", steps),
        ])
    }

    /// the geometry={...} block along with any z-matrix variable definitions
    fn geometry_block(&self, vrc: &VrcTst) -> (String, String) {
        let mut block = String::from("geometry={ \n");
        let mut variables = format!("{}\n", vrc.variables);
        match vrc.geom_type {
            GeomType::Xyz => {
                write!(
                    block,
                    "{};\n{};\n{}\n",
                    self.species.natom(),
                    self.species.name,
                    self.geom()
                )
                .unwrap();
            }
            GeomType::Zmat => {
                let atoms = self.species.symbols();
                let zmat = simple_zmat(&self.species.atoms);
                for (i, sym) in atoms.iter().enumerate() {
                    write!(block, "{sym}{i}").unwrap();
                    if i > 0 {
                        write!(block, ", {}{}, dist_{i}", atoms[i - 1], i - 1)
                            .unwrap();
                        writeln!(
                            variables,
                            "{:>10}{i} = {:>12.5};",
                            "dist_",
                            zmat.distances[i - 1]
                        )
                        .unwrap();
                    }
                    if i > 1 {
                        write!(block, ", {}{}, angle_{i}", atoms[i - 2], i - 2)
                            .unwrap();
                        writeln!(
                            variables,
                            "{:>10}{i} = {:>12.5};",
                            "angle_",
                            zmat.angles[i - 2]
                        )
                        .unwrap();
                    }
                    if i > 2 {
                        write!(block, ", {}{}, dihed_{i}", atoms[i - 3], i - 3)
                            .unwrap();
                        writeln!(
                            variables,
                            "{:>10}{i} = {:>12.5};",
                            "dihed_",
                            zmat.dihedrals[i - 3]
                        )
                        .unwrap();
                    }
                    block.push('\n');
                }
            }
        }
        block.push_str("}\n");
        (block, variables)
    }

    fn methods_block(vrc: &VrcTst) -> String {
        let mut block = format!("rhf;\n {}", vrc.method);
        let disp = &vrc.displacements;
        if disp.optg {
            block.push_str(";\n\n{optg");
            if !disp.inactive.is_empty() {
                write!(block, ";\ninactive, {};", disp.inactive.join(","))
                    .unwrap();
            } else if !disp.active.is_empty() {
                write!(block, ";\nactive, {};", disp.active.join(",")).unwrap();
            }
            block.push('}');
        }
        block
    }

    fn put_block(name: &str, put: &Put) -> String {
        let mut block = String::new();
        if put.xml {
            writeln!(block, "{{put,xml,{name}.xml}}").unwrap();
        }
        if put.molden {
            writeln!(block, "{{put,molden,{name}.molden}}").unwrap();
        }
        if put.xyz {
            writeln!(block, "{{put,xyz,{name}_opt.xyz}}").unwrap();
        }
        block
    }

    /// fill `template` for `calc` without writing anything
    pub fn input(
        &self,
        template: &Template,
        name: &str,
        calc: &Calculation,
    ) -> Result<String, ProgramError> {
        let mut subs = self.common(name);
        match calc {
            Calculation::SinglePoint => {
                subs.push(("natom", self.species.natom().to_string()));
                subs.push(("geom", self.geom()));
            }
            Calculation::Barrierless(space) => {
                subs.push(("natom", self.species.natom().to_string()));
                subs.push(("geom", self.geom()));
                subs.extend(self.active_space(space)?);
            }
            Calculation::BarrierlessScan {
                space,
                shift,
                natom1,
            } => {
                subs.push(("natom", self.species.natom().to_string()));
                subs.extend(self.scan(shift, *natom1)?);
                subs.extend(self.active_space(space)?);
            }
            Calculation::VrcTst(vrc) => {
                let (geometry, variables) = self.geometry_block(vrc);
                let options = vrc
                    .options
                    .clone()
                    .unwrap_or_else(|| DEFAULT_VRC_TST_OPTIONS.to_owned());
                subs.extend([
                    ("options", options),
                    ("basis", format!("basis = {}", vrc.basis)),
                    ("geometry_block", geometry),
                    ("variables", variables),
                    ("methods_block", Self::methods_block(vrc)),
                    ("put_block", Self::put_block(name, &vrc.put)),
                ]);
            }
        }
        Ok(template.fill(&subs))
    }

    /// write the input file for `calc` to `dir/NAME.inp`, returning its path
    pub fn write_input(
        &self,
        template: &Template,
        name: &str,
        from_name: bool,
        calc: &Calculation,
    ) -> Result<PathBuf, ProgramError> {
        let fname = self.job_name(name, from_name);
        let body = self.input(template, &fname, calc)?;
        let path = self.dir.join(format!("{fname}.inp"));
        write_file(&path, &body)?;
        log::debug!("wrote molpro input {}", path.display());
        Ok(path)
    }

    /// the output file for `fname`, looking first in `dir` and then in `dir`
    /// one level up
    fn find_output(&self, fname: &str) -> Option<PathBuf> {
        let base = format!("{fname}.out");
        [self.dir.join(&base), Path::new("..").join(&self.dir).join(&base)]
            .into_iter()
            .find(|p| p.exists())
    }

    /// read the energy stored in the Molpro variable `key` from the output of
    /// this species' job. the last `SETTING key` line in the file wins
    pub fn read_energy(
        &self,
        key: &str,
        name: &str,
        from_name: bool,
    ) -> Result<f64, ProgramError> {
        let fname = self.job_name(name, from_name);
        if fname == PROTON_CHEMID {
            return Ok(0.0);
        }
        let Some(path) = self.find_output(&fname) else {
            return Err(ProgramError::FileNotFound(
                self.dir.join(format!("{fname}.out")).display().to_string(),
            ));
        };
        read_output(&path, key)
    }
}

/// scan `path` from the end for a `SETTING key` line and return its fourth
/// field as the energy
pub fn read_output(path: &Path, key: &str) -> Result<f64, ProgramError> {
    let outname = path.display().to_string();
    let contents = read_file(path)?;
    let marker = format!("SETTING {key}");
    for line in contents.lines().rev() {
        if line.contains(&marker) {
            return parse_energy(line, 3, &outname)?
                .ok_or(ProgramError::EnergyParseError(outname));
        }
    }
    Err(ProgramError::EnergyNotFound(outname))
}
