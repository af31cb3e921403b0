use serde::Deserialize;

use crate::{Atom, ChemError};

/// chemids are integers in KinBot, but they can be wider than an i64 and are
/// only ever used as names here
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
enum RawChemid {
    Number(u64),
    Text(String),
}

impl From<RawChemid> for String {
    fn from(value: RawChemid) -> Self {
        match value {
            RawChemid::Number(n) => n.to_string(),
            RawChemid::Text(s) => s,
        }
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
struct RawSpecies {
    /// The name of the species, used in file names for wells and transition
    /// states.
    name: String,

    /// The KinBot chemical identifier.
    chemid: RawChemid,

    /// An XYZ-style geometry block. A leading atom count and comment line are
    /// accepted and skipped.
    geometry: String,

    #[serde(default)]
    charge: isize,

    /// Spin multiplicity, 2S + 1.
    #[serde(default = "default_mult")]
    mult: usize,

    /// Whether this species is a well or transition state rather than a
    /// reaction product.
    #[serde(default)]
    wellorts: bool,

    /// Electronic energy in Hartree.
    #[serde(default)]
    energy: f64,

    /// Zero-point energy in Hartree.
    #[serde(default)]
    zpe: f64,
}

fn default_mult() -> usize {
    1
}

/// A stationary point on the PES along with whatever energies have been
/// computed for it so far
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawSpecies")]
pub struct Species {
    pub name: String,
    pub chemid: String,
    pub atoms: Vec<Atom>,
    pub charge: isize,
    pub mult: usize,
    pub wellorts: bool,
    pub energy: f64,
    pub zpe: f64,
}

impl TryFrom<RawSpecies> for Species {
    type Error = ChemError;

    fn try_from(rs: RawSpecies) -> Result<Self, Self::Error> {
        let atoms = parse_xyz(&rs.geometry)?;
        if atoms.is_empty() {
            return Err(ChemError::EmptyGeometry(rs.name));
        }
        if rs.mult == 0 {
            return Err(ChemError::ZeroMultiplicity(rs.name));
        }
        Ok(Self {
            name: rs.name,
            chemid: rs.chemid.into(),
            atoms,
            charge: rs.charge,
            mult: rs.mult,
            wellorts: rs.wellorts,
            energy: rs.energy,
            zpe: rs.zpe,
        })
    }
}

/// parse the atoms out of an XYZ block. a leading line holding only an integer
/// is taken to be the atom count, and the line after it is skipped as the
/// comment unless it parses as an atom. when a count is given, it must match
/// the number of atoms
pub fn parse_xyz(s: &str) -> Result<Vec<Atom>, ChemError> {
    let mut lines = s.lines().filter(|l| !l.trim().is_empty()).peekable();
    let count = match lines.peek().map(|l| l.trim().parse::<usize>()) {
        Some(Ok(n)) => {
            lines.next();
            if lines.peek().is_some_and(|l| l.parse::<Atom>().is_err()) {
                lines.next();
            }
            Some(n)
        }
        _ => None,
    };
    let atoms = lines.map(str::parse).collect::<Result<Vec<Atom>, _>>()?;
    if let Some(expected) = count
        && expected != atoms.len()
    {
        return Err(ChemError::AtomCount {
            expected,
            got: atoms.len(),
        });
    }
    Ok(atoms)
}

impl Species {
    pub fn new(
        name: impl Into<String>,
        chemid: impl Into<String>,
        atoms: Vec<Atom>,
        charge: isize,
        mult: usize,
    ) -> Self {
        Self {
            name: name.into(),
            chemid: chemid.into(),
            atoms,
            charge,
            mult,
            wellorts: false,
            energy: 0.0,
            zpe: 0.0,
        }
    }

    pub fn wellorts(mut self, b: bool) -> Self {
        self.wellorts = b;
        self
    }

    pub fn natom(&self) -> usize {
        self.atoms.len()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.atoms.iter().map(Atom::label).collect()
    }

    /// the number of electrons after accounting for the charge
    pub fn nelectron(&self) -> isize {
        let z: usize = self.atoms.iter().map(|a| a.atomic_number).sum();
        z as isize - self.charge
    }

    /// electronic energy plus zero-point energy
    pub fn total_energy(&self) -> f64 {
        self.energy + self.zpe
    }
}
