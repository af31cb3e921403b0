//! Atoms, species and the small amount of geometry KinBot needs to describe a
//! stationary point to a quantum chemistry program.

use std::{error::Error, fmt::Display};

pub use atom::*;
pub use species::*;

pub mod atom;
pub mod consts;
pub mod species;
pub mod zmat;


use nalgebra as na;

type Vec3 = na::Vector3<f64>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ChemError {
    /// an atomic symbol that is not in the periodic table
    UnknownSymbol(String),
    /// a geometry line that could not be parsed into an atom
    BadAtomLine(String),
    /// a species without any atoms
    EmptyGeometry(String),
    /// a spin multiplicity of zero, which has no 2S + 1 form
    ZeroMultiplicity(String),
    /// an XYZ count line that disagrees with the number of atoms following it
    AtomCount { expected: usize, got: usize },
}

impl Display for ChemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChemError::UnknownSymbol(s) => {
                write!(f, "failed to locate atomic symbol {s}")
            }
            ChemError::BadAtomLine(l) => {
                write!(f, "failed to parse atom from line `{l}`")
            }
            ChemError::EmptyGeometry(name) => {
                write!(f, "species {name} has an empty geometry")
            }
            ChemError::ZeroMultiplicity(name) => {
                write!(f, "species {name} has a multiplicity of 0")
            }
            ChemError::AtomCount { expected, got } => {
                write!(f, "expected {expected} atoms in xyz block, found {got}")
            }
        }
    }
}

impl Error for ChemError {}

/// build a `Vec<Atom>` from symbol/coordinate rows, panicking on unknown
/// symbols. meant for tests and benchmarks
#[macro_export]
macro_rules! atoms {
    ($($sym:ident $x:literal $y:literal $z:literal)+) => {
	vec![
	    $($crate::Atom::from_label(stringify!($sym), $x, $y, $z).unwrap(),)*
	]
    };
}
