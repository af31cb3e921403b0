//! Post-processing of a KinBot run: a summary of every reaction found from a
//! well and an input file for the PES viewer.

use std::{error::Error, fmt::Display};

use kbchem::{Species, consts::AU_TO_KCAL};
use serde::Deserialize;

pub mod summary;
pub mod viewer;
pub mod xyz;

pub use summary::{create_summary_file, write_summary};
pub use viewer::{create_pesviewer_input, write_pesviewer};


/// reactions of this family take their barrier relative to the MP2 well unless
/// the high-level calculations were run
const MP2_REFERENCE_FAMILY: &str = "R_Addition_MultipleBond";

pub(crate) const LICENSE_MESSAGE: &str = "\
###########################################################
##                                                       ##
##  KinBot                                               ##
##                                                       ##
##  The contents are covered by the terms of the         ##
##  BSD 3-clause license included in the LICENSE         ##
##  file, found at the root.                             ##
##                                                       ##
##  Copyright 2018 National Technology & Engineering     ##
##  Solutions of Sandia, LLC (NTESS). Under the terms    ##
##  of Contract DE-NA0003525 with NTESS, the U.S.        ##
##  Government retains certain rights to this software.  ##
##                                                       ##
###########################################################

";

#[derive(Debug)]
pub enum PesError {
    Io(std::io::Error),
    /// a reaction marked as done without a transition state
    MissingTs(String),
    /// a reaction needing the MP2 well energies when none were given
    MissingMp2(String),
}

impl Display for PesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PesError::Io(e) => write!(f, "{e}"),
            PesError::MissingTs(r) => {
                write!(f, "reaction {r} succeeded but has no transition state")
            }
            PesError::MissingMp2(r) => write!(
                f,
                "reaction {r} needs the MP2 energies of the well, \
                 but none were provided"
            ),
        }
    }
}

impl Error for PesError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PesError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PesError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// electronic and zero-point energies in Hartree
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Energies {
    pub energy: f64,
    pub zpe: f64,
}

impl Energies {
    pub fn total(&self) -> f64 {
        self.energy + self.zpe
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reaction {
    pub name: String,

    /// the reaction family, like `intra_H_migration`
    #[serde(rename = "type")]
    pub kind: String,

    /// whether the transition state search succeeded
    #[serde(default)]
    pub done: bool,

    #[serde(default)]
    pub ts: Option<Energies>,

    #[serde(default)]
    pub products: Vec<Species>,
}

impl Reaction {
    /// the product chemids, sorted and joined by `sep`
    pub fn product_name(&self, sep: &str) -> String {
        product_name(&self.products, sep)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HomolyticScission {
    pub products: Vec<Species>,
}

impl HomolyticScission {
    pub fn product_name(&self, sep: &str) -> String {
        product_name(&self.products, sep)
    }
}

fn product_name(products: &[Species], sep: &str) -> String {
    let mut names: Vec<_> = products.iter().map(|p| p.chemid.as_str()).collect();
    names.sort_unstable();
    names.join(sep)
}

/// Everything KinBot found starting from a single well
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pes {
    pub well: Species,

    #[serde(default)]
    pub reactions: Vec<Reaction>,

    /// `None` if the homolytic scissions were never searched for
    #[serde(default)]
    pub homolytic_scissions: Option<Vec<HomolyticScission>>,

    /// whether the high-level single points were run
    #[serde(default)]
    pub high_level: bool,

    /// the energies of the well at the MP2 level, used for
    /// R_Addition_MultipleBond barriers when `high_level` is false
    #[serde(default)]
    pub well_mp2: Option<Energies>,
}

impl Pes {
    /// the reactions whose transition state search succeeded
    pub fn successes(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.iter().filter(|r| r.done)
    }

    pub fn homolytic_scissions(&self) -> &[HomolyticScission] {
        self.homolytic_scissions.as_deref().unwrap_or_default()
    }

    /// the zero-point corrected barrier height of `r` relative to the well in
    /// kcal/mol
    pub fn barrier(&self, r: &Reaction) -> Result<f64, PesError> {
        let ts = r.ts.ok_or_else(|| PesError::MissingTs(r.name.clone()))?;
        let reference = if r.kind == MP2_REFERENCE_FAMILY && !self.high_level {
            self.well_mp2
                .ok_or_else(|| PesError::MissingMp2(r.name.clone()))?
                .total()
        } else {
            self.well.total_energy()
        };
        Ok((ts.total() - reference) * AU_TO_KCAL)
    }

    /// the zero-point corrected energy of `products` relative to the well in
    /// kcal/mol
    pub fn relative_energy(&self, products: &[Species]) -> f64 {
        let e: f64 = products.iter().map(Species::total_energy).sum();
        (e - self.well.total_energy()) * AU_TO_KCAL
    }
}
