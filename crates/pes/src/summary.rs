use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use kbchem::{Species, consts::AU_TO_KCAL};
use rustc_hash::FxHashSet;

use crate::{LICENSE_MESSAGE, Pes, PesError};

const NO_IRC_WARNING: &str = "\
These calculations are done without IRCs,
The success thus means that a ts has been found,
but does not imply this ts is the correct one!!

";

/// the electronic energy of `products` relative to the well, ignoring the
/// zero-point energies, in kcal/mol
fn scission_energy(pes: &Pes, products: &[Species]) -> f64 {
    let e: f64 = products.iter().map(|p| p.energy).sum();
    (e - pes.well.energy) * AU_TO_KCAL
}

/// Write the status of every reaction in `pes` to `w`, followed by the
/// homolytic scissions whose products were not already formed by one of the
/// reactions.
pub fn write_summary<W: Write>(w: &mut W, pes: &Pes) -> Result<(), PesError> {
    w.write_all(LICENSE_MESSAGE.as_bytes())?;
    w.write_all(NO_IRC_WARNING.as_bytes())?;
    writeln!(w, "Status\tEnergy\tName")?;

    let mut products = FxHashSet::default();
    for r in &pes.reactions {
        if r.done {
            let energy = pes.barrier(r)?;
            let prod_name = r.product_name(" ");
            writeln!(w, "SUCCESS\t{energy:.2}\t{}\t{prod_name}", r.name)?;
            products.insert(prod_name);
        } else {
            writeln!(w, "FAILED\t\t{}", r.name)?;
        }
    }

    for hs in pes.homolytic_scissions() {
        let prod_name = hs.product_name(" ");
        if !products.contains(&prod_name) {
            let energy = scission_energy(pes, &hs.products);
            writeln!(w, "HOMOLYTIC_SCISSION\t{energy:.2}\tNO_TS\t{prod_name}")?;
        }
    }

    Ok(())
}

/// write the summary for `pes` to `dir/summary_CHEMID.out` and return its path
pub fn create_summary_file(
    pes: &Pes,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, PesError> {
    let path = dir
        .as_ref()
        .join(format!("summary_{}.out", pes.well.chemid));
    let mut w = BufWriter::new(File::create(&path)?);
    write_summary(&mut w, pes)?;
    w.flush()?;
    log::info!("wrote summary to {}", path.display());
    Ok(path)
}
