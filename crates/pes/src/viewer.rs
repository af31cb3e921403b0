//! Input files for the PES viewer, which draws the potential energy surface
//! around a well from its wells, bimolecular products, transition states and
//! barrierless reactions.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use rustc_hash::FxHashSet;

use crate::{LICENSE_MESSAGE, Pes, PesError, xyz::make_xyz};

const COMMENTS: &str = "\
This comment is not interpreted, so store any extra info here.
Keywords are case insensitive. Look at the help below.
IMPORTANT: avoid the use of '2d' and '3d' in the names of species, transition states and reactions
(these strings are employed when generating the 2d and 3d files of the molecules)
If you want to use 3D coordinates, store them in a xyz/ directory in the same directory as the python script";

const OPTIONS: &str = "\
rescale            0         # no rescale , put the well or bimolecular name here to rescale to that value
fh                 9.        # figure height
fw                 18.       # figure width
margin             0.2       # margin fraction on the x and y axis
dpi                120       # dpi of the molecule figures
save               0         # does the plot need to be saved (1) or displayed (0)
write_ts_values    1         # booleans tell if the ts energy values should be written
write_well_values  1         # booleans tell if the well and bimolecular energy values should be written
bimol_color        red       # color of the energy values for the bimolecular products
well_color         blue      # color of the energy values of the wells
ts_color           green     # color or the energy values of the ts, put to 'none' to use same color as line
show_images        1         # boolean tells whether the molecule images should be shown on the graph
rdkit4depict       1         # boolean that specifies which code was used for the 2D depiction";

const HELP: &str = "\
> <help>
File follows the rules of SD file format for keywords. Keywords are case
insensitive when parsed.
Keywords:
units: units of the energies supplied above

usexyz: use the xyz coordinates of all the species and render a 2D/3D depiction

rescale: energies are rescaled relative to the energy of the species given here 

wells: all the wells of the PES, separated by lines
each line contains the name, the energy, and optionally the smiles

bimolec: all the bimolecular products of the PES, separated by lines
each line contains the name, the energy, and optionally the smiles of both bimolecular products

ts: all the transition states of the PES, separated by lines
each line contains the name, the energy, and the names of the reactant and product

barrierless: all the barrierless reactions of the PES, separated by lines
each line contains the name and the names of the reactant and product";

/// Write the PES viewer input for `pes` to `w`. If `xyz_dir` is given, the
/// geometry of every species mentioned is written there too. Bimolecular
/// products get two files each, `NAMEk.xyz` for the viewer, where NAME is the
/// joined product name and k counts from 1, and `CHEMID.xyz`.
pub fn write_pesviewer<W: Write>(
    w: &mut W,
    pes: &Pes,
    xyz_dir: Option<&Path>,
) -> Result<(), PesError> {
    let write_xyz = |atoms: &[kbchem::Atom], name: &str| -> Result<(), PesError> {
        if let Some(dir) = xyz_dir {
            make_xyz(atoms, name, dir)?;
        }
        Ok(())
    };
    let well = &pes.well;

    write!(w, "> <comments>{LICENSE_MESSAGE}{COMMENTS}\n\n")?;
    write!(w, "> <id> {}\n\n", well.chemid)?;
    writeln!(w, "> <options> ")?;
    writeln!(w, "units              kcal/mol  #energy units")?;
    writeln!(
        w,
        "use_xyz            {}         # use xyz, put 0  to switch off",
        u8::from(xyz_dir.is_some())
    )?;
    write!(w, "{OPTIONS}\n\n")?;

    // the well is the zero of energy
    writeln!(w, "> <wells> ")?;
    write_xyz(&well.atoms, &well.chemid)?;
    writeln!(w, "{} 0.0", well.chemid)?;
    let mut wells = FxHashSet::default();
    wells.insert(well.chemid.as_str());
    for r in pes.successes() {
        if let [prod] = r.products.as_slice()
            && wells.insert(prod.chemid.as_str())
        {
            write_xyz(&prod.atoms, &prod.chemid)?;
            let energy = pes.relative_energy(std::slice::from_ref(prod));
            writeln!(w, "{} {energy:.2}", prod.chemid)?;
        }
    }
    writeln!(w)?;

    writeln!(w, "> <bimolec> ")?;
    let mut bimolecs = FxHashSet::default();
    for r in pes.successes().filter(|r| r.products.len() > 1) {
        let name = r.product_name("_");
        for (i, prod) in r.products.iter().enumerate() {
            write_xyz(&prod.atoms, &format!("{name}{}", i + 1))?;
            write_xyz(&prod.atoms, &prod.chemid)?;
        }
        let energy = pes.relative_energy(&r.products);
        if !bimolecs.contains(&name) {
            writeln!(w, "{name} {energy:.2}")?;
            bimolecs.insert(name);
        }
    }
    let mut scissions = FxHashSet::default();
    for hs in pes.homolytic_scissions() {
        let name = hs.product_name("_");
        if bimolecs.contains(&name) || scissions.contains(&name) {
            continue;
        }
        let energy = pes.relative_energy(&hs.products);
        for (i, prod) in hs.products.iter().enumerate() {
            write_xyz(&prod.atoms, &format!("{name}{}", i + 1))?;
            write_xyz(&prod.atoms, &prod.chemid)?;
        }
        writeln!(w, "{name} {energy:.2}")?;
        scissions.insert(name);
    }
    writeln!(w)?;

    writeln!(w, "> <ts> ")?;
    for r in pes.successes() {
        let energy = pes.barrier(r)?;
        writeln!(
            w,
            "{} {energy:.2} {} {}",
            r.name,
            well.chemid,
            r.product_name("_")
        )?;
    }
    writeln!(w)?;

    writeln!(w, "> <barrierless> ")?;
    for (index, hs) in pes.homolytic_scissions().iter().enumerate() {
        let name = hs.product_name("_");
        if !bimolecs.contains(&name) {
            writeln!(w, "b_{index} {} {name}", well.chemid)?;
        }
    }
    writeln!(w)?;

    w.write_all(HELP.as_bytes())?;
    Ok(())
}

/// write `dir/pesviewer.inp` for `pes` and, if `use_xyz` is set, the geometries
/// under `dir/xyz/`. returns the path of the input file
pub fn create_pesviewer_input(
    pes: &Pes,
    dir: impl AsRef<Path>,
    use_xyz: bool,
) -> Result<PathBuf, PesError> {
    let dir = dir.as_ref();
    let xyz_dir = dir.join("xyz");
    let path = dir.join("pesviewer.inp");
    let mut w = BufWriter::new(File::create(&path)?);
    write_pesviewer(&mut w, pes, use_xyz.then_some(xyz_dir.as_path()))?;
    w.flush()?;
    log::info!("wrote PES viewer input to {}", path.display());
    Ok(path)
}
