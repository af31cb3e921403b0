use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use kbchem::Atom;

use crate::PesError;

/// the contents of an XYZ file for `atoms` with an empty comment line
pub fn xyz_string(atoms: &[Atom]) -> String {
    let mut s = format!("{}\n\n", atoms.len());
    for atom in atoms {
        writeln!(
            s,
            "{} {:.6} {:.6} {:.6}",
            atom.label(),
            atom.x,
            atom.y,
            atom.z
        )
        .unwrap();
    }
    s.push_str("\n\n");
    s
}

/// write `atoms` to `dir/NAME.xyz`, creating `dir` if needed, and return the
/// path
pub fn make_xyz(
    atoms: &[Atom],
    name: &str,
    dir: &Path,
) -> Result<PathBuf, PesError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.xyz"));
    fs::write(&path, xyz_string(atoms))?;
    log::trace!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use kbchem::atoms;

    use super::*;

    #[test]
    fn xyz() {
        let atoms = atoms![
            O 0.0 0.0 -0.0656
            H 0.0 0.7571 0.5205
            H 0.0 -0.7571 0.5205
        ];
        assert_eq!(
            xyz_string(&atoms),
            "3

O 0.000000 0.000000 -0.065600
H 0.000000 0.757100 0.520500
H 0.000000 -0.757100 0.520500


"
        );
    }

    #[test]
    fn creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("xyz");
        let atoms = atoms![H 0.0 0.0 0.0];
        let path = make_xyz(&atoms, "10000000000000000001", &dir).unwrap();
        assert_eq!(path, dir.join("10000000000000000001.xyz"));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "1\n\nH 0.000000 0.000000 0.000000\n\n\n"
        );
    }
}
