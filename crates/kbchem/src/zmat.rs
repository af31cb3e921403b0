//! The simplest possible Z-matrix: each atom is defined relative to the atoms
//! immediately preceding it in the input order.

use crate::{Atom, Vec3};

pub struct Zmat {
    /// distance from atom `i + 1` to atom `i`, in Å
    pub distances: Vec<f64>,
    /// angle between atoms `i + 2`, `i + 1`, and `i`, in degrees
    pub angles: Vec<f64>,
    /// dihedral between atoms `i + 3`, `i + 2`, `i + 1`, and `i`, in degrees
    pub dihedrals: Vec<f64>,
}

fn distance(a: &Vec3, b: &Vec3) -> f64 {
    (a - b).norm()
}

fn angle(a: &Vec3, b: &Vec3, c: &Vec3) -> f64 {
    let ba = a - b;
    let bc = c - b;
    ba.angle(&bc).to_degrees()
}

/// the dihedral angle a-b-c-d with the sign convention that clockwise rotation
/// of a onto d when looking down b→c is positive
fn dihedral(a: &Vec3, b: &Vec3, c: &Vec3, d: &Vec3) -> f64 {
    let b0 = a - b;
    let b1 = c - b;
    let b2 = d - c;
    let b1n = b1.normalize();
    let v = b0 - b1n * b0.dot(&b1n);
    let w = b2 - b1n * b2.dot(&b1n);
    let x = v.dot(&w);
    let y = b1n.cross(&v).dot(&w);
    y.atan2(x).to_degrees()
}

/// build the distances, angles, and dihedrals describing `atoms` as a chain
pub fn simple_zmat(atoms: &[Atom]) -> Zmat {
    let coords: Vec<Vec3> = atoms.iter().map(Atom::coord).collect();
    let mut distances = Vec::new();
    let mut angles = Vec::new();
    let mut dihedrals = Vec::new();
    for i in 1..coords.len() {
        distances.push(distance(&coords[i], &coords[i - 1]));
        if i > 1 {
            angles.push(angle(&coords[i], &coords[i - 1], &coords[i - 2]));
        }
        if i > 2 {
            dihedrals.push(dihedral(
                &coords[i],
                &coords[i - 1],
                &coords[i - 2],
                &coords[i - 3],
            ));
        }
    }
    Zmat {
        distances,
        angles,
        dihedrals,
    }
}
