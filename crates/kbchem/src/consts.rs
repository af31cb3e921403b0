/// kcal/mol per Hartree
pub const AU_TO_KCAL: f64 = 627.5095;

/// the chemid KinBot assigns to a bare proton. it has no electrons, so there is
/// never an output file to read for it
pub const PROTON_CHEMID: &str = "10000000000000000001";
