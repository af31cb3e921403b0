use qcio::program::molpro::{GeomType, Put};
use test_case::test_case;

use super::*;

#[test]
fn config() {
    let got = Config::load("testfiles/kinbot.toml").unwrap();
    let want = Config {
        single_point_template: Some(Template::from(
            "***,{{.name}}
memory,500,m;
geometry={
{{.natom}}
{{.name}}
{{.geom}}}
charge={{.charge}};
spin={{.spin}};
hf;
ccsd(t);
SETTING MYENA = energy
",
        )),
        barrierless_template: None,
        barrierless_prod_template: None,
        vrc_tst_template: None,
        queue_template: Some(Template::from(
            "#!/bin/bash
#SBATCH -J {{.name}}
#SBATCH -c {{.ppn}}
{{.slurm_feature}}
",
        )),
        gauss_template: None,
        active_space: ActiveSpace {
            nelectron: 4,
            norbital: 3,
            nstate: 2,
        },
        vrc_tst: VrcTst {
            basis: "vdz".to_owned(),
            method: "uccsd(t)".to_owned(),
            put: Put {
                molden: true,
                ..Put::default()
            },
            geom_type: GeomType::Zmat,
            ..VrcTst::default()
        },
        queuing: QueueKind::Slurm,
        queue_name: "batch".to_owned(),
        ppn: 8,
        command: "/opt/molpro/bin/molpro".to_owned(),
        slurm_feature: "#SBATCH -C avx2".to_owned(),
        high_level: true,
        energy_key: "MYENB".to_owned(),
        gaussian: Gaussian {
            method: "m062x".to_owned(),
            basis: "6-311++G(d,p)".to_owned(),
            ppn: 2,
            qc_command: "g16".to_owned(),
            working_dir: "/scratch/kinbot".to_owned(),
            ..Gaussian::default()
        },
    };
    assert_eq!(got, want);
}

#[test]
fn empty_is_default() {
    let got: Config = toml::from_str("").unwrap();
    assert_eq!(got, Config::default());
}

#[test_case("testfiles/bad_ppn.toml", "single_point_ppn"; "ppn")]
#[test_case("testfiles/bad_space.toml", "active orbitals"; "active space")]
#[test_case("testfiles/missing_template.toml", "does_not_exist.tpl"; "missing template")]
#[test_case("testfiles/unknown.toml", "quueing"; "unknown field")]
#[test_case("testfiles/bad_vrc.toml", "geomtype"; "unknown vrc_tst field")]
#[test_case("testfiles/bad_put.toml", "molpro"; "unknown put field")]
#[test_case("testfiles/nonexistent.toml", "nonexistent.toml"; "missing file")]
fn invalid(path: &str, needle: &str) {
    let err = Config::load(path).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains(needle), "{msg}");
}

#[test]
fn templates() {
    let config = Config::load("testfiles/kinbot.toml").unwrap();
    let sp = config.template(&Calculation::SinglePoint);
    assert!(sp.header.starts_with("***,{{.name}}\nmemory,500,m;"));

    let space = config.active_space;
    assert_eq!(
        config.template(&Calculation::Barrierless(space)),
        Calculation::Barrierless(space).default_template()
    );
}
