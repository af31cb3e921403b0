use kbchem::{Species, atoms, consts::PROTON_CHEMID};
use nalgebra::Vector3;

use super::*;

fn water() -> Species {
    Species::new(
        "well0",
        "117682",
        atoms![
            O 0.0 0.0 -0.0657441568
            H 0.0 0.7574590974 0.5217905143
            H 0.0 -0.7574590974 0.5217905143
        ],
        0,
        1,
    )
}

const WATER_GEOM: &str = "O 0.00000000 0.00000000 -0.06574416
H 0.00000000 0.75745910 0.52179051
H 0.00000000 -0.75745910 0.52179051
";

fn space(nelectron: usize) -> ActiveSpace {
    ActiveSpace {
        nelectron,
        norbital: 4,
        nstate: 2,
    }
}

mod name {
    use test_case::test_case;

    use super::*;

    #[test_case("", false, false => "117682" ; "chemid")]
    #[test_case("", true, false => "well0" ; "from name")]
    #[test_case("", false, true => "well0" ; "wellorts")]
    #[test_case("scan_3", true, true => "scan_3" ; "explicit")]
    fn job_name(name: &str, from_name: bool, wellorts: bool) -> String {
        let s = water().wellorts(wellorts);
        Molpro::new(&s, "molpro").job_name(name, from_name)
    }
}

mod symm {
    use test_case::test_case;

    use super::*;

    fn symm(syms: &[&str], mult: usize) -> usize {
        let atoms = syms
            .iter()
            .enumerate()
            .map(|(i, s)| kbchem::Atom::from_label(s, 0.0, 0.0, i as f64))
            .collect::<Result<_, _>>()
            .unwrap();
        let s = Species::new("x", "1", atoms, 0, mult);
        Molpro::new(&s, "molpro").symm()
    }

    #[test_case(&["O"], 3 => 4)]
    #[test_case(&["S"], 3 => 4)]
    #[test_case(&["O", "O"], 3 => 4)]
    #[test_case(&["O", "H"], 2 => 2)]
    #[test_case(&["H", "O"], 2 => 2)]
    #[test_case(&["O"], 1 => 1)]
    #[test_case(&["O", "O"], 1 => 1)]
    #[test_case(&["O", "H"], 4 => 1)]
    #[test_case(&["O", "H", "H"], 2 => 1)]
    #[test_case(&["C", "H", "H", "H"], 2 => 1)]
    fn lookup(syms: &[&str], mult: usize) -> usize {
        symm(syms, mult)
    }
}

mod write_input {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn single_point() {
        let s = water();
        let m = Molpro::new(&s, "molpro");
        let calc = Calculation::SinglePoint;
        let got = m.input(&calc.default_template(), "well0", &calc).unwrap();
        assert_snapshot!(got, @r"
        ***,well0
        memory,1000,m
        geomtyp=xyz
        geometry={
        3
        well0
        O 0.00000000 0.00000000 -0.06574416
        H 0.00000000 0.75745910 0.52179051
        H 0.00000000 -0.75745910 0.52179051
        }

        basis=cc-pVTZ-F12

        {uhf;wf,10,1,0,0}
        {uccsd(t)-f12;wf,10,1,0,0}
        MYENA = energy(1)
        MYENB = energy(2)

        ---
        ");
    }

    #[test]
    fn charged_doublet() {
        let mut s = water();
        s.charge = 1;
        s.mult = 2;
        let m = Molpro::new(&s, "molpro");
        let t = Template::from("wf,{{.nelectron}},{{.symm}},{{.spin}},{{.charge}}");
        let got = m.input(&t, "x", &Calculation::SinglePoint).unwrap();
        assert_eq!(got, "wf,9,1,1,1");
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let s = water();
        let m = Molpro::new(&s, dir.path().join("molpro"));
        let t = Template::from("{{.name}}\n{{.geom}}");
        let path = m
            .write_input(&t, "", false, &Calculation::SinglePoint)
            .unwrap();
        assert_eq!(path, dir.path().join("molpro/117682.inp"));
        let got = std::fs::read_to_string(path).unwrap();
        assert_eq!(got, format!("117682\n{WATER_GEOM}"));
    }

    #[test]
    fn barrierless() {
        let s = water();
        let m = Molpro::new(&s, "molpro");
        let t = Template::from("{{.natom}} {{.closed}} {{.occ}} {{.state}}");
        let got = m.input(&t, "w", &Calculation::Barrierless(space(4)));
        assert_eq!(got.unwrap(), "3 3 7 2");
    }

    #[test]
    fn barrierless_fractional() {
        let s = water();
        let m = Molpro::new(&s, "molpro");
        let t = Template::from("{{.closed}} {{.occ}}");
        let got = m.input(&t, "w", &Calculation::Barrierless(space(3)));
        assert_eq!(got.unwrap(), "3.5 7.5");
    }

    #[test]
    fn barrierless_too_many_electrons() {
        let s = water();
        let m = Molpro::new(&s, "molpro");
        let got = m.input(
            &Template::from(""),
            "w",
            &Calculation::Barrierless(space(12)),
        );
        assert!(matches!(got, Err(ProgramError::InvalidInput(_))));
    }

    fn complex() -> Species {
        Species::new(
            "complex",
            "2",
            atoms![
                C 0.0 0.0 0.0
                H 0.0 0.0 1.09
                O 3.0 0.0 0.0
                H 3.97 0.0 0.0
            ],
            0,
            1,
        )
    }

    #[test]
    fn barrierless_scan() {
        let s = complex();
        let m = Molpro::new(&s, "molpro");
        let t = Template::from(
            "{{.natom}}|{{.geom}}|{{.scancoo}}|{{.scanstart}}|{{.shift}}|{{.nelectron}}",
        );
        let calc = Calculation::BarrierlessScan {
            space: space(4),
            shift: Vector3::new(2.0, 0.0, 0.0),
            natom1: 2,
        };
        let got = m.input(&t, "complex", &calc).unwrap();
        assert_eq!(
            got,
            "4|\
C 0.00000000 0.00000000 0.00000000
H 0.00000000 0.00000000 1.09000000
|O s6 s7 s8
H s9 s10 s11
|s6 = 3.00000000
s7= 0.00000000
s8= 0.00000000
s9 = 3.97000000
s10= 0.00000000
s11= 0.00000000
|s6 = s6 + 0.50000000
s7 = s7 + 0.00000000
s8 = s8 + 0.00000000
s9 = s9 + 0.50000000
s10 = s10 + 0.00000000
s11 = s11 + 0.00000000
|16"
        );
    }

    #[test]
    fn scan_default_template() {
        let s = complex();
        let m = Molpro::new(&s, "molpro");
        let calc = Calculation::BarrierlessScan {
            space: space(4),
            shift: Vector3::new(0.0, 1.0, 1.0),
            natom1: 1,
        };
        let got = m.input(&calc.default_template(), "complex", &calc).unwrap();
        assert!(got.contains("H 0.00000000 0.00000000 1.09000000\nO"));
        assert!(got.contains("H s9 s10 s11\n}\n"));
        assert!(got.contains("s10 = s10 + 0.35355339\n"));
        assert!(!got.contains("{{."));
    }

    #[test]
    fn scan_invalid() {
        let s = complex();
        let m = Molpro::new(&s, "molpro");
        let t = Template::from("");
        for (shift, natom1) in [(Vector3::zeros(), 2), (Vector3::x(), 5)] {
            let calc = Calculation::BarrierlessScan {
                space: space(4),
                shift,
                natom1,
            };
            let got = m.input(&t, "complex", &calc);
            assert!(matches!(got, Err(ProgramError::InvalidInput(_))));
        }
    }

    fn vrc() -> VrcTst {
        VrcTst {
            basis: "cc-pvdz".to_owned(),
            method: "casscf".to_owned(),
            options: None,
            displacements: Displacements {
                optg: true,
                active: vec!["x".to_owned()],
                inactive: vec!["dist_1".to_owned(), "angle_2".to_owned()],
            },
            put: Put {
                xml: true,
                molden: false,
                xyz: true,
            },
            variables: "r = 3.0".to_owned(),
            geom_type: GeomType::Xyz,
        }
    }

    const VRC_TEMPLATE: &str = "{{.options}}|{{.basis}}|{{.geometry_block}}|\
{{.variables}}|{{.methods_block}}|{{.put_block}}|{{.name}}";

    #[test]
    fn vrc_tst_xyz() {
        let s = water();
        let m = Molpro::new(&s, "molpro");
        let calc = Calculation::VrcTst(vrc());
        let got = m.input(&Template::from(VRC_TEMPLATE), "vrc0", &calc);
        assert_eq!(
            got.unwrap(),
            format!(
                "{DEFAULT_VRC_TST_OPTIONS}|basis = cc-pvdz|geometry={{ \n\
                 3;\nwell0;\n{WATER_GEOM}\n}}\n|r = 3.0\n|\
                 rhf;\n casscf;\n\n{{optg;\ninactive, dist_1,angle_2;}}|\
                 {{put,xml,vrc0.xml}}\n{{put,xyz,vrc0_opt.xyz}}\n|vrc0"
            )
        );
    }

    #[test]
    fn vrc_tst_zmat() {
        let s = water();
        let m = Molpro::new(&s, "molpro");
        let mut v = vrc();
        v.geom_type = GeomType::Zmat;
        v.variables = String::new();
        v.options = Some("gthresh,energy=1.d-8;\n".to_owned());
        let t = Template::from("{{.options}}{{.variables}}{{.geometry_block}}");
        let got = m.input(&t, "vrc0", &Calculation::VrcTst(v)).unwrap();
        let want = [
            "gthresh,energy=1.d-8;",
            "",
            "     dist_1 =      0.95861;",
            "     dist_2 =      1.51492;",
            "    angle_2 =     37.79949;",
            "geometry={ ",
            "O0",
            "H1, O0, dist_1",
            "H2, H1, dist_2, O0, angle_2",
            "}",
        ];
        assert_eq!(got, want.join("\n") + "\n");
    }

    fn peroxide() -> Species {
        Species::new(
            "hooh",
            "3",
            atoms![
                H 0.9 0.8 0.4
                O 0.0 0.7 0.0
                O 0.0 -0.7 0.0
                H -0.9 -0.8 0.4
            ],
            0,
            1,
        )
    }

    #[test]
    fn vrc_tst_zmat_dihedral() {
        let s = peroxide();
        let m = Molpro::new(&s, "molpro");
        let mut v = vrc();
        v.geom_type = GeomType::Zmat;
        v.variables = "r = 3.0".to_owned();
        let t = Template::from("{{.variables}}{{.geometry_block}}");
        let got = m.input(&t, "vrc0", &Calculation::VrcTst(v)).unwrap();
        let want = [
            "r = 3.0",
            "     dist_1 =      0.98995;",
            "     dist_2 =      1.40000;",
            "    angle_2 =     95.79764;",
            "     dist_3 =      0.98995;",
            "    angle_3 =     95.79764;",
            "    dihed_3 =    132.07502;",
            "geometry={ ",
            "H0",
            "O1, H0, dist_1",
            "O2, O1, dist_2, H0, angle_2",
            "H3, O2, dist_3, O1, angle_3, H0, dihed_3",
            "}",
        ];
        assert_eq!(got, want.join("\n") + "\n");
    }

    #[test]
    fn vrc_tst_default_template() {
        let s = water();
        let m = Molpro::new(&s, "molpro");
        let calc = Calculation::VrcTst(vrc());
        let got = m.input(&calc.default_template(), "vrc0", &calc).unwrap();
        assert!(got.starts_with("***,vrc0\n"));
        assert!(got.contains("set,nelec=10\n"));
        assert!(!got.contains("{{."));
    }
}

mod blocks {
    use test_case::test_case;

    use super::*;

    #[test_case(false, &[], &[] => "rhf;\n mp2" ; "no optg")]
    #[test_case(true, &[], &[] => "rhf;\n mp2;\n\n{optg}" ; "bare optg")]
    #[test_case(true, &["r", "theta"], &[] =>
        "rhf;\n mp2;\n\n{optg;\nactive, r,theta;}" ; "active")]
    #[test_case(true, &["r"], &["phi"] =>
        "rhf;\n mp2;\n\n{optg;\ninactive, phi;}" ; "inactive wins")]
    fn methods(optg: bool, active: &[&str], inactive: &[&str]) -> String {
        fn to_vec(v: &[&str]) -> Vec<String> {
            v.iter().map(|s| s.to_string()).collect()
        }
        let v = VrcTst {
            method: "mp2".to_owned(),
            displacements: Displacements {
                optg,
                active: to_vec(active),
                inactive: to_vec(inactive),
            },
            ..Default::default()
        };
        Molpro::methods_block(&v)
    }

    #[test]
    fn put() {
        let all = Put {
            xml: true,
            molden: true,
            xyz: true,
        };
        assert_eq!(
            Molpro::put_block("a", &all),
            "{put,xml,a.xml}\n{put,molden,a.molden}\n{put,xyz,a_opt.xyz}\n"
        );
        assert_eq!(Molpro::put_block("a", &Put::default()), "");
    }
}

mod read_output {
    use super::*;

    #[test]
    fn last_setting_wins() {
        let s = water();
        let m = Molpro::new(&s, "testfiles/molpro");
        assert_eq!(m.read_energy("MYENA", "well0", false), Ok(-76.34412305));
        assert_eq!(m.read_energy("MYENB", "", true), Ok(-76.36983962));
    }

    #[test]
    fn parent_dir() {
        let s = water();
        // only reachable through ../qcio/testfiles/molpro from the crate root
        let m = Molpro::new(&s, "qcio/testfiles/molpro");
        assert_eq!(m.read_energy("MYENB", "well0", false), Ok(-76.36983962));
    }

    #[test]
    fn proton() {
        let s = Species::new("H+", PROTON_CHEMID, atoms![H 0.0 0.0 0.0], 1, 1);
        let m = Molpro::new(&s, "/nonexistent");
        assert_eq!(m.read_energy("MYENA", "", false), Ok(0.0));
    }

    #[test]
    fn missing() {
        let s = water();
        let m = Molpro::new(&s, "testfiles/molpro");
        let got = m.read_energy("MYENA", "", false);
        assert!(got.unwrap_err().is_file_not_found());
    }

    #[test]
    fn missing_key() {
        let got = read_output(Path::new("testfiles/molpro/crashed.out"), "MYENA");
        assert!(got.unwrap_err().is_energy_not_found());
        let got = read_output(Path::new("testfiles/molpro/well0.out"), "MYENC");
        assert!(got.unwrap_err().is_energy_not_found());
    }

    #[test]
    fn garbled() {
        let got = read_output(Path::new("testfiles/molpro/garbled.out"), "MYENA");
        assert_eq!(
            got,
            Err(ProgramError::EnergyParseError(
                "testfiles/molpro/garbled.out".to_owned()
            ))
        );
    }
}
