use test_case::test_case;

use super::*;

#[test]
fn config() {
    let got = Config::load("testfiles/vfc.toml").unwrap();
    let want = Config {
        outfiles: "H2Ooutfiles".to_owned(),
        name: "H2O".to_owned(),
        settings: Settings {
            fit: FitSettings {
                r_threshold: 0.04,
                max_half_width: 8,
                ..FitSettings::default()
            },
            hessian: HessianSteps {
                dr: 0.1,
                ..HessianSteps::default()
            },
            units: Units::default(),
        },
    };
    assert_eq!(got, want);
}

#[test]
fn full_config() {
    let got = Config::load("testfiles/full.toml").unwrap();
    let want = Config::new("extracted/H2Soutfiles")
        .name("hydrogen sulfide")
        .settings(Settings {
            units: Units {
                hartree: 4.3597447222071e-18,
                degree: 0.017453292519943295,
                proton_mass: 1.67262192369e-27,
                angstrom: 1e-10,
                light_speed: 29979245800.0,
            },
            ..Settings::default()
        });
    assert_eq!(got, want);
}

#[test_case("H2Ooutfiles", "H2O")]
#[test_case("extracted/NH2outfiles", "NH2")]
#[test_case("SO", "SO")]
fn name(outfiles: &str, want: &str) {
    assert_eq!(Config::new(outfiles).name, want);
}

#[test]
fn unknown_field() {
    let got = Config::load("testfiles/unknown.toml");
    assert!(matches!(got, Err(ConfigError::ParseError(_))), "{got:?}");
}

#[test]
fn invalid() {
    let got = Config::load("testfiles/negative.toml");
    assert_eq!(
        got,
        Err(ConfigError::Invalid(
            "theta_step must be positive, got -1".to_owned()
        ))
    );
}

#[test_case(|s| s.fit.max_half_width = 0,
    "max_half_width must be between 1 and 1000, got 0"; "zero half-width")]
#[test_case(|s| s.fit.max_half_width = 1 << 40,
    "max_half_width must be between 1 and 1000, got 1099511627776";
    "huge half-width")]
#[test_case(|s| s.units.light_speed = 0.0,
    "units.light_speed must be positive, got 0"; "zero light speed")]
#[test_case(|s| s.units.proton_mass = -1.0,
    "units.proton_mass must be positive, got -1"; "negative mass")]
#[test_case(|s| s.hessian.dr = f64::INFINITY,
    "hessian.dr must be positive, got inf"; "infinite step")]
fn invalid_settings(edit: fn(&mut Settings), msg: &str) {
    let mut settings = Settings::default();
    edit(&mut settings);
    let got = Config::new("H2Ooutfiles").settings(settings).validate();
    assert_eq!(got, Err(ConfigError::Invalid(msg.to_owned())));
}

#[test]
fn max_half_width_limit() {
    let mut settings = Settings::default();
    settings.fit.max_half_width = 1000;
    let config = Config::new("H2Ooutfiles").settings(settings);
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn missing_file() {
    let got = Config::load("testfiles/nonexistent.toml");
    assert!(matches!(
        got,
        Err(ConfigError::ReadError(_, std::io::ErrorKind::NotFound))
    ));
}
