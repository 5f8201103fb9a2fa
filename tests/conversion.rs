use approx::assert_abs_diff_eq;
use ndparticles::catalogue::{convert_files, expand_pattern, Converter, Rdzw};
use ndparticles::config::ConversionConfig;
use ndparticles::lineio::{self, LineCount};
use std::path::PathBuf;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ndparticles-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_convert_numbered_files() {
    let dir = temp_dir("convert");
    let weights = dir.join("nz.dat");
    std::fs::write(&weights, "# z n(z)\n0.3 2e-4\n0.5 1e-4\n0.7 1e-4\n0.9 5e-5\n").unwrap();

    for i in 0..3 {
        let rows = (0..=i)
            .map(|k| {
                let k = k as f64;
                format!("{} {} {} 1.0\n", 30.0 * k, -10.0 + k, 0.45 + 0.05 * k)
            })
            .collect::<String>();
        std::fs::write(dir.join(format!("a{i:03}.rdzw")), rows + "0.0 0.0 0.2 1.0\n").unwrap();
    }

    let config = ConversionConfig {
        weight: weights.display().to_string(),
        input: dir.join("a%03d.rdzw").display().to_string(),
        output: dir.join("a%03d.dat").display().to_string(),
        first: 0,
        last: 3,
        ..Default::default()
    };
    config.validate().unwrap();
    let converter = Converter::from_config(&config).unwrap();
    let bounds = convert_files(&converter, &config.input, &config.output, config.first, config.last)
        .unwrap();
    assert!(!bounds.is_empty());

    for i in 0..3 {
        let output = expand_pattern(&config.output, i).unwrap();
        let mut count = LineCount::default();
        lineio::read(&output, &mut count).unwrap();
        assert_eq!(count.0, i + 1);
    }

    // All objects lie below the equator at right ascensions 0, 30 and 60 degrees
    let far = Rdzw {
        ra: 0.0,
        dec: 90.0,
        z: 0.55,
        weight: 1.0,
    };
    let rmax = converter.convert(&far).unwrap().unwrap().0[2];
    assert!(bounds.lo[0] > 0.0);
    assert_abs_diff_eq!(bounds.lo[1], 0.0, epsilon = 1e-9);
    assert!(bounds.hi[2] < 0.0);
    assert!(bounds.hi.iter().chain(&bounds.lo).all(|x| x.abs() <= rmax));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_input() {
    let dir = temp_dir("missing");
    let weights = dir.join("nz.dat");
    std::fs::write(&weights, "0.3 1e-4\n0.5 1e-4\n0.8 1e-4\n").unwrap();
    let config = ConversionConfig {
        weight: weights.display().to_string(),
        input: dir.join("b%d.rdzw").display().to_string(),
        output: dir.join("b%d.dat").display().to_string(),
        first: 0,
        last: 2,
        ..Default::default()
    };
    let converter = Converter::from_config(&config).unwrap();
    assert!(convert_files(&converter, &config.input, &config.output, 0, 2).is_err());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_file_without_objects_in_range() {
    let dir = temp_dir("filtered");
    let weights = dir.join("nz.dat");
    std::fs::write(&weights, "0.3 1e-4\n0.5 1e-4\n0.8 1e-4\n").unwrap();
    std::fs::write(dir.join("c0.rdzw"), "45.0 0.0 0.5 1.0\n").unwrap();
    std::fs::write(dir.join("c1.rdzw"), "0.0 0.0 0.1 1.0\n0.0 0.0 0.75 1.0\n").unwrap();

    let config = ConversionConfig {
        weight: weights.display().to_string(),
        input: dir.join("c%d.rdzw").display().to_string(),
        output: dir.join("c%d.dat").display().to_string(),
        first: 0,
        last: 2,
        ..Default::default()
    };
    let converter = Converter::from_config(&config).unwrap();
    let bounds = convert_files(&converter, &config.input, &config.output, 0, 2).unwrap();

    let object = Rdzw {
        ra: 45.0,
        dec: 0.0,
        z: 0.5,
        weight: 1.0,
    };
    let (p, _) = converter.convert(&object).unwrap().unwrap();
    assert_eq!(bounds.lo, p);
    assert_eq!(bounds.hi, p);

    let mut count = LineCount::default();
    lineio::read(dir.join("c1.dat"), &mut count).unwrap();
    assert_eq!(count.0, 0);

    std::fs::remove_dir_all(&dir).unwrap();
}
