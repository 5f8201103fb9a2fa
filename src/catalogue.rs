//! Galaxy catalogues in (ra, dec, z, weight) form
//!
//! Catalogues are converted to Cartesian comoving positions with FKP weights.
use crate::config::ConversionConfig;
use crate::cosmo::{comoving_distance, z_to_a, Lcdm};
use crate::lineio::{self, parse_floats, LineReader, Table};
use crate::numerics::spline::{Spline, SplineType};
use crate::traits::LineRecord;
use crate::{Error, Result};
use itertools::Itertools;
use log::info;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A single object
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rdzw {
    /// Right ascension in degrees
    pub ra: f64,
    /// Declination in degrees
    pub dec: f64,
    /// Redshift
    pub z: f64,
    /// Weight
    pub weight: f64,
}

impl Rdzw {
    /// Parse a whitespace separated `ra dec z weight` line
    pub fn parse(line: &str) -> Result<Self> {
        let mut values = [0.0; 4];
        parse_floats(line, " ", &mut values)?;
        let [ra, dec, z, weight] = values;
        Ok(Self { ra, dec, z, weight })
    }

    /// Unit vector towards the object
    pub fn direction(&self) -> [f64; 3] {
        let theta = (90.0 - self.dec).to_radians();
        let phi = self.ra.to_radians();
        [
            theta.sin() * phi.cos(),
            theta.sin() * phi.sin(),
            theta.cos(),
        ]
    }
}

/// A catalogue read into memory
#[derive(Debug, Clone, Default)]
pub struct RdzwCatalogue(pub Vec<Rdzw>);

impl RdzwCatalogue {
    /// Read a catalogue file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let mut catalogue = Self::default();
        lineio::read(path, &mut catalogue)?;
        Ok(catalogue)
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Is the catalogue empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl LineRecord for RdzwCatalogue {
    fn add(&mut self, line: &str) -> Result<()> {
        self.0.push(Rdzw::parse(line)?);
        Ok(())
    }
}

/// Read a `z n(z)` file and spline the FKP weight `1 / (1 + n(z) pk)`
pub fn read_weight_spline(path: impl AsRef<Path>, pk: f64) -> Result<Spline> {
    let path = path.as_ref();
    info!("Reading weights from {}", path.display());
    let mut table = Table::with_columns(2);
    lineio::read(path, &mut table)?;
    let z = table.column(0)?;
    let fkp = table
        .column(1)?
        .into_iter()
        .map(|nz| 1.0 / (1.0 + nz * pk))
        .collect_vec();
    Spline::new(SplineType::Cubic, &z, &fkp)
}

/// Number of intervals used to tabulate distances
pub const DISTANCE_INTERVALS: usize = 1000;

/// Spline the comoving distance in Mpc/h over `[zmin, zmax]` for a flat cosmology
pub fn distance_spline(om: f64, zmin: f64, zmax: f64) -> Result<Spline> {
    let valid = zmin.is_finite() && zmax.is_finite() && zmin >= 0.0 && zmin < zmax;
    if !valid {
        return Err(Error::InvalidArgument(format!(
            "invalid redshift range [{zmin}, {zmax}]"
        )));
    }
    let cosmology = Lcdm::new_flat_simple(om, 1.0);
    let dz = (zmax - zmin) / DISTANCE_INTERVALS as f64;
    let z = (0..=DISTANCE_INTERVALS)
        .map(|i| {
            if i == DISTANCE_INTERVALS {
                zmax
            } else {
                zmin + i as f64 * dz
            }
        })
        .collect_vec();
    let a = z.iter().map(|&z| z_to_a(z)).collect_vec();
    let distance = comoving_distance(&cosmology, &a)?;
    Spline::new(SplineType::Cubic, &z, &distance)
}

/// An axis aligned box containing a set of points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Lower corner
    pub lo: [f64; 3],
    /// Upper corner
    pub hi: [f64; 3],
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            lo: [f64::MAX; 3],
            hi: [f64::MIN; 3],
        }
    }
}

impl BoundingBox {
    /// Grow the box to contain `p`
    pub fn include(&mut self, p: [f64; 3]) {
        for i in 0..3 {
            self.lo[i] = self.lo[i].min(p[i]);
            self.hi[i] = self.hi[i].max(p[i]);
        }
    }

    /// Grow the box to contain `other`
    ///
    /// Merging an empty box changes nothing.
    pub fn merge(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.include(other.lo);
        self.include(other.hi);
    }

    /// Does the box contain no points?
    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.lo[i] > self.hi[i])
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.4} {:.4} {:.4}] -- [{:.4} {:.4} {:.4}]",
            self.lo[0], self.lo[1], self.lo[2], self.hi[0], self.hi[1], self.hi[2]
        )
    }
}

/// Summary of a converted file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionStats {
    /// Smallest redshift in the input
    pub zmin: f64,
    /// Largest redshift in the input
    pub zmax: f64,
    /// Objects outside of the redshift range
    pub removed: usize,
    /// Objects written
    pub written: usize,
    /// Bounds of the written positions
    pub bounds: BoundingBox,
}

impl Default for ConversionStats {
    fn default() -> Self {
        Self {
            zmin: f64::INFINITY,
            zmax: f64::NEG_INFINITY,
            removed: 0,
            written: 0,
            bounds: BoundingBox::default(),
        }
    }
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "zmin, zmax = {:.6}, {:.6}, {} objects removed, {} written",
            self.zmin, self.zmax, self.removed, self.written
        )
    }
}

/// Converts (ra, dec, z, weight) catalogues to (x, y, z, weight, index)
#[derive(Debug, Clone)]
pub struct Converter {
    zmin: f64,
    zmax: f64,
    distance: Spline,
    weight: Spline,
}

impl Converter {
    /// A converter keeping redshifts in `[zmin, zmax)`
    pub fn new(zmin: f64, zmax: f64, distance: Spline, weight: Spline) -> Self {
        Self {
            zmin,
            zmax,
            distance,
            weight,
        }
    }

    /// A converter built from a configuration, reading its weight file
    pub fn from_config(config: &ConversionConfig) -> Result<Self> {
        let weight = read_weight_spline(&config.weight, config.pk)?;
        let distance = distance_spline(config.om, config.zmin, config.zmax)?;
        Ok(Self::new(config.zmin, config.zmax, distance, weight))
    }

    /// Comoving position and FKP weight of an object, or None if it is outside the redshift range
    pub fn convert(&self, object: &Rdzw) -> Result<Option<([f64; 3], f64)>> {
        if object.z < self.zmin || object.z >= self.zmax {
            return Ok(None);
        }
        let r = self.distance.eval(object.z)?;
        let weight = self.weight.eval(object.z)?;
        Ok(Some((object.direction().map(|d| r * d), weight)))
    }
}

struct Conversion<'c, W: Write> {
    converter: &'c Converter,
    out: W,
    stats: ConversionStats,
}

impl<W: Write> LineRecord for Conversion<'_, W> {
    fn add(&mut self, line: &str) -> Result<()> {
        let object = Rdzw::parse(line)?;
        self.stats.zmin = self.stats.zmin.min(object.z);
        self.stats.zmax = self.stats.zmax.max(object.z);
        match self.converter.convert(&object)? {
            Some((p, w)) => {
                self.stats.written += 1;
                writeln!(
                    self.out,
                    "{:10.4} {:10.4} {:10.4} {:7.4} {:8}",
                    p[0], p[1], p[2], w, self.stats.written
                )?;
                self.stats.bounds.include(p);
            }
            None => self.stats.removed += 1,
        }
        Ok(())
    }
}

/// Convert one catalogue file
///
/// Output rows are numbered from 1.
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    converter: &Converter,
) -> Result<ConversionStats> {
    let out = BufWriter::new(File::create(output)?);
    let mut conversion = Conversion {
        converter,
        out,
        stats: ConversionStats::default(),
    };
    LineReader::default().parse_file(input, &mut conversion)?;
    conversion.out.flush()?;
    Ok(conversion.stats)
}

/// Convert files `first..last` of a numbered set in parallel
///
/// File names are built with [expand_pattern]. Returns the bounding box of all written positions.
pub fn convert_files(
    converter: &Converter,
    input_pattern: &str,
    output_pattern: &str,
    first: usize,
    last: usize,
) -> Result<BoundingBox> {
    let boxes = (first..last)
        .into_par_iter()
        .map(|i| -> Result<BoundingBox> {
            let input = expand_pattern(input_pattern, i)?;
            let output = expand_pattern(output_pattern, i)?;
            info!("Processing {input} --> {output} ...");
            let stats = convert_file(&input, &output, converter)?;
            info!("{input} had {stats}");
            info!("{input} bounds {}", stats.bounds);
            Ok(stats.bounds)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut bounds = BoundingBox::default();
    for b in &boxes {
        bounds.merge(b);
    }
    Ok(bounds)
}

/// Substitute `i` into a printf-style pattern
///
/// Supports `%d`, `%i`, their zero padded forms such as `%03d`, and `%%`.
pub fn expand_pattern(pattern: &str, i: usize) -> Result<String> {
    let invalid = || Error::InvalidArgument(format!("unsupported pattern `{pattern}`"));
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();
    let mut substituted = false;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }
        let zero = chars.peek() == Some(&'0');
        let mut width = 0;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            width = 10 * width + d as usize;
            chars.next();
        }
        match chars.next() {
            Some('d') | Some('i') if zero => out.push_str(&format!("{i:0width$}")),
            Some('d') | Some('i') => out.push_str(&format!("{i:width$}")),
            _ => return Err(invalid()),
        }
        substituted = true;
    }

    if substituted {
        Ok(out)
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ndparticles-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_expand_pattern() {
        assert_eq!(expand_pattern("a%03d.rdzw", 7).unwrap(), "a007.rdzw");
        assert_eq!(expand_pattern("a%03i.dat", 12).unwrap(), "a012.dat");
        assert_eq!(expand_pattern("a%i.dat", 1234).unwrap(), "a1234.dat");
        assert_eq!(expand_pattern("%3d", 5).unwrap(), "  5");
        assert_eq!(expand_pattern("100%%-%d", 5).unwrap(), "100%-5");
        assert!(expand_pattern("a%s", 5).is_err());
        assert!(expand_pattern("plain", 5).is_err());
    }

    #[test]
    fn test_parse() {
        let r = Rdzw::parse("  10.5 -3.25   0.55 1.0 ").unwrap();
        assert_eq!(
            r,
            Rdzw {
                ra: 10.5,
                dec: -3.25,
                z: 0.55,
                weight: 1.0
            }
        );
        assert!(Rdzw::parse("1 2 3").is_err());
    }

    #[test]
    fn test_direction() {
        let north = Rdzw {
            dec: 90.0,
            ..Default::default()
        };
        let d = north.direction();
        assert_abs_diff_eq!(d[2], 1.0, epsilon = 1e-12);
        let east = Rdzw {
            ra: 90.0,
            ..Default::default()
        };
        let d = east.direction();
        assert_abs_diff_eq!(d[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bounding_box() {
        let mut b = BoundingBox::default();
        assert!(b.is_empty());
        b.include([1.0, -1.0, 2.0]);
        b.include([0.0, 3.0, 2.5]);
        assert_eq!(b.lo, [0.0, -1.0, 2.0]);
        assert_eq!(b.hi, [1.0, 3.0, 2.5]);
        let mut c = BoundingBox::default();
        c.merge(&b);
        assert_eq!(c, b);
    }

    #[test]
    fn test_merge_empty() {
        let mut b = BoundingBox::default();
        b.include([1.0, 2.0, 3.0]);
        b.merge(&BoundingBox::default());
        assert_eq!(b.lo, [1.0, 2.0, 3.0]);
        assert_eq!(b.hi, [1.0, 2.0, 3.0]);

        let mut empty = BoundingBox::default();
        empty.merge(&BoundingBox::default());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_distance_spline() {
        let sp = distance_spline(0.274, 0.43, 0.7).unwrap();
        let cosmology = Lcdm::new_flat_simple(0.274, 1.0);
        let expected = comoving_distance(&cosmology, &[z_to_a(0.555)]).unwrap()[0];
        assert_relative_eq!(sp.eval(0.555).unwrap(), expected, max_relative = 1e-6);
        assert!(distance_spline(0.274, 0.7, 0.43).is_err());
    }

    #[test]
    fn test_convert_file() {
        let weights = temp_path("weights.dat");
        let input = temp_path("input.rdzw");
        let output = temp_path("output.dat");
        std::fs::write(
            &weights,
            "# z n(z)\n0.4 1e-4\n0.5 1e-4\n0.6 1e-4\n0.7 1e-4\n0.8 1e-4\n",
        )
        .unwrap();
        std::fs::write(
            &input,
            "10.0 0.0 0.5 1.0\n0.0 90.0 0.6 1.0\n0.0 0.0 0.3 1.0\n0.0 0.0 0.7 1.0\n",
        )
        .unwrap();

        let converter = Converter::new(
            0.43,
            0.7,
            distance_spline(0.274, 0.43, 0.7).unwrap(),
            read_weight_spline(&weights, 20000.0).unwrap(),
        );
        let stats = convert_file(&input, &output, &converter).unwrap();
        assert_eq!(stats.written, 2);
        assert_eq!(stats.removed, 2);
        assert_eq!(stats.zmin, 0.3);
        assert_eq!(stats.zmax, 0.7);

        let mut table = Table::with_columns(5);
        lineio::read(&output, &mut table).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column(4).unwrap(), vec![1.0, 2.0]);
        for w in table.column(3).unwrap() {
            assert_abs_diff_eq!(w, 1.0 / 3.0, epsilon = 1e-4);
        }

        let cosmology = Lcdm::new_flat_simple(0.274, 1.0);
        let r = comoving_distance(&cosmology, &[z_to_a(0.6)]).unwrap()[0];
        let row = &table.rows()[1];
        assert_abs_diff_eq!(row[0], 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(row[1], 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(row[2], r, epsilon = 1e-3);
        assert_abs_diff_eq!(stats.bounds.hi[2], r, epsilon = 1e-6);

        for path in [weights, input, output] {
            std::fs::remove_file(path).unwrap();
        }
    }
}
