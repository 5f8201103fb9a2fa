//! printf-style float formats
use crate::{Error, Result};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Fixed,
    Exponent,
    UpperExponent,
}

/// A printf-style format for a single float, such as `%10.4f` or `%.3e`
///
/// The flags `-` (left align) and `0` (zero padding) are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFormat {
    width: usize,
    precision: usize,
    left: bool,
    zero: bool,
    conversion: Conversion,
}

impl Default for FieldFormat {
    fn default() -> Self {
        Self {
            width: 0,
            precision: 6,
            left: false,
            zero: false,
            conversion: Conversion::Fixed,
        }
    }
}

impl FieldFormat {
    /// Format a value
    pub fn format(&self, value: f64) -> String {
        let body = if !value.is_finite() {
            let s = if value.is_nan() { "nan" } else { "inf" };
            if value.is_sign_negative() && !value.is_nan() {
                format!("-{s}")
            } else {
                s.to_string()
            }
        } else {
            match self.conversion {
                Conversion::Fixed => format!("{:.*}", self.precision, value),
                Conversion::Exponent => exponent(value, self.precision),
                Conversion::UpperExponent => exponent(value, self.precision).to_uppercase(),
            }
        };
        let pad = self.width.saturating_sub(body.len());
        if pad == 0 {
            body
        } else if self.left {
            format!("{body}{}", " ".repeat(pad))
        } else if self.zero && value.is_finite() {
            let (sign, digits) = match body.strip_prefix('-') {
                Some(d) => ("-", d),
                None => ("", body.as_str()),
            };
            format!("{sign}{}{digits}", "0".repeat(pad))
        } else {
            format!("{}{body}", " ".repeat(pad))
        }
    }
}

// C style exponent: at least two digits and an explicit sign.
fn exponent(value: f64, precision: usize) -> String {
    let s = format!("{:.*e}", precision, value);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp = exp.parse::<i32>().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => s,
    }
}

impl FromStr for FieldFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument(format!("unsupported float format `{s}`"));
        let mut rest = s.strip_prefix('%').ok_or_else(invalid)?;
        let mut format = Self::default();

        while let Some(c) = rest.chars().next() {
            match c {
                '-' => format.left = true,
                '0' => format.zero = true,
                _ => break,
            }
            rest = &rest[1..];
        }

        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits > 0 {
            format.width = rest[..digits].parse().map_err(|_| invalid())?;
        }
        rest = &rest[digits..];

        if let Some(after) = rest.strip_prefix('.') {
            let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();
            format.precision = if digits > 0 {
                after[..digits].parse().map_err(|_| invalid())?
            } else {
                0
            };
            rest = &after[digits..];
        }

        format.conversion = match rest {
            "f" | "F" => Conversion::Fixed,
            "e" => Conversion::Exponent,
            "E" => Conversion::UpperExponent,
            _ => return Err(invalid()),
        };
        Ok(format)
    }
}

impl fmt::Display for FieldFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "%")?;
        if self.left {
            write!(f, "-")?;
        }
        if self.zero {
            write!(f, "0")?;
        }
        if self.width > 0 {
            write!(f, "{}", self.width)?;
        }
        let c = match self.conversion {
            Conversion::Fixed => 'f',
            Conversion::Exponent => 'e',
            Conversion::UpperExponent => 'E',
        };
        write!(f, ".{}{}", self.precision, c)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fmt(format: &str, value: f64) -> String {
        format.parse::<FieldFormat>().unwrap().format(value)
    }

    #[test]
    fn test_fixed() {
        assert_eq!(fmt("%10.4f", 3.14159), "    3.1416");
        assert_eq!(fmt("%f", 2.5), "2.500000");
        assert_eq!(fmt("%.0f", 2.7), "3");
        assert_eq!(fmt("%.f", 2.7), "3");
        assert_eq!(fmt("%3.1f", -12.26), "-12.3");
    }

    #[test]
    fn test_exponent() {
        assert_eq!(fmt("%e", 1234.5), "1.234500e+03");
        assert_eq!(fmt("%.2e", -0.000123), "-1.23e-04");
        assert_eq!(fmt("%.1E", 0.0), "0.0E+00");
        assert_eq!(fmt("%12.3e", 1.0e100), "  1.000e+100");
    }

    #[test]
    fn test_flags() {
        assert_eq!(fmt("%-8.2f", 1.5), "1.50    ");
        assert_eq!(fmt("%08.3f", -1.5), "-001.500");
        assert_eq!(fmt("%6.2f", f64::NAN), "   nan");
        assert_eq!(fmt("%6.2f", f64::NEG_INFINITY), "  -inf");
    }

    #[test]
    fn test_invalid() {
        for s in ["10.4f", "%q", "%10.4", "%d", "%10.4fx", ""] {
            assert!(s.parse::<FieldFormat>().is_err(), "{s}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!("%10.4f".parse::<FieldFormat>().unwrap().to_string(), "%10.4f");
        assert_eq!("%-e".parse::<FieldFormat>().unwrap().to_string(), "%-.6e");
    }
}
