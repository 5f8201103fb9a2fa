//! Special functions
use crate::{Error, NumericalError, Result};

const BIG: f64 = 1.0e250;

// Above this argument, and for orders well below it, the Hankel expansion replaces the backward
// recurrence, whose length grows with x.
const ASYMPTOTIC_X: f64 = 1.0e4;

// J_0(x), ..., J_nmax(x) for x > 0 by backward recurrence, normalised with
// J_0 + 2 J_2 + 2 J_4 + ... = 1.
fn miller(nmax: usize, x: f64) -> Vec<f64> {
    let top = nmax.max(x.ceil() as usize);
    let mut start = top + 15 + (40.0 * top as f64).sqrt() as usize;
    start += start % 2;

    let mut values = vec![0.0; nmax + 1];
    let mut next = 0.0;
    let mut current = 1.0;
    let mut sum = 0.0;

    for k in (0..=start).rev() {
        if k <= nmax {
            values[k] = current;
        }
        if k == 0 {
            sum += current;
            break;
        }
        if k % 2 == 0 {
            sum += 2.0 * current;
        }
        let previous = 2.0 * k as f64 / x * current - next;
        next = current;
        current = previous;
        if current.abs() > BIG {
            current /= BIG;
            next /= BIG;
            sum /= BIG;
            for v in values.iter_mut() {
                *v /= BIG;
            }
        }
    }

    for v in values.iter_mut() {
        *v /= sum;
    }
    values
}

// J_nu(x) for nu = 0 or 1 and large x from the Hankel expansion
// J_nu(x) = sqrt(2 / (pi x)) (P cos(chi) - Q sin(chi)), chi = x - (nu / 2 + 1 / 4) pi.
fn hankel(nu: f64, x: f64) -> f64 {
    let mu = 4.0 * nu * nu;
    let (mut p, mut q) = (0.0, 0.0);
    let mut term = 1.0;
    for k in 0..40 {
        match k % 4 {
            0 => p += term,
            1 => q += term,
            2 => p -= term,
            _ => q -= term,
        }
        let odd = (2 * k + 1) as f64;
        let next = term * (mu - odd * odd) / ((k + 1) as f64 * 8.0 * x);
        if next.abs() < f64::EPSILON * p.abs() {
            break;
        }
        term = next;
    }
    let phase = (0.5 * nu + 0.25) * std::f64::consts::PI;
    let (sin_x, cos_x) = x.sin_cos();
    let cos_chi = cos_x * phase.cos() + sin_x * phase.sin();
    let sin_chi = sin_x * phase.cos() - cos_x * phase.sin();
    (2.0 / (std::f64::consts::PI * x)).sqrt() * (p * cos_chi - q * sin_chi)
}

// J_0(x), ..., J_nmax(x) for large x by forward recurrence, which is stable for n < x.
fn forward(nmax: usize, x: f64) -> Vec<f64> {
    let mut values = Vec::with_capacity(nmax + 1);
    values.push(hankel(0.0, x));
    if nmax > 0 {
        values.push(hankel(1.0, x));
    }
    for n in 1..nmax {
        values.push(2.0 * n as f64 / x * values[n] - values[n - 1]);
    }
    values
}

fn sign(n: usize) -> f64 {
    if n % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// The regular cylindrical Bessel functions J_n(x) for `nmin <= n <= nmax`
pub fn bessel_j_array(nmin: usize, nmax: usize, x: f64) -> Result<Vec<f64>> {
    if nmin > nmax {
        return Err(Error::InvalidArgument(format!(
            "empty order range {nmin}..={nmax}"
        )));
    }
    if !x.is_finite() {
        return Err(NumericalError::Domain.into());
    }
    if x == 0.0 {
        return Ok((nmin..=nmax)
            .map(|n| if n == 0 { 1.0 } else { 0.0 })
            .collect());
    }
    let ax = x.abs();
    let values = if ax > ASYMPTOTIC_X && 2.0 * (nmax as f64) < ax {
        forward(nmax, ax)
    } else {
        miller(nmax, ax)
    };
    Ok((nmin..=nmax)
        .map(|n| {
            if x < 0.0 {
                sign(n) * values[n]
            } else {
                values[n]
            }
        })
        .collect())
}

/// The regular cylindrical Bessel function J_n(x) of integer order
pub fn bessel_j(n: i32, x: f64) -> Result<f64> {
    let order = n.unsigned_abs() as usize;
    let value = bessel_j_array(order, order, x)?[0];
    Ok(if n < 0 { sign(order) * value } else { value })
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    const XS: [f64; 5] = [0.1, 1.0, 2.0, 10.0, 100.0];

    #[test]
    fn test_at_zero() {
        assert_abs_diff_eq!(bessel_j(0, 0.0).unwrap(), 1.0, epsilon = 1e-13);
        for n in 1..25 {
            assert_abs_diff_eq!(bessel_j(n, 0.0).unwrap(), 0.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_j0() {
        let expected = [
            0.99750156206604003228,
            0.76519768655796655145,
            0.22389077914123566805,
            -0.24593576445134833521,
            0.019985850304223122424,
        ];
        for (x, e) in XS.iter().zip(expected) {
            assert_abs_diff_eq!(bessel_j(0, *x).unwrap(), e, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_j5() {
        let expected = [
            2.6030817909644408340e-9,
            0.00024975773021123443138,
            0.0070396297558716854842,
            -0.23406152818679364044,
            -0.074195736964513920834,
        ];
        for (x, e) in XS.iter().zip(expected) {
            assert_abs_diff_eq!(bessel_j(5, *x).unwrap(), e, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_j19() {
        let expected = [
            1.5677657562983752611e-42,
            1.5484784412116534205e-23,
            7.8192432733637439506e-18,
            0.000043146277524562556633,
            -0.038093921164499174989,
        ];
        for (x, e) in XS.iter().zip(expected) {
            assert_abs_diff_eq!(bessel_j(19, *x).unwrap(), e, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_array() {
        let expected = [
            0.18288505664015526694,
            -0.12117855082319186611,
            -0.20189345676928340280,
            0.057839427130867661307,
            0.22911201071322112576,
            0.085917128610761280349,
            -0.16172602748909463151,
            -0.23812986036520328635,
            -0.099749897617795251674,
            0.11295351825659748032,
            0.25921368809769757684,
        ];
        let values = bessel_j_array(0, 10, 12.75).unwrap();
        assert_eq!(values.len(), 11);
        for (v, e) in values.iter().zip(expected) {
            assert_abs_diff_eq!(*v, e, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_symmetry() {
        let x = 3.7;
        assert_abs_diff_eq!(
            bessel_j(3, -x).unwrap(),
            -bessel_j(3, x).unwrap(),
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            bessel_j(-3, x).unwrap(),
            -bessel_j(3, x).unwrap(),
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            bessel_j(-2, x).unwrap(),
            bessel_j(2, x).unwrap(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_large_argument() {
        let x = 1.0e15;
        assert_abs_diff_eq!(bessel_j(0, x).unwrap(), 6.1566386468850210e-9, epsilon = 1e-20);
        assert_abs_diff_eq!(bessel_j(2, x).unwrap(), -6.1566386468849726e-9, epsilon = 1e-20);
        assert_abs_diff_eq!(bessel_j(3, -x).unwrap(), 2.446866512377135e-8, epsilon = 1e-20);

        let values = bessel_j_array(0, 5, 12345.678).unwrap();
        assert_abs_diff_eq!(values[0], 3.058671332275825e-5, epsilon = 1e-15);
        assert_abs_diff_eq!(values[1], -0.007180894964739374, epsilon = 1e-15);
        assert_abs_diff_eq!(values[3], 0.007180884677732567, epsilon = 1e-15);
    }

    #[test]
    fn test_recurrences_agree() {
        let x = 20000.25;
        for (a, b) in miller(5, x).iter().zip(forward(5, x)) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-14);
        }
        assert_abs_diff_eq!(forward(4, x)[4], 0.005620930902823594, epsilon = 1e-15);
    }

    #[test]
    fn test_not_finite() {
        for x in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert!(matches!(
                bessel_j(0, x),
                Err(Error::Numerical(NumericalError::Domain))
            ));
            assert!(bessel_j_array(0, 3, x).is_err());
        }
    }

    #[test]
    fn test_empty_range() {
        assert!(bessel_j_array(3, 2, 1.0).is_err());
    }
}
