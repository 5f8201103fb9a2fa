//! Weighted particles
use crate::traits::{Element, Positioned};
use mpi::traits::Equivalence;
use rand::Rng;
use std::fmt;

/// A particle with a position and a weight
#[derive(Debug, Clone, Copy, Default, PartialEq, Equivalence)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PosWeight {
    /// Position
    pub pos: [f32; 3],
    /// Weight
    pub weight: f32,
}

impl PosWeight {
    /// Fill `records` with positions uniform in `[0, max_length)^3` and weights uniform in
    /// `[0, max_weight)`
    pub fn fill_random(records: &mut [Self], rng: &mut impl Rng, max_length: f32, max_weight: f32) {
        for r in records {
            for x in r.pos.iter_mut() {
                *x = rng.gen::<f32>() * max_length;
            }
            r.weight = rng.gen::<f32>() * max_weight;
        }
    }
}

impl Element for PosWeight {}

impl Positioned for PosWeight {
    const DIM: usize = 3;

    fn position(&self, axis: usize) -> f64 {
        f64::from(self.pos[axis])
    }
}

impl fmt::Display for PosWeight {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:8.4} {:8.4} {:8.4} {:8.4}",
            self.pos[0], self.pos[1], self.pos[2], self.weight
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_fill_random() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut records = vec![PosWeight::default(); 100];
        PosWeight::fill_random(&mut records, &mut rng, 10.0, 2.0);
        for r in &records {
            for x in r.pos {
                assert!((0.0..10.0).contains(&x));
            }
            assert!((0.0..2.0).contains(&r.weight));
        }
        assert!(records.iter().any(|r| r.pos[0] != records[0].pos[0]));
    }

    #[test]
    fn test_position() {
        let p = PosWeight {
            pos: [1.0, 2.0, 3.0],
            weight: 0.5,
        };
        assert_eq!(p.position(2), 3.0);
        assert_eq!(p.to_string(), "  1.0000   2.0000   3.0000   0.5000");
    }
}
