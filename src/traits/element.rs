//! Vector elements
use crate::{types::InsertMode, Error, Result};
use mpi::traits::Equivalence;

pub trait Element: Equivalence + Copy + Default {
    //! An element that can be stored in a distributed vector

    /// Combine `other` into `self`
    ///
    /// By default only [InsertMode::Insert] is supported.
    fn combine(&mut self, other: Self, mode: InsertMode) -> Result<()> {
        match mode {
            InsertMode::Insert => {
                *self = other;
                Ok(())
            }
            InsertMode::Add => Err(Error::AddUnsupported),
        }
    }
}

macro_rules! numeric_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn combine(&mut self, other: Self, mode: InsertMode) -> Result<()> {
                    match mode {
                        InsertMode::Insert => *self = other,
                        InsertMode::Add => *self += other,
                    }
                    Ok(())
                }
            }
        )*
    };
}

numeric_element!(f32, f64, i32, i64, u32, u64, usize);

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Copy, Default, Debug, PartialEq, Equivalence)]
    struct Pair {
        a: i32,
        b: f64,
    }

    impl Element for Pair {}

    #[test]
    fn test_numeric_combine() {
        let mut x = 2.0_f64;
        x.combine(3.0, InsertMode::Add).unwrap();
        assert_eq!(x, 5.0);
        x.combine(1.5, InsertMode::Insert).unwrap();
        assert_eq!(x, 1.5);
    }

    #[test]
    fn test_record_combine() {
        let mut p = Pair::default();
        p.combine(Pair { a: 1, b: 2.0 }, InsertMode::Insert).unwrap();
        assert_eq!(p, Pair { a: 1, b: 2.0 });
        assert!(matches!(
            p.combine(Pair { a: 1, b: 2.0 }, InsertMode::Add),
            Err(Error::AddUnsupported)
        ));
    }
}
