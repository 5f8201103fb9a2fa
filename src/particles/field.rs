//! Particles stored field by field
use super::FieldFormat;
use crate::{types::InsertMode, vector::DistributedVec, Error, Result};
use mpi::traits::{Communicator, CommunicatorCollectives};
use std::{collections::BTreeMap, io::Write};

/// Values of some particles, one array per field name
pub type LocalParticles = BTreeMap<String, Vec<f64>>;

/// Distributed particles with one `f64` vector per named field
///
/// All fields share the same layout.
pub struct FieldParticles<'a, C: Communicator> {
    names: Vec<String>,
    fields: BTreeMap<String, DistributedVec<'a, C, f64>>,
}

impl<'a, C: Communicator> FieldParticles<'a, C> {
    /// Create particles with the given fields, set to zero
    ///
    /// At least one of `local` and `global` must be given. This is a collective operation.
    pub fn new(
        comm: &'a C,
        names: &[&str],
        local: Option<usize>,
        global: Option<usize>,
    ) -> Result<Self> {
        let Some((first, rest)) = names.split_first() else {
            return Err(Error::InvalidArgument("particles need at least one field".into()));
        };
        let template = DistributedVec::new(comm, local, global)?;
        let mut fields = BTreeMap::new();
        for name in rest {
            fields.insert(name.to_string(), template.duplicate());
        }
        fields.insert(first.to_string(), template);
        if fields.len() != names.len() {
            return Err(Error::InvalidArgument("field names must be unique".into()));
        }
        Ok(Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            fields,
        })
    }

    /// Field names, in creation order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// A field
    pub fn field(&self, name: &str) -> Result<&DistributedVec<'a, C, f64>> {
        self.fields
            .get(name)
            .ok_or_else(|| Error::MissingField(name.to_string()))
    }

    /// A field, mutably
    pub fn field_mut(&mut self, name: &str) -> Result<&mut DistributedVec<'a, C, f64>> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| Error::MissingField(name.to_string()))
    }

    fn first(&self) -> Result<&DistributedVec<'a, C, f64>> {
        self.field(&self.names[0])
    }

    /// Number of particles on this rank
    pub fn nlocal(&self) -> Result<usize> {
        Ok(self.first()?.local_size())
    }

    /// Total number of particles
    pub fn ntotal(&self) -> Result<usize> {
        Ok(self.first()?.global_size())
    }

    /// Zeroed local storage for `n` particles, with every field
    pub fn new_local(&self, n: usize) -> LocalParticles {
        self.names
            .iter()
            .map(|name| (name.clone(), vec![0.0; n]))
            .collect()
    }

    /// Set the values of particles at global indices
    ///
    /// Only the fields present in `values` are set.
    pub fn set_values(
        &mut self,
        ix: &[usize],
        values: &LocalParticles,
        mode: InsertMode,
    ) -> Result<()> {
        for (name, v) in values {
            self.field_mut(name)?.set_values(ix, v, mode)?;
        }
        Ok(())
    }

    /// Assemble every field
    ///
    /// This is a collective operation.
    pub fn assemble(&mut self) -> Result<()> {
        for name in &self.names {
            if let Some(field) = self.fields.get_mut(name) {
                field.assemble()?;
            }
        }
        Ok(())
    }

    /// Local values of the given fields
    pub fn arrays(&self, names: &[&str]) -> Result<Vec<&[f64]>> {
        names
            .iter()
            .map(|name| self.field(name).map(|f| f.data()))
            .collect()
    }

    /// Write the particles as text, one particle per line
    ///
    /// Ranks write in turn. `formats` has a single entry used for every field or one entry per
    /// field. With `header`, rank 0 first writes a line with the field names and every rank
    /// writes a line with its particle counts. This is a collective operation.
    pub fn dump(
        &self,
        out: &mut impl Write,
        names: &[&str],
        formats: &[FieldFormat],
        header: bool,
    ) -> Result<()> {
        let formats = match formats.len() {
            1 => vec![formats[0]; names.len()],
            n if n == names.len() => formats.to_vec(),
            n => {
                return Err(Error::InvalidArgument(format!(
                    "{n} formats given for {} fields",
                    names.len()
                )))
            }
        };
        let arrays = self.arrays(names)?;
        let comm = self.first()?.comm();
        let rank = comm.rank();
        let size = comm.size();
        let ntotal = self.ntotal()?;

        // Keep taking part in the barriers after a failed write.
        let mut written = Ok(());
        for irank in 0..size {
            if irank == rank {
                written = write_rank(
                    &mut *out,
                    names,
                    &arrays,
                    &formats,
                    header,
                    (rank, size),
                    ntotal,
                );
            }
            comm.barrier();
        }
        written
    }
}

fn write_rank(
    out: &mut impl Write,
    names: &[&str],
    arrays: &[&[f64]],
    formats: &[FieldFormat],
    header: bool,
    (rank, size): (i32, i32),
    ntotal: usize,
) -> Result<()> {
    let nlocal = arrays.first().map_or(0, |a| a.len());
    if header {
        if rank == 0 {
            write!(out, "# ")?;
            for name in names {
                write!(out, "{name} ")?;
            }
            writeln!(out)?;
        }
        writeln!(
            out,
            "# Rank {rank}/{size} with {nlocal}/{ntotal} particles "
        )?;
    }
    for ip in 0..nlocal {
        for (values, format) in arrays.iter().zip(formats) {
            write!(out, "{} ", format.format(values[ip]))?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_write_rank() {
        let x = [1.0, 2.5];
        let w = [0.25, 4.0];
        let formats: [FieldFormat; 2] = ["%5.2f".parse().unwrap(), "%.1e".parse().unwrap()];
        let mut out = Vec::new();
        write_rank(&mut out, &["x", "w"], &[&x[..], &w[..]], &formats, true, (0, 2), 5).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# x w \n# Rank 0/2 with 2/5 particles \n 1.00 2.5e-01 \n 2.50 4.0e+00 \n"
        );
    }

    #[test]
    fn test_write_rank_without_header() {
        let x = [1.0];
        let formats: [FieldFormat; 1] = ["%4.1f".parse().unwrap()];
        let mut out = Vec::new();
        write_rank(&mut out, &["x"], &[&x[..]], &formats, false, (1, 2), 3).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), " 1.0 \n");
    }
}
