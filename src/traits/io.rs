//! RON I/O
use crate::{comm::agree, Error, Result};
use mpi::traits::Communicator;
use std::fs;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
/// Summary I/O data for a distributed object
pub struct ParallelSummaryData {
    mpi_ranks: i32,
    global_count: usize,
}

// `name.ext` becomes `name.{rank}.ext`.
fn sub_filename(filename: &str, rank: i32) -> Result<String> {
    let parts = filename.split('.').collect::<Vec<_>>();
    if parts.len() < 2 {
        return Err(Error::InvalidArgument(format!(
            "file name `{filename}` has no extension"
        )));
    }
    Ok(format!(
        "{}.{}.{}",
        parts[0..parts.len() - 1].join("."),
        rank,
        parts[parts.len() - 1]
    ))
}

pub trait RONExportParallel<'a, C: Communicator + 'a> {
    //! Parallel export for RON

    /// The communicator
    fn comm(&self) -> &'a C;

    /// Total number of items
    fn global_count(&self) -> usize;

    /// Generate the RON string for the locally owned data
    fn to_ron_string(&self) -> Result<String>;

    /// Export as RON
    ///
    /// Every rank writes its own data to `name.{rank}.ext` and rank 0 writes a summary to
    /// `filename`.
    fn export_as_ron(&self, filename: &str) -> Result<()> {
        let comm = self.comm();
        fs::write(sub_filename(filename, comm.rank())?, self.to_ron_string()?)?;
        if comm.rank() == 0 {
            let summary = ParallelSummaryData {
                mpi_ranks: comm.size(),
                global_count: self.global_count(),
            };
            fs::write(filename, ron::to_string(&summary)?)?;
        }
        Ok(())
    }
}

pub trait RONImportParallel<'a, C: Communicator + 'a>: Sized {
    //! Parallel import for RON

    /// Create from the RON string of the locally owned data
    ///
    /// This is a collective operation.
    fn from_ron_string(comm: &'a C, s: &str) -> Result<Self>;

    /// Import from RON
    ///
    /// The data must be imported on the same number of ranks it was exported from.
    fn import_from_ron(comm: &'a C, filename: &str) -> Result<Self> {
        let content = fs::read_to_string(filename)?;
        let summary: ParallelSummaryData = ron::from_str(&content)?;

        if summary.mpi_ranks != comm.size() {
            return Err(Error::InvalidArgument(format!(
                "data was exported from {} ranks but is imported on {}",
                summary.mpi_ranks,
                comm.size()
            )));
        }

        log::debug!(
            "importing {} items written by {} ranks",
            summary.global_count,
            summary.mpi_ranks
        );
        let content = agree(
            comm,
            sub_filename(filename, comm.rank())
                .and_then(|f| fs::read_to_string(f).map_err(Into::into)),
        )?;
        Self::from_ron_string(comm, &content)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sub_filename() {
        assert_eq!(sub_filename("out.ron", 3).unwrap(), "out.3.ron");
        assert_eq!(sub_filename("a.b.ron", 0).unwrap(), "a.b.0.ron");
        assert!(sub_filename("noext", 0).is_err());
    }
}
