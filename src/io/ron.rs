//! RON I/O
use crate::{
    comm::agree,
    particles::ParticleVec,
    traits::{Element, RONExportParallel, RONImportParallel},
    Result,
};
use mpi::traits::Communicator;

impl<'a, C: Communicator + 'a, R: Element + serde::Serialize> RONExportParallel<'a, C>
    for ParticleVec<'a, C, R>
{
    fn comm(&self) -> &'a C {
        ParticleVec::comm(self)
    }

    fn global_count(&self) -> usize {
        self.ntotal()
    }

    fn to_ron_string(&self) -> Result<String> {
        Ok(ron::to_string(self.records())?)
    }
}

impl<'a, C: Communicator + 'a, R: Element> RONImportParallel<'a, C> for ParticleVec<'a, C, R>
where
    for<'de> R: serde::Deserialize<'de>,
{
    fn from_ron_string(comm: &'a C, s: &str) -> Result<Self> {
        let records = agree(comm, ron::from_str::<Vec<R>>(s).map_err(Into::into))?;
        Ok(Self::from_local_records(comm, records))
    }
}
