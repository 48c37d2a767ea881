use crate::oracle::SubsumptionOracle;
use crate::realization::{self, InstanceMap};
use crate::taxonomy::Taxonomy;
use mimizuku_core::{Name, Result};

/// Computes the class hierarchy of one terminology.
pub trait TaxonomyBuilder {
    fn name(&self) -> &'static str;

    /// Places every named class; unsatisfiable ones end up equivalent to
    /// `owl:Nothing`.
    fn classify(&mut self, oracle: &mut dyn SubsumptionOracle) -> Result<Taxonomy<Name>>;

    fn realize(&mut self, taxonomy: &Taxonomy<Name>, oracle: &mut dyn SubsumptionOracle) -> Result<InstanceMap> {
        realization::realize(taxonomy, oracle)
    }
}

pub(crate) fn empty_taxonomy() -> Taxonomy<Name> {
    Taxonomy::new(Name::thing(), Name::nothing())
}
