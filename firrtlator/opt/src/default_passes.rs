//! Defines the default passes available to [PassManager].
use crate::pass_manager::PassManager;
use crate::passes::StripInfo;
use firrtlator_utils::FirrtlatorResult;

impl PassManager {
    pub fn default_passes() -> FirrtlatorResult<Self> {
        // Construct the pass manager and register all passes.
        let mut pm = PassManager::default();

        pm.register_pass::<StripInfo>()?;

        Ok(pm)
    }
}
