use log::info;

use crate::db::models::PairParameterSet;
use crate::db::{load_or_create, save};
use crate::utils::address_key;
use crate::worker::engine::Outcome;
use crate::worker::events::{EventMeta, StaticFeeParametersSet};
use crate::worker::Engine;

impl Engine {
    /// Upsert the pair's static fee parameters.
    ///
    /// Parameters are keyed by pair address alone and may arrive before the
    /// pair itself is known, so this handler does not require the pair.
    pub(crate) async fn on_static_fee_parameters_set(
        &self,
        meta: &EventMeta,
        event: &StaticFeeParametersSet,
    ) -> anyhow::Result<Outcome> {
        let pair_id = meta.pair_id();
        let (mut params, _) = load_or_create(self.store(), &pair_id, || PairParameterSet::new(&pair_id)).await?;

        params.sender = address_key(&event.sender);
        params.base_factor = event.base_factor;
        params.filter_period = event.filter_period;
        params.decay_period = event.decay_period;
        params.reduction_factor = event.reduction_factor;
        params.variable_fee_control = event.variable_fee_control;
        params.protocol_share = event.protocol_share;
        // Whole percent, fractional basis points are dropped (250 -> 2)
        params.protocol_share_pct = event.protocol_share / 100;
        params.max_volatility_accumulator = event.max_volatility_accumulator;
        params.updated_at_block = meta.block_number;
        save(self.store(), &params).await?;

        info!(
            "[parameters] pair={} baseFactor={} protocolShare={} block={}",
            pair_id, params.base_factor, params.protocol_share, meta.block_number
        );

        Ok(Outcome::Applied)
    }
}
