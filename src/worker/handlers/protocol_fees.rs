use crate::db::models::{Period, ProtocolFeeDayData};
use crate::db::{load_or_create, save};
use crate::worker::engine::Outcome;
use crate::worker::events::{CollectedProtocolFees, EventMeta};
use crate::worker::Engine;

impl Engine {
    /// Accumulate collected protocol fees into the pair's daily bucket.
    pub(crate) async fn on_protocol_fees_collected(
        &self,
        meta: &EventMeta,
        event: &CollectedProtocolFees,
    ) -> anyhow::Result<Outcome> {
        let Some(mut pair) = self.load_pair(meta, "protocol_fees").await? else {
            return Ok(Outcome::Skipped("pair not found"));
        };
        let (raw_x, raw_y) = self.decoding.fees.decode(&event.protocol_fees);

        let market = self.refresh_market(&mut pair).await?;
        save(self.store(), &pair).await?;
        let math = self.math();

        let amount_x = market.amount_x(raw_x);
        let amount_y = market.amount_y(raw_y);
        let collected_native = math.multiply(&amount_x, &market.token_x.derived_native)
            + math.multiply(&amount_y, &market.token_y.derived_native);

        let bucket = Period::Day.bucket(meta.block_timestamp);
        let (mut data, _) = load_or_create(
            self.store(),
            &ProtocolFeeDayData::key(&pair.id, bucket),
            || ProtocolFeeDayData::new(bucket, &pair.id),
        )
        .await?;

        data.amount_x += &amount_x;
        data.amount_y += &amount_y;
        data.collected_usd += math.multiply(&collected_native, market.native_price_usd());
        data.collected_native += collected_native;
        save(self.store(), &data).await?;

        Ok(Outcome::Applied)
    }
}
