use crate::db::models::Flash;
use crate::db::save;
use crate::utils::address_key;
use crate::worker::engine::Outcome;
use crate::worker::events::{EventMeta, FlashLoan};
use crate::worker::Engine;

use super::composition_fees::Fees;

impl Engine {
    pub(crate) async fn on_flash_loan(&self, meta: &EventMeta, event: &FlashLoan) -> anyhow::Result<Outcome> {
        let Some(mut pair) = self.load_pair(meta, "flash_loan").await? else {
            return Ok(Outcome::Skipped("pair not found"));
        };
        let (raw_x, raw_y) = self.decoding.amounts.decode(&event.amounts);
        let (fee_x, fee_y) = self.decoding.fees.decode(&event.total_fees);

        let market = self.refresh_market(&mut pair).await?;
        let math = self.math();

        let amount_x = market.amount_x(raw_x);
        let amount_y = market.amount_y(raw_y);
        let fees = Fees::new(self, &market, fee_x, fee_y);

        // Borrowed amounts are repaid within the transaction, so only fees
        // are accounted; reserves and volume stay as they are
        self.credit_fees(meta, &mut pair, &market, &fees, true).await?;

        let amount_usd = math.multiply(&amount_x, &market.price_x_usd(math))
            + math.multiply(&amount_y, &market.price_y_usd(math));

        let record = Flash {
            id: meta.record_id(),
            transaction: meta.tx_id(),
            timestamp: meta.block_timestamp,
            pair: pair.id.clone(),
            sender: address_key(&event.sender),
            recipient: address_key(&event.receiver),
            origin: address_key(&meta.origin),
            amount_x,
            amount_y,
            amount_usd,
            fees_usd: fees.usd(),
            fees_x: fees.x,
            fees_y: fees.y,
            log_index: meta.log_index,
        };
        save(self.store(), &record).await?;

        Ok(Outcome::Applied)
    }
}
