use log::info;

use crate::db::models::{Pair, Token};
use crate::db::{load, load_or_create, save};
use crate::utils::address_key;
use crate::worker::engine::Outcome;
use crate::worker::events::{EventMeta, PairCreated, TokenMetadata};
use crate::worker::Engine;

impl Engine {
    pub(crate) async fn on_pair_created(&self, meta: &EventMeta, event: &PairCreated) -> anyhow::Result<Outcome> {
        let pair_id = meta.pair_id();
        if load::<Pair, _>(self.store(), &pair_id).await?.is_some() {
            return Ok(Outcome::Skipped("pair already exists"));
        }

        let mut factory = self.load_factory().await?;

        for metadata in [&event.token_x, &event.token_y] {
            let created = self.register_token(metadata).await?;
            if created {
                factory.token_count += 1;
            }
        }

        let pair = Pair::new(
            &pair_id,
            &address_key(&event.token_x.address),
            &address_key(&event.token_y.address),
            event.bin_step,
            event.active_id,
            meta.block_timestamp,
            meta.block_number,
        );
        save(self.store(), &pair).await?;

        factory.pair_count += 1;
        save(self.store(), &factory).await?;

        info!(
            "[pair_created] pair={} tokenX={} tokenY={} binStep={}",
            pair.id, event.token_x.symbol, event.token_y.symbol, pair.bin_step
        );

        Ok(Outcome::Applied)
    }

    /// Create the token on first sight and count the new pair on it.
    /// Returns whether the token was new.
    async fn register_token(&self, metadata: &TokenMetadata) -> anyhow::Result<bool> {
        let id = address_key(&metadata.address);
        let (mut token, created) = load_or_create(self.store(), &id, || {
            Token::new(&id, metadata.symbol.clone(), metadata.name.clone(), metadata.decimals)
        })
        .await?;

        token.pair_count += 1;
        save(self.store(), &token).await?;

        Ok(created)
    }
}
