use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, ProviderBuilder};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use log::warn;
use num_traits::Zero;
use rustc_hash::FxHashMap;
use url::Url;

use crate::abis::{IDexLens, ILBFactory};
use crate::config::OracleSettings;
use crate::db::models::{Bundle, Pair, Token, BUNDLE_ID};
use crate::db::{self, save};
use crate::utils::{format_token_amount, u256_to_big_decimal, SafeMath};
use crate::worker::Engine;

/// Oracle values are 18-decimal fixed point.
const ORACLE_DECIMALS: u8 = 18;

// ============================================
// Collaborator interfaces
// ============================================

/// Two-call price oracle. Either call may fail ("revert"); the engine
/// substitutes zero and keeps going.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn native_price_usd(&self) -> anyhow::Result<BigDecimal>;

    async fn token_price_native(&self, token: Address) -> anyhow::Result<BigDecimal>;
}

/// Factory contract reads, used once when the factory entity is created.
#[async_trait]
pub trait FactoryReader: Send + Sync {
    async fn fee_recipient(&self) -> anyhow::Result<Address>;

    async fn flash_loan_fee(&self) -> anyhow::Result<U256>;
}

// ============================================
// On-chain oracle
// ============================================

/// Reads prices from a DEX lens contract and factory settings from the LB
/// factory, over HTTP JSON-RPC.
#[derive(Clone)]
pub struct OnChainOracle {
    provider: DynProvider,
    dex_lens: Address,
    wrapped_native: Address,
    factory: Option<Address>,
    timeout: Duration,
}

fn parse_address(value: Option<&String>, field: &str) -> anyhow::Result<Address> {
    let raw = value.with_context(|| format!("oracle.{} is required with oracle.rpc_url", field))?;
    Address::from_str(raw).with_context(|| format!("Invalid oracle.{}: {}", field, raw))
}

impl OnChainOracle {
    pub fn new(settings: &OracleSettings) -> anyhow::Result<Self> {
        let rpc_url = settings.rpc_url.as_ref().context("oracle.rpc_url is not set")?;
        let url = Url::parse(rpc_url).context("Invalid RPC URL")?;

        let provider = DynProvider::new(ProviderBuilder::new().connect_http(url));

        let factory = match settings.factory_address {
            Some(ref raw) => Some(
                Address::from_str(raw)
                    .with_context(|| format!("Invalid oracle.factory_address: {}", raw))?,
            ),
            None => None,
        };

        Ok(Self {
            provider,
            dex_lens: parse_address(settings.dex_lens_address.as_ref(), "dex_lens_address")?,
            wrapped_native: parse_address(
                settings.wrapped_native_address.as_ref(),
                "wrapped_native_address",
            )?,
            factory,
            timeout: Duration::from_secs(settings.rpc_timeout_secs),
        })
    }

    fn factory(&self) -> anyhow::Result<ILBFactory::ILBFactoryInstance<DynProvider>> {
        let address = self.factory.context("oracle.factory_address is not set")?;
        Ok(ILBFactory::new(address, self.provider.clone()))
    }
}

#[async_trait]
impl PriceOracle for OnChainOracle {
    async fn native_price_usd(&self) -> anyhow::Result<BigDecimal> {
        let lens = IDexLens::new(self.dex_lens, self.provider.clone());
        let raw = tokio::time::timeout(self.timeout, lens.getTokenPriceUSD(self.wrapped_native).call())
            .await
            .context("getTokenPriceUSD timed out")?
            .context("getTokenPriceUSD reverted")?;

        Ok(fixed_point(raw))
    }

    async fn token_price_native(&self, token: Address) -> anyhow::Result<BigDecimal> {
        let lens = IDexLens::new(self.dex_lens, self.provider.clone());
        let raw = tokio::time::timeout(self.timeout, lens.getTokenPriceNative(token).call())
            .await
            .context("getTokenPriceNative timed out")?
            .with_context(|| format!("getTokenPriceNative reverted for {}", token))?;

        Ok(fixed_point(raw))
    }
}

#[async_trait]
impl FactoryReader for OnChainOracle {
    async fn fee_recipient(&self) -> anyhow::Result<Address> {
        let factory = self.factory()?;
        tokio::time::timeout(self.timeout, factory.getFeeRecipient().call())
            .await
            .context("getFeeRecipient timed out")?
            .context("getFeeRecipient reverted")
    }

    async fn flash_loan_fee(&self) -> anyhow::Result<U256> {
        let factory = self.factory()?;
        tokio::time::timeout(self.timeout, factory.getFlashLoanFee().call())
            .await
            .context("getFlashLoanFee timed out")?
            .context("getFlashLoanFee reverted")
    }
}

fn fixed_point(raw: U256) -> BigDecimal {
    u256_to_big_decimal(raw) / BigDecimal::new(1.into(), -i64::from(ORACLE_DECIMALS))
}

// ============================================
// Fixed oracle
// ============================================

/// Serves configured prices. Unknown tokens and a missing native price
/// behave like a reverted oracle call.
#[derive(Debug, Clone, Default)]
pub struct FixedPriceOracle {
    native_price_usd: Option<BigDecimal>,
    token_prices: FxHashMap<Address, BigDecimal>,
    fee_recipient: Address,
    flash_loan_fee: U256,
}

impl FixedPriceOracle {
    pub fn new(native_price_usd: BigDecimal) -> Self {
        Self {
            native_price_usd: Some(native_price_usd),
            ..Default::default()
        }
    }

    /// An oracle whose every price call fails.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn with_token_price(mut self, token: Address, price_native: BigDecimal) -> Self {
        self.token_prices.insert(token, price_native);
        self
    }

    pub fn with_factory(mut self, fee_recipient: Address, flash_loan_fee: U256) -> Self {
        self.fee_recipient = fee_recipient;
        self.flash_loan_fee = flash_loan_fee;
        self
    }

    pub fn from_settings(settings: &OracleSettings) -> anyhow::Result<Self> {
        let mut oracle = match settings.native_price_usd {
            Some(ref raw) => Self::new(
                BigDecimal::from_str(raw)
                    .with_context(|| format!("Invalid oracle.native_price_usd: {}", raw))?,
            ),
            None => Self::unavailable(),
        };

        for entry in &settings.token_prices_native {
            let token = Address::from_str(&entry.address)
                .with_context(|| format!("Invalid token price address: {}", entry.address))?;
            let price = BigDecimal::from_str(&entry.price_native)
                .with_context(|| format!("Invalid price for {}: {}", entry.address, entry.price_native))?;
            oracle = oracle.with_token_price(token, price);
        }

        Ok(oracle)
    }
}

#[async_trait]
impl PriceOracle for FixedPriceOracle {
    async fn native_price_usd(&self) -> anyhow::Result<BigDecimal> {
        self.native_price_usd
            .clone()
            .ok_or_else(|| anyhow!("no native USD price configured"))
    }

    async fn token_price_native(&self, token: Address) -> anyhow::Result<BigDecimal> {
        self.token_prices
            .get(&token)
            .cloned()
            .ok_or_else(|| anyhow!("no native price configured for {}", token))
    }
}

#[async_trait]
impl FactoryReader for FixedPriceOracle {
    async fn fee_recipient(&self) -> anyhow::Result<Address> {
        Ok(self.fee_recipient)
    }

    async fn flash_loan_fee(&self) -> anyhow::Result<U256> {
        Ok(self.flash_loan_fee)
    }
}

// ============================================
// Market refresh
// ============================================

/// Bundle and pair tokens after a pricing refresh.
///
/// Handlers mutate these copies and save them; nothing else loads the same
/// entities while a handler holds them.
pub struct Market {
    pub bundle: Bundle,
    pub token_x: Token,
    pub token_y: Token,
}

impl Market {
    pub fn native_price_usd(&self) -> &BigDecimal {
        &self.bundle.native_price_usd
    }

    pub fn price_x_usd(&self, math: &SafeMath) -> BigDecimal {
        math.multiply(&self.token_x.derived_native, &self.bundle.native_price_usd)
    }

    pub fn price_y_usd(&self, math: &SafeMath) -> BigDecimal {
        math.multiply(&self.token_y.derived_native, &self.bundle.native_price_usd)
    }

    pub fn amount_x(&self, raw: u128) -> BigDecimal {
        format_token_amount(raw, self.token_x.decimals)
    }

    pub fn amount_y(&self, raw: u128) -> BigDecimal {
        format_token_amount(raw, self.token_y.decimals)
    }
}

impl Engine {
    /// Refresh the bundle's native USD price and both tokens' native prices,
    /// stamping the resulting USD prices on the pair.
    ///
    /// Bundle and tokens are saved here; the pair is saved by the caller.
    pub(crate) async fn refresh_market(&self, pair: &mut Pair) -> anyhow::Result<Market> {
        let (mut bundle, _) =
            db::load_or_create(self.store(), BUNDLE_ID, Bundle::default).await?;
        bundle.native_price_usd = self.native_price_or_zero().await;
        save(self.store(), &bundle).await?;

        let mut token_x = self.load_token(&pair.token_x).await?;
        let mut token_y = self.load_token(&pair.token_y).await?;
        token_x.derived_native = self.token_price_or_zero(&token_x.id).await;
        token_y.derived_native = self.token_price_or_zero(&token_y.id).await;
        save(self.store(), &token_x).await?;
        save(self.store(), &token_y).await?;

        let market = Market { bundle, token_x, token_y };
        pair.token_x_price_usd = market.price_x_usd(self.math());
        pair.token_y_price_usd = market.price_y_usd(self.math());

        Ok(market)
    }

    async fn native_price_or_zero(&self) -> BigDecimal {
        match self.prices.native_price_usd().await {
            Ok(price) => price,
            Err(e) => {
                warn!("[pricing] native USD price unavailable, using 0: {:#}", e);
                BigDecimal::zero()
            },
        }
    }

    async fn token_price_or_zero(&self, token: &str) -> BigDecimal {
        let address = match Address::from_str(token) {
            Ok(address) => address,
            Err(e) => {
                warn!("[pricing] token={} is not an address, using 0: {}", token, e);
                return BigDecimal::zero();
            },
        };

        match self.prices.token_price_native(address).await {
            Ok(price) => price,
            Err(e) => {
                warn!("[pricing] native price unavailable for token={}, using 0: {:#}", token, e);
                BigDecimal::zero()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_oracle_missing_prices_fail() {
        let token = Address::repeat_byte(0x11);
        let oracle = FixedPriceOracle::unavailable().with_token_price(token, BigDecimal::from(3));

        assert!(oracle.native_price_usd().await.is_err());
        assert_eq!(oracle.token_price_native(token).await.unwrap(), BigDecimal::from(3));
        assert!(oracle.token_price_native(Address::repeat_byte(0x22)).await.is_err());
    }

    #[test]
    fn test_fixed_point_scaling() {
        let raw = U256::from(2_500_000_000_000_000_000u128);
        assert_eq!(fixed_point(raw), BigDecimal::from_str("2.5").unwrap());
    }

    #[test]
    fn test_from_settings() {
        let settings = OracleSettings {
            native_price_usd: Some("300.5".to_string()),
            token_prices_native: vec![crate::config::FixedTokenPrice {
                address: "0x1111111111111111111111111111111111111111".to_string(),
                price_native: "0.002".to_string(),
            }],
            ..Default::default()
        };
        let oracle = FixedPriceOracle::from_settings(&settings).unwrap();
        assert_eq!(oracle.native_price_usd, Some(BigDecimal::from_str("300.5").unwrap()));
        assert_eq!(oracle.token_prices.len(), 1);
    }
}
