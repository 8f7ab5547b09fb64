use std::{future::Future, num::NonZeroU32, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::{ResultExt, ensure};
use tracing::{debug, warn};

use crate::{
    models::{bar::Bar, bars::Bars, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, MissingEnvVarSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu, ValidationSnafu,
        alpaca_rest::{
            config::AlpacaConfig, params::construct_params, response::AlpacaResponse,
        },
    },
};

pub const API_KEY_ENV: &str = "APCA_API_KEY_ID";
pub const SECRET_KEY_ENV: &str = "APCA_API_SECRET_KEY";

pub struct AlpacaProvider {
    client: Client,
    config: AlpacaConfig,
    limiter: DefaultDirectRateLimiter,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new(config: AlpacaConfig) -> Result<Self, ProviderInitError> {
        let api_key = SecretString::from(get_env_var(API_KEY_ENV).context(MissingEnvVarSnafu)?);
        let secret_key =
            SecretString::from(get_env_var(SECRET_KEY_ENV).context(MissingEnvVarSnafu)?);
        Self::with_credentials(api_key, secret_key, config)
    }

    pub fn with_credentials(
        api_key: SecretString,
        secret_key: SecretString,
        config: AlpacaConfig,
    ) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        let mut key_value =
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?;
        key_value.set_sensitive(true);
        headers.insert("APCA-API-KEY-ID", key_value);
        let mut secret_value = header::HeaderValue::from_str(secret_key.expose_secret())
            .context(InvalidApiKeySnafu)?;
        secret_value.set_sensitive(true);
        headers.insert("APCA-API-SECRET-KEY", secret_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .context(ClientBuildSnafu)?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(nonzero!(200u32));
        let limiter = RateLimiter::direct(Quota::per_minute(per_minute));

        Ok(Self {
            client,
            config,
            limiter,
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }

    /// Fetches one page, retrying transient failures.
    async fn get_page(&self, query: &[(String, String)]) -> Result<AlpacaResponse, ProviderError> {
        with_retries(self.config.retry_limit, self.config.retry_delay(), || async move {
            self.limiter.until_ready().await;
            self.try_get_page(query).await
        })
        .await
    }

    async fn try_get_page(
        &self,
        query: &[(String, String)],
    ) -> Result<AlpacaResponse, ProviderError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        response.json::<AlpacaResponse>().await.context(ReqwestSnafu)
    }
}

/// Runs `op`, then repeats it up to `retry_limit` more times while it fails with a
/// transient error, sleeping `delay` between attempts.
pub async fn with_retries<T, F, Fut>(
    retry_limit: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < retry_limit => {
                attempt += 1;
                warn!(
                    attempt,
                    retry_limit,
                    error = %err,
                    "transient alpaca failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Pulls `end` back to `now - embargo` when it is more recent than that.
///
/// `None` when `now - embargo` falls before the earliest representable instant.
pub fn clamp_end(
    end: DateTime<FixedOffset>,
    now: DateTime<Utc>,
    embargo: TimeDelta,
) -> Option<DateTime<FixedOffset>> {
    let latest_allowed = now.checked_sub_signed(embargo)?;
    if end.with_timezone(&Utc) <= latest_allowed {
        Some(end)
    } else {
        Some(latest_allowed.with_timezone(end.offset()))
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Bars, ProviderError> {
        ensure!(
            !params.symbol.trim().is_empty(),
            ValidationSnafu {
                message: "symbol is empty"
            }
        );

        let start = params.span.start;
        let Some(end) = clamp_end(params.span.end, Utc::now(), self.config.embargo())
            .filter(|end| *end > start)
        else {
            debug!(
                symbol = %params.symbol,
                start = %start,
                "window is inside the embargo, nothing to fetch"
            );
            return Ok(Bars::new());
        };

        let mut bars = Bars::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let query = construct_params(&params, &end, &self.config, page_token.as_deref());
            let page = self.get_page(&query).await?;
            pages += 1;

            // Merge the bars for our symbol from the current page.
            if let Some(by_symbol) = page.bars {
                for (symbol, page_bars) in by_symbol {
                    if symbol.eq_ignore_ascii_case(&params.symbol) {
                        bars.extend(page_bars.into_iter().map(Bar::from));
                    }
                }
            }

            match page.next_page_token {
                Some(token) if page_token.as_deref() == Some(token.as_str()) => {
                    warn!(symbol = %params.symbol, token = %token, "page token repeated, stopping");
                    break;
                }
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(
            symbol = %params.symbol,
            start = %start,
            end = %end,
            pages,
            count = bars.len(),
            "collected bars from alpaca"
        );

        Ok(bars)
    }
}
