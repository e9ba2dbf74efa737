//! # Alpha Vantage API Client
//!
//! `AlphaVantage` turns a catalog function, a symbol and the caller's
//! parameters into one GET request and returns the response split into its
//! data and metadata sections.
//!
//! ## Core Features:
//! - **Catalog-driven**: `query` works for every `Function`; the `get_*`
//!   methods are generated from a table and simply name the function.
//! - **Pluggable transport**: any `Fetch` implementation can carry the request.
//!   The default is the blocking `ApiClient`.
//! - **No retries**: every error is terminal for the call that produced it.
//! - **Key hygiene**: the API key never appears in logs or `Debug` output.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

use crate::retrieve::ky_http::{ApiClient, Fetch, DEFAULT_TIMEOUT_SECS};

use super::catalog::Function;
use super::error::{AlphaVantageError, Result};
use super::query::{build_query, Query, QueryParams};
use super::response::{decode_body, unpack};

/// Default endpoint of the Alpha Vantage query API.
pub const ALPHA_VANTAGE_API_URL: &str = "https://www.alphavantage.co/query";

/// A data section and its metadata envelope, as returned by the provider.
pub type Series = (Value, Value);

/// Client for the Alpha Vantage query API.
pub struct AlphaVantage<F = ApiClient> {
    /// Static key sent as the `apikey` query parameter.
    api_key: String,
    /// Endpoint every request is sent to.
    base_url: Url,
    /// The transport carrying requests.
    transport: F,
}

impl AlphaVantage<ApiClient> {
    /// Creates a client with the default endpoint and transport.
    ///
    /// # Errors
    /// `MissingCredential` if `api_key` is `None` or blank; `Transport` if the
    /// HTTP client cannot be built.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let api_key = require_key(api_key)?;
        let base_url = default_base_url()?;
        let transport = ApiClient::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?;
        Ok(Self {
            api_key,
            base_url,
            transport,
        })
    }

    /// Creates a client from resolved configuration.
    #[cfg(feature = "configs")]
    pub fn from_config(config: &crate::configs::config_sys::AlphaVantageConfig) -> Result<Self> {
        let transport = ApiClient::new(config.timeout)?;
        Self::with_transport(config.api_key.clone(), config.base_url.clone(), transport)
    }
}

impl<F: Fetch> AlphaVantage<F> {
    /// Creates a client over an arbitrary transport and endpoint.
    ///
    /// # Errors
    /// `MissingCredential` if `api_key` is `None` or blank.
    pub fn with_transport(api_key: Option<String>, base_url: Url, transport: F) -> Result<Self> {
        Ok(Self {
            api_key: require_key(api_key)?,
            base_url,
            transport,
        })
    }

    /// The endpoint requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying transport.
    pub fn transport(&self) -> &F {
        &self.transport
    }

    /// Builds and validates the request for `function` without sending it.
    pub fn build_query(&self, function: Function, symbol: &str, params: &QueryParams) -> Result<Query> {
        build_query(function.spec(), symbol, params, &self.api_key)
    }

    /// The full request URL for `function`, API key included.
    pub fn request_url(&self, function: Function, symbol: &str, params: &QueryParams) -> Result<Url> {
        Ok(self.build_query(function, symbol, params)?.to_url(&self.base_url))
    }

    /// Performs one call and returns `(data, meta_data)`.
    ///
    /// ## Logic:
    /// 1. Builds the request from the catalog entry (`InvalidParameter` on bad input).
    /// 2. Fetches it once through the transport (`Transport` on failure).
    /// 3. Decodes the body and unpacks the two sections named by the catalog
    ///    (`EmptyResponse`, `Provider`, `MalformedResponse` or `MalformedBody`).
    pub fn query(&self, function: Function, symbol: &str, params: &QueryParams) -> Result<Series> {
        let spec = function.spec();
        let query = self.build_query(function, symbol, params)?;
        let data_key = spec.data_key.resolve(query.param("interval"));

        debug!(function = %function, symbol, request = %query, "requesting");

        let body = self.transport.fetch(&query.to_url(&self.base_url)).map_err(|e| {
            error!(function = %function, symbol, error = %e, "transport failure");
            AlphaVantageError::from(e)
        })?;

        let result = decode_body(&body).and_then(|json| unpack(json, &data_key, spec.meta_key));

        match &result {
            Ok(_) => debug!(function = %function, symbol, data_key = %data_key, "response unpacked"),
            Err(e) => warn!(function = %function, symbol, error = %e, "unusable response"),
        }

        result
    }
}

macro_rules! indicator_calls {
    ($($method:ident => $function:ident, $doc:literal;)*) => {
        impl<F: Fetch> AlphaVantage<F> {
            $(
                #[doc = $doc]
                pub fn $method(&self, symbol: &str, params: &QueryParams) -> Result<Series> {
                    self.query(Function::$function, symbol, params)
                }
            )*
        }
    };
}

indicator_calls! {
    get_intraday => TimeSeriesIntraday, "Intraday time series. `interval` defaults to `15min`; optional `outputsize` (`compact` or `full`).";
    get_daily => TimeSeriesDaily, "Daily time series. Optional `outputsize` (`compact` or `full`).";
    get_weekly => TimeSeriesWeekly, "Weekly time series.";
    get_monthly => TimeSeriesMonthly, "Monthly time series.";
    get_sma => Sma, "Simple moving average.";
    get_ema => Ema, "Exponential moving average.";
    get_wma => Wma, "Weighted moving average.";
    get_dema => Dema, "Double exponential moving average.";
    get_tema => Tema, "Triple exponential moving average.";
    get_trima => Trima, "Triangular moving average.";
    get_kama => Kama, "Kaufman adaptive moving average.";
    get_mama => Mama, "MESA adaptive moving average. Optional `fastlimit` and `slowlimit`.";
    get_t3 => T3, "Triple exponential moving average (T3).";
    get_macd => Macd, "Moving average convergence/divergence. Optional `fastperiod`, `slowperiod`, `signalperiod`.";
    get_macdext => Macdext, "MACD with controllable moving average types. The `*matype` parameters take a code 0-8 or a name such as `KAMA`.";
    get_rsi => Rsi, "Relative strength index.";
    get_stoch => Stoch, "Stochastic oscillator. `slowkmatype`/`slowdmatype` take a code or a moving average name.";
    get_bbands => Bbands, "Bollinger bands. `matype` takes a code or a moving average name.";
    get_adx => Adx, "Average directional movement index.";
    get_cci => Cci, "Commodity channel index.";
}

impl<F> fmt::Debug for AlphaVantage<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantage")
            .field("api_key", &"***")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

fn require_key(api_key: Option<String>) -> Result<String> {
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(AlphaVantageError::MissingCredential),
    }
}

fn default_base_url() -> Result<Url> {
    Url::parse(ALPHA_VANTAGE_API_URL)
        .map_err(|e| AlphaVantageError::invalid("base_url", ALPHA_VANTAGE_API_URL, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::ky_http::TransportError;
    use std::cell::RefCell;

    /// Replays one canned body and remembers the URL it was asked for.
    struct Canned {
        body: std::result::Result<String, u16>,
        seen: RefCell<Option<Url>>,
    }

    impl Canned {
        fn ok(body: &str) -> Self {
            Self { body: Ok(body.to_string()), seen: RefCell::new(None) }
        }
    }

    impl Fetch for Canned {
        fn fetch(&self, url: &Url) -> std::result::Result<String, TransportError> {
            *self.seen.borrow_mut() = Some(url.clone());
            match &self.body {
                Ok(b) => Ok(b.clone()),
                Err(status) => Err(TransportError::Status { status: *status, body: None }),
            }
        }
    }

    fn client(transport: Canned) -> AlphaVantage<Canned> {
        let base = Url::parse(ALPHA_VANTAGE_API_URL).unwrap();
        AlphaVantage::with_transport(Some("demo".to_string()), base, transport).unwrap()
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        let base = Url::parse(ALPHA_VANTAGE_API_URL).unwrap();
        assert!(matches!(
            AlphaVantage::with_transport(None, base.clone(), Canned::ok("{}")),
            Err(AlphaVantageError::MissingCredential)
        ));
        assert!(matches!(
            AlphaVantage::with_transport(Some("  ".into()), base, Canned::ok("{}")),
            Err(AlphaVantageError::MissingCredential)
        ));
        assert!(matches!(AlphaVantage::new(None), Err(AlphaVantageError::MissingCredential)));
    }

    #[test]
    fn intraday_unpacks_interval_keyed_series() {
        let av = client(Canned::ok(r#"{"Meta Data": {"4. Interval": "5min"}, "Time Series (5min)": {"t": 1}}"#));
        let params = QueryParams::new().set("interval", "5min");
        let (data, meta) = av.get_intraday("MSFT", &params).unwrap();
        assert_eq!(data["t"], 1);
        assert_eq!(meta["4. Interval"], "5min");

        let seen = av.transport().seen.borrow().clone().unwrap();
        assert_eq!(
            seen.query(),
            Some("function=TIME_SERIES_INTRADAY&symbol=MSFT&interval=5min&apikey=demo")
        );
    }

    #[test]
    fn invalid_parameter_never_reaches_transport() {
        let av = client(Canned::ok("{}"));
        let params = QueryParams::new().set("fastmatype", "bogus");
        assert!(matches!(
            av.get_macdext("IBM", &params),
            Err(AlphaVantageError::InvalidParameter { .. })
        ));
        assert!(av.transport().seen.borrow().is_none());
    }

    #[test]
    fn transport_errors_pass_through() {
        let av = client(Canned { body: Err(503), seen: RefCell::new(None) });
        match av.get_weekly("IBM", &QueryParams::new()) {
            Err(AlphaVantageError::Transport(TransportError::Status { status, .. })) => assert_eq!(status, 503),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn new_builds_the_default_transport() {
        let av = AlphaVantage::new(Some(" demo ".to_string())).unwrap();
        assert_eq!(av.base_url().as_str(), ALPHA_VANTAGE_API_URL);
        let url = av.request_url(Function::TimeSeriesWeekly, "IBM", &QueryParams::new()).unwrap();
        assert!(url.as_str().ends_with("&apikey=demo"));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let av = client(Canned::ok("{}"));
        let rendered = format!("{:?}", av);
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("demo"));
    }

    #[test]
    fn request_url_uses_base_endpoint() {
        let av = client(Canned::ok("{}"));
        let url = av.request_url(Function::Rsi, "IBM", &QueryParams::new()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.alphavantage.co/query?function=RSI&symbol=IBM&interval=60min&time_period=14&series_type=close&apikey=demo"
        );
    }
}
