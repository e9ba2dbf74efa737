//! # Request Builder
//!
//! Turns a catalog entry, a symbol and the caller's parameters into a `Query`:
//! an ordered list of `name=value` pairs that serializes deterministically.
//!
//! Wire order is `function`, the required parameters as declared, the optional
//! parameters that were set (declared order), then `apikey`. Presence, not
//! truthiness, decides whether an optional parameter is emitted, so `0` is a
//! real value.

use std::fmt;

use url::Url;

use super::catalog::{IndicatorSpec, ParamKind, ParamSpec};
use super::error::{AlphaVantageError, Result};
use super::matype;

/// A caller-supplied parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Text, including numbers and moving-average names given as strings.
    Text(String),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(f64::from(value))
    }
}

macro_rules! int_param_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(value: $t) -> Self {
                    ParamValue::Int(i64::from(value))
                }
            }
        )*
    };
}

int_param_value!(i8, i16, i32, i64, u8, u16, u32);

/// The parameters a caller sets for one call, keyed by query-string name.
///
/// Setting a name twice keeps the last value. Anything not set is simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    values: Vec<(String, ParamValue)>,
}

impl QueryParams {
    /// An empty parameter set: every optional parameter unset, every required
    /// parameter at its catalog default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `insert`.
    pub fn set(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets `name`, replacing any earlier value.
    pub fn insert(&mut self, name: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    /// The value set for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Names that were set, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    /// Number of parameters set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing was set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<ParamValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k.as_ref(), v);
        }
        params
    }
}

/// A fully validated request, ready to be rendered as a URL.
#[derive(Clone, PartialEq, Eq)]
pub struct Query {
    function: &'static str,
    params: Vec<(&'static str, String)>,
    api_key: String,
}

impl Query {
    /// Provider function name.
    pub fn function(&self) -> &'static str {
        self.function
    }

    /// Function-specific parameters in wire order (excluding `function` and `apikey`).
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// Serialized value of a parameter, if it is part of the request.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(n, _)| *n == name).map(|(_, v)| v.as_str())
    }

    /// Every `(name, value)` pair in wire order, including `function` and `apikey`.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        std::iter::once(("function", self.function))
            .chain(self.params.iter().map(|(n, v)| (*n, v.as_str())))
            .chain(std::iter::once(("apikey", self.api_key.as_str())))
            .collect()
    }

    /// The encoded query string, API key included.
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }

    /// The full request URL against `base`, replacing any query `base` had.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_query(Some(&self.query_string()));
        url
    }
}

impl Query {
    /// `to_url` with the API key masked, safe to print or log.
    pub fn to_redacted_url(&self, base: &Url) -> Url {
        let mut redacted = self.clone();
        redacted.api_key = "***".to_string();
        redacted.to_url(base)
    }
}

impl fmt::Display for Query {
    /// Renders the query string with the API key masked, safe for logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut redacted = self.clone();
        redacted.api_key = "***".to_string();
        f.write_str(&redacted.query_string())
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("function", &self.function)
            .field("params", &self.params)
            .field("api_key", &"***")
            .finish()
    }
}

/// Builds the request for `spec`.
///
/// `symbol` fills the catalog's `symbol` parameter; `params` supplies everything
/// else. Required parameters the caller leaves out take their catalog default.
///
/// # Errors
/// `InvalidParameter` for an empty symbol, a parameter the function does not
/// accept, or a value that does not fit the parameter's kind.
pub fn build_query(spec: &IndicatorSpec, symbol: &str, params: &QueryParams, api_key: &str) -> Result<Query> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(AlphaVantageError::invalid("symbol", symbol, "must not be empty"));
    }

    for name in params.names() {
        if name == "symbol" {
            return Err(AlphaVantageError::invalid(
                name,
                params.get(name).map(ToString::to_string).unwrap_or_default(),
                "pass the symbol as its own argument",
            ));
        }
        if spec.param(name).is_none() {
            return Err(AlphaVantageError::invalid(
                name,
                params.get(name).map(ToString::to_string).unwrap_or_default(),
                format!("not accepted by {}", spec.name()),
            ));
        }
    }

    let mut pairs = Vec::with_capacity(spec.required.len() + spec.optional.len());

    for p in spec.required {
        let value = if p.name == "symbol" {
            symbol.to_string()
        } else {
            match params.get(p.name) {
                Some(v) => serialize(p, v)?,
                None => match p.default {
                    Some(default) => default.to_string(),
                    None => {
                        return Err(AlphaVantageError::invalid(p.name, "", "required parameter is missing"));
                    }
                },
            }
        };
        pairs.push((p.name, value));
    }

    for p in spec.optional {
        if let Some(v) = params.get(p.name) {
            pairs.push((p.name, serialize(p, v)?));
        }
    }

    Ok(Query {
        function: spec.name(),
        params: pairs,
        api_key: api_key.to_string(),
    })
}

/// Validates one value against its parameter kind and returns the wire token.
fn serialize(param: &ParamSpec, value: &ParamValue) -> Result<String> {
    let field = param.name;
    match (param.kind, value) {
        (_, ParamValue::Text(s)) if s.trim().is_empty() => {
            Err(AlphaVantageError::invalid(field, s.as_str(), "must not be empty"))
        }
        (ParamKind::Text, v) => Ok(v.to_string()),

        (ParamKind::Integer, ParamValue::Int(i)) => Ok(i.to_string()),
        (ParamKind::Integer, ParamValue::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(|i| i.to_string())
            .map_err(|_| AlphaVantageError::invalid(field, s.as_str(), "expected an integer")),
        (ParamKind::Integer, ParamValue::Float(x)) => {
            Err(AlphaVantageError::invalid(field, x.to_string(), "expected an integer"))
        }

        (ParamKind::Float, ParamValue::Int(i)) => Ok(i.to_string()),
        (ParamKind::Float, ParamValue::Float(x)) if x.is_finite() => Ok(x.to_string()),
        (ParamKind::Float, ParamValue::Text(s)) => match s.trim().parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(s.trim().to_string()),
            _ => Err(AlphaVantageError::invalid(field, s.as_str(), "expected a finite number")),
        },
        (ParamKind::Float, ParamValue::Float(x)) => {
            Err(AlphaVantageError::invalid(field, x.to_string(), "expected a finite number"))
        }

        (ParamKind::MaType, ParamValue::Int(i)) => Ok(i.to_string()),
        (ParamKind::MaType, ParamValue::Text(s)) => matype::resolve(field, s),
        (ParamKind::MaType, ParamValue::Float(x)) => Err(AlphaVantageError::invalid(
            field,
            x.to_string(),
            "expected an integer code or a moving average name",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::alphavantage::catalog::Function;

    const KEY: &str = "demo";

    #[test]
    fn daily_without_outputsize_has_no_outputsize_token() {
        let q = build_query(Function::TimeSeriesDaily.spec(), "GOOGL", &QueryParams::new(), KEY).unwrap();
        assert_eq!(q.query_string(), "function=TIME_SERIES_DAILY&symbol=GOOGL&apikey=demo");
        assert!(!q.query_string().contains("outputsize"));
    }

    #[test]
    fn optional_parameter_is_emitted_once_when_set() {
        let params = QueryParams::new().set("outputsize", "full");
        let q = build_query(Function::TimeSeriesDaily.spec(), "GOOGL", &params, KEY).unwrap();
        assert_eq!(
            q.query_string(),
            "function=TIME_SERIES_DAILY&symbol=GOOGL&outputsize=full&apikey=demo"
        );
    }

    #[test]
    fn required_defaults_fill_in() {
        let q = build_query(Function::Sma.spec(), "IBM", &QueryParams::new(), KEY).unwrap();
        assert_eq!(
            q.query_string(),
            "function=SMA&symbol=IBM&interval=60min&time_period=20&series_type=close&apikey=demo"
        );
    }

    #[test]
    fn caller_values_override_defaults_and_keep_declared_order() {
        let params = QueryParams::new()
            .set("series_type", "open")
            .set("time_period", 10)
            .set("interval", "daily");
        let q = build_query(Function::Ema.spec(), "IBM", &params, KEY).unwrap();
        assert_eq!(
            q.query_string(),
            "function=EMA&symbol=IBM&interval=daily&time_period=10&series_type=open&apikey=demo"
        );
    }

    #[test]
    fn macdext_resolves_moving_average_names() {
        let params = QueryParams::new().set("fastmatype", "KAMA");
        let q = build_query(Function::Macdext.spec(), "IBM", &params, KEY).unwrap();
        assert_eq!(q.param("fastmatype"), Some("7"));
        assert!(q.query_string().contains("&fastmatype=7&apikey=demo"));
    }

    #[test]
    fn zero_moving_average_code_is_a_set_value() {
        let params = QueryParams::new().set("fastmatype", 0);
        let q = build_query(Function::Macdext.spec(), "IBM", &params, KEY).unwrap();
        assert_eq!(q.param("fastmatype"), Some("0"));
    }

    #[test]
    fn unknown_moving_average_name_is_rejected() {
        let params = QueryParams::new().set("slowmatype", "bogus");
        let err = build_query(Function::Macdext.spec(), "IBM", &params, KEY).unwrap_err();
        match err {
            AlphaVantageError::InvalidParameter { field, value, .. } => {
                assert_eq!(field, "slowmatype");
                assert_eq!(value, "bogus");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let bad_int = QueryParams::new().set("fastperiod", "twelve");
        assert!(matches!(
            build_query(Function::Macd.spec(), "IBM", &bad_int, KEY),
            Err(AlphaVantageError::InvalidParameter { .. })
        ));

        let bad_float = QueryParams::new().set("fastlimit", f64::NAN);
        assert!(matches!(
            build_query(Function::Mama.spec(), "IBM", &bad_float, KEY),
            Err(AlphaVantageError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn float_parameters_serialize_plainly() {
        let params = QueryParams::new().set("fastlimit", 0.02).set("slowlimit", "0.5");
        let q = build_query(Function::Mama.spec(), "IBM", &params, KEY).unwrap();
        assert_eq!(q.param("fastlimit"), Some("0.02"));
        assert_eq!(q.param("slowlimit"), Some("0.5"));
    }

    #[test]
    fn undeclared_parameter_is_rejected() {
        let params = QueryParams::new().set("fastmatype", "EMA");
        let err = build_query(Function::Macd.spec(), "IBM", &params, KEY).unwrap_err();
        assert!(err.to_string().contains("not accepted by MACD"));
    }

    #[test]
    fn empty_symbol_is_rejected() {
        assert!(build_query(Function::TimeSeriesWeekly.spec(), "  ", &QueryParams::new(), KEY).is_err());
    }

    #[test]
    fn display_masks_the_api_key() {
        let q = build_query(Function::TimeSeriesWeekly.spec(), "MSFT", &QueryParams::new(), "SECRET").unwrap();
        assert_eq!(q.to_string(), "function=TIME_SERIES_WEEKLY&symbol=MSFT&apikey=***");
        assert!(!format!("{:?}", q).contains("SECRET"));
    }

    #[test]
    fn to_url_replaces_base_query() {
        let base = Url::parse("https://www.alphavantage.co/query?stale=1").unwrap();
        let q = build_query(Function::TimeSeriesMonthly.spec(), "MSFT", &QueryParams::new(), KEY).unwrap();
        assert_eq!(
            q.to_url(&base).as_str(),
            "https://www.alphavantage.co/query?function=TIME_SERIES_MONTHLY&symbol=MSFT&apikey=demo"
        );
    }

    #[test]
    fn later_set_replaces_earlier_value() {
        let params = QueryParams::new().set("outputsize", "compact").set("outputsize", "full");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("outputsize"), Some(&ParamValue::from("full")));
    }

    #[test]
    fn redacted_url_matches_the_sent_url_except_the_key() {
        let base = Url::parse("https://proxy.example/query?token=x").unwrap();
        let q = build_query(Function::TimeSeriesDaily.spec(), "IBM", &QueryParams::new(), "SECRET").unwrap();

        let redacted = q.to_redacted_url(&base);
        assert_eq!(
            redacted.as_str(),
            "https://proxy.example/query?function=TIME_SERIES_DAILY&symbol=IBM&apikey=***"
        );
        assert_eq!(redacted.as_str().matches('?').count(), 1);
        assert_eq!(q.to_url(&base).as_str().replace("SECRET", "***"), redacted.as_str());
    }

    #[test]
    fn matype_integer_text_is_sent_as_written() {
        let params = QueryParams::new().set("fastmatype", "04");
        let q = build_query(Function::Macdext.spec(), "IBM", &params, KEY).unwrap();
        assert_eq!(q.param("fastmatype"), Some("04"));

        let params = QueryParams::new().set("fastmatype", " EMA");
        assert!(build_query(Function::Macdext.spec(), "IBM", &params, KEY).is_err());
    }
}
