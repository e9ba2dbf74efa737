//! # Indicator Catalog
//!
//! Static description of every provider function this client supports. The
//! catalog is data, not logic: the request builder and the response unpacker
//! are driven entirely by the `IndicatorSpec` of the function being called.
//!
//! Required parameters always appear on the wire, in the order they are
//! declared here (`symbol` first). Optional parameters appear only when the
//! caller sets them, also in declared order.

use std::fmt;
use std::str::FromStr;

use super::error::AlphaVantageError;

/// Name of the metadata envelope present in every successful response.
pub const META_DATA_KEY: &str = "Meta Data";

/// How a parameter value is validated and serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Free text, sent as-is (symbols, intervals, series types, output sizes).
    Text,
    /// Must be an integer.
    Integer,
    /// Must be a finite number.
    Float,
    /// A moving-average type: an integer code or a name from `matype::MA_TYPES`.
    MaType,
}

/// One parameter accepted by a provider function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Query-string name.
    pub name: &'static str,
    /// Validation rule for the value.
    pub kind: ParamKind,
    /// Value sent when a required parameter is not supplied by the caller.
    pub default: Option<&'static str>,
}

impl ParamSpec {
    const fn new(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind, default: None }
    }

    const fn with_default(name: &'static str, kind: ParamKind, default: &'static str) -> Self {
        Self { name, kind, default: Some(default) }
    }
}

/// Where the primary series lives in the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKey {
    /// A literal key such as `"Weekly Time Series"`.
    Fixed(&'static str),
    /// A key built from the requested interval; `{interval}` is substituted.
    PerInterval(&'static str),
}

impl DataKey {
    /// Resolves the key for a request made with the given interval.
    pub fn resolve(&self, interval: Option<&str>) -> String {
        match self {
            DataKey::Fixed(key) => (*key).to_string(),
            DataKey::PerInterval(template) => template.replace("{interval}", interval.unwrap_or_default()),
        }
    }
}

/// Static, immutable description of one supported provider function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSpec {
    /// The catalog key.
    pub function: Function,
    /// Parameters always sent, in wire order.
    pub required: &'static [ParamSpec],
    /// Parameters sent only when set, in wire order.
    pub optional: &'static [ParamSpec],
    /// Key of the primary series in the response.
    pub data_key: DataKey,
    /// Key of the metadata envelope in the response.
    pub meta_key: &'static str,
}

impl IndicatorSpec {
    /// Provider-side function identifier, e.g. `"SMA"`.
    pub fn name(&self) -> &'static str {
        self.function.as_str()
    }

    /// Looks up a declared parameter by name, required or optional.
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.required.iter().chain(self.optional.iter()).find(|p| p.name == name)
    }
}

macro_rules! functions {
    ($($variant:ident => $name:literal, $method:literal;)*) => {
        /// Every provider function in the catalog.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Function {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl Function {
            /// All functions, in catalog order.
            pub const ALL: &'static [Function] = &[$(Function::$variant),*];

            /// Provider-side function identifier.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Function::$variant => $name,)*
                }
            }

            /// Name of the generated client method, e.g. `"get_sma"`.
            pub fn method_name(&self) -> &'static str {
                match self {
                    $(Function::$variant => $method,)*
                }
            }
        }
    };
}

functions! {
    TimeSeriesIntraday => "TIME_SERIES_INTRADAY", "get_intraday";
    TimeSeriesDaily => "TIME_SERIES_DAILY", "get_daily";
    TimeSeriesWeekly => "TIME_SERIES_WEEKLY", "get_weekly";
    TimeSeriesMonthly => "TIME_SERIES_MONTHLY", "get_monthly";
    Sma => "SMA", "get_sma";
    Ema => "EMA", "get_ema";
    Wma => "WMA", "get_wma";
    Dema => "DEMA", "get_dema";
    Tema => "TEMA", "get_tema";
    Trima => "TRIMA", "get_trima";
    Kama => "KAMA", "get_kama";
    Mama => "MAMA", "get_mama";
    T3 => "T3", "get_t3";
    Macd => "MACD", "get_macd";
    Macdext => "MACDEXT", "get_macdext";
    Rsi => "RSI", "get_rsi";
    Stoch => "STOCH", "get_stoch";
    Bbands => "BBANDS", "get_bbands";
    Adx => "ADX", "get_adx";
    Cci => "CCI", "get_cci";
}

impl Function {
    /// The catalog entry for this function.
    pub fn spec(&self) -> &'static IndicatorSpec {
        &CATALOG[*self as usize]
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Function {
    type Err = AlphaVantageError;

    /// Parses a provider function name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Function::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AlphaVantageError::invalid("function", s, "not a supported provider function"))
    }
}

const SYMBOL: ParamSpec = ParamSpec::new("symbol", ParamKind::Text);
const OUTPUTSIZE: ParamSpec = ParamSpec::new("outputsize", ParamKind::Text);
const INTRADAY_INTERVAL: ParamSpec = ParamSpec::with_default("interval", ParamKind::Text, "15min");
const INTERVAL: ParamSpec = ParamSpec::with_default("interval", ParamKind::Text, "60min");
const TIME_PERIOD: ParamSpec = ParamSpec::with_default("time_period", ParamKind::Integer, "20");
const TIME_PERIOD_14: ParamSpec = ParamSpec::with_default("time_period", ParamKind::Integer, "14");
const SERIES_TYPE: ParamSpec = ParamSpec::with_default("series_type", ParamKind::Text, "close");

const FASTPERIOD: ParamSpec = ParamSpec::new("fastperiod", ParamKind::Integer);
const SLOWPERIOD: ParamSpec = ParamSpec::new("slowperiod", ParamKind::Integer);
const SIGNALPERIOD: ParamSpec = ParamSpec::new("signalperiod", ParamKind::Integer);
const FASTMATYPE: ParamSpec = ParamSpec::new("fastmatype", ParamKind::MaType);
const SLOWMATYPE: ParamSpec = ParamSpec::new("slowmatype", ParamKind::MaType);
const SIGNALMATYPE: ParamSpec = ParamSpec::new("signalmatype", ParamKind::MaType);

const MOVING_AVERAGE: &[ParamSpec] = &[SYMBOL, INTERVAL, TIME_PERIOD, SERIES_TYPE];
const MACD_REQUIRED: &[ParamSpec] = &[SYMBOL, INTERVAL, SERIES_TYPE];
const MACD_PERIODS: &[ParamSpec] = &[FASTPERIOD, SLOWPERIOD, SIGNALPERIOD];

const fn moving_average(function: Function, data_key: &'static str) -> IndicatorSpec {
    IndicatorSpec {
        function,
        required: MOVING_AVERAGE,
        optional: &[],
        data_key: DataKey::Fixed(data_key),
        meta_key: META_DATA_KEY,
    }
}

/// The catalog, indexed by `Function` discriminant.
pub static CATALOG: [IndicatorSpec; 20] = [
    IndicatorSpec {
        function: Function::TimeSeriesIntraday,
        required: &[SYMBOL, INTRADAY_INTERVAL],
        optional: &[OUTPUTSIZE],
        data_key: DataKey::PerInterval("Time Series ({interval})"),
        meta_key: META_DATA_KEY,
    },
    IndicatorSpec {
        function: Function::TimeSeriesDaily,
        required: &[SYMBOL],
        optional: &[OUTPUTSIZE],
        data_key: DataKey::Fixed("Time Series (Daily)"),
        meta_key: META_DATA_KEY,
    },
    IndicatorSpec {
        function: Function::TimeSeriesWeekly,
        required: &[SYMBOL],
        optional: &[],
        data_key: DataKey::Fixed("Weekly Time Series"),
        meta_key: META_DATA_KEY,
    },
    IndicatorSpec {
        function: Function::TimeSeriesMonthly,
        required: &[SYMBOL],
        optional: &[],
        data_key: DataKey::Fixed("Monthly Time Series"),
        meta_key: META_DATA_KEY,
    },
    moving_average(Function::Sma, "Technical Analysis: SMA"),
    moving_average(Function::Ema, "Technical Analysis: EMA"),
    moving_average(Function::Wma, "Technical Analysis: WMA"),
    moving_average(Function::Dema, "Technical Analysis: DEMA"),
    moving_average(Function::Tema, "Technical Analysis: TEMA"),
    moving_average(Function::Trima, "Technical Analysis: TRIMA"),
    moving_average(Function::Kama, "Technical Analysis: KAMA"),
    IndicatorSpec {
        function: Function::Mama,
        required: MOVING_AVERAGE,
        optional: &[
            ParamSpec::new("fastlimit", ParamKind::Float),
            ParamSpec::new("slowlimit", ParamKind::Float),
        ],
        data_key: DataKey::Fixed("Technical Analysis: MAMA"),
        meta_key: META_DATA_KEY,
    },
    moving_average(Function::T3, "Technical Analysis: T3"),
    IndicatorSpec {
        function: Function::Macd,
        required: MACD_REQUIRED,
        optional: MACD_PERIODS,
        data_key: DataKey::Fixed("Technical Analysis: MACD"),
        meta_key: META_DATA_KEY,
    },
    IndicatorSpec {
        function: Function::Macdext,
        required: MACD_REQUIRED,
        optional: &[FASTPERIOD, SLOWPERIOD, SIGNALPERIOD, FASTMATYPE, SLOWMATYPE, SIGNALMATYPE],
        data_key: DataKey::Fixed("Technical Analysis: MACDEXT"),
        meta_key: META_DATA_KEY,
    },
    IndicatorSpec {
        function: Function::Rsi,
        required: &[SYMBOL, INTERVAL, TIME_PERIOD_14, SERIES_TYPE],
        optional: &[],
        data_key: DataKey::Fixed("Technical Analysis: RSI"),
        meta_key: META_DATA_KEY,
    },
    IndicatorSpec {
        function: Function::Stoch,
        required: &[SYMBOL, INTERVAL],
        optional: &[
            ParamSpec::new("fastkperiod", ParamKind::Integer),
            ParamSpec::new("slowkperiod", ParamKind::Integer),
            ParamSpec::new("slowdperiod", ParamKind::Integer),
            ParamSpec::new("slowkmatype", ParamKind::MaType),
            ParamSpec::new("slowdmatype", ParamKind::MaType),
        ],
        data_key: DataKey::Fixed("Technical Analysis: STOCH"),
        meta_key: META_DATA_KEY,
    },
    IndicatorSpec {
        function: Function::Bbands,
        required: MOVING_AVERAGE,
        optional: &[
            ParamSpec::new("nbdevup", ParamKind::Integer),
            ParamSpec::new("nbdevdn", ParamKind::Integer),
            ParamSpec::new("matype", ParamKind::MaType),
        ],
        data_key: DataKey::Fixed("Technical Analysis: BBANDS"),
        meta_key: META_DATA_KEY,
    },
    IndicatorSpec {
        function: Function::Adx,
        required: &[SYMBOL, INTERVAL, TIME_PERIOD_14],
        optional: &[],
        data_key: DataKey::Fixed("Technical Analysis: ADX"),
        meta_key: META_DATA_KEY,
    },
    IndicatorSpec {
        function: Function::Cci,
        required: &[SYMBOL, INTERVAL, TIME_PERIOD],
        optional: &[],
        data_key: DataKey::Fixed("Technical Analysis: CCI"),
        meta_key: META_DATA_KEY,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_is_indexed_by_function() {
        assert_eq!(Function::ALL.len(), CATALOG.len());
        for (i, function) in Function::ALL.iter().enumerate() {
            assert_eq!(CATALOG[i].function, *function);
            assert_eq!(function.spec().function, *function);
        }
    }

    #[test]
    fn every_entry_starts_with_symbol_and_uses_meta_data() {
        for spec in CATALOG.iter() {
            assert_eq!(spec.required[0].name, "symbol", "{}", spec.name());
            assert_eq!(spec.required[0].default, None);
            assert_eq!(spec.meta_key, "Meta Data");
        }
    }

    #[test]
    fn parameter_names_are_unique_per_entry() {
        for spec in CATALOG.iter() {
            let mut seen = HashSet::new();
            for p in spec.required.iter().chain(spec.optional.iter()) {
                assert!(seen.insert(p.name), "{} declares {} twice", spec.name(), p.name);
            }
        }
    }

    #[test]
    fn only_symbol_lacks_a_default_among_required() {
        for spec in CATALOG.iter() {
            for p in spec.required.iter().skip(1) {
                assert!(p.default.is_some(), "{}.{} has no default", spec.name(), p.name);
            }
        }
    }

    #[test]
    fn intraday_data_key_follows_interval() {
        let key = Function::TimeSeriesIntraday.spec().data_key;
        assert_eq!(key.resolve(Some("5min")), "Time Series (5min)");
        assert_eq!(DataKey::Fixed("Weekly Time Series").resolve(Some("5min")), "Weekly Time Series");
    }

    #[test]
    fn matype_fields_are_declared_as_matype() {
        for spec in CATALOG.iter() {
            for p in spec.optional.iter().filter(|p| p.name.ends_with("matype")) {
                assert_eq!(p.kind, ParamKind::MaType, "{}.{}", spec.name(), p.name);
            }
        }
        assert!(Function::Macdext.spec().param("fastmatype").is_some());
        assert!(Function::Macd.spec().param("fastmatype").is_none());
    }

    #[test]
    fn function_parses_from_provider_name() {
        assert_eq!("MACDEXT".parse::<Function>().unwrap(), Function::Macdext);
        assert_eq!("time_series_daily".parse::<Function>().unwrap(), Function::TimeSeriesDaily);
        assert!("NOPE".parse::<Function>().is_err());
        assert_eq!(Function::T3.to_string(), "T3");
        assert_eq!(Function::Sma.method_name(), "get_sma");
    }
}
