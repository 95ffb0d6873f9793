//! Run settings assembled from a [`ConfigPort`] and validated up front.
//!
//! Every key is optional except `[data] dir`; absent keys fall back to the
//! defaults of [`FeatureConfig`], [`PatternConfig`] and the section structs
//! below.

use crate::domain::error::ScreenerError;
use crate::domain::features::FeatureConfig;
use crate::domain::indicator::Smoothing;
use crate::domain::outcome::DEFAULT_HORIZON;
use crate::domain::pattern::PatternConfig;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub listing: Option<PathBuf>,
    pub metadata: Option<PathBuf>,
    pub history_start: NaiveDate,
    pub drop_flat_body: bool,
    pub exchanges: Vec<String>,
    pub cache_max_age_hours: i64,
    /// Bars are cached on disk here when set, otherwise only in memory.
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    pub exclude_sectors: Vec<String>,
    pub target_country: Option<String>,
    pub earnings_window_days: Option<i64>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        FilterSettings {
            exclude_sectors: vec!["Real Estate".to_string()],
            target_country: Some("USA".to_string()),
            earnings_window_days: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub horizon: usize,
    pub screener_dir: PathBuf,
    pub report_dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            horizon: DEFAULT_HORIZON,
            screener_dir: PathBuf::from("data/screener"),
            report_dir: PathBuf::from("data/report"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data: DataSettings,
    pub features: FeatureConfig,
    pub pattern: PatternConfig,
    pub filter: FilterSettings,
    pub report: ReportSettings,
}

pub const DEFAULT_HISTORY_START: (i32, u32, u32) = (2020, 1, 1);

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScreenerError> {
        Ok(Settings {
            data: data_settings(config)?,
            features: feature_config(config)?,
            pattern: pattern_config(config)?,
            filter: filter_settings(config)?,
            report: report_settings(config)?,
        })
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ScreenerError {
    ScreenerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn window(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, ScreenerError> {
    let value = config.get_int(section, key, default as i64);
    if value <= 0 {
        return Err(invalid(section, key, format!("{key} must be a positive integer")));
    }
    Ok(value as usize)
}

fn non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, ScreenerError> {
    let value = config.get_double(section, key, default);
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(section, key, format!("{key} must be non-negative")));
    }
    Ok(value)
}

fn optional_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, ScreenerError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("'{raw}' is not a number"))),
    }
}

fn data_settings(config: &dyn ConfigPort) -> Result<DataSettings, ScreenerError> {
    let dir = config
        .get_string("data", "dir")
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ScreenerError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        })?;

    let history_start = match config.get_string("data", "history_start") {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|e| invalid("data", "history_start", format!("expected YYYY-MM-DD: {e}")))?,
        None => {
            let (y, m, d) = DEFAULT_HISTORY_START;
            NaiveDate::from_ymd_opt(y, m, d)
                .ok_or_else(|| invalid("data", "history_start", "bad default"))?
        }
    };

    let mut exchanges = config.get_list("data", "exchanges");
    if exchanges.is_empty() {
        exchanges = vec!["NASDAQ".to_string(), "NYSE".to_string()];
    }

    let cache_max_age_hours = config.get_int("data", "cache_max_age_hours", 12);
    if cache_max_age_hours < 0 {
        return Err(invalid("data", "cache_max_age_hours", "must be non-negative"));
    }

    Ok(DataSettings {
        dir: PathBuf::from(dir.trim()),
        listing: config.get_string("data", "listing").map(PathBuf::from),
        metadata: config.get_string("data", "metadata").map(PathBuf::from),
        history_start,
        drop_flat_body: config.get_bool("data", "drop_flat_body", true),
        exchanges,
        cache_max_age_hours,
        cache_dir: config
            .get_string("data", "cache_dir")
            .filter(|d| !d.trim().is_empty())
            .map(|d| PathBuf::from(d.trim())),
    })
}

fn feature_config(config: &dyn ConfigPort) -> Result<FeatureConfig, ScreenerError> {
    let d = FeatureConfig::default();
    let s = "features";

    let atr_smoothing = match config.get_string(s, "atr_smoothing") {
        Some(raw) => raw.parse::<Smoothing>()?,
        None => d.atr_smoothing,
    };

    let features = FeatureConfig {
        min_bars: window(config, s, "min_bars", d.min_bars)?,
        volume_avg_period: window(config, s, "volume_avg_period", d.volume_avg_period)?,
        min_avg_volume: non_negative(config, s, "min_avg_volume", d.min_avg_volume)?,
        min_close: non_negative(config, s, "min_close", d.min_close)?,
        sma_short: window(config, s, "sma_short", d.sma_short)?,
        sma_long: window(config, s, "sma_long", d.sma_long)?,
        atr_period: window(config, s, "atr_period", d.atr_period)?,
        atr_smoothing,
        adx_period: window(config, s, "adx_period", d.adx_period)?,
        weekly_adx_period: window(config, s, "weekly_adx_period", d.weekly_adx_period)?,
        roc_period: window(config, s, "roc_period", d.roc_period)?,
        momentum_short: window(config, s, "momentum_short", d.momentum_short)?,
        momentum_medium: window(config, s, "momentum_medium", d.momentum_medium)?,
        breakout_short: window(config, s, "breakout_short", d.breakout_short)?,
        breakout_long: window(config, s, "breakout_long", d.breakout_long)?,
        volume_regime_window: window(config, s, "volume_regime_window", d.volume_regime_window)?,
        exclude_triple_witching: config.get_bool(
            s,
            "exclude_triple_witching",
            d.exclude_triple_witching,
        ),
    };

    if features.sma_short >= features.sma_long {
        return Err(invalid(s, "sma_short", "must be shorter than sma_long"));
    }
    Ok(features)
}

fn pattern_config(config: &dyn ConfigPort) -> Result<PatternConfig, ScreenerError> {
    let d = PatternConfig::default();
    let s = "pattern";

    let pattern = PatternConfig {
        breakout_distance_min: non_negative(
            config,
            s,
            "breakout_distance_min",
            d.breakout_distance_min,
        )?,
        pullback_distance_max: non_negative(
            config,
            s,
            "pullback_distance_max",
            d.pullback_distance_max,
        )?,
        momentum_short_max_abs: optional_double(config, s, "momentum_short_max_abs")?,
        daily_adx_min: optional_double(config, s, "daily_adx_min")?,
        weekly_adx_min: non_negative(config, s, "weekly_adx_min", d.weekly_adx_min)?,
        stop_atr_mult: non_negative(config, s, "stop_atr_mult", d.stop_atr_mult)?,
        target_atr_mult: non_negative(config, s, "target_atr_mult", d.target_atr_mult)?,
        trigger_buffer_pct: non_negative(config, s, "trigger_buffer_pct", d.trigger_buffer_pct)?,
        trigger_buffer_floor: non_negative(
            config,
            s,
            "trigger_buffer_floor",
            d.trigger_buffer_floor,
        )?,
    };

    if pattern.target_atr_mult <= 0.0 {
        return Err(invalid(s, "target_atr_mult", "must be greater than zero"));
    }
    Ok(pattern)
}

fn filter_settings(config: &dyn ConfigPort) -> Result<FilterSettings, ScreenerError> {
    let d = FilterSettings::default();

    let exclude_sectors = match config.get_string("filter", "exclude_sectors") {
        Some(_) => config.get_list("filter", "exclude_sectors"),
        None => d.exclude_sectors,
    };
    let target_country = match config.get_string("filter", "target_country") {
        Some(raw) if raw.trim().is_empty() || raw.trim().eq_ignore_ascii_case("any") => None,
        Some(raw) => Some(raw.trim().to_string()),
        None => d.target_country,
    };
    let earnings_window_days = match config.get_int("filter", "earnings_window_days", 0) {
        days if days < 0 => {
            return Err(invalid("filter", "earnings_window_days", "must be non-negative"));
        }
        0 => None,
        days => Some(days),
    };

    Ok(FilterSettings {
        exclude_sectors,
        target_country,
        earnings_window_days,
    })
}

fn report_settings(config: &dyn ConfigPort) -> Result<ReportSettings, ScreenerError> {
    let d = ReportSettings::default();
    Ok(ReportSettings {
        horizon: window(config, "report", "horizon", d.horizon)?,
        screener_dir: config
            .get_string("report", "screener_dir")
            .map(PathBuf::from)
            .unwrap_or(d.screener_dir),
        report_dir: config
            .get_string("report", "report_dir")
            .map(PathBuf::from)
            .unwrap_or(d.report_dir),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn settings(ini: &str) -> Result<Settings, ScreenerError> {
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        Settings::from_config(&adapter)
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let s = settings("[data]\ndir = /tmp/bars\n").unwrap();

        assert_eq!(s.data.dir, PathBuf::from("/tmp/bars"));
        assert_eq!(s.data.history_start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(s.data.exchanges, vec!["NASDAQ", "NYSE"]);
        assert!(s.data.drop_flat_body);
        assert_eq!(s.data.cache_dir, None);
        assert_eq!(s.features, FeatureConfig::default());
        assert_eq!(s.pattern, PatternConfig::default());
        assert_eq!(s.filter, FilterSettings::default());
        assert_eq!(s.report.horizon, 5);
    }

    #[test]
    fn missing_data_dir() {
        let err = settings("[report]\nhorizon = 5\n").unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigMissing { ref key, .. } if key == "dir"));
    }

    #[test]
    fn overrides_are_applied() {
        let s = settings(
            "[data]\ndir = bars\nexchanges = NYSE\ncache_dir = cache\n\
             [features]\natr_period = 14\natr_smoothing = rma\nsma_long = 100\n\
             [pattern]\nweekly_adx_min = 20\ndaily_adx_min = 15\n\
             [filter]\nexclude_sectors = Real Estate, Utilities\n\
             target_country = any\nearnings_window_days = 8\n\
             [report]\nhorizon = 10\n",
        )
        .unwrap();

        assert_eq!(s.data.exchanges, vec!["NYSE"]);
        assert_eq!(s.data.cache_dir, Some(PathBuf::from("cache")));
        assert_eq!(s.features.atr_period, 14);
        assert_eq!(s.features.atr_smoothing, Smoothing::Rma);
        assert_eq!(s.features.sma_long, 100);
        assert_eq!(s.pattern.weekly_adx_min, 20.0);
        assert_eq!(s.pattern.daily_adx_min, Some(15.0));
        assert_eq!(s.filter.exclude_sectors, vec!["Real Estate", "Utilities"]);
        assert_eq!(s.filter.target_country, None);
        assert_eq!(s.filter.earnings_window_days, Some(8));
        assert_eq!(s.report.horizon, 10);
    }

    #[test]
    fn rejects_unknown_smoothing() {
        let err = settings("[data]\ndir = x\n[features]\natr_smoothing = wma\n").unwrap_err();
        assert!(matches!(err, ScreenerError::UnknownSmoothing(_)));
    }

    #[test]
    fn rejects_bad_values() {
        for ini in [
            "[data]\ndir = x\n[features]\natr_period = 0\n",
            "[data]\ndir = x\n[features]\nsma_short = 300\n",
            "[data]\ndir = x\n[pattern]\nstop_atr_mult = -1\n",
            "[data]\ndir = x\n[pattern]\ntarget_atr_mult = 0\n",
            "[data]\ndir = x\n[pattern]\ndaily_adx_min = strong\n",
            "[data]\ndir = x\n[report]\nhorizon = 0\n",
            "[data]\ndir = x\nhistory_start = 01/01/2020\n",
        ] {
            let err = settings(ini).unwrap_err();
            assert!(
                matches!(err, ScreenerError::ConfigInvalid { .. }),
                "expected ConfigInvalid for {ini:?}, got {err:?}"
            );
        }
    }
}
