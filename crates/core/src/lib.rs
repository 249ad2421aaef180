pub mod domain;
pub mod forecast;
pub mod ingest;
pub mod time;

pub mod config {
    use crate::forecast::{DuplicatePolicy, ForecastOptions};
    use anyhow::Context;
    use chrono::FixedOffset;

    const DEFAULT_UTC_OFFSET_HOURS: i32 = 3;
    const DEFAULT_HORIZON_DAYS: u32 = 14;
    const DEFAULT_MAX_HORIZON_DAYS: u32 = 366;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub utc_offset_hours: i32,
        pub default_horizon_days: u32,
        pub max_horizon_days: u32,
        pub duplicate_policy: DuplicatePolicy,
        pub legacy_fallback_flag: bool,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                sentry_dsn: None,
                utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
                default_horizon_days: DEFAULT_HORIZON_DAYS,
                max_horizon_days: DEFAULT_MAX_HORIZON_DAYS,
                duplicate_policy: DuplicatePolicy::default(),
                legacy_fallback_flag: true,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let mut out = Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                ..Self::default()
            };

            if let Ok(s) = std::env::var("MAUZO_UTC_OFFSET_HOURS") {
                out.utc_offset_hours = s
                    .trim()
                    .parse()
                    .with_context(|| format!("MAUZO_UTC_OFFSET_HOURS must be an integer (got {s})"))?;
            }

            if let Ok(s) = std::env::var("MAUZO_DEFAULT_HORIZON_DAYS") {
                out.default_horizon_days = s.trim().parse().with_context(|| {
                    format!("MAUZO_DEFAULT_HORIZON_DAYS must be a positive integer (got {s})")
                })?;
            }

            if let Ok(s) = std::env::var("MAUZO_MAX_HORIZON_DAYS") {
                out.max_horizon_days = s.trim().parse().with_context(|| {
                    format!("MAUZO_MAX_HORIZON_DAYS must be a positive integer (got {s})")
                })?;
            }

            if let Ok(s) = std::env::var("MAUZO_DUPLICATE_POLICY") {
                out.duplicate_policy = s.parse()?;
            }

            if let Ok(s) = std::env::var("MAUZO_LEGACY_FALLBACK_FLAG") {
                out.legacy_fallback_flag = parse_bool(&s)
                    .with_context(|| format!("MAUZO_LEGACY_FALLBACK_FLAG must be a boolean (got {s})"))?;
            }

            out.validate()?;
            Ok(out)
        }

        pub fn validate(&self) -> anyhow::Result<()> {
            anyhow::ensure!(
                (-12..=14).contains(&self.utc_offset_hours),
                "MAUZO_UTC_OFFSET_HOURS must be within -12..=14 (got {})",
                self.utc_offset_hours
            );
            anyhow::ensure!(
                self.max_horizon_days >= 1,
                "MAUZO_MAX_HORIZON_DAYS must be >= 1"
            );
            anyhow::ensure!(
                (1..=self.max_horizon_days).contains(&self.default_horizon_days),
                "MAUZO_DEFAULT_HORIZON_DAYS must be 1..={} (got {})",
                self.max_horizon_days,
                self.default_horizon_days
            );
            Ok(())
        }

        pub fn utc_offset(&self) -> anyhow::Result<FixedOffset> {
            FixedOffset::east_opt(self.utc_offset_hours * 3600)
                .with_context(|| format!("invalid UTC offset: {} hours", self.utc_offset_hours))
        }

        pub fn forecast_options(&self) -> ForecastOptions {
            ForecastOptions {
                duplicate_policy: self.duplicate_policy,
                legacy_fallback_flag: self.legacy_fallback_flag,
            }
        }
    }

    fn parse_bool(s: &str) -> Option<bool> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

}
