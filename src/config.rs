use crate::constants::*;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineVariant {
    #[default]
    Estimated, // Per-leg travel estimates chained backward from the arrival deadline
    Fixed,     // Fixed buffer constants, no travel lookups before the show
}

impl FromStr for EngineVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "estimated" => Ok(EngineVariant::Estimated),
            "fixed" => Ok(EngineVariant::Fixed),
            _ => Err(format!(
                "Invalid engine variant: {}. Use 'estimated' or 'fixed'",
                s
            )),
        }
    }
}

/// Read `key`, falling back to `default` when unset
fn env_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr + ToString,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| format!("Invalid {}", key))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Without a key every travel estimate comes from the geometric heuristic
    pub mapbox_api_key: Option<String>,
    pub mapbox_base_url: Option<String>,
    pub overpass_url: Option<String>,
    pub travel_cache_ttl: u64,
    pub travel_lookup_timeout_ms: u64,
    pub planner: PlannerConfig,
    pub ranker: RankerConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub variant: EngineVariant,

    /// Overhead of leaving a place and starting the next leg (fixed variant)
    pub travel_pad_min: i64,

    /// Added to every estimated leg: walking to a pickup point, hailing a ride
    pub leg_overhead_min: i64,

    /// Getting-ready buffer before leaving the hotel for dinner (fixed variant)
    pub getting_ready_min: i64,

    /// Shortest direct hotel-to-venue leg (fixed variant)
    pub direct_hotel_leg_min: i64,

    /// Time to get out of the venue after the show ends
    pub post_show_exit_min: i64,

    /// Departure of the return-to-hotel leg after the show ends
    pub return_leg_offset_min: i64,

    // --- Pre-show block durations ---
    pub dinner_duration_min: i64,
    pub drinks_duration_min: i64,
    pub coffee_duration_min: i64,

    // --- Post-show dwell ---
    /// Nominal post-show window when no destination is picked
    pub post_window_min: i64,
    pub post_dinner_dwell_min: i64,
    pub post_drinks_dwell_min: i64,
    pub post_coffee_dwell_min: i64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            variant: EngineVariant::default(),
            travel_pad_min: 12,
            leg_overhead_min: 8,
            getting_ready_min: 15,
            direct_hotel_leg_min: 20,
            post_show_exit_min: 15,
            return_leg_offset_min: 6,
            dinner_duration_min: 60,
            drinks_duration_min: 45,
            coffee_duration_min: 25,
            post_window_min: 90,
            post_dinner_dwell_min: 70,
            post_drinks_dwell_min: 45,
            post_coffee_dwell_min: 25,
        }
    }
}

impl PlannerConfig {
    pub fn fixed() -> Self {
        Self {
            variant: EngineVariant::Fixed,
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, String> {
        let d = Self::default();

        let config = Self {
            variant: env::var("SCHEDULE_ENGINE_VARIANT")
                .unwrap_or_else(|_| "estimated".to_string())
                .parse()?,
            travel_pad_min: env_or("SCHEDULE_TRAVEL_PAD_MIN", d.travel_pad_min)?,
            leg_overhead_min: env_or("SCHEDULE_LEG_OVERHEAD_MIN", d.leg_overhead_min)?,
            getting_ready_min: env_or("SCHEDULE_GETTING_READY_MIN", d.getting_ready_min)?,
            direct_hotel_leg_min: env_or("SCHEDULE_DIRECT_HOTEL_LEG_MIN", d.direct_hotel_leg_min)?,
            post_show_exit_min: env_or("SCHEDULE_POST_SHOW_EXIT_MIN", d.post_show_exit_min)?,
            return_leg_offset_min: env_or(
                "SCHEDULE_RETURN_LEG_OFFSET_MIN",
                d.return_leg_offset_min,
            )?,
            dinner_duration_min: env_or("SCHEDULE_DINNER_DURATION_MIN", d.dinner_duration_min)?,
            drinks_duration_min: env_or("SCHEDULE_DRINKS_DURATION_MIN", d.drinks_duration_min)?,
            coffee_duration_min: env_or("SCHEDULE_COFFEE_DURATION_MIN", d.coffee_duration_min)?,
            post_window_min: env_or("SCHEDULE_POST_WINDOW_MIN", d.post_window_min)?,
            post_dinner_dwell_min: env_or(
                "SCHEDULE_POST_DINNER_DWELL_MIN",
                d.post_dinner_dwell_min,
            )?,
            post_drinks_dwell_min: env_or(
                "SCHEDULE_POST_DRINKS_DWELL_MIN",
                d.post_drinks_dwell_min,
            )?,
            post_coffee_dwell_min: env_or(
                "SCHEDULE_POST_COFFEE_DWELL_MIN",
                d.post_coffee_dwell_min,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(6..=10).contains(&self.leg_overhead_min) {
            return Err("SCHEDULE_LEG_OVERHEAD_MIN must be between 6 and 10".to_string());
        }

        let non_negative = [
            ("SCHEDULE_TRAVEL_PAD_MIN", self.travel_pad_min),
            ("SCHEDULE_GETTING_READY_MIN", self.getting_ready_min),
            ("SCHEDULE_DIRECT_HOTEL_LEG_MIN", self.direct_hotel_leg_min),
            ("SCHEDULE_POST_SHOW_EXIT_MIN", self.post_show_exit_min),
            ("SCHEDULE_RETURN_LEG_OFFSET_MIN", self.return_leg_offset_min),
        ];
        for (key, value) in non_negative {
            if !(0..=MAX_TIMING_MIN).contains(&value) {
                return Err(format!("{} must be between 0 and {}", key, MAX_TIMING_MIN));
            }
        }

        let positive = [
            ("SCHEDULE_DINNER_DURATION_MIN", self.dinner_duration_min),
            ("SCHEDULE_DRINKS_DURATION_MIN", self.drinks_duration_min),
            ("SCHEDULE_COFFEE_DURATION_MIN", self.coffee_duration_min),
            ("SCHEDULE_POST_WINDOW_MIN", self.post_window_min),
            ("SCHEDULE_POST_DINNER_DWELL_MIN", self.post_dinner_dwell_min),
            ("SCHEDULE_POST_DRINKS_DWELL_MIN", self.post_drinks_dwell_min),
            ("SCHEDULE_POST_COFFEE_DWELL_MIN", self.post_coffee_dwell_min),
        ];
        for (key, value) in positive {
            if !(1..=MAX_TIMING_MIN).contains(&value) {
                return Err(format!("{} must be between 1 and {}", key, MAX_TIMING_MIN));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankerConfig {
    /// Candidates further than this from the anchor are dropped
    pub search_radius_miles: f64,

    /// Maximum candidates returned per request
    pub result_limit: usize,

    /// Weight on (rating - 4.0)
    pub weight_rating: f64,

    /// Weight on ln(1 + review count)
    pub weight_reviews: f64,

    /// Penalty per price tier away from the requested budget
    pub weight_price: f64,

    /// Flat bonus when a cuisine keyword matches
    pub cuisine_bonus: f64,

    /// Maximum proximity bonus, at zero distance
    pub weight_proximity: f64,

    /// Penalty for places known to be closed at the target instant
    pub closed_penalty: f64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            search_radius_miles: 2.0,
            result_limit: 20,
            weight_rating: 1.0,
            weight_reviews: 0.35,
            weight_price: 0.6,
            cuisine_bonus: 0.8,
            weight_proximity: 1.2,
            closed_penalty: 1.5,
        }
    }
}

impl RankerConfig {
    pub fn from_env() -> Result<Self, String> {
        let d = Self::default();

        let config = Self {
            search_radius_miles: env_or("RANK_SEARCH_RADIUS_MILES", d.search_radius_miles)?,
            result_limit: env_or("RANK_RESULT_LIMIT", d.result_limit)?,
            weight_rating: env_or("RANK_WEIGHT_RATING", d.weight_rating)?,
            weight_reviews: env_or("RANK_WEIGHT_REVIEWS", d.weight_reviews)?,
            weight_price: env_or("RANK_WEIGHT_PRICE", d.weight_price)?,
            cuisine_bonus: env_or("RANK_CUISINE_BONUS", d.cuisine_bonus)?,
            weight_proximity: env_or("RANK_WEIGHT_PROXIMITY", d.weight_proximity)?,
            closed_penalty: env_or("RANK_CLOSED_PENALTY", d.closed_penalty)?,
        };

        if !(0.1..=25.0).contains(&config.search_radius_miles) {
            return Err("RANK_SEARCH_RADIUS_MILES must be between 0.1 and 25".to_string());
        }
        if config.result_limit == 0 || config.result_limit > 200 {
            return Err("RANK_RESULT_LIMIT must be between 1 and 200".to_string());
        }

        Ok(config)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let travel_lookup_timeout_ms: u64 =
            env_or("TRAVEL_LOOKUP_TIMEOUT_MS", DEFAULT_TRAVEL_LOOKUP_TIMEOUT_MS)?;
        if travel_lookup_timeout_ms == 0 || travel_lookup_timeout_ms > 30_000 {
            return Err("TRAVEL_LOOKUP_TIMEOUT_MS must be between 1 and 30000".to_string());
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            mapbox_api_key: env::var("MAPBOX_API_KEY").ok().filter(|k| !k.is_empty()),
            mapbox_base_url: env::var("MAPBOX_BASE_URL").ok().filter(|u| !u.is_empty()),
            overpass_url: env::var("OVERPASS_URL").ok().filter(|u| !u.is_empty()),
            travel_cache_ttl: env_or("TRAVEL_CACHE_TTL", DEFAULT_TRAVEL_CACHE_TTL_SECONDS)?,
            travel_lookup_timeout_ms,
            planner: PlannerConfig::from_env()?,
            ranker: RankerConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_engine_variant_parsing() {
        assert_eq!("estimated".parse::<EngineVariant>().unwrap(), EngineVariant::Estimated);
        assert_eq!("FIXED".parse::<EngineVariant>().unwrap(), EngineVariant::Fixed);
        assert!("greedy".parse::<EngineVariant>().is_err());
    }

    #[test]
    fn test_planner_defaults_validate() {
        assert!(PlannerConfig::default().validate().is_ok());
        assert_eq!(PlannerConfig::fixed().variant, EngineVariant::Fixed);
    }

    #[test]
    fn test_planner_rejects_overhead_out_of_range() {
        let config = PlannerConfig {
            leg_overhead_min: 12,
            ..PlannerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_planner_rejects_zero_dinner() {
        let config = PlannerConfig {
            dinner_duration_min: 0,
            ..PlannerConfig::default()
        };
        assert!(config
            .validate()
            .unwrap_err()
            .contains("SCHEDULE_DINNER_DURATION_MIN"));
    }

    #[test]
    fn test_planner_rejects_oversized_durations() {
        let config = PlannerConfig {
            post_window_min: MAX_TIMING_MIN + 1,
            ..PlannerConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("SCHEDULE_POST_WINDOW_MIN"));

        let config = PlannerConfig {
            travel_pad_min: i64::MAX,
            ..PlannerConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("SCHEDULE_TRAVEL_PAD_MIN"));
    }

    #[test]
    #[serial]
    fn test_planner_from_env_overrides() {
        env::set_var("SCHEDULE_ENGINE_VARIANT", "fixed");
        env::set_var("SCHEDULE_DINNER_DURATION_MIN", "75");
        let config = PlannerConfig::from_env();
        env::remove_var("SCHEDULE_ENGINE_VARIANT");
        env::remove_var("SCHEDULE_DINNER_DURATION_MIN");

        let config = config.unwrap();
        assert_eq!(config.variant, EngineVariant::Fixed);
        assert_eq!(config.dinner_duration_min, 75);
        assert_eq!(config.travel_pad_min, 12);
    }

    #[test]
    #[serial]
    fn test_planner_from_env_rejects_garbage() {
        env::set_var("SCHEDULE_TRAVEL_PAD_MIN", "twelve");
        let result = PlannerConfig::from_env();
        env::remove_var("SCHEDULE_TRAVEL_PAD_MIN");

        assert_eq!(result.unwrap_err(), "Invalid SCHEDULE_TRAVEL_PAD_MIN");
    }

    #[test]
    #[serial]
    fn test_ranker_from_env_limits() {
        env::set_var("RANK_RESULT_LIMIT", "0");
        let result = RankerConfig::from_env();
        env::remove_var("RANK_RESULT_LIMIT");
        assert!(result.is_err());

        assert_eq!(RankerConfig::from_env().unwrap(), RankerConfig::default());
    }

    #[test]
    #[serial]
    fn test_config_without_mapbox_key() {
        env::remove_var("MAPBOX_API_KEY");
        env::remove_var("HOST");
        env::remove_var("PORT");
        env::remove_var("TRAVEL_CACHE_TTL");
        let config = Config::from_env().unwrap();
        assert!(config.mapbox_api_key.is_none());
        assert_eq!(config.travel_cache_ttl, DEFAULT_TRAVEL_CACHE_TTL_SECONDS);
        assert_eq!(config.server_address(), format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT));
    }
}
