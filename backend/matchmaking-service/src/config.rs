use std::env;

/// Main application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub tiering: TieringConfig,
    pub carbon: CarbonConfig,
    pub match_scoring: MatchScoringConfig,
    pub baseline: BaselineConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded RSA public key used to validate access tokens.
    pub jwt_public_key_pem: String,
}

/// Distance cutoffs feeding tier classification. Policy values, not a
/// correctness contract; the ordinal tier behavior is what is tested.
#[derive(Debug, Clone)]
pub struct TieringConfig {
    pub near_miles: f64,
    pub regional_miles: f64,
}

#[derive(Debug, Clone)]
pub struct CarbonConfig {
    /// Road-freight emission factor, kg CO2e per ton-mile.
    pub transport_kg_per_ton_mile: f64,
}

#[derive(Debug, Clone)]
pub struct MatchScoringConfig {
    /// Ceiling on expensive scoring calls per run, independent of how many
    /// suppliers matched.
    pub top_k: usize,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Price per 1000 consumed tokens, used to derive the logged cost.
    pub token_unit_price_usd: f64,
}

#[derive(Debug, Clone)]
pub struct BaselineConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        Ok(Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                host: env::var("MATCHMAKING_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("MATCHMAKING_SERVICE_PORT", 8094)?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .map_err(|_| "DATABASE_URL is required".to_string())?,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            auth: AuthConfig {
                jwt_public_key_pem: env::var("JWT_PUBLIC_KEY_PEM")
                    .map_err(|_| "JWT_PUBLIC_KEY_PEM is required".to_string())?,
            },
            tiering: TieringConfig {
                near_miles: parse_var("TIER_NEAR_MILES", 100.0)?,
                regional_miles: parse_var("TIER_REGIONAL_MILES", 500.0)?,
            },
            carbon: CarbonConfig {
                transport_kg_per_ton_mile: parse_var("TRANSPORT_KG_PER_TON_MILE", 0.161)?,
            },
            match_scoring: MatchScoringConfig {
                top_k: parse_var("MATCH_SCORING_TOP_K", 10)?,
                api_url: env::var("MATCH_SCORER_API_URL")
                    .unwrap_or_else(|_| "https://api.openai.com".to_string()),
                api_key: env::var("MATCH_SCORER_API_KEY")
                    .map_err(|_| "MATCH_SCORER_API_KEY is required".to_string())?,
                model: env::var("MATCH_SCORER_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                timeout_secs: parse_var("MATCH_SCORER_TIMEOUT_SECS", 20)?,
                token_unit_price_usd: parse_var("MATCH_SCORER_TOKEN_UNIT_PRICE_USD", 0.00015)?,
            },
            baseline: BaselineConfig {
                api_url: env::var("EPD_BASELINE_API_URL")
                    .unwrap_or_else(|_| "http://localhost:8095".to_string()),
                timeout_secs: parse_var("EPD_BASELINE_TIMEOUT_SECS", 10)?,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| format!("{} must be a valid {}", name, std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}
