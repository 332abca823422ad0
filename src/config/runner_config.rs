use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use alloy::primitives::Address;

use crate::{
    constants::{
        DEFAULT_CONFIRMATION_POLL_INTERVAL_MS, DEFAULT_CONFIRMATION_TIMEOUT_SECONDS,
        DEFAULT_DEADLINE_SECONDS, DEFAULT_RPC_MAX_RETRIES, DEFAULT_RPC_RETRY_BASE_DELAY_MS,
        DEFAULT_RPC_RETRY_MAX_DELAY_MS, DEFAULT_RPC_TIMEOUT_SECONDS, DEFAULT_SWAP_COUNT,
        DEFAULT_SWAP_DELAY_MS, DEFAULT_SWAP_GAS_LIMIT, MAX_TOKEN_DECIMALS, NATIVE_DECIMALS,
    },
    domain::{to_base_units, validate_amount, BatchConfig, PathResolver, SwapExecutorConfig},
    models::{
        ApprovalPolicy, Asset, ConfigError, ConfirmationPolicy, SignerError, SlippageTolerance,
        SwapIntent,
    },
    services::{
        provider::RetryConfig,
        signer::{CredentialSource, EnvCredentialSource, FileCredentialSource},
    },
};

/// Where wallet keys come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsConfig {
    /// Comma-separated keys in an environment variable.
    Env { var_name: String },
    /// One key per line in a file.
    File { path: PathBuf },
}

impl CredentialsConfig {
    pub fn open(&self) -> Result<Box<dyn CredentialSource>, SignerError> {
        match self {
            CredentialsConfig::Env { var_name } => {
                Ok(Box::new(EnvCredentialSource::new(var_name)?))
            }
            CredentialsConfig::File { path } => {
                Ok(Box::new(FileCredentialSource::new(path.clone())?))
            }
        }
    }
}

/// Everything a run needs, resolved and validated before the first RPC call.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub rpc_url: String,
    pub rpc_timeout_seconds: u64,
    pub retry: RetryConfig,
    pub credentials: CredentialsConfig,
    pub intent: SwapIntent,
    pub executor: SwapExecutorConfig,
    pub batch: BatchConfig,
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(name: &str) -> Result<String, ConfigError> {
    optional(name).ok_or_else(|| ConfigError::MissingVariable(name.to_string()))
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::invalid(name, format!("'{raw}': {e}")))
}

fn parse_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    optional(name).map_or(Ok(default), |raw| parse_value(name, &raw))
}

fn parse_optional<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    optional(name)
        .map(|raw| parse_value(name, &raw))
        .transpose()
}

fn parse_asset(name: &str) -> Result<Asset, ConfigError> {
    required(name)?.parse()
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let rpc_url = required("RPC_URL")?;
        let rpc_timeout_seconds = parse_or("RPC_TIMEOUT_SECONDS", DEFAULT_RPC_TIMEOUT_SECONDS)?;
        let retry = RetryConfig::new(
            parse_or("RPC_MAX_RETRIES", DEFAULT_RPC_MAX_RETRIES)?,
            DEFAULT_RPC_RETRY_BASE_DELAY_MS,
            DEFAULT_RPC_RETRY_MAX_DELAY_MS,
        );

        let credentials = Self::credentials_from_env()?;
        let native_placeholder = parse_optional::<Address>("NATIVE_PLACEHOLDER_ADDRESS")?;
        let intent = Self::intent_from_env(native_placeholder)?;
        let executor = Self::executor_from_env(native_placeholder)?;

        let batch = BatchConfig::new(
            parse_or("SWAP_COUNT", DEFAULT_SWAP_COUNT)?,
            Duration::from_millis(parse_or("SWAP_DELAY_MS", DEFAULT_SWAP_DELAY_MS)?),
            parse_or("ABORT_WALLET_ON_INSUFFICIENT_BALANCE", true)?,
        )?;

        Ok(Self {
            rpc_url,
            rpc_timeout_seconds,
            retry,
            credentials,
            intent,
            executor,
            batch,
        })
    }

    fn credentials_from_env() -> Result<CredentialsConfig, ConfigError> {
        if let Some(path) = optional("PRIVATE_KEYS_FILE") {
            return Ok(CredentialsConfig::File {
                path: PathBuf::from(path),
            });
        }
        // The keys themselves are read by the credential source, one at a time.
        required("PRIVATE_KEYS")?;
        Ok(CredentialsConfig::Env {
            var_name: "PRIVATE_KEYS".to_string(),
        })
    }

    fn intent_from_env(native_placeholder: Option<Address>) -> Result<SwapIntent, ConfigError> {
        let mut input = parse_asset("TOKEN_IN")?;
        let output = parse_asset("TOKEN_OUT")?;

        if let Some(decimals) = parse_optional::<u8>("TOKEN_IN_DECIMALS")? {
            if decimals > MAX_TOKEN_DECIMALS {
                return Err(ConfigError::invalid(
                    "TOKEN_IN_DECIMALS",
                    format!("at most {MAX_TOKEN_DECIMALS} decimals are supported"),
                ));
            }
            if input.is_native() {
                return Err(ConfigError::invalid(
                    "TOKEN_IN_DECIMALS",
                    "the native currency has fixed decimals",
                ));
            }
            input = input.with_decimals(decimals);
        }

        PathResolver::new(native_placeholder)
            .resolve(&input, &output)
            .map_err(|e| ConfigError::invalid("TOKEN_OUT", e.to_string()))?;

        let amount = required("AMOUNT_TO_SWAP")?;
        // Token decimals unknown until queried: only the notation can be checked now.
        let known_decimals = match input {
            Asset::Native => Some(NATIVE_DECIMALS),
            Asset::Token { decimals, .. } => decimals,
        };
        match known_decimals {
            Some(decimals) => to_base_units(&amount, decimals).map(|_| ()),
            None => validate_amount(&amount),
        }
        .map_err(|e| ConfigError::invalid("AMOUNT_TO_SWAP", e.to_string()))?;

        let slippage = parse_optional::<SlippageTolerance>("SLIPPAGE_TOLERANCE")?;
        if slippage.is_none() && !parse_or("ALLOW_UNPROTECTED_SWAPS", false)? {
            return Err(ConfigError::invalid(
                "SLIPPAGE_TOLERANCE",
                "not set; set ALLOW_UNPROTECTED_SWAPS=true to swap with a zero minimum output",
            ));
        }

        Ok(SwapIntent::new(input, output, amount, slippage))
    }

    fn executor_from_env(
        native_placeholder: Option<Address>,
    ) -> Result<SwapExecutorConfig, ConfigError> {
        let router = parse_value::<Address>("ROUTER_ADDRESS", &required("ROUTER_ADDRESS")?)?;

        let deadline_seconds = parse_or("DEADLINE_SECONDS", DEFAULT_DEADLINE_SECONDS)?;
        if deadline_seconds <= 0 {
            return Err(ConfigError::invalid(
                "DEADLINE_SECONDS",
                "must be a positive number of seconds",
            ));
        }

        let gas_limit = match parse_or("GAS_LIMIT", DEFAULT_SWAP_GAS_LIMIT)? {
            0 => None,
            limit => Some(limit),
        };

        let timeout = match parse_or(
            "CONFIRMATION_TIMEOUT_SECONDS",
            DEFAULT_CONFIRMATION_TIMEOUT_SECONDS,
        )? {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        };
        let poll_interval = Duration::from_millis(parse_or(
            "CONFIRMATION_POLL_INTERVAL_MS",
            DEFAULT_CONFIRMATION_POLL_INTERVAL_MS,
        )?);

        Ok(SwapExecutorConfig {
            router,
            deadline_seconds,
            gas_limit,
            confirmation: ConfirmationPolicy {
                timeout,
                poll_interval,
            },
            approval_policy: parse_or("APPROVAL_POLICY", ApprovalPolicy::default())?,
            native_placeholder,
        })
    }
}
