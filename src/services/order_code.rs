//! Human-readable order codes: `MP-2025-004213` for retail orders and
//! `PC-2025-000017` for tailoring orders.

use crate::{errors::ServiceError, metrics::CODE_COLLISIONS};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use tracing::debug;

pub const RETAIL_PREFIX: &str = "MP";
pub const CUSTOM_PREFIX: &str = "PC";

lazy_static! {
    static ref CODE_PATTERN: Regex =
        Regex::new(r"^(MP|PC)-\d{4}-\d{6}$").expect("order code pattern compiles");
}

pub fn format_code(prefix: &str, year: i32, number: u32) -> String {
    format!("{}-{}-{:06}", prefix, year, number % 1_000_000)
}

/// Draws a candidate for the current year. Not guaranteed unique.
pub fn random_code(prefix: &str) -> String {
    let number = rand::thread_rng().gen_range(0..1_000_000);
    format_code(prefix, Utc::now().year(), number)
}

pub fn is_well_formed(code: &str) -> bool {
    CODE_PATTERN.is_match(code)
}

/// Answers whether a code is already taken.
#[async_trait]
pub trait CodeRegistry: Send + Sync {
    async fn is_taken(&self, code: &str) -> Result<bool, ServiceError>;
}

/// Draws random codes until one is not taken. Retries are unbounded; the
/// unique index on the code column catches the race between check and insert.
pub async fn generate_unique_code<R>(prefix: &str, registry: &R) -> Result<String, ServiceError>
where
    R: CodeRegistry + ?Sized,
{
    loop {
        let candidate = random_code(prefix);
        if !registry.is_taken(&candidate).await? {
            return Ok(candidate);
        }
        CODE_COLLISIONS.inc();
        debug!(code = %candidate, "order code collision, drawing again");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct Taken {
        codes: HashSet<String>,
        checks: Mutex<u32>,
        reject_first: u32,
    }

    #[async_trait]
    impl CodeRegistry for Taken {
        async fn is_taken(&self, code: &str) -> Result<bool, ServiceError> {
            let mut checks = self.checks.lock().unwrap();
            *checks += 1;
            Ok(*checks <= self.reject_first || self.codes.contains(code))
        }
    }

    #[test]
    fn codes_are_zero_padded() {
        assert_eq!(format_code(RETAIL_PREFIX, 2025, 42), "MP-2025-000042");
        assert_eq!(format_code(CUSTOM_PREFIX, 2024, 999_999), "PC-2024-999999");
    }

    #[test]
    fn random_codes_use_current_year() {
        let code = random_code(RETAIL_PREFIX);
        assert!(is_well_formed(&code), "{code}");
        assert!(code.contains(&format!("-{}-", Utc::now().year())));
    }

    #[test]
    fn malformed_codes_are_rejected() {
        assert!(!is_well_formed("MP-25-000001"));
        assert!(!is_well_formed("XX-2025-000001"));
        assert!(!is_well_formed("MP-2025-0000011"));
    }

    #[tokio::test]
    async fn collisions_are_retried() {
        let registry = Taken {
            codes: HashSet::new(),
            checks: Mutex::new(0),
            reject_first: 3,
        };
        let code = generate_unique_code(CUSTOM_PREFIX, &registry).await.unwrap();
        assert!(code.starts_with("PC-"));
        assert_eq!(*registry.checks.lock().unwrap(), 4);
    }
}
