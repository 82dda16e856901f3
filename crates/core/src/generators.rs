//! Random test data
//!
//! Every value produced here satisfies the control plane's validation
//! rules for the corresponding field. Randomness comes from a
//! [`RandomSource`] so runs can be replayed with a seed.

use std::net::Ipv4Addr;

use dbaas_domain::constants::{
    BANDWIDTH_OPTIONS, MAX_USER_CONNECTIONS_ALTERNATIVES, MAX_USER_CONNECTIONS_RANGE,
    REDIS_TIMEOUT_ALTERNATIVES, REDIS_TIMEOUT_RANGE,
};
use dbaas_domain::{DbaasError, Result, Topology};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ports::RandomSource;

const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

const USERNAME_MAX_LEN: u64 = 31;
const PASSWORD_MIN_LEN: u64 = 8;
const PASSWORD_MAX_LEN: u64 = 128;
const DATABASE_NAME_MAX_LEN: u64 = 63;
const CLUSTER_SUFFIX_LEN: usize = 4;
const PORT_RANGE: (u64, u64) = (1024, 65535);

/// Thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&self, upper: u64) -> u64 {
        rand::thread_rng().gen_range(0..upper.max(1))
    }
}

/// Deterministic RNG for reproducible runs
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl RandomSource for SeededRandom {
    fn below(&self, upper: u64) -> u64 {
        self.rng.lock().gen_range(0..upper.max(1))
    }
}

/// Generator of names, credentials and setting values
pub struct TestDataGenerator<'a> {
    random: &'a dyn RandomSource,
}

impl<'a> TestDataGenerator<'a> {
    pub fn new(random: &'a dyn RandomSource) -> Self {
        Self { random }
    }

    fn in_range(&self, low: u64, high_inclusive: u64) -> u64 {
        low + self.random.below(high_inclusive - low + 1)
    }

    fn pick_char(&self, alphabet: &str) -> char {
        let bytes = alphabet.as_bytes();
        let index = usize::try_from(self.random.below(bytes.len() as u64)).unwrap_or(0);
        char::from(bytes[index.min(bytes.len() - 1)])
    }

    fn pick_string(&self, first: &str, rest: &str, len: u64) -> String {
        let mut out = String::with_capacity(len as usize);
        out.push(self.pick_char(first));
        for _ in 1..len {
            out.push(self.pick_char(rest));
        }
        out
    }

    fn pick<T: Copy>(&self, options: &[T]) -> Option<T> {
        if options.is_empty() {
            return None;
        }
        let index = usize::try_from(self.random.below(options.len() as u64)).unwrap_or(0);
        options.get(index).copied()
    }

    /// 1 to 31 characters; the first from `[A-Za-z0-9_]`, the rest may add `-`
    pub fn username(&self) -> String {
        let first = format!("{LOWER}{UPPER}{DIGITS}_");
        let rest = format!("{first}-");
        let len = self.in_range(1, USERNAME_MAX_LEN);
        self.pick_string(&first, &rest, len)
    }

    /// 8 to 128 characters of letters, digits and symbols
    pub fn password(&self) -> String {
        let alphabet = format!("{LOWER}{UPPER}{DIGITS}{PASSWORD_SYMBOLS}");
        let len = self.in_range(PASSWORD_MIN_LEN, PASSWORD_MAX_LEN);
        self.pick_string(&alphabet, &alphabet, len)
    }

    /// 1 to 63 characters starting with a letter, then `[A-Za-z0-9_]`
    pub fn database_name(&self) -> String {
        let first = format!("{LOWER}{UPPER}");
        let rest = format!("{LOWER}{UPPER}{DIGITS}_");
        let len = self.in_range(1, DATABASE_NAME_MAX_LEN);
        self.pick_string(&first, &rest, len)
    }

    /// `{prefix}-xxxx` with four lowercase alphanumerics
    pub fn cluster_name(&self, topology: Topology) -> String {
        let alphabet = format!("{LOWER}{DIGITS}");
        let suffix: String =
            (0..CLUSTER_SUFFIX_LEN).map(|_| self.pick_char(&alphabet)).collect();
        format!("{}-{suffix}", cluster_prefix(topology))
    }

    pub fn ipv4(&self) -> Ipv4Addr {
        let octet = || u8::try_from(self.random.below(256)).unwrap_or(0);
        Ipv4Addr::new(octet(), octet(), octet(), octet())
    }

    pub fn port(&self) -> u16 {
        u16::try_from(self.in_range(PORT_RANGE.0, PORT_RANGE.1)).unwrap_or(u16::MAX)
    }

    /// A bandwidth option different from `current`
    pub fn bandwidth(&self, current: u32) -> Result<u32> {
        let options: Vec<u32> =
            BANDWIDTH_OPTIONS.iter().copied().filter(|option| *option != current).collect();
        self.pick(&options).ok_or_else(|| {
            DbaasError::InvalidInput(format!("no bandwidth option differs from {current}"))
        })
    }

    /// `max_user_connections` in `[100, 1000)` that differs from `current`
    pub fn max_user_connections(&self, current: Option<u64>) -> u32 {
        let (low, high) = MAX_USER_CONNECTIONS_RANGE;
        let candidate = self.in_range(u64::from(low), u64::from(high) - 1);
        distinct_or_alternative(self, candidate, current, &MAX_USER_CONNECTIONS_ALTERNATIVES)
    }

    /// Redis `timeout` in `[300, 500)` that differs from `current`
    pub fn redis_timeout(&self, current: Option<u64>) -> u32 {
        let (low, high) = REDIS_TIMEOUT_RANGE;
        let candidate = self.in_range(u64::from(low), u64::from(high) - 1);
        distinct_or_alternative(self, candidate, current, &REDIS_TIMEOUT_ALTERNATIVES)
    }
}

fn distinct_or_alternative(
    generator: &TestDataGenerator<'_>,
    candidate: u64,
    current: Option<u64>,
    alternatives: &[u32],
) -> u32 {
    let as_u32 = |value: u64| u32::try_from(value).unwrap_or(u32::MAX);
    if current != Some(candidate) {
        return as_u32(candidate);
    }
    let filtered: Vec<u32> =
        alternatives.iter().copied().filter(|alt| Some(u64::from(*alt)) != current).collect();
    generator.pick(&filtered).unwrap_or_else(|| as_u32(candidate + 1))
}

/// Cluster name prefix per topology
pub const fn cluster_prefix(topology: Topology) -> &'static str {
    match topology {
        Topology::MySqlStandalone | Topology::MySqlReplica => "mysql-vm",
        Topology::RedisStandalone | Topology::RedisSentinel | Topology::RedisCluster => {
            "redis-vm"
        }
        Topology::OpenSearchSingle => "opensearch",
        Topology::OpenSearchCluster => "opensearch-cluster",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Always returns the same index, clamped to the range
    struct Fixed(u64);

    impl RandomSource for Fixed {
        fn below(&self, upper: u64) -> u64 {
            self.0.min(upper - 1)
        }
    }

    fn is_username_char(c: char, first: bool) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || (!first && c == '-')
    }

    #[test]
    fn generated_values_respect_field_rules() {
        let random = SeededRandom::new(7);
        let generator = TestDataGenerator::new(&random);

        for _ in 0..200 {
            let username = generator.username();
            assert!((1..=31).contains(&username.len()), "{username}");
            let mut chars = username.chars();
            assert!(is_username_char(chars.next().unwrap(), true));
            assert!(chars.all(|c| is_username_char(c, false)));

            let password = generator.password();
            assert!((8..=128).contains(&password.len()));
            assert!(password.chars().all(|c| c.is_ascii_alphanumeric()
                || PASSWORD_SYMBOLS.contains(c)));

            let db = generator.database_name();
            assert!((1..=63).contains(&db.len()));
            assert!(db.chars().next().unwrap().is_ascii_alphabetic());
            assert!(db.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

            assert!(generator.port() >= 1024);
        }
    }

    #[test]
    fn cluster_names_use_topology_prefix() {
        let random = SeededRandom::new(1);
        let generator = TestDataGenerator::new(&random);

        let name = generator.cluster_name(Topology::OpenSearchCluster);
        let suffix = name.strip_prefix("opensearch-cluster-").unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));

        assert!(generator.cluster_name(Topology::RedisSentinel).starts_with("redis-vm-"));
        assert!(generator.cluster_name(Topology::MySqlReplica).starts_with("mysql-vm-"));
    }

    #[test]
    fn bandwidth_never_repeats_current_value() {
        let random = SeededRandom::new(42);
        let generator = TestDataGenerator::new(&random);
        for current in BANDWIDTH_OPTIONS {
            for _ in 0..20 {
                let next = generator.bandwidth(current).unwrap();
                assert_ne!(next, current);
                assert!(BANDWIDTH_OPTIONS.contains(&next));
            }
        }
        // 100 is the initial bandwidth and never one of the options
        assert!(BANDWIDTH_OPTIONS.contains(&generator.bandwidth(100).unwrap()));
    }

    #[test]
    fn settings_values_fall_back_when_equal_to_current() {
        // index 0 makes the range draw hit the lower bound
        let generator = TestDataGenerator::new(&Fixed(0));
        assert_eq!(generator.max_user_connections(Some(100)), 150);
        assert_eq!(generator.max_user_connections(Some(151)), 100);
        assert_eq!(generator.redis_timeout(Some(300)), 350);
        assert_eq!(generator.redis_timeout(None), 300);
    }

    #[test]
    fn seeded_sources_replay_the_same_values() {
        let a = SeededRandom::new(99);
        let b = SeededRandom::new(99);
        let (ga, gb) = (TestDataGenerator::new(&a), TestDataGenerator::new(&b));
        assert_eq!(ga.username(), gb.username());
        assert_eq!(ga.password(), gb.password());
        assert_eq!(ga.ipv4(), gb.ipv4());
    }
}
