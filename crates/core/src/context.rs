//! Explicit suite context passed to every operation

use std::sync::Arc;

use dbaas_domain::{PollPolicy, PollingConfig, ProductKind, RegionDescriptor, SuiteConfig};

use crate::client::ManagerClient;
use crate::generators::{TestDataGenerator, ThreadRandom};
use crate::poller::Poller;
use crate::ports::{ApiTransport, RandomSource};

/// Shared transport, configuration and randomness for one suite run
#[derive(Clone)]
pub struct SuiteContext {
    config: Arc<SuiteConfig>,
    region: Arc<RegionDescriptor>,
    transport: Arc<dyn ApiTransport>,
    random: Arc<dyn RandomSource>,
}

impl SuiteContext {
    /// Create a context backed by the thread RNG
    pub fn new(config: SuiteConfig, transport: Arc<dyn ApiTransport>) -> Self {
        let region = config.region.descriptor();
        Self {
            config: Arc::new(config),
            region: Arc::new(region),
            transport,
            random: Arc::new(ThreadRandom),
        }
    }

    /// Replace the random source, e.g. with a seeded one for replay
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn polling(&self) -> &PollingConfig {
        &self.config.polling
    }

    pub fn region(&self) -> &RegionDescriptor {
        &self.region
    }

    /// Client for the given product's manager API
    pub fn client(&self, product: ProductKind) -> ManagerClient {
        ManagerClient::new(Arc::clone(&self.transport), &self.config.project_id, product)
    }

    /// Poller for `policy` using the configured retry budget
    pub fn poller(&self, policy: PollPolicy) -> Poller {
        Poller::with_config(policy, &self.config.polling)
    }

    pub fn generator(&self) -> TestDataGenerator<'_> {
        TestDataGenerator::new(self.random.as_ref())
    }
}
