//! Step identifiers - the closed vocabulary of lifecycle events

use serde::{Deserialize, Serialize};

/// Prefix shared by every step's wire name
pub const STEP_PREFIX: &str = "command.";

/// A named point in a pipeline at which zero or more handlers run
///
/// Each step has a canonical wire name of the form `command.<verb>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Step {
    Installing,
    GenerateKey,
    CacheConfig,
    CacheRoutes,
    PublishVendors,
    ResetMigrations,
    RunMigrations,
    RunSeeding,
    UpdateCache,
    LinkStorage,
    GenAssets,
    ExtraStuff,
    Installed,
}

impl Step {
    /// Every step, in declaration order
    pub const ALL: [Step; 13] = [
        Step::Installing,
        Step::GenerateKey,
        Step::CacheConfig,
        Step::CacheRoutes,
        Step::PublishVendors,
        Step::ResetMigrations,
        Step::RunMigrations,
        Step::RunSeeding,
        Step::UpdateCache,
        Step::LinkStorage,
        Step::GenAssets,
        Step::ExtraStuff,
        Step::Installed,
    ];

    /// Canonical wire name, e.g. `command.runmigrations`
    pub fn name(&self) -> &'static str {
        match self {
            Self::Installing => "command.installing",
            Self::GenerateKey => "command.generatekey",
            Self::CacheConfig => "command.cacheconfig",
            Self::CacheRoutes => "command.cacheroutes",
            Self::PublishVendors => "command.publishvendors",
            Self::ResetMigrations => "command.resetmigrations",
            Self::RunMigrations => "command.runmigrations",
            Self::RunSeeding => "command.runseeding",
            Self::UpdateCache => "command.updatecache",
            Self::LinkStorage => "command.linkstorage",
            Self::GenAssets => "command.genassets",
            Self::ExtraStuff => "command.extrastuff",
            Self::Installed => "command.installed",
        }
    }

    /// Bare verb without the `command.` prefix
    pub fn verb(&self) -> &'static str {
        &self.name()[STEP_PREFIX.len()..]
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let verb = lower.strip_prefix(STEP_PREFIX).unwrap_or(&lower);

        // genappkey is the older name for the key generation step
        if verb == "genappkey" {
            return Ok(Self::GenerateKey);
        }

        Self::ALL
            .iter()
            .find(|step| step.verb() == verb)
            .copied()
            .ok_or_else(|| format!("Unknown step: {}", s))
    }
}

impl TryFrom<String> for Step {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Step> for String {
    fn from(step: Step) -> Self {
        step.name().to_string()
    }
}
