// ABOUTME: Distribution to package-update command table.
// ABOUTME: Maps a detected (distro, version) pair to the commands that refresh its packages.

use nonempty::NonEmpty;
use std::fmt;

/// Which versions of a distribution a rule applies to.
#[derive(Debug, Clone, Copy)]
enum Versions {
    Any,
    OneOf(&'static [&'static str]),
}

impl Versions {
    fn matches(&self, version: &str) -> bool {
        match self {
            Versions::Any => true,
            Versions::OneOf(list) => list.contains(&version),
        }
    }
}

/// One row of the table. `commands: None` marks a known dead end.
struct Rule {
    distros: &'static [&'static str],
    versions: Versions,
    commands: Option<&'static [&'static str]>,
}

const APT: &[&str] = &[
    "apt-get update -qqy",
    "apt-get upgrade -qqy",
    "apt-get clean",
    "rm -rf /var/lib/apt/lists/*",
];
const APK: &[&str] = &["apk update", "apk upgrade --no-cache"];
const YUM: &[&str] = &["yum update -y"];
const MICRODNF: &[&str] = &["microdnf update -y"];

// First match wins, so exceptions go above the catch-all row of a distro.
const RULES: &[Rule] = &[
    Rule {
        distros: &["ubuntu", "debian"],
        versions: Versions::Any,
        commands: Some(APT),
    },
    Rule {
        distros: &["alpine"],
        versions: Versions::Any,
        commands: Some(APK),
    },
    Rule {
        distros: &["oracle"],
        versions: Versions::OneOf(&["7"]),
        commands: Some(YUM),
    },
    Rule {
        distros: &["oracle"],
        versions: Versions::OneOf(&["8"]),
        commands: Some(MICRODNF),
    },
    // CentOS 5 and 6 mirrors are gone; yum cannot reach a package feed.
    Rule {
        distros: &["centos"],
        versions: Versions::OneOf(&["5", "6"]),
        commands: None,
    },
    Rule {
        distros: &["centos"],
        versions: Versions::Any,
        commands: Some(YUM),
    },
];

/// Ordered shell commands that bring a distribution's packages up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    commands: NonEmpty<String>,
}

impl UpdatePlan {
    pub fn new(commands: NonEmpty<String>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }

    /// The commands as a single shell line, each run only if the previous succeeded.
    pub fn joined(&self) -> String {
        self.commands().collect::<Vec<_>>().join(" && ")
    }
}

impl fmt::Display for UpdatePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Look up the update commands for a lowercase distro id and major version.
///
/// Returns `None` when the pair has no supported update path. That is not an
/// error here; callers decide how to report it.
pub fn resolve(distro: &str, version: &str) -> Option<UpdatePlan> {
    let rule = RULES
        .iter()
        .find(|rule| rule.distros.contains(&distro) && rule.versions.matches(version))?;

    let commands = rule.commands?.iter().map(|c| c.to_string()).collect();
    NonEmpty::from_vec(commands).map(UpdatePlan::new)
}
