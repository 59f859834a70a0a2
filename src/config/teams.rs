//! Team configuration file loading.
//!
//! The file names the organisation and maps each team to its members and
//! repositories:
//!
//! ```json
//! {
//!   "organizationName": "acme",
//!   "teams": {
//!     "platform": { "members": ["alice", "bob"], "repositories": ["payments"] }
//!   }
//! }
//! ```
//!
//! PascalCase keys (`OrganizationName`, `Teams`, `Members`, `Repositories`)
//! are accepted too. Teams keep the order they appear in the file.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::github::{AnalysisError, RepositoryName, RepositoryOwner, UserLogin};

/// Default location of the team configuration file.
pub const DEFAULT_TEAMS_FILE: &str = "config/teams.json";

/// A named group of users and the repositories reported for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDefinition {
    name: String,
    members: Vec<UserLogin>,
    repositories: Vec<RepositoryName>,
}

impl TeamDefinition {
    /// Creates a team. Repeated members or repositories are dropped, keeping
    /// the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] when the name is blank or the
    /// team has no members or no repositories.
    pub fn new(
        name: &str,
        members: Vec<UserLogin>,
        repositories: Vec<RepositoryName>,
    ) -> Result<Self, AnalysisError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(configuration("team names must not be blank"));
        }
        let unique_members = dedup(members);
        let unique_repositories = dedup(repositories);
        if unique_members.is_empty() {
            return Err(configuration(format!("team '{trimmed}' has no members")));
        }
        if unique_repositories.is_empty() {
            return Err(configuration(format!(
                "team '{trimmed}' has no repositories"
            )));
        }

        Ok(Self {
            name: trimmed.to_owned(),
            members: unique_members,
            repositories: unique_repositories,
        })
    }

    /// Team name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in configured order.
    #[must_use]
    pub fn members(&self) -> &[UserLogin] {
        &self.members
    }

    /// Repositories in configured order.
    #[must_use]
    pub fn repositories(&self) -> &[RepositoryName] {
        &self.repositories
    }
}

/// Organisation and teams read from the team configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamsConfig {
    organization: RepositoryOwner,
    teams: Vec<TeamDefinition>,
}

impl TeamsConfig {
    /// Reads and validates the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] when the file is missing,
    /// unreadable or invalid.
    pub fn load(path: &Utf8Path) -> Result<Self, AnalysisError> {
        let contents = read_file(path)?;
        Self::from_json(&contents).map_err(|error| match error {
            AnalysisError::Configuration { message } => {
                configuration(format!("{path}: {message}"))
            }
            other => other,
        })
    }

    /// Parses and validates a team configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] when the JSON is malformed,
    /// the organisation is blank, a team name repeats, or a team has no
    /// members or repositories.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let raw: RawTeamsFile = serde_json::from_str(json)
            .map_err(|error| configuration(format!("invalid team configuration: {error}")))?;

        let organization = RepositoryOwner::new(raw.organization_name.as_deref().unwrap_or(""))
            .map_err(|_| configuration("organizationName must not be blank"))?;

        let mut teams: Vec<TeamDefinition> = Vec::with_capacity(raw.teams.len());
        for (name, team) in raw.teams {
            let definition = team.into_definition(&name)?;
            if teams.iter().any(|existing| existing.name() == definition.name()) {
                return Err(configuration(format!(
                    "team '{}' is defined more than once",
                    definition.name()
                )));
            }
            teams.push(definition);
        }
        if teams.is_empty() {
            return Err(configuration("no teams are configured"));
        }

        Ok(Self {
            organization,
            teams,
        })
    }

    /// Replaces the organisation named in the file.
    #[must_use]
    pub fn with_organization(mut self, organization: RepositoryOwner) -> Self {
        self.organization = organization;
        self
    }

    /// The organisation owning every configured repository.
    #[must_use]
    pub const fn organization(&self) -> &RepositoryOwner {
        &self.organization
    }

    /// Teams in file order.
    #[must_use]
    pub fn teams(&self) -> &[TeamDefinition] {
        &self.teams
    }
}

#[derive(Debug, Deserialize)]
struct RawTeamsFile {
    #[serde(rename = "organizationName", alias = "OrganizationName", default)]
    organization_name: Option<String>,
    #[serde(alias = "Teams", default, deserialize_with = "ordered_teams")]
    teams: Vec<(String, RawTeam)>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    #[serde(alias = "Members", default)]
    members: Vec<String>,
    #[serde(alias = "Repositories", default)]
    repositories: Vec<String>,
}

impl RawTeam {
    fn into_definition(self, name: &str) -> Result<TeamDefinition, AnalysisError> {
        let members = self
            .members
            .iter()
            .map(|member| UserLogin::new(member))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| configuration(format!("team '{name}' lists a blank member")))?;
        let repositories = self
            .repositories
            .iter()
            .map(|repository| RepositoryName::new(repository))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| configuration(format!("team '{name}' lists a blank repository")))?;

        TeamDefinition::new(name, members, repositories)
    }
}

/// Keeps the `teams` object as a list so that file order survives.
fn ordered_teams<'de, D>(deserializer: D) -> Result<Vec<(String, RawTeam)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedTeams;

    impl<'de> Visitor<'de> for OrderedTeams {
        type Value = Vec<(String, RawTeam)>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("an object mapping team names to team definitions")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut teams = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry::<String, RawTeam>()? {
                teams.push(entry);
            }
            Ok(teams)
        }
    }

    deserializer.deserialize_map(OrderedTeams)
}

fn read_file(path: &Utf8Path) -> Result<String, AnalysisError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| configuration(format!("team configuration path '{path}' has no file name")))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    };

    let dir = Dir::open_ambient_dir(&parent, ambient_authority()).map_err(|error| {
        configuration(format!(
            "failed to open team configuration directory '{parent}': {error}"
        ))
    })?;
    dir.read_to_string(file_name).map_err(|error| {
        configuration(format!(
            "failed to read team configuration '{path}': {error}"
        ))
    })
}

fn dedup<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

fn configuration(message: impl Into<String>) -> AnalysisError {
    AnalysisError::Configuration {
        message: message.into(),
    }
}
