// Scenario files and the replay loop.
//
// A scenario is a JSON list of `SessionCommand`s, optionally wrapped in an
// object that also carries a `RouterConfig`:
//
//   [ {"AddPoint": {"point": {"x": 0, "y": 0, "z": 0}}}, "BuildGraph", ... ]
//   { "config": { "neighbor_count": 3 }, "commands": [ ... ] }
//
// `run()` applies the commands in order and writes every emitted event as one
// JSON object per line. When a `BuildGraph` starts a background build, the
// runner waits for it to publish before applying the next command, so the
// output is the same as an inline build apart from the extra
// `GraphBuildStarted` event.

use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use waymark_core::command::SessionCommand;
use waymark_core::config::RouterConfig;
use waymark_core::session::{RouteSession, StepResult};
use waymark_core::WaymarkError;

/// Errors from loading or replaying a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] WaymarkError),

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScenarioFile {
    Wrapped {
        #[serde(default)]
        config: Option<RouterConfig>,
        commands: Vec<SessionCommand>,
    },
    Bare(Vec<SessionCommand>),
}

/// A parsed scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    /// Config embedded in the file, if any. Command-line overrides apply on
    /// top of it.
    pub config: Option<RouterConfig>,
    pub commands: Vec<SessionCommand>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario = match serde_json::from_str(json)? {
            ScenarioFile::Wrapped { config, commands } => Scenario { config, commands },
            ScenarioFile::Bare(commands) => Scenario {
                config: None,
                commands,
            },
        };
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Apply `commands` to `session`, writing each event as a JSON line to `out`.
/// Returns the number of events written.
pub fn run(
    session: &mut RouteSession,
    commands: &[SessionCommand],
    out: &mut impl Write,
) -> Result<usize, ScenarioError> {
    let mut written = 0;
    for command in commands {
        let mut result = session.apply(command);
        if session.is_build_pending() {
            debug!("waiting for background build");
            session.wait_for_background_build()?;
            result.events.extend(session.take_events().events);
        }
        written += write_events(&result, out)?;
    }
    out.flush().map_err(ScenarioError::Output)?;
    Ok(written)
}

fn write_events(result: &StepResult, out: &mut impl Write) -> Result<usize, ScenarioError> {
    for event in &result.events {
        serde_json::to_writer(&mut *out, event).map_err(|e| ScenarioError::Output(e.into()))?;
        out.write_all(b"\n").map_err(ScenarioError::Output)?;
    }
    Ok(result.events.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_list_has_no_config() {
        let scenario = Scenario::from_json(r#"["BuildGraph", "ComputeRoute"]"#).unwrap();
        assert_eq!(scenario.config, None);
        assert_eq!(
            scenario.commands,
            vec![SessionCommand::BuildGraph, SessionCommand::ComputeRoute]
        );
    }

    #[test]
    fn wrapped_form_carries_config() {
        let scenario = Scenario::from_json(
            r#"{ "config": { "neighbor_count": 2 }, "commands": ["AdvanceSegment"] }"#,
        )
        .unwrap();
        assert_eq!(scenario.config.unwrap().neighbor_count, 2);
        assert_eq!(scenario.commands, vec![SessionCommand::AdvanceSegment]);
    }

    #[test]
    fn unknown_command_is_a_parse_error() {
        let err = Scenario::from_json(r#"["Teleport"]"#).unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }
}
