use crate::arn::ArnError;
use crate::clients::ApiError;
use crate::vpc::VpcStep;
use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to list {}: {}", what, source))]
    ListResources { what: String, source: ApiError },

    #[snafu(display("Failed to describe {} '{}': {}", what, id, source))]
    DescribeResource {
        what: String,
        id: String,
        source: ApiError,
    },

    #[snafu(display("Failed to delete {} '{}': {}", what, id, source))]
    DeleteResource {
        what: String,
        id: String,
        source: ApiError,
    },

    #[snafu(display("Failed to {} for VPC '{}': {}", step, vpc_id, source))]
    VpcTeardown {
        vpc_id: String,
        step: VpcStep,
        source: ApiError,
    },

    #[snafu(display("{} '{}' did not finish deleting in time: {}", what, id, source))]
    WaitTimeout {
        what: String,
        id: String,
        source: tokio::time::error::Elapsed,
    },

    #[snafu(display("{} '{}' failed to delete, status '{}'", what, id, status))]
    WaitFailed {
        what: String,
        id: String,
        status: String,
    },

    #[snafu(display(
        "Gave up waiting for {} after {} failed describe calls: {}",
        what,
        failures,
        source
    ))]
    PollBudget {
        what: String,
        failures: u32,
        source: ApiError,
    },

    #[snafu(display("{}", source))]
    Arn { source: ArnError },

    #[snafu(display("Failed cleaning up {}: {}", phase, source))]
    Phase {
        phase: String,
        source: Box<Error>,
    },

    #[snafu(display("{}", display_all(errors)))]
    Aggregate { errors: Vec<Error> },
}

impl Error {
    /// Combine failures collected from independent steps. `None` when there were none.
    pub fn join(mut errors: Vec<Error>) -> Option<Error> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Error::Aggregate { errors }),
        }
    }

    /// The individual failures, looking through aggregates.
    pub fn flatten(&self) -> Vec<&Error> {
        match self {
            Error::Aggregate { errors } => errors.iter().flat_map(Error::flatten).collect(),
            other => vec![other],
        }
    }
}

fn display_all(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|error| error.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn join_errors() {
    assert!(Error::join(Vec::new()).is_none());

    let single = Error::join(vec![Error::WaitFailed {
        what: "stack".to_string(),
        id: "a".to_string(),
        status: "DELETE_FAILED".to_string(),
    }])
    .unwrap();
    assert!(matches!(single, Error::WaitFailed { .. }));

    let joined = Error::join(vec![
        Error::WaitFailed {
            what: "stack".to_string(),
            id: "a".to_string(),
            status: "DELETE_FAILED".to_string(),
        },
        Error::WaitFailed {
            what: "stack".to_string(),
            id: "b".to_string(),
            status: "DELETE_FAILED".to_string(),
        },
    ])
    .unwrap();
    assert_eq!(joined.flatten().len(), 2);
    assert_eq!(
        joined.to_string(),
        "stack 'a' failed to delete, status 'DELETE_FAILED'\n\
         stack 'b' failed to delete, status 'DELETE_FAILED'"
    );
}
