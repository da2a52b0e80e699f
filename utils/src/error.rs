use aws_sdk_sts::error::GetCallerIdentityError;
use aws_sdk_sts::types::SdkError;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Unable to determine the caller identity: {}", source))]
    CallerIdentity {
        source: SdkError<GetCallerIdentityError>,
    },

    #[snafu(display("{} was missing from {}", what, from))]
    Missing { what: String, from: String },
}

pub type Result<T> = std::result::Result<T, Error>;
