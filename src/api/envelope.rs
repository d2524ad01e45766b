use serde::Deserialize;
use thiserror::Error;

/// Business code for a successful call.
pub const SUCCESS: &str = "0000";
/// Business code for an idempotent action that was already performed.
pub const ALREADY_DONE: &str = "0003";

pub const NETWORK_ERROR_MESSAGE: &str = "Network error, please retry";

pub type ApiResult<T> = Result<T, ApiError>;

/// The `{code, info, data}` wrapper every endpoint answers with.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    #[serde(default)]
    pub info: String,
    pub data: Option<T>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Ack {
    Done,
    AlreadyDone,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("business failure code={code} info={info}")]
    Business { code: String, info: String },
    #[error("response with code {code} carried no data")]
    MissingData { code: String },
}

impl ApiError {
    /// Everything except a business failure is reported as a network problem.
    pub fn is_business(&self) -> bool {
        matches!(self, ApiError::Business { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            ApiError::Business { code, info } if info.trim().is_empty() => {
                format!("request rejected (code {code})")
            }
            ApiError::Business { info, .. } => info.clone(),
            _ => NETWORK_ERROR_MESSAGE.to_string(),
        }
    }
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS
    }

    pub fn into_data(self) -> ApiResult<T> {
        if !self.is_success() {
            return Err(self.into_business_error());
        }
        self.data.ok_or(ApiError::MissingData { code: self.code })
    }

    /// Like [`Envelope::into_data`] but a successful `null` payload decodes
    /// to the empty value. List endpoints answer this way when nothing matches.
    pub fn into_data_or_default(self) -> ApiResult<T>
    where
        T: Default,
    {
        if !self.is_success() {
            return Err(self.into_business_error());
        }
        Ok(self.data.unwrap_or_default())
    }

    pub fn into_ack(self) -> ApiResult<Ack> {
        if self.is_success() {
            Ok(Ack::Done)
        } else {
            Err(self.into_business_error())
        }
    }

    /// Accepts [`ALREADY_DONE`] as success, for actions the server makes
    /// idempotent.
    pub fn into_idempotent_ack(self) -> ApiResult<Ack> {
        match self.code.as_str() {
            SUCCESS => Ok(Ack::Done),
            ALREADY_DONE => Ok(Ack::AlreadyDone),
            _ => Err(self.into_business_error()),
        }
    }

    fn into_business_error(self) -> ApiError {
        ApiError::Business {
            code: self.code,
            info: self.info,
        }
    }
}
