//! Network call observations.

/// Outcome of a network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NetworkStatus {
    /// The call completed with a protocol status code.
    Code(u16),
    /// The call failed before a status was received.
    Error,
}

impl NetworkStatus {
    /// Returns true for transport failures and 4xx/5xx codes.
    pub fn is_failure(&self) -> bool {
        match self {
            NetworkStatus::Code(code) => *code >= 400,
            NetworkStatus::Error => true,
        }
    }
}

impl From<u16> for NetworkStatus {
    fn from(code: u16) -> Self {
        NetworkStatus::Code(code)
    }
}

/// One timed network call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkEvent {
    /// Requested URL.
    pub url: String,

    /// Request method, e.g. `GET`.
    pub method: String,

    /// Wall-clock duration of the call in milliseconds.
    pub duration: f64,

    /// Status code, or the error marker for failed calls.
    pub status: NetworkStatus,

    /// Unix timestamp in milliseconds when the call completed.
    pub timestamp_ms: u64,

    /// Failure description for calls that errored.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
}

impl NetworkEvent {
    /// Create a builder for a call to the given URL.
    pub fn builder(url: impl Into<String>) -> NetworkEventBuilder {
        NetworkEventBuilder::new(url)
    }

    /// Whether the call errored at the transport level.
    pub fn is_error(&self) -> bool {
        matches!(self.status, NetworkStatus::Error)
    }
}

/// Builder for `NetworkEvent`.
#[derive(Debug)]
pub struct NetworkEventBuilder {
    url: String,
    method: String,
    duration: f64,
    status: NetworkStatus,
    timestamp_ms: Option<u64>,
    error: Option<String>,
}

impl NetworkEventBuilder {
    /// Create a new builder for a `GET` that returned 200.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            duration: 0.0,
            status: NetworkStatus::Code(200),
            timestamp_ms: None,
            error: None,
        }
    }

    /// Set the request method.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the call duration in milliseconds.
    pub fn duration(mut self, ms: f64) -> Self {
        self.duration = ms;
        self
    }

    /// Set the status code.
    pub fn status(mut self, code: u16) -> Self {
        self.status = NetworkStatus::Code(code);
        self
    }

    /// Mark the call as failed with the given message.
    pub fn failed(mut self, message: impl Into<String>) -> Self {
        self.status = NetworkStatus::Error;
        self.error = Some(message.into());
        self
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Build the event.
    pub fn build(self) -> NetworkEvent {
        NetworkEvent {
            url: self.url,
            method: self.method,
            duration: self.duration,
            status: self.status,
            timestamp_ms: self.timestamp_ms.unwrap_or_else(crate::current_timestamp_ms),
            error: self.error,
        }
    }
}
