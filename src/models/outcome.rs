/// Status and size data observed for one HTTP exchange.
///
/// `status` is the wire status code, or 0 when no response was received
/// (connection refused, timeout). Sizes come from `Content-Length` and are
/// recorded as 0 when unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpExchange {
    pub status: u16,
    pub request_bytes: Option<u64>,
    pub response_bytes: Option<u64>,
}

impl HttpExchange {
    /// An exchange that produced `status` with no known payload sizes.
    pub fn with_status(status: u16) -> Self {
        HttpExchange {
            status,
            ..Default::default()
        }
    }
}

/// Direction of a messaging operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Published,
    Consumed,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Published => "published",
            MessageKind::Consumed => "consumed",
        }
    }
}

/// Transaction descriptor handed over by the messaging transport for one
/// publish or consume. The recorder reads it; it never modifies or stores it.
#[derive(Debug, Clone, Copy)]
pub struct EventTxn {
    pub kind: MessageKind,
    pub success: bool,
    /// Partition the message landed on, when the transport reports one.
    pub partition: Option<i32>,
    pub payload_bytes: Option<u64>,
}

impl EventTxn {
    /// A publish outcome with no partition or payload details.
    pub fn published(success: bool) -> Self {
        EventTxn {
            kind: MessageKind::Published,
            success,
            partition: None,
            payload_bytes: None,
        }
    }

    /// A consume outcome with no partition or payload details.
    pub fn consumed(success: bool) -> Self {
        EventTxn {
            kind: MessageKind::Consumed,
            success,
            partition: None,
            payload_bytes: None,
        }
    }
}
