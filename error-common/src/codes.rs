// Error codes implementation
// Stable codes surfaced to callers and written to logs for every failure class

pub mod network {
    pub const CONNECTION_FAILED: &str = "NET_1001";
    pub const TIMEOUT: &str = "NET_1002";
    pub const UNEXPECTED_STATUS: &str = "NET_1003";
}

pub mod authentication {
    pub const SESSION_MISSING: &str = "AUTH_2001";
    pub const SESSION_EXPIRED: &str = "AUTH_2002";
}

pub mod authorization {
    pub const ACCESS_DENIED: &str = "AUTHZ_3001";
}

pub mod resource {
    pub const NOT_FOUND: &str = "RES_4001";
    pub const MISSING_ID: &str = "RES_4002";
}

pub mod payload {
    pub const EMPTY_BODY: &str = "PAYLOAD_5001";
    pub const MALFORMED: &str = "PAYLOAD_5002";
}

pub mod configuration {
    pub const INVALID_CONFIG: &str = "CFG_6001";
}

pub mod request {
    pub const REJECTED: &str = "REQ_7001";
}

pub mod local {
    pub const IO_FAILED: &str = "LOCAL_8001";
    pub const INTERNAL: &str = "LOCAL_8002";
}
