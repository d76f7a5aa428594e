// Shared constants for server timing, protocol, and defaults.

pub const SCHEMA_VERSION: &str = "1.0";
pub const UDP_RECV_BUFFER: usize = 1024;
pub const INSPECT_LOG_INTERVAL_MS: u64 = 1_000;
pub const RECV_ERROR_BACKOFF_MS: u64 = 100;
pub const FRAME_CHANNEL_CAPACITY: usize = 64;

pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 10087;
pub const DEFAULT_UDP_BIND: &str = "0.0.0.0";
pub const DEFAULT_UDP_PORT: u16 = 4141;
pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_IDLE_RESET_MS: u64 = 30_000;
