pub mod calls;
pub mod jsonrpc;
