// JSON-RPC server: native and MCP method dispatch over newline-delimited TCP
// and stdio streams.

pub mod mcp;
pub mod methods;
pub mod stream;
