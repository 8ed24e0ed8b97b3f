#![allow(dead_code)]

pub mod config;
pub mod mock_llm;
pub mod server;

/// 1x1 PNG, base64 encoded
pub const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
