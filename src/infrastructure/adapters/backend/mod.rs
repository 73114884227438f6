//! Backend Adapter - 后端协作方 HTTP 客户端

mod dto;
mod http_client;

pub use http_client::{HttpCollaboratorClient, HttpCollaboratorConfig};
