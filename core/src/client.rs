//! Per-request entry point to the backend API.
//!
//! # Design
//! An `ApiClient` is built for each incoming request from the process-wide
//! `ClientConfig` and that request's `RequestContext`. It carries no mutable
//! state; resource families are handed out as cheap clones sharing the same
//! transport.

use crate::config::{ClientConfig, RequestContext};
use crate::http::ReqwestTransport;
use crate::products::ProductResource;
use crate::resource::Resource;

#[derive(Debug, Clone)]
pub struct ApiClient<Tr = ReqwestTransport> {
    config: ClientConfig,
    context: RequestContext,
    transport: Tr,
}

impl ApiClient<ReqwestTransport> {
    pub fn new(config: ClientConfig, context: RequestContext) -> Self {
        Self::with_transport(config, context, ReqwestTransport::new())
    }
}

impl<Tr: Clone> ApiClient<Tr> {
    pub fn with_transport(config: ClientConfig, context: RequestContext, transport: Tr) -> Self {
        Self {
            config,
            context,
            transport,
        }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn products(&self) -> ProductResource<Tr> {
        ProductResource::new(
            self.config.clone(),
            self.context.clone(),
            self.transport.clone(),
        )
    }

    /// A resource family mounted under `base_path`.
    pub fn resource(&self, base_path: &str) -> Resource<Tr> {
        Resource::new(
            self.config.clone(),
            self.context.clone(),
            base_path,
            self.transport.clone(),
        )
    }
}
