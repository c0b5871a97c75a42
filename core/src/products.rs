//! Product resource family, mounted under `/products`.
//!
//! DTOs are camelCase on the Rust side; the envelope rewrites them to and
//! from the backend's snake_case wire names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ClientConfig, RequestContext};
use crate::http::{HttpMethod, Transport};
use crate::resource::{ApiResponse, RequestOptions, Resource, NO_BODY};

pub const PRODUCTS_PATH: &str = "/products";

/// A product as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub product_name: String,
    pub price_cents: u64,
    pub in_stock: bool,
}

/// Payload for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub product_name: String,
    pub price_cents: u64,
    #[serde(default)]
    pub in_stock: bool,
}

/// Partial update. Omitted fields stay unchanged on the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ProductResource<Tr> {
    resource: Resource<Tr>,
}

impl<Tr> ProductResource<Tr> {
    pub fn new(config: ClientConfig, context: RequestContext, transport: Tr) -> Self {
        Self {
            resource: Resource::new(config, context, PRODUCTS_PATH, transport),
        }
    }

    pub fn resource(&self) -> &Resource<Tr> {
        &self.resource
    }
}

impl<Tr: Transport> ProductResource<Tr> {
    pub async fn list(&self) -> ApiResponse<Vec<Product>> {
        self.resource
            .request(HttpMethod::Get, "", NO_BODY, RequestOptions::default())
            .await
    }

    pub async fn get(&self, id: Uuid) -> ApiResponse<Product> {
        self.resource
            .request(HttpMethod::Get, &format!("/{id}"), NO_BODY, RequestOptions::default())
            .await
    }

    pub async fn create(&self, input: &CreateProduct) -> ApiResponse<Product> {
        self.resource
            .request(HttpMethod::Post, "", Some(input), RequestOptions::default())
            .await
    }

    pub async fn update(&self, id: Uuid, input: &UpdateProduct) -> ApiResponse<Product> {
        self.resource
            .request(HttpMethod::Put, &format!("/{id}"), Some(input), RequestOptions::default())
            .await
    }

    pub async fn delete(&self, id: Uuid) -> ApiResponse<()> {
        self.resource
            .request(HttpMethod::Delete, &format!("/{id}"), NO_BODY, RequestOptions::default())
            .await
    }
}
