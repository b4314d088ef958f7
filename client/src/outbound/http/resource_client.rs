//! Reqwest-backed [`ResourceClient`] for one REST resource.

use std::marker::PhantomData;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use reqwest::{StatusCode, Url};

use super::{HttpTransport, decode, join_segments};
use crate::domain::ports::{RequestError, Resource, ResourceClient};

/// REST resource rooted at one URL, e.g. `http://host/bulletin-board/posts`.
pub struct HttpResourceClient<R> {
    transport: HttpTransport,
    resource_url: Url,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpResourceClient<R> {
    /// Address `resource_url` through `transport`.
    pub fn new(transport: HttpTransport, resource_url: Url) -> Self {
        Self {
            transport,
            resource_url,
            _resource: PhantomData,
        }
    }

    fn record_url(&self, id: &R::Id) -> Result<Url, RequestError> {
        join_segments(&self.resource_url, R::path_segments(id))
    }
}

#[async_trait]
impl<R: Resource> ResourceClient<R> for HttpResourceClient<R> {
    async fn list(&self, request: PageRequest) -> Result<Page<R>, RequestError> {
        let mut url = self.resource_url.clone();
        request.apply_to(&mut url);
        let body = self
            .transport
            .send(self.transport.client().get(url), StatusCode::OK)
            .await?;
        decode(&body, "page")
    }

    async fn list_all(&self) -> Result<Vec<R>, RequestError> {
        let body = self
            .transport
            .send(
                self.transport.client().get(self.resource_url.clone()),
                StatusCode::OK,
            )
            .await?;
        decode(&body, "collection")
    }

    async fn get(&self, id: &R::Id) -> Result<R, RequestError> {
        let url = self.record_url(id)?;
        let body = self
            .transport
            .send(self.transport.client().get(url), StatusCode::OK)
            .await?;
        decode(&body, "record")
    }

    async fn create(&self, draft: &R::Draft) -> Result<R, RequestError> {
        let request = self
            .transport
            .client()
            .post(self.resource_url.clone())
            .json(draft);
        let body = self.transport.send(request, StatusCode::CREATED).await?;
        decode(&body, "record")
    }

    async fn update(&self, id: &R::Id, draft: &R::Draft) -> Result<R, RequestError> {
        let request = self.transport.client().put(self.record_url(id)?).json(draft);
        let body = self.transport.send(request, StatusCode::OK).await?;
        decode(&body, "record")
    }

    async fn remove(&self, id: &R::Id) -> Result<(), RequestError> {
        let request = self.transport.client().delete(self.record_url(id)?);
        self.transport.send(request, StatusCode::OK).await?;
        Ok(())
    }
}
