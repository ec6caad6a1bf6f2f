/// Request hit counter
///
/// Counts requests for the static `/app` files. The counter is owned by the
/// application and injected where needed; `/admin/reset` zeroes it.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct HitCounter {
    hits: Arc<AtomicU64>,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

/// Middleware that bumps a `HitCounter` for every request it sees.
pub struct HitCounterMiddleware {
    counter: HitCounter,
}

impl HitCounterMiddleware {
    pub fn new(counter: HitCounter) -> Self {
        Self { counter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HitCounterMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HitCounterMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(HitCounterMiddlewareService {
            service: Rc::new(service),
            counter: self.counter.clone(),
        }))
    }
}

pub struct HitCounterMiddlewareService<S> {
    service: Rc<S>,
    counter: HitCounter,
}

impl<S, B> Service<ServiceRequest> for HitCounterMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        self.counter.increment();
        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
