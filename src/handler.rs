//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in a single
//! `HashMap<Method, Tree>`, so each one is hidden behind a `dyn ErasedHandler`.
//! Handlers do not build wire responses themselves: they return anything that
//! converts into a [`ResponseValue`], and the pipeline negotiates it later.
//!
//! ```text
//! async fn index(req: Request) -> impl Into<ResponseValue>   ← user writes this
//!        ↓ router.get("/", index)
//! Arc::new(FnHandler(index))                                ← BoxedHandler
//!        ↓ handler.call(req) at request time
//! Box::pin(async { index(req).await.into() })               ← BoxFuture<ResponseValue>
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::value::ResponseValue;

/// A heap-allocated, type-erased future.
///
/// `Send` lets tokio move it across worker threads; `'a` lets store
/// implementations borrow `&self` for the duration of a lookup.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<'static, ResponseValue>;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Automatically satisfied for any function or closure with the shape
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl Into<ResponseValue>>
/// ```
///
/// Closures are how handlers reach shared state: clone an `Arc` into the
/// closure and move it into the returned future.
///
/// The trait is sealed; only the blanket impl below satisfies it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<ResponseValue> + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<ResponseValue> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<ResponseValue> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, ResponseValue> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into() })
    }
}
