//! Router implementation for routing packets by protocol and method
//! number and automatically decoding the packet contents to the
//! handler's request type

use std::{
    collections::HashMap,
    future::Future,
    marker::PhantomData,
    pin::Pin,
    task::{ready, Context, Poll},
};

use crate::utils::stream::DecodeError;

use super::{
    packet::{FromRequest, IntoResponse, Packet},
    SessionLink,
};

/// Empty type used to represent the format of handler
/// that is provided the session state
///
/// This type is just used to prevent implementation conflicts
/// between stateful and stateless handlers
pub struct FormatA;

/// Empty type used to represent the format of handler
/// that is not provided the session state
pub struct FormatB;

/// Wrapper over the [FromRequest] type to support the unit type
pub trait FromRequestInternal: Sized + 'static {
    fn from_request(req: &Packet) -> Result<Self, DecodeError>;
}

/// Unit type implementation for handlers that don't take a req type
impl FromRequestInternal for () {
    fn from_request(_req: &Packet) -> Result<Self, DecodeError> {
        Ok(())
    }
}

/// Implementation for normal [FromRequest] implementations
impl<F: FromRequest + 'static> FromRequestInternal for F {
    fn from_request(req: &Packet) -> Result<Self, DecodeError> {
        F::from_request(req)
    }
}

/// Pin boxed future type that is Send
type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Trait implemented by handlers which can provide a boxed future
/// to a response type which can be turned into a response
///
/// `Format` The format of the handler function (FormatA, FormatB)
/// `Req`    The request value type for the handler
/// `Res`    The response type for the handler
pub trait Handler<Format, Req, Res>: Send + Sync + 'static {
    fn handle(&self, state: SessionLink, req: Req) -> BoxFuture<Res>;
}

/// Future which results in a response packet being produced
type PacketFuture = BoxFuture<Packet>;

/// Handler implementation for async functions that take the session
/// as well as a request type
impl<Fun, Fut, Req, Res> Handler<FormatA, Req, Res> for Fun
where
    Fun: Fn(SessionLink, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Req: FromRequest,
    Res: IntoResponse,
{
    fn handle(&self, state: SessionLink, req: Req) -> BoxFuture<Res> {
        Box::pin(self(state, req))
    }
}

/// Handler implementation for async functions that take the request
/// type without any session state
impl<Fun, Fut, Req, Res> Handler<FormatB, Req, Res> for Fun
where
    Fun: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Req: FromRequest,
    Res: IntoResponse,
{
    fn handle(&self, _state: SessionLink, req: Req) -> BoxFuture<Res> {
        Box::pin(self(req))
    }
}

/// Handler implementation for async functions that take the session
/// with no request type
impl<Fun, Fut, Res> Handler<FormatA, (), Res> for Fun
where
    Fun: Fn(SessionLink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
{
    fn handle(&self, state: SessionLink, _: ()) -> BoxFuture<Res> {
        Box::pin(self(state))
    }
}

/// Handler implementation for async functions with no arguments
impl<Fun, Fut, Res> Handler<FormatB, (), Res> for Fun
where
    Fun: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
{
    fn handle(&self, _state: SessionLink, _: ()) -> BoxFuture<Res> {
        Box::pin(self())
    }
}

/// Future wrapper that polls the underlying handler future and then
/// transforms the result into the response packet
struct HandlerFuture<Res> {
    /// The future from the handler
    fut: BoxFuture<Res>,
    /// The packet the handler is responding to
    packet: Packet,
}

impl<Res> Future for HandlerFuture<Res>
where
    Res: IntoResponse,
{
    type Output = Packet;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        // Poll the underlying future
        let fut = Pin::new(&mut this.fut);
        let res = ready!(fut.poll(cx));
        // Transform the result
        let packet = res.into_response(&this.packet);
        Poll::Ready(packet)
    }
}

/// Trait for erasing the inner types of the handler routes
trait Route: Send + Sync {
    fn handle(&self, state: SessionLink, packet: Packet) -> Result<PacketFuture, HandleError>;
}

/// Route wrapper over a handler for storing the phantom type data
/// and implementing Route
struct HandlerRoute<H, Format, Req, Res> {
    /// The underlying handler
    handler: H,
    /// Marker for storing related data
    _marker: PhantomData<fn(Format, Req) -> Res>,
}

/// Route implementation for handlers wrapped by handler routes
impl<H, Format, Req, Res> Route for HandlerRoute<H, Format, Req, Res>
where
    H: Handler<Format, Req, Res>,
    Req: FromRequestInternal,
    Res: IntoResponse,
    Format: 'static,
{
    fn handle(&self, state: SessionLink, packet: Packet) -> Result<PacketFuture, HandleError> {
        let req = match Req::from_request(&packet) {
            Ok(value) => value,
            Err(err) => return Err(HandleError::Decoding(err, packet)),
        };
        let fut = self.handler.handle(state, req);
        Ok(Box::pin(HandlerFuture { fut, packet }))
    }
}

/// Router storing (protocol, method) keys mapped to route handlers
#[derive(Default)]
pub struct Router {
    /// The map of protocol/method pairs to routes
    routes: HashMap<(u8, u32), Box<dyn Route>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new route to the router. The handler is wrapped with a
    /// HandlerRoute and stored boxed under the protocol/method key
    pub fn route<Format, Req, Res>(
        &mut self,
        protocol: u8,
        method: u32,
        route: impl Handler<Format, Req, Res>,
    ) where
        Req: FromRequestInternal,
        Res: IntoResponse,
        Format: 'static,
    {
        self.routes.insert(
            (protocol, method),
            Box::new(HandlerRoute {
                handler: route,
                _marker: PhantomData,
            }),
        );
    }

    /// Finds the route matching the packet header and produces the
    /// handler future, or a [HandleError] when no handler exists or
    /// the request payload fails to decode
    pub fn handle(&self, state: SessionLink, packet: Packet) -> Result<PacketFuture, HandleError> {
        let route = match self
            .routes
            .get(&(packet.header.protocol, packet.header.method))
        {
            Some(value) => value,
            None => return Err(HandleError::MissingHandler(packet)),
        };

        route.handle(state, packet)
    }
}

/// Error that can occur while handling a packet
#[derive(Debug)]
pub enum HandleError {
    /// There wasn't an available handler for the provided packet
    MissingHandler(Packet),
    /// Decoding error while reading the packet
    Decoding(DecodeError, Packet),
}
