use std::{
    convert::Infallible,
    fmt,
    net::SocketAddr,
    sync::{Arc, Weak},
};

use futures::stream;
use http_body_util::{BodyExt as _, Full, StreamBody, combinators::BoxBody};
use hyper::{
    HeaderMap, Request, Response, StatusCode,
    body::{Bytes, Frame, Incoming},
    header::{CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING},
    server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use parking_lot::{Mutex, RwLock};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::{JoinHandle, JoinSet},
};
use url::Url;

use crate::{
    CallbackResponse, MockResponse, MockedEndpoint, RecordedRequest, RequestHandler, RequestRule,
    RulePriority, ServerConfig, ServerError,
};

type ResponseBody = BoxBody<Bytes, Infallible>;
type RequestListener = Arc<dyn Fn(&RecordedRequest) + Send + Sync>;

/// Returned by the connection service to make hyper drop the connection
/// without writing a response.
#[derive(Debug, thiserror::Error)]
#[error("Connection closed by a mock rule")]
struct ConnectionClosed;

/// A programmable HTTP server for tests.
///
/// Rules can be added and removed at any time, including while requests are
/// in flight. Cloning the server yields another handle to the same instance.
#[derive(Clone)]
pub struct MockServer {
    inner: Arc<Inner>,
}

struct Inner {
    config: ServerConfig,
    state: Mutex<ServerState>,
    /// Sorted by descending priority, most recently added first within one
    /// priority.
    rules: RwLock<Vec<ActiveRule>>,
    listeners: RwLock<Vec<RequestListener>>,
    http_client: reqwest::Client,
}

struct ActiveRule {
    rule: RequestRule,
    endpoint: MockedEndpoint,
}

enum ServerState {
    Stopped,
    Starting,
    Running(RunningServer),
}

struct RunningServer {
    address: SocketAddr,
    shutdown: oneshot::Sender<()>,
    accept_task: JoinHandle<()>,
}

impl MockServer {
    /// Constructs a stopped server.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(ServerState::Stopped),
                rules: RwLock::default(),
                listeners: RwLock::default(),
                http_client: reqwest::Client::new(),
            }),
        }
    }

    /// Binds the listening socket and starts accepting connections.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(&self) -> Result<(), ServerError> {
        {
            let mut state = self.inner.state.lock();
            if !matches!(*state, ServerState::Stopped) {
                return Err(ServerError::AlreadyStarted);
            }
            *state = ServerState::Starting;
        }

        let (listener, address) = match self.bind().await {
            Ok(bound) => bound,
            Err(error) => {
                *self.inner.state.lock() = ServerState::Stopped;
                return Err(error);
            }
        };

        let (shutdown, shutdown_receiver) = oneshot::channel();
        let accept_task = tokio::spawn(accept_connections(
            Arc::downgrade(&self.inner),
            listener,
            shutdown_receiver,
        ));

        *self.inner.state.lock() = ServerState::Running(RunningServer {
            address,
            shutdown,
            accept_task,
        });

        log::debug!("Mock server listening on {address}");

        Ok(())
    }

    /// Stops accepting connections, aborts open connections and drops all
    /// rules and listeners.
    pub async fn stop(&self) -> Result<(), ServerError> {
        let running = {
            let mut state = self.inner.state.lock();
            match std::mem::replace(&mut *state, ServerState::Stopped) {
                ServerState::Running(running) => running,
                other => {
                    *state = other;
                    return Err(ServerError::NotRunning);
                }
            }
        };

        let RunningServer {
            address,
            shutdown,
            accept_task,
        } = running;

        // The accept loop may already have exited if it failed.
        let _ = shutdown.send(());
        if let Err(error) = accept_task.await {
            log::warn!("Mock server accept loop failed: {error}");
        }

        self.inner.rules.write().clear();
        self.inner.listeners.write().clear();

        log::debug!("Mock server at {address} stopped");

        Ok(())
    }

    /// Removes all rules. Listeners stay registered.
    pub fn reset(&self) {
        self.inner.rules.write().clear();
    }

    /// Whether the server is accepting connections.
    pub fn is_running(&self) -> bool {
        matches!(*self.inner.state.lock(), ServerState::Running(_))
    }

    /// The address the server is listening on.
    pub fn address(&self) -> Result<SocketAddr, ServerError> {
        match &*self.inner.state.lock() {
            ServerState::Running(running) => Ok(running.address),
            ServerState::Stopped | ServerState::Starting => Err(ServerError::NotRunning),
        }
    }

    /// The HTTP URL of the server.
    pub fn url(&self) -> Result<Url, ServerError> {
        let address = self.address()?;
        Ok(Url::parse(&format!("http://{address}"))?)
    }

    /// Registers a rule, returning a handle to the requests it handles.
    pub fn add_request_rule(&self, rule: RequestRule) -> MockedEndpoint {
        self.inner.add_rule(rule)
    }

    /// Registers several rules.
    pub fn add_request_rules(
        &self,
        rules: impl IntoIterator<Item = RequestRule>,
    ) -> Vec<MockedEndpoint> {
        rules
            .into_iter()
            .map(|rule| self.inner.add_rule(rule))
            .collect()
    }

    /// Subscribes to every request received by the server, whether or not a
    /// rule matches it.
    pub fn on_request(&self, listener: impl Fn(&RecordedRequest) + Send + Sync + 'static) {
        self.inner.listeners.write().push(Arc::new(listener));
    }

    /// Declares how requests that match no other rule are handled.
    pub fn for_unmatched_request(&self) -> UnmatchedRequestBuilder<'_> {
        UnmatchedRequestBuilder { server: self }
    }

    async fn bind(&self) -> Result<(TcpListener, SocketAddr), ServerError> {
        let requested = SocketAddr::new(
            self.inner.config.host,
            self.inner.config.port.unwrap_or_default(),
        );

        let listener = TcpListener::bind(requested)
            .await
            .map_err(|source| ServerError::Bind {
                address: requested,
                source,
            })?;

        let address = listener
            .local_addr()
            .map_err(|source| ServerError::Bind {
                address: requested,
                source,
            })?;

        Ok((listener, address))
    }
}

impl fmt::Debug for MockServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockServer")
            .field("config", &self.inner.config)
            .field("rules", &self.inner.rules.read().len())
            .finish_non_exhaustive()
    }
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

/// Builder for the rule that handles otherwise unmatched requests.
pub struct UnmatchedRequestBuilder<'server> {
    server: &'server MockServer,
}

impl UnmatchedRequestBuilder<'_> {
    /// Forwards unmatched requests to `url`. Requests are forwarded to the
    /// same path, unless `url` has a path of its own.
    pub fn then_forward_to(self, url: Url) -> MockedEndpoint {
        self.then(RequestHandler::Forward(url))
    }

    /// Replies to unmatched requests with a canned response.
    pub fn then_reply(self, response: MockResponse) -> MockedEndpoint {
        self.then(RequestHandler::Reply(response))
    }

    fn then(self, handler: RequestHandler) -> MockedEndpoint {
        self.server
            .add_request_rule(RequestRule::new(handler).with_priority(RulePriority::Fallback))
    }
}

impl Inner {
    fn add_rule(&self, rule: RequestRule) -> MockedEndpoint {
        let endpoint = MockedEndpoint::new();
        log::debug!(
            "Registering mock rule {} with priority {:?}: {:?}",
            endpoint.id(),
            rule.priority(),
            rule.handler()
        );

        let mut rules = self.rules.write();
        let index = rules.partition_point(|active| active.rule.priority() > rule.priority());
        rules.insert(
            index,
            ActiveRule {
                rule,
                endpoint: endpoint.clone(),
            },
        );

        endpoint
    }

    fn find_rule(&self, request: &RecordedRequest) -> Option<(RequestHandler, MockedEndpoint)> {
        self.rules
            .read()
            .iter()
            .find(|active| active.rule.matches(request))
            .map(|active| (active.rule.handler().clone(), active.endpoint.clone()))
    }

    fn notify_listeners(&self, request: &RecordedRequest) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener(request);
        }
    }

    async fn forward(&self, target: &Url, request: &RecordedRequest) -> Response<ResponseBody> {
        match self.try_forward(target, request).await {
            Ok(response) => response,
            Err(error) => {
                log::warn!(
                    "Failed to forward {} {} to {target}: {error}",
                    request.method(),
                    request.path()
                );

                full_response(MockResponse::text(
                    StatusCode::BAD_GATEWAY,
                    format!("Error forwarding request to {target}: {error}"),
                ))
            }
        }
    }

    async fn try_forward(
        &self,
        target: &Url,
        request: &RecordedRequest,
    ) -> Result<Response<ResponseBody>, reqwest::Error> {
        let mut headers = request.headers().clone();
        strip_hop_headers(&mut headers);
        headers.remove(HOST);

        let upstream = self
            .http_client
            .request(request.method().clone(), forward_url(target, request.path()))
            .headers(headers)
            .body(request.body().clone())
            .send()
            .await?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_headers(&mut headers);
        let body = upstream.bytes().await?;

        let mut response = Response::new(Full::new(body).boxed());
        *response.status_mut() = status;
        *response.headers_mut() = headers;

        Ok(response)
    }
}

async fn accept_connections(
    inner: Weak<Inner>,
    listener: TcpListener,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let Some(inner) = inner.upgrade() else {
                        break;
                    };

                    connections.spawn(serve_connection(inner, stream, peer));
                }
                Err(error) => log::warn!("Failed to accept connection: {error}"),
            },
        }
    }

    // Includes connections held open by timeout rules.
    connections.abort_all();
}

async fn serve_connection(inner: Arc<Inner>, stream: TcpStream, peer: SocketAddr) {
    let service = service_fn(move |request| handle_request(Arc::clone(&inner), request));

    if let Err(error) = http1::Builder::new()
        .serve_connection(TokioIo::new(stream), service)
        .await
    {
        log::debug!("Connection from {peer} ended: {error}");
    }
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
async fn handle_request(
    inner: Arc<Inner>,
    request: Request<Incoming>,
) -> Result<Response<ResponseBody>, ConnectionClosed> {
    let (parts, body) = request.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(error) => {
            log::debug!("Failed to read request body: {error}");
            return Err(ConnectionClosed);
        }
    };

    let path = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_owned(), ToString::to_string);
    let request = RecordedRequest::new(parts.method, path, parts.headers, body);

    inner.notify_listeners(&request);

    let Some((handler, endpoint)) = inner.find_rule(&request) else {
        log::debug!("No rule matched {} {}", request.method(), request.path());
        return Ok(unmatched_response(&request));
    };

    endpoint.record(request.clone());

    match handler {
        RequestHandler::Reply(response) => Ok(streamed_response(response)),
        RequestHandler::Callback(callback) => match callback(request).await {
            Ok(CallbackResponse { response, rules }) => {
                for rule in rules {
                    inner.add_rule(rule);
                }

                Ok(streamed_response(response))
            }
            Err(error) => {
                log::warn!("Mock rule {} failed: {error}", endpoint.id());

                Ok(full_response(MockResponse::text(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error in mock rule callback: {error}"),
                )))
            }
        },
        RequestHandler::Timeout => {
            let never = std::future::pending::<Infallible>().await;
            match never {}
        }
        RequestHandler::CloseConnection => Err(ConnectionClosed),
        RequestHandler::Forward(target) => Ok(inner.forward(&target, &request).await),
    }
}

/// Sends the body as a stream, so it is written with chunked transfer
/// encoding.
fn streamed_response(response: MockResponse) -> Response<ResponseBody> {
    let (status, mut headers, body) = response.into_parts();
    headers.remove(CONTENT_LENGTH);

    let body = StreamBody::new(stream::iter([Ok::<_, Infallible>(Frame::data(body))])).boxed();

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn full_response(response: MockResponse) -> Response<ResponseBody> {
    let (status, headers, body) = response.into_parts();

    let mut response = Response::new(Full::new(body).boxed());
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn unmatched_response(request: &RecordedRequest) -> Response<ResponseBody> {
    let mut explanation = format!(
        "No rules were found matching this request.\nThis request was: {} request to {}",
        request.method(),
        request.path()
    );

    if let Some(body) = request.body_text().filter(|body| !body.is_empty()) {
        explanation.push_str("\n\n");
        explanation.push_str(body);
    }

    full_response(MockResponse::text(StatusCode::SERVICE_UNAVAILABLE, explanation))
}

fn forward_url(target: &Url, path: &str) -> Url {
    if target.path() == "/" && target.query().is_none() {
        target.join(path).unwrap_or_else(|_| target.clone())
    } else {
        target.clone()
    }
}

fn strip_hop_headers(headers: &mut HeaderMap) {
    for name in [CONNECTION, CONTENT_LENGTH, TRANSFER_ENCODING] {
        headers.remove(name);
    }
}
