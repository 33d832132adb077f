//! Session registry: one connected agent per inspector session.
//!
//! A session is opened with the sink its events go to, then initialized
//! against an agent URL. Messages sent on the session are dispatched to that
//! agent; closing the session aborts whatever is still in flight.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use uuid::Uuid;

use a2a_wire::{A2AClient, A2AError, CardFetcher, CardResolver, ProtocolTransport};

use crate::card_validator::supports_streaming;
use crate::config::InspectorConfig;
use crate::dispatcher::{DispatchSummary, Dispatcher, OutboundMessage};
use crate::error::{InspectorError, InspectorResult};
use crate::events::{AgentResponse, ClientInitialized, EventSink, InspectorEvent};
use crate::payload::str_at;

/// A live link to one agent.
#[derive(Clone)]
pub struct AgentConnection {
    /// The card the agent published.
    pub card: Value,
    /// Transport to the agent's RPC endpoint.
    pub transport: Arc<dyn ProtocolTransport>,
}

impl AgentConnection {
    pub fn supports_streaming(&self) -> bool {
        supports_streaming(&self.card)
    }
}

impl std::fmt::Debug for AgentConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConnection")
            .field("card", &self.card)
            .finish_non_exhaustive()
    }
}

/// Establishes connections to agents.
#[async_trait]
pub trait AgentConnector: Send + Sync {
    async fn connect(&self, agent_url: &str) -> InspectorResult<AgentConnection>;
}

/// Connects over HTTP: resolves the card, then builds an [`A2AClient`].
#[derive(Debug, Clone)]
pub struct HttpConnector {
    card_timeout: Duration,
    request_timeout: Duration,
    headers: Vec<(String, String)>,
}

impl HttpConnector {
    pub fn new(config: &InspectorConfig) -> Self {
        Self {
            card_timeout: config.card_timeout(),
            request_timeout: config.request_timeout(),
            headers: config
                .header_pairs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn header_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Client for the card's `url`, or for the base URL when the card's is unusable.
    fn rpc_client(&self, card: &Value, agent_url: &str) -> InspectorResult<A2AClient> {
        let declared = str_at(card, "url")
            .filter(|url| url.starts_with("http://") || url.starts_with("https://"));

        let client = match declared.map(|url| A2AClient::with_timeout(url, self.request_timeout)) {
            Some(Ok(client)) => client,
            Some(Err(A2AError::InvalidUrl(e))) => {
                tracing::warn!(error = %e, "Card url unusable, posting to the agent URL instead");
                A2AClient::with_timeout(agent_url, self.request_timeout)?
            }
            Some(Err(e)) => return Err(e.into()),
            None => A2AClient::with_timeout(agent_url, self.request_timeout)?,
        };
        Ok(client.with_headers(self.header_pairs())?)
    }
}

#[async_trait]
impl AgentConnector for HttpConnector {
    async fn connect(&self, agent_url: &str) -> InspectorResult<AgentConnection> {
        let resolver = CardResolver::new(self.card_timeout)?.with_headers(self.header_pairs())?;
        let card = resolver.fetch_card(agent_url).await?;
        let client = self.rpc_client(&card, agent_url)?;
        tracing::info!(agent_url = %agent_url, rpc_url = %client.rpc_url(), "Agent connected");

        Ok(AgentConnection {
            card,
            transport: Arc::new(client),
        })
    }
}

struct Session {
    sink: Arc<dyn EventSink>,
    agent: Option<ConnectedAgent>,
    in_flight: Vec<AbortHandle>,
}

struct ConnectedAgent {
    card: Value,
    dispatcher: Dispatcher,
    supports_streaming: bool,
}

/// Tracks inspector sessions and the agent each one is connected to.
pub struct SessionRegistry {
    connector: Arc<dyn AgentConnector>,
    accepted_output_modes: Vec<String>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new(connector: Arc<dyn AgentConnector>, accepted_output_modes: Vec<String>) -> Self {
        Self {
            connector,
            accepted_output_modes,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a session and the sink its events are delivered to.
    pub async fn open(&self, session_id: &str, sink: Arc<dyn EventSink>) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            session_id.to_string(),
            Session {
                sink,
                agent: None,
                in_flight: Vec::new(),
            },
        );
        tracing::debug!(session_id = %session_id, "Session opened");
    }

    /// Connect the session to the agent at `agent_url`.
    ///
    /// The outcome is reported as a `client_initialized` event; a failure
    /// leaves any previous connection in place.
    pub async fn initialize(&self, session_id: &str, agent_url: &str) -> InspectorResult<()> {
        let sink = self.sink(session_id).await?;

        let connection = match self.connector.connect(agent_url).await {
            Ok(connection) => connection,
            Err(e) => {
                tracing::error!(
                    session_id = %session_id,
                    agent_url = %agent_url,
                    error = %e,
                    "Failed to initialize client"
                );
                sink.emit(InspectorEvent::Initialized(ClientInitialized::Error {
                    message: e.to_string(),
                }));
                return Err(e);
            }
        };

        let supports_streaming = connection.supports_streaming();
        let dispatcher = Dispatcher::new(connection.transport, sink.clone())
            .with_accepted_output_modes(self.accepted_output_modes.clone());

        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| InspectorError::UnknownSession(session_id.to_string()))?;
        session.agent = Some(ConnectedAgent {
            card: connection.card,
            dispatcher,
            supports_streaming,
        });
        drop(sessions);

        sink.emit(InspectorEvent::Initialized(ClientInitialized::Success));
        Ok(())
    }

    /// Send one message on the session and wait for every response.
    ///
    /// A session without a connected agent gets a `Client not initialized.`
    /// error event carrying `correlation_id`, or a generated one.
    pub async fn send_message(
        &self,
        session_id: &str,
        text: &str,
        correlation_id: Option<String>,
    ) -> InspectorResult<DispatchSummary> {
        let (dispatcher, message) = self.prepare(session_id, text, correlation_id).await?;
        Ok(dispatcher.dispatch(message).await)
    }

    /// Like [`send_message`](Self::send_message), but runs the dispatch as a
    /// task owned by the session, so that [`close`](Self::close) can abort it.
    pub async fn spawn_send_message(
        &self,
        session_id: &str,
        text: &str,
        correlation_id: Option<String>,
    ) -> InspectorResult<JoinHandle<DispatchSummary>> {
        let (dispatcher, message) = self.prepare(session_id, text, correlation_id).await?;
        let handle = tokio::spawn(async move { dispatcher.dispatch(message).await });

        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.in_flight.retain(|task| !task.is_finished());
                session.in_flight.push(handle.abort_handle());
            }
            // Closed while we were spawning.
            None => handle.abort(),
        }
        Ok(handle)
    }

    /// Forget the session, aborting its in-flight dispatches. Returns whether
    /// the session existed.
    pub async fn close(&self, session_id: &str) -> bool {
        let removed = self.sessions.lock().await.remove(session_id);
        match removed {
            Some(session) => {
                let aborted = session.in_flight.iter().filter(|t| !t.is_finished()).count();
                for task in session.in_flight {
                    task.abort();
                }
                tracing::debug!(session_id = %session_id, aborted, "Session closed");
                true
            }
            None => false,
        }
    }

    /// The card of the agent the session is connected to.
    pub async fn card(&self, session_id: &str) -> Option<Value> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .and_then(|s| s.agent.as_ref())
            .map(|agent| agent.card.clone())
    }

    pub async fn is_initialized(&self, session_id: &str) -> bool {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .is_some_and(|s| s.agent.is_some())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    async fn sink(&self, session_id: &str) -> InspectorResult<Arc<dyn EventSink>> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .map(|s| s.sink.clone())
            .ok_or_else(|| InspectorError::UnknownSession(session_id.to_string()))
    }

    async fn prepare(
        &self,
        session_id: &str,
        text: &str,
        correlation_id: Option<String>,
    ) -> InspectorResult<(Dispatcher, OutboundMessage)> {
        let correlation_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let sessions = self.sessions.lock().await;
        let session = sessions
            .get(session_id)
            .ok_or_else(|| InspectorError::UnknownSession(session_id.to_string()))?;

        let Some(agent) = &session.agent else {
            let err = InspectorError::NotInitialized(session_id.to_string());
            session.sink.emit(InspectorEvent::Response(AgentResponse::error(
                err.to_string(),
                correlation_id,
            )));
            return Err(err);
        };

        let message =
            OutboundMessage::new(text, agent.supports_streaming).with_correlation_id(correlation_id);
        Ok((agent.dispatcher.clone(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::tests::{success, ScriptedTransport};
    use crate::events::MemorySink;
    use a2a_wire::RpcOutcomeStream;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Hands out pre-built connections, one per `connect`.
    struct FakeConnector {
        connections: StdMutex<Vec<AgentConnection>>,
    }

    impl FakeConnector {
        fn new(connections: Vec<AgentConnection>) -> Self {
            Self {
                connections: StdMutex::new(connections),
            }
        }
    }

    #[async_trait]
    impl AgentConnector for FakeConnector {
        async fn connect(&self, agent_url: &str) -> InspectorResult<AgentConnection> {
            self.connections.lock().unwrap().pop().ok_or_else(|| {
                A2AError::DiscoveryFailed(format!("nothing listening at {agent_url}")).into()
            })
        }
    }

    fn connection(card: Value, transport: ScriptedTransport) -> AgentConnection {
        AgentConnection {
            card,
            transport: Arc::new(transport),
        }
    }

    fn registry(connections: Vec<AgentConnection>) -> SessionRegistry {
        SessionRegistry::new(
            Arc::new(FakeConnector::new(connections)),
            vec!["text/plain".into()],
        )
    }

    #[tokio::test]
    async fn test_initialize_reports_success() {
        let registry = registry(vec![connection(
            json!({"name": "echo", "capabilities": {"streaming": false}}),
            ScriptedTransport::default(),
        )]);
        let sink = Arc::new(MemorySink::new());
        registry.open("s1", sink.clone()).await;

        registry.initialize("s1", "http://agent").await.unwrap();

        assert!(registry.is_initialized("s1").await);
        assert_eq!(registry.card("s1").await.unwrap()["name"], "echo");
        assert_eq!(
            sink.events(),
            vec![InspectorEvent::Initialized(ClientInitialized::Success)]
        );
    }

    #[tokio::test]
    async fn test_initialize_failure_is_reported() {
        let registry = registry(vec![]);
        let sink = Arc::new(MemorySink::new());
        registry.open("s1", sink.clone()).await;

        let err = registry.initialize("s1", "http://down").await.unwrap_err();

        assert!(!registry.is_initialized("s1").await);
        assert_eq!(
            sink.events(),
            vec![InspectorEvent::Initialized(ClientInitialized::Error {
                message: err.to_string()
            })]
        );
        assert!(err.to_string().contains("http://down"));
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let registry = registry(vec![]);
        assert!(matches!(
            registry.initialize("ghost", "http://agent").await,
            Err(InspectorError::UnknownSession(id)) if id == "ghost"
        ));
        assert!(matches!(
            registry.send_message("ghost", "hi", None).await,
            Err(InspectorError::UnknownSession(_))
        ));
        assert!(!registry.close("ghost").await);
    }

    #[tokio::test]
    async fn test_send_before_initialize() {
        let registry = registry(vec![]);
        let sink = Arc::new(MemorySink::new());
        registry.open("s1", sink.clone()).await;

        let err = registry
            .send_message("s1", "hi", Some("corr-1".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, InspectorError::NotInitialized(_)));
        assert_eq!(
            sink.responses(),
            vec![AgentResponse::error("Client not initialized.", "corr-1")]
        );
    }

    #[tokio::test]
    async fn test_send_before_initialize_generates_correlation_id() {
        let registry = registry(vec![]);
        let sink = Arc::new(MemorySink::new());
        registry.open("s1", sink.clone()).await;

        assert!(registry.send_message("s1", "hi", None).await.is_err());

        let responses = sink.responses();
        assert_eq!(responses.len(), 1);
        assert!(responses[0].is_error());
        assert!(Uuid::parse_str(responses[0].id()).is_ok());
    }

    #[tokio::test]
    async fn test_send_uses_card_streaming_capability() {
        let registry = registry(vec![connection(
            json!({"capabilities": {"streaming": true}}),
            ScriptedTransport::streaming(vec![success(
                json!({"kind": "status-update", "status": {"state": "completed"}}),
            )]),
        )]);
        let sink = Arc::new(MemorySink::new());
        registry.open("s1", sink.clone()).await;
        registry.initialize("s1", "http://agent").await.unwrap();

        let summary = registry
            .send_message("s1", "hi", Some("corr-2".into()))
            .await
            .unwrap();

        assert_eq!(summary.payloads, 1);
        assert_eq!(sink.responses()[0].id(), "corr-2");
        let request = &sink.debug_records()[0];
        assert_eq!(request.data["method"], "message/stream");
        assert_eq!(
            request.data["params"]["configuration"]["acceptedOutputModes"],
            json!(["text/plain"])
        );
    }

    #[tokio::test]
    async fn test_close_aborts_in_flight_dispatch() {
        let endless = futures::stream::iter(vec![success(
            json!({"kind": "status-update", "status": {"state": "working"}}),
        )])
        .chain(futures::stream::pending());
        let registry = registry(vec![connection(
            json!({"capabilities": {"streaming": true}}),
            ScriptedTransport::with_stream(RpcOutcomeStream::new(Box::pin(endless))),
        )]);
        let sink = Arc::new(MemorySink::new());
        registry.open("s1", sink.clone()).await;
        registry.initialize("s1", "http://agent").await.unwrap();

        let task = registry.spawn_send_message("s1", "hi", None).await.unwrap();
        while sink.responses().is_empty() {
            tokio::task::yield_now().await;
        }

        assert!(registry.close("s1").await);
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_http_connector_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/agent-card.json"))
            .and(header("x-api-key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "echo",
                "url": format!("{}/rpc", server.uri()),
                "capabilities": {"streaming": false}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc"))
            .and(header("x-api-key", "k"))
            .and(body_partial_json(json!({"method": "message/send"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "corr-3",
                "result": {
                    "kind": "message",
                    "messageId": "m-1",
                    "role": "agent",
                    "parts": [{"kind": "text", "text": "echo: hi"}]
                }
            })))
            .mount(&server)
            .await;

        let mut config = InspectorConfig::default();
        config.merge_headers([("x-api-key".to_string(), "k".to_string())]);
        let registry = SessionRegistry::new(
            Arc::new(HttpConnector::new(&config)),
            config.accepted_output_modes.clone(),
        );
        let sink = Arc::new(MemorySink::new());
        registry.open("s1", sink.clone()).await;
        registry.initialize("s1", &server.uri()).await.unwrap();

        let summary = registry
            .send_message("s1", "hi", Some("corr-3".into()))
            .await
            .unwrap();

        assert_eq!((summary.payloads, summary.errors), (1, 0));
        match &sink.responses()[0] {
            AgentResponse::Payload { payload, validation_errors, .. } => {
                assert!(validation_errors.is_empty());
                assert_eq!(payload["parts"][0]["text"], "echo: hi");
            }
            other => panic!("expected payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_connector_falls_back_to_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/agent-card.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"url": "not a url"})))
            .mount(&server)
            .await;

        let connector = HttpConnector::new(&InspectorConfig::default());
        let connection = connector.connect(&server.uri()).await.unwrap();
        assert_eq!(connection.card["url"], "not a url");
        assert!(!connection.supports_streaming());

        let client = connector.rpc_client(&connection.card, &server.uri()).unwrap();
        assert_eq!(
            client.rpc_url().as_str().trim_end_matches('/'),
            server.uri().trim_end_matches('/')
        );
    }
}
