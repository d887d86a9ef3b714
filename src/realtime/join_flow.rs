use crate::dto::session_dto::VerifyCodeResponse;
use crate::error::{Error, Result};
use crate::models::session::{QuizSessionView, SessionStatus};
use crate::realtime::channel::{ChannelConnector, ClientEvent, ServerEvent, SessionChannel};
use crate::services::session_service::SessionService;
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

const MAX_NAME_LEN: usize = 30;

#[allow(async_fn_in_trait)]
pub trait CodeVerifier {
    async fn verify(&self, code: &str) -> Result<VerifyCodeResponse>;
}

impl CodeVerifier for SessionService {
    async fn verify(&self, code: &str) -> Result<VerifyCodeResponse> {
        self.verify_code(code).await
    }
}

/// Where the participant is in joining a live session. Everything past
/// `Joining` mirrors what the server reported.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinState {
    Disconnected,
    Connecting,
    AwaitingCode,
    VerifyingCode { code: String },
    AwaitingName { code: String, quiz_title: Option<String> },
    ReadyToJoin { code: String, name: String },
    Joining { code: String, name: String },
    Lobby(QuizSessionView),
    InProgress(QuizSessionView),
    Completed(QuizSessionView),
    Rejected { reason: String },
}

impl JoinState {
    pub fn label(&self) -> &'static str {
        match self {
            JoinState::Disconnected => "disconnected",
            JoinState::Connecting => "connecting",
            JoinState::AwaitingCode => "awaiting-code",
            JoinState::VerifyingCode { .. } => "verifying-code",
            JoinState::AwaitingName { .. } => "awaiting-name",
            JoinState::ReadyToJoin { .. } => "ready-to-join",
            JoinState::Joining { .. } => "joining",
            JoinState::Lobby(_) => "lobby",
            JoinState::InProgress(_) => "in-progress",
            JoinState::Completed(_) => "completed",
            JoinState::Rejected { .. } => "rejected",
        }
    }

    pub fn session(&self) -> Option<&QuizSessionView> {
        match self {
            JoinState::Lobby(v) | JoinState::InProgress(v) | JoinState::Completed(v) => Some(v),
            _ => None,
        }
    }

    /// State after the server's reply to a verify request.
    pub fn after_verification(code: String, resp: VerifyCodeResponse) -> JoinState {
        if !resp.valid {
            return JoinState::Rejected {
                reason: resp
                    .message
                    .unwrap_or_else(|| "Invalid session code.".to_string()),
            };
        }
        if resp.status == Some(SessionStatus::Completed) {
            return JoinState::Rejected {
                reason: "This session has already ended.".to_string(),
            };
        }
        JoinState::AwaitingName {
            code,
            quiz_title: resp.quiz_title,
        }
    }

    /// State once the server has placed us in a session.
    pub fn from_session(view: QuizSessionView) -> JoinState {
        match view.status {
            SessionStatus::Lobby => JoinState::Lobby(view),
            SessionStatus::InProgress => JoinState::InProgress(view),
            SessionStatus::Completed => JoinState::Rejected {
                reason: "This session has already ended.".to_string(),
            },
        }
    }

    /// Applies a pushed event to a joined session. Other states ignore pushes.
    /// An error push leaves a joined session where it was.
    pub fn on_event(self, event: ServerEvent) -> JoinState {
        let view = match self {
            JoinState::Lobby(v) | JoinState::InProgress(v) | JoinState::Completed(v) => v,
            other => return other,
        };
        match event {
            ServerEvent::Connect => status_state(view),
            ServerEvent::SessionJoined { session } => status_state(session),
            ServerEvent::ParticipantJoined { participant } => {
                let mut view = view;
                view.upsert_participant(participant);
                status_state(view)
            }
            ServerEvent::SessionStatus { status } => {
                let mut view = view;
                view.status = status;
                status_state(view)
            }
            ServerEvent::Error { .. } => status_state(view),
        }
    }
}

fn status_state(view: QuizSessionView) -> JoinState {
    match view.status {
        SessionStatus::Lobby => JoinState::Lobby(view),
        SessionStatus::InProgress => JoinState::InProgress(view),
        SessionStatus::Completed => JoinState::Completed(view),
    }
}

/// Reads one answer line: `<question-index> <answer>`. The answer is taken
/// as JSON when it parses (`2`, `true`, `"Lima"`) and as plain text otherwise.
pub fn parse_answer(line: &str) -> Result<(usize, Value)> {
    let usage = || {
        Error::Session("Answers look like `<question-index> <answer>`, e.g. `0 2`.".to_string())
    };
    let (index, answer) = line.trim().split_once(char::is_whitespace).ok_or_else(usage)?;
    let question_index = index.parse::<usize>().map_err(|_| usage())?;
    let answer = answer.trim();
    let value = serde_json::from_str(answer).unwrap_or_else(|_| Value::String(answer.to_string()));
    Ok((question_index, value))
}

/// What [`JoinFlow::follow`] reports while a joined session runs.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowEvent {
    State(JoinState),
    Notice(String),
    AnswerSent { question_index: usize },
    BadInput(String),
}

enum FollowStep {
    Pushed(bool),
    Typed(Option<String>),
}

/// Drives the join screens: forwards user actions, renders server replies.
pub struct JoinFlow<K: ChannelConnector, V: CodeVerifier> {
    connector: K,
    verifier: V,
    channel: Option<K::Channel>,
    state: JoinState,
    notice: Option<String>,
    join_timeout: Duration,
}

impl<K: ChannelConnector, V: CodeVerifier> JoinFlow<K, V> {
    pub fn new(connector: K, verifier: V, join_timeout: Duration) -> Self {
        Self {
            connector,
            verifier,
            channel: None,
            state: JoinState::Disconnected,
            notice: None,
            join_timeout,
        }
    }

    pub fn state(&self) -> &JoinState {
        &self.state
    }

    /// The last error the server pushed after joining, cleared once read.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub async fn connect(&mut self) -> Result<&JoinState> {
        if !matches!(self.state, JoinState::Disconnected | JoinState::Rejected { .. })
            || self.channel.is_some()
        {
            return Err(self.invalid("connect"));
        }
        self.state = JoinState::Connecting;
        match self.connector.connect().await {
            Ok(channel) => {
                self.channel = Some(channel);
                self.state = JoinState::AwaitingCode;
                Ok(&self.state)
            }
            Err(err) => {
                warn!(error = %err, "could not open session channel");
                self.state = JoinState::Disconnected;
                Err(err)
            }
        }
    }

    pub async fn submit_code(&mut self, code: &str) -> Result<&JoinState> {
        let allowed = matches!(
            self.state,
            JoinState::AwaitingCode | JoinState::AwaitingName { .. } | JoinState::Rejected { .. }
        ) && self.channel.is_some();
        if !allowed {
            return Err(self.invalid("submit a code"));
        }
        let code = code.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(Error::Session("Please enter a session code.".to_string()));
        }

        let previous = std::mem::replace(
            &mut self.state,
            JoinState::VerifyingCode { code: code.clone() },
        );
        match self.verifier.verify(&code).await {
            Ok(resp) => {
                self.state = JoinState::after_verification(code, resp);
                if let JoinState::Rejected { reason } = &self.state {
                    warn!(reason = %reason, "session code rejected");
                }
                Ok(&self.state)
            }
            Err(err) => {
                self.state = previous;
                Err(err)
            }
        }
    }

    pub fn submit_name(&mut self, name: &str) -> Result<&JoinState> {
        let JoinState::AwaitingName { code, .. } = &self.state else {
            return Err(self.invalid("submit a name"));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Session("Please enter your name.".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(Error::Session(format!(
                "Name must be at most {} characters.",
                MAX_NAME_LEN
            )));
        }
        self.state = JoinState::ReadyToJoin {
            code: code.clone(),
            name: name.to_string(),
        };
        Ok(&self.state)
    }

    /// Sends the join request and waits for the server's verdict.
    pub async fn confirm_join(&mut self) -> Result<&JoinState> {
        let JoinState::ReadyToJoin { code, name } = self.state.clone() else {
            return Err(self.invalid("join"));
        };
        let channel = match self.channel.as_mut() {
            Some(channel) => channel,
            None => return Err(Error::Session("Not connected to a session.".to_string())),
        };

        channel
            .send(ClientEvent::JoinSession {
                code: code.clone(),
                name: name.clone(),
            })
            .await?;
        self.state = JoinState::Joining {
            code: code.clone(),
            name: name.clone(),
        };

        let wait_for_reply = async {
            loop {
                let next: Option<JoinState> = match channel.next_event().await? {
                    Some(ServerEvent::SessionJoined { session }) => {
                        Some(JoinState::from_session(session))
                    }
                    Some(ServerEvent::Error { message }) => {
                        Some(JoinState::Rejected { reason: message })
                    }
                    Some(_) => continue,
                    None => None,
                };
                return Ok::<Option<JoinState>, Error>(next);
            }
        };
        let reply = tokio::time::timeout(self.join_timeout, wait_for_reply).await;

        match reply {
            Ok(Ok(Some(next))) => {
                info!(code = %code, state = next.label(), "join answered");
                self.state = next;
                Ok(&self.state)
            }
            Ok(Ok(None)) => {
                self.channel = None;
                self.state = JoinState::Disconnected;
                Err(Error::Session("Connection to the session was lost.".to_string()))
            }
            Ok(Err(err)) => {
                self.channel = None;
                self.state = JoinState::Disconnected;
                Err(err)
            }
            Err(_) => {
                self.state = JoinState::ReadyToJoin { code, name };
                Err(Error::Session(
                    "The session did not respond. Please try again.".to_string(),
                ))
            }
        }
    }

    /// Waits for the next push and applies it. `None` means the channel closed.
    pub async fn next_update(&mut self) -> Result<Option<&JoinState>> {
        let Some(channel) = self.channel.as_mut() else {
            return Ok(None);
        };
        match channel.next_event().await? {
            Some(event) => {
                if let ServerEvent::Error { message } = &event {
                    if self.state.session().is_some() {
                        warn!(message = %message, "session reported an error");
                        self.notice = Some(message.clone());
                    }
                }
                let current = std::mem::replace(&mut self.state, JoinState::Disconnected);
                self.state = current.on_event(event);
                Ok(Some(&self.state))
            }
            None => {
                info!("session channel closed");
                self.channel = None;
                self.state = JoinState::Disconnected;
                Ok(None)
            }
        }
    }

    pub async fn submit_answer(
        &mut self,
        question_index: usize,
        answer: serde_json::Value,
    ) -> Result<()> {
        let JoinState::InProgress(view) = &self.state else {
            return Err(self.invalid("answer"));
        };
        let code = view.code.clone();
        let channel = self
            .channel
            .as_mut()
            .ok_or_else(|| Error::Session("Not connected to a session.".to_string()))?;
        channel
            .send(ClientEvent::SubmitAnswer {
                code,
                question_index,
                answer,
            })
            .await
    }

    /// Follows a joined session until it completes or the channel closes.
    /// While the session is in progress each non-blank line of `answers` is
    /// parsed with [`parse_answer`] and submitted.
    pub async fn follow<R>(&mut self, answers: R, mut report: impl FnMut(FollowEvent)) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        if self.state.session().is_none() {
            return Err(self.invalid("follow a session"));
        }
        report(FollowEvent::State(self.state.clone()));

        let mut lines = answers.lines();
        let mut input_open = true;
        loop {
            if matches!(self.state, JoinState::Completed(_)) {
                return Ok(());
            }
            let accepting = input_open && matches!(self.state, JoinState::InProgress(_));
            let step = tokio::select! {
                pushed = self.next_update() => FollowStep::Pushed(pushed?.is_some()),
                typed = lines.next_line(), if accepting => FollowStep::Typed(typed?),
            };

            match step {
                FollowStep::Pushed(false) => return Ok(()),
                FollowStep::Pushed(true) => match self.notice.take() {
                    Some(message) => report(FollowEvent::Notice(message)),
                    None => report(FollowEvent::State(self.state.clone())),
                },
                FollowStep::Typed(None) => {
                    debug!("answer input closed");
                    input_open = false;
                }
                FollowStep::Typed(Some(line)) if line.trim().is_empty() => {}
                FollowStep::Typed(Some(line)) => match parse_answer(&line) {
                    Ok((question_index, answer)) => {
                        self.submit_answer(question_index, answer).await?;
                        report(FollowEvent::AnswerSent { question_index });
                    }
                    Err(err) => report(FollowEvent::BadInput(err.user_message())),
                },
            }
        }
    }

    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut channel) = self.channel.take() {
            if let Some(view) = self.state.session() {
                let _ = channel
                    .send(ClientEvent::LeaveSession {
                        code: view.code.clone(),
                    })
                    .await;
            }
            channel.close().await?;
        }
        self.state = JoinState::Disconnected;
        Ok(())
    }

    fn invalid(&self, action: &str) -> Error {
        warn!(state = self.state.label(), action, "action not allowed in current state");
        Error::Session(format!(
            "Cannot {} while {}.",
            action,
            self.state.label()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::Participant;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Wire {
        incoming: Arc<Mutex<VecDeque<ServerEvent>>>,
        sent: Arc<Mutex<Vec<ClientEvent>>>,
    }

    struct FakeChannel {
        wire: Wire,
    }

    impl SessionChannel for FakeChannel {
        async fn send(&mut self, event: ClientEvent) -> Result<()> {
            self.wire.sent.lock().unwrap().push(event);
            Ok(())
        }

        async fn next_event(&mut self) -> Result<Option<ServerEvent>> {
            Ok(self.wire.incoming.lock().unwrap().pop_front())
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct FakeConnector {
        wire: Wire,
        fail: bool,
    }

    impl ChannelConnector for FakeConnector {
        type Channel = FakeChannel;

        async fn connect(&self) -> Result<FakeChannel> {
            if self.fail {
                return Err(Error::Session("refused".into()));
            }
            Ok(FakeChannel {
                wire: self.wire.clone(),
            })
        }
    }

    struct FakeVerifier(VerifyCodeResponse);

    impl CodeVerifier for FakeVerifier {
        async fn verify(&self, _code: &str) -> Result<VerifyCodeResponse> {
            Ok(self.0.clone())
        }
    }

    fn valid(status: SessionStatus) -> VerifyCodeResponse {
        VerifyCodeResponse {
            valid: true,
            status: Some(status),
            quiz_title: Some("Capitals".into()),
            message: None,
        }
    }

    fn view(status: SessionStatus) -> QuizSessionView {
        QuizSessionView {
            code: "QZ42".into(),
            status,
            participants: vec![],
            quiz_title: None,
        }
    }

    fn flow(
        events: Vec<ServerEvent>,
        verify: VerifyCodeResponse,
    ) -> (JoinFlow<FakeConnector, FakeVerifier>, Wire) {
        let wire = Wire::default();
        wire.incoming.lock().unwrap().extend(events);
        let connector = FakeConnector {
            wire: wire.clone(),
            fail: false,
        };
        (
            JoinFlow::new(connector, FakeVerifier(verify), Duration::from_secs(1)),
            wire,
        )
    }

    #[tokio::test]
    async fn happy_path_reaches_lobby() {
        let (mut flow, wire) = flow(
            vec![
                ServerEvent::Connect,
                ServerEvent::SessionJoined {
                    session: view(SessionStatus::Lobby),
                },
            ],
            valid(SessionStatus::Lobby),
        );

        assert_eq!(flow.connect().await.unwrap(), &JoinState::AwaitingCode);
        let state = flow.submit_code(" qz42 ").await.unwrap();
        assert!(matches!(state, JoinState::AwaitingName { code, .. } if code == "QZ42"));
        flow.submit_name("Ana").unwrap();
        let state = flow.confirm_join().await.unwrap();
        assert!(matches!(state, JoinState::Lobby(_)));

        let sent = wire.sent.lock().unwrap();
        assert_eq!(
            sent[0],
            ClientEvent::JoinSession {
                code: "QZ42".into(),
                name: "Ana".into()
            }
        );
    }

    #[tokio::test]
    async fn invalid_code_is_rejected() {
        let (mut flow, _) = flow(
            vec![],
            VerifyCodeResponse {
                valid: false,
                status: None,
                quiz_title: None,
                message: Some("No session with that code".into()),
            },
        );
        flow.connect().await.unwrap();
        let state = flow.submit_code("NOPE").await.unwrap();
        assert_eq!(
            state,
            &JoinState::Rejected {
                reason: "No session with that code".into()
            }
        );
        assert!(flow.submit_name("Ana").is_err());
    }

    #[tokio::test]
    async fn completed_session_is_rejected_at_verification() {
        let (mut flow, _) = flow(vec![], valid(SessionStatus::Completed));
        flow.connect().await.unwrap();
        let state = flow.submit_code("QZ42").await.unwrap();
        assert!(matches!(state, JoinState::Rejected { .. }));
    }

    #[tokio::test]
    async fn server_error_on_join_rejects() {
        let (mut flow, _) = flow(
            vec![ServerEvent::Error {
                message: "Name already taken".into(),
            }],
            valid(SessionStatus::Lobby),
        );
        flow.connect().await.unwrap();
        flow.submit_code("QZ42").await.unwrap();
        flow.submit_name("Ana").unwrap();
        let state = flow.confirm_join().await.unwrap();
        assert_eq!(
            state,
            &JoinState::Rejected {
                reason: "Name already taken".into()
            }
        );
    }

    #[tokio::test]
    async fn closed_channel_while_joining_disconnects() {
        let (mut flow, _) = flow(vec![], valid(SessionStatus::InProgress));
        flow.connect().await.unwrap();
        flow.submit_code("QZ42").await.unwrap();
        flow.submit_name("Ana").unwrap();
        assert!(flow.confirm_join().await.is_err());
        assert_eq!(flow.state(), &JoinState::Disconnected);
    }

    #[tokio::test]
    async fn blank_name_keeps_state() {
        let (mut flow, _) = flow(vec![], valid(SessionStatus::Lobby));
        flow.connect().await.unwrap();
        flow.submit_code("QZ42").await.unwrap();
        let before = flow.state().clone();
        assert!(flow.submit_name("   ").is_err());
        assert!(flow.submit_name(&"x".repeat(31)).is_err());
        assert_eq!(flow.state(), &before);
    }

    #[tokio::test]
    async fn actions_out_of_order_fail() {
        let (mut flow, _) = flow(vec![], valid(SessionStatus::Lobby));
        assert!(flow.submit_code("QZ42").await.is_err());
        assert!(flow.confirm_join().await.is_err());
        assert!(flow.submit_answer(0, serde_json::json!(1)).await.is_err());
        assert_eq!(flow.state(), &JoinState::Disconnected);
    }

    #[tokio::test]
    async fn failed_connect_returns_to_disconnected() {
        let connector = FakeConnector {
            wire: Wire::default(),
            fail: true,
        };
        let mut flow = JoinFlow::new(
            connector,
            FakeVerifier(valid(SessionStatus::Lobby)),
            Duration::from_secs(1),
        );
        assert!(flow.connect().await.is_err());
        assert_eq!(flow.state(), &JoinState::Disconnected);
    }

    #[tokio::test]
    async fn lobby_follows_pushes_until_completed() {
        let (mut flow, wire) = flow(
            vec![
                ServerEvent::SessionJoined {
                    session: view(SessionStatus::Lobby),
                },
                ServerEvent::ParticipantJoined {
                    participant: Participant {
                        id: "p2".into(),
                        name: "Ben".into(),
                        joined_at: None,
                    },
                },
                ServerEvent::SessionStatus {
                    status: SessionStatus::InProgress,
                },
            ],
            valid(SessionStatus::Lobby),
        );
        flow.connect().await.unwrap();
        flow.submit_code("QZ42").await.unwrap();
        flow.submit_name("Ana").unwrap();
        flow.confirm_join().await.unwrap();

        let state = flow.next_update().await.unwrap().unwrap();
        assert_eq!(state.session().unwrap().participants.len(), 1);
        let state = flow.next_update().await.unwrap().unwrap();
        assert!(matches!(state, JoinState::InProgress(_)));

        flow.submit_answer(0, serde_json::json!(2)).await.unwrap();
        assert!(matches!(
            wire.sent.lock().unwrap().last(),
            Some(ClientEvent::SubmitAnswer { question_index: 0, .. })
        ));

        wire.incoming
            .lock()
            .unwrap()
            .push_back(ServerEvent::SessionStatus {
                status: SessionStatus::Completed,
            });
        let state = flow.next_update().await.unwrap().unwrap();
        assert!(matches!(state, JoinState::Completed(_)));

        assert!(flow.next_update().await.unwrap().is_none());
        assert_eq!(flow.state(), &JoinState::Disconnected);
    }

    #[tokio::test]
    async fn error_push_after_joining_keeps_the_session() {
        let (mut flow, wire) = flow(
            vec![
                ServerEvent::SessionJoined {
                    session: view(SessionStatus::InProgress),
                },
                ServerEvent::Error {
                    message: "Answer already submitted".into(),
                },
                ServerEvent::SessionStatus {
                    status: SessionStatus::Completed,
                },
            ],
            valid(SessionStatus::InProgress),
        );
        flow.connect().await.unwrap();
        flow.submit_code("QZ42").await.unwrap();
        flow.submit_name("Ana").unwrap();
        assert!(matches!(flow.confirm_join().await.unwrap(), JoinState::InProgress(_)));

        let state = flow.next_update().await.unwrap().unwrap();
        assert!(matches!(state, JoinState::InProgress(_)));
        assert_eq!(flow.take_notice().as_deref(), Some("Answer already submitted"));
        assert_eq!(flow.take_notice(), None);

        flow.submit_answer(1, serde_json::json!("Lima")).await.unwrap();
        assert_eq!(wire.sent.lock().unwrap().len(), 2);

        let state = flow.next_update().await.unwrap().unwrap();
        assert!(matches!(state, JoinState::Completed(_)));
    }

    #[test]
    fn error_push_does_not_replace_a_joined_state() {
        let state = JoinState::Lobby(view(SessionStatus::Lobby)).on_event(ServerEvent::Error {
            message: "Slow down".into(),
        });
        assert_eq!(state, JoinState::Lobby(view(SessionStatus::Lobby)));
    }

    #[test]
    fn answer_lines_parse_index_and_value() {
        assert_eq!(parse_answer("0 2").unwrap(), (0, serde_json::json!(2)));
        assert_eq!(parse_answer(" 3  true ").unwrap(), (3, serde_json::json!(true)));
        assert_eq!(parse_answer("1 \"Lima\"").unwrap(), (1, serde_json::json!("Lima")));
        assert_eq!(parse_answer("1 New Delhi").unwrap(), (1, serde_json::json!("New Delhi")));
        assert!(parse_answer("Lima").is_err());
        assert!(parse_answer("first 2").is_err());
    }

    #[tokio::test]
    async fn follow_needs_a_joined_session() {
        let (mut flow, _) = flow(vec![], valid(SessionStatus::Lobby));
        let mut events = Vec::new();
        assert!(flow.follow(&b"0 1\n"[..], |e| events.push(e)).await.is_err());
        assert!(events.is_empty());
    }

    #[test]
    fn pushes_before_joining_are_ignored() {
        let state = JoinState::AwaitingCode.on_event(ServerEvent::SessionStatus {
            status: SessionStatus::InProgress,
        });
        assert_eq!(state, JoinState::AwaitingCode);
    }
}
