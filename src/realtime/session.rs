use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_web_actors::ws;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc::UnboundedReceiver};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream, UnboundedReceiverStream};

use super::events::ServerEvent;
use super::fanout::Fanout;
use super::presence::ConnectionHandle;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// One WebSocket connection of one user.
pub struct WsSession {
    user_id: String,
    fanout: Fanout,
    handle: ConnectionHandle,
    direct_rx: Option<UnboundedReceiver<ServerEvent>>,
    broadcast_rx: Option<broadcast::Receiver<ServerEvent>>,
    hb: Instant,
}

impl WsSession {
    pub fn new(user_id: String, fanout: Fanout) -> Self {
        let (handle, direct_rx) = ConnectionHandle::open();
        // Subscribe before registering so the session sees its own online list
        let broadcast_rx = fanout.subscribe();

        Self {
            user_id,
            fanout,
            handle,
            direct_rx: Some(direct_rx),
            broadcast_rx: Some(broadcast_rx),
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                log::warn!("💔 WebSocket heartbeat failed for {}, disconnecting", act.user_id);
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send_event(&self, event: &ServerEvent, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::to_string(event) {
            Ok(frame) => ctx.text(frame),
            Err(e) => log::error!("❌ Failed to encode {} event: {}", event.name(), e),
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);

        if let Some(rx) = self.direct_rx.take() {
            ctx.add_stream(UnboundedReceiverStream::new(rx));
        }
        if let Some(rx) = self.broadcast_rx.take() {
            ctx.add_stream(BroadcastStream::new(rx));
        }

        let fanout = self.fanout.clone();
        let user_id = self.user_id.clone();
        let handle = self.handle.clone();
        actix::spawn(async move {
            fanout.connect(&user_id, handle).await;
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        let fanout = self.fanout.clone();
        let user_id = self.user_id.clone();
        let connection_id = self.handle.connection_id();
        actix::spawn(async move {
            fanout.disconnect(&user_id, connection_id).await;
        });
    }
}

// Direct pushes (newMessage)
impl StreamHandler<ServerEvent> for WsSession {
    fn handle(&mut self, event: ServerEvent, ctx: &mut Self::Context) {
        self.send_event(&event, ctx);
    }

    fn finished(&mut self, _ctx: &mut Self::Context) {
        // Registry replaced this handle; keep the socket for broadcasts
        log::debug!(
            "ℹ️  Direct channel closed for {} (connection {})",
            self.user_id,
            self.handle.connection_id()
        );
    }
}

// Broadcasts (getOnlineUsers)
impl StreamHandler<Result<ServerEvent, BroadcastStreamRecvError>> for WsSession {
    fn handle(
        &mut self,
        event: Result<ServerEvent, BroadcastStreamRecvError>,
        ctx: &mut Self::Context,
    ) {
        match event {
            Ok(event) => self.send_event(&event, ctx),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                log::debug!("⏩ {} skipped {} stale broadcasts", self.user_id, skipped);
            }
        }
    }

    fn finished(&mut self, _ctx: &mut Self::Context) {}
}

// WebSocket protocol messages
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(_)) | Ok(ws::Message::Binary(_)) => {
                // Clients only listen; sends go through the HTTP API
                self.hb = Instant::now();
                log::debug!("Ignoring inbound frame from {}", self.user_id);
            }
            Ok(ws::Message::Close(reason)) => {
                log::info!("WebSocket close received from {}: {:?}", self.user_id, reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("⚠️  WebSocket protocol error for {}: {}", self.user_id, e);
                ctx.stop();
            }
        }
    }
}
