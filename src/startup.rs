//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

use crate::application::services::{
    Authenticator, ChatService, JwtAuthenticator, NotificationService,
};
use crate::config::Settings;
use crate::domain::{ChatRepository, NotificationRepository};
use crate::infrastructure::database;
use crate::infrastructure::pubsub::EventBridge;
use crate::infrastructure::repositories::{PgChatRepository, PgNotificationRepository};
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::{ConnectionRegistry, DeliveryDispatcher, MembershipManager};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub authenticator: Arc<dyn Authenticator>,
    pub registry: Arc<ConnectionRegistry>,
    pub bridge: EventBridge,
    pub dispatcher: Arc<DeliveryDispatcher>,
    pub membership: Arc<MembershipManager>,
    pub chat: Arc<ChatService>,
    pub notifications: Arc<NotificationService>,
    pub chat_repository: Arc<dyn ChatRepository>,
}

impl AppState {
    /// Wire the delivery core and services over the given storage.
    pub fn new(
        settings: Settings,
        chat_repository: Arc<dyn ChatRepository>,
        notification_repository: Arc<dyn NotificationRepository>,
    ) -> Self {
        let authenticator: Arc<dyn Authenticator> = Arc::new(JwtAuthenticator::new(&settings.jwt));

        let registry = Arc::new(ConnectionRegistry::new());
        let bridge = EventBridge::new(settings.bridge.channel_capacity);
        let dispatcher = Arc::new(DeliveryDispatcher::new(registry.clone(), bridge.clone()));
        let membership = Arc::new(MembershipManager::new(
            registry.clone(),
            chat_repository.clone(),
        ));

        let chat = Arc::new(ChatService::new(chat_repository.clone(), dispatcher.clone()));
        let notifications = Arc::new(NotificationService::new(
            notification_repository,
            dispatcher.clone(),
        ));

        Self {
            settings: Arc::new(settings),
            authenticator,
            registry,
            bridge,
            dispatcher,
            membership,
            chat,
            notifications,
            chat_repository,
        }
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let db = database::connect(&settings.database).await?;

        let chat_repository = Arc::new(PgChatRepository::new(db.clone()));
        let notification_repository = Arc::new(PgNotificationRepository::new(db));

        let addr = settings.server.socket_addr()?;
        let cors_layer = cors::create_cors_layer(&settings.cors);

        let state = AppState::new(settings, chat_repository, notification_repository);

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(logging::create_trace_layer())
            .layer(cors_layer);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Resolve on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
