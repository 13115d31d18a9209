use chrono::Local;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;

use corpchat_client::client::Client;
use corpchat_client::config::ClientConfig;
use corpchat_client::http::UreqGateway;
use corpchat_client::render::{LogNotifier, LogRenderer};
use corpchat_client::types::conversation::ConversationId;
use corpchat_client::types::user::SessionUser;
use corpchat_client::websocket::WebSocketTransportFactory;

/// Headless chat session that logs everything it receives. Useful for
/// watching a conversation and for poking at a dev server.
#[derive(Parser, Debug)]
#[command(name = "corpchat-client")]
struct Args {
    /// Base URL of the chat server.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Participant id to connect as.
    #[arg(long)]
    user_id: String,

    /// Display name for the session.
    #[arg(long, default_value = "")]
    name: String,

    /// Bearer token for the REST endpoints.
    #[arg(long, default_value = "")]
    token: String,

    /// Open this peer conversation after connecting.
    #[arg(long)]
    peer: Option<String>,

    /// Open this group conversation after connecting.
    #[arg(long)]
    group: Option<String>,
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{:<5}] [{}] - {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime");

    rt.block_on(async {
        let config = ClientConfig::new(&args.server);

        let session = SessionUser {
            id: args.user_id.clone(),
            full_name: if args.name.is_empty() {
                args.user_id.clone()
            } else {
                args.name.clone()
            },
            role: "member".to_string(),
        };

        let client = Client::new(
            session,
            Arc::new(WebSocketTransportFactory::new(
                config.ws_endpoint(&args.user_id),
            )),
            Arc::new(UreqGateway::new(&config.api_url, &args.token)),
            Arc::new(LogRenderer),
            Arc::new(LogNotifier),
        );

        let runner = {
            let client = client.clone();
            tokio::spawn(async move { client.run().await })
        };

        let conversation = match (&args.peer, &args.group) {
            (Some(peer), _) => Some(ConversationId::Peer(peer.clone())),
            (None, Some(group)) => Some(ConversationId::Group(group.clone())),
            (None, None) => None,
        };
        if let Some(conversation) = conversation {
            if let Err(e) = client.open_conversation(conversation.clone()).await {
                error!(target: "Client", "Could not open {conversation}: {e}");
            }
        }

        match tokio::signal::ctrl_c().await {
            Ok(()) => info!(target: "Client", "Ctrl-C received, shutting down."),
            Err(e) => error!(target: "Client", "Failed to listen for Ctrl-C: {e}"),
        }

        client.disconnect().await;
        let _ = runner.await;
    });
}
