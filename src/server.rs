//! TCP acceptor and per-connection command loop.
//!
//! One spawned task per connection, bounded by a configurable semaphore.
//! A connection greets with the capability banner, then loops: read one line,
//! dispatch, write the reply. Errors while serving one connection are logged
//! and end only that connection.

use crate::protocol::{self, Command, REPLY_EDITED, REPLY_GOODBYE, REPLY_NOT_FOUND, REPLY_REMOVED};
use crate::store::TaskStore;
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub struct Server {
    listener: TcpListener,
    store: TaskStore,
    connections: Arc<Semaphore>,
}

impl Server {
    /// Bind the listening endpoint once at startup.
    pub async fn bind(addr: &str, store: TaskStore, max_connections: usize) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            store,
            connections: Arc::new(Semaphore::new(max_connections)),
        })
    }

    /// The bound address. Useful when binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop: one handler task per incoming connection.
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let permit = Arc::clone(&self.connections).acquire_owned().await?;
            let store = self.store.clone();
            tokio::spawn(async move {
                info!(%peer, "client connected");
                if let Err(e) = handle_connection(stream, store).await {
                    warn!(%peer, error = %e, "connection ended with error");
                }
                info!(%peer, "connection closed");
                drop(permit);
            });
        }
    }
}

async fn handle_connection(stream: TcpStream, store: TaskStore) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(protocol::BANNER.as_bytes()).await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!(command = %line, "dispatching");
        match protocol::parse(line) {
            Ok(Command::Exit) => {
                write_reply(&mut writer, REPLY_GOODBYE).await?;
                break;
            }
            Ok(command) => {
                let reply = dispatch(command, &store)?;
                write_reply(&mut writer, &reply).await?;
            }
            Err(e) => write_reply(&mut writer, e.reply()).await?,
        }
    }
    Ok(())
}

async fn write_reply<W: AsyncWriteExt + Unpin>(writer: &mut W, reply: &str) -> Result<()> {
    writer.write_all(reply.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    Ok(())
}

/// Map a validated command onto the store and render the reply text.
fn dispatch(command: Command, store: &TaskStore) -> Result<String> {
    Ok(match command {
        Command::Add {
            description,
            date,
            time,
            phone,
        } => {
            let task = store.add(&description, &date, &time, &phone)?;
            info!(id = task.id, "task added");
            protocol::render_added(&task)
        }
        Command::List => protocol::render_list(&store.list()?),
        Command::Edit {
            id,
            description,
            date,
            time,
            phone,
        } => {
            if store.edit(id, &description, &date, &time, &phone)? {
                info!(id, "task edited");
                REPLY_EDITED.to_string()
            } else {
                REPLY_NOT_FOUND.to_string()
            }
        }
        Command::Remove { id } => {
            if store.remove(id)? {
                info!(id, "task removed");
                REPLY_REMOVED.to_string()
            } else {
                REPLY_NOT_FOUND.to_string()
            }
        }
        // EXIT is handled at the connection loop, before dispatch.
        Command::Exit => REPLY_GOODBYE.to_string(),
    })
}
