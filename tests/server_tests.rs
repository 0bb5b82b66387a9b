//! End-to-end tests over a real TCP connection: bind on an ephemeral port,
//! connect as a client, drive the wire protocol, and assert the exact reply
//! strings.

use lembrete_server::server::Server;
use lembrete_server::store::TaskStore;
use std::net::SocketAddr;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

/// The banner greets with seven lines before the first command.
const BANNER_LINES: usize = 7;

async fn spawn_server() -> (TempDir, TaskStore, SocketAddr) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = TaskStore::open(dir.path().join("tasks.json")).expect("Failed to open store");
    let server = Server::bind("127.0.0.1:0", store.clone(), 16)
        .await
        .expect("Failed to bind");
    let addr = server.local_addr().expect("Failed to get local addr");
    tokio::spawn(server.run());
    (dir, store, addr)
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("Failed to connect");
        let (reader, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(reader),
            writer,
        };
        for _ in 0..BANNER_LINES {
            client.read_line().await.expect("banner line");
        }
        client
    }

    /// One reply line without its trailing newline; `None` on peer close.
    async fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.expect("Failed to read");
        if n == 0 {
            return None;
        }
        Some(line.trim_end_matches('\n').to_string())
    }

    async fn send(&mut self, command: &str) {
        self.writer
            .write_all(format!("{command}\n").as_bytes())
            .await
            .expect("Failed to write");
    }

    async fn roundtrip(&mut self, command: &str) -> String {
        self.send(command).await;
        self.read_line().await.expect("Expected a reply")
    }
}

#[tokio::test]
async fn add_replies_with_assigned_id() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    let reply = client
        .roundtrip("ADD|Buy milk|2025-01-01|09:00|+5511999999999")
        .await;
    assert_eq!(reply, "Tarefa adicionada: ID 1");
}

#[tokio::test]
async fn list_on_empty_store() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.roundtrip("LIST").await, "Nenhuma tarefa cadastrada.");
}

#[tokio::test]
async fn edit_then_list_shows_sent_false() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client
        .roundtrip("ADD|Buy milk|2025-01-01|09:00|+5511999999999")
        .await;
    let reply = client
        .roundtrip("EDIT|1|Buy bread|2025-01-02|10:00|+5511999999999")
        .await;
    assert_eq!(reply, "Tarefa editada com sucesso.");

    let line = client.roundtrip("LIST").await;
    assert_eq!(
        line,
        "1 - Buy bread | 2025-01-02 10:00 | Phone: +5511999999999 | Sent: False"
    );
}

#[tokio::test]
async fn remove_unknown_id_replies_not_found() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.roundtrip("REMOVE|99").await, "ID não encontrado.");
}

#[tokio::test]
async fn remove_existing_task() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client
        .roundtrip("ADD|Buy milk|2025-01-01|09:00|+5511999999999")
        .await;
    assert_eq!(
        client.roundtrip("REMOVE|1").await,
        "Tarefa removida com sucesso."
    );
    assert_eq!(client.roundtrip("LIST").await, "Nenhuma tarefa cadastrada.");
}

#[tokio::test]
async fn invalid_date_is_rejected_with_format_hint() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    let reply = client
        .roundtrip("ADD|Buy milk|01/01/2025|09:00|+5511999999999")
        .await;
    assert_eq!(
        reply,
        "Formato de data/hora inválido. Use YYYY-MM-DD e HH:MM (24h)"
    );
    // Nothing was stored.
    assert_eq!(client.roundtrip("LIST").await, "Nenhuma tarefa cadastrada.");
}

#[tokio::test]
async fn non_integer_id_is_rejected() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.roundtrip("REMOVE|um").await, "ID inválido.");
}

#[tokio::test]
async fn unknown_command_is_rejected() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.roundtrip("PING").await, "Comando inválido.");
}

#[tokio::test]
async fn exit_says_goodbye_and_closes() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.roundtrip("EXIT").await, "Fechando conexão. Tchau!");
    assert_eq!(client.read_line().await, None);
}

#[tokio::test]
async fn blank_lines_are_skipped() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.send("").await;
    client.send("   ").await;
    assert_eq!(client.roundtrip("LIST").await, "Nenhuma tarefa cadastrada.");
}

#[tokio::test]
async fn list_renders_one_line_per_task() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client
        .roundtrip("ADD|Buy milk|2025-01-01|09:00|+5511999999999")
        .await;
    client
        .roundtrip("ADD|Call mom|2025-01-02|18:30|+5511888888888")
        .await;

    client.send("LIST").await;
    let first = client.read_line().await.expect("first line");
    let second = client.read_line().await.expect("second line");
    assert_eq!(
        first,
        "1 - Buy milk | 2025-01-01 09:00 | Phone: +5511999999999 | Sent: False"
    );
    assert_eq!(
        second,
        "2 - Call mom | 2025-01-02 18:30 | Phone: +5511888888888 | Sent: False"
    );
}

#[tokio::test]
async fn concurrent_connections_share_the_store() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut first = Client::connect(addr).await;
    let mut second = Client::connect(addr).await;

    let reply = first
        .roundtrip("ADD|From first|2025-01-01|09:00|+5511111111111")
        .await;
    assert_eq!(reply, "Tarefa adicionada: ID 1");

    let reply = second
        .roundtrip("ADD|From second|2025-01-01|09:00|+5522222222222")
        .await;
    assert_eq!(reply, "Tarefa adicionada: ID 2");

    // Both clients observe both tasks.
    second.send("LIST").await;
    let lines = [
        second.read_line().await.expect("line"),
        second.read_line().await.expect("line"),
    ];
    assert!(lines[0].contains("From first"));
    assert!(lines[1].contains("From second"));
}

#[tokio::test]
async fn one_closed_connection_does_not_affect_others() {
    let (_dir, _store, addr) = spawn_server().await;
    let mut surviving = Client::connect(addr).await;

    {
        let mut doomed = Client::connect(addr).await;
        doomed.roundtrip("EXIT").await;
    }

    let reply = surviving
        .roundtrip("ADD|Still here|2025-01-01|09:00|+5511999999999")
        .await;
    assert_eq!(reply, "Tarefa adicionada: ID 1");
}
