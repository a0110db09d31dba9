//! End-to-end tests over a loopback TCP listener.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    use crate::command::CommandRegistry;
    use crate::config::ServerConfig;
    use crate::console::telnet::SERVER_WILL;
    use crate::server::{Server, TOO_MANY_CLIENTS};

    struct Running {
        server: Arc<Server>,
        addr: SocketAddr,
        stop: oneshot::Sender<()>,
        handle: JoinHandle<anyhow::Result<()>>,
    }

    async fn spawn_server(max_clients: usize) -> Running {
        let mut reg = CommandRegistry::new();
        reg.register("add", 3, 3, true, |args: &[String]| -> anyhow::Result<String> {
            let a: i64 = args[1].parse()?;
            let b: i64 = args[2].parse()?;
            Ok((a + b).to_string())
        })
        .unwrap();

        let config = ServerConfig {
            port: 0,
            max_clients,
            ..ServerConfig::default()
        };
        let server = Arc::new(Server::new(config, reg));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop, rx) = oneshot::channel::<()>();
        let srv = server.clone();
        let handle = tokio::spawn(async move {
            srv.serve(listener, async move { rx.await.unwrap_or(()) })
                .await
        });

        Running {
            server,
            addr,
            stop,
            handle,
        }
    }

    async fn expect(stream: &mut TcpStream, expected: &[u8]) {
        let mut buf = vec![0u8; expected.len()];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(
            buf,
            expected,
            "got {:?}",
            String::from_utf8_lossy(&buf)
        );
    }

    /// Connect and consume the option announcements and first prompt.
    async fn connect(addr: SocketAddr) -> TcpStream {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut greeting = SERVER_WILL.to_vec();
        greeting.extend_from_slice(b"->");
        expect(&mut stream, &greeting).await;
        stream
    }

    async fn wait_for_sessions(server: &Server, n: usize) {
        for _ in 0..200 {
            if server.live_sessions().len() == n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {} live sessions, have {}",
            n,
            server.live_sessions().len()
        );
    }

    #[tokio::test]
    async fn test_command_round_trip() {
        let running = spawn_server(4).await;
        let mut client = connect(running.addr).await;

        client.write_all(b"add 2 3\r").await.unwrap();
        expect(&mut client, b"add 2 3\r\n5\r\n->").await;

        // Enter on an empty line repeats the last repeatable command.
        client.write_all(b"\r").await.unwrap();
        expect(&mut client, b"\r\n5\r\n->").await;

        // A failing handler prints an empty result and the session goes on.
        client.write_all(b"add x 1\r").await.unwrap();
        expect(&mut client, b"add x 1\r\n\r\n->").await;

        client.write_all(b"add\r").await.unwrap();
        expect(&mut client, b"add\r\nParams of command add should be 3 - 3\r\n->").await;
    }

    #[tokio::test]
    async fn test_run_command_uses_shared_registry() {
        let running = spawn_server(4).await;

        assert_eq!(running.server.run_command("add 1 2"), "3");
        assert_eq!(
            running.server.run_command("sub 1 2"),
            "Not found term command sub"
        );
        assert!(running.server.live_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let running = spawn_server(4).await;
        let mut first = connect(running.addr).await;
        let mut second = connect(running.addr).await;

        first.write_all(b"add 1 1\r").await.unwrap();
        expect(&mut first, b"add 1 1\r\n2\r\n->").await;

        // The second session has neither history nor a command to repeat.
        second.write_all(b"\x1b[A\r").await.unwrap();
        expect(&mut second, b"\r\n->").await;

        wait_for_sessions(&running.server, 2).await;
    }

    #[tokio::test]
    async fn test_exit_releases_session() {
        let running = spawn_server(4).await;
        let mut client = connect(running.addr).await;
        wait_for_sessions(&running.server, 1).await;

        client.write_all(b"quit\r").await.unwrap();
        let mut rest = Vec::new();
        client.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, b"quit\r\n");

        wait_for_sessions(&running.server, 0).await;
    }

    #[tokio::test]
    async fn test_disconnect_releases_session() {
        let running = spawn_server(4).await;
        let client = connect(running.addr).await;
        wait_for_sessions(&running.server, 1).await;

        drop(client);
        wait_for_sessions(&running.server, 0).await;
    }

    #[tokio::test]
    async fn test_client_limit_enforced() {
        let running = spawn_server(1).await;
        let mut first = connect(running.addr).await;

        let mut extra = TcpStream::connect(running.addr).await.unwrap();
        let mut reply = Vec::new();
        extra.read_to_end(&mut reply).await.unwrap();
        assert_eq!(reply, TOO_MANY_CLIENTS.as_bytes());

        first.write_all(b"bye\r").await.unwrap();
        let mut rest = Vec::new();
        first.read_to_end(&mut rest).await.unwrap();
        wait_for_sessions(&running.server, 0).await;

        // The slot is free again.
        let mut again = connect(running.addr).await;
        again.write_all(b"add 4 4\r").await.unwrap();
        expect(&mut again, b"add 4 4\r\n8\r\n->").await;
    }

    #[tokio::test]
    async fn test_shutdown_leaves_sessions_running() {
        let running = spawn_server(4).await;
        let mut client = connect(running.addr).await;

        running.stop.send(()).unwrap();
        running.handle.await.unwrap().unwrap();

        assert!(TcpStream::connect(running.addr).await.is_err());

        client.write_all(b"add 1 2\r").await.unwrap();
        expect(&mut client, b"add 1 2\r\n3\r\n->").await;
    }
}
