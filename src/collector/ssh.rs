//! One-shot SSH command execution
//!
//! ssh2 sessions are blocking, so the whole connect/auth/exec sequence runs
//! on a blocking worker thread with an overall async timeout layered on top.
//! Sessions are not reused; each collection opens and closes its own.

use ssh2::Session;
use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;

/// Errors from the direct transport. Every variant is a fallback trigger for
/// the collector, not a hard failure.
#[derive(Debug, Error)]
pub enum SshError {
    #[error("tcp connect failed: {0}")]
    Connect(String),
    #[error("ssh handshake failed: {0}")]
    Handshake(String),
    #[error("ssh authentication failed: {0}")]
    Auth(String),
    #[error("command execution failed: {0}")]
    Exec(String),
    #[error("session exceeded {0:?}")]
    Timeout(Duration),
    #[error("ssh worker task failed: {0}")]
    Task(String),
}

/// Connect, authenticate, run one command, and return its stdout.
pub async fn run_command(
    host: &str,
    port: u16,
    username: &str,
    password: &str,
    command: &str,
    connect_timeout: Duration,
    session_timeout: Duration,
) -> Result<String, SshError> {
    let host = host.to_string();
    let username = username.to_string();
    let password = password.to_string();
    let command = command.to_string();

    let work = tokio::task::spawn_blocking(move || {
        run_command_blocking(
            &host,
            port,
            &username,
            &password,
            &command,
            connect_timeout,
            session_timeout,
        )
    });

    // The blocking thread cannot be interrupted, so the overall budget is
    // enforced here; an expired task is abandoned to finish on its own.
    let budget = connect_timeout + session_timeout;
    match tokio::time::timeout(budget, work).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(SshError::Task(e.to_string())),
        Err(_) => Err(SshError::Timeout(budget)),
    }
}

fn run_command_blocking(
    host: &str,
    port: u16,
    username: &str,
    password: &str,
    command: &str,
    connect_timeout: Duration,
    session_timeout: Duration,
) -> Result<String, SshError> {
    let addr = format!("{host}:{port}")
        .to_socket_addrs()
        .map_err(|e| SshError::Connect(e.to_string()))?
        .next()
        .ok_or_else(|| SshError::Connect(format!("no address for {host}:{port}")))?;

    let tcp = TcpStream::connect_timeout(&addr, connect_timeout)
        .map_err(|e| SshError::Connect(e.to_string()))?;

    let mut session = Session::new().map_err(|e| SshError::Handshake(e.to_string()))?;
    session.set_tcp_stream(tcp);
    session.set_timeout(session_timeout.as_millis() as u32);
    session
        .handshake()
        .map_err(|e| SshError::Handshake(e.to_string()))?;

    session
        .userauth_password(username, password)
        .map_err(|e| SshError::Auth(e.to_string()))?;
    if !session.authenticated() {
        return Err(SshError::Auth("authentication rejected".to_string()));
    }

    let mut channel = session
        .channel_session()
        .map_err(|e| SshError::Exec(e.to_string()))?;
    channel
        .exec(command)
        .map_err(|e| SshError::Exec(e.to_string()))?;

    let mut output = String::new();
    channel
        .read_to_string(&mut output)
        .map_err(|e| SshError::Exec(e.to_string()))?;
    channel
        .wait_close()
        .map_err(|e| SshError::Exec(e.to_string()))?;

    Ok(output)
}
