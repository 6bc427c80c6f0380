//! Scripted SMTP server for probe tests.
//!
//! Answers each command with a configured reply, and can inject failures:
//! delay every response, hang on the Nth command, or silently drop the
//! connection after N commands.
#![allow(dead_code)] // Test utility module - not all methods used in every test

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::RwLock,
    time::timeout,
};

/// A command line received by the server, verbatim.
pub type ReceivedCommand = String;

#[derive(Debug, Clone)]
struct ScriptedReply {
    code: u16,
    message: String,
}

impl ScriptedReply {
    fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        format!("{} {}\r\n", self.code, self.message).into_bytes()
    }
}

#[derive(Clone)]
struct ScriptConfig {
    greeting: ScriptedReply,
    helo: ScriptedReply,
    mail_from: ScriptedReply,
    rcpt_to: ScriptedReply,
    data: ScriptedReply,
    data_end: ScriptedReply,
    quit: ScriptedReply,

    response_delay: Option<Duration>,
    hang_on_command: Option<usize>,
    drop_after_commands: Option<usize>,
    hang_before_greeting: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            greeting: ScriptedReply::new(220, "mock ESMTP ready"),
            helo: ScriptedReply::new(250, "mock Hello"),
            mail_from: ScriptedReply::new(250, "OK"),
            rcpt_to: ScriptedReply::new(250, "OK"),
            data: ScriptedReply::new(354, "End data with <CRLF>.<CRLF>"),
            data_end: ScriptedReply::new(250, "OK: queued"),
            quit: ScriptedReply::new(221, "Bye"),
            response_delay: None,
            hang_on_command: None,
            drop_after_commands: None,
            hang_before_greeting: false,
        }
    }
}

/// A running mock SMTP server bound to an ephemeral localhost port.
pub struct MockSmtpServer {
    addr: SocketAddr,
    commands: Arc<RwLock<Vec<ReceivedCommand>>>,
    shutdown: Arc<AtomicBool>,
}

impl MockSmtpServer {
    #[must_use]
    pub fn builder() -> MockSmtpServerBuilder {
        MockSmtpServerBuilder {
            config: ScriptConfig::default(),
        }
    }

    /// The server's listen address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `host:port` form, suitable for an exchanger override.
    #[must_use]
    pub fn target(&self) -> String {
        self.addr.to_string()
    }

    /// Every command line received so far, across all connections.
    pub async fn commands(&self) -> Vec<ReceivedCommand> {
        self.commands.read().await.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    async fn handle_client(
        mut stream: TcpStream,
        config: Arc<ScriptConfig>,
        commands: Arc<RwLock<Vec<ReceivedCommand>>>,
    ) -> std::io::Result<()> {
        if config.hang_before_greeting {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            return Ok(());
        }

        let (reader, mut writer) = stream.split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        let mut command_count = 0usize;
        let mut in_data = false;

        writer.write_all(&config.greeting.to_bytes()).await?;
        writer.flush().await?;

        loop {
            if let Some(drop_after) = config.drop_after_commands
                && command_count >= drop_after
            {
                return Ok(());
            }

            line.clear();
            let read = timeout(Duration::from_secs(10), reader.read_line(&mut line)).await;
            let Ok(Ok(bytes_read)) = read else {
                return Ok(());
            };
            if bytes_read == 0 {
                return Ok(());
            }

            let cmd_line = line.trim().to_string();

            if in_data {
                if cmd_line == "." {
                    in_data = false;
                    commands.write().await.push("<DATA END>".to_string());
                    writer.write_all(&config.data_end.to_bytes()).await?;
                    writer.flush().await?;
                }
                continue;
            }

            if let Some(hang_on) = config.hang_on_command
                && command_count == hang_on
            {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                return Ok(());
            }

            command_count += 1;
            commands.write().await.push(cmd_line.clone());

            let verb = cmd_line
                .split_whitespace()
                .next()
                .unwrap_or("")
                .to_uppercase();

            let unknown_reply = ScriptedReply::new(500, "unknown command");
            let reply = match verb.as_str() {
                "HELO" | "EHLO" => &config.helo,
                "MAIL" => &config.mail_from,
                "RCPT" => &config.rcpt_to,
                "DATA" => {
                    in_data = config.data.code == 354;
                    &config.data
                }
                "QUIT" => {
                    writer.write_all(&config.quit.to_bytes()).await?;
                    writer.flush().await?;
                    return Ok(());
                }
                _ => &unknown_reply,
            }
            .clone();

            if let Some(delay) = config.response_delay {
                tokio::time::sleep(delay).await;
            }

            writer.write_all(&reply.to_bytes()).await?;
            writer.flush().await?;
        }
    }
}

/// Builder for [`MockSmtpServer`].
pub struct MockSmtpServerBuilder {
    config: ScriptConfig,
}

impl MockSmtpServerBuilder {
    #[must_use]
    pub fn with_greeting(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.greeting = ScriptedReply::new(code, message);
        self
    }

    #[must_use]
    pub fn with_helo_reply(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.helo = ScriptedReply::new(code, message);
        self
    }

    #[must_use]
    pub fn with_mail_from_reply(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.mail_from = ScriptedReply::new(code, message);
        self
    }

    #[must_use]
    pub fn with_rcpt_to_reply(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.rcpt_to = ScriptedReply::new(code, message);
        self
    }

    #[must_use]
    pub fn with_data_end_reply(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.data_end = ScriptedReply::new(code, message);
        self
    }

    /// Delay every reply by `delay`.
    #[must_use]
    pub const fn with_response_delay(mut self, delay: Duration) -> Self {
        self.config.response_delay = Some(delay);
        self
    }

    /// Hang (never reply) on the Nth command, 0-indexed.
    #[must_use]
    pub const fn with_hang_on_command(mut self, index: usize) -> Self {
        self.config.hang_on_command = Some(index);
        self
    }

    /// Never send the greeting at all.
    #[must_use]
    pub const fn with_hang_before_greeting(mut self) -> Self {
        self.config.hang_before_greeting = true;
        self
    }

    /// Silently close the connection after N commands.
    #[must_use]
    pub const fn with_drop_after_commands(mut self, count: usize) -> Self {
        self.config.drop_after_commands = Some(count);
        self
    }

    /// Bind to an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails.
    pub async fn build(self) -> std::io::Result<MockSmtpServer> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let config = Arc::new(self.config);
        let commands = Arc::new(RwLock::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let config_clone = Arc::clone(&config);
        let commands_clone = Arc::clone(&commands);
        let shutdown_clone = Arc::clone(&shutdown);

        tokio::spawn(async move {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }

                let accepted = timeout(Duration::from_millis(100), listener.accept()).await;
                if let Ok(Ok((stream, _peer))) = accepted {
                    let config = Arc::clone(&config_clone);
                    let commands = Arc::clone(&commands_clone);

                    tokio::spawn(async move {
                        let _ = MockSmtpServer::handle_client(stream, config, commands).await;
                    });
                }
            }
        });

        Ok(MockSmtpServer {
            addr,
            commands,
            shutdown,
        })
    }
}
